use glam::{Vec2, Vec3};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::font::{Stroke, StrokeFont};
use crate::mesh::Mesh;

/// Sizing of extruded text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    /// Cap height in scene units.
    pub size: f32,
    /// Extrusion depth along +Z.
    pub depth: f32,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            size: 2.0,
            depth: 0.2,
        }
    }
}

/// Builds an extruded mesh for `text`.
///
/// The first glyph starts at the origin with its baseline on y = 0 and the
/// front face at z = `options.depth`. Characters missing from the font are
/// skipped but still advance the pen.
pub fn build_text_mesh(font: &StrokeFont, text: &str, options: &TextOptions) -> Mesh {
    let mut mesh = Mesh::new();
    let mut pen = Vec2::ZERO;
    let half_width = font.stroke_width * options.size * 0.5;

    for ch in text.chars() {
        if ch == '\n' {
            pen = Vec2::new(0.0, pen.y - font.line_height * options.size);
            continue;
        }
        let Some(glyph) = font.glyph(ch) else {
            warn!("font {} has no glyph for {ch:?}", font.name);
            pen.x += font.advance * options.size;
            continue;
        };
        for stroke in &glyph.strokes {
            push_stroke(&mut mesh, stroke, pen, half_width, options);
        }
        pen.x += glyph.advance * options.size;
    }

    mesh
}

fn push_stroke(mesh: &mut Mesh, stroke: &Stroke, pen: Vec2, half_width: f32, options: &TextOptions) {
    let from = pen + stroke.from * options.size;
    let to = pen + stroke.to * options.size;
    let span = to - from;
    let length = span.length();
    // Degenerate strokes render as a square dot.
    let direction = if length > f32::EPSILON {
        span / length
    } else {
        Vec2::X
    };
    let across = direction.perp();
    let center = ((from + to) * 0.5).extend(options.depth * 0.5);
    // Square caps so that joints overlap.
    let along = direction.extend(0.0) * (length * 0.5 + half_width);
    mesh.push_box(
        center,
        [
            along,
            across.extend(0.0) * half_width,
            Vec3::Z * options.depth * 0.5,
        ],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font() -> StrokeFont {
        StrokeFont::from_xml(
            r#"<font name="test" stroke="0.1" advance="1.0">
                <glyph char="I"><stroke from="0 0" to="0 1"/></glyph>
                <glyph char="/"><stroke from="0 0" to="1 1"/></glyph>
                <glyph char="."><stroke from="0 0" to="0 0"/></glyph>
            </font>"#,
        )
        .unwrap()
    }

    #[test]
    fn vertical_stroke_spans_size_and_depth() {
        let options = TextOptions {
            size: 2.0,
            depth: 0.2,
        };
        let mesh = build_text_mesh(&font(), "I", &options);
        assert_eq!(mesh.triangle_count(), 12);
        let (min, max) = mesh.bounds().unwrap();
        assert!((min.z - 0.0).abs() < 1e-6);
        assert!((max.z - 0.2).abs() < 1e-6);
        assert!((min.y + 0.1).abs() < 1e-5);
        assert!((max.y - 2.1).abs() < 1e-5);
        assert!((min.x + 0.1).abs() < 1e-5 && (max.x - 0.1).abs() < 1e-5);
    }

    #[test]
    fn glyphs_advance_the_pen() {
        let options = TextOptions::default();
        let mesh = build_text_mesh(&font(), "II", &options);
        let (_, max) = mesh.bounds().unwrap();
        assert!((max.x - 2.1).abs() < 1e-5);
    }

    #[test]
    fn unknown_characters_are_skipped_but_advance() {
        let options = TextOptions::default();
        let mesh = build_text_mesh(&font(), "?I", &options);
        assert_eq!(mesh.triangle_count(), 12);
        let (min, _) = mesh.bounds().unwrap();
        assert!((min.x - 1.9).abs() < 1e-5);
    }

    #[test]
    fn diagonal_strokes_face_outward() {
        let mesh = build_text_mesh(&font(), "/", &TextOptions::default());
        let front = (0..mesh.vertex_count())
            .map(|index| mesh.vertex(index))
            .filter(|(_, normal)| normal.z > 0.5)
            .count();
        assert_eq!(front, 4);
        for tri in mesh.triangles() {
            let a = mesh.vertex(tri[0] as usize).0;
            let b = mesh.vertex(tri[1] as usize).0;
            let c = mesh.vertex(tri[2] as usize).0;
            let winding = (b - a).cross(c - a).normalize();
            assert!((winding - mesh.vertex(tri[0] as usize).1).length() < 1e-4);
        }
    }

    #[test]
    fn zero_length_stroke_is_a_dot() {
        let mesh = build_text_mesh(&font(), ".", &TextOptions::default());
        let (min, max) = mesh.bounds().unwrap();
        assert!(((max - min).x - 0.2).abs() < 1e-5);
        assert!(((max - min).y - 0.2).abs() < 1e-5);
    }

    #[test]
    fn newline_moves_to_next_line() {
        let mesh = build_text_mesh(&font(), "I\nI", &TextOptions::default());
        let (min, _) = mesh.bounds().unwrap();
        assert!(min.y < -2.0);
    }

    #[test]
    fn empty_text_builds_empty_mesh() {
        assert!(build_text_mesh(&font(), "", &TextOptions::default()).is_empty());
    }
}
