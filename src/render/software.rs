use std::path::Path;

use anyhow::{anyhow, Context, Result};
use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};
use image::{ImageFormat, Rgba, RgbaImage};
use log::debug;

use crate::mesh::Mesh;
use crate::scene::{DrawParams, FrameSnapshot, SceneContext};
use crate::shading::{displace, SurfacePoint};

const MIN_CLIP_W: f32 = 1e-5;

/// Largest accepted framebuffer width or height.
pub const MAX_DIMENSION: u32 = 16_384;

/// Counters collected while rasterizing one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub triangles: usize,
    pub fragments: usize,
}

/// CPU rasterizer that evaluates the shading model once per covered pixel.
pub struct SoftwareRenderer {
    width: u32,
    height: u32,
    color: Vec<Vec3>,
    depth: Vec<f32>,
}

struct ShadedVertex {
    clip: Vec4,
    view_position: Vec3,
    normal: Vec3,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = buffer_len(width, height)?;
        Ok(Self {
            width,
            height,
            color: vec![Vec3::ZERO; len],
            depth: vec![f32::INFINITY; len],
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reallocates the framebuffer. On error the current buffer is kept.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        let len = buffer_len(width, height)?;
        self.width = width;
        self.height = height;
        self.color = vec![Vec3::ZERO; len];
        self.depth = vec![f32::INFINITY; len];
        Ok(())
    }

    /// Draws the frame. Opaque materials go first so that translucent glow
    /// composites over them.
    pub fn render(&mut self, scene: &SceneContext, frame: &FrameSnapshot) -> RenderStats {
        self.color.fill(frame.background);
        self.depth.fill(f32::INFINITY);

        let (translucent, opaque): (Vec<&DrawParams>, Vec<&DrawParams>) = frame
            .draws
            .iter()
            .partition(|draw| draw.translucent);

        let mut stats = RenderStats::default();
        for draw in opaque.into_iter().chain(translucent) {
            let Some(drawable) = scene.drawables.get(draw.drawable) else {
                continue;
            };
            self.draw_mesh(&drawable.mesh, draw, frame.projection, &mut stats);
        }
        debug!(
            "frame {}: {} triangles, {} fragments",
            frame.frame, stats.triangles, stats.fragments
        );
        stats
    }

    fn draw_mesh(
        &mut self,
        mesh: &Mesh,
        draw: &DrawParams,
        projection: Mat4,
        stats: &mut RenderStats,
    ) {
        let vertices: Vec<ShadedVertex> = (0..mesh.vertex_count())
            .map(|index| {
                let (position, normal) = mesh.vertex(index);
                let (position, normal) = match &draw.wave {
                    Some(wave) => displace(position, normal, draw.params.time, wave),
                    None => (position, normal),
                };
                let view_position = draw.model_view.transform_point3(position);
                ShadedVertex {
                    clip: projection * view_position.extend(1.0),
                    view_position,
                    normal: (draw.normal_matrix * normal).normalize_or_zero(),
                }
            })
            .collect();

        for triangle in mesh.triangles() {
            let corners = triangle.map(|index| &vertices[index as usize]);
            self.raster_triangle(corners, draw, stats);
        }
    }

    fn raster_triangle(
        &mut self,
        corners: [&ShadedVertex; 3],
        draw: &DrawParams,
        stats: &mut RenderStats,
    ) {
        // No clipping: triangles crossing the camera plane are dropped.
        if corners.iter().any(|vertex| vertex.clip.w <= MIN_CLIP_W) {
            return;
        }
        let (width, height) = (self.width as f32, self.height as f32);
        let screen = corners.map(|vertex| {
            let ndc = vertex.clip.xyz() / vertex.clip.w;
            Vec3::new(
                (ndc.x * 0.5 + 0.5) * width,
                (0.5 - ndc.y * 0.5) * height,
                ndc.z,
            )
        });
        let [s0, s1, s2] = screen.map(|s| s.truncate());
        // Screen y points down, so counter-clockwise front faces have a
        // negative area. Back faces and degenerate triangles are culled.
        let area = edge(s0, s1, s2);
        if area >= -f32::EPSILON {
            return;
        }

        let min = s0.min(s1).min(s2).floor().max(Vec2::ZERO);
        let max = s0
            .max(s1)
            .max(s2)
            .ceil()
            .min(Vec2::new(width - 1.0, height - 1.0));
        if min.x > max.x || min.y > max.y {
            return;
        }
        stats.triangles += 1;

        let inv_w = Vec3::new(
            1.0 / corners[0].clip.w,
            1.0 / corners[1].clip.w,
            1.0 / corners[2].clip.w,
        );

        for y in min.y as u32..=max.y as u32 {
            for x in min.x as u32..=max.x as u32 {
                let sample = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let weights = Vec3::new(
                    edge(s1, s2, sample),
                    edge(s2, s0, sample),
                    edge(s0, s1, sample),
                ) / area;
                if weights.min_element() < 0.0 {
                    continue;
                }
                let depth = weights.dot(Vec3::new(screen[0].z, screen[1].z, screen[2].z));
                let index = (y * self.width + x) as usize;
                if !(0.0..=1.0).contains(&depth) || depth >= self.depth[index] {
                    continue;
                }

                let perspective = weights * inv_w;
                let perspective = perspective / perspective.element_sum();
                let position = corners[0].view_position * perspective.x
                    + corners[1].view_position * perspective.y
                    + corners[2].view_position * perspective.z;
                let normal = corners[0].normal * perspective.x
                    + corners[1].normal * perspective.y
                    + corners[2].normal * perspective.z;

                let color = draw
                    .model
                    .evaluate(&SurfacePoint::new(position, normal), &draw.params);
                self.color[index] = color.over(self.color[index]);
                self.depth[index] = depth;
                stats.fragments += 1;
            }
        }
    }

    /// Clamped 8-bit color of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(to_rgba8(self.color[(y * self.width + x) as usize]))
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            Rgba(to_rgba8(self.color[(y * self.width + x) as usize]))
        })
    }

    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_image()
            .save_with_format(path, ImageFormat::Png)
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

pub fn to_rgba8(color: Vec3) -> [u8; 4] {
    let scaled = color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0 + Vec3::splat(0.5);
    [scaled.x as u8, scaled.y as u8, scaled.z as u8, 255]
}

fn buffer_len(width: u32, height: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(anyhow!("framebuffer has zero area"));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(anyhow!(
            "framebuffer {width}x{height} exceeds {MAX_DIMENSION} pixels per side"
        ));
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| anyhow!("framebuffer {width}x{height} is too large"))
}

fn edge(a: Vec2, b: Vec2, point: Vec2) -> f32 {
    (b - a).perp_dot(point - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ShowcaseConfig, Variant};
    use crate::font::FontSource;
    use crate::input::SceneAction;
    use crate::shading::pulse;

    const WIDTH: u32 = 320;
    const HEIGHT: u32 = 240;

    fn rendered() -> (SceneContext, FrameSnapshot, SoftwareRenderer, RenderStats) {
        let config = ShowcaseConfig::default();
        let mut scene =
            pollster::block_on(SceneContext::assemble(&config, &FontSource::Builtin)).unwrap();
        scene.resize(WIDTH, HEIGHT);
        let frame = scene.advance_frame();
        let mut renderer = SoftwareRenderer::new(WIDTH, HEIGHT).unwrap();
        let stats = renderer.render(&scene, &frame);
        (scene, frame, renderer, stats)
    }

    fn project(frame: &FrameSnapshot, world: Vec3) -> (u32, u32) {
        let clip = frame.view_projection() * world.extend(1.0);
        let ndc = clip.xyz() / clip.w;
        (
            ((ndc.x * 0.5 + 0.5) * WIDTH as f32) as u32,
            ((0.5 - ndc.y * 0.5) * HEIGHT as f32) as u32,
        )
    }

    #[test]
    fn zero_area_is_rejected() {
        assert!(SoftwareRenderer::new(0, 10).is_err());
    }

    #[test]
    fn corners_keep_background() {
        let (scene, _, renderer, stats) = rendered();
        let background = to_rgba8(scene.background);
        assert_eq!(renderer.pixel(0, 0), Some(background));
        assert_eq!(renderer.pixel(WIDTH - 1, HEIGHT - 1), Some(background));
        assert!(stats.triangles > 0 && stats.fragments > 0);
    }

    #[test]
    fn cube_glow_composites_over_background() {
        let (scene, frame, renderer, _) = rendered();
        let config = ShowcaseConfig::default();
        let expected = to_rgba8(pulse(config.cube_color, frame.time, &config.glow).over(scene.background));
        let actual = renderer.pixel(WIDTH / 2, HEIGHT / 2).unwrap();
        for channel in 0..3 {
            assert!((actual[channel] as i32 - expected[channel] as i32).abs() <= 1);
        }
        assert!(actual[0] > actual[1] && actual[1] > actual[2]);
    }

    #[test]
    fn letter_is_drawn_where_projected() {
        let (scene, frame, renderer, _) = rendered();
        let (x, y) = project(&frame, Vec3::new(-4.0, 1.0, 0.2));
        assert_ne!(renderer.pixel(x, y), Some(to_rgba8(scene.background)));
    }

    #[test]
    fn out_of_bounds_pixels_are_none() {
        let (_, _, renderer, _) = rendered();
        assert_eq!(renderer.pixel(WIDTH, 0), None);
        assert_eq!(renderer.to_image().dimensions(), (WIDTH, HEIGHT));
    }

    #[test]
    fn resize_rejects_zero_and_oversized_areas() {
        let mut renderer = SoftwareRenderer::new(8, 8).unwrap();
        assert!(renderer.resize(0, 4).is_err());
        assert!(renderer.resize(70_000, 70_000).is_err());
        assert_eq!(renderer.size(), (8, 8));
        renderer.resize(16, 4).unwrap();
        assert_eq!(renderer.size(), (16, 4));
    }

    #[test]
    fn oversized_framebuffer_is_rejected() {
        assert!(SoftwareRenderer::new(70_000, 70_000).is_err());
        assert!(SoftwareRenderer::new(u32::MAX, 1).is_err());
        assert!(SoftwareRenderer::new(MAX_DIMENSION, 1).is_ok());
    }

    #[test]
    fn raised_cube_is_a_single_composite() {
        let config = ShowcaseConfig::default();
        let mut scene = SceneContext::new(&config).unwrap();
        scene.apply(SceneAction::MoveCube(Vec3::Y * 3.0));
        scene.resize(WIDTH, HEIGHT);
        let frame = scene.advance_frame();
        let mut renderer = SoftwareRenderer::new(WIDTH, HEIGHT).unwrap();
        renderer.render(&scene, &frame);

        let background = to_rgba8(scene.background);
        let expected =
            to_rgba8(pulse(config.cube_color, frame.time, &config.glow).over(scene.background));
        let mut covered = 0;
        for y in 0..HEIGHT {
            for x in 0..WIDTH {
                let pixel = renderer.pixel(x, y).unwrap();
                if pixel == background {
                    continue;
                }
                covered += 1;
                for channel in 0..3 {
                    assert!(
                        (pixel[channel] as i32 - expected[channel] as i32).abs() <= 1,
                        "pixel ({x}, {y}) is {pixel:?}, expected {expected:?}"
                    );
                }
            }
        }
        assert!(covered > 0);
    }

    #[test]
    fn back_faces_are_culled() {
        let config = ShowcaseConfig::default();
        let mut scene = SceneContext::new(&config).unwrap();
        scene.resize(WIDTH, HEIGHT);
        let frame = scene.advance_frame();
        let mut renderer = SoftwareRenderer::new(WIDTH, HEIGHT).unwrap();
        let stats = renderer.render(&scene, &frame);
        // Seen head-on only the +Z face survives.
        assert_eq!(stats.triangles, 2);
    }

    fn region(renderer: &SoftwareRenderer, frame: &FrameSnapshot, min: Vec3, max: Vec3) -> Vec<[u8; 4]> {
        let (x0, y1) = project(frame, min);
        let (x1, y0) = project(frame, max);
        let mut pixels = Vec::new();
        for y in y0..=y1.min(HEIGHT - 1) {
            for x in x0..=x1.min(WIDTH - 1) {
                pixels.extend(renderer.pixel(x, y));
            }
        }
        pixels
    }

    fn number_region_at_two_times(variant: Variant) -> (Vec<[u8; 4]>, Vec<[u8; 4]>) {
        let config = ShowcaseConfig {
            variant,
            time_step: 1.0,
            ..ShowcaseConfig::default()
        };
        let mut scene =
            pollster::block_on(SceneContext::assemble(&config, &FontSource::Builtin)).unwrap();
        scene.resize(WIDTH, HEIGHT);
        let mut renderer = SoftwareRenderer::new(WIDTH, HEIGHT).unwrap();
        let (min, max) = (Vec3::new(1.8, -0.4, 0.2), Vec3::new(4.2, 2.4, 0.2));

        let first = scene.advance_frame();
        renderer.render(&scene, &first);
        let before = region(&renderer, &first, min, max);
        let second = scene.advance_frame();
        renderer.render(&scene, &second);
        let after = region(&renderer, &second, min, max);
        (before, after)
    }

    #[test]
    fn wave_moves_number_pixels_over_time() {
        let (before, after) = number_region_at_two_times(Variant::Wave);
        assert_eq!(before.len(), after.len());
        assert_ne!(before, after);
    }

    #[test]
    fn lit_number_is_static_over_time() {
        let (before, after) = number_region_at_two_times(Variant::Lit);
        assert!(!before.is_empty());
        assert_eq!(before, after);
    }
}
