use anyhow::{Context, Result};
use glam::{Mat3, Mat4, Vec3};
use log::{debug, info};

use crate::config::{ShowcaseConfig, Variant};
use crate::font::{load_font, FontSource, StrokeFont};
use crate::input::SceneAction;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::shading::{ShadingModel, ShadingParameters, WaveParams};
use crate::text::build_text_mesh;

pub const CUBE: &str = "cube";
pub const LETTER: &str = "letter";
pub const NUMBER: &str = "number";

/// Perspective camera looking down -Z.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn view(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, Vec3::NEG_Z, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect.max(0.01),
            self.near,
            self.far,
        )
    }

    /// Refreshes the aspect ratio after a viewport resize.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }
}

/// Point light carried by the cube. Its strength is set per material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
}

/// Mesh placed in the scene with its material.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub name: String,
    pub mesh: Mesh,
    pub position: Vec3,
    pub material: Material,
}

impl Drawable {
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
    }
}

/// Per-drawable state frozen for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawParams {
    /// Index into [`SceneContext::drawables`].
    pub drawable: usize,
    pub model_view: Mat4,
    pub normal_matrix: Mat3,
    pub model: ShadingModel,
    pub params: ShadingParameters,
    pub wave: Option<WaveParams>,
    /// Drawn after the opaque draws and blended over them.
    pub translucent: bool,
}

/// Read-only view of everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub time: f32,
    pub background: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
    pub draws: Vec<DrawParams>,
}

impl FrameSnapshot {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Owns the scene state driven by the render loop.
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub background: Vec3,
    pub camera: Camera,
    pub light: PointLight,
    pub drawables: Vec<Drawable>,
    time: f32,
    time_step: f32,
    frame: u64,
}

impl SceneContext {
    /// Builds the camera, light and glowing cube. Text is added separately
    /// once a font is available.
    pub fn new(config: &ShowcaseConfig) -> Result<Self> {
        let background = config
            .background_color()
            .context("invalid background color")?;
        let camera = Camera {
            position: config.camera.position,
            fov_degrees: config.camera.fov_degrees,
            aspect: 1.0,
            near: config.camera.near,
            far: config.camera.far,
        };
        let cube = Drawable {
            name: CUBE.to_string(),
            mesh: Mesh::cuboid(Vec3::splat(config.cube_size)),
            position: Vec3::ZERO,
            material: Material::glow(config.cube_color, config.glow),
        };
        let light = PointLight {
            position: cube.position,
        };
        Ok(Self {
            background,
            camera,
            light,
            drawables: vec![cube],
            time: 0.0,
            time_step: config.time_step,
            frame: 0,
        })
    }

    /// Loads the font and builds the complete showcase.
    pub async fn assemble(config: &ShowcaseConfig, source: &FontSource) -> Result<Self> {
        let mut scene = Self::new(config)?;
        let font = load_font(source).await.context("failed to load font")?;
        scene.add_text(&font, config);
        info!(
            "assembled {} scene with {} drawables",
            config.variant,
            scene.drawables.len()
        );
        Ok(scene)
    }

    /// Adds the letter and number meshes with the variant's materials.
    pub fn add_text(&mut self, font: &StrokeFont, config: &ShowcaseConfig) {
        let ambient = config.ambient_intensity();
        let mut letter = Material::letter(ambient);
        let mut number = Material::number(ambient);
        match config.variant {
            Variant::Lit => {}
            Variant::Wave => number = number.with_wave(config.wave),
            Variant::Flat => letter = letter.flattened(config.flat_color),
        }

        let text = &config.text;
        for (name, content, position, material) in [
            (LETTER, &text.letter, text.letter_position, letter),
            (NUMBER, &text.number, text.number_position, number),
        ] {
            let mesh = build_text_mesh(font, content, &text.options);
            debug!(
                "{name} mesh for {content:?}: {} triangles",
                mesh.triangle_count()
            );
            self.drawables.push(Drawable {
                name: name.to_string(),
                mesh,
                position,
                material,
            });
        }
    }

    pub fn drawable(&self, name: &str) -> Option<&Drawable> {
        self.drawables.iter().find(|drawable| drawable.name == name)
    }

    fn drawable_mut(&mut self, name: &str) -> Option<&mut Drawable> {
        self.drawables
            .iter_mut()
            .find(|drawable| drawable.name == name)
    }

    pub fn cube_position(&self) -> Vec3 {
        self.drawable(CUBE)
            .map(|cube| cube.position)
            .unwrap_or(self.light.position)
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn apply(&mut self, action: SceneAction) {
        match action {
            SceneAction::MoveCube(offset) => {
                if let Some(cube) = self.drawable_mut(CUBE) {
                    cube.position += offset;
                }
            }
            SceneAction::PanCamera(offset) => self.camera.position += offset,
            SceneAction::Quit => {}
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
    }

    /// Advances time by one step, moves the light onto the cube and
    /// freezes the per-material uniforms for rendering.
    pub fn advance_frame(&mut self) -> FrameSnapshot {
        self.time += self.time_step;
        self.frame += 1;
        self.light.position = self.cube_position();

        let view = self.camera.view();
        let light_in_view = view.transform_point3(self.light.position);

        let mut draws = Vec::with_capacity(self.drawables.len());
        for (index, drawable) in self.drawables.iter_mut().enumerate() {
            let model_view = view * drawable.model_matrix();
            let material = &mut drawable.material;
            material.params.time = self.time;
            material.params.light_position = light_in_view;

            draws.push(DrawParams {
                drawable: index,
                model_view,
                normal_matrix: Mat3::from_mat4(model_view).inverse().transpose(),
                model: material.model,
                params: material.params,
                wave: material.wave,
                translucent: material.is_translucent(),
            });
        }

        FrameSnapshot {
            frame: self.frame,
            time: self.time,
            background: self.background,
            view,
            projection: self.camera.projection(),
            draws,
        }
    }
}
