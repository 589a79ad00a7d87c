use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::shading::{GlowParams, ShadingModel, ShadingParameters, WaveParams};

/// Ambient level derived from the `nrp` configuration value, clamped to `[0, 1]`.
pub fn ambient_from_nrp(nrp: u32) -> f32 {
    (nrp.saturating_add(200) as f32 / 1000.0).clamp(0.0, 1.0)
}

/// Shading model and uniforms attached to one drawable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub model: ShadingModel,
    pub params: ShadingParameters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wave: Option<WaveParams>,
}

impl Material {
    /// Matte plastic used for the letter glyph.
    pub fn letter(ambient_intensity: f32) -> Self {
        Self {
            name: "letter".to_string(),
            model: ShadingModel::DirectLighting,
            params: ShadingParameters {
                light_intensity: 2.0,
                ambient_intensity,
                diffuse_color: Vec3::splat(0.2),
                specular_color: Vec3::ONE,
                shininess: 70.0,
                ..ShadingParameters::default()
            },
            wave: None,
        }
    }

    /// Bright metal used for the number glyph.
    pub fn number(ambient_intensity: f32) -> Self {
        Self {
            name: "number".to_string(),
            model: ShadingModel::DirectLighting,
            params: ShadingParameters {
                light_intensity: 3.0,
                ambient_intensity,
                diffuse_color: Vec3::splat(0.95),
                specular_color: Vec3::ONE,
                shininess: 200.0,
                ..ShadingParameters::default()
            },
            wave: None,
        }
    }

    /// Self-lit pulsing material of the central cube.
    pub fn glow(base_color: Vec3, glow: GlowParams) -> Self {
        Self {
            name: "glow".to_string(),
            model: ShadingModel::PulsingGlow { base_color, glow },
            params: ShadingParameters::default(),
            wave: None,
        }
    }

    pub fn with_wave(mut self, wave: WaveParams) -> Self {
        self.wave = Some(wave);
        self
    }

    /// Replaces the output with a constant color. The lighting uniforms are
    /// kept so that the material can be switched back to direct lighting.
    pub fn flattened(mut self, color: Vec3) -> Self {
        self.model = ShadingModel::FlatColor(color);
        self
    }

    pub fn is_translucent(&self) -> bool {
        matches!(self.model, ShadingModel::PulsingGlow { .. })
    }
}

/// GPU layout of a [`Material`], mirrored by the `Material` struct in WGSL.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    /// xyz: light position (view space), w: light intensity.
    pub light: [f32; 4],
    /// rgb: diffuse color, w: ambient intensity.
    pub diffuse: [f32; 4],
    /// rgb: specular color, w: shininess.
    pub specular: [f32; 4],
    /// rgb: glow base or flat color.
    pub base_color: [f32; 4],
    /// frequency, amplitude, bias, exponent.
    pub glow: [f32; 4],
    /// x: model selector, y: time, z: wave amplitude (zero disables).
    pub mode: [f32; 4],
}

impl MaterialUniform {
    pub const MODE_DIRECT: f32 = 0.0;
    pub const MODE_GLOW: f32 = 1.0;
    pub const MODE_FLAT: f32 = 2.0;

    pub fn new(
        model: &ShadingModel,
        params: &ShadingParameters,
        wave: Option<&WaveParams>,
    ) -> Self {
        let (selector, base_color, glow) = match model {
            ShadingModel::DirectLighting => (Self::MODE_DIRECT, Vec3::ZERO, GlowParams::default()),
            ShadingModel::PulsingGlow { base_color, glow } => (Self::MODE_GLOW, *base_color, *glow),
            ShadingModel::FlatColor(color) => (Self::MODE_FLAT, *color, GlowParams::default()),
        };
        Self {
            light: params.light_position.extend(params.light_intensity).into(),
            diffuse: params.diffuse_color.extend(params.ambient_intensity).into(),
            specular: params.specular_color.extend(params.shininess).into(),
            base_color: base_color.extend(1.0).into(),
            glow: [glow.frequency, glow.amplitude, glow.bias, glow.exponent],
            mode: [
                selector,
                params.time,
                wave.map_or(0.0, |wave| wave.amplitude),
                0.0,
            ],
        }
    }
}
