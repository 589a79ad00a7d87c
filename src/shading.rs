//! Per-point shading model shared by the software and GPU renderers.
//!
//! Every function here is a pure computation over a [`SurfacePoint`] and a
//! snapshot of [`ShadingParameters`]. Vectors are expected in view space,
//! with the camera sitting at the origin.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Quadratic falloff coefficient used by [`attenuation`].
pub const ATTENUATION_FALLOFF: f32 = 0.1;

/// Linear RGB color plus coverage. Channels are left unclamped; the output
/// stage is responsible for clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub rgb: Vec3,
    pub alpha: f32,
}

impl Color {
    pub const fn new(rgb: Vec3, alpha: f32) -> Self {
        Self { rgb, alpha }
    }

    pub const fn opaque(rgb: Vec3) -> Self {
        Self { rgb, alpha: 1.0 }
    }

    /// Composites this color over `destination` using straight alpha.
    pub fn over(self, destination: Vec3) -> Vec3 {
        let alpha = self.alpha.clamp(0.0, 1.0);
        let source = self.rgb.clamp(Vec3::ZERO, Vec3::ONE);
        source * alpha + destination * (1.0 - alpha)
    }
}

/// Uniform inputs of one material for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadingParameters {
    pub light_position: Vec3,
    pub light_intensity: f32,
    pub ambient_intensity: f32,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
    pub time: f32,
}

impl Default for ShadingParameters {
    fn default() -> Self {
        Self {
            light_position: Vec3::ZERO,
            light_intensity: 1.0,
            ambient_intensity: 0.0,
            diffuse_color: Vec3::ONE,
            specular_color: Vec3::ONE,
            shininess: 32.0,
            time: 0.0,
        }
    }
}

/// A rasterized point on a surface, in the shading reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
}

impl SurfacePoint {
    pub fn new(position: Vec3, normal: Vec3) -> Self {
        Self { position, normal }
    }
}

/// Constants of the self-illuminated pulse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlowParams {
    pub frequency: f32,
    pub amplitude: f32,
    pub bias: f32,
    pub exponent: f32,
}

impl Default for GlowParams {
    fn default() -> Self {
        Self {
            frequency: 2.0,
            amplitude: 0.6,
            bias: 0.5,
            exponent: 3.0,
        }
    }
}

/// Constants of the vertex wave applied before shading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    pub amplitude: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self { amplitude: 0.1 }
    }
}

/// The shading behaviours a material can select.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShadingModel {
    /// Ambient plus attenuated diffuse and specular from one point light.
    DirectLighting,
    /// Self-illuminated pulse; ignores the light entirely.
    PulsingGlow { base_color: Vec3, glow: GlowParams },
    /// Constant color.
    FlatColor(Vec3),
}

impl ShadingModel {
    /// Short identifier used in logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DirectLighting => "direct-lighting",
            Self::PulsingGlow { .. } => "pulsing-glow",
            Self::FlatColor(_) => "flat-color",
        }
    }

    pub fn evaluate(&self, point: &SurfacePoint, params: &ShadingParameters) -> Color {
        match self {
            Self::DirectLighting => shade(point, params),
            Self::PulsingGlow { base_color, glow } => pulse(*base_color, params.time, glow),
            Self::FlatColor(color) => Color::opaque(*color),
        }
    }
}

/// Light falloff for a point light at `distance`.
pub fn attenuation(light_intensity: f32, distance: f32) -> f32 {
    light_intensity / (1.0 + ATTENUATION_FALLOFF * distance * distance)
}

/// Reflects the incident vector `incident` about `normal`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

/// Direct illumination from a single point light with no shadowing.
pub fn shade(point: &SurfacePoint, params: &ShadingParameters) -> Color {
    let normal = point.normal.normalize_or_zero();
    let to_light = params.light_position - point.position;
    let light_dir = to_light.normalize_or_zero();
    let falloff = attenuation(params.light_intensity, to_light.length());

    let ambient = params.ambient_intensity * params.diffuse_color;

    let lambert = normal.dot(light_dir).max(0.0);
    let diffuse = lambert * params.diffuse_color * falloff;

    // A surface facing away from the light gets no highlight.
    let specular = if lambert > 0.0 {
        let view_dir = (-point.position).normalize_or_zero();
        let reflect_dir = reflect(-light_dir, normal);
        let highlight = view_dir.dot(reflect_dir).max(0.0).powf(params.shininess);
        highlight * params.specular_color * falloff
    } else {
        Vec3::ZERO
    };

    Color::opaque(ambient + diffuse + specular)
}

/// Brightness of the glow pulse at `time`.
///
/// The oscillating base is clamped at zero before exponentiation so that a
/// configuration with `bias < amplitude` dims to black instead of producing
/// NaN for fractional exponents.
pub fn glow_intensity(time: f32, glow: &GlowParams) -> f32 {
    let base = (time * glow.frequency).sin() * glow.amplitude + glow.bias;
    base.max(0.0).powf(glow.exponent)
}

/// Self-illuminated color of the glow pulse; coverage tracks brightness.
pub fn pulse(base_color: Vec3, time: f32, glow: &GlowParams) -> Color {
    let intensity = glow_intensity(time, glow);
    Color::new(base_color * intensity, intensity)
}

/// Height of a vertex after the wave is applied: `y + sin(time + x) * amplitude`.
///
/// The phase includes `x`, so at `time == 0` the mesh is already offset by
/// `sin(x) * amplitude`. Only vertices with `sin(x) == 0` keep their height.
pub fn displaced_y(original_x: f32, original_y: f32, time: f32, amplitude: f32) -> f32 {
    original_y + (time + original_x).sin() * amplitude
}

/// Applies the wave to an object-space vertex, returning the displaced
/// position and the matching normal.
pub fn displace(position: Vec3, normal: Vec3, time: f32, wave: &WaveParams) -> (Vec3, Vec3) {
    let phase = time + position.x;
    let displaced = Vec3::new(
        position.x,
        displaced_y(position.x, position.y, time, wave.amplitude),
        position.z,
    );
    // Inverse-transpose of the displacement Jacobian.
    let slope = phase.cos() * wave.amplitude;
    let bent = Vec3::new(normal.x - slope * normal.y, normal.y, normal.z);
    (displaced, bent.normalize_or_zero())
}
