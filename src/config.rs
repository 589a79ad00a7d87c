use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::material::ambient_from_nrp;
use crate::shading::{GlowParams, WaveParams};
use crate::text::TextOptions;

/// Which flavour of the showcase is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Both glyphs use direct lighting.
    #[default]
    Lit,
    /// The number glyph additionally ripples with the vertex wave.
    Wave,
    /// The letter glyph is drawn with a flat color.
    Flat,
}

impl FromStr for Variant {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "lit" => Ok(Self::Lit),
            "wave" => Ok(Self::Wave),
            "flat" => Ok(Self::Flat),
            other => Err(anyhow!(
                "unknown variant {other:?}; expected lit, wave or flat"
            )),
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lit => "lit",
            Self::Wave => "wave",
            Self::Flat => "flat",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub position: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 7.0),
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextConfig {
    pub letter: String,
    pub number: String,
    pub letter_position: Vec3,
    pub number_position: Vec3,
    pub options: TextOptions,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            letter: "N".to_string(),
            number: "1".to_string(),
            letter_position: Vec3::new(-4.0, 0.0, 0.0),
            number_position: Vec3::new(2.0, 0.0, 0.0),
            options: TextOptions::default(),
        }
    }
}

/// Everything needed to assemble and animate the showcase scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowcaseConfig {
    /// Background as a `#rrggbb` string.
    pub background: String,
    pub camera: CameraConfig,
    pub cube_size: f32,
    pub cube_color: Vec3,
    pub glow: GlowParams,
    pub wave: WaveParams,
    pub flat_color: Vec3,
    pub text: TextConfig,
    /// Seed of the ambient level, see [`ambient_from_nrp`].
    pub nrp: u32,
    /// Distance moved per key press.
    pub key_step: f32,
    /// Time added per rendered frame.
    pub time_step: f32,
    pub variant: Variant,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            background: "#282929".to_string(),
            camera: CameraConfig::default(),
            cube_size: 0.5,
            cube_color: Vec3::new(1.0, 0.8, 0.0),
            glow: GlowParams::default(),
            wave: WaveParams::default(),
            flat_color: Vec3::splat(0.9),
            text: TextConfig::default(),
            nrp: 291,
            key_step: 0.2,
            time_step: 1.0 / 60.0,
            variant: Variant::default(),
        }
    }
}

impl ShowcaseConfig {
    pub fn ambient_intensity(&self) -> f32 {
        ambient_from_nrp(self.nrp)
    }

    pub fn background_color(&self) -> Result<Vec3> {
        parse_hex_color(&self.background)
    }
}

/// Parses `#rrggbb` (leading `#` optional) into linear 0..1 channels.
pub fn parse_hex_color(value: &str) -> Result<Vec3> {
    let digits = value.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(anyhow!("color {value:?} is not of the form #rrggbb"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map(|byte| byte as f32 / 255.0)
            .map_err(|err| anyhow!("color {value:?} has an invalid channel: {err}"))
    };
    Ok(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_showcase() {
        let config = ShowcaseConfig::default();
        assert!((config.ambient_intensity() - 0.491).abs() < 1e-6);
        assert_eq!(config.camera.position.z, 7.0);
        assert_eq!(config.text.letter, "N");
        assert_eq!(config.variant, Variant::Lit);
    }

    #[test]
    fn parses_background_hex() {
        let color = parse_hex_color("#282929").unwrap();
        assert_eq!(color, Vec3::new(40.0 / 255.0, 41.0 / 255.0, 41.0 / 255.0));
        assert_eq!(parse_hex_color("ffffff").unwrap(), Vec3::ONE);
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#gg0000").is_err());
    }

    #[test]
    fn variants_round_trip_through_names() {
        for variant in [Variant::Lit, Variant::Wave, Variant::Flat] {
            assert_eq!(variant.to_string().parse::<Variant>().unwrap(), variant);
        }
        assert_eq!("WAVE".parse::<Variant>().unwrap(), Variant::Wave);
        assert!("glossy".parse::<Variant>().is_err());
    }
}
