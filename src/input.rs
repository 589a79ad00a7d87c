use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifier for a keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
}

impl KeyCode {
    /// Parses `Escape`/`Esc` or a single ASCII letter, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("escape") || name.eq_ignore_ascii_case("esc") {
            return Some(Self::Named(NamedKey::Escape));
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if ch.is_ascii_alphabetic() => {
                Some(Self::Character(ch.to_ascii_uppercase()))
            }
            _ => None,
        }
    }
}

/// Non-character keys the showcase reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Escape,
}

/// Scene change triggered by a key press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneAction {
    /// Translate the glowing cube (and with it the light).
    MoveCube(Vec3),
    /// Translate the camera.
    PanCamera(Vec3),
    Quit,
}

/// Maps a key press to its scene action. `w`/`s` raise and lower the cube,
/// `a`/`d` pan the camera horizontally.
pub fn action_for_key(key: KeyCode, step: f32) -> Option<SceneAction> {
    match key {
        KeyCode::Character('W') => Some(SceneAction::MoveCube(Vec3::Y * step)),
        KeyCode::Character('S') => Some(SceneAction::MoveCube(Vec3::NEG_Y * step)),
        KeyCode::Character('A') => Some(SceneAction::PanCamera(Vec3::NEG_X * step)),
        KeyCode::Character('D') => Some(SceneAction::PanCamera(Vec3::X * step)),
        KeyCode::Named(NamedKey::Escape) => Some(SceneAction::Quit),
        _ => None,
    }
}

/// Parses a comma separated list of key names, e.g. `w,w,d`.
pub fn parse_key_list(list: &str) -> Option<Vec<KeyCode>> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(KeyCode::from_name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_escape_and_letter_keys() {
        assert_eq!(
            KeyCode::from_name("Escape"),
            Some(KeyCode::Named(NamedKey::Escape))
        );
        assert_eq!(KeyCode::from_name("w"), Some(KeyCode::Character('W')));
        assert_eq!(KeyCode::from_name("esc"), Some(KeyCode::Named(NamedKey::Escape)));
        assert_eq!(KeyCode::from_name("7"), None);
        assert_eq!(KeyCode::from_name("Space"), None);
        assert_eq!(KeyCode::from_name("ww"), None);
        assert_eq!(KeyCode::from_name("?"), None);
    }

    #[test]
    fn wasd_maps_to_cube_and_camera_moves() {
        assert_eq!(
            action_for_key(KeyCode::Character('W'), 0.2),
            Some(SceneAction::MoveCube(Vec3::new(0.0, 0.2, 0.0)))
        );
        assert_eq!(
            action_for_key(KeyCode::Character('S'), 0.2),
            Some(SceneAction::MoveCube(Vec3::new(0.0, -0.2, 0.0)))
        );
        assert_eq!(
            action_for_key(KeyCode::Character('A'), 0.2),
            Some(SceneAction::PanCamera(Vec3::new(-0.2, 0.0, 0.0)))
        );
        assert_eq!(
            action_for_key(KeyCode::Character('D'), 0.2),
            Some(SceneAction::PanCamera(Vec3::new(0.2, 0.0, 0.0)))
        );
        assert_eq!(action_for_key(KeyCode::Character('Q'), 0.2), None);
    }

    #[test]
    fn key_lists_reject_unknown_names() {
        assert_eq!(
            parse_key_list("w, d,,s"),
            Some(vec![
                KeyCode::Character('W'),
                KeyCode::Character('D'),
                KeyCode::Character('S')
            ])
        );
        assert_eq!(parse_key_list("w,??"), None);
    }
}
