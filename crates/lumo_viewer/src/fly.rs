//! Keyboard-style fly camera.
//!
//! Up/down move along the view direction, left/right turn about the camera's
//! up axis. Input comes from a per-frame script instead of an event loop.

use std::fmt;
use std::str::FromStr;

use lumo_math::Quat;
use lumo_renderer::{Camera, RenderResult};
use serde::{Deserialize, Serialize};

/// Movement speed in world units per second.
pub const MOVE_SPEED: f32 = 1.5;

/// Turn speed in degrees per second.
pub const ROTATION_SPEED: f32 = 60.0;

/// Distance of the look-at target ahead of the camera after a move.
const LOOK_DISTANCE: f32 = 10.0;

/// Keys held during one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlyInput {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
}

impl FlyInput {
    pub fn is_idle(&self) -> bool {
        *self == FlyInput::default()
    }
}

impl FromStr for FlyInput {
    type Err = String;

    /// Parse `+`-separated key names: `up`, `down`, `left`, `right` or `none`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut input = FlyInput::default();
        for key in s.split('+').map(str::trim) {
            match key.to_ascii_lowercase().as_str() {
                "up" => input.forward = true,
                "down" => input.backward = true,
                "left" => input.turn_left = true,
                "right" => input.turn_right = true,
                "none" | "" => {}
                other => return Err(format!("unknown key `{}`", other)),
            }
        }
        Ok(input)
    }
}

impl fmt::Display for FlyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = [
            (self.forward, "up"),
            (self.backward, "down"),
            (self.turn_left, "left"),
            (self.turn_right, "right"),
        ]
        .iter()
        .filter(|(held, _)| *held)
        .map(|(_, name)| *name)
        .collect();

        if keys.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&keys.join("+"))
        }
    }
}

/// Applies [`FlyInput`] to a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyCamera {
    pub move_speed: f32,
    /// Degrees per second
    pub rotation_speed: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            move_speed: MOVE_SPEED,
            rotation_speed: ROTATION_SPEED,
        }
    }
}

impl FlyCamera {
    /// Move and turn `camera` for `seconds` of held input.
    ///
    /// Down wins over up and right over left when both are held.
    pub fn update(&self, camera: &mut Camera, input: FlyInput, seconds: f32) -> RenderResult<()> {
        let mut displace = 0.0;
        if input.forward {
            displace = self.move_speed * seconds;
        }
        if input.backward {
            displace = -self.move_speed * seconds;
        }

        let mut rotate = 0.0;
        if input.turn_left {
            rotate = -self.rotation_speed * seconds;
        }
        if input.turn_right {
            rotate = self.rotation_speed * seconds;
        }

        if displace == 0.0 && rotate == 0.0 {
            return Ok(());
        }

        let rotation = Quat::from_axis_angle(camera.up(), f32::to_radians(rotate));
        let direction = rotation * camera.forward();
        let position = camera.position() + direction * displace;

        // Aim from the moved eye so the target stays ahead for any step length
        camera.set_orientation(position, position + direction * LOOK_DISTANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumo_math::Vec3;

    fn camera() -> Camera {
        let mut camera = Camera::new();
        camera
            .set_orientation(Vec3::new(0.0, 0.0, -75.0), Vec3::ZERO)
            .unwrap();
        camera
    }

    #[test]
    fn test_parse_input() {
        let input: FlyInput = "up+right".parse().unwrap();
        assert!(input.forward && input.turn_right);
        assert!(!input.backward && !input.turn_left);

        assert!("none".parse::<FlyInput>().unwrap().is_idle());
        assert!("jump".parse::<FlyInput>().is_err());
        assert_eq!(input.to_string(), "up+right");
        assert_eq!(FlyInput::default().to_string(), "none");
    }

    #[test]
    fn test_idle_input_keeps_camera() {
        let mut camera = camera();
        let before = camera.clone();

        FlyCamera::default()
            .update(&mut camera, FlyInput::default(), 1.0)
            .unwrap();
        assert_eq!(camera, before);
    }

    #[test]
    fn test_forward_moves_along_view() {
        let mut camera = camera();
        let input = FlyInput {
            forward: true,
            ..Default::default()
        };

        FlyCamera::default().update(&mut camera, input, 2.0).unwrap();
        assert!((camera.position() - Vec3::new(0.0, 0.0, -72.0)).length() < 1e-4);
        assert!((camera.forward() - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_long_step_keeps_target_ahead() {
        let mut camera = camera();
        let input = FlyInput {
            forward: true,
            ..Default::default()
        };

        // 15 units in one step, further than the look-at distance
        FlyCamera::default().update(&mut camera, input, 10.0).unwrap();
        assert!((camera.position() - Vec3::new(0.0, 0.0, -60.0)).length() < 1e-3);
        assert!((camera.look_at() - Vec3::new(0.0, 0.0, -50.0)).length() < 1e-3);

        FlyCamera::default().update(&mut camera, input, 10.0).unwrap();
        assert!((camera.forward() - Vec3::Z).length() < 1e-5);
        assert!((camera.position() - Vec3::new(0.0, 0.0, -45.0)).length() < 1e-3);
    }

    #[test]
    fn test_turn_right_rotates_about_up() {
        let mut camera = camera();
        let input = FlyInput {
            turn_right: true,
            ..Default::default()
        };

        // 1.5s at 60 deg/s is a quarter turn
        FlyCamera::default().update(&mut camera, input, 1.5).unwrap();
        assert!((camera.forward() - Vec3::X).length() < 1e-4);
        assert!((camera.position() - Vec3::new(0.0, 0.0, -75.0)).length() < 1e-4);
    }

    #[test]
    fn test_backward_wins_over_forward() {
        let mut camera = camera();
        let input = FlyInput {
            forward: true,
            backward: true,
            ..Default::default()
        };

        FlyCamera::default().update(&mut camera, input, 1.0).unwrap();
        assert!((camera.position().z + 76.5).abs() < 1e-4);
    }
}
