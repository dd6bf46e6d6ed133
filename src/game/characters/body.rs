// Stance geometry: the physical capsule and the smoothed visual rig
//
// The capsule resizes instantly when the stance changes. The camera mount and
// the visual root follow with exponential damping and never feed back into
// collision.

use glam::Vec3;
use log::trace;

use super::config::MovementConfig;
use super::state::Stance;
use crate::core::math;
use crate::engine::physics::GroundMotor;

/// Resize the motor's capsule to the given height, resting on the feet
pub fn set_capsule_height(motor: &mut dyn GroundMotor, height: f32) {
    let radius = motor.capsule().radius;
    motor.set_capsule_dimensions(radius, height, height * 0.5);
}

/// Grow the capsule to standing height unless that would overlap geometry
///
/// On failure the capsule is shrunk back and false is returned.
pub fn try_stand_up(motor: &mut dyn GroundMotor, config: &MovementConfig) -> bool {
    set_capsule_height(motor, config.stand_height);

    let position = motor.transient_position();
    let rotation = motor.transient_rotation();
    let layers = motor.collidable_layers();
    let overlaps = motor.character_overlap(position, rotation, layers);
    if overlaps > 0 {
        trace!("Stand-up blocked by {} collider(s)", overlaps);
        set_capsule_height(motor, config.crouch_height);
        return false;
    }
    true
}

/// Cosmetic transforms that lag behind the capsule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyRig {
    /// Camera mount position relative to the character's feet
    camera_target: Vec3,
    /// Vertical scale of the visual root
    root_scale: Vec3,
}

impl BodyRig {
    /// Rig at rest for a standing character
    pub fn new(config: &MovementConfig) -> Self {
        Self {
            camera_target: Vec3::new(
                0.0,
                config.stand_height * config.stand_camera_target_height,
                0.0,
            ),
            root_scale: Vec3::ONE,
        }
    }

    pub fn camera_target(&self) -> Vec3 {
        self.camera_target
    }

    pub fn root_scale(&self) -> Vec3 {
        self.root_scale
    }

    /// Ease the camera mount and the root scale toward the current capsule height
    pub fn update(&mut self, config: &MovementConfig, capsule_height: f32, stance: Stance, dt: f32) {
        let camera_fraction = if stance.is_low() {
            config.crouch_camera_target_height
        } else {
            config.stand_camera_target_height
        };
        let target_camera = Vec3::new(0.0, capsule_height * camera_fraction, 0.0);
        let target_scale = Vec3::new(1.0, capsule_height / config.stand_height, 1.0);

        let t = math::damp(config.crouch_height_response, dt);
        self.camera_target = self.camera_target.lerp(target_camera, t);
        self.root_scale = self.root_scale.lerp(target_scale, t);
    }
}
