// Interfaces between a character controller and the motor that moves it
//
// The motor owns collision: it sweeps the capsule, probes for ground and
// answers overlap queries. The controller only proposes a rotation and a
// velocity and reacts to the hits the motor reports. Per tick the motor calls
// the controller in this order:
//
//   before_character_update -> update_rotation -> update_velocity
//   -> (sweep: on_movement_hit*) -> (ground probe: on_ground_hit?)
//   -> post_grounding_update -> after_character_update

use glam::{Quat, Vec3};

use super::collision::Surface;

/// Capsule geometry, with the capsule's center `y_offset` above the character's feet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleDimensions {
    pub radius: f32,
    pub height: f32,
    pub y_offset: f32,
}

impl CapsuleDimensions {
    /// Capsule resting on the character's feet
    pub fn standing_on_feet(radius: f32, height: f32) -> Self {
        Self {
            radius,
            height,
            y_offset: height * 0.5,
        }
    }
}

/// Ground contact as of the motor's last probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundingStatus {
    pub is_stable_on_ground: bool,
    pub ground_normal: Vec3,
    /// Surface of the collider under the character, if any was found
    pub ground_surface: Option<Surface>,
}

impl Default for GroundingStatus {
    fn default() -> Self {
        Self {
            is_stable_on_ground: false,
            ground_normal: Vec3::Y,
            ground_surface: None,
        }
    }
}

/// A collider touched during the sweep or the ground probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorHit {
    pub surface: Surface,
    pub normal: Vec3,
    pub point: Vec3,
}

/// Services a motor exposes to the controller it drives
pub trait GroundMotor {
    fn grounding_status(&self) -> GroundingStatus;

    fn is_stable_on_ground(&self) -> bool {
        self.grounding_status().is_stable_on_ground
    }

    fn ground_normal(&self) -> Vec3 {
        self.grounding_status().ground_normal
    }

    fn ground_surface(&self) -> Option<Surface> {
        self.grounding_status().ground_surface
    }

    fn character_up(&self) -> Vec3;
    fn character_forward(&self) -> Vec3;

    fn capsule(&self) -> CapsuleDimensions;
    fn set_capsule_dimensions(&mut self, radius: f32, height: f32, y_offset: f32);

    /// Skip ground snapping and report ungrounded for at least this tick
    fn force_unground(&mut self, duration: f32);

    fn set_position(&mut self, position: Vec3);

    /// Velocity after the last committed move
    fn velocity(&self) -> Vec3;
    fn set_base_velocity(&mut self, velocity: Vec3);

    /// Pose the motor is resolving this tick
    fn transient_position(&self) -> Vec3;
    fn transient_rotation(&self) -> Quat;

    /// Groups the character capsule is blocked by
    fn collidable_layers(&self) -> u32;

    /// Count blocking colliders overlapping the current capsule placed at the given pose
    fn character_overlap(&self, position: Vec3, rotation: Quat, layers: u32) -> usize;
}

/// Callbacks a motor invokes on its controller, in the order documented above
///
/// None of these are reentrant: a controller must not drive the motor's
/// simulation from inside a callback.
pub trait CharacterController {
    fn before_character_update(&mut self, motor: &mut dyn GroundMotor, dt: f32);
    fn update_rotation(&mut self, motor: &dyn GroundMotor, rotation: &mut Quat, dt: f32);
    fn update_velocity(&mut self, motor: &mut dyn GroundMotor, velocity: &mut Vec3, dt: f32);
    fn post_grounding_update(&mut self, motor: &dyn GroundMotor, dt: f32);
    fn after_character_update(&mut self, motor: &mut dyn GroundMotor, dt: f32);
    fn on_ground_hit(&mut self, hit: &MotorHit);
    fn on_movement_hit(&mut self, hit: &MotorHit);
}
