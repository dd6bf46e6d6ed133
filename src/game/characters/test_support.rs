// Scripted ground motor for driving characters without a physics world

use glam::{Quat, Vec3};

use crate::core::math;
use crate::engine::physics::{
    CapsuleDimensions, CharacterController, GroundMotor, GroundingStatus, MotorHit, Surface,
};

/// Motor whose ground contact and obstacles are set directly by the test
///
/// While `ground` is set the character is stable on it every tick, unless the
/// controller forced an unground during that tick.
pub(crate) struct TestMotor {
    pub ground: Option<(Vec3, Surface)>,
    /// Underside of a ceiling above the feet, used by overlap queries
    pub ceiling_height: Option<f32>,
    /// Hits reported from the sweep on every tick
    pub movement_hits: Vec<MotorHit>,
    pub grounding: GroundingStatus,
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub capsule: CapsuleDimensions,
    pub unground_requests: usize,
    forced_this_tick: bool,
}

impl TestMotor {
    /// Standing on flat plain ground
    pub fn grounded() -> Self {
        Self::on_ground(Vec3::Y, Surface::plain())
    }

    /// Standing on ground with the given normal and surface
    pub fn on_ground(normal: Vec3, surface: Surface) -> Self {
        let mut motor = Self::airborne();
        motor.ground = Some((normal.normalize(), surface));
        motor.grounding = GroundingStatus {
            is_stable_on_ground: true,
            ground_normal: normal.normalize(),
            ground_surface: Some(surface),
        };
        motor
    }

    /// Nothing underneath
    pub fn airborne() -> Self {
        Self {
            ground: None,
            ceiling_height: None,
            movement_hits: Vec::new(),
            grounding: GroundingStatus::default(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            capsule: CapsuleDimensions::standing_on_feet(0.5, 2.0),
            unground_requests: 0,
            forced_this_tick: false,
        }
    }

    /// Run one tick in the same callback order as the real motor
    pub fn tick(&mut self, controller: &mut dyn CharacterController, dt: f32) {
        self.forced_this_tick = false;

        controller.before_character_update(self, dt);

        let mut rotation = self.rotation;
        controller.update_rotation(self, &mut rotation, dt);
        self.rotation = rotation;

        if self.grounding.is_stable_on_ground {
            let normal = self.grounding.ground_normal;
            self.velocity =
                math::direction_tangent_to_surface(self.velocity, normal, Vec3::Y) * self.velocity.length();
        }

        let mut velocity = self.velocity;
        controller.update_velocity(self, &mut velocity, dt);
        self.velocity = velocity;
        self.position += velocity * dt;

        for hit in self.movement_hits.clone() {
            controller.on_movement_hit(&hit);
        }

        match self.ground {
            Some((normal, surface)) if !self.forced_this_tick => {
                self.grounding = GroundingStatus {
                    is_stable_on_ground: true,
                    ground_normal: normal,
                    ground_surface: Some(surface),
                };
                controller.on_ground_hit(&MotorHit {
                    surface,
                    normal,
                    point: self.position,
                });
            }
            _ => self.grounding = GroundingStatus::default(),
        }

        controller.post_grounding_update(self, dt);
        controller.after_character_update(self, dt);
    }
}

impl GroundMotor for TestMotor {
    fn grounding_status(&self) -> GroundingStatus {
        self.grounding
    }

    fn character_up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    fn character_forward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    fn capsule(&self) -> CapsuleDimensions {
        self.capsule
    }

    fn set_capsule_dimensions(&mut self, radius: f32, height: f32, y_offset: f32) {
        self.capsule = CapsuleDimensions {
            radius,
            height,
            y_offset,
        };
    }

    fn force_unground(&mut self, _duration: f32) {
        self.unground_requests += 1;
        self.forced_this_tick = true;
        self.grounding.is_stable_on_ground = false;
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_base_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn transient_position(&self) -> Vec3 {
        self.position
    }

    fn transient_rotation(&self) -> Quat {
        self.rotation
    }

    fn collidable_layers(&self) -> u32 {
        u32::MAX
    }

    fn character_overlap(&self, position: Vec3, _rotation: Quat, _layers: u32) -> usize {
        match self.ceiling_height {
            Some(ceiling) if position.y + self.capsule.height > ceiling => 1,
            _ => 0,
        }
    }
}
