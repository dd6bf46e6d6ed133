// Reference ground motor built on rapier's kinematic character controller
//
// Sweeps and slope handling come from rapier; this type only tracks the
// character pose, grounding and capsule size, and drives a
// `CharacterController` through its callbacks in a fixed order.

use glam::{Quat, Vec3};
use rapier3d::control::{CharacterLength, KinematicCharacterController};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use super::body::character_capsule;
use super::collision::CollisionGroups;
use super::motor::{
    CapsuleDimensions, CharacterController, GroundMotor, GroundingStatus, MotorHit,
};
use super::world::PhysicsWorld;
use crate::core::math;

/// How far below the feet an airborne capsule still counts as landed
const GROUND_CONTACT_TOLERANCE: Real = 0.1;

/// Tuning for the reference motor
#[derive(Debug, Clone, Copy)]
pub struct MotorProfile {
    /// Steepest slope the character can stand on, in radians
    pub max_stable_slope_angle: Real,
    /// Distance to snap down to ground while stable
    pub ground_snap_distance: Real,
    /// Gap kept between the capsule and geometry
    pub offset: Real,
    /// Small nudge applied along contact normals to prevent sticking
    pub normal_nudge_factor: Real,
}

impl Default for MotorProfile {
    fn default() -> Self {
        Self {
            max_stable_slope_angle: 60.0_f32.to_radians(),
            ground_snap_distance: 0.5,
            offset: 0.02,
            normal_nudge_factor: 1.0e-4,
        }
    }
}

impl MotorProfile {
    fn apply_to(&self, controller: &mut KinematicCharacterController) {
        controller.autostep = None;
        controller.max_slope_climb_angle = self.max_stable_slope_angle;
        controller.min_slope_slide_angle = self.max_stable_slope_angle;
        controller.snap_to_ground = if self.ground_snap_distance > 0.0 {
            Some(CharacterLength::Absolute(self.ground_snap_distance))
        } else {
            None
        };
        controller.offset = CharacterLength::Absolute(self.offset);
        controller.normal_nudge_factor = self.normal_nudge_factor;
    }
}

/// Pose, velocity and grounding of the simulated character
#[derive(Debug, Clone)]
struct MotorBody {
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    capsule: CapsuleDimensions,
    grounding: GroundingStatus,
    /// Set by `force_unground`; cleared once the timer runs out
    forced_unground: bool,
    unground_time_left: f32,
    collidable_layers: u32,
}

/// Kinematic motor for a single character
pub struct KinematicMotor {
    profile: MotorProfile,
    controller: KinematicCharacterController,
    body: MotorBody,
}

impl KinematicMotor {
    pub fn new(profile: MotorProfile, position: Vec3, capsule: CapsuleDimensions) -> Self {
        let mut controller = KinematicCharacterController::default();
        profile.apply_to(&mut controller);
        Self {
            profile,
            controller,
            body: MotorBody {
                position,
                rotation: Quat::IDENTITY,
                velocity: Vec3::ZERO,
                capsule,
                grounding: GroundingStatus::default(),
                forced_unground: false,
                unground_time_left: 0.0,
                collidable_layers: CollisionGroups::player_collidable_mask(),
            },
        }
    }

    pub fn position(&self) -> Vec3 {
        self.body.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    pub fn grounding_status(&self) -> GroundingStatus {
        self.body.grounding
    }

    pub fn capsule(&self) -> CapsuleDimensions {
        self.body.capsule
    }

    /// Borrow the motor as a `GroundMotor` outside of a simulation step
    pub fn view<'a>(&'a mut self, world: &'a PhysicsWorld) -> MotorView<'a> {
        MotorView {
            body: &mut self.body,
            world,
        }
    }

    /// Run one tick: ask the controller for rotation and velocity, sweep the
    /// capsule, probe for ground and report every hit back
    pub fn simulate(
        &mut self,
        world: &PhysicsWorld,
        controller: &mut dyn CharacterController,
        dt: f32,
    ) {
        let up = world.up();
        self.controller.up = UnitVector::new_normalize(vector![up.x, up.y, up.z]);

        let mut view = MotorView {
            body: &mut self.body,
            world,
        };

        controller.before_character_update(&mut view, dt);

        let mut rotation = view.body.rotation;
        controller.update_rotation(&view, &mut rotation, dt);
        view.body.rotation = rotation;

        if view.body.grounding.is_stable_on_ground {
            // Keep speed but follow the ground before the controller sees it
            let v = view.body.velocity;
            let normal = view.body.grounding.ground_normal;
            view.body.velocity = math::direction_tangent_to_surface(v, normal, up) * v.length();
        }

        let mut velocity = view.body.velocity;
        controller.update_velocity(&mut view, &mut velocity, dt);
        view.body.velocity = velocity;

        let hits = Self::sweep(&self.controller, &mut self.body, world, up, dt);
        for hit in &hits {
            controller.on_movement_hit(hit);
        }

        let ground_hit = Self::probe_ground(&self.profile, &mut self.body, world, up, dt);
        if let Some(hit) = ground_hit {
            controller.on_ground_hit(&hit);
        }

        let mut view = MotorView {
            body: &mut self.body,
            world,
        };
        controller.post_grounding_update(&view, dt);
        controller.after_character_update(&mut view, dt);
    }

    fn sweep(
        controller: &KinematicCharacterController,
        body: &mut MotorBody,
        world: &PhysicsWorld,
        up: Vec3,
        dt: f32,
    ) -> Vec<MotorHit> {
        if dt <= 0.0 {
            return Vec::new();
        }

        let mut velocity = body.velocity;
        let stable = body.grounding.is_stable_on_ground && !body.forced_unground;
        if stable && velocity.dot(up) <= 0.0 {
            let normal = body.grounding.ground_normal;
            velocity = math::direction_tangent_to_surface(velocity, normal, up) * velocity.length();
        }

        let mut kcc = *controller;
        if body.forced_unground || !stable {
            kcc.snap_to_ground = None;
        }

        let capsule = character_capsule(body.capsule);
        let center = body.position + up * body.capsule.y_offset;
        let character_pos = Isometry::translation(center.x, center.y, center.z);
        let desired = velocity * dt;

        let mut contacts: Vec<(ColliderHandle, Vec3)> = Vec::new();
        let movement = kcc.move_shape(
            dt,
            world.bodies(),
            world.colliders(),
            world.query_pipeline(),
            &capsule,
            &character_pos,
            vector![desired.x, desired.y, desired.z],
            CollisionGroups::query_filter(body.collidable_layers),
            |collision| {
                let n = collision.hit.normal1;
                contacts.push((collision.handle, Vec3::new(n.x, n.y, n.z)));
            },
        );

        let translation = Vec3::new(
            movement.translation.x,
            movement.translation.y,
            movement.translation.z,
        );
        body.position += translation;

        // Drop the parts of the velocity that pushed into whatever we hit
        for (_, normal) in &contacts {
            let into = velocity.dot(*normal);
            if into < 0.0 {
                velocity -= *normal * into;
            }
        }
        body.velocity = velocity;

        let point = body.position;
        contacts
            .into_iter()
            .map(|(handle, normal)| MotorHit {
                surface: world.surface(handle),
                normal,
                point,
            })
            .collect()
    }

    fn probe_ground(
        profile: &MotorProfile,
        body: &mut MotorBody,
        world: &PhysicsWorld,
        up: Vec3,
        dt: f32,
    ) -> Option<MotorHit> {
        if body.forced_unground {
            body.grounding = GroundingStatus::default();
            body.unground_time_left -= dt;
            if body.unground_time_left <= 0.0 {
                body.forced_unground = false;
            }
            return None;
        }

        // Only snap down while already grounded; an airborne capsule must be touching
        let was_stable = body.grounding.is_stable_on_ground;
        if !was_stable && body.velocity.dot(up) > 1.0e-3 {
            body.grounding = GroundingStatus::default();
            return None;
        }
        let reach = if was_stable {
            profile.ground_snap_distance.max(GROUND_CONTACT_TOLERANCE)
        } else {
            GROUND_CONTACT_TOLERANCE
        };

        // Cast from the center of the bottom sphere so walls do not count as ground
        let radius = body.capsule.radius;
        let origin = body.position + up * radius;
        let max_toi = radius + profile.offset + reach;
        let Some((handle, normal)) = world.raycast(origin, -up, max_toi) else {
            body.grounding = GroundingStatus::default();
            return None;
        };

        let surface = world.surface(handle);
        let up_dot = normal.dot(up);
        body.grounding = GroundingStatus {
            is_stable_on_ground: up_dot > 0.0 && up_dot >= profile.max_stable_slope_angle.cos(),
            ground_normal: normal,
            ground_surface: Some(surface),
        };

        Some(MotorHit {
            surface,
            normal,
            point: body.position,
        })
    }
}

/// `GroundMotor` view over a motor body plus the world it collides with
pub struct MotorView<'a> {
    body: &'a mut MotorBody,
    world: &'a PhysicsWorld,
}

impl GroundMotor for MotorView<'_> {
    fn grounding_status(&self) -> GroundingStatus {
        self.body.grounding
    }

    fn character_up(&self) -> Vec3 {
        self.body.rotation * Vec3::Y
    }

    fn character_forward(&self) -> Vec3 {
        self.body.rotation * Vec3::Z
    }

    fn capsule(&self) -> CapsuleDimensions {
        self.body.capsule
    }

    fn set_capsule_dimensions(&mut self, radius: f32, height: f32, y_offset: f32) {
        self.body.capsule = CapsuleDimensions {
            radius,
            height,
            y_offset,
        };
    }

    fn force_unground(&mut self, duration: f32) {
        self.body.forced_unground = true;
        self.body.unground_time_left = duration.max(0.0);
        self.body.grounding.is_stable_on_ground = false;
    }

    fn set_position(&mut self, position: Vec3) {
        self.body.position = position;
        self.body.grounding = GroundingStatus::default();
    }

    fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    fn set_base_velocity(&mut self, velocity: Vec3) {
        self.body.velocity = velocity;
    }

    fn transient_position(&self) -> Vec3 {
        self.body.position
    }

    fn transient_rotation(&self) -> Quat {
        self.body.rotation
    }

    fn collidable_layers(&self) -> u32 {
        self.body.collidable_layers
    }

    fn character_overlap(&self, position: Vec3, rotation: Quat, layers: u32) -> usize {
        // Shrink by the contact offset so resting on the floor is not an overlap
        let skin = self.body.capsule.radius.min(0.05);
        let mut dims = self.body.capsule;
        dims.radius -= skin;
        dims.height -= skin * 2.0;
        let shape = character_capsule(dims);

        let center = position + rotation * (Vec3::Y * self.body.capsule.y_offset);
        let pose = Isometry::from_parts(
            Translation3::new(center.x, center.y, center.z),
            UnitQuaternion::from_quaternion(Quaternion::new(
                rotation.w, rotation.x, rotation.y, rotation.z,
            )),
        );

        let mut count = 0;
        self.world.query_pipeline().intersections_with_shape(
            self.world.bodies(),
            self.world.colliders(),
            &pose,
            &shape,
            CollisionGroups::query_filter(layers),
            |_| {
                count += 1;
                true
            },
        );
        count
    }
}
