// Motion state machine - stance transitions and the per-tick velocity solve
//
// Runs inside the motor's callbacks. Rotation and velocity are proposed here;
// the motor sweeps them against the world and reports back what happened.

use glam::{Quat, Vec3};
use log::debug;

use super::body;
use super::config::MovementConfig;
use super::hooks::CollisionHooks;
use super::input::{CharacterInput, RequestedInput};
use super::state::{CharacterState, Stance};
use crate::core::math::{self, DEGENERATE_SQ};
use crate::engine::physics::GroundMotor;

/// Uphill braking strength relative to the slope coefficient
const UPHILL_BRAKE_FACTOR: f32 = 1.8;

/// Acceleration for motion across the fall line, relative to the slope coefficient
const ACROSS_SLOPE_FACTOR: f32 = 0.35;

/// Dot product with the downhill direction below which motion counts as across the slope
const HEADING_EPS: f32 = 1.0e-3;

/// Planar speed below which the slide falls back to the downhill direction
const MIN_SLIDE_DIRECTION_SPEED: f32 = 1.0e-3;

/// Turn rate used when following the movement direction
const FOLLOW_TURN_RESPONSE: f32 = 8.0;

/// Where a slide is heading relative to the slope it is on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeHeading {
    Downhill,
    Uphill,
    /// Along the contour, or on ground with no downhill direction
    Across,
}

impl SlopeHeading {
    /// Classify a unit direction against the (unit or zero) downhill direction
    pub fn classify(direction: Vec3, downhill: Vec3) -> Self {
        let along = direction.dot(downhill);
        if along > HEADING_EPS {
            Self::Downhill
        } else if along < -HEADING_EPS {
            Self::Uphill
        } else {
            Self::Across
        }
    }
}

/// Speed change a slide picks up from the slope this tick
///
/// `slope` is the sine of the ground angle. Fast uphill motion keeps its
/// momentum; slow motion on barely sloped ground gets no push so it can stop.
pub fn slope_speed_delta(
    config: &MovementConfig,
    slope: f32,
    heading: SlopeHeading,
    planar_speed: f32,
    on_ice: bool,
    dt: f32,
) -> f32 {
    let coefficient = config.slide_gravity_for(on_ice);
    if coefficient <= 0.0 || slope <= 0.0 {
        return 0.0;
    }

    let fast = planar_speed > config.no_uphill_brake_speed;
    let shallow_and_slow =
        slope < config.shallow_slope_eps && planar_speed < config.slide_end_speed * 1.25;

    match heading {
        SlopeHeading::Downhill if !shallow_and_slow => {
            let multiplier = if fast {
                config.downhill_fast_accel_multiplier
            } else {
                1.0
            };
            coefficient * slope * multiplier * dt
        }
        SlopeHeading::Uphill if !fast => -(coefficient * slope * UPHILL_BRAKE_FACTOR) * dt,
        SlopeHeading::Across if !shallow_and_slow => ACROSS_SLOPE_FACTOR * coefficient * slope * dt,
        _ => 0.0,
    }
}

/// Planar velocity change from air control this tick
///
/// Below `air_speed` the velocity may build up to the cap. At or above it,
/// pushing along the current velocity only steers.
pub fn air_control(
    planar_velocity: Vec3,
    planar_movement: Vec3,
    acceleration: f32,
    air_speed: f32,
    dt: f32,
) -> Vec3 {
    let force = planar_movement * acceleration * dt;

    if planar_velocity.length() < air_speed {
        let target = math::clamp_magnitude(planar_velocity + force, air_speed);
        target - planar_velocity
    } else if planar_velocity.dot(planar_movement) > 0.0 {
        math::project_on_plane(force, planar_velocity.normalize_or_zero())
    } else {
        force
    }
}

/// Whether jump handling runs after the movement branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// The slide just ended; the rest of the tick is skipped
    SkipJump,
}

/// Stance, timers and requested input for one character
#[derive(Debug)]
pub struct MotionStateMachine {
    config: MovementConfig,
    state: CharacterState,
    last_state: CharacterState,
    /// State as of the start of the tick, published as `last_state` at its end
    tick_start_state: CharacterState,
    requested: RequestedInput,

    time_since_ungrounded: f32,
    time_since_jump_request: f32,
    ungrounded_due_to_jump: bool,
    slide_low_speed_timer: f32,
}

impl MotionStateMachine {
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            state: CharacterState::default(),
            last_state: CharacterState::default(),
            tick_start_state: CharacterState::default(),
            requested: RequestedInput::default(),
            time_since_ungrounded: 0.0,
            time_since_jump_request: 0.0,
            ungrounded_due_to_jump: false,
            slide_low_speed_timer: 0.0,
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn state(&self) -> CharacterState {
        self.state
    }

    pub fn last_state(&self) -> CharacterState {
        self.last_state
    }

    pub fn requested(&self) -> &RequestedInput {
        &self.requested
    }

    /// Fold this tick's intents into the requested state
    pub fn apply_input(&mut self, input: &CharacterInput) {
        if self.requested.merge(input, self.state.grounded) {
            self.time_since_jump_request = 0.0;
        }
    }

    /// Flip between standing and crouching outside of the velocity solve
    pub fn toggle_crouch_stance(&mut self, motor: &mut dyn GroundMotor) {
        match self.state.stance {
            Stance::Stand => {
                self.requested.crouch = true;
                self.enter_stance(Stance::Crouch);
                body::set_capsule_height(motor, self.config.crouch_height);
            }
            Stance::Crouch => {
                self.requested.crouch = false;
                self.stand_up(motor);
            }
            Stance::Slide => {}
        }
    }

    pub fn begin_tick(&mut self) {
        self.tick_start_state = self.state;
    }

    pub fn update_rotation(&self, motor: &dyn GroundMotor, rotation: &mut Quat, dt: f32) {
        let up = motor.character_up();

        if self.requested.align_to_camera {
            let forward = math::project_on_plane(self.requested.rotation * Vec3::Z, up);
            if forward.length_squared() > DEGENERATE_SQ {
                *rotation = math::look_rotation(forward, up);
            }
        } else if self.config.follow_movement_direction {
            let planar = math::project_on_plane(motor.velocity(), up);
            if planar.length_squared() > 0.01 {
                let target = math::look_rotation(planar, up);
                *rotation = rotation.slerp(target, math::damp(FOLLOW_TURN_RESPONSE, dt));
            }
        }
    }

    pub fn update_velocity(
        &mut self,
        motor: &mut dyn GroundMotor,
        velocity: &mut Vec3,
        hooks: &mut CollisionHooks,
        dt: f32,
    ) {
        let start = *velocity;

        let flow = if motor.is_stable_on_ground() {
            self.grounded_velocity(motor, velocity, hooks, dt)
        } else {
            self.airborne_velocity(motor, velocity, hooks.on_ice(), dt);
            Flow::Continue
        };

        self.state.acceleration = *velocity - start;

        if flow == Flow::Continue {
            self.handle_jump(motor, velocity, dt);
        }
    }

    /// A slide cannot survive losing stable ground
    pub fn post_grounding(&mut self, motor: &dyn GroundMotor) {
        if !motor.is_stable_on_ground() && self.state.stance == Stance::Slide {
            self.enter_stance(Stance::Crouch);
        }
    }

    /// Stand up if crouch was released, then record what the motor committed
    pub fn end_tick(&mut self, motor: &mut dyn GroundMotor) {
        if !self.requested.crouch && self.state.stance != Stance::Stand {
            self.stand_up(motor);
        }

        self.state.grounded = motor.is_stable_on_ground();
        self.state.velocity = motor.velocity();
        self.last_state = self.tick_start_state;
    }

    fn grounded_velocity(
        &mut self,
        motor: &mut dyn GroundMotor,
        velocity: &mut Vec3,
        hooks: &mut CollisionHooks,
        dt: f32,
    ) -> Flow {
        self.time_since_ungrounded = 0.0;
        self.ungrounded_due_to_jump = false;

        let up = motor.character_up();
        let normal = motor.ground_normal();
        let movement = self.requested.movement;
        let grounded_movement =
            math::direction_tangent_to_surface(movement, normal, up) * movement.length();
        let is_running = velocity.length() > self.config.walk_speed * 0.5;
        let planar_speed = math::project_on_plane(*velocity, up).length();
        let on_ice = hooks.on_ice();

        if hooks.take_force_slide()
            && self.state.stance != Stance::Slide
            && planar_speed >= self.config.tagged_slide_min_speed
        {
            debug!("Slide surface forces a slide at {:.1} u/s", planar_speed);
            self.force_slide(motor, velocity, on_ice);
        }

        if self.state.stance != Stance::Slide && planar_speed >= self.config.no_uphill_brake_speed {
            debug!("High speed forces a slide at {:.1} u/s", planar_speed);
            self.force_slide(motor, velocity, on_ice);
        }

        if self.requested.crouch && !self.requested.jump && self.state.stance != Stance::Slide {
            if is_running {
                self.start_slide(motor, velocity, grounded_movement, on_ice);
            } else {
                self.start_crouch_only(motor);
            }
        }

        match self.state.stance {
            Stance::Stand | Stance::Crouch => {
                let (speed, response) = if self.state.stance == Stance::Stand {
                    (self.config.walk_speed, self.config.walk_response)
                } else {
                    (self.config.crouch_speed, self.config.crouch_response)
                };
                let target = grounded_movement * speed;
                *velocity = velocity.lerp(target, math::damp(response, dt));
                Flow::Continue
            }
            Stance::Slide => self.slide_velocity(motor, velocity, on_ice, dt),
        }
    }

    fn slide_velocity(
        &mut self,
        motor: &mut dyn GroundMotor,
        velocity: &mut Vec3,
        on_ice: bool,
        dt: f32,
    ) -> Flow {
        self.requested.crouch = true;

        let up = motor.character_up();
        let normal = motor.ground_normal();
        let slope = math::angle_between(normal, up).sin();
        let is_flat = slope < self.config.flat_slope_eps;

        let mut downhill = math::project_on_plane(-up, normal);
        downhill = if downhill.length_squared() > DEGENERATE_SQ {
            downhill.normalize()
        } else {
            Vec3::ZERO
        };

        let planar = math::project_on_plane(*velocity, up);
        let planar_speed = planar.length();
        let direction = if planar_speed > MIN_SLIDE_DIRECTION_SPEED {
            planar / planar_speed
        } else if downhill != Vec3::ZERO {
            downhill
        } else {
            motor.character_forward()
        };

        let heading = SlopeHeading::classify(direction, downhill);
        let fast = planar_speed > self.config.no_uphill_brake_speed;

        let delta = slope_speed_delta(&self.config, slope, heading, planar_speed, on_ice, dt);
        *velocity = direction * (planar_speed + delta).max(0.0);

        // Steering turns the slide without changing its speed
        let steer = math::direction_tangent_to_surface(self.requested.movement, normal, up);
        if steer.length_squared() > 0.01 && velocity.length_squared() > DEGENERATE_SQ {
            let speed = velocity.length();
            let t = self.config.slide_steer_for(on_ice) * dt;
            *velocity = math::slerp_direction(*velocity / speed, steer, t) * speed;
        }

        // At speed, friction only bites on flat ground
        if !fast || is_flat {
            *velocity *= (-self.config.slide_friction_for(on_ice) * dt).exp();
        }

        let too_slow = velocity.length() < self.config.slide_end_speed;
        if too_slow {
            self.slide_low_speed_timer += dt;
        } else {
            self.slide_low_speed_timer = 0.0;
        }

        let stalled = too_slow && (is_flat || heading == SlopeHeading::Uphill);
        if stalled || self.slide_low_speed_timer >= self.config.slide_low_speed_hold {
            debug!(
                "Slide ended at {:.2} u/s (flat: {}, heading: {:?})",
                velocity.length(),
                is_flat,
                heading
            );
            self.requested.crouch = false;
            self.slide_low_speed_timer = 0.0;
            self.stand_up(motor);
            return Flow::SkipJump;
        }

        Flow::Continue
    }

    fn airborne_velocity(&mut self, motor: &dyn GroundMotor, velocity: &mut Vec3, on_ice: bool, dt: f32) {
        self.time_since_ungrounded += dt;

        let up = motor.character_up();
        let movement = self.requested.movement;

        if movement.length_squared() > 0.0 {
            let planar_movement = math::project_on_plane(movement, up) * movement.length();
            let planar_velocity = math::project_on_plane(*velocity, up);
            *velocity += air_control(
                planar_velocity,
                planar_movement,
                self.config.air_acceleration_for(on_ice),
                self.config.air_speed,
                dt,
            );
        }

        let mut gravity = self.config.gravity;
        if self.requested.jump_sustain && velocity.dot(up) > 0.0 {
            gravity *= self.config.jump_sustain_gravity;
        }
        *velocity += up * gravity * dt;
    }

    fn handle_jump(&mut self, motor: &mut dyn GroundMotor, velocity: &mut Vec3, dt: f32) {
        if !self.requested.jump {
            return;
        }

        if self.state.stance == Stance::Slide {
            self.requested.jump = false;
            return;
        }

        let grounded = motor.is_stable_on_ground();
        let can_coyote_jump =
            self.time_since_ungrounded < self.config.coyote_time && !self.ungrounded_due_to_jump;

        if grounded || can_coyote_jump {
            self.requested.jump = false;
            self.requested.crouch = false;
            self.requested.crouch_in_air = false;
            motor.force_unground(0.0);
            self.ungrounded_due_to_jump = true;

            let up = motor.character_up();
            let vertical = velocity.dot(up);
            let target = vertical.max(self.config.jump_speed);
            *velocity += up * (target - vertical);
            debug!("Jump (grounded: {}, vertical speed {:.1})", grounded, target);
        } else {
            self.time_since_jump_request += dt;
            self.requested.jump = self.time_since_jump_request < self.config.coyote_time;
        }
    }

    /// Slide along the current planar velocity at no less than the start speed
    fn force_slide(&mut self, motor: &mut dyn GroundMotor, velocity: &mut Vec3, on_ice: bool) {
        let up = motor.character_up();
        let planar = math::project_on_plane(*velocity, up);
        let direction = if planar.length_squared() > DEGENERATE_SQ {
            planar.normalize()
        } else {
            motor.character_forward()
        };
        self.begin_slide(motor, velocity, direction, on_ice);
    }

    /// Slide along the requested movement, or forward without input
    fn start_slide(
        &mut self,
        motor: &mut dyn GroundMotor,
        velocity: &mut Vec3,
        grounded_movement: Vec3,
        on_ice: bool,
    ) {
        let direction = if grounded_movement.length_squared() > 0.01 {
            grounded_movement.normalize()
        } else {
            motor.character_forward()
        };
        self.begin_slide(motor, velocity, direction, on_ice);
    }

    fn begin_slide(&mut self, motor: &mut dyn GroundMotor, velocity: &mut Vec3, direction: Vec3, on_ice: bool) {
        self.enter_stance(Stance::Slide);
        self.requested.crouch = true;

        let speed = velocity.length().max(self.config.slide_start_speed);
        *velocity = direction * speed;
        if on_ice {
            *velocity += direction * self.config.ice_slide_boost;
        }
        body::set_capsule_height(motor, self.config.crouch_height);
    }

    fn start_crouch_only(&mut self, motor: &mut dyn GroundMotor) {
        if self.state.stance != Stance::Crouch {
            self.enter_stance(Stance::Crouch);
            self.requested.crouch = true;
            body::set_capsule_height(motor, self.config.crouch_height);
        }
    }

    /// Stand at full height, or fall back to crouching if something is overhead
    fn stand_up(&mut self, motor: &mut dyn GroundMotor) {
        if body::try_stand_up(motor, &self.config) {
            self.enter_stance(Stance::Stand);
        } else {
            self.requested.crouch = true;
            self.enter_stance(Stance::Crouch);
        }
    }

    fn enter_stance(&mut self, stance: Stance) {
        if self.state.stance != stance {
            debug!("Stance {:?} -> {:?}", self.state.stance, stance);
            self.state.stance = stance;
        }
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut CharacterState {
        &mut self.state
    }

    #[cfg(test)]
    pub(crate) fn requested_mut(&mut self) -> &mut RequestedInput {
        &mut self.requested
    }

    #[cfg(test)]
    pub(crate) fn set_time_since_ungrounded(&mut self, seconds: f32) {
        self.time_since_ungrounded = seconds;
    }
}
