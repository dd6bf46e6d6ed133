// Player character - glues input, motion, body and collision hooks to a motor

use glam::{Quat, Vec3};
use log::info;

use super::body::BodyRig;
use super::config::{ConfigError, MovementConfig};
use super::hooks::{CharacterEvent, CollisionHooks};
use super::input::CharacterInput;
use super::motion::MotionStateMachine;
use super::state::CharacterState;
use crate::engine::game_loop::ScheduledEvents;
use crate::engine::physics::{CharacterController, GroundMotor, MotorHit};

/// Delay before the second crouch toggle of the startup sequence
const STARTUP_TOGGLE_DELAY: f32 = 0.2;

/// Actions queued to run at a fixed point after activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StartupAction {
    /// Crouch if standing, stand if crouching
    ToggleCrouch,
}

/// A player-controlled character driven by a ground motor
///
/// The game feeds input once per tick with [`PlayerCharacter::update_input`]
/// and hands the character to the motor, which calls back into it through
/// [`CharacterController`].
#[derive(Debug)]
pub struct PlayerCharacter {
    motion: MotionStateMachine,
    hooks: CollisionHooks,
    rig: BodyRig,
    startup: ScheduledEvents<StartupAction>,
    /// Simulated seconds since activation
    clock: f32,
}

impl PlayerCharacter {
    /// Create a character, rejecting tuning the solver cannot work with
    pub fn new(config: MovementConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rig: BodyRig::new(&config),
            motion: MotionStateMachine::new(config),
            hooks: CollisionHooks::new(),
            startup: ScheduledEvents::new(),
            clock: 0.0,
        })
    }

    /// Size the motor's capsule for standing and queue the startup sequence
    ///
    /// The sequence crouches on the first tick and stands again shortly after,
    /// which settles the capsule and camera mount before play starts.
    pub fn initialize(&mut self, motor: &mut dyn GroundMotor) {
        let config = self.motion.config();
        motor.set_capsule_dimensions(
            config.capsule_radius,
            config.stand_height,
            config.stand_height * 0.5,
        );
        self.clock = 0.0;
        self.startup = ScheduledEvents::new();
        self.startup.schedule(0.0, StartupAction::ToggleCrouch);
        self.startup
            .schedule(STARTUP_TOGGLE_DELAY, StartupAction::ToggleCrouch);
        info!("Character initialized at {:?}", motor.transient_position());
    }

    /// Feed this tick's intents; call before the motor runs
    pub fn update_input(&mut self, input: &CharacterInput) {
        self.motion.apply_input(input);
    }

    /// Ease the camera mount and visual root toward the current capsule
    pub fn update_body(&mut self, motor: &dyn GroundMotor, dt: f32) {
        let config = self.motion.config();
        self.rig
            .update(config, motor.capsule().height, self.motion.state().stance, dt);
    }

    /// Teleport, e.g. to a checkpoint; stance is left as is
    pub fn set_position(&mut self, motor: &mut dyn GroundMotor, position: Vec3, kill_velocity: bool) {
        motor.set_position(position);
        if kill_velocity {
            motor.set_base_velocity(Vec3::ZERO);
        }
        info!("Character moved to {:?}", position);
    }

    /// Send the character back to `spawn` for a new run
    pub fn restart(&mut self, motor: &mut dyn GroundMotor, spawn: Vec3) {
        self.hooks.reset_finish();
        self.set_position(motor, spawn, true);
    }

    pub fn state(&self) -> CharacterState {
        self.motion.state()
    }

    /// State as of the start of the last completed tick
    pub fn last_state(&self) -> CharacterState {
        self.motion.last_state()
    }

    /// Camera mount position relative to the character's feet
    pub fn camera_target(&self) -> Vec3 {
        self.rig.camera_target()
    }

    /// Vertical squash of the visual root
    pub fn root_scale(&self) -> Vec3 {
        self.rig.root_scale()
    }

    /// Whether the current crouch was entered in the air
    pub fn crouched_in_air(&self) -> bool {
        self.motion.requested().crouch_in_air
    }

    pub fn on_ice(&self) -> bool {
        self.hooks.on_ice()
    }

    /// Events raised since the last call
    pub fn take_events(&mut self) -> Vec<CharacterEvent> {
        self.hooks.take_events()
    }
}

impl CharacterController for PlayerCharacter {
    fn before_character_update(&mut self, motor: &mut dyn GroundMotor, dt: f32) {
        for action in self.startup.drain_due(self.clock) {
            match action {
                StartupAction::ToggleCrouch => self.motion.toggle_crouch_stance(motor),
            }
        }
        self.clock += dt;
        self.motion.begin_tick();
    }

    fn update_rotation(&mut self, motor: &dyn GroundMotor, rotation: &mut Quat, dt: f32) {
        self.motion.update_rotation(motor, rotation, dt);
    }

    fn update_velocity(&mut self, motor: &mut dyn GroundMotor, velocity: &mut Vec3, dt: f32) {
        self.motion
            .update_velocity(motor, velocity, &mut self.hooks, dt);
    }

    fn post_grounding_update(&mut self, motor: &dyn GroundMotor, _dt: f32) {
        self.motion.post_grounding(motor);
    }

    fn after_character_update(&mut self, motor: &mut dyn GroundMotor, _dt: f32) {
        self.motion.end_tick(motor);
    }

    fn on_ground_hit(&mut self, hit: &MotorHit) {
        self.hooks.on_ground_hit(hit);
    }

    fn on_movement_hit(&mut self, hit: &MotorHit) {
        self.hooks.on_movement_hit(hit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::physics::{Surface, SurfaceTag};
    use crate::game::characters::input::CrouchInput;
    use crate::game::characters::state::Stance;
    use crate::game::characters::test_support::TestMotor;
    use approx::assert_abs_diff_eq;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn character() -> PlayerCharacter {
        PlayerCharacter::new(MovementConfig::default()).unwrap()
    }

    /// Feed one tick of input and run the motor
    fn step(character: &mut PlayerCharacter, motor: &mut TestMotor, input: CharacterInput) {
        character.update_input(&input);
        motor.tick(character, DT);
        character.update_body(motor, DT);
    }

    fn idle() -> CharacterInput {
        CharacterInput::default()
    }

    fn toggle_crouch() -> CharacterInput {
        CharacterInput {
            crouch: CrouchInput::Toggle,
            ..idle()
        }
    }

    fn jump() -> CharacterInput {
        CharacterInput {
            jump: true,
            jump_sustain: true,
            ..idle()
        }
    }

    fn forward() -> CharacterInput {
        CharacterInput {
            move_axis: Vec2::new(0.0, 1.0),
            ..idle()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = MovementConfig {
            stand_height: 0.0,
            ..MovementConfig::default()
        };
        assert!(PlayerCharacter::new(config).is_err());
    }

    #[test]
    fn test_startup_sequence_crouches_then_stands() {
        let mut character = character();
        let mut motor = TestMotor::grounded();
        character.initialize(&mut motor);
        assert_eq!(motor.capsule.height, 2.0);

        step(&mut character, &mut motor, idle());
        assert_eq!(character.state().stance, Stance::Crouch);
        assert_eq!(motor.capsule.height, 1.0);

        for _ in 0..15 {
            step(&mut character, &mut motor, idle());
        }
        assert_eq!(character.state().stance, Stance::Stand);
        assert_eq!(motor.capsule.height, 2.0);
    }

    #[test]
    fn test_exactly_one_stance_and_no_airborne_slide() {
        let mut character = character();
        let mut motor = TestMotor::grounded();
        motor.velocity = Vec3::new(0.0, 0.0, 25.0);

        step(&mut character, &mut motor, toggle_crouch());
        assert_eq!(character.state().stance, Stance::Slide);

        // Run off a ledge mid-slide
        motor.ground = None;
        step(&mut character, &mut motor, idle());
        let state = character.state();
        assert!(!state.grounded);
        assert_ne!(state.stance, Stance::Slide);
        assert_eq!(state.stance, Stance::Crouch);
    }

    #[test]
    fn test_walk_then_last_state_lags_one_tick() {
        let mut character = character();
        let mut motor = TestMotor::grounded();

        step(&mut character, &mut motor, forward());
        let first = character.state();
        assert!(first.grounded);
        assert!(first.velocity.z > 0.0);

        step(&mut character, &mut motor, forward());
        assert_eq!(character.last_state(), first);
        assert!(character.state().velocity.z > first.velocity.z);
    }

    #[test]
    fn test_jump_from_ground() {
        let mut character = character();
        let mut motor = TestMotor::grounded();

        character.update_input(&jump());
        motor.ground = None;
        motor.grounding.is_stable_on_ground = true;
        motor.tick(&mut character, DT);

        assert_eq!(motor.unground_requests, 1);
        assert_abs_diff_eq!(character.state().velocity.y, 20.0, epsilon = 1e-4);
        assert!(!character.state().grounded);
    }

    #[test]
    fn test_jump_while_sliding_is_dropped() {
        let mut character = character();
        let mut motor = TestMotor::grounded();
        motor.velocity = Vec3::new(0.0, 0.0, 25.0);
        step(&mut character, &mut motor, toggle_crouch());
        assert_eq!(character.state().stance, Stance::Slide);

        let before = motor.velocity.y;
        step(&mut character, &mut motor, jump());
        assert_eq!(character.state().stance, Stance::Slide);
        assert_eq!(motor.velocity.y, before);
        assert_eq!(motor.unground_requests, 0);

        // The press is gone, not buffered
        step(&mut character, &mut motor, idle());
        assert_eq!(motor.unground_requests, 0);
    }

    #[test]
    fn test_coyote_jump_after_running_off_edge() {
        let mut character = character();
        let mut motor = TestMotor::grounded();
        step(&mut character, &mut motor, forward());

        motor.ground = None;
        step(&mut character, &mut motor, forward());
        step(&mut character, &mut motor, forward());
        assert!(!character.state().grounded);

        step(&mut character, &mut motor, jump());
        assert_eq!(motor.unground_requests, 1);
        assert_abs_diff_eq!(character.state().velocity.y, 20.0, epsilon = 1e-4);
    }

    #[test]
    fn test_buffered_jump_fires_on_landing() {
        let mut character = character();
        let mut motor = TestMotor::airborne();
        motor.velocity = Vec3::new(0.0, -10.0, 0.0);
        for _ in 0..20 {
            step(&mut character, &mut motor, idle());
        }

        // Pressed a few ticks before touching down
        step(&mut character, &mut motor, jump());
        step(&mut character, &mut motor, idle());
        assert_eq!(motor.unground_requests, 0);

        motor.ground = Some((Vec3::Y, Surface::plain()));
        step(&mut character, &mut motor, idle());
        motor.grounding.is_stable_on_ground = true;
        step(&mut character, &mut motor, idle());
        assert_eq!(motor.unground_requests, 1);
    }

    #[test]
    fn test_high_speed_forces_slide_within_a_tick() {
        let mut character = character();
        let mut motor = TestMotor::grounded();
        motor.velocity = Vec3::new(0.0, 0.0, 31.0);

        step(&mut character, &mut motor, jump());
        assert_eq!(character.state().stance, Stance::Slide);
        assert_eq!(motor.capsule.height, 1.0);
    }

    #[test]
    fn test_blocked_stand_up_keeps_crouch() {
        let mut character = character();
        let mut motor = TestMotor::grounded();

        step(&mut character, &mut motor, toggle_crouch());
        assert_eq!(character.state().stance, Stance::Crouch);

        // Crawl under a low ceiling and release crouch
        motor.ceiling_height = Some(1.5);
        step(&mut character, &mut motor, toggle_crouch());
        assert_eq!(character.state().stance, Stance::Crouch);
        assert_eq!(motor.capsule.height, 1.0);

        // Out from under it, standing succeeds once crouch is released again
        motor.ceiling_height = None;
        step(&mut character, &mut motor, toggle_crouch());
        assert_eq!(character.state().stance, Stance::Stand);
        assert_eq!(motor.capsule.height, 2.0);
    }

    #[test]
    fn test_crouch_in_air_is_recorded() {
        let mut character = character();
        let mut motor = TestMotor::airborne();
        step(&mut character, &mut motor, idle());

        step(&mut character, &mut motor, toggle_crouch());
        assert!(character.crouched_in_air());
        assert_eq!(character.state().stance, Stance::Stand);

        // Landing with crouch held crouches
        motor.ground = Some((Vec3::Y, Surface::plain()));
        motor.grounding.is_stable_on_ground = true;
        motor.velocity = Vec3::ZERO;
        step(&mut character, &mut motor, idle());
        assert_eq!(character.state().stance, Stance::Crouch);
    }

    #[test]
    fn test_slide_tag_forces_slide_next_grounded_tick() {
        let mut character = character();
        let mut motor = TestMotor::grounded();
        motor.ground = Some((Vec3::Y, Surface::plain().with_tag(SurfaceTag::Slide)));

        // The hit arrives after this tick's solve
        step(&mut character, &mut motor, idle());
        assert_eq!(character.state().stance, Stance::Stand);

        step(&mut character, &mut motor, idle());
        assert_eq!(character.state().stance, Stance::Slide);
    }

    #[test]
    fn test_ice_ground_is_tracked() {
        let mut character = character();
        let mut motor = TestMotor::on_ground(Vec3::Y, Surface::ice());
        step(&mut character, &mut motor, idle());
        assert!(character.on_ice());
    }

    #[test]
    fn test_finish_event() {
        let mut character = character();
        let mut motor = TestMotor::grounded();
        motor.movement_hits.push(MotorHit {
            surface: Surface::plain().with_tag(SurfaceTag::Finish),
            normal: Vec3::NEG_Z,
            point: Vec3::ZERO,
        });

        step(&mut character, &mut motor, forward());
        step(&mut character, &mut motor, forward());
        assert_eq!(character.take_events(), vec![CharacterEvent::LevelFinished]);
    }

    #[test]
    fn test_restart_rearms_finish() {
        let mut character = character();
        let mut motor = TestMotor::grounded();
        motor.movement_hits.push(MotorHit {
            surface: Surface::plain().with_tag(SurfaceTag::Finish),
            normal: Vec3::NEG_Z,
            point: Vec3::ZERO,
        });
        step(&mut character, &mut motor, forward());
        assert_eq!(character.take_events().len(), 1);

        character.restart(&mut motor, Vec3::new(0.0, 0.1, 1.0));
        assert_eq!(motor.position, Vec3::new(0.0, 0.1, 1.0));
        assert_eq!(motor.velocity, Vec3::ZERO);

        step(&mut character, &mut motor, forward());
        assert_eq!(character.take_events(), vec![CharacterEvent::LevelFinished]);
    }

    #[test]
    fn test_set_position_keeps_stance() {
        let mut character = character();
        let mut motor = TestMotor::grounded();
        step(&mut character, &mut motor, toggle_crouch());
        motor.velocity = Vec3::new(3.0, 0.0, 0.0);

        character.set_position(&mut motor, Vec3::new(5.0, 1.0, 5.0), true);
        assert_eq!(motor.position, Vec3::new(5.0, 1.0, 5.0));
        assert_eq!(motor.velocity, Vec3::ZERO);
        assert_eq!(character.state().stance, Stance::Crouch);

        motor.velocity = Vec3::new(3.0, 0.0, 0.0);
        character.set_position(&mut motor, Vec3::ZERO, false);
        assert_eq!(motor.velocity, Vec3::new(3.0, 0.0, 0.0));
    }

    #[test]
    fn test_camera_target_lowers_when_crouched() {
        let mut character = character();
        let mut motor = TestMotor::grounded();
        let standing = character.camera_target().y;

        step(&mut character, &mut motor, toggle_crouch());
        for _ in 0..120 {
            step(&mut character, &mut motor, idle());
        }
        assert!(character.camera_target().y < standing);
        assert_abs_diff_eq!(character.camera_target().y, 0.7, epsilon = 1e-3);
        assert_abs_diff_eq!(character.root_scale().y, 0.5, epsilon = 1e-3);
    }
}
