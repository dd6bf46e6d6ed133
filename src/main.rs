use anyhow::Result;
use glam::{Quat, Vec3};
use log::{debug, info, warn};
use rapier3d::prelude::Vector;
use std::time::Duration;

use slope_runner::engine::game_loop::{GameLoop, ScheduledEvents};
use slope_runner::engine::input::{Action, PlayerInput};
use slope_runner::engine::physics::{CapsuleDimensions, KinematicMotor, MotorProfile, PhysicsWorld};
use slope_runner::game::characters::{CharacterEvent, CharacterInput, MovementConfig, PlayerCharacter};
use slope_runner::game::course::Course;

/// Length of one synthetic render frame
const FRAME_TIME: Duration = Duration::from_millis(20);

/// Give up on the run after this much simulated time
const RUN_TIMEOUT: f32 = 30.0;

/// Scripted key events for the headless demo run
#[derive(Debug, Clone, Copy)]
enum Key {
    Press(Action),
    Release(Action),
}

fn demo_script() -> ScheduledEvents<Key> {
    let mut script = ScheduledEvents::new();
    script.schedule(0.5, Key::Press(Action::MoveForward));
    // Slide down the ramp
    script.schedule(1.1, Key::Press(Action::Crouch));
    script.schedule(1.2, Key::Release(Action::Crouch));
    // Hop onto the ice
    script.schedule(2.0, Key::Press(Action::Jump));
    script.schedule(2.1, Key::Release(Action::Jump));
    // Stand up once out of the tunnel
    script.schedule(5.5, Key::Press(Action::Crouch));
    script.schedule(5.6, Key::Release(Action::Crouch));
    script.schedule(6.5, Key::Press(Action::Crouch));
    script.schedule(6.6, Key::Release(Action::Crouch));
    script
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting Slope Runner...");

    let config = MovementConfig::standard();
    let mut world = PhysicsWorld::with_gravity(Vector::new(0.0, config.gravity, 0.0));
    let course = Course::demo()?;
    course.build_into(&mut world);
    debug!("World holds {} colliders", world.collider_count());

    let capsule = CapsuleDimensions::standing_on_feet(config.capsule_radius, config.stand_height);
    let mut character = PlayerCharacter::new(config)?;
    let mut motor = KinematicMotor::new(MotorProfile::default(), course.spawn, capsule);
    character.initialize(&mut motor.view(&world));

    let mut game_loop = GameLoop::new();
    let mut input = PlayerInput::new();
    let mut script = demo_script();
    let dt = game_loop.fixed_timestep();
    let mut last_report = 0.0;

    'run: while game_loop.sim_time() < RUN_TIMEOUT {
        let updates = game_loop.advance(FRAME_TIME);

        for now in game_loop.step_times(updates) {
            for key in script.drain_due(now) {
                debug!("Script key {:?}", key);
                match key {
                    Key::Press(action) => input.press(action),
                    Key::Release(action) => input.release(action),
                }
            }

            let intents = CharacterInput::from_actions(&input, Quat::IDENTITY, true);
            character.update_input(&intents);
            motor.simulate(&world, &mut character, dt);
            character.update_body(&motor.view(&world), dt);
            input.update();

            if motor.position().y < course.kill_height {
                warn!("Fell out of the course, respawning");
                character.restart(&mut motor.view(&world), course.spawn);
            }

            for event in character.take_events() {
                match event {
                    CharacterEvent::LevelFinished => {
                        info!(
                            "Finished '{}' in {:.2}s at {:?}",
                            course.name,
                            now + dt,
                            motor.position()
                        );
                        break 'run;
                    }
                }
            }
        }

        if game_loop.sim_time() - last_report >= 1.0 {
            last_report = game_loop.sim_time();
            let state = character.state();
            let position = motor.position();
            info!(
                "t={:.1}s pos=({:.2}, {:.2}, {:.2}) stance={} grounded={} speed={:.1} ice={} air_crouch={}",
                game_loop.sim_time(),
                position.x,
                position.y,
                position.z,
                state.stance.animation_name(),
                state.grounded,
                state.planar_speed(Vec3::Y),
                character.on_ice(),
                character.crouched_in_air()
            );
        }
    }

    if game_loop.sim_time() >= RUN_TIMEOUT {
        warn!("Run timed out after {:.0}s", RUN_TIMEOUT);
    }

    info!(
        "Ran {} frames, {} updates",
        game_loop.frame_count(),
        game_loop.update_count()
    );
    Ok(())
}
