// Character system
//
// This module contains everything related to the player character:
// - Stance and the per-tick state snapshot
// - Movement tuning
// - Input aggregation (jump buffering, crouch toggle)
// - Motion state machine (walk, crouch, slide, air, jump)
// - Capsule sizing and the smoothed camera/visual rig
// - Collision hooks (ice, slide pads, finish line)

pub mod body;
pub mod character;
pub mod config;
pub mod hooks;
pub mod input;
pub mod motion;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use character::PlayerCharacter;
pub use config::{ConfigError, MovementConfig};
pub use hooks::CharacterEvent;
pub use input::{CharacterInput, CrouchInput};
pub use state::{CharacterState, Stance};
