// Input handling system
//
// Device-agnostic action state for a single local player. Whatever produces
// presses (a window event loop, a replay, a scripted run) calls `press` and
// `release`, the game reads the frame's state, then `update` rolls it over.
//
// ## Architecture
//
// - `action`: Defines game actions
// - `player`: Per-player pressed / just-pressed / just-released state
//
// ## Usage Example
//
// ```rust
// use engine::input::{Action, PlayerInput};
//
// let mut input = PlayerInput::new();
// input.press(Action::Jump);
//
// if input.just_pressed(Action::Jump) {
//     // Jump was pressed this frame
// }
//
// // At the end of each frame, roll the state over
// input.update();
// ```

pub mod action;
pub mod player;

pub use action::Action;
pub use player::PlayerInput;
