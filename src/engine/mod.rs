// Engine modules: fixed-step timing, input actions, collision and the character motor

pub mod game_loop;
pub mod input;
pub mod physics;
