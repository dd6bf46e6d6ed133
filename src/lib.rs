// Kinematic slide/jump movement controller and the engine pieces it runs on

pub mod core;
pub mod engine;
pub mod game;
