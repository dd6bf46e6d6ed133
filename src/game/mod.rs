// Game layer: the player character and the course it runs on

pub mod characters;
pub mod course;
