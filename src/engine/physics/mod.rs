// Collision world, level geometry and the kinematic motor using rapier3d

pub mod body;
pub mod collision;
mod kinematic;
pub mod motor;
mod world;

pub use collision::{Surface, SurfaceError, SurfaceTag};
pub use kinematic::{KinematicMotor, MotorProfile};
pub use motor::{CapsuleDimensions, CharacterController, GroundMotor, GroundingStatus, MotorHit};
pub use world::PhysicsWorld;
