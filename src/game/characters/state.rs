// Character stance and per-tick state snapshot

use glam::Vec3;

/// Movement mode of the character
///
/// Exactly one is active at a time; the capsule height follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stance {
    #[default]
    Stand,
    Crouch,
    Slide,
}

impl Stance {
    /// Whether the capsule should be at crouch height in this stance
    pub fn is_low(&self) -> bool {
        matches!(self, Self::Crouch | Self::Slide)
    }

    /// Get the animation name for this stance
    pub fn animation_name(&self) -> &'static str {
        match self {
            Self::Stand => "stand",
            Self::Crouch => "crouch",
            Self::Slide => "slide",
        }
    }
}

/// Snapshot of the character read by cameras and animation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CharacterState {
    /// Stable ground contact as of the last motor update
    pub grounded: bool,
    pub stance: Stance,
    /// Velocity committed by the motor
    pub velocity: Vec3,
    /// Velocity change produced by this tick's solve
    pub acceleration: Vec3,
}

impl CharacterState {
    /// Planar speed with respect to `up`
    pub fn planar_speed(&self, up: Vec3) -> f32 {
        (self.velocity - up * self.velocity.dot(up)).length()
    }
}
