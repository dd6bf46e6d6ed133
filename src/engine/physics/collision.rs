use rapier3d::prelude::*;
use std::fmt;
use std::str::FromStr;

/// Collision groups for filtering what the character sweeps and overlaps against
///
/// The stand-up overlap test and the motor sweep both use the player's filter,
/// so anything outside it (sensors, other players) never blocks a stand-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroups {
    /// Default group - interacts with everything
    Default = 0b0000_0001,

    /// Player characters
    Player = 0b0000_0010,

    /// Static level geometry (floors, ramps, walls, ceilings)
    Level = 0b0000_0100,

    /// Trigger volumes (kill zones, spawn gates) - never block movement
    Sensor = 0b0000_1000,
}

impl CollisionGroups {
    /// Raw membership bit
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Mask of the groups a player capsule is blocked by
    pub fn player_collidable_mask() -> u32 {
        CollisionGroups::Default.bits() | CollisionGroups::Level.bits()
    }

    /// Convert to rapier3d's InteractionGroups
    pub fn to_interaction_groups(self) -> InteractionGroups {
        let memberships = Group::from_bits_truncate(self as u32);

        let filter = match self {
            // Players collide with level geometry and sensors, not each other
            CollisionGroups::Player => Group::from_bits_truncate(
                Self::player_collidable_mask() | CollisionGroups::Sensor as u32,
            ),

            // Level geometry never needs to see other level geometry
            CollisionGroups::Level => Group::from_bits_truncate(
                CollisionGroups::Player as u32 | CollisionGroups::Default as u32,
            ),

            CollisionGroups::Sensor => Group::from_bits_truncate(CollisionGroups::Player as u32),

            CollisionGroups::Default => Group::ALL,
        };

        InteractionGroups::new(memberships, filter)
    }

    /// Query filter that only reports colliders inside `mask`
    pub fn query_filter(mask: u32) -> QueryFilter<'static> {
        QueryFilter::default()
            .groups(InteractionGroups::new(
                Group::ALL,
                Group::from_bits_truncate(mask),
            ))
            .exclude_sensors()
    }
}

/// Errors raised when level data names a surface the game does not know
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Unknown surface tag: {0}")]
    UnknownTag(String),

    #[error("Unknown surface layer: {0}")]
    UnknownLayer(String),
}

/// Named render layer of a collider, used for ground material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SurfaceLayer {
    #[default]
    Default,
    /// Low-friction ground: faster air control, weaker slope pull, extra slide boost
    Ice,
}

impl SurfaceLayer {
    /// Layer name as authored in level data
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Ice => "ice",
        }
    }
}

impl FromStr for SurfaceLayer {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Default" => Ok(Self::Default),
            "ice" => Ok(Self::Ice),
            other => Err(SurfaceError::UnknownLayer(other.to_string())),
        }
    }
}

impl fmt::Display for SurfaceLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gameplay tag carried by a collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceTag {
    /// Touching it completes the level
    Finish,
    /// Touching it forces the character into a slide on the next grounded tick
    Slide,
}

impl SurfaceTag {
    /// Tag name as authored in level data
    pub fn name(self) -> &'static str {
        match self {
            Self::Finish => "Finish",
            Self::Slide => "slide",
        }
    }
}

impl FromStr for SurfaceTag {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Finish" => Ok(Self::Finish),
            "slide" => Ok(Self::Slide),
            other => Err(SurfaceError::UnknownTag(other.to_string())),
        }
    }
}

impl fmt::Display for SurfaceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gameplay description of a collider the character can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Surface {
    pub layer: SurfaceLayer,
    pub tag: Option<SurfaceTag>,
}

impl Surface {
    /// Plain untagged ground
    pub fn plain() -> Self {
        Self::default()
    }

    /// Untagged ice
    pub fn ice() -> Self {
        Self {
            layer: SurfaceLayer::Ice,
            tag: None,
        }
    }

    /// Same surface with a tag attached
    pub fn with_tag(mut self, tag: SurfaceTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Build a surface from authored layer/tag names
    pub fn parse(layer: &str, tag: Option<&str>) -> Result<Self, SurfaceError> {
        let surface = Self {
            layer: layer.parse()?,
            tag: None,
        };
        match tag {
            Some(name) => Ok(surface.with_tag(name.parse()?)),
            None => Ok(surface),
        }
    }

    pub fn has_tag(&self, tag: SurfaceTag) -> bool {
        self.tag == Some(tag)
    }

    pub fn is_ice(&self) -> bool {
        self.layer == SurfaceLayer::Ice
    }
}
