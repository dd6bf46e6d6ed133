use glam::Vec3;
use rapier3d::prelude::*;

use super::collision::{CollisionGroups, Surface};
use super::motor::CapsuleDimensions;

/// Builder for static level blocks with common configurations
#[derive(Clone)]
pub struct BlockBuilder {
    half_extents: Vec3,
    center: Vec3,
    /// Euler rotation in radians (x = pitch, y = yaw, z = roll)
    rotation: Vec3,
    collision_groups: CollisionGroups,
    is_sensor: bool,
    surface: Surface,
}

impl BlockBuilder {
    /// Create a box-shaped block from its half extents
    pub fn cuboid(half_x: Real, half_y: Real, half_z: Real) -> Self {
        Self {
            half_extents: Vec3::new(half_x, half_y, half_z),
            center: Vec3::ZERO,
            rotation: Vec3::ZERO,
            collision_groups: CollisionGroups::Level,
            is_sensor: false,
            surface: Surface::plain(),
        }
    }

    /// Set the center of the block
    pub fn center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    /// Pitch the block around the X axis (positive lifts the +Z end)
    pub fn pitch(mut self, radians: Real) -> Self {
        self.rotation.x = -radians;
        self
    }

    /// Set the gameplay surface (layer + tag)
    pub fn surface(mut self, surface: Surface) -> Self {
        self.surface = surface;
        self
    }

    /// Make this a trigger volume (detected but never blocks)
    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self.collision_groups = CollisionGroups::Sensor;
        self
    }

    /// Gameplay surface this block will be registered with
    pub fn surface_info(&self) -> Surface {
        self.surface
    }

    /// Build the collider
    pub fn build(self) -> Collider {
        ColliderBuilder::cuboid(self.half_extents.x, self.half_extents.y, self.half_extents.z)
            .translation(vector![self.center.x, self.center.y, self.center.z])
            .rotation(vector![self.rotation.x, self.rotation.y, self.rotation.z])
            .collision_groups(self.collision_groups.to_interaction_groups())
            .sensor(self.is_sensor)
            .friction(0.0)
            .build()
    }
}

/// Rapier capsule matching the character's current dimensions
pub fn character_capsule(dimensions: CapsuleDimensions) -> Capsule {
    let half_segment = (dimensions.height * 0.5 - dimensions.radius).max(0.0);
    Capsule::new_y(half_segment, dimensions.radius)
}

/// Common block configurations for course geometry
pub mod presets {
    use super::*;

    /// Flat floor whose top face sits at `top_y`
    pub fn floor(center_x: Real, center_z: Real, top_y: Real, half_x: Real, half_z: Real) -> BlockBuilder {
        BlockBuilder::cuboid(half_x, 0.5, half_z).center(Vec3::new(center_x, top_y - 0.5, center_z))
    }

    /// Ramp running along +Z, rising by `angle` radians (negative angles descend)
    ///
    /// `start` is the midpoint of the ramp's top edge at its low-Z end.
    pub fn ramp(start: Vec3, length: Real, half_width: Real, angle: Real) -> BlockBuilder {
        let along = Vec3::new(0.0, angle.sin(), angle.cos());
        let normal = Vec3::new(0.0, angle.cos(), -angle.sin());
        let center = start + along * (length * 0.5) - normal * 0.5;
        BlockBuilder::cuboid(half_width, 0.5, length * 0.5)
            .center(center)
            .pitch(angle)
    }

    /// Low ceiling slab whose underside sits at `bottom_y`
    pub fn ceiling(center: Vec3, bottom_y: Real, half_x: Real, half_z: Real) -> BlockBuilder {
        BlockBuilder::cuboid(half_x, 0.25, half_z).center(Vec3::new(center.x, bottom_y + 0.25, center.z))
    }

    /// Upright wall block
    pub fn wall(center: Vec3, half_extents: Vec3) -> BlockBuilder {
        BlockBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).center(center)
    }
}
