use glam::Vec3;
use rapier3d::prelude::*;
use std::collections::HashMap;

use super::collision::{CollisionGroups, Surface};

/// Handle to identify colliders
pub type ColliderHandle = rapier3d::prelude::ColliderHandle;

/// Static collision world the character motor queries against
///
/// Level geometry never moves, so there is no simulation step: the query
/// pipeline only has to be rebuilt after colliders are added or removed.
pub struct PhysicsWorld {
    /// Gravity vector; its opposite defines "up" for the motor
    gravity: Vector<Real>,

    /// Rigid body set (empty for a purely static level, but required by queries)
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,

    /// Query pipeline for raycasts, sweeps and overlaps
    query_pipeline: QueryPipeline,

    /// Gameplay surface for each collider (layer + tag)
    collider_to_surface: HashMap<ColliderHandle, Surface>,

    /// Whether colliders changed since the last query pipeline update
    dirty: bool,
}

impl PhysicsWorld {
    /// Create a new world with standard gravity
    pub fn new() -> Self {
        Self::with_gravity(vector![0.0, -9.81, 0.0])
    }

    /// Create a new world with custom gravity
    pub fn with_gravity(gravity: Vector<Real>) -> Self {
        Self {
            gravity,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
            collider_to_surface: HashMap::new(),
            dirty: false,
        }
    }

    /// Add a fixed piece of level geometry
    pub fn add_static_collider(&mut self, collider: Collider, surface: Surface) -> ColliderHandle {
        let handle = self.collider_set.insert(collider);
        self.collider_to_surface.insert(handle, surface);
        self.dirty = true;
        handle
    }

    /// Rebuild acceleration structures after geometry changes
    pub fn refresh(&mut self) {
        if self.dirty {
            self.query_pipeline.update(&self.collider_set);
            self.dirty = false;
        }
    }

    /// Surface of a collider; untracked colliders are plain ground
    pub fn surface(&self, handle: ColliderHandle) -> Surface {
        self.collider_to_surface
            .get(&handle)
            .copied()
            .unwrap_or_default()
    }

    pub fn bodies(&self) -> &RigidBodySet {
        &self.rigid_body_set
    }

    pub fn colliders(&self) -> &ColliderSet {
        &self.collider_set
    }

    pub fn query_pipeline(&self) -> &QueryPipeline {
        &self.query_pipeline
    }

    /// Number of colliders in the world
    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }

    /// Cast a ray against blocking geometry and return the first hit with its normal
    pub fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_toi: Real,
    ) -> Option<(ColliderHandle, Vec3)> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );
        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_toi,
                true,
                CollisionGroups::query_filter(CollisionGroups::player_collidable_mask()),
            )
            .map(|(handle, hit)| (handle, Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z)))
    }

    /// World up, opposite to gravity
    pub fn up(&self) -> Vec3 {
        if self.gravity.norm_squared() > 1.0e-6 {
            let up = -self.gravity.normalize();
            Vec3::new(up.x, up.y, up.z)
        } else {
            Vec3::Y
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
