// Reactions to the colliders the motor reports touching

use log::{debug, info};

use crate::engine::physics::{MotorHit, SurfaceTag};

/// Something the surrounding game should react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterEvent {
    /// The character ran into a finish-tagged collider
    LevelFinished,
}

/// Ground material and tag-triggered effects, applied on the next tick
#[derive(Debug, Default)]
pub struct CollisionHooks {
    on_ice: bool,
    force_slide_pending: bool,
    finished: bool,
    events: Vec<CharacterEvent>,
}

impl CollisionHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ground material of the last ground hit
    pub fn on_ice(&self) -> bool {
        self.on_ice
    }

    pub fn force_slide_pending(&self) -> bool {
        self.force_slide_pending
    }

    /// Clear and return the pending forced slide
    pub fn take_force_slide(&mut self) -> bool {
        std::mem::take(&mut self.force_slide_pending)
    }

    pub fn on_ground_hit(&mut self, hit: &MotorHit) {
        self.on_ice = hit.surface.is_ice();
        self.schedule_slide_if_tagged(hit);
    }

    pub fn on_movement_hit(&mut self, hit: &MotorHit) {
        if hit.surface.has_tag(SurfaceTag::Finish) && !self.finished {
            // A run only finishes once, however many ticks we keep touching it
            self.finished = true;
            info!("Finish line reached at {:?}", hit.point);
            self.events.push(CharacterEvent::LevelFinished);
        }
        self.schedule_slide_if_tagged(hit);
    }

    /// Events raised since the last call
    pub fn take_events(&mut self) -> Vec<CharacterEvent> {
        std::mem::take(&mut self.events)
    }

    /// Allow the finish line to fire again, e.g. after a restart
    pub fn reset_finish(&mut self) {
        self.finished = false;
    }

    fn schedule_slide_if_tagged(&mut self, hit: &MotorHit) {
        if hit.surface.has_tag(SurfaceTag::Slide) && !self.force_slide_pending {
            debug!("Slide surface touched, forcing a slide on the next grounded tick");
            self.force_slide_pending = true;
        }
    }
}
