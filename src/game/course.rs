// Course layout - static level geometry laid out along +Z

use glam::Vec3;
use log::info;

use crate::engine::physics::body::{presets, BlockBuilder};
use crate::engine::physics::{PhysicsWorld, Surface, SurfaceError};

/// Half width of every course segment
const TRACK_HALF_WIDTH: f32 = 4.0;

/// A static level the character runs through
pub struct Course {
    pub name: &'static str,
    /// Where the character starts and respawns
    pub spawn: Vec3,
    /// Falling below this height sends the character back to spawn
    pub kill_height: f32,
    blocks: Vec<BlockBuilder>,
}

impl Course {
    /// Start floor, a downhill ramp onto ice, a slide pad, a low tunnel, an
    /// uphill ramp and a finish wall
    pub fn demo() -> Result<Self, SurfaceError> {
        let plain = Surface::parse("Default", None)?;
        let ice = Surface::parse("ice", None)?;
        let slide_pad = Surface::parse("Default", Some("slide"))?;
        let finish = Surface::parse("Default", Some("Finish"))?;

        let mut layout = CourseLayout::new(Vec3::new(0.0, 0.0, -2.0));
        layout
            .flat(24.0, plain)
            .ramp(20.0, -15.0, plain)
            .flat(20.0, ice)
            .flat(5.0, slide_pad)
            .tunnel(12.0, 1.5, plain)
            .flat(6.0, plain)
            .ramp(10.0, 10.0, plain)
            .flat(6.0, plain)
            .wall(3.0, finish);

        Ok(Self {
            name: "demo",
            spawn: Vec3::new(0.0, 0.1, 1.0),
            kill_height: layout.lowest - 20.0,
            blocks: layout.blocks,
        })
    }

    /// Number of blocks in the course
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Insert every block into the world and rebuild its queries
    pub fn build_into(&self, world: &mut PhysicsWorld) {
        for block in &self.blocks {
            let surface = block.surface_info();
            world.add_static_collider(block.clone().build(), surface);
        }
        world.refresh();
        info!(
            "Course '{}' built with {} blocks",
            self.name,
            self.block_count()
        );
    }
}

/// Appends segments end to end, tracking the top edge of the last one
struct CourseLayout {
    cursor: Vec3,
    lowest: f32,
    blocks: Vec<BlockBuilder>,
}

impl CourseLayout {
    fn new(start: Vec3) -> Self {
        Self {
            cursor: start,
            lowest: start.y,
            blocks: Vec::new(),
        }
    }

    fn flat(&mut self, length: f32, surface: Surface) -> &mut Self {
        let center_z = self.cursor.z + length * 0.5;
        self.blocks.push(
            presets::floor(self.cursor.x, center_z, self.cursor.y, TRACK_HALF_WIDTH, length * 0.5)
                .surface(surface),
        );
        self.cursor.z += length;
        self
    }

    fn ramp(&mut self, length: f32, degrees: f32, surface: Surface) -> &mut Self {
        let angle = degrees.to_radians();
        self.blocks
            .push(presets::ramp(self.cursor, length, TRACK_HALF_WIDTH, angle).surface(surface));
        self.cursor += Vec3::new(0.0, angle.sin(), angle.cos()) * length;
        self.lowest = self.lowest.min(self.cursor.y);
        self
    }

    /// Flat floor with a ceiling `clearance` above it
    fn tunnel(&mut self, length: f32, clearance: f32, surface: Surface) -> &mut Self {
        let center = self.cursor + Vec3::Z * (length * 0.5);
        self.blocks.push(
            presets::ceiling(center, self.cursor.y + clearance, TRACK_HALF_WIDTH, length * 0.5)
                .surface(surface),
        );
        self.flat(length, surface)
    }

    /// Wall standing across the track at the cursor
    fn wall(&mut self, height: f32, surface: Surface) -> &mut Self {
        let center = self.cursor + Vec3::new(0.0, height * 0.5, -0.5);
        self.blocks.push(
            presets::wall(center, Vec3::new(TRACK_HALF_WIDTH, height * 0.5, 0.5)).surface(surface),
        );
        self
    }
}
