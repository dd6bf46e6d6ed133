// Movement tuning - one set of values drives every player character

/// Errors raised when a movement configuration cannot produce sane motion
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("crouch height {crouch} must be below stand height {stand}")]
    CrouchNotLower { crouch: f32, stand: f32 },

    #[error("capsule radius {radius} does not fit in crouch height {crouch}")]
    RadiusTooLarge { radius: f32, crouch: f32 },

    #[error("slide end speed {end} must be below slide start speed {start}")]
    SlideSpeedsInverted { end: f32, start: f32 },

    #[error("gravity must point down (negative), got {0}")]
    GravityNotDownward(f32),

    #[error("{name} must be within [0, 1], got {value}")]
    NotAFraction { name: &'static str, value: f32 },
}

/// Movement tuning for a player character
///
/// Material-dependent values come in default/ice pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct MovementConfig {
    // Slide entry and slope handling
    /// Planar speed that forces a slide and disables uphill braking
    pub no_uphill_brake_speed: f32,
    /// Slope (sine of the ground angle) below which ground counts as flat
    pub flat_slope_eps: f32,
    /// Downhill acceleration multiplier while fast
    pub downhill_fast_accel_multiplier: f32,
    /// Minimum planar speed for a slide-tagged surface to force a slide
    pub tagged_slide_min_speed: f32,

    // Ground movement
    pub walk_speed: f32,
    pub crouch_speed: f32,
    pub walk_response: f32,
    pub crouch_response: f32,

    // Air movement
    /// Planar speed cap that air acceleration can build up to
    pub air_speed: f32,
    pub air_acceleration: f32,
    pub air_acceleration_ice: f32,

    // Jump
    pub jump_speed: f32,
    /// Grace window for late jumps after leaving ground, also the jump buffer length
    pub coyote_time: f32,
    /// Gravity scale while jump is held and still rising
    pub jump_sustain_gravity: f32,
    pub gravity: f32,

    // Slide
    pub slide_start_speed: f32,
    pub slide_end_speed: f32,
    pub slide_friction: f32,
    pub slide_friction_ice: f32,
    pub slide_steer: f32,
    pub ice_steer_multiplier: f32,
    /// Extra speed added when a slide starts on ice
    pub ice_slide_boost: f32,
    /// Slope acceleration coefficient on ice
    pub ice_slide_gravity: f32,
    /// Slope acceleration coefficient on default ground
    pub max_slide_gravity: f32,
    /// Time spent below slide end speed before the slide ends anyway
    pub slide_low_speed_hold: f32,
    /// Slope below which a slow slide gets no downhill acceleration
    pub shallow_slope_eps: f32,

    // Body
    pub capsule_radius: f32,
    pub stand_height: f32,
    pub crouch_height: f32,
    pub crouch_height_response: f32,
    /// Camera mount height as a fraction of the capsule height
    pub stand_camera_target_height: f32,
    pub crouch_camera_target_height: f32,

    /// Turn the character toward its planar velocity when not aligned to the camera
    pub follow_movement_direction: bool,
}

/// Movement values tuned for the course layout
pub const BASE_CONFIG: MovementConfig = MovementConfig {
    no_uphill_brake_speed: 30.0,
    flat_slope_eps: 0.04,
    downhill_fast_accel_multiplier: 1.8,
    tagged_slide_min_speed: 0.0,

    walk_speed: 20.0,
    crouch_speed: 7.0,
    walk_response: 25.0,
    crouch_response: 25.0,

    air_speed: 15.0,
    air_acceleration: 70.0,
    air_acceleration_ice: 110.0,

    jump_speed: 20.0,
    coyote_time: 0.2,
    jump_sustain_gravity: 0.4,
    gravity: -90.0,

    slide_start_speed: 14.0,
    slide_end_speed: 4.0,
    slide_friction: 0.28,
    slide_friction_ice: 0.03,
    slide_steer: 6.0,
    ice_steer_multiplier: 1.3,
    ice_slide_boost: 5.0,
    ice_slide_gravity: 6.0,
    max_slide_gravity: 30.0,
    slide_low_speed_hold: 0.2,
    shallow_slope_eps: 0.12,

    capsule_radius: 0.5,
    stand_height: 2.0,
    crouch_height: 1.0,
    crouch_height_response: 15.0,
    stand_camera_target_height: 0.9,
    crouch_camera_target_height: 0.7,

    follow_movement_direction: false,
};

impl Default for MovementConfig {
    fn default() -> Self {
        BASE_CONFIG
    }
}

impl MovementConfig {
    /// Get the standard movement config
    pub fn standard() -> Self {
        BASE_CONFIG
    }

    /// Air acceleration for the current ground material
    pub fn air_acceleration_for(&self, on_ice: bool) -> f32 {
        if on_ice {
            self.air_acceleration_ice
        } else {
            self.air_acceleration
        }
    }

    pub fn slide_friction_for(&self, on_ice: bool) -> f32 {
        if on_ice {
            self.slide_friction_ice
        } else {
            self.slide_friction
        }
    }

    pub fn slide_steer_for(&self, on_ice: bool) -> f32 {
        if on_ice {
            self.slide_steer * self.ice_steer_multiplier
        } else {
            self.slide_steer
        }
    }

    /// Slope acceleration coefficient for the current ground material
    pub fn slide_gravity_for(&self, on_ice: bool) -> f32 {
        if on_ice {
            self.ice_slide_gravity
        } else {
            self.max_slide_gravity
        }
    }

    /// Check that the values can drive the movement solver
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("walk_speed", self.walk_speed),
            ("crouch_speed", self.crouch_speed),
            ("walk_response", self.walk_response),
            ("crouch_response", self.crouch_response),
            ("air_speed", self.air_speed),
            ("jump_speed", self.jump_speed),
            ("slide_start_speed", self.slide_start_speed),
            ("no_uphill_brake_speed", self.no_uphill_brake_speed),
            ("capsule_radius", self.capsule_radius),
            ("stand_height", self.stand_height),
            ("crouch_height", self.crouch_height),
            ("crouch_height_response", self.crouch_height_response),
        ];
        for (name, value) in positive {
            // Written this way so NaN fails too
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        let non_negative = [
            ("flat_slope_eps", self.flat_slope_eps),
            ("downhill_fast_accel_multiplier", self.downhill_fast_accel_multiplier),
            ("tagged_slide_min_speed", self.tagged_slide_min_speed),
            ("air_acceleration", self.air_acceleration),
            ("air_acceleration_ice", self.air_acceleration_ice),
            ("coyote_time", self.coyote_time),
            ("slide_end_speed", self.slide_end_speed),
            ("slide_friction", self.slide_friction),
            ("slide_friction_ice", self.slide_friction_ice),
            ("slide_steer", self.slide_steer),
            ("ice_steer_multiplier", self.ice_steer_multiplier),
            ("ice_slide_boost", self.ice_slide_boost),
            ("ice_slide_gravity", self.ice_slide_gravity),
            ("max_slide_gravity", self.max_slide_gravity),
            ("slide_low_speed_hold", self.slide_low_speed_hold),
            ("shallow_slope_eps", self.shallow_slope_eps),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }

        let fractions = [
            ("jump_sustain_gravity", self.jump_sustain_gravity),
            ("stand_camera_target_height", self.stand_camera_target_height),
            ("crouch_camera_target_height", self.crouch_camera_target_height),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::NotAFraction { name, value });
            }
        }

        if self.crouch_height >= self.stand_height {
            return Err(ConfigError::CrouchNotLower {
                crouch: self.crouch_height,
                stand: self.stand_height,
            });
        }

        if self.capsule_radius * 2.0 > self.crouch_height {
            return Err(ConfigError::RadiusTooLarge {
                radius: self.capsule_radius,
                crouch: self.crouch_height,
            });
        }

        if self.slide_end_speed >= self.slide_start_speed {
            return Err(ConfigError::SlideSpeedsInverted {
                end: self.slide_end_speed,
                start: self.slide_start_speed,
            });
        }

        if !(self.gravity < 0.0) {
            return Err(ConfigError::GravityNotDownward(self.gravity));
        }

        Ok(())
    }
}
