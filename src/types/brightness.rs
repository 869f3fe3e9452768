//! Brightness control for Hue groups.

use serde::{Deserialize, Serialize};

/// Brightness level from 1 to 100 percent.
///
/// Zero is not a brightness: a dark group is switched off through
/// [`GroupController::set_power`](crate::GroupController::set_power).
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, PartialOrd)]
pub struct Brightness {
    pub(crate) value: f64,
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new()
    }
}

impl Brightness {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 100.0;

    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns None if value is outside valid range (1-100).
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_lights_rs::Brightness;
    ///
    /// assert!(Brightness::create(0.5).is_none());
    /// assert_eq!(Brightness::create(42.5).unwrap().value(), 42.5);
    /// ```
    pub fn create(value: f64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Brightness { value })
        } else {
            None
        }
    }

    /// Clamps value into the valid range. Returns None only for NaN.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_lights_rs::Brightness;
    ///
    /// assert_eq!(Brightness::clamped(150.0).unwrap().value(), 100.0);
    /// assert_eq!(Brightness::clamped(-5.0).unwrap().value(), 1.0);
    /// assert!(Brightness::clamped(f64::NAN).is_none());
    /// ```
    pub fn clamped(value: f64) -> Option<Self> {
        if value.is_nan() {
            return None;
        }
        Some(Brightness {
            value: value.clamp(Self::MIN, Self::MAX),
        })
    }
}
