//! CIE 1931 chromaticity coordinates.

use serde::{Deserialize, Serialize};

/// A point in the CIE xy chromaticity diagram, both axes in `[0, 1]`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Xy {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

impl Xy {
    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Returns None if either axis is outside `[0, 1]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_lights_rs::Xy;
    ///
    /// assert!(Xy::create(0.3, 1.2).is_none());
    /// assert_eq!(Xy::create(0.3, 0.3).unwrap().x(), 0.3);
    /// ```
    pub fn create(x: f64, y: f64) -> Option<Self> {
        let valid = |v: f64| (0.0..=1.0).contains(&v);
        (valid(x) && valid(y)).then_some(Xy { x, y })
    }

    /// Clamps each axis into `[0, 1]`. Returns None only for NaN.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_lights_rs::Xy;
    ///
    /// let xy = Xy::clamped(1.5, -0.2).unwrap();
    /// assert_eq!((xy.x(), xy.y()), (1.0, 0.0));
    /// ```
    pub fn clamped(x: f64, y: f64) -> Option<Self> {
        if x.is_nan() || y.is_nan() {
            return None;
        }
        Some(Xy {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        })
    }
}
