//! Color temperature in mirek (micro reciprocal degrees).

use serde::{Deserialize, Serialize};

use crate::resource::LightState;

/// A color temperature already clamped into a [`MirekRange`].
///
/// Lower values are cooler: 153 mirek is roughly 6500K, 500 mirek is 2000K.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Mirek {
    pub(crate) value: u16,
}

impl Mirek {
    pub fn value(&self) -> u16 {
        self.value
    }

    /// Approximate correlated color temperature in Kelvin.
    pub fn kelvin(&self) -> u32 {
        1_000_000 / u32::from(self.value.max(1))
    }
}

/// The band of mirek values a group accepts.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MirekRange {
    min: u16,
    max: u16,
}

impl Default for MirekRange {
    fn default() -> Self {
        MirekRange {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

impl MirekRange {
    pub const DEFAULT_MIN: u16 = 153;
    pub const DEFAULT_MAX: u16 = 500;

    /// Returns None if `min > max`.
    pub fn new(min: u16, max: u16) -> Option<Self> {
        (min <= max).then_some(MirekRange { min, max })
    }

    pub fn min(&self) -> u16 {
        self.min
    }

    pub fn max(&self) -> u16 {
        self.max
    }

    /// Clamp any integer into the band.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_lights_rs::MirekRange;
    ///
    /// let range = MirekRange::default();
    /// assert_eq!(range.clamp(50).value(), 153);
    /// assert_eq!(range.clamp(1000).value(), 500);
    /// assert_eq!(range.clamp(366).value(), 366);
    /// ```
    pub fn clamp(&self, mirek: i64) -> Mirek {
        let value = mirek.clamp(i64::from(self.min), i64::from(self.max));
        Mirek {
            value: u16::try_from(value).unwrap_or(self.max),
        }
    }

    /// The band every light in `lights` can reproduce.
    ///
    /// Lights without a reported schema are ignored. Returns None when no
    /// light reports one or when the reported bands do not overlap.
    pub fn from_lights<'a>(lights: impl IntoIterator<Item = &'a LightState>) -> Option<Self> {
        lights
            .into_iter()
            .filter_map(LightState::mirek_schema)
            .map(|s| (s.mirek_minimum, s.mirek_maximum))
            .reduce(|(lo, hi), (min, max)| (lo.max(min), hi.min(max)))
            .and_then(|(min, max)| MirekRange::new(min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{ColorTemperature, MirekSchema};

    fn with_schema(min: u16, max: u16) -> LightState {
        LightState {
            color_temperature: Some(ColorTemperature {
                mirek: None,
                mirek_valid: None,
                mirek_schema: Some(MirekSchema {
                    mirek_minimum: min,
                    mirek_maximum: max,
                }),
            }),
            ..LightState::default()
        }
    }

    #[test]
    fn test_from_lights_intersects_schemas() {
        let lights = [with_schema(153, 454), with_schema(200, 500), LightState::default()];
        let range = MirekRange::from_lights(&lights).unwrap();
        assert_eq!((range.min(), range.max()), (200, 454));
    }

    #[test]
    fn test_from_lights_disjoint() {
        let lights = [with_schema(153, 200), with_schema(300, 500)];
        assert!(MirekRange::from_lights(&lights).is_none());
        assert!(MirekRange::from_lights(&[LightState::default()]).is_none());
    }

    #[test]
    fn test_kelvin() {
        assert_eq!(MirekRange::default().clamp(250).kelvin(), 4000);
    }
}
