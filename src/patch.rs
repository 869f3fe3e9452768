//! Partial updates sent to the bridge.

use serde::{Deserialize, Serialize};

use crate::resource::{ColorState, Dimming, On};
use crate::types::{Brightness, Mirek, Xy};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub(crate) struct MirekValue {
    pub(crate) mirek: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub(crate) struct Dynamics {
    pub(crate) duration: u32,
}

/// A partial update to send to a grouped light.
///
/// Patches can combine several attributes, which the bridge applies in a
/// single request.
///
/// # Creating Patches
///
/// 1. **From a single attribute** using the [`From`] trait:
///    ```
///    use hue_lights_rs::{Patch, Brightness};
///    let patch = Patch::from(&Brightness::new());
///    assert!(patch.is_valid());
///    ```
///
/// 2. **Builder pattern** for combining attributes:
///    ```
///    use hue_lights_rs::{Patch, Xy};
///    let mut patch = Patch::new();
///    patch.power(true);
///    patch.xy(&Xy::clamped(0.17, 0.7).unwrap());
///    patch.ramp(400);
///    ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Patch {
    pub(crate) on: Option<On>,
    pub(crate) dimming: Option<Dimming>,
    pub(crate) color_temperature: Option<MirekValue>,
    pub(crate) color: Option<ColorState>,
    pub(crate) dynamics: Option<Dynamics>,
}

impl Patch {
    /// Create a new empty patch.
    ///
    /// At least one attribute must be set for the patch to be valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_lights_rs::Patch;
    ///
    /// let mut patch = Patch::new();
    /// assert_eq!(patch.is_valid(), false);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this patch contains at least one state attribute.
    ///
    /// A ramp alone changes nothing and is not valid.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_lights_rs::Patch;
    ///
    /// let mut patch = Patch::new();
    /// patch.ramp(500);
    /// assert_eq!(patch.is_valid(), false);
    ///
    /// patch.power(false);
    /// assert_eq!(patch.is_valid(), true);
    /// ```
    pub fn is_valid(&self) -> bool {
        self.on.is_some()
            || self.dimming.is_some()
            || self.color_temperature.is_some()
            || self.color.is_some()
    }

    pub fn power(&mut self, on: bool) {
        self.on = Some(On { on });
    }

    pub fn brightness(&mut self, brightness: &Brightness) {
        self.dimming = Some(Dimming {
            brightness: brightness.value(),
        });
    }

    pub fn mirek(&mut self, mirek: &Mirek) {
        self.color_temperature = Some(MirekValue {
            mirek: mirek.value(),
        });
    }

    pub fn xy(&mut self, xy: &Xy) {
        self.color = Some(ColorState { xy: Some(*xy) });
    }

    /// Set the transition duration in milliseconds.
    pub fn ramp(&mut self, duration_ms: u32) {
        self.dynamics = Some(Dynamics {
            duration: duration_ms,
        });
    }

    /// Set the transition duration if one was requested.
    pub fn maybe_ramp(&mut self, duration_ms: Option<u32>) {
        if let Some(ms) = duration_ms {
            self.ramp(ms);
        }
    }

    pub(crate) fn get_power(&self) -> Option<bool> {
        self.on.map(|o| o.on)
    }

    pub(crate) fn get_brightness(&self) -> Option<f64> {
        self.dimming.map(|d| d.brightness)
    }
}

impl From<&Brightness> for Patch {
    fn from(brightness: &Brightness) -> Self {
        let mut p = Patch::new();
        p.brightness(brightness);
        p
    }
}

impl From<&Mirek> for Patch {
    fn from(mirek: &Mirek) -> Self {
        let mut p = Patch::new();
        p.mirek(mirek);
        p
    }
}

impl From<&Xy> for Patch {
    fn from(xy: &Xy) -> Self {
        let mut p = Patch::new();
        p.xy(xy);
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MirekRange;
    use serde_json::json;

    #[test]
    fn test_wire_shapes() {
        let mut patch = Patch::new();
        patch.power(true);
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"on": {"on": true}}));

        let mut patch = Patch::from(&Brightness::clamped(80.0).unwrap());
        patch.ramp(500);
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"dimming": {"brightness": 80.0}, "dynamics": {"duration": 500}})
        );

        let patch = Patch::from(&MirekRange::default().clamp(366));
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"color_temperature": {"mirek": 366}})
        );

        let patch = Patch::from(&Xy::clamped(0.25, 0.5).unwrap());
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"color": {"xy": {"x": 0.25, "y": 0.5}}})
        );
    }

    #[test]
    fn test_maybe_ramp() {
        let mut patch = Patch::new();
        patch.maybe_ramp(None);
        assert!(patch.dynamics.is_none());
        patch.maybe_ramp(Some(0));
        assert_eq!(patch.dynamics, Some(Dynamics { duration: 0 }));
    }
}
