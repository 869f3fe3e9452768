//! Resource records returned by the bridge.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::types::Xy;

/// The resource collections this crate reads from or writes to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResourceType {
    Light,
    Device,
    Room,
    Zone,
    GroupedLight,
}

/// A `(rid, rtype)` reference from one resource to another.
///
/// `rtype` is kept as a string because devices reference many service types
/// this crate never reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLink {
    pub rid: String,
    pub rtype: String,
}

impl ResourceLink {
    pub fn new(rtype: ResourceType, rid: &str) -> Self {
        ResourceLink {
            rid: rid.to_string(),
            rtype: rtype.to_string(),
        }
    }

    /// Check whether this link points at a resource of the given type.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_lights_rs::{ResourceLink, ResourceType};
    ///
    /// let link = ResourceLink::new(ResourceType::Room, "r1");
    /// assert!(link.is(ResourceType::Room));
    /// assert!(!link.is(ResourceType::Zone));
    /// ```
    pub fn is(&self, rtype: ResourceType) -> bool {
        self.rtype == rtype.as_ref()
    }

    /// Parse the link type, if it is one of the known [`ResourceType`]s.
    pub fn resource_type(&self) -> Option<ResourceType> {
        self.rtype.parse().ok()
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub name: Option<String>,
    pub archetype: Option<String>,
}

/// Trimmed name from optional metadata.
fn name_of(metadata: Option<&Metadata>) -> Option<&str> {
    metadata
        .and_then(|m| m.name.as_deref())
        .map(str::trim)
        .filter(|n| !n.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct On {
    pub on: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimming {
    pub brightness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirekSchema {
    pub mirek_minimum: u16,
    pub mirek_maximum: u16,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorTemperature {
    pub mirek: Option<u16>,
    pub mirek_valid: Option<bool>,
    pub mirek_schema: Option<MirekSchema>,
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorState {
    pub xy: Option<Xy>,
}

/// A grouped light: the addressable aggregate owned by a room or zone.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedLight {
    pub id: String,
    pub owner: Option<ResourceLink>,
    pub metadata: Option<Metadata>,
    pub on: Option<On>,
    pub dimming: Option<Dimming>,
}

impl GroupedLight {
    pub fn name(&self) -> Option<&str> {
        name_of(self.metadata.as_ref())
    }
}

/// A room or a zone. Both carry an ordered list of children.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub children: Vec<ResourceLink>,
}

impl Area {
    pub fn name(&self) -> Option<&str> {
        name_of(self.metadata.as_ref())
    }

    /// Identifiers of the children of type `device`, in listing order.
    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.children
            .iter()
            .filter(|c| c.is(ResourceType::Device))
            .map(|c| c.rid.as_str())
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub metadata: Option<Metadata>,
    #[serde(default)]
    pub services: Vec<ResourceLink>,
}

impl Device {
    pub fn name(&self) -> Option<&str> {
        name_of(self.metadata.as_ref())
    }

    /// Identifiers referenced by `light` services.
    pub fn light_ids(&self) -> impl Iterator<Item = &str> {
        self.services
            .iter()
            .filter(|s| s.is(ResourceType::Light))
            .map(|s| s.rid.as_str())
    }
}

/// Everything a light reports, minus its identifier.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub metadata: Option<Metadata>,
    pub on: Option<On>,
    pub dimming: Option<Dimming>,
    pub color_temperature: Option<ColorTemperature>,
    pub color: Option<ColorState>,
}

impl LightState {
    pub fn name(&self) -> Option<&str> {
        name_of(self.metadata.as_ref())
    }

    pub fn is_on(&self) -> Option<bool> {
        self.on.map(|o| o.on)
    }

    pub fn brightness(&self) -> Option<f64> {
        self.dimming.map(|d| d.brightness)
    }

    pub fn mirek(&self) -> Option<u16> {
        self.color_temperature.as_ref().and_then(|c| c.mirek)
    }

    pub fn mirek_schema(&self) -> Option<MirekSchema> {
        self.color_temperature.as_ref().and_then(|c| c.mirek_schema)
    }

    pub fn xy(&self) -> Option<Xy> {
        self.color.as_ref().and_then(|c| c.xy)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub id: String,
    #[serde(flatten)]
    pub state: LightState,
}
