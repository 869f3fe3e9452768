//! Resolving human-readable hints to grouped lights.
//!
//! The bridge models ownership as a graph: a grouped light is owned by a room
//! or a zone, which lists devices as children, each of which exposes a light
//! service. [`Resolver`] walks that graph, fetching every collection fresh on
//! each call since the bridge can change between calls.

use std::collections::{BTreeMap, HashSet};

use log::debug;

use crate::client::{ResourceClient, fetch_as};
use crate::errors::{Error, Observed};
use crate::resource::{Area, Device, GroupedLight, Light, LightState, ResourceLink, ResourceType};

type Result<T> = std::result::Result<T, Error>;

/// A grouped light together with its owner and member lights.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub group_id: String,
    pub owner: ResourceLink,
    pub members: BTreeMap<String, LightState>,
}

/// Maps names and identifiers to grouped lights.
///
/// Matching is greedy: when several groups, rooms or zones contain the hint,
/// the first one in listing order wins (groups first, then rooms, then zones).
/// No attempt is made to pick a "better" match.
pub struct Resolver<C> {
    client: C,
}

impl<C: ResourceClient> Resolver<C> {
    pub fn new(client: C) -> Self {
        Resolver { client }
    }

    /// Resolve a case-insensitive name fragment to a grouped light id.
    ///
    /// A grouped light whose own name contains the hint wins outright.
    /// Otherwise the first room (then zone) whose name contains the hint is
    /// taken as owner, and the grouped light it owns is returned.
    pub async fn resolve(&self, hint: &str) -> Result<String> {
        let needle = hint.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::invalid_input("empty group hint"));
        }

        let groups: Vec<GroupedLight> = fetch_as(&self.client, ResourceType::GroupedLight).await?;
        if let Some(group) = groups.iter().find(|g| name_matches(g.name(), &needle)) {
            debug!("'{hint}' matched grouped light {} by name", group.id);
            return Ok(group.id.clone());
        }

        let rooms: Vec<Area> = fetch_as(&self.client, ResourceType::Room).await?;
        let zones: Vec<Area> = fetch_as(&self.client, ResourceType::Zone).await?;

        let owner = rooms
            .iter()
            .map(|r| (ResourceType::Room, r))
            .chain(zones.iter().map(|z| (ResourceType::Zone, z)))
            .find(|(_, area)| name_matches(area.name(), &needle));

        if let Some((rtype, area)) = owner {
            let link = ResourceLink::new(rtype, &area.id);
            if let Some(group) = groups.iter().find(|g| g.owner.as_ref() == Some(&link)) {
                debug!("'{hint}' matched {rtype} {} owning grouped light {}", area.id, group.id);
                return Ok(group.id.clone());
            }
            debug!("'{hint}' matched {rtype} {} but no grouped light is owned by it", area.id);
        }

        Err(Error::NotFound {
            hint: hint.to_string(),
            observed: observe(&groups, &rooms, &zones),
        })
    }

    /// Accept only an exact grouped light identifier.
    pub async fn resolve_exact(&self, id: &str) -> Result<String> {
        let groups: Vec<GroupedLight> = fetch_as(&self.client, ResourceType::GroupedLight).await?;
        if groups.iter().any(|g| g.id == id) {
            return Ok(id.to_string());
        }

        let rooms: Vec<Area> = fetch_as(&self.client, ResourceType::Room).await?;
        let zones: Vec<Area> = fetch_as(&self.client, ResourceType::Zone).await?;
        Err(Error::NotFound {
            hint: id.to_string(),
            observed: observe(&groups, &rooms, &zones),
        })
    }

    /// The room or zone owning a grouped light.
    pub async fn owner(&self, group_id: &str) -> Result<Area> {
        self.owner_of(group_id).await.map(|(_, area)| area)
    }

    /// The lights belonging to a grouped light, keyed by light id.
    ///
    /// Devices or light services that point at nothing are skipped.
    pub async fn members(&self, group_id: &str) -> Result<BTreeMap<String, LightState>> {
        let (_, owner) = self.owner_of(group_id).await?;
        self.members_of(&owner).await
    }

    /// Resolve a hint and collect everything needed to drive the group.
    pub async fn resolve_target(&self, hint: &str) -> Result<ResolvedTarget> {
        let group_id = self.resolve(hint).await?;
        let (rtype, owner) = self.owner_of(&group_id).await?;
        let members = self.members_of(&owner).await?;

        Ok(ResolvedTarget {
            group_id,
            owner: ResourceLink::new(rtype, &owner.id),
            members,
        })
    }

    async fn owner_of(&self, group_id: &str) -> Result<(ResourceType, Area)> {
        let groups: Vec<GroupedLight> = fetch_as(&self.client, ResourceType::GroupedLight).await?;
        let Some(group) = groups.iter().find(|g| g.id == group_id) else {
            let rooms: Vec<Area> = fetch_as(&self.client, ResourceType::Room).await?;
            let zones: Vec<Area> = fetch_as(&self.client, ResourceType::Zone).await?;
            return Err(Error::NotFound {
                hint: group_id.to_string(),
                observed: observe(&groups, &rooms, &zones),
            });
        };

        let Some(owner) = &group.owner else {
            return Err(Error::invalid_input(format!(
                "grouped light {group_id} has no owner"
            )));
        };

        let rtype = match owner.resource_type() {
            Some(rtype @ (ResourceType::Room | ResourceType::Zone)) => rtype,
            _ => {
                return Err(Error::invalid_input(format!(
                    "grouped light {group_id} is owned by a {}, not a room or zone",
                    owner.rtype
                )));
            }
        };

        let areas: Vec<Area> = fetch_as(&self.client, rtype).await?;
        let area = areas
            .into_iter()
            .find(|a| a.id == owner.rid)
            .ok_or_else(|| Error::dangling(rtype, &owner.rid))?;
        Ok((rtype, area))
    }

    async fn members_of(&self, owner: &Area) -> Result<BTreeMap<String, LightState>> {
        let device_ids: HashSet<&str> = owner.device_ids().collect();

        let devices: Vec<Device> = fetch_as(&self.client, ResourceType::Device).await?;
        let light_ids: HashSet<&str> = devices
            .iter()
            .filter(|d| device_ids.contains(d.id.as_str()))
            .flat_map(|d| d.light_ids())
            .collect();

        let lights: Vec<Light> = fetch_as(&self.client, ResourceType::Light).await?;
        let members: BTreeMap<String, LightState> = lights
            .into_iter()
            .filter(|l| light_ids.contains(l.id.as_str()))
            .map(|l| (l.id, l.state))
            .collect();

        if members.len() < light_ids.len() {
            debug!(
                "{} light reference(s) under {} do not resolve",
                light_ids.len() - members.len(),
                owner.id
            );
        }

        Ok(members)
    }
}

fn name_matches(name: Option<&str>, needle: &str) -> bool {
    name.is_some_and(|n| n.to_lowercase().contains(needle))
}

fn named(areas: &[Area]) -> Vec<(String, String)> {
    areas
        .iter()
        .map(|a| (a.name().unwrap_or(Observed::UNNAMED).to_string(), a.id.clone()))
        .collect()
}

fn observe(groups: &[GroupedLight], rooms: &[Area], zones: &[Area]) -> Observed {
    Observed {
        groups: groups
            .iter()
            .map(|g| g.name().unwrap_or(Observed::UNNAMED).to_string())
            .collect(),
        rooms: named(rooms),
        zones: named(zones),
    }
}
