//! Grouped light control with debounced writes.

use log::debug;
use serde_json::Value;

use crate::client::ResourceClient;
use crate::config::ControllerOptions;
use crate::errors::Error;
use crate::history::{WriteHistory, WriteKind};
use crate::patch::Patch;
use crate::resolver::{ResolvedTarget, Resolver};
use crate::resource::ResourceType;
use crate::types::{Brightness, MirekRange, Xy};

type Result<T> = std::result::Result<T, Error>;

/// Whether a requested change reached the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The write was sent and acknowledged.
    Applied,
    /// The write was skipped because it matched the last applied state.
    Debounced,
}

/// The last values the bridge acknowledged for this group.
///
/// Only power and brightness are tracked; color writes are never skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerState {
    power: Option<bool>,
    brightness: Option<f64>,
}

impl ControllerState {
    pub fn power(&self) -> Option<bool> {
        self.power
    }

    pub fn brightness(&self) -> Option<f64> {
        self.brightness
    }
}

/// Drives one grouped light on the bridge.
///
/// The controller remembers the last power and brightness values the bridge
/// acknowledged and skips writes that would not change them. The cache is only
/// updated after a successful write, so a failed write is retried by the next
/// identical request.
///
/// Methods take `&mut self`: a controller has a single owner, and two effects
/// cannot drive it at the same time.
///
/// # Example
///
/// ```ignore
/// use hue_lights_rs::{GroupController, HttpClient, BridgeConfig};
///
/// let client = HttpClient::new(&BridgeConfig::from_env()?)?;
/// let mut office = GroupController::from_hint(&client, "office").await?;
/// office.turn_on(80.0, Some(400)).await?;
/// office.set_color_temperature(366, None).await?;
/// ```
#[derive(Debug)]
pub struct GroupController<C> {
    client: C,
    group_id: String,
    options: ControllerOptions,
    state: ControllerState,
    history: WriteHistory,
}

impl<C: ResourceClient> GroupController<C> {
    pub fn new(client: C, group_id: &str) -> Self {
        GroupController {
            client,
            group_id: group_id.to_string(),
            options: ControllerOptions::default(),
            state: ControllerState::default(),
            history: WriteHistory::new(),
        }
    }

    /// Build a controller with custom tuning, rejecting unusable options.
    pub fn with_options(client: C, group_id: &str, options: ControllerOptions) -> Result<Self> {
        options.validate()?;
        Ok(GroupController {
            options,
            ..Self::new(client, group_id)
        })
    }

    /// Resolve `hint` to a grouped light and build a controller for it.
    ///
    /// Color temperature is clamped to the default mirek band. Use
    /// [`from_target`](Self::from_target) to clamp to the band the member
    /// lights report instead.
    pub async fn from_hint(client: C, hint: &str) -> Result<Self> {
        let group_id = Resolver::new(&client).resolve(hint).await?;
        Ok(Self::new(client, &group_id))
    }

    /// Build a controller for a resolved group, narrowing the mirek band to
    /// what every member light can reproduce.
    pub fn from_target(client: C, target: &ResolvedTarget) -> Self {
        let mut controller = Self::new(client, &target.group_id);
        if let Some(range) = MirekRange::from_lights(target.members.values()) {
            controller.options.mirek_range = range;
        } else {
            debug!(
                "grouped light {}: members report no common mirek band, using the default",
                target.group_id
            );
        }
        controller
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn history(&self) -> &WriteHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Forget the cached state so the next write of any value is sent.
    pub fn reset(&mut self) {
        self.state = ControllerState::default();
    }

    /// Switch the group on or off.
    ///
    /// Skipped when the value matches the last applied one and no ramp is
    /// requested. A ramp always forces the write.
    pub async fn set_power(&mut self, on: bool, ramp_ms: Option<u32>) -> Result<Outcome> {
        let mut patch = Patch::new();
        patch.power(on);
        patch.maybe_ramp(ramp_ms);

        if ramp_ms.is_none() && self.state.power == Some(on) {
            return Ok(self.skip(&patch));
        }

        self.send(&patch).await?;
        self.state.power = patch.get_power();
        Ok(Outcome::Applied)
    }

    /// Set the brightness, clamped to 1-100 percent.
    ///
    /// Skipped when within `brightness_epsilon` of the last applied value and
    /// no ramp is requested.
    pub async fn set_brightness(&mut self, percent: f64, ramp_ms: Option<u32>) -> Result<Outcome> {
        let brightness = Brightness::clamped(percent)
            .ok_or_else(|| Error::invalid_input("brightness is not a number"))?;

        let mut patch = Patch::from(&brightness);
        patch.maybe_ramp(ramp_ms);

        let epsilon = self.options.brightness_epsilon;
        let unchanged = self
            .state
            .brightness
            .is_some_and(|last| (last - brightness.value()).abs() <= epsilon);
        if ramp_ms.is_none() && unchanged {
            return Ok(self.skip(&patch));
        }

        self.send(&patch).await?;
        self.state.brightness = patch.get_brightness();
        Ok(Outcome::Applied)
    }

    /// Set the color temperature, clamped to the configured mirek band.
    pub async fn set_color_temperature(&mut self, mirek: i64, ramp_ms: Option<u32>) -> Result<Outcome> {
        let mut patch = Patch::from(&self.options.mirek_range.clamp(mirek));
        patch.maybe_ramp(ramp_ms);

        self.send(&patch).await?;
        Ok(Outcome::Applied)
    }

    /// Set the CIE xy color, each axis clamped to `[0, 1]`.
    pub async fn set_chromaticity(&mut self, x: f64, y: f64, ramp_ms: Option<u32>) -> Result<Outcome> {
        let xy = Xy::clamped(x, y).ok_or_else(|| Error::invalid_input("chromaticity is not a number"))?;

        let mut patch = Patch::from(&xy);
        patch.maybe_ramp(ramp_ms);

        self.send(&patch).await?;
        Ok(Outcome::Applied)
    }

    /// Power the group on, then set its brightness.
    pub async fn turn_on(&mut self, brightness: f64, ramp_ms: Option<u32>) -> Result<()> {
        self.set_power(true, ramp_ms).await?;
        self.set_brightness(brightness, ramp_ms).await?;
        Ok(())
    }

    pub async fn turn_off(&mut self, ramp_ms: Option<u32>) -> Result<Outcome> {
        self.set_power(false, ramp_ms).await
    }

    fn skip(&mut self, patch: &Patch) -> Outcome {
        debug!("grouped light {}: skipping unchanged write", self.group_id);
        self.history
            .record(WriteKind::Debounced, serde_json::to_value(patch).unwrap_or(Value::Null));
        Outcome::Debounced
    }

    async fn send(&mut self, patch: &Patch) -> Result<()> {
        let recorded = serde_json::to_value(patch).map_err(Error::JsonDump)?;

        match self
            .client
            .write(ResourceType::GroupedLight, &self.group_id, patch)
            .await
        {
            Ok(_) => {
                debug!("grouped light {}: applied {}", self.group_id, recorded);
                self.history.record(WriteKind::Applied, recorded);
                Ok(())
            }
            Err(e) => {
                self.history.record_error(recorded, &e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::fake::FakeBridge;
    use serde_json::json;

    fn controller(bridge: &FakeBridge) -> GroupController<&FakeBridge> {
        GroupController::new(bridge, "g1")
    }

    #[tokio::test]
    async fn test_power_debounced_without_ramp() {
        let bridge = FakeBridge::new();
        let mut group = controller(&bridge);

        assert_eq!(group.set_power(true, None).await.unwrap(), Outcome::Applied);
        assert_eq!(group.set_power(true, None).await.unwrap(), Outcome::Debounced);

        assert_eq!(bridge.patches(), vec![json!({"on": {"on": true}})]);
        assert_eq!(bridge.writes()[0].rtype, ResourceType::GroupedLight);
        assert_eq!(bridge.writes()[0].id, "g1");
        assert_eq!(group.history().summary().debounced, 1);
    }

    #[tokio::test]
    async fn test_ramp_forces_write() {
        let bridge = FakeBridge::new();
        let mut group = controller(&bridge);

        group.set_power(true, None).await.unwrap();
        assert_eq!(group.set_power(true, Some(300)).await.unwrap(), Outcome::Applied);
        group.set_brightness(50.0, None).await.unwrap();
        assert_eq!(group.set_brightness(50.0, Some(0)).await.unwrap(), Outcome::Applied);

        assert_eq!(
            bridge.patches()[1],
            json!({"on": {"on": true}, "dynamics": {"duration": 300}})
        );
        assert_eq!(bridge.writes().len(), 4);
    }

    #[tokio::test]
    async fn test_brightness_epsilon_boundary() {
        let bridge = FakeBridge::new();
        let mut group = controller(&bridge);

        group.set_brightness(50.0, None).await.unwrap();
        assert_eq!(group.set_brightness(50.05, None).await.unwrap(), Outcome::Debounced);
        assert_eq!(bridge.writes().len(), 1);

        assert_eq!(group.set_brightness(50.06, None).await.unwrap(), Outcome::Applied);
        assert_eq!(bridge.writes().len(), 2);
        assert_eq!(group.state().brightness(), Some(50.06));
    }

    #[tokio::test]
    async fn test_custom_epsilon() {
        let bridge = FakeBridge::new();
        let options = ControllerOptions {
            brightness_epsilon: 1.0,
            ..ControllerOptions::default()
        };
        let mut group = GroupController::with_options(&bridge, "g1", options).unwrap();

        group.set_brightness(50.0, None).await.unwrap();
        assert_eq!(group.set_brightness(50.9, None).await.unwrap(), Outcome::Debounced);
    }

    #[tokio::test]
    async fn test_clamping() {
        let bridge = FakeBridge::new();
        let mut group = controller(&bridge);

        group.set_brightness(150.0, None).await.unwrap();
        assert_eq!(group.state().brightness(), Some(100.0));
        group.set_brightness(-5.0, None).await.unwrap();
        assert_eq!(group.state().brightness(), Some(1.0));
        group.set_chromaticity(1.5, -0.2, None).await.unwrap();
        group.set_color_temperature(40, None).await.unwrap();

        assert_eq!(
            bridge.patches(),
            vec![
                json!({"dimming": {"brightness": 100.0}}),
                json!({"dimming": {"brightness": 1.0}}),
                json!({"color": {"xy": {"x": 1.0, "y": 0.0}}}),
                json!({"color_temperature": {"mirek": MirekRange::DEFAULT_MIN}}),
            ]
        );
    }

    #[tokio::test]
    async fn test_color_writes_never_debounced() {
        let bridge = FakeBridge::new();
        let mut group = controller(&bridge);

        group.set_color_temperature(366, None).await.unwrap();
        group.set_color_temperature(366, None).await.unwrap();
        group.set_chromaticity(0.3, 0.3, None).await.unwrap();
        group.set_chromaticity(0.3, 0.3, None).await.unwrap();

        assert_eq!(bridge.writes().len(), 4);
    }

    #[tokio::test]
    async fn test_nan_is_invalid_input() {
        let bridge = FakeBridge::new();
        let mut group = controller(&bridge);

        let err = group.set_brightness(f64::NAN, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        let err = group.set_chromaticity(0.2, f64::NAN, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(bridge.writes().is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let bridge = FakeBridge::new();
        let mut group = controller(&bridge);

        group.set_power(false, None).await.unwrap();
        group.set_brightness(30.0, None).await.unwrap();

        bridge.set_fail_all(true);
        let err = group.set_power(true, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransientWriteFailure);
        assert!(group.set_brightness(80.0, None).await.is_err());
        assert_eq!(group.state().power(), Some(false));
        assert_eq!(group.state().brightness(), Some(30.0));
        assert!(!bridge.writes()[2].ok);

        // the same request goes out again once the bridge recovers
        bridge.set_fail_all(false);
        assert_eq!(group.set_power(true, None).await.unwrap(), Outcome::Applied);
        assert_eq!(group.state().power(), Some(true));

        let summary = group.history().summary();
        assert_eq!(summary.failed, 2);
        assert!(summary.last_error.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_reset_clears_cache() {
        let bridge = FakeBridge::new();
        let mut group = controller(&bridge);

        group.turn_on(70.0, None).await.unwrap();
        group.reset();
        assert_eq!(group.state(), ControllerState::default());

        group.turn_on(70.0, None).await.unwrap();
        assert_eq!(bridge.writes().len(), 4);
    }

    #[tokio::test]
    async fn test_turn_on_order() {
        let bridge = FakeBridge::new();
        let mut group = controller(&bridge);

        group.turn_on(60.0, Some(250)).await.unwrap();
        group.turn_off(None).await.unwrap();

        assert_eq!(
            bridge.patches(),
            vec![
                json!({"on": {"on": true}, "dynamics": {"duration": 250}}),
                json!({"dimming": {"brightness": 60.0}, "dynamics": {"duration": 250}}),
                json!({"on": {"on": false}}),
            ]
        );
    }

    #[tokio::test]
    async fn test_from_hint() {
        let bridge = FakeBridge::new().with(
            ResourceType::GroupedLight,
            json!([{"id": "g7", "metadata": {"name": "Kitchen"}, "owner": {"rid": "r7", "rtype": "room"}}]),
        );

        let group = GroupController::from_hint(&bridge, "kitchen").await.unwrap();
        assert_eq!(group.group_id(), "g7");
    }

    #[tokio::test]
    async fn test_with_options_rejects_bad_epsilon() {
        let bridge = FakeBridge::new();
        for bad in [-1.0, f64::NAN] {
            let options = ControllerOptions {
                brightness_epsilon: bad,
                ..ControllerOptions::default()
            };
            let err = GroupController::with_options(&bridge, "g1", options).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
    }

    fn office() -> FakeBridge {
        FakeBridge::new()
            .with(
                ResourceType::GroupedLight,
                json!([{"id": "g-office", "metadata": {"name": "Office"}, "owner": {"rid": "r1", "rtype": "room"}}]),
            )
            .with(
                ResourceType::Room,
                json!([{"id": "r1", "metadata": {"name": "Office"}, "children": [{"rid": "d1", "rtype": "device"}]}]),
            )
            .with(
                ResourceType::Device,
                json!([{"id": "d1", "services": [{"rid": "l1", "rtype": "light"}]}]),
            )
            .with(
                ResourceType::Light,
                json!([{
                    "id": "l1",
                    "dimming": {"brightness": 40.0},
                    "color_temperature": {
                        "mirek": 300,
                        "mirek_schema": {"mirek_minimum": 200, "mirek_maximum": 454},
                    },
                }]),
            )
    }

    #[tokio::test]
    async fn test_office_end_to_end() {
        let bridge = office();
        let resolver = Resolver::new(&bridge);

        let group_id = resolver.resolve("Office").await.unwrap();
        let members = resolver.members(&group_id).await.unwrap();
        assert_eq!(members.keys().collect::<Vec<_>>(), vec!["l1"]);
        assert_eq!(members["l1"].brightness(), Some(40.0));

        let mut group = GroupController::new(&bridge, &group_id);
        assert_eq!(group.set_brightness(80.0, None).await.unwrap(), Outcome::Applied);
        assert_eq!(group.set_brightness(80.0, None).await.unwrap(), Outcome::Debounced);

        assert_eq!(bridge.patches(), vec![json!({"dimming": {"brightness": 80.0}})]);
        assert_eq!(bridge.writes()[0].id, "g-office");
    }

    #[tokio::test]
    async fn test_from_target_uses_member_mirek_band() {
        let bridge = office();
        let target = Resolver::new(&bridge).resolve_target("office").await.unwrap();

        let mut group = GroupController::from_target(&bridge, &target);
        assert_eq!(group.options().mirek_range, MirekRange::new(200, 454).unwrap());

        group.set_color_temperature(153, None).await.unwrap();
        group.set_color_temperature(500, None).await.unwrap();
        assert_eq!(
            bridge.patches(),
            vec![
                json!({"color_temperature": {"mirek": 200}}),
                json!({"color_temperature": {"mirek": 454}}),
            ]
        );
    }

    #[tokio::test]
    async fn test_from_target_without_schema_keeps_default_band() {
        let bridge = FakeBridge::new();
        let target = ResolvedTarget {
            group_id: "g1".to_string(),
            owner: crate::resource::ResourceLink::new(ResourceType::Room, "r1"),
            members: Default::default(),
        };

        let group = GroupController::from_target(&bridge, &target);
        assert_eq!(group.options().mirek_range, MirekRange::default());
    }
}
