//! # hue_lights_rs
//!
//! An async Rust library for driving Philips Hue light groups through the
//! bridge's CLIP v2 resource API.
//!
//! This crate resolves a human-readable name ("office", "upstairs") to a
//! grouped light, controls it with debounced writes, and runs periodic
//! effects (pulsing, blinking) that keep a steady cadence even when the
//! bridge is slow to answer.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use hue_lights_rs::{BridgeConfig, EffectOptions, EffectScheduler, GroupController, HttpClient};
//!
//! async fn pulse_office() -> Result<(), Box<dyn std::error::Error>> {
//!     // HUE_BRIDGE_IP and HUE_APP_KEY
//!     let client = HttpClient::new(&BridgeConfig::from_env()?)?;
//!
//!     let mut office = GroupController::from_hint(&client, "office").await?;
//!     office.turn_on(80.0, None).await?;
//!
//!     let options = EffectOptions {
//!         ramp_ms: Some(300),
//!         settle_to_high_on_exit: true,
//!         ..EffectOptions::default()
//!     };
//!     EffectScheduler::new()
//!         .pulse_brightness(&mut office, Duration::from_secs(1), 10, 10.0, 100.0, &options)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Name Resolution**: Find a grouped light by its own name or by the
//!   room or zone that owns it with [`Resolver`]
//! - **Member Lookup**: List the lights behind a group with [`Resolver::members`]
//! - **Debounced Control**: Power, brightness, color temperature and xy color
//!   through [`GroupController`], skipping writes that change nothing
//! - **Clamping**: Out-of-range values are clamped by [`Brightness`],
//!   [`MirekRange`] and [`Xy`] instead of rejected
//! - **Effects**: Drift-free periodic effects with frame dropping, rate
//!   limiting and cancellation via [`EffectScheduler`]
//! - **Diagnostics**: Per-controller [`WriteHistory`]
//!
//! ## Communication
//!
//! All bridge I/O goes through the [`ResourceClient`] trait. With the `http`
//! feature, [`HttpClient`] implements it over HTTPS; any other transport (or
//! an in-memory fake) can be plugged in instead.
//!
//! ## Runtime Selection
//!
//! Timing is runtime-agnostic. Select your preferred runtime using feature flags:
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! hue-lights-rs = "0.1"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! hue-lights-rs = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! Without `http`, bring your own [`ResourceClient`].
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime
//! - `http` (default): [`HttpClient`] built on reqwest; requires `runtime-tokio`

mod client;
mod clock;
mod config;
pub mod effect;
mod errors;
mod group;
mod history;
#[cfg(feature = "http")]
mod http;
mod patch;
mod resolver;
mod resource;
pub mod runtime;
mod types;

#[cfg(test)]
mod fake;

// Re-export public API
pub use client::ResourceClient;
pub use clock::{Clock, RuntimeClock};
pub use config::{BridgeConfig, ControllerOptions};
pub use effect::{EffectOptions, EffectReport, EffectScheduler, StateChange, StopHandle};
pub use errors::{Error, ErrorKind, Observed};
pub use group::{ControllerState, GroupController, Outcome};
pub use history::{HistoryEntry, HistorySummary, WriteHistory, WriteKind};
#[cfg(feature = "http")]
pub use http::HttpClient;
pub use patch::Patch;
pub use resolver::{ResolvedTarget, Resolver};
pub use resource::{
    Area, ColorState, ColorTemperature, Device, Dimming, GroupedLight, Light, LightState, Metadata,
    MirekSchema, On, ResourceLink, ResourceType,
};
pub use types::{Brightness, Mirek, MirekRange, Xy};
