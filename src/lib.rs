//! # wizard_lights
//!
//! An async Rust library for discovering and controlling WiZ smart bulbs over
//! the local network.
//!
//! The crate is the protocol core of a small lighting controller: it encodes
//! commands, decodes device state and runs one request/response exchange per
//! call over UDP. It holds no global state. Presentation and persistence are
//! left to the application, with [`PreferenceStore`] as an optional helper
//! for the latter.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::net::Ipv4Addr;
//! use std::time::Duration;
//! use wizard_lights::{Brightness, Color, discover};
//!
//! # async fn run() -> Result<(), wizard_lights::Error> {
//! let bulbs = discover(Ipv4Addr::new(192, 168, 1, 255), Duration::from_secs(3)).await?;
//!
//! for bulb in &bulbs {
//!     let state = bulb.query_state().await?;
//!     println!("{}: on={} scene={:?}", bulb.mac(), state.power(), state.scene_name());
//!
//!     bulb.set_color(&Color::rgb(255, 0, 0), &Brightness::create(80).unwrap()).await?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - **Discovery**: broadcast probe and reply collection with [`discover`] / [`Discovery`]
//! - **Control**: power, [`Color`], [`Brightness`], [`Kelvin`] and scenes via [`DeviceHandle`]
//! - **Scenes**: the built-in scene table in [`ScenePresetStore`] and [`SceneMode`]
//! - **Codec**: pure encode/decode functions in [`codec`]
//! - **Retries**: opt-in back-off with [`RetryPolicy`]
//! - **Preferences**: display names and custom presets in [`PreferenceStore`]
//!
//! ## Communication
//!
//! Bulbs listen for JSON requests on UDP port 38899. Every exchange uses a
//! fresh socket, waits for one reply up to a timeout and never retries on
//! its own; a missing reply is reported as [`Error::DeviceUnreachable`].
//!
//! ## Runtime Selection
//!
//! The library is runtime-agnostic. Select a runtime with feature flags:
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! wizard-lights = "0.1"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! wizard-lights = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! ### Using smol
//!
//! ```toml
//! [dependencies]
//! wizard-lights = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! smol = "2"
//! ```

pub mod codec;
mod config;
mod device;
mod discovery;
mod errors;
mod pilot;
mod prefs;
mod retry;
pub mod runtime;
mod scenes;
mod snapshot;
mod types;

#[cfg(test)]
mod test_support;

pub use codec::{Command, Reply};
pub use config::{BulbClass, SystemConfig};
pub use device::DeviceHandle;
pub use discovery::{Discovery, discover};
pub use errors::Error;
pub use pilot::Pilot;
pub use prefs::{CustomPreset, DeviceProfile, PreferenceStore};
pub use retry::RetryPolicy;
pub use scenes::{SceneMode, ScenePresetStore};
pub use snapshot::StateSnapshot;
pub use types::{Brightness, Color, Kelvin, Speed};
