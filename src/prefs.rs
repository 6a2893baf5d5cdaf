//! Per-device display names and saved presets.
//!
//! Nothing in the protocol core reads or writes preferences. The store is an
//! ordinary value owned by the application, loaded and saved explicitly.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::codec::Command;
use crate::errors::Error;
use crate::scenes::ScenePresetStore;
use crate::snapshot::StateSnapshot;
use crate::types::{Brightness, Color};

type Result<T> = std::result::Result<T, Error>;

/// A colour and brightness saved under a user-chosen name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPreset {
    color: Color,
    brightness: Brightness,
}

impl CustomPreset {
    pub fn new(color: Color, brightness: Brightness) -> Self {
        CustomPreset { color, brightness }
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn brightness(&self) -> &Brightness {
        &self.brightness
    }

    /// Capture what the bulb is showing, if it reported both a colour and a
    /// brightness.
    pub fn from_snapshot(snapshot: &StateSnapshot) -> Option<Self> {
        Some(CustomPreset::new(
            *snapshot.color()?,
            *snapshot.brightness()?,
        ))
    }

    pub fn to_command(&self) -> Command {
        Command::set_color(&self.color, &self.brightness)
    }
}

#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    name: Option<String>,
    #[serde(default)]
    presets: BTreeMap<String, CustomPreset>,
}

impl DeviceProfile {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn preset(&self, name: &str) -> Option<&CustomPreset> {
        self.presets.get(name)
    }
}

/// Preferences for every known device, keyed by MAC address.
///
/// # Example
///
/// ```
/// use wizard_lights::{Brightness, Color, CustomPreset, PreferenceStore};
///
/// let mut prefs = PreferenceStore::new();
/// assert_eq!(prefs.display_name("a8bb50aabbcc"), "a8bb50aabbcc");
///
/// prefs.set_display_name("a8bb50aabbcc", "Desk");
/// prefs.save_preset(
///     "a8bb50aabbcc",
///     "Reading",
///     CustomPreset::new(Color::rgb(255, 180, 120), Brightness::create(70).unwrap()),
/// );
///
/// assert_eq!(prefs.display_name("a8bb50aabbcc"), "Desk");
/// assert_eq!(prefs.presets("a8bb50aabbcc").count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceStore {
    devices: BTreeMap<String, DeviceProfile>,
}

impl PreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the store from `path`. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(Error::preferences(path, e)),
        };
        Self::from_reader(BufReader::new(file)).map_err(|e| Error::preferences(path, e))
    }

    /// Write the store to `path`, replacing it only once the new contents
    /// are fully written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let staging = Self::staging_path(path);
        let write = || -> io::Result<()> {
            let mut writer = BufWriter::new(File::create(&staging)?);
            self.to_writer(&mut writer).map_err(io::Error::other)?;
            writer.flush()?;
            fs::rename(&staging, path)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&staging);
            Error::preferences(path, e)
        })
    }

    /// `<file name>.tmp` next to `path`.
    fn staging_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, self)
    }

    pub fn devices(&self) -> impl Iterator<Item = (&str, &DeviceProfile)> {
        self.devices.iter().map(|(mac, profile)| (mac.as_str(), profile))
    }

    pub fn device(&self, mac: &str) -> Option<&DeviceProfile> {
        self.devices.get(mac)
    }

    /// The profile for `mac`, created empty on first sight.
    pub fn ensure_device(&mut self, mac: &str) -> &mut DeviceProfile {
        self.devices.entry(mac.to_string()).or_default()
    }

    /// The user-chosen name for `mac`, or the MAC itself.
    pub fn display_name<'a>(&'a self, mac: &'a str) -> &'a str {
        self.device(mac).and_then(DeviceProfile::name).unwrap_or(mac)
    }

    pub fn set_display_name(&mut self, mac: &str, name: &str) {
        self.ensure_device(mac).name = Some(name.to_string());
    }

    /// Save `preset` under `name`, returning the preset it replaced.
    pub fn save_preset(
        &mut self,
        mac: &str,
        name: &str,
        preset: CustomPreset,
    ) -> Option<CustomPreset> {
        self.ensure_device(mac)
            .presets
            .insert(name.to_string(), preset)
    }

    pub fn remove_preset(&mut self, mac: &str, name: &str) -> Option<CustomPreset> {
        self.devices.get_mut(mac)?.presets.remove(name)
    }

    /// Presets saved for `mac`, ordered by name.
    pub fn presets(&self, mac: &str) -> impl Iterator<Item = (&str, &CustomPreset)> {
        self.device(mac)
            .into_iter()
            .flat_map(|profile| profile.presets.iter())
            .map(|(name, preset)| (name.as_str(), preset))
    }

    /// Turn a preset name picked by the user into a command for `mac`.
    ///
    /// Built-in scenes take precedence over custom presets of the same name.
    pub fn resolve(&self, mac: &str, name: &str, scenes: &ScenePresetStore) -> Result<Command> {
        if let Ok(id) = scenes.lookup(name) {
            return Ok(Command::set_scene(id));
        }
        self.device(mac)
            .and_then(|profile| profile.preset(name))
            .map(CustomPreset::to_command)
            .ok_or_else(|| Error::UnknownScene(name.to_string()))
    }
}
