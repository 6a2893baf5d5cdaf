//! Point-in-time device state.

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::scenes::{SceneMode, ScenePresetStore};
use crate::types::{Brightness, Color, Kelvin, Speed};

/// A decoded `getPilot` reply.
///
/// Fields the bulb did not report are `None`: a bulb running a scene reports
/// no color, and that is not the same as black. A snapshot is only as fresh
/// as the query that produced it; query again before acting on it.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct StateSnapshot {
    mac: Option<String>,
    power: bool,
    color: Option<Color>,
    brightness: Option<Brightness>,
    scene_id: Option<u16>,
    temp: Option<Kelvin>,
    speed: Option<Speed>,
    rssi: Option<i32>,
}

impl StateSnapshot {
    pub fn mac(&self) -> Option<&str> {
        self.mac.as_deref()
    }

    /// Whether the bulb is emitting light.
    pub fn power(&self) -> bool {
        self.power
    }

    pub fn color(&self) -> Option<&Color> {
        self.color.as_ref()
    }

    pub fn brightness(&self) -> Option<&Brightness> {
        self.brightness.as_ref()
    }

    /// Raw scene id reported by the bulb.
    pub fn scene_id(&self) -> Option<u16> {
        self.scene_id
    }

    pub fn scene(&self) -> Option<SceneMode> {
        self.scene_id.and_then(SceneMode::create)
    }

    /// Display name of the running scene, when the id is a known one.
    pub fn scene_name(&self) -> Option<&'static str> {
        self.scene_id
            .and_then(|id| ScenePresetStore::builtin().name_for(id).ok())
    }

    pub fn temp(&self) -> Option<&Kelvin> {
        self.temp.as_ref()
    }

    pub fn speed(&self) -> Option<&Speed> {
        self.speed.as_ref()
    }

    /// Wi-Fi signal strength in dBm.
    pub fn rssi(&self) -> Option<i32> {
        self.rssi
    }
}

/// The `result` object of a `getPilot` reply.
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct PilotResult {
    pub mac: Option<String>,
    #[serde(rename = "state")]
    pub emitting: Option<bool>,
    #[serde(rename = "r")]
    pub red: Option<u8>,
    #[serde(rename = "g")]
    pub green: Option<u8>,
    #[serde(rename = "b")]
    pub blue: Option<u8>,
    pub dimming: Option<u8>,
    #[serde(rename = "sceneId")]
    pub scene: Option<u16>,
    #[serde(rename = "schdPsetId")]
    pub schedule: Option<u16>,
    pub temp: Option<u16>,
    pub speed: Option<u8>,
    pub rssi: Option<i32>,
}

impl PilotResult {
    fn get_color(&self) -> Option<Color> {
        match (self.red, self.green, self.blue) {
            (Some(r), Some(g), Some(b)) => Some(Color::rgb(r, g, b)),
            _ => None,
        }
    }

    /// Scene id 0 means "no scene"; an active rhythm schedule reports as Rhythm.
    fn scene_id(&self) -> Option<u16> {
        if self.schedule.is_some() {
            return Some(SceneMode::Rhythm.id());
        }
        self.scene.filter(|id| *id != 0)
    }
}

impl TryFrom<PilotResult> for StateSnapshot {
    type Error = Error;

    fn try_from(res: PilotResult) -> Result<Self, Error> {
        let power = res
            .emitting
            .ok_or_else(|| Error::protocol("reply has no power state"))?;
        let brightness = res
            .dimming
            .map(Brightness::try_from)
            .transpose()
            .map_err(Error::protocol)?;
        let temp = res
            .temp
            .filter(|t| *t != 0)
            .map(Kelvin::try_from)
            .transpose()
            .map_err(Error::protocol)?;
        let speed = res
            .speed
            .map(Speed::try_from)
            .transpose()
            .map_err(Error::protocol)?;

        Ok(StateSnapshot {
            color: res.get_color(),
            scene_id: res.scene_id(),
            mac: res.mac,
            power,
            brightness,
            temp,
            speed,
            rssi: res.rssi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::test_support::fixtures;

    #[test]
    fn test_serialize_skips_unreported_fields() {
        let state = codec::decode(fixtures::OCEAN.as_bytes()).unwrap();
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            serde_json::json!({
                "mac": "a8bb50ddeeff",
                "power": true,
                "brightness": 60,
                "scene_id": 1,
                "speed": 100,
                "rssi": -70
            })
        );
    }
}
