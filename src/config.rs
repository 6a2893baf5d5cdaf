//! Bulb system configuration and type detection.

use serde::{Deserialize, Serialize};

/// System configuration of a WiZ bulb, as reported by `getSystemConfig`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    pub mac: String,
    #[serde(default)]
    pub home_id: Option<u64>,
    #[serde(default)]
    pub room_id: Option<u64>,
    #[serde(default)]
    pub module_name: Option<String>,
    #[serde(default)]
    pub fw_version: Option<String>,
}

impl SystemConfig {
    /// Bulb class derived from the module name, `None` when it is not reported.
    pub fn bulb_class(&self) -> Option<BulbClass> {
        self.module_name.as_deref().map(BulbClass::from_module_name)
    }
}

/// Classification of WiZ bulb types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulbClass {
    /// Full color
    Rgb,
    /// Tunable white
    TunableWhite,
    /// Dimmable white
    DimmableWhite,
    /// Smart socket, on/off only
    Socket,
}

impl BulbClass {
    /// Parse the class from a module name such as `ESP01_SHRGB1C_31`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_lights::BulbClass;
    ///
    /// assert_eq!(BulbClass::from_module_name("ESP01_SHRGB1C_31"), BulbClass::Rgb);
    /// assert_eq!(BulbClass::from_module_name("ESP56_SHTW3_01"), BulbClass::TunableWhite);
    /// assert_eq!(BulbClass::from_module_name("ESP10_SOCKET_06"), BulbClass::Socket);
    /// assert_eq!(BulbClass::from_module_name("garbage"), BulbClass::DimmableWhite);
    /// ```
    pub fn from_module_name(module_name: &str) -> Self {
        let Some(type_part) = module_name.split('_').nth(1) else {
            return BulbClass::DimmableWhite;
        };
        if type_part.contains("RGB") {
            BulbClass::Rgb
        } else if type_part.contains("TW") {
            BulbClass::TunableWhite
        } else if type_part.contains("SOCKET") {
            BulbClass::Socket
        } else {
            BulbClass::DimmableWhite
        }
    }

    pub fn supports_color(self) -> bool {
        self == BulbClass::Rgb
    }

    pub fn supports_scenes(self) -> bool {
        matches!(self, BulbClass::Rgb | BulbClass::TunableWhite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities() {
        assert!(BulbClass::Rgb.supports_color());
        assert!(BulbClass::Rgb.supports_scenes());
        assert!(!BulbClass::TunableWhite.supports_color());
        assert!(BulbClass::TunableWhite.supports_scenes());
        assert!(!BulbClass::DimmableWhite.supports_scenes());
        assert!(!BulbClass::Socket.supports_scenes());
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let config: SystemConfig = serde_json::from_str(
            r#"{"mac":"a8bb50aabbcc","homeId":4242,"moduleName":"ESP56_SHTW3_01","typeId":0}"#,
        )
        .unwrap();
        assert_eq!(config.home_id, Some(4242));
        assert_eq!(config.bulb_class(), Some(BulbClass::TunableWhite));
        assert_eq!(config.fw_version, None);
    }
}
