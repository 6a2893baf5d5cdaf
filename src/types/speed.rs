//! Animation speed for dynamic scenes.

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Animation speed for dynamic scenes, with valid values from 10 to 200 percent.
///
/// Speed only affects animated scenes (Ocean, Party, ...). A value of 100 is
/// the default speed; lower values slow the animation down.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u8", into = "u8")]
pub struct Speed {
    pub(crate) value: u8,
}

impl Default for Speed {
    fn default() -> Self {
        Self::new()
    }
}

impl Speed {
    const MIN: u8 = 10;
    const MAX: u8 = 200;
    const DEFAULT: u8 = 100;

    /// Create a new Speed with the default value (100%).
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_lights::Speed;
    ///
    /// assert_eq!(Speed::new().value(), 100);
    /// ```
    pub fn new() -> Self {
        Speed {
            value: Self::DEFAULT,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns `None` if value is outside the valid range (10-200).
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_lights::Speed;
    ///
    /// assert!(Speed::create(9).is_none());
    /// assert!(Speed::create(10).is_some());
    /// assert!(Speed::create(200).is_some());
    /// assert!(Speed::create(201).is_none());
    /// ```
    pub fn create(value: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then_some(Speed { value })
    }
}

impl TryFrom<u8> for Speed {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::create(value).ok_or_else(|| Error::invalid_value("speed", value))
    }
}

impl From<Speed> for u8 {
    fn from(speed: Speed) -> Self {
        speed.value
    }
}
