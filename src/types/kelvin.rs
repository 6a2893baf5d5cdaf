//! Color temperature control.

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Color temperature in Kelvin, with valid values from 1000K to 10000K.
///
/// Lower values produce warmer (more yellow/orange) light, while higher
/// values produce cooler (more blue) light. Most bulbs only honour
/// 2200K-6500K and clamp anything outside their own range.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u16", into = "u16")]
pub struct Kelvin {
    pub(crate) kelvin: u16,
}

impl Kelvin {
    const MIN: u16 = 1000;
    const MAX: u16 = 10000;

    /// Get the kelvin value.
    pub fn kelvin(&self) -> u16 {
        self.kelvin
    }

    /// Create a new Kelvin with the given value.
    ///
    /// Returns `None` if value is outside the valid range (1000-10000).
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_lights::Kelvin;
    ///
    /// assert!(Kelvin::create(999).is_none());
    /// assert!(Kelvin::create(2700).is_some());
    /// assert!(Kelvin::create(10000).is_some());
    /// assert!(Kelvin::create(10001).is_none());
    /// ```
    pub fn create(kelvin: u16) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&kelvin)
            .then_some(Kelvin { kelvin })
    }
}

impl TryFrom<u16> for Kelvin {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::create(value).ok_or_else(|| Error::invalid_value("temperature", value))
    }
}

impl From<Kelvin> for u16 {
    fn from(kelvin: Kelvin) -> Self {
        kelvin.kelvin
    }
}
