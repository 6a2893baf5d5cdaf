//! Output settings ("pilot") carried by a `setPilot` request.

use serde::Serialize;

use crate::errors::Error;
use crate::scenes::SceneMode;
use crate::types::{Brightness, Color, Kelvin, Speed};

type Result<T> = std::result::Result<T, Error>;

/// The parameter set of a `setPilot` request.
///
/// Pilots are built attribute by attribute; validation happens when the
/// pilot is encoded, so an inconsistent combination is reported as
/// [`Error::InvalidCommand`] instead of being sent.
///
/// # Examples
///
/// ```
/// use wizard_lights::{Brightness, Color, Pilot};
///
/// let mut pilot = Pilot::new();
/// pilot.color(&Color::rgb(255, 128, 0));
/// pilot.brightness(&Brightness::create(80).unwrap());
/// assert!(pilot.validate().is_ok());
/// ```
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Pilot {
    #[serde(rename = "sceneId")]
    pub(crate) scene: Option<u16>,
    pub(crate) speed: Option<u8>,
    #[serde(rename = "r")]
    pub(crate) red: Option<u8>,
    #[serde(rename = "g")]
    pub(crate) green: Option<u8>,
    #[serde(rename = "b")]
    pub(crate) blue: Option<u8>,
    pub(crate) dimming: Option<u8>,
    pub(crate) temp: Option<u16>,
}

impl Pilot {
    pub(crate) const EMPTY: Pilot = Pilot {
        scene: None,
        speed: None,
        red: None,
        green: None,
        blue: None,
        dimming: None,
        temp: None,
    };

    /// Create a new empty pilot.
    ///
    /// At least one attribute must be set before the pilot can be sent.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Set a scene by its raw device id.
    pub fn scene_id(&mut self, id: u16) {
        self.scene = Some(id);
    }

    pub fn scene(&mut self, scene: &SceneMode) {
        self.scene_id(scene.id());
    }

    /// Set the animation speed. Only meaningful together with a scene.
    pub fn speed(&mut self, speed: &Speed) {
        self.speed = Some(speed.value);
    }

    pub fn color(&mut self, color: &Color) {
        self.red = Some(color.red);
        self.green = Some(color.green);
        self.blue = Some(color.blue);
    }

    pub fn brightness(&mut self, brightness: &Brightness) {
        self.dimming = Some(brightness.value);
    }

    pub fn temp(&mut self, temp: &Kelvin) {
        self.temp = Some(temp.kelvin);
    }

    /// Check that the pilot can be sent as a single command.
    ///
    /// A scene is exclusive with color, brightness and temperature; speed
    /// only applies to a scene.
    ///
    /// # Examples
    ///
    /// ```
    /// use wizard_lights::{Color, Pilot, SceneMode, Speed};
    ///
    /// let mut pilot = Pilot::new();
    /// assert!(pilot.validate().is_err());
    ///
    /// pilot.speed(&Speed::new());
    /// assert!(pilot.validate().is_err());
    ///
    /// pilot.scene(&SceneMode::Ocean);
    /// assert!(pilot.validate().is_ok());
    ///
    /// pilot.color(&Color::rgb(0, 0, 255));
    /// assert!(pilot.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::invalid_command("no attributes set"));
        }
        let light_mode = self.get_color().is_some() || self.dimming.is_some() || self.temp.is_some();
        if self.scene.is_some() && light_mode {
            return Err(Error::invalid_command(
                "a scene cannot be combined with color, brightness or temperature",
            ));
        }
        if self.speed.is_some() && self.scene.is_none() {
            return Err(Error::invalid_command("speed requires a scene"));
        }
        Ok(())
    }

    pub(crate) fn get_color(&self) -> Option<Color> {
        match (self.red, self.green, self.blue) {
            (Some(r), Some(g), Some(b)) => Some(Color::rgb(r, g, b)),
            _ => None,
        }
    }
}

impl From<&SceneMode> for Pilot {
    fn from(scene: &SceneMode) -> Self {
        let mut p = Pilot::new();
        p.scene(scene);
        p
    }
}

impl From<&Color> for Pilot {
    fn from(color: &Color) -> Self {
        let mut p = Pilot::new();
        p.color(color);
        p
    }
}

impl From<&Kelvin> for Pilot {
    fn from(kelvin: &Kelvin) -> Self {
        let mut p = Pilot::new();
        p.temp(kelvin);
        p
    }
}

impl From<&Brightness> for Pilot {
    fn from(brightness: &Brightness) -> Self {
        let mut p = Pilot::new();
        p.brightness(brightness);
        p
    }
}
