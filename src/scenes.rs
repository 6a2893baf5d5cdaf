//! Preset lighting scenes and the name/id table used to resolve them.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// Preset lighting scenes with static colors or dynamic animations.
///
/// The string form of each variant is the name the vendor app shows.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, EnumIter, IntoStaticStr, PartialEq, Eq, Hash)]
pub enum SceneMode {
    Ocean = 1,
    Romance = 2,
    Sunset = 3,
    Party = 4,
    Fireplace = 5,
    Cozy = 6,
    Forest = 7,
    #[strum(to_string = "Pastel Colors")]
    PastelColors = 8,
    #[strum(to_string = "Wake up")]
    WakeUp = 9,
    Bedtime = 10,
    #[strum(to_string = "Warm White")]
    WarmWhite = 11,
    Daylight = 12,
    #[strum(to_string = "Cool white")]
    CoolWhite = 13,
    #[strum(to_string = "Night light")]
    NightLight = 14,
    Focus = 15,
    Relax = 16,
    #[strum(to_string = "True colors")]
    TrueColors = 17,
    #[strum(to_string = "TV time")]
    TvTime = 18,
    Plantgrowth = 19,
    Spring = 20,
    Summer = 21,
    Fall = 22,
    Deepdive = 23,
    Jungle = 24,
    Mojito = 25,
    Club = 26,
    Christmas = 27,
    Halloween = 28,
    Candlelight = 29,
    #[strum(to_string = "Golden white")]
    GoldenWhite = 30,
    Pulse = 31,
    Steampunk = 32,
    Diwali = 33,
    White = 34,
    Alarm = 35,
    #[strum(to_string = "Snowy sky")]
    SnowySky = 36,
    Rhythm = 1000,
}

impl SceneMode {
    /// # Examples
    ///
    /// ```
    /// use wizard_lights::SceneMode;
    ///
    /// assert_eq!(SceneMode::create(8), Some(SceneMode::PastelColors));
    /// assert_eq!(SceneMode::create(0), None);
    /// ```
    pub fn create(value: u16) -> Option<Self> {
        SceneMode::iter().find(|scene| scene.id() == value)
    }

    pub fn id(&self) -> u16 {
        *self as u16
    }

    /// The human-readable name, e.g. `"Pastel Colors"`.
    pub fn name(&self) -> &'static str {
        (*self).into()
    }
}

static BUILTIN: LazyLock<ScenePresetStore> = LazyLock::new(|| {
    ScenePresetStore::from_pairs(SceneMode::iter().map(|scene| (scene.name(), scene.id())))
});

/// Read-only mapping between scene names and device scene ids.
///
/// # Example
///
/// ```
/// use wizard_lights::ScenePresetStore;
///
/// let scenes = ScenePresetStore::builtin();
/// assert_eq!(scenes.lookup("Ocean").unwrap(), 1);
/// assert_eq!(scenes.name_for(1000).unwrap(), "Rhythm");
/// assert!(scenes.lookup("ocean").is_err());
/// ```
#[derive(Debug)]
pub struct ScenePresetStore {
    by_name: HashMap<&'static str, u16>,
    by_id: HashMap<u16, &'static str>,
}

impl ScenePresetStore {
    /// The vendor scene table, built on first use and shared process-wide.
    pub fn builtin() -> &'static ScenePresetStore {
        &BUILTIN
    }

    fn from_pairs(pairs: impl Iterator<Item = (&'static str, u16)>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_id = HashMap::new();
        for (name, id) in pairs {
            by_name.insert(name, id);
            by_id.insert(id, name);
        }
        ScenePresetStore { by_name, by_id }
    }

    /// Resolve a scene name, matched exactly as authored.
    pub fn lookup(&self, name: &str) -> Result<u16> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownScene(name.to_string()))
    }

    pub fn name_for(&self, id: u16) -> Result<&'static str> {
        self.by_id
            .get(&id)
            .copied()
            .ok_or_else(|| Error::unknown_scene_id(id))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All `(name, id)` pairs ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u16)> {
        let mut pairs: Vec<_> = self.by_id.iter().map(|(id, name)| (*name, *id)).collect();
        pairs.sort_unstable_by_key(|(_, id)| *id);
        pairs.into_iter()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_consistency() {
        let scenes = ScenePresetStore::builtin();
        for (name, id) in scenes.iter() {
            assert_eq!(scenes.lookup(scenes.name_for(id).unwrap()).unwrap(), id);
            assert_eq!(scenes.name_for(scenes.lookup(name).unwrap()).unwrap(), name);
        }
        assert_eq!(scenes.len(), SceneMode::iter().count());
    }

    #[test]
    fn test_unknown_scene() {
        let scenes = ScenePresetStore::builtin();
        assert_eq!(
            scenes.lookup("Disco"),
            Err(Error::UnknownScene("Disco".to_string()))
        );
        assert_eq!(scenes.name_for(0), Err(Error::unknown_scene_id(0)));
        assert_eq!(scenes.name_for(37), Err(Error::unknown_scene_id(37)));
    }

    #[test]
    fn test_names_as_authored() {
        let scenes = ScenePresetStore::builtin();
        assert_eq!(scenes.lookup("Wake up").unwrap(), 9);
        assert_eq!(scenes.lookup("TV time").unwrap(), 18);
        assert!(scenes.lookup("WakeUp").is_err());
        assert_eq!(SceneMode::SnowySky.name(), "Snowy sky");
    }

    #[test]
    fn test_contains_is_exact() {
        let scenes = ScenePresetStore::builtin();
        assert!(scenes.contains("Snowy sky"));
        assert!(!scenes.contains("snowy sky"));
        assert!(!scenes.contains("Reading"));
    }

    #[test]
    fn test_iter_sorted_by_id() {
        let ids: Vec<u16> = ScenePresetStore::builtin().iter().map(|(_, id)| id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
        assert_eq!(ids.first(), Some(&1));
        assert_eq!(ids.last(), Some(&1000));
    }
}
