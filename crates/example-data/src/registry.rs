//! Seed registry types and JSON parsing.
//!
//! The registry carries the content catalogue (icons, colours, staple item
//! names) plus named seed definitions. A built-in registry covers the common
//! case; deployments can supply their own JSON.

use serde::Deserialize;

use crate::error::RegistryError;

/// Current supported registry version.
const SUPPORTED_VERSION: u32 = 1;

/// Registry shipped with the crate.
const BUILTIN_REGISTRY_JSON: &str = r##"{
    "version": 1,
    "icons": ["cart", "basket", "home", "gift", "hardware"],
    "colors": ["#4caf50", "#2196f3", "#ff9800", "#9c27b0", "#f44336"],
    "itemNames": [
        "Milk", "Eggs", "Bread", "Butter", "Apples", "Coffee", "Rice",
        "Pasta", "Tomatoes", "Cheese", "Olive oil", "Washing-up liquid"
    ],
    "units": ["", "kg", "g", "l", "packs"],
    "seeds": [
        { "name": "mossy-owl", "seed": 42, "userCount": 4 },
        { "name": "rainbow-fox", "seed": 7, "userCount": 6 }
    ]
}"##;

/// A named seed definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedDefinition {
    name: String,
    seed: u64,
    user_count: usize,
}

impl SeedDefinition {
    /// The seed's registry name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The RNG seed value.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// How many users to generate.
    #[must_use]
    pub const fn user_count(&self) -> usize {
        self.user_count
    }
}

/// A seed registry: content catalogue plus named seeds.
///
/// # Example
///
/// ```
/// use example_data::SeedRegistry;
///
/// let registry = SeedRegistry::builtin().expect("builtin registry parses");
/// assert!(registry.find_seed("mossy-owl").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedRegistry {
    icons: Vec<String>,
    colors: Vec<String>,
    item_names: Vec<String>,
    units: Vec<String>,
    seeds: Vec<SeedDefinition>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeedRegistry {
    version: u32,
    icons: Vec<String>,
    colors: Vec<String>,
    item_names: Vec<String>,
    units: Vec<String>,
    seeds: Vec<SeedDefinition>,
}

impl SeedRegistry {
    /// The registry shipped with the crate.
    ///
    /// # Errors
    /// Returns [`RegistryError`] only if the built-in JSON is broken, which
    /// a unit test guards against.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_json(BUILTIN_REGISTRY_JSON)
    }

    /// Parse a seed registry from a JSON string.
    ///
    /// # Errors
    /// Returns [`RegistryError`] when the JSON is malformed, the version is
    /// unsupported, the seeds array is empty, or a catalogue array
    /// generation depends on is empty.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let raw: RawSeedRegistry =
            serde_json::from_str(json).map_err(|e| RegistryError::ParseError {
                message: e.to_string(),
            })?;

        if raw.version != SUPPORTED_VERSION {
            return Err(RegistryError::UnsupportedVersion {
                expected: SUPPORTED_VERSION,
                actual: raw.version,
            });
        }
        if raw.seeds.is_empty() {
            return Err(RegistryError::EmptySeeds);
        }
        for (array, what) in [
            (&raw.icons, "icons"),
            (&raw.colors, "colors"),
            (&raw.item_names, "itemNames"),
            (&raw.units, "units"),
        ] {
            if array.is_empty() {
                return Err(RegistryError::EmptyCatalogue { what });
            }
        }

        Ok(Self {
            icons: raw.icons,
            colors: raw.colors,
            item_names: raw.item_names,
            units: raw.units,
            seeds: raw.seeds,
        })
    }

    /// Look up a seed definition by name.
    #[must_use]
    pub fn find_seed(&self, name: &str) -> Option<&SeedDefinition> {
        self.seeds.iter().find(|seed| seed.name() == name)
    }

    /// Icon catalogue.
    #[must_use]
    pub fn icons(&self) -> &[String] {
        &self.icons
    }

    /// Colour catalogue.
    #[must_use]
    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    /// Staple item name catalogue.
    #[must_use]
    pub fn item_names(&self) -> &[String] {
        &self.item_names
    }

    /// Unit catalogue (an empty string means "no unit").
    #[must_use]
    pub fn units(&self) -> &[String] {
        &self.units
    }

    /// All seed definitions.
    #[must_use]
    pub fn seeds(&self) -> &[SeedDefinition] {
        &self.seeds
    }
}
