//! Species draft and update.

use colmeia_core::entities::Species;
use colmeia_core::enums::SpeciesGroup;
use serde::Deserialize;

use super::{assign, nullable};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpeciesDraft {
    pub group: SpeciesGroup,
    pub scientific_name: String,
    pub popular_name: String,
    pub characteristics: String,
    pub states: Vec<String>,
    pub default_temperament: Option<String>,
}

impl SpeciesDraft {
    #[must_use]
    pub fn into_species(self, id: String) -> Species {
        Species {
            id,
            group: self.group,
            scientific_name: self.scientific_name.trim().to_string(),
            popular_name: self.popular_name.trim().to_string(),
            characteristics: self.characteristics,
            states: self.states,
            default_temperament: self.default_temperament.filter(|t| !t.trim().is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeciesUpdate {
    #[serde(default)]
    pub group: Option<SpeciesGroup>,
    #[serde(default)]
    pub scientific_name: Option<String>,
    #[serde(default)]
    pub popular_name: Option<String>,
    #[serde(default)]
    pub characteristics: Option<String>,
    #[serde(default)]
    pub states: Option<Vec<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub default_temperament: Option<Option<String>>,
}

impl SpeciesUpdate {
    pub fn apply(self, species: &mut Species) {
        assign(&mut species.group, self.group);
        assign(
            &mut species.scientific_name,
            self.scientific_name.map(|s| s.trim().to_string()),
        );
        assign(
            &mut species.popular_name,
            self.popular_name.map(|s| s.trim().to_string()),
        );
        assign(&mut species.characteristics, self.characteristics);
        assign(&mut species.states, self.states);
        assign(&mut species.default_temperament, self.default_temperament);
    }
}
