use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::is_brazilian_state;
use crate::enums::SpeciesGroup;
use crate::validation::ValidationErrors;

/// A bee species that hives can be registered under.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Species {
    pub id: String,
    pub group: SpeciesGroup,
    pub scientific_name: String,
    pub popular_name: String,
    pub characteristics: String,
    /// UF codes where the species occurs.
    pub states: Vec<String>,
    pub default_temperament: Option<String>,
}

impl Species {
    /// Check that every listed state is a Brazilian federative unit.
    ///
    /// # Errors
    ///
    /// Returns a `states` error naming the unknown codes, sorted and unique.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut invalid: Vec<&str> = self
            .states
            .iter()
            .map(String::as_str)
            .filter(|state| !is_brazilian_state(state))
            .collect();
        if invalid.is_empty() {
            return Ok(());
        }
        invalid.sort_unstable();
        invalid.dedup();
        Err(ValidationErrors::single(
            "states",
            format!("Estados inválidos informados: {}", invalid.join(", ")),
        ))
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.popular_name, self.scientific_name)
    }
}
