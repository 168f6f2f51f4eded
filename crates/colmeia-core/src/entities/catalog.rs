use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A hive box design.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BoxModel {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A city, stored as `"<City> - <UF>"`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct City {
    pub id: String,
    pub name: String,
}

impl City {
    /// Canonical stored name for a city within a state.
    #[must_use]
    pub fn format_name(city: &str, state_code: &str) -> String {
        format!("{} - {}", city.trim(), state_code.trim().to_uppercase())
    }
}

/// A season window, possibly wrapping over the new year.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Season {
    pub id: String,
    pub name: String,
    pub start_month: u8,
    pub start_day: u8,
    pub end_month: u8,
    pub end_day: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn city_names_carry_the_state_code() {
        assert_eq!(City::format_name(" Campinas ", "sp"), "Campinas - SP");
    }
}
