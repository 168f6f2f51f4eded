//! Box model and city inputs.

use colmeia_core::entities::{BoxModel, City};
use serde::Deserialize;

use super::assign;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoxModelDraft {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoxModelUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl BoxModelUpdate {
    pub fn apply(self, model: &mut BoxModel) {
        assign(&mut model.name, self.name.map(|s| s.trim().to_string()));
        assign(&mut model.description, self.description);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CityDraft {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CityUpdate {
    pub name: Option<String>,
}

impl CityUpdate {
    pub fn apply(self, city: &mut City) {
        assign(&mut city.name, self.name.map(|s| s.trim().to_string()));
    }
}
