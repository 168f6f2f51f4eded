//! Apiary draft and update. `hive_count` is derived and never accepted.

use colmeia_core::entities::Apiary;
use serde::Deserialize;

use super::assign;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiaryDraft {
    pub name: String,
    pub location: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiaryUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl ApiaryUpdate {
    pub fn apply(self, apiary: &mut Apiary) {
        assign(&mut apiary.name, self.name.map(|s| s.trim().to_string()));
        assign(&mut apiary.location, self.location);
        assign(&mut apiary.notes, self.notes);
    }
}
