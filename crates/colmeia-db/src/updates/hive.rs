//! Hive draft, update, and update builder.
//!
//! `identification_number`, `last_review_date`, the photo and the owner are
//! managed by the store and are not part of either input.

use chrono::NaiveDate;
use colmeia_core::entities::Hive;
use colmeia_core::enums::{AcquisitionMethod, HiveStatus};
use serde::Deserialize;

use super::{assign, nullable};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HiveDraft {
    pub acquisition_method: Option<AcquisitionMethod>,
    pub origin: String,
    pub acquisition_date: Option<NaiveDate>,
    pub transfer_date: Option<NaiveDate>,
    pub species_id: String,
    pub popular_name: String,
    pub status: HiveStatus,
    pub next_division_date: Option<NaiveDate>,
    pub apiary_id: Option<String>,
    pub origin_hive_id: Option<String>,
    pub box_model_id: Option<String>,
    pub notes: String,
    pub position: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HiveUpdate {
    #[serde(default)]
    pub acquisition_method: Option<AcquisitionMethod>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub acquisition_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub transfer_date: Option<Option<NaiveDate>>,
    #[serde(default)]
    pub species_id: Option<String>,
    #[serde(default)]
    pub popular_name: Option<String>,
    #[serde(default)]
    pub status: Option<HiveStatus>,
    #[serde(default, deserialize_with = "nullable")]
    pub next_division_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "nullable")]
    pub apiary_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub origin_hive_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub box_model_id: Option<Option<String>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}

impl HiveUpdate {
    pub fn apply(self, hive: &mut Hive) {
        assign(&mut hive.acquisition_method, self.acquisition_method);
        assign(&mut hive.origin, self.origin);
        assign(&mut hive.acquisition_date, self.acquisition_date);
        assign(&mut hive.transfer_date, self.transfer_date);
        assign(&mut hive.species_id, self.species_id);
        assign(&mut hive.popular_name, self.popular_name);
        assign(&mut hive.status, self.status);
        assign(&mut hive.next_division_date, self.next_division_date);
        assign(&mut hive.apiary_id, self.apiary_id);
        assign(&mut hive.origin_hive_id, self.origin_hive_id);
        assign(&mut hive.box_model_id, self.box_model_id);
        assign(&mut hive.notes, self.notes);
        assign(&mut hive.position, self.position);
    }
}

pub struct HiveUpdateBuilder(HiveUpdate);

impl HiveUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(HiveUpdate::default())
    }

    #[must_use]
    pub fn acquisition_method(mut self, method: AcquisitionMethod) -> Self {
        self.0.acquisition_method = Some(method);
        self
    }

    #[must_use]
    pub fn transfer_date(mut self, date: Option<NaiveDate>) -> Self {
        self.0.transfer_date = Some(date);
        self
    }

    #[must_use]
    pub fn popular_name(mut self, name: impl Into<String>) -> Self {
        self.0.popular_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: HiveStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn next_division_date(mut self, date: Option<NaiveDate>) -> Self {
        self.0.next_division_date = Some(date);
        self
    }

    #[must_use]
    pub fn apiary_id(mut self, apiary_id: Option<String>) -> Self {
        self.0.apiary_id = Some(apiary_id);
        self
    }

    #[must_use]
    pub fn origin_hive_id(mut self, origin_hive_id: Option<String>) -> Self {
        self.0.origin_hive_id = Some(origin_hive_id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.0.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn build(self) -> HiveUpdate {
        self.0
    }
}

impl Default for HiveUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
