//! Revision draft, update, and update builder.

use chrono::{DateTime, Utc};
use colmeia_core::entities::Revision;
use colmeia_core::enums::{
    BroodLevel, ColonyStrength, FeedingEnergyType, FeedingProteinType, ResourceLevel, ReviewType,
    Temperament,
};
use colmeia_core::quantity::Quantity;
use serde::Deserialize;

use super::{assign, nullable};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RevisionDraft {
    pub hive_id: String,
    /// Defaults to the time of creation.
    pub review_date: Option<DateTime<Utc>>,
    pub review_type: ReviewType,
    pub queen_seen: bool,
    pub brood_level: Option<BroodLevel>,
    pub food_level: Option<ResourceLevel>,
    pub pollen_level: Option<ResourceLevel>,
    pub colony_strength: Option<ColonyStrength>,
    pub temperament: Option<Temperament>,
    pub hive_weight: Option<Quantity>,
    pub notes: String,
    pub management_description: String,
    pub honey_harvest_quantity: Option<Quantity>,
    pub propolis_harvest_quantity: Option<Quantity>,
    pub wax_harvest_quantity: Option<Quantity>,
    pub pollen_harvest_quantity: Option<Quantity>,
    pub harvest_notes: String,
    pub feeding_energy_type: Option<FeedingEnergyType>,
    pub feeding_energy_quantity: Option<Quantity>,
    pub feeding_protein_type: Option<FeedingProteinType>,
    pub feeding_protein_quantity: Option<Quantity>,
    pub feeding_notes: String,
}

impl RevisionDraft {
    #[must_use]
    pub fn into_revision(self, id: String, now: DateTime<Utc>) -> Revision {
        Revision {
            id,
            hive_id: self.hive_id,
            review_date: self.review_date.unwrap_or(now),
            review_type: self.review_type,
            queen_seen: self.queen_seen,
            brood_level: self.brood_level,
            food_level: self.food_level,
            pollen_level: self.pollen_level,
            colony_strength: self.colony_strength,
            temperament: self.temperament,
            hive_weight: self.hive_weight,
            notes: self.notes,
            management_description: self.management_description,
            honey_harvest_quantity: self.honey_harvest_quantity,
            propolis_harvest_quantity: self.propolis_harvest_quantity,
            wax_harvest_quantity: self.wax_harvest_quantity,
            pollen_harvest_quantity: self.pollen_harvest_quantity,
            harvest_notes: self.harvest_notes,
            feeding_energy_type: self.feeding_energy_type,
            feeding_energy_quantity: self.feeding_energy_quantity,
            feeding_protein_type: self.feeding_protein_type,
            feeding_protein_quantity: self.feeding_protein_quantity,
            feeding_notes: self.feeding_notes,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevisionUpdate {
    #[serde(default)]
    pub hive_id: Option<String>,
    #[serde(default)]
    pub review_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_type: Option<ReviewType>,
    #[serde(default)]
    pub queen_seen: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub brood_level: Option<Option<BroodLevel>>,
    #[serde(default, deserialize_with = "nullable")]
    pub food_level: Option<Option<ResourceLevel>>,
    #[serde(default, deserialize_with = "nullable")]
    pub pollen_level: Option<Option<ResourceLevel>>,
    #[serde(default, deserialize_with = "nullable")]
    pub colony_strength: Option<Option<ColonyStrength>>,
    #[serde(default, deserialize_with = "nullable")]
    pub temperament: Option<Option<Temperament>>,
    #[serde(default, deserialize_with = "nullable")]
    pub hive_weight: Option<Option<Quantity>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub management_description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub honey_harvest_quantity: Option<Option<Quantity>>,
    #[serde(default, deserialize_with = "nullable")]
    pub propolis_harvest_quantity: Option<Option<Quantity>>,
    #[serde(default, deserialize_with = "nullable")]
    pub wax_harvest_quantity: Option<Option<Quantity>>,
    #[serde(default, deserialize_with = "nullable")]
    pub pollen_harvest_quantity: Option<Option<Quantity>>,
    #[serde(default)]
    pub harvest_notes: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub feeding_energy_type: Option<Option<FeedingEnergyType>>,
    #[serde(default, deserialize_with = "nullable")]
    pub feeding_energy_quantity: Option<Option<Quantity>>,
    #[serde(default, deserialize_with = "nullable")]
    pub feeding_protein_type: Option<Option<FeedingProteinType>>,
    #[serde(default, deserialize_with = "nullable")]
    pub feeding_protein_quantity: Option<Option<Quantity>>,
    #[serde(default)]
    pub feeding_notes: Option<String>,
}

impl RevisionUpdate {
    pub fn apply(self, revision: &mut Revision) {
        assign(&mut revision.hive_id, self.hive_id);
        assign(&mut revision.review_date, self.review_date);
        assign(&mut revision.review_type, self.review_type);
        assign(&mut revision.queen_seen, self.queen_seen);
        assign(&mut revision.brood_level, self.brood_level);
        assign(&mut revision.food_level, self.food_level);
        assign(&mut revision.pollen_level, self.pollen_level);
        assign(&mut revision.colony_strength, self.colony_strength);
        assign(&mut revision.temperament, self.temperament);
        assign(&mut revision.hive_weight, self.hive_weight);
        assign(&mut revision.notes, self.notes);
        assign(&mut revision.management_description, self.management_description);
        assign(&mut revision.honey_harvest_quantity, self.honey_harvest_quantity);
        assign(&mut revision.propolis_harvest_quantity, self.propolis_harvest_quantity);
        assign(&mut revision.wax_harvest_quantity, self.wax_harvest_quantity);
        assign(&mut revision.pollen_harvest_quantity, self.pollen_harvest_quantity);
        assign(&mut revision.harvest_notes, self.harvest_notes);
        assign(&mut revision.feeding_energy_type, self.feeding_energy_type);
        assign(&mut revision.feeding_energy_quantity, self.feeding_energy_quantity);
        assign(&mut revision.feeding_protein_type, self.feeding_protein_type);
        assign(&mut revision.feeding_protein_quantity, self.feeding_protein_quantity);
        assign(&mut revision.feeding_notes, self.feeding_notes);
    }
}

pub struct RevisionUpdateBuilder(RevisionUpdate);

impl RevisionUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(RevisionUpdate::default())
    }

    #[must_use]
    pub fn hive_id(mut self, hive_id: impl Into<String>) -> Self {
        self.0.hive_id = Some(hive_id.into());
        self
    }

    #[must_use]
    pub fn review_date(mut self, review_date: DateTime<Utc>) -> Self {
        self.0.review_date = Some(review_date);
        self
    }

    #[must_use]
    pub fn review_type(mut self, review_type: ReviewType) -> Self {
        self.0.review_type = Some(review_type);
        self
    }

    #[must_use]
    pub fn honey_harvest_quantity(mut self, quantity: Option<Quantity>) -> Self {
        self.0.honey_harvest_quantity = Some(quantity);
        self
    }

    #[must_use]
    pub fn harvest_notes(mut self, notes: impl Into<String>) -> Self {
        self.0.harvest_notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.0.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn build(self) -> RevisionUpdate {
        self.0
    }
}

impl Default for RevisionUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
