use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{
    BroodLevel, ColonyStrength, FeedingEnergyType, FeedingProteinType, ResourceLevel, ReviewType,
    Temperament,
};
use crate::quantity::Quantity;
use crate::validation::ValidationErrors;

const HARVEST_ONLY: &str =
    "Essas informações são exibidas apenas quando o tipo de revisão é Colheita.";
const FEEDING_ONLY: &str =
    "Essas informações são exibidas apenas quando o tipo de revisão é Alimentação.";

/// Total digits allowed for harvest and feeding amounts (two of them decimal).
const AMOUNT_DIGITS: u32 = 8;
const WEIGHT_DIGITS: u32 = 6;

/// An inspection, harvest, or feeding log entry for a hive.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Revision {
    pub id: String,
    pub hive_id: String,
    pub review_date: DateTime<Utc>,
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
    /// Millilitres.
    pub honey_harvest_quantity: Option<Quantity>,
    /// Grams.
    pub propolis_harvest_quantity: Option<Quantity>,
    /// Grams.
    pub wax_harvest_quantity: Option<Quantity>,
    /// Grams.
    pub pollen_harvest_quantity: Option<Quantity>,
    pub harvest_notes: String,
    pub feeding_energy_type: Option<FeedingEnergyType>,
    pub feeding_energy_quantity: Option<Quantity>,
    pub feeding_protein_type: Option<FeedingProteinType>,
    pub feeding_protein_quantity: Option<Quantity>,
    pub feeding_notes: String,
}

impl Revision {
    /// Check that harvest and feeding details match the review type.
    ///
    /// # Errors
    ///
    /// Returns every misplaced field, any feeding quantity without a type,
    /// and any amount with more digits than its column holds.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let bounded = [
            ("hive_weight", self.hive_weight, WEIGHT_DIGITS),
            ("honey_harvest_quantity", self.honey_harvest_quantity, AMOUNT_DIGITS),
            ("propolis_harvest_quantity", self.propolis_harvest_quantity, AMOUNT_DIGITS),
            ("wax_harvest_quantity", self.wax_harvest_quantity, AMOUNT_DIGITS),
            ("pollen_harvest_quantity", self.pollen_harvest_quantity, AMOUNT_DIGITS),
            ("feeding_energy_quantity", self.feeding_energy_quantity, AMOUNT_DIGITS),
            ("feeding_protein_quantity", self.feeding_protein_quantity, AMOUNT_DIGITS),
        ];
        for (field, quantity, max_digits) in bounded {
            if quantity.is_some_and(|q| !q.fits_digits(max_digits)) {
                errors.add(
                    field,
                    format!("Certifique-se de que não tenha mais de {max_digits} dígitos no total."),
                );
            }
        }

        if self.review_type != ReviewType::Harvest {
            let harvest = [
                ("honey_harvest_quantity", self.honey_harvest_quantity.is_some()),
                ("propolis_harvest_quantity", self.propolis_harvest_quantity.is_some()),
                ("wax_harvest_quantity", self.wax_harvest_quantity.is_some()),
                ("pollen_harvest_quantity", self.pollen_harvest_quantity.is_some()),
                ("harvest_notes", !self.harvest_notes.is_empty()),
            ];
            for (field, _) in harvest.iter().filter(|(_, filled)| *filled) {
                errors.add(field, HARVEST_ONLY);
            }
        }

        if self.review_type == ReviewType::Feeding {
            if has_amount(self.feeding_energy_quantity) && self.feeding_energy_type.is_none() {
                errors.add(
                    "feeding_energy_type",
                    "Informe o tipo do alimento energético para registrar a quantidade.",
                );
            }
            if has_amount(self.feeding_protein_quantity) && self.feeding_protein_type.is_none() {
                errors.add(
                    "feeding_protein_type",
                    "Informe o tipo do alimento proteico para registrar a quantidade.",
                );
            }
        } else {
            let feeding = [
                ("feeding_energy_type", self.feeding_energy_type.is_some()),
                ("feeding_energy_quantity", self.feeding_energy_quantity.is_some()),
                ("feeding_protein_type", self.feeding_protein_type.is_some()),
                ("feeding_protein_quantity", self.feeding_protein_quantity.is_some()),
                ("feeding_notes", !self.feeding_notes.is_empty()),
            ];
            for (field, _) in feeding.iter().filter(|(_, filled)| *filled) {
                errors.add(field, FEEDING_ONLY);
            }
        }

        errors.into_result()
    }
}

/// A zero amount counts as "not informed", like an empty form field.
fn has_amount(quantity: Option<Quantity>) -> bool {
    quantity.is_some_and(|q| !q.is_zero())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn revision(review_type: ReviewType) -> Revision {
        Revision {
            id: "rev-00000001".to_string(),
            hive_id: "hiv-00000001".to_string(),
            review_date: Utc.with_ymd_and_hms(2025, 3, 10, 13, 0, 0).unwrap(),
            review_type,
            queen_seen: false,
            brood_level: None,
            food_level: None,
            pollen_level: None,
            colony_strength: None,
            temperament: None,
            hive_weight: None,
            notes: String::new(),
            management_description: String::new(),
            honey_harvest_quantity: None,
            propolis_harvest_quantity: None,
            wax_harvest_quantity: None,
            pollen_harvest_quantity: None,
            harvest_notes: String::new(),
            feeding_energy_type: None,
            feeding_energy_quantity: None,
            feeding_protein_type: None,
            feeding_protein_quantity: None,
            feeding_notes: String::new(),
        }
    }

    #[test]
    fn harvest_fields_allowed_on_harvest() {
        let mut harvest = revision(ReviewType::Harvest);
        harvest.honey_harvest_quantity = Some(Quantity::from_units(1200));
        harvest.harvest_notes = "boa florada".to_string();
        assert!(harvest.validate().is_ok());
    }

    #[test]
    fn harvest_fields_rejected_elsewhere() {
        let mut routine = revision(ReviewType::Routine);
        routine.wax_harvest_quantity = Some(Quantity::from_units(10));
        routine.harvest_notes = "x".to_string();
        let err = routine.validate().unwrap_err();
        assert_eq!(err.messages("wax_harvest_quantity"), [HARVEST_ONLY]);
        assert_eq!(err.messages("harvest_notes"), [HARVEST_ONLY]);
    }

    #[test]
    fn feeding_fields_rejected_outside_feeding() {
        let mut harvest = revision(ReviewType::Harvest);
        harvest.feeding_energy_type = Some(FeedingEnergyType::Syrup);
        let err = harvest.validate().unwrap_err();
        assert_eq!(err.messages("feeding_energy_type"), [FEEDING_ONLY]);
    }

    #[test]
    fn feeding_quantity_needs_its_type() {
        let mut feeding = revision(ReviewType::Feeding);
        feeding.feeding_energy_quantity = Some(Quantity::from_units(200));
        feeding.feeding_protein_quantity = Some(Quantity::from_units(50));
        let err = feeding.validate().unwrap_err();
        assert_eq!(
            err.fields().collect::<Vec<_>>(),
            vec!["feeding_energy_type", "feeding_protein_type"]
        );

        feeding.feeding_energy_type = Some(FeedingEnergyType::Syrup);
        feeding.feeding_protein_type = Some(FeedingProteinType::SoyPaste);
        assert!(feeding.validate().is_ok());
    }

    #[test]
    fn zero_feeding_quantity_needs_no_type() {
        let mut feeding = revision(ReviewType::Feeding);
        feeding.feeding_energy_quantity = Some(Quantity::ZERO);
        assert!(feeding.validate().is_ok());
    }

    #[test]
    fn amounts_are_bounded_by_their_columns() {
        let mut harvest = revision(ReviewType::Harvest);
        harvest.honey_harvest_quantity = Some("999999.99".parse().unwrap());
        harvest.hive_weight = Some("9999.99".parse().unwrap());
        assert!(harvest.validate().is_ok());

        harvest.honey_harvest_quantity = Some("1000000.00".parse().unwrap());
        harvest.hive_weight = Some("10000".parse().unwrap());
        let err = harvest.validate().unwrap_err();
        assert_eq!(
            err.messages("honey_harvest_quantity"),
            ["Certifique-se de que não tenha mais de 8 dígitos no total."]
        );
        assert_eq!(
            err.messages("hive_weight"),
            ["Certifique-se de que não tenha mais de 6 dígitos no total."]
        );
    }

    #[test]
    fn negative_amounts_are_bounded_too() {
        let mut feeding = revision(ReviewType::Feeding);
        feeding.feeding_energy_type = Some(FeedingEnergyType::Syrup);
        feeding.feeding_energy_quantity = Some("-1000000".parse().unwrap());
        let err = feeding.validate().unwrap_err();
        assert_eq!(err.fields().collect::<Vec<_>>(), vec!["feeding_energy_quantity"]);
    }
}
