use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AcquisitionMethod, HiveStatus};
use crate::validation::ValidationErrors;

/// A managed bee colony.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Hive {
    pub id: String,
    /// Human-facing identifier, `COL-` followed by 8 uppercase hex chars.
    pub identification_number: String,
    pub acquisition_method: AcquisitionMethod,
    pub origin: String,
    pub acquisition_date: Option<NaiveDate>,
    /// Date a captured colony was moved into its box.
    pub transfer_date: Option<NaiveDate>,
    pub species_id: String,
    pub popular_name: String,
    pub status: HiveStatus,
    pub next_division_date: Option<NaiveDate>,
    pub apiary_id: Option<String>,
    /// Parent colony when the hive came from a division.
    pub origin_hive_id: Option<String>,
    pub box_model_id: Option<String>,
    /// Date of the latest revision. Maintained by the store.
    pub last_review_date: Option<DateTime<Utc>>,
    pub notes: String,
    pub position: String,
    /// Stored path of the hive photo, relative to the media directory.
    pub photo: Option<String>,
    pub owner_id: String,
}

/// Owners of the records a hive points at, resolved by the caller.
///
/// A `None` owner for a set reference means the referenced record does
/// not exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiveRelations {
    pub apiary_owner_id: Option<String>,
    pub origin_hive_owner_id: Option<String>,
}

impl Hive {
    /// Check the acquisition and ownership rules.
    ///
    /// # Errors
    ///
    /// Returns every failing field at once.
    pub fn validate(&self, relations: &HiveRelations) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.apiary_id.is_some()
            && relations.apiary_owner_id.as_deref() != Some(self.owner_id.as_str())
        {
            errors.add(
                "apiary",
                "A colmeia só pode ser vinculada a meliponários/apiários do mesmo usuário.",
            );
        }

        if self.acquisition_method == AcquisitionMethod::Purchase && self.acquisition_date.is_none()
        {
            errors.add(
                "acquisition_date",
                "Informe a data de aquisição para colmeias adquiridas por compra.",
            );
        }

        if self.acquisition_method == AcquisitionMethod::Capture {
            if self.transfer_date.is_none() {
                errors.add(
                    "transfer_date",
                    "Informe a data de transferência quando a colmeia é capturada.",
                );
            }
        } else if self.transfer_date.is_some() {
            errors.add(
                "transfer_date",
                "A data de transferência só deve ser preenchida quando a colmeia é capturada.",
            );
        }

        if self.acquisition_method == AcquisitionMethod::Division {
            match self.origin_hive_id.as_deref() {
                None => errors.add(
                    "origin_hive",
                    "Informe a colmeia de origem quando o método de aquisição for divisão.",
                ),
                Some(origin) if origin == self.id => errors.add(
                    "origin_hive",
                    "A colmeia de origem não pode ser a própria colmeia.",
                ),
                Some(_)
                    if relations.origin_hive_owner_id.as_deref()
                        != Some(self.owner_id.as_str()) =>
                {
                    errors.add(
                        "origin_hive",
                        "Escolha uma colmeia de origem pertencente ao mesmo usuário.",
                    );
                }
                Some(_) => {}
            }
        } else if self.origin_hive_id.is_some() {
            errors.add(
                "origin_hive",
                "A colmeia de origem só deve ser preenchida quando o método for divisão.",
            );
        }

        errors.into_result()
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.identification_number, self.popular_name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const OWNER: &str = "usr-00000001";

    fn hive(method: AcquisitionMethod) -> Hive {
        Hive {
            id: "hiv-00000001".to_string(),
            identification_number: "COL-1A2B3C4D".to_string(),
            acquisition_method: method,
            origin: String::new(),
            acquisition_date: None,
            transfer_date: None,
            species_id: "spc-00000001".to_string(),
            popular_name: "Colmeia A".to_string(),
            status: HiveStatus::Productive,
            next_division_date: None,
            apiary_id: None,
            origin_hive_id: None,
            box_model_id: None,
            last_review_date: None,
            notes: String::new(),
            position: String::new(),
            photo: None,
            owner_id: OWNER.to_string(),
        }
    }

    fn owned_by(owner: &str) -> Option<String> {
        Some(owner.to_string())
    }

    #[test]
    fn trade_without_extras_is_valid() {
        assert!(hive(AcquisitionMethod::Trade).validate(&HiveRelations::default()).is_ok());
    }

    #[test]
    fn purchase_requires_acquisition_date() {
        let err = hive(AcquisitionMethod::Purchase)
            .validate(&HiveRelations::default())
            .unwrap_err();
        assert!(err.contains("acquisition_date"));

        let mut bought = hive(AcquisitionMethod::Purchase);
        bought.acquisition_date = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert!(bought.validate(&HiveRelations::default()).is_ok());
    }

    #[test]
    fn capture_requires_transfer_date_and_others_forbid_it() {
        let err = hive(AcquisitionMethod::Capture)
            .validate(&HiveRelations::default())
            .unwrap_err();
        assert_eq!(
            err.messages("transfer_date"),
            ["Informe a data de transferência quando a colmeia é capturada."]
        );

        let mut donated = hive(AcquisitionMethod::Donation);
        donated.transfer_date = NaiveDate::from_ymd_opt(2024, 5, 1);
        let err = donated.validate(&HiveRelations::default()).unwrap_err();
        assert_eq!(
            err.messages("transfer_date"),
            ["A data de transferência só deve ser preenchida quando a colmeia é capturada."]
        );
    }

    #[test]
    fn division_requires_foreign_free_origin() {
        let missing = hive(AcquisitionMethod::Division)
            .validate(&HiveRelations::default())
            .unwrap_err();
        assert!(missing.messages("origin_hive")[0].starts_with("Informe a colmeia de origem"));

        let mut itself = hive(AcquisitionMethod::Division);
        itself.origin_hive_id = Some(itself.id.clone());
        let relations = HiveRelations {
            origin_hive_owner_id: owned_by(OWNER),
            ..HiveRelations::default()
        };
        let err = itself.validate(&relations).unwrap_err();
        assert_eq!(
            err.messages("origin_hive"),
            ["A colmeia de origem não pode ser a própria colmeia."]
        );

        let mut foreign = hive(AcquisitionMethod::Division);
        foreign.origin_hive_id = Some("hiv-00000002".to_string());
        let relations = HiveRelations {
            origin_hive_owner_id: owned_by("usr-00000009"),
            ..HiveRelations::default()
        };
        let err = foreign.validate(&relations).unwrap_err();
        assert_eq!(
            err.messages("origin_hive"),
            ["Escolha uma colmeia de origem pertencente ao mesmo usuário."]
        );

        let relations = HiveRelations {
            origin_hive_owner_id: owned_by(OWNER),
            ..HiveRelations::default()
        };
        assert!(foreign.validate(&relations).is_ok());
    }

    #[test]
    fn origin_hive_only_for_divisions() {
        let mut traded = hive(AcquisitionMethod::Trade);
        traded.origin_hive_id = Some("hiv-00000002".to_string());
        let err = traded.validate(&HiveRelations::default()).unwrap_err();
        assert!(err.contains("origin_hive"));
    }

    #[test]
    fn apiary_must_share_owner() {
        let mut placed = hive(AcquisitionMethod::Trade);
        placed.apiary_id = Some("api-00000001".to_string());

        let foreign = HiveRelations {
            apiary_owner_id: owned_by("usr-00000009"),
            ..HiveRelations::default()
        };
        assert!(placed.validate(&foreign).unwrap_err().contains("apiary"));

        let own = HiveRelations {
            apiary_owner_id: owned_by(OWNER),
            ..HiveRelations::default()
        };
        assert!(placed.validate(&own).is_ok());
    }

    #[test]
    fn reports_all_failures_together() {
        let mut hive = hive(AcquisitionMethod::Capture);
        hive.origin_hive_id = Some("hiv-00000002".to_string());
        let err = hive.validate(&HiveRelations::default()).unwrap_err();
        assert_eq!(
            err.fields().collect::<Vec<_>>(),
            vec!["origin_hive", "transfer_date"]
        );
    }
}
