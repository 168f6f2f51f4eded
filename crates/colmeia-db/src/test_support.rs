//! Shared fixtures for colmeia-db unit tests.

pub(crate) mod helpers {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use colmeia_core::entities::{Apiary, Hive, Revision, Species, User};
    use colmeia_core::enums::{AcquisitionMethod, ReviewType};
    use colmeia_core::quantity::Quantity;

    use crate::service::ColmeiaService;
    use crate::updates::apiary::ApiaryDraft;
    use crate::updates::hive::HiveDraft;
    use crate::updates::revision::RevisionDraft;
    use crate::updates::species::SpeciesDraft;

    /// Create an in-memory ColmeiaService.
    pub async fn test_service() -> ColmeiaService {
        ColmeiaService::new_local(":memory:").await.unwrap()
    }

    pub async fn make_user(svc: &ColmeiaService, username: &str) -> User {
        svc.create_user(username, false, true).await.unwrap()
    }

    pub async fn make_species(svc: &ColmeiaService, popular: &str, scientific: &str) -> Species {
        svc.create_species(SpeciesDraft {
            popular_name: popular.to_string(),
            scientific_name: scientific.to_string(),
            ..SpeciesDraft::default()
        })
        .await
        .unwrap()
    }

    pub async fn make_apiary(svc: &ColmeiaService, owner: &User, name: &str) -> Apiary {
        svc.create_apiary(
            &owner.id,
            ApiaryDraft {
                name: name.to_string(),
                ..ApiaryDraft::default()
            },
        )
        .await
        .unwrap()
    }

    pub fn hive_draft(species: &Species, apiary: Option<&Apiary>, name: &str) -> HiveDraft {
        HiveDraft {
            acquisition_method: Some(AcquisitionMethod::Purchase),
            acquisition_date: NaiveDate::from_ymd_opt(2024, 1, 15),
            species_id: species.id.clone(),
            popular_name: name.to_string(),
            apiary_id: apiary.map(|a| a.id.clone()),
            ..HiveDraft::default()
        }
    }

    pub async fn make_hive(
        svc: &ColmeiaService,
        owner: &User,
        species: &Species,
        apiary: Option<&Apiary>,
        name: &str,
    ) -> Hive {
        svc.create_hive(&owner.id, hive_draft(species, apiary, name))
            .await
            .unwrap()
    }

    pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    pub async fn make_harvest(
        svc: &ColmeiaService,
        hive: &Hive,
        when: DateTime<Utc>,
        honey: i64,
    ) -> Revision {
        svc.create_revision(RevisionDraft {
            hive_id: hive.id.clone(),
            review_date: Some(when),
            review_type: ReviewType::Harvest,
            honey_harvest_quantity: Some(Quantity::from_units(honey)),
            ..RevisionDraft::default()
        })
        .await
        .unwrap()
    }

    pub async fn make_routine(svc: &ColmeiaService, hive: &Hive, when: DateTime<Utc>) -> Revision {
        svc.create_revision(RevisionDraft {
            hive_id: hive.id.clone(),
            review_date: Some(when),
            ..RevisionDraft::default()
        })
        .await
        .unwrap()
    }
}
