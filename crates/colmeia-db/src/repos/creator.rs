//! Creator network profiles, one per user, with their species links.

use chrono::Utc;
use colmeia_core::entities::CreatorProfile;
use colmeia_core::ids::PREFIX_CREATOR;
use colmeia_core::validation::ValidationErrors;

use crate::error::DatabaseError;
use crate::helpers::{bool_value, exists, format_datetime, get_bool, parse_datetime};
use crate::repos::{REQUIRED, already_exists};
use crate::scope::Conditions;
use crate::service::ColmeiaService;
use crate::updates::creator::{CreatorProfileDraft, CreatorProfileUpdate};

const SELECT_COLS: &str =
    "p.id, p.user_id, p.name, p.city_id, p.phone, p.is_opt_in, p.created_at, p.updated_at";

const INVALID_CHOICE: &str = "Selecione uma opção válida.";

fn row_to_profile(row: &libsql::Row) -> Result<CreatorProfile, DatabaseError> {
    Ok(CreatorProfile {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        city_id: row.get(3)?,
        species_ids: Vec::new(),
        phone: row.get(4)?,
        is_opt_in: get_bool(row, 5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

async fn check_profile(
    conn: &libsql::Connection,
    profile: &CreatorProfile,
) -> Result<(), DatabaseError> {
    let mut errors = ValidationErrors::new();
    if profile.name.is_empty() {
        errors.add("name", REQUIRED);
    }
    if profile.city_id.is_empty() {
        errors.add("city", REQUIRED);
    } else if !exists(
        conn,
        "SELECT 1 FROM cities WHERE id = ?1",
        vec![profile.city_id.as_str().into()],
    )
    .await?
    {
        errors.add("city", INVALID_CHOICE);
    }
    for species_id in &profile.species_ids {
        if !exists(
            conn,
            "SELECT 1 FROM species WHERE id = ?1",
            vec![species_id.as_str().into()],
        )
        .await?
        {
            errors.add("species", INVALID_CHOICE);
            break;
        }
    }
    if exists(
        conn,
        "SELECT 1 FROM creator_profiles WHERE user_id = ?1 AND id != ?2",
        vec![profile.user_id.as_str().into(), profile.id.as_str().into()],
    )
    .await?
    {
        errors.add("user", already_exists("Criador", "Usuário"));
    }
    errors.into_result().map_err(Into::into)
}

async fn write_species_links(
    conn: &libsql::Connection,
    profile: &CreatorProfile,
) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM creator_profile_species WHERE profile_id = ?1",
        [profile.id.as_str()],
    )
    .await?;
    for species_id in &profile.species_ids {
        conn.execute(
            "INSERT OR IGNORE INTO creator_profile_species (profile_id, species_id) VALUES (?1, ?2)",
            [profile.id.as_str(), species_id.as_str()],
        )
        .await?;
    }
    Ok(())
}

fn dedup_species(ids: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim().to_string();
        if !id.is_empty() && !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

impl ColmeiaService {
    async fn load_species_links(&self, profile: &mut CreatorProfile) -> Result<(), DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT l.species_id FROM creator_profile_species l
                 JOIN species s ON s.id = l.species_id
                 WHERE l.profile_id = ?1 ORDER BY s.popular_name, s.scientific_name",
                [profile.id.as_str()],
            )
            .await?;
        profile.species_ids.clear();
        while let Some(row) = rows.next().await? {
            profile.species_ids.push(row.get(0)?);
        }
        Ok(())
    }

    pub async fn create_creator_profile(
        &self,
        user_id: &str,
        draft: CreatorProfileDraft,
    ) -> Result<CreatorProfile, DatabaseError> {
        let id = self.db().generate_id(PREFIX_CREATOR).await?;
        let now = Utc::now();
        let profile = CreatorProfile {
            id,
            user_id: user_id.to_string(),
            name: draft.name.trim().to_string(),
            city_id: draft.city_id.trim().to_string(),
            species_ids: dedup_species(draft.species_ids),
            phone: draft.phone.trim().to_string(),
            is_opt_in: draft.is_opt_in,
            created_at: now,
            updated_at: now,
        };
        check_profile(self.db().conn(), &profile).await?;

        let tx = self.db().begin().await?;
        tx.execute(
            "INSERT INTO creator_profiles (id, user_id, name, city_id, phone, is_opt_in, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            libsql::params![
                profile.id.as_str(),
                profile.user_id.as_str(),
                profile.name.as_str(),
                profile.city_id.as_str(),
                profile.phone.as_str(),
                bool_value(profile.is_opt_in),
                format_datetime(&now)
            ],
        )
        .await?;
        write_species_links(&tx, &profile).await?;
        tx.commit().await?;
        tracing::debug!(profile_id = %profile.id, user_id, "creator profile created");
        Ok(profile)
    }

    /// Fetch a profile. Profiles of other users answer `NoResult` when `owner` is set.
    pub async fn get_creator_profile(
        &self,
        id: &str,
        owner: Option<&str>,
    ) -> Result<CreatorProfile, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.eq("p.id", id).owner("p.user_id", owner);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM creator_profiles p {}",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let mut profile = row_to_profile(&row)?;
        self.load_species_links(&mut profile).await?;
        Ok(profile)
    }

    pub async fn list_creator_profiles(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<CreatorProfile>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("p.user_id", owner);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM creator_profiles p {} ORDER BY p.name, p.rowid",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut profiles = Vec::new();
        while let Some(row) = rows.next().await? {
            profiles.push(row_to_profile(&row)?);
        }
        for profile in &mut profiles {
            self.load_species_links(profile).await?;
        }
        Ok(profiles)
    }

    pub async fn update_creator_profile(
        &self,
        id: &str,
        owner: Option<&str>,
        update: CreatorProfileUpdate,
    ) -> Result<CreatorProfile, DatabaseError> {
        let mut profile = self.get_creator_profile(id, owner).await?;
        if let Some(name) = update.name {
            profile.name = name.trim().to_string();
        }
        if let Some(city_id) = update.city_id {
            profile.city_id = city_id.trim().to_string();
        }
        if let Some(species_ids) = update.species_ids {
            profile.species_ids = dedup_species(species_ids);
        }
        if let Some(phone) = update.phone {
            profile.phone = phone.trim().to_string();
        }
        if let Some(is_opt_in) = update.is_opt_in {
            profile.is_opt_in = is_opt_in;
        }
        profile.updated_at = Utc::now();
        check_profile(self.db().conn(), &profile).await?;

        let tx = self.db().begin().await?;
        tx.execute(
            "UPDATE creator_profiles SET name = ?1, city_id = ?2, phone = ?3, is_opt_in = ?4,
             updated_at = ?5 WHERE id = ?6",
            libsql::params![
                profile.name.as_str(),
                profile.city_id.as_str(),
                profile.phone.as_str(),
                bool_value(profile.is_opt_in),
                format_datetime(&profile.updated_at),
                profile.id.as_str()
            ],
        )
        .await?;
        write_species_links(&tx, &profile).await?;
        tx.commit().await?;
        Ok(profile)
    }

    pub async fn delete_creator_profile(
        &self,
        id: &str,
        owner: Option<&str>,
    ) -> Result<(), DatabaseError> {
        let profile = self.get_creator_profile(id, owner).await?;
        let tx = self.db().begin().await?;
        tx.execute(
            "DELETE FROM creator_profiles WHERE id = ?1",
            [profile.id.as_str()],
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::{make_species, make_user, test_service};
    use crate::updates::catalog::CityDraft;

    use super::*;

    async fn campinas(svc: &ColmeiaService) -> String {
        svc.create_city(CityDraft {
            name: "Campinas - SP".to_string(),
        })
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn create_links_species_once() {
        let svc = test_service().await;
        let ana = make_user(&svc, "ana").await;
        let city_id = campinas(&svc).await;
        let jatai = make_species(&svc, "Jataí", "Tetragonisca angustula").await;

        let profile = svc
            .create_creator_profile(
                &ana.id,
                CreatorProfileDraft {
                    name: " Ana Souza ".to_string(),
                    city_id,
                    species_ids: vec![jatai.id.clone(), jatai.id.clone()],
                    is_opt_in: true,
                    ..CreatorProfileDraft::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.name, "Ana Souza");

        let fetched = svc.get_creator_profile(&profile.id, Some(&ana.id)).await.unwrap();
        assert_eq!(fetched.species_ids, vec![jatai.id]);
        assert!(fetched.is_opt_in);
    }

    #[tokio::test]
    async fn city_is_required_and_profile_is_unique() {
        let svc = test_service().await;
        let ana = make_user(&svc, "ana").await;

        let err = svc
            .create_creator_profile(
                &ana.id,
                CreatorProfileDraft {
                    name: "Ana".to_string(),
                    ..CreatorProfileDraft::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(e) if e.messages("city") == [REQUIRED]));

        let city_id = campinas(&svc).await;
        let draft = CreatorProfileDraft {
            name: "Ana".to_string(),
            city_id,
            ..CreatorProfileDraft::default()
        };
        svc.create_creator_profile(&ana.id, draft.clone()).await.unwrap();
        let err = svc.create_creator_profile(&ana.id, draft).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(e) if e.contains("user")));
    }

    #[tokio::test]
    async fn update_replaces_species_set() {
        let svc = test_service().await;
        let ana = make_user(&svc, "ana").await;
        let bia = make_user(&svc, "bia").await;
        let city_id = campinas(&svc).await;
        let jatai = make_species(&svc, "Jataí", "Tetragonisca angustula").await;
        let urucu = make_species(&svc, "Uruçu", "Melipona scutellaris").await;
        let profile = svc
            .create_creator_profile(
                &ana.id,
                CreatorProfileDraft {
                    name: "Ana".to_string(),
                    city_id,
                    species_ids: vec![jatai.id.clone()],
                    ..CreatorProfileDraft::default()
                },
            )
            .await
            .unwrap();

        let updated = svc
            .update_creator_profile(
                &profile.id,
                Some(&ana.id),
                CreatorProfileUpdate {
                    species_ids: Some(vec![urucu.id.clone()]),
                    ..CreatorProfileUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.species_ids, vec![urucu.id]);
        assert!(matches!(
            svc.update_creator_profile(&profile.id, Some(&bia.id), CreatorProfileUpdate::default())
                .await,
            Err(DatabaseError::NoResult)
        ));
    }
}
