//! Species repository - CRUD, catalog upsert, and the species seen in a user's hives.

use colmeia_core::entities::Species;
use colmeia_core::ids::PREFIX_SPECIES;
use colmeia_core::validation::ValidationErrors;

use crate::error::DatabaseError;
use crate::helpers::{exists, get_opt_string, parse_enum, text_value};
use crate::repos::REQUIRED;
use crate::scope::Conditions;
use crate::seed::Upsert;
use crate::service::ColmeiaService;
use crate::updates::species::{SpeciesDraft, SpeciesUpdate};

const SELECT_COLS: &str =
    "s.id, s.species_group, s.scientific_name, s.popular_name, s.characteristics, s.states, s.default_temperament";

fn row_to_species(row: &libsql::Row) -> Result<Species, DatabaseError> {
    let states: Vec<String> = serde_json::from_str(&row.get::<String>(5)?)
        .map_err(|e| DatabaseError::Query(format!("Invalid species states JSON: {e}")))?;
    Ok(Species {
        id: row.get(0)?,
        group: parse_enum(&row.get::<String>(1)?)?,
        scientific_name: row.get(2)?,
        popular_name: row.get(3)?,
        characteristics: row.get(4)?,
        states,
        default_temperament: get_opt_string(row, 6)?,
    })
}

fn check_species(species: &Species) -> Result<(), DatabaseError> {
    let mut errors = ValidationErrors::new();
    if species.scientific_name.is_empty() {
        errors.add("scientific_name", REQUIRED);
    }
    if species.popular_name.is_empty() {
        errors.add("popular_name", REQUIRED);
    }
    if let Err(state_errors) = species.validate() {
        errors.extend(state_errors);
    }
    errors.into_result().map_err(Into::into)
}

fn states_json(species: &Species) -> Result<String, DatabaseError> {
    serde_json::to_string(&species.states).map_err(|e| DatabaseError::Other(e.into()))
}

impl ColmeiaService {
    pub async fn create_species(&self, draft: SpeciesDraft) -> Result<Species, DatabaseError> {
        let id = self.db().generate_id(PREFIX_SPECIES).await?;
        let species = draft.into_species(id);
        check_species(&species)?;
        self.insert_species(&species).await?;
        Ok(species)
    }

    async fn insert_species(&self, species: &Species) -> Result<(), DatabaseError> {
        let tx = self.db().begin().await?;
        tx.execute(
            "INSERT INTO species (id, species_group, scientific_name, popular_name, characteristics, states, default_temperament)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            libsql::params![
                species.id.as_str(),
                species.group.as_str(),
                species.scientific_name.as_str(),
                species.popular_name.as_str(),
                species.characteristics.as_str(),
                states_json(species)?,
                text_value(species.default_temperament.as_deref())
            ],
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn write_species(&self, species: &Species) -> Result<(), DatabaseError> {
        let tx = self.db().begin().await?;
        tx.execute(
            "UPDATE species SET species_group = ?1, scientific_name = ?2, popular_name = ?3,
             characteristics = ?4, states = ?5, default_temperament = ?6 WHERE id = ?7",
            libsql::params![
                species.group.as_str(),
                species.scientific_name.as_str(),
                species.popular_name.as_str(),
                species.characteristics.as_str(),
                states_json(species)?,
                text_value(species.default_temperament.as_deref()),
                species.id.as_str()
            ],
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn get_species(&self, id: &str) -> Result<Species, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM species s WHERE s.id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_species(&row)
    }

    pub async fn list_species(&self) -> Result<Vec<Species>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM species s ORDER BY s.popular_name, s.scientific_name"
                ),
                (),
            )
            .await?;
        let mut species = Vec::new();
        while let Some(row) = rows.next().await? {
            species.push(row_to_species(&row)?);
        }
        Ok(species)
    }

    /// Distinct species among the hives an owner keeps, by popular name.
    pub async fn list_species_in_hives(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<Species>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("h.owner_id", owner);
        let sql = format!(
            "SELECT DISTINCT {SELECT_COLS} FROM species s JOIN hives h ON h.species_id = s.id {} \
             ORDER BY s.popular_name, s.scientific_name",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut species = Vec::new();
        while let Some(row) = rows.next().await? {
            species.push(row_to_species(&row)?);
        }
        Ok(species)
    }

    pub async fn update_species(
        &self,
        id: &str,
        update: SpeciesUpdate,
    ) -> Result<Species, DatabaseError> {
        let mut species = self.get_species(id).await?;
        update.apply(&mut species);
        check_species(&species)?;
        self.write_species(&species).await?;
        Ok(species)
    }

    /// Delete a species. Fails while any hive still references it.
    pub async fn delete_species(&self, id: &str) -> Result<(), DatabaseError> {
        if exists(
            self.db().conn(),
            "SELECT 1 FROM hives WHERE species_id = ?1 LIMIT 1",
            vec![id.into()],
        )
        .await?
        {
            return Err(DatabaseError::InvalidState(format!(
                "species {id} is still used by hives"
            )));
        }
        let tx = self.db().begin().await?;
        let affected = tx.execute("DELETE FROM species WHERE id = ?1", [id]).await?;
        tx.commit().await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    /// Insert or refresh a species keyed by scientific name.
    pub async fn upsert_species(&self, draft: SpeciesDraft) -> Result<Upsert, DatabaseError> {
        let scientific_name = draft.scientific_name.trim().to_string();
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id FROM species WHERE scientific_name = ?1 ORDER BY rowid LIMIT 1",
                [scientific_name.as_str()],
            )
            .await?;
        let existing = match rows.next().await? {
            Some(row) => Some(row.get::<String>(0)?),
            None => None,
        };

        match existing {
            Some(id) => {
                let species = draft.into_species(id);
                check_species(&species)?;
                self.write_species(&species).await?;
                tracing::debug!(scientific_name, "species updated");
                Ok(Upsert::Updated)
            }
            None => {
                self.create_species(draft).await?;
                tracing::debug!(scientific_name, "species created");
                Ok(Upsert::Created)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::test_support::helpers::{make_hive, make_species, make_user, test_service};

    use super::*;

    fn draft(scientific: &str, popular: &str, states: &[&str]) -> SpeciesDraft {
        SpeciesDraft {
            scientific_name: scientific.to_string(),
            popular_name: popular.to_string(),
            states: states.iter().map(ToString::to_string).collect(),
            ..SpeciesDraft::default()
        }
    }

    #[tokio::test]
    async fn create_roundtrips_states() {
        let svc = test_service().await;
        let created = svc
            .create_species(draft("Tetragonisca angustula", "Jataí", &["SP", "MG"]))
            .await
            .unwrap();
        let fetched = svc.get_species(&created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.states, vec!["SP", "MG"]);
    }

    #[tokio::test]
    async fn invalid_states_are_rejected() {
        let svc = test_service().await;
        let err = svc
            .create_species(draft("Melipona scutellaris", "Uruçu", &["BA", "XX"]))
            .await
            .unwrap_err();
        match err {
            DatabaseError::Validation(errors) => assert_eq!(
                errors.messages("states"),
                ["Estados inválidos informados: XX"]
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(svc.list_species().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_orders_by_popular_name() {
        let svc = test_service().await;
        make_species(&svc, "Uruçu", "Melipona scutellaris").await;
        make_species(&svc, "Jataí", "Tetragonisca angustula").await;
        let names: Vec<String> = svc
            .list_species()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.popular_name)
            .collect();
        assert_eq!(names, vec!["Jataí", "Uruçu"]);
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let svc = test_service().await;
        let first = svc
            .upsert_species(draft("Melipona quadrifasciata", "Mandaçaia", &["SP"]))
            .await
            .unwrap();
        let second = svc
            .upsert_species(draft("Melipona quadrifasciata", "Mandaçaia-grande", &["SP", "PR"]))
            .await
            .unwrap();
        assert_eq!(first, Upsert::Created);
        assert_eq!(second, Upsert::Updated);

        let all = svc.list_species().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].popular_name, "Mandaçaia-grande");
        assert_eq!(all[0].states, vec!["SP", "PR"]);
    }

    #[tokio::test]
    async fn species_in_hives_is_owner_scoped() {
        let svc = test_service().await;
        let ana = make_user(&svc, "ana").await;
        let bia = make_user(&svc, "bia").await;
        let jatai = make_species(&svc, "Jataí", "Tetragonisca angustula").await;
        let urucu = make_species(&svc, "Uruçu", "Melipona scutellaris").await;
        make_hive(&svc, &ana, &jatai, None, "A1").await;
        make_hive(&svc, &ana, &jatai, None, "A2").await;
        make_hive(&svc, &bia, &urucu, None, "B1").await;

        let mine = svc.list_species_in_hives(Some(&ana.id)).await.unwrap();
        assert_eq!(mine, vec![jatai.clone()]);
        let all = svc.list_species_in_hives(None).await.unwrap();
        assert_eq!(all, vec![jatai, urucu]);
    }

    #[tokio::test]
    async fn species_in_use_cannot_be_deleted() {
        let svc = test_service().await;
        let ana = make_user(&svc, "ana").await;
        let jatai = make_species(&svc, "Jataí", "Tetragonisca angustula").await;
        make_hive(&svc, &ana, &jatai, None, "A1").await;
        assert!(matches!(
            svc.delete_species(&jatai.id).await,
            Err(DatabaseError::InvalidState(_))
        ));
    }
}
