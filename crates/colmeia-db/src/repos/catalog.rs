//! Reference catalog repository - box models, cities, and seasons.
//!
//! All three are keyed by a unique name, which is also what the seed
//! upserts match on.

use colmeia_core::catalog::SeasonSpan;
use colmeia_core::entities::{BoxModel, City, Season};
use colmeia_core::ids::{PREFIX_BOX_MODEL, PREFIX_CITY, PREFIX_SEASON};
use colmeia_core::validation::ValidationErrors;

use crate::error::DatabaseError;
use crate::helpers::exists;
use crate::repos::{REQUIRED, already_exists};
use crate::seed::Upsert;
use crate::service::ColmeiaService;
use crate::updates::catalog::{BoxModelDraft, BoxModelUpdate, CityDraft, CityUpdate};

fn row_to_box_model(row: &libsql::Row) -> Result<BoxModel, DatabaseError> {
    Ok(BoxModel {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn row_to_city(row: &libsql::Row) -> Result<City, DatabaseError> {
    Ok(City {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

fn small(row: &libsql::Row, idx: i32) -> Result<u8, DatabaseError> {
    let raw = row.get::<i64>(idx)?;
    u8::try_from(raw).map_err(|_| DatabaseError::InvalidState(format!("day/month out of range: {raw}")))
}

fn row_to_season(row: &libsql::Row) -> Result<Season, DatabaseError> {
    Ok(Season {
        id: row.get(0)?,
        name: row.get(1)?,
        start_month: small(row, 2)?,
        start_day: small(row, 3)?,
        end_month: small(row, 4)?,
        end_day: small(row, 5)?,
    })
}

/// Look up the id of a row by its unique name.
async fn id_by_name(
    conn: &libsql::Connection,
    table: &str,
    name: &str,
) -> Result<Option<String>, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT id FROM {table} WHERE name = ?1"), [name])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get::<String>(0)?)),
        None => Ok(None),
    }
}

/// Required and unique name check shared by the catalogs.
async fn check_name(
    conn: &libsql::Connection,
    table: &str,
    verbose_name: &str,
    name: &str,
    own_id: Option<&str>,
) -> Result<(), DatabaseError> {
    if name.is_empty() {
        return Err(ValidationErrors::single("name", REQUIRED).into());
    }
    let taken = exists(
        conn,
        &format!("SELECT 1 FROM {table} WHERE name = ?1 AND id != ?2"),
        vec![name.into(), own_id.unwrap_or("").into()],
    )
    .await?;
    if taken {
        return Err(ValidationErrors::single("name", already_exists(verbose_name, "Nome")).into());
    }
    Ok(())
}

impl ColmeiaService {
    // -----------------------------------------------------------------------
    // Box models
    // -----------------------------------------------------------------------

    pub async fn create_box_model(&self, draft: BoxModelDraft) -> Result<BoxModel, DatabaseError> {
        let name = draft.name.trim().to_string();
        check_name(self.db().conn(), "box_models", "Modelo de caixa", &name, None).await?;
        let id = self.db().generate_id(PREFIX_BOX_MODEL).await?;

        let tx = self.db().begin().await?;
        tx.execute(
            "INSERT INTO box_models (id, name, description) VALUES (?1, ?2, ?3)",
            libsql::params![id.as_str(), name.as_str(), draft.description.as_str()],
        )
        .await?;
        tx.commit().await?;
        Ok(BoxModel {
            id,
            name,
            description: draft.description,
        })
    }

    pub async fn get_box_model(&self, id: &str) -> Result<BoxModel, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id, name, description FROM box_models WHERE id = ?1", [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_box_model(&row)
    }

    pub async fn list_box_models(&self) -> Result<Vec<BoxModel>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id, name, description FROM box_models ORDER BY name", ())
            .await?;
        let mut models = Vec::new();
        while let Some(row) = rows.next().await? {
            models.push(row_to_box_model(&row)?);
        }
        Ok(models)
    }

    pub async fn update_box_model(
        &self,
        id: &str,
        update: BoxModelUpdate,
    ) -> Result<BoxModel, DatabaseError> {
        let mut model = self.get_box_model(id).await?;
        update.apply(&mut model);
        check_name(
            self.db().conn(),
            "box_models",
            "Modelo de caixa",
            &model.name,
            Some(id),
        )
        .await?;

        let tx = self.db().begin().await?;
        tx.execute(
            "UPDATE box_models SET name = ?1, description = ?2 WHERE id = ?3",
            libsql::params![model.name.as_str(), model.description.as_str(), id],
        )
        .await?;
        tx.commit().await?;
        Ok(model)
    }

    /// Delete a box model. Hives using it keep their record without a model.
    pub async fn delete_box_model(&self, id: &str) -> Result<(), DatabaseError> {
        let tx = self.db().begin().await?;
        let affected = tx.execute("DELETE FROM box_models WHERE id = ?1", [id]).await?;
        tx.commit().await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    pub async fn upsert_box_model(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Upsert, DatabaseError> {
        let name = name.trim();
        let existing = id_by_name(self.db().conn(), "box_models", name).await?;
        let tx = self.db().begin().await?;
        let outcome = if let Some(id) = existing {
            tx.execute(
                "UPDATE box_models SET description = ?1 WHERE id = ?2",
                libsql::params![description, id.as_str()],
            )
            .await?;
            Upsert::Updated
        } else {
            let id = self.db().generate_id(PREFIX_BOX_MODEL).await?;
            tx.execute(
                "INSERT INTO box_models (id, name, description) VALUES (?1, ?2, ?3)",
                libsql::params![id.as_str(), name, description],
            )
            .await?;
            Upsert::Created
        };
        tx.commit().await?;
        tracing::debug!(name, ?outcome, "box model seeded");
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Cities
    // -----------------------------------------------------------------------

    pub async fn create_city(&self, draft: CityDraft) -> Result<City, DatabaseError> {
        let name = draft.name.trim().to_string();
        check_name(self.db().conn(), "cities", "Cidade", &name, None).await?;
        let id = self.db().generate_id(PREFIX_CITY).await?;

        let tx = self.db().begin().await?;
        tx.execute(
            "INSERT INTO cities (id, name) VALUES (?1, ?2)",
            libsql::params![id.as_str(), name.as_str()],
        )
        .await?;
        tx.commit().await?;
        Ok(City { id, name })
    }

    pub async fn get_city(&self, id: &str) -> Result<City, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id, name FROM cities WHERE id = ?1", [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_city(&row)
    }

    pub async fn list_cities(&self) -> Result<Vec<City>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id, name FROM cities ORDER BY name", ())
            .await?;
        let mut cities = Vec::new();
        while let Some(row) = rows.next().await? {
            cities.push(row_to_city(&row)?);
        }
        Ok(cities)
    }

    pub async fn update_city(&self, id: &str, update: CityUpdate) -> Result<City, DatabaseError> {
        let mut city = self.get_city(id).await?;
        update.apply(&mut city);
        check_name(self.db().conn(), "cities", "Cidade", &city.name, Some(id)).await?;

        let tx = self.db().begin().await?;
        tx.execute(
            "UPDATE cities SET name = ?1 WHERE id = ?2",
            libsql::params![city.name.as_str(), id],
        )
        .await?;
        tx.commit().await?;
        Ok(city)
    }

    /// Delete a city. Fails while a creator profile points at it.
    pub async fn delete_city(&self, id: &str) -> Result<(), DatabaseError> {
        if exists(
            self.db().conn(),
            "SELECT 1 FROM creator_profiles WHERE city_id = ?1 LIMIT 1",
            vec![id.into()],
        )
        .await?
        {
            return Err(DatabaseError::InvalidState(format!(
                "city {id} is still used by creator profiles"
            )));
        }
        let tx = self.db().begin().await?;
        let affected = tx.execute("DELETE FROM cities WHERE id = ?1", [id]).await?;
        tx.commit().await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        Ok(())
    }

    /// Insert a city by its formatted name (`"Campinas - SP"`) if missing.
    pub async fn upsert_city(&self, name: &str) -> Result<Upsert, DatabaseError> {
        let name = name.trim();
        if id_by_name(self.db().conn(), "cities", name).await?.is_some() {
            return Ok(Upsert::Updated);
        }
        let id = self.db().generate_id(PREFIX_CITY).await?;
        let tx = self.db().begin().await?;
        tx.execute(
            "INSERT INTO cities (id, name) VALUES (?1, ?2)",
            libsql::params![id.as_str(), name],
        )
        .await?;
        tx.commit().await?;
        tracing::debug!(name, "city created");
        Ok(Upsert::Created)
    }

    // -----------------------------------------------------------------------
    // Seasons
    // -----------------------------------------------------------------------

    pub async fn list_seasons(&self) -> Result<Vec<Season>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, name, start_month, start_day, end_month, end_day FROM seasons ORDER BY start_month, start_day",
                (),
            )
            .await?;
        let mut seasons = Vec::new();
        while let Some(row) = rows.next().await? {
            seasons.push(row_to_season(&row)?);
        }
        Ok(seasons)
    }

    pub async fn upsert_season(&self, span: &SeasonSpan) -> Result<Upsert, DatabaseError> {
        let existing = id_by_name(self.db().conn(), "seasons", span.name).await?;
        let dates = [
            i64::from(span.start_month),
            i64::from(span.start_day),
            i64::from(span.end_month),
            i64::from(span.end_day),
        ];
        let tx = self.db().begin().await?;
        let outcome = if let Some(id) = existing {
            tx.execute(
                "UPDATE seasons SET start_month = ?1, start_day = ?2, end_month = ?3, end_day = ?4 WHERE id = ?5",
                libsql::params![dates[0], dates[1], dates[2], dates[3], id.as_str()],
            )
            .await?;
            Upsert::Updated
        } else {
            let id = self.db().generate_id(PREFIX_SEASON).await?;
            tx.execute(
                "INSERT INTO seasons (id, name, start_month, start_day, end_month, end_day)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                libsql::params![id.as_str(), span.name, dates[0], dates[1], dates[2], dates[3]],
            )
            .await?;
            Upsert::Created
        };
        tx.commit().await?;
        tracing::debug!(name = span.name, ?outcome, "season seeded");
        Ok(outcome)
    }
}
