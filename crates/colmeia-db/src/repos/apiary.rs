//! Apiary repository - CRUD plus the derived `hive_count`.

use colmeia_core::entities::Apiary;
use colmeia_core::ids::PREFIX_APIARY;
use colmeia_core::validation::ValidationErrors;

use crate::error::DatabaseError;
use crate::helpers::get_count;
use crate::repos::REQUIRED;
use crate::scope::Conditions;
use crate::service::ColmeiaService;
use crate::updates::apiary::{ApiaryDraft, ApiaryUpdate};

const SELECT_COLS: &str = "id, name, location, owner_id, hive_count, notes";

fn row_to_apiary(row: &libsql::Row) -> Result<Apiary, DatabaseError> {
    Ok(Apiary {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        owner_id: row.get(3)?,
        hive_count: get_count(row, 4)?,
        notes: row.get(5)?,
    })
}

fn check_apiary(apiary: &Apiary) -> Result<(), DatabaseError> {
    if apiary.name.is_empty() {
        return Err(ValidationErrors::single("name", REQUIRED).into());
    }
    Ok(())
}

/// Recount the hives of an apiary. Runs on the caller's transaction.
pub(crate) async fn refresh_hive_count(
    conn: &libsql::Connection,
    apiary_id: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE apiaries SET hive_count = (SELECT COUNT(*) FROM hives WHERE apiary_id = ?1) WHERE id = ?1",
        [apiary_id],
    )
    .await?;
    Ok(())
}

impl ColmeiaService {
    pub async fn create_apiary(
        &self,
        owner_id: &str,
        draft: ApiaryDraft,
    ) -> Result<Apiary, DatabaseError> {
        let id = self.db().generate_id(PREFIX_APIARY).await?;
        let apiary = Apiary {
            id,
            name: draft.name.trim().to_string(),
            location: draft.location,
            owner_id: owner_id.to_string(),
            hive_count: 0,
            notes: draft.notes,
        };
        check_apiary(&apiary)?;

        let tx = self.db().begin().await?;
        tx.execute(
            "INSERT INTO apiaries (id, name, location, owner_id, hive_count, notes)
             VALUES (?1, ?2, ?3, ?4, 0, ?5)",
            libsql::params![
                apiary.id.as_str(),
                apiary.name.as_str(),
                apiary.location.as_str(),
                apiary.owner_id.as_str(),
                apiary.notes.as_str()
            ],
        )
        .await?;
        tx.commit().await?;
        tracing::debug!(apiary_id = %apiary.id, owner_id, "apiary created");
        Ok(apiary)
    }

    /// Fetch an apiary. Records outside `owner` answer `NoResult`.
    pub async fn get_apiary(&self, id: &str, owner: Option<&str>) -> Result<Apiary, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.eq("id", id).owner("owner_id", owner);
        let sql = format!("SELECT {SELECT_COLS} FROM apiaries {}", conditions.where_sql());
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_apiary(&row)
    }

    pub async fn list_apiaries(&self, owner: Option<&str>) -> Result<Vec<Apiary>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("owner_id", owner);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM apiaries {} ORDER BY name, rowid",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut apiaries = Vec::new();
        while let Some(row) = rows.next().await? {
            apiaries.push(row_to_apiary(&row)?);
        }
        Ok(apiaries)
    }

    pub async fn update_apiary(
        &self,
        id: &str,
        owner: Option<&str>,
        update: ApiaryUpdate,
    ) -> Result<Apiary, DatabaseError> {
        let mut apiary = self.get_apiary(id, owner).await?;
        update.apply(&mut apiary);
        check_apiary(&apiary)?;

        let tx = self.db().begin().await?;
        tx.execute(
            "UPDATE apiaries SET name = ?1, location = ?2, notes = ?3 WHERE id = ?4",
            libsql::params![
                apiary.name.as_str(),
                apiary.location.as_str(),
                apiary.notes.as_str(),
                apiary.id.as_str()
            ],
        )
        .await?;
        tx.commit().await?;
        Ok(apiary)
    }

    /// Delete an apiary. Its hives stay and lose the apiary link.
    pub async fn delete_apiary(&self, id: &str, owner: Option<&str>) -> Result<(), DatabaseError> {
        let apiary = self.get_apiary(id, owner).await?;
        let tx = self.db().begin().await?;
        tx.execute("DELETE FROM apiaries WHERE id = ?1", [apiary.id.as_str()])
            .await?;
        tx.commit().await?;
        tracing::debug!(apiary_id = %apiary.id, "apiary deleted");
        Ok(())
    }
}
