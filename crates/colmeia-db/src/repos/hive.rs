//! Hive repository - CRUD with identifier allocation, ownership checks, and
//! apiary hive count maintenance.

use colmeia_core::entities::{Hive, HiveRelations};
use colmeia_core::ids::{HIVE_IDENTIFIER_PREFIX, PREFIX_HIVE};
use colmeia_core::validation::ValidationErrors;

use crate::error::DatabaseError;
use crate::helpers::{
    date_value, datetime_value, exists, get_opt_string, parse_enum, parse_optional_date,
    parse_optional_datetime, text_value,
};
use crate::repos::REQUIRED;
use crate::repos::apiary::refresh_hive_count;
use crate::scope::Conditions;
use crate::service::ColmeiaService;
use crate::updates::hive::{HiveDraft, HiveUpdate};

pub(crate) const SELECT_COLS: &str = "h.id, h.identification_number, h.acquisition_method, h.origin, \
     h.acquisition_date, h.transfer_date, h.species_id, h.popular_name, h.status, \
     h.next_division_date, h.apiary_id, h.origin_hive_id, h.box_model_id, h.last_review_date, \
     h.notes, h.position, h.photo, h.owner_id";

/// Newest acquisitions first, undated hives last.
const ORDER_BY: &str =
    "ORDER BY h.acquisition_date IS NULL, h.acquisition_date DESC, h.identification_number";

const INVALID_CHOICE: &str = "Selecione uma opção válida.";

/// Attempts at drawing an unused `COL-XXXXXXXX` identifier.
const IDENTIFIER_ATTEMPTS: usize = 16;

pub(crate) fn row_to_hive(row: &libsql::Row) -> Result<Hive, DatabaseError> {
    Ok(Hive {
        id: row.get(0)?,
        identification_number: row.get(1)?,
        acquisition_method: parse_enum(&row.get::<String>(2)?)?,
        origin: row.get(3)?,
        acquisition_date: parse_optional_date(get_opt_string(row, 4)?.as_deref())?,
        transfer_date: parse_optional_date(get_opt_string(row, 5)?.as_deref())?,
        species_id: row.get(6)?,
        popular_name: row.get(7)?,
        status: parse_enum(&row.get::<String>(8)?)?,
        next_division_date: parse_optional_date(get_opt_string(row, 9)?.as_deref())?,
        apiary_id: get_opt_string(row, 10)?,
        origin_hive_id: get_opt_string(row, 11)?,
        box_model_id: get_opt_string(row, 12)?,
        last_review_date: parse_optional_datetime(get_opt_string(row, 13)?.as_deref())?,
        notes: row.get(14)?,
        position: row.get(15)?,
        photo: get_opt_string(row, 16)?,
        owner_id: row.get(17)?,
    })
}

async fn owner_of(
    conn: &libsql::Connection,
    table: &str,
    id: Option<&str>,
) -> Result<Option<String>, DatabaseError> {
    let Some(id) = id else {
        return Ok(None);
    };
    let mut rows = conn
        .query(&format!("SELECT owner_id FROM {table} WHERE id = ?1"), [id])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row.get::<String>(0)?)),
        None => Ok(None),
    }
}

/// Resolve the referenced records and run every hive rule.
async fn check_hive(conn: &libsql::Connection, hive: &Hive) -> Result<(), DatabaseError> {
    let mut errors = ValidationErrors::new();

    if hive.species_id.is_empty() {
        errors.add("species", REQUIRED);
    } else if !exists(
        conn,
        "SELECT 1 FROM species WHERE id = ?1",
        vec![hive.species_id.as_str().into()],
    )
    .await?
    {
        errors.add("species", INVALID_CHOICE);
    }

    if let Some(box_model_id) = hive.box_model_id.as_deref() {
        if !exists(
            conn,
            "SELECT 1 FROM box_models WHERE id = ?1",
            vec![box_model_id.into()],
        )
        .await?
        {
            errors.add("box_model", INVALID_CHOICE);
        }
    }

    let relations = HiveRelations {
        apiary_owner_id: owner_of(conn, "apiaries", hive.apiary_id.as_deref()).await?,
        origin_hive_owner_id: owner_of(conn, "hives", hive.origin_hive_id.as_deref()).await?,
    };
    if let Err(rule_errors) = hive.validate(&relations) {
        errors.extend(rule_errors);
    }

    errors.into_result().map_err(Into::into)
}

async fn next_identification_number(conn: &libsql::Connection) -> Result<String, DatabaseError> {
    for _ in 0..IDENTIFIER_ATTEMPTS {
        let mut rows = conn
            .query(
                &format!("SELECT '{HIVE_IDENTIFIER_PREFIX}-' || upper(hex(randomblob(4)))"),
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let candidate = row.get::<String>(0)?;
        if !exists(
            conn,
            "SELECT 1 FROM hives WHERE identification_number = ?1",
            vec![candidate.as_str().into()],
        )
        .await?
        {
            return Ok(candidate);
        }
        tracing::debug!(candidate, "hive identifier collision, drawing again");
    }
    Err(DatabaseError::InvalidState(
        "could not allocate a unique hive identifier".to_string(),
    ))
}

fn hive_params(hive: &Hive) -> Vec<libsql::Value> {
    vec![
        hive.acquisition_method.as_str().into(),
        hive.origin.as_str().into(),
        date_value(hive.acquisition_date),
        date_value(hive.transfer_date),
        hive.species_id.as_str().into(),
        hive.popular_name.as_str().into(),
        hive.status.as_str().into(),
        date_value(hive.next_division_date),
        text_value(hive.apiary_id.as_deref()),
        text_value(hive.origin_hive_id.as_deref()),
        text_value(hive.box_model_id.as_deref()),
        datetime_value(hive.last_review_date),
        hive.notes.as_str().into(),
        hive.position.as_str().into(),
        text_value(hive.photo.as_deref()),
        hive.owner_id.as_str().into(),
        hive.id.as_str().into(),
    ]
}

impl ColmeiaService {
    pub async fn create_hive(&self, owner_id: &str, draft: HiveDraft) -> Result<Hive, DatabaseError> {
        let Some(acquisition_method) = draft.acquisition_method else {
            let mut errors = ValidationErrors::single("acquisition_method", REQUIRED);
            if draft.species_id.is_empty() {
                errors.add("species", REQUIRED);
            }
            return Err(errors.into());
        };

        let id = self.db().generate_id(PREFIX_HIVE).await?;
        let mut hive = Hive {
            id,
            identification_number: String::new(),
            acquisition_method,
            origin: draft.origin,
            acquisition_date: draft.acquisition_date,
            transfer_date: draft.transfer_date,
            species_id: draft.species_id,
            popular_name: draft.popular_name,
            status: draft.status,
            next_division_date: draft.next_division_date,
            apiary_id: draft.apiary_id,
            origin_hive_id: draft.origin_hive_id,
            box_model_id: draft.box_model_id,
            last_review_date: None,
            notes: draft.notes,
            position: draft.position,
            photo: None,
            owner_id: owner_id.to_string(),
        };
        let tx = self.db().begin().await?;
        check_hive(&tx, &hive).await?;
        hive.identification_number = next_identification_number(&tx).await?;
        let mut params = hive_params(&hive);
        params.push(hive.identification_number.as_str().into());
        tx.execute(
            "INSERT INTO hives (acquisition_method, origin, acquisition_date, transfer_date, species_id,
             popular_name, status, next_division_date, apiary_id, origin_hive_id, box_model_id,
             last_review_date, notes, position, photo, owner_id, id, identification_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            libsql::params_from_iter(params),
        )
        .await?;
        if let Some(apiary_id) = hive.apiary_id.as_deref() {
            refresh_hive_count(&tx, apiary_id).await?;
        }
        tx.commit().await?;

        tracing::debug!(
            hive_id = %hive.id,
            identification_number = %hive.identification_number,
            "hive created"
        );
        Ok(hive)
    }

    /// Fetch a hive. Records outside `owner` answer `NoResult`.
    pub async fn get_hive(&self, id: &str, owner: Option<&str>) -> Result<Hive, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.eq("h.id", id).owner("h.owner_id", owner);
        let sql = format!("SELECT {SELECT_COLS} FROM hives h {}", conditions.where_sql());
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_hive(&row)
    }

    pub async fn list_hives(&self, owner: Option<&str>) -> Result<Vec<Hive>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("h.owner_id", owner);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM hives h {} {ORDER_BY}",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut hives = Vec::new();
        while let Some(row) = rows.next().await? {
            hives.push(row_to_hive(&row)?);
        }
        Ok(hives)
    }

    /// Apply an update, re-run the hive rules, and recount both the previous
    /// and the new apiary when the hive moves.
    pub async fn update_hive(
        &self,
        id: &str,
        owner: Option<&str>,
        update: HiveUpdate,
    ) -> Result<Hive, DatabaseError> {
        let tx = self.db().begin().await?;
        let mut hive = self.get_hive(id, owner).await?;
        let previous_apiary = hive.apiary_id.clone();
        update.apply(&mut hive);
        check_hive(&tx, &hive).await?;

        tx.execute(
            "UPDATE hives SET acquisition_method = ?1, origin = ?2, acquisition_date = ?3,
             transfer_date = ?4, species_id = ?5, popular_name = ?6, status = ?7,
             next_division_date = ?8, apiary_id = ?9, origin_hive_id = ?10, box_model_id = ?11,
             last_review_date = ?12, notes = ?13, position = ?14, photo = ?15, owner_id = ?16
             WHERE id = ?17",
            libsql::params_from_iter(hive_params(&hive)),
        )
        .await?;
        for apiary_id in [previous_apiary.as_deref(), hive.apiary_id.as_deref()]
            .into_iter()
            .flatten()
        {
            refresh_hive_count(&tx, apiary_id).await?;
        }
        tx.commit().await?;
        Ok(hive)
    }

    /// Point the hive at a newly stored photo, or clear it with `None`.
    ///
    /// Returns the updated hive and the path it pointed at before, which the
    /// caller removes from the media directory.
    pub async fn set_hive_photo(
        &self,
        id: &str,
        owner: Option<&str>,
        photo: Option<&str>,
    ) -> Result<(Hive, Option<String>), DatabaseError> {
        let tx = self.db().begin().await?;
        let mut hive = self.get_hive(id, owner).await?;
        tx.execute(
            "UPDATE hives SET photo = ?1 WHERE id = ?2",
            libsql::params![text_value(photo), hive.id.as_str()],
        )
        .await?;
        tx.commit().await?;
        let previous = std::mem::replace(&mut hive.photo, photo.map(ToString::to_string));
        tracing::debug!(hive_id = %hive.id, photo = ?hive.photo, "hive photo replaced");
        Ok((hive, previous.filter(|path| !path.is_empty())))
    }

    /// Delete a hive with its revisions and attachments.
    ///
    /// Returns the deleted record so callers can clean up its stored photo.
    pub async fn delete_hive(&self, id: &str, owner: Option<&str>) -> Result<Hive, DatabaseError> {
        let hive = self.get_hive(id, owner).await?;
        let tx = self.db().begin().await?;
        tx.execute("DELETE FROM hives WHERE id = ?1", [hive.id.as_str()])
            .await?;
        if let Some(apiary_id) = hive.apiary_id.as_deref() {
            refresh_hive_count(&tx, apiary_id).await?;
        }
        tx.commit().await?;
        tracing::debug!(hive_id = %hive.id, "hive deleted");
        Ok(hive)
    }
}
