//! Revision repository - CRUD with the hive's `last_review_date` kept in step.

use chrono::Utc;
use colmeia_core::entities::Revision;
use colmeia_core::ids::PREFIX_REVISION;
use colmeia_core::validation::ValidationErrors;

use crate::error::DatabaseError;
use crate::helpers::{
    bool_value, exists, format_datetime, get_bool, get_opt_quantity, get_opt_string, parse_datetime,
    parse_enum, parse_optional_enum, quantity_value, text_value,
};
use crate::repos::REQUIRED;
use crate::scope::Conditions;
use crate::service::ColmeiaService;
use crate::updates::revision::{RevisionDraft, RevisionUpdate};

pub(crate) const SELECT_COLS: &str = "r.id, r.hive_id, r.review_date, r.review_type, r.queen_seen, \
     r.brood_level, r.food_level, r.pollen_level, r.colony_strength, r.temperament, r.hive_weight, \
     r.notes, r.management_description, r.honey_harvest_quantity, r.propolis_harvest_quantity, \
     r.wax_harvest_quantity, r.pollen_harvest_quantity, r.harvest_notes, r.feeding_energy_type, \
     r.feeding_energy_quantity, r.feeding_protein_type, r.feeding_protein_quantity, r.feeding_notes";

pub(crate) fn row_to_revision(row: &libsql::Row) -> Result<Revision, DatabaseError> {
    Ok(Revision {
        id: row.get(0)?,
        hive_id: row.get(1)?,
        review_date: parse_datetime(&row.get::<String>(2)?)?,
        review_type: parse_enum(&row.get::<String>(3)?)?,
        queen_seen: get_bool(row, 4)?,
        brood_level: parse_optional_enum(get_opt_string(row, 5)?.as_deref())?,
        food_level: parse_optional_enum(get_opt_string(row, 6)?.as_deref())?,
        pollen_level: parse_optional_enum(get_opt_string(row, 7)?.as_deref())?,
        colony_strength: parse_optional_enum(get_opt_string(row, 8)?.as_deref())?,
        temperament: parse_optional_enum(get_opt_string(row, 9)?.as_deref())?,
        hive_weight: get_opt_quantity(row, 10)?,
        notes: row.get(11)?,
        management_description: row.get(12)?,
        honey_harvest_quantity: get_opt_quantity(row, 13)?,
        propolis_harvest_quantity: get_opt_quantity(row, 14)?,
        wax_harvest_quantity: get_opt_quantity(row, 15)?,
        pollen_harvest_quantity: get_opt_quantity(row, 16)?,
        harvest_notes: row.get(17)?,
        feeding_energy_type: parse_optional_enum(get_opt_string(row, 18)?.as_deref())?,
        feeding_energy_quantity: get_opt_quantity(row, 19)?,
        feeding_protein_type: parse_optional_enum(get_opt_string(row, 20)?.as_deref())?,
        feeding_protein_quantity: get_opt_quantity(row, 21)?,
        feeding_notes: row.get(22)?,
    })
}

fn revision_params(revision: &Revision) -> Vec<libsql::Value> {
    vec![
        revision.hive_id.as_str().into(),
        format_datetime(&revision.review_date).into(),
        revision.review_type.as_str().into(),
        bool_value(revision.queen_seen),
        text_value(revision.brood_level.map(|v| v.as_str())),
        text_value(revision.food_level.map(|v| v.as_str())),
        text_value(revision.pollen_level.map(|v| v.as_str())),
        text_value(revision.colony_strength.map(|v| v.as_str())),
        text_value(revision.temperament.map(|v| v.as_str())),
        quantity_value(revision.hive_weight),
        revision.notes.as_str().into(),
        revision.management_description.as_str().into(),
        quantity_value(revision.honey_harvest_quantity),
        quantity_value(revision.propolis_harvest_quantity),
        quantity_value(revision.wax_harvest_quantity),
        quantity_value(revision.pollen_harvest_quantity),
        revision.harvest_notes.as_str().into(),
        text_value(revision.feeding_energy_type.map(|v| v.as_str())),
        quantity_value(revision.feeding_energy_quantity),
        text_value(revision.feeding_protein_type.map(|v| v.as_str())),
        quantity_value(revision.feeding_protein_quantity),
        revision.feeding_notes.as_str().into(),
        revision.id.as_str().into(),
    ]
}

/// Field rules plus the hive reference, which must be visible to `owner`.
async fn check_revision(
    conn: &libsql::Connection,
    revision: &Revision,
    owner: Option<&str>,
) -> Result<(), DatabaseError> {
    let mut errors = ValidationErrors::new();
    if revision.hive_id.is_empty() {
        errors.add("hive", REQUIRED);
    } else {
        let mut conditions = Conditions::new();
        conditions
            .eq("id", revision.hive_id.as_str())
            .owner("owner_id", owner);
        let sql = format!("SELECT 1 FROM hives {}", conditions.where_sql());
        if !exists(conn, &sql, conditions.into_params()).await? {
            errors.add("hive", "Selecione uma opção válida.");
        }
    }
    if let Err(rule_errors) = revision.validate() {
        errors.extend(rule_errors);
    }
    errors.into_result().map_err(Into::into)
}

/// Point the hive at its newest remaining revision, or NULL when none is left.
pub(crate) async fn recompute_last_review(
    conn: &libsql::Connection,
    hive_id: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE hives SET last_review_date = (SELECT MAX(review_date) FROM revisions WHERE hive_id = ?1) WHERE id = ?1",
        [hive_id],
    )
    .await?;
    Ok(())
}

async fn mark_reviewed(conn: &libsql::Connection, revision: &Revision) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE hives SET last_review_date = ?1 WHERE id = ?2",
        libsql::params![
            format_datetime(&revision.review_date),
            revision.hive_id.as_str()
        ],
    )
    .await?;
    Ok(())
}

impl ColmeiaService {
    /// Record a revision. The hive's last review date becomes this revision's date.
    ///
    /// `owner` restricts which hives the revision may point at.
    pub async fn create_revision_for(
        &self,
        owner: Option<&str>,
        draft: RevisionDraft,
    ) -> Result<Revision, DatabaseError> {
        let id = self.db().generate_id(PREFIX_REVISION).await?;
        let revision = draft.into_revision(id, Utc::now());
        check_revision(self.db().conn(), &revision, owner).await?;

        let tx = self.db().begin().await?;
        tx.execute(
            "INSERT INTO revisions (hive_id, review_date, review_type, queen_seen, brood_level,
             food_level, pollen_level, colony_strength, temperament, hive_weight, notes,
             management_description, honey_harvest_quantity, propolis_harvest_quantity,
             wax_harvest_quantity, pollen_harvest_quantity, harvest_notes, feeding_energy_type,
             feeding_energy_quantity, feeding_protein_type, feeding_protein_quantity,
             feeding_notes, id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
                     ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
            libsql::params_from_iter(revision_params(&revision)),
        )
        .await?;
        mark_reviewed(&tx, &revision).await?;
        tx.commit().await?;

        tracing::debug!(
            revision_id = %revision.id,
            hive_id = %revision.hive_id,
            review_type = %revision.review_type,
            "revision recorded"
        );
        Ok(revision)
    }

    /// Record a revision without owner restrictions.
    pub async fn create_revision(&self, draft: RevisionDraft) -> Result<Revision, DatabaseError> {
        self.create_revision_for(None, draft).await
    }

    /// Fetch a revision. Revisions of hives outside `owner` answer `NoResult`.
    pub async fn get_revision(
        &self,
        id: &str,
        owner: Option<&str>,
    ) -> Result<Revision, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.eq("r.id", id).owner("h.owner_id", owner);
        let sql = format!(
            "SELECT {SELECT_COLS} FROM revisions r JOIN hives h ON h.id = r.hive_id {}",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_revision(&row)
    }

    /// Revisions newest first, optionally for one hive.
    pub async fn list_revisions(
        &self,
        owner: Option<&str>,
        hive_id: Option<&str>,
    ) -> Result<Vec<Revision>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("h.owner_id", owner);
        if let Some(hive_id) = hive_id {
            conditions.eq("r.hive_id", hive_id);
        }
        let sql = format!(
            "SELECT {SELECT_COLS} FROM revisions r JOIN hives h ON h.id = r.hive_id {} \
             ORDER BY r.review_date DESC, r.rowid DESC",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut revisions = Vec::new();
        while let Some(row) = rows.next().await? {
            revisions.push(row_to_revision(&row)?);
        }
        Ok(revisions)
    }

    pub async fn update_revision(
        &self,
        id: &str,
        owner: Option<&str>,
        update: RevisionUpdate,
    ) -> Result<Revision, DatabaseError> {
        let mut revision = self.get_revision(id, owner).await?;
        let previous_hive = revision.hive_id.clone();
        update.apply(&mut revision);
        check_revision(self.db().conn(), &revision, owner).await?;

        let tx = self.db().begin().await?;
        tx.execute(
            "UPDATE revisions SET hive_id = ?1, review_date = ?2, review_type = ?3, queen_seen = ?4,
             brood_level = ?5, food_level = ?6, pollen_level = ?7, colony_strength = ?8,
             temperament = ?9, hive_weight = ?10, notes = ?11, management_description = ?12,
             honey_harvest_quantity = ?13, propolis_harvest_quantity = ?14,
             wax_harvest_quantity = ?15, pollen_harvest_quantity = ?16, harvest_notes = ?17,
             feeding_energy_type = ?18, feeding_energy_quantity = ?19, feeding_protein_type = ?20,
             feeding_protein_quantity = ?21, feeding_notes = ?22
             WHERE id = ?23",
            libsql::params_from_iter(revision_params(&revision)),
        )
        .await?;
        mark_reviewed(&tx, &revision).await?;
        if previous_hive != revision.hive_id {
            recompute_last_review(&tx, &previous_hive).await?;
        }
        tx.commit().await?;
        Ok(revision)
    }

    /// Delete a revision and its attachments.
    ///
    /// Returns the stored attachment paths so callers can remove the files.
    pub async fn delete_revision(
        &self,
        id: &str,
        owner: Option<&str>,
    ) -> Result<Vec<String>, DatabaseError> {
        let revision = self.get_revision(id, owner).await?;
        let files = self
            .list_attachments(owner, Some(&revision.id))
            .await?
            .into_iter()
            .map(|attachment| attachment.file)
            .collect();

        let tx = self.db().begin().await?;
        tx.execute("DELETE FROM revisions WHERE id = ?1", [revision.id.as_str()])
            .await?;
        recompute_last_review(&tx, &revision.hive_id).await?;
        tx.commit().await?;
        tracing::debug!(revision_id = %revision.id, "revision deleted");
        Ok(files)
    }
}
