//! Owner-scoped queries behind the admin home dashboard.

use chrono::{DateTime, Utc};
use colmeia_core::entities::Hive;
use colmeia_core::enums::HiveStatus;
use serde::Serialize;

use crate::error::DatabaseError;
use crate::helpers::{count, format_datetime, get_opt_string, parse_datetime};
use crate::repos::hive::{SELECT_COLS as HIVE_COLS, row_to_hive};
use crate::scope::Conditions;
use crate::service::ColmeiaService;

/// Columns appended after the hive columns (indexes 18..=20).
const RELATED_COLS: &str = "s.popular_name, s.scientific_name, a.name";
const HIVE_JOINS: &str =
    "FROM hives h JOIN species s ON s.id = h.species_id LEFT JOIN apiaries a ON a.id = h.apiary_id";

/// A hive with the species and apiary names a listing shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiveOverview {
    pub hive: Hive,
    pub species_popular_name: String,
    pub species_scientific_name: String,
    pub apiary_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentRevision {
    pub revision_id: String,
    pub review_date: DateTime<Utc>,
    pub hive: HiveOverview,
}

fn row_to_overview(row: &libsql::Row) -> Result<HiveOverview, DatabaseError> {
    Ok(HiveOverview {
        hive: row_to_hive(row)?,
        species_popular_name: row.get(18)?,
        species_scientific_name: row.get(19)?,
        apiary_name: get_opt_string(row, 20)?,
    })
}

impl ColmeiaService {
    async fn query_overviews(
        &self,
        conditions: Conditions,
        tail: &str,
    ) -> Result<Vec<HiveOverview>, DatabaseError> {
        let sql = format!(
            "SELECT {HIVE_COLS}, {RELATED_COLS} {HIVE_JOINS} {} {tail}",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut hives = Vec::new();
        while let Some(row) = rows.next().await? {
            hives.push(row_to_overview(&row)?);
        }
        Ok(hives)
    }

    pub async fn count_apiaries(&self, owner: Option<&str>) -> Result<u32, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("owner_id", owner);
        let sql = format!("SELECT COUNT(*) FROM apiaries {}", conditions.where_sql());
        count(self.db().conn(), &sql, conditions.into_params()).await
    }

    pub async fn count_hives(&self, owner: Option<&str>) -> Result<u32, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("owner_id", owner);
        let sql = format!("SELECT COUNT(*) FROM hives {}", conditions.where_sql());
        count(self.db().conn(), &sql, conditions.into_params()).await
    }

    /// Distinct species among the owner's hives.
    pub async fn count_distinct_species(&self, owner: Option<&str>) -> Result<u32, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("owner_id", owner);
        let sql = format!(
            "SELECT COUNT(DISTINCT species_id) FROM hives {}",
            conditions.where_sql()
        );
        count(self.db().conn(), &sql, conditions.into_params()).await
    }

    /// Latest revisions of the owner's hives, newest first.
    pub async fn recent_revisions(
        &self,
        owner: Option<&str>,
        limit: u32,
    ) -> Result<Vec<RecentRevision>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("h.owner_id", owner);
        let limit_param = conditions.bind(i64::from(limit));
        let sql = format!(
            "SELECT {HIVE_COLS}, {RELATED_COLS}, r.id, r.review_date \
             FROM revisions r JOIN hives h ON h.id = r.hive_id \
             JOIN species s ON s.id = h.species_id LEFT JOIN apiaries a ON a.id = h.apiary_id \
             {} ORDER BY r.review_date DESC, r.rowid DESC LIMIT {limit_param}",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut revisions = Vec::new();
        while let Some(row) = rows.next().await? {
            revisions.push(RecentRevision {
                hive: row_to_overview(&row)?,
                revision_id: row.get(21)?,
                review_date: parse_datetime(&row.get::<String>(22)?)?,
            });
        }
        Ok(revisions)
    }

    /// Hives not reviewed since `cutoff`, never-reviewed first, then oldest.
    pub async fn overdue_hives(
        &self,
        owner: Option<&str>,
        cutoff: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<HiveOverview>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions.owner("h.owner_id", owner);
        let cutoff_param = conditions.bind(format_datetime(&cutoff));
        conditions.raw(format!(
            "(h.last_review_date IS NULL OR h.last_review_date < {cutoff_param})"
        ));
        let limit_param = conditions.bind(i64::from(limit));
        self.query_overviews(
            conditions,
            &format!(
                "ORDER BY h.last_review_date IS NOT NULL, h.last_review_date, h.identification_number \
                 LIMIT {limit_param}"
            ),
        )
        .await
    }

    /// Hives in observation, by popular name.
    pub async fn observation_hives(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<HiveOverview>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions
            .owner("h.owner_id", owner)
            .eq("h.status", HiveStatus::Observation.as_str());
        self.query_overviews(conditions, "ORDER BY h.popular_name, h.identification_number")
            .await
    }

    /// Hives with a planned division, soonest first.
    pub async fn upcoming_divisions(
        &self,
        owner: Option<&str>,
    ) -> Result<Vec<HiveOverview>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions
            .owner("h.owner_id", owner)
            .raw("h.next_division_date IS NOT NULL");
        self.query_overviews(
            conditions,
            "ORDER BY h.next_division_date, h.identification_number",
        )
        .await
    }
}
