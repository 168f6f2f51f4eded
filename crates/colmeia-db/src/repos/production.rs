//! Harvest aggregation for the production dashboard.
//!
//! Every query here works on the *revision scope*: harvest revisions of the
//! hives matched by a [`HiveFilter`], inside a UTC period. Sums come back as
//! exact [`Quantity`] values; month bucketing in local time is left to the
//! caller through [`ColmeiaService::harvest_entries`].

use chrono::{DateTime, Utc};
use colmeia_core::entities::Revision;
use colmeia_core::enums::{HiveStatus, RankMetric, ReviewType};
use colmeia_core::quantity::Quantity;
use serde::Serialize;

use crate::error::DatabaseError;
use crate::helpers::{
    format_datetime, get_count, get_opt_quantity, get_opt_string, get_quantity_sum,
    parse_datetime, parse_optional_datetime,
};
use crate::repos::revision::{SELECT_COLS as REVISION_COLS, row_to_revision};
use crate::scope::Conditions;
use crate::service::ColmeiaService;

const SUMS: &str = "COALESCE(SUM(r.honey_harvest_quantity), 0), \
     COALESCE(SUM(r.propolis_harvest_quantity), 0), \
     COALESCE(SUM(r.wax_harvest_quantity), 0), \
     COALESCE(SUM(r.pollen_harvest_quantity), 0), \
     COUNT(r.id), MAX(r.review_date)";

const REVISION_SCOPE: &str = "FROM revisions r JOIN hives h ON h.id = r.hive_id";

/// Hive-level filters shared by the revision and hive scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiveFilter {
    /// `None` for superusers.
    pub owner: Option<String>,
    pub apiary_ids: Vec<String>,
    pub species_ids: Vec<String>,
    pub statuses: Vec<HiveStatus>,
}

impl HiveFilter {
    fn apply(&self, conditions: &mut Conditions) {
        let statuses: Vec<&str> = self.statuses.iter().map(|s| s.as_str()).collect();
        conditions
            .owner("h.owner_id", self.owner.as_deref())
            .one_of("h.apiary_id", &self.apiary_ids)
            .one_of("h.species_id", &self.species_ids)
            .one_of("h.status", &statuses);
    }
}

/// Harvest revisions of the filtered hives with `start <= review_date <= end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestFilter {
    pub hives: HiveFilter,
    /// Narrow to a single hive.
    pub hive_id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl HarvestFilter {
    fn conditions(&self) -> Conditions {
        let mut conditions = Conditions::new();
        conditions
            .eq("r.review_type", ReviewType::Harvest.as_str())
            .at_least("r.review_date", format_datetime(&self.start))
            .at_most("r.review_date", format_datetime(&self.end));
        if let Some(hive_id) = &self.hive_id {
            conditions.eq("r.hive_id", hive_id.as_str());
        }
        self.hives.apply(&mut conditions);
        conditions
    }
}

/// Product sums over a set of harvest revisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HarvestTotals {
    pub honey: Quantity,
    pub propolis: Quantity,
    pub wax: Quantity,
    pub pollen: Quantity,
    pub harvests: u32,
    pub last_harvest: Option<DateTime<Utc>>,
}

impl HarvestTotals {
    #[must_use]
    pub const fn metric(&self, metric: RankMetric) -> Quantity {
        match metric {
            RankMetric::Honey => self.honey,
            RankMetric::Propolis => self.propolis,
            RankMetric::Wax => self.wax,
            RankMetric::Pollen => self.pollen,
        }
    }

    /// Add one harvest to the running sums.
    pub fn add_entry(&mut self, entry: &HarvestEntry) {
        self.honey += entry.honey;
        self.propolis += entry.propolis;
        self.wax += entry.wax;
        self.pollen += entry.pollen;
        self.harvests += 1;
        if self.last_harvest.is_none_or(|last| last < entry.review_date) {
            self.last_harvest = Some(entry.review_date);
        }
    }

    /// Read the six [`SUMS`] columns starting at `idx`.
    fn from_row(row: &libsql::Row, idx: i32) -> Result<Self, DatabaseError> {
        Ok(Self {
            honey: get_quantity_sum(row, idx)?,
            propolis: get_quantity_sum(row, idx + 1)?,
            wax: get_quantity_sum(row, idx + 2)?,
            pollen: get_quantity_sum(row, idx + 3)?,
            harvests: get_count(row, idx + 4)?,
            last_harvest: parse_optional_datetime(get_opt_string(row, idx + 5)?.as_deref())?,
        })
    }
}

/// One harvest revision reduced to what monthly tables need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestEntry {
    pub review_date: DateTime<Utc>,
    pub honey: Quantity,
    pub propolis: Quantity,
    pub wax: Quantity,
    pub pollen: Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HiveRanking {
    pub hive_id: String,
    pub identification_number: String,
    pub popular_name: String,
    pub species_name: String,
    pub apiary_name: Option<String>,
    pub totals: HarvestTotals,
}

/// Honey total for one group; `name` is `None` for hives without apiary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupTotal {
    pub name: Option<String>,
    pub total: Quantity,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HiveCounts {
    pub total: u32,
    /// Excludes dead and lost hives.
    pub active: u32,
    /// Never reviewed, or last reviewed before the cutoff.
    pub overdue: u32,
}

const fn metric_column(metric: RankMetric) -> &'static str {
    match metric {
        RankMetric::Honey => "total_honey",
        RankMetric::Propolis => "total_propolis",
        RankMetric::Wax => "total_wax",
        RankMetric::Pollen => "total_pollen",
    }
}

impl ColmeiaService {
    pub async fn harvest_totals(
        &self,
        filter: &HarvestFilter,
    ) -> Result<HarvestTotals, DatabaseError> {
        let conditions = filter.conditions();
        let sql = format!("SELECT {SUMS} {REVISION_SCOPE} {}", conditions.where_sql());
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        HarvestTotals::from_row(&row, 0)
    }

    /// Matching harvests in chronological order.
    pub async fn harvest_entries(
        &self,
        filter: &HarvestFilter,
    ) -> Result<Vec<HarvestEntry>, DatabaseError> {
        let conditions = filter.conditions();
        let sql = format!(
            "SELECT r.review_date, r.honey_harvest_quantity, r.propolis_harvest_quantity, \
             r.wax_harvest_quantity, r.pollen_harvest_quantity {REVISION_SCOPE} {} \
             ORDER BY r.review_date, r.rowid",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(HarvestEntry {
                review_date: parse_datetime(&row.get::<String>(0)?)?,
                honey: get_opt_quantity(&row, 1)?.unwrap_or_default(),
                propolis: get_opt_quantity(&row, 2)?.unwrap_or_default(),
                wax: get_opt_quantity(&row, 3)?.unwrap_or_default(),
                pollen: get_opt_quantity(&row, 4)?.unwrap_or_default(),
            });
        }
        Ok(entries)
    }

    /// Per-hive sums ordered by `metric` (descending), then identification number.
    pub async fn hive_ranking(
        &self,
        filter: &HarvestFilter,
        metric: RankMetric,
        limit: u32,
    ) -> Result<Vec<HiveRanking>, DatabaseError> {
        let mut conditions = filter.conditions();
        let limit_param = conditions.bind(i64::from(limit));
        let sql = format!(
            "SELECT h.id, h.identification_number, h.popular_name, s.popular_name, a.name, \
             COALESCE(SUM(r.honey_harvest_quantity), 0) AS total_honey, \
             COALESCE(SUM(r.propolis_harvest_quantity), 0) AS total_propolis, \
             COALESCE(SUM(r.wax_harvest_quantity), 0) AS total_wax, \
             COALESCE(SUM(r.pollen_harvest_quantity), 0) AS total_pollen, \
             COUNT(r.id), MAX(r.review_date) \
             {REVISION_SCOPE} JOIN species s ON s.id = h.species_id \
             LEFT JOIN apiaries a ON a.id = h.apiary_id {} \
             GROUP BY h.id ORDER BY {} DESC, h.identification_number LIMIT {limit_param}",
            conditions.where_sql(),
            metric_column(metric)
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut ranking = Vec::new();
        while let Some(row) = rows.next().await? {
            ranking.push(HiveRanking {
                hive_id: row.get(0)?,
                identification_number: row.get(1)?,
                popular_name: row.get(2)?,
                species_name: row.get(3)?,
                apiary_name: get_opt_string(&row, 4)?,
                totals: HarvestTotals::from_row(&row, 5)?,
            });
        }
        Ok(ranking)
    }

    async fn honey_grouped(
        &self,
        filter: &HarvestFilter,
        group_column: &str,
        joins: &str,
    ) -> Result<Vec<GroupTotal>, DatabaseError> {
        let conditions = filter.conditions();
        let sql = format!(
            "SELECT {group_column}, COALESCE(SUM(r.honey_harvest_quantity), 0) AS total \
             {REVISION_SCOPE} {joins} {} GROUP BY {group_column} ORDER BY total DESC, {group_column}",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut groups = Vec::new();
        while let Some(row) = rows.next().await? {
            groups.push(GroupTotal {
                name: get_opt_string(&row, 0)?,
                total: get_quantity_sum(&row, 1)?,
            });
        }
        Ok(groups)
    }

    /// Honey totals by apiary name, largest first.
    pub async fn honey_by_apiary(
        &self,
        filter: &HarvestFilter,
    ) -> Result<Vec<GroupTotal>, DatabaseError> {
        self.honey_grouped(filter, "a.name", "LEFT JOIN apiaries a ON a.id = h.apiary_id")
            .await
    }

    /// Honey totals by species popular name, largest first.
    pub async fn honey_by_species(
        &self,
        filter: &HarvestFilter,
    ) -> Result<Vec<GroupTotal>, DatabaseError> {
        self.honey_grouped(filter, "s.popular_name", "JOIN species s ON s.id = h.species_id")
            .await
    }

    pub async fn hive_counts(
        &self,
        filter: &HiveFilter,
        overdue_cutoff: DateTime<Utc>,
    ) -> Result<HiveCounts, DatabaseError> {
        let mut conditions = Conditions::new();
        filter.apply(&mut conditions);
        let cutoff = conditions.bind(format_datetime(&overdue_cutoff));
        let dead = conditions.bind(HiveStatus::Dead.as_str());
        let lost = conditions.bind(HiveStatus::Lost.as_str());
        let sql = format!(
            "SELECT COUNT(*), \
             COALESCE(SUM(CASE WHEN h.status NOT IN ({dead}, {lost}) THEN 1 ELSE 0 END), 0), \
             COALESCE(SUM(CASE WHEN h.last_review_date IS NULL OR h.last_review_date < {cutoff} THEN 1 ELSE 0 END), 0) \
             FROM hives h {}",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(HiveCounts {
            total: get_count(&row, 0)?,
            active: get_count(&row, 1)?,
            overdue: get_count(&row, 2)?,
        })
    }

    /// Distinct local years holding harvests of `owner`, newest first.
    ///
    /// `utc_offset_minutes` shifts the stored UTC timestamps before the year
    /// is taken, so a harvest late on 31 December stays in its local year.
    pub async fn harvest_years(
        &self,
        owner: Option<&str>,
        utc_offset_minutes: i32,
    ) -> Result<Vec<i32>, DatabaseError> {
        let mut conditions = Conditions::new();
        conditions
            .eq("r.review_type", ReviewType::Harvest.as_str())
            .owner("h.owner_id", owner);
        let modifier = conditions.bind(format!("{utc_offset_minutes:+} minutes"));
        let sql = format!(
            "SELECT DISTINCT CAST(strftime('%Y', r.review_date, {modifier}) AS INTEGER) AS year \
             {REVISION_SCOPE} {} ORDER BY year DESC",
            conditions.where_sql()
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(conditions.into_params()))
            .await?;
        let mut years = Vec::new();
        while let Some(row) = rows.next().await? {
            let year: i64 = row.get(0)?;
            years.push(
                i32::try_from(year)
                    .map_err(|_| DatabaseError::InvalidState(format!("year out of range: {year}")))?,
            );
        }
        Ok(years)
    }

    /// Matching harvest revisions, newest first.
    pub async fn harvest_revisions(
        &self,
        filter: &HarvestFilter,
        limit: u32,
    ) -> Result<Vec<Revision>, DatabaseError> {
        let mut conditions = filter.conditions();
        let limit_param = conditions.bind(i64::from(limit));
        let sql = format!(
            "SELECT {REVISION_COLS} {REVISION_SCOPE} {} \
             ORDER BY r.review_date DESC, r.rowid DESC LIMIT {limit_param}",
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
}
