//! Query-string filters shared by the production dashboard and hive detail.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use colmeia_core::enums::{HiveStatus, RankMetric};
use colmeia_db::repos::production::{HarvestFilter, HiveFilter};

pub const INVALID_YEAR: &str = "Ano inválido informado. Foi utilizado o ano atual.";
pub const SWAPPED_RANGE: &str =
    "O intervalo inicial não pode ser maior que o final. O período foi ajustado.";
pub const INVALID_METRIC: &str = "Métrica de ranking inválida. Foi utilizada a soma de mel.";
pub const INVALID_TOP: &str = "Valor inválido para o Top N. Utilizando 10.";

const DEFAULT_RANK_LIMIT: u32 = 10;
const MAX_RANK_LIMIT: i64 = 50;

/// Decoded `key=value` pairs in request order. Repeated keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Parse a raw query string; `+` decodes to a space.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .unwrap_or_default()
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (key, value) = part.split_once('=').unwrap_or((part, ""));
                (decode(key), decode(value))
            })
            .collect();
        Self(pairs)
    }

    /// Last value given for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or_else(|_| spaced.clone(), |decoded| decoded.into_owned())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFilters {
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub reference_year: i32,
    /// The `ano` parameter, when it held a valid year.
    pub selected_year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub apiary_ids: Vec<String>,
    pub species_ids: Vec<String>,
    pub statuses: Vec<HiveStatus>,
    pub rank_metric: RankMetric,
    pub rank_limit: u32,
    pub errors: Vec<String>,
    offset: FixedOffset,
}

impl DashboardFilters {
    /// Read the filters from `params`. Bad values fall back to defaults
    /// and leave a message in `errors`.
    #[must_use]
    pub fn from_query(params: &QueryParams, today: NaiveDate, offset: FixedOffset) -> Self {
        let mut errors = Vec::new();

        let mut reference_year = today.year();
        let mut selected_year = None;
        if let Some(raw) = params.get("ano").filter(|raw| !raw.is_empty()) {
            match raw.trim().parse::<i32>().ok().filter(|year| valid_year(*year)) {
                Some(year) => {
                    reference_year = year;
                    selected_year = Some(year);
                }
                None => errors.push(INVALID_YEAR.to_string()),
            }
        }

        let mut start_date = params.get("inicio").and_then(parse_date);
        let mut end_date = params.get("fim").and_then(parse_date);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                errors.push(SWAPPED_RANGE.to_string());
                start_date = Some(end);
                end_date = Some(start);
            }
        }

        let (first_day, last_day) = match (start_date, end_date) {
            (Some(start), Some(end)) => {
                reference_year = start.year();
                (start, end)
            }
            _ => {
                start_date = None;
                end_date = None;
                year_bounds(reference_year)
            }
        };

        let rank_metric = match params.get("rank_metric") {
            None => RankMetric::Honey,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                errors.push(INVALID_METRIC.to_string());
                RankMetric::Honey
            }),
        };

        let mut rank_limit = DEFAULT_RANK_LIMIT;
        if let Some(raw) = params.get("top").filter(|raw| !raw.is_empty()) {
            match raw.trim().parse::<i64>() {
                Ok(candidate) => {
                    rank_limit = u32::try_from(candidate.clamp(1, MAX_RANK_LIMIT))
                        .unwrap_or(DEFAULT_RANK_LIMIT);
                }
                Err(_) => errors.push(INVALID_TOP.to_string()),
            }
        }

        Self {
            period_start: local_instant(first_day, NaiveTime::MIN, offset),
            period_end: local_instant(last_day, end_of_day(), offset),
            reference_year,
            selected_year,
            start_date,
            end_date,
            apiary_ids: non_blank(params.get_all("apiarios")),
            species_ids: non_blank(params.get_all("especies")),
            statuses: params
                .get_all("situacoes")
                .into_iter()
                .filter_map(|raw| raw.parse().ok())
                .collect(),
            rank_metric,
            rank_limit,
            errors,
            offset,
        }
    }

    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Twelve `(year, month)` pairs starting at the period's first month.
    #[must_use]
    pub fn month_sequence(&self) -> Vec<(i32, u32)> {
        let (mut year, mut month) = self
            .start_date
            .map_or((self.reference_year, 1), |start| (start.year(), start.month()));
        let mut sequence = Vec::with_capacity(12);
        for _ in 0..12 {
            sequence.push((year, month));
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        sequence
    }

    /// `dd/mm/YYYY`, or `dd/mm/YYYY a dd/mm/YYYY` for a multi-day period.
    #[must_use]
    pub fn period_display(&self) -> String {
        let start = self.period_start.with_timezone(&self.offset).date_naive();
        let end = self.period_end.with_timezone(&self.offset).date_naive();
        if start == end {
            start.format("%d/%m/%Y").to_string()
        } else {
            format!("{} a {}", start.format("%d/%m/%Y"), end.format("%d/%m/%Y"))
        }
    }

    /// URL-encoded filters, minus `exclude`, plus `extra`.
    #[must_use]
    pub fn query_string(&self, exclude: &[&str], extra: &[(&str, &str)]) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(year) = self.selected_year {
            pairs.push(("ano", year.to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("inicio", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("fim", end.format("%Y-%m-%d").to_string()));
        }
        pairs.extend(self.apiary_ids.iter().map(|id| ("apiarios", id.clone())));
        pairs.extend(self.species_ids.iter().map(|id| ("especies", id.clone())));
        pairs.extend(
            self.statuses
                .iter()
                .map(|status| ("situacoes", status.as_str().to_string())),
        );
        pairs.push(("rank_metric", self.rank_metric.as_str().to_string()));
        pairs.push(("top", self.rank_limit.to_string()));

        pairs.retain(|(key, _)| !exclude.iter().any(|excluded| excluded == key));
        pairs.extend(extra.iter().map(|(key, value)| (*key, (*value).to_string())));

        pairs
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Hive-side filters for `owner`.
    #[must_use]
    pub fn hive_filter(&self, owner: Option<&str>) -> HiveFilter {
        HiveFilter {
            owner: owner.map(ToString::to_string),
            apiary_ids: self.apiary_ids.clone(),
            species_ids: self.species_ids.clone(),
            statuses: self.statuses.clone(),
        }
    }

    /// Harvest revisions inside the period, optionally for one hive.
    #[must_use]
    pub fn harvest_filter(&self, owner: Option<&str>, hive_id: Option<&str>) -> HarvestFilter {
        HarvestFilter {
            hives: self.hive_filter(owner),
            hive_id: hive_id.map(ToString::to_string),
            start: self.period_start,
            end: self.period_end,
        }
    }
}

fn valid_year(year: i32) -> bool {
    (1..=9999).contains(&year)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

fn year_bounds(year: i32) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
    let last = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX);
    (first, last)
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN)
}

/// The UTC instant of `date` at `time` in `offset`.
pub(crate) fn local_instant(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(time);
    offset
        .from_local_datetime(&local)
        .single()
        .map_or_else(|| local.and_utc(), |dt| dt.with_timezone(&Utc))
}

fn non_blank(values: Vec<&str>) -> Vec<String> {
    values
        .into_iter()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
        .collect()
}
