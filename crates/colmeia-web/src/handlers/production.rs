//! Production dashboard, its CSV export and the per-hive detail page.
//!
//! Every block reads harvest revisions (`colheita`) of the actor's hives
//! inside the filter period. Month buckets use the configured offset.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, RawQuery, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use chrono::{Datelike, Duration, Utc};
use colmeia_core::catalog::month_label;
use colmeia_core::entities::{Hive, Revision};
use colmeia_core::enums::{HiveStatus, RankMetric, ReviewType};
use colmeia_core::identity::Actor;
use colmeia_core::quantity::Quantity;
use colmeia_db::error::DatabaseError;
use colmeia_db::repos::production::{GroupTotal, HarvestEntry, HarvestFilter, HarvestTotals};
use serde::Serialize;

use super::home::add_revision_url;
use super::local_display;
use crate::error::WebError;
use crate::filters::{DashboardFilters, QueryParams};
use crate::format::{CsvWriter, local_datetime};
use crate::identity::CurrentUser;
use crate::routes::PRODUCTION_DASHBOARD;
use crate::state::AppState;

const NO_APIARY: &str = "Sem meliponário";
const NO_HARVESTS: &str = "Sem colheitas no período";
const CSV_HEADER: [&str; 6] = [
    "Mês",
    "Mel (ml)",
    "Própolis (g)",
    "Cera (g)",
    "Pólen (g)",
    "# Colheitas",
];

#[derive(Debug, Serialize)]
pub struct ProductionPage {
    filter_errors: Vec<String>,
    available_filters: AvailableFilters,
    cards: ProductionCards,
    monthly_table: MonthlyTable,
    chart: Chart,
    rank: Rank,
    season: SeasonCard,
    production_by_apiary: Vec<GroupRow>,
    production_by_species: Vec<GroupRow>,
    period_label: String,
    rank_metrics: Vec<Choice>,
    query_string: String,
    selected_year: i32,
}

#[derive(Debug, Serialize)]
struct Choice {
    value: &'static str,
    label: &'static str,
}

#[derive(Debug, Serialize)]
struct NamedId {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct AvailableFilters {
    apiaries: Vec<NamedId>,
    species: Vec<NamedId>,
    statuses: Vec<Choice>,
    years: Vec<i32>,
}

#[derive(Debug, Default, Serialize)]
struct ProductSums {
    honey: Quantity,
    propolis: Quantity,
    wax: Quantity,
    pollen: Quantity,
}

impl From<&HarvestTotals> for ProductSums {
    fn from(totals: &HarvestTotals) -> Self {
        Self {
            honey: totals.honey,
            propolis: totals.propolis,
            wax: totals.wax,
            pollen: totals.pollen,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProductionCards {
    production: ProductSums,
    active_hives: u32,
    revision_count: u32,
    last_review: Option<String>,
    overdue_percentage: f64,
    overdue_total: u32,
}

#[derive(Debug, Serialize)]
struct MonthlyRow {
    month: u32,
    label: String,
    honey: Quantity,
    propolis: Quantity,
    wax: Quantity,
    pollen: Quantity,
    harvests: u32,
}

#[derive(Debug, Default, Serialize)]
struct MonthlyTotals {
    honey: Quantity,
    propolis: Quantity,
    wax: Quantity,
    pollen: Quantity,
    harvests: u32,
}

#[derive(Debug, Serialize)]
struct MonthlyTable {
    rows: Vec<MonthlyRow>,
    totals: MonthlyTotals,
}

#[derive(Debug, Serialize)]
struct ChartSeries {
    honey: Vec<f64>,
    propolis: Vec<f64>,
    wax: Vec<f64>,
    pollen: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct Chart {
    labels: Vec<String>,
    series: ChartSeries,
}

#[derive(Debug, Serialize)]
struct RankItem {
    hive_id: String,
    name: String,
    species: String,
    apiary: String,
    honey: Quantity,
    propolis: Quantity,
    wax: Quantity,
    pollen: Quantity,
    harvests: u32,
    last_harvest: String,
    detail_url: String,
}

#[derive(Debug, Serialize)]
struct Rank {
    items: Vec<RankItem>,
    metric: RankMetric,
    metric_label: &'static str,
    limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonCard {
    pub title: &'static str,
    pub description: &'static str,
    pub tips: [&'static str; 3],
}

#[derive(Debug, Serialize)]
struct GroupRow {
    name: String,
    total: Quantity,
}

const SUMMER: SeasonCard = SeasonCard {
    title: "Verão",
    description: "Período de altas temperaturas e chuvas intensas. Garanta sombreamento, \
                  boa ventilação e atenção redobrada ao fornecimento de água.",
    tips: [
        "Monitore o superaquecimento das caixas e faça manejo de ventilação.",
        "Reforce potes de alimento para evitar fermentações.",
        "Acompanhe possíveis enxameações após colheitas abundantes.",
    ],
};

const AUTUMN: SeasonCard = SeasonCard {
    title: "Outono",
    description: "Transição com redução de flores e temperaturas mais amenas. \
                  Ajuste a alimentação e planeje divisões estratégicas.",
    tips: [
        "Faça avaliações de reservas de alimento e complemente quando necessário.",
        "Realize divisões apenas em colônias fortes.",
        "Reforce o controle de pragas e cupins nas estruturas.",
    ],
};

const WINTER: SeasonCard = SeasonCard {
    title: "Inverno",
    description: "Meses mais frios e secos. Colônias reduzem atividade externa, \
                  exigindo atenção ao isolamento e à oferta de recursos internos.",
    tips: [
        "Evite aberturas prolongadas das caixas durante dias frios.",
        "Planeje suplementação com alimentos energéticos e proteicos.",
        "Proteja entradas contra ventos fortes e umidade excessiva.",
    ],
};

const SPRING: SeasonCard = SeasonCard {
    title: "Primavera",
    description: "Floradas intensas impulsionam a produção. Época ideal para expansões \
                  e monitoramento de enxameação.",
    tips: [
        "Amplie o espaço interno conforme o crescimento da colônia.",
        "Acompanhe potes de pólen para garantir qualidade do alimento.",
        "Planeje novas divisões e capturas diante de colmeias fortes.",
    ],
};

/// Management card for the season `month` falls in.
#[must_use]
pub const fn season_for_month(month: u32) -> SeasonCard {
    match month {
        12 | 1 | 2 => SUMMER,
        3..=5 => AUTUMN,
        6..=8 => WINTER,
        _ => SPRING,
    }
}

/// `GET /admin/producao/`, or the monthly CSV with `?export=meses`.
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    RawQuery(raw): RawQuery,
) -> Result<Response, WebError> {
    let params = QueryParams::parse(raw.as_deref());
    let filters = DashboardFilters::from_query(&params, state.today(), state.offset);
    let owner = actor.owner_scope();
    let harvest_filter = filters.harvest_filter(owner, None);

    if params.get("export") == Some("meses") {
        let table = monthly_table(&state, &filters, &harvest_filter).await?;
        return Ok(monthly_csv(&table, filters.reference_year));
    }

    let page = build_page(&state, &actor, &filters, &harvest_filter).await?;
    Ok(Json(page).into_response())
}

async fn build_page(
    state: &AppState,
    actor: &Actor,
    filters: &DashboardFilters,
    harvest_filter: &HarvestFilter,
) -> Result<ProductionPage, WebError> {
    let owner = actor.owner_scope();
    let service = &state.service;

    let totals = service.harvest_totals(harvest_filter).await?;
    let overdue_cutoff = Utc::now() - Duration::days(state.config.dashboard.production_overdue_days);
    let counts = service
        .hive_counts(&filters.hive_filter(owner), overdue_cutoff)
        .await?;
    let overdue_percentage = if counts.total == 0 {
        0.0
    } else {
        f64::from(counts.overdue) / f64::from(counts.total) * 100.0
    };
    let cards = ProductionCards {
        production: ProductSums::from(&totals),
        active_hives: counts.active,
        revision_count: totals.harvests,
        last_review: local_display(state, totals.last_harvest.as_ref()),
        overdue_percentage,
        overdue_total: counts.overdue,
    };

    let monthly_table = monthly_table(state, filters, harvest_filter).await?;
    let chart = chart(&monthly_table);
    let rank = rank(state, filters, harvest_filter).await?;

    let production_by_apiary = group_rows(service.honey_by_apiary(harvest_filter).await?, NO_APIARY);
    let production_by_species = group_rows(service.honey_by_species(harvest_filter).await?, "");

    Ok(ProductionPage {
        filter_errors: filters.errors.clone(),
        available_filters: available_filters(state, owner).await?,
        cards,
        monthly_table,
        chart,
        rank,
        season: season_for_month(state.today().month()),
        production_by_apiary,
        production_by_species,
        period_label: filters.period_display(),
        rank_metrics: RankMetric::ALL
            .iter()
            .map(|metric| Choice {
                value: metric.as_str(),
                label: metric.label(),
            })
            .collect(),
        query_string: filters.query_string(&[], &[]),
        selected_year: filters.selected_year.unwrap_or(filters.reference_year),
    })
}

async fn monthly_table(
    state: &AppState,
    filters: &DashboardFilters,
    harvest_filter: &HarvestFilter,
) -> Result<MonthlyTable, DatabaseError> {
    let entries = state.service.harvest_entries(harvest_filter).await?;
    let buckets = bucket_by_month(&entries, state);

    let sequence = filters.month_sequence();
    let spans_years = sequence.first().map(|(year, _)| year) != sequence.last().map(|(year, _)| year);

    let mut totals = MonthlyTotals::default();
    let rows = sequence
        .into_iter()
        .map(|(year, month)| {
            let sums = buckets.get(&(year, month)).copied().unwrap_or_default();
            totals.honey += sums.honey;
            totals.propolis += sums.propolis;
            totals.wax += sums.wax;
            totals.pollen += sums.pollen;
            totals.harvests += sums.harvests;
            let label = if spans_years {
                format!("{} {year}", month_label(month))
            } else {
                month_label(month).to_string()
            };
            MonthlyRow {
                month,
                label,
                honey: sums.honey,
                propolis: sums.propolis,
                wax: sums.wax,
                pollen: sums.pollen,
                harvests: sums.harvests,
            }
        })
        .collect();

    Ok(MonthlyTable { rows, totals })
}

/// Sums per local `(year, month)`, in calendar order.
fn bucket_by_month(entries: &[HarvestEntry], state: &AppState) -> BTreeMap<(i32, u32), HarvestTotals> {
    let mut buckets: BTreeMap<(i32, u32), HarvestTotals> = BTreeMap::new();
    for entry in entries {
        let local = entry.review_date.with_timezone(&state.offset);
        buckets
            .entry((local.year(), local.month()))
            .or_default()
            .add_entry(entry);
    }
    buckets
}

fn chart(table: &MonthlyTable) -> Chart {
    let series = |pick: fn(&MonthlyRow) -> Quantity| -> Vec<f64> {
        table.rows.iter().map(|row| pick(row).to_f64()).collect()
    };
    Chart {
        labels: table.rows.iter().map(|row| row.label.clone()).collect(),
        series: ChartSeries {
            honey: series(|row| row.honey),
            propolis: series(|row| row.propolis),
            wax: series(|row| row.wax),
            pollen: series(|row| row.pollen),
        },
    }
}

async fn rank(
    state: &AppState,
    filters: &DashboardFilters,
    harvest_filter: &HarvestFilter,
) -> Result<Rank, DatabaseError> {
    let query_string = filters.query_string(&[], &[]);
    let items = state
        .service
        .hive_ranking(harvest_filter, filters.rank_metric, filters.rank_limit)
        .await?
        .into_iter()
        .map(|ranking| {
            let mut detail_url = state.routes.hive_detail(&ranking.hive_id);
            if !query_string.is_empty() {
                detail_url = format!("{detail_url}?{query_string}");
            }
            RankItem {
                name: format!("{} · {}", ranking.identification_number, ranking.popular_name),
                species: ranking.species_name,
                apiary: ranking.apiary_name.unwrap_or_else(|| NO_APIARY.to_string()),
                honey: ranking.totals.honey,
                propolis: ranking.totals.propolis,
                wax: ranking.totals.wax,
                pollen: ranking.totals.pollen,
                harvests: ranking.totals.harvests,
                last_harvest: local_display(state, ranking.totals.last_harvest.as_ref())
                    .unwrap_or_else(|| NO_HARVESTS.to_string()),
                detail_url,
                hive_id: ranking.hive_id,
            }
        })
        .collect();

    Ok(Rank {
        items,
        metric: filters.rank_metric,
        metric_label: filters.rank_metric.label(),
        limit: filters.rank_limit,
    })
}

fn group_rows(groups: Vec<GroupTotal>, unnamed: &str) -> Vec<GroupRow> {
    groups
        .into_iter()
        .map(|group| GroupRow {
            name: group.name.unwrap_or_else(|| unnamed.to_string()),
            total: group.total,
        })
        .collect()
}

async fn available_filters(
    state: &AppState,
    owner: Option<&str>,
) -> Result<AvailableFilters, DatabaseError> {
    let service = &state.service;
    let apiaries = service
        .list_apiaries(owner)
        .await?
        .into_iter()
        .map(|apiary| NamedId {
            id: apiary.id,
            name: apiary.name,
        })
        .collect();
    let species = service
        .list_species_in_hives(owner)
        .await?
        .into_iter()
        .map(|species| NamedId {
            id: species.id,
            name: species.popular_name,
        })
        .collect();
    let statuses = HiveStatus::ALL
        .iter()
        .map(|status| Choice {
            value: status.as_str(),
            label: status.label(),
        })
        .collect();
    let offset_minutes = state.offset.local_minus_utc() / 60;
    let mut years = service.harvest_years(owner, offset_minutes).await?;
    if years.is_empty() {
        years.push(state.today().year());
    }
    Ok(AvailableFilters {
        apiaries,
        species,
        statuses,
        years,
    })
}

fn monthly_csv(table: &MonthlyTable, reference_year: i32) -> Response {
    let mut csv = CsvWriter::new();
    csv.write_record(&CSV_HEADER);
    for row in &table.rows {
        csv.write_record(&[
            row.label.clone(),
            row.honey.to_string(),
            row.propolis.to_string(),
            row.wax.to_string(),
            row.pollen.to_string(),
            row.harvests.to_string(),
        ]);
    }
    let totals = &table.totals;
    csv.write_record(&[
        "Total".to_string(),
        totals.honey.to_string(),
        totals.propolis.to_string(),
        totals.wax.to_string(),
        totals.pollen.to_string(),
        totals.harvests.to_string(),
    ]);

    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=producao-{reference_year}.csv"),
            ),
        ],
        csv.finish(),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
pub struct HiveDetailPage {
    hive: Hive,
    hive_name: String,
    period_label: String,
    aggregates: Aggregates,
    monthly: Vec<MonthOverview>,
    revisions: Vec<HarvestRevision>,
    back_url: String,
    filter_errors: Vec<String>,
    create_revision_url: String,
    create_harvest_url: String,
}

#[derive(Debug, Serialize)]
struct Aggregates {
    honey: Quantity,
    propolis: Quantity,
    wax: Quantity,
    pollen: Quantity,
    harvests: u32,
}

#[derive(Debug, Serialize)]
struct MonthOverview {
    label: String,
    honey: Quantity,
    propolis: Quantity,
    wax: Quantity,
    pollen: Quantity,
}

#[derive(Debug, Serialize)]
struct HarvestRevision {
    #[serde(flatten)]
    revision: Revision,
    review_date_display: String,
    change_url: String,
}

/// `GET /admin/producao/colmeia/{id}/`
pub async fn hive_detail(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(hive_id): Path<String>,
    RawQuery(raw): RawQuery,
) -> Result<Json<HiveDetailPage>, WebError> {
    let hive = match state.service.get_hive(&hive_id, None).await {
        Ok(hive) => hive,
        Err(DatabaseError::NoResult) => {
            return Err(WebError::NotFound("Colmeia não encontrada".to_string()));
        }
        Err(error) => return Err(error.into()),
    };
    if !actor.can_see_owner(&hive.owner_id) {
        return Err(WebError::NotFound(
            "Colmeia não disponível para este usuário".to_string(),
        ));
    }

    let params = QueryParams::parse(raw.as_deref());
    let filters = DashboardFilters::from_query(&params, state.today(), state.offset);
    let harvest_filter = filters.harvest_filter(actor.owner_scope(), Some(&hive.id));

    let entries = state.service.harvest_entries(&harvest_filter).await?;
    let mut totals = HarvestTotals::default();
    for entry in &entries {
        totals.add_entry(entry);
    }
    let monthly = bucket_by_month(&entries, &state)
        .into_iter()
        .map(|((year, month), sums)| MonthOverview {
            label: format!("{}/{year}", month_label(month)),
            honey: sums.honey,
            propolis: sums.propolis,
            wax: sums.wax,
            pollen: sums.pollen,
        })
        .collect();

    let revisions = state
        .service
        .harvest_revisions(&harvest_filter, state.config.dashboard.detail_revision_limit)
        .await?
        .into_iter()
        .map(|revision| HarvestRevision {
            review_date_display: local_datetime(&revision.review_date, state.offset),
            change_url: state.routes.change("apiary", "revision", &revision.id),
            revision,
        })
        .collect();

    let back_query = filters.query_string(&["top", "rank_metric"], &[]);
    let back_url = if back_query.is_empty() {
        PRODUCTION_DASHBOARD.to_string()
    } else {
        format!("{PRODUCTION_DASHBOARD}?{back_query}")
    };
    let create_revision_url = add_revision_url(&state, &hive.id);
    let create_harvest_url = format!(
        "{create_revision_url}&review_type={}",
        ReviewType::Harvest.as_str()
    );

    Ok(Json(HiveDetailPage {
        hive_name: hive.display_name(),
        hive,
        period_label: filters.period_display(),
        aggregates: Aggregates {
            honey: totals.honey,
            propolis: totals.propolis,
            wax: totals.wax,
            pollen: totals.pollen,
            harvests: totals.harvests,
        },
        monthly,
        revisions,
        back_url,
        filter_errors: filters.errors,
        create_revision_url,
        create_harvest_url,
    }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(1, "Verão")]
    #[case(2, "Verão")]
    #[case(3, "Outono")]
    #[case(5, "Outono")]
    #[case(6, "Inverno")]
    #[case(8, "Inverno")]
    #[case(9, "Primavera")]
    #[case(11, "Primavera")]
    #[case(12, "Verão")]
    fn season_follows_the_month(#[case] month: u32, #[case] title: &str) {
        assert_eq!(season_for_month(month).title, title);
    }

    #[test]
    fn csv_lists_months_then_total() {
        let table = MonthlyTable {
            rows: vec![MonthlyRow {
                month: 3,
                label: "Mar".to_string(),
                honey: Quantity::from_units(1200),
                propolis: Quantity::ZERO,
                wax: Quantity::ZERO,
                pollen: Quantity::from_hundredths(50),
                harvests: 1,
            }],
            totals: MonthlyTotals {
                honey: Quantity::from_units(1200),
                pollen: Quantity::from_hundredths(50),
                harvests: 1,
                ..MonthlyTotals::default()
            },
        };
        let response = monthly_csv(&table, 2025);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=producao-2025.csv"
        );
    }
}
