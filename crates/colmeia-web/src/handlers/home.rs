//! Admin index, the bare menu and per-app indexes.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{Duration, Utc};
use colmeia_db::repos::home::{HiveOverview, RecentRevision};
use serde::Serialize;

use crate::error::WebError;
use crate::format::{date_display, local_datetime, local_iso};
use crate::identity::CurrentUser;
use crate::menu::get_app_list;
use crate::registry::AppMenu;
use crate::state::AppState;

const INDEX_TITLE: &str = "Administração do Site";
const NEVER_REVIEWED: &str = "Nunca revisada";

#[derive(Debug, Serialize)]
pub struct IndexPage {
    title: &'static str,
    app_list: Vec<AppMenu>,
    #[serde(flatten)]
    dashboard: Option<HomeDashboard>,
}

#[derive(Debug, Serialize)]
pub struct HomeDashboard {
    cards: HomeCards,
    recent_revisions: Vec<RecentRevisionEntry>,
    overdue_hives: Vec<OverdueHiveEntry>,
    observation_hives: Vec<ObservationHiveEntry>,
    upcoming_divisions: Vec<UpcomingDivisionEntry>,
    create_revision_url: String,
}

#[derive(Debug, Serialize)]
struct HomeCards {
    apiaries: CountCard,
    hives: CountCard,
    species: CountCard,
}

#[derive(Debug, Serialize)]
struct CountCard {
    count: u32,
    url: String,
}

#[derive(Debug, Serialize)]
struct HiveRef {
    id: String,
    name: String,
    url: String,
    species_popular_name: String,
    species_scientific_name: Option<String>,
    apiary_name: Option<String>,
    apiary_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct RecentRevisionEntry {
    id: String,
    change_url: String,
    hive: HiveRef,
    review_date_display: String,
    review_date_iso: String,
}

#[derive(Debug, Serialize)]
struct OverdueHiveEntry {
    hive: HiveRef,
    last_review_display: String,
    days_since_review: Option<i64>,
    add_revision_url: String,
}

#[derive(Debug, Serialize)]
struct ObservationHiveEntry {
    hive: HiveRef,
    status_label: &'static str,
    last_review_display: String,
}

#[derive(Debug, Serialize)]
struct UpcomingDivisionEntry {
    hive: HiveRef,
    date_display: String,
    date_iso: String,
    is_overdue: bool,
}

#[derive(Debug, Serialize)]
pub struct MenuPage {
    app_list: Vec<AppMenu>,
}

/// `GET /admin/`
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<IndexPage>, WebError> {
    let app_list = get_app_list(&state.service, &state.registry, &state.routes, &actor).await;
    let dashboard = if actor.is_superuser {
        None
    } else {
        Some(build_dashboard(&state, actor.owner_scope()).await?)
    };
    Ok(Json(IndexPage {
        title: INDEX_TITLE,
        app_list,
        dashboard,
    }))
}

/// `GET /admin/menu/`
pub async fn menu(State(state): State<AppState>, CurrentUser(actor): CurrentUser) -> Json<MenuPage> {
    let app_list = get_app_list(&state.service, &state.registry, &state.routes, &actor).await;
    Json(MenuPage { app_list })
}

/// `GET /admin/{app}/`: the stock entry for one app.
pub async fn app_index(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(app_label): Path<String>,
) -> Result<Json<AppMenu>, WebError> {
    state
        .registry
        .default_app_list(&actor, &state.routes)
        .into_iter()
        .find(|app| app.app_label == app_label)
        .map(Json)
        .ok_or_else(WebError::not_found)
}

async fn build_dashboard(state: &AppState, owner: Option<&str>) -> Result<HomeDashboard, WebError> {
    let settings = &state.config.dashboard;
    let service = &state.service;
    let routes = &state.routes;
    let now = Utc::now();
    let today = state.today();

    let cards = HomeCards {
        apiaries: CountCard {
            count: service.count_apiaries(owner).await?,
            url: routes.changelist("apiary", "apiary"),
        },
        hives: CountCard {
            count: service.count_hives(owner).await?,
            url: routes.changelist("apiary", "hive"),
        },
        species: CountCard {
            count: service.count_distinct_species(owner).await?,
            url: routes.changelist("apiary", "species"),
        },
    };

    let recent_revisions = service
        .recent_revisions(owner, settings.recent_revisions)
        .await?
        .into_iter()
        .map(|recent| recent_entry(state, recent))
        .collect();

    let cutoff = now - Duration::days(settings.home_overdue_days);
    let overdue_hives = service
        .overdue_hives(owner, cutoff, settings.overdue_hive_limit)
        .await?
        .into_iter()
        .map(|overview| {
            let (last_review_display, days_since_review) = match overview.hive.last_review_date {
                Some(last) => {
                    let days = (now - last).num_days();
                    (
                        format!(
                            "Última revisão: {} (há {days} dias)",
                            local_datetime(&last, state.offset)
                        ),
                        Some(days),
                    )
                }
                None => (NEVER_REVIEWED.to_string(), None),
            };
            let add_revision_url = add_revision_url(state, &overview.hive.id);
            OverdueHiveEntry {
                hive: hive_ref(state, overview),
                last_review_display,
                days_since_review,
                add_revision_url,
            }
        })
        .collect();

    let observation_hives = service
        .observation_hives(owner)
        .await?
        .into_iter()
        .map(|overview| {
            let last_review_display = overview.hive.last_review_date.map_or_else(
                || NEVER_REVIEWED.to_string(),
                |last| format!("Última revisão em {}", local_datetime(&last, state.offset)),
            );
            ObservationHiveEntry {
                status_label: overview.hive.status.label(),
                hive: hive_ref(state, overview),
                last_review_display,
            }
        })
        .collect();

    let upcoming_divisions = service
        .upcoming_divisions(owner)
        .await?
        .into_iter()
        .filter_map(|overview| {
            let date = overview.hive.next_division_date?;
            Some(UpcomingDivisionEntry {
                hive: hive_ref(state, overview),
                date_display: date_display(&date),
                date_iso: date.format("%Y-%m-%d").to_string(),
                is_overdue: date < today,
            })
        })
        .collect();

    Ok(HomeDashboard {
        cards,
        recent_revisions,
        overdue_hives,
        observation_hives,
        upcoming_divisions,
        create_revision_url: routes.add("apiary", "revision"),
    })
}

fn recent_entry(state: &AppState, recent: RecentRevision) -> RecentRevisionEntry {
    RecentRevisionEntry {
        change_url: state.routes.change("apiary", "revision", &recent.revision_id),
        id: recent.revision_id,
        review_date_display: local_datetime(&recent.review_date, state.offset),
        review_date_iso: local_iso(&recent.review_date, state.offset),
        hive: hive_ref(state, recent.hive),
    }
}

fn hive_ref(state: &AppState, overview: HiveOverview) -> HiveRef {
    let HiveOverview {
        hive,
        species_popular_name,
        species_scientific_name,
        apiary_name,
    } = overview;
    HiveRef {
        name: hive.display_name(),
        url: state.routes.change("apiary", "hive", &hive.id),
        species_popular_name,
        species_scientific_name: Some(species_scientific_name).filter(|name| !name.is_empty()),
        apiary_url: hive
            .apiary_id
            .as_deref()
            .map(|apiary_id| state.routes.change("apiary", "apiary", apiary_id)),
        apiary_name,
        id: hive.id,
    }
}

pub(crate) fn add_revision_url(state: &AppState, hive_id: &str) -> String {
    format!(
        "{}?hive={}",
        state.routes.add("apiary", "revision"),
        urlencoding::encode(hive_id)
    )
}
