use std::path::Path;

use anyhow::{Context, bail};
use colmeia_core::catalog::{BOX_MODELS, SEASONS};
use colmeia_core::enums::SpeciesGroup;
use colmeia_db::error::DatabaseError;
use colmeia_db::seed::{SeedReport, Upsert};
use colmeia_db::service::ColmeiaService;
use colmeia_db::updates::species::SpeciesDraft;
use serde::Serialize;
use serde_json::Value;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::SeedCommands;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct SeedResponse {
    catalog: &'static str,
    #[serde(flatten)]
    report: SeedReport,
}

/// Handle `colmeia seed <catalog>`.
pub async fn handle(
    action: &SeedCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let service = &ctx.service;
    let (catalog, report) = match action {
        SeedCommands::BoxModels => ("box_models", seed_box_models(service).await?),
        SeedCommands::Cities(args) => ("cities", seed_cities(service, &args.file).await?),
        SeedCommands::Species(args) => (
            "species",
            seed_species(service, &args.file, args.group).await?,
        ),
        SeedCommands::Seasons => ("seasons", seed_seasons(service).await?),
    };

    tracing::info!(
        catalog,
        created = report.created,
        updated = report.updated,
        skipped = report.skipped,
        "seed finished"
    );
    output(&SeedResponse { catalog, report }, flags.format)
}

const fn action_label(outcome: Upsert) -> &'static str {
    match outcome {
        Upsert::Created => "criada",
        Upsert::Updated => "atualizada",
    }
}

async fn seed_box_models(service: &ColmeiaService) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();
    for (name, description) in BOX_MODELS {
        let outcome = service.upsert_box_model(name, description).await?;
        tracing::info!(name, action = action_label(outcome), "box model seeded");
        report.record(outcome);
    }
    Ok(report)
}

async fn seed_seasons(service: &ColmeiaService) -> anyhow::Result<SeedReport> {
    let mut report = SeedReport::default();
    for span in SEASONS {
        let outcome = service.upsert_season(span).await?;
        tracing::info!(name = span.name, action = action_label(outcome), "season seeded");
        report.record(outcome);
    }
    Ok(report)
}

/// Cities come as `[{"sigla": "SP", "cidades": ["Campinas"]}]` and are
/// stored as `"Campinas - SP"`.
async fn seed_cities(service: &ColmeiaService, path: &Path) -> anyhow::Result<SeedReport> {
    let states = read_json_list(path, "O arquivo precisa conter uma lista de estados.").await?;
    let mut report = SeedReport::default();

    for entry in &states {
        let state_code = entry
            .get("sigla")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_uppercase();
        if state_code.is_empty() {
            tracing::warn!("state entry skipped: 'sigla' is required");
            report.skip();
            continue;
        }

        let cities = match entry.get("cidades") {
            None | Some(Value::Null) => continue,
            Some(Value::Array(cities)) => cities,
            Some(_) => {
                tracing::warn!(state = %state_code, "state skipped: 'cidades' must be a list of names");
                report.skip();
                continue;
            }
        };

        for city in cities {
            let Some(city) = city.as_str() else {
                tracing::warn!(state = %state_code, "city skipped: not a string");
                report.skip();
                continue;
            };
            let name = format!("{} - {state_code}", city.trim());
            let outcome = service.upsert_city(&name).await?;
            tracing::info!(%name, action = action_label(outcome), "city seeded");
            report.record(outcome);
        }
    }

    Ok(report)
}

async fn seed_species(
    service: &ColmeiaService,
    path: &Path,
    group: SpeciesGroup,
) -> anyhow::Result<SeedReport> {
    let entries = read_json_list(path, "O arquivo JSON deve conter uma lista de espécies.").await?;
    let mut report = SeedReport::default();

    for (index, entry) in entries.iter().enumerate() {
        let Some(draft) = species_draft(index + 1, entry, group) else {
            report.skip();
            continue;
        };
        let scientific_name = draft.scientific_name.clone();
        match service.upsert_species(draft).await {
            Ok(outcome) => {
                tracing::info!(%scientific_name, action = action_label(outcome), "species seeded");
                report.record(outcome);
            }
            Err(DatabaseError::Validation(errors)) => {
                tracing::warn!(%scientific_name, %errors, "species skipped");
                report.skip();
            }
            Err(error) => return Err(error.into()),
        }
    }

    Ok(report)
}

/// Build a draft from one JSON entry, or log why it was skipped.
/// `index` is 1-based, matching how people count lines of a list.
fn species_draft(index: usize, entry: &Value, group: SpeciesGroup) -> Option<SpeciesDraft> {
    let text = |key: &str| {
        entry
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    };

    let scientific_name = text("nome_cientifica");
    if scientific_name.is_empty() {
        tracing::warn!(index, "species entry skipped: 'nome_cientifica' is required");
        return None;
    }

    let states = match normalize_states(entry.get("ufs")) {
        Ok(states) => states,
        Err(reason) => {
            tracing::warn!(%scientific_name, reason, "species entry skipped");
            return None;
        }
    };

    let popular_name = Some(text("nome_popular"))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| scientific_name.clone());
    let default_temperament = Some(text("temperamento_padrao")).filter(|t| !t.is_empty());

    Some(SpeciesDraft {
        group,
        characteristics: text("caracteristicas"),
        scientific_name,
        popular_name,
        states,
        default_temperament,
    })
}

fn normalize_states(states: Option<&Value>) -> Result<Vec<String>, &'static str> {
    match states {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|code| code.trim().to_uppercase())
                    .ok_or("each state code must be a string")
            })
            .collect(),
        Some(_) => Err("'ufs' must be a list of state codes"),
    }
}

async fn read_json_list(path: &Path, not_a_list: &str) -> anyhow::Result<Vec<Value>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        bail!("Arquivo não encontrado: {}", path.display());
    }

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let data: Value = serde_json::from_str(&raw)
        .map_err(|error| anyhow::anyhow!("Não foi possível ler o JSON: {error}"))?;

    match data {
        Value::Array(items) => Ok(items),
        _ => bail!("{not_a_list}"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    async fn service() -> ColmeiaService {
        ColmeiaService::new_local(":memory:")
            .await
            .expect("in-memory database should open")
    }

    fn write_json(dir: &TempDir, name: &str, value: &Value) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, value.to_string()).expect("fixture should be written");
        path
    }

    fn report(created: u32, updated: u32, skipped: u32) -> SeedReport {
        SeedReport {
            created,
            updated,
            skipped,
        }
    }

    #[tokio::test]
    async fn box_models_seed_twice_without_duplicates() {
        let svc = service().await;
        let total = u32::try_from(BOX_MODELS.len()).unwrap();

        assert_eq!(seed_box_models(&svc).await.unwrap(), report(total, 0, 0));
        assert_eq!(seed_box_models(&svc).await.unwrap(), report(0, total, 0));
        assert_eq!(svc.list_box_models().await.unwrap().len(), BOX_MODELS.len());
    }

    #[tokio::test]
    async fn seasons_seed_twice_without_duplicates() {
        let svc = service().await;
        assert_eq!(seed_seasons(&svc).await.unwrap(), report(4, 0, 0));
        assert_eq!(seed_seasons(&svc).await.unwrap(), report(0, 4, 0));
        assert_eq!(svc.list_seasons().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn cities_are_formatted_and_bad_entries_skipped() {
        let svc = service().await;
        let dir = TempDir::new().unwrap();
        let path = write_json(
            &dir,
            "cidades.json",
            &json!([
                {"sigla": "sp", "cidades": [" Campinas ", "Piracicaba", 42]},
                {"cidades": ["Sem Estado"]},
                {"sigla": "MG", "cidades": "Belo Horizonte"},
                {"sigla": "RJ"}
            ]),
        );

        assert_eq!(seed_cities(&svc, &path).await.unwrap(), report(2, 0, 3));
        assert_eq!(seed_cities(&svc, &path).await.unwrap(), report(0, 2, 3));

        let mut names: Vec<String> = svc
            .list_cities()
            .await
            .unwrap()
            .into_iter()
            .map(|city| city.name)
            .collect();
        names.sort();
        assert_eq!(names, ["Campinas - SP", "Piracicaba - SP"]);
    }

    #[tokio::test]
    async fn species_seed_upserts_by_scientific_name() {
        let svc = service().await;
        let dir = TempDir::new().unwrap();
        let path = write_json(
            &dir,
            "especies.json",
            &json!([
                {
                    "nome_cientifica": "Melipona quadrifasciata",
                    "nome_popular": "Mandaçaia",
                    "ufs": [" sp", "mg "],
                    "caracteristicas": "Mansa",
                    "temperamento_padrao": "  "
                },
                {"nome_cientifica": "Tetragonisca angustula"},
                {"nome_popular": "Sem nome científico"},
                {"nome_cientifica": "Scaptotrigona bipunctata", "ufs": "SP"},
                {"nome_cientifica": "Plebeia droryana", "ufs": ["SP", 7]}
            ]),
        );

        assert_eq!(
            seed_species(&svc, &path, SpeciesGroup::Stingless).await.unwrap(),
            report(2, 0, 3)
        );
        assert_eq!(
            seed_species(&svc, &path, SpeciesGroup::Stingless).await.unwrap(),
            report(0, 2, 3)
        );

        let species = svc.list_species().await.unwrap();
        assert_eq!(species.len(), 2);
        let mandacaia = species
            .iter()
            .find(|s| s.scientific_name == "Melipona quadrifasciata")
            .unwrap();
        assert_eq!(mandacaia.popular_name, "Mandaçaia");
        assert_eq!(mandacaia.states, ["SP", "MG"]);
        assert_eq!(mandacaia.default_temperament, None);
        assert_eq!(mandacaia.group, SpeciesGroup::Stingless);

        let jatai = species
            .iter()
            .find(|s| s.scientific_name == "Tetragonisca angustula")
            .unwrap();
        assert_eq!(jatai.popular_name, "Tetragonisca angustula");
        assert!(jatai.states.is_empty());
    }

    #[tokio::test]
    async fn species_with_unknown_state_is_skipped() {
        let svc = service().await;
        let dir = TempDir::new().unwrap();
        let path = write_json(
            &dir,
            "especies.json",
            &json!([{"nome_cientifica": "Melipona scutellaris", "ufs": ["XX"]}]),
        );

        assert_eq!(
            seed_species(&svc, &path, SpeciesGroup::Stingless).await.unwrap(),
            report(0, 0, 1)
        );
        assert!(svc.list_species().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let svc = service().await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nada.json");

        let error = seed_cities(&svc, &path).await.unwrap_err();
        assert_eq!(
            error.to_string(),
            format!("Arquivo não encontrado: {}", path.display())
        );
    }

    #[tokio::test]
    async fn invalid_json_is_reported() {
        let svc = service().await;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quebrado.json");
        std::fs::write(&path, "[{").unwrap();

        let error = seed_species(&svc, &path, SpeciesGroup::Stingless)
            .await
            .unwrap_err();
        assert!(
            error.to_string().starts_with("Não foi possível ler o JSON: "),
            "unexpected error: {error}"
        );
    }

    #[tokio::test]
    async fn top_level_object_is_rejected() {
        let svc = service().await;
        let dir = TempDir::new().unwrap();
        let path = write_json(&dir, "estados.json", &json!({"sigla": "SP"}));

        let error = seed_cities(&svc, &path).await.unwrap_err();
        assert_eq!(error.to_string(), "O arquivo precisa conter uma lista de estados.");
    }
}
