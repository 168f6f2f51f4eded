//! JSON CRUD endpoints for the registered models.
//!
//! Every request resolves `{app}/{model}` through the registry and checks
//! the matching model permission. Owner-scoped models only ever see the
//! actor's records (everything for superusers); foreign ids answer 404.

use std::collections::HashMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, Path, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use colmeia_core::identity::Actor;
use colmeia_core::validation::ValidationErrors;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::WebError;
use crate::filters::QueryParams;
use crate::identity::CurrentUser;
use crate::media::{ATTACHMENT_DIR, HIVE_PHOTO_DIR};
use crate::registry::ModelInfo;
use crate::state::AppState;

const REQUIRED: &str = "Este campo é obrigatório.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdminModel {
    Species,
    Apiary,
    Hive,
    Revision,
    RevisionAttachment,
    BoxModel,
    City,
    CreatorProfile,
    MenuConfig,
    MenuItem,
}

impl AdminModel {
    fn from_model_name(model_name: &str) -> Option<Self> {
        Some(match model_name {
            "species" => Self::Species,
            "apiary" => Self::Apiary,
            "hive" => Self::Hive,
            "revision" => Self::Revision,
            "revisionattachment" => Self::RevisionAttachment,
            "boxmodel" => Self::BoxModel,
            "city" => Self::City,
            "creatorprofile" => Self::CreatorProfile,
            "menuconfig" => Self::MenuConfig,
            "menuitem" => Self::MenuItem,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    View,
    Add,
    Change,
    Delete,
}

/// Look the model up and check that `actor` may perform `action` on it.
fn authorize<'a>(
    state: &'a AppState,
    actor: &Actor,
    app_label: &str,
    model_name: &str,
    action: Action,
) -> Result<(AdminModel, &'a ModelInfo), WebError> {
    let info = state
        .registry
        .get(app_label, model_name)
        .ok_or_else(WebError::not_found)?;
    let model = AdminModel::from_model_name(info.model_name).ok_or_else(WebError::not_found)?;
    let perms = state.registry.model_perms(actor, info);
    let allowed = match action {
        Action::View => perms.view || perms.change,
        Action::Add => perms.add,
        Action::Change => perms.change,
        Action::Delete => perms.delete,
    };
    if !allowed {
        tracing::debug!(
            user_id = %actor.user_id,
            codename = %info.codename(match action {
                Action::View => "view",
                Action::Add => "add",
                Action::Change => "change",
                Action::Delete => "delete",
            }),
            "admin action denied"
        );
        return Err(WebError::forbidden());
    }
    Ok((model, info))
}

fn parse<T: DeserializeOwned>(body: Value) -> Result<T, WebError> {
    serde_json::from_value(body).map_err(|error| WebError::BadRequest(format!("JSON inválido: {error}")))
}

#[derive(Debug, Serialize)]
struct Changelist<T> {
    title: String,
    count: usize,
    results: Vec<T>,
}

fn changelist_response<T: Serialize>(info: &ModelInfo, results: Vec<T>) -> Response {
    Json(Changelist {
        title: info.verbose_name_plural.to_string(),
        count: results.len(),
        results,
    })
    .into_response()
}

fn created<T: Serialize>(value: T) -> Response {
    (StatusCode::CREATED, Json(value)).into_response()
}

fn ok<T: Serialize>(value: T) -> Response {
    Json(value).into_response()
}

/// `GET /admin/{app}/{model}/`
pub async fn changelist(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path((app_label, model_name)): Path<(String, String)>,
    RawQuery(raw): RawQuery,
) -> Result<Response, WebError> {
    let (model, info) = authorize(&state, &actor, &app_label, &model_name, Action::View)?;
    let params = QueryParams::parse(raw.as_deref());
    let owner = actor.owner_scope();
    let service = &state.service;

    let response = match model {
        AdminModel::Species => changelist_response(info, service.list_species().await?),
        AdminModel::Apiary => changelist_response(info, service.list_apiaries(owner).await?),
        AdminModel::Hive => changelist_response(info, service.list_hives(owner).await?),
        AdminModel::Revision => changelist_response(
            info,
            service.list_revisions(owner, params.get("hive")).await?,
        ),
        AdminModel::RevisionAttachment => changelist_response(
            info,
            service.list_attachments(owner, params.get("revision")).await?,
        ),
        AdminModel::BoxModel => changelist_response(info, service.list_box_models().await?),
        AdminModel::City => changelist_response(info, service.list_cities().await?),
        AdminModel::CreatorProfile => {
            changelist_response(info, service.list_creator_profiles(owner).await?)
        }
        AdminModel::MenuConfig => changelist_response(info, service.list_menu_configs().await?),
        AdminModel::MenuItem => match params.get("config") {
            Some(config_id) => changelist_response(info, service.list_menu_items(config_id).await?),
            None => changelist_response(info, service.list_all_menu_items().await?),
        },
    };
    Ok(response)
}

/// `POST /admin/{app}/{model}/add/` with a JSON draft.
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path((app_label, model_name)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, WebError> {
    let (model, _) = authorize(&state, &actor, &app_label, &model_name, Action::Add)?;
    let service = &state.service;
    let user_id = actor.user_id.as_str();

    let response = match model {
        AdminModel::Species => created(service.create_species(parse(body)?).await?),
        AdminModel::Apiary => created(service.create_apiary(user_id, parse(body)?).await?),
        AdminModel::Hive => created(service.create_hive(user_id, parse(body)?).await?),
        AdminModel::Revision => created(
            service
                .create_revision_for(actor.owner_scope(), parse(body)?)
                .await?,
        ),
        AdminModel::RevisionAttachment => {
            return Err(WebError::BadRequest(
                "Envie o anexo como multipart/form-data.".to_string(),
            ));
        }
        AdminModel::BoxModel => created(service.create_box_model(parse(body)?).await?),
        AdminModel::City => created(service.create_city(parse(body)?).await?),
        AdminModel::CreatorProfile => {
            created(service.create_creator_profile(user_id, parse(body)?).await?)
        }
        AdminModel::MenuConfig => created(service.create_menu_config(parse(body)?).await?),
        AdminModel::MenuItem => created(service.create_menu_item(parse(body)?).await?),
    };
    tracing::info!(user_id, model = %model_name, "record created");
    Ok(response)
}

/// `GET /admin/{app}/{model}/{id}/change/`
pub async fn detail(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path((app_label, model_name, id)): Path<(String, String, String)>,
) -> Result<Response, WebError> {
    let (model, _) = authorize(&state, &actor, &app_label, &model_name, Action::View)?;
    let owner = actor.owner_scope();
    let service = &state.service;

    let response = match model {
        AdminModel::Species => ok(service.get_species(&id).await?),
        AdminModel::Apiary => ok(service.get_apiary(&id, owner).await?),
        AdminModel::Hive => ok(service.get_hive(&id, owner).await?),
        AdminModel::Revision => ok(service.get_revision(&id, owner).await?),
        AdminModel::RevisionAttachment => ok(service.get_attachment(&id, owner).await?),
        AdminModel::BoxModel => ok(service.get_box_model(&id).await?),
        AdminModel::City => ok(service.get_city(&id).await?),
        AdminModel::CreatorProfile => ok(service.get_creator_profile(&id, owner).await?),
        AdminModel::MenuConfig => ok(service.get_menu_config(&id).await?),
        AdminModel::MenuItem => ok(service.get_menu_item(&id).await?),
    };
    Ok(response)
}

/// `POST /admin/{app}/{model}/{id}/change/` with a partial JSON update.
pub async fn change(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path((app_label, model_name, id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Result<Response, WebError> {
    let (model, _) = authorize(&state, &actor, &app_label, &model_name, Action::Change)?;
    let owner = actor.owner_scope();
    let service = &state.service;

    let response = match model {
        AdminModel::Species => ok(service.update_species(&id, parse(body)?).await?),
        AdminModel::Apiary => ok(service.update_apiary(&id, owner, parse(body)?).await?),
        AdminModel::Hive => ok(service.update_hive(&id, owner, parse(body)?).await?),
        AdminModel::Revision => ok(service.update_revision(&id, owner, parse(body)?).await?),
        AdminModel::RevisionAttachment => {
            return Err(WebError::BadRequest(
                "Anexos não podem ser alterados. Envie um novo arquivo.".to_string(),
            ));
        }
        AdminModel::BoxModel => ok(service.update_box_model(&id, parse(body)?).await?),
        AdminModel::City => ok(service.update_city(&id, parse(body)?).await?),
        AdminModel::CreatorProfile => {
            ok(service.update_creator_profile(&id, owner, parse(body)?).await?)
        }
        AdminModel::MenuConfig => ok(service.update_menu_config(&id, parse(body)?).await?),
        AdminModel::MenuItem => ok(service.update_menu_item(&id, parse(body)?).await?),
    };
    tracing::info!(user_id = %actor.user_id, model = %model_name, id = %id, "record changed");
    Ok(response)
}

/// `POST /admin/{app}/{model}/{id}/delete/`
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path((app_label, model_name, id)): Path<(String, String, String)>,
) -> Result<Json<Value>, WebError> {
    let (model, _) = authorize(&state, &actor, &app_label, &model_name, Action::Delete)?;
    let owner = actor.owner_scope();
    let service = &state.service;

    match model {
        AdminModel::Species => service.delete_species(&id).await?,
        AdminModel::Apiary => service.delete_apiary(&id, owner).await?,
        AdminModel::Hive => {
            service.delete_hive(&id, owner).await?;
        }
        AdminModel::Revision => {
            let files = service.delete_revision(&id, owner).await?;
            state.media.remove_all(&files).await;
        }
        AdminModel::RevisionAttachment => {
            let file = service.delete_attachment(&id, owner).await?;
            state.media.remove_all(&[file]).await;
        }
        AdminModel::BoxModel => service.delete_box_model(&id).await?,
        AdminModel::City => service.delete_city(&id).await?,
        AdminModel::CreatorProfile => service.delete_creator_profile(&id, owner).await?,
        AdminModel::MenuConfig => service.delete_menu_config(&id).await?,
        AdminModel::MenuItem => service.delete_menu_item(&id).await?,
    }
    tracing::info!(user_id = %actor.user_id, model = %model_name, id = %id, "record deleted");
    Ok(Json(json!({"deleted": id})))
}

/// `POST /admin/core/menuconfig/{id}/activate/`: activate one config and
/// deactivate the others of its scope.
pub async fn activate_menu_config(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
) -> Result<Response, WebError> {
    authorize(&state, &actor, "core", "menuconfig", Action::Change)?;
    let config = state.service.activate_menu_config(&id).await?;
    tracing::info!(id = %config.id, scope = %config.scope, "menu config activated");
    Ok(ok(config))
}

/// Text parts and the `file` part of a multipart upload.
#[derive(Default)]
struct UploadForm {
    fields: HashMap<String, String>,
    file: Option<(String, Bytes)>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart, default_name: &str) -> Result<Self, WebError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|error| WebError::BadRequest(error.body_text()))?
        {
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };
            if name == "file" {
                let file_name = field.file_name().unwrap_or(default_name).to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|error| WebError::BadRequest(error.body_text()))?;
                form.file = Some((file_name, bytes));
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|error| WebError::BadRequest(error.body_text()))?;
                form.fields.insert(name, text.trim().to_string());
            }
        }
        Ok(form)
    }

    fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).filter(|value| !value.is_empty()).cloned()
    }
}

/// `POST /admin/apiary/revisionattachment/add/` as multipart with a
/// `revision` id and a `file` part.
pub async fn upload_attachment(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    multipart: Multipart,
) -> Result<Response, WebError> {
    authorize(&state, &actor, "apiary", "revisionattachment", Action::Add)?;
    let owner = actor.owner_scope();

    let form = UploadForm::read(multipart, "anexo").await?;
    let mut errors = ValidationErrors::new();
    let revision_id = form.text("revision");
    if revision_id.is_none() {
        errors.add("revision", REQUIRED);
    }
    if form.file.is_none() {
        errors.add("file", REQUIRED);
    }
    let (Some(revision_id), Some((file_name, bytes))) = (revision_id, form.file) else {
        return Err(WebError::Validation(errors));
    };

    state.service.get_revision(&revision_id, owner).await?;
    let stored = state
        .media
        .save(ATTACHMENT_DIR, &file_name, &bytes)
        .await
        .map_err(|error| WebError::Database(error.into()))?;
    match state
        .service
        .create_attachment(&revision_id, owner, &stored)
        .await
    {
        Ok(attachment) => {
            tracing::info!(id = %attachment.id, file = %attachment.file, "attachment stored");
            Ok(created(attachment))
        }
        Err(error) => {
            state.media.remove_all(&[stored]).await;
            Err(error.into())
        }
    }
}

/// `POST /admin/apiary/hive/{id}/photo/` as multipart with a `file` part.
///
/// The photo path is always one the media store made. A previous photo is
/// removed once the hive points at the new one.
pub async fn upload_hive_photo(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response, WebError> {
    authorize(&state, &actor, "apiary", "hive", Action::Change)?;
    let owner = actor.owner_scope();
    state.service.get_hive(&id, owner).await?;

    let form = UploadForm::read(multipart, "foto").await?;
    let Some((file_name, bytes)) = form.file else {
        return Err(WebError::Validation(ValidationErrors::single("file", REQUIRED)));
    };

    let stored = state
        .media
        .save(HIVE_PHOTO_DIR, &file_name, &bytes)
        .await
        .map_err(|error| WebError::Database(error.into()))?;
    match state.service.set_hive_photo(&id, owner, Some(&stored)).await {
        Ok((hive, previous)) => {
            if let Some(previous) = previous {
                state.media.remove_all(&[previous]).await;
            }
            tracing::info!(hive_id = %hive.id, photo = %stored, "hive photo stored");
            Ok(ok(hive))
        }
        Err(error) => {
            state.media.remove_all(&[stored]).await;
            Err(error.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_model_has_a_handler() {
        let registry = crate::registry::AdminRegistry::default();
        for info in registry.models() {
            assert!(
                AdminModel::from_model_name(info.model_name).is_some(),
                "{} has no admin handler",
                info.model_name
            );
        }
    }
}
