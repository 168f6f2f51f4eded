//! Login placeholder and personal data removal.

use axum::Json;
use axum::extract::{RawQuery, State};
use axum::response::Redirect;
use colmeia_db::repos::account::PersonalDataSummary;
use serde::Serialize;

use crate::error::WebError;
use crate::filters::QueryParams;
use crate::identity::CurrentUser;
use crate::routes::{ADMIN_LOGIN, DELETE_PERSONAL_DATA};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoginPage {
    title: &'static str,
    message: &'static str,
    deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletePersonalDataPage {
    title: &'static str,
    summary: PersonalDataSummary,
    confirm_url: &'static str,
}

/// `GET /admin/login/`. Sign-in happens upstream; this only confirms a
/// finished removal with `?deleted=1`.
pub async fn login(RawQuery(raw): RawQuery) -> Json<LoginPage> {
    let params = QueryParams::parse(raw.as_deref());
    let deleted = params.get("deleted") == Some("1");
    Json(LoginPage {
        title: "Entrar",
        message: if deleted {
            "Seus dados foram excluídos."
        } else {
            "A autenticação é feita pelo provedor de identidade."
        },
        deleted,
    })
}

/// `GET /admin/excluir-meus-dados/`
pub async fn delete_summary(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Json<DeletePersonalDataPage>, WebError> {
    let summary = state.service.personal_data_summary(&actor.user_id).await?;
    Ok(Json(DeletePersonalDataPage {
        title: "Excluir meus dados",
        summary,
        confirm_url: DELETE_PERSONAL_DATA,
    }))
}

/// `POST /admin/excluir-meus-dados/`
///
/// Rows go in one transaction; stored files are removed once it commits.
pub async fn delete_personal_data(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Redirect, WebError> {
    let files = state.service.delete_personal_data(&actor.user_id).await?;
    state.media.remove_all(&files).await;
    tracing::info!(user_id = %actor.user_id, files = files.len(), "personal data deleted");
    Ok(Redirect::to(&format!("{ADMIN_LOGIN}?deleted=1")))
}
