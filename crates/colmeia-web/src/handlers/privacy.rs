//! Public privacy policy and its entry point to personal data removal.

use axum::Json;
use axum::response::Redirect;
use serde::Serialize;

use crate::identity::CurrentUser;
use crate::routes::{ADMIN_LOGIN, DELETE_PERSONAL_DATA, PRIVACY_DELETE_ENTRY};

#[derive(Debug, Serialize)]
pub struct PolicySection {
    title: &'static str,
    body: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PrivacyPolicyPage {
    title: &'static str,
    sections: &'static [PolicySection],
    delete_data_entry_url: &'static str,
    admin_login_url: &'static str,
}

const SECTIONS: &[PolicySection] = &[
    PolicySection {
        title: "Dados coletados",
        body: "Guardamos o nome de usuário da equipe e os registros de meliponicultura \
               que você cadastra: meliponários, colmeias, revisões, anexos, fotos e o \
               perfil de criador.",
    },
    PolicySection {
        title: "Uso dos dados",
        body: "Os registros servem apenas para o acompanhamento das colmeias e para os \
               painéis de produção. Cada usuário vê somente os próprios registros.",
    },
    PolicySection {
        title: "Exclusão",
        body: "Você pode excluir todos os seus dados a qualquer momento. A exclusão remove \
               os registros e os arquivos enviados e não pode ser desfeita.",
    },
];

/// `GET /politica-de-privacidade/`
pub async fn policy() -> Json<PrivacyPolicyPage> {
    Json(PrivacyPolicyPage {
        title: "Política de privacidade",
        sections: SECTIONS,
        delete_data_entry_url: PRIVACY_DELETE_ENTRY,
        admin_login_url: ADMIN_LOGIN,
    })
}

/// `GET /politica-de-privacidade/excluir-dados/`: straight to the removal
/// page when signed in, otherwise to the login page with a `next` back to it.
pub async fn delete_data_entry(user: Option<CurrentUser>) -> Redirect {
    if user.is_some() {
        return Redirect::to(DELETE_PERSONAL_DATA);
    }
    Redirect::to(&format!(
        "{ADMIN_LOGIN}?next={}",
        urlencoding::encode(DELETE_PERSONAL_DATA)
    ))
}
