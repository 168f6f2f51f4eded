//! Repository modules implementing storage operations for all Colmeia entities.
//!
//! Each module adds methods to `ColmeiaService` via `impl ColmeiaService` blocks.
//! Methods on owner-scoped records take `owner: Option<&str>`: `Some` limits
//! the query to that user's records, `None` (superusers) sees everything.

pub mod account;
pub mod apiary;
pub mod attachment;
pub mod catalog;
pub mod creator;
pub mod hive;
pub mod home;
pub mod menu;
pub mod production;
pub mod revision;
pub mod species;
pub mod user;

/// Message for a missing required field.
pub(crate) const REQUIRED: &str = "Este campo é obrigatório.";

/// Message for a unique column clash, e.g. "Cidade com este Nome já existe.".
pub(crate) fn already_exists(verbose_name: &str, field_label: &str) -> String {
    format!("{verbose_name} com este {field_label} já existe.")
}
