//! Request handlers, one module per page family.

pub mod account;
pub mod admin;
pub mod health;
pub mod home;
pub mod privacy;
pub mod production;

use chrono::{DateTime, Utc};

use crate::format::local_datetime;
use crate::state::AppState;

/// `dd/mm/YYYY HH:MM` in the configured offset, or `None`.
fn local_display(state: &AppState, dt: Option<&DateTime<Utc>>) -> Option<String> {
    dt.map(|dt| local_datetime(dt, state.offset))
}
