//! Input types for entity mutations.
//!
//! Each entity has a `*Draft` carrying the editable fields of a new record
//! and a `*Update` with `Option` fields where only `Some` values change the
//! stored record. Nullable columns use `Option<Option<T>>` so that an
//! explicit `null` clears the value while an absent key leaves it alone.
//! Builders exist for the updates the CLI and tests compose in code.

pub mod apiary;
pub mod catalog;
pub mod creator;
pub mod hive;
pub mod menu;
pub mod revision;
pub mod species;

use serde::{Deserialize, Deserializer};

/// Deserialize a present key (even `null`) as `Some(..)`.
///
/// Paired with `#[serde(default)]` so an absent key stays `None`.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Replace `target` when the update carries a value.
pub(crate) fn assign<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
