//! Entity structs for all Colmeia records.
//!
//! Each entity maps to a table in the libSQL database (see
//! `colmeia-db/migrations`). Field rules live next to the struct they check.

mod apiary;
mod attachment;
mod catalog;
mod creator;
mod hive;
mod menu;
mod revision;
mod species;
mod user;

pub use apiary::Apiary;
pub use attachment::RevisionAttachment;
pub use catalog::{BoxModel, City, Season};
pub use creator::CreatorProfile;
pub use hive::{Hive, HiveRelations};
pub use menu::{MenuConfig, MenuItem};
pub use revision::Revision;
pub use species::Species;
pub use user::User;
