//! ID prefixes for every stored record.
//!
//! IDs are generated by the database as `<prefix>-<8 hex chars>`.

pub const PREFIX_USER: &str = "usr";
pub const PREFIX_SPECIES: &str = "spc";
pub const PREFIX_APIARY: &str = "api";
pub const PREFIX_BOX_MODEL: &str = "box";
pub const PREFIX_CITY: &str = "cty";
pub const PREFIX_SEASON: &str = "ssn";
pub const PREFIX_HIVE: &str = "hiv";
pub const PREFIX_REVISION: &str = "rev";
pub const PREFIX_ATTACHMENT: &str = "att";
pub const PREFIX_CREATOR: &str = "crt";
pub const PREFIX_MENU_CONFIG: &str = "mnc";
pub const PREFIX_MENU_ITEM: &str = "mni";

/// Prefix of the human-facing hive identification number (`COL-1A2B3C4D`).
pub const HIVE_IDENTIFIER_PREFIX: &str = "COL";

