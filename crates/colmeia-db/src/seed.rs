//! Outcome types for the idempotent catalog upserts.

use serde::Serialize;

/// What an upsert did to a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Upsert {
    Created,
    Updated,
}

/// Running tally for a seed command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
}

impl SeedReport {
    pub const fn record(&mut self, outcome: Upsert) {
        match outcome {
            Upsert::Created => self.created += 1,
            Upsert::Updated => self.updated += 1,
        }
    }

    pub const fn skip(&mut self) {
        self.skipped += 1;
    }
}
