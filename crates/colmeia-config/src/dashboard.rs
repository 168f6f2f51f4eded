//! Dashboard thresholds and list sizes.

use serde::{Deserialize, Serialize};

const fn default_home_overdue_days() -> i64 {
    7
}

const fn default_production_overdue_days() -> i64 {
    60
}

const fn default_recent_revisions() -> u32 {
    10
}

const fn default_overdue_hive_limit() -> u32 {
    50
}

const fn default_detail_revision_limit() -> u32 {
    200
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Days without a revision before a hive shows as overdue on the home page.
    #[serde(default = "default_home_overdue_days")]
    pub home_overdue_days: i64,

    /// Days without a revision before a hive counts as overdue for production.
    #[serde(default = "default_production_overdue_days")]
    pub production_overdue_days: i64,

    #[serde(default = "default_recent_revisions")]
    pub recent_revisions: u32,

    #[serde(default = "default_overdue_hive_limit")]
    pub overdue_hive_limit: u32,

    /// Revisions listed on the hive production detail.
    #[serde(default = "default_detail_revision_limit")]
    pub detail_revision_limit: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            home_overdue_days: default_home_overdue_days(),
            production_overdue_days: default_production_overdue_days(),
            recent_revisions: default_recent_revisions(),
            overdue_hive_limit: default_overdue_hive_limit(),
            detail_revision_limit: default_detail_revision_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = DashboardConfig::default();
        assert_eq!(config.home_overdue_days, 7);
        assert_eq!(config.production_overdue_days, 60);
        assert_eq!(config.recent_revisions, 10);
        assert_eq!(config.overdue_hive_limit, 50);
        assert_eq!(config.detail_revision_limit, 200);
    }
}
