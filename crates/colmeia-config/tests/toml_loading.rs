//! Integration tests for TOML and environment configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use colmeia_config::{ColmeiaConfig, ConfigError};

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/colmeia/dados.db"

[server]
bind = "0.0.0.0:9000"
media_dir = "/var/lib/colmeia/media"

[general]
utc_offset_hours = -4

[dashboard]
production_overdue_days = 45
"#,
        )?;

        let config: ColmeiaConfig = Figment::from(Serialized::defaults(ColmeiaConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/colmeia/dados.db");
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.server.media_dir, "/var/lib/colmeia/media");
        assert_eq!(config.general.utc_offset_hours, -4);
        assert_eq!(config.dashboard.production_overdue_days, 45);
        assert_eq!(config.dashboard.home_overdue_days, 7);
        Ok(())
    });
}

#[test]
fn env_overrides_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".colmeia")?;
        jail.create_file(
            ".colmeia/config.toml",
            r#"
[server]
bind = "127.0.0.1:7000"
"#,
        )?;
        jail.set_env("COLMEIA_SERVER__BIND", "127.0.0.1:7001");
        jail.set_env("COLMEIA_DATABASE__PATH", ":memory:");

        let config = ColmeiaConfig::load().expect("config loads");
        assert_eq!(config.server.bind, "127.0.0.1:7001");
        assert!(config.database.is_in_memory());
        Ok(())
    });
}

#[test]
fn project_file_applies_without_env() {
    Jail::expect_with(|jail| {
        jail.create_dir(".colmeia")?;
        jail.create_file(
            ".colmeia/config.toml",
            r#"
[dashboard]
recent_revisions = 5
"#,
        )?;

        let config = ColmeiaConfig::load().expect("config loads");
        assert_eq!(config.dashboard.recent_revisions, 5);
        Ok(())
    });
}

#[test]
fn invalid_offset_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("COLMEIA_GENERAL__UTC_OFFSET_HOURS", "20");

        let figment = Figment::from(Serialized::defaults(ColmeiaConfig::default()))
            .merge(Env::prefixed("COLMEIA_").split("__"));
        let err = ColmeiaConfig::from_figment(&figment).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}
