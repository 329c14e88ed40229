use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Sqlite file location; relative paths resolve against the
    /// executable directory.
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Built-in settings used whenever no config.toml is deployed.
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/kpi.db"

[server]
port = 3000
"#;

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Read config.toml placed next to the executable; without one, the
/// embedded defaults apply.
pub fn load_config() -> anyhow::Result<Config> {
    if let Some(dir) = exe_dir() {
        let config_path = dir.join("config.toml");
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            return Ok(toml::from_str(&contents)?);
        }
    }
    tracing::info!("No config.toml next to the executable, using embedded defaults");
    Ok(toml::from_str(DEFAULT_CONFIG)?)
}

/// Database file location from the configuration, anchored to the
/// executable directory when relative.
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path = Path::new(&config.database.path);
    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }
    match exe_dir() {
        Some(dir) => Ok(dir.join(db_path)),
        None => Ok(db_path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/kpi.db");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn absolute_database_path_is_kept_as_is() {
        let config = Config {
            database: DatabaseConfig {
                path: "/var/lib/kpi/kpi.db".into(),
            },
            server: ServerConfig { port: 3000 },
        };
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/var/lib/kpi/kpi.db")
        );
    }
}
