//! Configuration for Goods API

use core_config::{app_info, env_flag, server::ServerConfig, storage::StorageConfig, AppInfo, FromEnv};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub database: PostgresConfig,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub environment: Environment,
    /// Apply pending migrations before serving (`RUN_MIGRATIONS`, default true)
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let database = PostgresConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let storage = StorageConfig::from_env()?;
        let run_migrations = env_flag("RUN_MIGRATIONS", true)?;

        Ok(Self {
            app: app_info!(),
            database,
            server,
            storage,
            environment,
            run_migrations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env_defaults() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/goods")),
                ("RUN_MIGRATIONS", None),
                ("UPLOAD_DIR", None),
                ("PUBLIC_STORAGE_URL", None),
                ("PORT", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "goods_api");
                assert!(config.run_migrations);
                assert_eq!(config.storage.public_url, "/storage");
                assert_eq!(config.server.port, 8080);
            },
        );
    }

    #[test]
    fn test_config_can_skip_migrations() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgresql://localhost/goods")),
                ("RUN_MIGRATIONS", Some("false")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(!config.run_migrations);
            },
        );
    }

    #[test]
    fn test_config_requires_database_url() {
        temp_env::with_var_unset("DATABASE_URL", || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        });
    }
}
