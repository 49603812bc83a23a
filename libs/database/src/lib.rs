//! Database connectivity for the catalog services.
//!
//! # Features
//!
//! - `postgres` (default) - PostgreSQL pool via SeaORM, migrations, health checks,
//!   `BaseRepository` CRUD over UUID-keyed entities
//! - `config` - `PostgresConfig: core_config::FromEnv`
//!
//! ```ignore
//! use database::postgres;
//! use migration::Migrator;
//!
//! let db = postgres::connect_from_config_with_retry(config, None).await?;
//! postgres::run_migrations::<Migrator>(&db, "goods_api").await?;
//! ```

pub mod common;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "postgres")]
pub mod repository;

pub use common::{DatabaseError, DatabaseResult};

#[cfg(feature = "postgres")]
pub use repository::{BaseRepository, UuidEntity};
