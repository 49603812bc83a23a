/// Errors surfaced by the readiness check and connection helpers.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_failure_message() {
        let err = DatabaseError::HealthCheckFailed("PostgreSQL: connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Health check failed: PostgreSQL: connection refused"
        );
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_db_err_converts() {
        let err: DatabaseError = sea_orm::DbErr::Custom("pool closed".to_string()).into();
        assert!(matches!(err, DatabaseError::Postgres(_)));
        assert!(err.to_string().contains("pool closed"));
    }
}
