//! Shared test infrastructure for the domain crates.
//!
//! - `TestDatabase`: throwaway PostgreSQL container with the workspace migrations applied
//!   (feature: "postgres", on by default)
//! - `TestDataBuilder`: deterministic ids and names derived from a test name
//! - `assertions`: small assertion helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn lists_goods() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("lists_goods");
//!
//!     let category_id = db.create_category(&builder.name("category", "main")).await;
//! }
//! ```

use uuid::Uuid;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Deterministic test data, seeded from the test name so failures reproduce.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_good");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// A category id nobody has inserted, for "missing category" cases.
    pub fn category_id(&self) -> Uuid {
        let bytes = self.seed.to_be_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..].copy_from_slice(&(!self.seed).to_be_bytes());
        Uuid::from_bytes(uuid_bytes)
    }

    /// `test-{prefix}-{seed}-{suffix}`, truncated to 50 chars so it fits a good's name.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.name("good", "main"), "test-good-7-main");
    /// ```
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        let mut name = format!("test-{}-{}-{}", prefix, self.seed, suffix);
        name.truncate(50);
        name
    }
}

pub mod assertions {
    use uuid::Uuid;

    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }

    /// Float comparison for averages coming back from SQL.
    pub fn assert_close(actual: f64, expected: f64, context: &str) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "{}: expected {}, got {}",
            context,
            expected,
            actual
        );
    }
}
