//! Collision-free random identifier generation.
//!
//! Every primary identifier in the schema (`user_id`, `session_id`,
//! `classification_id`, `salt`) comes from the same generator: a fixed-length
//! string over a 64-symbol alphabet, re-drawn until the candidate is absent
//! from the target table/column.

use anyhow::{Context, Result};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};

/// 64 symbols: A-Z, a-z, 0-9, hyphen, underscore.
pub const ID_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

pub const DEFAULT_ID_LENGTH: usize = 16;

/// Closed set of (table, column) pairs the generator may target, so no
/// dynamic SQL identifiers cross the store boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdTarget {
    UserId,
    SessionId,
    Salt,
    ClassificationId,
}

impl IdTarget {
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::UserId => "users",
            Self::SessionId => "sessions",
            Self::Salt => "salts",
            Self::ClassificationId => "classifications",
        }
    }

    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::UserId => "user_id",
            Self::SessionId => "session_id",
            Self::Salt => "salt",
            Self::ClassificationId => "classification_id",
        }
    }
}

/// Draw one candidate identifier. `rand::rng()` is a CSPRNG, which is what
/// makes these identifiers usable as session tokens.
#[must_use]
pub fn random_candidate(length: usize) -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    (0..length)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Generate an identifier that does not currently exist in the target
/// table/column. Loops until a free candidate is found; with 64^16 possible
/// values this terminates in one iteration in practice.
pub async fn generate_id(
    conn: &DatabaseConnection,
    target: IdTarget,
    length: usize,
) -> Result<String> {
    let backend = conn.get_database_backend();
    let query = format!(
        "SELECT 1 FROM {} WHERE {} = ? LIMIT 1",
        target.table(),
        target.column()
    );

    loop {
        let candidate = random_candidate(length);
        let taken = conn
            .query_one(Statement::from_sql_and_values(
                backend,
                query.as_str(),
                [candidate.clone().into()],
            ))
            .await
            .with_context(|| {
                format!(
                    "Failed to check {}.{} for id collision",
                    target.table(),
                    target.column()
                )
            })?;

        if taken.is_none() {
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Store;
    use std::collections::HashSet;

    #[test]
    fn candidates_have_requested_length_and_alphabet() {
        for length in [1, 8, 16, 32] {
            let id = random_candidate(length);
            assert_eq!(id.len(), length);
            assert!(id.bytes().all(|b| ID_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn candidates_vary_between_draws() {
        // With 64^16 possibilities, two equal draws mean a broken RNG.
        assert_ne!(
            random_candidate(DEFAULT_ID_LENGTH),
            random_candidate(DEFAULT_ID_LENGTH)
        );
    }

    #[tokio::test]
    async fn generated_ids_are_unique_per_target() {
        let store = Store::new("sqlite::memory:").await.unwrap();

        let mut seen = HashSet::new();
        for _ in 0..100 {
            let salt = generate_id(&store.conn, IdTarget::Salt, DEFAULT_ID_LENGTH)
                .await
                .unwrap();
            assert_eq!(salt.len(), DEFAULT_ID_LENGTH);
            assert!(seen.insert(salt.clone()), "duplicate id: {salt}");
            store.record_salt(&salt).await.unwrap();
        }
    }

    #[tokio::test]
    async fn generator_honors_custom_length() {
        let store = Store::new("sqlite::memory:").await.unwrap();

        let id = generate_id(&store.conn, IdTarget::SessionId, 32)
            .await
            .unwrap();
        assert_eq!(id.len(), 32);
    }
}
