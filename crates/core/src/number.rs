//! Patient number generation
//!
//! A patient number is a 20-character random string. The generator itself
//! does not guarantee uniqueness; [`generate_unique_number`] draws candidates
//! until the store reports one as unused, up to a fixed number of attempts.

use std::sync::Mutex;

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};

use crate::error::{ClinicalError, ClinicalResult};
use crate::store::PatientStore;

/// Characters a patient number is drawn from
pub const ALPHABET: [char; 64] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'Ñ', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k',
    'l', 'm', 'n', 'ñ', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', '0', '1', '2',
    '3', '4', '5', '6', '7', '8', '9',
];

/// Length of a patient number, in characters
pub const NUMBER_LENGTH: usize = 20;

/// Default bound on the uniqueness loop
pub const DEFAULT_MAX_ATTEMPTS: u32 = 16;

/// Source of candidate patient numbers
pub trait NumberSource: Send + Sync {
    fn generate(&self) -> String;
}

/// Draws numbers uniformly from [`ALPHABET`] using a secure RNG
pub struct RandomNumberSource<R = OsRng> {
    rng: Mutex<R>,
}

impl RandomNumberSource<OsRng> {
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for RandomNumberSource<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng + Send> RandomNumberSource<R> {
    /// Use a specific RNG, e.g. a seeded one in tests
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R: RngCore + CryptoRng + Send> NumberSource for RandomNumberSource<R> {
    fn generate(&self) -> String {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        (0..NUMBER_LENGTH)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect()
    }
}

/// Draw candidates from `source` until `store` reports one as unused.
///
/// Fails with [`ClinicalError::NumberExhausted`] once `max_attempts`
/// candidates have all collided.
pub async fn generate_unique_number(
    store: &dyn PatientStore,
    source: &dyn NumberSource,
    max_attempts: u32,
) -> ClinicalResult<String> {
    for attempt in 1..=max_attempts {
        let candidate = source.generate();
        if !store.exists_by_number(&candidate).await? {
            tracing::debug!(attempt, "Generated unique patient number");
            return Ok(candidate);
        }
        tracing::warn!(attempt, "Patient number collision, retrying");
    }

    Err(ClinicalError::NumberExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::error::StoreError;
    use crate::model::Patient;

    /// Reports the first `collisions` numbers as taken
    struct CollidingStore {
        collisions: u32,
        checks: AtomicU32,
    }

    #[async_trait]
    impl PatientStore for CollidingStore {
        async fn find_by_id(&self, _id: i64) -> Result<Option<Patient>, StoreError> {
            unimplemented!()
        }
        async fn find_active_by_id(&self, _id: i64) -> Result<Option<Patient>, StoreError> {
            unimplemented!()
        }
        async fn find_all_active(&self) -> Result<Vec<Patient>, StoreError> {
            unimplemented!()
        }
        async fn exists_by_number(&self, _number: &str) -> Result<bool, StoreError> {
            let n = self.checks.fetch_add(1, Ordering::SeqCst);
            Ok(n < self.collisions)
        }
        async fn exists_by_national_id(&self, _id: &str) -> Result<bool, StoreError> {
            unimplemented!()
        }
        async fn exists_by_email(&self, _email: &str) -> Result<bool, StoreError> {
            unimplemented!()
        }
        async fn save(&self, _patient: Patient) -> Result<Patient, StoreError> {
            unimplemented!()
        }
    }

    /// Yields `N-0`, `N-1`, ... and counts calls
    struct CountingSource {
        calls: AtomicU32,
    }

    impl NumberSource for CountingSource {
        fn generate(&self) -> String {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            format!("N-{}", n)
        }
    }

    #[test]
    fn generated_numbers_use_alphabet_and_length() {
        let source = RandomNumberSource::with_rng(StdRng::seed_from_u64(7));
        for _ in 0..200 {
            let number = source.generate();
            assert_eq!(number.chars().count(), NUMBER_LENGTH);
            assert!(number.chars().all(|c| ALPHABET.contains(&c)), "{}", number);
        }
    }

    #[test]
    fn seeded_sources_are_deterministic() {
        let a = RandomNumberSource::with_rng(StdRng::seed_from_u64(42));
        let b = RandomNumberSource::with_rng(StdRng::seed_from_u64(42));
        assert_eq!(a.generate(), b.generate());
        assert_ne!(a.generate(), a.generate());
    }

    #[test]
    fn os_rng_source_generates() {
        let number = RandomNumberSource::new().generate();
        assert_eq!(number.chars().count(), NUMBER_LENGTH);
    }

    #[tokio::test]
    async fn retries_until_unused_number() {
        for collisions in [0, 1, 5] {
            let store = CollidingStore {
                collisions,
                checks: AtomicU32::new(0),
            };
            let source = CountingSource {
                calls: AtomicU32::new(0),
            };

            let number = generate_unique_number(&store, &source, DEFAULT_MAX_ATTEMPTS)
                .await
                .unwrap();

            assert_eq!(source.calls.load(Ordering::SeqCst), collisions + 1);
            assert_eq!(number, format!("N-{}", collisions));
        }
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let store = CollidingStore {
            collisions: u32::MAX,
            checks: AtomicU32::new(0),
        };
        let source = CountingSource {
            calls: AtomicU32::new(0),
        };

        let err = generate_unique_number(&store, &source, 3).await.unwrap_err();

        assert!(matches!(err, ClinicalError::NumberExhausted { attempts: 3 }));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }
}
