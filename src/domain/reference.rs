use crate::error::{CheckoutError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, PoisonError};

const PREFIX: &str = "purchase";

/// Bounds (inclusive) of the random suffix appended to every reference.
pub const SUFFIX_MIN: u32 = 1;
pub const SUFFIX_MAX: u32 = 1_000_000_000;

/// A merchant-side reference identifying one payment attempt.
///
/// Formatted as `purchase_<item>_<user>_<n>`. References are generated fresh
/// for each attempt and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransactionReference(String);

/// The pieces a `TransactionReference` was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceParts {
    pub item_id: String,
    pub user_id: String,
    pub suffix: u32,
}

impl TransactionReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a reference back into item id, user id and random suffix.
    ///
    /// The item id ends at the first underscore after the prefix, so user ids
    /// may contain underscores but item ids may not.
    pub fn parse(raw: &str) -> Result<ReferenceParts> {
        let invalid = || CheckoutError::InvalidArgument(format!("Malformed reference {raw:?}"));

        let body = raw
            .strip_prefix(PREFIX)
            .and_then(|rest| rest.strip_prefix('_'))
            .ok_or_else(invalid)?;
        let (ids, suffix) = body.rsplit_once('_').ok_or_else(invalid)?;
        let (item_id, user_id) = ids.split_once('_').ok_or_else(invalid)?;

        let suffix: u32 = suffix.parse().map_err(|_| invalid())?;
        if item_id.is_empty() || user_id.is_empty() || !(SUFFIX_MIN..=SUFFIX_MAX).contains(&suffix)
        {
            return Err(invalid());
        }

        Ok(ReferenceParts {
            item_id: item_id.to_string(),
            user_id: user_id.to_string(),
            suffix,
        })
    }
}

impl fmt::Display for TransactionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TransactionReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Builds unique-enough transaction references from item and user ids.
///
/// Uniqueness is probabilistic: the suffix is drawn uniformly from
/// `[SUFFIX_MIN, SUFFIX_MAX]`.
pub struct ReferenceGenerator {
    rng: Mutex<StdRng>,
}

impl ReferenceGenerator {
    /// Creates a generator seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Creates a deterministic generator, for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn generate(&self, item_id: &str, user_id: &str) -> Result<TransactionReference> {
        if item_id.trim().is_empty() {
            return Err(CheckoutError::InvalidArgument(
                "Item id must not be empty".to_string(),
            ));
        }
        if user_id.trim().is_empty() {
            return Err(CheckoutError::InvalidArgument(
                "User id must not be empty".to_string(),
            ));
        }

        let suffix = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(SUFFIX_MIN..=SUFFIX_MAX);

        Ok(TransactionReference(format!(
            "{PREFIX}_{item_id}_{user_id}_{suffix}"
        )))
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_format() {
        let generator = ReferenceGenerator::seeded(7);
        let reference = generator.generate("42", "7").unwrap();

        let parts = TransactionReference::parse(reference.as_str()).unwrap();
        assert!(reference.as_str().starts_with("purchase_42_7_"));
        assert_eq!(parts.item_id, "42");
        assert_eq!(parts.user_id, "7");
        assert!((SUFFIX_MIN..=SUFFIX_MAX).contains(&parts.suffix));
    }

    #[test]
    fn test_empty_ids_are_rejected() {
        let generator = ReferenceGenerator::new();
        assert!(matches!(
            generator.generate("", "7"),
            Err(CheckoutError::InvalidArgument(_))
        ));
        assert!(matches!(
            generator.generate("42", "   "),
            Err(CheckoutError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_seeded_generators_repeat() {
        let a = ReferenceGenerator::seeded(99);
        let b = ReferenceGenerator::seeded(99);
        assert_eq!(a.generate("1", "2").unwrap(), b.generate("1", "2").unwrap());
    }

    #[test]
    fn test_parse_allows_underscores_in_user_id() {
        let parts = TransactionReference::parse("purchase_3_jane_doe_12345").unwrap();
        assert_eq!(parts.item_id, "3");
        assert_eq!(parts.user_id, "jane_doe");
        assert_eq!(parts.suffix, 12345);
    }

    #[test]
    fn test_parse_rejects_malformed_references() {
        for raw in [
            "",
            "purchase",
            "purchase_1_2",
            "order_1_2_3",
            "purchase_1_2_abc",
            "purchase_1_2_0",
            "purchase_1_2_1000000001",
            "purchase__2_3",
        ] {
            assert!(
                TransactionReference::parse(raw).is_err(),
                "{raw:?} should not parse"
            );
        }
    }
}
