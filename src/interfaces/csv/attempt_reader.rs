use crate::error::{CheckoutError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of a replay file: a checkout attempt plus what the provider does with it.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CheckoutAttempt {
    pub item_id: String,
    pub user_id: String,
    pub email: String,
    pub amount: Decimal,
    pub callback_url: String,
    pub provider_action: String,
}

/// Reads checkout attempts from a CSV source.
///
/// Whitespace around fields is trimmed and short rows are tolerated so that
/// a bad row surfaces as an error for that row only.
pub struct AttemptReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> AttemptReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes attempts, one `Result` per row.
    pub fn attempts(self) -> impl Iterator<Item = Result<CheckoutAttempt>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(CheckoutError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "item_id, user_id, email, amount, callback_url, provider_action";

    #[test]
    fn test_reader_valid_stream() {
        let data = format!(
            "{HEADER}\n42, 7, a@example.com, 500, https://example.com/done, success:T1\n\
             3, 9, b@example.com, 12.5, https://example.com/cb?x=1, cancel"
        );
        let reader = AttemptReader::new(data.as_bytes());
        let results: Vec<Result<CheckoutAttempt>> = reader.attempts().collect();

        assert_eq!(results.len(), 2);
        let first = results[0].as_ref().unwrap();
        assert_eq!(first.item_id, "42");
        assert_eq!(first.amount, dec!(500));
        assert_eq!(first.provider_action, "success:T1");
        assert_eq!(results[1].as_ref().unwrap().callback_url, "https://example.com/cb?x=1");
    }

    #[test]
    fn test_reader_malformed_line() {
        let data =
            format!("{HEADER}\n42, 7, a@example.com, lots, https://example.com/done, cancel");
        let reader = AttemptReader::new(data.as_bytes());
        let results: Vec<Result<CheckoutAttempt>> = reader.attempts().collect();

        assert!(matches!(results[0], Err(CheckoutError::CsvError(_))));
    }
}
