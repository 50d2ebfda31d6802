use crate::domain::session::SessionOutcome;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// One line of the replay report.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct ReportRow {
    pub reference: String,
    pub item_id: String,
    pub user_id: String,
    pub amount_minor: u64,
    pub outcome: &'static str,
    pub redirect_url: String,
}

impl ReportRow {
    pub fn new(
        reference: impl Into<String>,
        item_id: impl Into<String>,
        user_id: impl Into<String>,
        amount_minor: u64,
        outcome: &SessionOutcome,
    ) -> Self {
        let redirect_url = match outcome {
            SessionOutcome::Redirected(url) => url.to_string(),
            _ => String::new(),
        };
        Self {
            reference: reference.into(),
            item_id: item_id.into(),
            user_id: user_id.into(),
            amount_minor,
            outcome: outcome.label(),
            redirect_url,
        }
    }
}

/// Writes replay results as CSV, header first.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        self.writer.serialize(row)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_writes_header_and_rows() {
        let mut buffer = Vec::new();
        {
            let mut writer = ReportWriter::new(&mut buffer);
            let url = Url::parse("https://example.com/done?reference=T1").unwrap();
            writer
                .write_row(&ReportRow::new(
                    "purchase_42_7_99",
                    "42",
                    "7",
                    50000,
                    &SessionOutcome::Redirected(url),
                ))
                .unwrap();
            writer
                .write_row(&ReportRow::new(
                    "purchase_3_9_5",
                    "3",
                    "9",
                    1250,
                    &SessionOutcome::Cancelled,
                ))
                .unwrap();
            writer.flush().unwrap();
        }

        let out = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "reference,item_id,user_id,amount_minor,outcome,redirect_url",
                "purchase_42_7_99,42,7,50000,redirected,https://example.com/done?reference=T1",
                "purchase_3_9_5,3,9,1250,cancelled,",
            ]
        );
    }
}
