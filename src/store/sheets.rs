use super::LoadLog;
use crate::config::Config;
use crate::error::{Result, TrackerError};
use crate::record::{COLUMNS, LoadRecord, records_from_table};
use async_trait::async_trait;
use google_sheets4::Sheets;
use google_sheets4::api::{Scope, ValueRange};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use serde_json::Value;
use tracing::info;
use yup_oauth2::ServiceAccountAuthenticator;

type Hub = Sheets<HttpsConnector<HttpConnector>>;

/// The load log as rows of a Google Sheets worksheet.
pub struct SheetsLog {
    hub: Hub,
    spreadsheet_id: String,
    worksheet: String,
}

impl SheetsLog {
    pub async fn connect(cfg: &Config) -> Result<Self> {
        if cfg.sheet.spreadsheet_id.is_empty() {
            return Err(TrackerError::Config(
                "sheet.spreadsheet_id is not set (run `ratecon link <id>`)".to_string(),
            ));
        }
        let hub = create_hub(cfg).await?;
        Ok(Self {
            hub,
            spreadsheet_id: cfg.sheet.spreadsheet_id.clone(),
            worksheet: cfg.sheet.worksheet.clone(),
        })
    }

    async fn read_table(&self) -> Result<Vec<Vec<String>>> {
        info!(spreadsheet = %self.spreadsheet_id, range = %self.worksheet, "Reading worksheet");
        let (_, range) = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, &self.worksheet)
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await?;
        Ok(table_from_values(range.values.unwrap_or_default()))
    }

    async fn append_rows(&self, rows: Vec<Vec<Value>>) -> Result<()> {
        let count = rows.len();
        let request = ValueRange {
            values: Some(rows),
            ..Default::default()
        };
        self.hub
            .spreadsheets()
            .values_append(request, &self.spreadsheet_id, &self.worksheet)
            // RAW keeps "470.00" a string, so reading it back gives the same text.
            .value_input_option("RAW")
            .insert_data_option("INSERT_ROWS")
            .add_scope(Scope::Spreadsheet)
            .doit()
            .await?;
        info!(rows = count, "Appended rows");
        Ok(())
    }
}

#[async_trait]
impl LoadLog for SheetsLog {
    async fn load_all(&self) -> Result<Vec<LoadRecord>> {
        let table = self.read_table().await?;
        let records = records_from_table(&table);
        info!(records = records.len(), "Loaded log");
        Ok(records)
    }

    async fn append(&self, records: &[LoadRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        let table = self.read_table().await?;
        let needs_header = table.iter().all(|row| row.iter().all(|c| c.trim().is_empty()));
        self.append_rows(rows_for_append(records, needs_header)).await
    }
}

/// Build the Sheets hub with a service-account authenticator.
async fn create_hub(cfg: &Config) -> Result<Hub> {
    let key = match (&cfg.service_account, &cfg.sheet.key_path) {
        (Some(key), _) => key.clone(),
        (None, Some(path)) => yup_oauth2::read_service_account_key(path).await?,
        (None, None) => {
            return Err(TrackerError::Config(
                "no service account: set [gcp_service_account] or sheet.key_path".to_string(),
            ));
        }
    };
    info!(client_email = %key.client_email, "Authenticating service account");

    let auth = ServiceAccountAuthenticator::builder(key).build().await?;

    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_webpki_roots()
                .https_or_http()
                .enable_http1()
                .build(),
        );

    Ok(Sheets::new(client, auth))
}

/// Sheets returns loosely typed cells; the log only deals in text.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn table_from_values(values: Vec<Vec<Value>>) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect()
}

fn rows_for_append(records: &[LoadRecord], with_header: bool) -> Vec<Vec<Value>> {
    let header = with_header.then(|| COLUMNS.iter().map(|c| Value::from(*c)).collect());
    header
        .into_iter()
        .chain(
            records
                .iter()
                .map(|r| r.to_row().iter().map(|c| Value::from(*c)).collect()),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample;
    use serde_json::json;

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("R-1")), "R-1");
        assert_eq!(cell_text(&json!(470)), "470");
        assert_eq!(cell_text(&json!(null)), "");
        assert_eq!(cell_text(&json!(true)), "true");
    }

    #[test]
    fn test_rows_for_append_header() {
        let recs = vec![sample("R-1", "a.pdf", "470.00")];
        let rows = rows_for_append(&recs, true);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][2], json!("Reference #"));
        assert_eq!(rows[1][5], json!("470.00"));

        assert_eq!(rows_for_append(&recs, false).len(), 1);
    }

    #[test]
    fn test_appended_rows_read_back_unchanged() {
        let mut rec = sample("R-1", "a.pdf", "470.00");
        rec.container = String::new();
        let recs = vec![rec, sample("R-2", "b.pdf", "1200")];

        // What the API hands back for a sheet holding exactly the appended rows;
        // trailing empty cells are dropped by Sheets.
        let mut values = rows_for_append(&recs, true);
        for row in &mut values {
            while row.last() == Some(&json!("")) {
                row.pop();
            }
        }

        let table = table_from_values(values);
        assert_eq!(records_from_table(&table), recs);
    }
}
