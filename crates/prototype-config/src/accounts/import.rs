use super::nps::{NpsAccount, NpsCategory, NpsTrend};
use crate::discovery::normalizer::leading_integer;
use crate::discovery::nps::{should_flag_as_risk, NpsHubConfig};
use chrono::{DateTime, Days, NaiveDate};
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::Path;

#[derive(Debug)]
pub enum AccountImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    NoRows,
}

impl std::fmt::Display for AccountImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountImportError::Io(err) => write!(f, "failed to read NPS export: {}", err),
            AccountImportError::Csv(err) => write!(f, "invalid NPS CSV data: {}", err),
            AccountImportError::NoRows => {
                write!(f, "NPS CSV must have a header and at least one data row")
            }
        }
    }
}

impl std::error::Error for AccountImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AccountImportError::Io(err) => Some(err),
            AccountImportError::Csv(err) => Some(err),
            AccountImportError::NoRows => None,
        }
    }
}

impl From<std::io::Error> for AccountImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for AccountImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads NPS survey exports into hub accounts.
///
/// Headers are matched case-insensitively. Detractor rows get a follow-up
/// due `today` plus the configured SLA.
pub struct NpsAccountImporter;

impl NpsAccountImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        config: &NpsHubConfig,
        today: NaiveDate,
    ) -> Result<Vec<NpsAccount>, AccountImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, config, today)
    }

    pub fn from_reader<R: Read>(
        reader: R,
        config: &NpsHubConfig,
        today: NaiveDate,
    ) -> Result<Vec<NpsAccount>, AccountImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: csv::StringRecord = csv_reader
            .headers()?
            .iter()
            .map(|header| header.to_lowercase())
            .collect();

        let mut accounts = Vec::new();
        for (index, record) in csv_reader.records().enumerate() {
            let record = record?;
            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            let row: NpsRow = record.deserialize(Some(&headers))?;
            accounts.push(row.into_account(accounts.len() + 1, index + 2, config, today));
        }

        if accounts.is_empty() {
            return Err(AccountImportError::NoRows);
        }

        tracing::debug!(accounts = accounts.len(), "imported NPS accounts");
        Ok(accounts)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NpsRow {
    #[serde(deserialize_with = "empty_string_as_none")]
    account_id: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    account_name: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    score: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    previous_score: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    response_date: Option<String>,
    #[serde(alias = "feedback", deserialize_with = "empty_string_as_none")]
    feedback_text: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    contact_name: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    arr: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    renewal_date: Option<String>,
    #[serde(alias = "owner", deserialize_with = "empty_string_as_none")]
    account_owner: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    segment: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    lifecycle_stage: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    product: Option<String>,
}

impl NpsRow {
    fn into_account(
        self,
        ordinal: usize,
        line: usize,
        config: &NpsHubConfig,
        today: NaiveDate,
    ) -> NpsAccount {
        let score = self.score.as_deref().and_then(parse_score).unwrap_or(0);
        let previous_score = self.previous_score.as_deref().and_then(parse_score);
        let category = NpsCategory::from_score(score);
        let is_detractor = category == NpsCategory::Detractor;

        let response_date = self
            .response_date
            .as_deref()
            .and_then(|value| parse_date_logged("response_date", value, line))
            .unwrap_or(today);
        let renewal_date = self
            .renewal_date
            .as_deref()
            .and_then(|value| parse_date_logged("renewal_date", value, line));

        let followup_due = if is_detractor {
            today.checked_add_days(Days::new(u64::from(config.followup_sla_days())))
        } else {
            None
        };

        NpsAccount {
            id: self
                .account_id
                .unwrap_or_else(|| format!("ACC-{}", ordinal)),
            name: self.account_name.unwrap_or_else(|| "Unknown".to_string()),
            score,
            previous_score,
            category,
            trend: NpsTrend::from_scores(score, previous_score),
            arr: self.arr.as_deref().map(parse_amount).unwrap_or(0.0),
            segment: self.segment,
            owner: self.account_owner,
            contact_name: self.contact_name,
            lifecycle_stage: self.lifecycle_stage,
            product: self.product,
            renewal_date,
            response_date,
            feedback: self.feedback_text,
            flagged: should_flag_as_risk(score, previous_score, Some(config)),
            followup_required: is_detractor,
            followup_completed: false,
            followup_due,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

/// Leading integer clamped to the 0-10 survey scale.
fn parse_score(value: &str) -> Option<u8> {
    leading_integer(value).map(|score| score.clamp(0, 10) as u8)
}

fn parse_amount(value: &str) -> f64 {
    let cleaned: String = value
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | ' '))
        .collect();

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .or_else(|| leading_integer(&cleaned).map(|amount| amount as f64))
        .unwrap_or(0.0)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    NaiveDate::parse_from_str(trimmed, "%m/%d/%Y").ok()
}

fn parse_date_logged(column: &'static str, value: &str, line: usize) -> Option<NaiveDate> {
    let parsed = parse_date(value);
    if parsed.is_none() {
        tracing::warn!(column, value, line, "ignoring unparseable date in NPS import");
    }
    parsed
}
