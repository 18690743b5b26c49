use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use prototype_config::config::ReportingConfig;
use prototype_config::discovery::{
    parse_answers, parse_templates, standard_templates, AnswerMap, QuestionTemplate, ToolKind,
};
use prototype_config::error::AppError;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) reporting: ReportingConfig,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}

/// Reads an answers document; no path means an empty submission.
pub(crate) fn load_answers(path: Option<&Path>) -> Result<AnswerMap, AppError> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(parse_answers(&raw)?)
        }
        None => Ok(AnswerMap::new()),
    }
}

/// Reads a templates document, falling back to the tool's standard catalog.
pub(crate) fn load_templates(
    path: Option<&Path>,
    kind: ToolKind,
) -> Result<Vec<QuestionTemplate>, AppError> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            Ok(parse_templates(&raw)?)
        }
        None => Ok(standard_templates(kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_reports_the_raw_value() {
        assert_eq!(
            parse_date(" 2025-03-03 ").ok(),
            NaiveDate::from_ymd_opt(2025, 3, 3)
        );
        let error = parse_date("03/03/2025").expect_err("US format rejected");
        assert!(error.contains("03/03/2025"));
    }

    #[test]
    fn missing_documents_fall_back() {
        assert!(load_answers(None).expect("empty answers").is_empty());
        let templates = load_templates(None, ToolKind::Renewal).expect("standard catalog");
        assert_eq!(templates, standard_templates(ToolKind::Renewal));
    }

    #[test]
    fn unreadable_answers_surface_io_errors() {
        let error = load_answers(Some(Path::new("does/not/exist.json"))).expect_err("missing");
        assert!(matches!(error, AppError::Io(_)));
    }
}
