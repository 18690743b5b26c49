use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Questionnaire item metadata as published by the discovery catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionTemplate {
    pub id: String,
    #[serde(default, alias = "questionText")]
    pub question: String,
    #[serde(default, rename = "template_mapping", alias = "mapping")]
    pub mapping: Option<TemplateMapping>,
}

impl QuestionTemplate {
    pub fn new(id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            mapping: None,
        }
    }

    pub fn mapped_to_field(mut self, field: impl Into<String>) -> Self {
        self.mapping.get_or_insert_with(TemplateMapping::default).field = Some(field.into());
        self
    }

    pub fn mapped_to_indicator(mut self, indicator: impl Into<String>) -> Self {
        self.mapping
            .get_or_insert_with(TemplateMapping::default)
            .indicator = Some(indicator.into());
        self
    }
}

/// Declared target a template's answer feeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Raw questionnaire answer.
///
/// Decoding never fails on shape: `null` becomes [`AnswerValue::Null`], list
/// entries that are not strings are rendered as text (nulls dropped), and
/// booleans or objects are kept as [`AnswerValue::Other`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
    Null,
    Other(Value),
}

impl AnswerValue {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => AnswerValue::Null,
            Value::String(text) => AnswerValue::Text(text),
            Value::Number(number) => match number.as_f64() {
                Some(value) => AnswerValue::Number(value),
                None => AnswerValue::Other(Value::Number(number)),
            },
            Value::Array(items) => AnswerValue::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Null => None,
                        Value::String(text) => Some(text),
                        other => Some(other.to_string()),
                    })
                    .collect(),
            ),
            other => AnswerValue::Other(other),
        }
    }

    /// Whether the answer should overwrite a default. Empty text, zero and
    /// `null` are treated as unanswered; any list counts, including an empty one.
    pub fn is_present(&self) -> bool {
        match self {
            AnswerValue::Number(value) => *value != 0.0 && !value.is_nan(),
            AnswerValue::Text(text) => !text.is_empty(),
            AnswerValue::List(_) => true,
            AnswerValue::Null => false,
            AnswerValue::Other(value) => value.as_bool().unwrap_or(true),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub(crate) fn kind_label(&self) -> &'static str {
        match self {
            AnswerValue::Number(_) => "number",
            AnswerValue::Text(_) => "text",
            AnswerValue::List(_) => "list",
            AnswerValue::Null => "null",
            AnswerValue::Other(Value::Bool(_)) => "boolean",
            AnswerValue::Other(_) => "object",
        }
    }

    /// Renders the answer as display text, joining list entries.
    pub fn to_display_text(&self) -> String {
        match self {
            AnswerValue::Number(value) => value.to_string(),
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::List(items) => items.join(", "),
            AnswerValue::Null => String::new(),
            AnswerValue::Other(value) => value.to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for AnswerValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(AnswerValue::from_json)
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Number(value)
    }
}

impl From<i32> for AnswerValue {
    fn from(value: i32) -> Self {
        AnswerValue::Number(f64::from(value))
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(value: Vec<&str>) -> Self {
        AnswerValue::List(value.into_iter().map(str::to_string).collect())
    }
}

/// Answers keyed by question ID.
pub type AnswerMap = BTreeMap<String, AnswerValue>;

/// Lookup from template ID to its mapping, in template list order.
#[derive(Debug, Clone, Default)]
pub struct TemplateIndex {
    entries: Vec<(String, TemplateMapping)>,
}

impl TemplateIndex {
    pub fn build(templates: &[QuestionTemplate]) -> Self {
        let mut entries: Vec<(String, TemplateMapping)> = Vec::with_capacity(templates.len());

        for template in templates {
            let Some(mapping) = &template.mapping else {
                continue;
            };

            // A repeated ID replaces the mapping but keeps its first position.
            match entries.iter_mut().find(|(id, _)| id == &template.id) {
                Some(entry) => entry.1 = mapping.clone(),
                None => entries.push((template.id.clone(), mapping.clone())),
            }
        }

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TemplateMapping> {
        self.entries
            .iter()
            .find(|(entry_id, _)| entry_id == id)
            .map(|(_, mapping)| mapping)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateMapping)> {
        self.entries
            .iter()
            .map(|(id, mapping)| (id.as_str(), mapping))
    }

    /// First answered template mapped to `field`. `None` means keep the default.
    pub fn find_by_mapping<'a>(&self, field: &str, answers: &'a AnswerMap) -> Option<&'a AnswerValue> {
        self.entries
            .iter()
            .filter(|(_, mapping)| mapping.field.as_deref() == Some(field))
            .find_map(|(id, _)| answers.get(id))
    }

    /// Answered templates carrying an indicator mapping, in index order.
    pub fn answered_indicators<'s, 'a>(
        &'s self,
        answers: &'a AnswerMap,
    ) -> impl Iterator<Item = (&'s str, &'a AnswerValue)> + 's
    where
        'a: 's,
    {
        self.entries.iter().filter_map(move |(id, mapping)| {
            let indicator = mapping.indicator.as_deref()?;
            answers.get(id).map(|answer| (indicator, answer))
        })
    }

    /// Fields fed by more than one answered template.
    pub fn duplicate_fields(&self, answers: &AnswerMap) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for (id, mapping) in &self.entries {
            if let (Some(field), true) = (mapping.field.as_deref(), answers.contains_key(id)) {
                *counts.entry(field).or_default() += 1;
            }
        }

        counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(field, _)| field.to_string())
            .collect()
    }
}

/// Failures decoding questionnaire documents or tool names.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryInputError {
    #[error("invalid {document} JSON: {source}")]
    Json {
        document: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown tool '{0}' (expected nps, renewal, or risk-assessment)")]
    UnknownTool(String),
}

/// Decodes an answer map. Only malformed JSON is an error; any document
/// other than an object yields an empty map.
pub fn parse_answers(raw: &str) -> Result<AnswerMap, DiscoveryInputError> {
    let parsed: Value = serde_json::from_str(raw).map_err(|source| DiscoveryInputError::Json {
        document: "answers",
        source,
    })?;

    let Value::Object(entries) = parsed else {
        return Ok(AnswerMap::new());
    };
    Ok(entries
        .into_iter()
        .map(|(id, value)| (id, AnswerValue::from_json(value)))
        .collect())
}

pub fn parse_templates(raw: &str) -> Result<Vec<QuestionTemplate>, DiscoveryInputError> {
    let parsed: Option<Vec<QuestionTemplate>> =
        serde_json::from_str(raw).map_err(|source| DiscoveryInputError::Json {
            document: "templates",
            source,
        })?;
    Ok(parsed.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(pairs: &[(&str, AnswerValue)]) -> AnswerMap {
        pairs
            .iter()
            .map(|(id, value)| (id.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn index_skips_templates_without_mapping() {
        let templates = vec![
            QuestionTemplate::new("q1", "Which NPS tool?").mapped_to_field("nps_source_tool"),
            QuestionTemplate::new("q2", "Free-form notes"),
            QuestionTemplate::new("q3", "Champion tracking").mapped_to_indicator("champion_strength"),
        ];

        let index = TemplateIndex::build(&templates);
        assert_eq!(index.len(), 2);
        assert!(index.get("q2").is_none());
        assert_eq!(
            index.get("q3").and_then(|mapping| mapping.indicator.as_deref()),
            Some("champion_strength")
        );
    }

    #[test]
    fn empty_template_list_builds_empty_index() {
        let index = TemplateIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index
            .find_by_mapping("crm_source", &AnswerMap::new())
            .is_none());
    }

    #[test]
    fn find_by_mapping_requires_an_answer() {
        let templates = vec![
            QuestionTemplate::new("unanswered", "CRM?").mapped_to_field("crm_source"),
            QuestionTemplate::new("answered", "CRM again?").mapped_to_field("crm_source"),
        ];
        let index = TemplateIndex::build(&templates);
        let answers = answers(&[("answered", "Salesforce".into())]);

        assert_eq!(
            index.find_by_mapping("crm_source", &answers),
            Some(&AnswerValue::Text("Salesforce".to_string()))
        );
        assert!(index.find_by_mapping("integration_method", &answers).is_none());
    }

    #[test]
    fn duplicate_field_mappings_resolve_in_template_order() {
        let templates = vec![
            QuestionTemplate::new("first", "CRM?").mapped_to_field("crm_source"),
            QuestionTemplate::new("second", "CRM again?").mapped_to_field("crm_source"),
        ];
        let index = TemplateIndex::build(&templates);
        let answers = answers(&[("first", "HubSpot".into()), ("second", "Salesforce".into())]);

        assert_eq!(
            index.find_by_mapping("crm_source", &answers),
            Some(&AnswerValue::Text("HubSpot".to_string()))
        );
        assert_eq!(index.duplicate_fields(&answers), vec!["crm_source".to_string()]);
    }

    #[test]
    fn repeated_template_id_keeps_first_position_with_latest_mapping() {
        let templates = vec![
            QuestionTemplate::new("q1", "Old").mapped_to_field("crm_source"),
            QuestionTemplate::new("q2", "Other").mapped_to_field("integration_method"),
            QuestionTemplate::new("q1", "New").mapped_to_field("outreach_days"),
        ];
        let index = TemplateIndex::build(&templates);

        let ids: Vec<&str> = index.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["q1", "q2"]);
        assert_eq!(
            index.get("q1").and_then(|mapping| mapping.field.as_deref()),
            Some("outreach_days")
        );
    }

    #[test]
    fn answers_decode_all_value_shapes() {
        let parsed = parse_answers(
            r#"{"a": "Delighted", "b": 7, "c": ["Score (0-10)", "Response date"]}"#,
        )
        .expect("answers parse");

        assert_eq!(parsed["a"], AnswerValue::Text("Delighted".to_string()));
        assert_eq!(parsed["b"], AnswerValue::Number(7.0));
        assert_eq!(
            parsed["c"],
            AnswerValue::List(vec!["Score (0-10)".to_string(), "Response date".to_string()])
        );
        assert!(parse_answers("null").expect("null parses").is_empty());
    }

    #[test]
    fn answers_tolerate_null_and_mixed_shapes() {
        let parsed = parse_answers(
            r#"{"a": null, "b": ["Score (0-10)", 3, null, true], "c": true, "d": {"x": 1}}"#,
        )
        .expect("answers parse");

        assert_eq!(parsed["a"], AnswerValue::Null);
        assert!(!parsed["a"].is_present());
        assert_eq!(
            parsed["b"],
            AnswerValue::List(vec![
                "Score (0-10)".to_string(),
                "3".to_string(),
                "true".to_string()
            ])
        );
        assert_eq!(parsed["c"].kind_label(), "boolean");
        assert!(parsed["c"].is_present());
        assert_eq!(parsed["d"].kind_label(), "object");

        assert!(parse_answers("[1, 2]").expect("array parses").is_empty());
        assert!(parse_answers(r#""text""#).expect("string parses").is_empty());
    }

    #[test]
    fn templates_accept_catalog_field_names() {
        let parsed = parse_templates(
            r#"[{"id": "q1", "question": "Tool?", "template_mapping": {"field": "nps_source_tool"}},
                {"id": "q2", "questionText": "Notes", "template_mapping": null}]"#,
        )
        .expect("templates parse");

        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed[0].mapping.as_ref().and_then(|m| m.field.as_deref()),
            Some("nps_source_tool")
        );
        assert_eq!(parsed[1].question, "Notes");
        assert!(parsed[1].mapping.is_none());
    }

    #[test]
    fn malformed_answers_report_document_name() {
        let error = parse_answers("{not json").expect_err("invalid json");
        assert!(error.to_string().starts_with("invalid answers JSON"));
    }

    #[test]
    fn presence_follows_questionnaire_truthiness() {
        assert!(!AnswerValue::Text(String::new()).is_present());
        assert!(!AnswerValue::Number(0.0).is_present());
        assert!(AnswerValue::List(Vec::new()).is_present());
        assert!(AnswerValue::Number(-1.0).is_present());
    }
}
