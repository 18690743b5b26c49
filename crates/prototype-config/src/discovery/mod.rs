pub mod catalog;
pub mod normalizer;
pub mod nps;
pub mod renewal;
pub mod report;
pub mod resolver;
pub mod risk;
pub mod template;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use catalog::standard_templates;
pub use nps::NpsHubConfig;
pub use renewal::RenewalTrackerConfig;
pub use report::{DiscoveryIssue, DiscoveryOutcome, IssueKind};
pub use resolver::FieldResolver;
pub use risk::RiskAssessmentConfig;
pub use template::{
    parse_answers, parse_templates, AnswerMap, AnswerValue, DiscoveryInputError, QuestionTemplate,
    TemplateIndex, TemplateMapping,
};

/// Downstream tools a discovery questionnaire can configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    Nps,
    Renewal,
    RiskAssessment,
}

impl ToolKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nps => "NPS account hub",
            Self::Renewal => "Renewal tracker",
            Self::RiskAssessment => "Risk assessment",
        }
    }

    /// Questionnaire catalog entry the tool's templates are published under.
    pub const fn catalog_id(self) -> &'static str {
        match self {
            Self::Nps => "b5c6d7e8-f9a0-1234-bcde-567890abcdef",
            Self::Renewal => "d9e0f1a2-3456-7890-bcde-f01234567890",
            Self::RiskAssessment => "99cd7975-7b3f-4774-8ec6-5984d5895f45",
        }
    }

    pub fn from_catalog_id(id: &str) -> Option<Self> {
        [Self::Nps, Self::Renewal, Self::RiskAssessment]
            .into_iter()
            .find(|kind| kind.catalog_id() == id)
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::Nps => "nps",
            Self::Renewal => "renewal",
            Self::RiskAssessment => "risk-assessment",
        }
    }
}

impl FromStr for ToolKind {
    type Err = DiscoveryInputError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "nps" | "nps-hub" => Ok(Self::Nps),
            "renewal" | "renewal-tracker" => Ok(Self::Renewal),
            "risk-assessment" | "risk" => Ok(Self::RiskAssessment),
            other => Self::from_catalog_id(other)
                .ok_or_else(|| DiscoveryInputError::UnknownTool(value.to_string())),
        }
    }
}

/// A tool configuration populated from questionnaire answers.
///
/// `Default` supplies every field; `apply` overwrites only the fields whose
/// mapped answer is present, so an empty submission yields the defaults.
pub trait DiscoveryConfig: Default {
    const TOOL: ToolKind;

    fn apply(&mut self, resolver: &mut FieldResolver<'_>);
}

pub fn transform<C: DiscoveryConfig>(answers: &AnswerMap, templates: &[QuestionTemplate]) -> C {
    transform_with_report::<C>(answers, templates).configuration
}

/// Same configuration as [`transform`], plus the issues absorbed on the way.
pub fn transform_with_report<C: DiscoveryConfig>(
    answers: &AnswerMap,
    templates: &[QuestionTemplate],
) -> DiscoveryOutcome<C> {
    let index = TemplateIndex::build(templates);
    let mut resolver = FieldResolver::new(&index, answers);
    let mut configuration = C::default();

    configuration.apply(&mut resolver);
    resolver.note_duplicates();

    let issues = resolver.into_issues();
    tracing::debug!(
        tool = C::TOOL.slug(),
        answers = answers.len(),
        mapped_templates = index.len(),
        issues = issues.len(),
        "discovery transform complete"
    );

    DiscoveryOutcome {
        configuration,
        issues,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "configuration", rename_all = "kebab-case")]
pub enum ToolConfiguration {
    Nps(NpsHubConfig),
    Renewal(RenewalTrackerConfig),
    RiskAssessment(RiskAssessmentConfig),
}

impl ToolConfiguration {
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Nps(_) => ToolKind::Nps,
            Self::Renewal(_) => ToolKind::Renewal,
            Self::RiskAssessment(_) => ToolKind::RiskAssessment,
        }
    }

    pub fn defaults(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Nps => Self::Nps(NpsHubConfig::default()),
            ToolKind::Renewal => Self::Renewal(RenewalTrackerConfig::default()),
            ToolKind::RiskAssessment => Self::RiskAssessment(RiskAssessmentConfig::default()),
        }
    }
}

/// Runtime dispatch for callers that only know the tool by name.
pub fn transform_for(
    kind: ToolKind,
    answers: &AnswerMap,
    templates: &[QuestionTemplate],
) -> DiscoveryOutcome<ToolConfiguration> {
    match kind {
        ToolKind::Nps => {
            transform_with_report::<NpsHubConfig>(answers, templates).map(ToolConfiguration::Nps)
        }
        ToolKind::Renewal => transform_with_report::<RenewalTrackerConfig>(answers, templates)
            .map(ToolConfiguration::Renewal),
        ToolKind::RiskAssessment => {
            transform_with_report::<RiskAssessmentConfig>(answers, templates)
                .map(ToolConfiguration::RiskAssessment)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_kind_parses_slugs_and_catalog_ids() {
        assert_eq!("nps".parse::<ToolKind>().ok(), Some(ToolKind::Nps));
        assert_eq!(" Renewal ".parse::<ToolKind>().ok(), Some(ToolKind::Renewal));
        assert_eq!(
            "99cd7975-7b3f-4774-8ec6-5984d5895f45"
                .parse::<ToolKind>()
                .ok(),
            Some(ToolKind::RiskAssessment)
        );

        let error = "okr".parse::<ToolKind>().expect_err("unknown tool");
        assert!(matches!(error, DiscoveryInputError::UnknownTool(name) if name == "okr"));
    }

    #[test]
    fn tool_configuration_serializes_with_tag() {
        let json = serde_json::to_value(ToolConfiguration::defaults(ToolKind::RiskAssessment))
            .expect("serialize");
        assert_eq!(json["tool"], "risk-assessment");
        assert_eq!(json["configuration"]["risk_threshold"], 60);
    }

    #[test]
    fn dispatch_matches_typed_transform() {
        let templates = vec![QuestionTemplate::new("crm", "CRM?").mapped_to_field("crm_source")];
        let mut answers = AnswerMap::new();
        answers.insert("crm".to_string(), "Salesforce".into());

        let typed: RenewalTrackerConfig = transform(&answers, &templates);
        let outcome = transform_for(ToolKind::Renewal, &answers, &templates);

        assert_eq!(outcome.configuration, ToolConfiguration::Renewal(typed));
        assert_eq!(outcome.configuration.kind(), ToolKind::Renewal);
        assert!(!outcome.has_issues());
    }
}
