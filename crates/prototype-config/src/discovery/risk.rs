use super::normalizer::{contains_any, importance_multiplier, match_keyword, slider_to_multiplier};
use super::report::IssueKind;
use super::resolver::FieldResolver;
use super::template::AnswerValue;
use super::{DiscoveryConfig, ToolKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    B2bEnterprise,
    B2bSmb,
    B2c,
}

impl ClientType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::B2bEnterprise => "B2B Enterprise",
            Self::B2bSmb => "B2B SMB",
            Self::B2c => "B2C",
        }
    }
}

/// Indicator categories the assessment weights independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    Relationship,
    Adoption,
    Financial,
    Technical,
    Operational,
    Social,
    Engagement,
}

impl RiskCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Relationship => "Relationship",
            Self::Adoption => "Adoption",
            Self::Financial => "Financial",
            Self::Technical => "Technical",
            Self::Operational => "Operational",
            Self::Social => "Social",
            Self::Engagement => "Engagement",
        }
    }

    pub const fn ordered() -> [RiskCategory; 7] {
        [
            Self::Relationship,
            Self::Adoption,
            Self::Financial,
            Self::Technical,
            Self::Operational,
            Self::Social,
            Self::Engagement,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|category| category.label() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CategoryWeights {
    pub relationship: f64,
    pub adoption: f64,
    pub financial: f64,
    pub technical: f64,
    pub operational: f64,
    pub social: f64,
    pub engagement: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            relationship: 1.0,
            adoption: 1.0,
            financial: 1.0,
            technical: 1.0,
            operational: 1.0,
            social: 1.0,
            engagement: 1.0,
        }
    }
}

impl CategoryWeights {
    pub fn get(&self, category: RiskCategory) -> f64 {
        match category {
            RiskCategory::Relationship => self.relationship,
            RiskCategory::Adoption => self.adoption,
            RiskCategory::Financial => self.financial,
            RiskCategory::Technical => self.technical,
            RiskCategory::Operational => self.operational,
            RiskCategory::Social => self.social,
            RiskCategory::Engagement => self.engagement,
        }
    }

    pub fn set(&mut self, category: RiskCategory, weight: f64) {
        let slot = match category {
            RiskCategory::Relationship => &mut self.relationship,
            RiskCategory::Adoption => &mut self.adoption,
            RiskCategory::Financial => &mut self.financial,
            RiskCategory::Technical => &mut self.technical,
            RiskCategory::Operational => &mut self.operational,
            RiskCategory::Social => &mut self.social,
            RiskCategory::Engagement => &mut self.engagement,
        };
        *slot = weight;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSetting {
    pub enabled: bool,
    pub weight: f64,
}

impl IndicatorSetting {
    /// Reads a tracking-maturity answer such as "Actively tracked in CRM".
    pub fn from_answer(text: &str) -> Self {
        let enabled = !contains_any(text, &["Not", "No -"]);
        let weight = if contains_any(text, &["Actively", "Automated", "Regular"]) {
            1.2
        } else if contains_any(text, &["Partially", "Manual", "Ad-hoc"]) {
            1.0
        } else {
            0.8
        };
        Self { enabled, weight }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoActionItems {
    Always,
    Critical,
    Never,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessmentConfig {
    pub client_type: ClientType,
    pub category_weights: CategoryWeights,
    pub indicator_settings: BTreeMap<String, IndicatorSetting>,
    pub risk_threshold: u8,
    pub auto_action_items: AutoActionItems,
    pub primary_use_case: String,
}

impl Default for RiskAssessmentConfig {
    fn default() -> Self {
        Self {
            client_type: ClientType::B2bEnterprise,
            category_weights: CategoryWeights::default(),
            indicator_settings: BTreeMap::new(),
            risk_threshold: 60,
            auto_action_items: AutoActionItems::Always,
            primary_use_case: "Portfolio health monitoring".to_string(),
        }
    }
}

const CLIENT_TYPE_KEYWORDS: &[(&str, ClientType)] = &[
    ("enterprise", ClientType::B2bEnterprise),
    ("smb", ClientType::B2bSmb),
    ("mid market", ClientType::B2bSmb),
    ("midmarket", ClientType::B2bSmb),
    ("b2c", ClientType::B2c),
    ("consumer", ClientType::B2c),
];

const AUTO_ACTION_KEYWORDS: &[(&str, AutoActionItems)] = &[
    ("Always", AutoActionItems::Always),
    ("Only for critical", AutoActionItems::Critical),
];

/// Importance questions, the category each sets, and the sibling category
/// that follows it.
const IMPORTANCE_FIELDS: &[(&str, RiskCategory, Option<RiskCategory>)] = &[
    ("relationship_importance", RiskCategory::Relationship, None),
    ("adoption_importance", RiskCategory::Adoption, None),
    ("financial_importance", RiskCategory::Financial, None),
    (
        "technical_importance",
        RiskCategory::Technical,
        Some(RiskCategory::Operational),
    ),
    (
        "social_importance",
        RiskCategory::Social,
        Some(RiskCategory::Engagement),
    ),
];

impl DiscoveryConfig for RiskAssessmentConfig {
    const TOOL: ToolKind = ToolKind::RiskAssessment;

    fn apply(&mut self, resolver: &mut FieldResolver<'_>) {
        if let Some(answer) = resolver.answer("client_type") {
            match answer.as_text() {
                Some(text) => match match_keyword(&text.to_lowercase(), CLIENT_TYPE_KEYWORDS) {
                    Some(client_type) => self.client_type = client_type,
                    None => resolver.note(
                        "client_type",
                        IssueKind::UnmatchedKeyword,
                        format!("'{text}' names no known client type"),
                    ),
                },
                None => resolver.note_unexpected("client_type", "text", answer),
            }
        }

        self.apply_importance(resolver);
        self.apply_indicators(resolver);

        if let Some(answer) = resolver.answer("risk_threshold") {
            match answer.as_number() {
                Some(value) => self.risk_threshold = value.round().clamp(0.0, 100.0) as u8,
                None => resolver.note_unexpected("risk_threshold", "number", answer),
            }
        }

        if let Some(answer) = resolver.answer("auto_action_items") {
            match answer.as_text() {
                Some(text) => {
                    self.auto_action_items =
                        match_keyword(text, AUTO_ACTION_KEYWORDS).unwrap_or(AutoActionItems::Never);
                }
                None => resolver.note_unexpected("auto_action_items", "text", answer),
            }
        }

        if let Some(answer) = resolver.answer("primary_use_case") {
            match answer.as_text() {
                Some(text) => self.primary_use_case = text.to_string(),
                None => resolver.note_unexpected("primary_use_case", "text", answer),
            }
        }
    }
}

impl RiskAssessmentConfig {
    fn apply_importance(&mut self, resolver: &mut FieldResolver<'_>) {
        for (field, category, linked) in IMPORTANCE_FIELDS {
            let Some(answer) = resolver.answer(field) else {
                continue;
            };

            let multiplier = match answer {
                AnswerValue::Number(value) => slider_to_multiplier(*value),
                AnswerValue::Text(label) => importance_multiplier(label).unwrap_or_else(|| {
                    resolver.note(
                        field,
                        IssueKind::UnknownLabel,
                        format!("'{label}' is not an importance level, using 1.0"),
                    );
                    1.0
                }),
                AnswerValue::Null => continue,
                AnswerValue::List(_) | AnswerValue::Other(_) => {
                    resolver.note_unexpected(field, "number or text", answer);
                    1.0
                }
            };

            self.category_weights.set(*category, multiplier);
            if let Some(linked) = linked {
                self.category_weights.set(*linked, multiplier);
            }
        }
    }

    fn apply_indicators(&mut self, resolver: &mut FieldResolver<'_>) {
        let answered: Vec<(&str, &AnswerValue)> = resolver.indicators().collect();

        for (indicator, answer) in answered {
            let Some(text) = answer.as_text() else {
                resolver.note_unexpected(indicator, "text", answer);
                continue;
            };

            if self.indicator_settings.contains_key(indicator) {
                resolver.note(
                    indicator,
                    IssueKind::DuplicateMapping,
                    "indicator answered more than once; the first in template order was used",
                );
                continue;
            }

            self.indicator_settings
                .insert(indicator.to_string(), IndicatorSetting::from_answer(text));
        }
    }

    /// Weight multiplier for a category name; unknown names weigh 1.0.
    pub fn category_weight_adjustment(&self, category: &str) -> f64 {
        RiskCategory::from_name(category)
            .map(|category| self.category_weights.get(category))
            .filter(|weight| *weight != 0.0)
            .unwrap_or(1.0)
    }

    /// Indicators without a setting stay enabled.
    pub fn is_indicator_enabled(&self, indicator_id: &str) -> bool {
        self.indicator_settings
            .get(indicator_id)
            .map(|setting| setting.enabled)
            .unwrap_or(true)
    }

    pub fn indicator_weight_adjustment(&self, indicator_id: &str) -> f64 {
        self.indicator_settings
            .get(indicator_id)
            .map(|setting| setting.weight)
            .filter(|weight| *weight != 0.0)
            .unwrap_or(1.0)
    }
}
