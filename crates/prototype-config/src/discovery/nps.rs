//! NPS-driven account management hub settings.
//!
//! The hub does not collect surveys; it decides how ingested NPS responses
//! drive account prioritisation, risk flags, and follow-up work.

use super::normalizer::{lookup, open_range_lower_bound, range_bounds, range_upper_bound};
use super::report::IssueKind;
use super::resolver::FieldResolver;
use super::{DiscoveryConfig, ToolKind};
use serde::{Deserialize, Serialize};

/// How a detractor response turns into an at-risk flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskFlagTrigger {
    AnyDetractor,
    ConsecutiveLowScores,
    DropOfPoints,
    ManualReviewOnly,
    Other(String),
}

impl RiskFlagTrigger {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Any detractor score" => Self::AnyDetractor,
            "Consecutive low scores" => Self::ConsecutiveLowScores,
            "Drop of X points" => Self::DropOfPoints,
            "Manual review only" => Self::ManualReviewOnly,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::AnyDetractor => "Any detractor score",
            Self::ConsecutiveLowScores => "Consecutive low scores",
            Self::DropOfPoints => "Drop of X points",
            Self::ManualReviewOnly => "Manual review only",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for RiskFlagTrigger {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<RiskFlagTrigger> for String {
    fn from(value: RiskFlagTrigger) -> Self {
        value.label().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpsHubConfig {
    pub nps_source_tool: String,
    pub integration_method: String,
    pub available_fields: Vec<String>,

    pub nps_priority_influence: String,
    pub risk_flag_trigger: RiskFlagTrigger,
    pub risk_drop_threshold: u8,
    pub nps_renewal_impact: String,

    pub at_risk_threshold: u8,
    pub neutral_min_threshold: u8,
    pub neutral_max_threshold: u8,
    pub healthy_min_threshold: u8,

    pub detractor_action: String,
    pub followup_owner: String,
    pub followup_sla: String,
    pub followup_sla_days: u32,
    pub track_recovery: bool,

    pub visible_account_attributes: Vec<String>,
    pub required_account_attributes: Vec<String>,

    pub rep_views: Vec<String>,
    pub manager_views: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for NpsHubConfig {
    fn default() -> Self {
        Self {
            nps_source_tool: "Other".to_string(),
            integration_method: "Manual entry (fallback)".to_string(),
            available_fields: strings(&["Score (0-10)", "Response date", "Account identifier"]),
            nps_priority_influence: "Primary signal".to_string(),
            risk_flag_trigger: RiskFlagTrigger::AnyDetractor,
            risk_drop_threshold: DEFAULT_DROP_THRESHOLD,
            nps_renewal_impact: "Yes, as one input".to_string(),
            at_risk_threshold: 6,
            neutral_min_threshold: 7,
            neutral_max_threshold: 8,
            healthy_min_threshold: 9,
            detractor_action: "All of the above".to_string(),
            followup_owner: "Account owner".to_string(),
            followup_sla: "2 business days".to_string(),
            followup_sla_days: DEFAULT_SLA_DAYS,
            track_recovery: true,
            visible_account_attributes: strings(&[
                "Account owner",
                "ARR / contract value",
                "Renewal date",
            ]),
            required_account_attributes: Vec::new(),
            rep_views: strings(&[
                "My at-risk accounts",
                "Recent detractors",
                "Upcoming renewals with low NPS",
            ]),
            manager_views: strings(&["NPS by owner", "At-risk accounts by team"]),
        }
    }
}

const DEFAULT_DROP_THRESHOLD: u8 = 3;
const DEFAULT_SLA_DAYS: u32 = 2;
const DETRACTOR_MAX_SCORE: u8 = 6;
const MAX_NPS_SCORE: u8 = 10;

const SLA_DAYS: &[(&str, u32)] = &[
    ("Same day", 1),
    ("2 business days", 2),
    ("5 business days", 5),
    ("No SLA", 0),
];

/// Attribute keys used by the hub and the labels the questionnaire shows.
pub const ACCOUNT_ATTRIBUTES: &[(&str, &str)] = &[
    ("account_owner", "Account owner"),
    ("arr", "ARR / contract value"),
    ("renewal_date", "Renewal date"),
    ("segment", "Segment"),
    ("product", "Product(s)"),
    ("lifecycle_stage", "Lifecycle stage"),
];

const ESSENTIAL_REP_VIEWS: &[&str] = &["My at-risk accounts", "Recent detractors"];

const STRICTEST_PROMOTER_LABEL: &str = "10 only (Strictest)";

impl DiscoveryConfig for NpsHubConfig {
    const TOOL: ToolKind = ToolKind::Nps;

    fn apply(&mut self, resolver: &mut FieldResolver<'_>) {
        if let Some(value) = resolver.text("nps_source_tool") {
            self.nps_source_tool = value;
        }
        if let Some(value) = resolver.text("integration_method") {
            self.integration_method = value;
        }
        if let Some(values) = resolver.list("available_fields") {
            self.available_fields = values;
        }

        if let Some(value) = resolver.text("nps_priority_influence") {
            self.nps_priority_influence = value;
        }
        if let Some(value) = resolver.text("risk_flag_trigger") {
            self.risk_flag_trigger = RiskFlagTrigger::from_label(&value);
            if let RiskFlagTrigger::Other(label) = &self.risk_flag_trigger {
                resolver.note(
                    "risk_flag_trigger",
                    IssueKind::UnknownLabel,
                    format!("'{label}' is not a known trigger; detractor scores will be flagged"),
                );
            }
        }
        if let Some(value) = resolver.text("nps_renewal_impact") {
            self.nps_renewal_impact = value;
        }

        self.apply_thresholds(resolver);

        if let Some(value) = resolver.text("detractor_action") {
            self.detractor_action = value;
        }
        if let Some(value) = resolver.text("followup_owner") {
            self.followup_owner = value;
        }
        if let Some(label) = resolver.text("followup_sla") {
            self.followup_sla_days = match lookup(&label, SLA_DAYS) {
                Some(days) => days,
                None => {
                    resolver.note(
                        "followup_sla",
                        IssueKind::UnknownLabel,
                        format!("'{label}' has no SLA mapping, using {DEFAULT_SLA_DAYS} days"),
                    );
                    DEFAULT_SLA_DAYS
                }
            };
            self.followup_sla = label;
        }
        if let Some(answer) = resolver.answer("track_recovery") {
            self.track_recovery = answer.as_text() == Some("Yes");
        }

        if let Some(values) = resolver.list("visible_account_attributes") {
            self.visible_account_attributes = values;
        }
        if let Some(values) = resolver.list("required_account_attributes") {
            self.required_account_attributes = values;
        }

        if let Some(values) = resolver.list("rep_views") {
            self.rep_views = values;
        }
        if let Some(values) = resolver.list("manager_views") {
            self.manager_views = values;
        }
    }
}

impl NpsHubConfig {
    fn apply_thresholds(&mut self, resolver: &mut FieldResolver<'_>) {
        if let Some(text) = resolver.pattern_text("at_risk_threshold") {
            match range_upper_bound(text) {
                Some(max) => {
                    if let Some(max) = on_scale(resolver, "at_risk_threshold", text, max) {
                        self.at_risk_threshold = max;
                    }
                }
                None => resolver.note(
                    "at_risk_threshold",
                    IssueKind::UnparsedRange,
                    format!("'{text}' does not contain a 0-N range"),
                ),
            }
        }

        if let Some(text) = resolver.pattern_text("neutral_threshold_range") {
            match range_bounds(text) {
                Some((min, max)) => {
                    let field = "neutral_threshold_range";
                    if let (Some(min), Some(max)) = (
                        on_scale(resolver, field, text, min),
                        on_scale(resolver, field, text, max),
                    ) {
                        self.neutral_min_threshold = min;
                        self.neutral_max_threshold = max;
                    }
                }
                None => resolver.note(
                    "neutral_threshold_range",
                    IssueKind::UnparsedRange,
                    format!("'{text}' does not contain an N-M range"),
                ),
            }
        }

        if let Some(text) = resolver.pattern_text("healthy_min_threshold") {
            if let Some(min) = open_range_lower_bound(text) {
                if let Some(min) = on_scale(resolver, "healthy_min_threshold", text, min) {
                    self.healthy_min_threshold = min;
                }
            } else if text == STRICTEST_PROMOTER_LABEL {
                self.healthy_min_threshold = 10;
            } else {
                resolver.note(
                    "healthy_min_threshold",
                    IssueKind::UnparsedRange,
                    format!("'{text}' does not contain an N+ range"),
                );
            }
        }
    }

    /// Rep-facing view toggle; the essential views are always shown.
    pub fn should_show_view(&self, view: &str) -> bool {
        self.rep_views.iter().any(|entry| entry == view) || ESSENTIAL_REP_VIEWS.contains(&view)
    }

    pub fn should_show_manager_view(&self, view: &str) -> bool {
        self.manager_views.iter().any(|entry| entry == view)
    }

    /// Unknown attribute keys are shown by default.
    pub fn should_show_attribute(&self, attribute_key: &str) -> bool {
        match attribute_display_name(attribute_key) {
            Some(display) => self
                .visible_account_attributes
                .iter()
                .any(|entry| entry == display),
            None => true,
        }
    }

    /// Unknown attribute keys are never required.
    pub fn is_attribute_required(&self, attribute_key: &str) -> bool {
        match attribute_display_name(attribute_key) {
            Some(display) => self
                .required_account_attributes
                .iter()
                .any(|entry| entry == display),
            None => false,
        }
    }

    pub fn followup_sla_days(&self) -> u32 {
        self.followup_sla_days
    }
}

pub fn attribute_display_name(attribute_key: &str) -> Option<&'static str> {
    lookup(attribute_key, ACCOUNT_ATTRIBUTES)
}

/// Decides whether a response should flag its account as at risk.
///
/// Without a configuration any detractor score is flagged. `Drop of X
/// points` compares against the previous score when one exists and
/// otherwise behaves like the detractor rule. `Manual review only` never
/// flags automatically.
pub fn should_flag_as_risk(
    score: u8,
    previous_score: Option<u8>,
    config: Option<&NpsHubConfig>,
) -> bool {
    let is_detractor = score <= DETRACTOR_MAX_SCORE;
    let Some(config) = config else {
        return is_detractor;
    };

    match &config.risk_flag_trigger {
        RiskFlagTrigger::AnyDetractor | RiskFlagTrigger::ConsecutiveLowScores => is_detractor,
        RiskFlagTrigger::DropOfPoints => match previous_score {
            Some(previous) => {
                i16::from(previous) - i16::from(score) >= i16::from(config.risk_drop_threshold)
            }
            None => is_detractor,
        },
        RiskFlagTrigger::ManualReviewOnly => false,
        RiskFlagTrigger::Other(_) => is_detractor,
    }
}

/// Range bound as an NPS score, noting bounds beyond the 0-10 scale.
fn on_scale(resolver: &mut FieldResolver<'_>, field: &str, text: &str, bound: u32) -> Option<u8> {
    match u8::try_from(bound) {
        Ok(score) if score <= MAX_NPS_SCORE => Some(score),
        _ => {
            resolver.note(
                field,
                IssueKind::OutOfScale,
                format!("'{text}' names {bound}, outside the 0-{MAX_NPS_SCORE} score scale"),
            );
            None
        }
    }
}
