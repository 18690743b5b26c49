use super::normalizer::round_half_up;
use super::resolver::FieldResolver;
use super::{DiscoveryConfig, ToolKind};
use serde::{Deserialize, Serialize};

/// Renewal tracker settings: data sources, pipeline timing, risk factors,
/// outcome metrics, and team workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalTrackerConfig {
    pub crm_source: String,
    pub integration_method: String,
    pub available_fields: Vec<String>,

    pub renewal_pipeline_days: i64,
    pub renewal_milestones: Vec<String>,
    pub auto_enter_pipeline: String,
    pub outreach_days: i64,

    pub risk_factors: Vec<String>,
    pub risk_threshold: i64,
    pub health_score_influence: String,

    pub outcome_types: Vec<String>,
    pub kpi_metrics: Vec<String>,
    pub track_expansion_separately: String,

    pub renewal_owner_role: String,
    pub renewal_actions: Vec<String>,
    pub manager_views: Vec<String>,
}

pub const DEFAULT_PIPELINE_DAYS: i64 = 90;
pub const DEFAULT_OUTREACH_DAYS: i64 = 30;
pub const DEFAULT_RISK_THRESHOLD: i64 = 60;

const CRITICAL_WINDOW_DAYS: i64 = 30;
const ACTIVE_WINDOW_DAYS: i64 = 60;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

impl Default for RenewalTrackerConfig {
    fn default() -> Self {
        Self {
            crm_source: "Other".to_string(),
            integration_method: "CSV upload".to_string(),
            available_fields: strings(&["Contract end date", "ARR/MRR", "Account owner"]),
            renewal_pipeline_days: DEFAULT_PIPELINE_DAYS,
            renewal_milestones: strings(&[
                "90-day check-in",
                "60-day QBR/value review",
                "30-day renewal call",
                "Contract signed",
            ]),
            auto_enter_pipeline: "Yes, auto-enter based on contract end date".to_string(),
            outreach_days: DEFAULT_OUTREACH_DAYS,
            risk_factors: strings(&[
                "Low NPS/CSAT score",
                "Declining product usage",
                "No executive sponsor",
            ]),
            risk_threshold: DEFAULT_RISK_THRESHOLD,
            health_score_influence: "Health score is one of several inputs".to_string(),
            outcome_types: strings(&[
                "Renewed (same value)",
                "Expanded (upsell)",
                "Churned (full)",
            ]),
            kpi_metrics: strings(&[
                "Gross Revenue Retention (GRR)",
                "Net Revenue Retention (NRR)",
                "Logo retention rate",
            ]),
            track_expansion_separately: "Track both - expansion and total renewal value"
                .to_string(),
            renewal_owner_role: "Customer Success Manager".to_string(),
            renewal_actions: strings(&[
                "Create renewal task",
                "Notify account owner",
                "Schedule QBR meeting",
            ]),
            manager_views: strings(&[
                "Renewals by owner",
                "At-risk renewals by ARR",
                "Monthly/quarterly forecast",
            ]),
        }
    }
}

impl DiscoveryConfig for RenewalTrackerConfig {
    const TOOL: ToolKind = ToolKind::Renewal;

    fn apply(&mut self, resolver: &mut FieldResolver<'_>) {
        if let Some(value) = resolver.text("crm_source") {
            self.crm_source = value;
        }
        if let Some(value) = resolver.text("integration_method") {
            self.integration_method = value;
        }
        if let Some(values) = resolver.list("available_fields") {
            self.available_fields = values;
        }

        if let Some(days) = resolver.integer_or("renewal_pipeline_days", DEFAULT_PIPELINE_DAYS) {
            self.renewal_pipeline_days = days;
        }
        if let Some(values) = resolver.list("renewal_milestones") {
            self.renewal_milestones = values;
        }
        if let Some(value) = resolver.text("auto_enter_pipeline") {
            self.auto_enter_pipeline = value;
        }
        if let Some(days) = resolver.integer_or("outreach_days", DEFAULT_OUTREACH_DAYS) {
            self.outreach_days = days;
        }

        if let Some(values) = resolver.list("risk_factors") {
            self.risk_factors = values;
        }
        if let Some(threshold) = resolver.integer_or("risk_threshold", DEFAULT_RISK_THRESHOLD) {
            self.risk_threshold = threshold;
        }
        if let Some(value) = resolver.text("health_score_influence") {
            self.health_score_influence = value;
        }

        if let Some(values) = resolver.list("outcome_types") {
            self.outcome_types = values;
        }
        if let Some(values) = resolver.list("kpi_metrics") {
            self.kpi_metrics = values;
        }
        if let Some(value) = resolver.text("track_expansion_separately") {
            self.track_expansion_separately = value;
        }

        if let Some(value) = resolver.text("renewal_owner_role") {
            self.renewal_owner_role = value;
        }
        if let Some(values) = resolver.list("renewal_actions") {
            self.renewal_actions = values;
        }
        if let Some(values) = resolver.list("manager_views") {
            self.manager_views = values;
        }
    }
}

impl RenewalTrackerConfig {
    /// Pipeline window in days; an unset (zero) window uses the default.
    pub fn pipeline_days(&self) -> i64 {
        non_zero_or(self.renewal_pipeline_days, DEFAULT_PIPELINE_DAYS)
    }

    pub fn effective_risk_threshold(&self) -> i64 {
        non_zero_or(self.risk_threshold, DEFAULT_RISK_THRESHOLD)
    }

    pub fn should_show_manager_view(&self, view: &str) -> bool {
        self.manager_views.iter().any(|entry| entry == view)
    }

    pub fn should_show_kpi(&self, kpi: &str) -> bool {
        self.kpi_metrics.iter().any(|entry| entry == kpi)
    }
}

fn non_zero_or(value: i64, fallback: i64) -> i64 {
    if value == 0 {
        fallback
    } else {
        value
    }
}

/// Position of an account in the renewal pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalStage {
    Overdue,
    Critical,
    Active,
    Upcoming,
    Future,
}

impl RenewalStage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::Critical => "Critical",
            Self::Active => "Active",
            Self::Upcoming => "Upcoming",
            Self::Future => "Future",
        }
    }

    pub const fn ordered() -> [RenewalStage; 5] {
        [
            Self::Overdue,
            Self::Critical,
            Self::Active,
            Self::Upcoming,
            Self::Future,
        ]
    }
}

/// Buckets are checked in ascending order with inclusive upper bounds.
pub fn renewal_stage(days_to_renewal: i64, config: Option<&RenewalTrackerConfig>) -> RenewalStage {
    let pipeline_days = config
        .map(RenewalTrackerConfig::pipeline_days)
        .unwrap_or(DEFAULT_PIPELINE_DAYS);

    if days_to_renewal < 0 {
        RenewalStage::Overdue
    } else if days_to_renewal <= CRITICAL_WINDOW_DAYS {
        RenewalStage::Critical
    } else if days_to_renewal <= ACTIVE_WINDOW_DAYS {
        RenewalStage::Active
    } else if days_to_renewal <= pipeline_days {
        RenewalStage::Upcoming
    } else {
        RenewalStage::Future
    }
}

/// Equal weight per configured factor: `round(matching * 100 / configured)`.
/// Without a configuration the default factor list is used.
pub fn calculate_risk_score<S: AsRef<str>>(
    present_factors: &[S],
    config: Option<&RenewalTrackerConfig>,
) -> u32 {
    let defaults;
    let configured = match config {
        Some(config) => &config.risk_factors,
        None => {
            defaults = RenewalTrackerConfig::default().risk_factors;
            &defaults
        }
    };

    if configured.is_empty() {
        return 0;
    }

    let factor_weight = 100.0 / configured.len() as f64;
    let matching = present_factors
        .iter()
        .filter(|factor| {
            let factor: &str = (*factor).as_ref();
            configured.iter().any(|entry| entry == factor)
        })
        .count();

    round_half_up(matching as f64 * factor_weight) as u32
}

pub fn should_flag_as_risk(risk_score: u32, config: Option<&RenewalTrackerConfig>) -> bool {
    let threshold = config
        .map(RenewalTrackerConfig::effective_risk_threshold)
        .unwrap_or(DEFAULT_RISK_THRESHOLD);
    i64::from(risk_score) >= threshold
}

/// Milestones in configured order, falling back to the defaults when none are set.
pub fn renewal_milestones(config: Option<&RenewalTrackerConfig>) -> Vec<String> {
    match config {
        Some(config) => config.renewal_milestones.clone(),
        None => RenewalTrackerConfig::default().renewal_milestones,
    }
}
