use crate::discovery::normalizer::round_half_up;
use crate::discovery::risk::{ClientType, RiskAssessmentConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorTrend {
    Improving,
    Stable,
    Declining,
}

/// One measured health signal. Health is `current_value / target_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskIndicator {
    pub id: String,
    pub name: String,
    pub category: String,
    pub current_value: f64,
    pub target_value: f64,
    pub weight: f64,
    pub trend: IndicatorTrend,
}

impl RiskIndicator {
    /// Health as a percentage of target; a non-positive target reads as fully healthy.
    pub fn health_percent(&self) -> f64 {
        if self.target_value <= 0.0 {
            return 100.0;
        }
        self.current_value / self.target_value * 100.0
    }
}

type IndicatorSeed = (&'static str, &'static str, &'static str, f64, f64, IndicatorTrend);

const B2B_ENTERPRISE: &[IndicatorSeed] = &[
    ("contract_value_risk", "Contract Value at Risk", "Financial", 85.0, 20.0, IndicatorTrend::Stable),
    ("executive_engagement", "Executive Sponsor Engagement", "Relationship", 60.0, 15.0, IndicatorTrend::Declining),
    ("product_adoption", "Product Adoption Rate", "Adoption", 72.0, 15.0, IndicatorTrend::Improving),
    ("integration_health", "Integration Health", "Technical", 90.0, 10.0, IndicatorTrend::Stable),
    ("support_satisfaction", "Support Satisfaction", "Operational", 78.0, 10.0, IndicatorTrend::Stable),
    ("nps_score", "NPS Score", "Relationship", 45.0, 10.0, IndicatorTrend::Improving),
    ("feature_utilization", "Feature Utilization", "Adoption", 55.0, 10.0, IndicatorTrend::Declining),
    ("time_to_value", "Time to Value Achievement", "Operational", 80.0, 10.0, IndicatorTrend::Stable),
];

const B2B_SMB: &[IndicatorSeed] = &[
    ("champion_strength", "Champion Strength", "Relationship", 70.0, 15.0, IndicatorTrend::Stable),
    ("communication_frequency", "Communication Frequency", "Relationship", 65.0, 10.0, IndicatorTrend::Declining),
    ("executive_sentiment", "Executive Sentiment", "Relationship", 75.0, 10.0, IndicatorTrend::Stable),
    ("monthly_usage", "Monthly Active Usage", "Adoption", 75.0, 20.0, IndicatorTrend::Stable),
    ("payment_health", "Payment Health", "Financial", 95.0, 15.0, IndicatorTrend::Stable),
    ("onboarding_completion", "Onboarding Completion", "Operational", 85.0, 10.0, IndicatorTrend::Stable),
    ("support_tickets", "Support Ticket Trend", "Operational", 70.0, 10.0, IndicatorTrend::Improving),
    ("key_feature_adoption", "Key Feature Adoption", "Adoption", 60.0, 10.0, IndicatorTrend::Declining),
];

const B2C: &[IndicatorSeed] = &[
    ("monthly_logins", "Monthly Logins", "Adoption", 72.0, 20.0, IndicatorTrend::Stable),
    ("website_visits", "Website Visits", "Social", 65.0, 15.0, IndicatorTrend::Stable),
    ("social_media_engagement", "Social Media Engagement", "Social", 55.0, 15.0, IndicatorTrend::Improving),
    ("meeting_frequency", "Meeting Frequency", "Social", 60.0, 10.0, IndicatorTrend::Declining),
    ("user_engagement", "User Engagement Score", "Engagement", 68.0, 15.0, IndicatorTrend::Stable),
    ("ltv_trajectory", "LTV Trajectory", "Financial", 82.0, 15.0, IndicatorTrend::Stable),
    ("subscription_health", "Subscription Health", "Financial", 90.0, 10.0, IndicatorTrend::Stable),
];

/// Starting indicator set for a client type, each measured against a target of 100.
pub fn default_indicators(client_type: ClientType) -> Vec<RiskIndicator> {
    let seeds = match client_type {
        ClientType::B2bEnterprise => B2B_ENTERPRISE,
        ClientType::B2bSmb => B2B_SMB,
        ClientType::B2c => B2C,
    };

    seeds
        .iter()
        .map(|&(id, name, category, current_value, weight, trend)| RiskIndicator {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            current_value,
            target_value: 100.0,
            weight,
            trend,
        })
        .collect()
}

/// Scales each weight by its category multiplier (rounded) and drops
/// indicators the assessment disabled.
pub fn apply_weight_adjustments(
    indicators: &[RiskIndicator],
    config: &RiskAssessmentConfig,
) -> Vec<RiskIndicator> {
    indicators
        .iter()
        .filter(|indicator| config.is_indicator_enabled(&indicator.id))
        .map(|indicator| RiskIndicator {
            weight: round_half_up(
                indicator.weight * config.category_weight_adjustment(&indicator.category),
            ),
            ..indicator.clone()
        })
        .collect()
}

/// `100 - weighted average health`, clamped to 0..=100. With no weight at
/// all the score sits at the neutral 50.
pub fn overall_risk_score(indicators: &[RiskIndicator]) -> f64 {
    let total_weight: f64 = indicators.iter().map(|indicator| indicator.weight).sum();
    if total_weight == 0.0 {
        return 50.0;
    }

    let weighted_health: f64 = indicators
        .iter()
        .map(|indicator| indicator.health_percent() * indicator.weight)
        .sum();

    (100.0 - weighted_health / total_weight).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthLevel {
    ExtremelyHighRisk,
    HighRisk,
    MediumRisk,
    Healthy,
    VeryHealthy,
}

impl HealthLevel {
    pub fn from_score(risk_score: f64) -> Self {
        if risk_score >= 90.0 {
            Self::ExtremelyHighRisk
        } else if risk_score >= 69.0 {
            Self::HighRisk
        } else if risk_score >= 39.0 {
            Self::MediumRisk
        } else if risk_score >= 20.0 {
            Self::Healthy
        } else {
            Self::VeryHealthy
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ExtremelyHighRisk => "Extremely High Risk",
            Self::HighRisk => "High Risk",
            Self::MediumRisk => "Medium Risk",
            Self::Healthy => "Healthy",
            Self::VeryHealthy => "Very Healthy",
        }
    }
}
