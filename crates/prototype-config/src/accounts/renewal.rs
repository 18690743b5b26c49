use crate::discovery::normalizer::round_half_up;
use crate::discovery::renewal::{
    renewal_stage, should_flag_as_risk, RenewalStage, RenewalTrackerConfig,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Recorded result of a completed renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalOutcome {
    Renewed,
    Expanded,
    Downgraded,
    Churned,
    PartialChurn,
    Delayed,
    EarlyRenewal,
    Other,
}

impl RenewalOutcome {
    /// Case-insensitive match on the outcome labels the tracker records.
    pub fn classify(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "renewed" | "renewed (same value)" => Self::Renewed,
            "expanded" | "expanded (upsell)" => Self::Expanded,
            "downgraded" | "downgraded (contraction)" => Self::Downgraded,
            "churned" | "churned (full)" => Self::Churned,
            "partial churn" => Self::PartialChurn,
            "delayed" | "delayed/extended" => Self::Delayed,
            "early renewal" => Self::EarlyRenewal,
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Renewed => "Renewed",
            Self::Expanded => "Expanded",
            Self::Downgraded => "Downgraded",
            Self::Churned => "Churned",
            Self::PartialChurn => "Partial churn",
            Self::Delayed => "Delayed",
            Self::EarlyRenewal => "Early renewal",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalAccount {
    pub id: String,
    pub name: String,
    pub arr: f64,
    pub contract_end: NaiveDate,
    pub days_to_renewal: i64,
    pub risk_score: u32,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub expansion_arr: Option<f64>,
    #[serde(default)]
    pub owner: Option<String>,
}

impl RenewalAccount {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arr: f64,
        contract_end: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arr,
            contract_end,
            days_to_renewal: (contract_end - today).num_days(),
            risk_score: 0,
            risk_factors: Vec::new(),
            outcome: None,
            expansion_arr: None,
            owner: None,
        }
    }

    pub fn with_risk_score(mut self, risk_score: u32) -> Self {
        self.risk_score = risk_score;
        self
    }

    pub fn with_outcome(mut self, outcome: impl Into<String>, expansion_arr: Option<f64>) -> Self {
        self.outcome = Some(outcome.into());
        self.expansion_arr = expansion_arr;
        self
    }

    /// A renewal stays open until a non-blank outcome is recorded.
    pub fn is_open(&self) -> bool {
        self.outcome
            .as_deref()
            .map_or(true, |outcome| outcome.trim().is_empty())
    }

    pub fn stage(&self, config: Option<&RenewalTrackerConfig>) -> RenewalStage {
        renewal_stage(self.days_to_renewal, config)
    }

    fn outcome_mentions(&self, keyword: &str) -> bool {
        self.outcome
            .as_deref()
            .map(|outcome| outcome.contains(keyword))
            .unwrap_or(false)
    }
}

/// Portfolio roll-up shown on the renewal dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenewalMetrics {
    pub total_arr: f64,
    pub renewing_arr: f64,
    pub at_risk_arr: f64,
    pub at_risk_count: usize,
    pub grr: u32,
    pub nrr: u32,
    pub logo_retention: u32,
    pub renewed_count: usize,
    pub churned_count: usize,
    pub upcoming_count: usize,
    pub critical_count: usize,
    pub expansion_arr: f64,
}

impl RenewalMetrics {
    /// Retention rates are rounded percentages and read 100 until some
    /// renewal has completed. An empty portfolio yields all zeros.
    pub fn compute(accounts: &[RenewalAccount], config: &RenewalTrackerConfig) -> Self {
        if accounts.is_empty() {
            return Self::default();
        }

        let pipeline_days = config.pipeline_days();
        let renewing: Vec<&RenewalAccount> = accounts
            .iter()
            .filter(|account| account.days_to_renewal > 0 && account.days_to_renewal <= pipeline_days)
            .collect();
        let at_risk: Vec<&RenewalAccount> = accounts
            .iter()
            .filter(|account| account.is_open() && should_flag_as_risk(account.risk_score, Some(config)))
            .collect();
        let completed: Vec<&RenewalAccount> =
            accounts.iter().filter(|account| !account.is_open()).collect();
        let renewed: Vec<&RenewalAccount> = completed
            .iter()
            .copied()
            .filter(|account| account.outcome_mentions("Renewed") || account.outcome_mentions("Expanded"))
            .collect();
        let churned: Vec<&RenewalAccount> = completed
            .iter()
            .copied()
            .filter(|account| account.outcome_mentions("Churned"))
            .collect();
        let critical_count = accounts
            .iter()
            .filter(|account| account.is_open() && account.stage(Some(config)) == RenewalStage::Critical)
            .count();

        let renewed_arr = sum_arr(&renewed);
        let churned_arr = sum_arr(&churned);
        let expansion_arr: f64 = accounts
            .iter()
            .filter(|account| account.outcome_mentions("Expanded"))
            .map(|account| account.expansion_arr.unwrap_or(0.0))
            .sum();

        let completed_arr = renewed_arr + churned_arr;
        let (grr, nrr) = if completed_arr > 0.0 {
            (
                percentage(renewed_arr, completed_arr),
                percentage(renewed_arr + expansion_arr, completed_arr),
            )
        } else {
            (100, 100)
        };
        let logo_retention = if completed.is_empty() {
            100
        } else {
            percentage(renewed.len() as f64, completed.len() as f64)
        };

        Self {
            total_arr: accounts.iter().map(|account| account.arr).sum(),
            renewing_arr: sum_arr(&renewing),
            at_risk_arr: sum_arr(&at_risk),
            at_risk_count: at_risk.len(),
            grr,
            nrr,
            logo_retention,
            renewed_count: renewed.len(),
            churned_count: churned.len(),
            upcoming_count: renewing.len(),
            critical_count,
            expansion_arr,
        }
    }
}

fn sum_arr(accounts: &[&RenewalAccount]) -> f64 {
    accounts.iter().map(|account| account.arr).sum()
}

fn percentage(part: f64, whole: f64) -> u32 {
    round_half_up(part / whole * 100.0).max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).expect("valid date")
    }

    fn account(id: &str, arr: f64, days: u64) -> RenewalAccount {
        let end = today()
            .checked_add_days(chrono::Days::new(days))
            .expect("valid date");
        RenewalAccount::new(id, id, arr, end, today())
    }

    #[test]
    fn outcome_labels_classify_case_insensitively() {
        assert_eq!(RenewalOutcome::classify("Renewed (same value)"), RenewalOutcome::Renewed);
        assert_eq!(RenewalOutcome::classify("EXPANDED"), RenewalOutcome::Expanded);
        assert_eq!(RenewalOutcome::classify("Delayed/extended"), RenewalOutcome::Delayed);
        assert_eq!(RenewalOutcome::classify("partial churn"), RenewalOutcome::PartialChurn);
        assert_eq!(RenewalOutcome::classify("Paused"), RenewalOutcome::Other);
    }

    #[test]
    fn empty_portfolio_has_zero_metrics() {
        let metrics = RenewalMetrics::compute(&[], &RenewalTrackerConfig::default());
        assert_eq!(metrics, RenewalMetrics::default());
        assert_eq!(metrics.grr, 0);
    }

    #[test]
    fn retention_defaults_to_full_before_any_outcome() {
        let accounts = vec![account("open", 10_000.0, 45)];
        let metrics = RenewalMetrics::compute(&accounts, &RenewalTrackerConfig::default());
        assert_eq!(metrics.grr, 100);
        assert_eq!(metrics.nrr, 100);
        assert_eq!(metrics.logo_retention, 100);
        assert_eq!(metrics.upcoming_count, 1);
        assert_eq!(metrics.renewing_arr, 10_000.0);
    }

    #[test]
    fn metrics_roll_up_mixed_portfolio() {
        let config = RenewalTrackerConfig::default();
        let accounts = vec![
            account("critical-risky", 50_000.0, 20).with_risk_score(67),
            account("active", 30_000.0, 45).with_risk_score(33),
            account("future", 20_000.0, 200),
            account("renewed", 100_000.0, 0).with_outcome("Renewed (same value)", None),
            account("expanded", 50_000.0, 0).with_outcome("Expanded (upsell)", Some(25_000.0)),
            account("churned", 50_000.0, 0).with_outcome("Churned (full)", None),
        ];

        let metrics = RenewalMetrics::compute(&accounts, &config);
        assert_eq!(metrics.total_arr, 300_000.0);
        assert_eq!(metrics.renewing_arr, 80_000.0);
        assert_eq!(metrics.at_risk_arr, 50_000.0);
        assert_eq!(metrics.at_risk_count, 1);
        assert_eq!(metrics.critical_count, 1);
        assert_eq!(metrics.renewed_count, 2);
        assert_eq!(metrics.churned_count, 1);
        assert_eq!(metrics.grr, 75);
        assert_eq!(metrics.nrr, 88);
        assert_eq!(metrics.logo_retention, 67);
        assert_eq!(metrics.expansion_arr, 25_000.0);
    }

    #[test]
    fn blank_outcome_keeps_renewal_open() {
        let config = RenewalTrackerConfig::default();
        let accounts = vec![
            account("renewed", 40_000.0, 0).with_outcome("Renewed (same value)", None),
            account("cleared", 60_000.0, 19)
                .with_risk_score(80)
                .with_outcome("  ", None),
        ];

        assert!(accounts[1].is_open());
        let metrics = RenewalMetrics::compute(&accounts, &config);
        assert_eq!(metrics.logo_retention, 100);
        assert_eq!(metrics.at_risk_count, 1);
        assert_eq!(metrics.at_risk_arr, 60_000.0);
        assert_eq!(metrics.critical_count, 1);
    }
}
