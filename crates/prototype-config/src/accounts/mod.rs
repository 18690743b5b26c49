//! Account-level data the configured tools operate on, with the portfolio
//! aggregates each dashboard shows.

pub mod import;
pub mod nps;
pub mod renewal;
pub mod risk;
pub mod template;

pub use import::{AccountImportError, NpsAccountImporter};
pub use nps::{
    at_risk_arr, category_percentages, composite_score, followup_queue, CategoryPercentages,
    NpsAccount, NpsCategory, NpsTrend,
};
pub use renewal::{RenewalAccount, RenewalMetrics, RenewalOutcome};
pub use risk::{
    apply_weight_adjustments, default_indicators, overall_risk_score, HealthLevel,
    IndicatorTrend, RiskIndicator,
};
pub use template::{csv_template, template_columns};
