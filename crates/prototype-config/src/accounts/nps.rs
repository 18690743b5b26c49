use crate::discovery::normalizer::round_half_up;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpsCategory {
    Promoter,
    Passive,
    Detractor,
}

impl NpsCategory {
    /// Standard NPS bands: 9-10 promoter, 7-8 passive, 0-6 detractor.
    pub const fn from_score(score: u8) -> Self {
        if score >= 9 {
            Self::Promoter
        } else if score >= 7 {
            Self::Passive
        } else {
            Self::Detractor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Promoter => "Promoter",
            Self::Passive => "Passive",
            Self::Detractor => "Detractor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpsTrend {
    Up,
    Down,
    Flat,
}

impl NpsTrend {
    /// A missing or zero previous score reads as flat.
    pub fn from_scores(score: u8, previous_score: Option<u8>) -> Self {
        match previous_score.filter(|previous| *previous != 0) {
            Some(previous) if score > previous => Self::Up,
            Some(previous) if score < previous => Self::Down,
            _ => Self::Flat,
        }
    }
}

/// Latest NPS response for an account together with its follow-up state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpsAccount {
    pub id: String,
    pub name: String,
    pub score: u8,
    pub previous_score: Option<u8>,
    pub category: NpsCategory,
    pub trend: NpsTrend,
    pub arr: f64,
    pub segment: Option<String>,
    pub owner: Option<String>,
    pub contact_name: Option<String>,
    pub lifecycle_stage: Option<String>,
    pub product: Option<String>,
    pub renewal_date: Option<NaiveDate>,
    pub response_date: NaiveDate,
    pub feedback: Option<String>,
    pub flagged: bool,
    pub followup_required: bool,
    pub followup_completed: bool,
    pub followup_due: Option<NaiveDate>,
}

impl NpsAccount {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        score: u8,
        response_date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            score,
            previous_score: None,
            category: NpsCategory::from_score(score),
            trend: NpsTrend::Flat,
            arr: 0.0,
            segment: None,
            owner: None,
            contact_name: None,
            lifecycle_stage: None,
            product: None,
            renewal_date: None,
            response_date,
            feedback: None,
            flagged: false,
            followup_required: false,
            followup_completed: false,
            followup_due: None,
        }
    }

    pub fn with_previous_score(mut self, previous_score: u8) -> Self {
        self.previous_score = Some(previous_score);
        self.trend = NpsTrend::from_scores(self.score, self.previous_score);
        self
    }

    pub fn with_arr(mut self, arr: f64) -> Self {
        self.arr = arr;
        self
    }

    pub fn with_renewal_date(mut self, renewal_date: NaiveDate) -> Self {
        self.renewal_date = Some(renewal_date);
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = Some(segment.into());
        self
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    pub fn with_followup(mut self, due: Option<NaiveDate>, completed: bool) -> Self {
        self.followup_required = true;
        self.followup_due = due;
        self.followup_completed = completed;
        self
    }
}

/// `round((promoters - detractors) / total * 100)`; 0 for an empty portfolio.
pub fn composite_score(accounts: &[NpsAccount]) -> i32 {
    if accounts.is_empty() {
        return 0;
    }

    let promoters = count(accounts, NpsCategory::Promoter) as f64;
    let detractors = count(accounts, NpsCategory::Detractor) as f64;
    round_half_up((promoters - detractors) / accounts.len() as f64 * 100.0) as i32
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryPercentages {
    pub promoters: u32,
    pub passives: u32,
    pub detractors: u32,
}

/// Each share is rounded on its own, so the three need not sum to 100.
pub fn category_percentages(accounts: &[NpsAccount]) -> CategoryPercentages {
    if accounts.is_empty() {
        return CategoryPercentages::default();
    }

    let total = accounts.len() as f64;
    let share = |category| round_half_up(count(accounts, category) as f64 / total * 100.0) as u32;

    CategoryPercentages {
        promoters: share(NpsCategory::Promoter),
        passives: share(NpsCategory::Passive),
        detractors: share(NpsCategory::Detractor),
    }
}

/// ARR of every detractor plus passives renewing within three months of `today`.
///
/// The horizon is a calendar-month step that clamps to the last day of the
/// target month, so Jan 31 reaches Apr 30 rather than rolling over to May 1.
pub fn at_risk_arr(accounts: &[NpsAccount], today: NaiveDate) -> f64 {
    let horizon = today
        .checked_add_months(Months::new(3))
        .unwrap_or(NaiveDate::MAX);

    accounts
        .iter()
        .filter(|account| match account.category {
            NpsCategory::Detractor => true,
            NpsCategory::Passive => account
                .renewal_date
                .map(|renewal| renewal <= horizon)
                .unwrap_or(false),
            NpsCategory::Promoter => false,
        })
        .map(|account| account.arr)
        .sum()
}

/// Accounts whose follow-up is required and still open, in input order.
pub fn followup_queue(accounts: &[NpsAccount]) -> Vec<&NpsAccount> {
    accounts
        .iter()
        .filter(|account| account.followup_required && !account.followup_completed)
        .collect()
}

fn count(accounts: &[NpsAccount], category: NpsCategory) -> usize {
    accounts
        .iter()
        .filter(|account| account.category == category)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn account(id: &str, score: u8) -> NpsAccount {
        NpsAccount::new(id, id, score, date(2025, 1, 10))
    }

    #[test]
    fn categories_follow_standard_bands() {
        assert_eq!(NpsCategory::from_score(10), NpsCategory::Promoter);
        assert_eq!(NpsCategory::from_score(9), NpsCategory::Promoter);
        assert_eq!(NpsCategory::from_score(8), NpsCategory::Passive);
        assert_eq!(NpsCategory::from_score(7), NpsCategory::Passive);
        assert_eq!(NpsCategory::from_score(6), NpsCategory::Detractor);
        assert_eq!(NpsCategory::from_score(0), NpsCategory::Detractor);
    }

    #[test]
    fn trend_compares_with_previous_score() {
        assert_eq!(NpsTrend::from_scores(8, Some(6)), NpsTrend::Up);
        assert_eq!(NpsTrend::from_scores(4, Some(7)), NpsTrend::Down);
        assert_eq!(NpsTrend::from_scores(7, Some(7)), NpsTrend::Flat);
        assert_eq!(NpsTrend::from_scores(7, None), NpsTrend::Flat);
        assert_eq!(NpsTrend::from_scores(7, Some(0)), NpsTrend::Flat);
    }

    #[test]
    fn composite_score_of_mixed_portfolio() {
        let accounts = vec![
            account("a", 9),
            account("b", 10),
            account("c", 3),
            account("d", 7),
        ];
        assert_eq!(composite_score(&accounts), 25);
        assert_eq!(composite_score(&[]), 0);
    }

    #[test]
    fn percentages_round_independently() {
        let accounts = vec![account("a", 9), account("b", 7), account("c", 2)];
        assert_eq!(
            category_percentages(&accounts),
            CategoryPercentages {
                promoters: 33,
                passives: 33,
                detractors: 33,
            }
        );
        assert_eq!(category_percentages(&[]), CategoryPercentages::default());
    }

    #[test]
    fn at_risk_arr_counts_detractors_and_near_passives() {
        let today = date(2025, 1, 15);
        let accounts = vec![
            account("detractor", 4).with_arr(100_000.0),
            account("near-passive", 8)
                .with_arr(50_000.0)
                .with_renewal_date(date(2025, 4, 15)),
            account("far-passive", 8)
                .with_arr(40_000.0)
                .with_renewal_date(date(2025, 4, 16)),
            account("undated-passive", 7).with_arr(30_000.0),
            account("promoter", 10)
                .with_arr(90_000.0)
                .with_renewal_date(date(2025, 2, 1)),
        ];

        assert_eq!(at_risk_arr(&accounts, today), 150_000.0);
    }

    #[test]
    fn at_risk_horizon_clamps_to_month_end() {
        let today = date(2025, 1, 31);
        let accounts = vec![
            account("month-end", 7)
                .with_arr(20_000.0)
                .with_renewal_date(date(2025, 4, 30)),
            account("rolled-over", 8)
                .with_arr(35_000.0)
                .with_renewal_date(date(2025, 5, 1)),
        ];

        assert_eq!(at_risk_arr(&accounts, today), 20_000.0);
    }

    #[test]
    fn followup_queue_skips_completed_items() {
        let due = Some(date(2025, 1, 12));
        let accounts = vec![
            account("open", 3).with_followup(due, false),
            account("done", 4).with_followup(due, true),
            account("none", 9),
        ];

        let queue: Vec<&str> = followup_queue(&accounts)
            .into_iter()
            .map(|account| account.id.as_str())
            .collect();
        assert_eq!(queue, vec!["open"]);
    }
}
