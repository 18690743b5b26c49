use super::template::AnswerValue;
use regex::Regex;
use std::sync::OnceLock;

static UPPER_BOUND: OnceLock<Regex> = OnceLock::new();
static CLOSED_RANGE: OnceLock<Regex> = OnceLock::new();
static OPEN_RANGE: OnceLock<Regex> = OnceLock::new();
static LEADING_INTEGER: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern compiles"))
}

/// Wraps a scalar answer in a one-element list.
pub fn coerce_list(value: &AnswerValue) -> Vec<String> {
    match value {
        AnswerValue::List(items) => items.clone(),
        other => vec![other.to_display_text()],
    }
}

/// `"0-6 (Standard detractor)"` -> 6. Bounds wider than `u32` saturate.
pub fn range_upper_bound(text: &str) -> Option<u32> {
    let captures = pattern(&UPPER_BOUND, r"0-(\d+)").captures(text)?;
    Some(saturating_digits(&captures[1]))
}

/// `"7-8 (Standard passive)"` -> (7, 8).
pub fn range_bounds(text: &str) -> Option<(u32, u32)> {
    let captures = pattern(&CLOSED_RANGE, r"(\d+)-(\d+)").captures(text)?;
    Some((saturating_digits(&captures[1]), saturating_digits(&captures[2])))
}

/// `"9+ (Standard promoter)"` -> 9.
pub fn open_range_lower_bound(text: &str) -> Option<u32> {
    let captures = pattern(&OPEN_RANGE, r"(\d+)\+").captures(text)?;
    Some(saturating_digits(&captures[1]))
}

fn saturating_digits(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

/// Leading integer of free text, `"90 days"` -> 90.
pub fn leading_integer(text: &str) -> Option<i64> {
    let captures = pattern(&LEADING_INTEGER, r"^\s*([+-]?\d+)").captures(text)?;
    captures[1].parse().ok()
}

/// Buckets a 1-10 importance slider into a weight multiplier.
/// Out-of-range input is clamped first.
pub fn slider_to_multiplier(value: f64) -> f64 {
    let value = value.clamp(1.0, 10.0);
    if value >= 9.0 {
        2.0
    } else if value >= 6.0 {
        1.5
    } else if value >= 4.0 {
        1.0
    } else {
        0.5
    }
}

const IMPORTANCE_MULTIPLIERS: &[(&str, f64)] = &[
    ("Critical - Primary indicator", 2.0),
    ("High - Major factor", 1.5),
    ("Medium - Moderate influence", 1.0),
    ("Low - Minor factor", 0.5),
];

/// Legacy select-box importance label to multiplier.
pub fn importance_multiplier(label: &str) -> Option<f64> {
    lookup(label, IMPORTANCE_MULTIPLIERS)
}

/// Exact label lookup.
pub fn lookup<T: Copy>(label: &str, table: &[(&str, T)]) -> Option<T> {
    table
        .iter()
        .find(|(key, _)| *key == label)
        .map(|(_, value)| *value)
}

/// First `(substring, value)` pair whose substring occurs in `text`.
pub fn match_keyword<T: Copy>(text: &str, table: &[(&str, T)]) -> Option<T> {
    table
        .iter()
        .find(|(needle, _)| text.contains(needle))
        .map(|(_, value)| *value)
}

/// Rounds halves toward positive infinity, matching how the questionnaire
/// front-end rounds percentages and scores.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

pub(crate) fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}
