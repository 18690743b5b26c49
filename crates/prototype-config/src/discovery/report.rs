use serde::Serialize;

/// Category of soft failure absorbed while normalising answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    DuplicateMapping,
    UnparsedRange,
    OutOfScale,
    UnmatchedKeyword,
    UnknownLabel,
    NonNumericValue,
    UnexpectedAnswerType,
}

impl IssueKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DuplicateMapping => "Duplicate mapping",
            Self::UnparsedRange => "Unparsed range",
            Self::OutOfScale => "Out of scale",
            Self::UnmatchedKeyword => "Unmatched keyword",
            Self::UnknownLabel => "Unknown label",
            Self::NonNumericValue => "Non-numeric value",
            Self::UnexpectedAnswerType => "Unexpected answer type",
        }
    }
}

/// Answer that was ignored or only partially applied. The field kept its
/// default (or prior) value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryIssue {
    pub field: String,
    pub kind: IssueKind,
    pub detail: String,
}

impl DiscoveryIssue {
    pub fn new(field: &str, kind: IssueKind, detail: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            kind,
            detail: detail.into(),
        }
    }
}

/// Configuration produced by a transform plus any issues noted on the way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryOutcome<C> {
    pub configuration: C,
    pub issues: Vec<DiscoveryIssue>,
}

impl<C> DiscoveryOutcome<C> {
    pub fn map<D>(self, f: impl FnOnce(C) -> D) -> DiscoveryOutcome<D> {
        DiscoveryOutcome {
            configuration: f(self.configuration),
            issues: self.issues,
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}
