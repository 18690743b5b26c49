use super::normalizer::{coerce_list, leading_integer};
use super::report::{DiscoveryIssue, IssueKind};
use super::template::{AnswerMap, AnswerValue, TemplateIndex};

/// Resolves configuration fields against one questionnaire submission and
/// collects the issues met while normalising them.
pub struct FieldResolver<'a> {
    index: &'a TemplateIndex,
    answers: &'a AnswerMap,
    issues: Vec<DiscoveryIssue>,
}

impl<'a> FieldResolver<'a> {
    pub fn new(index: &'a TemplateIndex, answers: &'a AnswerMap) -> Self {
        Self {
            index,
            answers,
            issues: Vec::new(),
        }
    }

    /// Raw answer for `field`, present or not.
    pub fn answer(&self, field: &str) -> Option<&'a AnswerValue> {
        self.index.find_by_mapping(field, self.answers)
    }

    /// Answer for `field` only when it counts as filled in.
    pub fn present(&self, field: &str) -> Option<&'a AnswerValue> {
        self.answer(field).filter(|answer| answer.is_present())
    }

    /// Present answer in a shape the field normalisers understand. Booleans
    /// and objects are noted and skipped.
    fn usable(&mut self, field: &str, expected: &str) -> Option<&'a AnswerValue> {
        let answer = self.present(field)?;
        if let AnswerValue::Other(_) = answer {
            self.note_unexpected(field, expected, answer);
            return None;
        }
        Some(answer)
    }

    /// Direct copy. Non-text answers are rendered as text and noted.
    pub fn text(&mut self, field: &str) -> Option<String> {
        let answer = self.usable(field, "text")?;
        if answer.as_text().is_none() {
            self.note_unexpected(field, "text", answer);
        }
        Some(answer.to_display_text())
    }

    /// Array coercion.
    pub fn list(&mut self, field: &str) -> Option<Vec<String>> {
        self.usable(field, "text or list").map(coerce_list)
    }

    /// Text answer for pattern-based fields; other shapes are noted and skipped.
    pub fn pattern_text(&mut self, field: &str) -> Option<&'a str> {
        let answer = self.usable(field, "text")?;
        match answer.as_text() {
            Some(text) => Some(text),
            None => {
                self.note_unexpected(field, "text", answer);
                None
            }
        }
    }

    /// Integer field. Numbers are truncated, text uses its leading integer,
    /// and anything unusable (or zero) falls back to `fallback`.
    pub fn integer_or(&mut self, field: &str, fallback: i64) -> Option<i64> {
        let answer = self.usable(field, "number")?;
        let parsed = match answer {
            AnswerValue::Number(value) => Some(value.trunc() as i64),
            AnswerValue::Text(text) => leading_integer(text).filter(|value| *value != 0),
            AnswerValue::List(_) | AnswerValue::Null | AnswerValue::Other(_) => None,
        };

        match parsed {
            Some(value) => Some(value),
            None => {
                self.note(
                    field,
                    IssueKind::NonNumericValue,
                    format!(
                        "'{}' is not a number, using {fallback}",
                        answer.to_display_text()
                    ),
                );
                Some(fallback)
            }
        }
    }

    /// Answered indicator templates in template order.
    pub fn indicators(&self) -> impl Iterator<Item = (&'a str, &'a AnswerValue)> + 'a {
        self.index.answered_indicators(self.answers)
    }

    pub fn note(&mut self, field: &str, kind: IssueKind, detail: impl Into<String>) {
        self.issues.push(DiscoveryIssue::new(field, kind, detail));
    }

    pub(crate) fn note_unexpected(&mut self, field: &str, expected: &str, answer: &AnswerValue) {
        self.note(
            field,
            IssueKind::UnexpectedAnswerType,
            format!("expected {expected}, received {}", answer.kind_label()),
        );
    }

    pub(crate) fn note_duplicates(&mut self) {
        for field in self.index.duplicate_fields(self.answers) {
            self.note(
                &field,
                IssueKind::DuplicateMapping,
                "several answered questions map to this field; the first in template order was used",
            );
        }
    }

    pub fn into_issues(self) -> Vec<DiscoveryIssue> {
        self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::template::QuestionTemplate;

    fn setup(answer: AnswerValue) -> (TemplateIndex, AnswerMap) {
        let index = TemplateIndex::build(&[
            QuestionTemplate::new("q1", "Pipeline window").mapped_to_field("renewal_pipeline_days")
        ]);
        let mut answers = AnswerMap::new();
        answers.insert("q1".to_string(), answer);
        (index, answers)
    }

    #[test]
    fn integer_accepts_numbers_and_leading_digits() {
        let (index, answers) = setup(AnswerValue::Number(120.0));
        let mut resolver = FieldResolver::new(&index, &answers);
        assert_eq!(resolver.integer_or("renewal_pipeline_days", 90), Some(120));

        let (index, answers) = setup(AnswerValue::Text("180 days".to_string()));
        let mut resolver = FieldResolver::new(&index, &answers);
        assert_eq!(resolver.integer_or("renewal_pipeline_days", 90), Some(180));
        assert!(resolver.into_issues().is_empty());
    }

    #[test]
    fn integer_falls_back_and_notes_issue() {
        let (index, answers) = setup(AnswerValue::Text("Quarterly".to_string()));
        let mut resolver = FieldResolver::new(&index, &answers);
        assert_eq!(resolver.integer_or("renewal_pipeline_days", 90), Some(90));

        let issues = resolver.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::NonNumericValue);
    }

    #[test]
    fn zero_answers_are_treated_as_unanswered() {
        let (index, answers) = setup(AnswerValue::Number(0.0));
        let mut resolver = FieldResolver::new(&index, &answers);
        assert_eq!(resolver.integer_or("renewal_pipeline_days", 90), None);
        assert!(resolver.answer("renewal_pipeline_days").is_some());
    }

    #[test]
    fn pattern_text_rejects_lists() {
        let (index, answers) = setup(AnswerValue::List(vec!["0-6".to_string()]));
        let mut resolver = FieldResolver::new(&index, &answers);
        assert_eq!(resolver.pattern_text("renewal_pipeline_days"), None);
        assert_eq!(
            resolver.into_issues()[0].kind,
            IssueKind::UnexpectedAnswerType
        );
    }
}
