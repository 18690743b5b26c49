use prototype_config::discovery::nps::{should_flag_as_risk, NpsHubConfig, RiskFlagTrigger};
use prototype_config::discovery::{
    parse_answers, parse_templates, standard_templates, transform, transform_with_report,
    AnswerMap, AnswerValue, IssueKind, QuestionTemplate, ToolKind,
};

fn templates() -> Vec<QuestionTemplate> {
    vec![
        QuestionTemplate::new("q-tool", "Which NPS tool?").mapped_to_field("nps_source_tool"),
        QuestionTemplate::new("q-fields", "Fields?").mapped_to_field("available_fields"),
        QuestionTemplate::new("q-trigger", "Risk trigger?").mapped_to_field("risk_flag_trigger"),
        QuestionTemplate::new("q-detractor", "Detractor band?").mapped_to_field("at_risk_threshold"),
        QuestionTemplate::new("q-passive", "Passive band?").mapped_to_field("neutral_threshold_range"),
        QuestionTemplate::new("q-promoter", "Promoter band?").mapped_to_field("healthy_min_threshold"),
        QuestionTemplate::new("q-sla", "Follow-up SLA?").mapped_to_field("followup_sla"),
        QuestionTemplate::new("q-recovery", "Track recovery?").mapped_to_field("track_recovery"),
        QuestionTemplate::new("q-visible", "Visible attributes?")
            .mapped_to_field("visible_account_attributes"),
        QuestionTemplate::new("q-notes", "Anything else?"),
    ]
}

fn answers(pairs: &[(&str, AnswerValue)]) -> AnswerMap {
    pairs
        .iter()
        .map(|(id, value)| (id.to_string(), value.clone()))
        .collect()
}

#[test]
fn empty_answers_yield_defaults() {
    let config: NpsHubConfig = transform(&AnswerMap::new(), &templates());
    assert_eq!(config, NpsHubConfig::default());

    let without_templates: NpsHubConfig = transform(&AnswerMap::new(), &[]);
    assert_eq!(without_templates, NpsHubConfig::default());
}

#[test]
fn answers_overwrite_mapped_fields() {
    let answers = answers(&[
        ("q-tool", "Delighted".into()),
        ("q-fields", "Score (0-10)".into()),
        ("q-trigger", "Drop of X points".into()),
        ("q-detractor", "0-5 (Stricter)".into()),
        ("q-passive", "6-8 (Wider passive band)".into()),
        ("q-promoter", "10 only (Strictest)".into()),
        ("q-sla", "Same day".into()),
        ("q-recovery", "No".into()),
        ("q-visible", vec!["Segment", "Renewal date"].into()),
        ("q-notes", "ignored".into()),
    ]);

    let config: NpsHubConfig = transform(&answers, &templates());

    assert_eq!(config.nps_source_tool, "Delighted");
    assert_eq!(config.available_fields, vec!["Score (0-10)".to_string()]);
    assert_eq!(config.risk_flag_trigger, RiskFlagTrigger::DropOfPoints);
    assert_eq!(config.at_risk_threshold, 5);
    assert_eq!(config.neutral_min_threshold, 6);
    assert_eq!(config.neutral_max_threshold, 8);
    assert_eq!(config.healthy_min_threshold, 10);
    assert_eq!(config.followup_sla, "Same day");
    assert_eq!(config.followup_sla_days(), 1);
    assert!(!config.track_recovery);
    assert!(config.should_show_attribute("segment"));
    assert!(!config.should_show_attribute("arr"));
    assert_eq!(config.integration_method, "Manual entry (fallback)");
}

#[test]
fn standard_detractor_label_sets_threshold_six() {
    let answers = answers(&[("q-detractor", "0-6 (Standard detractor)".into())]);
    let config: NpsHubConfig = transform(&answers, &templates());
    assert_eq!(config.at_risk_threshold, 6);
}

#[test]
fn transform_is_idempotent() {
    let answers = answers(&[
        ("q-tool", "Qualtrics".into()),
        ("q-trigger", "Consecutive low scores".into()),
        ("q-sla", "5 business days".into()),
    ]);

    let first: NpsHubConfig = transform(&answers, &templates());
    let second: NpsHubConfig = transform(&answers, &templates());
    assert_eq!(first, second);
}

#[test]
fn falsy_answers_keep_defaults_but_recovery_reads_any_answer() {
    let answers = answers(&[
        ("q-tool", "".into()),
        ("q-recovery", "".into()),
        ("q-visible", AnswerValue::List(Vec::new())),
    ]);

    let config: NpsHubConfig = transform(&answers, &templates());
    assert_eq!(config.nps_source_tool, "Other");
    assert!(!config.track_recovery, "an empty answer is not \"Yes\"");
    assert!(config.visible_account_attributes.is_empty());
}

#[test]
fn report_lists_absorbed_problems_without_changing_configuration() {
    let answers = answers(&[
        ("q-trigger", "Whenever the CSM says so".into()),
        ("q-detractor", "Custom".into()),
        ("q-sla", "Next quarter".into()),
        ("q-tool", AnswerValue::Number(3.0)),
    ]);

    let outcome = transform_with_report::<NpsHubConfig>(&answers, &templates());
    let plain: NpsHubConfig = transform(&answers, &templates());
    assert_eq!(outcome.configuration, plain);

    let kinds: Vec<(&str, IssueKind)> = outcome
        .issues
        .iter()
        .map(|issue| (issue.field.as_str(), issue.kind))
        .collect();
    assert!(kinds.contains(&("risk_flag_trigger", IssueKind::UnknownLabel)));
    assert!(kinds.contains(&("at_risk_threshold", IssueKind::UnparsedRange)));
    assert!(kinds.contains(&("followup_sla", IssueKind::UnknownLabel)));
    assert!(kinds.contains(&("nps_source_tool", IssueKind::UnexpectedAnswerType)));

    assert_eq!(plain.at_risk_threshold, 6);
    assert_eq!(plain.followup_sla_days(), 2);
    assert_eq!(plain.nps_source_tool, "3");
    assert!(should_flag_as_risk(6, None, Some(&plain)));
}

#[test]
fn duplicate_mappings_use_first_template_and_are_reported() {
    let templates = vec![
        QuestionTemplate::new("first", "Tool?").mapped_to_field("nps_source_tool"),
        QuestionTemplate::new("second", "Tool again?").mapped_to_field("nps_source_tool"),
    ];
    let answers = answers(&[("first", "Medallia".into()), ("second", "Delighted".into())]);

    let outcome = transform_with_report::<NpsHubConfig>(&answers, &templates);
    assert_eq!(outcome.configuration.nps_source_tool, "Medallia");
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].kind, IssueKind::DuplicateMapping);
}

#[test]
fn catalog_documents_round_trip_through_json() {
    let templates = parse_templates(
        r#"[{"id": "a1", "question": "Tool?", "template_mapping": {"field": "nps_source_tool"}},
            {"id": "a2", "question": "Views?", "template_mapping": {"field": "rep_views"}}]"#,
    )
    .expect("templates parse");
    let answers = parse_answers(r#"{"a1": "AskNicely", "a2": ["Recent detractors"]}"#)
        .expect("answers parse");

    let config: NpsHubConfig = transform(&answers, &templates);
    assert_eq!(config.nps_source_tool, "AskNicely");
    assert!(config.should_show_view("My at-risk accounts"));
    assert!(!config.should_show_view("Upcoming renewals with low NPS"));
}

#[test]
fn standard_catalog_accepts_answers_keyed_by_field() {
    let answers = answers(&[("followup_sla", "No SLA".into())]);
    let config: NpsHubConfig = transform(&answers, &standard_templates(ToolKind::Nps));
    assert_eq!(config.followup_sla_days(), 0);
}

#[test]
fn null_and_mixed_answers_are_absorbed() {
    let answers = parse_answers(
        r#"{"q-tool": "Delighted",
            "q-recovery": null,
            "q-sla": null,
            "q-fields": ["Score (0-10)", 3],
            "q-visible": true}"#,
    )
    .expect("answers with null and mixed entries parse");

    let outcome = transform_with_report::<NpsHubConfig>(&answers, &templates());
    let config = &outcome.configuration;
    let defaults = NpsHubConfig::default();

    assert_eq!(config.nps_source_tool, "Delighted");
    assert!(!config.track_recovery, "a null answer is not \"Yes\"");
    assert_eq!(config.followup_sla, defaults.followup_sla);
    assert_eq!(
        config.available_fields,
        vec!["Score (0-10)".to_string(), "3".to_string()]
    );
    assert_eq!(
        config.visible_account_attributes,
        defaults.visible_account_attributes
    );
    assert!(outcome.issues.iter().any(|issue| {
        issue.field == "visible_account_attributes" && issue.kind == IssueKind::UnexpectedAnswerType
    }));
}

#[test]
fn thresholds_beyond_score_scale_keep_defaults() {
    let answers = answers(&[
        ("q-detractor", "0-999".into()),
        ("q-passive", "7-12".into()),
        ("q-promoter", "11+".into()),
    ]);

    let outcome = transform_with_report::<NpsHubConfig>(&answers, &templates());
    let defaults = NpsHubConfig::default();
    assert_eq!(outcome.configuration.at_risk_threshold, defaults.at_risk_threshold);
    assert_eq!(outcome.configuration.neutral_max_threshold, defaults.neutral_max_threshold);
    assert_eq!(outcome.configuration.healthy_min_threshold, defaults.healthy_min_threshold);

    let detractor = outcome
        .issues
        .iter()
        .find(|issue| issue.field == "at_risk_threshold")
        .expect("detractor bound noted");
    assert_eq!(detractor.kind, IssueKind::OutOfScale);
    assert!(detractor.detail.contains("999"));
    assert!(outcome
        .issues
        .iter()
        .all(|issue| issue.kind == IssueKind::OutOfScale));
    assert_eq!(outcome.issues.len(), 3);
}
