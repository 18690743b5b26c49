use prototype_config::discovery::renewal::{
    calculate_risk_score, renewal_milestones, renewal_stage, should_flag_as_risk, RenewalStage,
    RenewalTrackerConfig,
};
use prototype_config::discovery::{
    standard_templates, transform, transform_with_report, AnswerMap, AnswerValue, IssueKind,
    ToolKind,
};

fn answers(pairs: &[(&str, AnswerValue)]) -> AnswerMap {
    pairs
        .iter()
        .map(|(id, value)| (id.to_string(), value.clone()))
        .collect()
}

fn transform_renewal(answers: &AnswerMap) -> RenewalTrackerConfig {
    transform(answers, &standard_templates(ToolKind::Renewal))
}

#[test]
fn empty_answers_yield_defaults() {
    assert_eq!(
        transform_renewal(&AnswerMap::new()),
        RenewalTrackerConfig::default()
    );
}

#[test]
fn integer_fields_accept_numbers_and_labelled_text() {
    let config = transform_renewal(&answers(&[
        ("renewal_pipeline_days", "120 days".into()),
        ("outreach_days", AnswerValue::Number(45.0)),
        ("risk_threshold", "50".into()),
    ]));

    assert_eq!(config.renewal_pipeline_days, 120);
    assert_eq!(config.outreach_days, 45);
    assert_eq!(config.risk_threshold, 50);
    assert_eq!(renewal_stage(100, Some(&config)), RenewalStage::Upcoming);
}

#[test]
fn unparsable_integers_fall_back_and_are_reported() {
    let outcome = transform_with_report::<RenewalTrackerConfig>(
        &answers(&[("renewal_pipeline_days", "Quarterly".into())]),
        &standard_templates(ToolKind::Renewal),
    );

    assert_eq!(outcome.configuration.renewal_pipeline_days, 90);
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].field, "renewal_pipeline_days");
    assert_eq!(outcome.issues[0].kind, IssueKind::NonNumericValue);
}

#[test]
fn scalar_answers_to_list_fields_are_wrapped() {
    let config = transform_renewal(&answers(&[
        ("risk_factors", "Budget cuts".into()),
        ("crm_source", "Salesforce".into()),
    ]));

    assert_eq!(config.risk_factors, vec!["Budget cuts".to_string()]);
    assert_eq!(config.crm_source, "Salesforce");
    assert_eq!(calculate_risk_score(&["Budget cuts"], Some(&config)), 100);
}

#[test]
fn risk_score_two_of_five_factors_is_forty() {
    let config = transform_renewal(&answers(&[(
        "risk_factors",
        vec![
            "Low NPS/CSAT score",
            "Declining product usage",
            "No executive sponsor",
            "Champion left",
            "Budget cuts",
        ]
        .into(),
    )]));

    let score = calculate_risk_score(&["Champion left", "Low NPS/CSAT score"], Some(&config));
    assert_eq!(score, 40);
    assert!(!should_flag_as_risk(score, Some(&config)));
}

#[test]
fn stage_examples() {
    let config = RenewalTrackerConfig::default();
    assert_eq!(renewal_stage(45, Some(&config)), RenewalStage::Active);
    assert_eq!(renewal_stage(-1, Some(&config)), RenewalStage::Overdue);
    assert_eq!(renewal_stage(45, None), RenewalStage::Active);
}

#[test]
fn milestones_follow_configuration() {
    let config = transform_renewal(&answers(&[(
        "renewal_milestones",
        vec!["120-day plan", "Contract signed"].into(),
    )]));

    assert_eq!(
        renewal_milestones(Some(&config)),
        vec!["120-day plan".to_string(), "Contract signed".to_string()]
    );
    assert_eq!(renewal_milestones(None)[0], "90-day check-in");
}

#[test]
fn transform_is_idempotent() {
    let answers = answers(&[
        ("kpi_metrics", vec!["Logo retention rate"].into()),
        ("renewal_owner_role", "Account Executive".into()),
    ]);
    assert_eq!(transform_renewal(&answers), transform_renewal(&answers));
}
