use crate::infra::{load_answers, load_templates};
use crate::routes::{
    build_renewal_accounts, score_risk, summarize_nps, summarize_renewals, NpsSummaryResponse,
    RenewalAccountInput, RenewalSummaryResponse, RiskScoreResponse,
};
use chrono::{Days, Local, NaiveDate};
use clap::Args;
use prototype_config::accounts::{csv_template, NpsAccountImporter};
use prototype_config::discovery::nps::NpsHubConfig;
use prototype_config::discovery::renewal::RenewalTrackerConfig;
use prototype_config::discovery::risk::RiskAssessmentConfig;
use prototype_config::discovery::{
    standard_templates, transform, transform_for, AnswerMap, AnswerValue, ToolKind,
};
use prototype_config::error::AppError;
use std::io::Cursor;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct TransformArgs {
    /// Tool to configure (nps, renewal, risk-assessment, or a catalog id)
    #[arg(long)]
    pub(crate) tool: ToolKind,
    /// JSON answers document keyed by question id. Defaults to no answers.
    #[arg(long)]
    pub(crate) answers: Option<PathBuf>,
    /// JSON question templates. Defaults to the tool's standard catalog.
    #[arg(long)]
    pub(crate) templates: Option<PathBuf>,
    /// Include the issues absorbed while normalizing answers
    #[arg(long)]
    pub(crate) report: bool,
}

#[derive(Args, Debug)]
pub(crate) struct NpsSummaryArgs {
    /// NPS export to import
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// JSON answers document for the NPS discovery questionnaire
    #[arg(long)]
    pub(crate) answers: Option<PathBuf>,
    /// JSON question templates. Defaults to the standard NPS catalog.
    #[arg(long)]
    pub(crate) templates: Option<PathBuf>,
    /// Reporting date (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct NpsTemplateArgs {
    /// JSON answers document for the NPS discovery questionnaire
    #[arg(long)]
    pub(crate) answers: Option<PathBuf>,
    /// JSON question templates. Defaults to the standard NPS catalog.
    #[arg(long)]
    pub(crate) templates: Option<PathBuf>,
    /// Date the example renewal dates are offset from (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Write the template to a file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn run_transform(args: TransformArgs) -> Result<(), AppError> {
    let TransformArgs {
        tool,
        answers,
        templates,
        report,
    } = args;

    let answers = load_answers(answers.as_deref())?;
    let templates = load_templates(templates.as_deref(), tool)?;
    let outcome = transform_for(tool, &answers, &templates);

    println!("{} configuration ({})", tool.label(), tool.catalog_id());
    println!(
        "{}",
        serde_json::to_string_pretty(&outcome.configuration)?
    );

    if report {
        if outcome.issues.is_empty() {
            println!("No issues recorded.");
        } else {
            println!("Issues:");
            for issue in &outcome.issues {
                println!("  - {} [{}]: {}", issue.field, issue.kind.label(), issue.detail);
            }
        }
    }

    Ok(())
}

pub(crate) fn run_nps_summary(args: NpsSummaryArgs) -> Result<(), AppError> {
    let NpsSummaryArgs {
        csv,
        answers,
        templates,
        today,
    } = args;

    let answers = load_answers(answers.as_deref())?;
    let templates = load_templates(templates.as_deref(), ToolKind::Nps)?;
    let config: NpsHubConfig = transform(&answers, &templates);
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let accounts = NpsAccountImporter::from_path(&csv, &config, today)?;
    render_nps_summary(&summarize_nps(&accounts, &config, today));
    Ok(())
}

pub(crate) fn run_nps_template(args: NpsTemplateArgs) -> Result<(), AppError> {
    let NpsTemplateArgs {
        answers,
        templates,
        today,
        output,
    } = args;

    let answers = load_answers(answers.as_deref())?;
    let templates = load_templates(templates.as_deref(), ToolKind::Nps)?;
    let config: NpsHubConfig = transform(&answers, &templates);
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let template = csv_template(&config, today)?;

    match output {
        Some(path) => {
            std::fs::write(&path, template)?;
            println!("Template written to {}", path.display());
        }
        None => print!("{template}"),
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());

    println!("Prototype configuration demo ({today})");

    let nps_config: NpsHubConfig =
        transform(&demo_nps_answers(), &standard_templates(ToolKind::Nps));
    println!(
        "\nNPS hub: source {} | trigger '{}' | detractors at or below {} | follow-up within {} days",
        nps_config.nps_source_tool,
        nps_config.risk_flag_trigger.label(),
        nps_config.at_risk_threshold,
        nps_config.followup_sla_days()
    );
    let accounts = NpsAccountImporter::from_reader(
        Cursor::new(demo_nps_csv(today).into_bytes()),
        &nps_config,
        today,
    )?;
    render_nps_summary(&summarize_nps(&accounts, &nps_config, today));

    let renewal_config: RenewalTrackerConfig =
        transform(&demo_renewal_answers(), &standard_templates(ToolKind::Renewal));
    println!(
        "\nRenewal tracker: {}-day pipeline | outreach at {} days | flag at risk score {}",
        renewal_config.pipeline_days(),
        renewal_config.outreach_days,
        renewal_config.effective_risk_threshold()
    );
    let renewals = build_renewal_accounts(demo_renewal_accounts(today), &renewal_config, today);
    render_renewal_summary(&summarize_renewals(&renewals, &renewal_config, today));

    let risk_config: RiskAssessmentConfig = transform(
        &demo_risk_answers(),
        &standard_templates(ToolKind::RiskAssessment),
    );
    println!(
        "\nRisk assessment: {} | escalate at {} | action items {:?}",
        risk_config.client_type.label(),
        risk_config.risk_threshold,
        risk_config.auto_action_items
    );
    render_risk_score(&score_risk(&risk_config, None));

    Ok(())
}

fn render_nps_summary(summary: &NpsSummaryResponse) {
    println!(
        "- {} accounts | NPS {} | {}% promoters, {}% passives, {}% detractors",
        summary.account_count,
        summary.composite_score,
        summary.categories.promoters,
        summary.categories.passives,
        summary.categories.detractors
    );
    println!("- ${:.0} ARR at risk", summary.at_risk_arr);
    if !summary.flagged_accounts.is_empty() {
        println!("- Flagged: {}", summary.flagged_accounts.join(", "));
    }
    if summary.followups.is_empty() {
        println!("- No open follow-ups");
    } else {
        println!("Follow-up queue:");
        for entry in &summary.followups {
            let due = entry
                .due
                .map(|date| date.to_string())
                .unwrap_or_else(|| "unscheduled".to_string());
            println!(
                "  - {} (score {}) owner {} due {}",
                entry.account_name,
                entry.score,
                entry.owner.as_deref().unwrap_or("unassigned"),
                due
            );
        }
    }
    println!("Import columns: {}", summary.visible_columns.join(", "));
}

fn render_renewal_summary(summary: &RenewalSummaryResponse) {
    let metrics = &summary.metrics;
    println!(
        "- ${:.0} total ARR | ${:.0} renewing in window | ${:.0} at risk across {} accounts",
        metrics.total_arr, metrics.renewing_arr, metrics.at_risk_arr, metrics.at_risk_count
    );
    println!(
        "- GRR {}% | NRR {}% | logo retention {}% | {} critical",
        metrics.grr, metrics.nrr, metrics.logo_retention, metrics.critical_count
    );
    for account in &summary.accounts {
        let outcome = account
            .outcome
            .map(|outcome| outcome.label())
            .unwrap_or("open");
        println!(
            "  - {}: {} ({} days) | risk {}{} | {}",
            account.name,
            account.stage_label,
            account.days_to_renewal,
            account.risk_score,
            if account.at_risk { " (flagged)" } else { "" },
            outcome
        );
    }
    println!("Milestones: {}", summary.milestones.join(" -> "));
}

fn render_risk_score(score: &RiskScoreResponse) {
    println!(
        "- Overall risk {:.1} ({}){}",
        score.overall_risk_score,
        score.health_label,
        if score.exceeds_threshold {
            " | above escalation threshold"
        } else {
            ""
        }
    );
    for indicator in &score.indicators {
        println!(
            "  - {} [{}] health {:.0}% weight {:.0}",
            indicator.name,
            indicator.category,
            indicator.health_percent(),
            indicator.weight
        );
    }
}

fn answers(pairs: Vec<(&str, AnswerValue)>) -> AnswerMap {
    pairs
        .into_iter()
        .map(|(id, value)| (id.to_string(), value))
        .collect()
}

fn demo_nps_answers() -> AnswerMap {
    answers(vec![
        ("nps_source_tool", "Delighted".into()),
        ("risk_flag_trigger", "Any detractor score".into()),
        ("followup_sla", "2 business days".into()),
        ("track_recovery", "Yes".into()),
        (
            "visible_account_attributes",
            vec!["ARR / contract value", "Renewal date", "Account owner", "Segment"].into(),
        ),
    ])
}

fn demo_renewal_answers() -> AnswerMap {
    answers(vec![
        ("crm_source", "Salesforce".into()),
        ("renewal_pipeline_days", "120 days".into()),
        ("outreach_days", AnswerValue::Number(60.0)),
        (
            "risk_factors",
            vec![
                "Low NPS/CSAT score",
                "Declining product usage",
                "No executive sponsor",
                "Champion left",
            ]
            .into(),
        ),
        ("risk_threshold", "50".into()),
    ])
}

fn demo_risk_answers() -> AnswerMap {
    answers(vec![
        ("client_type", "Mid market SaaS".into()),
        ("relationship_importance", AnswerValue::Number(8.0)),
        ("adoption_importance", AnswerValue::Number(9.0)),
        ("financial_importance", "Medium - Moderate influence".into()),
        ("track_payment_health", "Not tracked today".into()),
        ("risk_threshold", AnswerValue::Number(65.0)),
        ("auto_action_items", "Only for critical risks".into()),
    ])
}

fn demo_nps_csv(today: NaiveDate) -> String {
    let in_days = |days: u64| {
        today
            .checked_add_days(Days::new(days))
            .unwrap_or(today)
            .to_string()
    };

    format!(
        "account_name,score,previous_score,arr,renewal_date,account_owner,segment,feedback_text\n\
Northwind Traders,10,9,180000,{},Sarah Chen,Enterprise,\"Rollout went smoothly\"\n\
Contoso Health,7,8,64000,{},Emily Johnson,Mid-Market,\"Reporting is slow\"\n\
Fabrikam Retail,3,7,240000,{},David Kim,Enterprise,\"Support response times slipped\"\n\
Tailspin Labs,9,,18000,{},Emily Johnson,SMB,\n",
        in_days(200),
        in_days(45),
        in_days(75),
        in_days(320)
    )
}

fn demo_renewal_accounts(today: NaiveDate) -> Vec<RenewalAccountInput> {
    let account = |id: &str, name: &str, arr: f64, days: i64| RenewalAccountInput {
        id: id.to_string(),
        name: name.to_string(),
        arr,
        contract_end: today + chrono::Duration::days(days),
        risk_factors: Vec::new(),
        outcome: None,
        expansion_arr: None,
        owner: None,
    };

    vec![
        RenewalAccountInput {
            risk_factors: vec!["Champion left".to_string(), "Declining product usage".to_string()],
            ..account("REN-1", "Fabrikam Retail", 240_000.0, 21)
        },
        account("REN-2", "Northwind Traders", 180_000.0, 95),
        RenewalAccountInput {
            outcome: Some("Expanded (upsell)".to_string()),
            expansion_arr: Some(30_000.0),
            ..account("REN-3", "Contoso Health", 64_000.0, -20)
        },
        RenewalAccountInput {
            outcome: Some("Churned (full)".to_string()),
            ..account("REN-4", "Litware", 22_000.0, -45)
        },
    ]
}
