use super::template::QuestionTemplate;
use super::ToolKind;
use crate::accounts::risk::default_indicators;
use crate::discovery::risk::ClientType;

/// Field-mapped questions published for each tool. Question IDs equal the
/// mapped field so answers can be keyed by field name.
const NPS_QUESTIONS: &[(&str, &str)] = &[
    ("nps_source_tool", "Which tool collects your NPS responses?"),
    ("integration_method", "How will NPS data reach the hub?"),
    ("available_fields", "Which fields does each NPS response include?"),
    ("nps_priority_influence", "How much should NPS influence account priority?"),
    ("risk_flag_trigger", "What should flag an account as at risk?"),
    ("nps_renewal_impact", "Should NPS affect renewal forecasting?"),
    ("at_risk_threshold", "Which scores count as detractors?"),
    ("neutral_threshold_range", "Which scores count as passives?"),
    ("healthy_min_threshold", "Which scores count as promoters?"),
    ("detractor_action", "What happens when a detractor responds?"),
    ("followup_owner", "Who owns detractor follow-up?"),
    ("followup_sla", "How quickly must follow-up happen?"),
    ("track_recovery", "Do you track recovery after follow-up?"),
    ("visible_account_attributes", "Which account attributes should reps see?"),
    ("required_account_attributes", "Which account attributes are required?"),
    ("rep_views", "Which views do reps need?"),
    ("manager_views", "Which views do managers need?"),
];

const RENEWAL_QUESTIONS: &[(&str, &str)] = &[
    ("crm_source", "Which CRM holds contract data?"),
    ("integration_method", "How will renewal data be loaded?"),
    ("available_fields", "Which contract fields are available?"),
    ("renewal_pipeline_days", "How many days before contract end does a renewal enter the pipeline?"),
    ("renewal_milestones", "Which milestones does every renewal pass through?"),
    ("auto_enter_pipeline", "Should accounts enter the pipeline automatically?"),
    ("outreach_days", "How many days before renewal does outreach start?"),
    ("risk_factors", "Which factors signal renewal risk?"),
    ("risk_threshold", "At what risk score should a renewal be flagged?"),
    ("health_score_influence", "How does health score influence renewal risk?"),
    ("outcome_types", "Which renewal outcomes do you record?"),
    ("kpi_metrics", "Which renewal KPIs matter most?"),
    ("track_expansion_separately", "How should expansion revenue be tracked?"),
    ("renewal_owner_role", "Who owns renewals?"),
    ("renewal_actions", "Which actions should a new renewal trigger?"),
    ("manager_views", "Which renewal views do managers need?"),
];

const RISK_QUESTIONS: &[(&str, &str)] = &[
    ("client_type", "What kind of customers do you serve?"),
    ("relationship_importance", "How important are relationship signals?"),
    ("adoption_importance", "How important is product adoption?"),
    ("financial_importance", "How important are financial signals?"),
    ("technical_importance", "How important are technical and operational signals?"),
    ("social_importance", "How important are social and engagement signals?"),
    ("risk_threshold", "At what risk score should an account be escalated?"),
    ("auto_action_items", "When should action items be generated automatically?"),
    ("primary_use_case", "What is the primary use of the assessment?"),
];

/// Standard question templates for a tool.
pub fn standard_templates(kind: ToolKind) -> Vec<QuestionTemplate> {
    let questions = match kind {
        ToolKind::Nps => NPS_QUESTIONS,
        ToolKind::Renewal => RENEWAL_QUESTIONS,
        ToolKind::RiskAssessment => RISK_QUESTIONS,
    };

    let mut templates: Vec<QuestionTemplate> = questions
        .iter()
        .map(|(field, question)| QuestionTemplate::new(*field, *question).mapped_to_field(*field))
        .collect();

    if kind == ToolKind::RiskAssessment {
        for client_type in [ClientType::B2bEnterprise, ClientType::B2bSmb, ClientType::B2c] {
            for indicator in default_indicators(client_type) {
                templates.push(
                    QuestionTemplate::new(
                        format!("track_{}", indicator.id),
                        format!("How do you track {}?", indicator.name),
                    )
                    .mapped_to_indicator(indicator.id),
                );
            }
        }
    }

    templates
}
