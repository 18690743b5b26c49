use crate::discovery::nps::NpsHubConfig;
use chrono::{Days, NaiveDate};

const BASE_COLUMNS: &[&str] = &[
    "account_id",
    "account_name",
    "score",
    "response_date",
    "feedback_text",
    "contact_name",
];

/// Optional columns in template order, each keyed by the hub attribute that
/// makes it visible.
const ATTRIBUTE_COLUMNS: &[&str] = &[
    "arr",
    "renewal_date",
    "account_owner",
    "segment",
    "lifecycle_stage",
    "product",
];

struct ExampleRow {
    account_id: &'static str,
    account_name: &'static str,
    score: &'static str,
    feedback_text: &'static str,
    contact_name: &'static str,
    arr: &'static str,
    renewal_in_days: u64,
    account_owner: &'static str,
    segment: &'static str,
    lifecycle_stage: &'static str,
    product: &'static str,
}

const EXAMPLE_ROWS: [ExampleRow; 3] = [
    ExampleRow {
        account_id: "ACC-001",
        account_name: "Acme Corporation",
        score: "9",
        feedback_text: "Great product, really helped our team productivity!",
        contact_name: "John Smith",
        arr: "150000",
        renewal_in_days: 90,
        account_owner: "Sarah Johnson",
        segment: "Enterprise",
        lifecycle_stage: "Mature",
        product: "Pro Plan",
    },
    ExampleRow {
        account_id: "ACC-002",
        account_name: "TechStart Inc",
        score: "5",
        feedback_text: "Support response times could be better",
        contact_name: "Emily Chen",
        arr: "45000",
        renewal_in_days: 60,
        account_owner: "Mike Brown",
        segment: "Mid-Market",
        lifecycle_stage: "Growth",
        product: "Standard Plan",
    },
    ExampleRow {
        account_id: "ACC-003",
        account_name: "Global Industries",
        score: "10",
        feedback_text: "Absolutely love it! Would recommend to anyone.",
        contact_name: "Robert Miller",
        arr: "200000",
        renewal_in_days: 180,
        account_owner: "Sarah Johnson",
        segment: "Enterprise",
        lifecycle_stage: "Champion",
        product: "Enterprise Plan",
    },
];

impl ExampleRow {
    fn value(&self, column: &str, today: NaiveDate) -> String {
        match column {
            "account_id" => self.account_id.to_string(),
            "account_name" => self.account_name.to_string(),
            "score" => self.score.to_string(),
            "response_date" => today.format("%Y-%m-%d").to_string(),
            "feedback_text" => self.feedback_text.to_string(),
            "contact_name" => self.contact_name.to_string(),
            "arr" => self.arr.to_string(),
            "renewal_date" => today
                .checked_add_days(Days::new(self.renewal_in_days))
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            "account_owner" => self.account_owner.to_string(),
            "segment" => self.segment.to_string(),
            "lifecycle_stage" => self.lifecycle_stage.to_string(),
            "product" => self.product.to_string(),
            _ => String::new(),
        }
    }
}

/// Columns the import template carries for this hub configuration.
pub fn template_columns(config: &NpsHubConfig) -> Vec<&'static str> {
    BASE_COLUMNS
        .iter()
        .copied()
        .chain(
            ATTRIBUTE_COLUMNS
                .iter()
                .copied()
                .filter(|column| config.should_show_attribute(column)),
        )
        .collect()
}

/// Import template: a header row plus three example rows dated from `today`.
pub fn csv_template(config: &NpsHubConfig, today: NaiveDate) -> Result<String, csv::Error> {
    let columns = template_columns(config);
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(&columns)?;
    for row in &EXAMPLE_ROWS {
        writer.write_record(columns.iter().map(|column| row.value(column, today)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
