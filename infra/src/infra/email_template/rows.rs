use chrono::{DateTime, Utc};
use model::{EmailTemplate, EmailTemplateData, EmailTemplateType};
use std::str::FromStr;

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct EmailTemplateRow {
    pub id: i64,
    pub organization_id: i64,
    #[sqlx(rename = "type")]
    pub template_type: String,
    pub subject: String,
    pub template: String,
    pub template_html: Option<String>,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl EmailTemplateRow {
    pub fn to_model(&self) -> EmailTemplate {
        let r#type = EmailTemplateType::from_str(&self.template_type).unwrap_or_else(|_| {
            tracing::warn!(
                "unknown email_template type: id={}, type={}",
                self.id,
                &self.template_type
            );
            EmailTemplateType::default()
        });
        EmailTemplate {
            id: self.id,
            data: EmailTemplateData {
                organization_id: self.organization_id,
                r#type,
                subject: self.subject.clone(),
                template: self.template.clone(),
                template_html: self.template_html.clone(),
            },
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}
