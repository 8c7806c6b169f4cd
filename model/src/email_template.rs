use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

#[derive(
    Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmailTemplateType {
    #[default]
    ResetPassword,
    Invitation,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct EmailTemplateData {
    pub organization_id: i64,
    pub r#type: EmailTemplateType,
    pub subject: String,
    pub template: String,
    pub template_html: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EmailTemplate {
    pub id: i64,
    pub data: EmailTemplateData,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}
