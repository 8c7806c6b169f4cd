use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct InternationalizationData {
    pub language: String,
    /// json text of translations
    pub language_file: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Internationalization {
    pub id: i64,
    pub data: InternationalizationData,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}
