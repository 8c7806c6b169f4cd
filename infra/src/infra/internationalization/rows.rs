use chrono::{DateTime, Utc};
use model::{Internationalization, InternationalizationData};

#[derive(sqlx::FromRow, Debug, Clone)]
pub struct InternationalizationRow {
    pub id: i64,
    pub language: String,
    pub language_file: String,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl InternationalizationRow {
    pub fn to_model(&self) -> Internationalization {
        Internationalization {
            id: self.id,
            data: InternationalizationData {
                language: self.language.clone(),
                language_file: self.language_file.clone(),
            },
            create_date: self.create_date,
            edit_date: self.edit_date,
        }
    }
}
