use chrono::{DateTime, Utc};
use model::{Internationalization, InternationalizationData};
use serde::{Deserialize, Serialize};

/// `language_file` is exchanged as json
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InternationalizationRepr {
    pub id: i64,
    pub language: String,
    pub language_file: serde_json::Value,
    pub create_date: DateTime<Utc>,
    pub edit_date: DateTime<Utc>,
}

impl From<&Internationalization> for InternationalizationRepr {
    fn from(i: &Internationalization) -> Self {
        Self {
            id: i.id,
            language: i.data.language.clone(),
            language_file: parse_language_file(&i.data.language_file),
            create_date: i.create_date,
            edit_date: i.edit_date,
        }
    }
}

fn parse_language_file(text: &str) -> serde_json::Value {
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InternationalizationInput {
    pub language: String,
    pub language_file: serde_json::Value,
}

impl From<&Internationalization> for InternationalizationInput {
    fn from(i: &Internationalization) -> Self {
        Self {
            language: i.data.language.clone(),
            language_file: parse_language_file(&i.data.language_file),
        }
    }
}

impl From<InternationalizationInput> for InternationalizationData {
    fn from(i: InternationalizationInput) -> Self {
        let language_file = match i.language_file {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Self {
            language: i.language,
            language_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_file_as_json() {
        let now = Utc::now();
        let i18n = Internationalization {
            id: 1,
            data: InternationalizationData {
                language: "pt-BR".to_string(),
                language_file: r#"{"name": "Nome", "gender": "Gênero"}"#.to_string(),
            },
            create_date: now,
            edit_date: now,
        };
        let repr = InternationalizationRepr::from(&i18n);
        assert_eq!(repr.language_file["gender"], serde_json::json!("Gênero"));
        let data = InternationalizationData::from(InternationalizationInput::from(&i18n));
        let parsed: serde_json::Value = serde_json::from_str(&data.language_file).unwrap();
        assert_eq!(parsed, serde_json::json!({"name": "Nome", "gender": "Gênero"}));
    }
}
