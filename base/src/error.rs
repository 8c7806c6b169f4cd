use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field keyed validation messages (`non_field_errors` for object level ones).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub const NON_FIELD_ERRORS: &'static str = "non_field_errors";

    pub fn new() -> Self {
        Self::default()
    }
    pub fn field(name: impl Into<String>, message: impl Into<String>) -> Self {
        let mut e = Self::new();
        e.add(name, message);
        e
    }
    pub fn non_field(message: impl Into<String>) -> Self {
        Self::field(Self::NON_FIELD_ERRORS, message)
    }
    pub fn add(&mut self, name: impl Into<String>, message: impl Into<String>) {
        self.0.entry(name.into()).or_default().push(message.into());
    }
    pub fn merge(&mut self, other: ValidationErrors) {
        for (k, v) in other.0 {
            self.0.entry(k).or_default().extend(v);
        }
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn get(&self, name: &str) -> Option<&Vec<String>> {
        self.0.get(name)
    }
    // Ok if nothing was collected
    pub fn into_result(self) -> Result<(), BifrostError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(BifrostError::ValidationError(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v.join(" ")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

#[derive(Debug, Error)]
pub enum BifrostError {
    #[error("InvalidParameter({0})")]
    InvalidParameter(String),
    #[error("ValidationError({0})")]
    ValidationError(ValidationErrors),
    #[error("NotFound({0})")]
    NotFound(String),
    #[error("AlreadyExists({0})")]
    AlreadyExists(String),
    #[error("Unauthorized({0})")]
    Unauthorized(String),
    #[error("PermissionDenied({0})")]
    PermissionDenied(String),
    #[error("ConfigurationError({0})")]
    ConfigurationError(String),
    #[error("GenerateIdError({0})")]
    GenerateIdError(String),
    #[error("serde_json error({0:?})")]
    SerdeJsonError(serde_json::error::Error),
    #[error("DBError({0:?})")]
    DBError(sqlx::Error),
    #[error("ReqwestError({0:?})")]
    ReqwestError(reqwest::Error),
    #[error("JwtError({0:?})")]
    JwtError(jsonwebtoken::errors::Error),
    #[error("TemplateError({0:?})")]
    TemplateError(liquid::Error),
    #[error("EmailError({0})")]
    EmailError(String),
    #[error("RuntimeError({0})")]
    RuntimeError(String),
    #[error("OtherError({0})")]
    OtherError(String),
}

impl BifrostError {
    pub fn validation_field(name: impl Into<String>, message: impl Into<String>) -> Self {
        BifrostError::ValidationError(ValidationErrors::field(name, message))
    }
    pub fn validation_non_field(message: impl Into<String>) -> Self {
        BifrostError::ValidationError(ValidationErrors::non_field(message))
    }
    /// unique constraint violation from the rdb
    pub fn is_unique_violation(&self) -> bool {
        match self {
            BifrostError::DBError(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for BifrostError {
    fn from(e: serde_json::Error) -> Self {
        BifrostError::SerdeJsonError(e)
    }
}
impl From<sqlx::Error> for BifrostError {
    fn from(e: sqlx::Error) -> Self {
        BifrostError::DBError(e)
    }
}
impl From<reqwest::Error> for BifrostError {
    fn from(e: reqwest::Error) -> Self {
        BifrostError::ReqwestError(e)
    }
}
impl From<jsonwebtoken::errors::Error> for BifrostError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        BifrostError::JwtError(e)
    }
}
impl From<liquid::Error> for BifrostError {
    fn from(e: liquid::Error) -> Self {
        BifrostError::TemplateError(e)
    }
}
