use thiserror::Error;

use crate::render::RenderError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("agreement is missing required fields: {missing:?}")]
    MissingFields { missing: Vec<&'static str> },
}

/// Recoverable failure of a single dialogue step. Every variant carries the
/// message shown to the operator in the same turn.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StepError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    LookupMiss(String),
    #[error("{0}")]
    StaleSelection(String),
    #[error("{0}")]
    Render(String),
}

impl StepError {
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::LookupMiss(message)
            | Self::StaleSelection(message)
            | Self::Render(message) => message,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::LookupMiss(_) => "lookup_miss",
            Self::StaleSelection(_) => "stale_selection",
            Self::Render(_) => "render",
        }
    }
}

impl From<RenderError> for StepError {
    fn from(value: RenderError) -> Self {
        match value {
            RenderError::TemplateNotFound(name) => {
                Self::Render(format!("Шаблон не найден: {name}"))
            }
            other => Self::Render(format!("Ошибка генерации документа: {other}")),
        }
    }
}

impl From<DomainError> for StepError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::MissingFields { missing } => Self::Validation(format!(
                "Не хватает данных: {}. Отмените операцию и начните заново.",
                missing.join(", ")
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error(transparent)]
    Catalog(#[from] crate::catalog::CatalogError),
    #[error("integration failure: {0}")]
    Integration(String),
}

#[cfg(test)]
mod tests {
    use crate::errors::{DomainError, StepError};
    use crate::render::RenderError;

    #[test]
    fn missing_template_is_reported_with_template_name() {
        let error = StepError::from(RenderError::TemplateNotFound("prepayment.html.tera".into()));

        assert_eq!(error.kind(), "render");
        assert_eq!(error.user_message(), "Шаблон не найден: prepayment.html.tera");
    }

    #[test]
    fn render_failure_keeps_underlying_detail() {
        let error = StepError::from(RenderError::Template("unexpected `}}`".into()));

        assert!(error.user_message().starts_with("Ошибка генерации документа:"));
        assert!(error.user_message().contains("unexpected `}}`"));
    }

    #[test]
    fn missing_fields_map_to_validation_message() {
        let error = StepError::from(DomainError::MissingFields {
            missing: vec!["tons", "price"],
        });

        assert_eq!(error.kind(), "validation");
        assert!(error.user_message().contains("tons, price"));
    }
}
