//! Domain errors for the meeting pipeline.

use thiserror::Error;

use crate::db::{SaveStep, SummarySaveError};

/// Failures raised by collaborator adapters before any network call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} provider is not implemented")]
    NotImplemented(String),
    #[error("{0} is not configured")]
    MissingCredentials(&'static str),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("provider not implemented: {0}")]
    ProviderNotImplemented(String),
    #[error("{context}")]
    Upstream {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
    #[error("summary save stopped at {step}")]
    PartialWrite {
        step: SaveStep,
        #[source]
        source: anyhow::Error,
    },
    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn storage(context: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| Self::Storage { context, source }
    }

    /// Classify a collaborator failure. Configuration problems surface as
    /// provider errors, everything else as an upstream failure.
    pub fn upstream(context: &'static str) -> impl FnOnce(anyhow::Error) -> Self {
        move |source| match source.downcast_ref::<ProviderError>() {
            Some(ProviderError::NotImplemented(name)) => Self::ProviderNotImplemented(name.clone()),
            Some(ProviderError::MissingCredentials(what)) => Self::ProviderUnavailable(what.to_string()),
            None => Self::Upstream { context, source },
        }
    }

    /// Short text safe to show to an end user. Collaborator detail stays in
    /// the logs.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput(message) | Self::NotFound(message) => message.clone(),
            Self::ProviderUnavailable(_) => "The processing service is not configured.".to_string(),
            Self::ProviderNotImplemented(_) => "The selected provider is not available yet.".to_string(),
            Self::Upstream { context, .. } | Self::Storage { context, .. } => format!("{}.", context),
            Self::PartialWrite { .. } => "The summary could only be partially saved.".to_string(),
        }
    }
}

impl From<SummarySaveError> for PipelineError {
    fn from(err: SummarySaveError) -> Self {
        match err.step {
            // Nothing was written yet.
            SaveStep::UpsertSummary => Self::Storage {
                context: "Failed to save summary",
                source: err.source,
            },
            step => Self::PartialWrite {
                step,
                source: err.source,
            },
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_classifies_provider_errors() {
        let err = PipelineError::upstream("Transcription failed")(anyhow::Error::new(
            ProviderError::NotImplemented("assemblyai".to_string()),
        ));
        assert!(matches!(err, PipelineError::ProviderNotImplemented(ref name) if name == "assemblyai"));

        let err = PipelineError::upstream("Transcription failed")(anyhow::Error::new(
            ProviderError::MissingCredentials("OPENAI_API_KEY"),
        ));
        assert!(matches!(err, PipelineError::ProviderUnavailable(_)));

        let err = PipelineError::upstream("Transcription failed")(anyhow::anyhow!("HTTP 502: bad gateway"));
        assert!(matches!(err, PipelineError::Upstream { .. }));
    }

    #[test]
    fn test_user_message_hides_upstream_detail() {
        let err = PipelineError::upstream("Summarization failed")(anyhow::anyhow!(
            "raw provider body with secrets"
        ));
        assert_eq!(err.user_message(), "Summarization failed.");
        assert!(!err.user_message().contains("secrets"));
    }

    #[test]
    fn test_partial_write_from_save_error() {
        let err: PipelineError = SummarySaveError {
            step: SaveStep::InsertActionItems,
            source: anyhow::anyhow!("disk full"),
        }
        .into();
        assert!(matches!(
            err,
            PipelineError::PartialWrite {
                step: SaveStep::InsertActionItems,
                ..
            }
        ));
        assert_eq!(err.to_string(), "summary save stopped at insert_action_items");
    }

    #[test]
    fn test_failed_first_save_step_is_storage_failure() {
        let err: PipelineError = SummarySaveError {
            step: SaveStep::UpsertSummary,
            source: anyhow::anyhow!("database is locked"),
        }
        .into();
        assert!(matches!(err, PipelineError::Storage { .. }));
        assert_eq!(err.user_message(), "Failed to save summary.");
    }
}
