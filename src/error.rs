use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompassError {
    #[error("no scenario matches key {key}")]
    NotFound { key: String },

    #[error("scenario data unavailable: {reason}")]
    DataUnavailable { reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CompassError {
    pub fn data_unavailable(reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
