//! Error taxonomy shared by the model, the option resolver and every codec.

/// Failures raised by the library.
///
/// None of these are recovered locally; they propagate to the driver which
/// decides whether to abort the run or skip one format.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Structural misuse of the model (unstarted report, empty code,
    /// structural dump missing a required field).
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Input handed to `parse` is not valid for the claimed format.
    #[error("invalid {format} input: {message}")]
    Format { format: String, message: String },

    /// An option value could not be resolved for its declared mode.
    #[error("invalid option '{option}': {message}")]
    Configuration { option: String, message: String },
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    pub fn missing_field(field: &str) -> Self {
        ReportError::Precondition(format!("missing required field: {field}"))
    }

    pub fn format(format: &str, message: impl Into<String>) -> Self {
        ReportError::Format {
            format: format.to_string(),
            message: message.into(),
        }
    }

    pub fn configuration(option: &str, message: impl Into<String>) -> Self {
        ReportError::Configuration {
            option: option.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_the_field() {
        let err = ReportError::missing_field("basePath");
        assert!(matches!(&err, ReportError::Precondition(m) if m.contains("basePath")));
        assert_eq!(
            err.to_string(),
            "precondition failed: missing required field: basePath"
        );
    }

    #[test]
    fn test_format_error_display() {
        let err = ReportError::format("sarif", "expected value at line 1 column 1");
        assert_eq!(
            err.to_string(),
            "invalid sarif input: expected value at line 1 column 1"
        );
    }
}
