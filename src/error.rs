// src/error.rs

use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling for the quiz client and maps every failure
/// to a message that can be shown to the respondent.
#[derive(Debug)]
pub enum AppError {
    // Missing or malformed environment configuration
    Config(String),

    // Quiz definition could not be fetched (non-success status)
    NotFound(String),

    // Quiz definition fetched but rejected by validation
    InvalidQuiz(String),

    // Submit call answered with a non-success status
    Submission(String),

    // Transport-level failure (connect, timeout, body decode)
    Http(String),
}

impl AppError {
    /// Message shown to the respondent. Transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(msg) => format!("Configuration error: {}", msg),
            AppError::NotFound(_) => "Quiz not found".to_string(),
            AppError::InvalidQuiz(msg) => format!("Quiz could not be loaded: {}", msg),
            AppError::Submission(msg) => format!("Failed to submit quiz: {}", msg),
            AppError::Http(_) => "Network error, please check your connection".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Converts `reqwest::Error` into `AppError::Http`.
/// Allows using `?` operator on requests.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("HTTP transport error: {}", err);
        AppError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidQuiz(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidQuiz(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AppError::NotFound("GET /quizzes/7 -> 404".to_string());
        assert_eq!(err.user_message(), "Quiz not found");
    }

    #[test]
    fn test_submission_message_keeps_reason() {
        let err = AppError::Submission("500 Internal Server Error".to_string());
        assert_eq!(
            err.user_message(),
            "Failed to submit quiz: 500 Internal Server Error"
        );
    }

    #[test]
    fn test_url_error_is_config() {
        let err: AppError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, AppError::Config(_)));
    }
}
