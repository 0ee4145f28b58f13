use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrendError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} from {endpoint}")]
    HttpStatus { status: u16, endpoint: String },

    #[error("Not authenticated: {message}")]
    Unauthenticated { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Authentication,
    Configuration,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code: 2 for retryable failures, 1 for request or input
    /// problems, 3 for local system failures.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl TrendError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::HttpStatus { .. } => ErrorCategory::Network,
            Self::Unauthenticated { .. } => ErrorCategory::Authentication,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::SerializationError(_) => ErrorCategory::Data,
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ApiError(e) if e.is_timeout() || e.is_connect() => ErrorSeverity::Medium,
            Self::HttpStatus { status, .. } if *status >= 500 => ErrorSeverity::Medium,
            Self::ApiError(_) | Self::HttpStatus { .. } => ErrorSeverity::High,
            Self::Unauthenticated { .. } => ErrorSeverity::High,
            Self::SerializationError(_) => ErrorSeverity::High,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::High,
            Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::ApiError(_) => "Check the API URL and your network connection, then retry",
            Self::HttpStatus { .. } => "The backend rejected the request; retry later or check the endpoint",
            Self::Unauthenticated { .. } => {
                "Log in again and pass a fresh token via --access-token or --session-file"
            }
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => {
                "Make sure the input is a JSON array of publication records"
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the command line flags and config file",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) | Self::HttpStatus { .. } => {
                format!("Could not load publications from the server ({})", self)
            }
            Self::Unauthenticated { .. } => "Your session has expired or is missing".to_string(),
            Self::SerializationError(_) => "Publication data could not be read".to_string(),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrendError>;
