use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("Failed to resolve local address via {probe}: {source}")]
    AddressResolution {
        probe: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Compute engine unavailable at {master}: {reason}")]
    EngineUnavailable { master: String, reason: String },

    #[error("Invalid master URL '{url}': {reason}")]
    InvalidMasterUrl { url: String, reason: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Job failed: {message}")]
    JobFailed { message: String },

    #[error("Session '{app_name}' has already been stopped")]
    SessionStopped { app_name: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Configuration,
    Engine,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SmokeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SmokeError::AddressResolution { .. } | SmokeError::Http(_) => ErrorCategory::Network,
            SmokeError::InvalidMasterUrl { .. }
            | SmokeError::MissingConfigError { .. }
            | SmokeError::InvalidConfigValueError { .. }
            | SmokeError::ConfigError { .. } => ErrorCategory::Configuration,
            SmokeError::EngineUnavailable { .. }
            | SmokeError::JobFailed { .. }
            | SmokeError::SessionStopped { .. } => ErrorCategory::Engine,
            SmokeError::Io(_) | SmokeError::Serialization(_) | SmokeError::Csv(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 叢集暫時無法連線，重試可能成功
            SmokeError::EngineUnavailable { .. } | SmokeError::Http(_) => ErrorSeverity::Medium,
            SmokeError::AddressResolution { .. } | SmokeError::Io(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SmokeError::AddressResolution { .. } => {
                "No default route found. Pass --driver-host (or SPARK_DRIVER_HOST) explicitly"
                    .to_string()
            }
            SmokeError::EngineUnavailable { master, .. } => format!(
                "Check that the master at {} is running and reachable from this host",
                master
            ),
            SmokeError::InvalidMasterUrl { .. } => {
                "Use spark://HOST:PORT, local, local[N] or local[*]".to_string()
            }
            SmokeError::MissingConfigError { field } => format!(
                "Set {} via command line, environment, .env file or TOML config",
                field
            ),
            SmokeError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of {}", field)
            }
            SmokeError::ConfigError { .. } => "Check the configuration file syntax".to_string(),
            SmokeError::JobFailed { .. } | SmokeError::SessionStopped { .. } => {
                "Re-run with --verbose to see per-partition progress".to_string()
            }
            SmokeError::Http(_) => "Check the master UI port (--master-ui-port)".to_string(),
            SmokeError::Io(_) | SmokeError::Serialization(_) | SmokeError::Csv(_) => {
                "Check file permissions and available disk space".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Network problem: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Engine => format!("Cluster problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SmokeError>;
