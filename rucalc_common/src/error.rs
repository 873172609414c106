use ::core::fmt::Display;

use ::anyhow::Error;

pub type Result<T> = std::result::Result<T, RucalcError>;

/// Classification of [RucalcError], used by the orchestrator to pick a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RucalcErrorType {
    NotFound,
    InvalidArgument,
    InvalidExpression,
    FailToLoadConfig,
    FailToStartServer,
    FailToStartAgent,
    FailToConnectOrchestrator,
}

impl Display for RucalcErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::NotFound => "Not found",
            Self::InvalidArgument => "Invalid argument",
            Self::InvalidExpression => "Invalid expression",
            Self::FailToLoadConfig => "Fail to load config",
            Self::FailToStartServer => "Fail to start server",
            Self::FailToStartAgent => "Fail to start agent",
            Self::FailToConnectOrchestrator => "Fail to connect orchestrator",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct RucalcError {
    error_type: RucalcErrorType,
    error: Error,
}

impl RucalcError {
    fn new<E: Into<Error>>(error_type: RucalcErrorType, error: E) -> Self {
        Self {
            error_type,
            error: error.into(),
        }
    }

    pub fn get_error_type(&self) -> RucalcErrorType {
        self.error_type
    }

    pub fn not_found<E: Into<Error>>(error: E) -> Self {
        Self::new(RucalcErrorType::NotFound, error)
    }

    pub fn invalid_argument<E: Into<Error>>(error: E) -> Self {
        Self::new(RucalcErrorType::InvalidArgument, error)
    }

    pub fn invalid_expression<E: Into<Error>>(error: E) -> Self {
        Self::new(RucalcErrorType::InvalidExpression, error)
    }

    pub fn fail_to_load_config<E: Into<Error>>(error: E) -> Self {
        Self::new(RucalcErrorType::FailToLoadConfig, error)
    }

    pub fn fail_to_start_server<E: Into<Error>>(error: E) -> Self {
        Self::new(RucalcErrorType::FailToStartServer, error)
    }

    pub fn fail_to_start_agent<E: Into<Error>>(error: E) -> Self {
        Self::new(RucalcErrorType::FailToStartAgent, error)
    }

    pub fn fail_to_connect_orchestrator<E: Into<Error>>(error: E) -> Self {
        Self::new(RucalcErrorType::FailToConnectOrchestrator, error)
    }
}

impl Display for RucalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_type, self.error)
    }
}

impl std::error::Error for RucalcError {}

impl<T> From<RucalcError> for Result<T> {
    fn from(val: RucalcError) -> Self {
        Result::Err(val)
    }
}
