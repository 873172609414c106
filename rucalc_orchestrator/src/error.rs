use ::core::fmt::Display;

use ::axum::response::{IntoResponse, Response};
use ::http::StatusCode;
use ::rucalc_common::error::{RucalcError, RucalcErrorType::*};

/// [RucalcServerError] is a wrapper for [RucalcError] to convert it into Axum response
#[derive(Debug)]
pub struct RucalcServerError(RucalcError);

impl RucalcServerError {
    fn get_status_code(&self) -> StatusCode {
        match self.0.get_error_type() {
            NotFound => StatusCode::NOT_FOUND,
            InvalidArgument => StatusCode::UNPROCESSABLE_ENTITY,
            InvalidExpression => StatusCode::UNPROCESSABLE_ENTITY,
            FailToLoadConfig => StatusCode::INTERNAL_SERVER_ERROR,
            FailToStartServer => StatusCode::INTERNAL_SERVER_ERROR,
            FailToStartAgent => StatusCode::INTERNAL_SERVER_ERROR,
            FailToConnectOrchestrator => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RucalcError> for RucalcServerError {
    fn from(error: RucalcError) -> Self {
        Self(error)
    }
}

/// [RucalcServerError] displays in the same way as [RucalcError]
impl Display for RucalcServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl IntoResponse for RucalcServerError {
    fn into_response(self) -> Response {
        let status = self.get_status_code();
        (status, self.to_string()).into_response()
    }
}

impl<T> From<RucalcServerError> for Result<T, RucalcServerError> {
    fn from(val: RucalcServerError) -> Self {
        Result::Err(val)
    }
}
