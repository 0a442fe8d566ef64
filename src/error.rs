use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::{models::CampaignKind, storage::StorageError},
    domain::{status::InvalidTransition, transfer::InvalidTransferTransition},
    services::identity::CredentialError,
};

/// Failures raised by the workflow services.
///
/// Every business-rule rejection is a dedicated variant so callers branch on
/// the kind, never on message text.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A referenced entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The actor lacks the role or club scope the operation requires.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// The operation is not legal from the entity's current status.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// The activation token does not match or was already consumed.
    #[error("activation token invalid or already consumed")]
    InvalidToken,
    /// Login or refresh failed.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// The player already holds an ACTIVA scholarship.
    #[error("player already holds an active scholarship")]
    DuplicateActiveScholarship,
    /// A campaign for this kind and year already ran.
    #[error("a {kind} campaign for {year} already exists")]
    DuplicateCampaign {
        /// Kind of the clashing campaign.
        kind: CampaignKind,
        /// Year the clashing campaign bills for.
        year: i32,
    },
    /// The email belongs to an administrator account.
    #[error("email belongs to an administrator account")]
    AdminEmailConflict,
    /// The target already belongs to the club in question.
    #[error("already a member: {0}")]
    AlreadyMember(String),
    /// Missing or malformed input.
    #[error("invalid input: {0}")]
    Validation(String),
    /// A campaign fan-out stopped mid-way; re-running it resumes where it
    /// left off without duplicating tickets.
    #[error("campaign fan-out interrupted after {completed} entities")]
    CampaignInterrupted {
        /// Entities fully processed before the failure.
        completed: usize,
        /// The batch failure that cut the fan-out short.
        #[source]
        source: StorageError,
    },
    /// The document store failed.
    #[error("storage failure")]
    Storage(#[from] StorageError),
    /// The credential provider failed for a reason other than bad credentials.
    #[error("credential provider failure")]
    Credential(#[source] CredentialError),
    /// The image pipeline failed.
    #[error("image pipeline failure")]
    Media(#[from] crate::services::media::MediaError),
    /// Signing or decoding a token failed unexpectedly.
    #[error("token handling failed")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl WorkflowError {
    /// Stable machine-readable code exposed to clients.
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::NotFound(_) => "NOT_FOUND",
            WorkflowError::Forbidden(_) => "FORBIDDEN",
            WorkflowError::InvalidState(_) => "INVALID_STATE",
            WorkflowError::InvalidToken => "INVALID_TOKEN",
            WorkflowError::InvalidCredentials => "INVALID_CREDENTIALS",
            WorkflowError::DuplicateActiveScholarship => "DUPLICATE_ACTIVE_SCHOLARSHIP",
            WorkflowError::DuplicateCampaign { .. } => "DUPLICATE_CAMPAIGN",
            WorkflowError::AdminEmailConflict => "ADMIN_EMAIL_CONFLICT",
            WorkflowError::AlreadyMember(_) => "ALREADY_MEMBER",
            WorkflowError::Validation(_) => "VALIDATION_ERROR",
            WorkflowError::CampaignInterrupted { .. } => "CAMPAIGN_INTERRUPTED",
            WorkflowError::Storage(_) => "STORAGE_FAILURE",
            WorkflowError::Credential(_) => "CREDENTIAL_PROVIDER_FAILURE",
            WorkflowError::Media(_) => "MEDIA_FAILURE",
            WorkflowError::Token(_) => "TOKEN_FAILURE",
        }
    }
}

impl From<InvalidTransition> for WorkflowError {
    fn from(err: InvalidTransition) -> Self {
        WorkflowError::InvalidState(err.to_string())
    }
}

impl From<InvalidTransferTransition> for WorkflowError {
    fn from(err: InvalidTransferTransition) -> Self {
        WorkflowError::InvalidState(err.to_string())
    }
}

impl From<ValidationErrors> for WorkflowError {
    fn from(err: ValidationErrors) -> Self {
        WorkflowError::Validation(err.to_string())
    }
}

/// Application-level error converted into an HTTP response.
///
/// Internal failure detail is logged, never serialized: clients receive the
/// stable code plus a human-readable message.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    /// 401 with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let status = match &err {
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::Forbidden(_) => StatusCode::FORBIDDEN,
            WorkflowError::InvalidToken | WorkflowError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            WorkflowError::InvalidState(_)
            | WorkflowError::DuplicateActiveScholarship
            | WorkflowError::DuplicateCampaign { .. }
            | WorkflowError::AdminEmailConflict
            | WorkflowError::AlreadyMember(_) => StatusCode::CONFLICT,
            WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
            WorkflowError::CampaignInterrupted { .. }
            | WorkflowError::Storage(_)
            | WorkflowError::Credential(_)
            | WorkflowError::Media(_)
            | WorkflowError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?err, "workflow operation failed");
        }

        Self {
            status,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::from(WorkflowError::from(err))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorBody {
            message: self.message,
            code: self.code,
        });

        (self.status, payload).into_response()
    }
}
