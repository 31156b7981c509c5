//! Response Envelope
//!
//! Every backend endpoint answers with the same envelope:
//!
//! ```json
//! { "success": true, "data": { ... }, "error": null }
//! { "success": false, "data": null, "error": { "code": "DB0101", "message": "..." } }
//! ```
//!
//! The client guarantees that a successful envelope never carries an error
//! and a failed one always does (see [`ApiResponse::normalize`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Transport failed, timed out or the body could not be decoded
pub const NETWORK_FAILURE: &str = "NETWORK_FAILURE";

/// The server answered with something other than JSON
pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";

/// A failed envelope arrived without an error payload
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Fallback user-facing message
pub const DEFAULT_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Error details carried by a failed envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl ErrorPayload {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Backend database error code, when the code is one the client knows
    pub fn db_code(&self) -> Option<DbErrorCode> {
        DbErrorCode::from_code(&self.code)
    }
}

/// Uniform response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "none")]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<ErrorPayload>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> ApiResponse<T> {
    /// Successful envelope with a payload
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Successful envelope without a payload (HTTP 204)
    pub fn no_content() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Failed envelope
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorPayload::new(code, message)),
        }
    }

    /// Enforce the success/error mutual exclusion
    ///
    /// A successful body drops any stray error; a failed body without an
    /// error gets an [`UNKNOWN_ERROR`] payload.
    pub fn normalize(mut self) -> Self {
        if self.success {
            self.error = None;
        } else {
            self.data = None;
            if self.error.is_none() {
                self.error = Some(ErrorPayload::new(UNKNOWN_ERROR, DEFAULT_ERROR_MESSAGE));
            }
        }
        self
    }

    /// True when the envelope reports a failure with an error payload
    pub fn has_error(&self) -> bool {
        !self.success && self.error.is_some()
    }

    /// Split the envelope into the payload or the error
    pub fn into_result(self) -> Result<Option<T>, ErrorPayload> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .error
                .unwrap_or_else(|| ErrorPayload::new(UNKNOWN_ERROR, DEFAULT_ERROR_MESSAGE)))
        }
    }
}

/// Result of a request as seen by callers
///
/// HTTP 401 is not folded into the envelope: the caller has to decide how
/// to end the session, which in this client is the router's job.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Completed(ApiResponse<T>),
    Unauthorized,
}

/// Marker error for an expired or rejected session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session is not authorized")]
pub struct Unauthorized;

impl<T> ApiOutcome<T> {
    /// Unwrap the envelope, turning a 401 into [`Unauthorized`]
    pub fn authorized(self) -> Result<ApiResponse<T>, Unauthorized> {
        match self {
            ApiOutcome::Completed(response) => Ok(response),
            ApiOutcome::Unauthorized => Err(Unauthorized),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiOutcome::Unauthorized)
    }
}

/// User-facing message for an error payload
///
/// The backend message is shown verbatim; the client does not reinterpret
/// domain errors.
pub fn resolve_error_message(error: Option<&ErrorPayload>) -> String {
    match error {
        Some(e) if !e.message.trim().is_empty() => e.message.clone(),
        _ => DEFAULT_ERROR_MESSAGE.to_string(),
    }
}

/// Database error codes declared by the backend contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbErrorCode {
    Unauthenticated,
    TenantNotFound,
    TenantOnlyOwner,
    TenantMultipleOwners,
    TenantInvalidName,
    MembershipNoPermission,
    MembershipNotMember,
    MembershipLastOwner,
    MembershipAlreadyMember,
    MembershipInvalidRole,
    MembershipSelfRemovalNotAllowed,
    MembershipAdminCannotRemove,
    MembershipCallerNotMember,
    MembershipLastOwnerLeave,
    RequestNotFound,
    RequestCannotApproveInvitation,
    RequestCannotAcceptJoin,
    RequestOnlyPending,
    RequestNotAuthorized,
    RequestBlockedByInvitation,
    RequestBlockedByJoinRequest,
    RequestJoinRequestExists,
    RequestInvitationExists,
    RequestTargetUserNotExist,
    RequestOnlyOwnerOrAdmin,
    RequestOnlyOwnerAdminCancel,
    NoteNotFound,
    NoteOnlyOwner,
    NoteTenantInactive,
    ShareSelfShare,
    ShareInvalidPermission,
    ShareTargetNotMember,
    ShareOnlyOwnerChange,
    ShareNoteNotFound,
    ShareCallerNotTenantMember,
}

const DB_ERROR_CODES: &[(&str, DbErrorCode)] = &[
    ("DB0001", DbErrorCode::Unauthenticated),
    ("DB0101", DbErrorCode::TenantNotFound),
    ("DB0102", DbErrorCode::TenantOnlyOwner),
    ("DB0103", DbErrorCode::TenantMultipleOwners),
    ("DB0104", DbErrorCode::TenantInvalidName),
    ("DB0201", DbErrorCode::MembershipNoPermission),
    ("DB0202", DbErrorCode::MembershipNotMember),
    ("DB0203", DbErrorCode::MembershipLastOwner),
    ("DB0204", DbErrorCode::MembershipAlreadyMember),
    ("DB0205", DbErrorCode::MembershipInvalidRole),
    ("DB0206", DbErrorCode::MembershipSelfRemovalNotAllowed),
    ("DB0207", DbErrorCode::MembershipAdminCannotRemove),
    ("DB0208", DbErrorCode::MembershipCallerNotMember),
    ("DB0209", DbErrorCode::MembershipLastOwnerLeave),
    ("DB0301", DbErrorCode::RequestNotFound),
    ("DB0302", DbErrorCode::RequestCannotApproveInvitation),
    ("DB0303", DbErrorCode::RequestCannotAcceptJoin),
    ("DB0304", DbErrorCode::RequestOnlyPending),
    ("DB0305", DbErrorCode::RequestNotAuthorized),
    ("DB0306", DbErrorCode::RequestBlockedByInvitation),
    ("DB0307", DbErrorCode::RequestBlockedByJoinRequest),
    ("DB0308", DbErrorCode::RequestJoinRequestExists),
    ("DB0309", DbErrorCode::RequestInvitationExists),
    ("DB0310", DbErrorCode::RequestTargetUserNotExist),
    ("DB0311", DbErrorCode::RequestOnlyOwnerOrAdmin),
    ("DB0312", DbErrorCode::RequestOnlyOwnerAdminCancel),
    ("DB0401", DbErrorCode::NoteNotFound),
    ("DB0402", DbErrorCode::NoteOnlyOwner),
    ("DB0403", DbErrorCode::NoteTenantInactive),
    ("DB0501", DbErrorCode::ShareSelfShare),
    ("DB0502", DbErrorCode::ShareInvalidPermission),
    ("DB0503", DbErrorCode::ShareTargetNotMember),
    ("DB0504", DbErrorCode::ShareOnlyOwnerChange),
    ("DB0505", DbErrorCode::ShareNoteNotFound),
    ("DB0506", DbErrorCode::ShareCallerNotTenantMember),
];

impl DbErrorCode {
    pub fn from_code(code: &str) -> Option<Self> {
        DB_ERROR_CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, known)| *known)
    }

    pub fn code(self) -> &'static str {
        DB_ERROR_CODES
            .iter()
            .find(|(_, known)| *known == self)
            .map(|(c, _)| *c)
            .unwrap_or("DB0000")
    }
}

/// True when `code` belongs to the backend's database error catalogue
pub fn is_known_error_code(code: &str) -> bool {
    DbErrorCode::from_code(code).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_success_envelope() {
        let body = json!({"success": true, "data": {"n": 1}, "error": null});
        let response: ApiResponse<serde_json::Value> = serde_json::from_value(body).unwrap();
        assert!(response.success);
        assert_eq!(response.data, Some(json!({"n": 1})));
        assert!(!response.has_error());
    }

    #[test]
    fn test_parse_envelope_without_optional_fields() {
        let response: ApiResponse<serde_json::Value> =
            serde_json::from_value(json!({"success": true})).unwrap();
        assert_eq!(response.data, None);
        assert_eq!(response.error, None);
    }

    #[test]
    fn test_normalize_fills_missing_error() {
        let response: ApiResponse<()> = ApiResponse {
            success: false,
            data: None,
            error: None,
        }
        .normalize();

        let error = response.error.expect("error must be present");
        assert_eq!(error.code, UNKNOWN_ERROR);
    }

    #[test]
    fn test_normalize_drops_error_on_success() {
        let response = ApiResponse {
            success: true,
            data: Some(1),
            error: Some(ErrorPayload::new("X", "y")),
        }
        .normalize();

        assert_eq!(response.error, None);
        assert_eq!(response.data, Some(1));
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ApiResponse::ok(5).into_result(), Ok(Some(5)));
        let err = ApiResponse::<i32>::failure("DB0101", "Tenant not found")
            .into_result()
            .unwrap_err();
        assert_eq!(err.db_code(), Some(DbErrorCode::TenantNotFound));
    }

    #[test]
    fn test_resolve_error_message() {
        let payload = ErrorPayload::new("DB0203", "Cannot remove the last owner");
        assert_eq!(
            resolve_error_message(Some(&payload)),
            "Cannot remove the last owner"
        );
        assert_eq!(resolve_error_message(None), DEFAULT_ERROR_MESSAGE);
        assert_eq!(
            resolve_error_message(Some(&ErrorPayload::new("X", ""))),
            DEFAULT_ERROR_MESSAGE
        );
    }

    #[test]
    fn test_known_error_codes() {
        assert!(is_known_error_code("DB0001"));
        assert!(is_known_error_code("DB0506"));
        assert!(!is_known_error_code("NETWORK_FAILURE"));
        assert_eq!(DbErrorCode::NoteOnlyOwner.code(), "DB0402");
    }

    #[test]
    fn test_outcome_authorized() {
        let outcome: ApiOutcome<()> = ApiOutcome::Unauthorized;
        assert!(outcome.is_unauthorized());
        assert_eq!(outcome.authorized(), Err(Unauthorized));

        let outcome = ApiOutcome::Completed(ApiResponse::ok(3));
        assert_eq!(outcome.authorized().unwrap().data, Some(3));
    }
}
