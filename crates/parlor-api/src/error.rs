use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use parlor_core::CoreError;
use tracing::error;

/// Transport-level view of a core failure. Each error kind maps to one
/// status; storage faults are logged and never echoed to the client.
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CoreError::DuplicateUsername(_)
            | CoreError::DuplicateRoom(_)
            | CoreError::VersionConflict { .. } => StatusCode::CONFLICT,
            CoreError::RoomNotFound(_)
            | CoreError::FileNotFound { .. }
            | CoreError::EmoticonNotFound(_) => StatusCode::NOT_FOUND,
            CoreError::NotAllowed { .. } => StatusCode::FORBIDDEN,
            CoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CoreError::Storage(e) => {
                error!("storage error: {:#}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "internal error" })),
                )
                    .into_response();
            }
        };

        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub(crate) fn invalid(reason: &str) -> ApiError {
    ApiError(CoreError::InvalidInput(reason.to_string()))
}

pub(crate) fn join_error(err: tokio::task::JoinError) -> ApiError {
    error!("spawn_blocking join error: {}", err);
    ApiError(CoreError::Storage(anyhow::anyhow!(
        "blocking task failed: {}",
        err
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: CoreError) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn each_kind_maps_to_its_status() {
        assert_eq!(status_of(CoreError::DuplicateUsername("a".into())), StatusCode::CONFLICT);
        assert_eq!(status_of(CoreError::DuplicateRoom("r".into())), StatusCode::CONFLICT);
        assert_eq!(
            status_of(CoreError::VersionConflict { chatroom: "r".into(), filename: "f".into() }),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(CoreError::RoomNotFound("r".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(CoreError::FileNotFound { chatroom: "r".into(), filename: "f".into() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status_of(CoreError::EmoticonNotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(CoreError::NotAllowed { user: "u".into(), room: "r".into() }),
            StatusCode::FORBIDDEN
        );
        assert_eq!(status_of(CoreError::InvalidInput("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(CoreError::Storage(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
