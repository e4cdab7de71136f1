use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

use serde::Serialize;
pub use server::{run, run_with_listener, spawn_with_listener};

mod catalog;
mod communities;
mod emissions;
mod expenses;
mod server;

pub mod types {
    pub mod expense {
        pub use api_types::expense::{
            AnnulNew, ExpenseList, ExpenseListResponse, ExpenseNew, ExpenseStatus, ExpenseUpdate,
            ExpenseView,
        };
        pub use engine::Expense;
    }

    pub mod approval {
        pub use api_types::approval::{ApprovalView, ApprovalsResponse, DecisionNew};
    }

    pub mod history {
        pub use api_types::history::{HistoryResponse, HistoryView};
    }

    pub mod community {
        pub use api_types::community::{CommunitiesResponse, CommunityNew, CommunityView};
        pub use api_types::membership::{MemberRole, MemberUpsert, MemberView, MembersResponse};
    }

    pub mod emission {
        pub use api_types::emission::{
            EmissionItemNew, EmissionNew, EmissionView, EmissionsResponse,
        };
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

/// JSON error body: human message plus a stable machine-readable code.
#[derive(Serialize)]
struct Error {
    error: String,
    code: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        EngineError::NotFound(_) => StatusCode::NOT_FOUND,
        // Both are "the request is fine but the world disagrees"; clients
        // tell them apart by the `code` field.
        EngineError::InvalidState(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error, code) = match self {
            ServerError::Engine(err) => {
                let code = err.code().to_string();
                (status_for_engine_error(&err), message_for_engine_error(err), code)
            }
            ServerError::Generic(err) => {
                (StatusCode::BAD_REQUEST, err, "bad_request".to_string())
            }
        };

        (status, Json(Error { error, code })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_validation_maps_to_400() {
        let res = ServerError::from(EngineError::Validation("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_invalid_state_maps_to_409() {
        let res = ServerError::from(EngineError::InvalidState("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_forbidden_maps_to_403() {
        let res = ServerError::from(EngineError::Forbidden("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
