use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use railway_core::booking::{BookingError, TicketRejection};
use railway_core::error::CoreError;
use railway_db::error::{LayoutWriteError, TicketWriteError, TICKET_SEAT_CONSTRAINT};
use serde_json::{json, Value};

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `railway_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<TicketWriteError> for AppError {
    fn from(err: TicketWriteError) -> Self {
        match err {
            TicketWriteError::Rejected(rejection) => AppError::Core(CoreError::Booking(rejection)),
            TicketWriteError::Database(err) => AppError::Database(err),
        }
    }
}

impl From<LayoutWriteError> for AppError {
    fn from(err: LayoutWriteError) -> Self {
        match err {
            LayoutWriteError::Stranded { .. } => {
                AppError::Core(CoreError::Conflict(err.to_string()))
            }
            LayoutWriteError::UnknownTrain(id) => AppError::Core(CoreError::NotFound {
                entity: "Train",
                id,
            }),
            LayoutWriteError::Database(err) => AppError::Database(err),
        }
    }
}

impl From<TicketRejection> for AppError {
    fn from(rejection: TicketRejection) -> Self {
        AppError::Core(CoreError::Booking(rejection))
    }
}

impl From<BookingError> for AppError {
    fn from(error: BookingError) -> Self {
        TicketRejection::standalone(error).into()
    }
}

/// Status, machine-readable code, message and optional details of an error.
#[derive(Debug)]
struct ErrorBody {
    status: StatusCode,
    code: &'static str,
    message: String,
    details: Option<Value>,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &'static str, message: String) -> Self {
        Self {
            status,
            code,
            message,
            details: None,
        }
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred".to_string(),
        )
    }
}

impl AppError {
    fn body(&self) -> ErrorBody {
        match self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => ErrorBody::new(
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    ErrorBody::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => {
                    ErrorBody::new(StatusCode::CONFLICT, "CONFLICT", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    ErrorBody::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => {
                    ErrorBody::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    ErrorBody::internal()
                }
                CoreError::Booking(rejection) => classify_rejection(rejection),
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorBody::internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let ErrorBody {
            status,
            code,
            message,
            details,
        } = self.body();

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(details) = details {
            body["details"] = details;
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Map a booking rule violation to its status and code, naming the
/// offending ticket and field in `details`.
fn classify_rejection(rejection: &TicketRejection) -> ErrorBody {
    let (status, code) = match rejection.error {
        BookingError::OutOfRange { .. } => (StatusCode::BAD_REQUEST, "OUT_OF_RANGE"),
        BookingError::DuplicateSeat { .. } => (StatusCode::CONFLICT, "DUPLICATE_SEAT"),
        BookingError::UnknownTrip { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        BookingError::EmptyOrder => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
    };

    ErrorBody {
        status,
        code,
        message: rejection.error.to_string(),
        details: Some(json!({
            "ticket_index": rejection.ticket_index,
            "field": rejection.error.field(),
        })),
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` and foreign key violations (23503) map to 404.
/// - A unique violation of the ticket seat constraint maps to 409 `DUPLICATE_SEAT`.
/// - Other unique violations (constraint name starting with `uq_`) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorBody {
    match err {
        sqlx::Error::RowNotFound => ErrorBody::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            match db_err.code().as_deref() {
                Some("23505") => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    if constraint == TICKET_SEAT_CONSTRAINT {
                        return ErrorBody::new(
                            StatusCode::CONFLICT,
                            "DUPLICATE_SEAT",
                            "Seat is already booked for this trip".to_string(),
                        );
                    }
                    if constraint.starts_with("uq_") {
                        return ErrorBody::new(
                            StatusCode::CONFLICT,
                            "CONFLICT",
                            format!("Duplicate value violates unique constraint: {constraint}"),
                        );
                    }
                }
                Some("23503") => {
                    let constraint = db_err.constraint().unwrap_or("unknown");
                    return ErrorBody::new(
                        StatusCode::NOT_FOUND,
                        "NOT_FOUND",
                        format!("Referenced entity does not exist ({constraint})"),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            ErrorBody::internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            ErrorBody::internal()
        }
    }
}
