use rocket::{http::Status, serde::json::Json};
use schemars::JsonSchema;
use serde::Serialize;

/// Error body returned by every endpoint. Clients display `error` as is.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Error<E: Serialize> {
    /// Human readable description of the problem.
    pub error: String,
    /// Machine readable error code.
    pub code: E,
    /// The request field the error refers to, if any.
    pub field: Option<&'static str>,
}

impl<E: Serialize> Error<E> {
    fn new(description: String, code: E, field: Option<&'static str>) -> Self {
        Self {
            error: description,
            code,
            field,
        }
    }
}

pub type JsonError<E> = (Status, Json<Error<E>>);

pub type JsonResult<T, E> = Result<Json<T>, JsonError<E>>;

pub fn with_status<E: Serialize>(
    status: Status,
    error: E,
    field: Option<&'static str>,
    description: String,
) -> JsonError<E> {
    (status, Json(Error::new(description, error, field)))
}

pub fn bad_request<E: Serialize>(
    error: E,
    field: Option<&'static str>,
    description: String,
) -> JsonError<E> {
    with_status(Status::BadRequest, error, field, description)
}

pub fn unauthorized<E: Serialize>(error: E, description: String) -> JsonError<E> {
    with_status(Status::Unauthorized, error, None, description)
}

pub fn not_found<E: Serialize>(error: E, description: String) -> JsonError<E> {
    with_status(Status::NotFound, error, None, description)
}

pub fn too_many_requests<E: Serialize>(error: E, description: String) -> JsonError<E> {
    with_status(Status::TooManyRequests, error, None, description)
}

pub fn internal_server_error<E: Serialize>(error: E) -> JsonError<E> {
    with_status(
        Status::InternalServerError,
        error,
        None,
        "something went wrong, please try again later".to_owned(),
    )
}
