//! Registration and login.

use rocket::{http::Status, post, serde::json::Json, State};
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::Deserialize;

use app::user;

use super::{user_error, ErrorCode, UserModel};
use crate::{
    error::{JsonError, JsonResult},
    state::RocketState,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct RegisterRequest {
    /// Optional display name.
    name: Option<String>,
    /// Email address, must be unique.
    #[serde(default)]
    email: String,
    /// Password, at least 6 characters.
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct LoginRequest {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

/// Register a new user with an empty stamp card.
#[openapi(tag = "Auth")]
#[post("/register", data = "<req>")]
pub(super) async fn register(
    state: &State<RocketState>,
    req: Json<RegisterRequest>,
) -> Result<(Status, Json<UserModel>), JsonError<ErrorCode>> {
    let req = req.into_inner();
    user::register(
        &state.db,
        user::NewUser {
            name: req.name,
            email: req.email,
            password: req.password,
        },
    )
    .await
    .map(|user| (Status::Created, Json(UserModel::from_entity(&user))))
    .map_err(user_error)
}

/// Log in with email and password. A failed login never says which of the two was wrong.
#[openapi(tag = "Auth")]
#[post("/login", data = "<req>")]
pub(super) async fn login(
    state: &State<RocketState>,
    req: Json<LoginRequest>,
) -> JsonResult<UserModel, ErrorCode> {
    user::login(&state.db, &req.email, &req.password)
        .await
        .map(|user| Json(UserModel::from_entity(&user)))
        .map_err(user_error)
}
