//! Routes for reading and updating a user and their stamp card.

use rocket::{get, post, put, serde::json::Json, State};
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use app::user;

use super::{user_error, ErrorCode, UserModel};
use crate::{
    error::{self, JsonResult},
    state::RocketState,
};

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct UpdateRequest {
    /// New display name. Blank keeps the current one.
    name: Option<String>,
    /// New email. Blank keeps the current one.
    email: Option<String>,
    /// New password. Blank keeps the current one.
    password: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct StampsModel {
    id: i64,
    /// Stamps on the card after the operation.
    stamps: u32,
}

impl StampsModel {
    fn from_entity(user: &user::User) -> Self {
        Self {
            id: user.id.0,
            stamps: user.stamps.0,
        }
    }
}

/// Get a user, including the current stamp count.
#[openapi(tag = "Users")]
#[get("/users/<id>")]
pub(super) async fn get(state: &State<RocketState>, id: i64) -> JsonResult<UserModel, ErrorCode> {
    user::get(&state.db, user::Id(id))
        .await
        .map(|user| Json(UserModel::from_entity(&user)))
        .map_err(user_error)
}

/// Update name, email, or password. Fields left out or blank keep their current value.
#[openapi(tag = "Users")]
#[put("/users/<id>", data = "<req>")]
pub(super) async fn put(
    state: &State<RocketState>,
    id: i64,
    req: Json<UpdateRequest>,
) -> JsonResult<UserModel, ErrorCode> {
    let req = req.into_inner();
    user::update(
        &state.db,
        user::Id(id),
        user::ProfileUpdate {
            name: req.name,
            email: req.email,
            password: req.password,
        },
    )
    .await
    .map(|user| Json(UserModel::from_entity(&user)))
    .map_err(user_error)
}

/// Add a stamp to the card. A full card stays at 5 stamps.
#[openapi(tag = "Stamps")]
#[post("/users/<id>/scan")]
pub(super) async fn scan(state: &State<RocketState>, id: i64) -> JsonResult<StampsModel, ErrorCode> {
    let id = user::Id(id);
    throttle(state, id)?;
    user::scan(&state.db, id)
        .await
        .map(|user| Json(StampsModel::from_entity(&user)))
        .map_err(user_error)
}

/// Redeem the reward, resetting the card to 0 stamps.
#[openapi(tag = "Stamps")]
#[post("/users/<id>/redeem")]
pub(super) async fn redeem(
    state: &State<RocketState>,
    id: i64,
) -> JsonResult<StampsModel, ErrorCode> {
    let id = user::Id(id);
    throttle(state, id)?;
    user::redeem(&state.db, id)
        .await
        .map(|user| Json(StampsModel::from_entity(&user)))
        .map_err(user_error)
}

fn throttle(state: &RocketState, id: user::Id) -> Result<(), error::JsonError<ErrorCode>> {
    if state.stamp_limit.limit(id) {
        log::info!("rate limiting user {:?}", id);
        Err(error::too_many_requests(
            ErrorCode::RateLimited,
            "too many stamp requests, please wait a moment".to_owned(),
        ))
    } else {
        Ok(())
    }
}
