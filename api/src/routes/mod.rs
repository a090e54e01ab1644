//! Add top-level routes as submodules here.

use crate::{
    cors,
    error::{self, JsonError},
    state::RocketState,
};
use app::user;
use rocket::{catch, catchers, get, http::Status, routes, Build, Request, Rocket};
use rocket_okapi::{
    openapi_get_routes,
    swagger_ui::{make_swagger_ui, DefaultModelRendering, SwaggerUIConfig},
};
use schemars::JsonSchema;
use serde::Serialize;

mod auth;
mod users;

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Email missing or malformed.
    InvalidEmail,
    /// Password missing or too short.
    InvalidPassword,
    /// Another user already registered this email.
    EmailTaken,
    /// Email or password missing from a login request.
    MissingCredentials,
    /// Email and password do not match a user.
    InvalidCredentials,
    /// No user with this id.
    UserNotFound,
    /// Too many stamp requests in a short time.
    RateLimited,
    /// No route matches the request.
    NotFound,
    /// The request could not be parsed.
    MalformedRequest,
    /// Unexpected server side failure.
    InternalError,
}

/// A user as returned by registration, login, and the user endpoints.
#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct UserModel {
    /// User id, used in all `/users/<id>` paths.
    id: i64,
    /// Display name, if the user set one.
    name: Option<String>,
    /// Registered email, lower-cased.
    email: String,
    /// Stamps on the card, between 0 and 5.
    stamps: u32,
}

impl UserModel {
    fn from_entity(user: &user::User) -> Self {
        Self {
            id: user.id.0,
            name: user.name.clone(),
            email: user.email.0.clone(),
            stamps: user.stamps.0,
        }
    }
}

fn user_error(e: user::Error) -> JsonError<ErrorCode> {
    match e {
        user::Error::InvalidEmail(e) => {
            error::bad_request(ErrorCode::InvalidEmail, Some("email"), e.to_string())
        }
        user::Error::InvalidPassword(e) => {
            error::bad_request(ErrorCode::InvalidPassword, Some("password"), e.to_string())
        }
        user::Error::EmailTaken => {
            error::bad_request(ErrorCode::EmailTaken, Some("email"), e.to_string())
        }
        user::Error::MissingCredentials => {
            error::bad_request(ErrorCode::MissingCredentials, None, e.to_string())
        }
        user::Error::InvalidCredentials => {
            error::unauthorized(ErrorCode::InvalidCredentials, e.to_string())
        }
        user::Error::NotFound => error::not_found(ErrorCode::UserNotFound, e.to_string()),
        user::Error::Hash(_) | user::Error::Database(_) => {
            log::error!("request failed: {}", e);
            error::internal_server_error(ErrorCode::InternalError)
        }
    }
}

#[get("/")]
fn index() -> &'static str {
    "DigiStamp backend is running"
}

#[catch(default)]
fn default_catcher(status: Status, _req: &Request<'_>) -> JsonError<ErrorCode> {
    let code = match status.code {
        404 => ErrorCode::NotFound,
        429 => ErrorCode::RateLimited,
        400..=499 => ErrorCode::MalformedRequest,
        _ => ErrorCode::InternalError,
    };
    let description = status.reason().unwrap_or("unknown error").to_lowercase();
    error::with_status(status, code, None, description)
}

const BASE: &str = "/api";

pub fn register(rocket: Rocket<Build>, state: RocketState) -> Rocket<Build> {
    let rocket = rocket
        .manage(state)
        .mount("/", routes![index, cors::preflight])
        .register("/", catchers![default_catcher]);
    let rocket = rocket.mount(
        BASE,
        openapi_get_routes![
            auth::register,
            auth::login,
            users::get,
            users::put,
            users::scan,
            users::redeem,
        ],
    );
    mount_swagger(rocket)
}

pub fn mount_swagger(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount(
        format!("{}/swagger", BASE),
        make_swagger_ui(&SwaggerUIConfig {
            url: "../openapi.json".to_owned(),
            default_model_rendering: DefaultModelRendering::Model,
            show_extensions: true,
            ..Default::default()
        }),
    )
}
