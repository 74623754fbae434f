//! JSON endpoints over a single shared `GameSession`. Every endpoint answers with the table
//! snapshot, so a client never has to ask twice.

use crate::game::GameSession;
use actix_web::{
    body::BoxBody,
    get,
    http::{header::ContentType, StatusCode},
    post, web, HttpResponse, ResponseError,
};
use blackjack_lib::BlackjackGameError;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{error, info};

/// Body of `POST /bet`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BetRequest {
    pub amount: u32,
}

/// An enum that will handle user facing errors
#[derive(Debug)]
pub enum UserError {
    InternalError,
    BadInput(String),
    ShoeExhausted,
}

impl std::fmt::Display for UserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserError::InternalError => write!(f, "an internal error occurred"),
            UserError::BadInput(s) => write!(f, "{}", s),
            UserError::ShoeExhausted => {
                write!(f, "the shoe is out of cards, reset the deck to continue")
            }
        }
    }
}

impl std::error::Error for UserError {}

impl ResponseError for UserError {
    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match *self {
            UserError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            UserError::BadInput(_) => StatusCode::BAD_REQUEST,
            UserError::ShoeExhausted => StatusCode::CONFLICT,
        }
    }
}

impl From<BlackjackGameError> for UserError {
    fn from(value: BlackjackGameError) -> Self {
        if value.is_user_error() {
            UserError::BadInput(value.to_string())
        } else {
            UserError::ShoeExhausted
        }
    }
}

type SharedSession = web::Data<Mutex<GameSession>>;

/// Runs `command` against the locked session and answers with the resulting snapshot.
fn with_session<F>(app_session: &SharedSession, command: F) -> Result<HttpResponse, UserError>
where
    F: FnOnce(&mut GameSession) -> Result<(), BlackjackGameError>,
{
    let mut guard = app_session.lock().map_err(|_| {
        error!("session mutex poisoned");
        UserError::InternalError
    })?;
    command(&mut *guard)?;

    let body = serde_json::to_string(&guard.snapshot()).map_err(|e| {
        error!("unable to serialize snapshot: {}", e);
        UserError::InternalError
    })?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .body(body))
}

/// Returns the table, picking up any estimate the worker has finished since the last request.
#[get("/table")]
async fn get_table(app_session: SharedSession) -> Result<HttpResponse, UserError> {
    with_session(&app_session, |session| {
        session.refresh_rates();
        Ok(())
    })
}

#[post("/bet")]
async fn place_bet(
    bet: web::Json<BetRequest>,
    app_session: SharedSession,
) -> Result<HttpResponse, UserError> {
    let amount = bet.into_inner().amount;
    info!(amount, "bet requested");
    with_session(&app_session, |session| session.confirm_bet(amount))
}

#[post("/hit")]
async fn hit(app_session: SharedSession) -> Result<HttpResponse, UserError> {
    with_session(&app_session, |session| session.hit())
}

#[post("/stand")]
async fn stand(app_session: SharedSession) -> Result<HttpResponse, UserError> {
    with_session(&app_session, |session| session.stand())
}

#[post("/reset-deck")]
async fn reset_deck(app_session: SharedSession) -> Result<HttpResponse, UserError> {
    with_session(&app_session, |session| {
        session.reset_deck();
        Ok(())
    })
}

#[post("/new-game")]
async fn new_game(app_session: SharedSession) -> Result<HttpResponse, UserError> {
    with_session(&app_session, |session| {
        session.start_game();
        Ok(())
    })
}

/// Registers every trainer endpoint on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_table)
        .service(place_bet)
        .service(hit)
        .service(stand)
        .service(reset_deck)
        .service(new_game);
}
