// HTTP handler bindings for Battlesnake API endpoints
//
// Thin Rocket routes over `Bot`. Parsing and serialization happen here;
// nothing in this module makes decisions.

use rocket::http::Status;
use rocket::serde::json::Json;
use serde::Serialize;
use serde_json::Value;

use astar_snake::bot::Bot;
use astar_snake::types::{Direction, GameState};

/// Body of a /move response
#[derive(Serialize)]
pub struct MoveResponse {
    #[serde(rename = "move")]
    direction: Direction,
}

/// GET / endpoint
/// Returns bot metadata and appearance configuration
#[get("/")]
pub fn index(bot: &rocket::State<Bot>) -> Json<Value> {
    Json(bot.info())
}

/// POST /start endpoint
#[post("/start", format = "json", data = "<state>")]
pub fn start(bot: &rocket::State<Bot>, state: Json<GameState>) -> Status {
    bot.start(&state);
    Status::Ok
}

/// POST /move endpoint
/// Called each turn to compute and return the next move
#[post("/move", format = "json", data = "<state>")]
pub async fn get_move(bot: &rocket::State<Bot>, state: Json<GameState>) -> Json<MoveResponse> {
    let direction = bot.get_move(&state).await;
    Json(MoveResponse { direction })
}

/// POST /end endpoint
#[post("/end", format = "json", data = "<state>")]
pub fn end(bot: &rocket::State<Bot>, state: Json<GameState>) -> Status {
    bot.end(&state);
    Status::Ok
}
