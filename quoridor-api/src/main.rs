//! Quoridor Web API
//!
//! Hosts one game session and serves the rules engine over JSON. The
//! operation log doubles as the sync payload: `GET /operations` returns it
//! and `POST /sync` replaces the session's log with a peer's.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quoridor_core::{can_put_wall, Error, GameSession, Operation, Player, Position, Wall};

// =============================================================================
// Configuration
// =============================================================================

const DEFAULT_ADDR: &str = "0.0.0.0:8000";

struct Config {
    addr: SocketAddr,
}

impl Config {
    /// Read `QUORIDOR_ADDR`, falling back to the default on absence or typo.
    fn from_env() -> Config {
        let addr = match std::env::var("QUORIDOR_ADDR") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                warn!(%raw, error = %e, "bad QUORIDOR_ADDR, using {DEFAULT_ADDR}");
                default_addr()
            }),
            Err(_) => default_addr(),
        };
        Config { addr }
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8000))
}

// =============================================================================
// Shared State
// =============================================================================

struct AppStateInner {
    session: Mutex<GameSession>,
}

type AppState = Arc<AppStateInner>;

impl AppStateInner {
    fn new() -> AppState {
        Arc::new(AppStateInner {
            session: Mutex::new(GameSession::new()),
        })
    }

    /// Lock the session. A poisoned lock still holds a consistent session:
    /// every mutation is a single push/pop on the log.
    fn session(&self) -> MutexGuard<'_, GameSession> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize)]
struct GameStateModel {
    pawns: Vec<Position>,
    walls: Vec<Wall>,
    current_player: u8,
    remaining_walls: [u8; 2],
    operation_count: usize,
    can_undo: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    winner: Option<u8>,
}

#[derive(Serialize, Deserialize)]
struct PlaceableModel {
    placeable: bool,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

fn bad_request(detail: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorModel {
            detail: detail.into(),
        }),
    )
}

/// Map a rejected commit to a 400 with a user-facing message.
fn rejection(err: Error) -> ApiError {
    warn!(%err, "request rejected");
    match err {
        Error::IllegalMove { .. } => bad_request("Illegal move"),
        Error::IllegalWall(_) => bad_request("Cannot place wall"),
        Error::NoWallsRemaining(_) => bad_request("No walls remaining"),
        other => bad_request(other.to_string()),
    }
}

fn session_to_model(session: &GameSession) -> GameStateModel {
    let board = session.board();
    GameStateModel {
        pawns: Player::ALL.iter().map(|&p| board.pawn(p)).collect(),
        walls: board.walls().to_vec(),
        current_player: session.current_player().index() as u8,
        remaining_walls: session.remaining_walls_all(),
        operation_count: session.operations().len(),
        can_undo: session.can_undo(),
        winner: session.winner().map(|p| p.index() as u8),
    }
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let session = state.session();
    Json(session_to_model(&session))
}

async fn get_selectables(State(state): State<AppState>) -> Json<Vec<Position>> {
    let session = state.session();
    Json(session.selectables())
}

async fn make_move(
    State(state): State<AppState>,
    Json(to): Json<Position>,
) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    session.try_move_piece(to).map_err(rejection)?;
    Ok(Json(session_to_model(&session)))
}

async fn check_wall(State(state): State<AppState>, Json(wall): Json<Wall>) -> Json<PlaceableModel> {
    let session = state.session();
    Json(PlaceableModel {
        placeable: can_put_wall(session.board(), wall),
    })
}

async fn place_wall(
    State(state): State<AppState>,
    Json(wall): Json<Wall>,
) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    session.try_add_wall(wall).map_err(rejection)?;
    Ok(Json(session_to_model(&session)))
}

async fn undo(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = state.session();
    session.revert();
    Json(session_to_model(&session))
}

async fn reset_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let mut session = state.session();
    session.reset();
    Json(session_to_model(&session))
}

async fn get_operations(State(state): State<AppState>) -> Json<Vec<Operation>> {
    let session = state.session();
    Json(session.operations().to_vec())
}

/// Body is a peer's full log in wire form. Taken as raw text so malformed
/// payloads reach the session's own logging instead of the JSON extractor.
async fn sync(
    State(state): State<AppState>,
    payload: String,
) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    if !session.receive(&payload) {
        return Err(bad_request("Ignored operation log"));
    }
    Ok(Json(session_to_model(&session)))
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/selectables", get(get_selectables))
        .route("/move", post(make_move))
        .route("/wall/check", post(check_wall))
        .route("/wall", post(place_wall))
        .route("/undo", post(undo))
        .route("/reset", post(reset_game))
        .route("/operations", get(get_operations))
        .route("/sync", post(sync))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let app = router(AppStateInner::new());

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "Quoridor API running");
    axum::serve(listener, app).await
}
