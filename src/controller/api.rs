use actix_web::web::{self, Data};
use actix_web::{HttpResponse, Responder};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;

use crate::controller::grid::{GridController, ScoreSession};
use crate::controller::voice::{self, ReplyCollector};
use crate::games;
use crate::model::{CellRef, GridError, RankingRow, ScoreCell, SectionId, SessionPhase};
use crate::storage::KvStore;
use crate::view::scoreboard::render_scoreboard;

/// One controller per game, shared across workers.
pub type ControllerMap = Arc<RwLock<HashMap<String, GridController>>>;

/// Load every known game from the store up front so the first request does
/// not race the hydration.
#[must_use]
pub fn build_controllers(store: &Arc<dyn KvStore>) -> ControllerMap {
    let mut map = HashMap::new();
    for game in &games::GAMES {
        map.insert(game.key.to_string(), GridController::new(game, store.clone()));
    }
    Arc::new(RwLock::new(map))
}

#[derive(Serialize)]
pub struct RoundView {
    pub label: String,
    pub category: Option<String>,
    pub section: Option<SectionId>,
}

#[derive(Serialize)]
pub struct GridSnapshot {
    pub game: String,
    pub name: String,
    pub players: Vec<String>,
    pub rounds: Vec<RoundView>,
    /// cells[player][round]
    pub cells: Vec<Vec<ScoreCell>>,
    pub totals: Vec<i32>,
    pub ranking: Vec<RankingRow>,
    pub phase: SessionPhase,
    pub target_score: Option<i32>,
}

#[must_use]
pub fn snapshot(session: &ScoreSession) -> GridSnapshot {
    GridSnapshot {
        game: session.descriptor().key.to_string(),
        name: session.descriptor().name.to_string(),
        players: session.players().iter().map(|p| p.name.clone()).collect(),
        rounds: session
            .rounds()
            .iter()
            .map(|slot| RoundView {
                label: slot.label.clone(),
                category: slot.category.map(|c| c.code.to_string()),
                section: slot.section,
            })
            .collect(),
        cells: session
            .players()
            .iter()
            .enumerate()
            .map(|(p, _)| {
                (0..session.rounds().len())
                    .map(|r| session.cell(CellRef { player: p, round: r }).copied().unwrap_or_default())
                    .collect()
            })
            .collect(),
        totals: session.totals(),
        ranking: session.compute_ranking(),
        phase: session.phase(),
        target_score: session.target_score(),
    }
}

fn get_param_str<'a>(query: &'a HashMap<String, String>, key: &str) -> &'a str {
    query.get(key).map(|s| s.as_str()).unwrap_or("")
}

fn unknown_game(game: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({"error": format!("unknown game: {game}")}))
}

/// GET /scores?game=pocha[&json=1] — the scoreboard page, or the grid as JSON.
pub async fn scores(
    query: web::Query<HashMap<String, String>>,
    controllers: Data<ControllerMap>,
) -> impl Responder {
    let game = get_param_str(&query, "game").trim().to_string();
    if game.is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "game parameter is required"}));
    }
    let want_json = matches!(get_param_str(&query, "json"), "1" | "true");

    let map = controllers.read().await;
    let Some(ctrl) = map.get(&game) else {
        return unknown_game(&game);
    };
    if want_json {
        HttpResponse::Ok().json(snapshot(ctrl.session()))
    } else {
        let markup = render_scoreboard(ctrl.session());
        HttpResponse::Ok().content_type("text/html").body(markup.into_string())
    }
}

#[derive(Deserialize)]
pub struct VoiceRequest {
    pub game: String,
    pub transcript: String,
}

#[derive(Serialize)]
struct VoiceResponse {
    #[serde(flatten)]
    report: voice::DispatchReport,
    spoken: Vec<String>,
    hushed: bool,
}

/// POST /voice — run one transcript against a game's grid. The response
/// carries the feedback lines for the front end's speech synthesis.
pub async fn voice(
    body: web::Json<VoiceRequest>,
    controllers: Data<ControllerMap>,
) -> impl Responder {
    let mut map = controllers.write().await;
    let Some(ctrl) = map.get_mut(&body.game) else {
        return unknown_game(&body.game);
    };
    let mut replies = ReplyCollector::default();
    let report = voice::dispatch(ctrl, &body.transcript, &mut replies);
    HttpResponse::Ok().json(VoiceResponse {
        report,
        spoken: replies.lines,
        hushed: replies.hushed,
    })
}

#[derive(Deserialize)]
pub struct ManualScore {
    pub game: String,
    pub player: String,
    pub points: i32,
    pub category: Option<String>,
}

/// POST /score — typed-in score, same first-empty-cell rules as voice.
pub async fn manual_score(
    body: web::Json<ManualScore>,
    controllers: Data<ControllerMap>,
) -> impl Responder {
    let mut map = controllers.write().await;
    let Some(ctrl) = map.get_mut(&body.game) else {
        return unknown_game(&body.game);
    };
    match ctrl.apply_score(&body.player, body.points, body.category.as_deref()) {
        Ok(cell) => {
            let invalid = ctrl.session().cell(cell).is_some_and(|c| c.invalid);
            let announce = ctrl.completion_event();
            HttpResponse::Ok().json(json!({
                "cell": cell,
                "invalid": invalid,
                "totals": ctrl.session().totals(),
                "game_complete": announce,
            }))
        }
        Err(e @ GridError::PlayerNotFound(_)) => {
            HttpResponse::NotFound().json(json!({"error": e.to_string()}))
        }
        Err(e @ (GridError::GameComplete | GridError::SectionLocked)) => {
            HttpResponse::Conflict().json(json!({"error": e.to_string()}))
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": e.to_string()})),
    }
}

#[derive(Deserialize)]
pub struct CellEdit {
    pub game: String,
    pub player: usize,
    pub round: usize,
    /// Raw text from the cell, scrubbed to digits and minus before parsing.
    /// Empty clears the cell.
    pub value: String,
}

/// POST /cell — direct manual edit, last writer wins.
pub async fn edit_cell(
    body: web::Json<CellEdit>,
    controllers: Data<ControllerMap>,
) -> impl Responder {
    let mut map = controllers.write().await;
    let Some(ctrl) = map.get_mut(&body.game) else {
        return unknown_game(&body.game);
    };
    let scrubbed = scrub_cell_value(&body.value);
    let value = if scrubbed.is_empty() {
        None
    } else {
        match scrubbed.parse::<i32>() {
            Ok(v) => Some(v),
            Err(_) => {
                return HttpResponse::BadRequest()
                    .json(json!({"error": format!("not a number: {}", body.value)}));
            }
        }
    };
    let cell = CellRef { player: body.player, round: body.round };
    match ctrl.edit_cell(cell, value) {
        Ok(()) => {
            let announce = ctrl.completion_event();
            HttpResponse::Ok().json(json!({
                "totals": ctrl.session().totals(),
                "game_complete": announce,
            }))
        }
        Err(e) => HttpResponse::BadRequest().json(json!({"error": e.to_string()})),
    }
}

#[derive(Deserialize)]
pub struct GameRef {
    pub game: String,
}

/// POST /undo — a no-op with a message when the history is empty, never a
/// failure the caller has to handle.
pub async fn undo(body: web::Json<GameRef>, controllers: Data<ControllerMap>) -> impl Responder {
    let mut map = controllers.write().await;
    let Some(ctrl) = map.get_mut(&body.game) else {
        return unknown_game(&body.game);
    };
    match ctrl.undo() {
        Ok(cell) => HttpResponse::Ok().json(json!({
            "undone": true,
            "cell": cell,
            "totals": ctrl.session().totals(),
        })),
        Err(GridError::EmptyHistory) => {
            HttpResponse::Ok().json(json!({"undone": false, "error": "nothing to undo"}))
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": e.to_string()})),
    }
}

#[derive(Deserialize)]
pub struct ClearRequest {
    pub game: String,
    #[serde(default)]
    pub confirm: bool,
}

/// POST /clear — refuses to wipe anything without the explicit confirm flag.
pub async fn clear(
    body: web::Json<ClearRequest>,
    controllers: Data<ControllerMap>,
) -> impl Responder {
    if !body.confirm {
        return HttpResponse::BadRequest()
            .json(json!({"error": "confirmation required to clear all scores"}));
    }
    let mut map = controllers.write().await;
    let Some(ctrl) = map.get_mut(&body.game) else {
        return unknown_game(&body.game);
    };
    ctrl.clear_all();
    HttpResponse::Ok().json(json!({"cleared": true}))
}

/// GET /ranking?game=...
pub async fn ranking(
    query: web::Query<HashMap<String, String>>,
    controllers: Data<ControllerMap>,
) -> impl Responder {
    let game = get_param_str(&query, "game").trim().to_string();
    let map = controllers.read().await;
    let Some(ctrl) = map.get(&game) else {
        return unknown_game(&game);
    };
    HttpResponse::Ok().json(ctrl.session().compute_ranking())
}

#[derive(Deserialize)]
pub struct RosterChange {
    pub game: String,
    pub name: String,
}

/// POST /players
pub async fn add_player(
    body: web::Json<RosterChange>,
    controllers: Data<ControllerMap>,
) -> impl Responder {
    if body.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({"error": "player name is required"}));
    }
    let mut map = controllers.write().await;
    let Some(ctrl) = map.get_mut(&body.game) else {
        return unknown_game(&body.game);
    };
    match ctrl.add_player(&body.name) {
        Ok(()) => HttpResponse::Ok().json(json!({
            "players": ctrl.session().players().iter().map(|p| p.name.clone()).collect::<Vec<_>>(),
        })),
        Err(e @ GridError::DuplicatePlayer(_)) => {
            HttpResponse::Conflict().json(json!({"error": e.to_string()}))
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": e.to_string()})),
    }
}

/// POST /players/remove
pub async fn remove_player(
    body: web::Json<RosterChange>,
    controllers: Data<ControllerMap>,
) -> impl Responder {
    let mut map = controllers.write().await;
    let Some(ctrl) = map.get_mut(&body.game) else {
        return unknown_game(&body.game);
    };
    match ctrl.remove_player(&body.name) {
        Ok(()) => HttpResponse::Ok().json(json!({
            "players": ctrl.session().players().iter().map(|p| p.name.clone()).collect::<Vec<_>>(),
        })),
        Err(e @ GridError::PlayerNotFound(_)) => {
            HttpResponse::NotFound().json(json!({"error": e.to_string()}))
        }
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": e.to_string()})),
    }
}

#[derive(Deserialize)]
pub struct TargetRequest {
    pub game: String,
    pub target: Option<i32>,
}

/// POST /target — point goal (Avaricioso) or elimination limit (Dominó).
pub async fn set_target(
    body: web::Json<TargetRequest>,
    controllers: Data<ControllerMap>,
) -> impl Responder {
    let mut map = controllers.write().await;
    let Some(ctrl) = map.get_mut(&body.game) else {
        return unknown_game(&body.game);
    };
    ctrl.set_target_score(body.target);
    HttpResponse::Ok().json(json!({"target_score": ctrl.session().target_score()}))
}

fn scrub_cell_value(raw: &str) -> String {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| {
        Regex::new(r"[^0-9-]").expect("Invalid regex pattern - this is a programming error")
    });
    re.replace_all(raw, "").to_string()
}
