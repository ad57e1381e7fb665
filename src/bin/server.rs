use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use door_puzzle::constants::{FRAME_MS, TIMER_TICK_MS};
use door_puzzle::engine::{PuzzleGame, PuzzleGameOptions};
use door_puzzle::server_protocol::{parse_client_message, ParsedClientMessage};
use door_puzzle::server_utils::{clamp_pitch, normalize_yaw, parse_port};
use door_puzzle::types::{FrameInput, HoverProbe};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use serde_json::{json, Value};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tower_http::services::{ServeDir, ServeFile};

const STATE_EVERY_FRAMES: u64 = 3;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

struct ServerStats {
    started_at_iso: String,
    active_sessions: AtomicUsize,
}

type SharedStats = Arc<ServerStats>;

#[derive(Debug, PartialEq)]
enum SessionEffect {
    Nothing,
    Reply(Value),
    RestartTimer,
}

#[tokio::main]
async fn main() {
    let port = parse_port(std::env::var("PORT").ok().as_deref());
    let stats = Arc::new(ServerStats {
        started_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        active_sessions: AtomicUsize::new(0),
    });

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws_handler))
        .with_state(stats);

    let app = if let Some(static_dir) = resolve_static_dir() {
        let index_file = static_dir.join("index.html");
        println!(
            "[server] static file root: {}",
            static_dir.to_string_lossy()
        );
        app.fallback_service(
            ServeDir::new(static_dir).not_found_service(ServeFile::new(index_file)),
        )
    } else {
        eprintln!("[server] static file root not found. set STATIC_DIR or build dist/client.");
        app
    };

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("failed to bind server socket");

    println!("[server] listening on :{port}");
    axum::serve(listener, app)
        .await
        .expect("server runtime failed");
}

fn resolve_static_dir() -> Option<PathBuf> {
    if let Ok(raw) = std::env::var("STATIC_DIR") {
        let path = PathBuf::from(raw);
        if path.join("index.html").is_file() {
            return Some(path);
        }
    }

    let candidates = [PathBuf::from("dist/client"), PathBuf::from("../dist/client")];
    candidates
        .into_iter()
        .find(|path| path.join("index.html").is_file())
}

async fn healthz(State(stats): State<SharedStats>) -> impl IntoResponse {
    Json(json!({
        "ok": true,
        "startedAt": stats.started_at_iso,
        "activeSessions": stats.active_sessions.load(Ordering::Relaxed),
    }))
}

async fn ws_handler(ws: WebSocketUpgrade, State(stats): State<SharedStats>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_session(stats, socket))
}

async fn run_session(stats: SharedStats, socket: WebSocket) {
    let session_id = make_id("session");
    let seed: u32 = rand::rng().random();
    let mut game = PuzzleGame::new(seed, PuzzleGameOptions::default());
    let mut input = FrameInput::default();
    let mut frame_counter = 0u64;
    let mut game_over_sent = false;

    stats.active_sessions.fetch_add(1, Ordering::Relaxed);
    println!("[server] {session_id} opened (seed {seed})");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let welcome = json!({
        "type": "welcome",
        "sessionId": session_id,
        "seed": seed,
        "snapshot": game.build_snapshot(true),
    });
    let mut open = send_json(&mut ws_sender, &welcome).await;

    let frame_period = Duration::from_millis(FRAME_MS);
    let timer_period = Duration::from_millis(TIMER_TICK_MS);
    let mut frame_interval = interval_at(Instant::now() + frame_period, frame_period);
    frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut timer_interval = interval_at(Instant::now() + timer_period, timer_period);

    while open {
        tokio::select! {
            received = ws_receiver.next() => {
                let Some(Ok(message)) = received else {
                    break;
                };
                let raw = match message {
                    Message::Text(raw) => raw.to_string(),
                    Message::Binary(raw) => match String::from_utf8(raw.to_vec()) {
                        Ok(text) => text,
                        Err(_) => {
                            open = send_error(&mut ws_sender, "invalid utf8 message").await;
                            continue;
                        }
                    },
                    Message::Close(_) => break,
                    _ => continue,
                };
                let Some(parsed) = parse_client_message(&raw) else {
                    open = send_error(&mut ws_sender, "invalid message").await;
                    continue;
                };
                if matches!(parsed, ParsedClientMessage::Restart) {
                    game_over_sent = false;
                }
                match apply_client_message(&mut game, &mut input, parsed) {
                    SessionEffect::Nothing => {}
                    SessionEffect::Reply(reply) => {
                        open = send_json(&mut ws_sender, &reply).await;
                    }
                    SessionEffect::RestartTimer => timer_interval.reset(),
                }
            }
            _ = frame_interval.tick() => {
                game.frame(FRAME_MS, &input);
                frame_counter += 1;
                if should_push_state(frame_counter, game.has_pending_events()) {
                    let snapshot = game.build_snapshot(true);
                    open = send_json(&mut ws_sender, &json!({
                        "type": "state",
                        "snapshot": snapshot,
                    }))
                    .await;
                }
                if open && game.is_ended() && !game_over_sent {
                    game_over_sent = true;
                    let summary = game.build_summary();
                    println!(
                        "[server] {session_id} game over: {} rooms, level {}",
                        summary.rooms_cleared, summary.level
                    );
                    open = send_json(&mut ws_sender, &json!({
                        "type": "game_over",
                        "summary": summary,
                    }))
                    .await;
                }
            }
            _ = timer_interval.tick() => {
                game.timer_tick();
            }
        }
    }

    stats.active_sessions.fetch_sub(1, Ordering::Relaxed);
    println!(
        "[server] {session_id} closed after {} rooms",
        game.rooms_cleared()
    );
}

fn apply_client_message(
    game: &mut PuzzleGame,
    input: &mut FrameInput,
    message: ParsedClientMessage,
) -> SessionEffect {
    match message {
        ParsedClientMessage::Start => {
            game.start();
            SessionEffect::RestartTimer
        }
        ParsedClientMessage::Input {
            movement,
            yaw,
            pitch,
        } => {
            input.movement = movement;
            input.yaw = normalize_yaw(yaw);
            input.pitch = clamp_pitch(pitch);
            SessionEffect::Nothing
        }
        ParsedClientMessage::Hover { door } => {
            input.hover = HoverProbe::Reported(door);
            SessionEffect::Nothing
        }
        ParsedClientMessage::Interact => {
            let outcome = game.interact();
            SessionEffect::Reply(json!({
                "type": "interact_result",
                "outcome": format!("{outcome:?}").to_lowercase(),
            }))
        }
        ParsedClientMessage::PointerLock { locked } => {
            if locked {
                game.pointer_locked();
            } else {
                game.pointer_released();
            }
            SessionEffect::Nothing
        }
        ParsedClientMessage::Restart => {
            game.hard_reset();
            *input = FrameInput::default();
            SessionEffect::Nothing
        }
        ParsedClientMessage::Ping { t } => SessionEffect::Reply(json!({
            "type": "pong",
            "t": t,
        })),
    }
}

fn should_push_state(frame_counter: u64, has_pending_events: bool) -> bool {
    has_pending_events || frame_counter % STATE_EVERY_FRAMES == 0
}

async fn send_json(sender: &mut SplitSink<WebSocket, Message>, message: &Value) -> bool {
    sender
        .send(Message::Text(message.to_string().into()))
        .await
        .is_ok()
}

async fn send_error(sender: &mut SplitSink<WebSocket, Message>, message: &str) -> bool {
    send_json(
        sender,
        &json!({
            "type": "error",
            "message": message,
        }),
    )
    .await
}

fn make_id(prefix: &str) -> String {
    let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{seq}")
}
