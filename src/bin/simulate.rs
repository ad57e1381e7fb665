use chrono::{SecondsFormat, Utc};
use clap::Parser;
use door_puzzle::constants::{
    door_count_for_rooms, level_for_rooms, palette_tier, FRAME_MS, START_TIME_SECONDS,
    TRAP_LABEL,
};
use door_puzzle::engine::{InteractOutcome, PuzzleGame, PuzzleGameOptions};
use door_puzzle::equation::evaluate_statement;
use door_puzzle::geometry::{aim_at, door_center};
use door_puzzle::rng::{RandomSource, Rng};
use door_puzzle::server_utils::{
    normalize_bot_count, normalize_max_rooms, normalize_mistake_rate, normalize_seed,
    normalize_think_ms,
};
use door_puzzle::types::{DoorRole, FrameInput, GameState, RoomView, RuntimeEvent, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

const MAX_SIMULATED_MS: u64 = 60 * 60 * 1_000;
const AIM_PATIENCE_FRAMES: u32 = 30;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    bots: Option<usize>,
    #[arg(long)]
    mistake_rate: Option<f32>,
    #[arg(long)]
    think_ms: Option<u64>,
    #[arg(long)]
    max_rooms: Option<u32>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    #[serde(rename = "mistakeRate")]
    mistake_rate: f32,
    #[serde(rename = "thinkMs")]
    think_ms: u64,
    #[serde(rename = "maxRooms")]
    max_rooms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum RunEnd {
    TimeUp,
    RoomGoal,
    FrameLimit,
}

#[derive(Clone, Debug, Default, Serialize)]
struct OutcomeTally {
    correct: u32,
    wrong: u32,
    traps: u32,
    #[serde(rename = "roomsSpawned")]
    rooms_spawned: u32,
}

impl OutcomeTally {
    fn record(&mut self, outcome: InteractOutcome) {
        match outcome {
            InteractOutcome::Advancing => self.correct += 1,
            InteractOutcome::Penalized => self.wrong += 1,
            InteractOutcome::Trapped => self.traps += 1,
            InteractOutcome::Ignored => {}
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    #[serde(rename = "mistakeRate")]
    mistake_rate: f32,
    #[serde(rename = "thinkMs")]
    think_ms: u64,
    end: RunEnd,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    #[serde(rename = "roomsCleared")]
    rooms_cleared: u32,
    #[serde(rename = "peakRoomsCleared")]
    peak_rooms_cleared: u32,
    level: u32,
    #[serde(flatten)]
    tally: OutcomeTally,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    #[serde(rename = "clockMs")]
    clock_ms: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_clock_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "generatedAtIso")]
    generated_at_iso: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageRoomsCleared")]
    average_rooms_cleared: f32,
    #[serde(rename = "endCounts")]
    end_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    #[serde(rename = "timestampMs")]
    timestamp_ms: u64,
    level: String,
    event: String,
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(rename = "clockMs", skip_serializing_if = "Option::is_none")]
    clock_ms: Option<u64>,
    details: Value,
}

#[derive(Debug, PartialEq)]
enum BotAction {
    Idle,
    Interacted(InteractOutcome),
    GaveUpAiming(usize),
}

struct Bot {
    rng: Rng,
    mistake_rate: f32,
    think_frames: u64,
    wait_frames: u64,
    target: Option<usize>,
    aim_frames: u32,
}

impl Bot {
    fn new(scenario: &Scenario) -> Self {
        let think_frames = scenario.think_ms / FRAME_MS;
        Self {
            rng: Rng::new(scenario.seed ^ 0x9e37_79b9),
            mistake_rate: scenario.mistake_rate,
            think_frames,
            wait_frames: think_frames,
            target: None,
            aim_frames: 0,
        }
    }

    fn act(&mut self, game: &mut PuzzleGame, snapshot: &Snapshot, input: &mut FrameInput) -> BotAction {
        if snapshot.state != GameState::Playing {
            return BotAction::Idle;
        }
        let Some(room) = snapshot.room.as_ref() else {
            return BotAction::Idle;
        };

        if let Some(target) = self.target {
            let hovered = room.doors.iter().position(|door| door.hovered);
            if hovered == Some(target) {
                self.rest();
                return BotAction::Interacted(game.interact());
            }
            self.aim_frames += 1;
            if self.aim_frames > AIM_PATIENCE_FRAMES {
                self.rest();
                return BotAction::GaveUpAiming(target);
            }
            return BotAction::Idle;
        }

        if self.wait_frames > 0 {
            self.wait_frames -= 1;
            return BotAction::Idle;
        }

        let Some(target) = self.choose_door(room) else {
            return BotAction::Idle;
        };
        let (yaw, pitch) = aim_at(snapshot.camera.position, door_center(&room.doors[target].slot));
        input.yaw = yaw;
        input.pitch = pitch;
        self.target = Some(target);
        self.aim_frames = 0;
        BotAction::Idle
    }

    fn choose_door(&mut self, room: &RoomView) -> Option<usize> {
        let solved = room
            .doors
            .iter()
            .position(|door| evaluate_statement(&door.puzzle_text) == Some(true))?;
        if !self.rng.bool(self.mistake_rate) {
            return Some(solved);
        }
        let others: Vec<usize> = (0..room.doors.len()).filter(|idx| *idx != solved).collect();
        if others.is_empty() {
            return Some(solved);
        }
        Some(others[self.rng.pick_index(others.len())])
    }

    fn rest(&mut self) {
        self.target = None;
        self.aim_frames = 0;
        self.wait_frames = self.think_frames;
    }
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, run_started_at_ms));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut end_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "mistakeRate": scenario.mistake_rate,
                "thinkMs": scenario.think_ms,
                "maxRooms": scenario.max_rooms,
            }),
        );
        let scenario_run = run_scenario(&scenario);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &match_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.clock_ms),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        *end_counts
            .entry(run_end_key(scenario_run.result.end))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &match_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_clock_ms),
            json!({
                "end": scenario_run.result.end,
                "roomsCleared": scenario_run.result.rooms_cleared,
                "level": scenario_run.result.level,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => eprintln!("[simulate] failed to serialize scenario result: {error}"),
        }
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        now_ms(),
        scenario_results,
        end_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &match_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &match_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageRoomsCleared": summary.average_rooms_cleared,
            "endCounts": summary.end_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let mut game = PuzzleGame::new(scenario.seed, PuzzleGameOptions::default());
    let mut bot = Bot::new(scenario);
    let mut input = FrameInput::default();
    let mut tally = OutcomeTally::default();
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut end = RunEnd::FrameLimit;

    game.start();
    for _ in 0..MAX_SIMULATED_MS / FRAME_MS {
        game.step(FRAME_MS, &input);
        let snapshot = game.build_snapshot(true);
        for message in collect_snapshot_anomalies(&snapshot) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.clock_ms,
                message,
            );
        }
        tally.rooms_spawned += snapshot
            .events
            .iter()
            .filter(|event| matches!(event, RuntimeEvent::RoomSpawned { .. }))
            .count() as u32;

        if game.is_ended() {
            end = RunEnd::TimeUp;
            break;
        }
        if game.rooms_cleared() >= scenario.max_rooms {
            end = RunEnd::RoomGoal;
            break;
        }

        match bot.act(&mut game, &snapshot, &mut input) {
            BotAction::Idle => {}
            BotAction::Interacted(outcome) => tally.record(outcome),
            BotAction::GaveUpAiming(door) => push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.clock_ms,
                format!("aimed at door {door} but it never became hovered"),
            ),
        }
    }

    if end == RunEnd::FrameLimit {
        push_anomaly(
            &mut anomalies,
            &mut anomaly_records,
            &mut anomaly_seen,
            game.clock_ms(),
            "frame safety limit exceeded".to_string(),
        );
    }

    let summary = game.build_summary();
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            mistake_rate: scenario.mistake_rate,
            think_ms: scenario.think_ms,
            end,
            duration_ms: summary.duration_ms,
            rooms_cleared: summary.rooms_cleared,
            peak_rooms_cleared: summary.peak_rooms_cleared,
            level: summary.level,
            tally,
            anomalies,
        },
        anomaly_records,
        finished_clock_ms: game.clock_ms(),
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot) -> Vec<String> {
    let mut anomalies = Vec::new();
    let expected_level = level_for_rooms(snapshot.rooms_cleared);
    if snapshot.level != expected_level {
        anomalies.push(format!(
            "level {} does not match {} rooms cleared",
            snapshot.level, snapshot.rooms_cleared
        ));
    }
    if snapshot.time_remaining > START_TIME_SECONDS {
        anomalies.push(format!(
            "time remaining above start: {}",
            snapshot.time_remaining
        ));
    }
    if snapshot.fade_opacity != 0.0 && snapshot.fade_opacity != 1.0 {
        anomalies.push(format!("invalid fade opacity: {}", snapshot.fade_opacity));
    }

    let Some(room) = snapshot.room.as_ref() else {
        if snapshot.state != GameState::PreStart {
            anomalies.push(format!("no room in state {:?}", snapshot.state));
        }
        return anomalies;
    };

    let door_count = room.doors.len();
    let expected_doors = door_count_for_rooms(snapshot.rooms_cleared);
    if door_count != expected_doors {
        anomalies.push(format!(
            "room has {door_count} doors, expected {expected_doors} at {} cleared",
            snapshot.rooms_cleared
        ));
    }

    let count_role = |role: DoorRole| room.doors.iter().filter(|door| door.role == role).count();
    if count_role(DoorRole::Correct) != 1 {
        anomalies.push(format!(
            "room has {} correct doors",
            count_role(DoorRole::Correct)
        ));
    }
    let traps = count_role(DoorRole::Trap);
    if traps != usize::from(door_count == 3) {
        anomalies.push(format!("room with {door_count} doors has {traps} traps"));
    }

    for door in &room.doors {
        let consistent = match door.role {
            DoorRole::Correct => evaluate_statement(&door.puzzle_text) == Some(true),
            DoorRole::Wrong => evaluate_statement(&door.puzzle_text) == Some(false),
            DoorRole::Trap => door.puzzle_text == TRAP_LABEL,
        };
        if !consistent {
            anomalies.push(format!(
                "{:?} door shows inconsistent text: {}",
                door.role, door.puzzle_text
            ));
        }
    }

    if room.palette.tier != palette_tier(snapshot.level) {
        anomalies.push(format!(
            "palette tier {} at level {}",
            room.palette.tier, snapshot.level
        ));
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli.seed.unwrap_or_else(now_ms);
    let bots = normalize_bot_count(cli.bots);
    let mistake_rate = normalize_mistake_rate(cli.mistake_rate);
    let think_ms = normalize_think_ms(cli.think_ms);
    let max_rooms = normalize_max_rooms(cli.max_rooms);

    (0..bots)
        .map(|idx| Scenario {
            name: format!("bot-{:02}", idx + 1),
            seed: normalize_seed(seed.wrapping_add(idx as u64)),
            mistake_rate,
            think_ms,
            max_rooms,
        })
        .collect()
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    clock_ms: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        clock_ms,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    end_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_rooms_cleared = if scenario_count == 0 {
        0.0
    } else {
        let total: u32 = scenarios.iter().map(|result| result.rooms_cleared).sum();
        total as f32 / scenario_count as f32
    };
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        generated_at_iso: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        scenario_count,
        anomaly_count,
        average_rooms_cleared,
        end_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    match_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    clock_ms: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp_ms: now_ms(),
        level: level.to_string(),
        event: event.to_string(),
        match_id: match_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        clock_ms,
        details,
    };
    match serde_json::to_string(&log_line) {
        Ok(line) => eprintln!("{line}"),
        Err(error) => eprintln!("[simulate] failed to serialize log line: {error}"),
    }
}

fn run_end_key(end: RunEnd) -> String {
    match end {
        RunEnd::TimeUp => "time_up",
        RunEnd::RoomGoal => "room_goal",
        RunEnd::FrameLimit => "frame_limit",
    }
    .to_string()
}

fn now_ms() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, summary_text)
}
