use crate::constants::{
    level_for_rooms, ADVANCE_DELAY_MS, FADE_OUT_DELAY_MS, START_TIME_SECONDS, SUCCESS_TONE,
    TIMER_TICK_MS, TRAP_PENALTY_ROOMS, TRAP_TONE, WRONG_DOOR_PENALTY_SECONDS, WRONG_TONE,
};
use crate::geometry::pick_door;
use crate::player::PlayerBody;
use crate::rng::{RandomSource, Rng};
use crate::room::{HoverChange, Room};
use crate::scheduler::Scheduler;
use crate::types::{
    DoorRole, FrameInput, GameState, GameSummary, HoverProbe, RuntimeEvent, Snapshot,
    TimelineEvent, ToneRequest,
};

mod transition;
mod utils;

use self::transition::TransitionStep;
use self::utils::{format_failure, format_score, format_timer, is_low_time};

#[derive(Clone, Debug, Default)]
pub struct PuzzleGameOptions {
    pub time_limit_seconds_override: Option<i32>,
    pub starting_rooms_cleared: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractOutcome {
    Ignored,
    Advancing,
    Trapped,
    Penalized,
}

#[derive(Clone, Debug)]
pub struct PuzzleGame<R = Rng> {
    pub options: PuzzleGameOptions,

    rng: R,
    room: Option<Room>,
    body: PlayerBody,
    scheduler: Scheduler<TransitionStep>,
    events: Vec<RuntimeEvent>,
    timeline: Vec<TimelineEvent>,

    started: bool,
    alive: bool,
    paused: bool,
    transitioning: bool,
    timer_running: bool,

    rooms_cleared: u32,
    peak_rooms_cleared: u32,
    time_remaining: i32,
    timer_accumulator_ms: u64,
    fade_opacity: f32,
    score_text: String,
    started_at_ms: u64,
    ended_at_ms: Option<u64>,
    reported_state: GameState,
}

impl PuzzleGame<Rng> {
    pub fn new(seed: u32, options: PuzzleGameOptions) -> Self {
        Self::with_random_source(Rng::new(seed), options)
    }
}

impl<R: RandomSource> PuzzleGame<R> {
    pub fn with_random_source(rng: R, options: PuzzleGameOptions) -> Self {
        let rooms_cleared = options.starting_rooms_cleared;
        let mut game = Self {
            options,
            rng,
            room: None,
            body: PlayerBody::default(),
            scheduler: Scheduler::default(),
            events: Vec::new(),
            timeline: Vec::new(),
            started: false,
            alive: false,
            paused: false,
            transitioning: false,
            timer_running: false,
            rooms_cleared,
            peak_rooms_cleared: rooms_cleared,
            time_remaining: 0,
            timer_accumulator_ms: 0,
            fade_opacity: 0.0,
            score_text: String::new(),
            started_at_ms: 0,
            ended_at_ms: None,
            reported_state: GameState::PreStart,
        };
        game.time_remaining = game.time_limit_seconds();
        game.score_text = format_score(game.level(), game.rooms_cleared);
        game
    }

    pub fn state(&self) -> GameState {
        if !self.started {
            GameState::PreStart
        } else if !self.alive {
            GameState::Dead
        } else if self.paused {
            GameState::Paused
        } else if self.transitioning {
            GameState::Transitioning
        } else {
            GameState::Playing
        }
    }

    pub fn is_ended(&self) -> bool {
        self.state() == GameState::Dead
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn rooms_cleared(&self) -> u32 {
        self.rooms_cleared
    }

    pub fn level(&self) -> u32 {
        level_for_rooms(self.rooms_cleared)
    }

    pub fn time_remaining(&self) -> i32 {
        self.time_remaining
    }

    pub fn room(&self) -> Option<&Room> {
        self.room.as_ref()
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    pub fn clock_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.alive = true;
        self.paused = false;
        self.timer_running = true;
        self.timer_accumulator_ms = 0;
        self.started_at_ms = self.clock_ms();
        self.time_remaining = self.time_limit_seconds();
        self.push_timeline("game started".to_string());
        self.refresh_score_text();
        self.push_timer_text();
        self.spawn_room();
        self.sync_state();
    }

    pub fn pointer_locked(&mut self) {
        if !self.alive {
            return;
        }
        self.paused = false;
        self.sync_state();
    }

    /// Exclusive pointer control lost. An in-flight transition keeps running.
    pub fn pointer_released(&mut self) {
        if !self.alive {
            return;
        }
        self.paused = true;
        self.sync_state();
    }

    pub fn interact(&mut self) -> InteractOutcome {
        if self.state() != GameState::Playing {
            return InteractOutcome::Ignored;
        }
        let Some(room) = self.room.as_ref() else {
            return InteractOutcome::Ignored;
        };
        let (Some(door_idx), Some(role)) = (room.hovered(), room.hovered_role()) else {
            return InteractOutcome::Ignored;
        };

        let outcome = match role {
            DoorRole::Correct => {
                self.play(SUCCESS_TONE);
                self.begin_transition(door_idx);
                InteractOutcome::Advancing
            }
            DoorRole::Trap => {
                self.play(TRAP_TONE);
                self.rooms_cleared = self.rooms_cleared.saturating_sub(TRAP_PENALTY_ROOMS);
                let label = format!("trap sent back to room {}", self.rooms_cleared);
                self.push_timeline(label);
                self.refresh_score_text();
                self.spawn_room();
                InteractOutcome::Trapped
            }
            DoorRole::Wrong => {
                self.play(WRONG_TONE);
                self.time_remaining -= WRONG_DOOR_PENALTY_SECONDS;
                InteractOutcome::Penalized
            }
        };
        self.sync_state();
        outcome
    }

    pub fn frame(&mut self, dt_ms: u64, input: &FrameInput) {
        for step in self.scheduler.advance(dt_ms) {
            self.run_transition_step(step);
        }
        if let Some(room) = self.room.as_mut() {
            room.animate();
        }

        if self.state() == GameState::Playing {
            self.body.look(input.yaw, input.pitch);
            self.body.step(input.movement);
            let target = match input.hover {
                HoverProbe::ViewRay => {
                    let origin = self.body.position;
                    let direction = self.body.view_direction();
                    self.room
                        .as_ref()
                        .and_then(|room| pick_door(room, origin, direction))
                }
                HoverProbe::Reported(target) => target,
            };
            self.update_hover(target);
        }
        self.sync_state();
    }

    pub fn timer_tick(&mut self) {
        if !self.timer_running {
            return;
        }
        if !self.alive || self.paused || self.transitioning {
            return;
        }
        self.time_remaining -= 1;
        self.push_timer_text();
        if self.time_remaining <= 0 {
            self.die();
        }
        self.sync_state();
    }

    pub fn step(&mut self, dt_ms: u64, input: &FrameInput) {
        self.frame(dt_ms, input);
        self.timer_accumulator_ms += dt_ms;
        while self.timer_accumulator_ms >= TIMER_TICK_MS {
            self.timer_accumulator_ms -= TIMER_TICK_MS;
            self.timer_tick();
        }
    }

    pub fn hard_reset(&mut self) {
        self.scheduler.cancel_all();
        self.room = None;
        self.body = PlayerBody::default();
        self.timeline.clear();
        self.started = false;
        self.alive = false;
        self.paused = false;
        self.transitioning = false;
        self.timer_running = false;
        self.rooms_cleared = self.options.starting_rooms_cleared;
        self.peak_rooms_cleared = self.rooms_cleared;
        self.time_remaining = self.time_limit_seconds();
        self.timer_accumulator_ms = 0;
        self.fade_opacity = 0.0;
        self.ended_at_ms = None;
        self.score_text = format_score(self.level(), self.rooms_cleared);
        self.events.clear();
        self.sync_state();
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let snapshot = Snapshot {
            clock_ms: self.clock_ms(),
            state: self.state(),
            rooms_cleared: self.rooms_cleared,
            level: self.level(),
            time_remaining: self.time_remaining,
            timer_text: format_timer(self.time_remaining),
            score_text: self.score_text.clone(),
            low_time: is_low_time(self.time_remaining),
            fade_opacity: self.fade_opacity,
            room: self.room.as_ref().map(Room::view),
            camera: self.body.camera(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> GameSummary {
        let end = self.ended_at_ms.unwrap_or_else(|| self.clock_ms());
        GameSummary {
            rooms_cleared: self.rooms_cleared,
            level: self.level(),
            peak_rooms_cleared: self.peak_rooms_cleared,
            duration_ms: end.saturating_sub(self.started_at_ms),
            text: format_failure(self.rooms_cleared, self.level()),
            timeline: self.timeline.clone(),
        }
    }

    fn time_limit_seconds(&self) -> i32 {
        self.options
            .time_limit_seconds_override
            .unwrap_or(START_TIME_SECONDS)
    }

    fn update_hover(&mut self, target: Option<usize>) {
        let Some(room) = self.room.as_mut() else {
            return;
        };
        if let Some(change) = room.set_hover(target) {
            self.record_hover(change);
        }
    }

    fn record_hover(&mut self, change: HoverChange) {
        self.events.push(RuntimeEvent::HoverChanged {
            door: change.current,
        });
        if let Some(cue) = change.cue {
            self.play(cue);
        }
    }

    fn spawn_room(&mut self) {
        let had_hover = self
            .room
            .as_ref()
            .and_then(Room::hovered)
            .is_some();
        let room = Room::spawn(self.rooms_cleared, self.level(), &mut self.rng);
        let door_count = room.doors.len();
        self.room = Some(room);
        self.body.recenter();
        if had_hover {
            self.events.push(RuntimeEvent::HoverChanged { door: None });
        }
        self.events.push(RuntimeEvent::RoomSpawned {
            rooms_cleared: self.rooms_cleared,
            door_count,
        });
    }

    fn die(&mut self) {
        self.alive = false;
        self.paused = false;
        self.timer_running = false;
        self.ended_at_ms = Some(self.clock_ms());
        self.push_timeline("time ran out".to_string());
        self.events.push(RuntimeEvent::Died {
            text: format_failure(self.rooms_cleared, self.level()),
        });
    }

    fn play(&mut self, tone: ToneRequest) {
        self.events.push(RuntimeEvent::Tone { tone });
    }

    fn refresh_score_text(&mut self) {
        self.score_text = format_score(self.level(), self.rooms_cleared);
        self.events.push(RuntimeEvent::ScoreChanged {
            text: self.score_text.clone(),
        });
    }

    fn push_timer_text(&mut self) {
        self.events.push(RuntimeEvent::TimerChanged {
            text: format_timer(self.time_remaining),
            low_time: is_low_time(self.time_remaining),
        });
    }

    fn push_timeline(&mut self, label: String) {
        self.timeline.push(TimelineEvent {
            at_ms: self.clock_ms().saturating_sub(self.started_at_ms),
            label,
        });
    }

    fn sync_state(&mut self) {
        let state = self.state();
        if state != self.reported_state {
            self.reported_state = state;
            self.events.push(RuntimeEvent::StateChanged { state });
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::constants::{
        level_for_rooms, ADVANCE_DELAY_MS, FADE_OUT_DELAY_MS, FRAME_MS, HOVER_CORRECT_TONE,
        HOVER_OTHER_TONE, START_TIME_SECONDS, TRAP_LABEL, WRONG_TONE,
    };
    use crate::engine::{InteractOutcome, PuzzleGame, PuzzleGameOptions};
    use crate::geometry::{aim_at, door_center};
    use crate::rng::Rng;
    use crate::types::{DoorRole, FrameInput, GameState, HoverProbe, RuntimeEvent};

    fn started(seed: u32, rooms_cleared: u32) -> PuzzleGame {
        let mut game = PuzzleGame::new(
            seed,
            PuzzleGameOptions {
                time_limit_seconds_override: None,
                starting_rooms_cleared: rooms_cleared,
            },
        );
        game.start();
        game
    }

    fn with_time_limit(seed: u32, seconds: i32) -> PuzzleGame {
        let mut game = PuzzleGame::new(
            seed,
            PuzzleGameOptions {
                time_limit_seconds_override: Some(seconds),
                starting_rooms_cleared: 0,
            },
        );
        game.start();
        game
    }

    fn door_index(game: &PuzzleGame, role: DoorRole) -> Option<usize> {
        game.room()?.doors.iter().position(|door| door.role == role)
    }

    fn reported(target: Option<usize>) -> FrameInput {
        FrameInput {
            hover: HoverProbe::Reported(target),
            ..FrameInput::default()
        }
    }

    fn hover_role(game: &mut PuzzleGame, role: DoorRole) {
        let idx = door_index(game, role).expect("room has a door with this role");
        game.frame(FRAME_MS, &reported(Some(idx)));
        assert_eq!(game.room().and_then(|room| room.hovered()), Some(idx));
    }

    fn run_frames(game: &mut PuzzleGame, total_ms: u64, input: &FrameInput) {
        let mut elapsed = 0;
        while elapsed < total_ms {
            game.frame(FRAME_MS, input);
            elapsed += FRAME_MS;
        }
    }

    fn door_fingerprint(game: &PuzzleGame) -> Vec<(DoorRole, String, f32, f32)> {
        game.room()
            .expect("room spawned")
            .doors
            .iter()
            .map(|door| {
                (
                    door.role,
                    door.puzzle_text.clone(),
                    door.slot.position.x,
                    door.slot.position.z,
                )
            })
            .collect()
    }

    #[test]
    fn pre_start_ignores_everything() {
        let mut game = PuzzleGame::new(1, PuzzleGameOptions::default());
        assert_eq!(game.state(), GameState::PreStart);
        game.timer_tick();
        game.frame(FRAME_MS, &reported(Some(0)));
        assert_eq!(game.interact(), InteractOutcome::Ignored);
        assert_eq!(game.time_remaining(), START_TIME_SECONDS);
        assert!(game.room().is_none());
        game.pointer_released();
        assert_eq!(game.state(), GameState::PreStart);
    }

    #[test]
    fn first_room_has_two_basic_doors() {
        let game = started(2, 0);
        assert_eq!(game.state(), GameState::Playing);
        let room = game.room().expect("room spawned");
        assert_eq!(room.doors.len(), 2);
        assert!(door_index(&game, DoorRole::Correct).is_some());
        assert!(door_index(&game, DoorRole::Wrong).is_some());
        for door in &room.doors {
            assert!(door.puzzle_text.contains(" + "));
        }
    }

    #[test]
    fn room_after_six_clears_has_one_trap_with_sentinel() {
        let game = started(3, 6);
        let room = game.room().expect("room spawned");
        assert_eq!(room.doors.len(), 3);
        let traps: Vec<_> = room
            .doors
            .iter()
            .filter(|door| door.role == DoorRole::Trap)
            .collect();
        assert_eq!(traps.len(), 1);
        assert_eq!(traps[0].puzzle_text, TRAP_LABEL);
    }

    #[test]
    fn interact_without_hover_is_a_no_op() {
        let mut game = started(4, 0);
        let before = door_fingerprint(&game);
        assert_eq!(game.interact(), InteractOutcome::Ignored);
        assert_eq!(game.time_remaining(), START_TIME_SECONDS);
        assert_eq!(door_fingerprint(&game), before);
    }

    #[test]
    fn correct_door_at_nineteen_advances_to_level_two() {
        let mut game = started(5, 19);
        game.timer_tick();
        assert_eq!(game.time_remaining(), START_TIME_SECONDS - 1);

        hover_role(&mut game, DoorRole::Correct);
        assert_eq!(game.interact(), InteractOutcome::Advancing);
        assert_eq!(game.state(), GameState::Transitioning);
        assert_eq!(game.interact(), InteractOutcome::Ignored);

        game.timer_tick();
        assert_eq!(game.time_remaining(), START_TIME_SECONDS - 1);

        let idle = FrameInput::default();
        run_frames(&mut game, FADE_OUT_DELAY_MS + FRAME_MS, &idle);
        assert_eq!(game.build_snapshot(false).fade_opacity, 1.0);
        assert_eq!(game.rooms_cleared(), 19);

        run_frames(
            &mut game,
            ADVANCE_DELAY_MS - FADE_OUT_DELAY_MS - FRAME_MS,
            &idle,
        );
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.rooms_cleared(), 20);
        assert_eq!(game.level(), 2);
        assert_eq!(game.time_remaining(), START_TIME_SECONDS);

        let snapshot = game.build_snapshot(true);
        assert_eq!(snapshot.fade_opacity, 0.0);
        assert_eq!(snapshot.score_text, "LEVEL 2 | ROOM 20");
        assert_eq!(snapshot.room.expect("room").palette.tier, 1);
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::Fade { opacity } if *opacity == 1.0)));
    }

    #[test]
    fn opening_door_swings_during_transition() {
        let mut game = started(6, 0);
        hover_role(&mut game, DoorRole::Correct);
        let idx = door_index(&game, DoorRole::Correct).expect("correct door");
        game.interact();
        game.frame(FRAME_MS, &FrameInput::default());
        let door = &game.room().expect("room").doors[idx];
        assert!(door.hinge_angle() < 0.0);
    }

    #[test]
    fn hover_is_frozen_while_transitioning() {
        let mut game = started(7, 0);
        hover_role(&mut game, DoorRole::Correct);
        let idx = door_index(&game, DoorRole::Correct).expect("correct door");
        game.interact();
        game.frame(FRAME_MS, &reported(None));
        assert_eq!(game.room().and_then(|room| room.hovered()), Some(idx));
    }

    #[test]
    fn trap_knocks_back_five_rooms_without_transition() {
        let mut game = started(8, 7);
        let time_before = game.time_remaining();
        hover_role(&mut game, DoorRole::Trap);
        assert_eq!(game.interact(), InteractOutcome::Trapped);
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.rooms_cleared(), 2);
        assert_eq!(game.time_remaining(), time_before);
        assert_eq!(game.room().expect("room").doors.len(), 2);
        assert_eq!(game.room().and_then(|room| room.hovered()), None);
        assert_eq!(game.build_snapshot(false).score_text, "LEVEL 1 | ROOM 02");
    }

    #[test]
    fn trap_can_drop_a_level_tier() {
        let mut game = started(9, 21);
        assert_eq!(game.level(), 2);
        hover_role(&mut game, DoorRole::Trap);
        game.interact();
        assert_eq!(game.rooms_cleared(), 16);
        assert_eq!(game.level(), 1);
        assert_eq!(game.room().expect("room").palette.tier, 0);
    }

    #[test]
    fn trap_penalty_is_clamped_at_zero() {
        let mut game = started(10, 6);
        hover_role(&mut game, DoorRole::Trap);
        game.interact();
        assert_eq!(game.rooms_cleared(), 1);

        // A fresh three-door room only appears above five clears, so force one.
        let mut game = started(10, 6);
        game.rooms_cleared = 3;
        hover_role(&mut game, DoorRole::Trap);
        game.interact();
        assert_eq!(game.rooms_cleared(), 0);
        assert_eq!(game.level(), 1);
    }

    #[test]
    fn wrong_door_costs_ten_seconds_and_keeps_the_room() {
        let mut game = started(11, 8);
        let before = door_fingerprint(&game);
        hover_role(&mut game, DoorRole::Wrong);
        game.build_snapshot(true);

        assert_eq!(game.interact(), InteractOutcome::Penalized);
        assert_eq!(game.time_remaining(), START_TIME_SECONDS - 10);
        assert_eq!(door_fingerprint(&game), before);
        assert_eq!(game.rooms_cleared(), 8);

        let events = game.build_snapshot(true).events;
        assert!(events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::Tone { tone } if *tone == WRONG_TONE)));
        assert!(!events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::RoomSpawned { .. })));

        // Still hovered, so a second click costs again.
        assert_eq!(game.interact(), InteractOutcome::Penalized);
        assert_eq!(game.time_remaining(), START_TIME_SECONDS - 20);
    }

    #[test]
    fn last_second_tick_kills_and_stops_the_timer() {
        let mut game = with_time_limit(12, 1);
        game.build_snapshot(true);
        game.timer_tick();
        assert_eq!(game.state(), GameState::Dead);
        assert!(game.is_ended());

        let snapshot = game.build_snapshot(true);
        assert_eq!(snapshot.timer_text, "00:00");
        assert!(snapshot
            .events
            .iter()
            .any(|event| matches!(event, RuntimeEvent::Died { .. })));

        game.timer_tick();
        assert_eq!(game.time_remaining(), 0);
        assert_eq!(game.interact(), InteractOutcome::Ignored);
        game.pointer_released();
        assert_eq!(game.state(), GameState::Dead);

        let summary = game.build_summary();
        assert_eq!(summary.text, "Progress: 0 rooms across 1 levels.");
        assert_eq!(
            summary.timeline.last().map(|event| event.label.as_str()),
            Some("time ran out")
        );
    }

    #[test]
    fn wrong_penalty_below_zero_dies_on_next_tick() {
        let mut game = with_time_limit(13, 5);
        hover_role(&mut game, DoorRole::Wrong);
        game.interact();
        assert_eq!(game.time_remaining(), -5);
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.build_snapshot(false).timer_text, "00:00");
        game.timer_tick();
        assert_eq!(game.state(), GameState::Dead);
    }

    #[test]
    fn low_time_flag_turns_on_at_ten_seconds() {
        let mut game = with_time_limit(14, 11);
        game.build_snapshot(true);
        game.timer_tick();
        let snapshot = game.build_snapshot(true);
        assert!(snapshot.low_time);
        assert!(snapshot.events.iter().any(|event| matches!(
            event,
            RuntimeEvent::TimerChanged { low_time: true, text } if text == "00:10"
        )));
    }

    #[test]
    fn paused_game_keeps_its_time() {
        let mut game = started(15, 0);
        game.pointer_released();
        assert_eq!(game.state(), GameState::Paused);
        for _ in 0..5 {
            game.timer_tick();
        }
        assert_eq!(game.time_remaining(), START_TIME_SECONDS);
        assert_eq!(game.interact(), InteractOutcome::Ignored);

        game.pointer_locked();
        assert_eq!(game.state(), GameState::Playing);
        game.timer_tick();
        assert_eq!(game.time_remaining(), START_TIME_SECONDS - 1);
    }

    #[test]
    fn pausing_mid_transition_still_completes_it() {
        let mut game = started(16, 0);
        hover_role(&mut game, DoorRole::Correct);
        game.interact();
        game.pointer_released();
        assert_eq!(game.state(), GameState::Paused);

        run_frames(&mut game, ADVANCE_DELAY_MS, &FrameInput::default());
        assert_eq!(game.rooms_cleared(), 1);
        assert!(!game.is_transitioning());
        assert_eq!(game.state(), GameState::Paused);

        game.pointer_locked();
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn step_drives_the_timer_once_per_second() {
        let mut game = started(17, 0);
        let idle = FrameInput::default();
        for _ in 0..125 {
            game.step(FRAME_MS, &idle);
        }
        assert_eq!(game.time_remaining(), START_TIME_SECONDS - 2);
    }

    #[test]
    fn view_ray_hover_picks_the_door_in_sight() {
        let mut game = started(18, 10);
        game.build_snapshot(true);
        let eye = game.body().position;
        let room = game.room().expect("room").clone();
        for (idx, door) in room.doors.iter().enumerate() {
            let (yaw, pitch) = aim_at(eye, door_center(&door.slot));
            game.frame(
                FRAME_MS,
                &FrameInput {
                    yaw,
                    pitch,
                    ..FrameInput::default()
                },
            );
            assert_eq!(game.room().and_then(|room| room.hovered()), Some(idx));
            let expected = if door.role == DoorRole::Correct {
                HOVER_CORRECT_TONE
            } else {
                HOVER_OTHER_TONE
            };
            let events = game.build_snapshot(true).events;
            assert!(events
                .iter()
                .any(|event| matches!(event, RuntimeEvent::Tone { tone } if *tone == expected)));
        }
    }

    #[test]
    fn hard_reset_cancels_pending_advance() {
        let mut game = started(19, 4);
        hover_role(&mut game, DoorRole::Correct);
        game.interact();
        game.hard_reset();
        assert_eq!(game.state(), GameState::PreStart);
        run_frames(&mut game, 2 * ADVANCE_DELAY_MS, &FrameInput::default());
        assert_eq!(game.rooms_cleared(), 4);
        assert!(game.room().is_none());

        game.start();
        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.time_remaining(), START_TIME_SECONDS);
    }

    #[test]
    fn hard_reset_discards_queued_events() {
        let mut game = started(22, 0);
        hover_role(&mut game, DoorRole::Wrong);
        assert_eq!(game.interact(), InteractOutcome::Penalized);
        game.hard_reset();

        let snapshot = game.build_snapshot(true);
        assert!(snapshot.room.is_none());
        assert_eq!(snapshot.score_text, "LEVEL 1 | ROOM 00");
        assert_eq!(snapshot.events.len(), 1);
        assert!(matches!(
            snapshot.events[0],
            RuntimeEvent::StateChanged {
                state: GameState::PreStart
            }
        ));
    }

    #[test]
    fn build_snapshot_drains_events_when_requested() {
        let mut game = started(20, 0);
        let first = game.build_snapshot(true);
        let second = game.build_snapshot(true);
        assert!(!first.events.is_empty());
        assert!(second.events.is_empty());
    }

    #[test]
    fn level_matches_rooms_cleared_through_random_play() {
        for seed in 1..=20u32 {
            let mut game = started(seed, 0);
            let mut rng = Rng::new(seed * 31);
            let idle = FrameInput::default();
            for _ in 0..400 {
                if game.is_ended() {
                    break;
                }
                if !game.is_transitioning() {
                    let count = game.room().map(|room| room.doors.len()).unwrap_or(0);
                    let pick = crate::rng::RandomSource::pick_index(&mut rng, count);
                    game.frame(FRAME_MS, &reported(Some(pick)));
                    game.interact();
                }
                game.step(100, &idle);
                assert_eq!(game.level(), level_for_rooms(game.rooms_cleared()));
                let room = game.room().expect("room");
                let expected_doors = if game.rooms_cleared() > 5 { 3 } else { 2 };
                if !game.is_transitioning() {
                    assert_eq!(room.doors.len(), expected_doors);
                }
                assert!(game.time_remaining() <= START_TIME_SECONDS);
            }
        }
    }

    #[test]
    fn same_seed_produces_same_rooms() {
        let mut a = started(424_242, 10);
        let mut b = started(424_242, 10);
        for _ in 0..10 {
            assert_eq!(door_fingerprint(&a), door_fingerprint(&b));
            hover_role(&mut a, DoorRole::Correct);
            hover_role(&mut b, DoorRole::Correct);
            a.interact();
            b.interact();
            run_frames(&mut a, ADVANCE_DELAY_MS, &FrameInput::default());
            run_frames(&mut b, ADVANCE_DELAY_MS, &FrameInput::default());
        }
        assert_eq!(a.rooms_cleared(), 20);
        assert_eq!(b.rooms_cleared(), 20);
    }

    #[test]
    fn state_changes_are_reported_once() {
        let mut game = started(21, 0);
        game.pointer_released();
        game.pointer_released();
        let changes: Vec<GameState> = game
            .build_snapshot(true)
            .events
            .into_iter()
            .filter_map(|event| match event {
                RuntimeEvent::StateChanged { state } => Some(state),
                _ => None,
            })
            .collect();
        assert_eq!(changes, vec![GameState::Playing, GameState::Paused]);
    }
}
