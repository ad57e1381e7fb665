use crate::types::{DifficultyPhase, Palette, ToneRequest, Waveform};

pub const FRAME_MS: u64 = 16;
pub const FRAME_DT_SEC: f32 = 0.016;
pub const TIMER_TICK_MS: u64 = 1_000;

pub const START_TIME_SECONDS: i32 = 40;
pub const LOW_TIME_SECONDS: i32 = 10;
pub const WRONG_DOOR_PENALTY_SECONDS: i32 = 10;
pub const TRAP_PENALTY_ROOMS: u32 = 5;

pub const ROOMS_PER_LEVEL: u32 = 20;
pub const PHASE_CYCLE_ROOMS: u32 = 60;
pub const THREE_DOOR_AFTER_ROOMS: u32 = 5;

pub const FADE_OUT_DELAY_MS: u64 = 300;
pub const ADVANCE_DELAY_MS: u64 = 800;

pub const DOOR_OPEN_STEP_RAD: f32 = 0.08;
pub const DOOR_OPEN_LIMIT_RAD: f32 = -1.55;

pub const TRAP_LABEL: &str = "VOID";

pub const EYE_HEIGHT: f32 = 1.6;
pub const MOVE_ACCEL: f32 = 40.0;
pub const VELOCITY_DAMPING: f32 = 0.88;
pub const BOB_SPEED_THRESHOLD: f32 = 0.1;
pub const BOB_RATE: f32 = 10.0;
pub const BOB_AMPLITUDE: f32 = 0.04;

pub const HOVER_CORRECT_TONE: ToneRequest = ToneRequest::new(440.0, Waveform::Sine, 0.1, 0.01);
pub const HOVER_OTHER_TONE: ToneRequest = ToneRequest::new(100.0, Waveform::Sawtooth, 0.1, 0.01);
pub const SUCCESS_TONE: ToneRequest = ToneRequest::new(880.0, Waveform::Sine, 0.15, 0.05);
pub const TRAP_TONE: ToneRequest = ToneRequest::new(50.0, Waveform::Square, 0.8, 0.1);
pub const WRONG_TONE: ToneRequest = ToneRequest::new(110.0, Waveform::Sine, 0.5, 0.05);

pub fn level_for_rooms(rooms_cleared: u32) -> u32 {
    rooms_cleared / ROOMS_PER_LEVEL + 1
}

pub fn phase_for_rooms(rooms_cleared: u32) -> DifficultyPhase {
    match (rooms_cleared % PHASE_CYCLE_ROOMS) / ROOMS_PER_LEVEL {
        0 => DifficultyPhase::Basic,
        1 => DifficultyPhase::MixedAddSub,
        _ => DifficultyPhase::Advanced,
    }
}

pub fn door_count_for_rooms(rooms_cleared: u32) -> usize {
    if rooms_cleared > THREE_DOOR_AFTER_ROOMS {
        return 3;
    }
    2
}

pub fn palette_tier(level: u32) -> u8 {
    if level <= 1 {
        return 0;
    }
    if level <= 10 {
        return 1;
    }
    if level <= 20 {
        return 2;
    }
    3
}

pub fn palette_for_level(level: u32) -> Palette {
    let tier = palette_tier(level);
    let (wall, background, accent) = match tier {
        0 => (0xffffff, 0xf5f5f7, 0xd2d2d7),
        1 => (0xffffff, 0xf5f5f7, 0x0071e3),
        2 => (0x1d1d1f, 0x000000, 0xd4af37),
        _ => (0x013220, 0x001a11, 0xc0c0c0),
    };
    let sign_text = if wall == 0xffffff { 0x1d1d1f } else { 0xffffff };
    Palette {
        tier,
        wall,
        background,
        accent,
        sign_text,
    }
}
