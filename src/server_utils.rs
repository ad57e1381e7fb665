use std::f32::consts::{FRAC_PI_2, PI, TAU};

pub const DEFAULT_PORT: u16 = 8080;

pub fn parse_port(raw: Option<&str>) -> u16 {
    raw.and_then(|value| value.trim().parse::<u16>().ok())
        .filter(|port| *port != 0)
        .unwrap_or(DEFAULT_PORT)
}

/// Wraps into `(-PI, PI]`.
pub fn normalize_yaw(yaw: f32) -> f32 {
    let wrapped = (yaw + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

pub fn clamp_pitch(pitch: f32) -> f32 {
    pitch.clamp(-FRAC_PI_2, FRAC_PI_2)
}

pub fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

pub fn normalize_mistake_rate(value: Option<f32>) -> f32 {
    let rate = value.unwrap_or(0.15);
    if !rate.is_finite() {
        return 0.15;
    }
    rate.clamp(0.0, 1.0)
}

pub fn normalize_think_ms(value: Option<u64>) -> u64 {
    value.unwrap_or(1_500).clamp(100, 30_000)
}

pub fn normalize_bot_count(value: Option<usize>) -> usize {
    value.unwrap_or(3).clamp(1, 64)
}

pub fn normalize_max_rooms(value: Option<u32>) -> u32 {
    value.unwrap_or(60).clamp(1, 1_000)
}
