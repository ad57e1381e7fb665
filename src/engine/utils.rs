use crate::constants::LOW_TIME_SECONDS;

pub(super) fn format_timer(time_remaining: i32) -> String {
    format!("00:{:02}", time_remaining.max(0))
}

pub(super) fn format_score(level: u32, rooms_cleared: u32) -> String {
    format!("LEVEL {level} | ROOM {rooms_cleared:02}")
}

pub(super) fn format_failure(rooms_cleared: u32, level: u32) -> String {
    format!("Progress: {rooms_cleared} rooms across {level} levels.")
}

pub(super) fn is_low_time(time_remaining: i32) -> bool {
    time_remaining > 0 && time_remaining <= LOW_TIME_SECONDS
}
