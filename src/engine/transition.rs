use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum TransitionStep {
    FadeOut,
    Advance,
}

impl<R: RandomSource> PuzzleGame<R> {
    pub(super) fn begin_transition(&mut self, door_idx: usize) {
        self.transitioning = true;
        if let Some(room) = self.room.as_mut() {
            room.begin_opening(door_idx);
        }
        self.scheduler
            .schedule(FADE_OUT_DELAY_MS, TransitionStep::FadeOut);
        self.scheduler
            .schedule(ADVANCE_DELAY_MS, TransitionStep::Advance);
    }

    pub(super) fn run_transition_step(&mut self, step: TransitionStep) {
        match step {
            TransitionStep::FadeOut => self.set_fade(1.0),
            TransitionStep::Advance => self.finish_advance(),
        }
    }

    fn finish_advance(&mut self) {
        let level_before = self.level();
        self.rooms_cleared += 1;
        self.peak_rooms_cleared = self.peak_rooms_cleared.max(self.rooms_cleared);
        self.time_remaining = self.time_limit_seconds();
        self.refresh_score_text();
        if self.level() > level_before {
            let label = format!("reached level {}", self.level());
            self.push_timeline(label);
        }
        self.spawn_room();
        self.set_fade(0.0);
        self.transitioning = false;
    }

    fn set_fade(&mut self, opacity: f32) {
        self.fade_opacity = opacity;
        self.events.push(RuntimeEvent::Fade { opacity });
    }
}
