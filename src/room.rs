use crate::constants::{
    palette_for_level, phase_for_rooms, DOOR_OPEN_LIMIT_RAD, DOOR_OPEN_STEP_RAD,
    HOVER_CORRECT_TONE, HOVER_OTHER_TONE,
};
use crate::equation::puzzle_text;
use crate::layout::plan_room;
use crate::rng::RandomSource;
use crate::types::{DoorRole, DoorSlot, DoorView, Palette, RoomView, ToneRequest};

#[derive(Clone, Debug)]
pub struct Door {
    pub role: DoorRole,
    pub puzzle_text: String,
    pub slot: DoorSlot,
    pub is_hovered: bool,
    hinge_angle: f32,
    opening: bool,
}

impl Door {
    pub fn hinge_angle(&self) -> f32 {
        self.hinge_angle
    }

    pub fn is_opening(&self) -> bool {
        self.opening
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverChange {
    pub previous: Option<usize>,
    pub current: Option<usize>,
    pub cue: Option<ToneRequest>,
}

#[derive(Clone, Debug)]
pub struct Room {
    pub doors: Vec<Door>,
    pub palette: Palette,
    hovered: Option<usize>,
}

impl Room {
    pub fn spawn(rooms_cleared: u32, level: u32, rng: &mut impl RandomSource) -> Self {
        let phase = phase_for_rooms(rooms_cleared);
        let doors = plan_room(rooms_cleared, rng)
            .into_iter()
            .map(|planned| Door {
                role: planned.role,
                puzzle_text: puzzle_text(planned.role, phase, rng),
                slot: planned.slot,
                is_hovered: false,
                hinge_angle: 0.0,
                opening: false,
            })
            .collect();
        Self {
            doors,
            palette: palette_for_level(level),
            hovered: None,
        }
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn hovered_role(&self) -> Option<DoorRole> {
        self.hovered
            .and_then(|idx| self.doors.get(idx))
            .map(|door| door.role)
    }

    /// Out-of-range targets count as no target.
    pub fn set_hover(&mut self, target: Option<usize>) -> Option<HoverChange> {
        let target = target.filter(|idx| *idx < self.doors.len());
        if target == self.hovered {
            return None;
        }
        let previous = self.hovered;
        if let Some(door) = previous.and_then(|idx| self.doors.get_mut(idx)) {
            door.is_hovered = false;
        }
        self.hovered = target;
        let cue = target.and_then(|idx| self.doors.get_mut(idx)).map(|door| {
            door.is_hovered = true;
            if door.role == DoorRole::Correct {
                HOVER_CORRECT_TONE
            } else {
                HOVER_OTHER_TONE
            }
        });
        Some(HoverChange {
            previous,
            current: target,
            cue,
        })
    }

    pub fn begin_opening(&mut self, idx: usize) {
        if let Some(door) = self.doors.get_mut(idx) {
            door.opening = true;
        }
    }

    pub fn animate(&mut self) {
        for door in &mut self.doors {
            if !door.opening {
                continue;
            }
            if door.hinge_angle > DOOR_OPEN_LIMIT_RAD {
                door.hinge_angle -= DOOR_OPEN_STEP_RAD;
            } else {
                door.opening = false;
            }
        }
    }

    pub fn view(&self) -> RoomView {
        RoomView {
            doors: self
                .doors
                .iter()
                .enumerate()
                .map(|(index, door)| DoorView {
                    index,
                    role: door.role,
                    puzzle_text: door.puzzle_text.clone(),
                    hovered: door.is_hovered,
                    hinge_angle: door.hinge_angle,
                    slot: door.slot,
                })
                .collect(),
            palette: self.palette,
        }
    }
}
