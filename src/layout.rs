use std::f32::consts::FRAC_PI_2;

use crate::constants::door_count_for_rooms;
use crate::rng::RandomSource;
use crate::types::{DoorRole, DoorSlot, Vec3};

pub const DOOR_SLOTS: [DoorSlot; 3] = [
    DoorSlot {
        position: Vec3::new(0.0, -1.0, -5.9),
        yaw: 0.0,
    },
    DoorSlot {
        position: Vec3::new(5.9, -1.0, 0.0),
        yaw: -FRAC_PI_2,
    },
    DoorSlot {
        position: Vec3::new(-5.9, -1.0, 0.0),
        yaw: FRAC_PI_2,
    },
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlannedDoor {
    pub slot: DoorSlot,
    pub role: DoorRole,
}

pub fn plan_room(rooms_cleared: u32, rng: &mut impl RandomSource) -> Vec<PlannedDoor> {
    let door_count = door_count_for_rooms(rooms_cleared);

    let mut slots = DOOR_SLOTS;
    rng.shuffle(&mut slots);

    let mut roles = vec![DoorRole::Correct, DoorRole::Wrong];
    if door_count == 3 {
        roles.push(DoorRole::Trap);
    }
    rng.shuffle(&mut roles);

    slots
        .iter()
        .take(door_count)
        .zip(roles)
        .map(|(slot, role)| PlannedDoor { slot: *slot, role })
        .collect()
}
