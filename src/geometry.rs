use crate::room::Room;
use crate::types::{DoorSlot, Vec3};

const PANEL_CENTER: Vec3 = Vec3::new(0.1, 0.0, 0.1);
const PANEL_HALF: Vec3 = Vec3::new(1.5, 2.5, 0.075);

pub fn view_direction(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        -yaw.sin() * pitch.cos(),
        pitch.sin(),
        -yaw.cos() * pitch.cos(),
    )
}

pub fn aim_at(from: Vec3, target: Vec3) -> (f32, f32) {
    let dx = target.x - from.x;
    let dy = target.y - from.y;
    let dz = target.z - from.z;
    let yaw = (-dx).atan2(-dz);
    let pitch = dy.atan2((dx * dx + dz * dz).sqrt());
    (yaw, pitch)
}

pub fn forward_on_ground(yaw: f32) -> (f32, f32) {
    (-yaw.sin(), -yaw.cos())
}

pub fn right_on_ground(yaw: f32) -> (f32, f32) {
    (yaw.cos(), -yaw.sin())
}

fn rotate_y(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos + v.z * sin, v.y, -v.x * sin + v.z * cos)
}

pub fn door_center(slot: &DoorSlot) -> Vec3 {
    let offset = rotate_y(PANEL_CENTER, slot.yaw);
    Vec3::new(
        slot.position.x + offset.x,
        slot.position.y + offset.y,
        slot.position.z + offset.z,
    )
}

pub fn ray_hits_door(origin: Vec3, direction: Vec3, slot: &DoorSlot) -> Option<f32> {
    let relative = Vec3::new(
        origin.x - slot.position.x,
        origin.y - slot.position.y,
        origin.z - slot.position.z,
    );
    let local_origin = rotate_y(relative, -slot.yaw);
    let local_dir = rotate_y(direction, -slot.yaw);

    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;
    let axes = [
        (local_origin.x, local_dir.x, PANEL_CENTER.x, PANEL_HALF.x),
        (local_origin.y, local_dir.y, PANEL_CENTER.y, PANEL_HALF.y),
        (local_origin.z, local_dir.z, PANEL_CENTER.z, PANEL_HALF.z),
    ];
    for (o, d, center, half) in axes {
        let lo = center - half;
        let hi = center + half;
        if d.abs() < 1e-6 {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let t1 = (lo - o) / d;
        let t2 = (hi - o) / d;
        t_min = t_min.max(t1.min(t2));
        t_max = t_max.min(t1.max(t2));
    }
    if t_max < t_min.max(0.0) {
        return None;
    }
    Some(t_min.max(0.0))
}

pub fn pick_door(room: &Room, origin: Vec3, direction: Vec3) -> Option<usize> {
    room.doors
        .iter()
        .enumerate()
        .filter_map(|(idx, door)| ray_hits_door(origin, direction, &door.slot).map(|t| (idx, t)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::EYE_HEIGHT;
    use crate::layout::DOOR_SLOTS;

    const EYE: Vec3 = Vec3::new(0.0, EYE_HEIGHT, 0.0);

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn yaw_zero_looks_down_negative_z() {
        let dir = view_direction(0.0, 0.0);
        assert!(approx(dir.x, 0.0) && approx(dir.y, 0.0) && approx(dir.z, -1.0));
        let (fx, fz) = forward_on_ground(0.0);
        let (rx, rz) = right_on_ground(0.0);
        assert!(approx(fx, 0.0) && approx(fz, -1.0));
        assert!(approx(rx, 1.0) && approx(rz, 0.0));
    }

    #[test]
    fn aim_at_inverts_view_direction() {
        for slot in DOOR_SLOTS {
            let target = door_center(&slot);
            let (yaw, pitch) = aim_at(EYE, target);
            let dir = view_direction(yaw, pitch);
            let dx = target.x - EYE.x;
            let dy = target.y - EYE.y;
            let dz = target.z - EYE.z;
            let len = (dx * dx + dy * dy + dz * dz).sqrt();
            assert!(approx(dir.x, dx / len));
            assert!(approx(dir.y, dy / len));
            assert!(approx(dir.z, dz / len));
        }
    }

    #[test]
    fn aiming_at_each_door_centre_hits_that_door() {
        for slot in DOOR_SLOTS {
            let (yaw, pitch) = aim_at(EYE, door_center(&slot));
            let t = ray_hits_door(EYE, view_direction(yaw, pitch), &slot);
            assert!(t.is_some());
        }
    }

    #[test]
    fn looking_level_passes_over_the_doors() {
        // Panels top out at 1.5, just under eye height.
        for slot in DOOR_SLOTS {
            let (yaw, _) = aim_at(EYE, door_center(&slot));
            assert!(ray_hits_door(EYE, view_direction(yaw, 0.0), &slot).is_none());
        }
    }

    #[test]
    fn looking_away_misses() {
        let front = DOOR_SLOTS[0];
        let (yaw, pitch) = aim_at(EYE, door_center(&front));
        let behind = view_direction(yaw + std::f32::consts::PI, pitch);
        assert!(ray_hits_door(EYE, behind, &front).is_none());
    }

    #[test]
    fn right_slot_faces_the_room_centre() {
        let right = DOOR_SLOTS[1];
        let center = door_center(&right);
        assert!(center.x < right.position.x);
        assert!(approx(center.z, right.position.z + 0.1));
    }
}
