use crate::constants::{
    BOB_AMPLITUDE, BOB_RATE, BOB_SPEED_THRESHOLD, EYE_HEIGHT, FRAME_DT_SEC, MOVE_ACCEL,
    VELOCITY_DAMPING,
};
use crate::geometry::{forward_on_ground, right_on_ground, view_direction};
use crate::types::{CameraView, MoveIntent, Vec3};

#[derive(Clone, Debug)]
pub struct PlayerBody {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    velocity_x: f32,
    velocity_z: f32,
    bob_phase: f32,
}

impl Default for PlayerBody {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, EYE_HEIGHT, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            velocity_x: 0.0,
            velocity_z: 0.0,
            bob_phase: 0.0,
        }
    }
}

impl PlayerBody {
    pub fn recenter(&mut self) {
        self.position = Vec3::new(0.0, EYE_HEIGHT, 0.0);
        self.velocity_x = 0.0;
        self.velocity_z = 0.0;
    }

    pub fn look(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch;
    }

    pub fn speed(&self) -> (f32, f32) {
        (self.velocity_x, self.velocity_z)
    }

    pub fn step(&mut self, intent: MoveIntent) {
        let d = FRAME_DT_SEC;
        self.velocity_x *= VELOCITY_DAMPING;
        self.velocity_z *= VELOCITY_DAMPING;
        if intent.forward {
            self.velocity_z -= MOVE_ACCEL * d;
        }
        if intent.back {
            self.velocity_z += MOVE_ACCEL * d;
        }
        if intent.left {
            self.velocity_x -= MOVE_ACCEL * d;
        }
        if intent.right {
            self.velocity_x += MOVE_ACCEL * d;
        }

        let (rx, rz) = right_on_ground(self.yaw);
        let (fx, fz) = forward_on_ground(self.yaw);
        let strafe = self.velocity_x * d;
        let advance = -self.velocity_z * d;
        self.position.x += rx * strafe + fx * advance;
        self.position.z += rz * strafe + fz * advance;

        if self.velocity_x.abs() > BOB_SPEED_THRESHOLD || self.velocity_z.abs() > BOB_SPEED_THRESHOLD
        {
            self.bob_phase += d * BOB_RATE;
            self.position.y = EYE_HEIGHT + self.bob_phase.sin() * BOB_AMPLITUDE;
        }
    }

    pub fn view_direction(&self) -> Vec3 {
        view_direction(self.yaw, self.pitch)
    }

    pub fn camera(&self) -> CameraView {
        CameraView {
            position: self.position,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }
}
