use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorRole {
    Correct,
    Wrong,
    Trap,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyPhase {
    Basic,
    MixedAddSub,
    Advanced,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    PreStart,
    Playing,
    Paused,
    Transitioning,
    Dead,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ToneRequest {
    pub frequency: f32,
    pub waveform: Waveform,
    pub duration: f32,
    pub volume: f32,
}

impl ToneRequest {
    pub const fn new(frequency: f32, waveform: Waveform, duration: f32, volume: f32) -> Self {
        Self {
            frequency,
            waveform,
            duration,
            volume,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub tier: u8,
    pub wall: u32,
    pub background: u32,
    pub accent: u32,
    #[serde(rename = "signText")]
    pub sign_text: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DoorSlot {
    pub position: Vec3,
    pub yaw: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveIntent {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HoverProbe {
    #[default]
    ViewRay,
    Reported(Option<usize>),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    pub movement: MoveIntent,
    pub yaw: f32,
    pub pitch: f32,
    pub hover: HoverProbe,
}

#[derive(Clone, Debug, Serialize)]
pub struct DoorView {
    pub index: usize,
    pub role: DoorRole,
    #[serde(rename = "puzzleText")]
    pub puzzle_text: String,
    pub hovered: bool,
    #[serde(rename = "hingeAngle")]
    pub hinge_angle: f32,
    pub slot: DoorSlot,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoomView {
    pub doors: Vec<DoorView>,
    pub palette: Palette,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct CameraView {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct TimelineEvent {
    #[serde(rename = "atMs")]
    pub at_ms: u64,
    pub label: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    StateChanged {
        state: GameState,
    },
    HoverChanged {
        door: Option<usize>,
    },
    Tone {
        tone: ToneRequest,
    },
    Fade {
        opacity: f32,
    },
    RoomSpawned {
        #[serde(rename = "roomsCleared")]
        rooms_cleared: u32,
        #[serde(rename = "doorCount")]
        door_count: usize,
    },
    ScoreChanged {
        text: String,
    },
    TimerChanged {
        text: String,
        #[serde(rename = "lowTime")]
        low_time: bool,
    },
    Died {
        text: String,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    #[serde(rename = "clockMs")]
    pub clock_ms: u64,
    pub state: GameState,
    #[serde(rename = "roomsCleared")]
    pub rooms_cleared: u32,
    pub level: u32,
    #[serde(rename = "timeRemaining")]
    pub time_remaining: i32,
    #[serde(rename = "timerText")]
    pub timer_text: String,
    #[serde(rename = "scoreText")]
    pub score_text: String,
    #[serde(rename = "lowTime")]
    pub low_time: bool,
    #[serde(rename = "fadeOpacity")]
    pub fade_opacity: f32,
    pub room: Option<RoomView>,
    pub camera: CameraView,
    pub events: Vec<RuntimeEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    #[serde(rename = "roomsCleared")]
    pub rooms_cleared: u32,
    pub level: u32,
    #[serde(rename = "peakRoomsCleared")]
    pub peak_rooms_cleared: u32,
    #[serde(rename = "durationMs")]
    pub duration_ms: u64,
    pub text: String,
    pub timeline: Vec<TimelineEvent>,
}
