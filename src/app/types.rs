use esp_hal::{i2c::master::I2c, Blocking};
use ssd1306::{mode::BufferedGraphicsMode, prelude::*, Ssd1306};

use crate::drivers::{adxl345::Adxl345, button::PushButton, encoder::RotaryEncoder};

pub(crate) type Oled = Ssd1306<
    I2CInterface<I2c<'static, Blocking>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// Everything the game task owns. There is exactly one of these; all level
/// and mini-game evaluation happens through it, one run at a time.
pub(crate) struct GameContext {
    pub(crate) accel: Adxl345,
    pub(crate) oled: Oled,
    pub(crate) encoder: RotaryEncoder,
    pub(crate) button: PushButton,
}

/// Instantaneous acceleration in milli-g.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SensorSample {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) z: i32,
}

impl SensorSample {
    pub(crate) const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ShakeAction {
    LeftRight,
    FwdBack,
    UpDown,
    Any,
    Random,
    Fast,
}

impl ShakeAction {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::LeftRight => "Left-Right",
            Self::FwdBack => "Forward-Back",
            Self::UpDown => "Up-Down",
            Self::Any => "Any way",
            Self::Random => "Wild card",
            Self::Fast => "Fast!",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub(crate) const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    pub(crate) const fn profile(self) -> DifficultyProfile {
        match self {
            Self::Easy => DifficultyProfile {
                duration_pct: 120,
                tolerance_pct: 150,
                need_time_ms: 1_000,
            },
            Self::Medium => DifficultyProfile {
                duration_pct: 100,
                tolerance_pct: 100,
                need_time_ms: 2_000,
            },
            Self::Hard => DifficultyProfile {
                duration_pct: 80,
                tolerance_pct: 50,
                need_time_ms: 3_000,
            },
        }
    }
}

/// Per-session scaling, fixed once the menu confirms a selection. The
/// percentage pair drives the target-count policy, `need_time_ms` drives the
/// accumulated-time policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DifficultyProfile {
    pub(crate) duration_pct: u32,
    pub(crate) tolerance_pct: u32,
    pub(crate) need_time_ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum OutcomeKind {
    LevelClear,
    Jackpot,
    PartialMatch,
    NoMatch,
    GameWon { score: u32 },
    GameOver { level: u8 },
    SensorFault,
}

/// Cosmetic feedback for the LED strip; the game task emits these, the LED
/// task renders them. `Spin` keeps animating until the next event arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FeedbackEvent {
    CountTick,
    WinFlash,
    LoseFlash,
    Spin,
    Idle,
}
