use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use u8g2_fonts::{fonts, FontRenderer};

use super::types::FeedbackEvent;

pub(crate) const SCREEN_WIDTH: i32 = 128;
pub(crate) const TEXT_TOP_Y: i32 = 6;
pub(crate) const TEXT_LINE_STEP: i32 = 14;
pub(crate) const TITLE_FONT: FontRenderer = FontRenderer::new::<fonts::u8g2_font_helvB10_tf>();
pub(crate) const BODY_FONT: FontRenderer = FontRenderer::new::<fonts::u8g2_font_6x13_tf>();

/// Moving-average window per axis; FIFO, oldest evicted first.
pub(crate) const FILTER_WINDOW: usize = 5;
/// Minimum spacing between two counted shake events.
pub(crate) const SHAKE_COOLDOWN_MS: u64 = 300;
/// Gravity along Z when the device rests flat, in milli-g.
pub(crate) const GRAVITY_MG: i32 = 1_000;

/// Poll cadence of the target-count evaluator.
pub(crate) const COUNT_TICK_MS: u64 = 10;
/// Poll cadence of the accumulated-time evaluator; each active tick accrues
/// this much toward the required time.
pub(crate) const TIME_TICK_MS: u64 = 100;
/// Overall limit of one accumulated-time attempt.
pub(crate) const TIME_LIMIT_MS: u32 = 5_000;

pub(crate) const MENU_TICK_MS: u64 = 20;
pub(crate) const START_SPLASH_MS: u64 = 1_000;
pub(crate) const OUTCOME_HOLD_MS: u64 = 1_500;

/// Active slot reel advances one symbol per step.
pub(crate) const REEL_STEP_MS: u64 = 80;

pub(crate) const LED_COUNT: usize = 3;
pub(crate) const SPIN_FRAME_MS: u64 = 50;
pub(crate) const FLASH_PHASE_MS: u64 = 150;
pub(crate) const WIN_FLASHES: u8 = 6;
pub(crate) const LOSE_FLASHES: u8 = 4;

pub(crate) const BUTTON_DEBOUNCE_MS: u64 = 20;

pub(crate) static FEEDBACK: Channel<CriticalSectionRawMutex, FeedbackEvent, 8> = Channel::new();
