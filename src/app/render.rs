use core::fmt::Write;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use u8g2_fonts::types::{FontColor, HorizontalAlignment, VerticalPosition};

use super::config::{BODY_FONT, SCREEN_WIDTH, TEXT_LINE_STEP, TEXT_TOP_Y, TITLE_FONT};
use super::game::LEVEL_COUNT;
use super::level::{EvalPolicy, LevelProgress};
use super::slot::ReelState;
use super::types::{Difficulty, Oled, OutcomeKind, ShakeAction};

/// Centered text lines, first one in the title face; the layout the whole
/// game uses. Draw errors are cosmetic and swallowed.
fn draw_lines<D>(target: &mut D, lines: &[&str])
where
    D: DrawTarget<Color = BinaryColor>,
{
    let center_x = SCREEN_WIDTH / 2;
    let mut y = TEXT_TOP_Y;
    for (row, text) in lines.iter().enumerate() {
        let font = if row == 0 { &TITLE_FONT } else { &BODY_FONT };
        let _ = font.render_aligned(
            *text,
            Point::new(center_x, y),
            VerticalPosition::Top,
            HorizontalAlignment::Center,
            FontColor::Transparent(BinaryColor::On),
            target,
        );
        y += TEXT_LINE_STEP;
    }
}

fn show(oled: &mut Oled, lines: &[&str]) {
    oled.clear_buffer();
    draw_lines(oled, lines);
    let _ = oled.flush();
}

pub(crate) fn screen_title(oled: &mut Oled) {
    show(oled, &["MOTION SLOT", "", "Shake to survive", "Press knob"]);
}

pub(crate) fn screen_menu(oled: &mut Oled, selected: Difficulty) {
    let line = format_menu_line(selected);
    show(
        oled,
        &["MOTION SLOT", "Choose difficulty:", line.as_str(), "Press knob to start"],
    );
}

pub(crate) fn screen_start(oled: &mut Oled, selected: Difficulty) {
    let line = format_mode_line(selected);
    show(oled, &["START!", line.as_str(), "Get ready to shake"]);
}

pub(crate) fn screen_level(
    oled: &mut Oled,
    level: u8,
    action: ShakeAction,
    policy: EvalPolicy,
    progress: LevelProgress,
) {
    let title = format_level_title(level);
    let movement = format_move_line(action);
    let metric = match policy {
        EvalPolicy::TargetCount => format_count_line(progress.metric, progress.goal),
        EvalPolicy::ActiveTime => format_active_time_line(progress.metric, progress.goal),
    };
    let remaining = format_remaining_line(progress.remaining_ms);
    show(
        oled,
        &[
            title.as_str(),
            movement.as_str(),
            metric.as_str(),
            remaining.as_str(),
        ],
    );
}

pub(crate) fn screen_spin(oled: &mut Oled, reels: [ReelState; 3]) {
    let row = format_reel_row(reels);
    show(oled, &["BONUS SPIN", row.as_str(), "Press to stop"]);
}

pub(crate) fn screen_outcome(oled: &mut Oled, outcome: OutcomeKind) {
    match outcome {
        OutcomeKind::LevelClear => show(oled, &["LEVEL CLEAR", "", "Keep going!"]),
        OutcomeKind::Jackpot => show(oled, &["JACKPOT!", "Three of a kind", "Skipping ahead"]),
        OutcomeKind::PartialMatch => show(oled, &["TWO OF A KIND", "So close!"]),
        OutcomeKind::NoMatch => show(oled, &["NO MATCH", "No bonus this time"]),
        OutcomeKind::GameWon { score } => {
            let line = format_score_line(score);
            show(
                oled,
                &["YOU WIN!", "All 10 levels!", line.as_str(), "Press to restart"],
            );
        }
        OutcomeKind::GameOver { level } => {
            let line = format_failed_line(level);
            show(oled, &["GAME OVER", line.as_str(), "Press to restart"]);
        }
        OutcomeKind::SensorFault => {
            show(oled, &["SENSOR FAULT", "Check the wiring", "Press to restart"]);
        }
    }
}

pub(crate) fn format_menu_line(selected: Difficulty) -> heapless::String<16> {
    let mut out = heapless::String::new();
    let _ = write!(&mut out, "> {}", selected.label());
    out
}

pub(crate) fn format_mode_line(selected: Difficulty) -> heapless::String<16> {
    let mut out = heapless::String::new();
    let _ = write!(&mut out, "Mode: {}", selected.label());
    out
}

pub(crate) fn format_level_title(level: u8) -> heapless::String<16> {
    let mut out = heapless::String::new();
    let _ = write!(&mut out, "Level {level}/{LEVEL_COUNT}");
    out
}

pub(crate) fn format_move_line(action: ShakeAction) -> heapless::String<24> {
    let mut out = heapless::String::new();
    let _ = write!(&mut out, "Move: {}", action.label());
    out
}

pub(crate) fn format_count_line(count: u32, target: u32) -> heapless::String<20> {
    let mut out = heapless::String::new();
    let _ = write!(&mut out, "Shakes: {count}/{target}");
    out
}

pub(crate) fn format_active_time_line(accrued_ms: u32, need_ms: u32) -> heapless::String<24> {
    let mut out = heapless::String::new();
    let _ = write!(
        &mut out,
        "Held: {}.{}/{}.{}s",
        accrued_ms / 1_000,
        (accrued_ms % 1_000) / 100,
        need_ms / 1_000,
        (need_ms % 1_000) / 100,
    );
    out
}

pub(crate) fn format_remaining_line(remaining_ms: u32) -> heapless::String<20> {
    let mut out = heapless::String::new();
    let _ = write!(
        &mut out,
        "Time left: {}.{}s",
        remaining_ms / 1_000,
        (remaining_ms % 1_000) / 100,
    );
    out
}

pub(crate) fn format_score_line(score: u32) -> heapless::String<16> {
    let mut out = heapless::String::new();
    let _ = write!(&mut out, "Score: {score}");
    out
}

pub(crate) fn format_failed_line(level: u8) -> heapless::String<24> {
    let mut out = heapless::String::new();
    let _ = write!(&mut out, "Failed at Level {level}");
    out
}

fn format_reel_row(reels: [ReelState; 3]) -> heapless::String<16> {
    let mut out = heapless::String::new();
    for (slot, reel) in reels.into_iter().enumerate() {
        let glyph = match reel {
            ReelState::Idle => '-',
            ReelState::Spinning(symbol) | ReelState::Stopped(symbol) => symbol.glyph(),
        };
        let _ = if slot == 0 {
            write!(&mut out, "[{glyph}]")
        } else {
            write!(&mut out, " [{glyph}]")
        };
    }
    out
}
