use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Instant, Timer};
use esp_hal::{
    peripherals::{GPIO14, RMT},
    rmt::{PulseCode, Rmt},
    time::Rate,
};
use esp_hal_smartled::SmartLedsAdapter;
use smart_leds::{SmartLedsWrite, RGB8};

use super::config::{
    FEEDBACK, FLASH_PHASE_MS, LED_COUNT, LOSE_FLASHES, SPIN_FRAME_MS, WIN_FLASHES,
};
use super::types::FeedbackEvent;

// 24 bits per LED plus the stop code.
const SMARTLED_BUFFER: usize = LED_COUNT * 24 + 1;

const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };
const WIN_COLOR: RGB8 = RGB8 { r: 0, g: 180, b: 0 };
const LOSE_COLOR: RGB8 = RGB8 { r: 180, g: 0, b: 0 };
const TICK_COLOR: RGB8 = RGB8 { r: 40, g: 40, b: 40 };

const SPIN_PALETTE: [RGB8; 6] = [
    RGB8 { r: 255, g: 0, b: 0 },
    RGB8 { r: 0, g: 255, b: 0 },
    RGB8 { r: 0, g: 0, b: 255 },
    RGB8 { r: 255, g: 255, b: 0 },
    RGB8 { r: 255, g: 0, b: 255 },
    RGB8 { r: 0, g: 255, b: 255 },
];

/// Renders `FeedbackEvent`s on the three WS2812s. Purely cosmetic; the game
/// task never waits on it.
#[embassy_executor::task]
pub(crate) async fn led_task(rmt: RMT<'static>, pin: GPIO14<'static>) {
    let rmt = Rmt::new(rmt, Rate::from_mhz(80)).expect("failed to init RMT");
    let mut rmt_buffer = [PulseCode::default(); SMARTLED_BUFFER];
    let mut strip = SmartLedsAdapter::new(rmt.channel0, pin, &mut rmt_buffer);
    let mut rng = XorShift32::new(Instant::now().as_ticks() as u32);

    let mut event = FeedbackEvent::Idle;
    loop {
        event = match event {
            FeedbackEvent::Idle => {
                let _ = strip.write([OFF; LED_COUNT].into_iter());
                FEEDBACK.receive().await
            }
            FeedbackEvent::CountTick => {
                let _ = strip.write([TICK_COLOR; LED_COUNT].into_iter());
                Timer::after(Duration::from_millis(60)).await;
                let _ = strip.write([OFF; LED_COUNT].into_iter());
                FEEDBACK.receive().await
            }
            FeedbackEvent::WinFlash => {
                flash(&mut strip, WIN_COLOR, WIN_FLASHES).await;
                FEEDBACK.receive().await
            }
            FeedbackEvent::LoseFlash => {
                flash(&mut strip, LOSE_COLOR, LOSE_FLASHES).await;
                FEEDBACK.receive().await
            }
            // Runs until the next event interrupts it.
            FeedbackEvent::Spin => loop {
                let frame = [
                    palette_pick(&mut rng),
                    palette_pick(&mut rng),
                    palette_pick(&mut rng),
                ];
                let _ = strip.write(frame.into_iter());
                match select(
                    FEEDBACK.receive(),
                    Timer::after(Duration::from_millis(SPIN_FRAME_MS)),
                )
                .await
                {
                    Either::First(next) => break next,
                    Either::Second(()) => {}
                }
            },
        };
    }
}

async fn flash<S>(strip: &mut S, color: RGB8, times: u8)
where
    S: SmartLedsWrite<Color = RGB8>,
{
    for _ in 0..times {
        let _ = strip.write([color; LED_COUNT].into_iter());
        Timer::after(Duration::from_millis(FLASH_PHASE_MS)).await;
        let _ = strip.write([OFF; LED_COUNT].into_iter());
        Timer::after(Duration::from_millis(FLASH_PHASE_MS)).await;
    }
}

/// Small deterministic generator for spin colors; no hardware RNG needed.
struct XorShift32 {
    state: u32,
}

impl XorShift32 {
    fn new(seed: u32) -> Self {
        Self {
            state: seed | 1,
        }
    }

    fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }
}

fn palette_pick(rng: &mut XorShift32) -> RGB8 {
    SPIN_PALETTE[(rng.next() % SPIN_PALETTE.len() as u32) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_never_collapses_to_zero() {
        let mut rng = XorShift32::new(0);
        for _ in 0..1_000 {
            assert_ne!(rng.next(), 0);
        }
    }

    #[test]
    fn picks_stay_inside_the_palette() {
        let mut rng = XorShift32::new(0xDEAD_BEEF);
        for _ in 0..100 {
            let color = palette_pick(&mut rng);
            assert!(SPIN_PALETTE.contains(&color));
        }
    }
}
