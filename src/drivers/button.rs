use embassy_time::Instant;
use esp_hal::gpio::Input;

use crate::app::config::BUTTON_DEBOUNCE_MS;

/// Active-low push button. `fell` reports the debounced press edge exactly
/// once per physical press; releases are debounced but never reported.
pub(crate) struct PushButton {
    pin: Input<'static>,
    stable_pressed: bool,
    candidate: bool,
    candidate_since: Instant,
}

impl PushButton {
    pub(crate) fn new(pin: Input<'static>) -> Self {
        let pressed = pin.is_low();
        Self {
            pin,
            stable_pressed: pressed,
            candidate: pressed,
            candidate_since: Instant::now(),
        }
    }

    pub(crate) fn fell(&mut self) -> bool {
        let pressed = self.pin.is_low();
        let now = Instant::now();

        if pressed != self.candidate {
            self.candidate = pressed;
            self.candidate_since = now;
            return false;
        }

        if pressed != self.stable_pressed
            && now
                .saturating_duration_since(self.candidate_since)
                .as_millis()
                >= BUTTON_DEBOUNCE_MS
        {
            self.stable_pressed = pressed;
            return pressed;
        }
        false
    }
}
