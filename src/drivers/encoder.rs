use esp_hal::gpio::Input;

// Quarter-step transition table indexed by (previous_state << 2) | state.
const STEP_TABLE: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];
const QUARTER_STEPS_PER_DETENT: i32 = 4;

/// Polled quadrature decoder for the selection knob. `delta` returns the
/// signed number of whole detents turned since the previous poll; the caller
/// polls at menu-tick cadence.
pub(crate) struct RotaryEncoder {
    pin_a: Input<'static>,
    pin_b: Input<'static>,
    prev_state: u8,
    quarter_steps: i32,
}

impl RotaryEncoder {
    pub(crate) fn new(pin_a: Input<'static>, pin_b: Input<'static>) -> Self {
        let mut encoder = Self {
            pin_a,
            pin_b,
            prev_state: 0,
            quarter_steps: 0,
        };
        encoder.prev_state = encoder.state();
        encoder
    }

    fn state(&self) -> u8 {
        (u8::from(self.pin_a.is_high()) << 1) | u8::from(self.pin_b.is_high())
    }

    pub(crate) fn delta(&mut self) -> i32 {
        let state = self.state();
        let index = usize::from((self.prev_state << 2) | state);
        self.quarter_steps += i32::from(STEP_TABLE[index]);
        self.prev_state = state;

        let detents = self.quarter_steps / QUARTER_STEPS_PER_DETENT;
        self.quarter_steps -= detents * QUARTER_STEPS_PER_DETENT;
        detents
    }
}
