use super::config::REEL_STEP_MS;

/// Fixed cyclic reel wheel; every reel advances through the same sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Cherry,
    Bell,
    Seven,
    Star,
    Diamond,
    Clover,
}

impl Symbol {
    pub(crate) const fn next(self) -> Self {
        match self {
            Self::Cherry => Self::Bell,
            Self::Bell => Self::Seven,
            Self::Seven => Self::Star,
            Self::Star => Self::Diamond,
            Self::Diamond => Self::Clover,
            Self::Clover => Self::Cherry,
        }
    }

    pub(crate) const fn glyph(self) -> char {
        match self {
            Self::Cherry => 'C',
            Self::Bell => 'B',
            Self::Seven => '7',
            Self::Star => '*',
            Self::Diamond => 'D',
            Self::Clover => 'O',
        }
    }
}

const FIRST_SYMBOL: Symbol = Symbol::Cherry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReelState {
    /// Not yet this reel's turn; inert until it becomes active.
    Idle,
    Spinning(Symbol),
    Stopped(Symbol),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotResult {
    Jackpot,
    PartialMatch,
    NoMatch,
}

impl SlotResult {
    /// Only a jackpot counts as a bonus win for score and skip-ahead.
    pub const fn is_win(self) -> bool {
        matches!(self, Self::Jackpot)
    }
}

/// Three reels stopped one at a time by a single button. Exactly one reel
/// animates at any moment; a press freezes it at the displayed symbol and
/// hands the wheel to the next reel. Judged once all three stand still.
pub struct SlotMachine {
    reels: [ReelState; 3],
    active: usize,
    last_step_ms: u64,
}

impl SlotMachine {
    pub fn new(start_ms: u64) -> Self {
        Self {
            reels: [
                ReelState::Spinning(FIRST_SYMBOL),
                ReelState::Idle,
                ReelState::Idle,
            ],
            active: 0,
            last_step_ms: start_ms,
        }
    }

    pub fn reels(&self) -> [ReelState; 3] {
        self.reels
    }

    /// Advances the active reel one symbol per `REEL_STEP_MS`.
    pub fn tick(&mut self, now_ms: u64) {
        let Some(ReelState::Spinning(symbol)) = self.reels.get(self.active).copied() else {
            return;
        };
        if now_ms.saturating_sub(self.last_step_ms) >= REEL_STEP_MS {
            self.reels[self.active] = ReelState::Spinning(symbol.next());
            self.last_step_ms = now_ms;
        }
    }

    /// Button press: freeze the active reel, arm the next one.
    pub fn press(&mut self, now_ms: u64) {
        let Some(ReelState::Spinning(symbol)) = self.reels.get(self.active).copied() else {
            return;
        };
        self.reels[self.active] = ReelState::Stopped(symbol);
        self.active += 1;
        if self.active < self.reels.len() {
            self.reels[self.active] = ReelState::Spinning(symbol.next());
            self.last_step_ms = now_ms;
        }
    }

    /// `None` until all three reels are stopped.
    pub fn result(&self) -> Option<SlotResult> {
        let [ReelState::Stopped(a), ReelState::Stopped(b), ReelState::Stopped(c)] = self.reels
        else {
            return None;
        };
        Some(judge(a, b, c))
    }
}

fn judge(a: Symbol, b: Symbol, c: Symbol) -> SlotResult {
    if a == b && b == c {
        SlotResult::Jackpot
    } else if a == b || b == c || a == c {
        SlotResult::PartialMatch
    } else {
        SlotResult::NoMatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs the active reel forward `steps` symbols.
    fn spin(machine: &mut SlotMachine, now_ms: &mut u64, steps: u32) {
        for _ in 0..steps {
            *now_ms += REEL_STEP_MS;
            machine.tick(*now_ms);
        }
    }

    #[test]
    fn three_equal_symbols_is_a_jackpot() {
        let mut machine = SlotMachine::new(0);
        let mut now = 0;
        machine.press(now); // Cherry
        spin(&mut machine, &mut now, 5); // Bell .. back around to Cherry
        machine.press(now);
        spin(&mut machine, &mut now, 5);
        machine.press(now);
        assert_eq!(machine.result(), Some(SlotResult::Jackpot));
    }

    #[test]
    fn two_equal_symbols_is_a_partial_match() {
        let mut machine = SlotMachine::new(0);
        let mut now = 0;
        machine.press(now); // Cherry
        spin(&mut machine, &mut now, 5); // Cherry again
        machine.press(now);
        machine.press(now); // next reel starts one past Cherry: Bell
        assert_eq!(machine.result(), Some(SlotResult::PartialMatch));
    }

    #[test]
    fn three_distinct_symbols_is_no_match() {
        let mut machine = SlotMachine::new(0);
        machine.press(0); // Cherry
        machine.press(0); // Bell
        machine.press(0); // Seven
        assert_eq!(machine.result(), Some(SlotResult::NoMatch));
        assert!(!SlotResult::NoMatch.is_win());
    }

    #[test]
    fn no_result_while_a_reel_still_spins() {
        let mut machine = SlotMachine::new(0);
        machine.press(0);
        machine.press(0);
        assert_eq!(machine.result(), None);
        assert!(matches!(machine.reels()[2], ReelState::Spinning(_)));
    }

    #[test]
    fn reel_advances_only_after_a_full_step() {
        let mut machine = SlotMachine::new(0);
        machine.tick(REEL_STEP_MS - 1);
        assert_eq!(machine.reels()[0], ReelState::Spinning(Symbol::Cherry));
        machine.tick(REEL_STEP_MS);
        assert_eq!(machine.reels()[0], ReelState::Spinning(Symbol::Bell));
    }

    #[test]
    fn later_reels_stay_inert_until_armed() {
        let mut machine = SlotMachine::new(0);
        let mut now = 0;
        spin(&mut machine, &mut now, 3);
        assert_eq!(machine.reels()[1], ReelState::Idle);
        assert_eq!(machine.reels()[2], ReelState::Idle);
    }

    #[test]
    fn presses_after_the_last_reel_are_ignored() {
        let mut machine = SlotMachine::new(0);
        machine.press(0);
        machine.press(0);
        machine.press(0);
        let settled = machine.reels();
        machine.press(0);
        machine.tick(1_000);
        assert_eq!(machine.reels(), settled);
    }
}
