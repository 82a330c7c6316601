use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::config::{GRAVITY_MG, SHAKE_COOLDOWN_MS};
use super::types::{SensorSample, ShakeAction};

/// One classifier input: the instantaneous sample and the rolling average it
/// is judged against, stamped with the poll time.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ShakeFrame {
    pub(crate) now_ms: u64,
    pub(crate) sample: SensorSample,
    pub(crate) average: SensorSample,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum RejectReason {
    #[default]
    None,
    CooldownActive,
}

/// Per-tick classifier verdict. `counted` is set on the one tick where a
/// still→moving transition was accepted as a discrete shake event.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ShakeTick {
    pub(crate) moving: bool,
    pub(crate) counted: bool,
    pub(crate) count: u16,
    pub(crate) reject: RejectReason,
}

/// Whether the sample deviates from the rolling average beyond `threshold_mg`
/// on the axes relevant to `action`.
pub(crate) fn deviation_exceeds(
    sample: SensorSample,
    average: SensorSample,
    action: ShakeAction,
    threshold_mg: i32,
) -> bool {
    let dx = (sample.x - average.x).abs();
    let dy = (sample.y - average.y).abs();
    let dz = (sample.z - average.z).abs();
    match action {
        ShakeAction::LeftRight => dx > threshold_mg,
        ShakeAction::FwdBack => dy > threshold_mg,
        ShakeAction::UpDown => dz > threshold_mg,
        ShakeAction::Any | ShakeAction::Fast => {
            dx > threshold_mg || dy > threshold_mg || dz > threshold_mg
        }
        ShakeAction::Random => dx > threshold_mg || dy > threshold_mg,
    }
}

/// Resting-pose variant used by the accumulated-time policy: axes are judged
/// as absolute magnitudes, Z relative to gravity.
pub(crate) fn exceeds_at_rest(
    sample: SensorSample,
    action: ShakeAction,
    threshold_mg: i32,
) -> bool {
    let rest = SensorSample::new(0, 0, GRAVITY_MG);
    deviation_exceeds(sample, rest, action, threshold_mg)
}

/// Edge-triggered shake counter. A shake event is recorded only on the
/// still→moving transition, and only when the cooldown since the previous
/// counted event has elapsed, so one physical shake oscillating around the
/// threshold is not counted twice. State lives for one level attempt.
pub(crate) struct ShakeEngine {
    machine: statig::blocking::StateMachine<ShakeHsm>,
}

impl ShakeEngine {
    pub(crate) fn new(action: ShakeAction, threshold_mg: i32) -> Self {
        Self {
            machine: ShakeHsm::new(action, threshold_mg).state_machine(),
        }
    }

    pub(crate) fn tick(&mut self, frame: ShakeFrame) -> ShakeTick {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&frame, &mut context);
        context.tick
    }

    pub(crate) fn count(&self) -> u16 {
        self.machine.inner().count
    }
}

#[derive(Default)]
struct DispatchContext {
    tick: ShakeTick,
}

struct ShakeHsm {
    action: ShakeAction,
    threshold_mg: i32,
    count: u16,
    last_counted_ms: Option<u64>,
}

impl ShakeHsm {
    fn new(action: ShakeAction, threshold_mg: i32) -> Self {
        Self {
            action,
            threshold_mg,
            count: 0,
            last_counted_ms: None,
        }
    }

    fn is_moving(&self, frame: &ShakeFrame) -> bool {
        deviation_exceeds(frame.sample, frame.average, self.action, self.threshold_mg)
    }

    fn in_cooldown(&self, now_ms: u64) -> bool {
        self.last_counted_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < SHAKE_COOLDOWN_MS)
    }

    fn report(&self, context: &mut DispatchContext, moving: bool, counted: bool) {
        context.tick = ShakeTick {
            moving,
            counted,
            count: self.count,
            reject: context.tick.reject,
        };
    }
}

#[state_machine(initial = "State::still()")]
impl ShakeHsm {
    #[state]
    fn still(&mut self, context: &mut DispatchContext, event: &ShakeFrame) -> Outcome<State> {
        if !self.is_moving(event) {
            self.report(context, false, false);
            return Handled;
        }

        if self.in_cooldown(event.now_ms) {
            context.tick.reject = RejectReason::CooldownActive;
            self.report(context, true, false);
            return Transition(State::moving());
        }

        self.count = self.count.saturating_add(1);
        self.last_counted_ms = Some(event.now_ms);
        self.report(context, true, true);
        Transition(State::moving())
    }

    #[state]
    fn moving(&mut self, context: &mut DispatchContext, event: &ShakeFrame) -> Outcome<State> {
        if self.is_moving(event) {
            self.report(context, true, false);
            return Handled;
        }
        self.report(context, false, false);
        Transition(State::still())
    }
}
