use super::config::{COUNT_TICK_MS, TIME_LIMIT_MS, TIME_TICK_MS};
use super::motion::FilterBank;
use super::shake::{exceeds_at_rest, ShakeEngine, ShakeFrame};
use super::types::{DifficultyProfile, SensorSample, ShakeAction};

/// One entry of the built-in level table. Immutable, defined at startup.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LevelSpec {
    pub(crate) index: u8,
    pub(crate) action: ShakeAction,
    pub(crate) duration_ms: u32,
    pub(crate) target_count: u16,
    pub(crate) tolerance: u16,
    pub(crate) threshold_mg: i32,
}

/// The two evaluation designs, behind one run interface. Target-count is the
/// default; accumulated-time backs the cycling variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EvalPolicy {
    TargetCount,
    ActiveTime,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LevelOutcome {
    pub(crate) passed: bool,
    /// Final shake count, or accrued active milliseconds.
    pub(crate) metric: u32,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct LevelProgress {
    pub(crate) metric: u32,
    pub(crate) goal: u32,
    pub(crate) remaining_ms: u32,
    /// A shake event was counted on this tick.
    pub(crate) counted: bool,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum LevelTick {
    Running(LevelProgress),
    Finished(LevelOutcome),
}

/// A single bounded level attempt. Owns its filter bank and shake counter, so
/// constructing a new run is the per-attempt reset; exactly one run is live
/// at any time. The caller drives `tick` at `tick_interval_ms` cadence.
pub(crate) struct LevelRun {
    policy: EvalPolicy,
    spec: LevelSpec,
    deadline_ms: u64,
    filters: FilterBank,
    engine: ShakeEngine,
    min_count: u16,
    max_count: u16,
    accrued_ms: u32,
    need_ms: u32,
}

impl LevelRun {
    pub(crate) fn new(
        spec: LevelSpec,
        profile: DifficultyProfile,
        policy: EvalPolicy,
        start_ms: u64,
    ) -> Self {
        debug_assert!(spec.duration_ms > 0, "level duration must be positive");
        debug_assert!(
            (1..=super::game::LEVEL_COUNT).contains(&spec.index),
            "level index out of range"
        );

        let (deadline_ms, min_count, max_count, need_ms) = match policy {
            EvalPolicy::TargetCount => {
                let duration = spec.duration_ms * profile.duration_pct / 100;
                let tolerance =
                    ((u32::from(spec.tolerance) * profile.tolerance_pct + 50) / 100) as u16;
                (
                    start_ms + u64::from(duration),
                    spec.target_count.saturating_sub(tolerance),
                    spec.target_count + tolerance,
                    0,
                )
            }
            EvalPolicy::ActiveTime => (
                start_ms + u64::from(TIME_LIMIT_MS),
                0,
                0,
                profile.need_time_ms,
            ),
        };

        Self {
            policy,
            spec,
            deadline_ms,
            filters: FilterBank::new(),
            engine: ShakeEngine::new(spec.action, spec.threshold_mg),
            min_count,
            max_count,
            accrued_ms: 0,
            need_ms,
        }
    }

    pub(crate) const fn tick_interval_ms(&self) -> u64 {
        match self.policy {
            EvalPolicy::TargetCount => COUNT_TICK_MS,
            EvalPolicy::ActiveTime => TIME_TICK_MS,
        }
    }

    pub(crate) fn goal(&self) -> u32 {
        match self.policy {
            EvalPolicy::TargetCount => u32::from(self.spec.target_count),
            EvalPolicy::ActiveTime => self.need_ms,
        }
    }

    pub(crate) fn tick(&mut self, now_ms: u64, sample: SensorSample) -> LevelTick {
        match self.policy {
            EvalPolicy::TargetCount => self.tick_target_count(now_ms, sample),
            EvalPolicy::ActiveTime => self.tick_active_time(now_ms, sample),
        }
    }

    fn tick_target_count(&mut self, now_ms: u64, sample: SensorSample) -> LevelTick {
        if now_ms >= self.deadline_ms {
            let count = self.engine.count();
            return LevelTick::Finished(LevelOutcome {
                passed: (self.min_count..=self.max_count).contains(&count),
                metric: u32::from(count),
            });
        }

        self.filters.push(sample);
        let tick = self.engine.tick(ShakeFrame {
            now_ms,
            sample,
            average: self.filters.average(),
        });

        LevelTick::Running(LevelProgress {
            metric: u32::from(tick.count),
            goal: self.goal(),
            remaining_ms: (self.deadline_ms - now_ms) as u32,
            counted: tick.counted,
        })
    }

    fn tick_active_time(&mut self, now_ms: u64, sample: SensorSample) -> LevelTick {
        if now_ms >= self.deadline_ms {
            return LevelTick::Finished(LevelOutcome {
                passed: false,
                metric: self.accrued_ms,
            });
        }

        let active = exceeds_at_rest(sample, self.spec.action, self.spec.threshold_mg);
        if active {
            self.accrued_ms += TIME_TICK_MS as u32;
            if self.accrued_ms >= self.need_ms {
                return LevelTick::Finished(LevelOutcome {
                    passed: true,
                    metric: self.accrued_ms,
                });
            }
        }

        LevelTick::Running(LevelProgress {
            metric: self.accrued_ms,
            goal: self.need_ms,
            remaining_ms: (self.deadline_ms - now_ms) as u32,
            counted: active,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::config::GRAVITY_MG;
    use super::super::types::Difficulty;
    use super::*;

    fn count_spec() -> LevelSpec {
        LevelSpec {
            index: 1,
            action: ShakeAction::LeftRight,
            duration_ms: 5_000,
            target_count: 10,
            tolerance: 3,
            threshold_mg: 300,
        }
    }

    fn time_spec() -> LevelSpec {
        LevelSpec {
            index: 1,
            action: ShakeAction::UpDown,
            duration_ms: TIME_LIMIT_MS,
            target_count: 0,
            tolerance: 0,
            threshold_mg: 300,
        }
    }

    /// Drives a target-count run with `spikes` lone 400 mg X excursions,
    /// `spacing_ms` apart, starting at t=100 so the filter window is primed.
    fn run_with_spikes(spikes: u32, spacing_ms: u64) -> LevelOutcome {
        let mut run = LevelRun::new(
            count_spec(),
            Difficulty::Medium.profile(),
            EvalPolicy::TargetCount,
            0,
        );
        let mut now = 0;
        loop {
            let sample = if now >= 100 && (now - 100) % spacing_ms == 0 && (now - 100) / spacing_ms < u64::from(spikes)
            {
                SensorSample::new(400, 0, GRAVITY_MG)
            } else {
                SensorSample::new(0, 0, GRAVITY_MG)
            };
            match run.tick(now, sample) {
                LevelTick::Running(_) => now += run.tick_interval_ms(),
                LevelTick::Finished(outcome) => return outcome,
            }
        }
    }

    #[test]
    fn count_within_tolerance_passes() {
        let outcome = run_with_spikes(12, 400);
        assert_eq!(outcome.metric, 12);
        assert!(outcome.passed);
    }

    #[test]
    fn count_above_tolerance_fails() {
        let outcome = run_with_spikes(14, 330);
        assert_eq!(outcome.metric, 14);
        assert!(!outcome.passed);
    }

    #[test]
    fn count_below_tolerance_fails() {
        let outcome = run_with_spikes(4, 400);
        assert_eq!(outcome.metric, 4);
        assert!(!outcome.passed);
    }

    #[test]
    fn hard_profile_shortens_the_window() {
        let mut run = LevelRun::new(
            count_spec(),
            Difficulty::Hard.profile(),
            EvalPolicy::TargetCount,
            0,
        );
        // 80% of 5 s; the first tick at the scaled deadline finishes the run.
        assert!(matches!(
            run.tick(4_000, SensorSample::default()),
            LevelTick::Finished(_)
        ));
    }

    /// Feeds `active_ticks` ticks of up-down motion interleaved with rest,
    /// 100 ms cadence, and reports the outcome.
    fn run_with_active_ticks(active_ticks: u32) -> LevelOutcome {
        let mut run = LevelRun::new(
            time_spec(),
            Difficulty::Medium.profile(),
            EvalPolicy::ActiveTime,
            0,
        );
        let moving = SensorSample::new(0, 0, GRAVITY_MG + 400);
        let resting = SensorSample::new(0, 0, GRAVITY_MG);
        let mut fed = 0;
        let mut now = 0;
        loop {
            // Alternate bursts of motion with rest to spread the accrual.
            let sample = if fed < active_ticks && (now / 100) % 2 == 0 {
                fed += 1;
                moving
            } else {
                resting
            };
            match run.tick(now, sample) {
                LevelTick::Running(_) => now += run.tick_interval_ms(),
                LevelTick::Finished(outcome) => return outcome,
            }
        }
    }

    #[test]
    fn accrued_time_reaching_need_passes_early() {
        // Medium needs 2.0 s: exactly 20 active ticks of 100 ms.
        let outcome = run_with_active_ticks(20);
        assert!(outcome.passed);
        assert_eq!(outcome.metric, 2_000);
    }

    #[test]
    fn accrued_time_just_short_fails_at_limit() {
        let outcome = run_with_active_ticks(19);
        assert!(!outcome.passed);
        assert_eq!(outcome.metric, 1_900);
    }

    #[test]
    fn progress_reports_goal_and_remaining_time() {
        let mut run = LevelRun::new(
            count_spec(),
            Difficulty::Medium.profile(),
            EvalPolicy::TargetCount,
            0,
        );
        let LevelTick::Running(progress) = run.tick(1_000, SensorSample::new(0, 0, GRAVITY_MG))
        else {
            panic!("run finished early");
        };
        assert_eq!(progress.goal, 10);
        assert_eq!(progress.remaining_ms, 4_000);
    }
}
