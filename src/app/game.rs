use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::config::TIME_LIMIT_MS;
use super::level::{EvalPolicy, LevelSpec};
use super::types::{Difficulty, ShakeAction};

pub(crate) const LEVEL_COUNT: u8 = 10;
const LEVEL_SCORE: u32 = 100;
const BONUS_WIN_SCORE: u32 = 200;
/// The terminal checkpoint demands this many bonus wins across the session.
const FINAL_BONUS_WINS_REQUIRED: u8 = 2;

const fn timed(index: u8, action: ShakeAction) -> LevelSpec {
    LevelSpec {
        index,
        action,
        duration_ms: TIME_LIMIT_MS,
        target_count: 0,
        tolerance: 0,
        threshold_mg: 300,
    }
}

const fn counted(
    index: u8,
    action: ShakeAction,
    duration_ms: u32,
    target_count: u16,
    tolerance: u16,
    threshold_mg: i32,
) -> LevelSpec {
    LevelSpec {
        index,
        action,
        duration_ms,
        target_count,
        tolerance,
        threshold_mg,
    }
}

static CHECKPOINT_LEVELS: [LevelSpec; LEVEL_COUNT as usize] = [
    counted(1, ShakeAction::LeftRight, 5_000, 6, 3, 300),
    counted(2, ShakeAction::FwdBack, 5_000, 8, 3, 300),
    counted(3, ShakeAction::UpDown, 5_000, 10, 3, 300),
    counted(4, ShakeAction::Any, 5_000, 12, 3, 300),
    counted(5, ShakeAction::Random, 5_000, 10, 2, 350),
    counted(6, ShakeAction::LeftRight, 4_500, 12, 2, 350),
    counted(7, ShakeAction::FwdBack, 4_500, 14, 2, 350),
    counted(8, ShakeAction::UpDown, 4_000, 14, 2, 400),
    counted(9, ShakeAction::Fast, 4_000, 16, 2, 450),
    counted(10, ShakeAction::Fast, 3_500, 16, 1, 500),
];

// Cycling variant: Left-Right, Forward-Back, Up-Down, repeated.
static CYCLING_LEVELS: [LevelSpec; LEVEL_COUNT as usize] = [
    timed(1, ShakeAction::LeftRight),
    timed(2, ShakeAction::FwdBack),
    timed(3, ShakeAction::UpDown),
    timed(4, ShakeAction::LeftRight),
    timed(5, ShakeAction::FwdBack),
    timed(6, ShakeAction::UpDown),
    timed(7, ShakeAction::LeftRight),
    timed(8, ShakeAction::FwdBack),
    timed(9, ShakeAction::UpDown),
    timed(10, ShakeAction::LeftRight),
];

/// A whole game variant: its level table, evaluator policy, and which levels
/// detour into the slot machine on success.
#[derive(Clone, Copy, Debug)]
pub(crate) struct GameConfig {
    pub(crate) levels: &'static [LevelSpec; LEVEL_COUNT as usize],
    pub(crate) policy: EvalPolicy,
    pub(crate) checkpoints: &'static [u8],
}

impl GameConfig {
    /// Default design: target-count levels with bonus checkpoints.
    pub(crate) const fn checkpoint() -> Self {
        Self {
            levels: &CHECKPOINT_LEVELS,
            policy: EvalPolicy::TargetCount,
            checkpoints: &[3, 6, LEVEL_COUNT],
        }
    }

    /// Alternate design: accumulated-time levels over a fixed move cycle,
    /// no bonuses.
    pub(crate) const fn cycling() -> Self {
        Self {
            levels: &CYCLING_LEVELS,
            policy: EvalPolicy::ActiveTime,
            checkpoints: &[],
        }
    }

    pub(crate) fn spec(&self, level: u8) -> LevelSpec {
        debug_assert!((1..=LEVEL_COUNT).contains(&level), "level out of range");
        self.levels[usize::from(level) - 1]
    }

    fn is_checkpoint(&self, level: u8) -> bool {
        self.checkpoints.contains(&level)
    }

    /// A bonus win at checkpoint `level` jumps straight to the next
    /// checkpoint level, bypassing everything in between.
    fn skip_target(&self, level: u8) -> u8 {
        self.checkpoints
            .iter()
            .copied()
            .find(|&c| c > level)
            .unwrap_or(level + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GamePhase {
    Playing,
    Bonus,
    Won,
    Lost,
}

/// Session state owned by the game machine; reset by building a fresh engine
/// on restart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct GameSession {
    pub(crate) phase: GamePhase,
    pub(crate) level: u8,
    pub(crate) score: u32,
    pub(crate) bonus_wins: u8,
    pub(crate) difficulty: Difficulty,
}

impl GameSession {
    fn new(difficulty: Difficulty) -> Self {
        Self {
            phase: GamePhase::Playing,
            level: 1,
            score: 0,
            bonus_wins: 0,
            difficulty,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum GameCommand {
    LevelFinished { passed: bool },
    BonusFinished { jackpot: bool },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum GameApplyStatus {
    #[default]
    Applied,
    InvalidTransition,
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct GameStep {
    pub(crate) before: GameSession,
    pub(crate) after: GameSession,
    pub(crate) status: GameApplyStatus,
}

pub(crate) struct GameEngine {
    machine: statig::blocking::StateMachine<GameMachine>,
}

impl GameEngine {
    pub(crate) fn new(config: GameConfig, difficulty: Difficulty) -> Self {
        Self {
            machine: GameMachine {
                config,
                session: GameSession::new(difficulty),
            }
            .state_machine(),
        }
    }

    pub(crate) fn session(&self) -> GameSession {
        self.machine.inner().session
    }

    pub(crate) fn config(&self) -> GameConfig {
        self.machine.inner().config
    }

    /// Spec of the level the session is currently standing on.
    pub(crate) fn current_spec(&self) -> LevelSpec {
        let inner = self.machine.inner();
        inner.config.spec(inner.session.level)
    }

    pub(crate) fn apply(&mut self, command: GameCommand) -> GameStep {
        let before = self.session();
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(&command, &mut context);
        GameStep {
            before,
            after: self.session(),
            status: context.status,
        }
    }
}

#[derive(Default)]
struct DispatchContext {
    status: GameApplyStatus,
}

struct GameMachine {
    config: GameConfig,
    session: GameSession,
}

#[state_machine(initial = "State::playing()")]
impl GameMachine {
    #[state]
    fn playing(&mut self, context: &mut DispatchContext, event: &GameCommand) -> Outcome<State> {
        match event {
            GameCommand::LevelFinished { passed: false } => {
                self.session.phase = GamePhase::Lost;
                Transition(State::lost())
            }
            GameCommand::LevelFinished { passed: true } => {
                self.session.score += LEVEL_SCORE;
                if self.config.is_checkpoint(self.session.level) {
                    self.session.phase = GamePhase::Bonus;
                    return Transition(State::bonus());
                }
                if self.session.level == LEVEL_COUNT {
                    self.session.phase = GamePhase::Won;
                    return Transition(State::won());
                }
                self.session.level += 1;
                Handled
            }
            GameCommand::BonusFinished { .. } => {
                context.status = GameApplyStatus::InvalidTransition;
                Handled
            }
        }
    }

    #[state]
    fn bonus(&mut self, context: &mut DispatchContext, event: &GameCommand) -> Outcome<State> {
        match event {
            GameCommand::BonusFinished { jackpot } => {
                if *jackpot {
                    self.session.bonus_wins += 1;
                    self.session.score += BONUS_WIN_SCORE;
                }

                if self.session.level == LEVEL_COUNT {
                    // Terminal checkpoint: the aggregate gate decides.
                    return if self.session.bonus_wins >= FINAL_BONUS_WINS_REQUIRED {
                        self.session.phase = GamePhase::Won;
                        Transition(State::won())
                    } else {
                        self.session.phase = GamePhase::Lost;
                        Transition(State::lost())
                    };
                }

                self.session.level = if *jackpot {
                    self.config.skip_target(self.session.level)
                } else {
                    self.session.level + 1
                };
                self.session.phase = GamePhase::Playing;
                Transition(State::playing())
            }
            GameCommand::LevelFinished { .. } => {
                context.status = GameApplyStatus::InvalidTransition;
                Handled
            }
        }
    }

    #[state]
    fn won(&mut self, context: &mut DispatchContext, _event: &GameCommand) -> Outcome<State> {
        context.status = GameApplyStatus::InvalidTransition;
        Handled
    }

    #[state]
    fn lost(&mut self, context: &mut DispatchContext, _event: &GameCommand) -> Outcome<State> {
        context.status = GameApplyStatus::InvalidTransition;
        Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass(engine: &mut GameEngine) -> GameStep {
        engine.apply(GameCommand::LevelFinished { passed: true })
    }

    #[test]
    fn sequential_passes_reach_level_ten_and_win() {
        let mut engine = GameEngine::new(GameConfig::cycling(), Difficulty::Easy);
        for expected in 2..=LEVEL_COUNT {
            let step = pass(&mut engine);
            assert_eq!(step.after.level, expected);
            assert_eq!(step.after.phase, GamePhase::Playing);
        }
        let last = pass(&mut engine);
        assert_eq!(last.after.phase, GamePhase::Won);
        assert_eq!(last.after.score, u32::from(LEVEL_COUNT) * LEVEL_SCORE);
    }

    #[test]
    fn failing_any_level_is_terminal() {
        let mut engine = GameEngine::new(GameConfig::cycling(), Difficulty::Easy);
        let _ = pass(&mut engine);
        let _ = pass(&mut engine);
        let step = engine.apply(GameCommand::LevelFinished { passed: false });
        assert_eq!(step.after.phase, GamePhase::Lost);

        // Terminal: further results are rejected, nothing moves.
        let stuck = pass(&mut engine);
        assert_eq!(stuck.status, GameApplyStatus::InvalidTransition);
        assert_eq!(stuck.after, step.after);
    }

    #[test]
    fn checkpoint_pass_detours_into_bonus() {
        let mut engine = GameEngine::new(GameConfig::checkpoint(), Difficulty::Medium);
        let _ = pass(&mut engine);
        let _ = pass(&mut engine);
        let step = pass(&mut engine);
        assert_eq!(step.before.phase, GamePhase::Playing);
        assert_eq!(step.before.level, 3);
        assert_eq!(step.after.phase, GamePhase::Bonus);
        assert_eq!(step.after.level, 3);
    }

    #[test]
    fn bonus_jackpot_skips_ahead_and_scores() {
        let mut engine = GameEngine::new(GameConfig::checkpoint(), Difficulty::Medium);
        for _ in 0..3 {
            let _ = pass(&mut engine);
        }
        let step = engine.apply(GameCommand::BonusFinished { jackpot: true });
        assert_eq!(step.before.phase, GamePhase::Bonus);
        assert_eq!(step.before.score, 3 * LEVEL_SCORE);
        assert_eq!(step.after.phase, GamePhase::Playing);
        assert_eq!(step.after.level, 6);
        assert_eq!(step.after.bonus_wins, 1);
        assert_eq!(step.after.score, 3 * LEVEL_SCORE + BONUS_WIN_SCORE);
    }

    #[test]
    fn bonus_loss_moves_to_next_level_not_game_over() {
        let mut engine = GameEngine::new(GameConfig::checkpoint(), Difficulty::Medium);
        for _ in 0..3 {
            let _ = pass(&mut engine);
        }
        let step = engine.apply(GameCommand::BonusFinished { jackpot: false });
        assert_eq!(step.after.phase, GamePhase::Playing);
        assert_eq!(step.after.level, 4);
        assert_eq!(step.after.bonus_wins, 0);
    }

    #[test]
    fn final_gate_wins_with_two_bonus_wins() {
        let mut engine = GameEngine::new(GameConfig::checkpoint(), Difficulty::Medium);
        // Jackpots at 3 and 6 skip straight along the checkpoint chain.
        for _ in 0..3 {
            let _ = pass(&mut engine);
        }
        let _ = engine.apply(GameCommand::BonusFinished { jackpot: true });
        assert_eq!(engine.session().level, 6);
        let _ = pass(&mut engine);
        let _ = engine.apply(GameCommand::BonusFinished { jackpot: true });
        assert_eq!(engine.session().level, LEVEL_COUNT);
        let _ = pass(&mut engine);
        assert_eq!(engine.session().phase, GamePhase::Bonus);

        let finale = engine.apply(GameCommand::BonusFinished { jackpot: false });
        assert_eq!(finale.after.phase, GamePhase::Won);
        assert_eq!(finale.after.bonus_wins, 2);
    }

    #[test]
    fn final_gate_loses_with_too_few_bonus_wins() {
        let mut engine = GameEngine::new(GameConfig::checkpoint(), Difficulty::Medium);
        // Lose every pre-terminal bonus, grind through all ten levels.
        loop {
            let step = pass(&mut engine);
            if step.after.phase == GamePhase::Bonus && step.after.level == LEVEL_COUNT {
                break;
            }
            if step.after.phase == GamePhase::Bonus {
                let _ = engine.apply(GameCommand::BonusFinished { jackpot: false });
            }
        }
        let finale = engine.apply(GameCommand::BonusFinished { jackpot: true });
        assert_eq!(finale.after.bonus_wins, 1);
        assert_eq!(finale.after.phase, GamePhase::Lost);
    }

    #[test]
    fn results_during_bonus_are_rejected() {
        let mut engine = GameEngine::new(GameConfig::checkpoint(), Difficulty::Medium);
        for _ in 0..3 {
            let _ = pass(&mut engine);
        }
        let step = pass(&mut engine);
        assert_eq!(step.status, GameApplyStatus::InvalidTransition);
        assert_eq!(step.after.phase, GamePhase::Bonus);
    }
}
