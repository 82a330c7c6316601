pub(crate) mod config;
mod feedback;
mod game;
mod level;
pub mod menu;
mod motion;
mod render;
mod shake;
pub mod slot;
pub mod types;

use embassy_time::{Duration, Instant, Ticker, Timer};
use esp_hal::{
    gpio::{Input, InputConfig, Pull},
    i2c::master::{Config as I2cConfig, Error as I2cError, I2c, SoftwareTimeout},
    time::{Duration as HalDuration, Rate},
    timer::timg::TimerGroup,
};
use esp_println::println;
use ssd1306::{
    mode::DisplayConfig, prelude::DisplayRotation, size::DisplaySize128x64, I2CDisplayInterface,
    Ssd1306,
};

use self::{
    config::{FEEDBACK, MENU_TICK_MS, OUTCOME_HOLD_MS, START_SPLASH_MS},
    game::{GameCommand, GameConfig, GameEngine, GamePhase},
    level::{LevelOutcome, LevelRun, LevelTick},
    menu::DifficultyMenu,
    slot::{SlotMachine, SlotResult},
    types::{Difficulty, FeedbackEvent, GameContext, OutcomeKind, SensorSample},
};
use crate::drivers::{adxl345::Adxl345, button::PushButton, encoder::RotaryEncoder};

pub fn run() -> ! {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let accel_i2c_cfg = I2cConfig::default()
        .with_frequency(Rate::from_khz(400))
        .with_software_timeout(SoftwareTimeout::Transaction(HalDuration::from_millis(20)));
    let accel_i2c = I2c::new(peripherals.I2C0, accel_i2c_cfg)
        .expect("failed to init I2C0")
        .with_sda(peripherals.GPIO21)
        .with_scl(peripherals.GPIO22);

    let oled_i2c_cfg = I2cConfig::default()
        .with_frequency(Rate::from_khz(400))
        .with_software_timeout(SoftwareTimeout::Transaction(HalDuration::from_millis(40)));
    let oled_i2c = I2c::new(peripherals.I2C1, oled_i2c_cfg)
        .expect("failed to init I2C1")
        .with_sda(peripherals.GPIO23)
        .with_scl(peripherals.GPIO18);

    let interface = I2CDisplayInterface::new(oled_i2c);
    let mut oled = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    if oled.init().is_err() {
        println!("OLED init failed");
        halt_forever();
    }

    // GPIO34/35 are input-only; the encoder board provides its own pull-ups.
    let encoder = RotaryEncoder::new(
        Input::new(peripherals.GPIO34, InputConfig::default()),
        Input::new(peripherals.GPIO35, InputConfig::default()),
    );
    let button = PushButton::new(Input::new(
        peripherals.GPIO32,
        InputConfig::default().with_pull(Pull::Up),
    ));

    let accel = match Adxl345::new(accel_i2c) {
        Ok(sensor) => sensor,
        Err(err) => {
            println!("accelerometer init failed: {:?}", err);
            render::screen_outcome(&mut oled, OutcomeKind::SensorFault);
            halt_forever();
        }
    };

    let context = GameContext {
        accel,
        oled,
        encoder,
        button,
    };

    let mut executor = esp_rtos::embassy::Executor::new();
    let executor = unsafe { make_static(&mut executor) };
    executor.run(move |spawner| {
        spawner.must_spawn(feedback::led_task(peripherals.RMT, peripherals.GPIO14));
        spawner.must_spawn(game_task(context));
    });
}

#[embassy_executor::task]
async fn game_task(mut ctx: GameContext) {
    render::screen_title(&mut ctx.oled);
    wait_for_press(&mut ctx).await;

    loop {
        let difficulty = select_difficulty(&mut ctx).await;
        println!("session start, difficulty {}", difficulty.label());

        render::screen_start(&mut ctx.oled, difficulty);
        Timer::after(Duration::from_millis(START_SPLASH_MS)).await;

        let outcome = play_session(&mut ctx, difficulty).await;
        let flash = match outcome {
            OutcomeKind::GameWon { .. } => FeedbackEvent::WinFlash,
            _ => FeedbackEvent::LoseFlash,
        };
        FEEDBACK.send(flash).await;
        render::screen_outcome(&mut ctx.oled, outcome);

        Timer::after(Duration::from_millis(OUTCOME_HOLD_MS)).await;
        wait_for_press(&mut ctx).await;
        FEEDBACK.send(FeedbackEvent::Idle).await;
    }
}

/// Runs the whole session against a fresh engine; returns the terminal
/// screen to show.
async fn play_session(ctx: &mut GameContext, difficulty: Difficulty) -> OutcomeKind {
    let mut engine = GameEngine::new(GameConfig::checkpoint(), difficulty);

    loop {
        let session = engine.session();
        match session.phase {
            GamePhase::Playing => {
                let outcome = match run_level(ctx, &engine).await {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        println!("accelerometer read failed: {:?}", err);
                        return OutcomeKind::SensorFault;
                    }
                };
                let step = engine.apply(GameCommand::LevelFinished {
                    passed: outcome.passed,
                });
                println!(
                    "level {} finished: passed={} metric={}",
                    step.before.level, outcome.passed, outcome.metric
                );
                if outcome.passed && step.after.phase == GamePhase::Playing {
                    render::screen_outcome(&mut ctx.oled, OutcomeKind::LevelClear);
                    Timer::after(Duration::from_millis(OUTCOME_HOLD_MS)).await;
                }
            }
            GamePhase::Bonus => {
                let result = run_bonus(ctx).await;
                let interstitial = match result {
                    SlotResult::Jackpot => OutcomeKind::Jackpot,
                    SlotResult::PartialMatch => OutcomeKind::PartialMatch,
                    SlotResult::NoMatch => OutcomeKind::NoMatch,
                };
                render::screen_outcome(&mut ctx.oled, interstitial);
                Timer::after(Duration::from_millis(OUTCOME_HOLD_MS)).await;
                engine.apply(GameCommand::BonusFinished {
                    jackpot: result.is_win(),
                });
            }
            GamePhase::Won => {
                return OutcomeKind::GameWon {
                    score: session.score,
                }
            }
            GamePhase::Lost => {
                return OutcomeKind::GameOver {
                    level: session.level,
                }
            }
        }
    }
}

/// Drives one level attempt at the evaluator's cadence. The HUD redraws only
/// when something visible changed; an I2C flush cannot keep up with the
/// 10 ms sampling tick.
async fn run_level(
    ctx: &mut GameContext,
    engine: &GameEngine,
) -> Result<LevelOutcome, I2cError> {
    let spec = engine.current_spec();
    let session = engine.session();
    let policy = engine.config().policy;
    let mut run = LevelRun::new(
        spec,
        session.difficulty.profile(),
        policy,
        Instant::now().as_millis(),
    );

    let mut ticker = Ticker::every(Duration::from_millis(run.tick_interval_ms()));
    let mut drawn: Option<(u32, u32)> = None;

    loop {
        ticker.next().await;
        let sample = read_sample(&mut ctx.accel)?;

        match run.tick(Instant::now().as_millis(), sample) {
            LevelTick::Running(progress) => {
                if progress.counted {
                    let _ = FEEDBACK.try_send(FeedbackEvent::CountTick);
                }
                let visible = (progress.metric, progress.remaining_ms / 100);
                if drawn != Some(visible) {
                    drawn = Some(visible);
                    render::screen_level(&mut ctx.oled, spec.index, spec.action, policy, progress);
                }
            }
            LevelTick::Finished(outcome) => return Ok(outcome),
        }
    }
}

/// One slot-machine detour: spin animation on the LEDs, reels on the OLED,
/// one button press per reel.
async fn run_bonus(ctx: &mut GameContext) -> SlotResult {
    FEEDBACK.send(FeedbackEvent::Spin).await;
    let mut machine = SlotMachine::new(Instant::now().as_millis());
    render::screen_spin(&mut ctx.oled, machine.reels());

    let mut ticker = Ticker::every(Duration::from_millis(MENU_TICK_MS));
    let mut drawn = machine.reels();

    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis();
        machine.tick(now_ms);
        if ctx.button.fell() {
            machine.press(now_ms);
        }

        let reels = machine.reels();
        if reels != drawn {
            drawn = reels;
            render::screen_spin(&mut ctx.oled, reels);
        }

        if let Some(result) = machine.result() {
            println!("bonus spin result: {:?}", result);
            return result;
        }
    }
}

async fn select_difficulty(ctx: &mut GameContext) -> Difficulty {
    let mut menu = DifficultyMenu::new();
    render::screen_menu(&mut ctx.oled, menu.current());

    let mut ticker = Ticker::every(Duration::from_millis(MENU_TICK_MS));
    loop {
        ticker.next().await;
        if menu.turn(ctx.encoder.delta()) {
            render::screen_menu(&mut ctx.oled, menu.current());
        }
        if ctx.button.fell() {
            return menu.current();
        }
    }
}

async fn wait_for_press(ctx: &mut GameContext) {
    let mut ticker = Ticker::every(Duration::from_millis(MENU_TICK_MS));
    loop {
        ticker.next().await;
        if ctx.button.fell() {
            return;
        }
    }
}

// One retry absorbs a transient bus glitch; a second failure aborts the run.
fn read_sample(accel: &mut Adxl345) -> Result<SensorSample, I2cError> {
    match accel.read_acceleration() {
        Ok(sample) => Ok(sample),
        Err(_) => accel.read_acceleration(),
    }
}

unsafe fn make_static<T>(value: &mut T) -> &'static mut T {
    unsafe { core::mem::transmute(value) }
}

fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
