//! Arcade Cabinet entry point
//!
//! Native: headless demo runner, `arcade [game] [ticks] [seed]`, with the
//! built-in AI playing. Web: exports a `WebArcade` handle for the page script
//! to drive from `requestAnimationFrame`.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;

    use arcade_cabinet::sim::{GamePhase, TickInput};
    use arcade_cabinet::{Arcade, FixedStep, GameKind, HighScores, Settings, highscores};

    /// One running game, owned by the page
    #[wasm_bindgen]
    pub struct WebArcade {
        game: Box<dyn Arcade>,
        clock: FixedStep,
        input: TickInput,
        high_scores: HighScores,
        recorded: bool,
    }

    #[wasm_bindgen]
    impl WebArcade {
        /// Start `name` (one of the game names); unknown names pick the platformer
        #[wasm_bindgen(constructor)]
        pub fn new(name: &str, seed: u32) -> Result<WebArcade, JsValue> {
            let kind = GameKind::from_name(name).unwrap_or(GameKind::Platformer);
            let settings = Settings::load();
            let game = kind
                .create(u64::from(seed), &settings)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            Ok(WebArcade {
                game,
                clock: FixedStep::new(),
                input: TickInput::default(),
                high_scores: HighScores::load(),
                recorded: false,
            })
        }

        /// Hold or release a named control: left, right, up, down
        pub fn set_key(&mut self, key: &str, down: bool) {
            match key {
                "left" => self.input.left = down,
                "right" => self.input.right = down,
                "up" => self.input.up = down,
                "down" => self.input.down = down,
                "jump" => self.input.jump |= down,
                "action" => self.input.action |= down,
                "pause" => self.input.pause |= down,
                _ => log::debug!("Unmapped key {key}"),
            }
        }

        pub fn set_pointer(&mut self, x: f32, y: f32) {
            self.input.pointer = Some(glam::Vec2::new(x, y));
        }

        pub fn clear_pointer(&mut self) {
            self.input.pointer = None;
        }

        pub fn set_autoplay(&mut self, on: bool) {
            self.input.autoplay = on;
        }

        /// Advance by a frame delta in seconds; returns ticks run
        pub fn frame(&mut self, dt: f32) -> u32 {
            let steps = self.clock.advance(dt);
            for _ in 0..steps {
                self.game.tick(&self.input, arcade_cabinet::consts::SIM_DT);
                self.input.clear_one_shots();
            }
            // Events feed sound on the page side; nothing here consumes them yet
            self.game.drain_events();

            if self.game.phase() == GamePhase::GameOver && !self.recorded {
                self.recorded = true;
                let stats = self.game.stats();
                let kind = self.game.kind();
                if self
                    .high_scores
                    .add_score(kind, stats.score, stats.level, highscores::now_ms())
                    .is_some()
                {
                    if let Err(e) = self.high_scores.save() {
                        log::warn!("Could not save high scores: {e}");
                    }
                }
            }
            steps
        }

        pub fn score(&self) -> f64 {
            self.game.stats().score as f64
        }

        pub fn lives(&self) -> u8 {
            self.game.stats().lives
        }

        pub fn phase(&self) -> String {
            format!("{:?}", self.game.phase())
        }

        /// Flattened `x, y, size, life` per particle for the page to draw
        pub fn particles(&self) -> Vec<f32> {
            self.game
                .particles()
                .items
                .iter()
                .flat_map(|p| [p.pos.x, p.pos.y, p.size, p.life])
                .collect()
        }
    }

    pub fn init() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }
        log::info!("Arcade Cabinet starting...");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::init();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let kind = match args.next() {
        Some(name) => match arcade_cabinet::GameKind::from_name(&name) {
            Some(kind) => kind,
            None => {
                log::error!("Unknown game {name:?}");
                std::process::exit(2);
            }
        },
        None => arcade_cabinet::GameKind::Platformer,
    };
    let ticks: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 60);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(1);

    if let Err(e) = native::run(kind, ticks, seed) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use arcade_cabinet::sim::{GamePhase, TickInput};
    use arcade_cabinet::{FixedStep, GameKind, HighScores, Result, Settings, consts, highscores};

    /// Play `ticks` frames of `SIM_DT` through the fixed-step clock on autoplay
    /// and report the outcome
    pub fn run(kind: GameKind, ticks: u64, seed: u64) -> Result<()> {
        let settings = Settings::load();
        let mut game = kind.create(seed, &settings)?;
        let input = TickInput {
            autoplay: true,
            ..Default::default()
        };

        let mut clock = FixedStep::new();
        let mut phase = game.phase();
        'frames: for _ in 0..ticks {
            for _ in 0..clock.advance(consts::SIM_DT) {
                game.tick(&input, consts::SIM_DT);
                game.drain_events();
                if game.phase() != phase {
                    phase = game.phase();
                    log::info!("tick {}: {:?}", game.stats().ticks, phase);
                }
                if phase == GamePhase::GameOver {
                    break 'frames;
                }
            }
        }

        let stats = game.stats();
        log::info!(
            "{} finished: score {}, level {}, lives {}, {} ticks",
            kind.name(),
            stats.score,
            stats.level,
            stats.lives,
            stats.ticks
        );

        let mut scores = HighScores::load();
        if let Some(rank) = scores.add_score(kind, stats.score, stats.level, highscores::now_ms()) {
            println!("New high score for {}: rank {}", kind.name(), rank);
            scores.save()?;
        }
        println!("{} {}", kind.name(), stats.score);
        Ok(())
    }
}
