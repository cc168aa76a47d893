//! Run lifecycle and frame loop
//!
//! The engine owns one run at a time and walks it through
//! MENU -> PLAYING -> GAME_OVER -> (reset) -> MENU. The host calls
//! [`Engine::frame`] from its animation callback and [`Engine::poll_deferred`]
//! from a wall-clock timer; everything else happens synchronously inside
//! those calls.

use glam::Vec2;

use crate::consts::{FRAME_RATE, GAME_OVER_DELAY_MS, MAX_FRAME_DT};
use crate::platform::InputSource;
use crate::renderer::{Canvas, draw_frame};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameMode, GameState, SoundCue, TickInput, Viewport, tick};

pub use crate::sim::RunPhase;

/// Fire-and-forget audio cues
pub trait AudioSink {
    fn play_sound(&mut self, cue: SoundCue);
    /// Start the soundtrack for a run
    fn play_music(&mut self, mode: GameMode);
    fn stop_music(&mut self);
}

/// Score and game-over notifications for the UI
pub trait ScoreSink {
    /// Called once per collectible pickup with the new total
    fn on_score_update(&mut self, score: u32);
    /// Called once per run, after the game-over delay
    fn on_game_over(&mut self, score: u32);
}

/// A game-over notification waiting for its wall-clock deadline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameOverNotice {
    pub score: u32,
    /// Host timestamp (ms) at which the notice becomes due
    pub due_ms: f64,
}

/// Drives runs and forwards their events to the collaborators
pub struct Engine<A: AudioSink, U: ScoreSink> {
    viewport: Viewport,
    settings: Settings,
    state: Option<GameState>,
    running: bool,
    last_frame_ms: Option<f64>,
    pending: Option<GameOverNotice>,
    audio: A,
    ui: U,
}

impl<A: AudioSink, U: ScoreSink> Engine<A, U> {
    pub fn new(viewport: Viewport, settings: Settings, audio: A, ui: U) -> Self {
        Self {
            viewport,
            settings,
            state: None,
            running: false,
            last_frame_ms: None,
            pending: None,
            audio,
            ui,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.state.as_ref().map_or(RunPhase::Menu, |s| s.phase)
    }

    /// Whether frames should keep being scheduled
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn state_mut(&mut self) -> Option<&mut GameState> {
        self.state.as_mut()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn pending_notice(&self) -> Option<GameOverNotice> {
        self.pending
    }

    pub fn score(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.score)
    }

    /// Begin a fresh run. Ignored unless the engine is in the menu.
    pub fn start(&mut self, mode: GameMode, seed: u64) -> bool {
        if self.phase() != RunPhase::Menu {
            log::warn!("start({}) ignored in {:?}", mode.as_str(), self.phase());
            return false;
        }

        let mut state = GameState::new(mode, self.viewport, seed);
        state.particles.limit = self.settings.max_particles();
        self.state = Some(state);
        self.running = true;
        self.last_frame_ms = None;
        self.pending = None;
        self.audio.play_music(mode);
        log::info!("Starting {} run with seed {}", mode.as_str(), seed);
        true
    }

    /// Advance and draw one frame at host time `now_ms`.
    ///
    /// Returns whether another frame should be scheduled. The frame in which
    /// the run ends is still drawn so the death burst is visible.
    pub fn frame<I, C>(&mut self, now_ms: f64, input: &I, canvas: &mut C) -> bool
    where
        I: InputSource + ?Sized,
        C: Canvas + ?Sized,
    {
        if !self.running {
            return false;
        }
        let Some(state) = self.state.as_mut() else {
            return false;
        };

        let dt = match self.last_frame_ms {
            Some(last) => (((now_ms - last) / 1000.0) as f32).clamp(0.0, MAX_FRAME_DT),
            None => 1.0 / FRAME_RATE,
        };
        self.last_frame_ms = Some(now_ms);

        let input = TickInput {
            pointer: input.pointer(),
        };
        tick(state, &input, dt);

        for event in state.drain_events() {
            match event {
                GameEvent::ScoreChanged(score) => self.ui.on_score_update(score),
                GameEvent::Sound(cue) => self.audio.play_sound(cue),
                GameEvent::Died { score } => {
                    self.running = false;
                    self.audio.stop_music();
                    self.pending = Some(GameOverNotice {
                        score,
                        due_ms: now_ms + GAME_OVER_DELAY_MS,
                    });
                }
            }
        }

        let offset = if self.settings.effective_screen_shake() && state.shake > 0.0 {
            let shake = state.shake;
            Vec2::new(
                state.particles.jitter() * shake,
                state.particles.jitter() * shake,
            )
        } else {
            Vec2::ZERO
        };
        draw_frame(canvas, state, offset);

        self.running
    }

    /// Deliver the game-over notice once its deadline has passed.
    ///
    /// Returns true if the notice fired on this call.
    pub fn poll_deferred(&mut self, now_ms: f64) -> bool {
        match self.pending {
            Some(notice) if now_ms >= notice.due_ms => {
                self.pending = None;
                self.ui.on_game_over(notice.score);
                true
            }
            _ => false,
        }
    }

    /// Stop scheduling frames and silence the soundtrack.
    /// A pending game-over notice is left in place.
    pub fn stop(&mut self) {
        self.running = false;
        self.audio.stop_music();
    }

    /// Drop the finished run and return to the menu.
    /// Any undelivered game-over notice belongs to that run and is discarded.
    pub fn reset(&mut self) {
        if self.running {
            self.stop();
        }
        self.state = None;
        self.pending = None;
        self.last_frame_ms = None;
        log::info!("Back to menu");
    }

    /// Viewport for the next run; the current run keeps its own
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width.max(1.0), height.max(1.0));
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn apply_settings(&mut self, settings: Settings) {
        if let Some(state) = self.state.as_mut() {
            state.particles.limit = settings.max_particles();
        }
        self.settings = settings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rect;
    use crate::Rgb;
    use crate::sim::{Collectible, Obstacle, Stage};

    #[derive(Default)]
    struct RecordingAudio {
        sounds: Vec<SoundCue>,
        music: Vec<Option<GameMode>>,
    }

    impl AudioSink for RecordingAudio {
        fn play_sound(&mut self, cue: SoundCue) {
            self.sounds.push(cue);
        }
        fn play_music(&mut self, mode: GameMode) {
            self.music.push(Some(mode));
        }
        fn stop_music(&mut self) {
            self.music.push(None);
        }
    }

    #[derive(Default)]
    struct RecordingUi {
        scores: Vec<u32>,
        game_overs: Vec<u32>,
    }

    impl ScoreSink for RecordingUi {
        fn on_score_update(&mut self, score: u32) {
            self.scores.push(score);
        }
        fn on_game_over(&mut self, score: u32) {
            self.game_overs.push(score);
        }
    }

    #[derive(Default)]
    struct CountingCanvas {
        frames: usize,
        offsets: Vec<Vec2>,
    }

    impl Canvas for CountingCanvas {
        fn save(&mut self) {
            self.frames += 1;
        }
        fn restore(&mut self) {}
        fn translate(&mut self, offset: Vec2) {
            self.offsets.push(offset);
        }
        fn set_glow(&mut self, _blur: f32, _color: Rgb) {}
        fn fill_rect(&mut self, _min: Vec2, _size: Vec2, _color: Rgb, _alpha: f32) {}
        fn fill_circle(&mut self, _c: Vec2, _r: f32, _color: Rgb, _alpha: f32) {}
        fn stroke_circle(&mut self, _c: Vec2, _r: f32, _color: Rgb, _a: f32, _w: f32) {}
        fn line(&mut self, _from: Vec2, _to: Vec2, _color: Rgb, _alpha: f32, _width: f32) {}
        fn text(&mut self, _label: &str, _at: Vec2, _color: Rgb) {}
    }

    type TestEngine = Engine<RecordingAudio, RecordingUi>;

    fn engine() -> TestEngine {
        Engine::new(
            Viewport::new(400.0, 800.0),
            Settings::default(),
            RecordingAudio::default(),
            RecordingUi::default(),
        )
    }

    /// Park the player at (100, 100) with the spawner held off
    fn quiet_world(engine: &mut TestEngine) {
        let state = engine.state_mut().unwrap();
        state.player.pos = Vec2::new(100.0, 100.0);
        state.player.target = state.player.pos;
        if let Stage::World(world) = &mut state.stage {
            world.spawn_timer = 100.0;
            world.speed = 0.0;
        }
    }

    #[test]
    fn test_start_plays_music_and_enters_playing() {
        let mut engine = engine();
        assert_eq!(engine.phase(), RunPhase::Menu);
        assert!(engine.start(GameMode::Hardcore, 1));
        assert_eq!(engine.phase(), RunPhase::Playing);
        assert_eq!(engine.audio().music, vec![Some(GameMode::Hardcore)]);
        // A second start mid-run is ignored
        assert!(!engine.start(GameMode::Zen, 2));
    }

    #[test]
    fn test_collectible_reports_score_once() {
        let mut engine = engine();
        engine.start(GameMode::Normal, 3);
        quiet_world(&mut engine);
        if let Some(Stage::World(world)) = engine.state_mut().map(|s| &mut s.stage) {
            world
                .collectibles
                .push(Collectible::new(Vec2::new(100.0, 100.0), 10.0, Rgb::WHITE));
        }

        let mut canvas = CountingCanvas::default();
        let pointer = Vec2::new(100.0, 0.0);
        assert!(engine.frame(0.0, &pointer, &mut canvas));
        assert!(engine.frame(16.0, &pointer, &mut canvas));

        assert_eq!(engine.ui().scores, vec![10]);
        assert_eq!(engine.audio().sounds, vec![SoundCue::Collect]);
        assert_eq!(canvas.frames, 2);
    }

    #[test]
    fn test_fatal_hit_defers_game_over() {
        let mut engine = engine();
        engine.start(GameMode::Normal, 4);
        quiet_world(&mut engine);
        {
            let state = engine.state_mut().unwrap();
            state.score = 30;
            if let Stage::World(world) = &mut state.stage {
                world.obstacles.push(Obstacle {
                    rect: Rect::new(Vec2::new(100.0, 100.0), Vec2::new(60.0, 20.0)),
                    color: Rgb::RED,
                });
            }
        }

        let mut canvas = CountingCanvas::default();
        let keep_going = engine.frame(1000.0, &Vec2::new(100.0, 0.0), &mut canvas);

        assert!(!keep_going);
        assert_eq!(engine.phase(), RunPhase::GameOver);
        // Final frame is still drawn
        assert_eq!(canvas.frames, 1);
        assert!(engine.audio().sounds.contains(&SoundCue::Explosion));

        // Frozen: further frames do nothing
        assert!(!engine.frame(1016.0, &(), &mut canvas));
        assert_eq!(canvas.frames, 1);

        assert!(!engine.poll_deferred(1499.0));
        assert!(engine.ui().game_overs.is_empty());
        assert!(engine.poll_deferred(1500.0));
        assert_eq!(engine.ui().game_overs, vec![30]);
        assert!(!engine.poll_deferred(2000.0));
        assert_eq!(engine.ui().game_overs, vec![30]);
    }

    #[test]
    fn test_stop_keeps_pending_notice() {
        let mut engine = engine();
        engine.start(GameMode::Normal, 5);
        quiet_world(&mut engine);
        if let Some(Stage::World(world)) = engine.state_mut().map(|s| &mut s.stage) {
            world.obstacles.push(Obstacle {
                rect: Rect::new(Vec2::new(100.0, 100.0), Vec2::new(60.0, 20.0)),
                color: Rgb::RED,
            });
        }
        engine.frame(0.0, &(), &mut CountingCanvas::default());
        engine.stop();

        assert_eq!(engine.audio().music.last(), Some(&None));
        assert!(engine.pending_notice().is_some());
        assert!(engine.poll_deferred(500.0));
        assert_eq!(engine.ui().game_overs, vec![0]);

        engine.reset();
        assert_eq!(engine.phase(), RunPhase::Menu);
        assert!(engine.start(GameMode::Zen, 6));
    }

    #[test]
    fn test_death_stops_music_and_reset_drops_notice() {
        let mut engine = engine();
        engine.start(GameMode::Normal, 10);
        quiet_world(&mut engine);
        if let Some(Stage::World(world)) = engine.state_mut().map(|s| &mut s.stage) {
            world.obstacles.push(Obstacle {
                rect: Rect::new(Vec2::new(100.0, 100.0), Vec2::new(60.0, 20.0)),
                color: Rgb::RED,
            });
        }
        engine.frame(0.0, &(), &mut CountingCanvas::default());
        assert_eq!(
            engine.audio().music,
            vec![Some(GameMode::Normal), None]
        );

        // Leaving before the notice is due cancels it
        engine.reset();
        assert!(engine.pending_notice().is_none());
        assert!(!engine.poll_deferred(1000.0));
        assert!(engine.ui().game_overs.is_empty());

        // The next run gets its own soundtrack bracket
        assert!(engine.start(GameMode::Zen, 11));
        assert_eq!(
            engine.audio().music,
            vec![Some(GameMode::Normal), None, Some(GameMode::Zen)]
        );
    }

    #[test]
    fn test_frame_dt_is_clamped() {
        let mut engine = engine();
        engine.start(GameMode::Normal, 7);
        let mut canvas = CountingCanvas::default();
        engine.frame(0.0, &(), &mut canvas);
        let before = engine.state().unwrap().elapsed;
        // A ten second stall only advances one clamped step
        engine.frame(10_000.0, &(), &mut canvas);
        let advanced = engine.state().unwrap().elapsed - before;
        assert!((advanced - MAX_FRAME_DT).abs() < 1e-6);
    }

    #[test]
    fn test_shake_respects_reduced_motion() {
        let mut settings = Settings::default();
        settings.reduced_motion = true;
        let mut engine = Engine::new(
            Viewport::new(400.0, 800.0),
            settings,
            RecordingAudio::default(),
            RecordingUi::default(),
        );
        engine.start(GameMode::Normal, 8);
        engine.state_mut().unwrap().shake = 20.0;

        let mut canvas = CountingCanvas::default();
        engine.frame(0.0, &(), &mut canvas);
        assert!(canvas.offsets.is_empty());
    }

    #[test]
    fn test_particles_setting_caps_bursts() {
        let mut settings = Settings::default();
        settings.particles = false;
        let mut engine = Engine::new(
            Viewport::new(400.0, 800.0),
            settings,
            RecordingAudio::default(),
            RecordingUi::default(),
        );
        engine.start(GameMode::Normal, 9);
        assert_eq!(engine.state().unwrap().particles.limit, 0);

        engine.apply_settings(Settings::default());
        assert_eq!(
            engine.state().unwrap().particles.limit,
            crate::consts::MAX_PARTICLES
        );
    }
}
