//! # GameCore: the fixed-tick game loop
//!
//! [`GameCore`] owns the drawing surface, the scenes, the input state and the
//! queue of input actions, and runs the active scene once per tick:
//!
//! ```text
//!  1  split the scene's data entities by phase
//!  2  data entities: start
//!  3  input actions, including those queued at start
//!     (completed ones leave the queue)
//!  4  data entities: after-input
//!  5  clear the surface to the background color
//!  6  overlap pass, then foreground update callbacks
//!  7  draw background layer, foreground layer, overlay
//!  8  data entities: end
//!     drop entities marked for removal
//!  9  evict resources no entity references
//! 10  frame counter += 1
//!     apply deferred commands, clear per-frame input edges
//! ```
//!
//! # Example
//!
//! ```ignore
//! use easel::prelude::*;
//!
//! let mut game = GameCore::init(Canvas::new(320, 240), GameSettings::default())?;
//! let mut level = Scene::new("level");
//! level.spawn_foreground(ForegroundEntity::new(10.0, 10.0, 16.0, 16.0).color(Color::RED));
//! game.add_scene(level);
//! game.run_frames(60)?;
//! ```

use std::thread;

use serde_json::Value;

use crate::action::{ActionQueue, ActionStatus};
use crate::entity::{DataEntity, EntityId, Phase, UpdateContext};
use crate::error::{EaselError, Result};
use crate::frame::{Commands, Frame};
use crate::input::{InputState, KeyCode, MouseButton};
use crate::render2d::{Canvas, Color, Surface};
use crate::scene::Scene;
use crate::settings::GameSettings;
use crate::time::Time;

/// The game: a surface, its scenes, and the loop that drives them.
pub struct GameCore<S: Surface = Canvas> {
    settings: GameSettings,
    surface: S,
    scenes: Vec<Scene>,
    current: Option<usize>,
    actions: ActionQueue,
    input: InputState,
    time: Time,
    background: Color,
    running: bool,
}

impl<S: Surface> GameCore<S> {
    /// Apply `settings` to `surface` and get ready to tick.
    ///
    /// Explicit width/height resize the surface; missing ones keep its current
    /// size.
    pub fn init(mut surface: S, mut settings: GameSettings) -> Result<Self> {
        if settings.framerate == 0 {
            log::error!("Game init failed: framerate must be positive");
            return Err(EaselError::InvalidFramerate);
        }
        settings.strip_protected();

        let (current_width, current_height) = surface.size();
        let width = settings.width.unwrap_or(current_width);
        let height = settings.height.unwrap_or(current_height);
        if width == 0 || height == 0 {
            log::error!("Game init failed: surface is {width}x{height}");
            return Err(EaselError::EmptySurface { width, height });
        }
        if (width, height) != (current_width, current_height) {
            surface.resize(width, height);
        }

        log::info!(
            "Game initialized: {width}x{height} surface, {} ticks/s",
            settings.framerate
        );

        Ok(Self {
            time: Time::new(settings.framerate),
            background: settings.background_color,
            settings,
            surface,
            scenes: Vec::new(),
            current: None,
            actions: ActionQueue::new(),
            input: InputState::new(),
            running: true,
        })
    }

    // ── Scenes ───────────────────────────────────────────────────────

    /// Register a scene and return its index.
    pub fn add_scene(&mut self, scene: Scene) -> usize {
        log::debug!("Added scene '{}' {}", scene.name(), scene.id());
        self.scenes.push(scene);
        self.scenes.len() - 1
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    pub fn scene_mut(&mut self, index: usize) -> Option<&mut Scene> {
        self.scenes.get_mut(index)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Index of the active scene. `None` until the first tick or switch.
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.current.and_then(|index| self.scenes.get(index))
    }

    pub fn current_scene_mut(&mut self) -> Option<&mut Scene> {
        self.current.and_then(|index| self.scenes.get_mut(index))
    }

    /// Make the scene at `index` active from the next tick on.
    pub fn switch_scene(&mut self, index: usize) -> Result<()> {
        let Some(scene) = self.scenes.get(index) else {
            log::warn!(
                "Cannot switch to scene {index}: only {} scenes",
                self.scenes.len()
            );
            return Err(EaselError::SceneOutOfRange {
                index,
                count: self.scenes.len(),
            });
        };
        log::info!("Switching to scene '{}'", scene.name());
        self.current = Some(index);
        Ok(())
    }

    // ── Loop ─────────────────────────────────────────────────────────

    /// Run one frame of the active scene.
    pub fn tick(&mut self) -> Result<()> {
        if !self.running {
            return Err(EaselError::Stopped);
        }
        if self.scenes.is_empty() {
            log::error!("No scenes defined, stopping the game loop");
            self.running = false;
            return Err(EaselError::NoScenes);
        }
        let index = match self.current {
            Some(index) => index,
            None => {
                self.switch_scene(0)?;
                0
            }
        };

        self.time.begin_frame();
        let bounds = self.surface.size();
        let mut commands = Commands::default();

        let Self {
            scenes,
            actions,
            input,
            time,
            surface,
            background,
            ..
        } = self;
        let count = scenes.len();
        let Some(scene) = scenes.get_mut(index) else {
            return Err(EaselError::SceneOutOfRange { index, count });
        };
        let input = &*input;
        let time = &*time;

        // Data entities spawned from here on wait for the next tick.
        let mut data = scene.take_data();

        {
            let mut frame = Frame::new(&mut scene.entities, input, time, bounds, &mut commands);
            run_phase(&mut data, Phase::Start, &mut frame);
            // Actions queued at start are drained this tick; later ones wait.
            for action in frame.take_actions() {
                actions.push(action);
            }
            actions.drain(&mut frame);
            run_phase(&mut data, Phase::AfterInput, &mut frame);
        }

        surface.begin_frame();
        surface.clear(scene.background().unwrap_or(*background));

        let ctx = UpdateContext { input, time, bounds };
        scene.process(&ctx);
        scene.render(surface);

        {
            let mut frame = Frame::new(&mut scene.entities, input, time, bounds, &mut commands);
            run_phase(&mut data, Phase::End, &mut frame);
        }

        let removed = scene.sweep_removed();
        if removed > 0 {
            log::debug!("Removed {removed} entities from '{}'", scene.name());
        }
        scene.evict_unused_resources();
        scene.restore_data(data, std::mem::take(&mut commands.data));

        self.time.end_frame();
        self.apply(commands);
        self.input.clear_just();
        Ok(())
    }

    /// Tick at the configured framerate until the loop stops.
    pub fn run(&mut self) -> Result<()> {
        self.run_loop(None)
    }

    /// Like [`run`](Self::run), but returns after at most `frames` ticks.
    pub fn run_frames(&mut self, frames: u64) -> Result<()> {
        self.run_loop(Some(frames))
    }

    fn run_loop(&mut self, limit: Option<u64>) -> Result<()> {
        log::info!("Game loop started at {} ticks/s", self.settings.framerate);
        let mut ticks = 0;
        while self.running && limit.is_none_or(|limit| ticks < limit) {
            self.tick()?;
            ticks += 1;

            let spent = self.time.frame_start().elapsed();
            if let Some(rest) = self.time.tick().checked_sub(spent) {
                thread::sleep(rest);
            }
        }
        log::info!("Game loop paused after {} frames", self.frames_count());
        Ok(())
    }

    /// Stop the loop. Later ticks fail with [`EaselError::Stopped`].
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Game loop stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frames_count(&self) -> u64 {
        self.time.frame_count()
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    fn apply(&mut self, commands: Commands) {
        for action in commands.actions {
            self.actions.push(action);
        }
        if let Some(color) = commands.background {
            self.background = color;
        }
        if let Some(index) = commands.switch_to {
            // Logged by switch_scene; the current scene stays active.
            let _ = self.switch_scene(index);
        }
        if commands.stop {
            self.stop();
        }
    }

    // ── Surface and settings ─────────────────────────────────────────

    /// The game's background color. A scene with its own background
    /// overrides it while active.
    pub fn background_color(&self) -> Color {
        self.background
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background = color;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// An extension option from the settings.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.settings.extra(key)
    }

    // ── Input ────────────────────────────────────────────────────────

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn press_key(&mut self, key: KeyCode) {
        self.input.keys.press(key);
    }

    pub fn release_key(&mut self, key: KeyCode) {
        self.input.keys.release(key);
    }

    pub fn press_mouse(&mut self, button: MouseButton) {
        self.input.mouse.press(button);
    }

    pub fn release_mouse(&mut self, button: MouseButton) {
        self.input.mouse.release(button);
    }

    pub fn move_cursor(&mut self, x: f32, y: f32) {
        self.input.cursor.x = x;
        self.input.cursor.y = y;
    }

    /// Bind `key` to `keyword`. Several keys may share a keyword.
    pub fn bind_key(&mut self, keyword: &str, key: KeyCode) -> Result<()> {
        self.input.bind(keyword, key)
    }

    /// Queue an input action; it runs every tick until its handler returns
    /// [`ActionStatus::Complete`].
    pub fn queue_action(
        &mut self,
        keyword: &str,
        handler: impl FnMut(&mut Frame<'_>) -> ActionStatus + 'static,
    ) -> Result<EntityId> {
        self.actions.queue(keyword, handler)
    }

    pub fn actions(&self) -> &ActionQueue {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionQueue {
        &mut self.actions
    }
}

fn run_phase(data: &mut [DataEntity], phase: Phase, frame: &mut Frame<'_>) {
    for entity in data.iter_mut().filter(|entity| entity.phase() == phase) {
        (entity.callback)(frame);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use image::RgbaImage;

    use super::*;
    use crate::entity::ForegroundEntity;
    use crate::render2d::{Sprite, SpriteSheet};

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn game() -> GameCore {
        GameCore::init(Canvas::new(8, 8), GameSettings::default()).unwrap()
    }

    fn data_logger(log: &Log, name: &'static str) -> impl FnMut(&mut Frame<'_>) + 'static {
        let log = log.clone();
        move |_: &mut Frame<'_>| log.borrow_mut().push(name)
    }

    #[test]
    fn init_applies_and_validates_settings() {
        let game = GameCore::init(
            Canvas::new(1, 1),
            GameSettings::default().with_size(20, 10).with_background(Color::RED),
        )
        .unwrap();
        assert_eq!(game.surface().size(), (20, 10));
        assert_eq!(game.background_color(), Color::RED);
        assert!(game.is_running());

        let kept = GameCore::init(Canvas::new(4, 3), GameSettings::default()).unwrap();
        assert_eq!(kept.surface().size(), (4, 3));

        let zero_rate =
            GameCore::init(Canvas::new(4, 4), GameSettings::default().with_framerate(0));
        assert!(matches!(zero_rate, Err(EaselError::InvalidFramerate)));

        let empty = GameCore::init(Canvas::new(0, 0), GameSettings::default());
        assert!(matches!(
            empty,
            Err(EaselError::EmptySurface { width: 0, height: 0 })
        ));
    }

    #[test]
    fn protected_extras_never_reach_the_game() {
        let mut settings = GameSettings::default().with_extra("lives", 3);
        settings.extras.insert("surface".into(), Value::from(1));
        let game = GameCore::init(Canvas::new(2, 2), settings).unwrap();
        assert_eq!(game.extra("lives"), Some(&Value::from(3)));
        assert!(game.extra("surface").is_none());
    }

    #[test]
    fn no_scenes_stops_the_loop() {
        let mut game = game();
        assert!(matches!(game.tick(), Err(EaselError::NoScenes)));
        assert!(!game.is_running());
        assert!(matches!(game.tick(), Err(EaselError::Stopped)));
        assert_eq!(game.frames_count(), 0);
    }

    #[test]
    fn frame_steps_run_in_order() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let overlay_log = log.clone();
        let mut scene = Scene::new("level")
            .with_overlay(move |_, _| overlay_log.borrow_mut().push("overlay"));

        // Registration order differs from phase order on purpose.
        scene.spawn_data(DataEntity::new(Phase::End, data_logger(&log, "end")));
        scene.spawn_data(DataEntity::new(Phase::AfterInput, data_logger(&log, "after-input")));
        scene.spawn_data(DataEntity::new(Phase::Start, data_logger(&log, "start")));

        let update_log = log.clone();
        let render_log = log.clone();
        scene.spawn_foreground(
            ForegroundEntity::new(0.0, 0.0, 1.0, 1.0)
                .on_update(move |_, _| update_log.borrow_mut().push("update"))
                .on_render(move |_, _, _| render_log.borrow_mut().push("render")),
        );

        let mut game = game();
        game.add_scene(scene);
        let action_log = log.clone();
        game.queue_action("jump", move |_| {
            action_log.borrow_mut().push("action");
            ActionStatus::Complete
        })
        .unwrap();

        game.tick().unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["start", "action", "after-input", "update", "render", "overlay", "end"]
        );
        assert!(game.actions().is_empty());
        assert_eq!(game.frames_count(), 1);
        assert_eq!(game.current_index(), Some(0));
    }

    #[test]
    fn background_clear_honours_scene_override() {
        let mut game = game();
        game.set_background_color(Color::RED);
        game.add_scene(Scene::new("plain"));
        game.add_scene(Scene::new("night").with_background(Color::BLUE));

        game.tick().unwrap();
        assert_eq!(game.surface().pixel(0, 0), Some(Color::RED));

        game.switch_scene(1).unwrap();
        game.tick().unwrap();
        assert_eq!(game.surface().pixel(7, 7), Some(Color::BLUE));
    }

    #[test]
    fn draw_calls_count_one_frame() {
        let mut scene = Scene::new("level");
        scene.spawn_foreground(ForegroundEntity::new(0.0, 0.0, 2.0, 2.0).color(Color::RED));
        let mut game = game();
        game.add_scene(scene);

        // Clear plus one fill, every frame.
        game.tick().unwrap();
        assert_eq!(game.surface().draw_calls(), 2);
        game.tick().unwrap();
        game.tick().unwrap();
        assert_eq!(game.surface().draw_calls(), 2);
    }

    #[test]
    fn frame_commands_apply_after_the_tick() {
        let mut game = game();
        let mut title = Scene::new("title");
        title.spawn_data(DataEntity::new(Phase::End, |frame| {
            frame.switch_scene(1);
            frame.set_background(Color::GREEN);
        }));
        game.add_scene(title);
        game.add_scene(Scene::new("level"));

        game.tick().unwrap();
        assert_eq!(game.current_scene().map(Scene::name), Some("level"));
        assert_eq!(game.background_color(), Color::GREEN);

        // Switching to a missing scene is logged and ignored.
        game.scene_mut(1).unwrap().spawn_data(DataEntity::new(Phase::Start, |frame| {
            frame.switch_scene(9);
        }));
        game.tick().unwrap();
        assert_eq!(game.current_index(), Some(1));
        assert!(game.switch_scene(5).is_err());
    }

    #[test]
    fn data_spawned_mid_tick_runs_next_tick() {
        let counter = Rc::new(RefCell::new(0));
        let spawned_counter = counter.clone();
        let mut spawned = false;

        let mut scene = Scene::new("level");
        scene.spawn_data(DataEntity::new(Phase::Start, move |frame| {
            if !spawned {
                spawned = true;
                let counter = spawned_counter.clone();
                frame.spawn_data(Phase::Start, move |_| *counter.borrow_mut() += 1);
            }
        }));
        let mut game = game();
        game.add_scene(scene);

        game.tick().unwrap();
        assert_eq!(*counter.borrow(), 0);
        assert_eq!(game.scene(0).unwrap().data_in_phase(Phase::Start), 2);

        game.tick().unwrap();
        assert_eq!(*counter.borrow(), 1);
    }

    #[test]
    fn actions_queued_at_start_run_the_same_tick() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let start_log = log.clone();
        let mut queued = false;

        let mut scene = Scene::new("level");
        scene.spawn_data(DataEntity::new(Phase::Start, move |frame| {
            start_log.borrow_mut().push("start");
            if !queued {
                queued = true;
                let action_log = start_log.clone();
                frame
                    .queue_action("jump", move |_| {
                        action_log.borrow_mut().push("action");
                        ActionStatus::Complete
                    })
                    .unwrap();
            }
        }));
        scene.spawn_data(DataEntity::new(Phase::AfterInput, data_logger(&log, "after-input")));
        let mut game = game();
        game.add_scene(scene);

        game.tick().unwrap();
        assert_eq!(*log.borrow(), vec!["start", "action", "after-input"]);
        assert!(game.actions().is_empty());

        game.tick().unwrap();
        assert_eq!(
            *log.borrow(),
            vec!["start", "action", "after-input", "start", "after-input"]
        );
    }

    #[test]
    fn actions_queued_from_handlers_wait_a_tick() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut game = game();
        game.add_scene(Scene::new("level"));

        let inner_log = log.clone();
        game.queue_action("outer", move |frame| {
            let log = inner_log.clone();
            frame
                .queue_action("inner", move |_| {
                    log.borrow_mut().push("inner");
                    ActionStatus::Complete
                })
                .unwrap();
            ActionStatus::Complete
        })
        .unwrap();

        game.tick().unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(game.actions().keywords().collect::<Vec<_>>(), vec!["inner"]);

        game.tick().unwrap();
        assert_eq!(*log.borrow(), vec!["inner"]);
    }

    #[test]
    fn removed_entities_release_their_resources() {
        let mut scene = Scene::new("level");
        let used = scene.add_resource("hero.png", RgbaImage::new(2, 2));
        let spare = scene.add_resource("spare.png", RgbaImage::new(2, 2));
        let hero = scene.spawn_foreground(
            ForegroundEntity::new(0.0, 0.0, 2.0, 2.0)
                .sprite(Sprite::new(used, SpriteSheet::new(2, 2, 1, 1))),
        );

        let mut game = game();
        game.add_scene(scene);
        game.tick().unwrap();
        let scene = game.scene(0).unwrap();
        assert!(scene.resource(used).is_some());
        assert!(scene.resource(spare).is_none());

        game.scene_mut(0)
            .unwrap()
            .entities
            .foreground
            .body_mut(hero)
            .unwrap()
            .remove();
        game.tick().unwrap();
        assert_eq!(game.scene(0).unwrap().total_entities(&[]), 0);
    }

    #[test]
    fn input_edges_last_one_tick() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut game = game();
        game.add_scene(Scene::new("level"));
        game.bind_key("jump", KeyCode::Space).unwrap();

        let action_seen = seen.clone();
        game.queue_action("jump", move |frame| {
            action_seen
                .borrow_mut()
                .push(frame.input.action_just_pressed("jump"));
            ActionStatus::Pending
        })
        .unwrap();

        game.press_key(KeyCode::Space);
        game.tick().unwrap();
        game.tick().unwrap();
        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(game.input().pressed(KeyCode::Space));

        game.release_key(KeyCode::Space);
        assert!(game.input().just_released(KeyCode::Space));
        game.move_cursor(3.0, 4.0);
        assert_eq!(game.input().cursor().y, 4.0);
    }

    #[test]
    fn run_returns_once_stopped() {
        let settings = GameSettings::default().with_framerate(1000);
        let mut game = GameCore::init(Canvas::new(4, 4), settings).unwrap();
        let mut scene = Scene::new("level");
        scene.spawn_data(DataEntity::new(Phase::End, |frame| {
            if frame.time.frame_count() == 1 {
                frame.stop();
            }
        }));
        game.add_scene(scene);

        game.run().unwrap();
        assert_eq!(game.frames_count(), 2);
        assert!(!game.is_running());
        assert!(matches!(game.tick(), Err(EaselError::Stopped)));
    }

    #[test]
    fn run_frames_limits_ticks() {
        let settings = GameSettings::default().with_framerate(1000);
        let mut game = GameCore::init(Canvas::new(4, 4), settings).unwrap();
        game.add_scene(Scene::new("level"));
        game.run_frames(3).unwrap();
        assert_eq!(game.frames_count(), 3);
        assert!(game.is_running());
    }
}
