//! Frame: the context passed to data entities and input actions.
//!
//! A [`Frame`] lends out the active scene's entities mutably and the input and
//! timing state read-only. Anything that would change the shape of the game
//! mid-tick (spawning data entities, queueing actions, switching scenes,
//! stopping the loop) is recorded as a command and applied once the tick has
//! finished, so no phase ever runs twice in one tick. Actions queued during the
//! `start` phase are the exception: the input step picks them up right away.

use crate::action::{ActionStatus, InputAction};
use crate::entity::{DataEntity, EntityId, Phase};
use crate::error::Result;
use crate::input::InputState;
use crate::render2d::Color;
use crate::scene::Entities;
use crate::time::Time;

/// Deferred changes collected during a tick.
#[derive(Default)]
pub(crate) struct Commands {
    pub(crate) data: Vec<DataEntity>,
    pub(crate) actions: Vec<InputAction>,
    pub(crate) switch_to: Option<usize>,
    pub(crate) background: Option<Color>,
    pub(crate) stop: bool,
}

/// Per-tick context for data entities and input-action handlers.
///
/// ```ignore
/// scene.spawn_data(DataEntity::new(Phase::End, |frame| {
///     if frame.entities.foreground.is_empty() {
///         frame.switch_scene(GAME_OVER);
///     }
/// }));
/// ```
pub struct Frame<'a> {
    /// Foreground, background and resources of the active scene.
    pub entities: &'a mut Entities,
    pub input: &'a InputState,
    pub time: &'a Time,
    /// Surface size in pixels.
    pub bounds: (u32, u32),
    commands: &'a mut Commands,
}

impl<'a> Frame<'a> {
    pub(crate) fn new(
        entities: &'a mut Entities,
        input: &'a InputState,
        time: &'a Time,
        bounds: (u32, u32),
        commands: &'a mut Commands,
    ) -> Self {
        Self {
            entities,
            input,
            time,
            bounds,
            commands,
        }
    }

    /// Add a data entity to the active scene. It first runs next tick.
    pub fn spawn_data(
        &mut self,
        phase: Phase,
        callback: impl FnMut(&mut Frame<'_>) + 'static,
    ) -> EntityId {
        let entity = DataEntity::new(phase, callback);
        let id = entity.id();
        self.commands.data.push(entity);
        id
    }

    /// Queue an input action. Actions queued from a `start` data entity run
    /// this tick; anywhere else they first run next tick.
    pub fn queue_action(
        &mut self,
        keyword: &str,
        handler: impl FnMut(&mut Frame<'_>) -> ActionStatus + 'static,
    ) -> Result<EntityId> {
        let action = InputAction::new(keyword, handler)?;
        let id = action.id();
        self.commands.actions.push(action);
        Ok(id)
    }

    pub(crate) fn take_actions(&mut self) -> Vec<InputAction> {
        std::mem::take(&mut self.commands.actions)
    }

    /// Make another scene active from the next tick on.
    pub fn switch_scene(&mut self, index: usize) {
        self.commands.switch_to = Some(index);
    }

    /// Change the game's background color from the next tick on.
    pub fn set_background(&mut self, color: Color) {
        self.commands.background = Some(color);
    }

    /// Stop the game loop once this tick completes.
    pub fn stop(&mut self) {
        self.commands.stop = true;
    }
}
