//! Input actions.
//!
//! An [`InputAction`] maps a keyword (`"jump"`, `"attack"`) to a handler.
//! Queued actions run once per tick, right after the `start` phase; a handler
//! that returns [`ActionStatus::Complete`] is dropped from the queue, one that
//! returns [`ActionStatus::Pending`] runs again next tick. Several actions may
//! share a keyword.

use crate::entity::EntityId;
use crate::error::{EaselError, Result};
use crate::frame::Frame;

/// What a handler reports after running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    /// Keep the action queued.
    Pending,
    /// Remove the action from the queue.
    Complete,
}

pub type ActionFn = Box<dyn FnMut(&mut Frame<'_>) -> ActionStatus>;

/// A keyword bound to a handler.
pub struct InputAction {
    id: EntityId,
    keyword: String,
    handler: ActionFn,
}

impl InputAction {
    /// Validate the keyword and build the action. Use
    /// [`GameCore::queue_action`](crate::game::GameCore::queue_action) to both
    /// create and queue it.
    pub fn new(
        keyword: &str,
        handler: impl FnMut(&mut Frame<'_>) -> ActionStatus + 'static,
    ) -> Result<Self> {
        if keyword.trim().is_empty() {
            log::warn!("Input binding failed: keyword must not be empty");
            return Err(EaselError::InvalidBinding("keyword must not be empty".into()));
        }
        Ok(Self {
            id: EntityId::next(),
            keyword: keyword.to_string(),
            handler: Box::new(handler),
        })
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }
}

/// Input actions waiting to run, in queue order.
#[derive(Default)]
pub struct ActionQueue {
    actions: Vec<InputAction>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: InputAction) -> EntityId {
        let id = action.id;
        self.actions.push(action);
        id
    }

    /// Build an action and queue it. Empty keywords are rejected.
    pub fn queue(
        &mut self,
        keyword: &str,
        handler: impl FnMut(&mut Frame<'_>) -> ActionStatus + 'static,
    ) -> Result<EntityId> {
        let action = InputAction::new(keyword, handler)?;
        Ok(self.push(action))
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Keywords of queued actions, in queue order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().map(|a| a.keyword.as_str())
    }

    /// Drop every queued action with this keyword.
    pub fn cancel(&mut self, keyword: &str) -> usize {
        let before = self.actions.len();
        self.actions.retain(|a| a.keyword != keyword);
        before - self.actions.len()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Run every queued action once, in order, and drop the completed ones.
    /// Returns how many completed.
    pub(crate) fn drain(&mut self, frame: &mut Frame<'_>) -> usize {
        let before = self.actions.len();
        self.actions.retain_mut(|action| {
            match (action.handler)(frame) {
                ActionStatus::Pending => true,
                ActionStatus::Complete => {
                    log::trace!("Input action {} '{}' complete", action.id, action.keyword);
                    false
                }
            }
        });
        before - self.actions.len()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::frame::Commands;
    use crate::input::InputState;
    use crate::scene::Entities;
    use crate::time::Time;

    fn with_frame(f: impl FnOnce(&mut Frame<'_>)) {
        let mut entities = Entities::default();
        let input = InputState::new();
        let time = Time::new(60);
        let mut commands = Commands::default();
        let mut frame = Frame::new(&mut entities, &input, &time, (10, 10), &mut commands);
        f(&mut frame);
    }

    #[test]
    fn empty_keyword_is_rejected() {
        assert!(InputAction::new("", |_| ActionStatus::Complete).is_err());
        assert!(InputAction::new("jump", |_| ActionStatus::Complete).is_ok());
    }

    #[test]
    fn completed_actions_leave_without_skipping_neighbours() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut queue = ActionQueue::new();
        for (name, status) in [
            ("a", ActionStatus::Complete),
            ("b", ActionStatus::Complete),
            ("c", ActionStatus::Pending),
        ] {
            let log = log.clone();
            queue.push(
                InputAction::new(name, move |_| {
                    log.borrow_mut().push(name);
                    status
                })
                .unwrap(),
            );
        }

        with_frame(|frame| assert_eq!(queue.drain(frame), 2));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(queue.keywords().collect::<Vec<_>>(), vec!["c"]);

        with_frame(|frame| assert_eq!(queue.drain(frame), 0));
        assert_eq!(*log.borrow(), vec!["a", "b", "c", "c"]);
    }

    #[test]
    fn cancel_by_keyword() {
        let mut queue = ActionQueue::new();
        queue.queue("fire", |_| ActionStatus::Pending).unwrap();
        queue.queue("move", |_| ActionStatus::Pending).unwrap();
        queue.queue("fire", |_| ActionStatus::Pending).unwrap();
        assert!(queue.queue(" ", |_| ActionStatus::Pending).is_err());
        assert_eq!(queue.cancel("fire"), 2);
        assert_eq!(queue.len(), 1);
    }
}
