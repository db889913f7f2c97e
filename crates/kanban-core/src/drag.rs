//! Drag-and-drop interpretation.
//!
//! A [`ReorderCoordinator`] turns the start/over/end callbacks of a gesture
//! library into store moves for one board. Every gesture subject carries
//! its kind, so lists and cards are never told apart by guessing.

use crate::config::DragConfig;
use crate::model::{Board, CardLocation, EntityId};
use crate::store::BoardStore;
use serde::{Deserialize, Serialize};

/// What is being dragged or hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    List,
    Card,
}

/// A tagged drag source or drop target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DragSubject {
    pub kind: DragKind,
    pub id: EntityId,
}

impl DragSubject {
    pub fn list(id: EntityId) -> Self {
        Self { kind: DragKind::List, id }
    }

    pub fn card(id: EntityId) -> Self {
        Self { kind: DragKind::Card, id }
    }

    /// Classify a raw identifier by looking it up on a board.
    ///
    /// For gesture sources that report bare IDs. List IDs are checked
    /// before card IDs.
    pub fn resolve(board: &Board, id: EntityId) -> Option<Self> {
        if board.list(id).is_some() {
            Some(Self::list(id))
        } else if board.find_card(id).is_some() {
            Some(Self::card(id))
        } else {
            None
        }
    }
}

/// State of an in-progress drag.
#[derive(Debug, Clone)]
struct DragSession {
    active: DragSubject,
    /// Where the dragged card sat when the drag started.
    origin: Option<CardLocation>,
    /// Set once `drag_over` has moved the card.
    previewed: bool,
}

/// Translates drag gestures over one board into store mutations.
#[derive(Debug, Clone)]
pub struct ReorderCoordinator {
    board_id: EntityId,
    config: DragConfig,
    session: Option<DragSession>,
}

impl ReorderCoordinator {
    /// Create a coordinator for the board with `board_id`.
    pub fn new(board_id: EntityId, config: DragConfig) -> Self {
        Self {
            board_id,
            config,
            session: None,
        }
    }

    /// Board this coordinator operates on.
    pub fn board_id(&self) -> EntityId {
        self.board_id
    }

    /// The subject currently being dragged.
    pub fn active(&self) -> Option<DragSubject> {
        self.session.as_ref().map(|s| s.active)
    }

    /// Check if a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Begin a drag. Records the subject and, for cards, its position.
    ///
    /// An unfinished earlier drag is cancelled first, so its preview move
    /// is rolled back before the new origin is recorded.
    pub fn drag_start(&mut self, store: &mut BoardStore, active: DragSubject) {
        if let Some(previous) = self.session.take() {
            log::warn!("drag_start: cancelling unfinished drag of {}", previous.active.id);
            self.rollback(store, previous);
        }
        let origin = match active.kind {
            DragKind::Card => store.board(self.board_id).and_then(|b| b.locate_card(active.id)),
            DragKind::List => None,
        };
        self.session = Some(DragSession {
            active,
            origin,
            previewed: false,
        });
    }

    /// Live feedback while hovering.
    ///
    /// A card hovering over a list other than its own is moved to the end
    /// of that list. Lists get no live feedback.
    pub fn drag_over(&mut self, store: &mut BoardStore, active: DragSubject, over: Option<DragSubject>) {
        let Some(over) = over else {
            return;
        };
        if active.kind != DragKind::Card || over.kind != DragKind::List {
            return;
        }
        if self.move_card_to_list_end(store, active.id, over.id) {
            if let Some(session) = self.session.as_mut().filter(|s| s.active == active) {
                session.previewed = true;
            }
        }
    }

    /// Finish a drag and commit the drop.
    ///
    /// Without a drop target the drag counts as cancelled. The session is
    /// cleared whatever the outcome.
    pub fn drag_end(&mut self, store: &mut BoardStore, active: DragSubject, over: Option<DragSubject>) {
        let session = self.session.take();
        let Some(over) = over else {
            if let Some(session) = session {
                self.rollback(store, session);
            }
            return;
        };
        if over.id == active.id {
            return;
        }

        match (active.kind, over.kind) {
            (DragKind::List, DragKind::List) => {
                let Some(board) = store.board(self.board_id) else {
                    return;
                };
                let (Some(from), Some(to)) = (board.list_index(active.id), board.list_index(over.id)) else {
                    log::debug!("drag_end: list {} or {} not on board", active.id, over.id);
                    return;
                };
                store.reorder_list(self.board_id, from, to);
            }
            (DragKind::Card, DragKind::Card) => {
                let Some(board) = store.board(self.board_id) else {
                    return;
                };
                let (Some(source), Some(destination)) = (board.locate_card(active.id), board.locate_card(over.id)) else {
                    log::debug!("drag_end: card {} or {} not on board", active.id, over.id);
                    return;
                };
                store.reorder_card(self.board_id, source, destination);
            }
            (DragKind::Card, DragKind::List) => {
                self.move_card_to_list_end(store, active.id, over.id);
            }
            (DragKind::List, DragKind::Card) => {}
        }
    }

    /// Abort the drag, e.g. when the gesture library reports a cancel.
    pub fn drag_cancel(&mut self, store: &mut BoardStore) {
        if let Some(session) = self.session.take() {
            self.rollback(store, session);
        }
    }

    /// Undo the preview move of `session`.
    ///
    /// Only the dragged card is moved back to its origin; other edits made
    /// to the board during the drag are kept.
    fn rollback(&self, store: &mut BoardStore, session: DragSession) {
        if !self.config.rollback_on_cancel || !session.previewed {
            return;
        }
        let Some(origin) = session.origin else {
            return;
        };
        let Some(current) = store.board(self.board_id).and_then(|b| b.locate_card(session.active.id)) else {
            log::debug!("Card {} vanished during drag, nothing to roll back", session.active.id);
            return;
        };
        if current == origin {
            return;
        }
        log::debug!("Rolling back preview move of card {}", session.active.id);
        store.reorder_card(self.board_id, current, origin);
    }

    /// Returns true when the card was moved.
    fn move_card_to_list_end(&self, store: &mut BoardStore, card_id: EntityId, list_id: EntityId) -> bool {
        let Some(board) = store.board(self.board_id) else {
            return false;
        };
        let Some(source) = board.locate_card(card_id) else {
            return false;
        };
        if source.list_id == list_id {
            return false;
        }
        let Some(target) = board.list(list_id) else {
            return false;
        };
        let destination = CardLocation::new(list_id, target.cards.len());
        let version = store.version();
        store.reorder_card(self.board_id, source, destination);
        store.version() != version
    }
}
