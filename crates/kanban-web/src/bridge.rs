//! JSON command bridge between the presentation layer and the store.
//!
//! Commands are JSON objects tagged by `type`, e.g.
//! `{"type":"add_card","boardId":"…","listId":"…","title":"Fix bug"}`.
//! Titles are passed through verbatim; only blank titles are rejected.

use kanban_core::{
    BoardDocument, BoardStore, CardLocation, CardUpdate, DragSubject, EntityId,
    ReorderCoordinator, StorageError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to the presentation layer.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Invalid command: {0}")]
    InvalidCommand(#[source] serde_json::Error),
    #[error("Failed to encode reply: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Title must not be blank")]
    BlankTitle,
    #[error("No drag in progress")]
    NoDragSession,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// One store operation or gesture callback.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Command {
    AddBoard { title: String },
    SetCurrentBoard { id: EntityId },
    ClearCurrentBoard,
    UpdateBoardBackground { id: EntityId, color: String },
    DeleteBoard { id: EntityId },
    ReorderBoard { source_index: usize, dest_index: usize },
    AddList { board_id: EntityId, title: String },
    UpdateListTitle { board_id: EntityId, list_id: EntityId, title: String },
    DeleteList { board_id: EntityId, list_id: EntityId },
    ReorderList { board_id: EntityId, source_index: usize, dest_index: usize },
    AddCard { board_id: EntityId, list_id: EntityId, title: String },
    UpdateCard {
        board_id: EntityId,
        list_id: EntityId,
        card_id: EntityId,
        updates: CardUpdate,
    },
    ToggleCardCheck { board_id: EntityId, list_id: EntityId, card_id: EntityId },
    DeleteCard { board_id: EntityId, list_id: EntityId, card_id: EntityId },
    ReorderCard {
        board_id: EntityId,
        source: CardLocation,
        destination: CardLocation,
    },
    DragStart { board_id: EntityId, active: DragSubject },
    DragOver {
        active: DragSubject,
        #[serde(default)]
        over: Option<DragSubject>,
    },
    DragEnd {
        active: DragSubject,
        #[serde(default)]
        over: Option<DragSubject>,
    },
    DragCancel,
    Snapshot,
}

/// Result of a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Reply {
    /// An entity was created.
    Created { id: EntityId, version: u64 },
    /// The command ran; `version` is unchanged when it was a no-op.
    Committed { version: u64 },
    /// The current document.
    Snapshot { version: u64, document: BoardDocument },
}

/// Owns the store and the drag session of the board on screen.
#[derive(Debug)]
pub struct Bridge {
    store: BoardStore,
    drag: Option<ReorderCoordinator>,
}

impl Bridge {
    pub fn new(store: BoardStore) -> Self {
        Self { store, drag: None }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    /// Mutable access for subscriptions. Document changes still go through
    /// the store's operations.
    pub fn store_mut(&mut self) -> &mut BoardStore {
        &mut self.store
    }

    /// Check if a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.as_ref().is_some_and(ReorderCoordinator::is_dragging)
    }

    /// Parse, run and encode a JSON command.
    pub fn execute_json(&mut self, json: &str) -> Result<String, BridgeError> {
        let command: Command = serde_json::from_str(json).map_err(BridgeError::InvalidCommand)?;
        let reply = self.execute(command)?;
        serde_json::to_string(&reply).map_err(BridgeError::Encode)
    }

    /// Run a command against the store.
    pub fn execute(&mut self, command: Command) -> Result<Reply, BridgeError> {
        log::debug!("Executing {:?}", command);
        let store = &mut self.store;
        match command {
            Command::AddBoard { title } => {
                require_title(&title)?;
                let id = store.add_board(title);
                return Ok(Reply::Created { id, version: store.version() });
            }
            Command::SetCurrentBoard { id } => store.set_current_board(id),
            Command::ClearCurrentBoard => store.clear_current_board(),
            Command::UpdateBoardBackground { id, color } => store.update_board_background(id, color),
            Command::DeleteBoard { id } => {
                if self.drag.as_ref().is_some_and(|d| d.board_id() == id) {
                    self.drag = None;
                }
                store.delete_board(id);
            }
            Command::ReorderBoard { source_index, dest_index } => {
                store.reorder_board(source_index, dest_index);
            }
            Command::AddList { board_id, title } => {
                require_title(&title)?;
                if let Some(id) = store.add_list(board_id, title) {
                    return Ok(Reply::Created { id, version: store.version() });
                }
            }
            Command::UpdateListTitle { board_id, list_id, title } => {
                require_title(&title)?;
                store.update_list_title(board_id, list_id, title);
            }
            Command::DeleteList { board_id, list_id } => store.delete_list(board_id, list_id),
            Command::ReorderList { board_id, source_index, dest_index } => {
                store.reorder_list(board_id, source_index, dest_index);
            }
            Command::AddCard { board_id, list_id, title } => {
                require_title(&title)?;
                if let Some(id) = store.add_card(board_id, list_id, title) {
                    return Ok(Reply::Created { id, version: store.version() });
                }
            }
            Command::UpdateCard { board_id, list_id, card_id, updates } => {
                store.update_card(board_id, list_id, card_id, updates);
            }
            Command::ToggleCardCheck { board_id, list_id, card_id } => {
                store.toggle_card_check(board_id, list_id, card_id);
            }
            Command::DeleteCard { board_id, list_id, card_id } => {
                store.delete_card(board_id, list_id, card_id);
            }
            Command::ReorderCard { board_id, source, destination } => {
                store.reorder_card(board_id, source, destination);
            }
            Command::DragStart { board_id, active } => {
                if let Some(mut previous) = self.drag.take() {
                    log::warn!("drag_start: cancelling unfinished drag on board {}", previous.board_id());
                    previous.drag_cancel(store);
                }
                let mut drag = ReorderCoordinator::new(board_id, store.config().drag);
                drag.drag_start(store, active);
                self.drag = Some(drag);
            }
            Command::DragOver { active, over } => {
                let drag = self.drag.as_mut().ok_or(BridgeError::NoDragSession)?;
                drag.drag_over(store, active, over);
            }
            Command::DragEnd { active, over } => {
                let mut drag = self.drag.take().ok_or(BridgeError::NoDragSession)?;
                drag.drag_end(store, active, over);
            }
            Command::DragCancel => {
                if let Some(mut drag) = self.drag.take() {
                    drag.drag_cancel(store);
                }
            }
            Command::Snapshot => {
                return Ok(Reply::Snapshot {
                    version: store.version(),
                    document: store.document().clone(),
                });
            }
        }
        Ok(Reply::Committed { version: self.store.version() })
    }
}

fn require_title(title: &str) -> Result<(), BridgeError> {
    if title.trim().is_empty() {
        return Err(BridgeError::BlankTitle);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn run(bridge: &mut Bridge, command: Value) -> Value {
        init_logging();
        let reply = bridge.execute_json(&command.to_string()).unwrap();
        serde_json::from_str(&reply).unwrap()
    }

    fn created_id(reply: &Value) -> String {
        assert_eq!(reply["type"], "created");
        reply["id"].as_str().unwrap().to_string()
    }

    #[test]
    fn test_add_board_reply() {
        let mut bridge = Bridge::new(BoardStore::new());
        let reply = run(&mut bridge, json!({"type": "add_board", "title": "Sprint 1"}));

        let id: EntityId = created_id(&reply).parse().unwrap();
        assert_eq!(reply["version"], 1);
        assert_eq!(bridge.store().board(id).unwrap().title, "Sprint 1");
    }

    #[test]
    fn test_blank_titles_rejected() {
        init_logging();
        let mut bridge = Bridge::new(BoardStore::new());
        let result = bridge.execute(Command::AddBoard { title: "   ".to_string() });

        assert!(matches!(result, Err(BridgeError::BlankTitle)));
        assert_eq!(bridge.store().version(), 0);
    }

    #[test]
    fn test_titles_are_verbatim() {
        let mut bridge = Bridge::new(BoardStore::new());
        let reply = run(&mut bridge, json!({"type": "add_board", "title": "  Padded  "}));
        let id: EntityId = created_id(&reply).parse().unwrap();

        assert_eq!(bridge.store().board(id).unwrap().title, "  Padded  ");
    }

    #[test]
    fn test_camel_case_fields() {
        let mut bridge = Bridge::new(BoardStore::new());
        let board = created_id(&run(&mut bridge, json!({"type": "add_board", "title": "B"})));
        let list = created_id(&run(&mut bridge, json!({"type": "add_list", "boardId": board, "title": "Todo"})));
        let card = created_id(&run(
            &mut bridge,
            json!({"type": "add_card", "boardId": board, "listId": list, "title": "Fix bug"}),
        ));

        run(
            &mut bridge,
            json!({
                "type": "update_card",
                "boardId": board,
                "listId": list,
                "cardId": card,
                "updates": {"description": "from the UI"}
            }),
        );

        let snapshot = run(&mut bridge, json!({"type": "snapshot"}));
        let stored = &snapshot["document"]["boards"][0]["lists"][0]["cards"][0];
        assert_eq!(stored["description"], "from the UI");
        assert_eq!(stored["title"], "Fix bug");
    }

    #[test]
    fn test_noop_keeps_version() {
        let mut bridge = Bridge::new(BoardStore::new());
        run(&mut bridge, json!({"type": "add_board", "title": "B"}));

        let missing = kanban_core::model::new_entity_id();
        let reply = run(&mut bridge, json!({"type": "delete_board", "id": missing}));
        assert_eq!(reply, json!({"type": "committed", "version": 1}));
    }

    #[test]
    fn test_drag_commands() {
        let mut bridge = Bridge::new(BoardStore::new());
        let board = created_id(&run(&mut bridge, json!({"type": "add_board", "title": "B"})));
        let todo = created_id(&run(&mut bridge, json!({"type": "add_list", "boardId": board, "title": "Todo"})));
        let done = created_id(&run(&mut bridge, json!({"type": "add_list", "boardId": board, "title": "Done"})));
        let card = created_id(&run(
            &mut bridge,
            json!({"type": "add_card", "boardId": board, "listId": todo, "title": "X"}),
        ));

        let active = json!({"kind": "card", "id": card});
        run(&mut bridge, json!({"type": "drag_start", "boardId": board, "active": active}));
        assert!(bridge.is_dragging());
        run(
            &mut bridge,
            json!({"type": "drag_over", "active": active, "over": {"kind": "list", "id": done}}),
        );
        run(&mut bridge, json!({"type": "drag_end", "active": active, "over": active}));

        assert!(!bridge.is_dragging());
        let board_id: EntityId = board.parse().unwrap();
        let done_id: EntityId = done.parse().unwrap();
        let stored = bridge.store().board(board_id).unwrap().list(done_id).unwrap();
        assert_eq!(stored.cards.len(), 1);
        assert_eq!(stored.cards[0].title, "X");
    }

    #[test]
    fn test_drag_without_start() {
        let mut bridge = Bridge::new(BoardStore::new());
        let card = kanban_core::model::new_entity_id();
        let result = bridge.execute(Command::DragEnd {
            active: DragSubject::card(card),
            over: None,
        });

        assert!(matches!(result, Err(BridgeError::NoDragSession)));
    }

    #[test]
    fn test_malformed_command() {
        let mut bridge = Bridge::new(BoardStore::new());
        let result = bridge.execute_json(r#"{"type":"launch_rocket"}"#);

        assert!(matches!(result, Err(BridgeError::InvalidCommand(_))));
    }

    #[test]
    fn test_commands_during_drag_survive_cancel() {
        let mut bridge = Bridge::new(BoardStore::new());
        let board = created_id(&run(&mut bridge, json!({"type": "add_board", "title": "B"})));
        let todo = created_id(&run(&mut bridge, json!({"type": "add_list", "boardId": board, "title": "Todo"})));
        let done = created_id(&run(&mut bridge, json!({"type": "add_list", "boardId": board, "title": "Done"})));
        let card = created_id(&run(
            &mut bridge,
            json!({"type": "add_card", "boardId": board, "listId": todo, "title": "A"}),
        ));

        let active = json!({"kind": "card", "id": card});
        run(&mut bridge, json!({"type": "drag_start", "boardId": board, "active": active}));
        run(
            &mut bridge,
            json!({"type": "drag_over", "active": active, "over": {"kind": "list", "id": done}}),
        );
        run(&mut bridge, json!({"type": "add_card", "boardId": board, "listId": todo, "title": "New"}));
        run(&mut bridge, json!({"type": "add_list", "boardId": board, "title": "Later"}));
        run(&mut bridge, json!({"type": "drag_end", "active": active}));

        let board_id: EntityId = board.parse().unwrap();
        let todo_id: EntityId = todo.parse().unwrap();
        let stored = bridge.store().board(board_id).unwrap();
        assert_eq!(stored.lists.len(), 3);
        let titles: Vec<&str> = stored.list(todo_id).unwrap().cards.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "New"]);
    }

    #[test]
    fn test_second_drag_start_cancels_first() {
        let mut bridge = Bridge::new(BoardStore::new());
        let board = created_id(&run(&mut bridge, json!({"type": "add_board", "title": "B"})));
        let todo = created_id(&run(&mut bridge, json!({"type": "add_list", "boardId": board, "title": "Todo"})));
        let done = created_id(&run(&mut bridge, json!({"type": "add_list", "boardId": board, "title": "Done"})));
        let card = created_id(&run(
            &mut bridge,
            json!({"type": "add_card", "boardId": board, "listId": todo, "title": "A"}),
        ));
        let before = bridge.store().document().clone();

        let active = json!({"kind": "card", "id": card});
        run(&mut bridge, json!({"type": "drag_start", "boardId": board, "active": active}));
        run(
            &mut bridge,
            json!({"type": "drag_over", "active": active, "over": {"kind": "list", "id": done}}),
        );
        run(&mut bridge, json!({"type": "drag_start", "boardId": board, "active": active}));
        run(&mut bridge, json!({"type": "drag_end", "active": active}));

        assert_eq!(bridge.store().document(), &before);
        assert!(!bridge.is_dragging());
    }
}
