//! The board store: sole owner of the document and its mutation operations.
//!
//! Every mutation works on a private copy of the current snapshot and, if
//! anything changed, commits the copy as a new `Arc<BoardDocument>`. Readers
//! holding an earlier snapshot keep seeing that version unchanged. After a
//! commit the document is persisted (when a storage backend is attached) and
//! subscribers are notified with the new snapshot.
//!
//! Operations addressed at a board, list or card that does not exist are
//! silent no-ops: nothing is committed, saved or broadcast.

use crate::config::KanbanConfig;
use crate::model::{Board, BoardDocument, Card, CardLocation, CardUpdate, EntityId, List};
use crate::reorder::{move_card, move_item, sort_by_check_state};
use crate::storage::{PersistenceManager, Storage, StorageResult, create_default_storage};
use std::fmt;
use std::sync::Arc;

/// Handle returned by [`BoardStore::subscribe`].
pub type SubscriptionId = u64;

type Subscriber = Box<dyn FnMut(&Arc<BoardDocument>)>;

/// Owns the board document and exposes the mutation operation set.
pub struct BoardStore {
    document: Arc<BoardDocument>,
    version: u64,
    config: KanbanConfig,
    persistence: Option<PersistenceManager>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: SubscriptionId,
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardStore")
            .field("version", &self.version)
            .field("boards", &self.document.boards.len())
            .field("persistent", &self.persistence.is_some())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl BoardStore {
    /// Create an in-memory store with an empty document.
    pub fn new() -> Self {
        Self::with_config(KanbanConfig::default())
    }

    /// Create an in-memory store with the given configuration.
    pub fn with_config(config: KanbanConfig) -> Self {
        Self::with_document(BoardDocument::new(), config)
    }

    /// Create an in-memory store seeded with an existing document.
    pub fn with_document(document: BoardDocument, config: KanbanConfig) -> Self {
        Self {
            document: Arc::new(document),
            version: 0,
            config,
            persistence: None,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Open a store backed by `storage`.
    ///
    /// The document is loaded from the configured key; a missing or
    /// malformed blob yields an empty document. Every committed mutation is
    /// written back under the same key.
    pub fn open(storage: Arc<dyn Storage>, config: KanbanConfig) -> Self {
        let mut persistence = PersistenceManager::new(storage, config.storage_key.clone());
        let document = persistence.load();
        log::info!(
            "Opened board store with {} board(s) from '{}'",
            document.boards.len(),
            persistence.key()
        );

        let mut store = Self::with_document(document, config);
        store.persistence = Some(persistence);
        store
    }

    /// Open a store on the platform's default storage: the local data
    /// directory on native targets, `localStorage` in the browser.
    pub fn open_default(config: KanbanConfig) -> StorageResult<Self> {
        let storage = create_default_storage()?;
        Ok(Self::open(storage, config))
    }

    // --- Read access ---

    /// Current committed snapshot.
    pub fn snapshot(&self) -> Arc<BoardDocument> {
        Arc::clone(&self.document)
    }

    /// Borrow the current document.
    pub fn document(&self) -> &BoardDocument {
        &self.document
    }

    /// Number of versions committed since the store was created.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The store configuration.
    pub fn config(&self) -> &KanbanConfig {
        &self.config
    }

    /// All boards in display order.
    pub fn boards(&self) -> &[Board] {
        &self.document.boards
    }

    /// Get a board by ID.
    pub fn board(&self, id: EntityId) -> Option<&Board> {
        self.document.board(id)
    }

    /// The current-board pointer, which may be dangling.
    pub fn current_board_id(&self) -> Option<EntityId> {
        self.document.current_board
    }

    /// The current board, or `None` when no board is selected or the pointer
    /// no longer resolves.
    pub fn current_board(&self) -> Option<&Board> {
        self.document.current()
    }

    /// Persistence state, when a storage backend is attached.
    pub fn persistence(&self) -> Option<&PersistenceManager> {
        self.persistence.as_ref()
    }

    // --- Subscriptions ---

    /// Register a callback invoked with each newly committed snapshot.
    pub fn subscribe(&mut self, callback: impl FnMut(&Arc<BoardDocument>) + 'static) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    // --- Boards ---

    /// Append a board with the default background color. Returns its ID.
    pub fn add_board(&mut self, title: impl Into<String>) -> EntityId {
        let board = Board::new(title, self.config.default_background_color.clone());
        let id = board.id;
        self.commit_with("add_board", |doc| {
            doc.boards.push(board);
            true
        });
        id
    }

    /// Point the current board at `id`. Existence is not checked.
    pub fn set_current_board(&mut self, id: EntityId) {
        self.commit_with("set_current_board", |doc| {
            if doc.current_board == Some(id) {
                return false;
            }
            doc.current_board = Some(id);
            true
        });
    }

    /// Clear the current-board pointer.
    pub fn clear_current_board(&mut self) {
        self.commit_with("clear_current_board", |doc| doc.current_board.take().is_some());
    }

    /// Set a board's background color.
    pub fn update_board_background(&mut self, id: EntityId, color: impl Into<String>) {
        let color = color.into();
        self.commit_with("update_board_background", |doc| {
            let Some(board) = doc.board_mut(id) else {
                return false;
            };
            board.background_color = color;
            true
        });
    }

    /// Remove a board with all of its lists and cards.
    ///
    /// Clears the current-board pointer if it referenced this board.
    pub fn delete_board(&mut self, id: EntityId) {
        self.commit_with("delete_board", |doc| {
            let before = doc.boards.len();
            doc.boards.retain(|board| board.id != id);
            if doc.boards.len() == before {
                return false;
            }
            if doc.current_board == Some(id) {
                doc.current_board = None;
            }
            true
        });
    }

    /// Move the board at `source_index` to `dest_index`.
    pub fn reorder_board(&mut self, source_index: usize, dest_index: usize) {
        self.commit_with("reorder_board", |doc| {
            move_item(&mut doc.boards, source_index, dest_index)
        });
    }

    // --- Lists ---

    /// Append an empty list to a board. Returns its ID, or `None` when the
    /// board does not exist.
    pub fn add_list(&mut self, board_id: EntityId, title: impl Into<String>) -> Option<EntityId> {
        let list = List::new(title);
        let id = list.id;
        self.commit_with("add_list", |doc| {
            let Some(board) = doc.board_mut(board_id) else {
                return false;
            };
            board.lists.push(list);
            true
        })
        .then_some(id)
    }

    /// Rename a list.
    pub fn update_list_title(&mut self, board_id: EntityId, list_id: EntityId, title: impl Into<String>) {
        let title = title.into();
        self.commit_with("update_list_title", |doc| {
            let Some(list) = doc.board_mut(board_id).and_then(|b| b.list_mut(list_id)) else {
                return false;
            };
            list.title = title;
            true
        });
    }

    /// Remove a list with all of its cards.
    pub fn delete_list(&mut self, board_id: EntityId, list_id: EntityId) {
        self.commit_with("delete_list", |doc| {
            let Some(board) = doc.board_mut(board_id) else {
                return false;
            };
            let before = board.lists.len();
            board.lists.retain(|list| list.id != list_id);
            board.lists.len() != before
        });
    }

    /// Move the list at `source_index` to `dest_index` within a board.
    pub fn reorder_list(&mut self, board_id: EntityId, source_index: usize, dest_index: usize) {
        self.commit_with("reorder_list", |doc| {
            let Some(board) = doc.board_mut(board_id) else {
                log::warn!("reorder_list: board {} not found", board_id);
                return false;
            };
            move_item(&mut board.lists, source_index, dest_index)
        });
    }

    // --- Cards ---

    /// Append a card to a list. Its `order` hint is the list's current
    /// length. Returns the card's ID, or `None` when the board or list does
    /// not exist.
    pub fn add_card(
        &mut self,
        board_id: EntityId,
        list_id: EntityId,
        title: impl Into<String>,
    ) -> Option<EntityId> {
        let mut card = Card::new(title, 0);
        let id = card.id;
        self.commit_with("add_card", |doc| {
            let Some(list) = doc.board_mut(board_id).and_then(|b| b.list_mut(list_id)) else {
                return false;
            };
            card.order = list.cards.len() as i64;
            list.cards.push(card);
            true
        })
        .then_some(id)
    }

    /// Merge a partial update into a card.
    pub fn update_card(
        &mut self,
        board_id: EntityId,
        list_id: EntityId,
        card_id: EntityId,
        updates: CardUpdate,
    ) {
        self.commit_with("update_card", |doc| {
            let Some(card) = doc
                .board_mut(board_id)
                .and_then(|b| b.list_mut(list_id))
                .and_then(|l| l.card_mut(card_id))
            else {
                return false;
            };
            updates.apply_to(card);
            true
        });
    }

    /// Flip a card's checked flag and regroup its list so unchecked cards
    /// come first, each group ordered by the `order` hint.
    pub fn toggle_card_check(&mut self, board_id: EntityId, list_id: EntityId, card_id: EntityId) {
        self.commit_with("toggle_card_check", |doc| {
            let Some(list) = doc.board_mut(board_id).and_then(|b| b.list_mut(list_id)) else {
                return false;
            };
            let Some(card) = list.card_mut(card_id) else {
                return false;
            };
            card.checked = !card.checked;
            sort_by_check_state(&mut list.cards);
            true
        });
    }

    /// Remove a card from its list.
    pub fn delete_card(&mut self, board_id: EntityId, list_id: EntityId, card_id: EntityId) {
        self.commit_with("delete_card", |doc| {
            let Some(list) = doc.board_mut(board_id).and_then(|b| b.list_mut(list_id)) else {
                return false;
            };
            let before = list.cards.len();
            list.cards.retain(|card| card.id != card_id);
            list.cards.len() != before
        });
    }

    /// Move a card within or across lists of one board.
    ///
    /// A destination index at or past the end of the target list appends.
    pub fn reorder_card(&mut self, board_id: EntityId, source: CardLocation, destination: CardLocation) {
        self.commit_with("reorder_card", |doc| {
            let Some(board) = doc.board_mut(board_id) else {
                log::warn!("reorder_card: board {} not found", board_id);
                return false;
            };
            move_card(board, source, destination)
        });
    }

    // --- Commit pipeline ---

    /// Apply `op` to a copy of the document and commit it if it reports a change.
    fn commit_with<F>(&mut self, name: &str, op: F) -> bool
    where
        F: FnOnce(&mut BoardDocument) -> bool,
    {
        let mut next = BoardDocument::clone(&self.document);
        if !op(&mut next) {
            log::debug!("{}: document unchanged", name);
            return false;
        }

        self.document = Arc::new(next);
        self.version += 1;
        log::debug!("{}: committed version {}", name, self.version);

        self.persist();
        for (_, callback) in &mut self.subscribers {
            callback(&self.document);
        }
        true
    }

    fn persist(&mut self) {
        let Some(persistence) = self.persistence.as_mut() else {
            return;
        };
        persistence.mark_dirty();
        if let Err(e) = persistence.save(&self.document) {
            // Stays dirty; the next commit writes the full document again.
            log::error!("Failed to persist version {}: {}", self.version, e);
        }
    }
}
