//! Board, list and card data structures.
//!
//! The serialized field names are part of the persisted format and must stay
//! stable: `id`, `title`, `backgroundColor`, `lists`, `cards`, `description`,
//! `checked`, `order` and `currentBoard`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier shared by boards, lists and cards.
pub type EntityId = Uuid;

/// Background color given to newly created boards.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#f0f0f0";

/// Generate a fresh, globally unique entity identifier.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// A single task on a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub checked: bool,
    /// Position hint within the owning list, used as the secondary sort key
    /// when cards are regrouped by check state.
    pub order: i64,
}

impl Card {
    /// Create an unchecked card with an empty description.
    pub fn new(title: impl Into<String>, order: i64) -> Self {
        Self {
            id: new_entity_id(),
            title: title.into(),
            description: String::new(),
            checked: false,
            order,
        }
    }
}

/// A named column of cards. Sequence order is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: EntityId,
    pub title: String,
    pub cards: Vec<Card>,
}

impl List {
    /// Create an empty list.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            title: title.into(),
            cards: Vec::new(),
        }
    }

    /// Get a card by ID.
    pub fn card(&self, id: EntityId) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }

    /// Get a mutable reference to a card by ID.
    pub fn card_mut(&mut self, id: EntityId) -> Option<&mut Card> {
        self.cards.iter_mut().find(|card| card.id == id)
    }

    /// Position of a card within this list.
    pub fn card_index(&self, id: EntityId) -> Option<usize> {
        self.cards.iter().position(|card| card.id == id)
    }
}

/// A kanban workspace: an ordered sequence of lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: EntityId,
    pub title: String,
    pub background_color: String,
    pub lists: Vec<List>,
}

impl Board {
    /// Create a board with no lists.
    pub fn new(title: impl Into<String>, background_color: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            title: title.into(),
            background_color: background_color.into(),
            lists: Vec::new(),
        }
    }

    /// Number of lists on the board.
    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    /// Total number of cards across all lists.
    pub fn card_count(&self) -> usize {
        self.lists.iter().map(|list| list.cards.len()).sum()
    }

    /// Get a list by ID.
    pub fn list(&self, id: EntityId) -> Option<&List> {
        self.lists.iter().find(|list| list.id == id)
    }

    /// Get a mutable reference to a list by ID.
    pub fn list_mut(&mut self, id: EntityId) -> Option<&mut List> {
        self.lists.iter_mut().find(|list| list.id == id)
    }

    /// Position of a list within this board.
    pub fn list_index(&self, id: EntityId) -> Option<usize> {
        self.lists.iter().position(|list| list.id == id)
    }

    /// Find the list holding a card and the card's index in it.
    pub fn locate_card(&self, card_id: EntityId) -> Option<CardLocation> {
        self.lists.iter().find_map(|list| {
            list.card_index(card_id)
                .map(|index| CardLocation::new(list.id, index))
        })
    }

    /// Get a card anywhere on the board.
    pub fn find_card(&self, card_id: EntityId) -> Option<&Card> {
        self.lists.iter().find_map(|list| list.card(card_id))
    }
}

/// Position of a card: owning list and index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLocation {
    pub list_id: EntityId,
    pub index: usize,
}

impl CardLocation {
    pub fn new(list_id: EntityId, index: usize) -> Self {
        Self { list_id, index }
    }
}

/// Partial card update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl CardUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = Some(checked);
        self
    }

    pub fn order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Check if the update carries no fields.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.checked.is_none()
            && self.order.is_none()
    }

    /// Merge the present fields into a card.
    pub fn apply_to(&self, card: &mut Card) {
        if let Some(title) = &self.title {
            card.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            card.description.clone_from(description);
        }
        if let Some(checked) = self.checked {
            card.checked = checked;
        }
        if let Some(order) = self.order {
            card.order = order;
        }
    }
}

/// The whole persisted document: every board plus the current-board pointer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDocument {
    pub boards: Vec<Board>,
    /// Board shown in the main view. Serialized as `""` when unset.
    #[serde(default, with = "current_board_serde")]
    pub current_board: Option<EntityId>,
}

impl BoardDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a board by ID.
    pub fn board(&self, id: EntityId) -> Option<&Board> {
        self.boards.iter().find(|board| board.id == id)
    }

    /// Get a mutable reference to a board by ID.
    pub fn board_mut(&mut self, id: EntityId) -> Option<&mut Board> {
        self.boards.iter_mut().find(|board| board.id == id)
    }

    /// Position of a board in the top-level sequence.
    pub fn board_index(&self, id: EntityId) -> Option<usize> {
        self.boards.iter().position(|board| board.id == id)
    }

    /// The current board, or `None` when unset or dangling.
    pub fn current(&self) -> Option<&Board> {
        self.current_board.and_then(|id| self.board(id))
    }

    /// Check whether any board, list or card uses this ID.
    pub fn contains_id(&self, id: EntityId) -> bool {
        self.boards.iter().any(|board| {
            board.id == id
                || board.lists.iter().any(|list| {
                    list.id == id || list.cards.iter().any(|card| card.id == id)
                })
        })
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

mod current_board_serde {
    use super::EntityId;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(id: &Option<EntityId>, serializer: S) -> Result<S::Ok, S::Error> {
        match id {
            Some(id) => serializer.collect_str(id),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<EntityId>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        let mut board = Board::new("Sprint 1", DEFAULT_BACKGROUND_COLOR);
        let mut todo = List::new("Todo");
        todo.cards.push(Card::new("Fix bug", 0));
        todo.cards.push(Card::new("Write docs", 1));
        board.lists.push(todo);
        board.lists.push(List::new("Done"));
        board
    }

    #[test]
    fn test_card_defaults() {
        let card = Card::new("Fix bug", 3);
        assert_eq!(card.title, "Fix bug");
        assert!(card.description.is_empty());
        assert!(!card.checked);
        assert_eq!(card.order, 3);
    }

    #[test]
    fn test_board_counts() {
        let board = sample_board();
        assert_eq!(board.list_count(), 2);
        assert_eq!(board.card_count(), 2);
    }

    #[test]
    fn test_locate_card() {
        let board = sample_board();
        let todo = &board.lists[0];
        let docs_id = todo.cards[1].id;

        let location = board.locate_card(docs_id).unwrap();
        assert_eq!(location, CardLocation::new(todo.id, 1));
        assert!(board.locate_card(new_entity_id()).is_none());
    }

    #[test]
    fn test_card_update_merges_present_fields() {
        let mut card = Card::new("Old", 0);
        CardUpdate::new()
            .title("New")
            .checked(true)
            .apply_to(&mut card);

        assert_eq!(card.title, "New");
        assert!(card.checked);
        assert!(card.description.is_empty());
        assert_eq!(card.order, 0);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut doc = BoardDocument::new();
        doc.boards.push(sample_board());
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        assert_eq!(json["currentBoard"], "");
        let board = &json["boards"][0];
        assert_eq!(board["backgroundColor"], DEFAULT_BACKGROUND_COLOR);
        let card = &board["lists"][0]["cards"][0];
        for field in ["id", "title", "description", "checked", "order"] {
            assert!(card.get(field).is_some(), "missing card field {field}");
        }
    }

    #[test]
    fn test_json_round_trip() {
        let mut doc = BoardDocument::new();
        doc.boards.push(sample_board());
        doc.boards.push(Board::new("Sprint 2", "#ffcc00"));
        doc.current_board = Some(doc.boards[1].id);

        let restored = BoardDocument::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_missing_current_board_defaults_to_none() {
        let doc = BoardDocument::from_json(r#"{"boards":[]}"#).unwrap();
        assert!(doc.current_board.is_none());
    }

    #[test]
    fn test_dangling_current_board() {
        let mut doc = BoardDocument::new();
        doc.current_board = Some(new_entity_id());
        assert!(doc.current().is_none());
    }
}
