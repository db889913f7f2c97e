//! Kanban Core Library
//!
//! Platform-agnostic data model, board store and drag-and-drop reordering
//! for the kanban board editor.

pub mod config;
pub mod drag;
pub mod model;
pub mod reorder;
pub mod storage;
pub mod store;

pub use config::{DragConfig, KanbanConfig, DEFAULT_STORAGE_KEY};
pub use drag::{DragKind, DragSubject, ReorderCoordinator};
pub use model::{Board, BoardDocument, Card, CardLocation, CardUpdate, EntityId, List};
pub use storage::{MemoryStorage, PersistenceManager, Storage, StorageError, StorageResult};
pub use store::{BoardStore, SubscriptionId};
