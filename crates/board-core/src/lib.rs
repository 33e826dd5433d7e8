//! Board Core
//!
//! Host-testable logic behind the Ambis board client: models, column
//! grouping, the drag reorder engine, the board cache, the local overlay and
//! activity timeline, and the `BoardClient` that ties them to a `BoardApi`.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod grouping;
pub mod guard;
pub mod model;
pub mod overlay;
pub mod realtime;
pub mod reorder;
pub mod session;
pub mod timeline;
pub mod validation;

pub use api::{BoardApi, REGISTER_PATHS};
pub use cache::{BoardCache, CacheKey};
pub use client::{BoardClient, DropOutcome};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use grouping::{BoardView, ColumnGroup, ColumnTone};
pub use model::*;
pub use overlay::{KeyValueStore, MemoryStore, Note, TimelineEvent};
pub use realtime::{ClientFrame, ServerEvent};
pub use reorder::{DragLocation, DragResult, MoveIntent};
pub use session::Session;
pub use timeline::{DayGroup, EntryKind, FeedEntry};
pub use validation::FieldErrors;
