// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod aggregate;
pub mod api;
pub mod calendar;
pub mod ingest;
pub mod matcher;
pub mod metrics;
pub mod roster;
pub mod severity;

// ---- Re-exports for stable public API ----
pub use crate::aggregate::{aggregate, AlertStatus, ArticleMention, RiderAlert};
pub use crate::api::{create_router, AppState};
pub use crate::calendar::{calendar, project, Projection, RaceEntry};
pub use crate::ingest::types::{Article, FeedStatus};
pub use crate::roster::Rider;
pub use crate::severity::{classify, is_injury_text, SeverityTier};
