//! Ranked, filtered, paginated table projection for sales pipeline views
//! (leads, prospects, opportunities, companies, people, and the daily
//! Speedrun call list).
//!
//! Everything here is a pure transform over records the host has already
//! fetched. The only side effect is logging through the `log` facade.

pub mod columns;
pub mod completion;
pub mod config;
mod error;
pub mod projector;
pub mod rank;
pub mod search;
pub mod sort;
pub mod summary;
pub mod timing;
pub mod types;
pub mod update;

pub use error::{ErrorType, ProjectionError, ProjectionErrorPayload};
pub use projector::{ProjectionContext, ProjectionRequest, RankedListProjector};
pub use types::{ActionSummary, ColorToken, Projection, Record, Section, ViewRow};
