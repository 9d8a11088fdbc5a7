//! Session domain module
//!
//! Tracks a player's progress over a window of play.
//!
//! # Architecture
//!
//! - **Entities**: `Session`, `SessionSlot`
//! - **Repository**: `SessionRepository` for database operations
//! - **Store**: `SessionStore` for the create/reset/end lifecycle
//! - **Reporter**: `SessionReporter` for live-minus-baseline reports
//!
//! # Example
//!
//! ```ignore
//! use voxstats_core::domain::session::{SessionSlot, SessionStore};
//!
//! let store = SessionStore::new(pool.clone(), source);
//!
//! store.create(&player, SessionSlot::One).await?;
//!
//! // View before resetting; reset discards the old baseline
//! let report = store.reporter().build_report(&player, SessionSlot::One).await?;
//! store.reset(&player, SessionSlot::One).await?;
//!
//! store.end(&player, SessionSlot::One).await?;
//! ```

pub mod report;
pub mod repository;
pub mod session;
pub mod store;

pub use report::{SessionReport, SessionReporter};
pub use repository::SessionRepository;
pub use session::{Session, SessionSlot};
pub use store::SessionStore;
