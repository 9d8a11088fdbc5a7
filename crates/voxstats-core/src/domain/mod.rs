//! Domain modules
//!
//! - `player`: player identifier
//! - `progression`: level curve and experience accounting
//! - `stats`: stat snapshots and the sources that produce them
//! - `session`: per-slot tracking sessions and their reports
//! - `linking`: Discord account to player links

pub mod linking;
pub mod player;
pub mod progression;
pub mod session;
pub mod stats;
