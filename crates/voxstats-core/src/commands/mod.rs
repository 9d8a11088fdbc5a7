//! Commands module - all operations as library functions
//!
//! Commands resolve a Discord identity to its linked player and drive the
//! domain layer. They return typed outcomes; rendering is left to callers.

pub mod link;
pub mod session;
