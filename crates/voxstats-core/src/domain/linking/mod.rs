//! Account linking
//!
//! Maps a Discord account to the player it plays as, so commands can be
//! issued without naming the player each time.

pub mod link;
pub mod repository;

pub use link::PlayerLink;
pub use repository::LinkRepository;
