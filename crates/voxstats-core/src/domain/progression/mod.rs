//! Level progression math
//!
//! - `curve`: experience needed to advance past a single level
//! - `accumulator`: lifetime experience and the gain between two snapshots

pub mod accumulator;
pub mod curve;

pub use accumulator::{
    EXPERIENCE_PER_STAR, ProgressionDelta, experience_and_progress_delta, total_experience,
};
pub use curve::experience_required;
