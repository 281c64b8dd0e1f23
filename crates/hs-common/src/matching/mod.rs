pub mod location;
pub mod pipeline;
pub mod salary;
pub mod scoring;
pub mod skills;
pub mod weights;

pub use pipeline::{BatchReport, MatchingError, MatchingService, SkipReason};
pub use scoring::{ALGORITHM_VERSION, MatchDetails, MatchScore, Scorer};
pub use weights::{DEFAULT_WEIGHTS, Weights};

/// Minimum total score that triggers a high-match notification.
pub const MATCH_THRESHOLD: i32 = 70;
