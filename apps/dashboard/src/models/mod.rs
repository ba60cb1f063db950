pub mod feedback;
pub mod job_match;
pub mod resume;
pub mod user;

pub use feedback::{FeedbackRecord, FeedbackValue};
pub use job_match::{JobMatch, MatchDocument};
pub use user::UserIdentity;
