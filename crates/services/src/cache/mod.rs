mod poll;
mod store;
mod topic;

// Public API of the cache subsystem.
pub use poll::PollTask;
pub use store::{QueryCache, QueryPolicy};
pub use topic::{PROGRESS_TOPICS, Topic};
