mod review_vm;

pub use review_vm::{ReviewIntent, ReviewOutcome, ReviewVm, intent_for_key, start_review};
