pub mod persisting_review_handler;
pub mod transient_review_handler;

pub use persisting_review_handler::PersistingReviewHandler;
pub use transient_review_handler::TransientReviewHandler;
