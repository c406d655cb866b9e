pub mod add_review_command;

pub use add_review_command::AddReviewCommand;
