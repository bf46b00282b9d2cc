//! Interview content adapters.

mod charter_questions;

pub use charter_questions::CharterQuestionProvider;
