pub mod api;
pub mod models;

pub use api::Caller;
pub use models::{Message, ReadState, User, UserSummary};
