pub mod persistence;
pub mod transcript;
pub mod types;

pub use transcript::Transcript;
pub use types::{Message, Speaker};
