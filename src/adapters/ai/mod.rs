//! Generation backends implementing [`AIProvider`](crate::ports::AIProvider).

mod mock_provider;
mod openai_provider;

pub use mock_provider::MockAIProvider;
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
