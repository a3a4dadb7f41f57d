//! Chat Completions dialect shared by OpenAI, Groq and OpenRouter.

pub mod error;
pub mod provider;
mod stream;
pub mod chat {
    pub mod convert;
    pub mod prepare_tools;
}

pub use provider::{build_chat_request_body, OpenAICompatibleChatClient};
pub use stream::{map_openai_compatible_finish_reason, OpenAICompatibleChatChunk};

#[cfg(test)]
#[path = "../tests/chat_convert_tests.rs"]
mod chat_convert_tests;

#[cfg(test)]
#[path = "../tests/stream_tests.rs"]
mod stream_tests;

#[cfg(test)]
#[path = "../tests/chat_client_tests.rs"]
mod chat_client_tests;
