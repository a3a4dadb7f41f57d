//! Gemini `generateContent` dialect (Google AI Studio, non-Vertex).

pub mod error;
pub mod prepare_tools;
pub mod provider;

pub mod gen_ai {
    pub mod prompt;
    pub mod stream;
}

pub use gen_ai::stream::GoogleChunk;
pub use provider::GoogleGenAiClient;

#[cfg(test)]
#[path = "../tests/prompt_tests.rs"]
mod prompt_tests;

#[cfg(test)]
#[path = "../tests/stream_tests.rs"]
mod stream_tests;
