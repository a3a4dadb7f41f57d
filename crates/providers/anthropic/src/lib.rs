//! Anthropic Messages dialect.
//!
//! - api_types.rs: request wire types
//! - error.rs: HTTP and in-band error mapping
//! - messages/convert.rs: `UpstreamRequest` to Messages body
//! - messages/stream.rs: SSE frames to `StreamEvent`s
//! - provider.rs: headers and the streaming client

pub mod api_types;
pub mod error;
pub mod messages {
    pub mod convert;
    pub mod stream;
}
pub mod provider;

pub use messages::stream::AnthropicChunk;
pub use provider::AnthropicMessagesClient;

#[cfg(test)]
#[path = "../tests/messages_convert_tests.rs"]
mod messages_convert_tests;

#[cfg(test)]
#[path = "../tests/messages_stream_tests.rs"]
mod messages_stream_tests;

#[cfg(test)]
#[path = "../tests/provider_headers_tests.rs"]
mod provider_headers_tests;
