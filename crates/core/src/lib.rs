pub mod error;
pub mod host;
pub mod logging;
pub mod message_adapter;
pub mod remediation;
pub mod stream_adapter;
pub mod tools;
pub mod transport;
pub mod upstream;

pub use crate::core::error::{SdkError, TransportError};
pub use crate::core::host::{
    CollectingSink, CommandRunner, ConfigSource, JsonConfigSource, MemorySecretStore,
    ProgressSink, PromptKind, SecretStore, UserPrompt,
};
pub use crate::core::logging::{LogLevel, Logger, MemoryLogger, TracingLogger};
pub use crate::core::message_adapter::{translate, translate_conversation};
pub use crate::core::remediation::{
    remediation_channel, RemediationFlow, RemediationOutcome, RemediationRequest,
    RemediationSender,
};
pub use crate::core::stream_adapter::{HostServices, StreamAdapter, VendorConfig};
pub use crate::core::tools::{gemini_tool_name, normalize_tools, NormalizedTools};
pub use crate::core::transport::{merge_headers, ByteStream, HttpTransport, TransportConfig};
pub use crate::core::upstream::{EventStream, UpstreamClient, UpstreamRequest};

#[cfg(test)]
#[path = "../tests/message_adapter_tests.rs"]
mod message_adapter_tests;
#[cfg(test)]
#[path = "../tests/stream_adapter_tests.rs"]
mod stream_adapter_tests;
#[cfg(test)]
#[path = "../tests/remediation_tests.rs"]
mod remediation_tests;
