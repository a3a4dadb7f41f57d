//! Vendor registry and extension lifecycle for copilot-boost.
//!
//! `vendors` holds the five static vendor records. `extension` turns them into
//! stream adapters at activation and owns the remediation task. `commands`
//! implements the key-management commands and `diagnostics` the smoke checks
//! run from the host's test commands.

pub mod commands;
pub mod diagnostics;
pub mod extension;
pub mod vendors;

pub use commands::{KeyCommand, KeyCommandError, KeychainReader, SecurityCliKeychain};
pub use diagnostics::{select_chat_models, smoke_test, smoke_test_all, ChatModelSelector, SmokeReport};
pub use extension::{BoostExtension, BoostHost};
pub use vendors::{registrations, Dialect, VendorRegistration};

#[cfg(test)]
#[path = "../tests/extension_tests.rs"]
mod extension_tests;
