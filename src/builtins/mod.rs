//! Capabilities the server registers at startup
//!
//! | Category | Key |
//! |---|---|
//! | tool | `file_read`, `file_write`, `web_search` |
//! | resource | `resource://system/info` |
//! | prompt | `code_review` |
//! | sample | `sample://python/hello-world` |

pub mod prompts;
pub mod resources;
pub mod samples;
pub mod tools;

use crate::dispatch::Dispatcher;
use crate::error::RegistryError;
use crate::registry::CapabilityRegistry;

/// Build the registry holding every built-in capability.
///
/// Fails on a duplicate key; callers treat that as fatal.
pub fn registry() -> Result<CapabilityRegistry, RegistryError> {
    let mut registry = CapabilityRegistry::new();
    for capability in tools::all()?
        .into_iter()
        .chain(resources::all()?)
        .chain(prompts::all()?)
        .chain(samples::all()?)
    {
        registry.register(capability)?;
    }
    Ok(registry)
}

/// A dispatcher over the built-in registry
pub fn dispatcher() -> Result<Dispatcher, RegistryError> {
    Ok(Dispatcher::new(registry()?).server_info("deepseek-mcp-server", env!("CARGO_PKG_VERSION")))
}
