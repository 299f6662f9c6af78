//! Built-in sample `sample://python/hello-world`

use crate::capability::{Capability, CapabilityBuilder};
use crate::error::RegistryError;

pub fn python_hello_world() -> Result<Capability, RegistryError> {
    CapabilityBuilder::sample("sample://python/hello-world")
        .name("python_hello_world")
        .description("Python Hello World 示例")
        .mime_type("text/plain")
        .text(r#"print("Hello, World!")"#)
        .build()
}

pub fn all() -> Result<Vec<Capability>, RegistryError> {
    Ok(vec![python_hello_world()?])
}
