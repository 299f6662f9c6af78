//! Capability definition and builder API
//!
//! A [`Capability`] is the registered form of a tool, resource, prompt
//! template or sample: public metadata, an input contract (JSON Schema) and a
//! handler. Handlers are usually written as typed async closures; the input
//! contract is derived from the argument type with `schemars`.
//!
//! ```rust
//! use deepseek_mcp::{CapabilityBuilder, CapabilityResult};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, JsonSchema)]
//! struct GreetInput { name: String }
//!
//! let greet = CapabilityBuilder::tool("greet")
//!     .description("Greet someone by name")
//!     .handler(|input: GreetInput| async move {
//!         Ok(CapabilityResult::text(format!("Hello, {}!", input.name)))
//!     })
//!     .build()
//!     .unwrap();
//! assert_eq!(greet.key(), "greet");
//! ```

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{HandlerError, RegistryError};
use crate::protocol::{CapabilityDefinition, CapabilityResult, Category, ResourceContent};

/// A boxed future for capability handlers
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of a handler invocation
pub type HandlerResult = std::result::Result<CapabilityResult, HandlerError>;

/// Capability handler trait - the core abstraction for capability execution
pub trait CapabilityHandler: Send + Sync {
    /// Execute the capability with the given arguments
    fn call(&self, args: Value) -> BoxFuture<'_, HandlerResult>;

    /// The capability's input contract
    fn input_schema(&self) -> Value;
}

/// Arguments for capabilities that take none. Any object is accepted.
#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema)]
pub struct NoParams {}

/// A registered capability
#[derive(Clone)]
pub struct Capability {
    category: Category,
    key: String,
    name: String,
    description: Option<String>,
    mime_type: Option<String>,
    input_schema: Value,
    handler: Arc<dyn CapabilityHandler>,
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("category", &self.category)
            .field("key", &self.key)
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Capability {
    pub fn category(&self) -> Category {
        self.category
    }

    /// Unique name (tools, prompts) or uri (resources, samples)
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Public metadata for listing responses
    pub fn definition(&self) -> CapabilityDefinition {
        let uri = match self.category {
            Category::Resource | Category::Sample => Some(self.key.clone()),
            Category::Tool | Category::PromptTemplate => None,
        };
        CapabilityDefinition {
            name: self.name.clone(),
            uri,
            description: self.description.clone(),
            mime_type: self.mime_type.clone(),
            input_schema: self.input_schema.clone(),
        }
    }

    /// Invoke the handler. The returned future owns everything it needs, so it
    /// can be moved onto its own task.
    pub fn invoke(&self, args: Value) -> BoxFuture<'static, HandlerResult> {
        let handler = Arc::clone(&self.handler);
        Box::pin(async move { handler.call(args).await })
    }
}

/// Validate a tool or prompt name.
///
/// Names must be 1-128 characters of ASCII alphanumerics, underscore, hyphen
/// or dot.
pub fn validate_name(category: Category, name: &str) -> Result<(), RegistryError> {
    if name.is_empty() {
        return Err(RegistryError::Invalid(format!(
            "{} name cannot be empty",
            category.label()
        )));
    }
    if name.len() > 128 {
        return Err(RegistryError::Invalid(format!(
            "{} name '{}' exceeds maximum length of 128 characters (got {})",
            category.label(),
            name,
            name.len()
        )));
    }
    if let Some(invalid_char) = name
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-' && *c != '.')
    {
        return Err(RegistryError::Invalid(format!(
            "{} name '{}' contains invalid character '{}'",
            category.label(),
            name,
            invalid_char
        )));
    }
    Ok(())
}

fn validate_uri(category: Category, uri: &str) -> Result<(), RegistryError> {
    match uri.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => Ok(()),
        _ => Err(RegistryError::Invalid(format!(
            "{} uri '{}' must have the form scheme://path",
            category.label(),
            uri
        ))),
    }
}

/// Builder for capabilities of any category
pub struct CapabilityBuilder {
    category: Category,
    key: String,
    name: Option<String>,
    description: Option<String>,
    mime_type: Option<String>,
}

impl CapabilityBuilder {
    pub fn new(category: Category, key: impl Into<String>) -> Self {
        Self {
            category,
            key: key.into(),
            name: None,
            description: None,
            mime_type: None,
        }
    }

    pub fn tool(name: impl Into<String>) -> Self {
        Self::new(Category::Tool, name)
    }

    pub fn resource(uri: impl Into<String>) -> Self {
        Self::new(Category::Resource, uri)
    }

    pub fn prompt(name: impl Into<String>) -> Self {
        Self::new(Category::PromptTemplate, name)
    }

    pub fn sample(uri: impl Into<String>) -> Self {
        Self::new(Category::Sample, uri)
    }

    /// Display name for uri-addressed capabilities. Defaults to the key.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Specify a handler taking typed, schema-described arguments
    pub fn handler<I, F, Fut>(self, handler: F) -> CapabilityBuilderWithHandler
    where
        I: JsonSchema + DeserializeOwned + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.with_handler(Arc::new(TypedHandler {
            handler,
            _phantom: PhantomData,
        }))
    }

    /// Specify a handler that takes no arguments
    pub fn handler_no_params<F, Fut>(self, handler: F) -> CapabilityBuilderWithHandler
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.handler(move |_: NoParams| handler())
    }

    /// Serve a fixed text body, tagged with this capability's uri and mime type
    pub fn text(self, text: impl Into<String>) -> CapabilityBuilderWithHandler {
        let body = ResourceContent {
            uri: self.key.clone(),
            mime_type: self.mime_type.clone(),
            text: text.into(),
        };
        self.handler_no_params(move || {
            let body = body.clone();
            async move { Ok(CapabilityResult::resource(body)) }
        })
    }

    fn with_handler(self, handler: Arc<dyn CapabilityHandler>) -> CapabilityBuilderWithHandler {
        CapabilityBuilderWithHandler {
            builder: self,
            handler,
        }
    }
}

/// Builder state after the handler is set
pub struct CapabilityBuilderWithHandler {
    builder: CapabilityBuilder,
    handler: Arc<dyn CapabilityHandler>,
}

impl CapabilityBuilderWithHandler {
    /// Validate and build the capability
    pub fn build(self) -> Result<Capability, RegistryError> {
        let CapabilityBuilder {
            category,
            key,
            name,
            description,
            mime_type,
        } = self.builder;

        match category {
            Category::Tool | Category::PromptTemplate => validate_name(category, &key)?,
            Category::Resource | Category::Sample => validate_uri(category, &key)?,
        }

        Ok(Capability {
            category,
            name: name.unwrap_or_else(|| key.clone()),
            key,
            description,
            mime_type,
            input_schema: self.handler.input_schema(),
            handler: self.handler,
        })
    }
}

/// Handler that deserializes input to a specific type
struct TypedHandler<I, F> {
    handler: F,
    _phantom: PhantomData<fn() -> I>,
}

impl<I, F, Fut> CapabilityHandler for TypedHandler<I, F>
where
    I: JsonSchema + DeserializeOwned + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, args: Value) -> BoxFuture<'_, HandlerResult> {
        Box::pin(async move {
            let input: I = serde_json::from_value(args)
                .map_err(|e| HandlerError::InvalidArguments(e.to_string()))?;
            (self.handler)(input).await
        })
    }

    fn input_schema(&self) -> Value {
        let schema = schemars::schema_for!(I);
        serde_json::to_value(schema).unwrap_or_else(|_| {
            serde_json::json!({
                "type": "object"
            })
        })
    }
}
