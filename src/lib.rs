//! finbot: natural-language question answering over a business database
//!
//! A question arrives as free text, is translated to SQL (by an external
//! text-generation provider, with a deterministic rule catalog as fallback),
//! executed against the configured engine, and returned as formatted text.

pub mod cache;
pub mod config;
pub mod error;
pub mod executor;
pub mod extract;
pub mod fallback;
pub mod http;
pub mod logging;
pub mod prompt;
pub mod provider;
pub mod resolver;
pub mod schema;

pub use config::Config;
pub use error::{ProviderError, ResolveError};
pub use executor::{Database, Dialect, ExecutionResult};
pub use provider::{ModelClient, OpenAiChatModel};
pub use resolver::{QueryOrigin, ResolvedQuery, Resolver};
pub use schema::SchemaDescription;
