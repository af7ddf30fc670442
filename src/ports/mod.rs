//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the use-case layer requires
//! from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `TableSource`: CSV retrieval by URL or path
//! - `CompletionService`: Remote chat-completion calls

pub mod completion;
pub mod table_source;

pub use completion::{CompletionRequest, CompletionService, SamplingParams};
pub use table_source::TableSource;
