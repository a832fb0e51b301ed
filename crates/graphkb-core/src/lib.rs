//! # graphkb-core
//!
//! Retrieval of facts about real-world entities from a remote RDF knowledge
//! graph (DBpedia by default), flattened into text documents an LLM can read.
//!
//! Data flows strictly downstream:
//!
//! ```text
//! caller params -> query (query) -> remote call (executor) -> rows (row)
//!               -> typed records (mapper) -> documents (document)
//! ```
//!
//! [`KnowledgeRetriever`] ties the stages together and is the only type most
//! callers need.
//!
//! ```rust,no_run
//! use graphkb_config::EndpointConfig;
//! use graphkb_core::KnowledgeRetriever;
//!
//! # async fn example() -> graphkb_core::Result<()> {
//! let retriever = KnowledgeRetriever::from_config(&EndpointConfig::default())?;
//! for doc in retriever.find_entity("California", 3).await? {
//!     println!("{}", doc.content);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod executor;
pub mod mapper;
pub mod query;
pub mod retriever;
pub mod row;

pub use document::{DocumentAssembler, RetrievalDocument, SOURCE};
pub use error::{KbError, Result};
pub use executor::{HttpSparqlExecutor, SparqlExecutor};
pub use mapper::{EntityInfo, PropertyValue, QueryShape, Records, Relation};
pub use retriever::KnowledgeRetriever;
pub use row::{ResultRow, RowCursor};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
