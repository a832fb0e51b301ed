//! MCP tool server for knowledge-graph retrieval
//!
//! Registers the retrieval operations of [`graphkb_core::KnowledgeRetriever`]
//! as MCP tools. Each tool takes plain scalar arguments (schema derived from
//! its argument struct) and returns one text block.

pub mod logging;
mod server;

pub use server::{
    ExecuteSparqlArgs, FindRelatedArgs, GetEntityInfoArgs, KnowledgeServer, SearchByCategoryArgs,
    SearchEntitiesArgs,
};
