//! Scholar Discovery
//!
//! A hybrid recommendation and semantic search engine for research papers,
//! served over the Model Context Protocol (MCP).
//!
//! # Features
//!
//! - **Query expansion**: synonym and domain-ontology expansion of search terms
//! - **Multi-modal retrieval**: keyword, vector and citation-graph signals merged per paper
//! - **Hybrid scoring**: content, collaborative, novelty and temporal components
//!   weighted by request context
//! - **Diversification**: per-domain caps with an exploration mode
//! - **Semantic pipelines**: enriched literature reviews and single-paper deep dives
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use scholar_discovery::{
//!     ConceptOntology, InMemoryProfileStore, ProxyClient, config::Config,
//!     models::SemanticSearchQuery, tools::ToolContext,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let ontology = Arc::new(ConceptOntology::embedded());
//!     let client = ProxyClient::new(&config)?;
//!     let ctx = ToolContext::from_client(
//!         &config,
//!         ontology,
//!         &client,
//!         Arc::new(InMemoryProfileStore::new()),
//!     );
//!
//!     let query = SemanticSearchQuery::new("tumor immunotherapy");
//!     let results = ctx.engine.perform_semantic_search(&query).await?;
//!     println!("{} papers", results.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod formatters;
pub mod models;
pub mod ontology;
pub mod pipelines;
pub mod server;
pub mod store;
pub mod tools;

pub use client::ProxyClient;
pub use config::Config;
pub use engine::RecommendationEngine;
pub use error::{ClientError, EngineError, ToolError};
pub use ontology::ConceptOntology;
pub use store::{InMemoryProfileStore, UserProfileStore};
