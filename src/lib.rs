//! Campaign data core for Agency Desk.
//!
//! This crate provides the domain models, the reactive state containers,
//! and the local persistence layer for Agency Desk, independent of any
//! rendering layer. The UI mutates the stores and reads their state; the
//! persistence coordinator keeps the on-device database in step with
//! write-coalescing.
//!
//! # Usage
//!
//! ```no_run
//! use agency_core::{Database, PersistenceCoordinator, Stores};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let db = Arc::new(Database::open_default()?);
//! db.migrate()?;
//!
//! let stores = Stores::new();
//! let coordinator = PersistenceCoordinator::start(stores.clone(), db).await?;
//!
//! // ... UI drives the stores; every mutation is persisted ...
//! stores.agency.settle_agent_deltas();
//!
//! coordinator.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod db;
pub mod models;
pub mod selection;
pub mod store;

// Re-export commonly used types at crate root
pub use coordinator::{PersistenceCoordinator, Stores};
pub use db::Database;
pub use selection::{select_honors, Honors};
