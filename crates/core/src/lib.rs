#![forbid(unsafe_code)]

//! Nested-set (interval) encoding of forests over a record store.
//!
//! Every node carries a `left`/`right` boundary pair; a node's pair encloses
//! the pairs of all of its descendants, so subtree reads are single range
//! queries. Structural mutations are planned as pure arithmetic
//! ([`plan`]) and applied atomically through the store traits ([`store`]).

pub mod check;
pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod interval;
pub mod memory;
pub mod plan;
pub mod query;
pub mod store;

pub use check::{ForestReport, Violation, check_forest};
pub use config::{ColumnName, ConfigError, TreeConfig};
pub use engine::{DeleteReport, NestedSet};
pub use error::TreeError;
pub use ids::{NodeId, ScopeKey, ScopeKeyError};
pub use interval::{Attributes, Bounds, BoundsError, Node, NodeRow};
pub use memory::{MemoryStore, MemoryStoreError};
pub use plan::{DeletePlan, MovePlan, MovePosition, ShiftArm, ShiftPlan, Span};
pub use query::{Containment, NodeFilter, NodeQuery, SortOrder};
pub use store::{NewNode, TreeRead, TreeStore, TreeTx, TreeWrite};
