pub mod backend;
pub mod config;
pub mod error;
pub mod identifier;
pub mod properties;
pub mod query;
pub mod session;

#[cfg(feature = "test-utils")]
pub mod testutil;

pub use backend::{GraphBackend, Neo4jBackend, Records};
pub use config::SessionConfig;
pub use error::{GraphError, Result};
pub use neo4rs::Row;
pub use properties::{Properties, PropertyValue};
pub use query::CypherQuery;
pub use session::GraphSession;
