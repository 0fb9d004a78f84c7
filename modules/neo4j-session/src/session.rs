use neo4rs::Row;
use tracing::{debug, info};

use crate::backend::{GraphBackend, Neo4jBackend, Records};
use crate::config::SessionConfig;
use crate::error::{GraphError, Result};
use crate::properties::Properties;
use crate::query::{self, CypherQuery};

/// Owns one driver handle and one session for its whole lifetime.
///
/// Release is tied to scope: [`close`](Self::close) consumes the session, and
/// dropping it without closing releases the same resources, so every exit path
/// (including `?` and panics) closes the session and then the driver exactly once.
///
/// A session holds a single connection, and [`Records`] keep it busy until
/// they are drained or dropped. Every query method therefore takes
/// `&mut self`, so an earlier result has to be finished before the next
/// query is issued:
///
/// ```compile_fail
/// # async fn interleave(session: &mut neo4j_session::GraphSession) -> neo4j_session::Result<()> {
/// let first = session.run_query("RETURN 1", None).await?;
/// let second = session.run_query("RETURN 2", None).await?;
/// drop(first);
/// # drop(second);
/// # Ok(())
/// # }
/// ```
pub struct GraphSession<B: GraphBackend = Neo4jBackend> {
    backend: Option<B>,
}

impl GraphSession<Neo4jBackend> {
    /// Connect, verify the server answers, and bind a session. Unreachable
    /// servers and rejected credentials surface here as [`GraphError::Driver`],
    /// a server that never answers as [`GraphError::ConnectTimeout`].
    pub async fn open(config: &SessionConfig) -> Result<Self> {
        info!(uri = config.uri.as_str(), user = config.user.as_str(), "Opening Neo4j session");
        let backend = Neo4jBackend::connect(config).await?;
        Ok(Self::with_backend(backend))
    }
}

impl<B: GraphBackend> GraphSession<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    fn backend(&self) -> Result<&B> {
        self.backend.as_ref().ok_or(GraphError::SessionClosed)
    }

    /// Run a prepared query and hand back the driver's rows lazily.
    pub async fn run(&mut self, query: CypherQuery) -> Result<Records<'_>> {
        debug!(query = query.text(), "Running query");
        self.backend()?.execute(query).await
    }

    /// Raw pass-through: `query` is sent as-is, `parameters` bound by name.
    pub async fn run_query(
        &mut self,
        query: &str,
        parameters: Option<&Properties>,
    ) -> Result<Records<'_>> {
        let mut q = CypherQuery::new(query);
        if let Some(parameters) = parameters {
            q = q.params_from(parameters);
        }
        self.run(q).await
    }

    /// Names of every database on the server, read in one committed transaction.
    pub async fn show_databases(&mut self) -> Result<Vec<String>> {
        let rows = self
            .backend()?
            .execute_in_transaction(query::show_databases())
            .await?;
        rows.iter()
            .map(|row| {
                row.get::<String>("name")
                    .map_err(|e| GraphError::Decode(format!("database name: {e}")))
            })
            .collect()
    }

    /// Create one `label` node with `properties`. Returns the `a` row.
    pub async fn create_node(&mut self, label: &str, properties: &Properties) -> Result<Vec<Row>> {
        let q = query::create_node(label, properties)?;
        let rows = self.run(q).await?.materialize().await?;
        info!(label, properties = properties.len(), "Created node");
        Ok(rows)
    }

    /// Create a `rel_type` edge from every `start_label` node named
    /// `start_node` to every `end_label` node named `end_node`.
    ///
    /// Returns how many edges were created; zero when either side has no match.
    pub async fn create_relationship(
        &mut self,
        start_node: &str,
        rel_type: &str,
        end_node: &str,
        start_label: &str,
        end_label: &str,
    ) -> Result<u64> {
        let q = query::create_relationship(start_node, rel_type, end_node, start_label, end_label)?;
        let rows = self.run(q).await?.materialize().await?;
        let created = count_column(&rows, "created")?;
        info!(start_node, rel_type, end_node, created, "Created relationship");
        Ok(created)
    }

    /// Detach-delete every `label` node whose properties equal all of
    /// `properties`. An empty map is rejected rather than matching every node.
    pub async fn delete_node(&mut self, label: &str, properties: &Properties) -> Result<u64> {
        let q = query::delete_node(label, properties)?;
        let rows = self.run(q).await?.materialize().await?;
        let deleted = count_column(&rows, "deleted")?;
        info!(label, deleted, "Deleted nodes");
        Ok(deleted)
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            backend.close_session();
            backend.close_driver();
            info!("Neo4j session closed");
        }
    }
}

impl<B: GraphBackend> Drop for GraphSession<B> {
    fn drop(&mut self) {
        self.release();
    }
}

fn count_column(rows: &[Row], column: &str) -> Result<u64> {
    match rows.first() {
        Some(row) => row
            .get::<i64>(column)
            .map(|n| n.max(0) as u64)
            .map_err(|e| GraphError::Decode(format!("{column}: {e}"))),
        None => Ok(0),
    }
}
