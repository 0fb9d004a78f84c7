use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt, TryStreamExt};
use neo4rs::{ConfigBuilder, Graph, Row};
use tokio::time::timeout;
use tracing::debug;

use crate::config::SessionConfig;
use crate::error::{GraphError, Result};
use crate::query::CypherQuery;

/// Lazy, single-pass result rows. Borrows the session that produced them so
/// they cannot be read after that session is released.
pub struct Records<'s> {
    rows: BoxStream<'s, Result<Row>>,
}

impl<'s> Records<'s> {
    pub fn new(rows: impl Stream<Item = Result<Row>> + Send + 's) -> Self {
        Self { rows: rows.boxed() }
    }

    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    pub async fn next(&mut self) -> Result<Option<Row>> {
        self.rows.try_next().await
    }

    /// Drain the remaining rows into memory.
    pub async fn materialize(self) -> Result<Vec<Row>> {
        self.rows.try_collect().await
    }
}

impl Stream for Records<'_> {
    type Item = Result<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rows.as_mut().poll_next(cx)
    }
}

/// The driver-side collaborator a [`GraphSession`](crate::GraphSession) owns.
///
/// `close_session` and `close_driver` are called exactly once each, in that
/// order, when the owning session is closed or dropped.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    async fn execute<'s>(&'s self, query: CypherQuery) -> Result<Records<'s>>;

    /// Run inside an explicit transaction, materialize every row, then commit.
    async fn execute_in_transaction(&self, query: CypherQuery) -> Result<Vec<Row>>;

    fn close_session(&mut self);

    fn close_driver(&mut self);
}

/// [`GraphBackend`] over a neo4rs [`Graph`].
///
/// neo4rs has no separate session object: the driver handle is the connected
/// `Graph`, and the session is a handle onto the same connection that is
/// released first.
pub struct Neo4jBackend {
    driver: Option<Graph>,
    session: Option<Graph>,
}

impl Neo4jBackend {
    /// Connect to Neo4j with the given settings.
    pub async fn connect(config: &SessionConfig) -> Result<Self> {
        let mut builder = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .fetch_size(config.fetch_size)
            .max_connections(config.max_connections);
        if let Some(db) = &config.database {
            builder = builder.db(db.as_str());
        }
        let graph_config = builder.build()?;

        // neo4rs builds its pool lazily; open a real connection now so bad
        // addresses and credentials fail here rather than on the first query.
        let driver = timeout(config.connect_timeout, async {
            let driver = Graph::connect(graph_config).await?;
            verify_connectivity(&driver).await?;
            Ok::<_, GraphError>(driver)
        })
        .await
        .map_err(|_| GraphError::ConnectTimeout {
            uri: config.uri.clone(),
            timeout: config.connect_timeout,
        })??;
        debug!(uri = config.uri.as_str(), "Neo4j server reachable");

        let session = driver.clone();
        Ok(Self {
            driver: Some(driver),
            session: Some(session),
        })
    }

    fn session(&self) -> Result<&Graph> {
        self.session.as_ref().ok_or(GraphError::SessionClosed)
    }
}

/// Handshake and authenticate on a pooled connection. `start_txn` takes a
/// connection straight from the pool, without the retry loop `execute` uses.
async fn verify_connectivity(driver: &Graph) -> Result<()> {
    let txn = driver.start_txn().await?;
    txn.rollback().await?;
    Ok(())
}

#[async_trait]
impl GraphBackend for Neo4jBackend {
    async fn execute<'s>(&'s self, query: CypherQuery) -> Result<Records<'s>> {
        let detached = self.session()?.execute(query.into_query()).await?;
        let rows = stream::try_unfold(detached, |mut detached| async move {
            let row = detached.next().await?;
            Ok::<_, GraphError>(row.map(|row| (row, detached)))
        });
        Ok(Records::new(rows))
    }

    async fn execute_in_transaction(&self, query: CypherQuery) -> Result<Vec<Row>> {
        let mut txn = self.session()?.start_txn().await?;
        let mut stream = txn.execute(query.into_query()).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next(txn.handle()).await? {
            rows.push(row);
        }
        txn.commit().await?;
        Ok(rows)
    }

    fn close_session(&mut self) {
        if self.session.take().is_some() {
            debug!("Neo4j session released");
        }
    }

    fn close_driver(&mut self) {
        if self.driver.take().is_some() {
            debug!("Neo4j driver released");
        }
    }
}
