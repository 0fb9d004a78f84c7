use anyhow::Result;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use neo4j_session::{GraphSession, Properties, SessionConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("neo4j_session=info".parse()?),
        )
        .init();

    info!("neo4j-session demo starting...");

    let config = SessionConfig::from_env()?;
    config.log_redacted();

    let mut session = GraphSession::open(&config).await?;

    let databases = session.show_databases().await?;
    info!(?databases, "Databases on server");

    let alice = Properties::from_json(json!({"name": "Alice", "age": 30}))?;
    let bob = Properties::from_json(json!({"name": "Bob", "age": 25}))?;
    session.create_node("Person", &alice).await?;
    session.create_node("Person", &bob).await?;

    let created = session
        .create_relationship("Alice", "FRIENDS_WITH", "Bob", "Person", "Person")
        .await?;
    info!(created, "Linked Alice to Bob");

    let deleted = session
        .delete_node("Person", &Properties::new().with("name", "Alice"))
        .await?;
    info!(deleted, "Removed Alice with incident relationships");

    session.close();
    Ok(())
}
