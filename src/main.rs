use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_publisher::config::{AppConfig, BusBackend, StoreBackend};
use order_publisher::domain::order::OrderWorkflow;
use order_publisher::messaging::{EventPublisher, InMemoryPublisher, RedpandaClient};
use order_publisher::metrics::Metrics;
use order_publisher::storage::{InMemoryOrderStore, OrderStore, RedisOrderStore, ScyllaOrderStore};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_publisher=debug")),
        )
        .init();

    tracing::info!("Starting order publisher");

    // === 1. Configuration, resolved once for the process lifetime ===
    let config = AppConfig::from_env()?;
    tracing::info!(
        store = ?config.store,
        bus = ?config.bus,
        table = %config.table_name,
        topic = %config.orders_topic,
        mapped_topics = config.topics.len(),
        policy = ?config.publish_failure_policy,
        "Configuration loaded"
    );

    // === 2. Order store ===
    let store: Arc<dyn OrderStore> = match &config.store {
        StoreBackend::Scylla { nodes, keyspace } => {
            Arc::new(ScyllaOrderStore::connect(nodes, keyspace, &config.table_name).await?)
        }
        StoreBackend::Redis { url } => {
            Arc::new(RedisOrderStore::connect(url, &config.table_name).await?)
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory order store, orders are lost on restart");
            Arc::new(InMemoryOrderStore::new())
        }
    };

    // === 3. Event publisher ===
    let publisher: Arc<dyn EventPublisher> = match &config.bus {
        BusBackend::Redpanda { brokers } => Arc::new(RedpandaClient::new(brokers)?),
        BusBackend::Memory => {
            tracing::warn!("Using in-memory publisher, notifications are not delivered");
            Arc::new(InMemoryPublisher::new())
        }
    };

    // === 4. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 5. Workflow, shared by every worker ===
    let workflow = web::Data::new(
        OrderWorkflow::new(store, publisher, config.orders_topic.clone())
            .with_publish_failure_policy(config.publish_failure_policy)
            .with_metrics(metrics.clone()),
    );
    let metrics = web::Data::from(metrics);

    tracing::info!("Listening on http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(workflow.clone())
            .app_data(metrics.clone())
            .configure(order_publisher::web::configure)
    })
    .bind(config.bind_addr)?
    .run()
    .await?;

    Ok(())
}
