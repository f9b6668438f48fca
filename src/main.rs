use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod actors;
mod courier;
mod domain;
mod engine;
mod messaging;
mod metrics;
mod repository;
mod settings;

use actix::Actor;
use actors::CoordinatorActor;
use chrono::Utc;
use courier::StaticCourierFeed;
use domain::order::{AppStatus, CourierEvent, CustomerDetails, Order, OrderItem};
use engine::template::TemplateStore;
use engine::NotificationEngine;
use messaging::WhatsAppGateway;
use repository::{InMemoryOrderRepository, OrderRepository};
use settings::AppSettings;

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_notify=debug")),
        )
        .init();

    tracing::info!("Starting order lifecycle & notification engine");

    let settings = AppSettings::from_env();
    tracing::info!(
        poll_secs = settings.polling_interval_seconds,
        reminder_secs = settings.reminder_scan_interval_seconds,
        confirmation_delay_hours = settings.confirmation_delay_hours,
        "Settings loaded"
    );

    // === 1. Metrics registry and scrape endpoint ===
    let metrics = Arc::new(metrics::Metrics::new()?);
    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = settings.metrics_port;
    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("metrics runtime");
        rt.block_on(async {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 2. Collaborators: repository, courier feed, notification gateway ===
    let repository = Arc::new(InMemoryOrderRepository::new());
    let courier_feed = Arc::new(demo_courier_feed());
    let gateway = Arc::new(WhatsAppGateway::new());
    let templates = Arc::new(TemplateStore::with_defaults());

    // === 3. The orchestration engine ===
    let engine = Arc::new(NotificationEngine::new(
        repository.clone(),
        courier_feed,
        gateway,
        templates,
        settings.clone(),
        metrics,
    ));

    // === 4. Coordinator with its supervised poll/reminder/health actors ===
    let _coordinator = CoordinatorActor::new(engine.clone(), settings.clone()).start();

    // === 5. Walk one order through the full lifecycle ===
    tracing::info!("Walking a demo order through the lifecycle");

    let order = Order::create(
        "ORD001",
        CustomerDetails {
            customer_name: "Ahmed Raza".to_string(),
            phone_number: "0300-1234567".to_string(),
            address: "House 123, Street 4, Gulberg".to_string(),
            city: "Lahore".to_string(),
            payment_method: "COD".to_string(),
            delivery_method: Some("TCS".to_string()),
            currency_symbol: "PKR".to_string(),
            price: 2500.0,
        },
        vec![
            OrderItem {
                name: "Wireless Mouse".to_string(),
                quantity: 1,
            },
            OrderItem {
                name: "Keyboard".to_string(),
                quantity: 1,
            },
        ],
        Utc::now(),
    )?;
    repository.insert(order).await?;

    // Initial notification
    let outcome = engine.process("ORD001", "User: Template").await?;
    tracing::info!(?outcome, "Initial notification processed");

    // Customer confirms, store notifies processing
    engine.record_customer_confirmation("ORD001").await?;
    let outcome = engine.process("ORD001", "User: Template").await?;
    tracing::info!(?outcome, "Processing confirmation sent");

    // The packing desk assigns a tracking number (edit workflow), then the
    // order is marked dispatched and the dispatch notice goes out.
    if let Some(mut order) = repository.get("ORD001").await? {
        order.tracking_number = Some("TCS123456789".to_string());
        repository.save(order).await?;
    }
    engine
        .force_transition(
            &["ORD001".to_string()],
            AppStatus::Dispatched,
            "User: Bulk Dispatch",
        )
        .await?;
    let outcome = engine.process("ORD001", "User: Template").await?;
    tracing::info!(?outcome, "Dispatch notification processed");

    // === 6. Let the poll loop consume the scripted courier feed ===
    let wait = settings.polling_interval_seconds * 5 + 5;
    tracing::info!(seconds = wait, "Waiting for courier polling to drain the feed");
    tokio::time::sleep(std::time::Duration::from_secs(wait)).await;

    if let Some(order) = repository.get("ORD001").await? {
        tracing::info!(
            app_status = %order.app_status,
            message_status = %order.message_status,
            courier_events = order.courier_history.len(),
            history_entries = order.message_history.len(),
            "Demo order final state"
        );
        for entry in &order.message_history {
            tracing::info!(
                kind = %entry.kind,
                actor = %entry.actor,
                "  history: {}",
                entry.content_snippet
            );
        }
    }

    tracing::info!("Demo complete");
    Ok(())
}

/// Scripted courier feed for the demo binary: the order books, moves through
/// the network, goes out for delivery and lands.
fn demo_courier_feed() -> StaticCourierFeed {
    let now = Utc::now();
    StaticCourierFeed::new().with_sequence(
        "TCS123456789",
        vec![
            CourierEvent::new(now, "Shipment Picked Up from shipper"),
            CourierEvent::new(now, "Arrived at Lahore Sorting Facility"),
            CourierEvent::new(now, "Out for Delivery from Lahore Station"),
            CourierEvent::new(now, "Delivered Successfully"),
        ],
    )
}
