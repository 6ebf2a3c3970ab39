mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::analytics::{routes as analytics_routes, AnalyticsService};
use crate::features::notifications::{EmailNotifier, LogNotifier, Notifier};
use crate::features::reports::{routes as reports_routes, PgReportRepository, ReportService};
use crate::features::sla::services::InMemoryAlertStore;
use crate::features::sla::{routes as sla_routes, SlaMonitor, SlaService};
use crate::features::users::{routes as users_routes, UserDashboardService};
use crate::modules::email::ResendClient;
use crate::modules::storage::MinIOClient;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::Router;
use std::sync::Arc;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
    let _ = shutdown_tx.send(true);
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    let repository = Arc::new(PgReportRepository::new(pool.clone()));

    // Photo storage
    let minio_client = Arc::new(
        MinIOClient::new(config.minio.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?,
    );

    // Notifications: email when a Resend key is configured, log lines otherwise
    let notifier: Arc<dyn Notifier> = match &config.email.api_key {
        Some(api_key) => {
            tracing::info!(
                "Email notifications enabled (alerts to {})",
                config.email.alert_recipient
            );
            Arc::new(EmailNotifier::new(
                ResendClient::new(api_key.clone(), &config.email),
                config.email.alert_recipient.clone(),
            ))
        }
        None => {
            tracing::warn!("RESEND_API_KEY not set, notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let report_service = Arc::new(ReportService::new(
        repository.clone(),
        Arc::clone(&notifier),
        minio_client,
    ));
    let sla_service = Arc::new(SlaService::new(repository.clone()));
    let analytics_service = Arc::new(AnalyticsService::new(
        repository.clone(),
        Arc::clone(&sla_service),
    ));
    let user_dashboard_service = Arc::new(UserDashboardService::new(repository.clone()));
    tracing::info!("Report services initialized");

    // SLA monitor, stopped between cycles by the shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sla_monitor = Arc::new(SlaMonitor::new(
        Arc::clone(&sla_service),
        Arc::clone(&notifier),
        Arc::new(InMemoryAlertStore::new()),
        config.sla.check_interval,
    ));
    let monitor_handle = if config.sla.enabled {
        let monitor = Arc::clone(&sla_monitor);
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move { monitor.run(rx).await }))
    } else {
        tracing::info!("SLA monitor disabled (SLA_MONITOR_ENABLED=false)");
        None
    };

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn_with_state(
                Arc::new(credentials),
                middleware::basic_auth_middleware,
            ))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(reports_routes(report_service))
        .merge(analytics_routes(analytics_service))
        .merge(sla_routes(sla_service, sla_monitor))
        .merge(users_routes(user_dashboard_service))
        .merge(health_route)
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or use client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::MakeSpanWithRequestId)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                // Propagate X-Request-Id to response headers
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::cors_layer(
                    config.app.cors_allowed_origins.clone(),
                ))
                .layer(DefaultBodyLimit::max(config.app.max_request_body_size)),
        );

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    // The monitor finishes any sweep in flight before exiting
    if let Some(handle) = monitor_handle {
        if let Err(e) = handle.await {
            tracing::error!("SLA monitor task failed: {}", e);
        }
    }

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}
