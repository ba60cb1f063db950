mod config;
mod dashboard;
mod db;
mod errors;
mod gateways;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dashboard::{Dashboard, SessionRegistry};
use crate::db::create_client;
use crate::gateways::{
    CourseraSearch, FeedbackRecorder, InvocationGateway, JobRefreshGateway, LambdaInvoker,
    MatchStoreReader, MongoFeedbackSink, MongoMatchStore, ObjectStoreGateway, ReqwestTransport,
    S3ObjectStore,
};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting job matcher dashboard v{}", env!("CARGO_PKG_VERSION"));

    // Initialize MongoDB
    let (mongo, db) = create_client(&config.mongo_uri, &config.mongo_db).await?;

    // Initialize AWS clients (S3 + Lambda share one SDK config)
    let sdk_config = load_aws_config(&config).await;
    let s3 = build_s3_client(&sdk_config, &config);
    let lambda = aws_sdk_lambda::Client::new(&sdk_config);
    info!(
        "AWS clients initialized (region: {}, max attempts: {})",
        config.aws_region, config.aws_max_attempts
    );

    let http = reqwest::Client::new();

    let refresher = JobRefreshGateway::new(
        config.job_refresh_endpoint.clone(),
        Arc::new(ReqwestTransport::new(http.clone())),
    );
    if !refresher.is_configured() {
        warn!("JOB_REFRESH_ENDPOINT not configured; job refresh is disabled");
    }

    let dashboard = Dashboard::new(
        ObjectStoreGateway::new(
            Arc::new(S3ObjectStore::new(s3, config.s3_bucket.clone())),
            config.upload_prefix.clone(),
        ),
        InvocationGateway::new(Arc::new(LambdaInvoker::new(
            lambda,
            config.resume_lambda.clone(),
        ))),
        refresher,
        MatchStoreReader::new(Arc::new(MongoMatchStore::new(&db))),
        FeedbackRecorder::new(Arc::new(MongoFeedbackSink::new(&db))),
        Arc::new(CourseraSearch::new(http, config.course_search_url.clone())),
    );

    // Build app state; idle sessions are swept at a quarter of the TTL
    let sessions = SessionRegistry::default();
    let sweeper = sessions.spawn_sweeper(config.session_ttl, config.session_ttl / 4);
    info!("Session idle TTL: {}s", config.session_ttl.as_secs());

    let state = AppState {
        dashboard,
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Server stopped, closing MongoDB client");
    mongo.shutdown().await;

    Ok(())
}

/// Shared AWS config with static credentials and the standard retry mode
/// capped at the configured attempt count.
async fn load_aws_config(config: &Config) -> SdkConfig {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "dashboard-static",
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .credentials_provider(credentials)
        .retry_config(RetryConfig::standard().with_max_attempts(config.aws_max_attempts))
        .load()
        .await
}

/// Constructs an S3 client for AWS, or for an S3-compatible store when an
/// endpoint override is configured.
fn build_s3_client(sdk_config: &SdkConfig, config: &Config) -> aws_sdk_s3::Client {
    let mut builder = aws_sdk_s3::config::Builder::from(sdk_config);
    if let Some(endpoint) = &config.s3_endpoint {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    aws_sdk_s3::Client::from_conf(builder.build())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
