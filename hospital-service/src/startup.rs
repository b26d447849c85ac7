//! Application startup and lifecycle management.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;

use crate::clients::BillingClient;
use crate::config::HospitalConfig;
use crate::handlers::{auth, bills, draft, health, metrics, patients};
use crate::services::{
    init_metrics, BillingLedger, BillingPolicy, IdentityGate, ImageBillReader, InMemoryDirectory,
    PatientDirectory, StaticCredentialGate,
};

/// Shared application state.
///
/// All billing and directory state is session-scoped and owned here; there
/// is no module-level mutable state anywhere in the service.
#[derive(Clone)]
pub struct AppState {
    pub config: HospitalConfig,
    pub ledger: Arc<RwLock<BillingLedger>>,
    pub directory: Arc<dyn PatientDirectory>,
    pub identity: Arc<dyn IdentityGate>,
    pub billing_client: Option<Arc<BillingClient>>,
    pub image_reader: Option<Arc<dyn ImageBillReader>>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: HospitalConfig) -> Result<Self, AppError> {
        init_metrics();

        let policy = BillingPolicy::new(
            config.billing.tax_rate,
            config.billing.authorized_roles.clone(),
        );
        let ledger = Arc::new(RwLock::new(BillingLedger::new(policy)));
        let directory: Arc<dyn PatientDirectory> = Arc::new(InMemoryDirectory::new());
        let identity: Arc<dyn IdentityGate> =
            Arc::new(StaticCredentialGate::new(config.auth.users.clone()));

        let billing_client = match &config.billing.upstream_url {
            Some(url) => Some(Arc::new(BillingClient::new(
                url.clone(),
                Duration::from_secs(config.billing.request_timeout_secs),
            )?)),
            None => None,
        };

        let state = AppState {
            config: config.clone(),
            ledger,
            directory,
            identity,
            billing_client,
            image_reader: None,
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port = port,
            upstream = %config
                .billing
                .upstream_url
                .as_deref()
                .unwrap_or("(local ledger)"),
            "Hospital service listener bound"
        );

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state);

        tracing::info!(
            service = "hospital-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/auth/login", post(auth::login))
        .route(
            "/patients",
            post(patients::register_patient).get(patients::list_patients),
        )
        .route("/patients/export", get(patients::export_patients))
        .route("/patients/:patient_id", get(patients::get_patient))
        .route("/bills", post(bills::create_bill).get(bills::list_bills))
        .route("/bills/export", get(bills::export_bills))
        .route("/bills/upload-csv", post(bills::upload_bill_csv))
        .route("/bills/upload-image", post(bills::upload_bill_image))
        .route("/draft", get(draft::get_draft))
        .route("/draft/meta", put(draft::set_draft_meta))
        .route("/draft/items", post(draft::add_draft_item))
        .route(
            "/draft/items/:index",
            patch(draft::update_draft_item).delete(draft::remove_draft_item),
        )
        .route("/draft/commit", post(draft::commit_draft))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        // The demo UI is served from a separate dev server.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
