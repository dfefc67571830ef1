mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, StorageBackendKind};
use crate::core::middleware::{self, AuthState};
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::store::{PgPortalStore, PortalStore};
use crate::features::audit::{routes as audit_routes, AuditLog};
use crate::features::auth::{self, routes as auth_routes};
use crate::features::files::{
    self as files, AccessController, FileService, UploadTransaction,
};
use crate::features::notifications::{routes as notification_routes, NotificationDispatcher};
use crate::features::users::{routes as users_routes, UserDirectory};
use crate::modules::mailer::{DisabledMailTransport, HttpMailTransport, MailTransport};
use crate::modules::storage::{BlobStorage, LocalBlobStorage, MinIOClient};
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
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

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pg_store = PgPortalStore::connect(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pg_store.pool())
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    let store: Arc<dyn PortalStore> = Arc::new(pg_store);

    // Initialize auth
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        &config.auth.jwt_secret,
        config.auth.jwt_leeway,
    ));
    let token_issuer = auth::TokenIssuer::new(&config.auth.jwt_secret, config.auth.session_ttl);
    let csrf_store: Arc<dyn auth::CsrfTokenStore> =
        Arc::new(auth::HmacCsrfTokenStore::new(&config.auth.csrf_secret));
    let guard = Arc::new(auth::RequestGuard::new(csrf_store));
    let hasher: Arc<dyn auth::CredentialHasher> = Arc::new(auth::Argon2Hasher::new());
    tracing::info!("Auth configuration initialized");

    // Initialize blob storage
    let storage: Arc<dyn BlobStorage> = match config.storage.backend {
        StorageBackendKind::Local => {
            let local = LocalBlobStorage::new(config.storage.upload_dir.clone());
            local
                .ensure_root()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to prepare upload directory: {}", e))?;
            Arc::new(local)
        }
        StorageBackendKind::MinIO => {
            let minio = MinIOClient::new(config.storage.minio.clone())
                .await
                .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?;
            Arc::new(minio)
        }
    };

    // Initialize mail transport
    let mail_transport: Arc<dyn MailTransport> = match config.mail.api_url.clone() {
        Some(api_url) => {
            let transport = HttpMailTransport::new(&config.mail, api_url)
                .map_err(|e| anyhow::anyhow!("Failed to initialize mail transport: {}", e))?;
            tracing::info!("Mail relay configured");
            Arc::new(transport)
        }
        None => {
            tracing::warn!("MAIL_API_URL not set, access notifications are disabled");
            Arc::new(DisabledMailTransport)
        }
    };

    // Initialize services
    let audit_log = Arc::new(AuditLog::new(Arc::clone(&store), Arc::clone(&guard)));
    let notifier = Arc::new(NotificationDispatcher::new(
        mail_transport,
        Arc::clone(&audit_log),
        Arc::clone(&guard),
        config.mail.system_name.clone(),
        config.app.portal_url.clone(),
    ));
    let access_controller = Arc::new(AccessController::new(
        Arc::clone(&store),
        Arc::clone(&guard),
        Arc::clone(&audit_log),
        Arc::clone(&notifier),
    ));
    let upload_transaction = Arc::new(UploadTransaction::new(
        Arc::clone(&store),
        Arc::clone(&storage),
        Arc::clone(&access_controller),
        Arc::clone(&audit_log),
        Arc::clone(&notifier),
        Arc::clone(&guard),
        config.upload.clone(),
    ));
    let file_service = Arc::new(FileService::new(
        Arc::clone(&store),
        Arc::clone(&storage),
        Arc::clone(&access_controller),
        Arc::clone(&audit_log),
        Arc::clone(&guard),
    ));
    let user_directory = Arc::new(UserDirectory::new(
        Arc::clone(&store),
        Arc::clone(&guard),
        Arc::clone(&audit_log),
        Arc::clone(&hasher),
    ));
    let auth_service = Arc::new(auth::AuthService::new(
        Arc::clone(&store),
        hasher,
        token_issuer,
        Arc::clone(&guard),
        Arc::clone(&audit_log),
    ));
    tracing::info!("Portal services initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let auth_state = AuthState {
        validator: Arc::clone(&jwt_validator),
        store: Arc::clone(&store),
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&auth_service)))
        .merge(files::routes(file_service))
        .merge(files::upload_routes(
            upload_transaction,
            config.app.max_request_body_size,
        ))
        .merge(files::access_routes(access_controller))
        .merge(users_routes::routes(user_directory))
        .merge(notification_routes::routes(Arc::clone(&notifier)))
        .merge(audit_routes::routes(audit_log))
        .route_layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(auth_routes::public_routes(auth_service))
        .merge(protected_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

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
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
