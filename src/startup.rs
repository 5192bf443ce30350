use crate::config::AppConfig;
use crate::error::AppError;
use crate::handlers;
use crate::middleware::auth::auth_middleware;
use crate::services::{JwtService, MongoDb};
use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub db: MongoDb,
    pub jwt: JwtService,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: AppConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let jwt = JwtService::new(&config.jwt);

        let state = AppState {
            config: config.clone(),
            db: db.clone(),
            jwt,
        };

        let auth_routes = Router::new()
            .route("/signup", post(handlers::auth::signup))
            .route("/login", post(handlers::auth::login));

        let tenant_routes = Router::new()
            .route("/import", post(handlers::imports::import_customers))
            .route("/receipt", post(handlers::payments::print_receipt))
            .route("/customer/search", get(handlers::customers::search_customers))
            .route("/customer/create", post(handlers::customers::create_customer))
            .route("/customer/export", get(handlers::exports::export_customers))
            .route("/customer/history", get(handlers::exports::payment_history))
            .route(
                "/customer/history/export",
                get(handlers::exports::export_payment_history),
            )
            .route("/customer/deleteAll", delete(handlers::customers::delete_all_data))
            .route("/customer/delete/:id", delete(handlers::customers::delete_customer))
            .route(
                "/customer/:id",
                get(handlers::customers::get_customer).put(handlers::customers::edit_customer),
            )
            .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

        let app = Router::new()
            .route("/health", get(handlers::health::health_check))
            .nest("/api/auth", auth_routes)
            .nest("/api", tenant_routes)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
