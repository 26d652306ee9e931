use axum::{routing::get, routing::post, Router};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::propagate::Sgp4Propagator;
use crate::sampler::Sampler;
use crate::source::{ElementSource, TleLoader};
use crate::tracker::{Subscription, TrackerContext, TrackerRegistry};

use super::api::satellites as satellite_handlers;
use super::api::tracker as tracker_handlers;
use super::api_doc::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<dyn ElementSource>,
    pub clock: Arc<dyn Clock>,
    pub sampler: Sampler,
    pub registry: TrackerRegistry,
    /// Subscriptions held on behalf of HTTP clients, one per satellite.
    pub watches: Arc<Mutex<HashMap<u64, Subscription>>>,
}

impl AppState {
    pub fn new(
        config: Config,
        source: Arc<dyn ElementSource>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, crate::tracker::TrackerError> {
        let propagator = Arc::new(Sgp4Propagator::new(config.propagator.validity_window));
        let sampler = Sampler::new(propagator.clone(), config.sampler.clone());
        let registry = TrackerRegistry::new(TrackerContext {
            source: source.clone(),
            propagator,
            clock: clock.clone(),
            config: config.tracker.clone(),
        })?;

        Ok(Self {
            config: Arc::new(config),
            source,
            clock,
            sampler,
            registry,
            watches: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn lock_watches(&self) -> MutexGuard<'_, HashMap<u64, Subscription>> {
        self.watches.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Catalog and track endpoints
        .route("/api/satellites", get(satellite_handlers::list_satellites))
        .route(
            "/api/satellites/{norad_id}/track",
            get(satellite_handlers::get_track),
        )
        // Live tracker endpoints
        .route("/api/tracker", get(tracker_handlers::list_trackers))
        .route(
            "/api/tracker/{norad_id}",
            post(tracker_handlers::watch).delete(tracker_handlers::release),
        )
        .route(
            "/api/tracker/{norad_id}/position",
            get(tracker_handlers::position),
        )
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();

    let loader = Arc::new(TleLoader::new(config.elements.tle_folder.clone()));
    if let Err(e) = loader.load_all() {
        log::warn!("Failed to initialize TLE loader: {}", e);
    }
    if let Some(period) = config.tracker.refresh {
        tokio::spawn(reload_periodically(loader.clone(), period));
    }

    let state = AppState::new(config, loader, Arc::new(SystemClock)).map_err(std::io::Error::other)?;
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}

/// Re-reads the TLE directory so trackers refreshing from it see new files.
async fn reload_periodically(loader: Arc<TleLoader>, period: std::time::Duration) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // the first tick completes immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        if let Err(e) = loader.reload() {
            log::warn!("Failed to reload TLE directory: {}", e);
        }
    }
}
