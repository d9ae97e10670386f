//! Admin surface: a small CRUD API over the stance registry and tone
//! settings files. The pipeline never talks to this process; it observes
//! edits at its own load points (registry per run, tone per generation call).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hottake_common::{Config, Settings, StanceRegistry, Tone};

struct AppState {
    registry_path: PathBuf,
    settings_path: PathBuf,
    // Handlers rewrite whole documents; serialize them.
    write_lock: Mutex<()>,
}

#[derive(Serialize)]
struct TopicEntry {
    topic: String,
    support: bool,
}

#[derive(Deserialize)]
struct AddTopic {
    topic: String,
    support: bool,
}

#[derive(Deserialize)]
struct TopicName {
    topic: String,
}

#[derive(Serialize, Deserialize)]
struct ToneBody {
    tone: Tone,
}

async fn list_registry(State(state): State<Arc<AppState>>) -> Json<Vec<TopicEntry>> {
    let _guard = state.write_lock.lock().await;
    let registry = StanceRegistry::load_or_empty(&state.registry_path);
    Json(
        registry
            .entries()
            .iter()
            .map(|e| TopicEntry {
                topic: e.topic.clone(),
                support: e.support,
            })
            .collect(),
    )
}

async fn add_topic(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AddTopic>,
) -> impl IntoResponse {
    if body.topic.trim().is_empty() {
        return StatusCode::UNPROCESSABLE_ENTITY;
    }

    let _guard = state.write_lock.lock().await;
    let mut registry = StanceRegistry::load_or_empty(&state.registry_path);
    registry.add(body.topic.trim(), body.support);
    save_registry(&registry, &state.registry_path)
}

async fn toggle_topic(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TopicName>,
) -> impl IntoResponse {
    let _guard = state.write_lock.lock().await;
    let mut registry = StanceRegistry::load_or_empty(&state.registry_path);
    if !registry.toggle(&body.topic) {
        return StatusCode::NOT_FOUND;
    }
    save_registry(&registry, &state.registry_path)
}

async fn remove_topic(
    State(state): State<Arc<AppState>>,
    Path(topic): Path<String>,
) -> impl IntoResponse {
    let _guard = state.write_lock.lock().await;
    let mut registry = StanceRegistry::load_or_empty(&state.registry_path);
    if !registry.remove(&topic) {
        return StatusCode::NOT_FOUND;
    }
    save_registry(&registry, &state.registry_path)
}

async fn get_tone(State(state): State<Arc<AppState>>) -> Json<ToneBody> {
    let _guard = state.write_lock.lock().await;
    let settings = Settings::load_or_default(&state.settings_path);
    Json(ToneBody {
        tone: settings.tone,
    })
}

async fn set_tone(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ToneBody>,
) -> impl IntoResponse {
    let _guard = state.write_lock.lock().await;
    let settings = Settings { tone: body.tone };
    match settings.save(&state.settings_path) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            error!(error = %e, "Failed to save settings");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn save_registry(registry: &StanceRegistry, path: &std::path::Path) -> StatusCode {
    match registry.save(path) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(e) => {
            error!(error = %e, "Failed to save registry");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("hottake=info".parse()?))
        .init();

    let config = Config::admin_from_env();

    let state = Arc::new(AppState {
        registry_path: config.registry_path.clone(),
        settings_path: config.settings_path.clone(),
        write_lock: Mutex::new(()),
    });

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/registry", get(list_registry).post(add_topic))
        .route("/registry/toggle", post(toggle_topic))
        .route("/registry/{topic}", delete(remove_topic))
        .route("/tone", get(get_tone).post(set_tone))
        .with_state(state);

    let addr = format!("{}:{}", config.admin_host, config.admin_port);
    info!(addr, "hottake admin listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
