use axum::{extract::State, routing::get, Json, Router};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::models::{MonitorState, Report};

pub async fn get_status(State(state): State<Arc<Mutex<MonitorState>>>) -> Json<Vec<Report>> {
    let state = match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    let mut reports: Vec<Report> = state.latest.values().cloned().collect();
    reports.sort_by(|a, b| a.group.cmp(&b.group));
    Json(reports)
}

pub fn create_router(state: Arc<Mutex<MonitorState>>) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .with_state(state)
}

pub async fn start_server(port: u16, state: Arc<Mutex<MonitorState>>) {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Status API: http://localhost:{}/api/status", addr.port());
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind API port");
    axum::serve(listener, app).await.unwrap();
}
