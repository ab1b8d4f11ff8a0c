use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::AppState;
use crate::routing::RouteInfo;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub classes: usize,
    pub methods: usize,
    pub routes: usize,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        classes: state.objects.classes().len(),
        methods: state.objects.methods().len(),
        routes: state.table.routes().len(),
    })
}

pub async fn get_routes(State(state): State<AppState>) -> Json<Vec<RouteInfo>> {
    Json(state.table.routes().to_vec())
}
