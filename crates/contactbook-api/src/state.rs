//! Application state

use contactbook_auth::{AccessGate, CredentialStore, JwtManager, LoginFlow};
use contactbook_db::Database;
use std::sync::Arc;

/// Prometheus handle rendered by the metrics endpoint
pub type MetricsHandle = metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub login: LoginFlow,
    pub gate: AccessGate,
}

impl AppState {
    /// Wire the login flow and the access gate to the user table
    pub fn new(db: Database, jwt: Arc<JwtManager>) -> Self {
        let store: Arc<dyn CredentialStore> = Arc::new(db.clone());

        Self {
            login: LoginFlow::new(store.clone(), jwt.clone()),
            gate: AccessGate::new(jwt.clone(), store),
            db,
            jwt,
        }
    }
}
