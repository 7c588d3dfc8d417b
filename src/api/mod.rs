mod cli;

pub use cli::{
    Cli, CliRetirementYearPhase, Command, CompassConfig, DataArgs, LookupArgs, ServeArgs,
    build_config,
};

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    JsonFileSource, LookupStrategy, Profile, ScenarioRecord, ScenarioStore, Snapshot,
    TableSummary, TimelineResolver, WealthTimeline, derived_key, encode, recommendations,
    status_insights,
};
use crate::error::CompassError;

#[derive(Clone)]
pub struct AppState {
    store: Arc<ScenarioStore>,
    resolver: Arc<TimelineResolver>,
}

impl AppState {
    pub fn new(store: ScenarioStore, resolver: TimelineResolver) -> Self {
        Self {
            store: Arc::new(store),
            resolver: Arc::new(resolver),
        }
    }

    pub fn from_config(config: &CompassConfig) -> Self {
        let source = JsonFileSource::new(config.data_path.clone());
        Self::new(
            ScenarioStore::new(Box::new(source), config.cache_ttl, config.use_index),
            TimelineResolver::new(config.timeline),
        )
    }

    pub fn store(&self) -> &ScenarioStore {
        &self.store
    }

    pub fn resolver(&self) -> &TimelineResolver {
        &self.resolver
    }

    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, CompassError> {
        if let Some(snapshot) = self.store.cached() {
            return Ok(snapshot);
        }
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.snapshot())
            .await
            .map_err(|e| join_error(&e))?
    }

    pub async fn reload(&self) -> Result<Arc<Snapshot>, CompassError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.reload())
            .await
            .map_err(|e| join_error(&e))?
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    loaded: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReloadResponse {
    rows: usize,
    indexed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse<'a> {
    pub sort_key: String,
    pub derived_key: String,
    pub pk: Option<&'a str>,
    pub sk: Option<&'a str>,
    pub strategy: LookupStrategy,
    pub record: &'a ScenarioRecord,
    pub timeline: WealthTimeline,
    pub insights: Vec<String>,
    pub recommendations: Vec<&'static str>,
}

pub fn build_lookup_response<'a>(
    snapshot: &'a Snapshot,
    resolver: &TimelineResolver,
    profile: &Profile,
) -> Result<LookupResponse<'a>, CompassError> {
    let hit = snapshot.lookup(profile)?;
    let record = hit.record;
    Ok(LookupResponse {
        sort_key: encode(profile),
        derived_key: derived_key(record),
        pk: record.pk.as_deref(),
        sk: record.sk.as_deref(),
        strategy: hit.strategy,
        record,
        timeline: resolver.resolve(record),
        insights: status_insights(record),
        recommendations: recommendations(record.status()),
    })
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/lookup",
            get(lookup_get_handler).post(lookup_post_handler),
        )
        .route("/api/summary", get(summary_handler))
        .route("/api/reload", post(reload_handler))
        .route("/healthz", get(health_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(state: AppState, port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let source = state.store().source();
    let app = router(state);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, %source, "scenario lookup API listening");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn health_handler(State(state): State<AppState>) -> Response {
    json_response(
        StatusCode::OK,
        HealthResponse {
            status: "ok",
            loaded: state.store().is_loaded(),
        },
    )
}

async fn lookup_get_handler(
    State(state): State<AppState>,
    Query(profile): Query<Profile>,
) -> Response {
    lookup_handler_impl(&state, &profile).await
}

async fn lookup_post_handler(
    State(state): State<AppState>,
    Json(profile): Json<Profile>,
) -> Response {
    lookup_handler_impl(&state, &profile).await
}

async fn lookup_handler_impl(state: &AppState, profile: &Profile) -> Response {
    let snapshot = match state.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(err) => return compass_error_response(&err),
    };
    match build_lookup_response(&snapshot, state.resolver(), profile) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => compass_error_response(&err),
    }
}

async fn summary_handler(State(state): State<AppState>) -> Response {
    match state.snapshot().await {
        Ok(snapshot) => json_response(StatusCode::OK, TableSummary::from_table(snapshot.table())),
        Err(err) => compass_error_response(&err),
    }
}

async fn reload_handler(State(state): State<AppState>) -> Response {
    match state.reload().await {
        Ok(snapshot) => json_response(
            StatusCode::OK,
            ReloadResponse {
                rows: snapshot.table().len(),
                indexed: snapshot.index().is_some(),
            },
        ),
        Err(err) => {
            warn!(error = %err, "manual reload failed");
            compass_error_response(&err)
        }
    }
}

fn join_error(err: &tokio::task::JoinError) -> CompassError {
    CompassError::data_unavailable(format!("failed to join loader task: {err}"))
}

fn status_for(err: &CompassError) -> StatusCode {
    match err {
        CompassError::NotFound { .. } => StatusCode::NOT_FOUND,
        CompassError::DataUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        CompassError::InvalidConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn compass_error_response(err: &CompassError) -> Response {
    error_response(status_for(err), &err.to_string())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{record_for, sample_profile};
    use crate::core::{TableSource, TimelineConfig, TimelineSource};

    struct FixedSource(Result<Vec<ScenarioRecord>, String>);

    impl TableSource for FixedSource {
        fn describe(&self) -> String {
            "fixed".to_string()
        }

        fn load(&self) -> Result<Vec<ScenarioRecord>, CompassError> {
            self.0.clone().map_err(CompassError::data_unavailable)
        }
    }

    fn state_with(records: Result<Vec<ScenarioRecord>, String>) -> AppState {
        AppState::new(
            ScenarioStore::new(Box::new(FixedSource(records)), None, true),
            TimelineResolver::new(TimelineConfig::default()),
        )
    }

    #[test]
    fn lookup_response_serialization_contains_expected_fields() {
        let profile = sample_profile();
        let snapshot = Snapshot::build(vec![record_for(&profile)], true);
        let resolver = TimelineResolver::new(TimelineConfig::default());

        let response =
            build_lookup_response(&snapshot, &resolver, &profile).expect("record expected");
        assert_eq!(response.timeline.source, TimelineSource::Synthesized);

        let json = serde_json::to_value(&response).expect("serializable response");
        assert_eq!(
            json["sortKey"],
            "combo__30-34__b__c__m__2__rent__c__m__c__65"
        );
        assert_eq!(json["derivedKey"], json["sortKey"]);
        assert_eq!(json["pk"], "retirement");
        assert_eq!(json["strategy"], "indexed");
        assert_eq!(json["record"]["fire_grade"], "B");
        assert!(json["record"].get("wealth_timeline").is_none());
        assert_eq!(json["timeline"]["source"], "synthesized");
        assert_eq!(json["timeline"]["points"][0]["age"], 32.0);
        assert_eq!(json["timeline"]["points"][0]["year"], 2024);
        assert_eq!(json["recommendations"][0], "Continue current plan");
        assert!(json["insights"].as_array().is_some_and(|i| !i.is_empty()));
    }

    #[test]
    fn errors_map_to_distinct_statuses() {
        assert_eq!(
            status_for(&CompassError::NotFound {
                key: "combo__x".to_string()
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&CompassError::data_unavailable("missing file")),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn json_responses_are_not_cached() {
        let response = error_response(StatusCode::BAD_REQUEST, "bad");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response
                .headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
    }

    #[test]
    fn profile_query_accepts_snake_case_keys() {
        let profile: Profile = serde_json::from_str(
            r#"{"age_bucket":"30-34","current_savings_bucket":"b","expected_expenses_bucket":"c",
                "gender":"m","household_size":2,"housing_status":"rent","income_bucket":"c",
                "marital_status":"m","monthly_savings_bucket":"c","retirement_age_bucket":"65"}"#,
        )
        .expect("snake_case profile should parse");
        assert_eq!(profile, sample_profile());
    }

    #[tokio::test]
    async fn lookup_handler_distinguishes_missing_key_from_missing_data() {
        let profile = sample_profile();
        let state = state_with(Ok(vec![record_for(&profile)]));
        let found = lookup_post_handler(State(state.clone()), Json(profile.clone())).await;
        assert_eq!(found.status(), StatusCode::OK);

        let mut other = profile.clone();
        other.income_bucket = "z".to_string();
        let missing = lookup_post_handler(State(state), Json(other)).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);

        let broken = state_with(Err("file not found".to_string()));
        let unavailable = lookup_post_handler(State(broken), Json(profile)).await;
        assert_eq!(unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn reload_and_summary_report_loaded_rows() {
        let state = state_with(Ok(vec![record_for(&sample_profile())]));
        let health = health_handler(State(state.clone())).await;
        assert_eq!(health.status(), StatusCode::OK);
        assert!(!state.store().is_loaded());

        let reload = reload_handler(State(state.clone())).await;
        assert_eq!(reload.status(), StatusCode::OK);
        assert!(state.store().is_loaded());

        let summary = summary_handler(State(state)).await;
        assert_eq!(summary.status(), StatusCode::OK);
    }
}
