//!
//! tribuna HTTP server
//! -------------------
//! Axum-based API behind the club's business dashboard front end.
//!
//! Responsibilities:
//! - Session management with a simple cookie + CSRF token model.
//! - Login/logout endpoints backed by the `identity` module.
//! - Navigation endpoint mapping the session's permissions to sidebar entries.
//! - Section endpoints returning report payloads from the pre-aggregated
//!   tables; a failed query renders a placeholder payload, never a 5xx.

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use tokio::sync::RwLock;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::identity::{LoginRequest, Principal, SessionManager, SqlAuthProvider};
use crate::reports::hospitality::Slot;
use crate::reports::{self, ReportPayload};
use crate::sections::Section;
use crate::{nav, queries, security};

const SESSION_COOKIE: &str = "tribuna_session";

/// Shared server state injected into all handlers.
///
/// Holds the connection pool, the auth provider (which owns the in-process
/// session tables) and the session-token -> CSRF-token map.
#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub auth: Arc<SqlAuthProvider>,
    pub csrf_tokens: Arc<RwLock<HashMap<String, String>>>,
}

impl AppState {
    pub fn new(pool: MySqlPool) -> Self {
        AppState {
            pool: pool.clone(),
            auth: Arc::new(SqlAuthProvider::new(pool, SessionManager::default())),
            csrf_tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolve the session behind the request cookie. A token that no longer
    /// validates (expired or revoked) also loses its CSRF entry here, so the
    /// map does not accumulate entries for sessions that never log out.
    pub async fn session_principal(&self, headers: &HeaderMap) -> Option<Principal> {
        let token = parse_cookie(headers, SESSION_COOKIE)?;
        match self.auth.sm.validate(&token) {
            Some(principal) => Some(principal),
            None => {
                self.csrf_tokens.write().await.remove(&token);
                None
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(serde_json::json!({"status": "error", "error": self}))).into_response()
    }
}

pub async fn run() -> anyhow::Result<()> {
    let cfg = ServerConfig::from_env()?;
    run_with_config(cfg).await
}

pub async fn run_with_config(cfg: ServerConfig) -> anyhow::Result<()> {
    info!("connecting to {}", cfg.db.redacted_url());
    // Lazy pool: the dashboard must come up even when the database is down,
    // pages render their error placeholder until it returns.
    let pool = MySqlPoolOptions::new().max_connections(8).connect_lazy(&cfg.db.url())?;

    if let Err(e) = security::init_users_table(&pool).await {
        error!("user table bootstrap failed (continuing): {e}");
    }

    let app_state = AppState::new(pool);

    let app = router(app_state);
    let addr: SocketAddr = format!("0.0.0.0:{}", cfg.http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "tribuna ok" }))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/csrf", get(get_csrf))
        .route("/nav", get(get_nav))
        .route("/section/{slug}", get(get_section))
        .with_state(state)
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name {
                return Some(v[1..].to_string());
            }
        }
    }
    None
}

async fn validate_csrf(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(token) = parse_cookie(headers, SESSION_COOKIE) else {
        return false;
    };
    let Some(provided) = headers.get("x-csrf-token").and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let cmap = state.csrf_tokens.read().await;
    match cmap.get(&token) {
        Some(expected) => expected == provided,
        None => false,
    }
}

fn set_session_cookie(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{}={}; HttpOnly; Secure; SameSite=Strict; Path=/",
        SESSION_COOKIE, token
    ))
    .unwrap()
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; Secure; SameSite=Strict; Path=/",
        SESSION_COOKIE
    ))
    .unwrap()
}

fn gen_csrf() -> String {
    let mut bytes = [0u8; 32];
    let _ = getrandom::getrandom(&mut bytes);
    let mut out = String::with_capacity(64);
    use std::fmt::Write as _;
    for b in &bytes {
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username: String,
    password: String,
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> Response {
    let req = LoginRequest { username: payload.username, password: payload.password };
    match state.auth.login(&req).await {
        Ok(resp) => {
            let csrf = gen_csrf();
            {
                let mut cmap = state.csrf_tokens.write().await;
                cmap.insert(resp.session.token.clone(), csrf);
            }
            let mut headers = HeaderMap::new();
            headers.insert("Set-Cookie", set_session_cookie(&resp.session.token));
            (
                StatusCode::OK,
                headers,
                Json(serde_json::json!({
                    "status": "ok",
                    "user": resp.session.principal,
                })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if !validate_csrf(&state, &headers).await {
        return AppError::forbidden("invalid_csrf", "Token CSRF no válido").into_response();
    }
    if let Some(token) = parse_cookie(&headers, SESSION_COOKIE) {
        state.auth.sm.logout(&token);
        let mut cmap = state.csrf_tokens.write().await;
        cmap.remove(&token);
    }
    let mut h = HeaderMap::new();
    h.insert("Set-Cookie", clear_session_cookie());
    (StatusCode::OK, h, Json(serde_json::json!({"status": "ok"}))).into_response()
}

async fn get_csrf(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if state.session_principal(&headers).await.is_none() {
        return unauthenticated().into_response();
    }
    let Some(token) = parse_cookie(&headers, SESSION_COOKIE) else {
        return unauthenticated().into_response();
    };
    let cmap = state.csrf_tokens.read().await;
    match cmap.get(&token) {
        Some(csrf) => {
            (StatusCode::OK, Json(serde_json::json!({"status": "ok", "csrf": csrf}))).into_response()
        }
        None => {
            AppError::internal("csrf_missing".to_string(), "csrf token not available".to_string())
                .into_response()
        }
    }
}

async fn get_nav(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(principal) = state.session_principal(&headers).await else {
        return unauthenticated().into_response();
    };
    let path = params.get("path").map(String::as_str).unwrap_or("/");
    let entries = nav::visible_entries(&principal.permissions, path);
    Json(serde_json::json!({"status": "ok", "entries": entries})).into_response()
}

async fn get_section(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(principal) = state.session_principal(&headers).await else {
        return unauthenticated().into_response();
    };

    if slug == "inicio" {
        return Json(section_or_placeholder(home_payload(&state).await, "inicio")).into_response();
    }
    let Some(section) = Section::from_slug(&slug) else {
        return AppError::not_found("unknown_section".to_string(), format!("unknown section '{}'", slug))
            .into_response();
    };
    if !principal.permissions.allows(section) {
        return AppError::forbidden("section_forbidden", "No tienes acceso a esta sección")
            .into_response();
    }

    let payload = match section {
        Section::Stadium => {
            let page = params.get("page").map(String::as_str).unwrap_or("entradas");
            stadium_payload(&state, page).await
        }
        Section::Museum => Ok(reports::home::museum()),
        Section::Retail => retail_payload(&state).await,
        Section::Hospitality => {
            let slot = params.get("franja").and_then(|s| Slot::from_slug(s));
            hospitality_payload(&state, slot).await
        }
    };
    Json(section_or_placeholder(payload, &slug)).into_response()
}

fn unauthenticated() -> AppError {
    AppError::auth("unauthenticated", "Inicia sesión para continuar")
}

/// Page-boundary error handling: a failed query is logged and the section
/// renders its error placeholder with HTTP 200.
fn section_or_placeholder(result: AppResult<ReportPayload>, slug: &str) -> ReportPayload {
    match result {
        Ok(payload) => payload,
        Err(e) => {
            error!(section = slug, "section query failed: {}", e);
            ReportPayload::error(&e.to_string())
        }
    }
}

async fn stadium_payload(state: &AppState, page: &str) -> AppResult<ReportPayload> {
    match page {
        "cesiones" => {
            let matches = queries::pre_loan_matches(&state.pool).await?;
            let revenue = queries::pre_loan_revenue(&state.pool).await?;
            let sectors = queries::pre_loan_sectors(&state.pool).await?;
            Ok(reports::loans::build(&matches, &revenue, &sectors))
        }
        "asistencia" => {
            let kpis = queries::pre_attendance_kpis(&state.pool).await?;
            let sectors = queries::pre_attendance_sectors(&state.pool).await?;
            let streaks = queries::pre_attendance_streaks(&state.pool).await?;
            let matches = queries::pre_attendance_matches(&state.pool).await?;
            let ages = queries::pre_attendance_ages(&state.pool).await?;
            Ok(reports::attendance::build(&kpis, &sectors, &streaks, &matches, &ages))
        }
        _ => {
            let matches = queries::pre_ticket_matches(&state.pool).await?;
            let sectors = queries::pre_ticket_sectors(&state.pool).await?;
            Ok(reports::tickets::build(&matches, &sectors))
        }
    }
}

async fn hospitality_payload(state: &AppState, slot: Option<Slot>) -> AppResult<ReportPayload> {
    let matches = queries::pre_hospitality_matches(&state.pool).await?;
    let products = queries::pre_hospitality_products(&state.pool).await?;
    let outlets = queries::pre_hospitality_outlets(&state.pool).await?;
    let product_outlets = queries::pre_hospitality_product_outlets(&state.pool).await?;
    let payments = queries::pre_hospitality_payments(&state.pool).await?;
    Ok(reports::hospitality::build(&matches, &products, &outlets, &product_outlets, &payments, slot))
}

async fn retail_payload(state: &AppState) -> AppResult<ReportPayload> {
    let kpis = queries::pre_retail_kpis(&state.pool).await?;
    let matchdays = queries::pre_retail_matchdays(&state.pool).await?;
    let stores = queries::pre_retail_stores(&state.pool).await?;
    let products = queries::pre_retail_top_products(&state.pool).await?;
    let product_stores = queries::pre_retail_product_stores(&state.pool).await?;
    let channels = queries::pre_retail_channels(&state.pool).await?;
    Ok(reports::retail::build(&kpis, &matchdays, &stores, &products, &product_stores, &channels))
}

async fn home_payload(state: &AppState) -> AppResult<ReportPayload> {
    let tickets = queries::pre_ticket_matches(&state.pool).await?;
    let hospitality = queries::pre_hospitality_matches(&state.pool).await?;
    let retail = queries::pre_retail_kpis(&state.pool).await?;
    Ok(reports::home::build(&tickets, &hospitality, &retail))
}
