//! pagelift-api — HTTP API server for the pagelift back office.
//!
//! The library exposes the router assembly and shared state so integration
//! tests can drive the full HTTP surface without binding a socket.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation when chasing a request across the sync services.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Maximum accepted request body (uploads included).
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// CORS policy for the public capture surface: any origin, read + submit
/// only.
fn public_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// CORS policy for the admin dashboard: single configured origin with
/// credentials.
fn admin_cors(origin: &str) -> CorsLayer {
    let allow_origin = match origin.parse::<HeaderValue>() {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            warn!(
                subsystem = "api",
                component = "cors",
                origin = %origin,
                "CORS_ORIGIN is not a valid origin; admin CORS will reject browsers"
            );
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Assemble the full application router.
pub fn build_router(state: AppState) -> Router {
    use handlers::auth as auth_handlers;
    use handlers::{
        analytics, ga4, google_oauth, health, integrated, landing_pages, lead_notes, leads,
        linkedin, public, search_console, seo_dashboard, templates, uploads, users,
    };

    // No auth; permissive CORS. The OAuth callbacks live here because the
    // provider, not the dashboard, calls them.
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/db-check", get(health::db_check))
        .route(
            "/api/public/landing-pages/:slug",
            get(public::get_public_landing_page),
        )
        .route("/api/public/pages/:slug", get(public::get_public_page_html))
        .route("/api/public/leads", post(public::submit_lead))
        .route(
            "/api/admin/google/oauth/callback",
            get(google_oauth::callback),
        )
        .route(
            "/api/admin/linkedin/oauth/callback",
            get(linkedin::callback),
        )
        .layer(public_cors());

    // Everything else authenticates via the bearer-token extractor.
    let admin_routes = Router::new()
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/verify", get(auth_handlers::verify))
        .route("/api/admin/users", get(users::list_users))
        // Landing pages
        .route(
            "/api/admin/landing-pages",
            post(landing_pages::create_landing_page).get(landing_pages::list_landing_pages),
        )
        .route(
            "/api/admin/landing-pages/stats",
            get(landing_pages::landing_page_stats),
        )
        .route(
            "/api/admin/landing-pages/:id",
            get(landing_pages::get_landing_page)
                .put(landing_pages::update_landing_page)
                .delete(landing_pages::delete_landing_page),
        )
        .route(
            "/api/admin/landing-pages/:id/publish",
            post(landing_pages::publish_landing_page),
        )
        // Leads
        .route("/api/admin/leads", get(leads::list_leads))
        .route("/api/admin/leads/export", get(leads::export_leads))
        .route(
            "/api/admin/leads/:id",
            get(leads::get_lead).patch(leads::update_lead_status),
        )
        .route("/api/admin/leads/:id/assign", patch(leads::assign_lead))
        .route(
            "/api/admin/leads/:id/notes",
            get(lead_notes::list_lead_notes).post(lead_notes::create_lead_note),
        )
        .route(
            "/api/admin/leads/notes/:note_id",
            delete(lead_notes::delete_lead_note),
        )
        // Templates
        .route("/api/admin/templates", get(templates::list_templates))
        .route("/api/admin/templates/:id", get(templates::get_template))
        // Lead analytics dashboard
        .route(
            "/api/admin/analytics/dashboard",
            get(analytics::lead_dashboard),
        )
        // GA4
        .route(
            "/api/admin/analytics/properties",
            get(ga4::list_properties).post(ga4::add_property),
        )
        .route("/api/admin/analytics/sync", post(ga4::sync_analytics))
        .route("/api/admin/analytics/metrics", get(ga4::get_metrics))
        .route("/api/admin/analytics/page-views", get(ga4::get_page_views))
        .route("/api/admin/analytics/events", get(ga4::get_events))
        .route(
            "/api/admin/analytics/ga4-dashboard",
            get(ga4::ga4_dashboard),
        )
        // Search Console / SEO
        .route(
            "/api/admin/seo/search-console/sites",
            get(search_console::get_sites),
        )
        .route(
            "/api/admin/seo/search-console/sync",
            post(search_console::sync_keywords),
        )
        .route("/api/admin/seo/keywords", get(search_console::get_keywords))
        .route(
            "/api/admin/seo/keywords/top",
            get(search_console::get_top_keywords),
        )
        .route(
            "/api/admin/seo/keywords/declining",
            get(search_console::get_declining_keywords),
        )
        .route(
            "/api/admin/seo/keywords/export",
            get(search_console::export_keywords),
        )
        .route(
            "/api/admin/seo/keywords/:keyword/trend",
            get(search_console::get_keyword_trend),
        )
        .route(
            "/api/admin/seo/indexing-issues",
            get(search_console::get_indexing_issues),
        )
        // Unified SEO dashboard
        .route("/api/admin/seo-dashboard", get(seo_dashboard::seo_dashboard))
        // Integrated analytics
        .route(
            "/api/admin/integrated-analytics/landing-pages",
            get(integrated::all_pages_performance),
        )
        .route(
            "/api/admin/integrated-analytics/landing-pages/:id",
            get(integrated::page_performance),
        )
        // Google OAuth
        .route(
            "/api/admin/google/oauth/authorize",
            get(google_oauth::authorize),
        )
        .route("/api/admin/google/oauth/status", get(google_oauth::status))
        .route(
            "/api/admin/google/oauth/disconnect",
            delete(google_oauth::disconnect),
        )
        // LinkedIn
        .route(
            "/api/admin/linkedin/oauth/authorize",
            get(linkedin::authorize),
        )
        .route("/api/admin/linkedin/status", get(linkedin::status))
        .route("/api/admin/linkedin/disconnect", post(linkedin::disconnect))
        .route(
            "/api/admin/linkedin/posts",
            post(linkedin::publish_post).get(linkedin::post_history),
        )
        .route("/api/admin/linkedin/stats", get(linkedin::post_stats))
        // Uploads
        .route(
            "/api/admin/uploads/image",
            post(uploads::upload_image).delete(uploads::delete_image),
        )
        .layer(admin_cors(&state.config.cors_origin));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
