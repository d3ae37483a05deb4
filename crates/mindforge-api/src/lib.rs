//! # mindforge-api
//!
//! HTTP server for the MindForge backend: accounts, notebooks, sources,
//! notes, the AnythingLLM chat proxy and the community features.
//!
//! [`router`] builds every route behind the bearer-token middleware; the
//! binary adds static file serving and the transport layers (tracing,
//! request ids, CORS, body limit).

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;

use axum::{
    routing::{get, post, put},
    Router,
};

pub use config::Config;
pub use error::ApiError;
pub use state::AppState;

use handlers::{
    admin, announcements, auth as auth_routes, calendar, chat, feedback, forum, notebooks, notes,
    sources, system, users,
};

/// All application routes with authentication applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health_check))
        // Auth
        .route("/api/auth", post(auth_routes::auth))
        .route("/api/auth/register", post(auth_routes::register))
        .route("/api/auth/login", post(auth_routes::login))
        // Own account
        .route("/api/user/me", get(users::me))
        .route("/api/user/password", put(users::change_password))
        .route(
            "/api/user/avatar",
            get(users::get_avatar).post(users::upload_avatar),
        )
        .route("/api/user/email", put(users::update_email))
        // Admin
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/by-email", get(admin::user_by_email))
        .route("/api/admin/users/password", put(admin::reset_password))
        .route(
            "/api/admin/users/:id",
            axum::routing::delete(admin::delete_user),
        )
        .route("/api/admin/feedback", get(admin::list_feedback))
        .route("/api/admin/stats", get(admin::stats))
        // Notebooks
        .route(
            "/api/notebooks",
            get(notebooks::list_notebooks).post(notebooks::create_notebook),
        )
        .route(
            "/api/notebooks/:id",
            get(notebooks::get_notebook)
                .put(notebooks::rename_notebook)
                .delete(notebooks::delete_notebook),
        )
        // Sources
        .route("/api/sources", get(sources::list_sources))
        .route("/api/sources/upload", post(sources::upload_source))
        .route("/api/sources/convert-note", post(sources::convert_note))
        // Notes
        .route(
            "/api/notes",
            get(notes::list_notes).post(notes::create_note),
        )
        .route("/api/notes/generate", post(notes::generate_note))
        .route("/api/notes/import", post(notes::import_notebook))
        .route(
            "/api/notes/:id",
            put(notes::update_note).delete(notes::delete_note),
        )
        // Chat
        .route("/api/chat", post(chat::chat))
        .route("/api/chat/simple", post(chat::simple_chat))
        .route("/api/chat/ollama", post(chat::legacy_chat))
        .route("/api/chat/:slug/history", get(chat::chat_history))
        // Forum
        .route(
            "/api/posts",
            get(forum::list_posts).post(forum::create_post),
        )
        .route("/api/posts/page", get(forum::list_posts_page))
        .route("/api/posts/search", get(forum::search_posts))
        .route(
            "/api/posts/:id",
            get(forum::get_post)
                .put(forum::update_post)
                .delete(forum::delete_post),
        )
        .route("/api/posts/:id/like", post(forum::like_post))
        .route("/api/posts/:id/comments", get(forum::list_post_comments))
        .route(
            "/api/comments",
            get(forum::list_comments).post(forum::create_comment),
        )
        .route("/api/comments/page", get(forum::list_comments_page))
        .route("/api/comments/search", get(forum::search_comments))
        .route(
            "/api/comments/:id",
            put(forum::update_comment).delete(forum::delete_comment),
        )
        // Announcements
        .route(
            "/api/announcements",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route(
            "/api/announcements/page",
            get(announcements::list_announcements_page),
        )
        .route(
            "/api/announcements/search",
            get(announcements::search_announcements),
        )
        .route(
            "/api/announcements/:id",
            get(announcements::get_announcement)
                .put(announcements::update_announcement)
                .delete(announcements::delete_announcement),
        )
        // Feedback and uploads
        .route("/api/feedback", post(feedback::submit_feedback))
        .route("/api/upload-to-oss", post(feedback::upload_blob))
        // Calendar
        .route(
            "/api/events",
            get(calendar::list_events).post(calendar::create_event),
        )
        .route(
            "/api/events/:id",
            axum::routing::delete(calendar::delete_event),
        )
        .route("/api/punch", post(calendar::punch))
        .route("/api/punch/:user_id", post(calendar::punch_for))
        .route("/api/punch-records", get(calendar::punch_records))
        .route(
            "/api/punch-records/:user_id",
            get(calendar::punch_records_for),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state)
}
