use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use domain::services::NotificationPublisher;
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{
    board, chat, groups, health, members, notifications, regions, signaling, users,
};
use crate::services::{
    BoardService, ChatService, MembershipService, NotificationDispatcher, RealtimeHub,
    SignalingRelay,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    /// Per-user notification channels.
    pub hub: Arc<RealtimeHub>,
    /// Where committed notifications are pushed. The hub in production.
    pub publisher: Arc<dyn NotificationPublisher>,
    pub relay: Arc<SignalingRelay>,
}

impl AppState {
    /// Builds the state, parsing the JWT keys once.
    pub fn new(config: Config, pool: PgPool) -> Result<Self, JwtError> {
        let jwt = JwtConfig::from_rsa_pem(
            &config.jwt.private_key,
            &config.jwt.public_key,
            config.jwt.access_token_expiry_secs,
            config.jwt.leeway_secs,
        )?;
        let hub = Arc::new(RealtimeHub::new(config.realtime.subscriber_buffer));

        Ok(Self {
            pool,
            config: Arc::new(config),
            jwt: Arc::new(jwt),
            publisher: hub.clone(),
            hub,
            relay: Arc::new(SignalingRelay::new()),
        })
    }

    /// Replaces the push target, keeping the hub for stream subscriptions.
    pub fn with_publisher(mut self, publisher: Arc<dyn NotificationPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn dispatcher(&self) -> NotificationDispatcher {
        NotificationDispatcher::new(
            self.pool.clone(),
            self.publisher.clone(),
            self.config.limits.unread_fetch_limit,
        )
    }

    pub fn membership(&self) -> MembershipService {
        MembershipService::new(self.pool.clone(), self.dispatcher())
    }

    pub fn chat(&self) -> ChatService {
        ChatService::new(self.pool.clone())
    }

    pub fn board(&self) -> BoardService {
        BoardService::new(self.pool.clone())
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    Ok(create_router(AppState::new(config, pool)?))
}

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // JSON API; every handler authenticates through the `Caller` extractor
    let api_routes = Router::new()
        // Users and regions
        .route("/api/v1/users/me", get(users::get_me))
        .route("/api/v1/users/me/profile", put(users::update_profile))
        .route("/api/v1/regions", get(regions::list_regions))
        // Groups
        .route(
            "/api/v1/groups",
            post(groups::create_group).get(groups::list_groups),
        )
        .route("/api/v1/groups/me", get(groups::my_groups))
        .route("/api/v1/groups/recommended", get(groups::recommended_groups))
        .route(
            "/api/v1/groups/:group_id",
            get(groups::get_group)
                .put(groups::update_group)
                .delete(groups::delete_group),
        )
        .route("/api/v1/groups/:group_id/join", post(members::request_to_join))
        .route(
            "/api/v1/groups/:group_id/members/me",
            delete(members::leave_group),
        )
        .route(
            "/api/v1/groups/:group_id/members/:user_id",
            delete(members::kick_member),
        )
        .route(
            "/api/v1/groups/:group_id/applications",
            get(members::list_applications),
        )
        .route(
            "/api/v1/group-members/:member_id/approve",
            post(members::approve_member),
        )
        .route(
            "/api/v1/group-members/:member_id/reject",
            post(members::reject_member),
        )
        // Board
        .route(
            "/api/v1/groups/:group_id/posts",
            get(board::list_posts).post(board::create_post),
        )
        .route(
            "/api/v1/posts/:post_id",
            get(board::get_post)
                .put(board::update_post)
                .delete(board::delete_post),
        )
        .route(
            "/api/v1/posts/:post_id/comments",
            get(board::list_comments).post(board::create_comment),
        )
        .route(
            "/api/v1/comments/:comment_id",
            put(board::update_comment).delete(board::delete_comment),
        )
        // Chat
        .route(
            "/api/v1/chat-rooms/group/:group_id",
            get(chat::get_room_for_group),
        )
        .route(
            "/api/v1/chat-rooms/:room_id/messages",
            get(chat::get_messages),
        )
        // Notifications
        .route(
            "/api/v1/notifications/unread",
            get(notifications::list_unread),
        )
        .route(
            "/api/v1/notifications/badge-count",
            get(notifications::badge_count),
        )
        .route(
            "/api/v1/notifications/read-all",
            post(notifications::mark_all_read),
        )
        .route(
            "/api/v1/notifications/:notification_id/read",
            post(notifications::mark_read),
        )
        .layer(CompressionLayer::new());

    // WebSocket upgrades stay outside compression
    let mut realtime_routes = Router::new().route(
        "/api/v1/notifications/stream",
        get(notifications::notification_stream),
    );
    if config.realtime.signaling_enabled {
        realtime_routes =
            realtime_routes.route("/api/v1/signaling", get(signaling::signaling_ws));
    }

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .merge(realtime_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
