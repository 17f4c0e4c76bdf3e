use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use dotenvy::dotenv;
use http::header::{HeaderValue, CACHE_CONTROL};
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::net::SocketAddr;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use prostcounter::database::schema;
use prostcounter::web::middleware::auth as auth_middleware;
use prostcounter::web::routes::{
    achievements, attendance, auth, calendar, festivals, gallery, groups, photos, profile,
    reservations, sync,
};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // 1. Start logging
    tracing_subscriber::fmt::init();

    // 2. Connect to the database
    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env");
    println!("Connecting to database: {}", db_url);

    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("Cannot connect to DB");

    schema::ensure_schema(&pool)
        .await
        .expect("Schema bootstrap failed");

    // 3. Protected routes under one middleware layer
    let protected_routes = Router::new()
        .route("/festivals", get(festivals::list_festivals_handler))
        .route("/festivals/active", get(festivals::active_festival_handler))
        .route("/tents", get(festivals::list_tents_handler))
        .route(
            "/festivals/:festival_id/attendance",
            get(attendance::list_attendance_handler).post(attendance::upsert_attendance_handler),
        )
        .route(
            "/festivals/:festival_id/attendance/:date",
            delete(attendance::delete_attendance_handler),
        )
        .route(
            "/festivals/:festival_id/calendar",
            get(calendar::personal_calendar_handler),
        )
        .route(
            "/festivals/:festival_id/reservations",
            get(reservations::list_reservations_handler)
                .post(reservations::create_reservation_handler),
        )
        .route(
            "/reservations/:reservation_id/cancel",
            post(reservations::cancel_reservation_handler),
        )
        .route(
            "/festivals/:festival_id/achievements",
            get(achievements::list_achievements_handler),
        )
        .route(
            "/festivals/:festival_id/stats",
            get(achievements::festival_stats_handler),
        )
        .route(
            "/festivals/:festival_id/photos",
            post(gallery::upload_photo_handler),
        )
        .route("/photos/:photo_id", get(photos::photo_proxy))
        .route("/groups", post(groups::create_group_handler))
        .route("/groups/join", post(groups::join_group_handler))
        .route("/groups/:group_id", get(groups::group_detail_handler))
        .route("/groups/:group_id/leave", post(groups::leave_group_handler))
        .route(
            "/groups/:group_id/leaderboard",
            get(groups::leaderboard_handler),
        )
        .route(
            "/groups/:group_id/criteria",
            put(groups::update_criteria_handler),
        )
        .route(
            "/groups/:group_id/calendar",
            get(calendar::group_calendar_handler),
        )
        .route(
            "/groups/:group_id/gallery",
            get(gallery::group_gallery_handler),
        )
        .route(
            "/profile",
            get(profile::profile_handler).put(profile::update_profile_handler),
        )
        .route("/sync/operations", post(sync::enqueue_operation_handler))
        .route("/sync/failed", get(sync::failed_operations_handler))
        .route("/sync/pending-count", get(sync::pending_count_handler))
        .route(
            "/sync/:operation_id/retry",
            post(sync::retry_operation_handler),
        )
        .route("/sync/retry-all", post(sync::retry_all_handler))
        .route("/sync/dismiss-all", post(sync::dismiss_all_handler))
        .route("/logout", post(auth::logout_handler))
        .layer(middleware::from_fn_with_state(
            pool.clone(),
            auth_middleware::require_auth,
        ));

    // 4. Build the whole application
    let app = Router::new()
        // Public routes
        .route("/login", post(auth::login_handler))
        .route("/health", get(|| async { "ok" }))
        // Protected routes
        .merge(protected_routes)
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        // State
        .with_state(pool);

    // 5. Start the server (with fallback port)
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .expect("Cannot parse host/port");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!(
                "Could not bind on {}: {}. Trying fallback {}:{}",
                addr,
                e,
                host,
                port + 1
            );
            let fallback: SocketAddr = format!("{}:{}", host, port + 1)
                .parse()
                .expect("Cannot parse fallback address");
            tokio::net::TcpListener::bind(fallback)
                .await
                .expect("Cannot bind on fallback port")
        }
    };

    let bound_addr = listener.local_addr().unwrap();
    println!("Server running on http://{}", bound_addr);

    axum::serve(listener, app).await.unwrap();
}
