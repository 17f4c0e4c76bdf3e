use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;

use prostcounter::database::{festival_repo, schema, stats_repo};
use prostcounter::services::achievement_service;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env");
    let pool = SqlitePoolOptions::new()
        .connect(&db_url)
        .await
        .expect("Cannot connect to DB");

    schema::ensure_schema(&pool)
        .await
        .expect("Schema bootstrap failed");

    // Recompute against a given festival, or the active one by default.
    let festival_id = match env::var("FESTIVAL_ID").ok() {
        Some(id) => id,
        None => match festival_repo::load_active_festival(&pool).await {
            Ok(Some(festival)) => festival.festival_id,
            Ok(None) => {
                eprintln!("no active festival and FESTIVAL_ID not set");
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("cannot load active festival: {}", e);
                std::process::exit(1);
            }
        },
    };

    let participants = match stats_repo::list_participant_ids(&pool, &festival_id).await {
        Ok(ids) => ids,
        Err(e) => {
            eprintln!("cannot list participants: {}", e);
            std::process::exit(1);
        }
    };

    let mut users = 0usize;
    let mut unlocked = 0usize;
    let mut failed = 0usize;

    for user_id in &participants {
        match achievement_service::evaluate_for_user(&pool, user_id, &festival_id).await {
            Ok(count) => {
                users += 1;
                unlocked += count;
            }
            Err(e) => {
                eprintln!("evaluation failed for {}: {}", user_id, e);
                failed += 1;
            }
        }
    }

    println!(
        "achievement recompute: festival={}, users={}, new_unlocks={}, failed={}",
        festival_id, users, unlocked, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}
