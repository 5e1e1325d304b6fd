use scorpion_world::auth::{BotTokenValidator, InitDataValidator};
use scorpion_world::clock::{Clock, SystemClock};
use scorpion_world::orchestration::{Onboarding, ReferralLedger, SessionManager, TaskBoard};
use scorpion_world::{api, config::Config, db::init_db, Repository};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match init_db(&config.database_path).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let port = config.port;
    let repo = Arc::new(Repository::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let validator: Arc<dyn InitDataValidator> =
        Arc::new(BotTokenValidator::new(&config.bot_token));

    let onboarding = Arc::new(Onboarding::new(repo.clone(), clock.clone()));
    let ledger = Arc::new(ReferralLedger::new(
        repo.clone(),
        clock.clone(),
        config.referral_bonus,
    ));
    let sessions = Arc::new(SessionManager::new(
        repo.clone(),
        clock.clone(),
        config.clone(),
    ));
    let tasks = Arc::new(TaskBoard::new(repo.clone()));

    let app = api::create_router(api::AppState::new(
        repo, validator, onboarding, ledger, sessions, tasks,
    ));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
