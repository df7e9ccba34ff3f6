use dotenvy::dotenv;
use fitness_tracker::{
    config::{database, settings},
    errors::Result,
    repository::FitnessRepository,
    state::FitnessState,
    timer::{MeditationTimer, TimerDriver},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();

    // 3. Load settings, falling back to defaults when fitness.toml is absent
    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {}", e))?;

    // 4. Open and migrate the record store
    let database_url = settings.database_url();
    let db = database::open_store(&database_url)
        .await
        .inspect(|_| info!("Record store ready at {}", database_url))
        .inspect_err(|e| error!("Failed to open record store: {}", e))?;

    let repository = FitnessRepository::new(db).await?;
    let state = FitnessState::new(repository.clone());

    // 5. Restore the remembered login
    let saved = state.saved_login().await?;
    if saved.is_logged_in {
        info!("Welcome back, {}", saved.username);
    } else {
        info!("No remembered login; registration or login required");
    }

    info!(
        "Stored: {} workouts, {} meals, {} meditation sessions",
        repository.all_workouts().borrow().len(),
        repository.all_meals().borrow().len(),
        repository.all_meditation_sessions().borrow().len()
    );

    // 6. Prepare the meditation timer with the configured defaults
    let timer = MeditationTimer::new(
        settings.timer.default_minutes,
        settings.timer.meditation_type()?,
    );
    let driver = TimerDriver::new(timer, state.clone(), settings.timer.tick_period());
    let snapshot = driver.snapshot();
    info!(
        "Meditation timer: {} {} session",
        snapshot.remaining_display(),
        snapshot.kind
    );

    state.flush().await?;
    state.close();
    Ok(())
}
