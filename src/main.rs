use std::{process, sync::Arc};

use memoria::{
    application::{
        error::AppError,
        repos::HealthRepo,
        timeline::{TimelineRepos, TimelineService},
        voices::VoiceService,
    },
    cache::{CacheConfig, TimelineCache, VoiceGroupCache},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AdminState, HttpState},
        telemetry,
    },
    util::timezone::format_utc_offset,
};
use tokio::{sync::watch, try_join};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

struct ApplicationContext {
    http_state: HttpState,
    admin_state: AdminState,
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let app = build_application_context(repositories, &settings);
    serve_http(&settings, app).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

fn build_application_context(
    repositories: Arc<PostgresRepositories>,
    settings: &config::Settings,
) -> ApplicationContext {
    let cache_config = CacheConfig::from(&settings.cache);
    let offset = settings.timeline.utc_offset;

    let timeline_cache = Arc::new(TimelineCache::new(&cache_config, offset));
    let voice_cache = Arc::new(VoiceGroupCache::new(&cache_config));

    let dynamics = Arc::new(repositories.dynamics());
    let lives = Arc::new(repositories.lives());
    let timeline = Arc::new(TimelineService::new(
        TimelineRepos {
            dynamics: dynamics.clone(),
            lives: lives.clone(),
            dynamics_writer: dynamics,
            lives_writer: lives,
        },
        timeline_cache,
    ));
    let voices = Arc::new(VoiceService::new(
        repositories.clone(),
        repositories.clone(),
        voice_cache,
    ));
    let health: Arc<dyn HealthRepo> = repositories;

    info!(
        utc_offset = %format_utc_offset(offset),
        day_detail_limit = cache_config.day_detail_limit,
        voice_owner_limit = cache_config.voice_owner_limit,
        "Caches initialised"
    );

    ApplicationContext {
        http_state: HttpState {
            timeline: timeline.clone(),
            voices: voices.clone(),
            health: health.clone(),
        },
        admin_state: AdminState {
            timeline,
            voices,
            health,
        },
    }
}

async fn serve_http(settings: &config::Settings, app: ApplicationContext) -> Result<(), AppError> {
    let public_router = http::with_cors(
        http::build_router(app.http_state),
        &settings.server.allow_origins,
    );
    let admin_router = http::build_admin_router(app.admin_state);

    let public_addr = settings.server.public_addr;
    let admin_addr = settings.server.admin_addr;
    let public_listener = tokio::net::TcpListener::bind(public_addr)
        .await
        .map_err(|err| AppError::from(InfraError::bind(public_addr, err)))?;
    let admin_listener = tokio::net::TcpListener::bind(admin_addr)
        .await
        .map_err(|err| AppError::from(InfraError::bind(admin_addr, err)))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let grace = settings.server.graceful_shutdown;

    let public_server = axum::serve(public_listener, public_router.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()));
    let admin_server = axum::serve(admin_listener, admin_router.into_make_service())
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx.clone()));

    info!(%public_addr, %admin_addr, "Listening");

    let servers = async {
        try_join!(public_server, admin_server)
            .map(|_| ())
            .map_err(|err| AppError::unexpected(format!("server error: {err}")))
    };
    tokio::pin!(servers);

    tokio::select! {
        result = &mut servers => return result,
        () = ctrl_c() => {}
    }

    info!(
        grace_seconds = grace.as_secs(),
        "Shutdown requested, draining connections"
    );
    let _ = shutdown_tx.send(true);
    match tokio::time::timeout(grace, servers).await {
        Ok(result) => result?,
        Err(_) => warn!("Graceful shutdown timed out, dropping open connections"),
    }

    info!("Stopped");
    Ok(())
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stopping| *stopping).await;
}
