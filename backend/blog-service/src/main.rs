use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blog_service::cache::{LocalPageCache, PageCache, RedisPageCache};
use blog_service::db::{self, BlogRepository, MemoryRepository, PgRepository};
use blog_service::middleware::SessionAuth;
use blog_service::security::SessionKeys;
use blog_service::services::MediaStorage;
use blog_service::{handlers, AppState, Config};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable ({}); waiting for Ctrl+C", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn build_repository(config: &Config) -> anyhow::Result<Arc<dyn BlogRepository>> {
    if config.database.url.is_none() {
        tracing::warn!("DATABASE_URL not set; using the in-memory store (data is lost on exit)");
        return Ok(Arc::new(MemoryRepository::new()));
    }

    let pool = db::create_pool(&config.database)
        .await
        .context("Failed to connect to PostgreSQL")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(Arc::new(PgRepository::new(pool)))
}

async fn build_cache(config: &Config) -> Arc<dyn PageCache> {
    match config.cache.redis_url.as_deref() {
        Some(url) => match RedisPageCache::connect(url).await {
            Ok(cache) => {
                tracing::info!("Listing cache backed by Redis");
                Arc::new(cache)
            }
            Err(e) => {
                tracing::warn!("Redis unavailable ({}); using the in-process cache", e);
                Arc::new(LocalPageCache::new())
            }
        },
        None => Arc::new(LocalPageCache::new()),
    }
}

/// Blog Service
///
/// Serves the blogging platform over HTTP: public listings, post pages,
/// authoring, comments, the follow graph and sessions.
///
/// # Commands
///
/// - no arguments: run the HTTP server
/// - `create-group <slug> <title> [description]`: add a community group
///
/// # Deployment
///
/// Listens on `BLOG_SERVICE_HOST:BLOG_SERVICE_PORT` (default `0.0.0.0:8080`).
/// PostgreSQL and Redis are optional outside production.
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.app.json_logs);
    blog_service::metrics::register_collectors();

    tracing::info!("Starting blog-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let repo = build_repository(&config).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(cmd) = args.first() {
        return match (cmd.as_str(), args.get(1), args.get(2)) {
            ("create-group", Some(slug), Some(title)) => {
                let description = args.get(3).map(String::as_str).unwrap_or("");
                let group = repo.create_group(slug, title, description).await?;
                tracing::info!(group_id = group.id, slug = %group.slug, "group created");
                Ok(())
            }
            _ => anyhow::bail!("usage: blog-service [create-group <slug> <title> [description]]"),
        };
    }

    let cache = build_cache(&config).await;

    let state = web::Data::new(AppState {
        repo,
        cache,
        sessions: Arc::new(SessionKeys::new(
            &config.session.secret,
            config.session.ttl_hours,
        )),
        media: Arc::new(MediaStorage::new(&config.media.root)),
        index_cache_ttl: Duration::from_secs(config.cache.index_ttl_secs),
    });

    let bind_address = (config.app.host.clone(), config.app.port);
    tracing::info!("HTTP server listening on {}:{}", bind_address.0, bind_address.1);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(SessionAuth)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(bind_address)?
    .run();

    let server_handle = server.handle();

    tokio::select! {
        result = server => {
            result.context("HTTP server failed")?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
        }
    }

    tracing::info!("blog-service shutting down");
    Ok(())
}
