use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::Uri;
use axum::routing::get;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::{
    ServeArgs,
    config::{Overrides, Settings},
    server::{Reply, ServerError, Site},
};

/// Resolve one request on the blocking pool; compilation may spawn processes.
async fn handle(State(site): State<Arc<Site>>, uri: Uri) -> Result<Reply, ServerError> {
    let path = uri.path().to_string();
    tokio::task::spawn_blocking(move || site.serve(&path)).await?
}

pub fn router(site: Arc<Site>) -> Router {
    Router::new()
        .route("/", get(handle))
        .route("/{*path}", get(handle))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(site)
}

pub async fn run(args: &ServeArgs) -> Result<(), anyhow::Error> {
    let overrides = Overrides {
        title: args.title.clone(),
        header: args.header.clone(),
        no_default_styles: args.no_default_styles,
        export: args.export,
    };
    let settings = Settings::load(&args.dir, args.config_file.as_deref(), &overrides)?;

    tracing::info!(dir = %settings.dir.display(), title = %settings.title, "serving documents");
    if settings.export.enabled {
        tracing::info!(dir = %settings.export_dir().display(), "exporting responses");
    }

    let site = Arc::new(Site::new(settings)?);
    let app = router(site);

    // Parse the address
    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    // Determine the URL to display
    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}", display_host, args.port);

    tracing::info!(%url, "listening, press Ctrl+C to stop");

    // Open browser if requested
    if args.open
        && let Err(e) = open::that(&url)
    {
        tracing::warn!(error = %e, "failed to open browser");
    }

    // Start the server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
