use anyhow::Result;
use renderer::{Renderer, RendererError};
use shading::{to_rgba8, BASE_BACKGROUND};
use tracing_subscriber::EnvFilter;

use crate::bootstrap::{build_renderer_config, load_file_config};
use crate::cli::Args;

pub fn run(args: Args) -> Result<()> {
    initialise_tracing();

    let file = load_file_config(&args)?;
    let config = build_renderer_config(&args, &file)?;
    tracing::info!(
        mode = ?config.mode,
        size = ?config.surface_size,
        fullscreen = config.fullscreen,
        "bootstrapping backdrop"
    );

    let mut renderer = Renderer::new(config);
    match renderer.run() {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<RendererError>() {
            Some(renderer_err) if renderer_err.is_context_unavailable() => {
                tracing::warn!(
                    error = %renderer_err,
                    fallback = %fallback_color_hex(),
                    "graphics unavailable; leaving the static background in place"
                );
                Ok(())
            }
            _ => Err(err),
        },
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// CSS-style hex of the base background, what a page shows without animation.
fn fallback_color_hex() -> String {
    let [r, g, b, _] = to_rgba8(BASE_BACKGROUND.extend(1.0));
    format!("#{r:02x}{g:02x}{b:02x}")
}
