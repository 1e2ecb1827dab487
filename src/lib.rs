//! Shelf application library
//!
//! Hosts the application modules and the bootstrap shared by the `shelf-app`
//! binary and the `shelf` CLI.

pub mod modules;

use anyhow::Context;
use axum::Router;
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

/// Re-export commonly used types
pub use modules::*;

/// Register, initialize and start every module, then build the HTTP router
/// over them.
pub async fn build_app(settings: &Settings) -> anyhow::Result<(ModuleRegistry, Router)> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry).context("failed to register modules")?;

    let ctx = InitCtx { settings };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let router = shelf_http::build_router(&registry, settings);
    Ok((registry, router))
}

/// Run the service until a shutdown signal arrives, then stop every module.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let (registry, router) = build_app(&settings).await?;

    tracing::info!(
        env = ?settings.environment,
        modules = registry.len(),
        "shelf bootstrap complete"
    );

    let served = shelf_http::start_server(router, &settings).await;
    registry.stop_all().await?;
    served
}
