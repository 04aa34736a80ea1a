mod actions;
mod catalog;
mod config;
mod error;
mod menu;
mod platform;
mod poller;
mod router;
#[cfg(test)]
mod testing;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::actions::Responder;
use crate::catalog::loader::load_catalog;
use crate::config::Config;
use crate::menu::Menus;
use crate::platform::max::MaxClient;
use crate::platform::Platform;
use crate::poller::Poller;
use crate::router::Router;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,faqbot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let token = config::resolve_token()?;
    info!("Bot token loaded from {}", config::TOKEN_ENV);

    let config = Config::load_default().context("Failed to load settings")?;

    let faq_path = config.faq_path(std::env::args().nth(1).map(PathBuf::from));
    info!("Loading FAQ from: {}", faq_path.display());
    let catalog = Arc::new(
        load_catalog(&faq_path)
            .with_context(|| format!("Failed to load FAQ from {}", faq_path.display()))?,
    );

    let client = MaxClient::new(&config.api, token).context("Failed to build HTTP client")?;
    let platform: Arc<dyn Platform> = Arc::new(client);

    let bot = platform
        .get_bot_info()
        .await
        .context("Failed to fetch bot info, check the token")?;
    info!("Bot started");
    info!("  Name: {}", bot.name);
    info!("  Username: @{}", bot.username.as_deref().unwrap_or("-"));
    info!("  ID: {}", bot.user_id);
    info!("  Questions: {}", catalog.len());
    info!("  Menu layout: {:?}", config.menu.layout);
    if let Some(url) = &config.menu.channel_url {
        info!("  Channel: {}", url);
    }

    let menus = Menus::build(&catalog, &config.menu);
    let responder = Responder::new(
        platform.clone(),
        catalog,
        menus,
        config.texts.clone(),
        config.pacing.clone(),
        config.menu.curator_url.clone(),
    );
    let router = Router::new(responder, Some(bot.user_id));
    let poller = Poller::new(platform, router, config.polling.clone());

    info!("Waiting for updates...");
    poller
        .run(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Interrupt received, stopping..."),
                Err(e) => {
                    error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await;

    Ok(())
}
