use std::path::PathBuf;

use anyhow::Context;
use cardstat_core::{
    Collection,
    loader::{LoadOptions, load_browser_export, load_collection},
};
use clap::Args;

use crate::config::ReportConfig;

/// Input options shared by all commands.
#[derive(Debug, Clone, Args)]
pub(crate) struct InputArg {
    /// Path to the configuration JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to a separate review-log TSV file
    #[arg(long)]
    pub revlog: Option<PathBuf>,

    /// Path to a card-browser export TSV whose columns are added to the
    /// card dataset
    #[arg(long)]
    pub browser: Option<PathBuf>,

    /// Path to the card export TSV file (overrides the config)
    pub input: Option<PathBuf>,
}

impl InputArg {
    /// Loads the configuration and the collection it points to.
    ///
    /// "now" is resolved once here, so loading and the report place reviews
    /// on the same study days.
    pub(crate) fn load(&self) -> anyhow::Result<(ReportConfig, Collection)> {
        let mut config = ReportConfig::load(self.config.as_deref())?;
        if let Some(input) = &self.input {
            config.cards = Some(input.clone());
        }
        if let Some(revlog) = &self.revlog {
            config.revlog = Some(revlog.clone());
        }
        if let Some(browser) = &self.browser {
            config.browser = Some(browser.clone());
        }
        let now = config.stats.resolve_now();
        config.stats.now = Some(now);

        let cards = config
            .cards
            .as_deref()
            .context("No card export given; pass INPUT or set `cards` in the config")?;
        let options = LoadOptions {
            offset: *now.offset(),
            referential: config.referential,
        };
        let mut collection = load_collection(cards, config.revlog.as_deref(), &options)
            .with_context(|| format!("Failed to load card export: {}", cards.display()))?;
        if let Some(path) = config.browser.as_deref() {
            let browser = load_browser_export(path)
                .with_context(|| format!("Failed to load browser export: {}", path.display()))?;
            collection = collection.with_browser(browser);
        }
        if collection.dropped_reviews > 0 {
            tracing::warn!(
                dropped = collection.dropped_reviews,
                "dropped reviews of unknown cards"
            );
        }
        tracing::info!(
            cards = collection.cards.len(),
            reviews = collection.reviews.len(),
            "loaded collection"
        );
        Ok((config, collection))
    }
}
