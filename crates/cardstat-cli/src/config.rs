use std::path::{Path, PathBuf};

use anyhow::Context;
use cardstat_analysis::config::StatsConfig;
use cardstat_core::loader::ReferentialPolicy;
use serde::{Deserialize, Serialize};

use crate::util;

/// Contents of the `--config` JSON file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ReportConfig {
    /// Card export TSV.
    pub cards: Option<PathBuf>,
    /// Separate review-log TSV; replaces the log embedded in the card export.
    pub revlog: Option<PathBuf>,
    /// Card-browser export TSV merged into the card dataset.
    pub browser: Option<PathBuf>,
    pub referential: ReferentialPolicy,
    pub stats: StatsConfig,
}

impl ReportConfig {
    /// Reads `path`, or returns the defaults when no path is given.
    ///
    /// Relative input paths in the file are resolved against its directory.
    pub(crate) fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let mut config: Self = util::read_json_file("config", path)?;
        config
            .stats
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        if let Some(dir) = path.parent() {
            config.cards = config.cards.map(|p| dir.join(p));
            config.revlog = config.revlog.map(|p| dir.join(p));
            config.browser = config.browser.map(|p| dir.join(p));
        }
        tracing::debug!(?config, "loaded config");
        Ok(config)
    }
}
