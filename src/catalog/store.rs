//! Holder for the current catalog snapshot.

use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use super::{Catalog, CatalogSource};
use crate::config::CatalogConfig;
use crate::ingest::{self, IngestError};

/// Shared, swappable reference to the current [`Catalog`].
///
/// Readers take an `Arc` to the snapshot and scan it without holding the
/// lock; a refresh builds the replacement fully before swapping it in, so
/// a failed refresh leaves the previous snapshot untouched.
#[derive(Debug)]
pub struct CatalogStore {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// The snapshot in effect right now.
    pub fn snapshot(&self) -> Arc<Catalog> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Swap in `catalog`, returning the snapshot it replaced.
    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }

    /// Fetch `url`, parse it and make it the current snapshot.
    ///
    /// All-or-nothing: on any error the store is left as it was.
    pub async fn refresh_from_sheet(
        &self,
        client: &reqwest::Client,
        url: &str,
    ) -> Result<Arc<Catalog>, IngestError> {
        let tools = ingest::fetch_tools(client, url).await?;
        let catalog = Catalog::new(tools, CatalogSource::Sheet(url.to_string()));
        self.replace(catalog);
        let current = self.snapshot();
        info!(url, tools = current.len(), "catalog refreshed from sheet");
        Ok(current)
    }
}

/// Build the startup snapshot from configuration.
///
/// Tries the sheet URL first; when it fails (or none is set) falls back
/// to the seed file, and finally to an empty catalog.
pub async fn load_initial(
    config: &CatalogConfig,
    client: &reqwest::Client,
    seed_path: Option<&Path>,
) -> anyhow::Result<Catalog> {
    if let Some(url) = config.sheet_url.as_deref().filter(|u| !u.trim().is_empty()) {
        match ingest::fetch_tools(client, url).await {
            Ok(tools) => {
                info!(url, tools = tools.len(), "catalog loaded from sheet");
                return Ok(Catalog::new(tools, CatalogSource::Sheet(url.to_string())));
            }
            Err(e) => {
                warn!(url, error = %e, "sheet ingestion failed, falling back to seed catalog");
            }
        }
    }

    match seed_path {
        Some(path) => super::load_seed(path).await,
        None => {
            warn!("no sheet URL or seed file configured, starting with an empty catalog");
            Ok(Catalog::empty())
        }
    }
}
