//! Symbol universe loading with bounded retries

use super::{SymbolDescriptor, SymbolStore};
use crate::error::{AppError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_ATTEMPTS: u32 = 3;
const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Loads the universe from a [`SymbolStore`], retrying with exponential backoff
#[derive(Clone)]
pub struct UniverseReader {
    store: Arc<dyn SymbolStore>,
    attempts: u32,
    base_delay: Duration,
}

impl UniverseReader {
    pub fn new(store: Arc<dyn SymbolStore>) -> Self {
        Self::with_backoff(store, DEFAULT_ATTEMPTS, DEFAULT_BASE_DELAY)
    }

    pub fn with_backoff(store: Arc<dyn SymbolStore>, attempts: u32, base_delay: Duration) -> Self {
        Self {
            store,
            attempts: attempts.max(1),
            base_delay,
        }
    }

    /// Load the universe; `SourceUnavailable` once every attempt has failed.
    /// An empty universe is a valid result.
    pub async fn load_universe(&self) -> Result<Vec<SymbolDescriptor>> {
        let mut last_error = None;

        for attempt in 0..self.attempts {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                warn!(
                    "Retrying universe load ({}/{}) after {:?}",
                    attempt + 1,
                    self.attempts,
                    delay
                );
                tokio::time::sleep(delay).await;
            }

            let store = self.store.clone();
            let loaded = tokio::task::spawn_blocking(move || store.load_universe())
                .await
                .map_err(|e| AppError::Internal(format!("universe load task failed: {}", e)))
                .and_then(|result| result);

            match loaded {
                Ok(symbols) => {
                    info!("Loaded universe of {} symbols", symbols.len());
                    return Ok(symbols);
                }
                Err(e) => {
                    warn!("Universe load attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(AppError::SourceUnavailable(format!(
            "symbol store failed after {} attempts: {}",
            self.attempts,
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string())
        )))
    }
}
