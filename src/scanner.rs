// SPDX-License-Identifier: PMPL-1.0-or-later
//! End-to-end scan pipeline: load, parse, run rules, aggregate.
//!
//! One overall timeout covers the whole pipeline. When it elapses the scan
//! fails with [`ScanError::Timeout`]; no partial result is returned.

use crate::aggregate::ScanResult;
use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Result, ScanError};
use crate::loader::{Loader, Source};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct Scanner {
    loader: Loader,
    engine: Arc<Engine>,
    timeout: Duration,
}

impl Scanner {
    pub fn new(config: &Config) -> Result<Self> {
        let loader = Loader::new(&config.loader)?;
        let engine = Engine::new(&config.engine, config.scoring);
        Ok(Self::from_parts(loader, engine, config.loader.timeout()))
    }

    pub fn from_parts(loader: Loader, engine: Engine, timeout: Duration) -> Self {
        Self {
            loader,
            engine: Arc::new(engine),
            timeout,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Scan `source`. Rules run on the blocking pool so the runtime stays free.
    pub async fn run(&self, source: &Source) -> Result<ScanResult> {
        let pipeline = async {
            let units = self.loader.load(source).await?;
            let engine = Arc::clone(&self.engine);
            tokio::task::spawn_blocking(move || engine.scan(&units))
                .await
                .map_err(|e| ScanError::Aborted(e.to_string()))?
        };

        match tokio::time::timeout(self.timeout, pipeline).await {
            Ok(Ok(result)) => {
                info!("Scan finished: score {} ({})", result.score, result.grade);
                Ok(result)
            }
            Ok(Err(e)) => {
                warn!("Scan failed: {}", e);
                Err(e)
            }
            Err(_) => {
                warn!("Scan timed out after {:?}", self.timeout);
                Err(ScanError::Timeout(self.timeout))
            }
        }
    }
}
