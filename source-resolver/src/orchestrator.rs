//! Ordered fallback across enumeration strategies.
//!
//! This module runs the configured strategies in order until one produces
//! at least one usable source. Strategy failures are logged and treated as
//! empty output; `enumerate` itself never fails.

use crate::config::Config;
use crate::filter::SourceFilter;
use crate::registry::AppRegistry;
use crate::scorer::WindowScorer;
use crate::strategies::{
    AuxiliaryProcessEnumerator, EnumerationStrategy, Fidelity, ScriptedEnumerator,
};
use crate::types::SourceDescriptor;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs strategies in order and returns the first non-empty resolution
pub struct EnumerationOrchestrator {
    /// Strategies in fallback order
    strategies: Vec<Box<dyn EnumerationStrategy>>,
    filter: SourceFilter,
    scorer: WindowScorer,
    /// Supplies display titles for selected windows
    registry: AppRegistry,
    /// Deadline for each strategy
    timeout: Duration,
}

impl EnumerationOrchestrator {
    /// Build the default pipeline: window-server helper, then System Events
    pub fn new(config: &Config) -> Self {
        let mut strategies: Vec<Box<dyn EnumerationStrategy>> = Vec::new();
        if config.strategies.auxiliary_enabled {
            strategies.push(Box::new(AuxiliaryProcessEnumerator::from_config(config)));
        }
        if config.strategies.scripted_enabled {
            strategies.push(Box::new(ScriptedEnumerator::from_config(config)));
        }

        Self::with_strategies(
            strategies,
            SourceFilter::new(config.filter.clone()),
            AppRegistry::from_config(&config.apps),
            Duration::from_secs(config.strategies.timeout_secs),
        )
    }

    /// Create with an explicit strategy list
    pub fn with_strategies(
        strategies: Vec<Box<dyn EnumerationStrategy>>,
        filter: SourceFilter,
        registry: AppRegistry,
        timeout: Duration,
    ) -> Self {
        Self {
            strategies,
            filter,
            scorer: WindowScorer::new(),
            registry,
            timeout,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Enumerate capturable sources; an empty list means nothing is available
    pub async fn enumerate(&self) -> Vec<SourceDescriptor> {
        for strategy in &self.strategies {
            let raw = self.run_strategy(strategy.as_ref()).await;
            if raw.is_empty() {
                continue;
            }

            let raw_count = raw.len();
            let resolved = self.resolve(strategy.fidelity(), raw);
            if resolved.is_empty() {
                info!(
                    "{} reported {} windows but none survived filtering, falling back",
                    strategy.name(),
                    raw_count
                );
                continue;
            }

            info!(
                "Resolved {} sources via {} ({} raw)",
                resolved.len(),
                strategy.name(),
                raw_count
            );
            return resolved;
        }

        warn!("No enumeration strategy produced any sources");
        Vec::new()
    }

    /// Run one strategy under the deadline, absorbing every failure
    async fn run_strategy(&self, strategy: &dyn EnumerationStrategy) -> Vec<SourceDescriptor> {
        match tokio::time::timeout(self.timeout, strategy.try_enumerate()).await {
            Ok(Ok(sources)) => {
                debug!("{} returned {} entries", strategy.name(), sources.len());
                sources
            }
            Ok(Err(e)) => {
                warn!("{} failed: {}", strategy.name(), e);
                Vec::new()
            }
            Err(_) => {
                warn!(
                    "{} timed out after {}ms",
                    strategy.name(),
                    self.timeout.as_millis()
                );
                Vec::new()
            }
        }
    }

    /// Turn one strategy's raw output into the list offered to the user.
    ///
    /// Full-fidelity windows are ranked on their raw titles and only then
    /// given display titles.
    pub fn resolve(&self, fidelity: Fidelity, sources: Vec<SourceDescriptor>) -> Vec<SourceDescriptor> {
        match fidelity {
            Fidelity::Full => self
                .scorer
                .select(self.filter.apply(sources))
                .into_iter()
                .map(|source| self.registry.label(source))
                .collect(),
            // Names alone cannot tell content windows from noise
            Fidelity::Coarse => sources
                .into_iter()
                .filter(|s| s.is_important_app && !self.filter.is_denied(&s.owner_app))
                .collect(),
        }
    }
}
