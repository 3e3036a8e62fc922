//! Fluent builder for constructing a [`DispatchEngine`].

use std::collections::BTreeSet;
use std::sync::Arc;

use yard_agent::TrainAgent;
use yard_core::{CancelToken, DispatchConfig};
use yard_topology::Topology;

use crate::{DispatchEngine, DispatchError, DispatchResult};

/// Fluent builder for [`DispatchEngine`].
///
/// # Required inputs
///
/// - [`DispatchConfig`]: timeouts, attempt budget, pool size, deadline
/// - `Arc<Topology>`: the yard the agents' routes were resolved against
///
/// # Optional inputs (have defaults)
///
/// | Method             | Default                      |
/// |--------------------|------------------------------|
/// | `.agents(v)`       | No trains                    |
/// | `.cancel_token(t)` | A fresh, uncancelled token   |
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new(config, Arc::new(topology))
///     .agents(agents_from_fleet(&fleet, &topology, seed))
///     .build()?;
/// ```
pub struct EngineBuilder {
    config:   DispatchConfig,
    topology: Arc<Topology>,
    agents:   Vec<TrainAgent>,
    cancel:   Option<CancelToken>,
}

impl EngineBuilder {
    pub fn new(config: DispatchConfig, topology: Arc<Topology>) -> Self {
        Self { config, topology, agents: Vec::new(), cancel: None }
    }

    /// Supply the fleet.  Order does not matter; the report is sorted by
    /// train number.
    pub fn agents(mut self, agents: Vec<TrainAgent>) -> Self {
        self.agents = agents;
        self
    }

    /// Share an existing token, e.g. one already wired to an operator
    /// control, instead of creating a new one.
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Validate inputs and return a ready-to-run [`DispatchEngine`].
    pub fn build(self) -> DispatchResult<DispatchEngine> {
        self.config.validate()?;

        let mut trains = BTreeSet::new();
        for agent in &self.agents {
            if !trains.insert(agent.train()) {
                return Err(DispatchError::DuplicateTrain(agent.train()));
            }
        }

        Ok(DispatchEngine {
            config:   self.config,
            topology: self.topology,
            agents:   self.agents,
            cancel:   self.cancel.unwrap_or_default(),
        })
    }
}
