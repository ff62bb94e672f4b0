#![allow(dead_code)]

use std::sync::Arc;

use rangekeeper::application::{Agent, AgentSession, AgentSettings, DecisionEngine};
use rangekeeper::domain::AgentId;
use rangekeeper::port::outbound::advisor::Advisor;
use rangekeeper::testkit::domain::{agent_address, agent_identity, peer_identity, pool_key, snapshot_at};
use rangekeeper::testkit::ledger::MockLedger;
use rangekeeper::testkit::registry::MockRegistry;

/// Validator used by tests that enable validation.
pub const VALIDATOR: AgentId = AgentId::new(2);

/// An agent wired to in-memory ports.
pub struct Harness {
    pub ledger: Arc<MockLedger>,
    pub registry: Arc<MockRegistry>,
    pub agent: Agent,
    settings: AgentSettings,
}

impl Harness {
    /// A second agent over the same ledger and registry with an empty
    /// session, as after a process restart.
    pub fn restarted(&self) -> Agent {
        Agent::new(
            self.ledger.clone(),
            self.registry.clone(),
            Arc::new(AgentSession::default()),
            DecisionEngine::new(None),
            self.settings.clone(),
        )
    }
}

pub struct HarnessBuilder {
    tick: i32,
    advisor: Option<Arc<dyn Advisor>>,
    validation: bool,
    dry_run: bool,
    registered: bool,
}

impl HarnessBuilder {
    pub fn tick(mut self, tick: i32) -> Self {
        self.tick = tick;
        self
    }

    pub fn advisor(mut self, advisor: Arc<dyn Advisor>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn with_validation(mut self) -> Self {
        self.validation = true;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn unregistered(mut self) -> Self {
        self.registered = false;
        self
    }

    pub fn build(self) -> Harness {
        let ledger = Arc::new(MockLedger::new(snapshot_at(self.tick)));
        let agents = if self.registered {
            vec![agent_identity(), peer_identity(VALIDATOR.value())]
        } else {
            vec![peer_identity(VALIDATOR.value())]
        };
        let registry = Arc::new(MockRegistry::with_agents(agents));

        let mut settings = AgentSettings::new(agent_address(), pool_key());
        settings.decimals1 = 6;
        settings.dry_run = self.dry_run;
        settings.validator = self.validation.then_some(VALIDATOR);

        let agent = Agent::new(
            ledger.clone(),
            registry.clone(),
            Arc::new(AgentSession::default()),
            DecisionEngine::new(self.advisor),
            settings.clone(),
        );

        Harness {
            ledger,
            registry,
            agent,
            settings,
        }
    }
}

/// Harness builder with the pool at tick -201600.
pub fn harness() -> HarnessBuilder {
    HarnessBuilder {
        tick: -201_600,
        advisor: None,
        validation: false,
        dry_run: false,
        registered: true,
    }
}
