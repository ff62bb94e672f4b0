//! Agent run loop.
//!
//! Two timers drive the agent: a short one reconciles vault events (and
//! processes newly assigned deposits at once), a longer one sweeps every
//! assigned deposit. Both run on one task, so passes never overlap. Errors
//! are logged and never end the loop.

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::application::Agent;
use crate::infrastructure::config::agent::AgentConfig;
use crate::port::inbound::agent::{AgentFacade, OutcomeStatus, ProcessOutcome};

/// Timer periods of the run loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Period of event reconciliation.
    pub poll_interval: Duration,
    /// Period of the sweep over assigned deposits.
    pub process_interval: Duration,
}

impl Schedule {
    /// Periods from `[agent]` configuration.
    #[must_use]
    pub const fn from_config(config: &AgentConfig) -> Self {
        Self {
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            process_interval: Duration::from_secs(config.process_interval_secs),
        }
    }
}

/// Drive `agent` until `shutdown` resolves.
pub async fn run<F>(agent: &Agent, schedule: Schedule, shutdown: F)
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    let mut poll = interval(schedule.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sweep = interval(schedule.process_interval);
    sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        poll_secs = schedule.poll_interval.as_secs(),
        process_secs = schedule.process_interval.as_secs(),
        "Agent loop started"
    );

    loop {
        tokio::select! {
            () = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = poll.tick() => {
                match agent.reconcile().await {
                    Ok(outcomes) => log_outcomes("reconcile", &outcomes),
                    Err(e) => warn!(error = %e, "Reconciliation failed"),
                }
            }
            _ = sweep.tick() => {
                match agent.process_assigned().await {
                    Ok(outcomes) => log_outcomes("sweep", &outcomes),
                    Err(e) => warn!(error = %e, "Processing assigned deposits failed"),
                }
            }
        }
    }

    info!("Agent loop stopped");
}

fn log_outcomes(pass: &'static str, outcomes: &[ProcessOutcome]) {
    let count = |status: OutcomeStatus| outcomes.iter().filter(|o| o.status == status).count();
    let errors = count(OutcomeStatus::Error);
    if outcomes.is_empty() {
        debug!(pass, "Nothing to process");
    } else if errors > 0 {
        warn!(
            pass,
            processed = count(OutcomeStatus::Processed),
            skipped = count(OutcomeStatus::Skipped),
            errors,
            "Pass finished with errors"
        );
    } else {
        info!(
            pass,
            processed = count(OutcomeStatus::Processed),
            skipped = count(OutcomeStatus::Skipped),
            "Pass finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::session::AgentSession;
    use crate::application::{AgentSettings, DecisionEngine};
    use crate::testkit::domain::{agent_address, agent_identity, funded_deposit, pool_key, snapshot_at};
    use crate::testkit::ledger::MockLedger;
    use crate::testkit::registry::MockRegistry;

    fn schedule() -> Schedule {
        Schedule {
            poll_interval: Duration::from_secs(3600),
            process_interval: Duration::from_secs(3600),
        }
    }

    #[tokio::test]
    async fn first_ticks_reconcile_and_sweep() {
        let ledger = Arc::new(MockLedger::new(snapshot_at(-201_600)));
        ledger.insert_deposit(funded_deposit(1));
        ledger.set_block_number(500);
        let registry = Arc::new(MockRegistry::with_agents(vec![agent_identity()]));
        let session = Arc::new(AgentSession::default());
        let agent = Agent::new(
            ledger.clone(),
            registry,
            session.clone(),
            DecisionEngine::fallback_only(),
            AgentSettings::new(agent_address(), pool_key()),
        );

        run(&agent, schedule(), tokio::time::sleep(Duration::from_millis(200))).await;

        assert_eq!(session.watermark(), Some(500));
        assert_eq!(ledger.mints().len(), 1);
    }

    #[tokio::test]
    async fn errors_do_not_stop_the_loop() {
        let ledger = Arc::new(MockLedger::new(snapshot_at(0)));
        ledger.set_fail_reads(true);
        let registry = Arc::new(MockRegistry::default());
        let agent = Agent::new(
            ledger,
            registry,
            Arc::new(AgentSession::default()),
            DecisionEngine::fallback_only(),
            AgentSettings::new(agent_address(), pool_key()),
        );

        run(&agent, schedule(), tokio::time::sleep(Duration::from_millis(50))).await;
    }

    #[test]
    fn schedule_reads_config() {
        let schedule = Schedule::from_config(&AgentConfig::default());
        assert_eq!(schedule.poll_interval, Duration::from_secs(15));
        assert_eq!(schedule.process_interval, Duration::from_secs(60));
    }
}
