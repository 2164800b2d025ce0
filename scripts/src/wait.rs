//! Strategies for letting the block explorer catch up with fresh deployments

use std::time::Duration;

use itertools::Itertools;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::{
    errors::ScriptError,
    explorer::ExplorerClient,
    interfaces::{IndexProbe, PropagationWait},
    types::DeployedContract,
};

/// Sleep for a fixed duration, regardless of the explorer's state
#[derive(Clone, Debug)]
pub struct FixedDelay {
    /// How long to sleep
    delay: Duration,
}

impl FixedDelay {
    /// Create a new fixed delay
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl PropagationWait for FixedDelay {
    async fn wait(&self, _deployed: &[DeployedContract]) -> Result<(), ScriptError> {
        info!(
            "Waiting {}s for the deployments to propagate to the explorer",
            self.delay.as_secs()
        );
        sleep(self.delay).await;
        Ok(())
    }
}

/// Poll the explorer until every deployment is indexed or a timeout elapses.
///
/// Hitting the timeout is not an error: verification runs anyway and reports
/// any address the explorer still cannot see.
#[derive(Clone, Debug)]
pub struct PollUntilIndexed<P> {
    /// The readiness check
    probe: P,
    /// The pause between rounds of checks
    interval: Duration,
    /// The upper bound on the total wait
    timeout: Duration,
}

impl<P: IndexProbe> PollUntilIndexed<P> {
    /// Create a new polling wait
    pub fn new(probe: P, interval: Duration, timeout: Duration) -> Self {
        Self {
            probe,
            interval,
            timeout,
        }
    }
}

impl<P: IndexProbe> PropagationWait for PollUntilIndexed<P> {
    async fn wait(&self, deployed: &[DeployedContract]) -> Result<(), ScriptError> {
        let deadline = Instant::now() + self.timeout;
        let mut pending: Vec<&DeployedContract> = deployed.iter().collect();

        loop {
            let mut still_pending = Vec::new();
            for contract in pending {
                match self.probe.is_indexed(contract.address).await {
                    Ok(true) => debug!(label = %contract.label, "indexed by explorer"),
                    Ok(false) => still_pending.push(contract),
                    Err(e) => {
                        warn!(label = %contract.label, "index check failed: {e}");
                        still_pending.push(contract);
                    }
                }
            }
            pending = still_pending;

            if pending.is_empty() {
                info!("All deployments indexed by the explorer");
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!(
                    "Explorer has not indexed {} after {}s, verifying anyway",
                    pending.iter().map(|c| &c.label).join(", "),
                    self.timeout.as_secs()
                );
                return Ok(());
            }

            sleep(self.interval).await;
        }
    }
}

/// The propagation wait chosen at startup
#[derive(Clone, Debug)]
pub enum Propagation {
    /// A fixed delay
    Fixed(FixedDelay),
    /// Poll the explorer's index
    Poll(PollUntilIndexed<ExplorerClient>),
}

impl PropagationWait for Propagation {
    async fn wait(&self, deployed: &[DeployedContract]) -> Result<(), ScriptError> {
        match self {
            Propagation::Fixed(wait) => wait.wait(deployed).await,
            Propagation::Poll(wait) => wait.wait(deployed).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::Address;
    use tokio::time::Instant;

    use crate::{
        interfaces::PropagationWait,
        mocks::MockProbe,
        types::{DeployedContract, DeploymentTask},
    };

    use super::{FixedDelay, PollUntilIndexed};

    /// Two staking pools at distinct addresses
    fn pools() -> Vec<DeployedContract> {
        let task = DeploymentTask::new("ZombabieStake", ["0xAAA"], "Pool");
        vec![
            DeployedContract::new(&task, Address::repeat_byte(0x11)),
            DeployedContract::new(&task, Address::repeat_byte(0x22)),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_sleeps_once() {
        let start = Instant::now();
        FixedDelay::new(Duration::from_secs(60))
            .wait(&pools())
            .await
            .unwrap();

        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(60));
        assert!(elapsed < Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_until_indexed() {
        let probe = MockProbe::default()
            .indexed_after(Address::repeat_byte(0x11), 0)
            .indexed_after(Address::repeat_byte(0x22), 2);
        let wait = PollUntilIndexed::new(&probe, Duration::from_secs(5), Duration::from_secs(300));

        let start = Instant::now();
        wait.wait(&pools()).await.unwrap();

        // Round 1 checks both, rounds 2 and 3 only the second pool
        assert_eq!(probe.calls(), 4);
        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_timeout_proceeds() {
        let probe = MockProbe::default();
        let wait = PollUntilIndexed::new(&probe, Duration::from_secs(5), Duration::from_secs(20));

        let start = Instant::now();
        wait.wait(&pools()).await.unwrap();

        assert!(start.elapsed() >= Duration::from_secs(20));
        assert!(start.elapsed() < Duration::from_secs(30));
    }
}
