//! Polling SDDC lifecycle state.
//!
//! Create and delete requests are asynchronous on the provider side: a 202
//! only means the request was queued. This module waits for the outcome by
//! polling state with geometric backoff under one overall deadline.

use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::config::PollConfig;
use crate::error::{ProvisionError, Result, VmcError};

use super::types::LifecycleState;

/// Source of lifecycle state for a known SDDC.
#[async_trait]
pub trait LifecyclePoller: Send + Sync {
    /// Returns the current state of an SDDC.
    ///
    /// An SDDC the provider no longer knows is reported as
    /// [`LifecycleState::Absent`], not as an error.
    async fn poll(&self, sddc_id: &str) -> Result<LifecycleState>;
}

/// Backoff and deadline settings for a wait.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    /// Delay before the second poll.
    pub initial_interval: Duration,
    /// Upper bound on any single delay.
    pub max_interval: Duration,
    /// Growth factor applied after each delay.
    pub multiplier: f64,
    /// Overall deadline for the wait.
    pub timeout: Duration,
}

impl PollPolicy {
    /// Replaces the overall deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the delay that follows `current`, saturating at `max_interval`.
    #[must_use]
    pub fn next_interval(&self, current: Duration) -> Duration {
        let scaled = current.as_secs_f64() * self.multiplier.max(1.0);
        Duration::try_from_secs_f64(scaled)
            .map_or(self.max_interval, |next| next.min(self.max_interval))
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollConfig::default())
    }
}

impl From<&PollConfig> for PollPolicy {
    fn from(config: &PollConfig) -> Self {
        Self {
            initial_interval: Duration::from_secs(config.initial_interval_secs),
            max_interval: Duration::from_secs(config.max_interval_secs),
            multiplier: config.multiplier,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Running wait: elapsed time, next delay, deadline.
#[derive(Debug)]
pub struct Backoff {
    policy: PollPolicy,
    started: Instant,
    interval: Duration,
    attempts: u32,
}

impl Backoff {
    /// Starts a wait now.
    #[must_use]
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            started: Instant::now(),
            interval: policy.initial_interval,
            attempts: 0,
        }
    }

    /// Time spent since the wait started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Sleeps until the next poll.
    ///
    /// The sleep never runs past the deadline, so the final poll happens
    /// right at it.
    ///
    /// # Errors
    ///
    /// Returns [`VmcError::Timeout`] once the deadline has passed.
    pub async fn wait(&mut self, target: &str, expected_state: &str) -> Result<()> {
        let elapsed = self.elapsed();
        if elapsed >= self.policy.timeout {
            return Err(VmcError::Timeout {
                target: target.to_string(),
                expected_state: expected_state.to_string(),
                waited_secs: elapsed.as_secs(),
            });
        }

        let delay = self.interval.min(self.policy.timeout - elapsed);
        self.attempts += 1;
        debug!(
            "Waiting {}ms before poll {} of {target}",
            delay.as_millis(),
            self.attempts + 1
        );

        tokio::time::sleep(delay).await;
        self.interval = self.policy.next_interval(self.interval);
        Ok(())
    }
}

/// Polls until the SDDC has finished provisioning.
///
/// # Errors
///
/// Returns [`ProvisionError::Failed`] if the SDDC lands in a failure state,
/// [`VmcError::Timeout`] if the deadline passes first, or any poll error.
pub async fn wait_for_ready<P>(poller: &P, sddc_id: &str, backoff: &mut Backoff) -> Result<()>
where
    P: LifecyclePoller + ?Sized,
{
    loop {
        let state = poller.poll(sddc_id).await?;
        debug!("SDDC {sddc_id} is {state}");

        if state.is_terminal_for_create() {
            if state == LifecycleState::Ready {
                info!("SDDC {sddc_id} is ready after {}s", backoff.elapsed().as_secs());
                return Ok(());
            }
            return Err(ProvisionError::Failed {
                sddc_id: sddc_id.to_string(),
                state: state.to_string(),
            }
            .into());
        }

        backoff.wait(sddc_id, "ready").await?;
    }
}

/// Polls until the SDDC is gone.
///
/// # Errors
///
/// Returns [`ProvisionError::Failed`] if deletion fails,
/// [`VmcError::Timeout`] if the deadline passes first, or any poll error.
pub async fn wait_for_absence<P>(poller: &P, sddc_id: &str, backoff: &mut Backoff) -> Result<()>
where
    P: LifecyclePoller + ?Sized,
{
    loop {
        let state = poller.poll(sddc_id).await?;
        debug!("SDDC {sddc_id} is {state}");

        if state.is_terminal_for_delete() {
            if state == LifecycleState::Failed {
                return Err(ProvisionError::Failed {
                    sddc_id: sddc_id.to_string(),
                    state: state.to_string(),
                }
                .into());
            }
            info!("SDDC {sddc_id} deleted after {}s", backoff.elapsed().as_secs());
            return Ok(());
        }

        backoff.wait(sddc_id, "deleted").await?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use mockall::{Sequence, mock};

    mock! {
        Poller {}

        #[async_trait]
        impl LifecyclePoller for Poller {
            async fn poll(&self, sddc_id: &str) -> Result<LifecycleState>;
        }
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
            multiplier: 2.0,
            timeout: Duration::from_secs(5),
        }
    }

    fn sequence(states: &[LifecycleState]) -> MockPoller {
        let mut poller = MockPoller::new();
        let mut seq = Sequence::new();
        for state in states.iter().copied() {
            poller
                .expect_poll()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| Ok(state));
        }
        poller
    }

    #[test]
    fn test_interval_growth_is_capped() {
        let policy = fast_policy();
        let mut interval = policy.initial_interval;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(interval.as_millis());
            interval = policy.next_interval(interval);
        }
        assert_eq!(seen, [5, 10, 20, 20]);
    }

    #[test]
    fn test_interval_growth_saturates_instead_of_overflowing() {
        let policy = PollPolicy {
            initial_interval: Duration::from_secs(u64::MAX / 2),
            max_interval: Duration::from_secs(u64::MAX),
            multiplier: 1e300,
            timeout: Duration::from_secs(1),
        };

        assert_eq!(
            policy.next_interval(policy.initial_interval),
            Duration::from_secs(u64::MAX)
        );
    }

    #[test]
    fn test_policy_from_config() {
        let policy = PollPolicy::default();
        assert_eq!(policy.initial_interval, Duration::from_secs(10));
        assert_eq!(policy.max_interval, Duration::from_secs(60));
        assert_eq!(policy.timeout, Duration::from_secs(7200));

        let shorter = policy.with_timeout(Duration::from_secs(30));
        assert_eq!(shorter.timeout, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_wait_for_ready_polls_until_ready() {
        let poller = sequence(&[
            LifecycleState::Provisioning,
            LifecycleState::Unknown,
            LifecycleState::Ready,
        ]);
        let mut backoff = Backoff::new(fast_policy());

        wait_for_ready(&poller, "s-1", &mut backoff)
            .await
            .expect("reaches ready");
        assert_eq!(backoff.attempts, 2);
    }

    #[tokio::test]
    async fn test_wait_for_ready_reports_failure_state() {
        let poller = sequence(&[LifecycleState::Provisioning, LifecycleState::Failed]);
        let mut backoff = Backoff::new(fast_policy());

        match wait_for_ready(&poller, "s-1", &mut backoff).await {
            Err(VmcError::Provision(ProvisionError::Failed { sddc_id, state })) => {
                assert_eq!(sddc_id, "s-1");
                assert_eq!(state, "failed");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wait_for_ready_stops_when_sddc_vanishes() {
        let poller = sequence(&[LifecycleState::Provisioning, LifecycleState::Absent]);
        let mut backoff = Backoff::new(fast_policy());

        match wait_for_ready(&poller, "s-1", &mut backoff).await {
            Err(VmcError::Provision(ProvisionError::Failed { sddc_id, state })) => {
                assert_eq!(sddc_id, "s-1");
                assert_eq!(state, "absent");
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(backoff.attempts, 1);
    }

    #[tokio::test]
    async fn test_wait_for_ready_times_out() {
        let mut poller = MockPoller::new();
        poller
            .expect_poll()
            .returning(|_| Ok(LifecycleState::Provisioning));

        let policy = PollPolicy {
            timeout: Duration::from_millis(40),
            ..fast_policy()
        };
        let mut backoff = Backoff::new(policy);

        match wait_for_ready(&poller, "s-1", &mut backoff).await {
            Err(VmcError::Timeout {
                target,
                expected_state,
                ..
            }) => {
                assert_eq!(target, "s-1");
                assert_eq!(expected_state, "ready");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(backoff.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_wait_for_absence_accepts_absent_and_deleted() {
        for last in [LifecycleState::Absent, LifecycleState::Deleted] {
            let poller = sequence(&[LifecycleState::Deleting, last]);
            let mut backoff = Backoff::new(fast_policy());

            wait_for_absence(&poller, "s-1", &mut backoff)
                .await
                .expect("deletion completes");
        }
    }

    #[tokio::test]
    async fn test_poll_errors_propagate() {
        let mut poller = MockPoller::new();
        poller
            .expect_poll()
            .times(1)
            .returning(|_| Err(ApiError::Unauthorized { status: 401 }.into()));
        let mut backoff = Backoff::new(fast_policy());

        assert!(matches!(
            wait_for_absence(&poller, "s-1", &mut backoff).await,
            Err(VmcError::Api(ApiError::Unauthorized { status: 401 }))
        ));
    }
}
