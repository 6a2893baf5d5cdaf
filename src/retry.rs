//! Caller-level retries for exchanges that went unanswered.

use std::future::Future;
use std::time::Duration;

use log::debug;

use crate::errors::Error;
use crate::runtime;

type Result<T> = std::result::Result<T, Error>;

/// Back-off schedule for re-issuing a request after
/// [`Error::DeviceUnreachable`].
///
/// [`DeviceHandle`](crate::DeviceHandle) never retries on its own; wrap the
/// calls that should be retried:
///
/// ```no_run
/// use std::net::Ipv4Addr;
/// use wizard_lights::{DeviceHandle, RetryPolicy};
///
/// # async fn run() -> Result<(), wizard_lights::Error> {
/// let bulb = DeviceHandle::new("a8bb50aabbcc", Ipv4Addr::new(192, 168, 1, 100));
/// let state = RetryPolicy::default().run(|| bulb.query_state()).await?;
/// println!("power: {}", state.power());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::new(
            Self::DEFAULT_DELAYS_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms)),
        )
    }
}

impl RetryPolicy {
    const DEFAULT_DELAYS_MS: [u64; 3] = [750, 1500, 3000];

    /// One retry per delay, waiting that long before each retry.
    pub fn new(delays: impl IntoIterator<Item = Duration>) -> Self {
        RetryPolicy {
            delays: delays.into_iter().collect(),
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        RetryPolicy { delays: Vec::new() }
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Run `op`, re-invoking it while it fails with a transient error and
    /// delays remain. Any other error is returned as is.
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delays = self.delays.iter();
        loop {
            match op().await {
                Err(e) if e.is_transient() => match delays.next() {
                    Some(delay) => {
                        debug!("{e}; retrying in {delay:?}");
                        runtime::sleep(*delay).await;
                    }
                    None => return Err(e),
                },
                result => return result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn unreachable() -> Error {
        Error::DeviceUnreachable {
            addr: "127.0.0.1:38899".parse().unwrap(),
            timeout: Duration::from_millis(10),
        }
    }

    fn quick() -> RetryPolicy {
        RetryPolicy::new([Duration::from_millis(1); 3])
    }

    #[test]
    fn test_default_delays() {
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.delays(),
            [
                Duration::from_millis(750),
                Duration::from_millis(1500),
                Duration::from_secs(3)
            ]
        );
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let attempts = Cell::new(0);
        let result = quick()
            .run(|| {
                attempts.set(attempts.get() + 1);
                let outcome = if attempts.get() < 3 {
                    Err(unreachable())
                } else {
                    Ok(attempts.get())
                };
                async move { outcome }
            })
            .await;

        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_last_delay() {
        let attempts = Cell::new(0);
        let result: Result<()> = quick()
            .run(|| {
                attempts.set(attempts.get() + 1);
                async { Err(unreachable()) }
            })
            .await;

        assert!(matches!(result, Err(Error::DeviceUnreachable { .. })));
        assert_eq!(attempts.get(), 4);
    }

    #[tokio::test]
    async fn test_stops_on_non_transient_error() {
        let attempts = Cell::new(0);
        let result: Result<()> = quick()
            .run(|| {
                attempts.set(attempts.get() + 1);
                async { Err(Error::protocol("bad reply")) }
            })
            .await;

        assert_eq!(result.unwrap_err(), Error::protocol("bad reply"));
        assert_eq!(attempts.get(), 1);
    }

    #[tokio::test]
    async fn test_none_never_retries() {
        let attempts = Cell::new(0);
        let _: Result<()> = RetryPolicy::none()
            .run(|| {
                attempts.set(attempts.get() + 1);
                async { Err(unreachable()) }
            })
            .await;

        assert_eq!(attempts.get(), 1);
    }
}
