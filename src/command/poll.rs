use std::future::Future;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval, sleep};

use crate::error::LoadError;

/// Call `check` on every `interval` until it yields a value.
///
/// An absolute deadline of `timeout` races the ticker; whichever fires first
/// decides the outcome. An error from `check` ends polling immediately.
pub async fn poll_until<T, F, Fut>(
    interval_period: Duration,
    timeout: Duration,
    mut check: F,
) -> Result<T, LoadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = color_eyre::Result<Option<T>>>,
{
    let deadline = sleep(timeout);
    tokio::pin!(deadline);

    let mut ticker = interval(interval_period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = &mut deadline => return Err(LoadError::TimedOut(timeout)),
            _ = ticker.tick() => {
                match check().await {
                    Ok(Some(value)) => return Ok(value),
                    Ok(None) => {}
                    Err(report) => return Err(LoadError::from_report(&report)),
                }
            }
        }
    }
}
