//! Fixed-interval job loop.

use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::error;

/// Runs `tick` every `period`, forever.
///
/// A failing tick is logged and the loop keeps going; missed ticks are
/// delayed rather than bursted.
pub async fn run_every<F, Fut>(name: &'static str, period: Duration, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<()>>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        if let Err(err) = tick().await {
            error!(job = name, error = %err, "job tick failed");
        }
    }
}
