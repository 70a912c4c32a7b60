pub mod evaluate;
pub mod train;

use std::time::Duration;

pub use evaluate::{EvaluateConfig, EvaluateMode, resolve_policy};
pub use train::{TrainConfig, TrainMode};

/// Wait between ticks
///
/// A zero delay only yields to the runtime, so pending signals are still
/// observed without paying for a timer.
pub(crate) async fn pace(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}
