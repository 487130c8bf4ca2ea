//! 时钟与定时器的浏览器实现

use std::time::Duration;

use async_trait::async_trait;
use voyage::platform::Scheduler;
use voyage_shared::Timestamp;
use voyage_shared::date::now_timestamp;

/// `Date.now()` + `setTimeout`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

#[async_trait(?Send)]
impl Scheduler for BrowserScheduler {
    fn now(&self) -> Timestamp {
        now_timestamp()
    }

    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
