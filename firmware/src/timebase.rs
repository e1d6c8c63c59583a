//! embassy-time によるタイムベース実装

use embassy_time::{Instant, Timer};
use sixstep::Timebase;

/// `Instant::now` と `Timer::at` を使うタイムベース
pub struct EmbassyTimebase;

impl Timebase for EmbassyTimebase {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn wait_until(&mut self, deadline: Instant) {
        Timer::at(deadline).await;
    }
}
