use embassy_time::{Duration, Ticker};

use super::CamContext;

/// One-second sampling tick for the frame-rate counters.
#[embassy_executor::task]
pub async fn telemetry_task(ctx: &'static CamContext) {
    let mut ticker = Ticker::every(Duration::from_secs(1));
    loop {
        ticker.next().await;
        ctx.telemetry.tick();
    }
}
