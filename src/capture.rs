use crate::session::session::CameraSession;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Supervised capture loop: fetch, sleep, repeat, forever.
///
/// `fetch_image` never returns an error, so a failed cycle only means a
/// longer sleep before the next attempt. Camera or network flakiness must
/// never stop future attempts; the loop has no terminal state short of
/// process exit.
pub async fn run_capture_loop(mut session: CameraSession, interval: Duration, cooldown: Duration) {
    loop {
        match session.fetch_image().await {
            Some(path) => {
                debug!("Capture cycle complete: {}", path.display());
                sleep(interval).await;
            }
            None => {
                warn!("Capture cycle failed, backing off for {:?}", cooldown);
                sleep(cooldown).await;
            }
        }
    }
}
