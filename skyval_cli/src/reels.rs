use std::time::Duration;

use anyhow::Context;
use skyval_core::symbols::REEL_DURATIONS_MS;
use skyval_core::{Entropy, PendingSpin, Settled, SlotSession};
use tokio::task::JoinSet;
use tracing::debug;

/// Run one spin the way the page does: every moving reel animates on its own
/// timer and the outcome is only settled once all of them have stopped.
///
/// `speed` scales the reel durations; 0 skips the wait.
pub async fn animated_spin(
    session: &mut SlotSession,
    rng: &mut impl Entropy,
    speed: f64,
) -> anyhow::Result<Settled> {
    let delays = reel_delays(speed)?;
    let pending = session.begin_spin(rng)?;
    debug!(landing = ?pending.landing(), "reels spinning");
    wait_for_reels(&pending, delays).await;
    Ok(session.settle(pending))
}

/// Scaled animation length of every reel, refused when `speed` does not fit a `Duration`.
fn reel_delays(speed: f64) -> anyhow::Result<[Duration; 3]> {
    let mut delays = [Duration::ZERO; 3];
    for (delay, ms) in delays.iter_mut().zip(REEL_DURATIONS_MS) {
        *delay = Duration::try_from_secs_f64(ms as f64 / 1000.0 * speed.max(0.0))
            .with_context(|| format!("reel speed {speed} is out of range"))?;
    }
    Ok(delays)
}

async fn wait_for_reels(pending: &PendingSpin, delays: [Duration; 3]) {
    let mut reels = JoinSet::new();
    for motion in pending.motions.iter().copied() {
        let delay = delays[motion.reel];
        reels.spawn(async move {
            tokio::time::sleep(delay).await;
            motion
        });
    }
    while let Some(done) = reels.join_next().await {
        match done {
            Ok(motion) => debug!(reel = motion.reel, symbol = ?motion.target, "reel stopped"),
            // A reel task only sleeps; if the runtime drops it the reel still counts as stopped.
            Err(err) => debug!(%err, "reel task ended early"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyval_core::{EngineParams, Mulberry32};
    use tokio::time::Instant;

    #[tokio::test]
    async fn settles_after_all_reels() {
        let mut session = SlotSession::new(EngineParams::default());
        let mut rng = Mulberry32::new(11);
        let settled = animated_spin(&mut session, &mut rng, 0.0).await.unwrap();
        assert!(!session.is_busy());
        assert_eq!(settled.spins_left, session.state().spins_left);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_slowest_reel() {
        let mut session = SlotSession::new(EngineParams::default());
        let mut rng = Mulberry32::new(3);
        let start = Instant::now();
        animated_spin(&mut session, &mut rng, 1.0).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(1550));
        assert!(!session.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn held_reel_shortens_the_wait() {
        let mut session = SlotSession::new(EngineParams::default());
        session.toggle_hold(2).unwrap();
        let mut rng = Mulberry32::new(3);
        let start = Instant::now();
        animated_spin(&mut session, &mut rng, 1.0).await.unwrap();
        let waited = start.elapsed();
        assert!(waited >= Duration::from_millis(1250), "{waited:?}");
        assert!(waited < Duration::from_millis(1550), "{waited:?}");
    }

    #[tokio::test]
    async fn unrepresentable_speed_is_an_error() {
        let mut session = SlotSession::new(EngineParams::default());
        let mut rng = Mulberry32::new(3);
        assert!(animated_spin(&mut session, &mut rng, 1e300).await.is_err());
        assert!(animated_spin(&mut session, &mut rng, f64::INFINITY).await.is_err());
        assert!(!session.is_busy());
        assert_eq!(session.state().spins_left, 100);
    }
}
