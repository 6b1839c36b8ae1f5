//! Periodic sweep of expired invitations
//!
//! Pending invitations past their expiration date are marked cancelled, which
//! frees the (team, email) slot for a new invitation.

use std::time::Duration;

use teamtact_teams::InvitationRepository;
use tokio::task::JoinHandle;

/// Spawn the sweeper. An interval of zero disables it and returns `None`.
pub fn spawn_invitation_sweeper(
    invitations: InvitationRepository,
    interval_secs: u64,
) -> Option<JoinHandle<()>> {
    if interval_secs == 0 {
        tracing::info!("Invitation sweeper disabled");
        return None;
    }

    let period = Duration::from_secs(interval_secs);
    tracing::info!(interval_secs, "Starting invitation sweeper");

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // Missed ticks are not replayed
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            sweep_once(&invitations).await;
        }
    }))
}

/// One sweep. Failures are logged; the next tick retries.
pub async fn sweep_once(invitations: &InvitationRepository) -> Option<u64> {
    match invitations.cancel_expired().await {
        Ok(count) => {
            tracing::info!(cancelled = count, "Swept expired invitations");
            Some(count)
        }
        Err(e) => {
            tracing::error!(error = %e, "Invitation sweep failed");
            None
        }
    }
}
