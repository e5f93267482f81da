use std::sync::Arc;

use chrono::{DateTime, Days, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use knightrehber_models::{
    settings::SessionSettings,
    user::{SessionUser, UserId},
};
use knightrehber_scheduler::{AlarmFacade, InMemorySession};
use tokio_util::sync::CancellationToken;

/// Signs the session in as the configured identity.
pub fn sign_in_configured(session: &InMemorySession, settings: &SessionSettings) -> Option<SessionUser> {
    if settings.guest {
        return Some(session.continue_as_guest());
    }

    let user_id = settings.user_id.as_deref().filter(|id| !id.is_empty())?;
    Some(session.sign_in(UserId::new(user_id)))
}

/// First instant of the next local day. When midnight is skipped by a DST
/// change the first existing hour of that day is used.
pub fn next_local_midnight(now: DateTime<Utc>, tz: Tz) -> Option<DateTime<Utc>> {
    let tomorrow = now
        .with_timezone(&tz)
        .date_naive()
        .checked_add_days(Days::new(1))?;

    (0..3)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .find_map(|time| tz.from_local_datetime(&tomorrow.and_time(time)).earliest())
        .map(|local| local.with_timezone(&Utc))
}

/// Re-arms the active alarms now and again after every local midnight,
/// until `shutdown` is cancelled.
pub async fn run(facade: Arc<AlarmFacade>, tz: Tz, shutdown: CancellationToken) {
    loop {
        rearm(&facade).await;

        let now = Utc::now();
        let wake_at = next_local_midnight(now, tz).unwrap_or(now + TimeDelta::days(1));
        let delay = (wake_at - now).to_std().unwrap_or_default();
        log::info!("Next re-arm at {} in {delay:?}", wake_at.with_timezone(&tz));

        tokio::select! {
            _ = shutdown.cancelled() => {
                log::info!("Shutting down alarm daemon");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

async fn rearm(facade: &AlarmFacade) {
    match facade.rearm_active().await {
        Ok(count) => log::info!("Re-armed {count} active alarms"),
        Err(e) => log::warn!("Skipping re-arm: {e}"),
    }
}
