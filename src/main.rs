mod appsettings;
mod daemon;

use std::sync::Arc;

use knightrehber_models::catalog::EventCatalog;
use knightrehber_scheduler::{
    AlarmFacade, InMemorySession, LocalReminderService, LogDeliveryChannel, ReminderScheduler,
    phone_alarm_for,
};
use knightrehber_storage::{AlarmStateStore, JsonFileKeyValueStore};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let settings = appsettings::load()?;
    log::info!(
        "Starting knightrehber. [timezone = {}, horizon_days = {}, data_dir = {}]",
        settings.alarms.timezone,
        settings.alarms.horizon_days,
        settings.storage.data_dir.display()
    );

    let platform = Arc::new(
        LocalReminderService::new(Arc::new(LogDeliveryChannel)).with_permission(
            settings.alarms.notification_permission,
            settings.alarms.grant_on_request,
        ),
    );
    let phone_alarm = phone_alarm_for(settings.alarms.phone_alarm, platform.clone());
    let store = AlarmStateStore::new(Arc::new(JsonFileKeyValueStore::new(
        &settings.storage.data_dir,
    )));

    let scheduler = ReminderScheduler::new(
        Arc::new(EventCatalog::knight_online()),
        store,
        platform.clone(),
        phone_alarm,
    )
    .with_timezone(settings.alarms.timezone)
    .with_horizon_days(settings.alarms.horizon_days);

    let session = Arc::new(InMemorySession::new());
    let facade = Arc::new(AlarmFacade::new(
        session.clone(),
        Arc::new(scheduler),
        platform,
    ));

    match daemon::sign_in_configured(&session, &settings.session) {
        Some(user) if user.can_use_alarms() => {
            facade.load_current_user().await?;
            for (event, record) in facade.active_alarms().await {
                log::info!(
                    "Active alarm: {} ({}), last scheduled {}",
                    event.name,
                    record.reminder_kind,
                    record.last_scheduled_at
                );
            }
        }
        Some(_) => log::warn!("Running as guest, alarms are only available after signing in"),
        None => log::warn!("No user configured, set session.user_id to arm alarms"),
    }

    let shutdown = CancellationToken::new();
    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => ctrl_c_token.cancel(),
            Err(e) => log::error!("Could not listen for Ctrl-C: {e}"),
        }
    });

    daemon::run(facade, settings.alarms.timezone, shutdown).await;
    Ok(())
}
