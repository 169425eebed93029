use gymdesk::config::load_app_configuration;
use gymdesk::core::member::member_list;
use gymdesk::core::totals::{MembershipStatus, membership_status};
use gymdesk::telemetry::init_tracing;
use gymdesk::{AppContext, Result};
use std::env;
use tracing::{error, info, warn};

const DEFAULT_CONFIG_PATH: &str = "gymdesk.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    init_tracing("info");

    // 2. Load configuration (file, then .env and process environment)
    let config_path =
        env::var("GYMDESK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_app_configuration(&config_path)
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 3. Open client storage, restore the session and build the API client
    let (ctx, mut notifications, auth) = AppContext::connect(&config)
        .await
        .inspect_err(|e| error!("Failed to start client: {}", e))?;

    let Some(session) = auth.session().await else {
        warn!("No stored session; sign in through the dashboard first");
        return Ok(());
    };
    info!(role = ?session.role, gym = ?session.gym_id, "Session restored");

    // 4. First page of members with their membership status
    let mut members = member_list(&ctx);
    if members.refresh(&ctx).await.is_ok() {
        let today = ctx.today();
        let threshold = ctx.settings.expiring_threshold_days;
        let expiring = members
            .items()
            .iter()
            .filter(|m| {
                membership_status(m.membership_end, today, threshold)
                    == MembershipStatus::ExpiringSoon
            })
            .count();
        info!(
            shown = members.items().len(),
            total = members.pagination().map_or(0, |p| p.total),
            expiring,
            "Members loaded"
        );
    }

    while let Ok(notification) = notifications.try_recv() {
        info!(level = ?notification.level, "{}", notification.message);
    }
    Ok(())
}
