use crate::admin::Refresh;
use crate::config::CONFIG;
use crate::session::View;

pub const POLL_INTERVAL_MS: u32 = CONFIG.poll_interval_ms;

const DASHBOARD_REFRESHES: [Refresh; 3] = [Refresh::Results, Refresh::ElectionStatus, Refresh::PastElections];

/// Refreshes issued on each tick. Ticks while the dashboard is hidden do
/// nothing; there is no backoff, so a failing request is simply retried on
/// the next tick.
pub fn due_refreshes(view: View) -> &'static [Refresh] {
    match view {
        View::Dashboard => &DASHBOARD_REFRESHES,
        View::Loading | View::Login => &[],
    }
}
