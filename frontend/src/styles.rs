use shared::alert::AlertLevel;

pub const CONTAINER: &str = "bg-gray-900 container mx-auto px-6 py-10 max-w-5xl rounded-xl shadow-lg mt-16";
pub const CONTAINER_SM: &str = "container mx-auto px-6 py-10 max-w-2xl rounded-xl shadow-lg mt-16";

pub const CARD: &str = "bg-gray-800 border border-gray-700 rounded-lg shadow-md p-6 max-w-xl mx-auto mt-16";
pub const CARD_SECTION: &str = "bg-gray-800 border border-gray-700 p-4 rounded-lg shadow-sm";
pub const ALERT_CARD: &str = "p-4 rounded-lg shadow-md mb-3 flex justify-between items-start gap-4";
pub const MODAL_BACKDROP: &str = "fixed inset-0 bg-black/60 flex items-center justify-center z-50";
pub const MODAL_PANEL: &str = "bg-gray-800 border border-gray-700 rounded-lg shadow-xl p-6 w-full max-w-lg space-y-4";

pub const INPUT_BASE: &str = "appearance-none border border-gray-600 bg-gray-800 text-white text-lg rounded-md w-full py-2 px-4 focus:outline-none focus:border-blue-500";
pub const INPUT_GROUP: &str = "flex-1 flex flex-col gap-2";

pub const BUTTON_BASE: &str = "px-5 py-2 rounded-lg font-medium text-white transition-all duration-150 disabled:opacity-50 disabled:cursor-not-allowed";
pub const BUTTON_PRIMARY: &str = "bg-blue-600 hover:bg-blue-700 focus:ring-2 focus:ring-blue-400 focus:outline-none";
pub const BUTTON_SUCCESS: &str = "bg-green-600 hover:bg-green-700 focus:ring-2 focus:ring-green-400 focus:outline-none";
pub const BUTTON_WARNING: &str = "bg-yellow-600 hover:bg-yellow-700 focus:ring-2 focus:ring-yellow-400 focus:outline-none";
pub const BUTTON_DANGER: &str = "bg-red-600 hover:bg-red-700 focus:ring-2 focus:ring-red-400 focus:outline-none";
pub const BUTTON_MUTED: &str = "bg-gray-600 hover:bg-gray-500 focus:ring-2 focus:ring-gray-400 focus:outline-none";
pub const BUTTON_FULL: &str = "w-full py-3 px-5 font-semibold rounded-lg transition-all duration-150 disabled:opacity-50 disabled:cursor-not-allowed mt-8";

pub const TEXT_LABEL: &str = "block text-sm font-semibold text-gray-200";
pub const TEXT_LABEL_SM: &str = "block text-xs font-medium text-gray-400 mb-2";
pub const TEXT_ERROR: &str = "text-sm text-red-500 font-semibold";
pub const TEXT_MUTED: &str = "text-sm text-gray-400";
pub const HEADING_LG: &str = "text-3xl font-extrabold mb-4 text-center text-gray-100";
pub const HEADING_MD: &str = "text-2xl font-bold mb-5 text-gray-100";
pub const HEADING_SM: &str = "text-xl font-semibold mb-3 text-gray-100";

pub const FLEX_BETWEEN: &str = "flex justify-between items-center";
pub const GRID_COLS_2: &str = "grid grid-cols-1 md:grid-cols-2 gap-6";
pub const SPACE_Y_BASE: &str = "space-y-3";
pub const SPACE_Y_LG: &str = "space-y-6";

pub const STATS_CARD: &str = "p-4 rounded-lg border shadow-sm mb-2";
pub const STATS_CARD_SUCCESS: &str = "bg-green-900 border-green-700 text-green-200 mb-2";
pub const STATS_CARD_INFO: &str = "bg-blue-900 border-blue-700 text-blue-200 mb-2";
pub const STATS_CARD_WARNING: &str = "bg-yellow-900 border-yellow-700 text-yellow-200 mb-2";
pub const STATS_CARD_MUTED: &str = "bg-gray-800 border-gray-700 text-gray-300 mb-2";

pub const PROGRESS_TRACK: &str = "w-full h-2 rounded-full bg-gray-700 overflow-hidden";
pub const PHOTO: &str = "w-16 h-16 rounded-full object-cover border border-gray-600";
pub const PHOTO_PLACEHOLDER: &str = "w-16 h-16 rounded-full bg-gray-700 flex items-center justify-center text-gray-400 text-2xl";

pub const BG_PAGE: &str = "bg-gray-900 min-h-screen";

pub fn combine_classes(base: &str, additional: &str) -> String {
    format!("{} {}", base, additional)
}

pub fn button(variant: &str) -> String {
    combine_classes(BUTTON_BASE, variant)
}

pub fn button_primary(full_width: bool) -> String {
    if full_width {
        combine_classes(BUTTON_BASE, &combine_classes(BUTTON_PRIMARY, BUTTON_FULL))
    } else {
        combine_classes(BUTTON_BASE, BUTTON_PRIMARY)
    }
}

pub fn stats_card(variant: &str) -> String {
    combine_classes(STATS_CARD, variant)
}

pub fn alert_style(level: AlertLevel) -> String {
    match level {
        AlertLevel::Danger => combine_classes(ALERT_CARD, "bg-red-500 text-white shadow-lg"),
        AlertLevel::Success => combine_classes(ALERT_CARD, "bg-green-500 text-white shadow-lg"),
        AlertLevel::Warning => combine_classes(ALERT_CARD, "bg-yellow-500 text-white shadow-lg"),
        AlertLevel::Info => combine_classes(ALERT_CARD, "bg-blue-500 text-white shadow-lg"),
    }
}

pub fn progress_bar(leading: bool) -> &'static str {
    if leading {
        "h-2 rounded-full bg-green-500"
    } else {
        "h-2 rounded-full bg-blue-500"
    }
}
