//! Logging and the terminal signal dashboard.

mod dashboard;
mod logging;

pub use dashboard::{
    adx_color, format_price, rsi_color, signal_color, sort_rows, Dashboard, DashboardState,
    SortColumn, SortOrder, WatchRow,
};
pub use logging::setup_logging;
