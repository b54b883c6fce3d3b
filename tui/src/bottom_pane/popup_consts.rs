//! Shared popup-related constants for bottom pane widgets.

/// Maximum number of rows any popup should attempt to display.
pub(crate) const MAX_POPUP_ROWS: usize = 8;
