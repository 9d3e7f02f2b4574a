use crate::config::ColDirection;
use crate::config::Config;
use crate::config::FocusModel;
use crate::config::PlacementPolicy;
use crate::config::RowDirection;
use crate::decoration::ColorScheme;
use crate::decoration::Style;
use crate::placement::Placer;

use winsys::geometry::Dim;

use std::time::Duration;

#[macro_export]
macro_rules! WM_NAME (
    () => { "blackbird" };
);

impl Config {
    pub const DOUBLE_CLICK_INTERVAL: u32 = 250;
    pub const AUTO_RAISE_DELAY: Duration = Duration::from_millis(400);
    pub const WORKSPACE_COUNT: usize = 4;
    pub const BORDER_WIDTH: u32 = 1;

    pub const DEFAULT: Self = Self {
        double_click_interval: Self::DOUBLE_CLICK_INTERVAL,
        auto_raise_delay: Self::AUTO_RAISE_DELAY,
        opaque_move: false,
        full_maximization: false,
        focus_new_windows: false,
        focus_last_window: false,
        disable_bindings_with_scroll_lock: false,
        focus_model: FocusModel::DEFAULT,
        placement: PlacementPolicy::RowSmart,
        row_direction: RowDirection::LeftToRight,
        col_direction: ColDirection::TopToBottom,
        edge_snap_threshold: 0,
        workspace_count: Self::WORKSPACE_COUNT,
        workspace_names: Vec::new(),
        border_width: Self::BORDER_WIDTH,
    };
}

impl FocusModel {
    pub const DEFAULT: Self = Self {
        sloppy: true,
        auto_raise: false,
        click_raise: false,
    };
}

impl Style {
    pub const DEFAULT: Self = Self {
        title_height: 18,
        label_height: 14,
        handle_height: 6,
        button_width: 14,
        grip_width: 20,
        bevel_width: 2,
        frame_width: 1,
    };
}

impl ColorScheme {
    pub const DEFAULT: Self = Self {
        focused_title: 0x5f8787,
        unfocused_title: 0x333333,
        focused_label: 0x6f9797,
        unfocused_label: 0x3c3c3c,
        focused_handle: 0x5f8787,
        unfocused_handle: 0x333333,
        focused_grip: 0x4f7777,
        unfocused_grip: 0x2a2a2a,
        focused_button: 0x5f8787,
        unfocused_button: 0x333333,
        pressed_button: 0xe78a53,
        focused_border: 0x5f8787,
        unfocused_border: 0x222222,
        frame_border: 0x000000,
    };
}

impl Placer {
    pub const CASCADE_STEP: i32 = 32;
    pub const MIN_FRAME_DIM: Dim = Dim {
        w: 1,
        h: 1,
    };
}
