use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use strum_macros::EnumString;

use x11rb::resource_manager::Database;

/// Flat key/class lookup the settings are read through.
pub trait ConfigSource {
    fn read(
        &self,
        key: &str,
        class: &str,
    ) -> Option<String>;
}

impl ConfigSource for Database {
    fn read(
        &self,
        key: &str,
        class: &str,
    ) -> Option<String> {
        self.get_string(key, class).map(String::from)
    }
}

impl ConfigSource for HashMap<String, String> {
    fn read(
        &self,
        key: &str,
        _class: &str,
    ) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FocusModel {
    pub sloppy: bool,
    pub auto_raise: bool,
    pub click_raise: bool,
}

impl FromStr for FocusModel {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.contains("ClickToFocus") {
            return Ok(Self {
                sloppy: false,
                auto_raise: false,
                click_raise: false,
            });
        }

        if value.contains("SloppyFocus") {
            return Ok(Self {
                sloppy: true,
                auto_raise: value.contains("AutoRaise"),
                click_raise: value.contains("ClickRaise"),
            });
        }

        Err(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumString)]
pub enum PlacementPolicy {
    #[strum(serialize = "RowSmartPlacement")]
    RowSmart,
    #[strum(serialize = "ColSmartPlacement")]
    ColSmart,
    #[strum(serialize = "CascadePlacement")]
    Cascade,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumString)]
pub enum RowDirection {
    LeftToRight,
    RightToLeft,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumString)]
pub enum ColDirection {
    TopToBottom,
    BottomToTop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub double_click_interval: u32,
    pub auto_raise_delay: Duration,
    pub opaque_move: bool,
    pub full_maximization: bool,
    pub focus_new_windows: bool,
    pub focus_last_window: bool,
    pub disable_bindings_with_scroll_lock: bool,
    pub focus_model: FocusModel,
    pub placement: PlacementPolicy,
    pub row_direction: RowDirection,
    pub col_direction: ColDirection,
    pub edge_snap_threshold: i32,
    pub workspace_count: usize,
    pub workspace_names: Vec<String>,
    pub border_width: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Turns `session.screen0.focusModel` into `Session.Screen0.FocusModel`.
fn class_of(key: &str) -> String {
    key.split('.')
        .map(|component| {
            let mut chars = component.chars();

            chars.next().map_or(String::new(), |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<String>>()
        .join(".")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

struct Reader<'s> {
    source: &'s dyn ConfigSource,
}

impl<'s> Reader<'s> {
    fn raw(
        &self,
        key: &str,
    ) -> Option<String> {
        self.source.read(key, &class_of(key))
    }

    fn parse<T: FromStr>(
        &self,
        key: &str,
        default: T,
    ) -> T {
        self.raw(key)
            .and_then(|value| value.trim().parse::<T>().ok())
            .unwrap_or(default)
    }

    fn flag(
        &self,
        key: &str,
        default: bool,
    ) -> bool {
        self.raw(key)
            .and_then(|value| parse_bool(&value))
            .unwrap_or(default)
    }
}

impl Config {
    pub fn load(
        source: &dyn ConfigSource,
        screen: usize,
    ) -> Self {
        let reader = Reader {
            source,
        };

        let screen_key = |name: &str| format!("session.screen{}.{}", screen, name);
        let default = Self::DEFAULT;

        let workspace_count = reader.parse(&screen_key("workspaces"), default.workspace_count);
        let workspace_names = reader
            .raw(&screen_key("workspaceNames"))
            .map_or(Vec::new(), |names| {
                names
                    .split(',')
                    .map(|name| name.trim().to_owned())
                    .filter(|name| !name.is_empty())
                    .collect()
            });

        let config = Self {
            double_click_interval: reader.parse(
                "session.doubleClickInterval",
                default.double_click_interval,
            ),
            auto_raise_delay: Duration::from_millis(reader.parse(
                "session.autoRaiseDelay",
                default.auto_raise_delay.as_millis() as u64,
            )),
            opaque_move: reader.flag("session.opaqueMove", default.opaque_move),
            full_maximization: reader
                .flag(&screen_key("fullMaximization"), default.full_maximization),
            focus_new_windows: reader
                .flag(&screen_key("focusNewWindows"), default.focus_new_windows),
            focus_last_window: reader
                .flag(&screen_key("focusLastWindow"), default.focus_last_window),
            disable_bindings_with_scroll_lock: reader.flag(
                &screen_key("disableBindingsWithScrollLock"),
                default.disable_bindings_with_scroll_lock,
            ),
            focus_model: reader.parse(&screen_key("focusModel"), default.focus_model),
            placement: reader.parse(&screen_key("windowPlacement"), default.placement),
            row_direction: reader
                .parse(&screen_key("rowPlacementDirection"), default.row_direction),
            col_direction: reader
                .parse(&screen_key("colPlacementDirection"), default.col_direction),
            edge_snap_threshold: std::cmp::max(
                0,
                reader.parse(&screen_key("edgeSnapThreshold"), default.edge_snap_threshold),
            ),
            workspace_count: std::cmp::max(1, workspace_count),
            workspace_names,
            border_width: reader.parse(&screen_key("borderWidth"), default.border_width),
        };

        debug!("loaded configuration for screen {}: {:?}", screen, config);
        config
    }

    /// The configured name of a workspace, or `Workspace N`.
    pub fn workspace_name(
        &self,
        index: usize,
    ) -> String {
        self.workspace_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Workspace {}", index + 1))
    }
}
