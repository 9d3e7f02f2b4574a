use crate::geometry::Region;

pub type Window = u32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WindowAttributes {
    pub region: Region,
    pub border_width: u32,
    pub override_redirect: bool,
    pub mapped: bool,
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub enum Protocol {
    Delete,
    TakeFocus,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum IcccmWindowState {
    Withdrawn,
    Normal,
    Iconic,
}

impl IcccmWindowState {
    pub fn from_value(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Withdrawn),
            1 => Some(Self::Normal),
            3 => Some(Self::Iconic),
            _ => None,
        }
    }

    pub fn value(self) -> u32 {
        match self {
            Self::Withdrawn => 0,
            Self::Normal => 1,
            Self::Iconic => 3,
        }
    }
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub enum WindowState {
    Modal,
    Sticky,
    MaximizedVert,
    MaximizedHorz,
    Shaded,
    SkipTaskbar,
    SkipPager,
    Hidden,
    Fullscreen,
    Above,
    Below,
    DemandsAttention,
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub enum WindowType {
    Desktop,
    Dock,
    Toolbar,
    Menu,
    Utility,
    Splash,
    Dialog,
    Normal,
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub enum AllowedAction {
    Move,
    Resize,
    Minimize,
    Shade,
    MaximizeHorz,
    MaximizeVert,
    Fullscreen,
    ChangeDesktop,
    Close,
}
