pub use crate::Result;

use crate::geometry::Pos;
use crate::geometry::Region;
use crate::hints::Gravity;
use crate::input::MouseEvent;
use crate::window::IcccmWindowState;
use crate::window::Window;
use crate::window::WindowState;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Mouse {
        event: MouseEvent,
    },
    MapRequest {
        window: Window,
        ignore: bool,
    },
    Map {
        window: Window,
        ignore: bool,
    },
    Enter {
        window: Window,
        mode: NotifyMode,
        detail: NotifyDetail,
        root_rpos: Pos,
        window_rpos: Pos,
    },
    Leave {
        window: Window,
        mode: NotifyMode,
        detail: NotifyDetail,
        root_rpos: Pos,
        window_rpos: Pos,
    },
    FocusIn {
        window: Window,
        mode: NotifyMode,
        detail: NotifyDetail,
    },
    FocusOut {
        window: Window,
        mode: NotifyMode,
        detail: NotifyDetail,
    },
    Destroy {
        window: Window,
    },
    Unmap {
        window: Window,
        ignore: bool,
    },
    Reparent {
        window: Window,
        parent: Window,
    },
    Expose {
        window: Window,
        region: Region,
        count: u16,
    },
    ConfigureRequest {
        window: Window,
        x: Option<i32>,
        y: Option<i32>,
        w: Option<i32>,
        h: Option<i32>,
        border_width: Option<u32>,
        sibling: Option<Window>,
        stack_mode: Option<StackMode>,
    },
    Configure {
        window: Window,
        region: Region,
        on_root: bool,
    },
    Property {
        window: Window,
        kind: PropertyKind,
        deleted: bool,
        on_root: bool,
    },
    ChangeStateRequest {
        window: Window,
        state: IcccmWindowState,
    },
    StateRequest {
        window: Window,
        action: ToggleAction,
        states: [Option<WindowState>; 2],
    },
    FocusRequest {
        window: Window,
        on_root: bool,
    },
    CloseRequest {
        window: Window,
        on_root: bool,
    },
    DesktopRequest {
        window: Window,
        desktop: Option<usize>,
    },
    WorkspaceRequest {
        index: usize,
    },
    MoveResizeRequest {
        window: Window,
        gravity: Option<Gravity>,
        x: Option<i32>,
        y: Option<i32>,
        w: Option<i32>,
        h: Option<i32>,
    },
    StrutRequest {
        window: Window,
    },
    FrameExtentsRequest {
        window: Window,
        on_root: bool,
    },
    ScreenChange,
    ProtocolError {
        resource: Window,
        kind: ErrorKind,
    },
}

impl Event {
    /// The window an event is addressed to, if any.
    pub fn window(&self) -> Option<Window> {
        match self {
            Event::Mouse {
                event,
            } => Some(event.window),
            Event::MapRequest {
                window, ..
            }
            | Event::Map {
                window, ..
            }
            | Event::Enter {
                window, ..
            }
            | Event::Leave {
                window, ..
            }
            | Event::FocusIn {
                window, ..
            }
            | Event::FocusOut {
                window, ..
            }
            | Event::Destroy {
                window,
            }
            | Event::Unmap {
                window, ..
            }
            | Event::Reparent {
                window, ..
            }
            | Event::Expose {
                window, ..
            }
            | Event::ConfigureRequest {
                window, ..
            }
            | Event::Configure {
                window, ..
            }
            | Event::Property {
                window, ..
            }
            | Event::ChangeStateRequest {
                window, ..
            }
            | Event::StateRequest {
                window, ..
            }
            | Event::FocusRequest {
                window, ..
            }
            | Event::CloseRequest {
                window, ..
            }
            | Event::DesktopRequest {
                window, ..
            }
            | Event::MoveResizeRequest {
                window, ..
            }
            | Event::StrutRequest {
                window,
            }
            | Event::FrameExtentsRequest {
                window, ..
            } => Some(*window),
            Event::ProtocolError {
                resource, ..
            } => Some(*resource),
            Event::WorkspaceRequest {
                ..
            }
            | Event::ScreenChange => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum StackMode {
    Above,
    Below,
    TopIf,
    BottomIf,
    Opposite,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum ToggleAction {
    Toggle,
    Add,
    Remove,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum NotifyMode {
    Normal,
    Grab,
    Ungrab,
    WhileGrabbed,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum NotifyDetail {
    Ancestor,
    Virtual,
    Inferior,
    Nonlinear,
    NonlinearVirtual,
    Pointer,
    PointerRoot,
    None,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum PropertyKind {
    Name,
    IconName,
    Hints,
    NormalHints,
    TransientFor,
    Protocols,
    Motif,
    Strut,
    Other,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum ErrorKind {
    Window,
    Drawable,
    Match,
    Value,
    Access,
    Other,
}

impl ErrorKind {
    /// Errors that mean the resource no longer exists or cannot be used.
    pub fn concerns_window(self) -> bool {
        match self {
            Self::Window | Self::Drawable | Self::Match => true,
            _ => false,
        }
    }
}
