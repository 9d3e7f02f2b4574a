use crate::connection::Connection;
use crate::event::ErrorKind as ProtocolErrorKind;
use crate::event::Event;
use crate::event::NotifyDetail;
use crate::event::NotifyMode;
use crate::event::PropertyKind;
use crate::event::StackMode;
use crate::event::ToggleAction;
use crate::geometry::Dim;
use crate::geometry::Extents;
use crate::geometry::Pos;
use crate::geometry::Ratio;
use crate::geometry::Region;
use crate::geometry::Strut;
use crate::hints::Gravity;
use crate::hints::Hints;
use crate::hints::MotifHints;
use crate::hints::SizeHints;
use crate::input::Button;
use crate::input::Modifier;
use crate::input::MouseEvent;
use crate::input::MouseEventKind;
use crate::input::Timestamp;
use crate::screen::Screen;
use crate::window::AllowedAction;
use crate::window::IcccmWindowState;
use crate::window::Protocol;
use crate::window::Window;
use crate::window::WindowAttributes;
use crate::window::WindowState;
use crate::window::WindowType;
use crate::Result;

use std::collections::HashMap;
use std::collections::HashSet;
use std::convert::TryFrom;
use std::os::unix::io::RawFd;
use std::time::Duration;

use x11rb::connection;
use x11rb::cursor::Handle as CursorHandle;
use x11rb::errors::ReplyError;
use x11rb::properties;
use x11rb::protocol::xproto;
use x11rb::protocol::xproto::ConnectionExt;
use x11rb::protocol::xproto::EventMask;
use x11rb::protocol::xproto::ModMask;
use x11rb::protocol::xproto::CLIENT_MESSAGE_EVENT;
use x11rb::protocol::ErrorKind;
use x11rb::protocol::Event as XEvent;
use x11rb::resource_manager::Database;
use x11rb::wrapper::ConnectionExt as _;

use anyhow::anyhow;
use nix::poll::poll;
use nix::poll::PollFd;
use nix::poll::PollFlags;

type Atom = u32;

const POINTER_ROOT: Window = 1;
const STICKY_DESKTOP: u32 = 0xFFFF_FFFF;

x11rb::atom_manager! {
    pub Atoms: AtomsCookie {
        ATOM,
        CARDINAL,
        WINDOW,
        STRING,
        UTF8_STRING,

        // ICCCM client properties
        WM_NAME,
        WM_ICON_NAME,
        WM_CLASS,
        WM_HINTS,
        WM_PROTOCOLS,
        WM_NORMAL_HINTS,
        WM_DELETE_WINDOW,
        WM_TRANSIENT_FOR,
        WM_TAKE_FOCUS,

        // ICCCM window manager properties
        WM_STATE,
        WM_CHANGE_STATE,

        // Motif hints
        _MOTIF_WM_HINTS,

        // EWMH root properties
        _NET_SUPPORTED,
        _NET_CLIENT_LIST,
        _NET_CLIENT_LIST_STACKING,
        _NET_NUMBER_OF_DESKTOPS,
        _NET_CURRENT_DESKTOP,
        _NET_DESKTOP_NAMES,
        _NET_ACTIVE_WINDOW,
        _NET_WORKAREA,
        _NET_SUPPORTING_WM_CHECK,

        // EWMH root messages
        _NET_CLOSE_WINDOW,
        _NET_MOVERESIZE_WINDOW,
        _NET_REQUEST_FRAME_EXTENTS,

        // EWMH application properties
        _NET_WM_NAME,
        _NET_WM_ICON_NAME,
        _NET_WM_DESKTOP,
        _NET_WM_WINDOW_TYPE,
        _NET_WM_STATE,
        _NET_WM_ALLOWED_ACTIONS,
        _NET_WM_STRUT,
        _NET_WM_STRUT_PARTIAL,
        _NET_WM_PID,
        _NET_FRAME_EXTENTS,

        // EWMH window states
        _NET_WM_STATE_MODAL,
        _NET_WM_STATE_STICKY,
        _NET_WM_STATE_MAXIMIZED_VERT,
        _NET_WM_STATE_MAXIMIZED_HORZ,
        _NET_WM_STATE_SHADED,
        _NET_WM_STATE_SKIP_TASKBAR,
        _NET_WM_STATE_SKIP_PAGER,
        _NET_WM_STATE_HIDDEN,
        _NET_WM_STATE_FULLSCREEN,
        _NET_WM_STATE_ABOVE,
        _NET_WM_STATE_BELOW,
        _NET_WM_STATE_DEMANDS_ATTENTION,

        // EWMH allowed actions
        _NET_WM_ACTION_MOVE,
        _NET_WM_ACTION_RESIZE,
        _NET_WM_ACTION_MINIMIZE,
        _NET_WM_ACTION_SHADE,
        _NET_WM_ACTION_MAXIMIZE_HORZ,
        _NET_WM_ACTION_MAXIMIZE_VERT,
        _NET_WM_ACTION_FULLSCREEN,
        _NET_WM_ACTION_CHANGE_DESKTOP,
        _NET_WM_ACTION_CLOSE,

        // EWMH window types
        _NET_WM_WINDOW_TYPE_DESKTOP,
        _NET_WM_WINDOW_TYPE_DOCK,
        _NET_WM_WINDOW_TYPE_TOOLBAR,
        _NET_WM_WINDOW_TYPE_MENU,
        _NET_WM_WINDOW_TYPE_UTILITY,
        _NET_WM_WINDOW_TYPE_SPLASH,
        _NET_WM_WINDOW_TYPE_DIALOG,
        _NET_WM_WINDOW_TYPE_NORMAL,
    }
}

pub struct XConnection<'conn, Conn: connection::Connection> {
    conn: &'conn Conn,
    fd: RawFd,
    atoms: Atoms,
    type_map: HashMap<Atom, WindowType>,
    state_map: HashMap<Atom, WindowState>,
    screen: xproto::Screen,
    check_window: Window,
    fill_gc: xproto::Gcontext,
    outline_gc: xproto::Gcontext,
    root_event_mask: EventMask,
    client_event_mask: EventMask,
    frame_event_mask: EventMask,
    plate_event_mask: EventMask,
    decoration_event_mask: EventMask,
    grab_event_mask: EventMask,
}

impl<'conn, Conn: connection::Connection> XConnection<'conn, Conn> {
    pub fn new(
        conn: &'conn Conn,
        screen_num: usize,
        fd: RawFd,
    ) -> Result<Self> {
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .cloned()
            .ok_or_else(|| anyhow!("screen {} does not exist", screen_num))?;
        let root = screen.root;

        let root_event_mask: EventMask = EventMask::PROPERTY_CHANGE
            | EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::STRUCTURE_NOTIFY
            | EventMask::FOCUS_CHANGE
            | EventMask::BUTTON_PRESS
            | EventMask::BUTTON_RELEASE;

        let aux = xproto::ChangeWindowAttributesAux::default().event_mask(root_event_mask);

        let res = conn.change_window_attributes(root, &aux)?.check();
        if let Err(ReplyError::X11Error(err)) = res {
            if err.error_kind == ErrorKind::Access {
                return Err(anyhow!("another window manager is already running"));
            } else {
                return Err(anyhow!("unable to set up window manager"));
            }
        }

        let atoms = Atoms::new(conn)?.reply()?;
        let check_window = conn.generate_id()?;

        let type_map: HashMap<Atom, WindowType> = map!(
            atoms._NET_WM_WINDOW_TYPE_DESKTOP => WindowType::Desktop,
            atoms._NET_WM_WINDOW_TYPE_DOCK => WindowType::Dock,
            atoms._NET_WM_WINDOW_TYPE_TOOLBAR => WindowType::Toolbar,
            atoms._NET_WM_WINDOW_TYPE_MENU => WindowType::Menu,
            atoms._NET_WM_WINDOW_TYPE_UTILITY => WindowType::Utility,
            atoms._NET_WM_WINDOW_TYPE_SPLASH => WindowType::Splash,
            atoms._NET_WM_WINDOW_TYPE_DIALOG => WindowType::Dialog,
            atoms._NET_WM_WINDOW_TYPE_NORMAL => WindowType::Normal,
        );

        let state_map: HashMap<Atom, WindowState> = map!(
            atoms._NET_WM_STATE_MODAL => WindowState::Modal,
            atoms._NET_WM_STATE_STICKY => WindowState::Sticky,
            atoms._NET_WM_STATE_MAXIMIZED_VERT => WindowState::MaximizedVert,
            atoms._NET_WM_STATE_MAXIMIZED_HORZ => WindowState::MaximizedHorz,
            atoms._NET_WM_STATE_SHADED => WindowState::Shaded,
            atoms._NET_WM_STATE_SKIP_TASKBAR => WindowState::SkipTaskbar,
            atoms._NET_WM_STATE_SKIP_PAGER => WindowState::SkipPager,
            atoms._NET_WM_STATE_HIDDEN => WindowState::Hidden,
            atoms._NET_WM_STATE_FULLSCREEN => WindowState::Fullscreen,
            atoms._NET_WM_STATE_ABOVE => WindowState::Above,
            atoms._NET_WM_STATE_BELOW => WindowState::Below,
            atoms._NET_WM_STATE_DEMANDS_ATTENTION => WindowState::DemandsAttention,
        );

        conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            check_window,
            root,
            -1,
            -1,
            1,
            1,
            0,
            xproto::WindowClass::INPUT_ONLY,
            x11rb::COPY_FROM_PARENT,
            &xproto::CreateWindowAux::default().override_redirect(1),
        )?;

        conn.map_window(check_window)?;
        conn.configure_window(
            check_window,
            &xproto::ConfigureWindowAux::default().stack_mode(xproto::StackMode::BELOW),
        )?;

        let fill_gc = conn.generate_id()?;
        conn.create_gc(fill_gc, root, &xproto::CreateGCAux::default())?;

        let outline_gc = conn.generate_id()?;
        conn.create_gc(
            outline_gc,
            root,
            &xproto::CreateGCAux::default()
                .function(xproto::GX::XOR)
                .foreground(screen.white_pixel)
                .subwindow_mode(xproto::SubwindowMode::INCLUDE_INFERIORS)
                .line_width(1),
        )?;

        if let Ok(database) = Database::new_from_default(conn) {
            drop(
                CursorHandle::new(conn, screen_num, &database).map(|cookie| {
                    cookie.reply().map(|reply| {
                        let aux = xproto::ChangeWindowAttributesAux::default()
                            .cursor(reply.load_cursor(conn, "left_ptr").ok());

                        drop(conn.change_window_attributes(root, &aux));
                    })
                }),
            );
        }

        let client_event_mask: EventMask =
            EventMask::PROPERTY_CHANGE | EventMask::STRUCTURE_NOTIFY | EventMask::FOCUS_CHANGE;

        let frame_event_mask: EventMask = EventMask::BUTTON_PRESS
            | EventMask::BUTTON_RELEASE
            | EventMask::BUTTON_MOTION
            | EventMask::ENTER_WINDOW
            | EventMask::LEAVE_WINDOW
            | EventMask::EXPOSURE;

        let plate_event_mask: EventMask = EventMask::SUBSTRUCTURE_REDIRECT | EventMask::FOCUS_CHANGE;

        let decoration_event_mask: EventMask = EventMask::BUTTON_PRESS
            | EventMask::BUTTON_RELEASE
            | EventMask::BUTTON_MOTION
            | EventMask::EXPOSURE;

        let grab_event_mask: EventMask =
            EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::BUTTON_MOTION;

        Self::init(Self {
            conn,
            fd,
            atoms,
            type_map,
            state_map,
            screen,
            check_window,
            fill_gc,
            outline_gc,
            root_event_mask,
            client_event_mask,
            frame_event_mask,
            plate_event_mask,
            decoration_event_mask,
            grab_event_mask,
        })
    }

    #[inline]
    fn init(connection: Self) -> Result<Self> {
        drop(connection.conn.flush());
        Ok(connection)
    }

    fn get_atoms(
        &self,
        window: Window,
        property: Atom,
    ) -> Vec<Atom> {
        self.conn
            .get_property(false, window, property, self.atoms.ATOM, 0, std::u32::MAX)
            .map_or(Vec::with_capacity(0), |cookie| {
                cookie.reply().map_or(Vec::with_capacity(0), |reply| {
                    reply
                        .value32()
                        .map_or(Vec::with_capacity(0), |values| values.collect())
                })
            })
    }

    fn get_cardinals(
        &self,
        window: Window,
        property: Atom,
    ) -> Option<Vec<u32>> {
        self.conn
            .get_property(
                false,
                window,
                property,
                self.atoms.CARDINAL,
                0,
                std::u32::MAX,
            )
            .ok()?
            .reply()
            .ok()
            .and_then(|reply| {
                let values: Vec<u32> = reply.value32()?.collect();

                if values.is_empty() {
                    None
                } else {
                    Some(values)
                }
            })
    }

    #[inline]
    fn send_client_message(
        &self,
        window: Window,
        atom: Atom,
        type_: Atom,
        time: Timestamp,
    ) -> Result<()> {
        let data = [atom, time, 0, 0, 0];

        let event = xproto::ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window,
            type_,
            data: data.into(),
        };

        self.conn
            .send_event(false, window, EventMask::NO_EVENT, &event)?;

        Ok(())
    }

    #[inline]
    fn get_window_state_from_atom(
        &self,
        atom: Atom,
    ) -> Option<WindowState> {
        self.state_map.get(&atom).copied()
    }

    #[inline]
    fn get_atom_from_window_state(
        &self,
        state: WindowState,
    ) -> Atom {
        match state {
            WindowState::Modal => self.atoms._NET_WM_STATE_MODAL,
            WindowState::Sticky => self.atoms._NET_WM_STATE_STICKY,
            WindowState::MaximizedVert => self.atoms._NET_WM_STATE_MAXIMIZED_VERT,
            WindowState::MaximizedHorz => self.atoms._NET_WM_STATE_MAXIMIZED_HORZ,
            WindowState::Shaded => self.atoms._NET_WM_STATE_SHADED,
            WindowState::SkipTaskbar => self.atoms._NET_WM_STATE_SKIP_TASKBAR,
            WindowState::SkipPager => self.atoms._NET_WM_STATE_SKIP_PAGER,
            WindowState::Hidden => self.atoms._NET_WM_STATE_HIDDEN,
            WindowState::Fullscreen => self.atoms._NET_WM_STATE_FULLSCREEN,
            WindowState::Above => self.atoms._NET_WM_STATE_ABOVE,
            WindowState::Below => self.atoms._NET_WM_STATE_BELOW,
            WindowState::DemandsAttention => self.atoms._NET_WM_STATE_DEMANDS_ATTENTION,
        }
    }

    #[inline]
    fn get_atom_from_allowed_action(
        &self,
        action: AllowedAction,
    ) -> Atom {
        match action {
            AllowedAction::Move => self.atoms._NET_WM_ACTION_MOVE,
            AllowedAction::Resize => self.atoms._NET_WM_ACTION_RESIZE,
            AllowedAction::Minimize => self.atoms._NET_WM_ACTION_MINIMIZE,
            AllowedAction::Shade => self.atoms._NET_WM_ACTION_SHADE,
            AllowedAction::MaximizeHorz => self.atoms._NET_WM_ACTION_MAXIMIZE_HORZ,
            AllowedAction::MaximizeVert => self.atoms._NET_WM_ACTION_MAXIMIZE_VERT,
            AllowedAction::Fullscreen => self.atoms._NET_WM_ACTION_FULLSCREEN,
            AllowedAction::ChangeDesktop => self.atoms._NET_WM_ACTION_CHANGE_DESKTOP,
            AllowedAction::Close => self.atoms._NET_WM_ACTION_CLOSE,
        }
    }

    #[inline]
    fn get_window_type_from_atom(
        &self,
        atom: Atom,
    ) -> Option<WindowType> {
        self.type_map.get(&atom).copied()
    }

    fn get_modifiers(state: u16) -> HashSet<Modifier> {
        let mut modifiers = HashSet::new();

        if state & u16::from(ModMask::CONTROL) > 0 {
            modifiers.insert(Modifier::Ctrl);
        }

        if state & u16::from(ModMask::SHIFT) > 0 {
            modifiers.insert(Modifier::Shift);
        }

        if state & u16::from(ModMask::M1) > 0 {
            modifiers.insert(Modifier::Alt);
        }

        if state & u16::from(ModMask::M4) > 0 {
            modifiers.insert(Modifier::Super);
        }

        if state & u16::from(ModMask::LOCK) > 0 {
            modifiers.insert(Modifier::CapsLock);
        }

        if state & u16::from(ModMask::M2) > 0 {
            modifiers.insert(Modifier::NumLock);
        }

        if state & u16::from(ModMask::M5) > 0 {
            modifiers.insert(Modifier::ScrollLock);
        }

        modifiers
    }

    fn get_modifier_mask(modifiers: &HashSet<Modifier>) -> u16 {
        modifiers.iter().fold(0u16, |acc, &m| {
            acc | u16::from(match m {
                Modifier::Ctrl => ModMask::CONTROL,
                Modifier::Shift => ModMask::SHIFT,
                Modifier::Alt => ModMask::M1,
                Modifier::Super => ModMask::M4,
                Modifier::CapsLock => ModMask::LOCK,
                Modifier::NumLock => ModMask::M2,
                Modifier::ScrollLock => ModMask::M5,
            })
        })
    }

    fn get_held_buttons(state: u16) -> HashSet<Button> {
        let mut held = HashSet::new();

        if state & u16::from(xproto::KeyButMask::BUTTON1) > 0 {
            held.insert(Button::Left);
        }

        if state & u16::from(xproto::KeyButMask::BUTTON2) > 0 {
            held.insert(Button::Middle);
        }

        if state & u16::from(xproto::KeyButMask::BUTTON3) > 0 {
            held.insert(Button::Right);
        }

        if state & u16::from(xproto::KeyButMask::BUTTON4) > 0 {
            held.insert(Button::ScrollUp);
        }

        if state & u16::from(xproto::KeyButMask::BUTTON5) > 0 {
            held.insert(Button::ScrollDown);
        }

        held
    }

    fn get_notify_mode(mode: xproto::NotifyMode) -> NotifyMode {
        match mode {
            xproto::NotifyMode::GRAB => NotifyMode::Grab,
            xproto::NotifyMode::UNGRAB => NotifyMode::Ungrab,
            xproto::NotifyMode::WHILE_GRABBED => NotifyMode::WhileGrabbed,
            _ => NotifyMode::Normal,
        }
    }

    fn get_notify_detail(detail: xproto::NotifyDetail) -> NotifyDetail {
        match detail {
            xproto::NotifyDetail::ANCESTOR => NotifyDetail::Ancestor,
            xproto::NotifyDetail::VIRTUAL => NotifyDetail::Virtual,
            xproto::NotifyDetail::INFERIOR => NotifyDetail::Inferior,
            xproto::NotifyDetail::NONLINEAR => NotifyDetail::Nonlinear,
            xproto::NotifyDetail::NONLINEAR_VIRTUAL => NotifyDetail::NonlinearVirtual,
            xproto::NotifyDetail::POINTER => NotifyDetail::Pointer,
            xproto::NotifyDetail::POINTER_ROOT => NotifyDetail::PointerRoot,
            _ => NotifyDetail::None,
        }
    }

    #[inline]
    fn on_button_press(
        &self,
        event: &xproto::ButtonPressEvent,
    ) -> Option<Event> {
        Some(Event::Mouse {
            event: MouseEvent {
                kind: MouseEventKind::Press,
                window: event.event,
                button: Some(Button::from_detail(event.detail)?),
                held: Self::get_held_buttons(event.state),
                modifiers: Self::get_modifiers(event.state),
                root_rpos: Pos {
                    x: event.root_x as i32,
                    y: event.root_y as i32,
                },
                window_rpos: Pos {
                    x: event.event_x as i32,
                    y: event.event_y as i32,
                },
                time: event.time,
            },
        })
    }

    #[inline]
    fn on_button_release(
        &self,
        event: &xproto::ButtonReleaseEvent,
    ) -> Option<Event> {
        Some(Event::Mouse {
            event: MouseEvent {
                kind: MouseEventKind::Release,
                window: event.event,
                button: Some(Button::from_detail(event.detail)?),
                held: Self::get_held_buttons(event.state),
                modifiers: Self::get_modifiers(event.state),
                root_rpos: Pos {
                    x: event.root_x as i32,
                    y: event.root_y as i32,
                },
                window_rpos: Pos {
                    x: event.event_x as i32,
                    y: event.event_y as i32,
                },
                time: event.time,
            },
        })
    }

    #[inline]
    fn on_motion_notify(
        &self,
        event: &xproto::MotionNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Mouse {
            event: MouseEvent {
                kind: MouseEventKind::Motion,
                window: event.event,
                button: None,
                held: Self::get_held_buttons(event.state),
                modifiers: Self::get_modifiers(event.state),
                root_rpos: Pos {
                    x: event.root_x as i32,
                    y: event.root_y as i32,
                },
                window_rpos: Pos {
                    x: event.event_x as i32,
                    y: event.event_y as i32,
                },
                time: event.time,
            },
        })
    }

    #[inline]
    fn on_map_request(
        &self,
        event: &xproto::MapRequestEvent,
    ) -> Option<Event> {
        Some(Event::MapRequest {
            window: event.window,
            ignore: self
                .get_window_attributes(event.window)
                .map_or(true, |attributes| attributes.override_redirect),
        })
    }

    #[inline]
    fn on_map_notify(
        &self,
        event: &xproto::MapNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Map {
            window: event.window,
            ignore: event.override_redirect,
        })
    }

    #[inline]
    fn on_enter_notify(
        &self,
        event: &xproto::EnterNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Enter {
            window: event.event,
            mode: Self::get_notify_mode(event.mode),
            detail: Self::get_notify_detail(event.detail),
            root_rpos: Pos {
                x: event.root_x as i32,
                y: event.root_y as i32,
            },
            window_rpos: Pos {
                x: event.event_x as i32,
                y: event.event_y as i32,
            },
        })
    }

    #[inline]
    fn on_leave_notify(
        &self,
        event: &xproto::LeaveNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Leave {
            window: event.event,
            mode: Self::get_notify_mode(event.mode),
            detail: Self::get_notify_detail(event.detail),
            root_rpos: Pos {
                x: event.root_x as i32,
                y: event.root_y as i32,
            },
            window_rpos: Pos {
                x: event.event_x as i32,
                y: event.event_y as i32,
            },
        })
    }

    #[inline]
    fn on_focus_in(
        &self,
        event: &xproto::FocusInEvent,
    ) -> Option<Event> {
        Some(Event::FocusIn {
            window: event.event,
            mode: Self::get_notify_mode(event.mode),
            detail: Self::get_notify_detail(event.detail),
        })
    }

    #[inline]
    fn on_focus_out(
        &self,
        event: &xproto::FocusOutEvent,
    ) -> Option<Event> {
        Some(Event::FocusOut {
            window: event.event,
            mode: Self::get_notify_mode(event.mode),
            detail: Self::get_notify_detail(event.detail),
        })
    }

    #[inline]
    fn on_destroy_notify(
        &self,
        event: &xproto::DestroyNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Destroy {
            window: event.window,
        })
    }

    #[inline]
    fn on_expose(
        &self,
        event: &xproto::ExposeEvent,
    ) -> Option<Event> {
        Some(Event::Expose {
            window: event.window,
            region: Region::new(
                event.x as i32,
                event.y as i32,
                event.width as i32,
                event.height as i32,
            ),
            count: event.count,
        })
    }

    #[inline]
    fn on_unmap_notify(
        &self,
        event: &xproto::UnmapNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Unmap {
            window: event.window,
            ignore: event.from_configure,
        })
    }

    #[inline]
    fn on_reparent_notify(
        &self,
        event: &xproto::ReparentNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Reparent {
            window: event.window,
            parent: event.parent,
        })
    }

    #[inline]
    fn on_configure_request(
        &self,
        event: &xproto::ConfigureRequestEvent,
    ) -> Option<Event> {
        let has = |flag: xproto::ConfigWindow| event.value_mask & u16::from(flag) != 0;

        Some(Event::ConfigureRequest {
            window: event.window,
            x: if has(xproto::ConfigWindow::X) {
                Some(event.x as i32)
            } else {
                None
            },
            y: if has(xproto::ConfigWindow::Y) {
                Some(event.y as i32)
            } else {
                None
            },
            w: if has(xproto::ConfigWindow::WIDTH) {
                Some(event.width as i32)
            } else {
                None
            },
            h: if has(xproto::ConfigWindow::HEIGHT) {
                Some(event.height as i32)
            } else {
                None
            },
            border_width: if has(xproto::ConfigWindow::BORDER_WIDTH) {
                Some(event.border_width as u32)
            } else {
                None
            },
            sibling: if has(xproto::ConfigWindow::SIBLING) && event.sibling != x11rb::NONE {
                Some(event.sibling)
            } else {
                None
            },
            stack_mode: if has(xproto::ConfigWindow::STACK_MODE) {
                Some(match event.stack_mode {
                    xproto::StackMode::ABOVE => StackMode::Above,
                    xproto::StackMode::BELOW => StackMode::Below,
                    xproto::StackMode::TOP_IF => StackMode::TopIf,
                    xproto::StackMode::BOTTOM_IF => StackMode::BottomIf,
                    _ => StackMode::Opposite,
                })
            } else {
                None
            },
        })
    }

    #[inline]
    fn on_configure_notify(
        &self,
        event: &xproto::ConfigureNotifyEvent,
    ) -> Option<Event> {
        Some(Event::Configure {
            window: event.window,
            region: Region::new(
                event.x as i32,
                event.y as i32,
                event.width as i32,
                event.height as i32,
            ),
            on_root: event.window == self.screen.root,
        })
    }

    #[inline]
    fn on_property_notify(
        &self,
        event: &xproto::PropertyNotifyEvent,
    ) -> Option<Event> {
        let kind = if event.atom == self.atoms.WM_NAME || event.atom == self.atoms._NET_WM_NAME {
            PropertyKind::Name
        } else if event.atom == self.atoms.WM_ICON_NAME
            || event.atom == self.atoms._NET_WM_ICON_NAME
        {
            PropertyKind::IconName
        } else if event.atom == self.atoms.WM_HINTS {
            PropertyKind::Hints
        } else if event.atom == self.atoms.WM_NORMAL_HINTS {
            PropertyKind::NormalHints
        } else if event.atom == self.atoms.WM_TRANSIENT_FOR {
            PropertyKind::TransientFor
        } else if event.atom == self.atoms.WM_PROTOCOLS {
            PropertyKind::Protocols
        } else if event.atom == self.atoms._MOTIF_WM_HINTS {
            PropertyKind::Motif
        } else if event.atom == self.atoms._NET_WM_STRUT
            || event.atom == self.atoms._NET_WM_STRUT_PARTIAL
        {
            PropertyKind::Strut
        } else {
            return None;
        };

        Some(Event::Property {
            window: event.window,
            kind,
            deleted: event.state == xproto::Property::DELETE,
            on_root: event.window == self.screen.root,
        })
    }

    #[inline]
    fn on_client_message(
        &self,
        event: &xproto::ClientMessageEvent,
    ) -> Option<Event> {
        if event.format != 32 {
            return None;
        }

        let data = event.data.as_data32();

        if event.type_ == self.atoms.WM_CHANGE_STATE {
            if data[0] == IcccmWindowState::Iconic.value() {
                return Some(Event::ChangeStateRequest {
                    window: event.window,
                    state: IcccmWindowState::Iconic,
                });
            }
        } else if event.type_ == self.atoms._NET_WM_STATE {
            let action = match data[0] {
                0 => ToggleAction::Remove,
                1 => ToggleAction::Add,
                2 => ToggleAction::Toggle,
                _ => return None,
            };

            let states = [
                self.get_window_state_from_atom(data[1]),
                self.get_window_state_from_atom(data[2]),
            ];

            if states.iter().all(Option::is_none) {
                return None;
            }

            return Some(Event::StateRequest {
                window: event.window,
                action,
                states,
            });
        } else if event.type_ == self.atoms._NET_MOVERESIZE_WINDOW {
            let flags = data[0];
            let field = |bit: u32, value: u32| {
                if flags & (1 << bit) != 0 {
                    Some(value as i32)
                } else {
                    None
                }
            };

            return Some(Event::MoveResizeRequest {
                window: event.window,
                gravity: match flags & 0xff {
                    0 => None,
                    gravity => Gravity::from_value(gravity),
                },
                x: field(8, data[1]),
                y: field(9, data[2]),
                w: field(10, data[3]),
                h: field(11, data[4]),
            });
        } else if event.type_ == self.atoms._NET_WM_DESKTOP {
            return Some(Event::DesktopRequest {
                window: event.window,
                desktop: if data[0] == STICKY_DESKTOP {
                    None
                } else {
                    Some(data[0] as usize)
                },
            });
        } else if event.type_ == self.atoms._NET_REQUEST_FRAME_EXTENTS {
            return Some(Event::FrameExtentsRequest {
                window: event.window,
                on_root: event.window == self.screen.root,
            });
        } else if event.type_ == self.atoms._NET_CURRENT_DESKTOP {
            return Some(Event::WorkspaceRequest {
                index: data[0] as usize,
            });
        } else if event.type_ == self.atoms._NET_CLOSE_WINDOW {
            return Some(Event::CloseRequest {
                window: event.window,
                on_root: event.window == self.screen.root,
            });
        } else if event.type_ == self.atoms._NET_ACTIVE_WINDOW {
            if data[0] <= 2 {
                return Some(Event::FocusRequest {
                    window: event.window,
                    on_root: event.window == self.screen.root,
                });
            }
        }

        None
    }

    #[inline]
    fn on_error(
        &self,
        error: &x11rb::x11_utils::X11Error,
    ) -> Option<Event> {
        Some(Event::ProtocolError {
            resource: error.bad_value,
            kind: match error.error_kind {
                ErrorKind::Window => ProtocolErrorKind::Window,
                ErrorKind::Drawable => ProtocolErrorKind::Drawable,
                ErrorKind::Match => ProtocolErrorKind::Match,
                ErrorKind::Value => ProtocolErrorKind::Value,
                ErrorKind::Access => ProtocolErrorKind::Access,
                _ => ProtocolErrorKind::Other,
            },
        })
    }
}

impl<'conn, Conn: connection::Connection> Connection for XConnection<'conn, Conn> {
    #[inline]
    fn flush(&self) -> bool {
        self.conn.flush().is_ok()
    }

    #[inline]
    fn sync(&self) {
        drop(
            self.conn
                .get_input_focus()
                .map(|cookie| drop(cookie.reply())),
        );
    }

    fn poll_event(&self) -> Option<Event> {
        loop {
            let event = self.conn.poll_for_event().ok()??;

            trace!("received event: {:?}", event);

            let event = match event {
                XEvent::ButtonPress(e) => self.on_button_press(&e),
                XEvent::ButtonRelease(e) => self.on_button_release(&e),
                XEvent::MotionNotify(e) => self.on_motion_notify(&e),
                XEvent::MapRequest(e) => self.on_map_request(&e),
                XEvent::MapNotify(e) => self.on_map_notify(&e),
                XEvent::EnterNotify(e) => self.on_enter_notify(&e),
                XEvent::LeaveNotify(e) => self.on_leave_notify(&e),
                XEvent::FocusIn(e) => self.on_focus_in(&e),
                XEvent::FocusOut(e) => self.on_focus_out(&e),
                XEvent::DestroyNotify(e) => self.on_destroy_notify(&e),
                XEvent::Expose(e) => self.on_expose(&e),
                XEvent::UnmapNotify(e) => self.on_unmap_notify(&e),
                XEvent::ReparentNotify(e) => self.on_reparent_notify(&e),
                XEvent::ConfigureRequest(e) => self.on_configure_request(&e),
                XEvent::ConfigureNotify(e) => self.on_configure_notify(&e),
                XEvent::PropertyNotify(e) => self.on_property_notify(&e),
                XEvent::ClientMessage(e) => self.on_client_message(&e),
                XEvent::Error(e) => self.on_error(&e),
                _ => None,
            };

            if event.is_some() {
                return event;
            }
        }
    }

    fn wait_for_input(
        &self,
        timeout: Option<Duration>,
    ) -> bool {
        let mut fds = [PollFd::new(self.fd, PollFlags::POLLIN)];
        let timeout = timeout.map_or(-1, |timeout| {
            std::cmp::min(timeout.as_millis(), std::i32::MAX as u128) as i32
        });

        // an interrupted wait still wakes the loop so that signals are seen
        poll(&mut fds, timeout).map_or(true, |ready| ready > 0)
    }

    #[inline]
    fn root(&self) -> Window {
        self.screen.root
    }

    fn screen(&self) -> Screen {
        Screen::new(
            Region::new(
                0,
                0,
                self.screen.width_in_pixels as i32,
                self.screen.height_in_pixels as i32,
            ),
            0,
        )
    }

    fn top_level_windows(&self) -> Vec<Window> {
        self.conn
            .query_tree(self.screen.root)
            .map_or(Vec::with_capacity(0), |cookie| {
                cookie.reply().map_or(Vec::with_capacity(0), |reply| {
                    reply
                        .children
                        .into_iter()
                        .filter(|&window| window != self.check_window)
                        .collect()
                })
            })
    }

    fn cleanup(&self) {
        drop(self.conn.destroy_window(self.check_window));
        drop(self.conn.free_gc(self.fill_gc));
        drop(self.conn.free_gc(self.outline_gc));

        for &property in &[
            self.atoms._NET_ACTIVE_WINDOW,
            self.atoms._NET_SUPPORTING_WM_CHECK,
            self.atoms._NET_WM_NAME,
            self.atoms.WM_CLASS,
            self.atoms._NET_SUPPORTED,
            self.atoms._NET_WM_PID,
            self.atoms._NET_CLIENT_LIST,
            self.atoms._NET_CLIENT_LIST_STACKING,
            self.atoms._NET_WORKAREA,
        ] {
            drop(self.conn.delete_property(self.screen.root, property));
        }

        drop(self.conn.set_input_focus(
            xproto::InputFocus::POINTER_ROOT,
            POINTER_ROOT,
            x11rb::CURRENT_TIME,
        ));

        self.flush();
    }

    #[inline]
    fn grab_server(&self) {
        drop(self.conn.grab_server());
    }

    #[inline]
    fn ungrab_server(&self) {
        drop(self.conn.ungrab_server());
    }

    fn grab_pointer(
        &self,
        window: Window,
    ) -> bool {
        self.conn
            .grab_pointer(
                false,
                window,
                u32::from(EventMask::POINTER_MOTION | EventMask::BUTTON_RELEASE) as u16,
                xproto::GrabMode::ASYNC,
                xproto::GrabMode::ASYNC,
                x11rb::NONE,
                x11rb::NONE,
                x11rb::CURRENT_TIME,
            )
            .map_or(false, |cookie| {
                cookie
                    .reply()
                    .map_or(false, |reply| reply.status == xproto::GrabStatus::SUCCESS)
            })
    }

    #[inline]
    fn ungrab_pointer(&self) {
        drop(self.conn.ungrab_pointer(x11rb::CURRENT_TIME));
    }

    #[inline]
    fn replay_pointer(
        &self,
        time: Timestamp,
    ) {
        drop(self.conn.allow_events(xproto::Allow::REPLAY_POINTER, time));
    }

    fn grab_button(
        &self,
        window: Window,
        button: Button,
        modifiers: &HashSet<Modifier>,
        sync: bool,
    ) {
        let button = match xproto::ButtonIndex::try_from(button.detail()) {
            Ok(button) => button,
            Err(_) => return,
        };

        let pointer_mode = if sync {
            xproto::GrabMode::SYNC
        } else {
            xproto::GrabMode::ASYNC
        };

        drop(self.conn.grab_button(
            sync,
            window,
            u32::from(self.grab_event_mask) as u16,
            pointer_mode,
            xproto::GrabMode::ASYNC,
            x11rb::NONE,
            x11rb::NONE,
            button,
            Self::get_modifier_mask(modifiers),
        ));
    }

    #[inline]
    fn ungrab_buttons(
        &self,
        window: Window,
    ) {
        drop(
            self.conn
                .ungrab_button(xproto::ButtonIndex::ANY, window, ModMask::ANY),
        );
    }

    fn create_frame(
        &self,
        region: Region,
        border_width: u32,
    ) -> Result<Window> {
        let frame = self.conn.generate_id()?;
        let aux = xproto::CreateWindowAux::new()
            .override_redirect(1)
            .border_pixel(self.screen.black_pixel)
            .event_mask(self.frame_event_mask);

        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            frame,
            self.screen.root,
            region.pos.x as i16,
            region.pos.y as i16,
            std::cmp::max(region.dim.w, 1) as u16,
            std::cmp::max(region.dim.h, 1) as u16,
            border_width as u16,
            xproto::WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;

        Ok(frame)
    }

    fn create_plate(
        &self,
        frame: Window,
        region: Region,
    ) -> Result<Window> {
        let plate = self.conn.generate_id()?;
        let aux = xproto::CreateWindowAux::new().event_mask(self.plate_event_mask);

        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            plate,
            frame,
            region.pos.x as i16,
            region.pos.y as i16,
            std::cmp::max(region.dim.w, 1) as u16,
            std::cmp::max(region.dim.h, 1) as u16,
            0,
            xproto::WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;

        Ok(plate)
    }

    fn create_subwindow(
        &self,
        parent: Window,
        region: Region,
    ) -> Result<Window> {
        let window = self.conn.generate_id()?;
        let aux = xproto::CreateWindowAux::new().event_mask(self.decoration_event_mask);

        self.conn.create_window(
            x11rb::COPY_DEPTH_FROM_PARENT,
            window,
            parent,
            region.pos.x as i16,
            region.pos.y as i16,
            std::cmp::max(region.dim.w, 1) as u16,
            std::cmp::max(region.dim.h, 1) as u16,
            0,
            xproto::WindowClass::INPUT_OUTPUT,
            x11rb::COPY_FROM_PARENT,
            &aux,
        )?;

        Ok(window)
    }

    #[inline]
    fn destroy_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.destroy_window(window));
    }

    #[inline]
    fn init_client(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default()
                .event_mask(self.client_event_mask)
                .do_not_propogate_mask(self.grab_event_mask),
        ));
    }

    #[inline]
    fn select_client_input(
        &self,
        window: Window,
        structure: bool,
    ) {
        let mask = if structure {
            self.client_event_mask
        } else {
            EventMask::PROPERTY_CHANGE | EventMask::FOCUS_CHANGE
        };

        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default().event_mask(mask),
        ));
    }

    #[inline]
    fn clear_input(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default().event_mask(EventMask::NO_EVENT),
        ));
    }

    fn get_window_attributes(
        &self,
        window: Window,
    ) -> Option<WindowAttributes> {
        let attributes = self.conn.get_window_attributes(window).ok()?.reply().ok()?;
        let geometry = self.conn.get_geometry(window).ok()?.reply().ok()?;

        Some(WindowAttributes {
            region: Region::new(
                geometry.x as i32,
                geometry.y as i32,
                geometry.width as i32,
                geometry.height as i32,
            ),
            border_width: geometry.border_width as u32,
            override_redirect: attributes.override_redirect
                || attributes.class == xproto::WindowClass::INPUT_ONLY,
            mapped: attributes.map_state != xproto::MapState::UNMAPPED,
        })
    }

    #[inline]
    fn map_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.map_window(window));
    }

    #[inline]
    fn map_subwindows(
        &self,
        window: Window,
    ) {
        drop(self.conn.map_subwindows(window));
    }

    #[inline]
    fn unmap_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.unmap_window(window));
    }

    #[inline]
    fn reparent_window(
        &self,
        window: Window,
        parent: Window,
        pos: Pos,
    ) {
        drop(
            self.conn
                .reparent_window(window, parent, pos.x as i16, pos.y as i16),
        );
    }

    #[inline]
    fn insert_window_in_save_set(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_save_set(xproto::SetMode::INSERT, window));
    }

    #[inline]
    fn remove_window_from_save_set(
        &self,
        window: Window,
    ) {
        drop(self.conn.change_save_set(xproto::SetMode::DELETE, window));
    }

    #[inline]
    fn close_window(
        &self,
        window: Window,
    ) -> bool {
        self.send_client_message(
            window,
            self.atoms.WM_DELETE_WINDOW,
            self.atoms.WM_PROTOCOLS,
            x11rb::CURRENT_TIME,
        )
        .map_or(false, |_| self.flush())
    }

    #[inline]
    fn send_take_focus(
        &self,
        window: Window,
        time: Timestamp,
    ) {
        drop(self.send_client_message(
            window,
            self.atoms.WM_TAKE_FOCUS,
            self.atoms.WM_PROTOCOLS,
            time,
        ));
    }

    fn send_configure_notify(
        &self,
        window: Window,
        region: Region,
        border_width: u32,
        above: Window,
    ) {
        let event = xproto::ConfigureNotifyEvent {
            response_type: xproto::CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: above,
            x: region.pos.x as i16,
            y: region.pos.y as i16,
            width: region.dim.w as u16,
            height: region.dim.h as u16,
            border_width: border_width as u16,
            override_redirect: false,
        };

        drop(
            self.conn
                .send_event(false, window, EventMask::STRUCTURE_NOTIFY, &event),
        );
    }

    #[inline]
    fn place_window(
        &self,
        window: Window,
        region: &Region,
    ) {
        drop(
            self.conn.configure_window(
                window,
                &xproto::ConfigureWindowAux::default()
                    .x(region.pos.x as i32)
                    .y(region.pos.y as i32)
                    .width(std::cmp::max(region.dim.w, 1) as u32)
                    .height(std::cmp::max(region.dim.h, 1) as u32),
            ),
        );
    }

    #[inline]
    fn move_window(
        &self,
        window: Window,
        pos: Pos,
    ) {
        drop(
            self.conn.configure_window(
                window,
                &xproto::ConfigureWindowAux::default()
                    .x(pos.x as i32)
                    .y(pos.y as i32),
            ),
        );
    }

    #[inline]
    fn raise_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.configure_window(
            window,
            &xproto::ConfigureWindowAux::default().stack_mode(xproto::StackMode::ABOVE),
        ));
    }

    fn restack_windows(
        &self,
        windows: &[Window],
    ) {
        // top to bottom, each one directly below its predecessor
        for pair in windows.windows(2) {
            drop(
                self.conn.configure_window(
                    pair[1],
                    &xproto::ConfigureWindowAux::default()
                        .sibling(pair[0])
                        .stack_mode(xproto::StackMode::BELOW),
                ),
            );
        }
    }

    #[inline]
    fn focus_window(
        &self,
        window: Window,
    ) {
        drop(self.conn.set_input_focus(
            xproto::InputFocus::POINTER_ROOT,
            window,
            x11rb::CURRENT_TIME,
        ));
    }

    #[inline]
    fn focus_pointer_root(&self) {
        drop(self.conn.set_input_focus(
            xproto::InputFocus::POINTER_ROOT,
            POINTER_ROOT,
            x11rb::CURRENT_TIME,
        ));
    }

    #[inline]
    fn get_focused_window(&self) -> Option<Window> {
        self.conn
            .get_input_focus()
            .ok()?
            .reply()
            .ok()
            .map(|reply| reply.focus)
            .filter(|&focus| {
                focus != x11rb::NONE && focus != POINTER_ROOT && focus != self.screen.root
            })
    }

    #[inline]
    fn set_window_border_width(
        &self,
        window: Window,
        width: u32,
    ) {
        drop(self.conn.configure_window(
            window,
            &xproto::ConfigureWindowAux::default().border_width(width),
        ));
    }

    #[inline]
    fn set_window_border_color(
        &self,
        window: Window,
        color: u32,
    ) {
        drop(self.conn.change_window_attributes(
            window,
            &xproto::ChangeWindowAttributesAux::default().border_pixel(color),
        ));
    }

    fn fill_window(
        &self,
        window: Window,
        region: Region,
        color: u32,
    ) {
        drop(self.conn.change_gc(
            self.fill_gc,
            &xproto::ChangeGCAux::new().foreground(color),
        ));

        drop(
            self.conn
                .poly_fill_rectangle(window, self.fill_gc, &[xproto::Rectangle {
                    x: region.pos.x as i16,
                    y: region.pos.y as i16,
                    width: std::cmp::max(region.dim.w, 0) as u16,
                    height: std::cmp::max(region.dim.h, 0) as u16,
                }]),
        );
    }

    fn draw_outline(
        &self,
        region: Region,
    ) {
        drop(
            self.conn
                .poly_rectangle(self.screen.root, self.outline_gc, &[xproto::Rectangle {
                    x: region.pos.x as i16,
                    y: region.pos.y as i16,
                    width: std::cmp::max(region.dim.w - 1, 0) as u16,
                    height: std::cmp::max(region.dim.h - 1, 0) as u16,
                }]),
        );
    }

    fn get_icccm_window_name(
        &self,
        window: Window,
    ) -> String {
        static NO_NAME: &str = "n/a";

        let name_of = |property: Atom, type_: Atom| -> Option<String> {
            let reply = self
                .conn
                .get_property(false, window, property, type_, 0, std::u32::MAX)
                .ok()?
                .reply()
                .ok()?;

            let bytes: Vec<u8> = reply.value8()?.collect();

            if bytes.is_empty() {
                None
            } else {
                Some(String::from_utf8_lossy(&bytes).into_owned())
            }
        };

        name_of(self.atoms._NET_WM_NAME, self.atoms.UTF8_STRING)
            .or_else(|| name_of(self.atoms.WM_NAME, xproto::AtomEnum::ANY.into()))
            .unwrap_or_else(|| NO_NAME.to_owned())
    }

    fn get_icccm_window_state(
        &self,
        window: Window,
    ) -> Option<IcccmWindowState> {
        let reply = self
            .conn
            .get_property(
                false,
                window,
                self.atoms.WM_STATE,
                self.atoms.WM_STATE,
                0,
                2,
            )
            .ok()?
            .reply()
            .ok()?;

        let state = reply.value32()?.next()?;
        IcccmWindowState::from_value(state)
    }

    #[inline]
    fn set_icccm_window_state(
        &self,
        window: Window,
        state: IcccmWindowState,
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            window,
            self.atoms.WM_STATE,
            self.atoms.WM_STATE,
            &[state.value(), 0],
        ));
    }

    #[inline]
    fn delete_icccm_window_state(
        &self,
        window: Window,
    ) {
        drop(self.conn.delete_property(window, self.atoms.WM_STATE));
    }

    fn get_icccm_window_transient_for(
        &self,
        window: Window,
    ) -> Option<Window> {
        self.conn
            .get_property(
                false,
                window,
                self.atoms.WM_TRANSIENT_FOR,
                self.atoms.WINDOW,
                0,
                std::u32::MAX,
            )
            .ok()?
            .reply()
            .ok()
            .and_then(|transient_for| {
                let transient_for: Vec<u32> = transient_for.value32()?.collect();
                transient_for.get(0).copied()
            })
    }

    fn get_icccm_window_hints(
        &self,
        window: Window,
    ) -> Option<Hints> {
        let hints = properties::WmHints::get(self.conn, window)
            .ok()?
            .reply()
            .ok()?;

        let initial_state = hints.initial_state.map(|state| match state {
            properties::WmHintsState::Normal => IcccmWindowState::Normal,
            properties::WmHintsState::Iconic => IcccmWindowState::Iconic,
        });

        Some(Hints::new(
            hints.urgent,
            hints.input,
            initial_state,
            hints.window_group,
        ))
    }

    fn get_icccm_window_size_hints(
        &self,
        window: Window,
        screen_dim: Dim,
    ) -> Option<SizeHints> {
        let size_hints = properties::WmSizeHints::get_normal_hints(self.conn, window)
            .ok()?
            .reply()
            .ok()?;

        let mut hints = SizeHints::new(screen_dim);

        if let Some((spec, x, y)) = size_hints.position {
            hints = hints.with_pos(
                Pos {
                    x,
                    y,
                },
                matches!(spec, properties::WmSizeHintsSpecification::UserSpecified),
            );
        }

        if let Some((w, h)) = size_hints.min_size {
            if w >= 0 && h >= 0 {
                hints = hints.with_min(Dim {
                    w,
                    h,
                });
            }
        }

        if let Some((w, h)) = size_hints.max_size {
            hints = hints.with_max(Dim {
                w,
                h,
            });
        }

        if let Some((w, h)) = size_hints.size_increment {
            hints = hints.with_inc(Dim {
                w,
                h,
            });
        }

        if let Some((min, max)) = size_hints.aspect {
            hints = hints.with_aspect(
                Ratio::new(min.numerator, min.denominator),
                Ratio::new(max.numerator, max.denominator),
            );
        }

        if let Some((w, h)) = size_hints.base_size {
            hints = hints.with_base(Dim {
                w,
                h,
            });
        }

        if let Some(gravity) = size_hints
            .win_gravity
            .and_then(|gravity| Gravity::from_value(u32::from(gravity)))
        {
            hints = hints.with_gravity(gravity);
        }

        Some(hints)
    }

    fn get_icccm_window_protocols(
        &self,
        window: Window,
    ) -> HashSet<Protocol> {
        self.get_atoms(window, self.atoms.WM_PROTOCOLS)
            .into_iter()
            .filter_map(|protocol| {
                if protocol == self.atoms.WM_DELETE_WINDOW {
                    Some(Protocol::Delete)
                } else if protocol == self.atoms.WM_TAKE_FOCUS {
                    Some(Protocol::TakeFocus)
                } else {
                    None
                }
            })
            .collect()
    }

    fn get_motif_hints(
        &self,
        window: Window,
    ) -> Option<MotifHints> {
        let reply = self
            .conn
            .get_property(
                false,
                window,
                self.atoms._MOTIF_WM_HINTS,
                self.atoms._MOTIF_WM_HINTS,
                0,
                5,
            )
            .ok()?
            .reply()
            .ok()?;

        let values: Vec<u32> = reply.value32()?.collect();
        MotifHints::from_values(&values)
    }

    fn init_wm_properties(
        &self,
        wm_name: &str,
        desktop_names: &[&str],
    ) {
        let wm_instance_class_names = &[wm_name, wm_name];
        let wm_class = wm_instance_class_names.join("\0");

        for &window in &[self.check_window, self.screen.root] {
            drop(self.conn.change_property8(
                xproto::PropMode::REPLACE,
                window,
                self.atoms._NET_WM_NAME,
                self.atoms.UTF8_STRING,
                wm_name.as_bytes(),
            ));

            drop(self.conn.change_property8(
                xproto::PropMode::REPLACE,
                window,
                self.atoms.WM_CLASS,
                self.atoms.UTF8_STRING,
                wm_class.as_bytes(),
            ));

            drop(self.conn.change_property32(
                xproto::PropMode::REPLACE,
                window,
                self.atoms._NET_WM_PID,
                self.atoms.CARDINAL,
                &[std::process::id() as u32],
            ));

            drop(self.conn.change_property32(
                xproto::PropMode::REPLACE,
                window,
                self.atoms._NET_SUPPORTING_WM_CHECK,
                self.atoms.WINDOW,
                &[self.check_window],
            ));
        }

        let mut supported = vec![
            self.atoms._NET_ACTIVE_WINDOW,
            self.atoms._NET_CLIENT_LIST,
            self.atoms._NET_CLIENT_LIST_STACKING,
            self.atoms._NET_CLOSE_WINDOW,
            self.atoms._NET_CURRENT_DESKTOP,
            self.atoms._NET_DESKTOP_NAMES,
            self.atoms._NET_MOVERESIZE_WINDOW,
            self.atoms._NET_NUMBER_OF_DESKTOPS,
            self.atoms._NET_REQUEST_FRAME_EXTENTS,
            self.atoms._NET_SUPPORTED,
            self.atoms._NET_SUPPORTING_WM_CHECK,
            self.atoms._NET_WORKAREA,
            self.atoms._NET_FRAME_EXTENTS,
            self.atoms._NET_WM_ALLOWED_ACTIONS,
            self.atoms._NET_WM_DESKTOP,
            self.atoms._NET_WM_NAME,
            self.atoms._NET_WM_STATE,
            self.atoms._NET_WM_STRUT,
            self.atoms._NET_WM_STRUT_PARTIAL,
            self.atoms._NET_WM_WINDOW_TYPE,
        ];

        supported.extend(self.state_map.keys());
        supported.extend(self.type_map.keys());

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.screen.root,
            self.atoms._NET_SUPPORTED,
            self.atoms.ATOM,
            &supported[..],
        ));

        drop(
            self.conn
                .delete_property(self.screen.root, self.atoms._NET_CLIENT_LIST),
        );

        self.update_desktops(desktop_names);
    }

    #[inline]
    fn update_desktops(
        &self,
        desktop_names: &[&str],
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.screen.root,
            self.atoms._NET_NUMBER_OF_DESKTOPS,
            self.atoms.CARDINAL,
            &[desktop_names.len() as u32],
        ));

        drop(self.conn.change_property8(
            xproto::PropMode::REPLACE,
            self.screen.root,
            self.atoms._NET_DESKTOP_NAMES,
            self.atoms.UTF8_STRING,
            desktop_names.join("\0").as_bytes(),
        ));
    }

    #[inline]
    fn set_current_desktop(
        &self,
        index: usize,
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.screen.root,
            self.atoms._NET_CURRENT_DESKTOP,
            self.atoms.CARDINAL,
            &[index as u32],
        ));
    }

    #[inline]
    fn set_active_window(
        &self,
        window: Option<Window>,
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.screen.root,
            self.atoms._NET_ACTIVE_WINDOW,
            self.atoms.WINDOW,
            &[window.unwrap_or(x11rb::NONE)],
        ));
    }

    fn set_workarea(
        &self,
        workarea: Region,
        desktops: usize,
    ) {
        let mut areas = Vec::with_capacity(4 * desktops);

        for _ in 0..desktops {
            areas.push(workarea.pos.x as u32);
            areas.push(workarea.pos.y as u32);
            areas.push(workarea.dim.w as u32);
            areas.push(workarea.dim.h as u32);
        }

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.screen.root,
            self.atoms._NET_WORKAREA,
            self.atoms.CARDINAL,
            &areas[..],
        ));
    }

    #[inline]
    fn update_client_list(
        &self,
        clients: &[Window],
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.screen.root,
            self.atoms._NET_CLIENT_LIST,
            self.atoms.WINDOW,
            clients,
        ));
    }

    #[inline]
    fn update_client_list_stacking(
        &self,
        clients: &[Window],
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            self.screen.root,
            self.atoms._NET_CLIENT_LIST_STACKING,
            self.atoms.WINDOW,
            clients,
        ));
    }

    #[inline]
    fn set_window_desktop(
        &self,
        window: Window,
        index: Option<usize>,
    ) {
        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            window,
            self.atoms._NET_WM_DESKTOP,
            self.atoms.CARDINAL,
            &[index.map_or(STICKY_DESKTOP, |index| index as u32)],
        ));
    }

    #[inline]
    fn get_window_desktop(
        &self,
        window: Window,
    ) -> Option<Option<usize>> {
        self.get_cardinals(window, self.atoms._NET_WM_DESKTOP)
            .map(|desktop| {
                if desktop[0] == STICKY_DESKTOP {
                    None
                } else {
                    Some(desktop[0] as usize)
                }
            })
    }

    fn set_window_states(
        &self,
        window: Window,
        states: &[WindowState],
    ) {
        if states.is_empty() {
            drop(self.conn.delete_property(window, self.atoms._NET_WM_STATE));
            return;
        }

        let atoms: Vec<Atom> = states
            .iter()
            .map(|&state| self.get_atom_from_window_state(state))
            .collect();

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            window,
            self.atoms._NET_WM_STATE,
            self.atoms.ATOM,
            &atoms[..],
        ));
    }

    fn get_window_states(
        &self,
        window: Window,
    ) -> Vec<WindowState> {
        self.get_atoms(window, self.atoms._NET_WM_STATE)
            .into_iter()
            .filter_map(|state| self.get_window_state_from_atom(state))
            .collect()
    }

    fn get_window_types(
        &self,
        window: Window,
    ) -> Vec<WindowType> {
        self.get_atoms(window, self.atoms._NET_WM_WINDOW_TYPE)
            .into_iter()
            .filter_map(|type_| self.get_window_type_from_atom(type_))
            .collect()
    }

    fn set_allowed_actions(
        &self,
        window: Window,
        actions: &[AllowedAction],
    ) {
        let atoms: Vec<Atom> = actions
            .iter()
            .map(|&action| self.get_atom_from_allowed_action(action))
            .collect();

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            window,
            self.atoms._NET_WM_ALLOWED_ACTIONS,
            self.atoms.ATOM,
            &atoms[..],
        ));
    }

    fn clear_window_properties(
        &self,
        window: Window,
    ) {
        drop(self.conn.delete_property(window, self.atoms._NET_WM_STATE));
        drop(self.conn.delete_property(window, self.atoms._NET_WM_DESKTOP));
        drop(
            self.conn
                .delete_property(window, self.atoms._NET_WM_ALLOWED_ACTIONS),
        );
        drop(
            self.conn
                .delete_property(window, self.atoms._NET_FRAME_EXTENTS),
        );
    }

    #[inline]
    fn set_window_frame_extents(
        &self,
        window: Window,
        extents: Extents,
    ) {
        let frame_extents: [u32; 4] = [
            extents.left as u32,
            extents.right as u32,
            extents.top as u32,
            extents.bottom as u32,
        ];

        drop(self.conn.change_property32(
            xproto::PropMode::REPLACE,
            window,
            self.atoms._NET_FRAME_EXTENTS,
            self.atoms.CARDINAL,
            &frame_extents,
        ));
    }

    fn get_window_strut(
        &self,
        window: Window,
    ) -> Option<Vec<Option<Strut>>> {
        if let Some(strut) = self.get_window_strut_partial(window) {
            return Some(strut);
        }

        self.get_cardinals(window, self.atoms._NET_WM_STRUT)
            .map(|widths| {
                widths
                    .into_iter()
                    .take(4)
                    .map(|width| {
                        if width != 0 {
                            Some(Strut::new(window, width))
                        } else {
                            None
                        }
                    })
                    .collect()
            })
    }

    fn get_window_strut_partial(
        &self,
        window: Window,
    ) -> Option<Vec<Option<Strut>>> {
        self.get_cardinals(window, self.atoms._NET_WM_STRUT_PARTIAL)
            .map(|widths| {
                widths
                    .into_iter()
                    .take(4)
                    .map(|width| {
                        if width != 0 {
                            Some(Strut::new(window, width))
                        } else {
                            None
                        }
                    })
                    .collect()
            })
    }
}
