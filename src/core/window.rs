use crate::decoration::Decorations;
use crate::decoration::FrameParts;
use crate::decoration::Functions;
use crate::decoration::Part;
use crate::decoration::Policy;
use crate::decoration::RenderState;
use crate::decoration::Style;
use crate::stack::StackLayer;
use crate::timer::TimerId;

use winsys::event::ToggleAction;
use winsys::geometry::Corner;
use winsys::geometry::Dim;
use winsys::geometry::Extents;
use winsys::geometry::Padding;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::hints::Gravity;
use winsys::hints::SizeHints;
use winsys::input::Button;
use winsys::input::Timestamp;
use winsys::window::AllowedAction;
use winsys::window::IcccmWindowState;
use winsys::window::Window;
use winsys::window::WindowState;
use winsys::window::WindowType;

use std::cell::Cell;
use std::cell::RefCell;

/// How a client wants input focus delivered, from WM_HINTS and
/// WM_PROTOCOLS.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FocusMode {
    Passive,
    LocallyActive,
    GloballyActive,
    NoInput,
}

impl FocusMode {
    pub fn from_hints(
        input: Option<bool>,
        take_focus: bool,
    ) -> Self {
        match input {
            Some(true) if take_focus => Self::LocallyActive,
            Some(false) if take_focus => Self::GloballyActive,
            Some(false) => Self::NoInput,
            _ => Self::Passive,
        }
    }

    /// Whether the client window itself receives the input focus;
    /// otherwise the plate does.
    pub fn accepts_input(self) -> bool {
        match self {
            Self::Passive | Self::LocallyActive => true,
            Self::GloballyActive | Self::NoInput => false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransientFor {
    None,
    /// Transient for the root window, i.e. modal for its whole group.
    GroupModal,
    Window(Window),
}

impl TransientFor {
    #[inline]
    pub fn window(self) -> Option<Window> {
        match self {
            Self::Window(window) => Some(window),
            _ => None,
        }
    }
}

/// Maximization is one mode, not two independent axes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Maximize {
    None,
    Full,
    Vertical,
    Horizontal,
}

impl Maximize {
    pub fn from_button(button: Button) -> Self {
        match button {
            Button::Left => Self::Full,
            Button::Middle => Self::Vertical,
            Button::Right => Self::Horizontal,
            _ => Self::None,
        }
    }

    pub fn from_axes(
        vertical: bool,
        horizontal: bool,
    ) -> Self {
        match (vertical, horizontal) {
            (true, true) => Self::Full,
            (true, false) => Self::Vertical,
            (false, true) => Self::Horizontal,
            (false, false) => Self::None,
        }
    }

    #[inline]
    pub fn is_maximized(self) -> bool {
        self != Self::None
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        self == Self::Full || self == Self::Vertical
    }

    #[inline]
    pub fn is_horizontal(self) -> bool {
        self == Self::Full || self == Self::Horizontal
    }

    /// Folds a `_NET_WM_STATE` request naming either axis into the next
    /// mode. Axes the request does not name keep their current state, so
    /// adding vertical to a horizontally maximized window yields `Full`.
    /// Returns `None` when neither axis is named.
    pub fn from_request(
        self,
        action: ToggleAction,
        vertical: bool,
        horizontal: bool,
    ) -> Option<Self> {
        if !vertical && !horizontal {
            return None;
        }

        let vertical = if vertical {
            toggled(action, self.is_vertical())
        } else {
            self.is_vertical()
        };

        let horizontal = if horizontal {
            toggled(action, self.is_horizontal())
        } else {
            self.is_horizontal()
        };

        Some(Self::from_axes(vertical, horizontal))
    }
}

impl Default for Maximize {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Skip {
    None,
    Taskbar,
    Pager,
    Both,
}

impl Skip {
    pub fn from_flags(
        taskbar: bool,
        pager: bool,
    ) -> Self {
        match (taskbar, pager) {
            (true, true) => Self::Both,
            (true, false) => Self::Taskbar,
            (false, true) => Self::Pager,
            (false, false) => Self::None,
        }
    }

    #[inline]
    pub fn taskbar(self) -> bool {
        self == Self::Taskbar || self == Self::Both
    }

    #[inline]
    pub fn pager(self) -> bool {
        self == Self::Pager || self == Self::Both
    }

    pub fn from_request(
        self,
        action: ToggleAction,
        taskbar: bool,
        pager: bool,
    ) -> Option<Self> {
        if !taskbar && !pager {
            return None;
        }

        Some(Self::from_flags(
            taskbar && toggled(action, self.taskbar()),
            pager && toggled(action, self.pager()),
        ))
    }
}

/// The state an add, remove or toggle request leaves a flag in.
pub fn toggled(
    action: ToggleAction,
    active: bool,
) -> bool {
    match action {
        ToggleAction::Add => true,
        ToggleAction::Remove => false,
        ToggleAction::Toggle => !active,
    }
}

/// Where every frame subwindow goes; each region is relative to its
/// parent window. A part that should not exist is `None`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    pub frame: Region,
    pub frame_border: u32,
    pub plate: Region,
    pub plate_border: u32,
    pub client: Region,
    pub part_border: u32,
    pub title: Option<Region>,
    pub label: Option<Region>,
    pub iconify_button: Option<Region>,
    pub maximize_button: Option<Region>,
    pub close_button: Option<Region>,
    pub handle: Option<Region>,
    pub left_grip: Option<Region>,
    pub right_grip: Option<Region>,
}

impl FrameLayout {
    pub fn get(
        &self,
        part: Part,
    ) -> Option<Region> {
        match part {
            Part::Frame => Some(self.frame),
            Part::Plate => Some(self.plate),
            Part::Client => Some(self.client),
            Part::Title => self.title,
            Part::Label => self.label,
            Part::IconifyButton => self.iconify_button,
            Part::MaximizeButton => self.maximize_button,
            Part::CloseButton => self.close_button,
            Part::Handle => self.handle,
            Part::LeftGrip => self.left_grip,
            Part::RightGrip => self.right_grip,
        }
    }

    /// The window a part is created in.
    pub fn parent_part(part: Part) -> Part {
        match part {
            Part::Label | Part::IconifyButton | Part::MaximizeButton | Part::CloseButton => {
                Part::Title
            },
            Part::LeftGrip | Part::RightGrip => Part::Handle,
            Part::Client => Part::Plate,
            _ => Part::Frame,
        }
    }
}

pub const DECORATION_PARTS: [Part; 8] = [
    Part::Title,
    Part::Label,
    Part::IconifyButton,
    Part::MaximizeButton,
    Part::CloseButton,
    Part::Handle,
    Part::LeftGrip,
    Part::RightGrip,
];

/// A top-level client wrapped in a frame.
///
/// `frame_region` is the outer frame rectangle, border included, in root
/// coordinates; `client_region` is that rectangle minus `margin`.
#[derive(Debug)]
pub struct ManagedWindow {
    window: Window,
    frame: Window,
    plate: Window,
    parts: Cell<FrameParts>,
    name: RefCell<String>,
    window_type: Cell<WindowType>,
    policy: Cell<Policy>,
    normal_policy: Cell<Policy>,
    size_hints: Cell<SizeHints>,
    focus_mode: Cell<FocusMode>,
    take_focus: Cell<bool>,
    urgent: Cell<bool>,
    group: Cell<Option<Window>>,
    transient_for: Cell<TransientFor>,
    transients: RefCell<Vec<Window>>,
    client_region: Cell<Region>,
    frame_region: Cell<Region>,
    premax_region: Cell<Region>,
    old_border_width: Cell<u32>,
    border_width: Cell<u32>,
    mwm_border_width: Cell<u32>,
    margin: Cell<Padding>,
    inside_dim: Cell<Dim>,
    current_state: Cell<IcccmWindowState>,
    workspace: Cell<Option<usize>>,
    layer: Cell<StackLayer>,
    maximized: Cell<Maximize>,
    skip: Cell<Skip>,
    iconic: Cell<bool>,
    visible: Cell<bool>,
    shaded: Cell<bool>,
    fullscreen: Cell<bool>,
    modal: Cell<bool>,
    focused: Cell<bool>,
    moving: Cell<bool>,
    resizing: Cell<bool>,
    gravity_override: Cell<Option<Gravity>>,
    last_button_press: Cell<Timestamp>,
    pressed: Cell<Option<Part>>,
    auto_raise_timer: Cell<Option<TimerId>>,
    expected_unmaps: Cell<u32>,
}

impl ManagedWindow {
    pub fn new(
        window: Window,
        frame: Window,
        plate: Window,
        client_region: Region,
        old_border_width: u32,
        size_hints: SizeHints,
    ) -> Self {
        Self {
            window,
            frame,
            plate,
            parts: Cell::new(FrameParts::default()),
            name: RefCell::new(String::new()),
            window_type: Cell::new(WindowType::Normal),
            policy: Cell::new(Policy::default()),
            normal_policy: Cell::new(Policy::default()),
            size_hints: Cell::new(size_hints),
            focus_mode: Cell::new(FocusMode::Passive),
            take_focus: Cell::new(false),
            urgent: Cell::new(false),
            group: Cell::new(None),
            transient_for: Cell::new(TransientFor::None),
            transients: RefCell::new(Vec::new()),
            client_region: Cell::new(client_region),
            frame_region: Cell::new(client_region),
            premax_region: Cell::new(client_region),
            old_border_width: Cell::new(old_border_width),
            border_width: Cell::new(0),
            mwm_border_width: Cell::new(0),
            margin: Cell::new(Padding::default()),
            inside_dim: Cell::new(client_region.dim),
            current_state: Cell::new(IcccmWindowState::Normal),
            workspace: Cell::new(None),
            layer: Cell::new(StackLayer::Normal),
            maximized: Cell::new(Maximize::None),
            skip: Cell::new(Skip::None),
            iconic: Cell::new(false),
            visible: Cell::new(false),
            shaded: Cell::new(false),
            fullscreen: Cell::new(false),
            modal: Cell::new(false),
            focused: Cell::new(false),
            moving: Cell::new(false),
            resizing: Cell::new(false),
            gravity_override: Cell::new(None),
            last_button_press: Cell::new(0),
            pressed: Cell::new(None),
            auto_raise_timer: Cell::new(None),
            expected_unmaps: Cell::new(0),
        }
    }

    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    #[inline]
    pub fn frame(&self) -> Window {
        self.frame
    }

    #[inline]
    pub fn plate(&self) -> Window {
        self.plate
    }

    /// The server window backing `part`, if it currently exists.
    pub fn part_window(
        &self,
        part: Part,
    ) -> Option<Window> {
        match part {
            Part::Client => Some(self.window),
            Part::Frame => Some(self.frame),
            Part::Plate => Some(self.plate),
            part => self.parts.get().get(part),
        }
    }

    #[inline]
    pub fn parts(&self) -> FrameParts {
        self.parts.get()
    }

    pub fn set_part_window(
        &self,
        part: Part,
        window: Option<Window>,
    ) {
        let mut parts = self.parts.get();
        parts.set(part, window);
        self.parts.set(parts);
    }

    pub fn set_name(
        &self,
        name: impl Into<String>,
    ) {
        self.name.replace(name.into());
    }

    #[inline]
    pub fn name(&self) -> String {
        self.name.borrow().to_owned()
    }

    cell_accessors! {
        window_type: WindowType => window_type, set_window_type;
        size_hints: SizeHints => size_hints, set_size_hints;
        focus_mode: FocusMode => focus_mode, set_focus_mode;
        take_focus: bool => sends_take_focus, set_take_focus;
        urgent: bool => is_urgent, set_urgent;
        group: Option<Window> => group, set_group;
        transient_for: TransientFor => transient_for, set_transient_for;
        client_region: Region => client_region, set_client_region;
        premax_region: Region => premax_region, set_premax_region;
        old_border_width: u32 => old_border_width, set_old_border_width;
        current_state: IcccmWindowState => current_state, set_current_state;
        workspace: Option<usize> => workspace, set_workspace;
        layer: StackLayer => layer, set_layer;
        maximized: Maximize => maximized, set_maximized;
        skip: Skip => skip, set_skip;
        iconic: bool => is_iconic, set_iconic;
        visible: bool => is_visible, set_visible;
        shaded: bool => is_shaded, set_shaded;
        fullscreen: bool => is_fullscreen, set_fullscreen;
        modal: bool => is_modal, set_modal;
        focused: bool => is_focused, set_focused;
        moving: bool => is_moving, set_moving;
        resizing: bool => is_resizing, set_resizing;
        gravity_override: Option<Gravity> => gravity_override, set_gravity_override;
        last_button_press: Timestamp => last_button_press, set_last_button_press;
        pressed: Option<Part> => pressed, set_pressed;
        auto_raise_timer: Option<TimerId> => auto_raise_timer, set_auto_raise_timer;
    }

    /// Notes that an unmap notification caused by the manager itself is
    /// on its way.
    pub fn expect_unmap(&self) {
        self.expected_unmaps.set(self.expected_unmaps.get() + 1);
    }

    pub fn consume_unmap_if_expecting(&self) -> bool {
        let expected = self.expected_unmaps.get();

        if expected > 0 {
            self.expected_unmaps.set(expected - 1);
        }

        expected > 0
    }

    #[inline]
    pub fn frame_region(&self) -> Region {
        self.frame_region.get()
    }

    #[inline]
    pub fn border_width(&self) -> u32 {
        self.border_width.get()
    }

    #[inline]
    pub fn mwm_border_width(&self) -> u32 {
        self.mwm_border_width.get()
    }

    #[inline]
    pub fn margin(&self) -> Padding {
        self.margin.get()
    }

    #[inline]
    pub fn frame_extents(&self) -> Extents {
        self.margin.get()
    }

    #[inline]
    pub fn inside_dim(&self) -> Dim {
        self.inside_dim.get()
    }

    #[inline]
    pub fn policy(&self) -> Policy {
        self.policy.get()
    }

    #[inline]
    pub fn decorations(&self) -> Decorations {
        self.policy.get().decorations
    }

    #[inline]
    pub fn functions(&self) -> Functions {
        self.policy.get().functions
    }

    #[inline]
    pub fn has_decoration(
        &self,
        decoration: Decorations,
    ) -> bool {
        self.decorations().contains(decoration)
    }

    #[inline]
    pub fn has_function(
        &self,
        function: Functions,
    ) -> bool {
        self.functions().contains(function)
    }

    /// Sets the policy in effect; outside fullscreen it also becomes the
    /// policy restored when fullscreen is left.
    pub fn set_policy(
        &self,
        policy: Policy,
    ) {
        self.policy.set(policy);

        if !self.fullscreen.get() {
            self.normal_policy.set(policy);
        }
    }

    #[inline]
    pub fn normal_policy(&self) -> Policy {
        self.normal_policy.get()
    }

    /// Applies a transition to both the active and the remembered policy.
    pub fn update_policy(
        &self,
        transition: impl Fn(Policy) -> Policy,
    ) {
        self.normal_policy.set(transition(self.normal_policy.get()));

        if !self.fullscreen.get() {
            self.policy.set(self.normal_policy.get());
        }
    }

    /// Installs `policy` without remembering it, for fullscreen.
    pub fn override_policy(
        &self,
        policy: Policy,
    ) {
        self.policy.set(policy);
    }

    #[inline]
    pub fn is_transient(&self) -> bool {
        self.transient_for.get() != TransientFor::None
    }

    #[inline]
    pub fn transient_owner(&self) -> Option<Window> {
        self.transient_for.get().window()
    }

    #[inline]
    pub fn is_sticky(&self) -> bool {
        self.workspace.get().is_none()
    }

    pub fn transients(&self) -> Vec<Window> {
        self.transients.borrow().clone()
    }

    pub fn add_transient(
        &self,
        window: Window,
    ) {
        let mut transients = self.transients.borrow_mut();

        if !transients.contains(&window) {
            transients.push(window);
        }
    }

    pub fn remove_transient(
        &self,
        window: Window,
    ) {
        self.transients.borrow_mut().retain(|&transient| transient != window);
    }

    pub fn clear_transients(&self) -> Vec<Window> {
        self.transients.replace(Vec::new())
    }

    #[inline]
    pub fn render_state(&self) -> RenderState {
        if self.focused.get() {
            RenderState::Focused
        } else {
            RenderState::Unfocused
        }
    }

    #[inline]
    pub fn gravity(&self) -> Gravity {
        self.gravity_override
            .get()
            .unwrap_or(self.size_hints.get().gravity)
    }

    /// The frame position that keeps the client's reference point where
    /// its gravity says it should be.
    pub fn frame_pos_from_client(
        &self,
        client_pos: Pos,
    ) -> Pos {
        let margin = self.margin.get();

        let x = match self.gravity() {
            Gravity::NorthWest | Gravity::SouthWest | Gravity::West => client_pos.x,
            Gravity::North | Gravity::South | Gravity::Center => {
                client_pos.x - margin.horizontal() / 2
            },
            Gravity::NorthEast | Gravity::SouthEast | Gravity::East => {
                client_pos.x - margin.horizontal() + 2
            },
            Gravity::Forget | Gravity::Static => client_pos.x - margin.left,
        };

        let y = match self.gravity() {
            Gravity::NorthWest | Gravity::NorthEast | Gravity::North => client_pos.y,
            Gravity::Center | Gravity::East | Gravity::West => client_pos.y - margin.vertical() / 2,
            Gravity::SouthWest | Gravity::SouthEast | Gravity::South => {
                client_pos.y - margin.vertical() + 2
            },
            Gravity::Forget | Gravity::Static => client_pos.y - margin.top,
        };

        Pos::new(x, y)
    }

    /// Inverse of `frame_pos_from_client`.
    pub fn client_pos_from_frame(
        &self,
        frame_pos: Pos,
    ) -> Pos {
        let margin = self.margin.get();

        let x = match self.gravity() {
            Gravity::NorthWest | Gravity::SouthWest | Gravity::West => frame_pos.x,
            Gravity::North | Gravity::South | Gravity::Center => {
                frame_pos.x + margin.horizontal() / 2
            },
            Gravity::NorthEast | Gravity::SouthEast | Gravity::East => {
                frame_pos.x + margin.horizontal() - 2
            },
            Gravity::Forget | Gravity::Static => frame_pos.x + margin.left,
        };

        let y = match self.gravity() {
            Gravity::NorthWest | Gravity::NorthEast | Gravity::North => frame_pos.y,
            Gravity::Center | Gravity::East | Gravity::West => frame_pos.y + margin.vertical() / 2,
            Gravity::SouthWest | Gravity::SouthEast | Gravity::South => {
                frame_pos.y + margin.vertical() - 2
            },
            Gravity::Forget | Gravity::Static => frame_pos.y + margin.top,
        };

        Pos::new(x, y)
    }

    /// Recomputes border widths, margins and the frame size from the
    /// client size and the current decorations. The frame keeps its
    /// position.
    pub fn upsize(
        &self,
        style: &Style,
        border_width: u32,
    ) {
        let (border, mwm) = if self.has_decoration(Decorations::BORDER) {
            let mwm = if self.is_transient() {
                0
            } else {
                style.frame_width
            };

            (border_width as i32, mwm)
        } else {
            (0, 0)
        };

        self.border_width.set(border as u32);
        self.mwm_border_width.set(mwm as u32);

        let mut margin = Padding::with_each_edge(border + mwm);

        if self.has_decoration(Decorations::TITLEBAR) {
            margin.top += border + style.title_height;
        }

        if self.has_decoration(Decorations::HANDLE) {
            margin.bottom += border + style.handle_height;
        }

        self.margin.set(margin);

        let dim = self.client_region.get().dim + margin;
        self.inside_dim.set(Dim::new(dim.w - 2 * border, dim.h - 2 * border));

        let mut frame_region = self.frame_region.get();
        frame_region.dim = if self.shaded.get() {
            Dim::new(dim.w, style.title_height + 2 * border)
        } else {
            dim
        };

        self.frame_region.set(frame_region);
    }

    /// Adopts a new outer frame rectangle and derives the client
    /// rectangle from it. Returns whether the size changed.
    pub fn set_frame_region(
        &self,
        region: Region,
    ) -> bool {
        let current = self.frame_region.get();

        if region.dim == current.dim {
            self.frame_region.set(Region {
                pos: region.pos,
                dim: current.dim,
            });

            return false;
        }

        let margin = self.margin.get();
        let border = self.border_width.get() as i32;

        let mut region = region;
        if region.right() <= 0 || region.bottom() <= 0 {
            region.pos = Pos::new(0, 0);
        }

        let client = self.client_region.get();
        let client_dim = if self.shaded.get() {
            Dim::new(region.dim.w - margin.horizontal(), client.dim.h)
        } else {
            region.dim - margin
        };

        self.client_region.set(Region {
            pos: Pos::new(region.pos.x + margin.left, region.pos.y + margin.top),
            dim: client_dim,
        });

        let full = client_dim + margin;
        self.inside_dim.set(Dim::new(full.w - 2 * border, full.h - 2 * border));
        self.frame_region.set(region);

        true
    }

    /// Re-derives the client position from the frame position.
    pub fn sync_client_pos(&self) {
        let frame = self.frame_region.get();
        let margin = self.margin.get();
        let mut client = self.client_region.get();

        client.pos = Pos::new(frame.pos.x + margin.left, frame.pos.y + margin.top);
        self.client_region.set(client);
    }

    /// Fits a requested outer frame rectangle to the client's size hints.
    /// `anchor` is the corner being dragged; the opposite corner of
    /// `requested` stays in place.
    pub fn constrain(
        &self,
        requested: Region,
        anchor: Corner,
    ) -> Region {
        let margin = self.margin.get();
        let hints = self.size_hints.get();

        let Dim {
            w: mut dw,
            h: mut dh,
        } = requested.dim - margin;

        dw = clamp(dw, hints.min.w, hints.max.w);
        dh = clamp(dh, hints.min.h, hints.max.h);

        if let Some((min_aspect, max_aspect)) = hints.aspect {
            let (min_x, min_y) = (min_aspect.numerator as i64, min_aspect.denominator as i64);
            let (max_x, max_y) = (max_aspect.numerator as i64, max_aspect.denominator as i64);
            let (w, h) = (dw as i64, dh as i64);

            if min_x * h > min_y * w {
                let delta = (min_x * h / min_y - w) as i32;

                if dw + delta <= hints.max.w {
                    dw += delta;
                } else {
                    let delta = (h - w * min_y / min_x) as i32;

                    if dh - delta >= hints.min.h {
                        dh -= delta;
                    }
                }
            }

            let (w, h) = (dw as i64, dh as i64);

            if max_x * h < max_y * w {
                let delta = (max_y * w / max_x - h) as i32;

                if dh + delta <= hints.max.h {
                    dh += delta;
                } else {
                    let delta = (w - h * max_x / max_y) as i32;

                    if dw - delta >= hints.min.w {
                        dw -= delta;
                    }
                }
            }
        }

        let base = hints.grid_base();
        dw = snap_to_grid(dw, base.w, hints.inc.w, hints.min.w, hints.max.w);
        dh = snap_to_grid(dh, base.h, hints.inc.h, hints.min.h, hints.max.h);

        let constrained = Region {
            pos: requested.pos,
            dim: Dim::new(dw, dh) + margin,
        };

        let fixed_left = requested.right() - constrained.dim.w + 1;
        let fixed_top = requested.bottom() - constrained.dim.h + 1;

        let pos = match anchor {
            Corner::TopLeft => Pos::new(fixed_left, fixed_top),
            Corner::TopRight => Pos::new(requested.pos.x, fixed_top),
            Corner::BottomLeft => Pos::new(fixed_left, requested.pos.y),
            Corner::BottomRight => requested.pos,
        };

        Region {
            pos,
            dim: constrained.dim,
        }
    }

    /// The unconstrained frame rectangle a maximize mode asks for within
    /// `avail`, measured from `premax`.
    pub fn maximized_region(
        mode: Maximize,
        avail: Region,
        premax: Region,
    ) -> Region {
        let mut region = avail;

        match mode {
            Maximize::Vertical => {
                region.pos.x = premax.pos.x;
                region.dim.w = premax.dim.w;
            },
            Maximize::Horizontal => {
                region.pos.y = premax.pos.y;
                region.dim.h = premax.dim.h;
            },
            Maximize::Full | Maximize::None => {},
        }

        region
    }

    pub fn layout(
        &self,
        style: &Style,
    ) -> FrameLayout {
        let border = self.border_width.get() as i32;
        let mwm = self.mwm_border_width.get() as i32;
        let margin = self.margin.get();
        let inside = self.inside_dim.get();
        let client = self.client_region.get().dim;
        let frame = self.frame_region.get();
        let decorations = self.decorations();

        let mut layout = FrameLayout {
            frame: Region {
                pos: frame.pos,
                dim: Dim::new(
                    inside.w,
                    if self.shaded.get() {
                        style.title_height
                    } else {
                        inside.h
                    },
                ),
            },
            frame_border: border as u32,
            plate: Region::new(
                margin.left - mwm - border,
                margin.top - mwm - border,
                client.w,
                client.h,
            ),
            plate_border: mwm as u32,
            client: Region::new(0, 0, client.w, client.h),
            part_border: border as u32,
            title: None,
            label: None,
            iconify_button: None,
            maximize_button: None,
            close_button: None,
            handle: None,
            left_grip: None,
            right_grip: None,
        };

        if decorations.contains(Decorations::TITLEBAR) {
            layout.title = Some(Region::new(-border, -border, inside.w, style.title_height));

            let step = style.button_width + style.bevel_width + 1;
            let offset = style.bevel_width + 1;
            let button = |x| Some(Region::new(x, offset, style.button_width, style.button_width));

            let mut label_x = offset;
            let mut label_w = inside.w - offset;

            if decorations.contains(Decorations::ICONIFY) {
                layout.iconify_button = button(offset);
                label_x += step;
                label_w -= step;
            }

            let mut button_x = inside.w - step;

            if decorations.contains(Decorations::CLOSE) {
                layout.close_button = button(button_x);
                button_x -= step;
                label_w -= step;
            }

            if decorations.contains(Decorations::MAXIMIZE) {
                layout.maximize_button = button(button_x);
                label_w -= step;
            }

            if label_w > offset {
                layout.label = Some(Region::new(
                    label_x,
                    style.bevel_width,
                    label_w - offset,
                    style.label_height,
                ));
            }
        }

        if decorations.contains(Decorations::HANDLE) {
            layout.handle = Some(Region::new(
                -border,
                client.h + margin.top + mwm - border,
                inside.w,
                style.handle_height,
            ));

            if decorations.contains(Decorations::GRIP) {
                layout.left_grip = Some(Region::new(
                    -border,
                    -border,
                    style.grip_width,
                    style.handle_height,
                ));

                layout.right_grip = Some(Region::new(
                    inside.w - style.grip_width - border,
                    -border,
                    style.grip_width,
                    style.handle_height,
                ));
            }
        }

        layout
    }

    /// The `_NET_WM_STATE` atoms describing this window.
    pub fn net_states(&self) -> Vec<WindowState> {
        let mut states = Vec::with_capacity(4);

        if self.modal.get() {
            states.push(WindowState::Modal);
        }

        let maximized = self.maximized.get();

        if maximized.is_vertical() {
            states.push(WindowState::MaximizedVert);
        }

        if maximized.is_horizontal() {
            states.push(WindowState::MaximizedHorz);
        }

        if self.shaded.get() {
            states.push(WindowState::Shaded);
        }

        if self.skip.get().taskbar() {
            states.push(WindowState::SkipTaskbar);
        }

        if self.skip.get().pager() {
            states.push(WindowState::SkipPager);
        }

        if self.iconic.get() {
            states.push(WindowState::Hidden);
        }

        if self.fullscreen.get() {
            states.push(WindowState::Fullscreen);
        }

        match self.layer.get() {
            StackLayer::Above => states.push(WindowState::Above),
            StackLayer::Below => states.push(WindowState::Below),
            _ => {},
        }

        states
    }

    /// The `_NET_WM_ALLOWED_ACTIONS` for the current policy; an iconic
    /// window can only be closed.
    pub fn allowed_actions(&self) -> Vec<AllowedAction> {
        let functions = self.functions();
        let mut actions = Vec::with_capacity(9);

        if !self.iconic.get() {
            actions.push(AllowedAction::ChangeDesktop);

            if functions.contains(Functions::MOVE) {
                actions.push(AllowedAction::Move);
            }

            if functions.contains(Functions::ICONIFY) {
                actions.push(AllowedAction::Minimize);
            }

            if functions.contains(Functions::RESIZE) {
                actions.push(AllowedAction::Resize);
                actions.push(AllowedAction::MaximizeHorz);
                actions.push(AllowedAction::MaximizeVert);
                actions.push(AllowedAction::Fullscreen);
            }

            if self.has_decoration(Decorations::TITLEBAR) && functions.contains(Functions::SHADE) {
                actions.push(AllowedAction::Shade);
            }
        }

        if functions.contains(Functions::CLOSE) {
            actions.push(AllowedAction::Close);
        }

        actions
    }

    /// Folds the `_NET_WM_STATE` list found on a new client into the
    /// window's flags. Returns whether fullscreen was requested.
    pub fn adopt_net_states(
        &self,
        states: &[WindowState],
    ) -> bool {
        let mut fullscreen = false;

        for &state in states {
            match state {
                WindowState::Modal => self.modal.set(true),
                WindowState::MaximizedVert => self.maximized.set(Maximize::from_axes(
                    true,
                    self.maximized.get().is_horizontal(),
                )),
                WindowState::MaximizedHorz => self.maximized.set(Maximize::from_axes(
                    self.maximized.get().is_vertical(),
                    true,
                )),
                WindowState::Shaded => self.shaded.set(true),
                WindowState::SkipTaskbar => {
                    self.skip.set(Skip::from_flags(true, self.skip.get().pager()))
                },
                WindowState::SkipPager => {
                    self.skip.set(Skip::from_flags(self.skip.get().taskbar(), true))
                },
                WindowState::Hidden => self.iconic.set(true),
                WindowState::Fullscreen => fullscreen = true,
                WindowState::Above => self.layer.set(StackLayer::Above),
                WindowState::Below => self.layer.set(StackLayer::Below),
                WindowState::Sticky | WindowState::DemandsAttention => {},
            }
        }

        fullscreen
    }

    /// Whether a root position falls inside a decoration part.
    pub fn part_contains(
        style: &Style,
        part: Part,
        window_pos: Pos,
    ) -> bool {
        if !part.is_button() {
            return true;
        }

        Region::new(0, 0, style.button_width, style.button_width).encompasses(window_pos)
    }
}

fn clamp(
    value: i32,
    min: i32,
    max: i32,
) -> i32 {
    std::cmp::max(min, std::cmp::min(value, max))
}

/// Rounds `value` down onto the grid `base + k * inc`, then repairs the
/// result into `[min, max]` by whole steps. Without any grid point in
/// range the clamped value is kept.
fn snap_to_grid(
    value: i32,
    base: i32,
    inc: i32,
    min: i32,
    max: i32,
) -> i32 {
    if inc <= 1 {
        return clamp(value, min, max);
    }

    let mut snapped = base + (value - base).div_euclid(inc) * inc;

    while snapped < min {
        snapped += inc;
    }

    while snapped > max {
        snapped -= inc;
    }

    if snapped < min {
        clamp(value, min, max)
    } else {
        snapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use winsys::geometry::Ratio;

    fn style() -> Style {
        Style::DEFAULT
    }

    fn screen_dim() -> Dim {
        Dim::new(1920, 1080)
    }

    fn managed(
        client: Region,
        hints: SizeHints,
    ) -> ManagedWindow {
        let window = ManagedWindow::new(1, 2, 3, client, 1, hints);
        window.upsize(&style(), 1);
        window
    }

    fn framed(client: Region) -> ManagedWindow {
        let window = managed(client, SizeHints::new(screen_dim()));
        let pos = window.frame_pos_from_client(client.pos);
        let mut region = window.frame_region();
        region.pos = pos;
        window.set_frame_region(region);
        window.sync_client_pos();
        window
    }

    #[test]
    fn upsize_adds_decoration_margins() {
        let window = managed(Region::new(100, 100, 400, 300), SizeHints::new(screen_dim()));
        let style = style();

        // border 1, frame width 1
        assert_eq!(window.margin(), Padding {
            left: 2,
            right: 2,
            top: 2 + 1 + style.title_height,
            bottom: 2 + 1 + style.handle_height,
        });

        assert_eq!(window.frame_region().dim, Dim::new(404, 300 + 21 + 9));
        assert_eq!(window.inside_dim(), Dim::new(402, 328));
    }

    #[test]
    fn undecorated_windows_have_no_margin() {
        let window = ManagedWindow::new(1, 2, 3, Region::new(0, 0, 50, 40), 0, SizeHints::new(screen_dim()));

        window.set_policy(Policy::for_type(WindowType::Dock));
        window.upsize(&style(), 1);

        assert_eq!(window.margin(), Padding::default());
        assert_eq!(window.frame_region().dim, Dim::new(50, 40));
    }

    #[test]
    fn shaded_frames_collapse_to_the_titlebar() {
        let window = managed(Region::new(0, 0, 400, 300), SizeHints::new(screen_dim()));

        window.set_shaded(true);
        window.upsize(&style(), 1);

        assert_eq!(window.frame_region().dim.h, style().title_height + 2);
        assert_eq!(window.client_region().dim.h, 300);
    }

    #[test]
    fn gravity_round_trips_for_every_value() {
        for value in 0..=10 {
            let gravity = Gravity::from_value(value).unwrap();
            let hints = SizeHints::new(screen_dim()).with_gravity(gravity);
            let window = managed(Region::new(300, 200, 400, 300), hints);

            let client_pos = Pos::new(300, 200);
            let frame_pos = window.frame_pos_from_client(client_pos);

            assert_eq!(window.client_pos_from_frame(frame_pos), client_pos, "{:?}", gravity);
        }
    }

    #[test]
    fn static_gravity_keeps_client_in_place() {
        let hints = SizeHints::new(screen_dim()).with_gravity(Gravity::Static);
        let window = managed(Region::new(300, 200, 400, 300), hints);
        let margin = window.margin();

        assert_eq!(
            window.frame_pos_from_client(Pos::new(300, 200)),
            Pos::new(300 - margin.left, 200 - margin.top)
        );

        window.set_gravity_override(Some(Gravity::NorthWest));
        assert_eq!(window.frame_pos_from_client(Pos::new(300, 200)), Pos::new(300, 200));
    }

    #[test]
    fn frame_region_drives_client_region() {
        let window = framed(Region::new(100, 100, 400, 300));
        let margin = window.margin();

        assert_eq!(window.client_region().pos, Pos::new(100 + margin.left, 100 + margin.top));

        let mut region = window.frame_region();
        region.dim.w += 50;
        assert!(window.set_frame_region(region));
        assert_eq!(window.client_region().dim, Dim::new(450, 300));

        region.pos.x += 10;
        assert!(!window.set_frame_region(region));
        assert_eq!(window.frame_region().pos.x, 110);
    }

    #[test]
    fn constrain_respects_bounds_and_grid() {
        let hints = SizeHints::new(screen_dim())
            .with_min(Dim::new(100, 60))
            .with_max(Dim::new(800, 600))
            .with_base(Dim::new(20, 10))
            .with_inc(Dim::new(7, 13));

        let window = framed(Region::new(0, 0, 300, 200));
        window.set_size_hints(hints);

        let margin = window.margin();
        let base = hints.grid_base();

        for &(w, h) in &[(1, 1), (57, 3000), (333, 222), (5000, 5000), (799, 599), (100, 60)] {
            let requested = Region {
                pos: Pos::new(0, 0),
                dim: Dim::new(w, h) + margin,
            };

            let result = window.constrain(requested, Corner::BottomRight).dim - margin;

            assert!(result.w >= 100 && result.w <= 800, "{:?}", result);
            assert!(result.h >= 60 && result.h <= 600, "{:?}", result);
            assert_eq!((result.w - base.w) % 7, 0, "{:?}", result);
            assert_eq!((result.h - base.h) % 13, 0, "{:?}", result);
        }
    }

    #[test]
    fn constrain_grid_starts_at_the_base_size() {
        let hints = SizeHints::new(screen_dim())
            .with_min(Dim::new(100, 100))
            .with_base(Dim::new(150, 150))
            .with_inc(Dim::new(7, 7));

        let window = framed(Region::new(0, 0, 300, 200));
        window.set_size_hints(hints);

        let margin = window.margin();
        let requested = Region {
            pos: Pos::new(0, 0),
            dim: Dim::new(300, 300) + margin,
        };

        let result = window.constrain(requested, Corner::BottomRight).dim - margin;
        assert_eq!(result, Dim::new(297, 297));
        assert_eq!((result.w - 150) % 7, 0);
    }

    #[test]
    fn constrain_honours_aspect_ratio() {
        let hints = SizeHints::new(screen_dim())
            .with_aspect(Ratio::new(1, 1), Ratio::new(1, 1));

        let window = framed(Region::new(0, 0, 300, 200));
        window.set_size_hints(hints);

        let margin = window.margin();
        let requested = Region {
            pos: Pos::new(0, 0),
            dim: Dim::new(300, 200) + margin,
        };

        let result = window.constrain(requested, Corner::BottomRight).dim - margin;
        assert_eq!(result.w, result.h);
    }

    #[test]
    fn constrain_keeps_opposite_corner_fixed() {
        let window = framed(Region::new(100, 100, 400, 300));
        window.set_size_hints(SizeHints::new(screen_dim()).with_min(Dim::new(200, 200)));

        let frame = window.frame_region();
        let margin = window.margin();

        let requested = Region {
            pos: Pos::new(frame.right() - 49, frame.pos.y),
            dim: Dim::new(50, frame.dim.h),
        };

        let result = window.constrain(requested, Corner::BottomLeft);
        assert_eq!(result.right(), frame.right());
        assert_eq!(result.top(), frame.top());
        assert_eq!(result.dim.w, 200 + margin.horizontal());

        let requested = Region {
            pos: frame.pos,
            dim: Dim::new(50, 50),
        };

        let result = window.constrain(requested, Corner::BottomRight);
        assert_eq!(result.pos, frame.pos);
        assert_eq!(result.dim, Dim::new(200, 200) + margin);

        let requested = Region {
            pos: Pos::new(frame.right() - 49, frame.bottom() - 49),
            dim: Dim::new(50, 50),
        };

        let result = window.constrain(requested, Corner::TopLeft);
        assert_eq!(result.right(), frame.right());
        assert_eq!(result.bottom(), frame.bottom());
    }

    #[test]
    fn maximize_modes_keep_the_unmaximized_axis() {
        let avail = Region::new(0, 20, 1920, 1060);
        let premax = Region::new(100, 100, 400, 300);

        assert_eq!(ManagedWindow::maximized_region(Maximize::Full, avail, premax), avail);
        assert_eq!(
            ManagedWindow::maximized_region(Maximize::Vertical, avail, premax),
            Region::new(100, 20, 400, 1060)
        );
        assert_eq!(
            ManagedWindow::maximized_region(Maximize::Horizontal, avail, premax),
            Region::new(0, 100, 1920, 300)
        );
    }

    #[test]
    fn maximize_request_truth_table() {
        use ToggleAction::*;

        let cases = [
            (Maximize::None, Add, true, true, Some(Maximize::Full)),
            (Maximize::None, Add, false, true, Some(Maximize::Horizontal)),
            (Maximize::None, Add, true, false, Some(Maximize::Vertical)),
            (Maximize::Vertical, Add, false, true, Some(Maximize::Full)),
            (Maximize::Horizontal, Add, true, false, Some(Maximize::Full)),
            (Maximize::Full, Remove, true, true, Some(Maximize::None)),
            (Maximize::Full, Remove, false, true, Some(Maximize::Vertical)),
            (Maximize::Full, Remove, true, false, Some(Maximize::Horizontal)),
            (Maximize::Vertical, Remove, false, true, Some(Maximize::Vertical)),
            (Maximize::Full, Toggle, true, true, Some(Maximize::None)),
            (Maximize::Vertical, Toggle, true, true, Some(Maximize::Horizontal)),
            (Maximize::Horizontal, Toggle, false, true, Some(Maximize::None)),
            (Maximize::None, Toggle, true, true, Some(Maximize::Full)),
            (Maximize::Full, Add, false, false, None),
        ];

        for &(current, action, vertical, horizontal, expected) in cases.iter() {
            assert_eq!(
                current.from_request(action, vertical, horizontal),
                expected,
                "{:?} {:?} v={} h={}",
                current,
                action,
                vertical,
                horizontal
            );
        }
    }

    #[test]
    fn skip_requests_combine() {
        assert_eq!(
            Skip::None.from_request(ToggleAction::Add, true, true),
            Some(Skip::Both)
        );
        assert_eq!(
            Skip::Both.from_request(ToggleAction::Toggle, true, false),
            Some(Skip::None)
        );
        assert_eq!(
            Skip::Pager.from_request(ToggleAction::Add, true, false),
            Some(Skip::Taskbar)
        );
        assert_eq!(Skip::Pager.from_request(ToggleAction::Add, false, false), None);
    }

    #[test]
    fn net_states_and_actions_follow_flags() {
        let window = framed(Region::new(0, 0, 300, 200));

        window.set_maximized(Maximize::Vertical);
        window.set_skip(Skip::Both);
        window.set_layer(StackLayer::Above);

        assert_eq!(window.net_states(), vec![
            WindowState::MaximizedVert,
            WindowState::SkipTaskbar,
            WindowState::SkipPager,
            WindowState::Above,
        ]);

        assert_eq!(window.allowed_actions(), vec![
            AllowedAction::ChangeDesktop,
            AllowedAction::Move,
            AllowedAction::Minimize,
            AllowedAction::Resize,
            AllowedAction::MaximizeHorz,
            AllowedAction::MaximizeVert,
            AllowedAction::Fullscreen,
            AllowedAction::Shade,
            AllowedAction::Close,
        ]);

        window.set_iconic(true);
        assert_eq!(window.allowed_actions(), vec![AllowedAction::Close]);
        assert!(window.net_states().contains(&WindowState::Hidden));
    }

    #[test]
    fn initial_net_states_fold_into_flags() {
        let window = framed(Region::new(0, 0, 300, 200));

        let fullscreen = window.adopt_net_states(&[
            WindowState::MaximizedHorz,
            WindowState::MaximizedVert,
            WindowState::SkipPager,
            WindowState::Below,
        ]);

        assert!(!fullscreen);
        assert_eq!(window.maximized(), Maximize::Full);
        assert_eq!(window.skip(), Skip::Pager);
        assert_eq!(window.layer(), StackLayer::Below);
        assert!(window.adopt_net_states(&[WindowState::Fullscreen]));
    }

    #[test]
    fn layout_places_buttons_and_label() {
        let window = framed(Region::new(0, 0, 400, 300));
        let style = style();
        let layout = window.layout(&style);
        let inside = window.inside_dim();

        let step = style.button_width + style.bevel_width + 1;
        let offset = style.bevel_width + 1;

        assert_eq!(layout.frame.dim, inside);
        assert_eq!(layout.plate, Region::new(0, 1 + style.title_height, 400, 300));
        assert_eq!(layout.iconify_button, Some(Region::new(offset, offset, 14, 14)));
        assert_eq!(layout.close_button, Some(Region::new(inside.w - step, offset, 14, 14)));
        assert_eq!(
            layout.maximize_button,
            Some(Region::new(inside.w - 2 * step, offset, 14, 14))
        );

        let label = layout.label.unwrap();
        assert_eq!(label.pos, Pos::new(offset + step, style.bevel_width));
        assert_eq!(label.dim.w, inside.w - offset - 3 * step - offset);

        let handle = layout.handle.unwrap();
        assert_eq!(handle.pos.y, 300 + window.margin().top + 1 - 1);
        assert_eq!(
            layout.right_grip,
            Some(Region::new(inside.w - style.grip_width - 1, -1, 20, 6))
        );
    }

    #[test]
    fn narrow_titles_drop_the_label() {
        let window = framed(Region::new(0, 0, 40, 30));
        let layout = window.layout(&style());

        assert!(layout.title.is_some());
        assert!(layout.label.is_none());
    }

    #[test]
    fn focus_mode_from_hints() {
        assert_eq!(FocusMode::from_hints(None, false), FocusMode::Passive);
        assert_eq!(FocusMode::from_hints(Some(true), false), FocusMode::Passive);
        assert_eq!(FocusMode::from_hints(Some(true), true), FocusMode::LocallyActive);
        assert_eq!(FocusMode::from_hints(Some(false), true), FocusMode::GloballyActive);
        assert_eq!(FocusMode::from_hints(Some(false), false), FocusMode::NoInput);
        assert!(!FocusMode::NoInput.accepts_input());
    }

    #[test]
    fn fullscreen_policy_is_not_remembered() {
        let window = framed(Region::new(0, 0, 400, 300));

        window.set_fullscreen(true);
        window.override_policy(window.policy().fullscreen());
        window.update_policy(|policy| policy.with_fixed_size());

        assert!(window.decorations().is_empty());
        assert!(!window.normal_policy().functions.contains(Functions::RESIZE));

        window.set_fullscreen(false);
        window.set_policy(window.normal_policy());
        assert!(window.has_decoration(Decorations::TITLEBAR));
    }
}
