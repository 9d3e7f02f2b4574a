use winsys::connection::Connection;
use winsys::geometry::Region;
use winsys::hints::MotifHints;
use winsys::window::Protocol;
use winsys::window::Window;
use winsys::window::WindowType;

use std::collections::HashSet;

use bitflags::bitflags;

pub type Color = u32;

bitflags! {
    /// Which parts of the frame are drawn around a client.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Decorations: u8 {
        const TITLEBAR = 1 << 0;
        const HANDLE   = 1 << 1;
        const GRIP     = 1 << 2;
        const BORDER   = 1 << 3;
        const ICONIFY  = 1 << 4;
        const MAXIMIZE = 1 << 5;
        const CLOSE    = 1 << 6;
    }
}

bitflags! {
    /// Which operations may be applied to a client.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Functions: u8 {
        const RESIZE   = 1 << 0;
        const MOVE     = 1 << 1;
        const SHADE    = 1 << 2;
        const ICONIFY  = 1 << 3;
        const MAXIMIZE = 1 << 4;
        const CLOSE    = 1 << 5;
    }
}

/// The decoration and function sets of a window, together with every
/// rule that is allowed to change them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub decorations: Decorations,
    pub functions: Functions,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            decorations: Decorations::all(),
            functions: Functions::all(),
        }
    }
}

impl Policy {
    pub fn for_type(window_type: WindowType) -> Self {
        let mut policy = Self::default();

        match window_type {
            WindowType::Dialog => {
                policy.decorations -= Decorations::ICONIFY | Decorations::MAXIMIZE;
                policy.functions -= Functions::SHADE | Functions::ICONIFY | Functions::MAXIMIZE;
            },
            WindowType::Desktop | WindowType::Dock | WindowType::Splash => {
                policy.decorations = Decorations::empty();
                policy.functions = Functions::empty();
            },
            WindowType::Utility => {
                policy.decorations -= Decorations::ICONIFY | Decorations::MAXIMIZE;
                policy.functions -= Functions::ICONIFY | Functions::MAXIMIZE;
            },
            WindowType::Toolbar | WindowType::Menu => {
                policy.decorations -= Decorations::HANDLE
                    | Decorations::GRIP
                    | Decorations::ICONIFY
                    | Decorations::MAXIMIZE;
            },
            WindowType::Normal => {},
        }

        policy
    }

    /// Motif hints replace whichever of the two sets they carry.
    pub fn with_motif(
        mut self,
        hints: &MotifHints,
    ) -> Self {
        if let Some(functions) = hints.functions {
            self.functions = if functions & MotifHints::FUNC_ALL != 0 {
                Functions::all()
            } else {
                [
                    (MotifHints::FUNC_RESIZE, Functions::RESIZE),
                    (MotifHints::FUNC_MOVE, Functions::MOVE),
                    (MotifHints::FUNC_MINIMIZE, Functions::ICONIFY),
                    (MotifHints::FUNC_MAXIMIZE, Functions::MAXIMIZE),
                    (MotifHints::FUNC_CLOSE, Functions::CLOSE),
                ]
                .iter()
                .filter(|(bit, _)| functions & bit != 0)
                .fold(Functions::empty(), |acc, &(_, function)| acc | function)
            };
        }

        if let Some(decorations) = hints.decorations {
            self.decorations = if decorations & MotifHints::DECOR_ALL != 0 {
                Decorations::all()
            } else {
                [
                    (MotifHints::DECOR_BORDER, Decorations::BORDER),
                    (MotifHints::DECOR_RESIZEH, Decorations::HANDLE),
                    (MotifHints::DECOR_TITLE, Decorations::TITLEBAR),
                    (MotifHints::DECOR_MINIMIZE, Decorations::ICONIFY),
                    (MotifHints::DECOR_MAXIMIZE, Decorations::MAXIMIZE),
                ]
                .iter()
                .filter(|(bit, _)| decorations & bit != 0)
                .fold(Decorations::empty(), |acc, &(_, decoration)| acc | decoration)
            };
        }

        self
    }

    pub fn with_protocols(
        mut self,
        protocols: &HashSet<Protocol>,
    ) -> Self {
        if protocols.contains(&Protocol::Delete) {
            self.decorations |= Decorations::CLOSE;
            self.functions |= Functions::CLOSE;
        }

        self
    }

    pub fn with_fixed_size(mut self) -> Self {
        self.decorations -= Decorations::MAXIMIZE | Decorations::GRIP;
        self.functions -= Functions::RESIZE | Functions::MAXIMIZE;
        self
    }

    /// Undoes a fixed size restriction once the size hints allow
    /// resizing again; transients never regain the iconify and maximize
    /// controls.
    pub fn with_variable_size(
        mut self,
        transient: bool,
    ) -> Self {
        if !transient {
            self.decorations |= Decorations::ICONIFY | Decorations::MAXIMIZE;
            self.functions |= Functions::SHADE | Functions::ICONIFY | Functions::MAXIMIZE;
        }

        self.decorations |= Decorations::GRIP;
        self.functions |= Functions::RESIZE;
        self
    }

    pub fn with_transient(mut self) -> Self {
        self.decorations -= Decorations::ICONIFY | Decorations::MAXIMIZE;
        self.functions -= Functions::SHADE | Functions::ICONIFY | Functions::MAXIMIZE;
        self
    }

    pub fn fullscreen(mut self) -> Self {
        self.decorations = Decorations::empty();
        self.functions -= Functions::RESIZE | Functions::MOVE | Functions::SHADE;
        self
    }
}

/// Frame metrics shared by every managed window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Style {
    pub title_height: i32,
    pub label_height: i32,
    pub handle_height: i32,
    pub button_width: i32,
    pub grip_width: i32,
    pub bevel_width: i32,
    pub frame_width: i32,
}

impl Default for Style {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub focused_title: Color,
    pub unfocused_title: Color,
    pub focused_label: Color,
    pub unfocused_label: Color,
    pub focused_handle: Color,
    pub unfocused_handle: Color,
    pub focused_grip: Color,
    pub unfocused_grip: Color,
    pub focused_button: Color,
    pub unfocused_button: Color,
    pub pressed_button: Color,
    pub focused_border: Color,
    pub unfocused_border: Color,
    pub frame_border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// What a server window is to the client that owns it; events are
/// routed on this tag.
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq)]
pub enum Part {
    Client,
    Frame,
    Plate,
    Title,
    Label,
    Handle,
    LeftGrip,
    RightGrip,
    IconifyButton,
    MaximizeButton,
    CloseButton,
}

impl Part {
    pub fn is_button(self) -> bool {
        match self {
            Self::IconifyButton | Self::MaximizeButton | Self::CloseButton => true,
            _ => false,
        }
    }

    pub fn is_grip(self) -> bool {
        match self {
            Self::LeftGrip | Self::RightGrip => true,
            _ => false,
        }
    }

    /// Parts a move may be started from with a plain click.
    pub fn is_move_handle(self) -> bool {
        match self {
            Self::Title | Self::Label | Self::Handle => true,
            _ => false,
        }
    }
}

/// Decoration subwindows that exist only while their decoration is on.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameParts {
    pub title: Option<Window>,
    pub label: Option<Window>,
    pub handle: Option<Window>,
    pub left_grip: Option<Window>,
    pub right_grip: Option<Window>,
    pub iconify_button: Option<Window>,
    pub maximize_button: Option<Window>,
    pub close_button: Option<Window>,
}

impl FrameParts {
    pub fn get(
        &self,
        part: Part,
    ) -> Option<Window> {
        match part {
            Part::Title => self.title,
            Part::Label => self.label,
            Part::Handle => self.handle,
            Part::LeftGrip => self.left_grip,
            Part::RightGrip => self.right_grip,
            Part::IconifyButton => self.iconify_button,
            Part::MaximizeButton => self.maximize_button,
            Part::CloseButton => self.close_button,
            _ => None,
        }
    }

    pub fn set(
        &mut self,
        part: Part,
        window: Option<Window>,
    ) {
        let slot = match part {
            Part::Title => &mut self.title,
            Part::Label => &mut self.label,
            Part::Handle => &mut self.handle,
            Part::LeftGrip => &mut self.left_grip,
            Part::RightGrip => &mut self.right_grip,
            Part::IconifyButton => &mut self.iconify_button,
            Part::MaximizeButton => &mut self.maximize_button,
            Part::CloseButton => &mut self.close_button,
            _ => return,
        };

        *slot = window;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Part, Window)> {
        vec![
            (Part::Title, self.title),
            (Part::Label, self.label),
            (Part::Handle, self.handle),
            (Part::LeftGrip, self.left_grip),
            (Part::RightGrip, self.right_grip),
            (Part::IconifyButton, self.iconify_button),
            (Part::MaximizeButton, self.maximize_button),
            (Part::CloseButton, self.close_button),
        ]
        .into_iter()
        .filter_map(|(part, window)| window.map(|window| (part, window)))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderState {
    Focused,
    Unfocused,
    Pressed,
}

/// Paints decoration parts; the state machine decides what to paint
/// and when, never how.
pub trait Renderer {
    fn render(
        &self,
        conn: &dyn Connection,
        drawable: Window,
        part: Part,
        region: Region,
        state: RenderState,
    );

    fn outline(
        &self,
        conn: &dyn Connection,
        region: Region,
    );

    fn border_color(
        &self,
        state: RenderState,
    ) -> Color;
}

/// Fills every part with a flat colour.
pub struct SolidRenderer {
    colors: ColorScheme,
}

impl SolidRenderer {
    pub fn new(colors: ColorScheme) -> Self {
        Self {
            colors,
        }
    }

    fn color(
        &self,
        part: Part,
        state: RenderState,
    ) -> Color {
        let colors = &self.colors;
        let focused = state != RenderState::Unfocused;

        match part {
            part if part.is_button() => match state {
                RenderState::Pressed => colors.pressed_button,
                RenderState::Focused => colors.focused_button,
                RenderState::Unfocused => colors.unfocused_button,
            },
            Part::Title if focused => colors.focused_title,
            Part::Title => colors.unfocused_title,
            Part::Label if focused => colors.focused_label,
            Part::Label => colors.unfocused_label,
            Part::Handle if focused => colors.focused_handle,
            Part::Handle => colors.unfocused_handle,
            part if part.is_grip() && focused => colors.focused_grip,
            part if part.is_grip() => colors.unfocused_grip,
            _ => colors.frame_border,
        }
    }
}

impl Renderer for SolidRenderer {
    fn render(
        &self,
        conn: &dyn Connection,
        drawable: Window,
        part: Part,
        region: Region,
        state: RenderState,
    ) {
        conn.fill_window(drawable, region, self.color(part, state));
    }

    fn outline(
        &self,
        conn: &dyn Connection,
        region: Region,
    ) {
        conn.draw_outline(region);
    }

    fn border_color(
        &self,
        state: RenderState,
    ) -> Color {
        match state {
            RenderState::Unfocused => self.colors.unfocused_border,
            _ => self.colors.focused_border,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialogs_lose_iconify_and_maximize() {
        let policy = Policy::for_type(WindowType::Dialog);

        assert!(policy.decorations.contains(Decorations::TITLEBAR | Decorations::CLOSE));
        assert!(!policy.decorations.intersects(Decorations::ICONIFY | Decorations::MAXIMIZE));
        assert!(!policy.functions.contains(Functions::SHADE));
        assert!(policy.functions.contains(Functions::MOVE | Functions::RESIZE));
    }

    #[test]
    fn docks_are_undecorated_and_inert() {
        for &window_type in &[WindowType::Desktop, WindowType::Dock, WindowType::Splash] {
            let policy = Policy::for_type(window_type);

            assert!(policy.decorations.is_empty());
            assert!(policy.functions.is_empty());
        }
    }

    #[test]
    fn toolbars_keep_functions_but_drop_handle() {
        let policy = Policy::for_type(WindowType::Toolbar);

        assert!(!policy.decorations.contains(Decorations::HANDLE));
        assert!(!policy.decorations.contains(Decorations::GRIP));
        assert!(policy.decorations.contains(Decorations::TITLEBAR));
        assert_eq!(policy.functions, Functions::all());
    }

    #[test]
    fn motif_hints_replace_sets() {
        let hints = MotifHints {
            functions: Some(MotifHints::FUNC_MOVE | MotifHints::FUNC_CLOSE),
            decorations: Some(MotifHints::DECOR_BORDER),
        };

        let policy = Policy::default().with_motif(&hints);

        assert_eq!(policy.functions, Functions::MOVE | Functions::CLOSE);
        assert_eq!(policy.decorations, Decorations::BORDER);

        let policy = Policy::for_type(WindowType::Dock).with_motif(&MotifHints {
            functions: Some(MotifHints::FUNC_ALL),
            decorations: None,
        });

        assert_eq!(policy.functions, Functions::all());
        assert!(policy.decorations.is_empty());
    }

    #[test]
    fn fixed_size_round_trip() {
        let fixed = Policy::default().with_fixed_size();

        assert!(!fixed.functions.contains(Functions::RESIZE));
        assert!(!fixed.decorations.contains(Decorations::GRIP));
        assert_eq!(fixed.with_variable_size(false), Policy::default());

        let transient = Policy::for_type(WindowType::Dialog).with_fixed_size();
        let relaxed = transient.with_variable_size(true);

        assert!(relaxed.functions.contains(Functions::RESIZE));
        assert!(relaxed.decorations.contains(Decorations::GRIP));
        assert!(!relaxed.functions.contains(Functions::MAXIMIZE));
        assert!(!relaxed.decorations.contains(Decorations::MAXIMIZE));
    }

    #[test]
    fn delete_protocol_enables_close() {
        let policy = Policy {
            decorations: Decorations::TITLEBAR,
            functions: Functions::MOVE,
        };

        let protocols = [Protocol::Delete].iter().cloned().collect();
        let policy = policy.with_protocols(&protocols);

        assert!(policy.decorations.contains(Decorations::CLOSE));
        assert!(policy.functions.contains(Functions::CLOSE));
    }

    #[test]
    fn fullscreen_strips_geometry_functions() {
        let policy = Policy::default().fullscreen();

        assert!(policy.decorations.is_empty());
        assert_eq!(policy.functions, Functions::ICONIFY | Functions::MAXIMIZE | Functions::CLOSE);
    }

    #[test]
    fn frame_parts_track_subwindows() {
        let mut parts = FrameParts::default();

        parts.set(Part::Title, Some(10));
        parts.set(Part::CloseButton, Some(11));
        parts.set(Part::Frame, Some(12));

        assert_eq!(parts.get(Part::Title), Some(10));
        assert_eq!(parts.get(Part::Frame), None);
        assert_eq!(parts.iter().collect::<Vec<_>>(), vec![
            (Part::Title, 10),
            (Part::CloseButton, 11)
        ]);
    }
}
