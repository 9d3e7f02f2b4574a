use crate::geometry::Dim;
use crate::geometry::Pos;
use crate::geometry::Ratio;
use crate::window::IcccmWindowState;
use crate::window::Window;

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum Gravity {
    Forget,
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
    Static,
}

impl Default for Gravity {
    fn default() -> Self {
        Gravity::NorthWest
    }
}

impl Gravity {
    pub fn from_value(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::Forget,
            1 => Self::NorthWest,
            2 => Self::North,
            3 => Self::NorthEast,
            4 => Self::West,
            5 => Self::Center,
            6 => Self::East,
            7 => Self::SouthWest,
            8 => Self::South,
            9 => Self::SouthEast,
            10 => Self::Static,
            _ => return None,
        })
    }
}

/// WM_NORMAL_HINTS as seen through the defaults the manager applies when a
/// field is absent: a 1x1 minimum, unit increments, no base size, NorthWest
/// gravity, and a maximum equal to the full screen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SizeHints {
    pub by_user: bool,
    pub pos: Option<Pos>,
    pub min: Dim,
    pub max: Dim,
    pub base: Dim,
    pub inc: Dim,
    pub aspect: Option<(Ratio, Ratio)>,
    pub gravity: Gravity,
    has_min: bool,
    has_max: bool,
}

impl SizeHints {
    pub fn new(screen_dim: Dim) -> Self {
        Self {
            by_user: false,
            pos: None,
            min: Dim::new(1, 1),
            max: screen_dim,
            base: Dim::new(0, 0),
            inc: Dim::new(1, 1),
            aspect: None,
            gravity: Gravity::NorthWest,
            has_min: false,
            has_max: false,
        }
    }

    pub fn with_min(
        mut self,
        min: Dim,
    ) -> Self {
        self.min.w = std::cmp::max(min.w, 1);
        self.min.h = std::cmp::max(min.h, 1);
        self.has_min = true;

        if self.has_max {
            self.with_max(self.max)
        } else {
            self
        }
    }

    /// A maximum not larger than the minimum collapses onto it.
    pub fn with_max(
        mut self,
        max: Dim,
    ) -> Self {
        self.max.w = std::cmp::max(max.w, self.min.w);
        self.max.h = std::cmp::max(max.h, self.min.h);
        self.has_max = true;
        self
    }

    pub fn with_base(
        mut self,
        base: Dim,
    ) -> Self {
        self.base.w = std::cmp::max(base.w, 0);
        self.base.h = std::cmp::max(base.h, 0);
        self
    }

    pub fn with_inc(
        mut self,
        inc: Dim,
    ) -> Self {
        self.inc.w = std::cmp::max(inc.w, 1);
        self.inc.h = std::cmp::max(inc.h, 1);
        self
    }

    pub fn with_aspect(
        mut self,
        min: Ratio,
        max: Ratio,
    ) -> Self {
        if min.numerator > 0 && min.denominator > 0 && max.numerator > 0 && max.denominator > 0 {
            self.aspect = Some((min, max));
        }

        self
    }

    pub fn with_gravity(
        mut self,
        gravity: Gravity,
    ) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_pos(
        mut self,
        pos: Pos,
        by_user: bool,
    ) -> Self {
        self.pos = Some(pos);
        self.by_user = by_user;
        self
    }

    /// The reference size the increment grid is anchored on: the base
    /// size when one is given, the minimum size otherwise.
    pub fn grid_base(&self) -> Dim {
        Dim {
            w: if self.base.w > 0 {
                self.base.w
            } else {
                self.min.w
            },
            h: if self.base.h > 0 {
                self.base.h
            } else {
                self.min.h
            },
        }
    }

    pub fn is_fixed(&self) -> bool {
        self.has_min && self.has_max && self.max.w <= self.min.w && self.max.h <= self.min.h
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub struct Hints {
    pub urgent: bool,
    pub input: Option<bool>,
    pub initial_state: Option<IcccmWindowState>,
    pub group: Option<Window>,
}

impl Hints {
    pub fn new(
        urgent: bool,
        input: Option<bool>,
        initial_state: Option<IcccmWindowState>,
        group: Option<Window>,
    ) -> Self {
        Self {
            urgent,
            input,
            initial_state,
            group,
        }
    }
}

/// The first three fields of _MOTIF_WM_HINTS; `None` when the matching
/// flag bit is clear.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct MotifHints {
    pub functions: Option<u32>,
    pub decorations: Option<u32>,
}

impl MotifHints {
    pub const FLAG_FUNCTIONS: u32 = 1 << 0;
    pub const FLAG_DECORATIONS: u32 = 1 << 1;

    pub const FUNC_ALL: u32 = 1 << 0;
    pub const FUNC_RESIZE: u32 = 1 << 1;
    pub const FUNC_MOVE: u32 = 1 << 2;
    pub const FUNC_MINIMIZE: u32 = 1 << 3;
    pub const FUNC_MAXIMIZE: u32 = 1 << 4;
    pub const FUNC_CLOSE: u32 = 1 << 5;

    pub const DECOR_ALL: u32 = 1 << 0;
    pub const DECOR_BORDER: u32 = 1 << 1;
    pub const DECOR_RESIZEH: u32 = 1 << 2;
    pub const DECOR_TITLE: u32 = 1 << 3;
    pub const DECOR_MENU: u32 = 1 << 4;
    pub const DECOR_MINIMIZE: u32 = 1 << 5;
    pub const DECOR_MAXIMIZE: u32 = 1 << 6;

    pub fn from_values(values: &[u32]) -> Option<Self> {
        if values.len() < 3 {
            return None;
        }

        let flags = values[0];

        Some(Self {
            functions: if flags & Self::FLAG_FUNCTIONS != 0 {
                Some(values[1])
            } else {
                None
            },
            decorations: if flags & Self::FLAG_DECORATIONS != 0 {
                Some(values[2])
            } else {
                None
            },
        })
    }
}
