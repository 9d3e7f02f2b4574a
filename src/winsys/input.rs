pub use crate::Result;

use crate::geometry::Pos;
use crate::window::Window;

use std::collections::HashSet;
use std::convert::TryFrom;

use anyhow::anyhow;
use strum::EnumIter;
use strum::IntoEnumIterator;

pub type Timestamp = u32;

#[repr(u8)]
#[derive(Debug, PartialEq, EnumIter, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum Modifier {
    Ctrl = 1 << 0,
    Shift = 1 << 1,
    Alt = 1 << 2,
    Super = 1 << 3,
    CapsLock = 1 << 4,
    NumLock = 1 << 5,
    ScrollLock = 1 << 6,
}

impl Modifier {
    pub fn is_lock(self) -> bool {
        match self {
            Self::CapsLock | Self::NumLock | Self::ScrollLock => true,
            _ => false,
        }
    }

    pub fn locks() -> impl Iterator<Item = Modifier> {
        Self::iter().filter(|modifier| modifier.is_lock())
    }
}

impl TryFrom<&str> for Modifier {
    type Error = anyhow::Error;

    fn try_from(val: &str) -> Result<Self> {
        match val {
            "C" => Ok(Self::Ctrl),
            "A" => Ok(Self::Alt),
            "S" => Ok(Self::Shift),
            "M" => Ok(Self::Super),
            "Caps" => Ok(Self::CapsLock),
            "Num" => Ok(Self::NumLock),
            "Scroll" => Ok(Self::ScrollLock),
            _ => Err(anyhow!("unable to resolve \"{}\" to modifier", val)),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum Button {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
    Backward,
    Forward,
}

impl Button {
    pub fn from_detail(detail: u8) -> Option<Self> {
        Some(match detail {
            1 => Self::Left,
            2 => Self::Middle,
            3 => Self::Right,
            4 => Self::ScrollUp,
            5 => Self::ScrollDown,
            8 => Self::Backward,
            9 => Self::Forward,
            _ => return None,
        })
    }

    pub fn detail(self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Middle => 2,
            Self::Right => 3,
            Self::ScrollUp => 4,
            Self::ScrollDown => 5,
            Self::Backward => 8,
            Self::Forward => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum MouseEventKind {
    Press,
    Release,
    Motion,
}

/// A pointer event after decoding.
///
/// For presses and releases `button` is the button that changed; for
/// motion it is `None` and `held` carries the buttons that were down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub window: Window,
    pub button: Option<Button>,
    pub held: HashSet<Button>,
    pub modifiers: HashSet<Modifier>,
    pub root_rpos: Pos,
    pub window_rpos: Pos,
    pub time: Timestamp,
}

impl MouseEvent {
    pub fn is_held(
        &self,
        button: Button,
    ) -> bool {
        self.held.contains(&button)
    }

    pub fn has_modifier(
        &self,
        modifier: Modifier,
    ) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn strip_locks(&mut self) {
        self.modifiers.retain(|modifier| !modifier.is_lock());
    }
}

/// Every combination of lock modifiers, so a grab still fires while
/// Caps Lock, Num Lock or Scroll Lock is engaged.
pub fn lock_combinations() -> Vec<HashSet<Modifier>> {
    let locks: Vec<Modifier> = Modifier::locks().collect();

    (0..(1usize << locks.len()))
        .map(|bits| {
            locks
                .iter()
                .enumerate()
                .filter(|(i, _)| bits & (1 << i) != 0)
                .map(|(_, &modifier)| modifier)
                .collect()
        })
        .collect()
}
