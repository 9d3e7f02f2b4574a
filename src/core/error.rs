use winsys::event::ErrorKind;
use winsys::event::Event;
use winsys::window::Window;

use std::collections::HashSet;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperationError {
    NotPermitted,
    StateUnchanged,
    StaleWindow,
    GrabFailed,
}

/// Remembers resources the server rejected so that events still in
/// flight for them are not acted upon.
#[derive(Debug, Default)]
pub struct ErrorTracker {
    flagged: HashSet<Window>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self {
            flagged: HashSet::new(),
        }
    }

    pub fn record(
        &mut self,
        resource: Window,
        kind: ErrorKind,
    ) -> bool {
        if !kind.concerns_window() {
            debug!("ignoring {:?} error for resource {:#0x}", kind, resource);
            return false;
        }

        warn!("flagging window {:#0x} after {:?} error", resource, kind);
        self.flagged.insert(resource)
    }

    #[inline]
    pub fn is_flagged(
        &self,
        window: Window,
    ) -> bool {
        self.flagged.contains(&window)
    }

    #[inline]
    pub fn clear(
        &mut self,
        window: Window,
    ) {
        self.flagged.remove(&window);
    }

    /// Drops the flags of windows that are no longer managed; their ids
    /// may be handed out again.
    pub fn forget(
        &mut self,
        windows: impl IntoIterator<Item = Window>,
    ) {
        for window in windows {
            self.flagged.remove(&window);
        }
    }

    /// Decides whether an event may be routed. Destroy and unmap
    /// notifications always pass so a flagged window can still be torn
    /// down; a destroy also forgets the flag.
    pub fn admits(
        &mut self,
        event: &Event,
        owner: impl Fn(Window) -> Option<Window>,
    ) -> bool {
        match event {
            Event::Destroy {
                window,
            } => {
                self.flagged.remove(window);

                if let Some(client) = owner(*window) {
                    self.flagged.remove(&client);
                }

                true
            },
            Event::Unmap {
                ..
            }
            | Event::ProtocolError {
                ..
            } => true,
            _ => event.window().map_or(true, |window| {
                !self.is_flagged(window)
                    && owner(window).map_or(true, |client| !self.is_flagged(client))
            }),
        }
    }
}
