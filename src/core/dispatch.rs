use winsys::connection::Connection;
use winsys::event::Event;
use winsys::geometry::Region;
use winsys::input::MouseEvent;
use winsys::input::MouseEventKind;
use winsys::window::Window;

use std::collections::VecDeque;

fn motion_window(event: &Event) -> Option<Window> {
    match event {
        Event::Mouse {
            event:
                MouseEvent {
                    kind: MouseEventKind::Motion,
                    window,
                    ..
                },
        } => Some(*window),
        _ => None,
    }
}

/// Decoded events waiting to be routed, oldest first.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<Event>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(64),
        }
    }

    /// Pulls everything the connection has buffered without blocking.
    pub fn fill(
        &mut self,
        conn: &dyn Connection,
    ) -> usize {
        let mut count = 0;

        while let Some(event) = conn.poll_event() {
            self.events.push_back(event);
            count += 1;
        }

        count
    }

    #[inline]
    pub fn push_back(
        &mut self,
        event: Event,
    ) {
        self.events.push_back(event);
    }

    #[inline]
    pub fn push_front(
        &mut self,
        event: Event,
    ) {
        self.events.push_front(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn contains(
        &self,
        predicate: impl Fn(&Event) -> bool,
    ) -> bool {
        self.events.iter().any(predicate)
    }

    /// Removes and returns the oldest event, folding queued duplicates
    /// of motion, expose and configure notifications into it.
    pub fn pop(&mut self) -> Option<Event> {
        let event = self.events.pop_front()?;

        Some(match event {
            Event::Mouse {
                ..
            } => match motion_window(&event) {
                Some(window) => self.compress_motion(window, event),
                None => event,
            },
            Event::Expose {
                window,
                region,
                count,
            } => self.compress_expose(window, region, count),
            Event::Configure {
                window,
                ..
            } => self.compress_configure(window, event),
            event => event,
        })
    }

    fn compress_motion(
        &mut self,
        window: Window,
        mut latest: Event,
    ) -> Event {
        let mut index = 0;

        while index < self.events.len() {
            let (coalesces, ends_run) = match &self.events[index] {
                Event::Mouse {
                    event,
                } => (
                    event.kind == MouseEventKind::Motion && event.window == window,
                    event.kind != MouseEventKind::Motion,
                ),
                _ => (false, false),
            };

            // a press or release ends the run of coalescable motion
            if ends_run {
                break;
            }

            if coalesces {
                if let Some(event) = self.events.remove(index) {
                    latest = event;
                }
            } else {
                index += 1;
            }
        }

        latest
    }

    fn compress_expose(
        &mut self,
        window: Window,
        mut region: Region,
        mut count: u16,
    ) -> Event {
        let mut index = 0;

        while index < self.events.len() {
            match self.events[index] {
                Event::Expose {
                    window: other,
                    region: other_region,
                    count: other_count,
                } if other == window => {
                    region = region.union(other_region);
                    count = other_count;
                    self.events.remove(index);
                },
                _ => index += 1,
            }
        }

        Event::Expose {
            window,
            region,
            count,
        }
    }

    fn compress_configure(
        &mut self,
        window: Window,
        mut latest: Event,
    ) -> Event {
        let mut index = 0;

        while index < self.events.len() {
            match self.events[index] {
                Event::Configure {
                    window: other,
                    ..
                } if other == window => {
                    if let Some(event) = self.events.remove(index) {
                        latest = event;
                    }
                },
                _ => index += 1,
            }
        }

        latest
    }

    /// Removes and returns the first queued event matching `predicate`,
    /// looking at everything the server has sent so far.
    pub fn take_first(
        &mut self,
        conn: &dyn Connection,
        predicate: impl Fn(&Event) -> bool,
    ) -> Option<Event> {
        self.fill(conn);

        let index = self.events.iter().position(predicate)?;
        self.events.remove(index)
    }

    /// Removes and returns every queued event matching `predicate`.
    pub fn take_all(
        &mut self,
        conn: &dyn Connection,
        predicate: impl Fn(&Event) -> bool,
    ) -> Vec<Event> {
        self.fill(conn);

        let (taken, kept): (VecDeque<Event>, VecDeque<Event>) =
            self.events.drain(..).partition(|event| predicate(event));

        self.events = kept;
        taken.into_iter().collect()
    }
}
