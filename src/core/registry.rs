use crate::decoration::Part;
use crate::util::BuildIdHasher;
use crate::window::ManagedWindow;

use winsys::window::Window;

use std::collections::HashMap;
use std::rc::Rc;

/// Clients sharing a WM_HINTS window group leader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowGroup {
    leader: Window,
    members: Vec<Window>,
}

impl WindowGroup {
    fn new(leader: Window) -> Self {
        Self {
            leader,
            members: Vec::with_capacity(2),
        }
    }

    #[inline]
    pub fn leader(&self) -> Window {
        self.leader
    }

    #[inline]
    pub fn members(&self) -> &[Window] {
        &self.members
    }
}

/// Every server window the manager knows about, mapped to the client it
/// belongs to and the role it plays there.
#[derive(Debug, Default)]
pub struct Registry {
    clients: HashMap<Window, Rc<ManagedWindow>, BuildIdHasher>,
    parts: HashMap<Window, (Window, Part), BuildIdHasher>,
    groups: HashMap<Window, WindowGroup, BuildIdHasher>,
    order: Vec<Window>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            clients: HashMap::with_hasher(BuildIdHasher),
            parts: HashMap::with_hasher(BuildIdHasher),
            groups: HashMap::with_hasher(BuildIdHasher),
            order: Vec::with_capacity(20),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Whether the window is known at all, as a client or as one of the
    /// windows making up a frame.
    #[inline]
    pub fn is_known(
        &self,
        window: Window,
    ) -> bool {
        self.parts.contains_key(&window)
    }

    /// Registers a client together with its frame and plate. Refuses a
    /// window id already in use.
    pub fn insert(
        &mut self,
        client: ManagedWindow,
    ) -> Option<Rc<ManagedWindow>> {
        let window = client.window();

        if self.parts.contains_key(&window)
            || self.parts.contains_key(&client.frame())
            || self.parts.contains_key(&client.plate())
        {
            warn!("window {:#0x} is already registered", window);
            return None;
        }

        self.parts.insert(window, (window, Part::Client));
        self.parts.insert(client.frame(), (window, Part::Frame));
        self.parts.insert(client.plate(), (window, Part::Plate));

        let client = Rc::new(client);
        self.clients.insert(window, client.clone());
        self.order.push(window);

        Some(client)
    }

    pub fn register_part(
        &mut self,
        client: Window,
        part: Part,
        window: Window,
    ) {
        if self.clients.contains_key(&client) {
            self.parts.insert(window, (client, part));
        }
    }

    pub fn unregister_part(
        &mut self,
        window: Window,
    ) {
        if let Some(&(client, part)) = self.parts.get(&window) {
            match part {
                Part::Client | Part::Frame | Part::Plate => {
                    warn!("refusing to unregister {:?} of {:#0x}", part, client)
                },
                _ => {
                    self.parts.remove(&window);
                },
            }
        }
    }

    #[inline]
    pub fn get(
        &self,
        window: Window,
    ) -> Option<Rc<ManagedWindow>> {
        self.clients.get(&window).cloned()
    }

    /// The client a window belongs to and the part it is of that client.
    #[inline]
    pub fn route(
        &self,
        window: Window,
    ) -> Option<(Window, Part)> {
        self.parts.get(&window).copied()
    }

    pub fn owner(
        &self,
        window: Window,
    ) -> Option<Rc<ManagedWindow>> {
        self.route(window).and_then(|(client, _)| self.get(client))
    }

    /// Drops a client and every window registered for it, including its
    /// group membership.
    pub fn remove(
        &mut self,
        window: Window,
    ) -> Option<Rc<ManagedWindow>> {
        let client = self.clients.remove(&window)?;

        self.parts.retain(|_, &mut (owner, _)| owner != window);
        self.order.retain(|&managed| managed != window);
        self.leave_group(window, client.group());

        Some(client)
    }

    /// Clients in the order they were managed.
    pub fn windows(&self) -> Vec<Window> {
        self.order.clone()
    }

    pub fn clients(&self) -> Vec<Rc<ManagedWindow>> {
        self.order
            .iter()
            .filter_map(|window| self.clients.get(window).cloned())
            .collect()
    }

    pub fn join_group(
        &mut self,
        window: Window,
        leader: Window,
    ) {
        let group = self
            .groups
            .entry(leader)
            .or_insert_with(|| WindowGroup::new(leader));

        if !group.members.contains(&window) {
            group.members.push(window);
        }
    }

    /// Removes a member; the group goes away with its last member.
    pub fn leave_group(
        &mut self,
        window: Window,
        leader: Option<Window>,
    ) {
        let leader = match leader {
            Some(leader) => leader,
            None => return,
        };

        let now_empty = match self.groups.get_mut(&leader) {
            Some(group) => {
                group.members.retain(|&member| member != window);
                group.members.is_empty()
            },
            None => false,
        };

        if now_empty {
            self.groups.remove(&leader);
        }
    }

    #[inline]
    pub fn group(
        &self,
        leader: Window,
    ) -> Option<&WindowGroup> {
        self.groups.get(&leader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use winsys::geometry::Dim;
    use winsys::geometry::Region;
    use winsys::hints::SizeHints;

    fn client(
        window: Window,
        frame: Window,
        plate: Window,
    ) -> ManagedWindow {
        ManagedWindow::new(
            window,
            frame,
            plate,
            Region::new(0, 0, 100, 100),
            0,
            SizeHints::new(Dim::new(800, 600)),
        )
    }

    #[test]
    fn every_frame_window_routes_to_its_client() {
        let mut registry = Registry::new();

        registry.insert(client(1, 2, 3)).unwrap();
        registry.register_part(1, Part::Title, 4);
        registry.register_part(1, Part::CloseButton, 5);

        assert_eq!(registry.route(1), Some((1, Part::Client)));
        assert_eq!(registry.route(2), Some((1, Part::Frame)));
        assert_eq!(registry.route(3), Some((1, Part::Plate)));
        assert_eq!(registry.route(5), Some((1, Part::CloseButton)));
        assert_eq!(registry.owner(4).map(|client| client.window()), Some(1));
        assert_eq!(registry.route(99), None);
    }

    #[test]
    fn identifiers_resolve_to_one_client() {
        let mut registry = Registry::new();

        assert!(registry.insert(client(1, 2, 3)).is_some());
        assert!(registry.insert(client(1, 6, 7)).is_none());
        assert!(registry.insert(client(8, 2, 9)).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removal_drops_all_parts() {
        let mut registry = Registry::new();

        registry.insert(client(1, 2, 3));
        registry.insert(client(10, 11, 12));
        registry.register_part(1, Part::Handle, 4);

        let removed = registry.remove(1).unwrap();
        assert_eq!(removed.window(), 1);

        for window in 1..=4 {
            assert!(!registry.is_known(window));
        }

        assert_eq!(registry.windows(), vec![10]);
        assert!(registry.remove(1).is_none());
    }

    #[test]
    fn core_parts_cannot_be_unregistered_alone() {
        let mut registry = Registry::new();

        registry.insert(client(1, 2, 3));
        registry.register_part(1, Part::Label, 4);
        registry.unregister_part(2);
        registry.unregister_part(4);

        assert!(registry.is_known(2));
        assert!(!registry.is_known(4));
    }

    #[test]
    fn groups_vanish_with_their_last_member() {
        let mut registry = Registry::new();

        let first = registry.insert(client(1, 2, 3)).unwrap();
        registry.insert(client(4, 5, 6));

        first.set_group(Some(100));
        registry.join_group(1, 100);
        registry.join_group(4, 100);
        registry.join_group(4, 100);

        assert_eq!(registry.group(100).unwrap().members(), &[1, 4]);

        registry.remove(1);
        assert_eq!(registry.group(100).unwrap().members(), &[4]);

        registry.leave_group(4, Some(100));
        assert!(registry.group(100).is_none());
    }
}
