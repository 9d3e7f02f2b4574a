use super::Model;

use crate::config::PlacementPolicy;
use crate::decoration::Decorations;
use crate::decoration::Functions;
use crate::decoration::Policy;
use crate::placement::PlacementRequest;
use crate::placement::Placer;
use crate::stack::StackLayer;
use crate::window::FocusMode;
use crate::window::ManagedWindow;
use crate::window::Maximize;
use crate::window::TransientFor;
use crate::workspace::Workspace;

use winsys::event::Event;
use winsys::event::PropertyKind;
use winsys::geometry::Corner;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::hints::Hints;
use winsys::hints::SizeHints;
use winsys::input::lock_combinations;
use winsys::input::Button;
use winsys::input::Modifier;
use winsys::window::IcccmWindowState;
use winsys::window::Protocol;
use winsys::window::Window;
use winsys::window::WindowType;

use std::rc::Rc;

/// How a client leaves the manager.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Release {
    /// The client withdrew itself.
    Withdraw,
    /// The manager lets go of a live client, which stays mapped.
    Remap,
    /// The client window no longer exists.
    Destroyed,
}

impl<'a> Model<'a> {
    /// Frames a top-level window and starts managing it.
    pub(super) fn manage(
        &self,
        window: Window,
    ) -> Option<Rc<ManagedWindow>> {
        if self.registry.borrow().is_known(window) {
            return None;
        }

        let attributes = match self.conn.get_window_attributes(window) {
            Some(attributes) => attributes,
            None => {
                debug!("window {:#0x} vanished before it could be managed", window);
                return None;
            },
        };

        if attributes.override_redirect {
            return None;
        }

        info!("managing client {:#0x}", window);

        let screen_dim = self.controller.full_region().dim;
        let size_hints = self
            .conn
            .get_icccm_window_size_hints(window, screen_dim)
            .unwrap_or_else(|| SizeHints::new(screen_dim));

        self.conn.init_client(window);

        let border_width = self.config.borrow().border_width;
        let frame = match self.conn.create_frame(attributes.region, border_width) {
            Ok(frame) => frame,
            Err(err) => {
                warn!("could not create frame for {:#0x}: {}", window, err);
                return None;
            },
        };

        let plate_region = Region {
            pos: Pos::default(),
            dim: attributes.region.dim,
        };

        let plate = match self.conn.create_plate(frame, plate_region) {
            Ok(plate) => plate,
            Err(err) => {
                warn!("could not create plate for {:#0x}: {}", window, err);
                self.conn.destroy_window(frame);
                return None;
            },
        };

        let client = ManagedWindow::new(
            window,
            frame,
            plate,
            attributes.region,
            attributes.border_width,
            size_hints,
        );

        let client = self.registry.borrow_mut().insert(client);
        let client = match client {
            Some(client) => client,
            None => {
                self.conn.destroy_window(frame);
                return None;
            },
        };

        client.set_name(self.conn.get_icccm_window_name(window));
        let hints = self.update_focus_model(&client);

        let window_type = self
            .conn
            .get_window_types(window)
            .first()
            .copied()
            .unwrap_or(WindowType::Normal);

        client.set_window_type(window_type);
        self.update_transient_info(&client);

        if window_type == WindowType::Normal && client.is_transient() {
            client.set_window_type(WindowType::Dialog);
        }

        client.set_policy(self.initial_policy(&client));
        client.set_layer(match client.window_type() {
            WindowType::Desktop => StackLayer::Desktop,
            WindowType::Dock => StackLayer::Above,
            _ => StackLayer::Normal,
        });

        let fullscreen = client.adopt_net_states(&self.conn.get_window_states(window));

        if !client.is_transient() {
            client.set_modal(false);
        }

        if !client.has_decoration(Decorations::TITLEBAR) {
            client.set_shaded(false);
        }

        client.set_workspace(self.initial_workspace(&client));

        let iconic = client.is_iconic()
            || self.conn.get_icccm_window_state(window) == Some(IcccmWindowState::Iconic)
            || hints.and_then(|hints| hints.initial_state) == Some(IcccmWindowState::Iconic);

        client.set_iconic(false);

        if !self.validate_client(&client) {
            debug!("client {:#0x} went away while being managed", window);
            self.discard(&client);
            return None;
        }

        client.upsize(&self.style, border_width);

        let target = self.workspace_for(&client);
        let dim = client.frame_region().dim;

        let pos = if attributes.mapped || size_hints.pos.is_some() {
            client.frame_pos_from_client(attributes.region.pos)
        } else if let Some(owner) = client.transient_owner().and_then(|owner| self.client(owner)) {
            owner.frame_region().from_absolute_inner_center(dim).pos
        } else {
            self.place_frame(&client, target)
        };

        client.set_frame_region(Region {
            pos,
            dim,
        });
        client.sync_client_pos();

        self.decorate(&client);

        self.conn.grab_server();
        self.conn.set_window_border_width(window, 0);
        self.conn.insert_window_in_save_set(window);
        self.conn.select_client_input(window, false);
        self.conn.reparent_window(window, plate, Pos::default());
        self.conn.select_client_input(window, true);
        self.conn.ungrab_server();

        if attributes.mapped {
            client.expect_unmap();
        }

        self.position_windows(&client);
        self.grab_buttons(&client);
        self.redraw(&client);

        if self.controller.update_struts(self.conn, window) {
            self.struts_changed();
        }

        target.add(window, client.layer(), iconic);

        if fullscreen {
            self.set_fullscreen(&client, true);
        }

        let mode = client.maximized();

        if mode.is_maximized() && !client.is_fullscreen() {
            client.set_maximized(Maximize::None);
            self.maximize(&client, mode);
        }

        if iconic {
            client.set_iconic(true);
            client.set_current_state(IcccmWindowState::Iconic);
            self.set_state(&client);
        } else if target.number() == self.controller.current_index() {
            self.show(&client);
        } else {
            self.set_state(&client);
        }

        self.update_client_list();
        self.restack(self.controller.current_workspace());

        if self.wants_focus_on_map(&client) {
            if let Err(err) = self.set_input_focus(window) {
                debug!("new client {:#0x} not focused: {:?}", window, err);
            }
        }

        Some(client)
    }

    fn initial_policy(
        &self,
        client: &ManagedWindow,
    ) -> Policy {
        let window = client.window();
        let mut policy = Policy::for_type(client.window_type());

        if client.is_transient() {
            policy = policy.with_transient();
        }

        if client.size_hints().is_fixed() {
            policy = policy.with_fixed_size();
        }

        policy = policy.with_protocols(&self.conn.get_icccm_window_protocols(window));

        if let Some(motif) = self.conn.get_motif_hints(window) {
            policy = policy.with_motif(&motif);
        }

        policy
    }

    /// Transients follow their owner; otherwise a desktop index left on
    /// the window by a previous manager is honoured.
    fn initial_workspace(
        &self,
        client: &ManagedWindow,
    ) -> Option<usize> {
        match client.window_type() {
            WindowType::Desktop | WindowType::Dock => return None,
            _ => {},
        }

        if let Some(owner) = client.transient_owner().and_then(|owner| self.client(owner)) {
            return owner.workspace();
        }

        match self.conn.get_window_desktop(client.window()) {
            Some(None) => None,
            Some(Some(index)) if index < self.controller.workspace_count() => Some(index),
            _ => Some(self.controller.current_index()),
        }
    }

    fn wants_focus_on_map(
        &self,
        client: &ManagedWindow,
    ) -> bool {
        if !client.is_visible() {
            return false;
        }

        match client.window_type() {
            WindowType::Desktop | WindowType::Dock | WindowType::Splash => return false,
            _ => {},
        }

        let owner_focused = client
            .transient_owner()
            .and_then(|owner| self.client(owner))
            .map(|owner| owner.is_focused());

        if client.is_modal() && owner_focused == Some(true) {
            return true;
        }

        self.config.borrow().focus_new_windows && owner_focused.unwrap_or(true)
    }

    /// Picks a position for a new frame among the stacked windows of its
    /// workspace.
    fn place_frame(
        &self,
        client: &ManagedWindow,
        workspace: &Workspace,
    ) -> Pos {
        let config = self.config.borrow();
        let request = PlacementRequest {
            policy: config.placement,
            row_direction: config.row_direction,
            col_direction: config.col_direction,
        };

        let others: Vec<Region> = workspace
            .stack_top_first()
            .into_iter()
            .filter(|&other| other != client.window())
            .filter_map(|other| self.client(other))
            .map(|other| other.frame_region())
            .collect();

        let mut cascade = workspace.cascade();
        let pos = Placer::place(
            request,
            self.controller.available_region(),
            client.frame_region().dim,
            &others,
            &mut cascade,
        );

        if request.policy == PlacementPolicy::Cascade {
            workspace.set_cascade(cascade);
        }

        pos
    }

    /// Drops a client that failed validation before it was ever shown.
    fn discard(
        &self,
        client: &ManagedWindow,
    ) {
        if let Some(owner) = client.transient_owner().and_then(|owner| self.client(owner)) {
            owner.remove_transient(client.window());
        }

        self.registry.borrow_mut().remove(client.window());
        self.conn.destroy_window(client.frame());
    }

    /// Re-reads WM_HINTS and WM_PROTOCOLS into the focus model, urgency
    /// and window group.
    pub(super) fn update_focus_model(
        &self,
        client: &ManagedWindow,
    ) -> Option<Hints> {
        let window = client.window();
        let hints = self.conn.get_icccm_window_hints(window);
        let take_focus = self
            .conn
            .get_icccm_window_protocols(window)
            .contains(&Protocol::TakeFocus);

        client.set_take_focus(take_focus);
        client.set_focus_mode(FocusMode::from_hints(
            hints.and_then(|hints| hints.input),
            take_focus,
        ));

        if let Some(hints) = hints {
            client.set_urgent(hints.urgent);

            if hints.group != client.group() {
                let mut registry = self.registry.borrow_mut();
                registry.leave_group(window, client.group());

                if let Some(leader) = hints.group {
                    registry.join_group(window, leader);
                }

                client.set_group(hints.group);
            }
        }

        hints
    }

    /// Resolves WM_TRANSIENT_FOR into a link to another client. Links
    /// to the window itself, or that would close a cycle, are dropped.
    pub(super) fn update_transient_info(
        &self,
        client: &ManagedWindow,
    ) {
        let window = client.window();

        if let Some(owner) = client.transient_owner().and_then(|owner| self.client(owner)) {
            owner.remove_transient(window);
        }

        client.set_transient_for(TransientFor::None);

        let hint = match self.conn.get_icccm_window_transient_for(window) {
            Some(hint) => hint,
            None => return,
        };

        if hint == window {
            debug!("client {:#0x} claims to be transient for itself", window);
            return;
        }

        if hint == 0 || hint == self.conn.root() {
            client.set_transient_for(TransientFor::GroupModal);
            client.set_modal(true);
            return;
        }

        let owner = self.client(hint).map(|owner| owner.window()).or_else(|| {
            let leader = client.group().filter(|&leader| leader == hint)?;
            let registry = self.registry.borrow();

            registry
                .group(leader)?
                .members()
                .iter()
                .copied()
                .find(|&member| member != window)
        });

        let owner = match owner {
            Some(owner) => owner,
            None => return,
        };

        let limit = self.registry.borrow().len();
        let mut next = Some(owner);
        let mut steps = 0;

        while let Some(current) = next {
            if current == window {
                warn!("breaking transient cycle through {:#0x}", window);
                return;
            }

            steps += 1;

            if steps > limit {
                break;
            }

            next = self.client(current).and_then(|current| current.transient_owner());
        }

        client.set_transient_for(TransientFor::Window(owner));

        if let Some(owner) = self.client(owner) {
            owner.add_transient(window);
        }
    }

    /// Installs the passive button grabs on the plate: a click to focus
    /// or raise, and Alt drags to move and resize.
    pub(super) fn grab_buttons(
        &self,
        client: &ManagedWindow,
    ) {
        let plate = client.plate();
        self.conn.ungrab_buttons(plate);

        let config = self.config.borrow();
        let focus_model = config.focus_model;
        let click_grab = !focus_model.sloppy || focus_model.click_raise;

        for locks in lock_combinations() {
            if config.disable_bindings_with_scroll_lock && locks.contains(&Modifier::ScrollLock) {
                continue;
            }

            if click_grab {
                self.conn.grab_button(plate, Button::Left, &locks, true);
            }

            let mut alt = locks.clone();
            alt.insert(Modifier::Alt);

            if client.has_function(Functions::MOVE) {
                self.conn.grab_button(plate, Button::Left, &alt, false);
            }

            if client.has_function(Functions::RESIZE) {
                self.conn.grab_button(plate, Button::Right, &alt, false);
            }
        }
    }

    /// Stops managing a client, handing its window back to the root.
    pub fn unmanage(
        &self,
        window: Window,
        remap: bool,
    ) {
        self.release(window, if remap {
            Release::Remap
        } else {
            Release::Withdraw
        });
    }

    fn release(
        &self,
        window: Window,
        release: Release,
    ) {
        let client = client_or_return!(self, window);
        info!("releasing client {:#0x}", window);

        if self.move_buffer.window() == Some(window) || self.resize_buffer.window() == Some(window) {
            self.cancel_drag();
        }

        if let Some(id) = client.auto_raise_timer() {
            self.timers.borrow_mut().stop(id);
            client.set_auto_raise_timer(None);
        }

        let owner = client.transient_owner();
        let workspace = self.controller.workspace_of(window);
        let on_current = workspace.map_or(false, |workspace| {
            workspace.number() == self.controller.current_index()
        });

        let fallback = workspace.and_then(|workspace| {
            workspace.remove(window);
            workspace.focus_fallback(owner)
        });

        if let Some(owner) = owner.and_then(|owner| self.client(owner)) {
            owner.remove_transient(window);
        }

        for transient in client.clear_transients() {
            if let Some(transient) = self.client(transient) {
                transient.set_transient_for(TransientFor::None);
            }
        }

        let struts_changed = self.controller.remove_struts(window);

        self.registry.borrow_mut().remove(window);
        self.errors.borrow_mut().forget(
            client
                .parts()
                .iter()
                .map(|(_, part)| part)
                .chain(vec![window, client.frame(), client.plate()]),
        );

        self.restore(&client, release);
        self.conn.destroy_window(client.frame());

        if release == Release::Withdraw {
            self.clear_state(&client);
        }

        if self.focus.get() == Some(window) {
            self.focus.set(None);

            if self.running.get() {
                let refocused = on_current
                    && fallback.map_or(false, |fallback| self.set_input_focus(fallback).is_ok());

                if !refocused {
                    self.set_focused_window(None);
                }
            }
        }

        if struts_changed {
            self.struts_changed();
        }

        self.update_client_list();
        self.update_client_list_stacking();
    }

    /// Undoes the reparenting. A client that already reparented itself
    /// elsewhere is left where it is, mapped.
    fn restore(
        &self,
        client: &ManagedWindow,
        release: Release,
    ) {
        let window = client.window();
        self.conn.clear_input(client.plate());

        if release == Release::Destroyed {
            return;
        }

        self.conn.remove_window_from_save_set(window);
        self.conn.clear_input(window);

        let reparented = self.events.borrow_mut().take_first(self.conn, |event| match event {
            Event::Reparent {
                window: target,
                ..
            } => *target == window,
            _ => false,
        });

        let remap = release == Release::Remap || reparented.is_some();

        if client.is_shaded() && !client.is_iconic() {
            client.set_current_state(IcccmWindowState::Normal);
            self.set_state(client);
        }

        let client_pos = client.client_pos_from_frame(client.frame_region().pos);

        self.conn.grab_server();
        self.conn.unmap_window(client.frame());
        self.conn.unmap_window(window);
        self.conn.set_window_border_width(window, client.old_border_width());

        if reparented.is_none() {
            self.conn.reparent_window(window, self.conn.root(), client_pos);
        }

        if remap {
            self.conn.map_window(window);
        }

        self.conn.ungrab_server();

        if let Some(event) = reparented {
            self.events.borrow_mut().push_front(event);
        }
    }

    pub(super) fn handle_map_request(
        &self,
        window: Window,
        ignore: bool,
    ) {
        if ignore {
            return;
        }

        let client = match self.client(window) {
            Some(client) => client,
            None => {
                self.manage(window);
                return;
            },
        };

        if client.is_iconic() {
            self.deiconify(&client);
        } else if self.workspace_for(&client).number() == self.controller.current_index() {
            self.show(&client);
            self.raise(window);
        }
    }

    pub(super) fn handle_unmap(
        &self,
        window: Window,
        ignore: bool,
    ) {
        let client = match self.client(window) {
            Some(client) => client,
            None => return,
        };

        if ignore || client.consume_unmap_if_expecting() {
            return;
        }

        self.unmanage(window, false);
    }

    pub(super) fn handle_destroy(
        &self,
        window: Window,
    ) {
        if self.client(window).is_some() {
            self.release(window, Release::Destroyed);
        }
    }

    pub(super) fn handle_reparent(
        &self,
        window: Window,
        parent: Window,
    ) {
        let client = match self.client(window) {
            Some(client) => client,
            None => return,
        };

        if parent == client.plate() {
            return;
        }

        debug!("client {:#0x} reparented itself to {:#0x}", window, parent);

        self.events.borrow_mut().push_front(Event::Reparent {
            window,
            parent,
        });

        self.unmanage(window, true);
    }

    pub(super) fn handle_property(
        &self,
        window: Window,
        kind: PropertyKind,
        deleted: bool,
        on_root: bool,
    ) {
        if on_root {
            return;
        }

        let client = match self.client(window) {
            Some(client) => client,
            None => {
                if kind == PropertyKind::Strut {
                    self.handle_strut_request(window);
                }

                return;
            },
        };

        if deleted && kind != PropertyKind::Strut {
            return;
        }

        if !self.validate_client(&client) {
            return;
        }

        match kind {
            PropertyKind::Name => {
                client.set_name(self.conn.get_icccm_window_name(window));
                self.redraw(&client);
            },
            PropertyKind::Hints => {
                self.update_focus_model(&client);
                self.redraw(&client);
            },
            PropertyKind::NormalHints => self.update_size_hints(&client),
            PropertyKind::TransientFor => {
                self.update_transient_info(&client);

                if client.is_transient() {
                    client.update_policy(Policy::with_transient);
                    client.upsize(&self.style, self.config.borrow().border_width);
                    self.decorate(&client);
                    self.position_windows(&client);
                    self.grab_buttons(&client);
                    self.redraw(&client);
                    self.set_state(&client);
                }
            },
            PropertyKind::Protocols => {
                self.update_focus_model(&client);
                let protocols = self.conn.get_icccm_window_protocols(window);
                client.update_policy(|policy| policy.with_protocols(&protocols));
                self.decorate(&client);
                self.position_windows(&client);
                self.redraw(&client);
                self.set_state(&client);
            },
            PropertyKind::Motif => {
                if let Some(motif) = self.conn.get_motif_hints(window) {
                    client.update_policy(|policy| policy.with_motif(&motif));
                    client.upsize(&self.style, self.config.borrow().border_width);
                    self.decorate(&client);
                    self.position_windows(&client);
                    self.grab_buttons(&client);
                    self.redraw(&client);
                    self.set_state(&client);
                }
            },
            PropertyKind::Strut => self.handle_strut_request(window),
            PropertyKind::IconName | PropertyKind::Other => {},
        }
    }

    /// Re-reads WM_NORMAL_HINTS; a window that became fixed size loses
    /// its resize controls and one that stopped being fixed gets them
    /// back.
    fn update_size_hints(
        &self,
        client: &ManagedWindow,
    ) {
        let screen_dim = self.controller.full_region().dim;
        let hints = self
            .conn
            .get_icccm_window_size_hints(client.window(), screen_dim)
            .unwrap_or_else(|| SizeHints::new(screen_dim));

        let was_fixed = client.size_hints().is_fixed();
        client.set_size_hints(hints);

        if hints.is_fixed() && !was_fixed {
            client.update_policy(Policy::with_fixed_size);
        } else if !hints.is_fixed() && was_fixed {
            let transient = client.is_transient();
            client.update_policy(move |policy| policy.with_variable_size(transient));
        }

        client.upsize(&self.style, self.config.borrow().border_width);

        if !client.is_fullscreen() {
            let region = client.constrain(client.frame_region(), Corner::BottomRight);
            client.set_frame_region(region);
            client.sync_client_pos();
        }

        self.decorate(client);
        self.position_windows(client);
        self.grab_buttons(client);
        self.redraw(client);
        self.set_state(client);
    }
}

#[cfg(test)]
mod tests {
    use crate::decoration::Decorations;
    use crate::decoration::Functions;
    use crate::decoration::Part;
    use crate::mock::MockConnection;
    use crate::mock::Request;
    use crate::mock::ROOT;
    use crate::model::tests::manage;
    use crate::model::tests::map_request;
    use crate::model::tests::model;
    use crate::window::FocusMode;
    use crate::window::TransientFor;

    use winsys::connection::Connection;
    use winsys::event::Event;
    use winsys::event::PropertyKind;
    use winsys::geometry::Dim;
    use winsys::geometry::Pos;
    use winsys::geometry::Region;
    use winsys::hints::Hints;
    use winsys::hints::MotifHints;
    use winsys::hints::SizeHints;
    use winsys::window::IcccmWindowState;
    use winsys::window::Protocol;
    use winsys::window::WindowType;

    fn transient_property(window: u32) -> Event {
        Event::Property {
            window,
            kind: PropertyKind::TransientFor,
            deleted: false,
            on_root: false,
        }
    }

    #[test]
    fn manage_frames_and_reparents() {
        let conn = MockConnection::new();
        let model = model(&conn);

        conn.set_name(10, "xterm");
        let client = manage(&model, &conn, 10, Region::new(0, 0, 300, 200));

        assert_eq!(client.name(), "xterm");
        assert!(conn.requests().contains(&Request::Reparent(10, client.plate(), Pos::new(0, 0))));
        assert!(conn.requests().contains(&Request::SaveSetInsert(10)));
        assert!(conn.is_mapped(client.frame()));
        assert!(client.part_window(Part::Title).is_some());
        assert_eq!(conn.icccm_state(10), Some(IcccmWindowState::Normal));
        assert_eq!(conn.desktop(10), Some(Some(0)));
        assert_eq!(conn.client_list(), vec![10]);
        assert_eq!(model.focused_window(), Some(10));
        assert_eq!(conn.server_grab_depth(), 0);

        let title = client.part_window(Part::Title).unwrap();
        assert_eq!(model.owner(title).map(|(owner, part)| (owner.window(), part)), Some((
            10,
            Part::Title
        )));
    }

    #[test]
    fn override_redirect_and_known_windows_are_skipped() {
        let conn = MockConnection::new();
        let model = model(&conn);

        manage(&model, &conn, 10, Region::new(0, 0, 300, 200));
        conn.clear_requests();

        model.handle_event(map_request(10));
        assert_eq!(
            conn.count(|request| match request {
                Request::CreateFrame(_) => true,
                _ => false,
            }),
            0
        );

        model.handle_event(Event::MapRequest {
            window: 11,
            ignore: true,
        });
        assert!(model.client(11).is_none());
    }

    #[test]
    fn a_window_destroyed_during_manage_is_never_shown() {
        let conn = MockConnection::new();
        let model = model(&conn);

        conn.add_client(10, Region::new(0, 0, 300, 200));
        conn.push_event(Event::Destroy {
            window: 10,
        });

        assert!(model.manage(10).is_none());
        assert!(model.client(10).is_none());
        assert!(model.registry.borrow().is_empty());
        assert!(!conn.requests().iter().any(|request| match request {
            Request::Map(_) => true,
            _ => false,
        }));
        assert_eq!(model.events.borrow().len(), 1);
    }

    #[test]
    fn hints_shape_the_new_client() {
        let conn = MockConnection::new();
        let model = model(&conn);

        let screen = Dim::new(1920, 1080);
        conn.set_size_hints(
            10,
            SizeHints::new(screen)
                .with_min(Dim::new(200, 100))
                .with_max(Dim::new(200, 100)),
        );
        conn.set_hints(10, Hints::new(true, Some(false), None, None));
        conn.set_protocols(10, &[Protocol::TakeFocus]);

        let client = manage(&model, &conn, 10, Region::new(0, 0, 200, 100));

        assert!(!client.has_function(Functions::RESIZE));
        assert!(!client.has_function(Functions::MAXIMIZE));
        assert!(client.is_urgent());
        assert_eq!(client.focus_mode(), FocusMode::GloballyActive);
        assert_eq!(conn.focused(), Some(client.plate()));
        assert!(conn.requests().contains(&Request::TakeFocus(10)));
    }

    #[test]
    fn motif_hints_remove_decorations() {
        let conn = MockConnection::new();
        let model = model(&conn);

        conn.set_motif_hints(10, MotifHints {
            functions: None,
            decorations: Some(MotifHints::DECOR_BORDER),
        });

        let client = manage(&model, &conn, 10, Region::new(0, 0, 300, 200));
        assert_eq!(client.part_window(Part::Title), None);
        assert_eq!(client.part_window(Part::Handle), None);
    }

    #[test]
    fn iconic_and_remembered_desktops_are_restored() {
        let conn = MockConnection::new();
        let model = model(&conn);

        conn.set_hints(10, Hints::new(false, None, Some(IcccmWindowState::Iconic), None));
        let iconic = manage(&model, &conn, 10, Region::new(0, 0, 300, 200));

        assert!(iconic.is_iconic());
        assert!(!conn.is_mapped(iconic.frame()));
        assert!(model.controller.current_workspace().stack_top_first().is_empty());

        conn.set_window_desktop(11, Some(2));
        let elsewhere = manage(&model, &conn, 11, Region::new(0, 0, 300, 200));

        assert_eq!(elsewhere.workspace(), Some(2));
        assert!(!elsewhere.is_visible());
        assert!(model.controller.workspace(2).unwrap().contains(11));

        conn.set_window_desktop(12, None);
        let sticky = manage(&model, &conn, 12, Region::new(0, 0, 300, 200));
        assert!(sticky.is_sticky());
        assert!(sticky.is_visible());
    }

    #[test]
    fn transients_open_over_their_owner() {
        let conn = MockConnection::new();
        let model = model(&conn);

        conn.add_top_level(10, Region::new(400, 300, 600, 400));
        model.handle_event(map_request(10));
        let owner = model.client(10).unwrap();

        conn.set_transient_for(11, 10);
        let dialog = manage(&model, &conn, 11, Region::new(0, 0, 200, 100));

        assert_eq!(dialog.window_type(), WindowType::Dialog);
        assert_eq!(owner.transients(), vec![11]);
        assert_eq!(dialog.workspace(), owner.workspace());

        let owner_frame = owner.frame_region();
        let dialog_frame = dialog.frame_region();
        assert!(owner_frame.contains(dialog_frame));
    }

    #[test]
    fn transient_cycles_are_broken() {
        let conn = MockConnection::new();
        let model = model(&conn);

        manage(&model, &conn, 10, Region::new(0, 0, 300, 200));
        manage(&model, &conn, 11, Region::new(0, 0, 300, 200));
        manage(&model, &conn, 12, Region::new(0, 0, 300, 200));

        conn.set_transient_for(10, 11);
        conn.set_transient_for(11, 12);
        conn.set_transient_for(12, 10);

        for window in 10..13 {
            model.handle_event(transient_property(window));
        }

        let owner_of = |window| model.client(window).unwrap().transient_owner();

        for start in 10..13 {
            let mut seen = vec![start];
            let mut next = owner_of(start);

            while let Some(window) = next {
                assert!(!seen.contains(&window), "cycle through {:#0x}", window);
                seen.push(window);
                next = owner_of(window);
            }
        }

        assert_eq!(owner_of(10), Some(11));
        assert_eq!(owner_of(11), Some(12));
        assert_eq!(owner_of(12), None);
    }

    #[test]
    fn self_and_root_transients() {
        let conn = MockConnection::new();
        let model = model(&conn);

        conn.set_transient_for(10, 10);
        let lone = manage(&model, &conn, 10, Region::new(0, 0, 300, 200));
        assert_eq!(lone.transient_for(), TransientFor::None);

        conn.set_transient_for(11, ROOT);
        let group_modal = manage(&model, &conn, 11, Region::new(0, 0, 300, 200));
        assert_eq!(group_modal.transient_for(), TransientFor::GroupModal);
        assert!(group_modal.is_modal());
    }

    #[test]
    fn transients_resolve_through_the_group_leader() {
        let conn = MockConnection::new();
        let model = model(&conn);

        conn.set_hints(10, Hints::new(false, None, None, Some(99)));
        manage(&model, &conn, 10, Region::new(0, 0, 300, 200));

        conn.set_hints(11, Hints::new(false, None, None, Some(99)));
        conn.set_transient_for(11, 99);
        let dialog = manage(&model, &conn, 11, Region::new(0, 0, 300, 200));

        assert_eq!(dialog.transient_owner(), Some(10));
        assert_eq!(model.registry.borrow().group(99).unwrap().members(), &[10, 11]);
    }

    #[test]
    fn unmap_withdraws_and_clears_state() {
        let conn = MockConnection::new();
        let model = model(&conn);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let other = manage(&model, &conn, 11, Region::new(500, 100, 300, 200));
        assert_eq!(model.focused_window(), Some(11));

        model.handle_event(Event::Unmap {
            window: 11,
            ignore: false,
        });

        assert!(model.client(11).is_none());
        assert_eq!(conn.icccm_state(11), None);
        assert_eq!(conn.desktop(11), None);
        assert!(conn.requests().contains(&Request::Destroy(other.frame())));
        assert!(!conn.is_mapped(11));
        assert_eq!(model.focused_window(), Some(10));
        assert!(client.is_focused());
        assert_eq!(conn.client_list(), vec![10]);
    }

    #[test]
    fn expected_unmaps_are_swallowed() {
        let conn = MockConnection::new();
        conn.add_top_level(10, Region::new(100, 100, 300, 200));
        let model = model(&conn);

        model.handle_event(Event::Unmap {
            window: 10,
            ignore: false,
        });

        assert!(model.client(10).is_some());

        model.handle_event(Event::Unmap {
            window: 10,
            ignore: false,
        });

        assert!(model.client(10).is_none());
    }

    #[test]
    fn a_client_reparenting_itself_is_released_mapped() {
        let conn = MockConnection::new();
        let model = model(&conn);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        conn.clear_requests();

        model.handle_event(Event::Reparent {
            window: 10,
            parent: 77,
        });

        assert!(model.client(10).is_none());
        assert!(!conn.requests().iter().any(|request| match request {
            Request::Reparent(10, ..) => true,
            _ => false,
        }));
        assert!(conn.requests().contains(&Request::Map(10)));
        assert!(conn.requests().contains(&Request::Destroy(client.frame())));
        assert_eq!(model.events.borrow().len(), 1);
        assert_eq!(conn.server_grab_depth(), 0);
    }

    #[test]
    fn destroyed_clients_are_not_touched() {
        let conn = MockConnection::new();
        let model = model(&conn);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        conn.clear_requests();

        model.handle_event(Event::Destroy {
            window: 10,
        });

        assert!(model.client(10).is_none());
        assert_eq!(conn.requests(), vec![
            Request::ClearInput(client.plate()),
            Request::Destroy(client.frame()),
            Request::FocusRoot,
        ]);
    }

    #[test]
    fn release_restores_the_original_position() {
        let conn = MockConnection::new();
        let model = model(&conn);

        conn.add_top_level(10, Region::new(100, 100, 300, 200));
        model.handle_event(map_request(10));
        conn.clear_requests();

        model.unmanage(10, true);

        assert!(conn.requests().contains(&Request::Reparent(10, ROOT, Pos::new(100, 100))));
        assert!(conn.requests().contains(&Request::Map(10)));
        assert_eq!(conn.icccm_state(10), Some(IcccmWindowState::Normal));
    }

    #[test]
    fn size_hint_changes_toggle_the_resize_controls() {
        let conn = MockConnection::new();
        let model = model(&conn);

        let client = manage(&model, &conn, 10, Region::new(0, 0, 300, 200));
        assert!(client.has_function(Functions::RESIZE));

        let screen = Dim::new(1920, 1080);
        let property = Event::Property {
            window: 10,
            kind: PropertyKind::NormalHints,
            deleted: false,
            on_root: false,
        };

        conn.set_size_hints(
            10,
            SizeHints::new(screen)
                .with_min(Dim::new(300, 200))
                .with_max(Dim::new(300, 200)),
        );
        model.handle_event(property.clone());

        assert!(!client.has_function(Functions::RESIZE));
        assert_eq!(client.part_window(Part::LeftGrip), None);

        conn.set_size_hints(10, SizeHints::new(screen));
        model.handle_event(property);

        assert!(client.has_function(Functions::RESIZE));
        assert!(client.has_function(Functions::MAXIMIZE));
        assert!(client.has_decoration(Decorations::MAXIMIZE));
        assert!(client.part_window(Part::LeftGrip).is_some());
        assert!(client.part_window(Part::MaximizeButton).is_some());
    }

    #[test]
    fn button_grabs_follow_the_focus_model() {
        let conn = MockConnection::new();
        let model = model(&conn);

        let client = manage(&model, &conn, 10, Region::new(0, 0, 300, 200));
        let plate = client.plate();

        let grabs = |button, sync| {
            conn.count(|request| *request == Request::GrabButton(plate, button, sync))
        };

        assert_eq!(grabs(winsys::input::Button::Left, true), 0);
        assert_eq!(grabs(winsys::input::Button::Left, false), 8);
        assert_eq!(grabs(winsys::input::Button::Right, false), 8);
    }
}
