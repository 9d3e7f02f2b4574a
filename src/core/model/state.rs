use super::Geometry;
use super::Model;

use crate::decoration::Decorations;
use crate::decoration::Functions;
use crate::decoration::Policy;
use crate::decoration::RenderState;
use crate::error::OperationError;
use crate::stack::StackLayer;
use crate::window::toggled;
use crate::window::FrameLayout;
use crate::window::ManagedWindow;
use crate::window::Maximize;
use crate::window::TransientFor;
use crate::window::DECORATION_PARTS;

use winsys::event::StackMode;
use winsys::event::ToggleAction;
use winsys::geometry::Corner;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::hints::Gravity;
use winsys::hints::SizeHints;
use winsys::window::IcccmWindowState;
use winsys::window::Window;
use winsys::window::WindowState;
use winsys::window::WindowType;

impl<'a> Model<'a> {
    /// Maps the frame and client. Does nothing for a visible window.
    pub(super) fn show(
        &self,
        client: &ManagedWindow,
    ) {
        if client.is_visible() {
            return;
        }

        client.set_iconic(false);
        client.set_visible(true);
        client.set_current_state(if client.is_shaded() {
            IcccmWindowState::Iconic
        } else {
            IcccmWindowState::Normal
        });

        self.set_state(client);

        self.conn.map_window(client.window());
        self.conn.map_subwindows(client.frame());
        self.conn.map_window(client.frame());
    }

    /// Unmaps the frame and client. Does nothing for a hidden window.
    pub(super) fn hide(
        &self,
        client: &ManagedWindow,
    ) {
        if !client.is_visible() {
            return;
        }

        client.set_visible(false);

        if client.is_iconic() {
            client.set_current_state(IcccmWindowState::Iconic);
        }

        self.set_state(client);
        self.conn.unmap_window(client.frame());

        // no unmap notification may reach us for our own unmap
        self.conn.grab_server();
        self.conn.select_client_input(client.window(), false);
        self.conn.unmap_window(client.window());
        self.conn.select_client_input(client.window(), true);
        self.conn.ungrab_server();
    }

    /// Iconifies a window together with its transients, provided the
    /// window allows it.
    pub(super) fn iconify(
        &self,
        client: &ManagedWindow,
    ) -> Result<(), OperationError> {
        if !client.has_function(Functions::ICONIFY) {
            return Err(OperationError::NotPermitted);
        }

        if client.is_iconic() {
            return Err(OperationError::StateUnchanged);
        }

        self.iconify_family(client);
        Ok(())
    }

    /// A transient takes its owner down with it.
    fn iconify_family(
        &self,
        client: &ManagedWindow,
    ) {
        if client.is_iconic() {
            return;
        }

        if let Some(owner) = client.transient_owner().and_then(|owner| self.client(owner)) {
            if !owner.is_iconic() {
                self.iconify_family(&owner);
                return;
            }
        }

        debug!("iconifying client {:#0x}", client.window());

        let window = client.window();
        let was_focused = client.is_focused();

        client.set_iconic(true);
        self.hide(client);
        client.set_current_state(IcccmWindowState::Iconic);
        self.set_state(client);

        let workspace = self.controller.workspace_of(window);

        if let Some(workspace) = workspace {
            workspace.unstack_window(window);
        }

        for transient in client.transients() {
            if let Some(transient) = self.client(transient) {
                self.iconify_family(&transient);
            }
        }

        if was_focused {
            let fallback = workspace
                .and_then(|workspace| workspace.focus_fallback(client.transient_owner()));

            match fallback {
                Some(fallback) if self.set_input_focus(fallback).is_ok() => {},
                _ => self.set_focused_window(None),
            }
        }

        self.update_client_list_stacking();
    }

    pub(super) fn deiconify(
        &self,
        client: &ManagedWindow,
    ) {
        let window = client.window();
        let workspace = self.workspace_for(client);

        if client.is_iconic() {
            debug!("deiconifying client {:#0x}", window);
            workspace.stack_window(window, self.stack_layer(client));
        }

        if workspace.number() == self.controller.current_index() {
            self.show(client);
        } else {
            client.set_iconic(false);
            client.set_current_state(IcccmWindowState::Normal);
            self.set_state(client);
        }

        for transient in client.transients() {
            if let Some(transient) = self.client(transient) {
                if transient.is_iconic() {
                    self.deiconify(&transient);
                }
            }
        }

        self.restack(workspace);
    }

    /// The layer a window is stacked in right now.
    fn stack_layer(
        &self,
        client: &ManagedWindow,
    ) -> StackLayer {
        if client.is_fullscreen() {
            StackLayer::Fullscreen
        } else {
            client.layer()
        }
    }

    pub(super) fn set_layer(
        &self,
        client: &ManagedWindow,
        layer: StackLayer,
    ) {
        client.set_layer(layer);

        if client.is_fullscreen() {
            return;
        }

        if let Some(workspace) = self.controller.workspace_of(client.window()) {
            if workspace.set_layer(client.window(), layer) {
                self.restack(workspace);
            }
        }
    }

    /// The frame rectangle a maximize mode currently asks for.
    fn maximized_frame(
        &self,
        client: &ManagedWindow,
        mode: Maximize,
    ) -> Region {
        let avail = if self.config.borrow().full_maximization {
            self.controller.full_region()
        } else {
            self.controller.available_region()
        };

        let region = ManagedWindow::maximized_region(mode, avail, client.premax_region());
        client.constrain(region, Corner::BottomRight)
    }

    /// Switches to `mode`; `Maximize::None` restores the geometry saved
    /// when the window was first maximized.
    pub(super) fn maximize(
        &self,
        client: &ManagedWindow,
        mode: Maximize,
    ) {
        let current = client.maximized();

        if mode == current {
            return;
        }

        if !current.is_maximized() && !client.is_fullscreen() {
            let mut premax = client.frame_region();

            if client.is_shaded() {
                premax.dim.h = client.client_region().dim.h + client.margin().vertical();
            }

            client.set_premax_region(premax);
        }

        client.set_maximized(mode);

        if client.is_fullscreen() {
            self.set_state(client);
            return;
        }

        debug!("maximizing client {:#0x} as {:?}", client.window(), mode);

        if client.is_shaded() {
            client.set_shaded(false);
        }

        if mode.is_maximized() {
            self.configure(client, self.maximized_frame(client, mode));
            self.raise(client.window());
        } else {
            self.configure(client, client.premax_region());
        }

        self.redraw(client);
        self.set_state(client);
    }

    /// What a click on the maximize button does.
    pub(super) fn toggle_maximize(
        &self,
        client: &ManagedWindow,
        mode: Maximize,
    ) {
        if client.maximized().is_maximized() {
            self.maximize(client, Maximize::None);
        } else {
            self.maximize(client, mode);
        }
    }

    /// Refits a maximized window to the current available area.
    pub(super) fn remaximize(
        &self,
        client: &ManagedWindow,
    ) {
        let mode = client.maximized();

        if !mode.is_maximized() || client.is_fullscreen() || client.is_shaded() {
            return;
        }

        self.configure(client, self.maximized_frame(client, mode));
    }

    pub(super) fn set_shaded(
        &self,
        client: &ManagedWindow,
        shaded: bool,
    ) -> Result<(), OperationError> {
        if !client.has_decoration(Decorations::TITLEBAR) {
            return Err(OperationError::NotPermitted);
        }

        if client.is_shaded() == shaded {
            return Err(OperationError::StateUnchanged);
        }

        client.set_shaded(shaded);
        let mut region = client.frame_region();

        if shaded {
            region.dim.h = self.style.title_height + 2 * client.border_width() as i32;
            client.set_frame_region(region);
            client.set_current_state(IcccmWindowState::Iconic);
        } else {
            if client.maximized().is_maximized() {
                region = self.maximized_frame(client, client.maximized());
            } else {
                region.dim.h = client.client_region().dim.h + client.margin().vertical();
            }

            client.set_frame_region(region);
            client.set_current_state(IcccmWindowState::Normal);
        }

        self.position_windows(client);
        self.redraw(client);
        self.set_state(client);

        Ok(())
    }

    pub(super) fn set_fullscreen(
        &self,
        client: &ManagedWindow,
        fullscreen: bool,
    ) {
        if client.is_fullscreen() == fullscreen {
            return;
        }

        let window = client.window();
        let border_width = self.config.borrow().border_width;
        let workspace = self.controller.workspace_of(window);

        if fullscreen {
            debug!("client {:#0x} enters fullscreen", window);

            if !client.maximized().is_maximized() {
                client.set_premax_region(client.frame_region());
            }

            if client.is_shaded() {
                client.set_shaded(false);
            }

            client.set_fullscreen(true);
            client.override_policy(client.normal_policy().fullscreen());
            client.upsize(&self.style, border_width);
            self.decorate(client);

            if let Some(workspace) = workspace {
                workspace.set_layer(window, StackLayer::Fullscreen);
            }

            self.configure(client, self.controller.full_region());
            self.raise(window);
        } else {
            debug!("client {:#0x} leaves fullscreen", window);

            client.set_fullscreen(false);
            client.set_policy(client.normal_policy());
            client.upsize(&self.style, border_width);
            self.decorate(client);

            if let Some(workspace) = workspace {
                workspace.set_layer(window, client.layer());
                self.restack(workspace);
            }

            if client.maximized().is_maximized() {
                self.configure(client, self.maximized_frame(client, client.maximized()));
            } else {
                self.configure(client, client.premax_region());
            }
        }

        self.position_windows(client);
        self.grab_buttons(client);
        self.redraw(client);
        self.set_state(client);
    }

    /// Moves and resizes the frame. A move that leaves the size alone is
    /// reported to the client with a synthetic configure notification.
    pub(super) fn configure(
        &self,
        client: &ManagedWindow,
        region: Region,
    ) {
        let previous = client.frame_region();

        if client.set_frame_region(region) {
            client.sync_client_pos();
            self.decorate(client);
            self.position_windows(client);
            self.redraw(client);
            return;
        }

        client.sync_client_pos();

        if previous.pos == region.pos {
            return;
        }

        self.conn.move_window(client.frame(), region.pos);

        if !client.is_moving() {
            self.send_configure_notify(client);
        }
    }

    pub(super) fn send_configure_notify(
        &self,
        client: &ManagedWindow,
    ) {
        self.conn
            .send_configure_notify(client.window(), client.client_region(), 0, client.frame());
    }

    /// Creates the decoration subwindows the current policy calls for
    /// and destroys the rest.
    pub(super) fn decorate(
        &self,
        client: &ManagedWindow,
    ) {
        let layout = client.layout(&self.style);

        for &part in DECORATION_PARTS.iter() {
            if client.part_window(part).is_some() {
                continue;
            }

            let (region, parent) = match (
                layout.get(part),
                client.part_window(FrameLayout::parent_part(part)),
            ) {
                (Some(region), Some(parent)) => (region, parent),
                _ => continue,
            };

            match self.conn.create_subwindow(parent, region) {
                Ok(subwindow) => {
                    client.set_part_window(part, Some(subwindow));
                    self.registry
                        .borrow_mut()
                        .register_part(client.window(), part, subwindow);
                    self.conn.map_window(subwindow);
                },
                Err(err) => warn!("could not create {:?} for {:#0x}: {}", part, client.window(), err),
            }
        }

        for &part in DECORATION_PARTS.iter().rev() {
            if layout.get(part).is_some() {
                continue;
            }

            if let Some(subwindow) = client.part_window(part) {
                self.registry.borrow_mut().unregister_part(subwindow);
                client.set_part_window(part, None);
                self.conn.destroy_window(subwindow);
            }
        }
    }

    pub(super) fn position_windows(
        &self,
        client: &ManagedWindow,
    ) {
        let layout = client.layout(&self.style);

        self.conn.place_window(client.frame(), &layout.frame);
        self.conn.set_window_border_width(client.frame(), layout.frame_border);
        self.conn.place_window(client.plate(), &layout.plate);
        self.conn.set_window_border_width(client.plate(), layout.plate_border);
        self.conn.place_window(client.window(), &layout.client);

        for (part, subwindow) in client.parts().iter() {
            if let Some(region) = layout.get(part) {
                self.conn.place_window(subwindow, &region);
                self.conn.set_window_border_width(subwindow, layout.part_border);
            }
        }

        self.conn.set_window_frame_extents(client.window(), client.frame_extents());
    }

    pub(super) fn redraw(
        &self,
        client: &ManagedWindow,
    ) {
        let state = client.render_state();
        let layout = client.layout(&self.style);

        self.conn
            .set_window_border_color(client.frame(), self.renderer.border_color(state));

        for (part, subwindow) in client.parts().iter() {
            let region = match layout.get(part) {
                Some(region) => region,
                None => continue,
            };

            let state = if client.pressed() == Some(part) {
                RenderState::Pressed
            } else {
                state
            };

            self.renderer.render(
                self.conn,
                subwindow,
                part,
                Region {
                    pos: Pos::default(),
                    dim: region.dim,
                },
                state,
            );
        }
    }

    /// Writes the window's state properties.
    pub(super) fn set_state(
        &self,
        client: &ManagedWindow,
    ) {
        let window = client.window();

        self.conn.set_icccm_window_state(window, client.current_state());
        self.conn.set_window_desktop(window, client.workspace());
        self.conn.set_window_states(window, &client.net_states());
        self.conn.set_allowed_actions(window, &client.allowed_actions());
    }

    pub(super) fn clear_state(
        &self,
        client: &ManagedWindow,
    ) {
        self.conn.delete_icccm_window_state(client.window());
        self.conn.clear_window_properties(client.window());
    }

    pub(super) fn close(
        &self,
        client: &ManagedWindow,
    ) -> Result<(), OperationError> {
        if !client.has_function(Functions::CLOSE) {
            return Err(OperationError::NotPermitted);
        }

        debug!("closing client {:#0x}", client.window());
        self.conn.close_window(client.window());
        Ok(())
    }

    pub(super) fn handle_change_state_request(
        &self,
        window: Window,
        state: IcccmWindowState,
    ) {
        let client = client_or_return!(self, window);

        match state {
            IcccmWindowState::Iconic => {
                if let Err(err) = self.iconify(&client) {
                    debug!("iconify request for {:#0x} refused: {:?}", window, err);
                }
            },
            IcccmWindowState::Normal if client.is_iconic() => self.deiconify(&client),
            _ => {},
        }
    }

    pub(super) fn handle_state_request(
        &self,
        window: Window,
        action: ToggleAction,
        states: [Option<WindowState>; 2],
    ) {
        let client = client_or_return!(self, window);
        let named = |state: WindowState| states.iter().any(|&named| named == Some(state));

        if let Some(mode) = client.maximized().from_request(
            action,
            named(WindowState::MaximizedVert),
            named(WindowState::MaximizedHorz),
        ) {
            if client.has_function(Functions::MAXIMIZE) {
                self.maximize(&client, mode);
            }
        }

        if let Some(skip) = client.skip().from_request(
            action,
            named(WindowState::SkipTaskbar),
            named(WindowState::SkipPager),
        ) {
            client.set_skip(skip);
        }

        for &state in states.iter().flatten() {
            match state {
                WindowState::Shaded => {
                    let shaded = toggled(action, client.is_shaded());

                    if let Err(err) = self.set_shaded(&client, shaded) {
                        debug!("shade request for {:#0x} refused: {:?}", window, err);
                    }
                },
                WindowState::Fullscreen => {
                    self.set_fullscreen(&client, toggled(action, client.is_fullscreen()))
                },
                WindowState::Above => {
                    let above = toggled(action, client.layer() == StackLayer::Above);
                    self.set_layer(&client, if above {
                        StackLayer::Above
                    } else {
                        StackLayer::Normal
                    });
                },
                WindowState::Below => {
                    let below = toggled(action, client.layer() == StackLayer::Below);
                    self.set_layer(&client, if below {
                        StackLayer::Below
                    } else {
                        StackLayer::Normal
                    });
                },
                // owned by the window manager; clients use WM_CHANGE_STATE
                WindowState::Hidden => {},
                WindowState::Modal => {
                    if client.is_transient() {
                        client.set_modal(toggled(action, client.is_modal()));
                    }
                },
                WindowState::Sticky => {
                    let sticky = toggled(action, client.is_sticky());
                    let desktop = if sticky {
                        None
                    } else {
                        Some(self.controller.current_index())
                    };

                    self.send_to_workspace(window, desktop);
                },
                _ => {},
            }
        }

        self.set_state(&client);
    }

    /// Applies a client rectangle asked for by a client, honouring its
    /// gravity for the position.
    fn apply_client_request(
        &self,
        client: &ManagedWindow,
        geometry: Geometry,
    ) {
        let current = client.client_region();
        let dim = client.frame_region().dim;

        let pos = if geometry.moves() {
            client.frame_pos_from_client(Pos::new(
                geometry.x.unwrap_or(current.pos.x),
                geometry.y.unwrap_or(current.pos.y),
            ))
        } else {
            client.frame_region().pos
        };

        let dim = if geometry.resizes() && !client.is_shaded() {
            let mut client_dim = current.dim;
            client_dim.w = geometry.w.unwrap_or(client_dim.w);
            client_dim.h = geometry.h.unwrap_or(client_dim.h);
            client_dim + client.margin()
        } else {
            dim
        };

        let region = client.constrain(
            Region {
                pos,
                dim,
            },
            Corner::BottomRight,
        );

        self.configure(client, region);
    }

    pub(super) fn handle_configure_request(
        &self,
        window: Window,
        geometry: Geometry,
        border_width: Option<u32>,
        stack_mode: Option<StackMode>,
    ) {
        let client = match self.client(window) {
            Some(client) => client,
            None => {
                self.configure_unmanaged(window, geometry);
                return;
            },
        };

        if client.is_iconic() {
            return;
        }

        if let Some(border_width) = border_width {
            client.set_old_border_width(border_width);
        }

        if geometry.moves() || geometry.resizes() {
            self.apply_client_request(&client, geometry);
        }

        match stack_mode {
            Some(StackMode::Below) | Some(StackMode::BottomIf) => self.lower(window),
            Some(_) => self.raise(window),
            None => {},
        }
    }

    /// Unmanaged windows get exactly what they ask for.
    fn configure_unmanaged(
        &self,
        window: Window,
        geometry: Geometry,
    ) {
        let attributes = match self.conn.get_window_attributes(window) {
            Some(attributes) => attributes,
            None => return,
        };

        let current = attributes.region;

        self.conn.place_window(
            window,
            &Region::new(
                geometry.x.unwrap_or(current.pos.x),
                geometry.y.unwrap_or(current.pos.y),
                geometry.w.unwrap_or(current.dim.w),
                geometry.h.unwrap_or(current.dim.h),
            ),
        );
    }

    pub(super) fn handle_move_resize_request(
        &self,
        window: Window,
        gravity: Option<Gravity>,
        geometry: Geometry,
    ) {
        let client = client_or_return!(self, window);

        if client.is_iconic() || client.is_fullscreen() {
            return;
        }

        client.set_gravity_override(gravity);
        self.apply_client_request(&client, geometry);
        client.set_gravity_override(None);
    }

    pub(super) fn handle_focus_request(
        &self,
        window: Window,
        on_root: bool,
    ) {
        if on_root {
            return;
        }

        let client = client_or_return!(self, window);

        if let Some(index) = client.workspace() {
            if index != self.controller.current_index() {
                self.activate_workspace(index);
            }
        }

        if client.is_iconic() {
            self.deiconify(&client);
        }

        if client.is_shaded() {
            let _ = self.set_shaded(&client, false);
        }

        if let Err(err) = self.set_input_focus(window) {
            debug!("activation of {:#0x} refused: {:?}", window, err);
        }

        self.raise(window);
    }

    pub(super) fn handle_close_request(
        &self,
        window: Window,
        on_root: bool,
    ) {
        if on_root {
            return;
        }

        let client = client_or_return!(self, window);

        if let Err(err) = self.close(&client) {
            debug!("close of {:#0x} refused: {:?}", window, err);
        }
    }

    /// Answers with the extents the window would get if it were framed
    /// right now.
    pub(super) fn handle_frame_extents_request(
        &self,
        window: Window,
        on_root: bool,
    ) {
        if on_root {
            return;
        }

        if let Some(client) = self.client(window) {
            self.conn.set_window_frame_extents(window, client.frame_extents());
            return;
        }

        let attributes = match self.conn.get_window_attributes(window) {
            Some(attributes) => attributes,
            None => return,
        };

        let screen_dim = self.controller.full_region().dim;
        let estimate = ManagedWindow::new(
            window,
            window,
            window,
            attributes.region,
            attributes.border_width,
            SizeHints::new(screen_dim),
        );

        let window_type = self
            .conn
            .get_window_types(window)
            .first()
            .copied()
            .unwrap_or(WindowType::Normal);

        let mut policy = Policy::for_type(window_type);

        if let Some(owner) = self.conn.get_icccm_window_transient_for(window) {
            estimate.set_transient_for(TransientFor::Window(owner));
            policy = policy.with_transient();
        }

        if let Some(motif) = self.conn.get_motif_hints(window) {
            policy = policy.with_motif(&motif);
        }

        estimate.set_policy(policy);
        estimate.upsize(&self.style, self.config.borrow().border_width);

        self.conn.set_window_frame_extents(window, estimate.frame_extents());
    }
}
