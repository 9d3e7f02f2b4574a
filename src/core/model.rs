use crate::config::Config;
use crate::controller::ScreenController;
use crate::decoration::ColorScheme;
use crate::decoration::Part;
use crate::decoration::Renderer;
use crate::decoration::SolidRenderer;
use crate::decoration::Style;
use crate::dispatch::EventQueue;
use crate::error::ErrorTracker;
use crate::error::OperationError;
use crate::registry::Registry;
use crate::signal;
use crate::signal::SignalAction;
use crate::timer::TimerKind;
use crate::timer::TimerQueue;
use crate::window::ManagedWindow;
use crate::workspace::Buffer;
use crate::workspace::BufferKind;
use crate::workspace::Workspace;

use winsys::connection::Connection;
use winsys::event::Event;
use winsys::event::NotifyDetail;
use winsys::event::NotifyMode;
use winsys::geometry::Region;
use winsys::input::Timestamp;
use winsys::window::IcccmWindowState;
use winsys::window::Window;

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

mod drag;
mod manage;
mod state;

/// The optional position and size fields of a configure or move-resize
/// request.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Geometry {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub w: Option<i32>,
    pub h: Option<i32>,
}

impl Geometry {
    #[inline]
    pub fn moves(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    #[inline]
    pub fn resizes(&self) -> bool {
        self.w.is_some() || self.h.is_some()
    }
}

pub struct Model<'a> {
    conn: &'a dyn Connection,
    config: RefCell<Config>,
    loader: Box<dyn Fn() -> Config + 'a>,
    style: Style,
    renderer: Box<dyn Renderer + 'a>,
    registry: RefCell<Registry>,
    controller: ScreenController,
    events: RefCell<EventQueue>,
    timers: RefCell<TimerQueue>,
    errors: RefCell<ErrorTracker>,
    move_buffer: Buffer,
    resize_buffer: Buffer,
    focus: Cell<Option<Window>>,
    last_time: Cell<Timestamp>,
    running: Cell<bool>,
}

impl<'a> Model<'a> {
    pub fn new(
        conn: &'a dyn Connection,
        loader: impl Fn() -> Config + 'a,
    ) -> Self {
        let config = loader();
        let controller = ScreenController::new(conn.screen(), &config);

        Self::init(Self {
            conn,
            config: RefCell::new(config),
            loader: Box::new(loader),
            style: Style::DEFAULT,
            renderer: Box::new(SolidRenderer::new(ColorScheme::DEFAULT)),
            registry: RefCell::new(Registry::new()),
            controller,
            events: RefCell::new(EventQueue::new()),
            timers: RefCell::new(TimerQueue::new()),
            errors: RefCell::new(ErrorTracker::new()),
            move_buffer: Buffer::new(BufferKind::Move),
            resize_buffer: Buffer::new(BufferKind::Resize),
            focus: Cell::new(None),
            last_time: Cell::new(0),
            running: Cell::new(true),
        })
    }

    fn init(model: Self) -> Self {
        info!("initializing window manager");

        let names = model.controller.workspace_names();
        model.conn.init_wm_properties(
            WM_NAME!(),
            &names.iter().map(String::as_str).collect::<Vec<&str>>(),
        );

        model.controller.publish_desktops(model.conn);
        model.controller.publish_current(model.conn);
        model.controller.publish_workarea(model.conn);

        for window in model.conn.top_level_windows() {
            let attributes = match model.conn.get_window_attributes(window) {
                Some(attributes) => attributes,
                None => continue,
            };

            if attributes.override_redirect {
                continue;
            }

            if attributes.mapped
                || model.conn.get_icccm_window_state(window) == Some(IcccmWindowState::Iconic)
            {
                model.manage(window);
            }
        }

        info!("managing {} existing clients", model.registry.borrow().len());

        model.update_client_list();
        model.restack(model.controller.current_workspace());

        if model.focus.get().is_none() {
            model.conn.set_active_window(None);
        }

        model
    }

    pub fn run(&self) {
        while self.running.get() {
            self.handle_signals();

            if self.dispatch_one() || self.fire_timers() {
                self.conn.flush();
                continue;
            }

            self.conn.flush();

            let timeout = self.timers.borrow_mut().timeout(Instant::now());
            self.conn.wait_for_input(timeout);
        }

        self.shutdown();
    }

    /// Routes the oldest queued event, if there is one.
    fn dispatch_one(&self) -> bool {
        self.events.borrow_mut().fill(self.conn);
        let event = self.events.borrow_mut().pop();

        match event {
            Some(event) => {
                self.handle_event(event);
                true
            },
            None => false,
        }
    }

    fn fire_timers(&self) -> bool {
        let expired = self.timers.borrow_mut().expire(Instant::now());
        let fired = !expired.is_empty();

        for kind in expired {
            self.handle_timer(kind);
        }

        fired
    }

    fn handle_timer(
        &self,
        kind: TimerKind,
    ) {
        match kind {
            TimerKind::AutoRaise(window) => {
                let client = client_or_return!(self, window);
                client.set_auto_raise_timer(None);
                self.raise(window);
            },
        }
    }

    fn handle_signals(&self) {
        if !signal::pending() {
            return;
        }

        for action in signal::drain() {
            debug!("handling signal action {:?}", action);

            match action {
                SignalAction::Shutdown => self.exit(),
                SignalAction::Reconfigure => self.reconfigure(),
                SignalAction::Reload => self.reload(),
                SignalAction::ReapChildren => signal::reap_children(),
                SignalAction::Ignore => {},
            }
        }
    }

    fn handle_event(
        &self,
        event: Event,
    ) {
        trace!("received event: {:?}", event);

        let admitted = {
            let registry = self.registry.borrow();
            self.errors
                .borrow_mut()
                .admits(&event, |window| registry.route(window).map(|(client, _)| client))
        };

        if !admitted {
            debug!("dropping event for flagged window: {:?}", event);
            return;
        }

        match event {
            Event::Mouse {
                event,
            } => self.handle_mouse(event),
            Event::MapRequest {
                window,
                ignore,
            } => self.handle_map_request(window, ignore),
            Event::Map {
                ..
            } => {},
            Event::Enter {
                window,
                mode,
                detail,
                ..
            } => self.handle_enter(window, mode, detail),
            Event::Leave {
                window,
                ..
            } => self.handle_leave(window),
            Event::FocusIn {
                window,
                detail,
                ..
            } => {
                self.handle_focus_in(window, detail);
            },
            Event::FocusOut {
                window,
                mode,
                detail,
            } => self.handle_focus_out(window, mode, detail),
            Event::Destroy {
                window,
            } => self.handle_destroy(window),
            Event::Unmap {
                window,
                ignore,
            } => self.handle_unmap(window, ignore),
            Event::Reparent {
                window,
                parent,
            } => self.handle_reparent(window, parent),
            Event::Expose {
                window,
                region,
                count,
            } => self.handle_expose(window, region, count),
            Event::ConfigureRequest {
                window,
                x,
                y,
                w,
                h,
                border_width,
                stack_mode,
                ..
            } => self.handle_configure_request(
                window,
                Geometry {
                    x,
                    y,
                    w,
                    h,
                },
                border_width,
                stack_mode,
            ),
            Event::Configure {
                window,
                region,
                on_root,
            } => self.handle_configure(window, region, on_root),
            Event::Property {
                window,
                kind,
                deleted,
                on_root,
            } => self.handle_property(window, kind, deleted, on_root),
            Event::ChangeStateRequest {
                window,
                state,
            } => self.handle_change_state_request(window, state),
            Event::StateRequest {
                window,
                action,
                states,
            } => self.handle_state_request(window, action, states),
            Event::FocusRequest {
                window,
                on_root,
            } => self.handle_focus_request(window, on_root),
            Event::CloseRequest {
                window,
                on_root,
            } => self.handle_close_request(window, on_root),
            Event::DesktopRequest {
                window,
                desktop,
            } => self.send_to_workspace(window, desktop),
            Event::WorkspaceRequest {
                index,
            } => self.activate_workspace(index),
            Event::MoveResizeRequest {
                window,
                gravity,
                x,
                y,
                w,
                h,
            } => self.handle_move_resize_request(
                window,
                gravity,
                Geometry {
                    x,
                    y,
                    w,
                    h,
                },
            ),
            Event::StrutRequest {
                window,
            } => self.handle_strut_request(window),
            Event::FrameExtentsRequest {
                window,
                on_root,
            } => self.handle_frame_extents_request(window, on_root),
            Event::ScreenChange => self.handle_screen_change(),
            Event::ProtocolError {
                resource,
                kind,
            } => {
                self.errors.borrow_mut().record(resource, kind);
            },
        }
    }

    #[inline]
    fn client(
        &self,
        window: Window,
    ) -> Option<Rc<ManagedWindow>> {
        self.registry.borrow().get(window)
    }

    /// The client owning any of its frame windows, with the part hit.
    #[inline]
    fn owner(
        &self,
        window: Window,
    ) -> Option<(Rc<ManagedWindow>, Part)> {
        let registry = self.registry.borrow();

        registry
            .route(window)
            .and_then(|(client, part)| registry.get(client).map(|client| (client, part)))
    }

    fn clients(&self) -> Vec<Rc<ManagedWindow>> {
        self.registry.borrow().clients()
    }

    #[inline]
    pub fn focused_window(&self) -> Option<Window> {
        self.focus.get()
    }

    #[inline]
    pub fn controller(&self) -> &ScreenController {
        &self.controller
    }

    /// Syncs with the server and looks for a queued destroy or unmap of
    /// the client. A client with one pending is stale; the event is put
    /// back so it still gets handled.
    fn validate_client(
        &self,
        client: &ManagedWindow,
    ) -> bool {
        let window = client.window();
        self.conn.sync();

        let mut events = self.events.borrow_mut();
        let pending = events.take_first(self.conn, |event| match event {
            Event::Destroy {
                window: target,
            } => *target == window,
            Event::Unmap {
                window: target,
                ignore,
            } => *target == window && !ignore,
            _ => false,
        });

        match pending {
            Some(event) => {
                events.push_front(event);
                false
            },
            None => true,
        }
    }

    /// Hands input focus to a client following its focus model. A modal
    /// transient of the client takes the focus in its place.
    pub fn set_input_focus(
        &self,
        window: Window,
    ) -> Result<(), OperationError> {
        let client = self.client(window).ok_or(OperationError::StaleWindow)?;

        if !client.is_visible() {
            return Err(OperationError::NotPermitted);
        }

        if client.is_focused() {
            return Ok(());
        }

        if !self.validate_client(&client) {
            return Err(OperationError::StaleWindow);
        }

        let screen = self.controller.full_region();

        if !client.frame_region().intersects(screen) {
            let centered = screen.from_absolute_inner_center(client.frame_region().dim);
            self.configure(&client, centered);
        }

        let modal = client
            .transients()
            .into_iter()
            .filter_map(|transient| self.client(transient))
            .find(|transient| transient.is_modal() && transient.is_visible());

        if let Some(modal) = modal {
            return self.set_input_focus(modal.window());
        }

        if client.focus_mode().accepts_input() {
            self.conn.focus_window(client.window());
        } else {
            self.conn.focus_window(client.plate());
        }

        if client.sends_take_focus() {
            self.conn.send_take_focus(client.window(), self.last_time.get());
        }

        self.set_focused_window(Some(window));
        Ok(())
    }

    /// Updates the focus bookkeeping; `None`, or an iconic window, hands
    /// the focus back to the pointer root.
    pub fn set_focused_window(
        &self,
        window: Option<Window>,
    ) {
        if self.focus.get() == window && window.is_some() {
            return;
        }

        if let Some(previous) = self.focus.get().and_then(|previous| self.client(previous)) {
            previous.set_focused(false);
            self.redraw(&previous);

            if let Some(workspace) = self.controller.workspace_of(previous.window()) {
                if workspace.focused() == Some(previous.window()) {
                    workspace.set_focused(None);
                }
            }
        }

        match window
            .and_then(|window| self.client(window))
            .filter(|client| !client.is_iconic())
        {
            Some(client) => {
                client.set_focused(true);
                self.redraw(&client);

                if let Some(workspace) = self.controller.workspace_of(client.window()) {
                    workspace.set_focused(Some(client.window()));
                }

                self.focus.set(Some(client.window()));
                self.conn.set_active_window(Some(client.window()));
            },
            None => {
                self.focus.set(None);
                self.conn.focus_pointer_root();
                self.conn.set_active_window(None);
            },
        }
    }

    /// Returns whether the focus moved to a known window.
    fn handle_focus_in(
        &self,
        window: Window,
        detail: NotifyDetail,
    ) -> bool {
        if detail != NotifyDetail::Nonlinear {
            return false;
        }

        let client = match self.owner(window) {
            Some((client, _)) => client,
            None => return false,
        };

        if !client.is_focused() {
            self.set_focused_window(Some(client.window()));
        }

        true
    }

    fn handle_focus_out(
        &self,
        window: Window,
        mode: NotifyMode,
        detail: NotifyDetail,
    ) {
        if detail != NotifyDetail::Nonlinear {
            return;
        }

        if !self.owner(window).map_or(false, |(client, _)| client.is_focused()) {
            return;
        }

        let mut check = mode != NotifyMode::Grab;

        let focus_in = self.events.borrow_mut().take_first(self.conn, |event| match event {
            Event::FocusIn {
                ..
            } => true,
            _ => false,
        });

        if let Some(Event::FocusIn {
            window,
            detail,
            ..
        }) = focus_in
        {
            if self.handle_focus_in(window, detail) {
                check = false;
            }
        }

        if check {
            match self
                .conn
                .get_focused_window()
                .and_then(|focused| self.owner(focused))
            {
                Some((client, _)) => self.set_focused_window(Some(client.window())),
                None => self.set_focused_window(None),
            }
        }
    }

    /// The root of a client's transient chain followed by every transient
    /// hanging off it, depth first.
    fn transient_chain(
        &self,
        client: &ManagedWindow,
    ) -> Vec<Window> {
        let mut root = client.window();
        let mut visited = vec![root];

        while let Some(owner) = self.client(root).and_then(|client| client.transient_owner()) {
            if visited.contains(&owner) {
                break;
            }

            visited.push(owner);
            root = owner;
        }

        let mut chain = Vec::with_capacity(visited.len());
        self.collect_transients(root, &mut chain);
        chain
    }

    fn collect_transients(
        &self,
        window: Window,
        chain: &mut Vec<Window>,
    ) {
        if chain.contains(&window) {
            return;
        }

        chain.push(window);

        if let Some(client) = self.client(window) {
            for transient in client.transients() {
                self.collect_transients(transient, chain);
            }
        }
    }

    /// Raises a window together with its whole transient chain.
    pub fn raise(
        &self,
        window: Window,
    ) {
        let client = client_or_return!(self, window);

        if let Some(workspace) = self.controller.workspace_of(window) {
            workspace.raise(&self.transient_chain(&client));
            self.restack(workspace);
        }
    }

    pub fn lower(
        &self,
        window: Window,
    ) {
        let client = client_or_return!(self, window);

        if let Some(workspace) = self.controller.workspace_of(window) {
            let mut chain = self.transient_chain(&client);
            chain.reverse();

            workspace.lower(&chain);
            self.restack(workspace);
        }
    }

    /// Pushes a workspace's stacking order to the server. Only the
    /// current workspace has mapped frames.
    fn restack(
        &self,
        workspace: &Workspace,
    ) {
        if workspace.number() != self.controller.current_index() {
            return;
        }

        let frames: Vec<Window> = workspace
            .stack_top_first()
            .into_iter()
            .filter_map(|window| self.client(window))
            .map(|client| client.frame())
            .collect();

        if let Some(&top) = frames.first() {
            self.conn.raise_window(top);
            self.conn.restack_windows(&frames);
        }

        self.update_client_list_stacking();
    }

    fn update_client_list(&self) {
        let windows = self.registry.borrow().windows();
        self.conn.update_client_list(&windows);
    }

    fn update_client_list_stacking(&self) {
        let stacking = self.controller.current_workspace().stack_bottom_first();
        self.conn.update_client_list_stacking(&stacking);
    }

    /// The workspace a client lives on; sticky windows live on the
    /// current one.
    fn workspace_for(
        &self,
        client: &ManagedWindow,
    ) -> &Workspace {
        client
            .workspace()
            .and_then(|index| self.controller.workspace(index))
            .unwrap_or_else(|| self.controller.current_workspace())
    }

    pub fn activate_workspace(
        &self,
        index: usize,
    ) {
        let previous = match self.controller.set_current(index) {
            Some(previous) => previous,
            None => return,
        };

        info!("activating workspace {}", index);

        let (old, new) = match (
            self.controller.workspace(previous),
            self.controller.workspace(index),
        ) {
            (Some(old), Some(new)) => (old, new),
            _ => return,
        };

        self.hide_all(old, new);
        self.show_all(new);

        self.restack(new);
        self.controller.publish_current(self.conn);

        let focus_is_sticky = self
            .focus
            .get()
            .and_then(|focus| self.client(focus))
            .map_or(false, |client| client.is_sticky());

        if focus_is_sticky {
            return;
        }

        let last = if self.config.borrow().focus_last_window {
            new.last_focused()
        } else {
            None
        };

        match last {
            Some(window) if self.set_input_focus(window).is_ok() => {},
            _ => self.set_focused_window(None),
        }
    }

    /// Unmaps every member of a workspace. Sticky windows stay mapped
    /// and move along to `next`.
    fn hide_all(
        &self,
        workspace: &Workspace,
        next: &Workspace,
    ) {
        for window in workspace.members() {
            let client = match self.client(window) {
                Some(client) => client,
                None => continue,
            };

            if client.is_sticky() {
                next.transfer_from(workspace, window);
            } else {
                self.hide(&client);
            }
        }
    }

    fn show_all(
        &self,
        workspace: &Workspace,
    ) {
        for window in workspace.members() {
            if let Some(client) = self.client(window) {
                if !client.is_iconic() {
                    self.show(&client);
                }
            }
        }
    }

    /// Iconifies every window of a workspace.
    pub fn iconify_all(
        &self,
        index: usize,
    ) {
        let workspace = match self.controller.workspace(index) {
            Some(workspace) => workspace,
            None => return,
        };

        for window in workspace.stack_top_first() {
            if let Some(client) = self.client(window) {
                if let Err(err) = self.iconify(&client) {
                    debug!("not iconifying {:#0x}: {:?}", window, err);
                }
            }
        }
    }

    /// Moves a client to a workspace; `None` makes it sticky.
    pub fn send_to_workspace(
        &self,
        window: Window,
        desktop: Option<usize>,
    ) {
        let client = client_or_return!(self, window);

        let from = match self.controller.workspace_of(window) {
            Some(from) => from,
            None => return,
        };

        let to = match desktop {
            Some(index) => match self.controller.workspace(index) {
                Some(to) => to,
                None => {
                    warn!("no workspace {} to send {:#0x} to", index, window);
                    return;
                },
            },
            None => self.controller.current_workspace(),
        };

        client.set_workspace(desktop);

        if to.number() != from.number() {
            to.transfer_from(from, window);
        }

        if to.number() == self.controller.current_index() {
            if !client.is_iconic() {
                self.show(&client);
            }
        } else {
            if client.is_focused() {
                self.set_focused_window(None);
            }

            self.hide(&client);
        }

        self.set_state(&client);
        self.restack(self.controller.current_workspace());
    }

    fn handle_strut_request(
        &self,
        window: Window,
    ) {
        if self.controller.update_struts(self.conn, window) {
            self.struts_changed();
        }
    }

    /// Publishes the new work area and refits every maximized window.
    fn struts_changed(&self) {
        self.controller.publish_workarea(self.conn);

        for client in self.clients() {
            if client.maximized().is_maximized() && !client.is_fullscreen() {
                self.remaximize(&client);
            }
        }
    }

    fn handle_screen_change(&self) {
        let region = self.conn.screen().full_region();
        self.update_screen_region(region);
    }

    fn handle_configure(
        &self,
        _window: Window,
        region: Region,
        on_root: bool,
    ) {
        if on_root {
            self.update_screen_region(region);
        }
    }

    fn update_screen_region(
        &self,
        region: Region,
    ) {
        if region == self.controller.full_region() {
            return;
        }

        info!("screen region changed to {:?}", region);
        let available_changed = self.controller.set_full_region(region);

        for client in self.clients() {
            if client.is_fullscreen() {
                self.configure(&client, region);
            }
        }

        if available_changed {
            self.struts_changed();
        }
    }

    /// Re-reads the configuration and reapplies it to every client.
    pub fn reconfigure(&self) {
        info!("reconfiguring");
        self.reload();

        let border_width = self.config.borrow().border_width;

        for client in self.clients() {
            client.upsize(&self.style, border_width);
            self.decorate(&client);
            self.position_windows(&client);
            self.grab_buttons(&client);
            self.redraw(&client);

            if client.maximized().is_maximized() {
                self.remaximize(&client);
            }
        }
    }

    pub fn reload(&self) {
        self.cancel_drag();

        let config = (self.loader)();
        self.config.replace(config);

        self.controller.rename_workspaces(&self.config.borrow());
        self.controller.publish_desktops(self.conn);
    }

    pub fn exit(&self) {
        info!("exit called, shutting down {}", WM_NAME!());
        signal::begin_shutdown();
        self.running.set(false);
    }

    /// Gives every client back to the root window, remapped.
    fn shutdown(&self) {
        let windows = self.registry.borrow().windows();
        info!("releasing {} clients", windows.len());

        self.cancel_drag();

        for window in windows {
            self.unmanage(window, true);
        }

        self.conn.focus_pointer_root();
        self.conn.set_active_window(None);
        self.conn.flush();
    }
}
