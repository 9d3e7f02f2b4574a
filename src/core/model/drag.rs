use super::Model;

use crate::decoration::Functions;
use crate::decoration::Part;
use crate::error::OperationError;
use crate::timer::TimerKind;
use crate::window::ManagedWindow;
use crate::window::Maximize;
use crate::workspace::Buffer;
use crate::workspace::BufferKind;

use winsys::event::Event;
use winsys::event::NotifyDetail;
use winsys::event::NotifyMode;
use winsys::geometry::Corner;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::input::Button;
use winsys::input::Modifier;
use winsys::input::MouseEvent;
use winsys::input::MouseEventKind;
use winsys::window::Window;
use winsys::window::WindowType;

impl<'a> Model<'a> {
    pub(super) fn handle_mouse(
        &self,
        mut event: MouseEvent,
    ) {
        event.strip_locks();
        self.last_time.set(event.time);

        let (client, part) = match self.owner(event.window) {
            Some(owner) => owner,
            None => return,
        };

        let result = match event.kind {
            MouseEventKind::Press => self.handle_press(&client, part, &event),
            MouseEventKind::Motion => self.handle_motion(&client, &event),
            MouseEventKind::Release => self.handle_release(&client, part, &event),
        };

        if let Err(err) = result {
            debug!("mouse {:?} on {:#0x} not handled: {:?}", event.kind, client.window(), err);
        }
    }

    fn handle_press(
        &self,
        client: &ManagedWindow,
        part: Part,
        event: &MouseEvent,
    ) -> Result<(), OperationError> {
        let button = match event.button {
            Some(button) => button,
            None => return Ok(()),
        };

        let window = client.window();
        let alt = event.has_modifier(Modifier::Alt);

        if part.is_button() {
            let accepted = match part {
                Part::MaximizeButton => match button {
                    Button::Left | Button::Middle | Button::Right => true,
                    _ => false,
                },
                _ => button == Button::Left,
            };

            if accepted {
                client.set_pressed(Some(part));
                self.redraw(client);
            }

            return Ok(());
        }

        if part == Part::Plate && !alt {
            self.click_focus(client);
            self.conn.replay_pointer(event.time);
            return Ok(());
        }

        match button {
            Button::Left => {
                if !client.is_focused() {
                    let _ = self.set_input_focus(window);
                }

                if (part == Part::Title || part == Part::Label) && !alt {
                    let interval = self.config.borrow().double_click_interval;
                    let elapsed = event.time.wrapping_sub(client.last_button_press());

                    if elapsed <= interval || event.has_modifier(Modifier::Ctrl) {
                        client.set_last_button_press(0);
                        return self.set_shaded(client, !client.is_shaded());
                    }

                    client.set_last_button_press(event.time);
                }

                self.raise(window);

                if part.is_grip() && client.has_function(Functions::RESIZE) {
                    let anchor = match part {
                        Part::LeftGrip => Corner::BottomLeft,
                        _ => Corner::BottomRight,
                    };

                    self.resize_buffer
                        .set(window, anchor, event.root_rpos, client.frame_region());
                } else if (alt || part.is_move_handle()) && client.has_function(Functions::MOVE) {
                    self.move_buffer
                        .set(window, Corner::TopLeft, event.root_rpos, client.frame_region());
                }
            },
            Button::Middle => self.lower(window),
            Button::Right if alt && client.has_function(Functions::RESIZE) => {
                if !client.is_focused() {
                    let _ = self.set_input_focus(window);
                }

                self.raise(window);

                let region = client.frame_region();
                let anchor = nearest_corner(region, event.root_rpos);
                self.resize_buffer.set(window, anchor, event.root_rpos, region);
            },
            _ => {},
        }

        Ok(())
    }

    /// Focus and raise on a click into the client area, as the focus
    /// model asks for.
    fn click_focus(
        &self,
        client: &ManagedWindow,
    ) {
        let focus_model = self.config.borrow().focus_model;

        if !client.is_focused() {
            if let Err(err) = self.set_input_focus(client.window()) {
                debug!("click could not focus {:#0x}: {:?}", client.window(), err);
            }
        }

        if !focus_model.sloppy || focus_model.click_raise {
            self.raise(client.window());
        }
    }

    fn handle_motion(
        &self,
        client: &ManagedWindow,
        event: &MouseEvent,
    ) -> Result<(), OperationError> {
        let window = client.window();

        if client.is_moving() {
            self.continue_move(client, event.root_rpos);
            return Ok(());
        }

        if client.is_resizing() {
            self.continue_resize(client, event.root_rpos);
            return Ok(());
        }

        if self.move_buffer.window() == Some(window) && event.is_held(Button::Left) {
            self.begin_drag(client, &self.move_buffer)?;
            client.set_moving(true);
            self.continue_move(client, event.root_rpos);
        } else if self.resize_buffer.window() == Some(window)
            && (event.is_held(Button::Left) || event.is_held(Button::Right))
        {
            self.begin_drag(client, &self.resize_buffer)?;
            client.set_resizing(true);
            self.continue_resize(client, event.root_rpos);
        }

        Ok(())
    }

    fn begin_drag(
        &self,
        client: &ManagedWindow,
        buffer: &Buffer,
    ) -> Result<(), OperationError> {
        if !self.conn.grab_pointer(client.frame()) {
            warn!("could not grab the pointer for {:#0x}", client.window());
            buffer.unset();
            return Err(OperationError::GrabFailed);
        }

        debug!("starting {:?} of {:#0x}", buffer.kind(), client.window());

        if self.draws_outline(buffer) {
            self.conn.grab_server();
        }

        Ok(())
    }

    /// Whether a drag shows a rubber band instead of the window itself.
    fn draws_outline(
        &self,
        buffer: &Buffer,
    ) -> bool {
        buffer.kind() == BufferKind::Resize || !self.config.borrow().opaque_move
    }

    fn continue_move(
        &self,
        client: &ManagedWindow,
        pointer: Pos,
    ) {
        let (origin, grip) = match (self.move_buffer.window_region(), self.move_buffer.grip_pos()) {
            (Some(origin), Some(grip)) => (origin, grip),
            _ => return,
        };

        let (dx, dy) = grip.dist(pointer).values();
        let region = self.snap_to_edges(Region {
            pos: Pos::new(origin.pos.x + dx, origin.pos.y + dy),
            dim: origin.dim,
        });

        if self.draws_outline(&self.move_buffer) {
            self.draw_outline(&self.move_buffer, region);
        } else {
            self.configure(client, region);
        }
    }

    fn continue_resize(
        &self,
        client: &ManagedWindow,
        pointer: Pos,
    ) {
        let buffer = &self.resize_buffer;
        let (origin, grip, anchor) = match (buffer.window_region(), buffer.grip_pos(), buffer.anchor()) {
            (Some(origin), Some(grip), Some(anchor)) => (origin, grip, anchor),
            _ => return,
        };

        let (dx, dy) = grip.dist(pointer).values();
        let region = client.constrain(stretch(origin, anchor, dx, dy), anchor);

        self.draw_outline(buffer, region);
    }

    /// Pulls a frame edge onto a nearby edge of the available area, and
    /// of the whole screen unless windows maximize over it anyway.
    fn snap_to_edges(
        &self,
        region: Region,
    ) -> Region {
        let config = self.config.borrow();
        let threshold = config.edge_snap_threshold;

        if threshold <= 0 {
            return region;
        }

        let mut targets = vec![self.controller.available_region()];

        if !config.full_maximization {
            targets.push(self.controller.full_region());
        }

        let mut snapped = region;

        for target in targets {
            if (region.left() - target.left()).abs() <= threshold {
                snapped.pos.x = target.left();
            } else if (target.right() - region.right()).abs() <= threshold {
                snapped.pos.x = target.right() - region.dim.w + 1;
            }

            if (region.top() - target.top()).abs() <= threshold {
                snapped.pos.y = target.top();
            } else if (target.bottom() - region.bottom()).abs() <= threshold {
                snapped.pos.y = target.bottom() - region.dim.h + 1;
            }
        }

        snapped
    }

    /// Outlines are drawn in xor mode; drawing one again erases it.
    fn draw_outline(
        &self,
        buffer: &Buffer,
        region: Region,
    ) {
        if let Some(previous) = buffer.outline() {
            if previous == region {
                return;
            }

            self.renderer.outline(self.conn, previous);
        }

        self.renderer.outline(self.conn, region);
        buffer.set_outline(Some(region));
    }

    fn erase_outline(
        &self,
        buffer: &Buffer,
    ) -> Option<Region> {
        let outline = buffer.outline()?;

        self.renderer.outline(self.conn, outline);
        buffer.set_outline(None);

        Some(outline)
    }

    fn finish_move(
        &self,
        client: &ManagedWindow,
    ) {
        let outline = self.erase_outline(&self.move_buffer);
        let outlined = self.draws_outline(&self.move_buffer);
        self.move_buffer.unset();

        self.conn.ungrab_pointer();

        if outlined {
            self.conn.ungrab_server();
        }

        if let Some(region) = outline {
            self.configure(client, region);
        }

        client.set_moving(false);
        self.send_configure_notify(client);
    }

    fn finish_resize(
        &self,
        client: &ManagedWindow,
    ) {
        let outline = self.erase_outline(&self.resize_buffer);
        self.resize_buffer.unset();

        self.conn.ungrab_pointer();
        self.conn.ungrab_server();
        client.set_resizing(false);

        let region = match outline {
            Some(region) => region,
            None => return,
        };

        if client.maximized() == Maximize::Full {
            client.set_maximized(Maximize::None);
        }

        self.configure(client, region);
        self.send_configure_notify(client);
        self.set_state(client);
    }

    fn handle_release(
        &self,
        client: &ManagedWindow,
        part: Part,
        event: &MouseEvent,
    ) -> Result<(), OperationError> {
        let window = client.window();

        if client.is_moving() {
            self.finish_move(client);
            return Ok(());
        }

        if client.is_resizing() {
            self.finish_resize(client);
            return Ok(());
        }

        if self.move_buffer.window() == Some(window) {
            self.move_buffer.unset();
        }

        if self.resize_buffer.window() == Some(window) {
            self.resize_buffer.unset();
        }

        let pressed = match client.pressed() {
            Some(pressed) => pressed,
            None => return Ok(()),
        };

        client.set_pressed(None);
        self.redraw(client);

        if pressed != part || !ManagedWindow::part_contains(&self.style, part, event.window_rpos) {
            return Ok(());
        }

        match part {
            Part::IconifyButton => self.iconify(client),
            Part::MaximizeButton if client.has_function(Functions::MAXIMIZE) => {
                let mode = event.button.map_or(Maximize::Full, Maximize::from_button);
                self.toggle_maximize(client, mode);
                self.raise(window);
                Ok(())
            },
            Part::CloseButton => self.close(client),
            _ => Err(OperationError::NotPermitted),
        }
    }

    /// Abandons any move or resize in progress, releasing its grabs.
    pub(super) fn cancel_drag(&self) {
        for buffer in [&self.move_buffer, &self.resize_buffer].iter() {
            let window = match buffer.window() {
                Some(window) => window,
                None => continue,
            };

            self.erase_outline(buffer);

            if let Some(client) = self.client(window) {
                if client.is_moving() || client.is_resizing() {
                    debug!("cancelling {:?} of {:#0x}", buffer.kind(), window);

                    client.set_moving(false);
                    client.set_resizing(false);
                    self.conn.ungrab_pointer();

                    if self.draws_outline(buffer) {
                        self.conn.ungrab_server();
                    }
                }
            }

            buffer.unset();
        }
    }

    /// Sloppy focus. Crossing into a frame focuses it unless the pointer
    /// has already left again for somewhere other than a subwindow.
    pub(super) fn handle_enter(
        &self,
        window: Window,
        mode: NotifyMode,
        detail: NotifyDetail,
    ) {
        let (client, part) = match self.owner(window) {
            Some(owner) => owner,
            None => return,
        };

        if part != Part::Frame {
            return;
        }

        let focus_model = self.config.borrow().focus_model;

        if !focus_model.sloppy || !client.is_visible() {
            return;
        }

        match client.window_type() {
            WindowType::Desktop | WindowType::Dock => return,
            _ => {},
        }

        if self.move_buffer.is_occupied() || self.resize_buffer.is_occupied() {
            return;
        }

        trace!("pointer entered {:#0x} ({:?}, {:?})", client.window(), mode, detail);

        let leaves = self.events.borrow_mut().take_all(self.conn, |event| match event {
            Event::Leave {
                window: target,
                ..
            } => *target == window,
            _ => false,
        });

        let mut leave = false;
        let mut inferior = false;

        for event in leaves {
            if let Event::Leave {
                mode: NotifyMode::Normal,
                detail,
                ..
            } = event
            {
                leave = true;
                inferior = detail == NotifyDetail::Inferior;
            }
        }

        if (!leave || inferior) && !client.is_focused() {
            if let Err(err) = self.set_input_focus(client.window()) {
                debug!("enter could not focus {:#0x}: {:?}", client.window(), err);
            }
        }

        if focus_model.auto_raise {
            let delay = self.config.borrow().auto_raise_delay;
            let mut timers = self.timers.borrow_mut();

            if let Some(id) = client.auto_raise_timer() {
                timers.stop(id);
            }

            let id = timers.start(TimerKind::AutoRaise(client.window()), delay, false);
            client.set_auto_raise_timer(Some(id));
        }
    }

    pub(super) fn handle_leave(
        &self,
        window: Window,
    ) {
        let client = match self.owner(window) {
            Some((client, Part::Frame)) => client,
            _ => return,
        };

        if let Some(id) = client.auto_raise_timer() {
            self.timers.borrow_mut().stop(id);
            client.set_auto_raise_timer(None);
        }
    }

    /// Decorations are repainted whole once the last rectangle of an
    /// exposure arrives.
    pub(super) fn handle_expose(
        &self,
        window: Window,
        region: Region,
        count: u16,
    ) {
        if count > 0 {
            return;
        }

        if let Some((client, part)) = self.owner(window) {
            trace!("{:?} of {:#0x} exposed at {:?}", part, client.window(), region);
            self.redraw(&client);
        }
    }
}

/// The corner of `region` closest to `pos`.
fn nearest_corner(
    region: Region,
    pos: Pos,
) -> Corner {
    let center_x = region.pos.x + region.dim.w / 2;
    let center_y = region.pos.y + region.dim.h / 2;

    match (pos.x < center_x, pos.y < center_y) {
        (true, true) => Corner::TopLeft,
        (false, true) => Corner::TopRight,
        (true, false) => Corner::BottomLeft,
        (false, false) => Corner::BottomRight,
    }
}

/// Drags the `anchor` corner of `region` by `(dx, dy)`, leaving the
/// opposite corner where it is.
fn stretch(
    region: Region,
    anchor: Corner,
    dx: i32,
    dy: i32,
) -> Region {
    let mut stretched = region;

    match anchor {
        Corner::TopLeft => {
            stretched.pos.x += dx;
            stretched.pos.y += dy;
            stretched.dim.w -= dx;
            stretched.dim.h -= dy;
        },
        Corner::TopRight => {
            stretched.pos.y += dy;
            stretched.dim.w += dx;
            stretched.dim.h -= dy;
        },
        Corner::BottomLeft => {
            stretched.pos.x += dx;
            stretched.dim.w -= dx;
            stretched.dim.h += dy;
        },
        Corner::BottomRight => {
            stretched.dim.w += dx;
            stretched.dim.h += dy;
        },
    }

    stretched.dim.w = std::cmp::max(stretched.dim.w, 1);
    stretched.dim.h = std::cmp::max(stretched.dim.h, 1);
    stretched
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::config::Config;
    use crate::config::FocusModel;
    use crate::mock::MockConnection;
    use crate::mock::Request;
    use crate::model::tests::manage;
    use crate::model::Model;

    use std::collections::HashSet;

    fn mouse(
        kind: MouseEventKind,
        window: Window,
        button: Option<Button>,
        held: &[Button],
        modifiers: &[Modifier],
        root_rpos: Pos,
        time: u32,
    ) -> Event {
        Event::Mouse {
            event: MouseEvent {
                kind,
                window,
                button,
                held: held.iter().copied().collect(),
                modifiers: modifiers.iter().copied().collect(),
                root_rpos,
                window_rpos: Pos::new(2, 2),
                time,
            },
        }
    }

    fn press(
        window: Window,
        button: Button,
        root_rpos: Pos,
        time: u32,
    ) -> Event {
        mouse(MouseEventKind::Press, window, Some(button), &[], &[], root_rpos, time)
    }

    fn release(
        window: Window,
        button: Button,
        root_rpos: Pos,
    ) -> Event {
        mouse(MouseEventKind::Release, window, Some(button), &[button], &[], root_rpos, 0)
    }

    fn drag(
        window: Window,
        button: Button,
        root_rpos: Pos,
    ) -> Event {
        mouse(MouseEventKind::Motion, window, None, &[button], &[], root_rpos, 0)
    }

    fn model_with(
        conn: &MockConnection,
        config: impl Fn() -> Config + 'static,
    ) -> Model<'_> {
        Model::new(conn, config)
    }

    fn opaque() -> Config {
        Config {
            opaque_move: true,
            focus_new_windows: true,
            ..Config::default()
        }
    }

    fn enter(window: Window) -> Event {
        Event::Enter {
            window,
            mode: NotifyMode::Normal,
            detail: NotifyDetail::Nonlinear,
            root_rpos: Pos::new(5, 5),
            window_rpos: Pos::new(5, 5),
        }
    }

    fn leave(
        window: Window,
        detail: NotifyDetail,
    ) -> Event {
        Event::Leave {
            window,
            mode: NotifyMode::Normal,
            detail,
            root_rpos: Pos::new(5, 5),
            window_rpos: Pos::new(5, 5),
        }
    }

    #[test]
    fn opaque_move_follows_the_pointer() {
        let conn = MockConnection::new();
        let model = model_with(&conn, opaque);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let title = client.part_window(Part::Title).unwrap();
        let origin = client.frame_region();

        model.handle_event(press(title, Button::Left, Pos::new(150, 105), 1000));
        model.handle_event(drag(title, Button::Left, Pos::new(200, 135)));

        assert!(client.is_moving());
        assert_eq!(client.frame_region().pos, Pos::new(origin.pos.x + 50, origin.pos.y + 30));
        assert!(conn.requests().contains(&Request::GrabPointer(client.frame())));

        conn.clear_requests();
        model.handle_event(drag(client.frame(), Button::Left, Pos::new(210, 135)));
        assert!(!conn.requests().iter().any(|request| match request {
            Request::ConfigureNotify(..) => true,
            _ => false,
        }));

        model.handle_event(release(client.frame(), Button::Left, Pos::new(210, 135)));

        assert!(!client.is_moving());
        assert!(!model.move_buffer.is_occupied());
        assert_eq!(client.frame_region().pos, Pos::new(origin.pos.x + 60, origin.pos.y + 30));
        assert!(conn.requests().contains(&Request::UngrabPointer));
        assert_eq!(
            conn.count(|request| match request {
                Request::ConfigureNotify(10, ..) => true,
                _ => false,
            }),
            1
        );
    }

    #[test]
    fn outline_move_applies_on_release() {
        let conn = MockConnection::new();
        let model = crate::model::tests::model(&conn);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let title = client.part_window(Part::Title).unwrap();
        let origin = client.frame_region();

        model.handle_event(press(title, Button::Left, Pos::new(150, 105), 1000));
        model.handle_event(drag(title, Button::Left, Pos::new(160, 105)));
        model.handle_event(drag(title, Button::Left, Pos::new(170, 105)));

        assert_eq!(client.frame_region(), origin);
        assert_eq!(conn.server_grab_depth(), 1);
        assert_eq!(
            conn.count(|request| match request {
                Request::Outline(_) => true,
                _ => false,
            }),
            3
        );

        model.handle_event(release(title, Button::Left, Pos::new(170, 105)));

        assert_eq!(conn.server_grab_depth(), 0);
        assert_eq!(client.frame_region().pos, Pos::new(origin.pos.x + 20, origin.pos.y));
        assert_eq!(
            conn.count(|request| match request {
                Request::Outline(_) => true,
                _ => false,
            }),
            4
        );
    }

    #[test]
    fn a_failed_pointer_grab_aborts_the_drag() {
        let conn = MockConnection::new();
        let model = model_with(&conn, opaque);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let title = client.part_window(Part::Title).unwrap();
        let origin = client.frame_region();

        conn.fail_pointer_grabs(true);
        model.handle_event(press(title, Button::Left, Pos::new(150, 105), 1000));
        model.handle_event(drag(title, Button::Left, Pos::new(200, 135)));

        assert!(!client.is_moving());
        assert!(!model.move_buffer.is_occupied());
        assert_eq!(client.frame_region(), origin);
    }

    #[test]
    fn edges_snap_within_the_threshold() {
        let conn = MockConnection::new();
        let model = model_with(&conn, || Config {
            opaque_move: true,
            edge_snap_threshold: 10,
            ..Config::default()
        });

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let title = client.part_window(Part::Title).unwrap();
        let origin = client.frame_region();

        model.handle_event(press(title, Button::Left, Pos::new(150, 105), 1000));
        model.handle_event(drag(
            title,
            Button::Left,
            Pos::new(150 - origin.pos.x + 6, 105 - origin.pos.y + 300),
        ));

        assert_eq!(client.frame_region().pos, Pos::new(0, 300));
    }

    #[test]
    fn grip_resize_is_constrained_and_unmaximizes() {
        let conn = MockConnection::new();
        let model = crate::model::tests::model(&conn);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        model.maximize(&client, Maximize::Full);

        let grip = client.part_window(Part::RightGrip).unwrap();
        let origin = client.frame_region();

        model.handle_event(press(grip, Button::Left, Pos::new(1900, 1070), 1000));
        model.handle_event(drag(grip, Button::Left, Pos::new(1000, 600)));

        assert!(client.is_resizing());
        assert_eq!(client.frame_region(), origin);

        model.handle_event(release(grip, Button::Left, Pos::new(1000, 600)));

        let region = client.frame_region();
        assert!(!client.is_resizing());
        assert_eq!(client.maximized(), Maximize::None);
        assert_eq!(region.pos, origin.pos);
        assert_eq!(region.dim.w, origin.dim.w - 900);
        assert_eq!(region.dim.h, origin.dim.h - 470);
        assert_eq!(conn.server_grab_depth(), 0);
    }

    #[test]
    fn left_grip_resize_keeps_the_right_edge() {
        let conn = MockConnection::new();
        let model = crate::model::tests::model(&conn);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let grip = client.part_window(Part::LeftGrip).unwrap();
        let origin = client.frame_region();

        model.handle_event(press(grip, Button::Left, Pos::new(110, 300), 1000));
        model.handle_event(drag(grip, Button::Left, Pos::new(160, 320)));
        model.handle_event(release(grip, Button::Left, Pos::new(160, 320)));

        let region = client.frame_region();
        assert_eq!(region.right(), origin.right());
        assert_eq!(region.top(), origin.top());
        assert_eq!(region.dim.w, origin.dim.w - 50);
        assert_eq!(region.dim.h, origin.dim.h + 20);
    }

    #[test]
    fn double_clicking_the_title_shades() {
        let conn = MockConnection::new();
        let model = crate::model::tests::model(&conn);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let title = client.part_window(Part::Title).unwrap();

        model.handle_event(press(title, Button::Left, Pos::new(150, 105), 1000));
        model.handle_event(release(title, Button::Left, Pos::new(150, 105)));
        assert!(!client.is_shaded());

        model.handle_event(press(title, Button::Left, Pos::new(150, 105), 1100));
        assert!(client.is_shaded());

        model.handle_event(press(title, Button::Left, Pos::new(150, 105), 5000));
        assert!(client.is_shaded());

        model.handle_event(mouse(
            MouseEventKind::Press,
            title,
            Some(Button::Left),
            &[],
            &[Modifier::Ctrl],
            Pos::new(150, 105),
            9000,
        ));
        assert!(!client.is_shaded());
    }

    #[test]
    fn buttons_act_on_release_inside() {
        let conn = MockConnection::new();
        let model = crate::model::tests::model(&conn);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let maximize = client.part_window(Part::MaximizeButton).unwrap();

        model.handle_event(press(maximize, Button::Middle, Pos::new(0, 0), 1000));
        assert_eq!(client.pressed(), Some(Part::MaximizeButton));

        model.handle_event(mouse(
            MouseEventKind::Release,
            maximize,
            Some(Button::Middle),
            &[Button::Middle],
            &[],
            Pos::new(0, 0),
            0,
        ));

        assert_eq!(client.pressed(), None);
        assert_eq!(client.maximized(), Maximize::Vertical);

        let close = client.part_window(Part::CloseButton).unwrap();
        model.handle_event(press(close, Button::Left, Pos::new(0, 0), 2000));

        model.handle_event(Event::Mouse {
            event: MouseEvent {
                kind: MouseEventKind::Release,
                window: close,
                button: Some(Button::Left),
                held: vec![Button::Left].into_iter().collect(),
                modifiers: HashSet::new(),
                root_rpos: Pos::new(0, 0),
                window_rpos: Pos::new(-20, 2),
                time: 0,
            },
        });

        assert!(!conn.requests().contains(&Request::Close(10)));

        model.handle_event(press(close, Button::Left, Pos::new(0, 0), 3000));
        model.handle_event(release(close, Button::Left, Pos::new(0, 0)));
        assert!(conn.requests().contains(&Request::Close(10)));
    }

    #[test]
    fn plate_clicks_focus_and_replay() {
        let conn = MockConnection::new();
        let model = model_with(&conn, || Config {
            focus_model: FocusModel {
                sloppy: false,
                auto_raise: false,
                click_raise: false,
            },
            ..Config::default()
        });

        let first = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        manage(&model, &conn, 11, Region::new(500, 100, 300, 200));
        assert_eq!(model.focused_window(), None);

        conn.clear_requests();
        model.handle_event(press(first.plate(), Button::Left, Pos::new(150, 150), 1000));

        assert_eq!(model.focused_window(), Some(10));
        assert!(conn.requests().contains(&Request::ReplayPointer));
        assert_eq!(model.controller.current_workspace().stack_top_first()[0], 10);
    }

    #[test]
    fn middle_click_lowers() {
        let conn = MockConnection::new();
        let model = crate::model::tests::model(&conn);

        let first = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        manage(&model, &conn, 11, Region::new(500, 100, 300, 200));

        model.raise(10);
        let title = first.part_window(Part::Title).unwrap();
        model.handle_event(press(title, Button::Middle, Pos::new(150, 105), 1000));

        assert_eq!(model.controller.current_workspace().stack_top_first(), vec![11, 10]);
    }

    #[test]
    fn entering_a_frame_focuses_it() {
        let conn = MockConnection::new();
        let model = crate::model::tests::model(&conn);

        let first = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let second = manage(&model, &conn, 11, Region::new(500, 100, 300, 200));
        assert_eq!(model.focused_window(), Some(11));

        conn.push_event(leave(first.frame(), NotifyDetail::Nonlinear));
        model.handle_event(enter(first.frame()));
        assert_eq!(model.focused_window(), Some(11));

        conn.push_event(leave(first.frame(), NotifyDetail::Inferior));
        model.handle_event(enter(first.frame()));
        assert_eq!(model.focused_window(), Some(10));

        model.handle_event(enter(second.frame()));
        assert_eq!(model.focused_window(), Some(11));
        assert!(model.events.borrow().is_empty());
    }

    #[test]
    fn leaving_stops_the_auto_raise_timer() {
        let conn = MockConnection::new();
        let model = model_with(&conn, || Config {
            focus_model: FocusModel {
                sloppy: true,
                auto_raise: true,
                click_raise: false,
            },
            ..Config::default()
        });

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));

        model.handle_event(enter(client.frame()));
        let id = client.auto_raise_timer().unwrap();
        assert!(model.timers.borrow().is_timing(id));

        model.handle_event(leave(client.frame(), NotifyDetail::Nonlinear));
        assert_eq!(client.auto_raise_timer(), None);
        assert!(!model.timers.borrow().is_timing(id));
    }

    #[test]
    fn unmanaging_mid_drag_releases_the_grabs() {
        let conn = MockConnection::new();
        let model = crate::model::tests::model(&conn);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let title = client.part_window(Part::Title).unwrap();

        model.handle_event(press(title, Button::Left, Pos::new(150, 105), 1000));
        model.handle_event(drag(title, Button::Left, Pos::new(170, 105)));
        assert_eq!(conn.server_grab_depth(), 1);

        model.handle_event(Event::Destroy {
            window: 10,
        });

        assert_eq!(conn.server_grab_depth(), 0);
        assert!(!model.move_buffer.is_occupied());
        assert!(conn.requests().contains(&Request::UngrabPointer));
    }

    #[test]
    fn stretching_keeps_the_opposite_corner() {
        let region = Region::new(100, 100, 200, 100);

        assert_eq!(stretch(region, Corner::TopLeft, 10, 20), Region::new(110, 120, 190, 80));
        assert_eq!(stretch(region, Corner::BottomRight, 10, 20), Region::new(100, 100, 210, 120));
        assert_eq!(stretch(region, Corner::TopRight, -300, 0).dim.w, 1);
        assert_eq!(nearest_corner(region, Pos::new(290, 110)), Corner::TopRight);
    }

    #[test]
    fn expose_redraws_on_the_last_rectangle() {
        let conn = MockConnection::new();
        let model = crate::model::tests::model(&conn);

        let client = manage(&model, &conn, 10, Region::new(100, 100, 300, 200));
        let title = client.part_window(Part::Title).unwrap();
        conn.clear_requests();

        model.handle_event(Event::Expose {
            window: title,
            region: Region::new(0, 0, 10, 10),
            count: 1,
        });
        assert!(conn.requests().is_empty());

        model.handle_event(Event::Expose {
            window: title,
            region: Region::new(0, 0, 10, 10),
            count: 0,
        });
        assert!(conn.requests().contains(&Request::Fill(title)));
    }
}
