//! An in-memory `Connection` that records every request it receives and
//! answers property reads from canned values.

use winsys::connection::Connection;
use winsys::event::Event;
use winsys::geometry::Dim;
use winsys::geometry::Extents;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::geometry::Strut;
use winsys::hints::Hints;
use winsys::hints::MotifHints;
use winsys::hints::SizeHints;
use winsys::input::Button;
use winsys::input::Modifier;
use winsys::input::Timestamp;
use winsys::screen::Screen;
use winsys::window::AllowedAction;
use winsys::window::IcccmWindowState;
use winsys::window::Protocol;
use winsys::window::Window;
use winsys::window::WindowAttributes;
use winsys::window::WindowState;
use winsys::window::WindowType;
use winsys::Result;

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::time::Duration;

pub const ROOT: Window = 1;
pub const SCREEN_REGION: Region = Region {
    pos: Pos {
        x: 0,
        y: 0,
    },
    dim: Dim {
        w: 1920,
        h: 1080,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    GrabServer,
    UngrabServer,
    GrabPointer(Window),
    UngrabPointer,
    ReplayPointer,
    GrabButton(Window, Button, bool),
    UngrabButtons(Window),
    CreateFrame(Window),
    Destroy(Window),
    SelectInput(Window, bool),
    ClearInput(Window),
    Map(Window),
    Unmap(Window),
    Reparent(Window, Window, Pos),
    SaveSetInsert(Window),
    SaveSetRemove(Window),
    Close(Window),
    TakeFocus(Window),
    ConfigureNotify(Window, Region, u32),
    Place(Window, Region),
    Move(Window, Pos),
    Raise(Window),
    Restack(Vec<Window>),
    Focus(Window),
    FocusRoot,
    BorderWidth(Window, u32),
    BorderColor(Window, u32),
    Fill(Window),
    Outline(Region),
}

pub struct MockConnection {
    screen: Screen,
    next_window: Cell<Window>,
    requests: RefCell<Vec<Request>>,
    events: RefCell<VecDeque<Event>>,
    mapped: RefCell<HashSet<Window>>,
    regions: RefCell<HashMap<Window, Region>>,
    attributes: RefCell<HashMap<Window, WindowAttributes>>,
    top_level: RefCell<Vec<Window>>,
    names: RefCell<HashMap<Window, String>>,
    size_hints: RefCell<HashMap<Window, SizeHints>>,
    hints: RefCell<HashMap<Window, Hints>>,
    transient_for: RefCell<HashMap<Window, Window>>,
    protocols: RefCell<HashMap<Window, HashSet<Protocol>>>,
    motif: RefCell<HashMap<Window, MotifHints>>,
    types: RefCell<HashMap<Window, Vec<WindowType>>>,
    icccm_states: RefCell<HashMap<Window, IcccmWindowState>>,
    net_states: RefCell<HashMap<Window, Vec<WindowState>>>,
    desktops: RefCell<HashMap<Window, Option<usize>>>,
    allowed_actions: RefCell<HashMap<Window, Vec<AllowedAction>>>,
    frame_extents: RefCell<HashMap<Window, Extents>>,
    struts: RefCell<HashMap<Window, Vec<Option<Strut>>>>,
    focused: Cell<Option<Window>>,
    active: Cell<Option<Window>>,
    current_desktop: Cell<usize>,
    desktop_names: RefCell<Vec<String>>,
    workarea: Cell<Option<Region>>,
    client_list: RefCell<Vec<Window>>,
    client_list_stacking: RefCell<Vec<Window>>,
    pointer_grab_fails: Cell<bool>,
    server_grabs: Cell<i32>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            screen: Screen::new(SCREEN_REGION, 0),
            next_window: Cell::new(0x1000),
            requests: RefCell::new(Vec::new()),
            events: RefCell::new(VecDeque::new()),
            mapped: RefCell::new(HashSet::new()),
            regions: RefCell::new(HashMap::new()),
            attributes: RefCell::new(HashMap::new()),
            top_level: RefCell::new(Vec::new()),
            names: RefCell::new(HashMap::new()),
            size_hints: RefCell::new(HashMap::new()),
            hints: RefCell::new(HashMap::new()),
            transient_for: RefCell::new(HashMap::new()),
            protocols: RefCell::new(HashMap::new()),
            motif: RefCell::new(HashMap::new()),
            types: RefCell::new(HashMap::new()),
            icccm_states: RefCell::new(HashMap::new()),
            net_states: RefCell::new(HashMap::new()),
            desktops: RefCell::new(HashMap::new()),
            allowed_actions: RefCell::new(HashMap::new()),
            frame_extents: RefCell::new(HashMap::new()),
            struts: RefCell::new(HashMap::new()),
            focused: Cell::new(None),
            active: Cell::new(None),
            current_desktop: Cell::new(0),
            desktop_names: RefCell::new(Vec::new()),
            workarea: Cell::new(None),
            client_list: RefCell::new(Vec::new()),
            client_list_stacking: RefCell::new(Vec::new()),
            pointer_grab_fails: Cell::new(false),
            server_grabs: Cell::new(0),
        }
    }

    fn record(
        &self,
        request: Request,
    ) {
        self.requests.borrow_mut().push(request);
    }

    fn allocate(&self) -> Window {
        let window = self.next_window.get();
        self.next_window.set(window + 1);
        window
    }

    /// Announces a client window that exists on the server.
    pub fn add_client(
        &self,
        window: Window,
        region: Region,
    ) {
        self.attributes.borrow_mut().insert(window, WindowAttributes {
            region,
            border_width: 0,
            override_redirect: false,
            mapped: false,
        });

        self.regions.borrow_mut().insert(window, region);
    }

    /// A client that was already mapped before the manager started.
    pub fn add_top_level(
        &self,
        window: Window,
        region: Region,
    ) {
        self.add_client(window, region);

        if let Some(attributes) = self.attributes.borrow_mut().get_mut(&window) {
            attributes.mapped = true;
        }

        self.mapped.borrow_mut().insert(window);
        self.top_level.borrow_mut().push(window);
    }

    pub fn set_name(
        &self,
        window: Window,
        name: &str,
    ) {
        self.names.borrow_mut().insert(window, name.to_owned());
    }

    pub fn set_size_hints(
        &self,
        window: Window,
        hints: SizeHints,
    ) {
        self.size_hints.borrow_mut().insert(window, hints);
    }

    pub fn set_hints(
        &self,
        window: Window,
        hints: Hints,
    ) {
        self.hints.borrow_mut().insert(window, hints);
    }

    pub fn set_transient_for(
        &self,
        window: Window,
        owner: Window,
    ) {
        self.transient_for.borrow_mut().insert(window, owner);
    }

    pub fn set_protocols(
        &self,
        window: Window,
        protocols: &[Protocol],
    ) {
        self.protocols
            .borrow_mut()
            .insert(window, protocols.iter().copied().collect());
    }

    pub fn set_motif_hints(
        &self,
        window: Window,
        hints: MotifHints,
    ) {
        self.motif.borrow_mut().insert(window, hints);
    }

    pub fn set_window_types(
        &self,
        window: Window,
        types: &[WindowType],
    ) {
        self.types.borrow_mut().insert(window, types.to_vec());
    }

    pub fn set_struts(
        &self,
        window: Window,
        widths: [u32; 4],
    ) {
        let struts = widths
            .iter()
            .map(|&width| {
                if width > 0 {
                    Some(Strut::new(window, width))
                } else {
                    None
                }
            })
            .collect();

        self.struts.borrow_mut().insert(window, struts);
    }

    pub fn fail_pointer_grabs(
        &self,
        fail: bool,
    ) {
        self.pointer_grab_fails.set(fail);
    }

    pub fn push_event(
        &self,
        event: Event,
    ) {
        self.events.borrow_mut().push_back(event);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }

    pub fn count(
        &self,
        predicate: impl Fn(&Request) -> bool,
    ) -> usize {
        self.requests.borrow().iter().filter(|&request| predicate(request)).count()
    }

    pub fn is_mapped(
        &self,
        window: Window,
    ) -> bool {
        self.mapped.borrow().contains(&window)
    }

    pub fn icccm_state(
        &self,
        window: Window,
    ) -> Option<IcccmWindowState> {
        self.icccm_states.borrow().get(&window).copied()
    }

    pub fn net_states(
        &self,
        window: Window,
    ) -> Vec<WindowState> {
        self.net_states.borrow().get(&window).cloned().unwrap_or_default()
    }

    pub fn desktop(
        &self,
        window: Window,
    ) -> Option<Option<usize>> {
        self.desktops.borrow().get(&window).copied()
    }

    pub fn allowed_actions(
        &self,
        window: Window,
    ) -> Vec<AllowedAction> {
        self.allowed_actions
            .borrow()
            .get(&window)
            .cloned()
            .unwrap_or_default()
    }

    pub fn frame_extents(
        &self,
        window: Window,
    ) -> Option<Extents> {
        self.frame_extents.borrow().get(&window).copied()
    }

    pub fn focused(&self) -> Option<Window> {
        self.focused.get()
    }

    pub fn active(&self) -> Option<Window> {
        self.active.get()
    }

    pub fn current_desktop(&self) -> usize {
        self.current_desktop.get()
    }

    pub fn desktop_names(&self) -> Vec<String> {
        self.desktop_names.borrow().clone()
    }

    pub fn workarea(&self) -> Option<Region> {
        self.workarea.get()
    }

    pub fn client_list(&self) -> Vec<Window> {
        self.client_list.borrow().clone()
    }

    pub fn client_list_stacking(&self) -> Vec<Window> {
        self.client_list_stacking.borrow().clone()
    }

    /// Server grabs must always be released again.
    pub fn server_grab_depth(&self) -> i32 {
        self.server_grabs.get()
    }
}

impl Connection for MockConnection {
    fn flush(&self) -> bool {
        true
    }

    fn sync(&self) {}

    fn poll_event(&self) -> Option<Event> {
        self.events.borrow_mut().pop_front()
    }

    fn wait_for_input(
        &self,
        _timeout: Option<Duration>,
    ) -> bool {
        !self.events.borrow().is_empty()
    }

    fn root(&self) -> Window {
        ROOT
    }

    fn screen(&self) -> Screen {
        self.screen.clone()
    }

    fn top_level_windows(&self) -> Vec<Window> {
        self.top_level.borrow().clone()
    }

    fn cleanup(&self) {}

    fn grab_server(&self) {
        self.server_grabs.set(self.server_grabs.get() + 1);
        self.record(Request::GrabServer);
    }

    fn ungrab_server(&self) {
        self.server_grabs.set(self.server_grabs.get() - 1);
        self.record(Request::UngrabServer);
    }

    fn grab_pointer(
        &self,
        window: Window,
    ) -> bool {
        if self.pointer_grab_fails.get() {
            return false;
        }

        self.record(Request::GrabPointer(window));
        true
    }

    fn ungrab_pointer(&self) {
        self.record(Request::UngrabPointer);
    }

    fn replay_pointer(
        &self,
        _time: Timestamp,
    ) {
        self.record(Request::ReplayPointer);
    }

    fn grab_button(
        &self,
        window: Window,
        button: Button,
        _modifiers: &HashSet<Modifier>,
        sync: bool,
    ) {
        self.record(Request::GrabButton(window, button, sync));
    }

    fn ungrab_buttons(
        &self,
        window: Window,
    ) {
        self.record(Request::UngrabButtons(window));
    }

    fn create_frame(
        &self,
        region: Region,
        _border_width: u32,
    ) -> Result<Window> {
        let window = self.allocate();
        self.regions.borrow_mut().insert(window, region);
        self.record(Request::CreateFrame(window));
        Ok(window)
    }

    fn create_plate(
        &self,
        _frame: Window,
        region: Region,
    ) -> Result<Window> {
        let window = self.allocate();
        self.regions.borrow_mut().insert(window, region);
        Ok(window)
    }

    fn create_subwindow(
        &self,
        _parent: Window,
        region: Region,
    ) -> Result<Window> {
        let window = self.allocate();
        self.regions.borrow_mut().insert(window, region);
        Ok(window)
    }

    fn destroy_window(
        &self,
        window: Window,
    ) {
        self.mapped.borrow_mut().remove(&window);
        self.record(Request::Destroy(window));
    }

    fn init_client(
        &self,
        _window: Window,
    ) {
    }

    fn select_client_input(
        &self,
        window: Window,
        structure: bool,
    ) {
        self.record(Request::SelectInput(window, structure));
    }

    fn clear_input(
        &self,
        window: Window,
    ) {
        self.record(Request::ClearInput(window));
    }

    fn get_window_attributes(
        &self,
        window: Window,
    ) -> Option<WindowAttributes> {
        self.attributes.borrow().get(&window).copied()
    }

    fn map_window(
        &self,
        window: Window,
    ) {
        self.mapped.borrow_mut().insert(window);
        self.record(Request::Map(window));
    }

    fn map_subwindows(
        &self,
        _window: Window,
    ) {
    }

    fn unmap_window(
        &self,
        window: Window,
    ) {
        self.mapped.borrow_mut().remove(&window);
        self.record(Request::Unmap(window));
    }

    fn reparent_window(
        &self,
        window: Window,
        parent: Window,
        pos: Pos,
    ) {
        self.record(Request::Reparent(window, parent, pos));
    }

    fn insert_window_in_save_set(
        &self,
        window: Window,
    ) {
        self.record(Request::SaveSetInsert(window));
    }

    fn remove_window_from_save_set(
        &self,
        window: Window,
    ) {
        self.record(Request::SaveSetRemove(window));
    }

    fn close_window(
        &self,
        window: Window,
    ) -> bool {
        self.record(Request::Close(window));
        true
    }

    fn send_take_focus(
        &self,
        window: Window,
        _time: Timestamp,
    ) {
        self.record(Request::TakeFocus(window));
    }

    fn send_configure_notify(
        &self,
        window: Window,
        region: Region,
        border_width: u32,
        _above: Window,
    ) {
        self.record(Request::ConfigureNotify(window, region, border_width));
    }

    fn place_window(
        &self,
        window: Window,
        region: &Region,
    ) {
        self.regions.borrow_mut().insert(window, *region);
        self.record(Request::Place(window, *region));
    }

    fn move_window(
        &self,
        window: Window,
        pos: Pos,
    ) {
        if let Some(region) = self.regions.borrow_mut().get_mut(&window) {
            region.pos = pos;
        }

        self.record(Request::Move(window, pos));
    }

    fn raise_window(
        &self,
        window: Window,
    ) {
        self.record(Request::Raise(window));
    }

    fn restack_windows(
        &self,
        windows: &[Window],
    ) {
        self.record(Request::Restack(windows.to_vec()));
    }

    fn focus_window(
        &self,
        window: Window,
    ) {
        self.focused.set(Some(window));
        self.record(Request::Focus(window));
    }

    fn focus_pointer_root(&self) {
        self.focused.set(None);
        self.record(Request::FocusRoot);
    }

    fn get_focused_window(&self) -> Option<Window> {
        self.focused.get()
    }

    fn set_window_border_width(
        &self,
        window: Window,
        width: u32,
    ) {
        self.record(Request::BorderWidth(window, width));
    }

    fn set_window_border_color(
        &self,
        window: Window,
        color: u32,
    ) {
        self.record(Request::BorderColor(window, color));
    }

    fn fill_window(
        &self,
        window: Window,
        _region: Region,
        _color: u32,
    ) {
        self.record(Request::Fill(window));
    }

    fn draw_outline(
        &self,
        region: Region,
    ) {
        self.record(Request::Outline(region));
    }

    fn get_icccm_window_name(
        &self,
        window: Window,
    ) -> String {
        self.names.borrow().get(&window).cloned().unwrap_or_default()
    }

    fn get_icccm_window_state(
        &self,
        window: Window,
    ) -> Option<IcccmWindowState> {
        self.icccm_states.borrow().get(&window).copied()
    }

    fn set_icccm_window_state(
        &self,
        window: Window,
        state: IcccmWindowState,
    ) {
        self.icccm_states.borrow_mut().insert(window, state);
    }

    fn delete_icccm_window_state(
        &self,
        window: Window,
    ) {
        self.icccm_states.borrow_mut().remove(&window);
    }

    fn get_icccm_window_transient_for(
        &self,
        window: Window,
    ) -> Option<Window> {
        self.transient_for.borrow().get(&window).copied()
    }

    fn get_icccm_window_hints(
        &self,
        window: Window,
    ) -> Option<Hints> {
        self.hints.borrow().get(&window).copied()
    }

    fn get_icccm_window_size_hints(
        &self,
        window: Window,
        _screen_dim: Dim,
    ) -> Option<SizeHints> {
        self.size_hints.borrow().get(&window).copied()
    }

    fn get_icccm_window_protocols(
        &self,
        window: Window,
    ) -> HashSet<Protocol> {
        self.protocols.borrow().get(&window).cloned().unwrap_or_default()
    }

    fn get_motif_hints(
        &self,
        window: Window,
    ) -> Option<MotifHints> {
        self.motif.borrow().get(&window).copied()
    }

    fn init_wm_properties(
        &self,
        _wm_name: &str,
        desktop_names: &[&str],
    ) {
        self.update_desktops(desktop_names);
    }

    fn update_desktops(
        &self,
        desktop_names: &[&str],
    ) {
        self.desktop_names
            .replace(desktop_names.iter().map(|&name| name.to_owned()).collect());
    }

    fn set_current_desktop(
        &self,
        index: usize,
    ) {
        self.current_desktop.set(index);
    }

    fn set_active_window(
        &self,
        window: Option<Window>,
    ) {
        self.active.set(window);
    }

    fn set_workarea(
        &self,
        workarea: Region,
        _desktops: usize,
    ) {
        self.workarea.set(Some(workarea));
    }

    fn update_client_list(
        &self,
        clients: &[Window],
    ) {
        self.client_list.replace(clients.to_vec());
    }

    fn update_client_list_stacking(
        &self,
        clients: &[Window],
    ) {
        self.client_list_stacking.replace(clients.to_vec());
    }

    fn set_window_desktop(
        &self,
        window: Window,
        index: Option<usize>,
    ) {
        self.desktops.borrow_mut().insert(window, index);
    }

    fn get_window_desktop(
        &self,
        window: Window,
    ) -> Option<Option<usize>> {
        self.desktops.borrow().get(&window).copied()
    }

    fn set_window_states(
        &self,
        window: Window,
        states: &[WindowState],
    ) {
        if states.is_empty() {
            self.net_states.borrow_mut().remove(&window);
        } else {
            self.net_states.borrow_mut().insert(window, states.to_vec());
        }
    }

    fn get_window_states(
        &self,
        window: Window,
    ) -> Vec<WindowState> {
        self.net_states(window)
    }

    fn get_window_types(
        &self,
        window: Window,
    ) -> Vec<WindowType> {
        self.types.borrow().get(&window).cloned().unwrap_or_default()
    }

    fn set_allowed_actions(
        &self,
        window: Window,
        actions: &[AllowedAction],
    ) {
        self.allowed_actions.borrow_mut().insert(window, actions.to_vec());
    }

    fn clear_window_properties(
        &self,
        window: Window,
    ) {
        self.net_states.borrow_mut().remove(&window);
        self.desktops.borrow_mut().remove(&window);
        self.allowed_actions.borrow_mut().remove(&window);
        self.frame_extents.borrow_mut().remove(&window);
    }

    fn set_window_frame_extents(
        &self,
        window: Window,
        extents: Extents,
    ) {
        self.frame_extents.borrow_mut().insert(window, extents);
    }

    fn get_window_strut(
        &self,
        window: Window,
    ) -> Option<Vec<Option<Strut>>> {
        self.struts.borrow().get(&window).cloned()
    }

    fn get_window_strut_partial(
        &self,
        window: Window,
    ) -> Option<Vec<Option<Strut>>> {
        self.struts.borrow().get(&window).cloned()
    }
}
