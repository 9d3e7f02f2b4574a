use crate::event::Event;
use crate::geometry::Dim;
use crate::geometry::Extents;
use crate::geometry::Pos;
use crate::geometry::Region;
use crate::geometry::Strut;
use crate::hints::Hints;
use crate::hints::MotifHints;
use crate::hints::SizeHints;
use crate::input::Button;
use crate::input::Modifier;
use crate::input::Timestamp;
use crate::screen::Screen;
use crate::window::AllowedAction;
use crate::window::IcccmWindowState;
use crate::window::Protocol;
use crate::window::Window;
use crate::window::WindowAttributes;
use crate::window::WindowState;
use crate::window::WindowType;
use crate::Result;

use std::collections::HashSet;
use std::time::Duration;

pub trait Connection {
    // Event handling
    fn flush(&self) -> bool;
    fn sync(&self);
    fn poll_event(&self) -> Option<Event>;
    fn wait_for_input(
        &self,
        timeout: Option<Duration>,
    ) -> bool;
    fn root(&self) -> Window;
    fn screen(&self) -> Screen;
    fn top_level_windows(&self) -> Vec<Window>;
    fn cleanup(&self);

    // Grabs
    fn grab_server(&self);
    fn ungrab_server(&self);
    fn grab_pointer(
        &self,
        window: Window,
    ) -> bool;
    fn ungrab_pointer(&self);
    fn replay_pointer(
        &self,
        time: Timestamp,
    );
    fn grab_button(
        &self,
        window: Window,
        button: Button,
        modifiers: &HashSet<Modifier>,
        sync: bool,
    );
    fn ungrab_buttons(
        &self,
        window: Window,
    );

    // Window manipulation
    fn create_frame(
        &self,
        region: Region,
        border_width: u32,
    ) -> Result<Window>;
    fn create_plate(
        &self,
        frame: Window,
        region: Region,
    ) -> Result<Window>;
    fn create_subwindow(
        &self,
        parent: Window,
        region: Region,
    ) -> Result<Window>;
    fn destroy_window(
        &self,
        window: Window,
    );
    fn init_client(
        &self,
        window: Window,
    );
    fn select_client_input(
        &self,
        window: Window,
        structure: bool,
    );
    fn clear_input(
        &self,
        window: Window,
    );
    fn get_window_attributes(
        &self,
        window: Window,
    ) -> Option<WindowAttributes>;
    fn map_window(
        &self,
        window: Window,
    );
    fn map_subwindows(
        &self,
        window: Window,
    );
    fn unmap_window(
        &self,
        window: Window,
    );
    fn reparent_window(
        &self,
        window: Window,
        parent: Window,
        pos: Pos,
    );
    fn insert_window_in_save_set(
        &self,
        window: Window,
    );
    fn remove_window_from_save_set(
        &self,
        window: Window,
    );
    fn close_window(
        &self,
        window: Window,
    ) -> bool;
    fn send_take_focus(
        &self,
        window: Window,
        time: Timestamp,
    );
    fn send_configure_notify(
        &self,
        window: Window,
        region: Region,
        border_width: u32,
        above: Window,
    );
    fn place_window(
        &self,
        window: Window,
        region: &Region,
    );
    fn move_window(
        &self,
        window: Window,
        pos: Pos,
    );
    fn raise_window(
        &self,
        window: Window,
    );
    fn restack_windows(
        &self,
        windows: &[Window],
    );
    fn focus_window(
        &self,
        window: Window,
    );
    fn focus_pointer_root(&self);
    fn get_focused_window(&self) -> Option<Window>;
    fn set_window_border_width(
        &self,
        window: Window,
        width: u32,
    );
    fn set_window_border_color(
        &self,
        window: Window,
        color: u32,
    );
    fn fill_window(
        &self,
        window: Window,
        region: Region,
        color: u32,
    );
    fn draw_outline(
        &self,
        region: Region,
    );

    // ICCCM
    fn get_icccm_window_name(
        &self,
        window: Window,
    ) -> String;
    fn get_icccm_window_state(
        &self,
        window: Window,
    ) -> Option<IcccmWindowState>;
    fn set_icccm_window_state(
        &self,
        window: Window,
        state: IcccmWindowState,
    );
    fn delete_icccm_window_state(
        &self,
        window: Window,
    );
    fn get_icccm_window_transient_for(
        &self,
        window: Window,
    ) -> Option<Window>;
    fn get_icccm_window_hints(
        &self,
        window: Window,
    ) -> Option<Hints>;
    fn get_icccm_window_size_hints(
        &self,
        window: Window,
        screen_dim: Dim,
    ) -> Option<SizeHints>;
    fn get_icccm_window_protocols(
        &self,
        window: Window,
    ) -> HashSet<Protocol>;
    fn get_motif_hints(
        &self,
        window: Window,
    ) -> Option<MotifHints>;

    // EWMH
    fn init_wm_properties(
        &self,
        wm_name: &str,
        desktop_names: &[&str],
    );
    fn update_desktops(
        &self,
        desktop_names: &[&str],
    );
    fn set_current_desktop(
        &self,
        index: usize,
    );
    fn set_active_window(
        &self,
        window: Option<Window>,
    );
    fn set_workarea(
        &self,
        workarea: Region,
        desktops: usize,
    );
    fn update_client_list(
        &self,
        clients: &[Window],
    );
    fn update_client_list_stacking(
        &self,
        clients: &[Window],
    );
    fn set_window_desktop(
        &self,
        window: Window,
        index: Option<usize>,
    );
    fn get_window_desktop(
        &self,
        window: Window,
    ) -> Option<Option<usize>>;
    fn set_window_states(
        &self,
        window: Window,
        states: &[WindowState],
    );
    fn get_window_states(
        &self,
        window: Window,
    ) -> Vec<WindowState>;
    fn get_window_types(
        &self,
        window: Window,
    ) -> Vec<WindowType>;
    fn set_allowed_actions(
        &self,
        window: Window,
        actions: &[AllowedAction],
    );
    fn clear_window_properties(
        &self,
        window: Window,
    );
    fn set_window_frame_extents(
        &self,
        window: Window,
        extents: Extents,
    );
    fn get_window_strut(
        &self,
        window: Window,
    ) -> Option<Vec<Option<Strut>>>;
    fn get_window_strut_partial(
        &self,
        window: Window,
    ) -> Option<Vec<Option<Strut>>>;
}
