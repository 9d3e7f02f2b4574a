use crate::config::Config;
use crate::workspace::Workspace;

use winsys::connection::Connection;
use winsys::geometry::Region;
use winsys::screen::Screen;
use winsys::window::Window;

use std::cell::Cell;

/// Owns the workspaces of a screen and the area left to clients once
/// every strut is taken off.
pub struct ScreenController {
    screen: Screen,
    workspaces: Vec<Workspace>,
    current: Cell<usize>,
}

impl ScreenController {
    pub fn new(
        screen: Screen,
        config: &Config,
    ) -> Self {
        let workspaces = (0..config.workspace_count)
            .map(|index| Workspace::new(index, config.workspace_name(index)))
            .collect();

        screen.compute_available_region();

        Self {
            screen,
            workspaces,
            current: Cell::new(0),
        }
    }

    #[inline]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    #[inline]
    pub fn full_region(&self) -> Region {
        self.screen.full_region()
    }

    #[inline]
    pub fn available_region(&self) -> Region {
        self.screen.available_region()
    }

    #[inline]
    pub fn workspace_count(&self) -> usize {
        self.workspaces.len()
    }

    #[inline]
    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    #[inline]
    pub fn workspace(
        &self,
        index: usize,
    ) -> Option<&Workspace> {
        self.workspaces.get(index)
    }

    #[inline]
    pub fn current_index(&self) -> usize {
        self.current.get()
    }

    #[inline]
    pub fn current_workspace(&self) -> &Workspace {
        &self.workspaces[self.current.get()]
    }

    /// Makes `index` current. Returns the previous index when it changed.
    pub fn set_current(
        &self,
        index: usize,
    ) -> Option<usize> {
        let previous = self.current.get();

        if index >= self.workspaces.len() || index == previous {
            return None;
        }

        self.current.set(index);
        Some(previous)
    }

    /// The workspace a window is a member of.
    pub fn workspace_of(
        &self,
        window: Window,
    ) -> Option<&Workspace> {
        self.workspaces
            .iter()
            .find(|workspace| workspace.contains(window))
    }

    pub fn workspace_names(&self) -> Vec<String> {
        self.workspaces
            .iter()
            .map(|workspace| workspace.name())
            .collect()
    }

    pub fn rename_workspaces(
        &self,
        config: &Config,
    ) {
        for workspace in self.workspaces.iter() {
            workspace.set_name(config.workspace_name(workspace.number()));
        }
    }

    /// Re-reads the struts a window reserves. Returns whether the
    /// available area changed as a result.
    pub fn update_struts(
        &self,
        conn: &dyn Connection,
        window: Window,
    ) -> bool {
        match conn.get_window_strut(window) {
            Some(struts) => self.screen.update_struts(window, struts),
            None if self.screen.has_strut_window(window) => self.screen.remove_window_strut(window),
            None => return false,
        }

        self.recompute()
    }

    pub fn remove_struts(
        &self,
        window: Window,
    ) -> bool {
        if !self.screen.has_strut_window(window) {
            return false;
        }

        self.screen.remove_window_strut(window);
        self.recompute()
    }

    pub fn set_full_region(
        &self,
        region: Region,
    ) -> bool {
        let previous = self.screen.available_region();
        self.screen.set_full_region(region);
        previous != self.screen.available_region()
    }

    fn recompute(&self) -> bool {
        let changed = self.screen.compute_available_region();

        if changed {
            info!("available area is now {:?}", self.screen.available_region());
        }

        changed
    }

    pub fn publish_desktops(
        &self,
        conn: &dyn Connection,
    ) {
        let names = self.workspace_names();
        conn.update_desktops(&names.iter().map(String::as_str).collect::<Vec<&str>>());
    }

    pub fn publish_workarea(
        &self,
        conn: &dyn Connection,
    ) {
        conn.set_workarea(self.available_region(), self.workspaces.len());
    }

    pub fn publish_current(
        &self,
        conn: &dyn Connection,
    ) {
        conn.set_current_desktop(self.current.get());
    }
}
