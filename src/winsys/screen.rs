use crate::geometry::Edge;
use crate::geometry::Region;
use crate::geometry::Strut;
use crate::window::Window;

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::HashMap;
use std::vec::Vec;

const EDGES: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

#[derive(Debug, Clone)]
pub struct Screen {
    number: Cell<usize>,
    full_region: Cell<Region>,
    available_region: Cell<Region>,
    windows: RefCell<HashMap<Window, Vec<Edge>>>,
    struts: RefCell<HashMap<Edge, Vec<Strut>>>,
}

impl std::cmp::PartialEq<Self> for Screen {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.number == other.number
    }
}

impl Screen {
    pub fn new(
        region: Region,
        number: usize,
    ) -> Self {
        Screen::init(Self {
            number: Cell::new(number),
            full_region: Cell::new(region),
            available_region: Cell::new(region),
            windows: RefCell::new(HashMap::new()),
            struts: RefCell::new(HashMap::with_capacity(4)),
        })
    }

    fn init(self) -> Self {
        let mut struts = self.struts.borrow_mut();

        for &edge in EDGES.iter() {
            struts.insert(edge, Vec::with_capacity(1));
        }

        drop(struts);
        self
    }

    #[inline]
    pub fn number(&self) -> usize {
        self.number.get()
    }

    #[inline]
    pub fn full_region(&self) -> Region {
        self.full_region.get()
    }

    #[inline]
    pub fn set_full_region(
        &self,
        region: Region,
    ) {
        self.full_region.set(region);
        self.compute_available_region();
    }

    #[inline]
    pub fn available_region(&self) -> Region {
        self.available_region.get()
    }

    /// Recomputes the full region minus the widest strut on each edge.
    /// Returns whether the available region changed.
    pub fn compute_available_region(&self) -> bool {
        let mut region = self.full_region.get();

        if let Some(width) = self.max_strut_val(Edge::Left) {
            region.pos.x += width as i32;
            region.dim.w -= width as i32;
        }

        if let Some(width) = self.max_strut_val(Edge::Right) {
            region.dim.w -= width as i32;
        }

        if let Some(width) = self.max_strut_val(Edge::Top) {
            region.pos.y += width as i32;
            region.dim.h -= width as i32;
        }

        if let Some(width) = self.max_strut_val(Edge::Bottom) {
            region.dim.h -= width as i32;
        }

        region.dim.w = std::cmp::max(region.dim.w, 1);
        region.dim.h = std::cmp::max(region.dim.h, 1);

        let changed = region != self.available_region.get();
        self.available_region.set(region);
        changed
    }

    pub fn add_strut(
        &self,
        edge: Edge,
        window: Window,
        width: u32,
    ) {
        if width == 0 {
            return;
        }

        let mut struts = self.struts.borrow_mut();

        if let Some(strut) = struts.get_mut(&edge) {
            let index = strut.binary_search_by(|s| s.width.cmp(&width));
            strut.insert(index.unwrap_or_else(|e| e), Strut::new(window, width));

            let mut windows = self.windows.borrow_mut();
            let edges = windows.entry(window).or_insert_with(Vec::new);

            if !edges.contains(&edge) {
                edges.push(edge);
            }
        }
    }

    /// Registers the struts of a window in left, right, top, bottom order.
    pub fn add_struts(
        &self,
        struts: Vec<Option<Strut>>,
    ) {
        for (&edge, strut) in EDGES.iter().zip(struts.into_iter()) {
            if let Some(strut) = strut {
                self.add_strut(edge, strut.window, strut.width);
            }
        }
    }

    pub fn remove_window_strut(
        &self,
        window: Window,
    ) {
        self.struts.borrow_mut().iter_mut().for_each(|(_, struts)| {
            // a window may have strut at multiple screen edges
            struts.retain(|s| s.window != window);
        });

        self.windows.borrow_mut().remove(&window);
    }

    pub fn update_struts(
        &self,
        window: Window,
        struts: Vec<Option<Strut>>,
    ) {
        self.remove_window_strut(window);
        self.add_struts(struts);
    }

    pub fn max_strut_val(
        &self,
        edge: Edge,
    ) -> Option<u32> {
        self.struts
            .borrow()
            .get(&edge)
            .and_then(|struts| struts.last())
            .map(|strut| strut.width)
    }

    #[inline]
    pub fn has_strut_window(
        &self,
        window: Window,
    ) -> bool {
        self.windows.borrow().contains_key(&window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widest_strut_per_edge_wins() {
        let screen = Screen::new(Region::new(0, 0, 1920, 1080), 0);

        screen.add_strut(Edge::Top, 10, 24);
        screen.add_strut(Edge::Top, 11, 30);
        screen.add_strut(Edge::Left, 12, 64);

        assert!(screen.compute_available_region());
        assert_eq!(screen.available_region(), Region::new(64, 30, 1856, 1050));
    }

    #[test]
    fn removing_a_strut_window_restores_the_area() {
        let screen = Screen::new(Region::new(0, 0, 1920, 1080), 0);

        screen.add_struts(vec![None, None, None, Some(Strut::new(7, 40))]);
        screen.compute_available_region();
        assert_eq!(screen.available_region().dim.h, 1040);
        assert!(screen.has_strut_window(7));

        screen.remove_window_strut(7);
        assert!(screen.compute_available_region());
        assert_eq!(screen.available_region(), screen.full_region());
        assert!(!screen.has_strut_window(7));
    }

    #[test]
    fn updating_struts_replaces_previous_values() {
        let screen = Screen::new(Region::new(0, 0, 800, 600), 0);

        screen.add_strut(Edge::Bottom, 3, 50);
        screen.update_struts(3, vec![None, Some(Strut::new(3, 20)), None, None]);
        screen.compute_available_region();

        assert_eq!(screen.available_region(), Region::new(0, 0, 780, 600));
    }
}
