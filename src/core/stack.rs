use crate::util::BuildIdHasher;

use winsys::window::Window;

use std::collections::HashMap;
use std::vec::Vec;

/// Stacking bands; a window never rises above a window of a higher
/// layer, nor sinks below one of a lower layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StackLayer {
    Desktop,
    Below,
    Normal,
    Above,
    Fullscreen,
}

impl Default for StackLayer {
    fn default() -> Self {
        Self::Normal
    }
}

/// A stacking order, topmost window first, kept sorted by layer.
#[derive(Debug, Default)]
pub struct StackManager {
    layers: HashMap<Window, StackLayer, BuildIdHasher>,
    windows: Vec<Window>,
}

impl StackManager {
    pub fn new() -> Self {
        Self {
            layers: HashMap::with_capacity_and_hasher(20, BuildIdHasher),
            windows: Vec::with_capacity(20),
        }
    }

    #[inline]
    pub fn contains(
        &self,
        window: Window,
    ) -> bool {
        self.layers.contains_key(&window)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    #[inline]
    pub fn layer(
        &self,
        window: Window,
    ) -> Option<StackLayer> {
        self.layers.get(&window).copied()
    }

    #[inline]
    pub fn top(&self) -> Option<Window> {
        self.windows.first().copied()
    }

    #[inline]
    pub fn top_first(&self) -> &[Window] {
        &self.windows
    }

    pub fn bottom_first(&self) -> Vec<Window> {
        self.windows.iter().rev().copied().collect()
    }

    fn layer_of(
        &self,
        window: Window,
    ) -> StackLayer {
        self.layers.get(&window).copied().unwrap_or_default()
    }

    /// Places `window` above every other window of its layer.
    pub fn insert_top(
        &mut self,
        window: Window,
        layer: StackLayer,
    ) {
        self.remove(window);

        let index = self
            .windows
            .iter()
            .position(|&other| self.layer_of(other) <= layer)
            .unwrap_or(self.windows.len());

        self.windows.insert(index, window);
        self.layers.insert(window, layer);
    }

    /// Places `window` below every other window of its layer.
    pub fn insert_bottom(
        &mut self,
        window: Window,
        layer: StackLayer,
    ) {
        self.remove(window);

        let index = self
            .windows
            .iter()
            .position(|&other| self.layer_of(other) < layer)
            .unwrap_or(self.windows.len());

        self.windows.insert(index, window);
        self.layers.insert(window, layer);
    }

    pub fn remove(
        &mut self,
        window: Window,
    ) -> bool {
        if self.layers.remove(&window).is_none() {
            return false;
        }

        self.windows.retain(|&other| other != window);
        true
    }

    /// Moves a window into another layer, on top of its new band.
    pub fn set_layer(
        &mut self,
        window: Window,
        layer: StackLayer,
    ) -> bool {
        if !self.contains(window) || self.layer(window) == Some(layer) {
            return false;
        }

        self.insert_top(window, layer);
        true
    }

    /// Raises a batch given bottom first, so the last window ends up
    /// topmost within its layer. Windows not in the stack are skipped.
    pub fn raise(
        &mut self,
        batch: &[Window],
    ) {
        for &window in batch {
            if let Some(layer) = self.layer(window) {
                self.insert_top(window, layer);
            }
        }
    }

    /// Lowers a batch given top first, so the last window ends up
    /// bottommost within its layer.
    pub fn lower(
        &mut self,
        batch: &[Window],
    ) {
        for &window in batch {
            if let Some(layer) = self.layer(window) {
                self.insert_bottom(window, layer);
            }
        }
    }
}
