use crate::stack::StackLayer;
use crate::stack::StackManager;

use winsys::geometry::Corner;
use winsys::geometry::Pos;
use winsys::geometry::Region;
use winsys::window::Window;

use std::cell::Cell;
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum BufferKind {
    Move,
    Resize,
}

/// State of an interactive move or resize between button press and
/// release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    kind: BufferKind,
    window: Cell<Option<Window>>,
    anchor: Cell<Option<Corner>>,
    grip_pos: Cell<Option<Pos>>,
    window_region: Cell<Option<Region>>,
    outline: Cell<Option<Region>>,
}

impl Buffer {
    pub fn new(kind: BufferKind) -> Self {
        Self {
            kind,
            window: Cell::new(None),
            anchor: Cell::new(None),
            grip_pos: Cell::new(None),
            window_region: Cell::new(None),
            outline: Cell::new(None),
        }
    }

    pub fn set(
        &self,
        window: Window,
        anchor: Corner,
        pos: Pos,
        region: Region,
    ) {
        self.window.set(Some(window));
        self.anchor.set(Some(anchor));
        self.grip_pos.set(Some(pos));
        self.window_region.set(Some(region));
        self.outline.set(None);
    }

    pub fn unset(&self) {
        self.window.set(None);
        self.anchor.set(None);
        self.grip_pos.set(None);
        self.window_region.set(None);
        self.outline.set(None);
    }

    #[inline]
    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.window.get().is_some()
    }

    #[inline]
    pub fn window(&self) -> Option<Window> {
        self.window.get()
    }

    #[inline]
    pub fn anchor(&self) -> Option<Corner> {
        self.anchor.get()
    }

    #[inline]
    pub fn grip_pos(&self) -> Option<Pos> {
        self.grip_pos.get()
    }

    #[inline]
    pub fn window_region(&self) -> Option<Region> {
        self.window_region.get()
    }

    /// The outline currently drawn on the root window, if any.
    #[inline]
    pub fn outline(&self) -> Option<Region> {
        self.outline.get()
    }

    #[inline]
    pub fn set_outline(
        &self,
        outline: Option<Region>,
    ) {
        self.outline.set(outline);
    }
}

/// A virtual desktop: its members in insertion order and, separately,
/// the stacking order of those that are not iconic.
#[derive(Debug)]
pub struct Workspace {
    number: usize,
    name: RefCell<String>,
    members: RefCell<Vec<Window>>,
    stack: RefCell<StackManager>,
    focused: Cell<Option<Window>>,
    last_focused: Cell<Option<Window>>,
    cascade: Cell<Pos>,
}

impl Workspace {
    pub fn new(
        number: usize,
        name: impl Into<String>,
    ) -> Self {
        Self {
            number,
            name: RefCell::new(name.into()),
            members: RefCell::new(Vec::with_capacity(10)),
            stack: RefCell::new(StackManager::new()),
            focused: Cell::new(None),
            last_focused: Cell::new(None),
            cascade: Cell::new(Pos::default()),
        }
    }

    #[inline]
    pub fn number(&self) -> usize {
        self.number
    }

    #[inline]
    pub fn name(&self) -> String {
        self.name.borrow().to_owned()
    }

    #[inline]
    pub fn set_name(
        &self,
        name: impl Into<String>,
    ) {
        self.name.replace(name.into());
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.borrow().is_empty()
    }

    #[inline]
    pub fn contains(
        &self,
        window: Window,
    ) -> bool {
        self.members.borrow().contains(&window)
    }

    /// Members in insertion order; a member's index is its window number.
    pub fn members(&self) -> Vec<Window> {
        self.members.borrow().clone()
    }

    pub fn window_number(
        &self,
        window: Window,
    ) -> Option<usize> {
        self.members.borrow().iter().position(|&member| member == window)
    }

    #[inline]
    pub fn focused(&self) -> Option<Window> {
        self.focused.get()
    }

    #[inline]
    pub fn set_focused(
        &self,
        window: Option<Window>,
    ) {
        self.focused.set(window);

        if window.is_some() {
            self.last_focused.set(window);
        }
    }

    #[inline]
    pub fn last_focused(&self) -> Option<Window> {
        self.last_focused.get()
    }

    pub fn cascade(&self) -> Pos {
        self.cascade.get()
    }

    pub fn set_cascade(
        &self,
        cascade: Pos,
    ) {
        self.cascade.set(cascade);
    }

    /// Adds a new member on top of its layer; iconic windows are only
    /// recorded as members.
    pub fn add(
        &self,
        window: Window,
        layer: StackLayer,
        iconic: bool,
    ) {
        let mut members = self.members.borrow_mut();

        if members.contains(&window) {
            return;
        }

        members.push(window);

        if !iconic {
            self.stack.borrow_mut().insert_top(window, layer);
        }
    }

    /// Drops a member; the remaining members are renumbered densely in
    /// their original order. Returns whether the window was focused here.
    pub fn remove(
        &self,
        window: Window,
    ) -> bool {
        self.members.borrow_mut().retain(|&member| member != window);
        self.stack.borrow_mut().remove(window);

        if self.last_focused.get() == Some(window) {
            self.last_focused.set(None);
        }

        if self.focused.get() == Some(window) {
            self.focused.set(None);
            return true;
        }

        false
    }

    /// Candidate to take focus after a focused member went away: its
    /// owner when that is still stacked here, else the topmost member.
    pub fn focus_fallback(
        &self,
        owner: Option<Window>,
    ) -> Option<Window> {
        let stack = self.stack.borrow();

        owner
            .filter(|&owner| stack.contains(owner))
            .or_else(|| stack.top())
    }

    #[inline]
    pub fn is_stacked(
        &self,
        window: Window,
    ) -> bool {
        self.stack.borrow().contains(window)
    }

    pub fn stack_window(
        &self,
        window: Window,
        layer: StackLayer,
    ) {
        if self.contains(window) {
            self.stack.borrow_mut().insert_top(window, layer);
        }
    }

    pub fn unstack_window(
        &self,
        window: Window,
    ) -> bool {
        self.stack.borrow_mut().remove(window)
    }

    pub fn set_layer(
        &self,
        window: Window,
        layer: StackLayer,
    ) -> bool {
        self.stack.borrow_mut().set_layer(window, layer)
    }

    /// Raises a transient chain given owner first.
    pub fn raise(
        &self,
        batch: &[Window],
    ) {
        self.stack.borrow_mut().raise(batch);
    }

    /// Lowers a transient chain given topmost transient first.
    pub fn lower(
        &self,
        batch: &[Window],
    ) {
        self.stack.borrow_mut().lower(batch);
    }

    pub fn stack_top_first(&self) -> Vec<Window> {
        self.stack.borrow().top_first().to_vec()
    }

    pub fn stack_bottom_first(&self) -> Vec<Window> {
        self.stack.borrow().bottom_first()
    }

    /// Moves a member into this workspace from another, keeping its
    /// stacking layer. Used to carry sticky windows across a switch.
    pub fn transfer_from(
        &self,
        other: &Workspace,
        window: Window,
    ) {
        let layer = other.stack.borrow().layer(window);
        other.remove(window);

        self.members.borrow_mut().push(window);

        if let Some(layer) = layer {
            self.stack.borrow_mut().insert_top(window, layer);
        }
    }
}
