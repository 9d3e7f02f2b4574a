use crate::window::Window;

use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Sub;
use std::ops::SubAssign;

pub type Extents = Padding;

#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Default for Pos {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
        }
    }
}

impl Pos {
    pub fn new(
        x: i32,
        y: i32,
    ) -> Self {
        Self {
            x,
            y,
        }
    }

    pub fn values(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn dist(
        &self,
        pos: Self,
    ) -> Distance {
        Distance {
            dx: (pos.x - self.x),
            dy: (pos.y - self.y),
        }
    }
}

impl Add<Pos> for Pos {
    type Output = Self;

    fn add(
        self,
        other: Pos,
    ) -> Self::Output {
        Self::Output {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct Dim {
    pub w: i32,
    pub h: i32,
}

impl Default for Dim {
    fn default() -> Self {
        Self {
            w: 0,
            h: 0,
        }
    }
}

impl Dim {
    pub fn new(
        w: i32,
        h: i32,
    ) -> Self {
        Self {
            w,
            h,
        }
    }

    pub fn values(&self) -> (i32, i32) {
        (self.w, self.h)
    }

    pub fn area(&self) -> i64 {
        self.w.max(0) as i64 * self.h.max(0) as i64
    }
}

impl Sub for Pos {
    type Output = Dim;

    fn sub(
        self,
        other: Self,
    ) -> Self::Output {
        Self::Output {
            w: self.x - other.x,
            h: self.y - other.y,
        }
    }
}

/// A rectangle in root window coordinates.
///
/// `right` and `bottom` name the last pixel column and row that still
/// belong to the rectangle, so a 1x1 region at the origin has both
/// equal to zero.
#[derive(Debug, Copy, Clone, Hash, PartialOrd, Ord, PartialEq, Eq)]
pub struct Region {
    pub pos: Pos,
    pub dim: Dim,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            pos: Default::default(),
            dim: Default::default(),
        }
    }
}

impl Region {
    pub fn new(
        x: i32,
        y: i32,
        w: i32,
        h: i32,
    ) -> Self {
        Self {
            pos: Pos {
                x,
                y,
            },
            dim: Dim {
                w,
                h,
            },
        }
    }

    /// Builds a region from inclusive edge coordinates.
    pub fn from_coords(
        left: i32,
        top: i32,
        right: i32,
        bottom: i32,
    ) -> Self {
        Self::new(left, top, right - left + 1, bottom - top + 1)
    }

    pub fn values(&self) -> (Pos, Dim) {
        (self.pos, self.dim)
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.pos.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.pos.y
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.pos.x + self.dim.w - 1
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.pos.y + self.dim.h - 1
    }

    pub fn is_empty(&self) -> bool {
        self.dim.w <= 0 || self.dim.h <= 0
    }

    pub fn encompasses(
        &self,
        pos: Pos,
    ) -> bool {
        pos.x >= self.left()
            && pos.y >= self.top()
            && pos.x <= self.right()
            && pos.y <= self.bottom()
    }

    pub fn contains(
        &self,
        region: Region,
    ) -> bool {
        region.left() >= self.left()
            && region.top() >= self.top()
            && region.right() <= self.right()
            && region.bottom() <= self.bottom()
    }

    pub fn intersects(
        &self,
        region: Region,
    ) -> bool {
        !self.is_empty()
            && !region.is_empty()
            && self.left() <= region.right()
            && region.left() <= self.right()
            && self.top() <= region.bottom()
            && region.top() <= self.bottom()
    }

    pub fn intersection(
        &self,
        region: Region,
    ) -> Option<Region> {
        if !self.intersects(region) {
            return None;
        }

        Some(Region::from_coords(
            std::cmp::max(self.left(), region.left()),
            std::cmp::max(self.top(), region.top()),
            std::cmp::min(self.right(), region.right()),
            std::cmp::min(self.bottom(), region.bottom()),
        ))
    }

    pub fn union(
        &self,
        region: Region,
    ) -> Region {
        if self.is_empty() {
            return region;
        }

        if region.is_empty() {
            return *self;
        }

        Region::from_coords(
            std::cmp::min(self.left(), region.left()),
            std::cmp::min(self.top(), region.top()),
            std::cmp::max(self.right(), region.right()),
            std::cmp::max(self.bottom(), region.bottom()),
        )
    }

    pub fn overlap_area(
        &self,
        region: Region,
    ) -> i64 {
        self.intersection(region)
            .map_or(0, |intersection| intersection.dim.area())
    }

    pub fn from_absolute_inner_center(
        self,
        dim: Dim,
    ) -> Self {
        Self {
            pos: Pos {
                x: if dim.w > self.dim.w {
                    self.pos.x
                } else {
                    self.pos.x + (self.dim.w - dim.w) / 2
                },
                y: if dim.h > self.dim.h {
                    self.pos.y
                } else {
                    self.pos.y + (self.dim.h - dim.h) / 2
                },
            },
            dim,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Padding {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            left: 0,
            right: 0,
            top: 0,
            bottom: 0,
        }
    }
}

impl Padding {
    pub fn with_each_edge(size: i32) -> Self {
        Self {
            left: size,
            right: size,
            top: size,
            bottom: size,
        }
    }

    #[inline]
    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    #[inline]
    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

impl Add<Padding> for Region {
    type Output = Self;

    fn add(
        self,
        padding: Padding,
    ) -> Self::Output {
        Self::Output {
            pos: Pos {
                x: self.pos.x - padding.left,
                y: self.pos.y - padding.top,
            },
            dim: self.dim + padding,
        }
    }
}

impl Sub<Padding> for Region {
    type Output = Self;

    fn sub(
        self,
        padding: Padding,
    ) -> Self::Output {
        Self::Output {
            pos: Pos {
                x: self.pos.x + padding.left,
                y: self.pos.y + padding.top,
            },
            dim: self.dim - padding,
        }
    }
}

impl AddAssign<Padding> for Region {
    fn add_assign(
        &mut self,
        padding: Padding,
    ) {
        *self = *self + padding;
    }
}

impl SubAssign<Padding> for Region {
    fn sub_assign(
        &mut self,
        padding: Padding,
    ) {
        *self = *self - padding;
    }
}

impl Add<Padding> for Dim {
    type Output = Self;

    fn add(
        self,
        padding: Padding,
    ) -> Self::Output {
        Self::Output {
            w: self.w + padding.horizontal(),
            h: self.h + padding.vertical(),
        }
    }
}

impl Sub<Padding> for Dim {
    type Output = Self;

    fn sub(
        self,
        padding: Padding,
    ) -> Self::Output {
        Self::Output {
            w: self.w - padding.horizontal(),
            h: self.h - padding.vertical(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub struct Distance {
    pub dx: i32,
    pub dy: i32,
}

impl Distance {
    pub fn values(&self) -> (i32, i32) {
        (self.dx, self.dy)
    }
}

impl Add<Distance> for Pos {
    type Output = Self;

    fn add(
        self,
        dist: Distance,
    ) -> Self::Output {
        Self::Output {
            x: self.x + dist.dx,
            y: self.y + dist.dy,
        }
    }
}

impl AddAssign<Distance> for Pos {
    fn add_assign(
        &mut self,
        dist: Distance,
    ) {
        *self = *self + dist;
    }
}

impl Sub<Distance> for Pos {
    type Output = Self;

    fn sub(
        self,
        dist: Distance,
    ) -> Self::Output {
        Self::Output {
            x: self.x - dist.dx,
            y: self.y - dist.dy,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, Ord, PartialEq, Eq)]
pub struct Ratio {
    pub numerator: i32,
    pub denominator: i32,
}

impl Default for Ratio {
    fn default() -> Self {
        Self {
            numerator: 1,
            denominator: 1,
        }
    }
}

impl Ratio {
    pub fn new(
        numerator: i32,
        denominator: i32,
    ) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Strut {
    pub window: Window,
    pub width: u32,
}

impl Strut {
    pub fn new(
        window: Window,
        width: u32,
    ) -> Self {
        Self {
            window,
            width,
        }
    }
}

impl PartialOrd for Strut {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Strut {
    fn cmp(
        &self,
        other: &Self,
    ) -> std::cmp::Ordering {
        self.width.cmp(&other.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inclusive_edges() {
        let region = Region::new(10, 20, 100, 50);

        assert_eq!(region.right(), 109);
        assert_eq!(region.bottom(), 69);
        assert_eq!(Region::from_coords(10, 20, 109, 69), region);
    }

    #[test]
    fn intersection_of_overlapping_regions() {
        let a = Region::new(0, 0, 100, 100);
        let b = Region::new(50, 60, 100, 100);

        assert_eq!(a.intersection(b), Some(Region::new(50, 60, 50, 40)));
        assert_eq!(a.overlap_area(b), 2000);
    }

    #[test]
    fn adjacent_regions_do_not_intersect() {
        let a = Region::new(0, 0, 100, 100);
        let b = Region::new(100, 0, 100, 100);

        assert!(!a.intersects(b));
        assert_eq!(a.overlap_area(b), 0);
    }

    #[test]
    fn union_is_bounding_box() {
        let a = Region::new(0, 0, 10, 10);
        let b = Region::new(20, 5, 10, 10);

        assert_eq!(a.union(b), Region::new(0, 0, 30, 15));
        assert_eq!(Region::default().union(b), b);
    }

    #[test]
    fn padding_round_trip() {
        let padding = Padding {
            left: 1,
            right: 2,
            top: 18,
            bottom: 7,
        };

        let client = Region::new(100, 100, 300, 200);
        let frame = client + padding;

        assert_eq!(frame, Region::new(99, 82, 303, 225));
        assert_eq!(frame - padding, client);
    }
}
