use crate::config::ColDirection;
use crate::config::PlacementPolicy;
use crate::config::RowDirection;

use winsys::geometry::Dim;
use winsys::geometry::Pos;
use winsys::geometry::Region;

/// Chooses positions for new frames inside the available area.
///
/// Regions handed to the placer are outer frame regions, borders
/// included. Frames that share a single row or column of edge pixels are
/// not considered to overlap, so placed frames sit flush against their
/// neighbours.
pub struct Placer;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PlacementRequest {
    pub policy: PlacementPolicy,
    pub row_direction: RowDirection,
    pub col_direction: ColDirection,
}

impl Placer {
    pub fn place(
        request: PlacementRequest,
        avail: Region,
        dim: Dim,
        others: &[Region],
        cascade: &mut Pos,
    ) -> Pos {
        let dim = Dim {
            w: std::cmp::max(dim.w, Self::MIN_FRAME_DIM.w),
            h: std::cmp::max(dim.h, Self::MIN_FRAME_DIM.h),
        };

        match request.policy {
            PlacementPolicy::Cascade => Self::cascade(avail, dim, cascade),
            PlacementPolicy::RowSmart | PlacementPolicy::ColSmart => {
                // oversized frames are scanned as if they just fit
                let dim = Dim {
                    w: if dim.w >= avail.dim.w { avail.dim.w - 1 } else { dim.w },
                    h: if dim.h >= avail.dim.h { avail.dim.h - 1 } else { dim.h },
                };

                let mirror_x = request.row_direction == RowDirection::RightToLeft;
                let mirror_y = request.col_direction == ColDirection::BottomToTop;

                let mirror = |region: Region| {
                    let mut region = region;

                    if mirror_x {
                        region.pos.x = avail.left() + avail.right() - region.right();
                    }

                    if mirror_y {
                        region.pos.y = avail.top() + avail.bottom() - region.bottom();
                    }

                    region
                };

                let others: Vec<Region> = others.iter().copied().map(mirror).collect();

                let pos = if request.policy == PlacementPolicy::RowSmart {
                    Self::scan_rows(avail, dim, &others)
                } else {
                    let transposed: Vec<Region> = others.iter().copied().map(transpose).collect();
                    let pos = Self::scan_rows(transpose(avail), transpose_dim(dim), &transposed);

                    Pos {
                        x: pos.y,
                        y: pos.x,
                    }
                };

                mirror(Region {
                    pos,
                    dim,
                })
                .pos
            },
        }
    }

    fn overlap(
        region: Region,
        others: &[Region],
    ) -> i64 {
        others
            .iter()
            .filter_map(|other| other.intersection(region))
            .map(|shared| i64::from(shared.dim.w - 1) * i64::from(shared.dim.h - 1))
            .sum()
    }

    /// Walks candidate positions left to right, then top to bottom,
    /// jumping past the edges of the frames in the way. Returns the first
    /// position free of overlap or, failing that, the least overlapping
    /// one seen; the area origin when nothing fits at all.
    fn scan_rows(
        avail: Region,
        dim: Dim,
        others: &[Region],
    ) -> Pos {
        let (width, height) = (dim.w, dim.h);
        let mut x = avail.left();
        let mut y = avail.top();
        let mut place = avail.pos;
        let mut min = i64::MAX;

        loop {
            if y + height > avail.bottom() {
                break;
            }

            if x + width > avail.right() {
                x = avail.left();

                let mut possible = avail.bottom();
                if possible - height > y {
                    possible -= height;
                }

                for other in others {
                    if other.bottom() > y {
                        possible = std::cmp::min(possible, other.bottom());
                    }

                    if other.top() - height > y {
                        possible = std::cmp::min(possible, other.top() - height);
                    }
                }

                y = possible;
                continue;
            }

            let overlap = Self::overlap(Region::new(x, y, width, height), others);

            if overlap == 0 {
                return Pos::new(x, y);
            }

            if overlap < min {
                min = overlap;
                place = Pos::new(x, y);
            }

            let mut possible = avail.right();
            if possible - width > x {
                possible -= width;
            }

            for other in others
                .iter()
                .filter(|other| y < other.bottom() && other.top() < y + height)
            {
                if other.right() > x {
                    possible = std::cmp::min(possible, other.right());
                }

                if other.left() - width > x {
                    possible = std::cmp::min(possible, other.left() - width);
                }
            }

            x = possible;
        }

        place
    }

    /// Steps diagonally from the area origin, wrapping around the area;
    /// frames that would cross its far edges are centered instead.
    fn cascade(
        avail: Region,
        dim: Dim,
        cascade: &mut Pos,
    ) -> Pos {
        let pos = avail.pos + *cascade;

        let pos = if pos.x + dim.w > avail.right() || pos.y + dim.h > avail.bottom() {
            avail.from_absolute_inner_center(dim).pos
        } else {
            pos
        };

        cascade.x = (cascade.x + Self::CASCADE_STEP) % std::cmp::max(avail.dim.w, 1);
        cascade.y = (cascade.y + Self::CASCADE_STEP) % std::cmp::max(avail.dim.h, 1);

        pos
    }
}

fn transpose(region: Region) -> Region {
    Region::new(region.pos.y, region.pos.x, region.dim.h, region.dim.w)
}

fn transpose_dim(dim: Dim) -> Dim {
    Dim::new(dim.h, dim.w)
}
