//! Two-level squarified treemap.
//!
//! Follows d3-hierarchy's `treemap()` with `treemapSquarify`: nodes are
//! sorted by weight, each parent's box is shrunk by its outer padding, the
//! children are tiled into what is left, and every tile is then inset by
//! half the inner padding so neighbours end up `inner` apart.

use std::cmp::Ordering;

/// Golden ratio, the aspect ratio squarify aims for.
const PHI: f64 = 1.618_033_988_749_895;

/// Axis-aligned box in layout units, `x1 >= x0` and `y1 >= y0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Bounds {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Bounds {
        Bounds { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    #[cfg(test)]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Shrink by `p` on every side, collapsing to the midline if too small.
    fn shrink(self, p: f64) -> Bounds {
        self.inset(p, p, p, p)
    }

    fn inset(self, top: f64, right: f64, bottom: f64, left: f64) -> Bounds {
        let (mut x0, mut y0) = (self.x0 + left, self.y0 + top);
        let (mut x1, mut y1) = (self.x1 - right, self.y1 - bottom);
        if x1 < x0 {
            x0 = (x0 + x1) / 2.0;
            x1 = x0;
        }
        if y1 < y0 {
            y0 = (y0 + y1) / 2.0;
            y1 = y0;
        }
        Bounds { x0, y0, x1, y1 }
    }

    fn round(self) -> Bounds {
        Bounds {
            x0: self.x0.round(),
            y0: self.y0.round(),
            x1: self.x1.round(),
            y1: self.y1.round(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    pub fn uniform(p: f64) -> Padding {
        Padding {
            top: p,
            right: p,
            bottom: p,
            left: p,
        }
    }
}

/// Placement of one group (depth 1) and its leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupLayout {
    /// Index into the input groups
    pub index: usize,
    pub bounds: Bounds,
    pub leaves: Vec<LeafLayout>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeafLayout {
    /// Index into the group's input weights
    pub index: usize,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Copy)]
pub struct Treemap {
    pub width: f64,
    pub height: f64,
    /// Padding around the whole map
    pub outer: Padding,
    /// Padding inside each group; `top` leaves room for its header
    pub group: Padding,
    /// Gap between siblings
    pub inner: f64,
    pub round: bool,
}

impl Treemap {
    pub fn new(width: f64, height: f64) -> Treemap {
        Treemap {
            width,
            height,
            outer: Padding::uniform(1.0),
            group: Padding {
                top: 15.0,
                right: 1.0,
                bottom: 1.0,
                left: 1.0,
            },
            inner: 1.0,
            round: true,
        }
    }

    /// Lay out `groups`, each a list of leaf weights. Groups and leaves are
    /// returned heaviest first; `index` fields map back to the input.
    pub fn layout(&self, groups: &[Vec<f64>]) -> Vec<GroupLayout> {
        let half = self.inner / 2.0;

        let mut order: Vec<(usize, f64)> = groups
            .iter()
            .enumerate()
            .map(|(i, leaves)| (i, leaves.iter().sum()))
            .collect();
        sort_descending(&mut order);

        let root = Bounds::new(0.0, 0.0, self.width, self.height);
        let root_content = root.inset(
            self.outer.top - half,
            self.outer.right - half,
            self.outer.bottom - half,
            self.outer.left - half,
        );
        let group_tiles = squarify(
            &order.iter().map(|&(_, v)| v).collect::<Vec<_>>(),
            root_content,
        );

        order
            .iter()
            .zip(group_tiles)
            .map(|(&(group_index, _), tile)| {
                let bounds = tile.shrink(half);
                let content = bounds.inset(
                    self.group.top - half,
                    self.group.right - half,
                    self.group.bottom - half,
                    self.group.left - half,
                );

                let mut leaf_order: Vec<(usize, f64)> =
                    groups[group_index].iter().copied().enumerate().collect();
                sort_descending(&mut leaf_order);
                let leaf_tiles = squarify(
                    &leaf_order.iter().map(|&(_, v)| v).collect::<Vec<_>>(),
                    content,
                );

                let leaves = leaf_order
                    .iter()
                    .zip(leaf_tiles)
                    .map(|(&(index, _), tile)| LeafLayout {
                        index,
                        bounds: self.finish(tile.shrink(half)),
                    })
                    .collect();

                GroupLayout {
                    index: group_index,
                    bounds: self.finish(bounds),
                    leaves,
                }
            })
            .collect()
    }

    fn finish(&self, b: Bounds) -> Bounds {
        if self.round {
            b.round()
        } else {
            b
        }
    }
}

fn sort_descending(nodes: &mut [(usize, f64)]) {
    nodes.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
}

/// Tile `values` (already sorted) into `area`, returning one box per value.
fn squarify(values: &[f64], area: Bounds) -> Vec<Bounds> {
    let n = values.len();
    let mut out = vec![Bounds::default(); n];
    let Bounds {
        mut x0,
        mut y0,
        mut x1,
        mut y1,
    } = area;
    let mut remaining: f64 = values.iter().sum();
    let (mut i0, mut i1) = (0, 0);

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // find the next non-empty node
        let mut row_sum;
        loop {
            row_sum = values[i1];
            i1 += 1;
            if row_sum != 0.0 || i1 >= n {
                break;
            }
        }
        let mut min_value = row_sum;
        let mut max_value = row_sum;
        let alpha = (dy / dx).max(dx / dy) / (remaining * PHI);
        let mut beta = row_sum * row_sum * alpha;
        let mut min_ratio = (max_value / beta).max(beta / min_value);

        // keep adding nodes while the worst aspect ratio does not get worse
        while i1 < n {
            let value = values[i1];
            row_sum += value;
            min_value = min_value.min(value);
            max_value = max_value.max(value);
            beta = row_sum * row_sum * alpha;
            let ratio = (max_value / beta).max(beta / min_value);
            if ratio > min_ratio {
                row_sum -= value;
                break;
            }
            min_ratio = ratio;
            i1 += 1;
        }

        let row = i0..i1;
        if dx < dy {
            let y_end = if remaining > 0.0 {
                y0 + dy * row_sum / remaining
            } else {
                y1
            };
            dice(&values[row.clone()], &mut out[row], Bounds::new(x0, y0, x1, y_end));
            y0 = y_end;
        } else {
            let x_end = if remaining > 0.0 {
                x0 + dx * row_sum / remaining
            } else {
                x1
            };
            slice(&values[row.clone()], &mut out[row], Bounds::new(x0, y0, x_end, y1));
            x0 = x_end;
        }
        remaining -= row_sum;
        i0 = i1;
    }

    out
}

/// Split horizontally, left to right.
fn dice(values: &[f64], out: &mut [Bounds], area: Bounds) {
    let total: f64 = values.iter().sum();
    let k = if total > 0.0 { area.width() / total } else { 0.0 };
    let mut x = area.x0;
    for (value, slot) in values.iter().zip(out.iter_mut()) {
        let next = x + value * k;
        *slot = Bounds::new(x, area.y0, next, area.y1);
        x = next;
    }
}

/// Split vertically, top to bottom.
fn slice(values: &[f64], out: &mut [Bounds], area: Bounds) {
    let total: f64 = values.iter().sum();
    let k = if total > 0.0 { area.height() / total } else { 0.0 };
    let mut y = area.y0;
    for (value, slot) in values.iter().zip(out.iter_mut()) {
        let next = y + value * k;
        *slot = Bounds::new(area.x0, y, area.x1, next);
        y = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(a: &Bounds, b: &Bounds) -> bool {
        a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
    }

    #[test]
    fn test_single_leaf_respects_padding() {
        let layout = Treemap::new(200.0, 100.0).layout(&[vec![5.0]]);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].bounds, Bounds::new(1.0, 1.0, 199.0, 99.0));
        assert_eq!(
            layout[0].leaves[0].bounds,
            Bounds::new(2.0, 16.0, 198.0, 98.0)
        );
    }

    #[test]
    fn test_squarify_covers_area_proportionally() {
        let tiles = squarify(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0], Bounds::new(0.0, 0.0, 6.0, 4.0));
        let total: f64 = tiles.iter().map(Bounds::area).sum();
        assert!((total - 24.0).abs() < 1e-9);
        // area is 24 for a weight sum of 24
        assert!((tiles[0].area() - 6.0).abs() < 1e-9);
        assert!((tiles[6].area() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_groups_and_leaves_sorted_heaviest_first() {
        let layout = Treemap::new(400.0, 300.0).layout(&[vec![1.0, 5.0], vec![10.0, 20.0]]);
        assert_eq!(layout[0].index, 1);
        assert_eq!(layout[0].leaves[0].index, 1);
        assert_eq!(layout[1].index, 0);
        assert_eq!(layout[1].leaves[0].index, 1);
    }

    #[test]
    fn test_leaves_stay_inside_group_below_header() {
        let groups = vec![
            vec![3.0e12, 2.5e12, 1.0e12, 4.0e11, 1.0e9],
            vec![5.0e11, 3.0e11, 2.0e11],
            vec![1.0e11, 1.0e9, 1.0e9, 1.0e9],
        ];
        let layout = Treemap::new(1200.0, 800.0).layout(&groups);
        assert_eq!(layout.len(), 3);

        for group in &layout {
            assert!(group.bounds.x0 >= 0.0 && group.bounds.x1 <= 1200.0);
            assert!(group.bounds.y0 >= 0.0 && group.bounds.y1 <= 800.0);
            for leaf in &group.leaves {
                let b = leaf.bounds;
                assert!(b.x0 >= group.bounds.x0 && b.x1 <= group.bounds.x1);
                assert!(b.y0 >= group.bounds.y0 + 15.0, "leaf intrudes on header");
                assert!(b.y1 <= group.bounds.y1);
            }
            for (i, a) in group.leaves.iter().enumerate() {
                for b in &group.leaves[i + 1..] {
                    assert!(!overlaps(&a.bounds, &b.bounds));
                }
            }
        }
        for (i, a) in layout.iter().enumerate() {
            for b in &layout[i + 1..] {
                assert!(!overlaps(&a.bounds, &b.bounds));
            }
        }
    }

    #[test]
    fn test_leaf_area_tracks_weight() {
        let layout = Treemap::new(1000.0, 1000.0).layout(&[vec![3.0, 1.0]]);
        let leaves = &layout[0].leaves;
        let ratio = leaves[0].bounds.area() / leaves[1].bounds.area();
        assert!(ratio > 2.5 && ratio < 3.5, "ratio was {ratio}");
    }

    #[test]
    fn test_tiny_container_collapses_without_panicking() {
        let layout = Treemap::new(10.0, 10.0).layout(&[vec![1.0, 1.0], vec![1.0]]);
        for group in &layout {
            for leaf in &group.leaves {
                assert!(leaf.bounds.width() >= 0.0);
                assert!(leaf.bounds.height() >= 0.0);
            }
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(Treemap::new(100.0, 100.0).layout(&[]).is_empty());
        let layout = Treemap::new(100.0, 100.0).layout(&[vec![]]);
        assert!(layout[0].leaves.is_empty());
    }
}
