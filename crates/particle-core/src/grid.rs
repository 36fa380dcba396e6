use glam::Vec2;

use crate::math::Aabb;

// Tag layout in a signed 64-bit word, after scaling positions by the inverse
// particle diameter: 12 bits of cell row, then 12 bits of cell column with 7
// bits of sub-cell x fraction below. Rows and columns are biased so that
// cells in [-2048, 2048) map to non-negative fields.
const X_TRUNC_BITS: u32 = 12;
const Y_TRUNC_BITS: u32 = 12;
const TAG_BITS: u32 = 31;
const Y_OFFSET: i64 = 1 << (Y_TRUNC_BITS - 1);
const Y_SHIFT: u32 = TAG_BITS - Y_TRUNC_BITS;
const X_SHIFT: u32 = TAG_BITS - Y_TRUNC_BITS - X_TRUNC_BITS;
const X_SCALE: f32 = (1 << X_SHIFT) as f32;
const X_OFFSET: i64 = (1 << X_SHIFT) * (1 << (X_TRUNC_BITS - 1));

/// Spatial tag of a point given in diameter units.
///
/// Sorting by tag orders points row by row (increasing y), then by x
/// within a row.
#[inline]
pub fn compute_tag(x: f32, y: f32) -> i64 {
    (((y + Y_OFFSET as f32) as i64) << Y_SHIFT) + ((X_SCALE * x) as i64 + X_OFFSET)
}

/// Tag of the same sub-cell position shifted by `x` columns and `y` rows.
#[inline]
pub fn compute_relative_tag(tag: i64, x: i64, y: i64) -> i64 {
    tag + (y << Y_SHIFT) + (x << X_SHIFT)
}

/// Broad-phase entry for one particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Proxy {
    pub index: usize,
    pub tag: i64,
}

/// Recompute every proxy tag from current positions and sort by tag.
pub fn refresh_proxies(proxies: &mut [Proxy], positions: &[Vec2], inverse_diameter: f32) {
    for proxy in proxies.iter_mut() {
        let p = positions[proxy.index];
        proxy.tag = compute_tag(inverse_diameter * p.x, inverse_diameter * p.y);
    }
    proxies.sort_unstable_by_key(|proxy| proxy.tag);
}

/// First proxy whose tag is not below `tag`.
#[inline]
pub fn lower_bound(proxies: &[Proxy], tag: i64) -> usize {
    proxies.partition_point(|p| p.tag < tag)
}

/// First proxy whose tag is above `tag`.
#[inline]
pub fn upper_bound(proxies: &[Proxy], tag: i64) -> usize {
    proxies.partition_point(|p| p.tag <= tag)
}

/// Index window `[first, last)` of proxies that may lie inside `aabb`.
///
/// The window is conservative: callers still test each position exactly.
pub fn proxy_range(proxies: &[Proxy], aabb: &Aabb, inverse_diameter: f32) -> (usize, usize) {
    let first = lower_bound(
        proxies,
        compute_tag(inverse_diameter * aabb.lower.x, inverse_diameter * aabb.lower.y),
    );
    let last = upper_bound(
        proxies,
        compute_tag(inverse_diameter * aabb.upper.x, inverse_diameter * aabb.upper.y),
    );
    (first, last.max(first))
}

/// Visit every pair of proxies close enough to share or neighbour a cell.
///
/// Only forward neighbours are visited: the rest of the current row up to
/// one cell to the right, and the three cells centred below in the next row.
/// The lower-row window start only moves forward, so the sweep is linear in
/// the number of proxies plus candidate pairs. `proxies` must be sorted.
pub fn for_each_neighbour_pair(proxies: &[Proxy], mut visit: impl FnMut(usize, usize)) {
    let n = proxies.len();
    let mut c_index = 0;
    for i in 0..n {
        let a = proxies[i];
        let right_tag = compute_relative_tag(a.tag, 1, 0);
        for b in &proxies[i + 1..] {
            if right_tag < b.tag {
                break;
            }
            visit(a.index, b.index);
        }
        let bottom_left_tag = compute_relative_tag(a.tag, -1, 1);
        while c_index < n && proxies[c_index].tag < bottom_left_tag {
            c_index += 1;
        }
        let bottom_right_tag = compute_relative_tag(a.tag, 1, 1);
        for b in &proxies[c_index..] {
            if bottom_right_tag < b.tag {
                break;
            }
            visit(a.index, b.index);
        }
    }
}
