//! Shape coverage on a sub-sampled grid.
//!
//! Every terminal cell holds `SUB × SUB` sample points. A shape marks the
//! samples it covers; the compositor turns the count per cell into a
//! coverage fraction.

use crate::types::{Point, Shape, TerminalContract};

use super::font::{self, GLYPH_COLUMNS, GLYPH_ROWS};

pub const SUB: usize = 2;
pub const SAMPLES_PER_CELL: usize = SUB * SUB;

/// Strokes thinner than the sample spacing still light up a sample row.
const MIN_HALF_WIDTH: f64 = 0.5;

pub struct SampleMask {
    columns: usize,
    rows: usize,
    samples: Vec<bool>,
}

impl SampleMask {
    pub fn new(contract: &TerminalContract) -> Self {
        let columns = contract.width as usize * SUB;
        let rows = contract.height as usize * SUB;
        Self {
            columns,
            rows,
            samples: vec![false; columns * rows],
        }
    }

    pub fn clear(&mut self) {
        self.samples.fill(false);
    }

    fn sample_point(i: usize, j: usize) -> Point {
        Point::new(
            (i as f64 + 0.5) / SUB as f64,
            (j as f64 + 0.5) * TerminalContract::ROW_UNITS / SUB as f64,
        )
    }

    /// Index range of samples whose coordinate lies within `[lo, hi]`.
    fn span(lo: f64, hi: f64, scale: f64, count: usize) -> Option<(usize, usize)> {
        if count == 0 || !lo.is_finite() || !hi.is_finite() || hi < lo {
            return None;
        }
        let first = (lo * scale - 0.5).ceil().max(0.0);
        let last = (hi * scale - 0.5).floor().min(count as f64 - 1.0);
        (first <= last).then(|| (first as usize, last as usize))
    }

    /// Mark every sample inside the box `min..=max` that satisfies `inside`.
    pub fn fill_where(&mut self, min: Point, max: Point, inside: impl Fn(Point) -> bool) {
        let sx = SUB as f64;
        let sy = SUB as f64 / TerminalContract::ROW_UNITS;
        let Some((i0, i1)) = Self::span(min.x, max.x, sx, self.columns) else {
            return;
        };
        let Some((j0, j1)) = Self::span(min.y, max.y, sy, self.rows) else {
            return;
        };
        for j in j0..=j1 {
            for i in i0..=i1 {
                if inside(Self::sample_point(i, j)) {
                    self.samples[j * self.columns + i] = true;
                }
            }
        }
    }

    /// Covered fraction of the cell at (`column`, `row`).
    pub fn coverage(&self, column: usize, row: usize) -> f64 {
        let mut hits = 0;
        for dj in 0..SUB {
            let j = row * SUB + dj;
            for di in 0..SUB {
                let i = column * SUB + di;
                if j < self.rows && i < self.columns && self.samples[j * self.columns + i] {
                    hits += 1;
                }
            }
        }
        hits as f64 / SAMPLES_PER_CELL as f64
    }

    pub fn stamp(&mut self, shape: &Shape) {
        match shape {
            Shape::Fill => self.samples.fill(true),
            Shape::Disc { center, radius } => self.disc(*center, *radius),
            Shape::Ring {
                center,
                radius,
                width,
            } => {
                let half = (width / 2.0).max(MIN_HALF_WIDTH);
                let (c, r) = (*center, *radius);
                let outer = r + half;
                self.fill_where(c.offset(-outer, -outer), c.offset(outer, outer), |p| {
                    (p.distance(c) - r).abs() <= half
                });
            }
            Shape::Line { from, to, width } => self.segment(*from, *to, *width),
            Shape::Polyline { points, width } => match points.as_slice() {
                [] => {}
                [only] => self.disc(*only, (width / 2.0).max(MIN_HALF_WIDTH)),
                _ => {
                    for pair in points.windows(2) {
                        self.segment(pair[0], pair[1], *width);
                    }
                }
            },
            Shape::Polygon { points } => {
                let Some((min, max)) = bounds(points) else {
                    return;
                };
                self.fill_where(min, max, |p| polygon_contains(points, p));
            }
            Shape::Rect { origin, size } => {
                let max = origin.offset(size.width, size.height);
                self.fill_where(*origin, max, |_| true);
            }
            Shape::Glyph {
                ch,
                center,
                height,
                angle,
            } => self.glyph(*ch, *center, *height, *angle),
        }
    }

    fn disc(&mut self, center: Point, radius: f64) {
        if !(radius > 0.0) {
            return;
        }
        self.fill_where(
            center.offset(-radius, -radius),
            center.offset(radius, radius),
            |p| p.distance(center) <= radius,
        );
    }

    fn segment(&mut self, a: Point, b: Point, width: f64) {
        let half = (width / 2.0).max(MIN_HALF_WIDTH);
        let min = Point::new(a.x.min(b.x) - half, a.y.min(b.y) - half);
        let max = Point::new(a.x.max(b.x) + half, a.y.max(b.y) + half);
        self.fill_where(min, max, |p| segment_distance(p, a, b) <= half);
    }

    fn glyph(&mut self, ch: char, center: Point, height: f64, angle: f64) {
        if !(height > 0.0) {
            return;
        }
        let pixel = height / GLYPH_ROWS as f64;
        let half_w = pixel * GLYPH_COLUMNS as f64 / 2.0;
        let half_h = height / 2.0;
        let reach = half_w.hypot(half_h);
        self.fill_where(
            center.offset(-reach, -reach),
            center.offset(reach, reach),
            |p| {
                let local = Point::new(p.x - center.x, p.y - center.y).rotated(-angle);
                let column = ((local.x + half_w) / pixel).floor();
                let row = ((local.y + half_h) / pixel).floor();
                column >= 0.0
                    && row >= 0.0
                    && font::is_filled(ch, column as usize, row as usize)
            },
        );
    }
}

fn bounds(points: &[Point]) -> Option<(Point, Point)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(lo, hi), p| {
        (
            Point::new(lo.x.min(p.x), lo.y.min(p.y)),
            Point::new(hi.x.max(p.x), hi.y.max(p.y)),
        )
    }))
}

/// Distance from `p` to the segment `a`–`b`.
pub fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    if length_sq == 0.0 {
        return p.distance(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / length_sq).clamp(0.0, 1.0);
    p.distance(Point::new(a.x + dx * t, a.y + dy * t))
}

/// Even-odd point-in-polygon test.
pub fn polygon_contains(points: &[Point], p: Point) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Size;

    const CONTRACT: TerminalContract = TerminalContract {
        width: 10,
        height: 5,
    };

    #[test]
    fn rect_covers_whole_cells() {
        let mut mask = SampleMask::new(&CONTRACT);
        mask.stamp(&Shape::Rect {
            origin: Point::new(2.0, 2.0),
            size: Size::new(3.0, 4.0),
        });
        assert_eq!(mask.coverage(2, 1), 1.0);
        assert_eq!(mask.coverage(4, 2), 1.0);
        assert_eq!(mask.coverage(5, 1), 0.0);
        assert_eq!(mask.coverage(2, 0), 0.0);
    }

    #[test]
    fn shapes_outside_the_surface_are_clipped() {
        let mut mask = SampleMask::new(&CONTRACT);
        mask.stamp(&Shape::Disc {
            center: Point::new(-50.0, -50.0),
            radius: 3.0,
        });
        mask.stamp(&Shape::Line {
            from: Point::new(f64::NAN, 0.0),
            to: Point::new(1.0, 1.0),
            width: 1.0,
        });
        assert!((0..10).all(|c| (0..5).all(|r| mask.coverage(c, r) == 0.0)));
    }

    #[test]
    fn thin_line_is_visible() {
        let mut mask = SampleMask::new(&CONTRACT);
        mask.stamp(&Shape::Line {
            from: Point::new(0.0, 5.0),
            to: Point::new(10.0, 5.0),
            width: 0.1,
        });
        assert!(mask.coverage(4, 2) > 0.0);
        assert_eq!(mask.coverage(4, 0), 0.0);
    }

    #[test]
    fn polygon_test_is_even_odd() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
            Point::new(0.0, 2.0),
        ];
        assert!(polygon_contains(&square, Point::new(1.0, 1.0)));
        assert!(!polygon_contains(&square, Point::new(3.0, 1.0)));
    }

    #[test]
    fn upside_down_glyph_mirrors_both_axes() {
        let contract = TerminalContract {
            width: 20,
            height: 10,
        };
        let upright = Shape::Glyph {
            ch: '7',
            center: Point::new(10.0, 10.0),
            height: 10.0,
            angle: 0.0,
        };
        let flipped = Shape::Glyph {
            ch: '7',
            center: Point::new(10.0, 10.0),
            height: 10.0,
            angle: std::f64::consts::PI,
        };
        let mut a = SampleMask::new(&contract);
        a.stamp(&upright);
        let mut b = SampleMask::new(&contract);
        b.stamp(&flipped);
        // The bar of the 7 sits on top when upright and at the bottom when
        // turned half way round.
        assert!(a.coverage(10, 2) > 0.0);
        assert_eq!(b.coverage(10, 2), 0.0);
        assert!(b.coverage(10, 7) > 0.0);
    }
}
