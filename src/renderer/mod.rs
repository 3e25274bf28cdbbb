//! Renderer: the deterministic rasterizer.
//!
//! Takes a `ResolvedScene` (in-memory, from a sketch) and produces a
//! `CellFrame` for the player. The first frame after construction or a
//! resize is a full frame; later frames are diffs against the previous grid.
//!
//! Rasterizing is pure: the same scene and contract always give the same
//! grid. The renderer knows nothing about time, phases or input.

pub mod font;
pub mod raster;

use crate::types::{
    Cell, CellChange, CellFrame, Color, NamedColor, ResolvedScene, Style, TerminalContract,
};

use raster::SampleMask;

/// Shade ramp from faint to solid.
const SHADES: [(f64, char); 3] = [(0.66, '█'), (0.33, '▓'), (0.05, '░')];

/// Linear RGB in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Rgb {
    r: f64,
    g: f64,
    b: f64,
}

impl Rgb {
    fn over(self, top: Rgb, alpha: f64) -> Rgb {
        Rgb {
            r: self.r + (top.r - self.r) * alpha,
            g: self.g + (top.g - self.g) * alpha,
            b: self.b + (top.b - self.b) * alpha,
        }
    }

    fn luminance(self) -> f64 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

fn to_rgb(color: &Color) -> Rgb {
    let (r, g, b) = match color {
        Color::Named(n) => match n {
            NamedColor::Black => (0, 0, 0),
            NamedColor::Red => (205, 49, 49),
            NamedColor::Green => (13, 188, 121),
            NamedColor::Yellow => (229, 229, 16),
            NamedColor::Blue => (36, 114, 200),
            NamedColor::Magenta => (188, 63, 188),
            NamedColor::Cyan => (17, 168, 205),
            NamedColor::White => (255, 255, 255),
        },
        Color::Rgb { r, g, b } => (*r, *g, *b),
    };
    Rgb {
        r: f64::from(r) / 255.0,
        g: f64::from(g) / 255.0,
        b: f64::from(b) / 255.0,
    }
}

/// Turn a composited pixel into a character and foreground colour. The
/// shade carries brightness, the colour carries hue at full strength.
fn to_cell(pixel: Rgb) -> Cell {
    let level = pixel.luminance();
    let Some(&(_, ch)) = SHADES.iter().find(|(threshold, _)| level >= *threshold) else {
        return Cell::default();
    };
    let peak = pixel.r.max(pixel.g).max(pixel.b).max(f64::EPSILON);
    let channel = |v: f64| (v / peak * 255.0).round().clamp(0.0, 255.0) as u8;
    Cell {
        ch,
        style: Style {
            fg: Some(Color::Rgb {
                r: channel(pixel.r),
                g: channel(pixel.g),
                b: channel(pixel.b),
            }),
            ..Style::default()
        },
    }
}

pub struct Renderer {
    contract: TerminalContract,
    previous: Option<Vec<Vec<Cell>>>,
}

impl Renderer {
    pub fn new(contract: TerminalContract) -> Self {
        Self {
            contract,
            previous: None,
        }
    }

    pub fn contract(&self) -> TerminalContract {
        self.contract
    }

    /// Switch to a new grid size. The next frame is a full frame.
    pub fn resize(&mut self, contract: TerminalContract) {
        if contract != self.contract {
            self.contract = contract;
            self.previous = None;
        }
    }

    pub fn render(&mut self, scene: &ResolvedScene) -> CellFrame {
        let grid = Self::rasterize(scene, &self.contract);
        let frame = match &self.previous {
            None => CellFrame::Full {
                cells: grid.clone(),
            },
            Some(prev) => CellFrame::Diff {
                changes: Self::diff(prev, &grid),
            },
        };
        self.previous = Some(grid);
        frame
    }

    /// Rasterize a resolved scene onto a fixed-size cell grid.
    ///
    /// Draw operations are sorted by z-order so that higher z values
    /// paint over lower ones. Equal z values keep submission order.
    pub fn rasterize(scene: &ResolvedScene, contract: &TerminalContract) -> Vec<Vec<Cell>> {
        let w = contract.width as usize;
        let h = contract.height as usize;
        let mut pixels = vec![Rgb::default(); w * h];
        let mut mask = SampleMask::new(contract);

        let mut ops: Vec<_> = scene.ops.iter().collect();
        ops.sort_by_key(|op| op.z_order);

        for op in ops {
            if op.paint.alpha <= 0.0 {
                continue;
            }
            mask.clear();
            mask.stamp(&op.shape);
            let color = to_rgb(&op.paint.color);
            for y in 0..h {
                for x in 0..w {
                    let coverage = mask.coverage(x, y);
                    if coverage > 0.0 {
                        let pixel = &mut pixels[y * w + x];
                        *pixel = pixel.over(color, coverage * op.paint.alpha);
                    }
                }
            }
        }

        pixels
            .chunks(w.max(1))
            .take(h)
            .map(|row| row.iter().copied().map(to_cell).collect())
            .collect()
    }

    /// Compute a cell-level diff between two grids.
    pub fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: next_cell.clone(),
                    });
                }
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Paint, Point, Shape, Size};

    const CONTRACT: TerminalContract = TerminalContract {
        width: 8,
        height: 4,
    };

    fn scene() -> ResolvedScene {
        ResolvedScene::new(CONTRACT.surface_size())
    }

    #[test]
    fn empty_scene_is_blank() {
        let grid = Renderer::rasterize(&scene(), &CONTRACT);
        assert_eq!(grid.len(), 4);
        assert!(grid.iter().flatten().all(|c| *c == Cell::default()));
    }

    #[test]
    fn higher_z_paints_over_lower() {
        let mut s = scene();
        s.push_layer(Shape::Fill, Paint::solid(Color::BLACK), 5);
        s.push_layer(Shape::Fill, Paint::solid(Color::WHITE), 0);
        let grid = Renderer::rasterize(&s, &CONTRACT);
        assert!(grid.iter().flatten().all(|c| c.ch == ' '));
    }

    #[test]
    fn alpha_picks_the_shade() {
        let mut s = scene();
        s.push(Shape::Fill, Paint::solid(Color::WHITE).with_alpha(0.5));
        let grid = Renderer::rasterize(&s, &CONTRACT);
        assert_eq!(grid[0][0].ch, '▓');
        assert_eq!(
            grid[0][0].style.fg,
            Some(Color::Rgb {
                r: 255,
                g: 255,
                b: 255
            })
        );

        let mut faint = scene();
        faint.push(Shape::Fill, Paint::solid(Color::WHITE).with_alpha(0.01));
        assert_eq!(Renderer::rasterize(&faint, &CONTRACT)[0][0].ch, ' ');
    }

    #[test]
    fn first_frame_is_full_then_diffs() {
        let mut renderer = Renderer::new(CONTRACT);
        let mut s = scene();
        s.push(
            Shape::Rect {
                origin: Point::new(0.0, 0.0),
                size: Size::new(1.0, 2.0),
            },
            Paint::solid(Color::WHITE),
        );
        assert!(matches!(renderer.render(&s), CellFrame::Full { .. }));
        match renderer.render(&s) {
            CellFrame::Diff { changes } => assert!(changes.is_empty()),
            other => panic!("expected diff, got {other:?}"),
        }
        match renderer.render(&scene()) {
            CellFrame::Diff { changes } => {
                assert_eq!(changes.len(), 1);
                assert_eq!((changes[0].x, changes[0].y), (0, 0));
                assert_eq!(changes[0].cell, Cell::default());
            }
            other => panic!("expected diff, got {other:?}"),
        }

        renderer.resize(TerminalContract {
            width: 4,
            height: 2,
        });
        assert!(matches!(renderer.render(&scene()), CellFrame::Full { .. }));
    }
}
