//! Shared boundary types for the sketchbook pipeline.
//!
//! This module defines the two key data contracts:
//! - Sketch → Renderer (in-memory): `ResolvedScene` containing `DrawOp`s
//! - Renderer → Player (in-memory): `CellFrame`s of `Cell`s, full or diffed
//!
//! It also carries the pointer events the player feeds back into sketches.

// ---------------------------------------------------------------------------
// Geometry primitives
// ---------------------------------------------------------------------------

/// A position in surface space. The surface is measured in "pixels" whose
/// exact density is up to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Rotate around the origin by `angle` radians.
    pub fn rotated(self, angle: f64) -> Point {
        let (sin, cos) = angle.sin_cos();
        Point::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    pub const BLACK: Color = Color::Named(NamedColor::Black);
    pub const WHITE: Color = Color::Named(NamedColor::White);
    pub const RED: Color = Color::Named(NamedColor::Red);
    pub const GREY: Color = Color::Rgb { r: 44, g: 44, b: 44 };
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub bold: bool,
    pub dim: bool,
}

/// Fill colour plus opacity in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub alpha: f64,
}

impl Paint {
    pub fn solid(color: Color) -> Self {
        Self { color, alpha: 1.0 }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        self
    }
}

// ---------------------------------------------------------------------------
// Sketch → Renderer boundary (in-memory only)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Cover the whole surface.
    Fill,
    Disc {
        center: Point,
        radius: f64,
    },
    /// Annulus between `radius - width / 2` and `radius + width / 2`.
    Ring {
        center: Point,
        radius: f64,
        width: f64,
    },
    Line {
        from: Point,
        to: Point,
        width: f64,
    },
    /// Connected stroke through `points`; a single point draws a dot.
    Polyline {
        points: Vec<Point>,
        width: f64,
    },
    /// Closed convex polygon.
    Polygon {
        points: Vec<Point>,
    },
    /// Axis-aligned rectangle from its top-left corner.
    Rect {
        origin: Point,
        size: Size,
    },
    /// Large numeral drawn from the bitmap font, centred on `center` and
    /// turned clockwise by `angle` radians.
    Glyph {
        ch: char,
        center: Point,
        height: f64,
        angle: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawOp {
    pub shape: Shape,
    pub paint: Paint,
    pub z_order: i32,
}

#[derive(Debug, Clone, Default)]
pub struct ResolvedScene {
    pub size: Size,
    pub ops: Vec<DrawOp>,
}

impl ResolvedScene {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, shape: Shape, paint: Paint) {
        self.ops.push(DrawOp {
            shape,
            paint,
            z_order: 0,
        });
    }

    pub fn push_layer(&mut self, shape: Shape, paint: Paint, z_order: i32) {
        self.ops.push(DrawOp {
            shape,
            paint,
            z_order,
        });
    }
}

// ---------------------------------------------------------------------------
// Renderer → Player boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalContract {
    pub width: u16,
    pub height: u16,
}

impl TerminalContract {
    /// Terminal cells are roughly twice as tall as they are wide, so each
    /// row spans two surface units.
    pub const ROW_UNITS: f64 = 2.0;

    pub fn surface_size(&self) -> Size {
        Size::new(self.width as f64, self.height as f64 * Self::ROW_UNITS)
    }

    /// Map a cell coordinate to the surface point at the cell's centre.
    pub fn cell_to_surface(&self, column: u16, row: u16) -> Point {
        Point::new(column as f64 + 0.5, (row as f64 + 0.5) * Self::ROW_UNITS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

#[derive(Debug, Clone)]
pub enum CellFrame {
    Full { cells: Vec<Vec<Cell>> },
    Diff { changes: Vec<CellChange> },
}

// ---------------------------------------------------------------------------
// Player → Sketch boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    /// The pointer left the surface; treated like a release.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Already mapped into surface space.
    pub position: Point,
    /// Seconds on the host's wall clock.
    pub time: f64,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, position: Point, time: f64) -> Self {
        Self {
            kind,
            position,
            time,
        }
    }
}
