//! Player: the terminal frame driver.
//!
//! Owns one sketch for its whole life. Each frame it measures wall-clock
//! `dt`, forwards pending mouse input as pointer events, lets the sketch
//! update and draw, rasterizes the scene and writes the cell diff to the
//! terminal. Playback stops when the sketch finishes or the user quits.

pub mod simulate;

use std::cell::Cell as SharedFlag;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind,
};
use crossterm::{cursor, execute, queue, style, terminal};
use tracing::{debug, info};

use crate::audio::BellCues;
use crate::config::SketchConfig;
use crate::engine::CompletionGate;
use crate::menubar::print_menu;
use crate::renderer::Renderer;
use crate::sketches::{create_sketch, Frame, Sketch, SketchKind};
use crate::types::{
    Cell, CellFrame, Color, NamedColor, PointerEvent, PointerKind, Style, TerminalContract,
};

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;
/// Menu bar plus status bar.
const CHROME_ROWS: u16 = 2;
const MIN_COLUMNS: u16 = 20;
const MIN_ROWS: u16 = 8;

/// A gate that raises the returned flag when the sketch completes. The frame
/// loop stops on the flag.
fn completion_flag() -> (CompletionGate, Rc<SharedFlag<bool>>) {
    let finished = Rc::new(SharedFlag::new(false));
    let flag = Rc::clone(&finished);
    let gate = CompletionGate::new(move || flag.set(true));
    (gate, finished)
}

/// Canvas size for a terminal of `columns × rows`.
pub fn canvas_contract(columns: u16, rows: u16) -> TerminalContract {
    TerminalContract {
        width: columns,
        height: rows.saturating_sub(CHROME_ROWS),
    }
}

/// Translate a crossterm mouse event into a pointer event on the canvas.
/// Motion outside the canvas becomes `Leave`.
pub fn to_pointer(
    kind: MouseEventKind,
    column: u16,
    row: u16,
    contract: &TerminalContract,
    time: f64,
) -> Option<PointerEvent> {
    let inside = row >= CANVAS_OFFSET
        && row < CANVAS_OFFSET + contract.height
        && column < contract.width;
    let position = contract.cell_to_surface(column, row.saturating_sub(CANVAS_OFFSET));
    let kind = match kind {
        MouseEventKind::Down(MouseButton::Left) if inside => PointerKind::Down,
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved if inside => {
            PointerKind::Move
        }
        MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => PointerKind::Leave,
        MouseEventKind::Up(MouseButton::Left) => PointerKind::Up,
        _ => return None,
    };
    Some(PointerEvent::new(kind, position, time))
}

pub struct Player {
    kind: SketchKind,
    config: SketchConfig,
    fullscreen: bool,
}

impl Player {
    pub fn new(kind: SketchKind, config: SketchConfig) -> Self {
        Self {
            kind,
            config,
            fullscreen: false,
        }
    }

    /// Play the sketch in the terminal.
    ///
    /// Sets up the terminal, enters the frame loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size().context("Failed to query terminal size")?;
        if term_w < MIN_COLUMNS || term_h < MIN_ROWS {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                MIN_COLUMNS,
                MIN_ROWS,
                term_w,
                term_h,
            );
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            event::EnableMouseCapture,
            event::EnableFocusChange,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout, canvas_contract(term_w, term_h));

        // Always restore terminal state.
        let _ = execute!(
            stdout,
            event::DisableFocusChange,
            event::DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen,
        );
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout, contract: TerminalContract) -> Result<()> {
        let (gate, finished) = completion_flag();
        let mut sketch = create_sketch(self.kind, &self.config, contract.surface_size(), gate);
        let mut renderer = Renderer::new(contract);
        let mut cues = BellCues::new(self.config.audio);
        let interval = Duration::from_secs_f64(self.config.frame_interval());

        self.render_menubar(stdout)?;
        let start = Instant::now();
        let mut last = start;

        'frames: loop {
            let deadline = last + interval;
            while let Some(timeout) = deadline.checked_duration_since(Instant::now()) {
                if !event::poll(timeout)? {
                    break;
                }
                let time = start.elapsed().as_secs_f64();
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => break 'frames,
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break 'frames;
                        }
                        KeyCode::F(11) => self.toggle_fullscreen(stdout)?,
                        _ => {}
                    },
                    Event::Mouse(mouse) => {
                        let contract = renderer.contract();
                        if let Some(pointer) =
                            to_pointer(mouse.kind, mouse.column, mouse.row, &contract, time)
                        {
                            sketch.pointer(pointer);
                        }
                    }
                    Event::FocusLost => {
                        let contract = renderer.contract();
                        sketch.pointer(PointerEvent::new(
                            PointerKind::Leave,
                            contract.surface_size().center(),
                            time,
                        ));
                    }
                    Event::Resize(w, h) => {
                        debug!(columns = w, rows = h, "terminal resized");
                        renderer.resize(canvas_contract(w, h));
                        queue!(stdout, terminal::Clear(terminal::ClearType::All))?;
                        self.render_menubar(stdout)?;
                    }
                    _ => {}
                }
            }

            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f64();
            last = now;

            let contract = renderer.contract();
            let mut frame = Frame::new(contract.surface_size(), &mut cues);
            sketch.update(dt, &mut frame);
            let cells = renderer.render(frame.scene());
            self.draw(stdout, &cells)?;
            self.render_status(stdout, sketch.as_ref(), &contract, start.elapsed().as_secs_f64())?;

            if finished.get() {
                info!(sketch = %self.kind, "sketch finished");
                break;
            }
        }

        sketch.dispose();
        Ok(())
    }

    fn toggle_fullscreen(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.fullscreen = !self.fullscreen;
        if self.fullscreen {
            stdout.write_all(b"\x1b[10;1t")?;
        } else {
            stdout.write_all(b"\x1b[10;0t")?;
        }
        stdout.flush()?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
        )?;
        print_menu(stdout, &["[drag] interact", "[q][Esc] quit", "[F11] full"])?;
        stdout.flush()?;
        Ok(())
    }

    fn draw(&self, stdout: &mut io::Stdout, frame: &CellFrame) -> Result<()> {
        match frame {
            CellFrame::Full { cells } => {
                for (y, row) in cells.iter().enumerate() {
                    queue!(stdout, cursor::MoveTo(0, y as u16 + CANVAS_OFFSET))?;
                    for cell in row {
                        print_cell(stdout, cell)?;
                    }
                }
            }
            CellFrame::Diff { changes } => {
                for change in changes {
                    queue!(stdout, cursor::MoveTo(change.x, change.y + CANVAS_OFFSET))?;
                    print_cell(stdout, &change.cell)?;
                }
            }
        }
        stdout.flush()?;
        Ok(())
    }

    fn render_status(
        &self,
        stdout: &mut io::Stdout,
        sketch: &dyn Sketch,
        contract: &TerminalContract,
        elapsed: f64,
    ) -> Result<()> {
        let status = format!(" {} | {} | {:>6.1}s ", self.kind, sketch.phase(), elapsed);

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, contract.height + CANVAS_OFFSET),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        stdout.flush()?;
        Ok(())
    }
}

fn print_cell(stdout: &mut io::Stdout, cell: &Cell) -> Result<()> {
    let cs = to_content_style(&cell.style);
    queue!(
        stdout,
        style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    const CONTRACT: TerminalContract = TerminalContract {
        width: 40,
        height: 10,
    };

    #[test]
    fn canvas_leaves_room_for_the_bars() {
        assert_eq!(
            canvas_contract(80, 24),
            TerminalContract {
                width: 80,
                height: 22
            }
        );
        assert_eq!(canvas_contract(80, 1).height, 0);
    }

    #[test]
    fn mouse_maps_to_cell_centres() {
        let p = to_pointer(MouseEventKind::Down(MouseButton::Left), 3, 1, &CONTRACT, 0.5).unwrap();
        assert_eq!(p.kind, PointerKind::Down);
        assert_eq!(p.position, Point::new(3.5, 1.0));
        assert_eq!(p.time, 0.5);
    }

    #[test]
    fn drag_off_canvas_is_a_leave() {
        let on_menu = to_pointer(MouseEventKind::Drag(MouseButton::Left), 3, 0, &CONTRACT, 0.0);
        assert_eq!(on_menu.map(|p| p.kind), Some(PointerKind::Leave));
        let press_on_status =
            to_pointer(MouseEventKind::Down(MouseButton::Left), 3, 11, &CONTRACT, 0.0);
        assert!(press_on_status.is_none());
        let right_click =
            to_pointer(MouseEventKind::Down(MouseButton::Right), 3, 3, &CONTRACT, 0.0);
        assert!(right_click.is_none());
    }

    #[test]
    fn finished_sketch_raises_the_stop_flag() {
        let (gate, finished) = completion_flag();
        let config = SketchConfig::default();
        let mut sketch = create_sketch(SketchKind::Spin, &config, CONTRACT.surface_size(), gate);
        assert!(!finished.get());
        sketch.dispose();

        let (mut gate, finished) = completion_flag();
        assert!(gate.fire());
        assert!(finished.get());
        assert!(!gate.fire());
        assert!(finished.get());
    }

    #[test]
    fn rgb_colors_pass_through() {
        let style = Style {
            fg: Some(Color::Rgb { r: 1, g: 2, b: 3 }),
            bold: true,
            ..Style::default()
        };
        let cs = to_content_style(&style);
        assert_eq!(
            cs.foreground_color,
            Some(style::Color::Rgb { r: 1, g: 2, b: 3 })
        );
        assert!(cs.attributes.has(style::Attribute::Bold));
    }
}
