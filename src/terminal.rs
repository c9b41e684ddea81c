// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor, event,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::frame::Frame;

/// Puts the terminal back the way the shell expects it. Errors are ignored
/// since this also runs from panic and signal paths.
fn leave(out: &mut Stdout) {
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}

pub fn restore_terminal_best_effort() {
    leave(&mut stdout());
}

/// Colors currently set on the terminal, so repeats are not re-sent.
#[derive(Default)]
struct Pens {
    fg: Option<Option<Color>>,
    bg: Option<Option<Color>>,
}

impl Pens {
    fn apply(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if self.fg != Some(cell.fg) {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = Some(cell.fg);
        }
        if self.bg != Some(cell.bg) {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = Some(cell.bg);
        }
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    /// What the screen shows, sized like the last drawn frame.
    shown: Vec<Cell>,
    shown_size: (u16, u16),
    run: String,
    dirty: Vec<usize>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let entered: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = entered {
            leave(&mut out);
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: Vec::new(),
            shown_size: (0, 0),
            run: String::with_capacity(64),
            dirty: Vec::new(),
        })
    }

    pub fn size(&self) -> Result<(u16, u16)> {
        terminal::size()
    }

    pub fn poll_event(timeout: Duration) -> Result<bool> {
        event::poll(timeout)
    }

    pub fn read_event() -> Result<event::Event> {
        event::read()
    }

    pub fn draw(&mut self, frame: &mut Frame) -> Result<()> {
        let size = (frame.width, frame.height);
        let total = frame.width as usize * frame.height as usize;
        let resized = self.shown_size != size || self.shown.len() != total;
        let mostly_dirty = frame.dirty_indices().len() >= total / 3;

        if resized || frame.is_dirty_all() || mostly_dirty {
            self.draw_full(frame, resized)?;
        } else {
            self.draw_dirty(frame)?;
        }

        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &Frame, resized: bool) -> Result<()> {
        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.shown = vec![Cell::blank(); frame.width as usize * frame.height as usize];
            self.shown_size = (frame.width, frame.height);
        }

        let mut pens = Pens::default();
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let i = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(i);
                pens.apply(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
                self.shown[i] = cell;
            }
        }
        Ok(())
    }

    /// Writes changed cells as runs of same-colored neighbors on a row.
    fn draw_dirty(&mut self, frame: &Frame) -> Result<()> {
        let width = frame.width as usize;
        self.dirty.clear();
        self.dirty.extend_from_slice(frame.dirty_indices());
        self.dirty.sort_unstable();

        let mut pens = Pens::default();
        let mut cursor_at: Option<usize> = None;
        let mut k = 0;
        while k < self.dirty.len() {
            let start = self.dirty[k];
            let first = frame.cell_at_index(start);
            k += 1;
            if self.shown[start] == first {
                continue;
            }
            self.shown[start] = first;

            self.run.clear();
            self.run.push(first.ch);
            let mut end = start;
            while k < self.dirty.len() {
                let i = self.dirty[k];
                let cell = frame.cell_at_index(i);
                let same_row = i / width == start / width;
                if i != end + 1 || !same_row || cell.fg != first.fg || cell.bg != first.bg {
                    break;
                }
                self.run.push(cell.ch);
                self.shown[i] = cell;
                end = i;
                k += 1;
            }

            if cursor_at != Some(start) {
                let (x, y) = ((start % width) as u16, (start / width) as u16);
                self.stdout.queue(cursor::MoveTo(x, y))?;
            }
            pens.apply(&mut self.stdout, &first)?;
            self.stdout.queue(Print(self.run.as_str()))?;
            let next = end + 1;
            cursor_at = (next % width != 0).then_some(next);
        }
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        leave(&mut self.stdout);
    }
}
