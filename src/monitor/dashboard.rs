use std::io::{self, Stdout, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use crate::{
    monitor::Renderer,
    pvt::{PvtRecord, LABELS},
};

/// Labels are right aligned within this many columns
pub const LABEL_WIDTH: usize = 25;

/// First column of the values
pub const VALUE_COLUMN: u16 = 26;

/// Full screen terminal session, restored when dropped.
pub struct TerminalSession {
    stdout: Stdout,
}

impl TerminalSession {
    /// Switches to the alternate screen and hides the cursor
    pub fn open() -> io::Result<Self> {
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
    }
}

/// Two column (label | value) view, one row per [PvtRecord] field.
/// Labels are drawn once, values are refreshed in place.
pub struct Dashboard<W: Write> {
    out: W,
}

impl<W: Write> Dashboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for Dashboard<W> {
    fn render_header(&mut self) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All))?;

        for (row, label) in LABELS.iter().enumerate() {
            queue!(
                self.out,
                MoveTo(0, row as u16),
                Print(format!("{:>width$}", label, width = LABEL_WIDTH))
            )?;
        }

        self.out.flush()
    }

    fn render_record(&mut self, record: &PvtRecord) -> io::Result<()> {
        for (row, (_, value)) in record.fields().iter().enumerate() {
            // erase leftovers of a previous, longer value
            queue!(
                self.out,
                MoveTo(VALUE_COLUMN, row as u16),
                Print(value),
                Clear(ClearType::UntilNewLine)
            )?;
        }

        self.out.flush()
    }
}
