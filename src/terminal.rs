use anyhow::Context;
use crossterm::{
    cursor, queue,
    terminal::{self, ClearType},
};
use std::io::{Stdout, Write, stdout};

/// Raw-mode + alternate-screen guard; Drop restores the terminal even when
/// the app unwinds mid-frame.
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // Guard exists from here on so a failed setup step still restores
        // raw mode via Drop.
        let guard = Self { _private: () };

        let mut out = stdout();
        queue!(
            out,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )
        .context("prepare alternate screen")?;
        out.flush().context("flush terminal setup")?;

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut out = stdout();
        // Undo modes the renderers may have left on (sync output, autowrap, colors).
        let _ = out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m");
        let _ = queue!(out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = out.flush();
    }
}
