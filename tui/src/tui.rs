use std::io::Result;
use std::io::Stdout;
use std::io::stdout;

use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::event::KeyboardEnhancementFlags;
use crossterm::event::PopKeyboardEnhancementFlags;
use crossterm::event::PushKeyboardEnhancementFlags;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::disable_raw_mode;
use ratatui::crossterm::terminal::enable_raw_mode;

/// A type alias for the terminal type used in this application
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn set_modes() -> Result<()> {
    execute!(stdout(), EnableBracketedPaste, EnableMouseCapture)?;

    enable_raw_mode()?;
    // Modified Enter (Shift+Enter inserts a newline) is only reported
    // distinctly with keyboard enhancement. Terminals without support
    // still get Ctrl+J.
    let _ = execute!(
        stdout(),
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_ALTERNATE_KEYS
        )
    );
    Ok(())
}

/// Initialize the terminal in the alternate screen.
pub fn init() -> Result<Tui> {
    execute!(stdout(), EnterAlternateScreen)?;
    set_modes()?;
    Terminal::new(CrosstermBackend::new(stdout()))
}

/// Restore the terminal to its original state.
/// Inverse of `init`.
pub fn restore() -> Result<()> {
    // Pop may fail on platforms that didn't support the push; ignore errors.
    let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    execute!(stdout(), DisableMouseCapture, DisableBracketedPaste)?;
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    let _ = execute!(stdout(), crossterm::cursor::Show);
    Ok(())
}
