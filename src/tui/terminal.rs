//! Terminal setup and teardown
//!
//! Raw mode, alternate screen, mouse capture and focus reporting go on in
//! [`init`] and come off in [`restore`]. A panic hook restores the terminal
//! before the panic message is printed.

use std::io::{self, stdout, Write};
use std::panic;

use color_eyre::Result;
use crossterm::{
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

/// Type alias for our terminal backend
pub type Tui = Terminal<CrosstermBackend<io::Stdout>>;

fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = reset();
        original_hook(panic_info);
    }));
}

fn reset() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(
        stdout(),
        DisableMouseCapture,
        DisableFocusChange,
        LeaveAlternateScreen,
        crossterm::cursor::Show
    )
}

/// Initialize the terminal for drawing
pub fn init() -> Result<Tui> {
    // Hook first: a panic after raw mode would otherwise wreck the shell
    install_panic_hook();

    // color-eyre for better error messages (ignore if already installed)
    let _ = color_eyre::install();

    enable_raw_mode()?;
    execute!(
        stdout(),
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;

    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore() -> Result<()> {
    reset()?;
    Ok(())
}

/// Set the terminal title (OSC 0)
pub fn set_title(title: &str) {
    let mut stdout = stdout();
    let _ = write!(stdout, "\x1b]0;{title}\x1b\\");
    let _ = stdout.flush();
}
