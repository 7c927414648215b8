//! Terminal drawing canvas
//!
//! ratatui front end for a [`Session`](crate::session::Session): the mouse
//! paints on the grid, keys drive extract / predict / clear.
//!
//! ## Architecture
//!
//! - `app.rs` - Application state and event handling
//! - `terminal.rs` - Terminal setup/teardown
//! - `ui.rs` - Layout and rendering

pub mod app;
pub mod terminal;
pub mod ui;

// Re-exports
pub use app::{App, AsyncEvent};
pub use terminal::{init, restore};

use color_eyre::Result;

/// Run the canvas until the user quits
///
/// The terminal is restored even when the loop fails.
pub fn run(mut app: App) -> Result<()> {
    let mut terminal = terminal::init()?;
    let result = app.run(&mut terminal);
    terminal::restore()?;
    result
}
