//! Output sinks for character grids.

pub mod console;
pub mod html;

pub use console::ConsoleOutput;
pub use html::HtmlOutput;
