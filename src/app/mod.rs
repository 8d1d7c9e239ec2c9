pub mod terminal;

pub use terminal::TerminalApp;
