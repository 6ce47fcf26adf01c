//! Presenters that display the job list

mod terminal;

pub use terminal::{TerminalPresenter, colorize_status};
