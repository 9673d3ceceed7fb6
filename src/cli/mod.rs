pub mod commands;
pub mod handlers;
pub mod terminal_view;

pub use commands::Cli;
pub use handlers::run;
