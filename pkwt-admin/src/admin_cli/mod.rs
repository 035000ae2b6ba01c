pub mod user_commands;
pub mod utils;
