//! Simple to use cli for tracking daily habits and streaks.
//! Unlike most habit apps this doesn't require any runtimes, keeps state in a single json file,
//! and can be easily used through a terminal.
//!

pub mod cli;
pub mod store;
pub mod utils;
