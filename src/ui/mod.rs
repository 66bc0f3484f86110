//! Terminal front end: feedback lines, routes, renderers and the shell.

pub mod messages;
pub mod navigation;
pub mod shell;
pub mod views;
