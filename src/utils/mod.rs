pub mod colors;
pub mod date;
pub mod formatting;
pub mod path;
pub mod table;
pub mod validation;

pub use formatting::{format_currency, format_percentage};
