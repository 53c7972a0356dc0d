pub mod expr;
pub mod session;

pub use expr::{evaluate, format_number};
pub use session::{AngleMode, CalculatorSession, Constant, ERROR_DISPLAY};
