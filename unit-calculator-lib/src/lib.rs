pub mod definitions;
pub mod interpreter;

pub use interpreter::error::{EvalError, Result};
pub use interpreter::quantity::Quantity;
pub use interpreter::resolver::UnitResolver;
