pub mod error;
pub mod lexer;
pub mod operator;
pub mod parser;
pub mod quantity;
pub mod resolver;
pub mod token;

use crate::interpreter::error::Result;
use crate::interpreter::resolver::UnitResolver;
use log::trace;

/// Evaluates the given expression and renders its value.
///
/// # Arguments
///
/// * `expression`: A text expression in infix format, e.g. `60 mile/hour in m/s`.
/// * `units`: The unit definitions available to the expression.
///
/// returns: The value followed by its units, e.g. `26.8224`.
///
/// # Examples
///
/// ```
/// use unit_calculator::interpreter::calculate;
/// use unit_calculator::interpreter::resolver::UnitResolver;
/// # use unit_calculator::interpreter::error::Result;
///
/// # fn main() -> Result<()> {
/// let mut units = UnitResolver::standard();
/// let area = calculate("(5 m)^2", &mut units)?;
/// assert_eq!(area, "25 m^2");
/// # Ok(()) }
/// ```
pub fn calculate(expression: &str, units: &mut UnitResolver) -> Result<String> {
    let value = units.evaluate(expression)?;
    trace!("'{}' evaluated to {:?}", expression, value);
    Ok(value.to_string())
}
