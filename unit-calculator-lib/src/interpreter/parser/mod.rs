use crate::interpreter::error::{EvalError, Result};
use crate::interpreter::lexer::{Lexer, UnitLookup};
use crate::interpreter::operator::{BinaryOperator, UnaryOperator};
use crate::interpreter::quantity::Quantity;
use crate::interpreter::token::Token;
use std::mem;

/// How deeply parentheses, prefix operators and right operands may nest in one expression.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parses and evaluates the given expression in a single pass.
///
/// # Arguments
///
/// * `expression`: The text of the expression, e.g. `20 m / s^2 in foot / s^2`.
/// * `units`: Gives meaning to the unit symbols used in the expression.
///
/// returns: The value of the whole expression.
///
/// # Examples
///
/// ```
/// # use unit_calculator::interpreter::error::Result;
/// # fn main() -> Result<()> {
/// use unit_calculator::interpreter::parser::parse;
/// use unit_calculator::interpreter::quantity::Quantity;
/// use unit_calculator::interpreter::resolver::UnitResolver;
///
/// let mut units = UnitResolver::new();
/// units.install_primitive("m");
///
/// let area = parse("(5 m)^2", &mut units)?;
/// assert_eq!(area, Quantity::new(25.0, [("m", 2)]));
/// # Ok(()) }
/// ```
pub fn parse<L: UnitLookup + ?Sized>(expression: &str, units: &mut L) -> Result<Quantity> {
    let lexer = Lexer::new(expression, units);
    if lexer.at_end() {
        return Err(EvalError::EmptyExpression);
    }
    let mut parser = Parser::new(lexer)?;
    let value = parser.parse_expression(0)?;
    parser.expect_end()?;
    Ok(value)
}

/// Precedence climbing over the tokens of a [`Lexer`], holding one token of lookahead.
pub struct Parser<'a, L: UnitLookup + ?Sized> {
    lexer: Lexer<'a, L>,
    current: Token,
    depth: usize,
}

impl<'a, L: UnitLookup + ?Sized> Parser<'a, L> {
    pub fn new(mut lexer: Lexer<'a, L>) -> Result<Parser<'a, L>> {
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            depth: 0,
        })
    }

    /// Parses operands joined by operators whose left binding power is at least `min_power`.
    pub fn parse_expression(&mut self, min_power: u8) -> Result<Quantity> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(EvalError::ExpressionTooDeep {
                depth: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        let result = self.parse_operations(min_power);
        self.depth -= 1;
        result
    }

    fn parse_operations(&mut self, min_power: u8) -> Result<Quantity> {
        let mut left = self.parse_primary()?;

        while let Some(operator) = BinaryOperator::from_token(&self.current) {
            let (left_power, right_power) = operator.binding_power();
            if left_power < min_power {
                break;
            }
            // Juxtaposition has no token of its own, the value is the right operand.
            if operator.token().is_some() {
                self.advance()?;
            }
            let right = self.parse_expression(right_power)?;
            left = operator.evaluate(&left, &right)?;
        }

        Ok(left)
    }

    /// Fails unless every token has been consumed.
    pub fn expect_end(&self) -> Result<()> {
        match self.current {
            Token::End => Ok(()),
            ref trailing => Err(EvalError::TrailingInput {
                found: trailing.describe(),
            }),
        }
    }

    fn parse_primary(&mut self) -> Result<Quantity> {
        if let Some(operator) = UnaryOperator::from_token(&self.current) {
            self.advance()?;
            let operand = self.parse_expression(operator.binding_power())?;
            return operator.evaluate(&operand);
        }

        match self.current {
            Token::LeftParentheses => {
                self.advance()?;
                let inner = self.parse_expression(0)?;
                if self.current != Token::RightParentheses {
                    return Err(EvalError::UnmatchedParen {
                        found: self.current.describe(),
                    });
                }
                self.advance()?;
                Ok(inner)
            }
            Token::Quantity(ref quantity) => {
                let quantity = quantity.clone();
                self.advance()?;
                Ok(quantity)
            }
            ref unexpected => Err(EvalError::UnexpectedToken {
                found: unexpected.describe(),
            }),
        }
    }

    /// Moves to the next token, returning the one that was current.
    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current, next))
    }
}
