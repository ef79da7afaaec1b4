use crate::interpreter::error::Result;
use crate::interpreter::quantity::Quantity;
use crate::interpreter::token::Token;
use std::fmt;
use std::fmt::Formatter;

/// A binary operator between two quantities.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    /// `a in b`, expresses `a` as a multiple of `b`.
    Convert,
    Multiply,
    Divide,
    /// Two values written next to each other, e.g. `5 m`.
    Juxtapose,
    Exponentiate,
    /// `a | b`, division that binds tighter than anything else.
    PipeDivide,
}

/// A prefix operator applied to a single quantity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Negate,
    Reciprocal,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

impl UnaryOperator {
    pub fn from_token(token: &Token) -> Option<UnaryOperator> {
        match token {
            Token::Dash => Some(UnaryOperator::Negate),
            Token::ForwardSlash => Some(UnaryOperator::Reciprocal),
            _ => None,
        }
    }

    pub fn token(&self) -> Token {
        match self {
            UnaryOperator::Negate => Token::Dash,
            UnaryOperator::Reciprocal => Token::ForwardSlash,
        }
    }

    /// The minimum power the operand is parsed with.
    pub(crate) fn binding_power(&self) -> u8 {
        match self {
            UnaryOperator::Negate => 20,
            UnaryOperator::Reciprocal => 25,
        }
    }

    pub fn evaluate(&self, operand: &Quantity) -> Result<Quantity> {
        match self {
            UnaryOperator::Negate => Ok(operand.neg()),
            UnaryOperator::Reciprocal => operand.reciprocal(),
        }
    }
}

impl BinaryOperator {
    /// The operator a token stands for in infix position.
    ///
    /// A value in infix position means the two values are multiplied.
    pub fn from_token(token: &Token) -> Option<BinaryOperator> {
        match token {
            Token::Plus => Some(BinaryOperator::Add),
            Token::Dash => Some(BinaryOperator::Subtract),
            Token::In => Some(BinaryOperator::Convert),
            Token::Asterisk => Some(BinaryOperator::Multiply),
            Token::ForwardSlash => Some(BinaryOperator::Divide),
            Token::Quantity(_) => Some(BinaryOperator::Juxtapose),
            Token::Caret => Some(BinaryOperator::Exponentiate),
            Token::Pipe => Some(BinaryOperator::PipeDivide),
            Token::LeftParentheses | Token::RightParentheses | Token::End => None,
        }
    }

    /// The token the operator is written with, if any.
    pub fn token(&self) -> Option<Token> {
        match self {
            BinaryOperator::Add => Some(Token::Plus),
            BinaryOperator::Subtract => Some(Token::Dash),
            BinaryOperator::Convert => Some(Token::In),
            BinaryOperator::Multiply => Some(Token::Asterisk),
            BinaryOperator::Divide => Some(Token::ForwardSlash),
            BinaryOperator::Juxtapose => None,
            BinaryOperator::Exponentiate => Some(Token::Caret),
            BinaryOperator::PipeDivide => Some(Token::Pipe),
        }
    }

    /// Left and right binding powers.
    ///
    /// The operator continues an expression parsed at minimum power `p` when its
    /// left power is at least `p`; its right operand is parsed with the right power.
    pub(crate) fn binding_power(&self) -> (u8, u8) {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => (10, 11),
            // Meant to be non-associative, parsed as left-associative.
            BinaryOperator::Convert => (15, 16),
            BinaryOperator::Multiply | BinaryOperator::Divide => (20, 21),
            BinaryOperator::Juxtapose => (22, 23),
            BinaryOperator::Exponentiate => (30, 30),
            BinaryOperator::PipeDivide => (40, 41),
        }
    }

    pub fn associativity(&self) -> Associativity {
        let (left, right) = self.binding_power();
        if left < right {
            Associativity::Left
        } else {
            Associativity::Right
        }
    }

    pub fn evaluate(&self, a: &Quantity, b: &Quantity) -> Result<Quantity> {
        match self {
            BinaryOperator::Add => a.add(b),
            BinaryOperator::Subtract => a.sub(b),
            BinaryOperator::Convert => a.convert(b),
            BinaryOperator::Multiply | BinaryOperator::Juxtapose => a.mul(b),
            BinaryOperator::Divide | BinaryOperator::PipeDivide => a.div(b),
            BinaryOperator::Exponentiate => a.pow(b),
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.token() {
            Some(token) => write!(f, "{}", token),
            None => write!(f, " "),
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::error::EvalError;

    #[test]
    fn exponentiation_is_right_associative() {
        assert_eq!(
            BinaryOperator::Exponentiate.associativity(),
            Associativity::Right
        );
    }

    #[test]
    fn arithmetic_operators_are_left_associative() {
        for operator in [
            BinaryOperator::Add,
            BinaryOperator::Subtract,
            BinaryOperator::Convert,
            BinaryOperator::Multiply,
            BinaryOperator::Divide,
            BinaryOperator::Juxtapose,
            BinaryOperator::PipeDivide,
        ] {
            assert_eq!(operator.associativity(), Associativity::Left, "{:?}", operator);
        }
    }

    #[test]
    fn juxtaposition_binds_tighter_than_division() {
        let (_, divide_right) = BinaryOperator::Divide.binding_power();
        let (juxtapose_left, _) = BinaryOperator::Juxtapose.binding_power();
        assert!(juxtapose_left > divide_right);
    }

    #[test]
    fn negation_operand_stops_before_addition() {
        let (add_left, _) = BinaryOperator::Add.binding_power();
        assert!(UnaryOperator::Negate.binding_power() > add_left);
    }

    #[test]
    fn value_token_in_infix_position_is_juxtaposition() {
        let token = Token::Quantity(Quantity::unit("m"));
        assert_eq!(
            BinaryOperator::from_token(&token),
            Some(BinaryOperator::Juxtapose)
        );
    }

    #[test]
    fn parentheses_are_not_operators() {
        assert_eq!(BinaryOperator::from_token(&Token::LeftParentheses), None);
        assert_eq!(UnaryOperator::from_token(&Token::Plus), None);
    }

    #[test]
    fn pipe_divides() {
        let result = BinaryOperator::PipeDivide
            .evaluate(&Quantity::scalar(1.0), &Quantity::scalar(4.0))
            .unwrap();
        assert_eq!(result, Quantity::scalar(0.25));
    }

    #[test]
    fn reciprocal_of_zero_is_division_by_zero() {
        let error = UnaryOperator::Reciprocal
            .evaluate(&Quantity::scalar(0.0))
            .unwrap_err();
        assert_eq!(error, EvalError::DivisionByZero);
    }
}
