use crate::interpreter::quantity::Quantity;
use std::fmt;
use std::fmt::Formatter;
use std::str;

/// A discrete part of an expression
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Plus,
    Dash,
    Asterisk,
    ForwardSlash,
    Caret,
    Pipe,
    In,
    LeftParentheses,
    RightParentheses,
    /// A number or a unit symbol, already turned into a value.
    Quantity(Quantity),
    End,
}

pub static SYMBOLS: [char; 8] = ['+', '-', '*', '/', '^', '|', '(', ')'];

impl Token {
    /// A 'value' is a token that carries a quantity, i.e. a number or a resolved unit.
    pub fn is_value(&self) -> bool {
        matches!(self, Token::Quantity(_))
    }

    /// Describes the token the way error messages refer to it.
    pub fn describe(&self) -> String {
        match self {
            Token::Quantity(quantity) => format!("value '{}'", quantity),
            Token::End => "end of input".into(),
            operator => format!("'{}'", operator),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::Plus => write!(f, "+"),
            Token::Dash => write!(f, "-"),
            Token::Asterisk => write!(f, "*"),
            Token::ForwardSlash => write!(f, "/"),
            Token::Caret => write!(f, "^"),
            Token::Pipe => write!(f, "|"),
            Token::In => write!(f, "in"),
            Token::LeftParentheses => write!(f, "("),
            Token::RightParentheses => write!(f, ")"),
            Token::Quantity(quantity) => write!(f, "{}", quantity),
            Token::End => Ok(()),
        }
    }
}

impl str::FromStr for Token {
    type Err = ();

    /// Parses operator and parenthesis symbols; values are produced by the lexer only.
    fn from_str(input: &str) -> Result<Token, Self::Err> {
        match input {
            "+" => Ok(Token::Plus),
            "-" => Ok(Token::Dash),
            "*" => Ok(Token::Asterisk),
            "/" => Ok(Token::ForwardSlash),
            "^" => Ok(Token::Caret),
            "|" => Ok(Token::Pipe),
            "in" => Ok(Token::In),
            "(" => Ok(Token::LeftParentheses),
            ")" => Ok(Token::RightParentheses),
            _ => Err(()),
        }
    }
}
