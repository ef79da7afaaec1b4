use crate::interpreter::error::{EvalError, Result};
use crate::interpreter::quantity::Quantity;
use crate::interpreter::token::{Token, SYMBOLS};

/// Gives meaning to the unit symbols met while scanning.
pub trait UnitLookup {
    fn meaning(&mut self, symbol: &str) -> Result<Quantity>;
}

/// Scans an expression into tokens on demand.
///
/// Unit symbols are looked up as soon as they are read, so the parser only ever
/// sees operators and finished quantities. Scanning a new string means creating a
/// new lexer.
pub struct Lexer<'a, L: UnitLookup + ?Sized> {
    source: &'a str,
    position: usize,
    units: &'a mut L,
}

impl<'a, L: UnitLookup + ?Sized> Lexer<'a, L> {
    pub fn new(source: &'a str, units: &'a mut L) -> Lexer<'a, L> {
        Lexer {
            source,
            position: 0,
            units,
        }
    }

    /// Reads the next token, returning [`Token::End`] once only whitespace remains.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let current = match self.rest().chars().next() {
            None => return Ok(Token::End),
            Some(current) => current,
        };

        if let Some(operator) = self.read_operator() {
            return Ok(operator);
        }
        if is_symbol_start(current) {
            let symbol = self.read_symbol();
            return self.units.meaning(symbol).map(Token::Quantity);
        }
        if let Some(number) = self.read_number()? {
            return Ok(Token::Quantity(Quantity::scalar(number)));
        }

        Err(EvalError::LexError {
            character: current,
            position: self.position,
        })
    }

    /// Whether the remaining input is empty or whitespace.
    pub fn at_end(&self) -> bool {
        self.rest().trim().is_empty()
    }

    fn rest(&self) -> &'a str {
        &self.source[self.position..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.position += rest.len() - rest.trim_start().len();
    }

    fn read_operator(&mut self) -> Option<Token> {
        let rest = self.rest();
        let first = rest.chars().next()?;
        if SYMBOLS.contains(&first) {
            self.position += first.len_utf8();
            return first.to_string().parse().ok();
        }

        let after_keyword = rest.strip_prefix("in")?;
        match after_keyword.chars().next() {
            Some(next) if is_symbol_continue(next) => None,
            _ => {
                self.position += "in".len();
                Some(Token::In)
            }
        }
    }

    fn read_symbol(&mut self) -> &'a str {
        let rest = self.rest();
        let length = rest
            .find(|character: char| !is_symbol_continue(character))
            .unwrap_or(rest.len());
        self.position += length;
        &rest[..length]
    }

    /// `-?digits(.digits)?([eE][+-]?digits)?`
    fn read_number(&mut self) -> Result<Option<f64>> {
        let bytes = self.rest().as_bytes();
        let mut length = 0;

        if bytes.first() == Some(&b'-') {
            length += 1;
        }
        let integer_digits = count_digits(&bytes[length..]);
        if integer_digits == 0 {
            return Ok(None);
        }
        length += integer_digits;

        if bytes.get(length) == Some(&b'.') {
            let fraction_digits = count_digits(&bytes[length + 1..]);
            if fraction_digits > 0 {
                length += 1 + fraction_digits;
            }
        }

        if matches!(bytes.get(length), Some(b'e') | Some(b'E')) {
            let mut exponent_length = 1;
            if matches!(bytes.get(length + 1), Some(b'+') | Some(b'-')) {
                exponent_length += 1;
            }
            let exponent_digits = count_digits(&bytes[(length + exponent_length).min(bytes.len())..]);
            if exponent_digits > 0 {
                length += exponent_length + exponent_digits;
            }
        }

        let text = &self.rest()[..length];
        let value = text.parse::<f64>().map_err(|_| EvalError::LexError {
            character: text.chars().next().unwrap_or('-'),
            position: self.position,
        })?;
        self.position += length;
        Ok(Some(value))
    }
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

fn is_symbol_start(character: char) -> bool {
    character.is_ascii_alphabetic() || matches!(character, '_' | '$' | '%')
}

fn is_symbol_continue(character: char) -> bool {
    is_symbol_start(character) || character.is_ascii_digit()
}
