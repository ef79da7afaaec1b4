use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvalError>;

/// Everything that can go wrong while evaluating an expression or resolving a unit.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unrecognized character '{character}' at byte {position}")]
    LexError { character: char, position: usize },

    #[error("unexpected {found}")]
    UnexpectedToken { found: String },

    #[error("expected ')' but found {found}")]
    UnmatchedParen { found: String },

    #[error("input not fully consumed, found {found}")]
    TrailingInput { found: String },

    #[error("empty expression")]
    EmptyExpression,

    #[error("unknown unit '{0}'")]
    UnknownUnit(String),

    #[error("unit '{0}' is defined in terms of itself")]
    CyclicDefinition(String),

    #[error("incompatible units: '{left}' vs '{right}'")]
    DimensionMismatch { left: String, right: String },

    #[error("exponent must be dimensionless, got '{0}'")]
    NonScalarExponent(String),

    #[error("raising '{symbol}' to {exponent} gives a fractional unit exponent")]
    FractionalExponent { symbol: String, exponent: f64 },

    #[error("exponent of '{symbol}' is out of range")]
    ExponentOverflow { symbol: String },

    #[error("expression nests deeper than {depth} levels")]
    ExpressionTooDeep { depth: usize },

    #[error("division by zero")]
    DivisionByZero,

    #[error("definition of '{symbol}' nests deeper than {depth} units")]
    DefinitionTooDeep { symbol: String, depth: usize },
}
