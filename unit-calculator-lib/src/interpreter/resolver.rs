use crate::definitions;
use crate::interpreter::error::{EvalError, Result};
use crate::interpreter::lexer::UnitLookup;
use crate::interpreter::parser::parse;
use crate::interpreter::quantity::Quantity;
use log::{debug, trace};
use std::collections::HashMap;

/// How many definitions may be in the middle of being resolved at once.
pub const MAX_RESOLUTION_DEPTH: usize = 128;

/// Where a unit symbol stands in the resolution process.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// Has a definition that has not been needed yet.
    Unresolved,
    /// Its definition is currently being evaluated.
    InProgress,
    Resolved(Quantity),
    /// Its definition could not be evaluated, and never will be.
    Failed(EvalError),
}

/// The table of unit definitions, resolved lazily and remembered once resolved.
///
/// Base units are installed already resolved. Every other unit is installed as the
/// text of its definition, which is evaluated the first time the unit is used.
/// Definitions may refer to other units, so resolving one unit can resolve many.
#[derive(Debug, Default)]
pub struct UnitResolver {
    known: HashMap<String, Resolution>,
    raw: HashMap<String, String>,
    depth: usize,
    evaluated_definitions: usize,
}

impl UnitResolver {
    pub fn new() -> UnitResolver {
        UnitResolver::default()
    }

    /// A resolver holding the SI base units and a selection of common units.
    ///
    /// # Examples
    ///
    /// ```
    /// # fn main() -> unit_calculator::interpreter::error::Result<()> {
    /// use unit_calculator::interpreter::resolver::UnitResolver;
    ///
    /// let mut units = UnitResolver::standard();
    /// let feet = units.evaluate("3 m in feet")?;
    /// assert!((feet.value() - 9.8425).abs() < 1e-4);
    /// # Ok(()) }
    /// ```
    pub fn standard() -> UnitResolver {
        let mut resolver = UnitResolver::new();
        definitions::load_standard(&mut resolver);
        resolver
    }

    /// Evaluates an expression, resolving the units it mentions.
    pub fn evaluate(&mut self, expression: &str) -> Result<Quantity> {
        parse(expression, self)
    }

    /// The value of a single unit symbol.
    pub fn resolve_unit(&mut self, symbol: &str) -> Result<Quantity> {
        self.meaning(symbol)
    }

    /// Installs a unit whose value is known up front, replacing any earlier definition.
    pub fn install_base_unit(&mut self, symbol: &str, value: Quantity) {
        self.raw.remove(symbol);
        self.forget_evaluated();
        self.known
            .insert(symbol.to_string(), Resolution::Resolved(value));
    }

    /// Installs `symbol` as a dimension of its own.
    pub fn install_primitive(&mut self, symbol: &str) {
        self.install_base_unit(symbol, Quantity::unit(symbol));
    }

    /// Installs `symbol` as a plain `1`, e.g. `radian`.
    pub fn install_dimensionless(&mut self, symbol: &str) {
        self.install_base_unit(symbol, Quantity::scalar(1.0));
    }

    /// Installs a unit defined by an expression, evaluated when first used.
    pub fn install_alias(&mut self, symbol: &str, definition: &str) {
        self.known.remove(symbol);
        self.forget_evaluated();
        self.raw.insert(symbol.to_string(), definition.to_string());
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.known.contains_key(symbol) || self.raw.contains_key(symbol)
    }

    /// Number of distinct unit symbols installed.
    pub fn len(&self) -> usize {
        self.raw
            .keys()
            .filter(|symbol| !self.known.contains_key(*symbol))
            .count()
            + self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.raw.is_empty()
    }

    pub fn state(&self, symbol: &str) -> Option<Resolution> {
        match self.known.get(symbol) {
            Some(resolution) => Some(resolution.clone()),
            None if self.raw.contains_key(symbol) => Some(Resolution::Unresolved),
            None => None,
        }
    }

    /// How many definition texts have been evaluated so far.
    pub fn evaluated_definitions(&self) -> usize {
        self.evaluated_definitions
    }

    /// Drops every remembered result of a definition, successful or failed,
    /// since any of them may depend on what is being installed.
    fn forget_evaluated(&mut self) {
        let raw = &self.raw;
        self.known.retain(|symbol, _| !raw.contains_key(symbol));
    }

    fn resolve_definition(&mut self, symbol: &str, definition: &str) -> Result<Quantity> {
        if self.depth >= MAX_RESOLUTION_DEPTH {
            return Err(EvalError::DefinitionTooDeep {
                symbol: symbol.to_string(),
                depth: MAX_RESOLUTION_DEPTH,
            });
        }

        debug!("Resolving '{}' from '{}'", symbol, definition);
        self.known
            .insert(symbol.to_string(), Resolution::InProgress);
        self.depth += 1;
        self.evaluated_definitions += 1;
        let result = parse(definition, self);
        self.depth -= 1;

        match &result {
            Ok(value) => {
                trace!("'{}' resolved to {}", symbol, value);
                self.known
                    .insert(symbol.to_string(), Resolution::Resolved(value.clone()));
            }
            // Depends on how deep the caller already was, so it may succeed later.
            Err(EvalError::DefinitionTooDeep { .. }) => {
                self.known.remove(symbol);
            }
            Err(error) => {
                debug!("'{}' failed to resolve: {}", symbol, error);
                self.known
                    .insert(symbol.to_string(), Resolution::Failed(error.clone()));
            }
        }
        result
    }
}

impl UnitLookup for UnitResolver {
    fn meaning(&mut self, symbol: &str) -> Result<Quantity> {
        match self.known.get(symbol) {
            Some(Resolution::Resolved(value)) => return Ok(value.clone()),
            Some(Resolution::Failed(error)) => return Err(error.clone()),
            Some(Resolution::InProgress) => {
                return Err(EvalError::CyclicDefinition(symbol.to_string()))
            }
            Some(Resolution::Unresolved) | None => {}
        }

        let definition = match self.raw.get(symbol) {
            Some(definition) => definition.clone(),
            None => return Err(EvalError::UnknownUnit(symbol.to_string())),
        };
        self.resolve_definition(symbol, &definition)
    }
}
