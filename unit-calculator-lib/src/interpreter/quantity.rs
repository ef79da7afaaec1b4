use crate::interpreter::error::{EvalError, Result};
use itertools::{EitherOrBoth, Itertools};
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use string_builder::Builder;

/// Unit symbols mapped to their exponents, sorted by symbol.
///
/// A map owned by a [`Quantity`] never contains a zero exponent.
pub type Units = BTreeMap<String, i32>;

/// A floating point value tagged with the units it is measured in.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantity {
    value: f64,
    units: Units,
}

impl Quantity {
    /// Creates a quantity, dropping every unit whose exponent is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use unit_calculator::interpreter::quantity::Quantity;
    ///
    /// let speed = Quantity::new(5.0, [("m", 1), ("s", -1), ("kg", 0)]);
    /// assert_eq!(speed.to_string(), "5 m s^-1");
    /// ```
    pub fn new<S: Into<String>>(value: f64, units: impl IntoIterator<Item = (S, i32)>) -> Quantity {
        let units = units
            .into_iter()
            .map(|(symbol, exponent)| (symbol.into(), exponent))
            .filter(|(_, exponent)| *exponent != 0)
            .collect();
        Quantity { value, units }
    }

    pub fn scalar(value: f64) -> Quantity {
        Quantity {
            value,
            units: Units::new(),
        }
    }

    /// One of the named unit, i.e. `1 symbol^1`.
    pub fn unit(symbol: &str) -> Quantity {
        Quantity::new(1.0, [(symbol, 1)])
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn units(&self) -> &Units {
        &self.units
    }

    pub fn exponent(&self, symbol: &str) -> i32 {
        self.units.get(symbol).copied().unwrap_or(0)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.units.is_empty()
    }

    /// Whether both quantities are measured in the same set of unit symbols.
    /// Only the symbols are compared, not their exponents.
    pub fn same_dimensions(&self, other: &Quantity) -> bool {
        self.units.keys().eq(other.units.keys())
    }

    pub fn add(&self, other: &Quantity) -> Result<Quantity> {
        self.check_compatible(other)?;
        Ok(Quantity {
            value: self.value + other.value,
            units: self.units.clone(),
        })
    }

    pub fn sub(&self, other: &Quantity) -> Result<Quantity> {
        self.check_compatible(other)?;
        Ok(Quantity {
            value: self.value - other.value,
            units: self.units.clone(),
        })
    }

    pub fn mul(&self, other: &Quantity) -> Result<Quantity> {
        Ok(Quantity {
            value: self.value * other.value,
            units: combine_units(&self.units, &other.units, 1)?,
        })
    }

    pub fn div(&self, other: &Quantity) -> Result<Quantity> {
        if other.value == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Quantity {
            value: self.value / other.value,
            units: combine_units(&self.units, &other.units, -1)?,
        })
    }

    /// Raises the quantity to a dimensionless power, scaling every unit exponent by it.
    ///
    /// # Examples
    ///
    /// ```
    /// use unit_calculator::interpreter::quantity::Quantity;
    /// # fn main() -> unit_calculator::interpreter::error::Result<()> {
    /// let area = Quantity::new(5.0, [("m", 1)]).pow(&Quantity::scalar(2.0))?;
    /// assert_eq!(area, Quantity::new(25.0, [("m", 2)]));
    /// # Ok(()) }
    /// ```
    pub fn pow(&self, exponent: &Quantity) -> Result<Quantity> {
        if !exponent.is_dimensionless() {
            return Err(EvalError::NonScalarExponent(exponent.to_string()));
        }
        let power = exponent.value;
        let units = self
            .units
            .iter()
            .map(|(symbol, current)| {
                let scaled = f64::from(*current) * power;
                if !scaled.is_finite() || scaled.abs() > f64::from(i32::MAX) {
                    return Err(EvalError::ExponentOverflow {
                        symbol: symbol.clone(),
                    });
                }
                if scaled.fract() != 0.0 {
                    return Err(EvalError::FractionalExponent {
                        symbol: symbol.clone(),
                        exponent: power,
                    });
                }
                Ok((symbol.clone(), scaled as i32))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Quantity::new(self.value.powf(power), units))
    }

    pub fn neg(&self) -> Quantity {
        Quantity {
            value: -self.value,
            units: self.units.clone(),
        }
    }

    pub fn reciprocal(&self) -> Result<Quantity> {
        Quantity::scalar(1.0).div(self)
    }

    /// Expresses this quantity as a multiple of `target`.
    ///
    /// The result is dimensionless whenever both sides carry identical exponents.
    pub fn convert(&self, target: &Quantity) -> Result<Quantity> {
        self.check_compatible(target)?;
        self.div(target)
    }

    /// Renders the value followed by its units, e.g. `10 m^2 s^-1`.
    pub fn format(&self) -> String {
        let mut builder = Builder::default();
        builder.append(format_value(self.value));
        if !self.units.is_empty() {
            builder.append(" ");
            builder.append(format_units(&self.units));
        }
        builder.string().unwrap_or_default()
    }

    fn check_compatible(&self, other: &Quantity) -> Result<()> {
        if self.same_dimensions(other) {
            Ok(())
        } else {
            Err(EvalError::DimensionMismatch {
                left: format_units(&self.units),
                right: format_units(&other.units),
            })
        }
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format())
    }
}

/// Space separated `symbol` / `symbol^exponent` list in symbol order.
pub fn format_units(units: &Units) -> String {
    units
        .iter()
        .map(|(symbol, exponent)| match exponent {
            1 => symbol.clone(),
            _ => format!("{}^{}", symbol, exponent),
        })
        .join(" ")
}

/// Plain decimal for ordinary magnitudes, exponent notation for very large or small ones.
fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1e16 || (magnitude != 0.0 && magnitude < 1e-4) {
        format!("{:e}", value)
    } else {
        value.to_string()
    }
}

/// Adds (`sign` 1) or subtracts (`sign` -1) the exponents of `right` from those of `left`.
fn combine_units(left: &Units, right: &Units, sign: i32) -> Result<Units> {
    let mut combined = Units::new();
    for pair in left
        .iter()
        .merge_join_by(right.iter(), |left, right| left.0.cmp(right.0))
    {
        let (symbol, exponent) = match pair {
            EitherOrBoth::Both((symbol, a), (_, b)) => {
                (symbol, b.checked_mul(sign).and_then(|b| a.checked_add(b)))
            }
            EitherOrBoth::Left((symbol, a)) => (symbol, Some(*a)),
            EitherOrBoth::Right((symbol, b)) => (symbol, b.checked_mul(sign)),
        };
        match exponent {
            Some(0) => {}
            Some(exponent) => {
                combined.insert(symbol.clone(), exponent);
            }
            None => {
                return Err(EvalError::ExponentOverflow {
                    symbol: symbol.clone(),
                })
            }
        }
    }
    Ok(combined)
}
