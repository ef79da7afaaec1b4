//! Reading unit definitions written in the style of GNU units' `definitions.units`.
//!
//! Only the records that map a unit name to an expression (or mark it as a base
//! unit) are understood; functions, tables and directives are skipped.

use crate::interpreter::resolver::UnitResolver;
use anyhow::{Context, Result};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// The units every [`UnitResolver::standard`] starts with.
pub const STANDARD_UNITS: &str = include_str!("standard.units");

const REJECTED_NAME_CHARACTERS: &[char] = &['(', ')', '[', ']', ',', '.', '\''];
const QUOTES: &[char] = &['\'', '"'];

/// Counts of what a definitions source contributed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records installed as base units or definitions.
    pub installed: usize,
    /// Plural forms added alongside installed records.
    pub plurals: usize,
    /// Records recognized as definitions but not understood.
    pub skipped: usize,
}

/// A single logical line of a definitions source.
#[derive(Debug, PartialEq)]
enum Record<'a> {
    /// Blank lines, comments and anything not starting with a letter or `%`.
    Ignored,
    Skipped(&'static str),
    Definition {
        name: &'a str,
        is_prefix: bool,
        definition: &'a str,
    },
}

/// Installs every definition found in `text` into the resolver.
///
/// # Examples
///
/// ```
/// # fn main() -> unit_calculator::interpreter::error::Result<()> {
/// use unit_calculator::definitions::load_str;
/// use unit_calculator::interpreter::resolver::UnitResolver;
///
/// let mut units = UnitResolver::new();
/// let summary = load_str(&mut units, "m !\nfurlong 201.168 m  # 1/8 mile\n");
/// assert_eq!(summary.installed, 2);
///
/// let length = units.evaluate("2 furlongs")?;
/// assert_eq!(length.to_string(), "402.336 m");
/// # Ok(()) }
/// ```
pub fn load_str(resolver: &mut UnitResolver, text: &str) -> LoadSummary {
    let mut summary = LoadSummary::default();

    for (line_number, line) in logical_lines(text) {
        match parse_record(&line) {
            Record::Ignored => {}
            Record::Skipped(reason) => {
                debug!("Skipping definition on line {}: {}", line_number, reason);
                summary.skipped += 1;
            }
            Record::Definition {
                name,
                is_prefix,
                definition,
            } => {
                install(resolver, name, definition);
                summary.installed += 1;

                let plural = format!("{}s", name);
                if name != "in" && !is_prefix && !resolver.contains(&plural) {
                    resolver.install_alias(&plural, name);
                    summary.plurals += 1;
                }
            }
        }
    }

    info!(
        "Loaded {} definitions ({} plurals added, {} skipped)",
        summary.installed, summary.plurals, summary.skipped
    );
    summary
}

/// Reads and installs a definitions file.
pub fn load_file(resolver: &mut UnitResolver, path: impl AsRef<Path>) -> Result<LoadSummary> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read definitions from {}", path.display()))?;
    Ok(load_str(resolver, &text))
}

/// Installs the embedded [`STANDARD_UNITS`].
pub fn load_standard(resolver: &mut UnitResolver) -> LoadSummary {
    load_str(resolver, STANDARD_UNITS)
}

fn install(resolver: &mut UnitResolver, name: &str, definition: &str) {
    match definition {
        "!" => resolver.install_primitive(name),
        "!dimensionless" => resolver.install_dimensionless(name),
        _ => resolver.install_alias(name, definition),
    }
}

/// Joins physical lines ending in a backslash, numbering each logical line by its first line.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = vec![];
    let mut pending: Option<(usize, String)> = None;

    for (index, physical) in text.lines().enumerate() {
        let (start, mut joined) = pending.take().unwrap_or((index + 1, String::new()));
        match physical.strip_suffix('\\') {
            Some(continued) => {
                joined.push_str(continued);
                pending = Some((start, joined));
            }
            None => {
                joined.push_str(physical);
                lines.push((start, joined));
            }
        }
    }
    lines.extend(pending);
    lines
}

fn parse_record(line: &str) -> Record<'_> {
    match line.chars().next() {
        Some(first) if first.is_ascii_alphabetic() || first == '%' => {}
        _ => return Record::Ignored,
    }

    let content = match line.find('#') {
        Some(comment) => &line[..comment],
        None => line,
    };
    let (name, definition) = match content.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => return Record::Skipped("no definition"),
    };

    if definition.is_empty() {
        return Record::Skipped("no definition");
    }
    if name.contains(REJECTED_NAME_CHARACTERS) {
        return Record::Skipped("not a plain unit name");
    }
    if definition.contains(QUOTES) {
        return Record::Skipped("quoted definition");
    }
    if definition.starts_with('!') && definition != "!" && definition != "!dimensionless" {
        return Record::Skipped("unsupported directive");
    }

    match name.strip_suffix('-') {
        Some(prefix) => Record::Definition {
            name: prefix,
            is_prefix: true,
            definition,
        },
        None => Record::Definition {
            name,
            is_prefix: false,
            definition,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::error::EvalError;
    use crate::interpreter::quantity::Quantity;
    use crate::interpreter::resolver::Resolution;
    use approx::assert_relative_eq;
    use parameterized_macro::parameterized;

    #[test]
    fn definition_record_is_split_at_first_whitespace() {
        assert_eq!(
            parse_record("furlong\t\t1|8 mile"),
            Record::Definition {
                name: "furlong",
                is_prefix: false,
                definition: "1|8 mile"
            }
        );
    }

    #[test]
    fn trailing_dash_marks_a_prefix() {
        assert_eq!(
            parse_record("kilo-   1e3"),
            Record::Definition {
                name: "kilo",
                is_prefix: true,
                definition: "1e3"
            }
        );
    }

    #[test]
    fn comment_is_removed_from_definition() {
        assert_eq!(
            parse_record("c  299792458 m/s # speed of light"),
            Record::Definition {
                name: "c",
                is_prefix: false,
                definition: "299792458 m/s"
            }
        );
    }

    #[parameterized(line = { "", "# comment", "  m !", "!set UNITS_ENGLISH US", "1 m", "+foo 2" })]
    fn non_records_are_ignored(line: &str) {
        assert_eq!(parse_record(line), Record::Ignored);
    }

    #[parameterized(line = {
    "tempC(x) units=[1;K] x K + 273.15",
    "US.foot 1200|3937 m",
    "lonely",
    "greeting 'hello'",
    "weird !locale en_US"
    })]
    fn unusable_records_are_skipped(line: &str) {
        assert!(matches!(parse_record(line), Record::Skipped(_)));
    }

    #[test]
    fn continued_lines_are_joined() {
        let lines = logical_lines("a 1 \\\n  m\nb 2\n");
        assert_eq!(
            lines,
            vec![(1, "a 1   m".to_string()), (3, "b 2".to_string())]
        );
    }

    #[test]
    fn continuation_on_last_line_is_kept() {
        let lines = logical_lines("a 1 \\");
        assert_eq!(lines, vec![(1, "a 1 ".to_string())]);
    }

    #[test]
    fn base_units_are_installed_resolved() {
        let mut resolver = UnitResolver::new();
        load_str(&mut resolver, "m !\nradian !dimensionless\n");

        assert_eq!(
            resolver.state("m"),
            Some(Resolution::Resolved(Quantity::unit("m")))
        );
        assert_eq!(
            resolver.state("radian"),
            Some(Resolution::Resolved(Quantity::scalar(1.0)))
        );
    }

    #[test]
    fn plurals_are_added_for_units_but_not_prefixes() {
        let mut resolver = UnitResolver::new();
        let summary = load_str(&mut resolver, "m !\nfoot 0.3048 m\nmilli- 1e-3\n");

        assert_eq!(
            summary,
            LoadSummary {
                installed: 3,
                plurals: 2,
                skipped: 0
            }
        );
        assert!(resolver.contains("foots"));
        assert!(!resolver.contains("millis"));
        assert_eq!(resolver.state("foots"), Some(Resolution::Unresolved));
    }

    #[test]
    fn explicit_plural_is_not_overwritten() {
        let mut resolver = UnitResolver::new();
        let summary = load_str(&mut resolver, "m !\nyards 3 m\nyard 0.9144 m\n");

        let yards = resolver.resolve_unit("yards").unwrap();

        assert_relative_eq!(yards.value(), 3.0);
        assert_eq!(summary.plurals, 2);
    }

    #[test]
    fn in_gets_no_plural() {
        let mut resolver = UnitResolver::new();
        load_str(&mut resolver, "m !\nin 0.0254 m\n");
        assert!(!resolver.contains("ins"));
    }

    #[test]
    fn plural_resolves_to_the_singular() {
        let mut resolver = UnitResolver::new();
        load_str(&mut resolver, "m !\nfurlong 201.168 m\n");

        let plural = resolver.resolve_unit("furlongs").unwrap();
        let singular = resolver.resolve_unit("furlong").unwrap();

        assert_eq!(plural, singular);
    }

    #[test]
    fn skipped_records_are_counted() {
        let mut resolver = UnitResolver::new();
        let summary = load_str(&mut resolver, "m !\nbroken(x) x m\nquote 'a'\n");

        assert_eq!(summary.skipped, 2);
        assert_eq!(
            resolver.resolve_unit("broken").unwrap_err(),
            EvalError::UnknownUnit("broken".into())
        );
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let mut resolver = UnitResolver::new();

        let error = load_file(&mut resolver, "does/not/exist.units").unwrap_err();

        assert!(error.to_string().contains("does/not/exist.units"));
    }

    #[test]
    fn standard_units_all_resolve() {
        let mut resolver = UnitResolver::new();
        let summary = load_standard(&mut resolver);
        assert_eq!(summary.skipped, 0);

        for (_, line) in logical_lines(STANDARD_UNITS) {
            if let Record::Definition { name, .. } = parse_record(&line) {
                assert!(
                    resolver.resolve_unit(name).is_ok(),
                    "'{}' does not resolve",
                    name
                );
            }
        }
    }

    #[parameterized(
    expression = { "1 mile in km", "1 hour in s", "1 acre in m^2", "1 hp in W", "180 deg in radian" },
    expected = { 1.609344, 3600.0, 4046.8564224, 745.6998715822702, 3.141592653589793 }
    )]
    fn standard_conversions(expression: &str, expected: f64) {
        let mut resolver = UnitResolver::standard();

        let result = resolver.evaluate(expression).unwrap();

        assert!(result.is_dimensionless());
        assert_relative_eq!(result.value(), expected, max_relative = 1e-9);
    }
}
