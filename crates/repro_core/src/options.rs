//! Typed compiler options.
//!
//! A backend publishes an [`OptionCatalog`] describing every option it
//! understands. Raw directive strings are parsed against that catalog into
//! an [`OptionSet`]. Names are matched case-insensitively everywhere.

use crate::error::{HarnessError, HarnessResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Primitive option type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveKind {
    /// `true` / `false`
    Boolean,
    /// Decimal number
    Number,
    /// Free-form text
    String,
}

impl PrimitiveKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Boolean => "a boolean",
            Self::Number => "a number",
            Self::String => "a string",
        }
    }
}

/// Declared option type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionKind {
    /// Single primitive value
    Primitive(PrimitiveKind),
    /// Comma-separated list of primitives
    List(PrimitiveKind),
    /// Enumerated choice: lowercase name to backend code
    Choice(IndexMap<String, i64>),
}

/// Parsed option value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OptionValue {
    /// Boolean
    Bool(bool),
    /// Number
    Number(f64),
    /// String
    String(String),
    /// List of primitive values
    List(Vec<OptionValue>),
    /// Enumerated choice
    Choice {
        /// Lowercase choice name
        name: String,
        /// Backend code
        code: i64,
    },
}

/// Declaration of one backend option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDecl {
    /// Name with its canonical casing
    pub name: String,
    /// Value type
    pub kind: OptionKind,
}

impl OptionDecl {
    /// Declare a boolean option
    #[must_use]
    pub fn boolean(name: &str) -> Self {
        Self::new(name, OptionKind::Primitive(PrimitiveKind::Boolean))
    }

    /// Declare a numeric option
    #[must_use]
    pub fn number(name: &str) -> Self {
        Self::new(name, OptionKind::Primitive(PrimitiveKind::Number))
    }

    /// Declare a string option
    #[must_use]
    pub fn string(name: &str) -> Self {
        Self::new(name, OptionKind::Primitive(PrimitiveKind::String))
    }

    /// Declare a list option
    #[must_use]
    pub fn list(name: &str, element: PrimitiveKind) -> Self {
        Self::new(name, OptionKind::List(element))
    }

    /// Declare an enumerated option from `(name, code)` pairs
    #[must_use]
    pub fn choice(name: &str, choices: &[(&str, i64)]) -> Self {
        let table = choices
            .iter()
            .map(|(choice, code)| (choice.to_ascii_lowercase(), *code))
            .collect();
        Self::new(name, OptionKind::Choice(table))
    }

    fn new(name: &str, kind: OptionKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }

    /// Parse a raw directive value against this declaration
    ///
    /// # Errors
    ///
    /// Returns `InvalidOptionValue` if the value does not fit the type
    pub fn parse_value(&self, raw: &str) -> HarnessResult<OptionValue> {
        match &self.kind {
            OptionKind::Primitive(kind) => self.parse_primitive(*kind, raw),
            OptionKind::List(element) => raw
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| self.parse_primitive(*element, item))
                .collect::<HarnessResult<Vec<_>>>()
                .map(OptionValue::List),
            OptionKind::Choice(table) => {
                let key = raw.to_ascii_lowercase();
                match table.get(&key) {
                    Some(code) => Ok(OptionValue::Choice { name: key, code: *code }),
                    None => Err(HarnessError::invalid_choice(
                        &self.name,
                        raw,
                        table.keys().map(String::as_str),
                    )),
                }
            }
        }
    }

    fn parse_primitive(&self, kind: PrimitiveKind, raw: &str) -> HarnessResult<OptionValue> {
        let invalid = || HarnessError::InvalidOptionValue {
            name: self.name.clone(),
            value: raw.to_string(),
            expected: kind.describe().to_string(),
        };
        match kind {
            PrimitiveKind::Boolean => parse_bool(raw).map(OptionValue::Bool).ok_or_else(invalid),
            PrimitiveKind::Number => raw
                .trim()
                .parse::<f64>()
                .map(OptionValue::Number)
                .map_err(|_| invalid()),
            PrimitiveKind::String => Ok(OptionValue::String(raw.to_string())),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Catalog of options a backend declares
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCatalog {
    /// Declarations keyed by lowercase name
    decls: IndexMap<String, OptionDecl>,
}

impl OptionCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration, replacing any with the same name
    #[must_use]
    pub fn with(mut self, decl: OptionDecl) -> Self {
        self.declare(decl);
        self
    }

    /// Add a declaration, replacing any with the same name
    pub fn declare(&mut self, decl: OptionDecl) {
        self.decls.insert(decl.name.to_ascii_lowercase(), decl);
    }

    /// Look up a declaration case-insensitively
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&OptionDecl> {
        self.decls.get(&name.to_ascii_lowercase())
    }

    /// Declared names in declaration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.decls.values().map(|d| d.name.as_str()).collect()
    }

    /// Number of declared options
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Check if nothing is declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Option values passed to a backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSet {
    /// Values keyed by lowercase name
    values: IndexMap<String, OptionValue>,
}

impl OptionSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value
    pub fn set(&mut self, name: &str, value: OptionValue) {
        self.values.insert(name.to_ascii_lowercase(), value);
    }

    /// Get a value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(&name.to_ascii_lowercase())
    }

    /// Boolean value, `false` when absent or not boolean
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(OptionValue::Bool(true)))
    }

    /// String value
    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(OptionValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Number value
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(OptionValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Enumerated choice name
    #[must_use]
    pub fn choice(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(OptionValue::Choice { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Check if a value is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(&name.to_ascii_lowercase())
    }

    /// Iterate `(lowercase name, value)` in assignment order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of assigned options
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if nothing is assigned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Options consumed by the harness itself, never forwarded to a backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessFlags {
    /// Sweep every registered backend version
    pub regress: bool,
}

impl HarnessFlags {
    /// Names reserved for the harness
    pub const NAMES: &'static [&'static str] = &["regress"];

    /// Check if a name is harness-internal
    #[must_use]
    pub fn is_harness_option(name: &str) -> bool {
        Self::NAMES.iter().any(|n| n.eq_ignore_ascii_case(name))
    }

    /// Apply a harness-internal option
    ///
    /// Returns `None` when `name` is not harness-internal.
    pub fn apply(&mut self, name: &str, raw: &str) -> Option<HarnessResult<()>> {
        if !name.eq_ignore_ascii_case("regress") {
            return None;
        }
        Some(match parse_bool(raw) {
            Some(value) => {
                self.regress = value;
                Ok(())
            }
            None => Err(HarnessError::InvalidOptionValue {
                name: "regress".to_string(),
                value: raw.to_string(),
                expected: PrimitiveKind::Boolean.describe().to_string(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> OptionCatalog {
        OptionCatalog::new()
            .with(OptionDecl::boolean("strictNullChecks"))
            .with(OptionDecl::number("maxNodeModuleJsDepth"))
            .with(OptionDecl::string("outDir"))
            .with(OptionDecl::list("types", PrimitiveKind::String))
            .with(OptionDecl::choice("module", &[("none", 0), ("commonjs", 1), ("umd", 3)]))
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let cat = catalog();
        assert!(cat.lookup("STRICTNULLCHECKS").is_some());
        assert!(cat.lookup("strictnullchecks").is_some());
        assert!(cat.lookup("nope").is_none());
        assert_eq!(cat.len(), 5);
    }

    #[test]
    fn test_parse_primitives() {
        let cat = catalog();
        let b = cat.lookup("strictNullChecks").unwrap();
        assert_eq!(b.parse_value("true").unwrap(), OptionValue::Bool(true));
        assert_eq!(b.parse_value("False").unwrap(), OptionValue::Bool(false));
        assert!(matches!(
            b.parse_value("yes"),
            Err(HarnessError::InvalidOptionValue { .. })
        ));

        let n = cat.lookup("maxNodeModuleJsDepth").unwrap();
        assert_eq!(n.parse_value("2").unwrap(), OptionValue::Number(2.0));
        assert!(n.parse_value("two").is_err());

        let s = cat.lookup("outDir").unwrap();
        assert_eq!(
            s.parse_value("dist").unwrap(),
            OptionValue::String("dist".to_string())
        );
    }

    #[test]
    fn test_parse_list() {
        let decl = catalog().lookup("types").cloned().unwrap();
        let value = decl.parse_value("node, jest,,mocha").unwrap();
        assert_eq!(
            value,
            OptionValue::List(vec![
                OptionValue::String("node".to_string()),
                OptionValue::String("jest".to_string()),
                OptionValue::String("mocha".to_string()),
            ])
        );
    }

    #[test]
    fn test_parse_choice() {
        let decl = catalog().lookup("module").cloned().unwrap();
        assert_eq!(
            decl.parse_value("UMD").unwrap(),
            OptionValue::Choice {
                name: "umd".to_string(),
                code: 3
            }
        );
        let err = decl.parse_value("amd").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'none', 'commonjs', 'umd'"));
    }

    #[test]
    fn test_option_set_accessors() {
        let mut set = OptionSet::new();
        set.set("Declaration", OptionValue::Bool(true));
        set.set("outDir", OptionValue::String("out".to_string()));
        assert!(set.flag("declaration"));
        assert!(!set.flag("noEmit"));
        assert_eq!(set.string("OUTDIR"), Some("out"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_harness_flags() {
        let mut flags = HarnessFlags::default();
        assert!(flags.apply("module", "umd").is_none());
        assert!(flags.apply("Regress", "true").unwrap().is_ok());
        assert!(flags.regress);
        assert!(flags.apply("regress", "maybe").unwrap().is_err());
        assert!(HarnessFlags::is_harness_option("REGRESS"));
    }
}
