//! Field references and function calls rendered as query fragments

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConstructionError;

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

// Sorted, for binary search
const KEYWORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BEGIN", "BY", "CONTINUOUS", "CREATE",
    "DATABASE", "DATABASES", "DEFAULT", "DELETE", "DESC", "DESTINATIONS", "DIAGNOSTICS",
    "DISTINCT", "DROP", "DURATION", "END", "EVERY", "EXPLAIN", "FIELD", "FOR", "FROM",
    "GRANT", "GRANTS", "GROUP", "GROUPS", "IN", "INF", "INSERT", "INTO", "KEY", "KEYS",
    "KILL", "LIMIT", "MEASUREMENT", "MEASUREMENTS", "NAME", "OFFSET", "ON", "OR", "ORDER",
    "PASSWORD", "POLICIES", "POLICY", "PRIVILEGES", "QUERIES", "QUERY", "READ",
    "REPLICATION", "RESAMPLE", "RETENTION", "REVOKE", "SELECT", "SERIES", "SET", "SHARD",
    "SHARDS", "SHOW", "SLIMIT", "SOFFSET", "STATS", "SUBSCRIPTION", "SUBSCRIPTIONS", "TAG",
    "TO", "USER", "USERS", "VALUES", "WHERE", "WITH", "WRITE",
];

fn is_keyword(name: &str) -> bool {
    KEYWORDS
        .binary_search(&name.to_ascii_uppercase().as_str())
        .is_ok()
}

/// Render an identifier bare when possible, double-quoted otherwise.
///
/// Names with characters outside `[A-Za-z0-9_]`, a leading digit, or that
/// collide with a keyword are quoted.
pub fn quote_identifier(name: &str) -> String {
    if PLAIN_IDENTIFIER.is_match(name) && !is_keyword(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// A function argument: a raw field reference or a nested expression
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Field(String),
    Expression(Box<Expression>),
}

impl Argument {
    pub fn evaluate(&self) -> String {
        match self {
            // An empty reference selects everything
            Argument::Field(name) if name.is_empty() || name == "*" => "*".to_string(),
            Argument::Field(name) => quote_identifier(name),
            Argument::Expression(expr) => expr.evaluate(),
        }
    }
}

impl From<&str> for Argument {
    fn from(name: &str) -> Self {
        Argument::Field(name.to_string())
    }
}

impl From<String> for Argument {
    fn from(name: String) -> Self {
        Argument::Field(name)
    }
}

impl From<Expression> for Argument {
    fn from(expr: Expression) -> Self {
        Argument::Expression(Box::new(expr))
    }
}

/// How a function lays out its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum Flavor {
    /// `identifier(field)`
    Simple,
    /// `identifier(field1, ..., fieldN, n)`
    Parameterized(f64),
}

/// An immutable query fragment: a field reference or a function call, optionally aliased
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    identifier: Option<String>,
    flavor: Flavor,
    fields: Vec<Argument>,
    alias: Option<String>,
}

impl Expression {
    /// Plain field reference
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            identifier: None,
            flavor: Flavor::Simple,
            fields: vec![Argument::Field(name.into())],
            alias: None,
        }
    }

    /// Single-argument function such as `MEAN(value)`
    pub fn function(identifier: impl Into<String>, field: impl Into<Argument>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            flavor: Flavor::Simple,
            fields: vec![field.into()],
            alias: None,
        }
    }

    /// Windowed function such as `MOVING_AVERAGE(value, 3)`
    pub fn parameterized<A: Into<Argument>>(
        identifier: impl Into<String>,
        n: impl Into<f64>,
        fields: impl IntoIterator<Item = A>,
    ) -> Result<Self, ConstructionError> {
        let identifier = identifier.into();
        let n = n.into();
        if !n.is_finite() {
            return Err(ConstructionError::InvalidLiteral(n.to_string()));
        }
        let fields: Vec<Argument> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(ConstructionError::MissingField(identifier));
        }
        Ok(Self {
            identifier: Some(identifier),
            flavor: Flavor::Parameterized(n),
            fields,
            alias: None,
        })
    }

    /// Attach an `AS` label. Blank labels are rejected.
    pub fn alias(mut self, alias: impl Into<String>) -> Result<Self, ConstructionError> {
        let alias = alias.into();
        if alias.trim().is_empty() {
            return Err(ConstructionError::InvalidAlias(alias));
        }
        self.alias = Some(alias);
        Ok(self)
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn flavor(&self) -> &Flavor {
        &self.flavor
    }

    pub fn alias_name(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Render the fragment
    pub fn evaluate(&self) -> String {
        let fields = self
            .fields
            .iter()
            .map(Argument::evaluate)
            .collect::<Vec<_>>()
            .join(", ");

        let body = match (&self.identifier, &self.flavor) {
            (None, _) => fields,
            (Some(identifier), Flavor::Simple) => format!("{}({})", identifier, fields),
            (Some(identifier), Flavor::Parameterized(n)) => {
                format!("{}({}, {})", identifier, fields, n)
            }
        };

        match &self.alias {
            Some(alias) => format!("{} AS {}", body, quote_identifier(alias)),
            None => body,
        }
    }
}

impl From<&str> for Expression {
    fn from(name: &str) -> Self {
        Expression::field(name)
    }
}

impl From<String> for Expression {
    fn from(name: String) -> Self {
        Expression::field(name)
    }
}

impl std::fmt::Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.evaluate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_reference() {
        assert_eq!(Expression::field("value").evaluate(), "value");
        assert_eq!(Expression::field("").evaluate(), "*");
    }

    #[test]
    fn test_simple_function() {
        let expr = Expression::function("MEAN", "value");
        assert_eq!(expr.evaluate(), "MEAN(value)");
        assert!(!expr.evaluate().contains(" AS "));
    }

    #[test]
    fn test_nested_function() {
        let inner = Expression::function("MEAN", "value");
        let expr = Expression::function("MAX", inner);
        assert_eq!(expr.evaluate(), "MAX(MEAN(value))");
    }

    #[test]
    fn test_alias() {
        let expr = Expression::function("COUNT", "*").alias("total").unwrap();
        assert_eq!(expr.evaluate(), "COUNT(*) AS total");
        assert!(expr.evaluate().ends_with(" AS total"));

        let expr = Expression::field("value").alias("x").unwrap();
        assert!(expr.evaluate().ends_with(" AS x"));
    }

    #[test]
    fn test_alias_is_quoted_when_needed() {
        let expr = Expression::function("MEAN", "value").alias("avg value").unwrap();
        assert_eq!(expr.evaluate(), "MEAN(value) AS \"avg value\"");
    }

    #[test]
    fn test_blank_alias_rejected() {
        let err = Expression::function("MEAN", "value").alias("  ").unwrap_err();
        assert_eq!(err, ConstructionError::InvalidAlias("  ".to_string()));
    }

    #[test]
    fn test_parameterized_function() {
        let expr = Expression::parameterized("MOVING_AVERAGE", 3, ["value"]).unwrap();
        assert_eq!(expr.evaluate(), "MOVING_AVERAGE(value, 3)");

        let expr = Expression::parameterized("TOP", 5, ["value", "host"])
            .unwrap()
            .alias("best")
            .unwrap();
        assert_eq!(expr.evaluate(), "TOP(value, host, 5) AS best");

        let expr = Expression::parameterized("PERCENTILE", 99.5, ["latency"]).unwrap();
        assert_eq!(expr.evaluate(), "PERCENTILE(latency, 99.5)");
    }

    #[test]
    fn test_field_references_are_quoted_when_needed() {
        assert_eq!(Expression::field("*").evaluate(), "*");
        assert_eq!(Expression::field("used-bytes").evaluate(), "\"used-bytes\"");
        assert_eq!(Expression::function("MEAN", "host name").evaluate(), "MEAN(\"host name\")");
        assert_eq!(Expression::function("COUNT", "*").evaluate(), "COUNT(*)");
    }

    #[test]
    fn test_keywords_are_quoted() {
        assert_eq!(quote_identifier("select"), "\"select\"");
        assert_eq!(quote_identifier("From"), "\"From\"");
        assert_eq!(quote_identifier("group"), "\"group\"");
        assert_eq!(quote_identifier("time"), "time");
        assert_eq!(quote_identifier("9lives"), "\"9lives\"");
        assert!(KEYWORDS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_non_finite_parameter_rejected() {
        let err = Expression::parameterized("TOP", f64::NAN, ["value"]).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidLiteral(_)));
    }

    #[test]
    fn test_parameterized_requires_field() {
        let fields: [&str; 0] = [];
        let err = Expression::parameterized("TOP", 3, fields).unwrap_err();
        assert_eq!(err, ConstructionError::MissingField("TOP".to_string()));
    }
}
