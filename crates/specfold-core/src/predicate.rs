//! Relational predicates: an operator paired with a version.

use std::cmp::Ordering;
use std::fmt;

use crate::version::VersionScheme;

/// One of the six supported relational operators.
///
/// Variants are declared in the byte order of their symbols, so the derived
/// `Ord` sorts predicates the same way their rendered text sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Op {
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `==`
    Eq,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Op {
    pub const ALL: [Op; 6] = [Op::Ne, Op::Lt, Op::Le, Op::Eq, Op::Gt, Op::Ge];

    pub fn as_str(self) -> &'static str {
        match self {
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Eq => "==",
            Op::Gt => ">",
            Op::Ge => ">=",
        }
    }

    /// Split a leading operator off `text`, returning the operator and the rest.
    ///
    /// Two-character operators are tried before `<` and `>`.
    pub fn strip_prefix(text: &str) -> Option<(Op, &str)> {
        const LONGEST_FIRST: [Op; 6] = [Op::Eq, Op::Ne, Op::Ge, Op::Le, Op::Gt, Op::Lt];
        LONGEST_FIRST
            .iter()
            .find_map(|op| text.strip_prefix(op.as_str()).map(|rest| (*op, rest)))
    }

    /// `>=` or `>`.
    pub fn is_lower_bound(self) -> bool {
        matches!(self, Op::Ge | Op::Gt)
    }

    /// `<=` or `<`.
    pub fn is_upper_bound(self) -> bool {
        matches!(self, Op::Le | Op::Lt)
    }

    /// Whether the operator admits the version it names.
    pub fn is_inclusive(self) -> bool {
        matches!(self, Op::Eq | Op::Ge | Op::Le)
    }

    /// Whether a version ordered `ord` relative to the predicate's version satisfies it.
    pub fn accepts(self, ord: Ordering) -> bool {
        match self {
            Op::Ne => ord != Ordering::Equal,
            Op::Lt => ord == Ordering::Less,
            Op::Le => ord != Ordering::Greater,
            Op::Eq => ord == Ordering::Equal,
            Op::Gt => ord == Ordering::Greater,
            Op::Ge => ord != Ordering::Less,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single relational constraint such as `>=1.3`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Predicate<V> {
    pub op: Op,
    pub version: V,
}

impl<V: VersionScheme> Predicate<V> {
    pub fn new(op: Op, version: V) -> Self {
        Self { op, version }
    }

    /// Parse `<op><version>`, e.g. `>=1.3` or `!= 2.0`.
    pub fn parse(text: &str) -> Result<Self, String> {
        let text = text.trim();
        let (op, rest) = Op::strip_prefix(text)
            .ok_or_else(|| format!("unrecognized operator in `{text}`"))?;
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(format!("missing version after `{op}`"));
        }
        let version =
            V::parse_version(rest).ok_or_else(|| format!("invalid version `{rest}`"))?;
        Ok(Self { op, version })
    }

    /// Whether `version` satisfies this predicate.
    pub fn matches(&self, version: &V) -> bool {
        self.op.accepts(version.cmp(&self.version))
    }
}

impl<V: fmt::Display> fmt::Display for Predicate<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}
