use crate::violation::{Violation, ViolationBuilder};
use std::fmt;

/// Ordered violations collected from one or more rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleResult {
    violations: Vec<Violation>,
}

impl RuleResult {
    #[must_use]
    pub fn new(violations: impl IntoIterator<Item = Violation>) -> Self {
        Self {
            violations: violations.into_iter().collect(),
        }
    }

    /// Fresh copy of the contained violations.
    pub fn violations(&self) -> Vec<Violation> {
        self.violations.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// New result with `violation` appended; `self` is unchanged.
    #[must_use]
    pub fn add_violation(&self, violation: Violation) -> Self {
        let mut violations = Vec::with_capacity(self.violations.len() + 1);
        violations.extend_from_slice(&self.violations);
        violations.push(violation);
        Self { violations }
    }

    /// Concatenation of both results. An empty side is the identity.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut violations = Vec::with_capacity(self.violations.len() + other.violations.len());
        violations.extend_from_slice(&self.violations);
        violations.extend_from_slice(&other.violations);
        Self { violations }
    }

    pub fn has_blocking(&self) -> bool {
        self.violations.iter().any(Violation::is_blocking)
    }
}

/// Accumulates violations into a [`RuleResult`].
///
/// ```compile_fail
/// use colonycore_pluginapi::RuleResultBuilder;
///
/// let builder = RuleResultBuilder::new();
/// let _first = builder.build();
/// let _second = builder.build();
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct RuleResultBuilder {
    violations: Vec<Violation>,
}

impl RuleResultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_violation(mut self, violation: Violation) -> Self {
        self.violations.push(violation);
        self
    }

    pub fn add_violations(mut self, violations: impl IntoIterator<Item = Violation>) -> Self {
        self.violations.extend(violations);
        self
    }

    /// Builds `builder` and appends the violation.
    ///
    /// # Panics
    ///
    /// Panics when `builder` is missing a required field; passing an
    /// incomplete builder here is a programming error.
    pub fn from_builder(self, builder: ViolationBuilder) -> Self {
        match builder.build() {
            Ok(violation) => self.add_violation(violation),
            Err(err) => panic!("invalid violation builder: {err}"),
        }
    }

    pub fn merge_result(mut self, result: &RuleResult) -> Self {
        self.violations.extend_from_slice(&result.violations);
        self
    }

    pub fn build(self) -> RuleResult {
        RuleResult {
            violations: self.violations,
        }
    }
}

/// Returned when the aggregate result of a transaction contains a blocking
/// violation. Carries every violation, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolationError {
    pub result: RuleResult,
}

impl RuleViolationError {
    #[must_use]
    pub const fn new(result: RuleResult) -> Self {
        Self { result }
    }
}

impl fmt::Display for RuleViolationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("transaction blocked by rules")?;
        for (i, violation) in self.result.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for RuleViolationError {}
