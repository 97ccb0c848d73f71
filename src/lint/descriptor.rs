use std::fmt;

use crate::diagnostics::{DiagnosticCode, Severity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LintCategory {
    Usage,
}

impl LintCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Usage => "usage",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LintDescriptor {
    pub code: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: LintCategory,
    pub severity: Severity,
}

impl LintDescriptor {
    #[must_use]
    pub fn diagnostic_code(&self) -> DiagnosticCode {
        DiagnosticCode::new(self.code, Some(self.category.as_str().to_string()))
    }
}

impl fmt::Display for LintDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}, {}): {}",
            self.code,
            self.name,
            self.category.as_str(),
            self.severity.as_str(),
            self.description
        )
    }
}
