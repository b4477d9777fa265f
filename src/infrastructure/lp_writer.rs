// CPLEX LP text export of a Program.
// The output is deterministic: columns and rows appear in program order and
// names are sanitized the same way on every call.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{ConstraintType, Program, VariableType};

/// Lines are wrapped once they reach this many characters
const MAX_LINE_LEN: usize = 255;

/// Punctuation the LP format accepts inside names
const NAME_PUNCTUATION: &str = "!\"#$%&()/,.;?@_`'{}|~";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} name '{name}' collides with another {kind} after sanitizing")]
    NameCollision { kind: &'static str, name: String },

    #[error("Row '{0}' has no terms and the program has no column to write it with")]
    EmptyRow(String),
}

/// Renders `program` in CPLEX LP format
pub fn to_lp_string(program: &Program) -> Result<String, ExportError> {
    let columns = unique_names(
        "column",
        program.variables.iter().map(|v| sanitize(&v.name)),
    )?;
    let rows = unique_names(
        "row",
        program.constraints.iter().enumerate().map(|(i, c)| {
            if c.name.is_empty() {
                format!("c{}", i)
            } else {
                sanitize(&c.name)
            }
        }),
    )?;

    let mut out = String::new();
    if !program.name.is_empty() {
        let _ = writeln!(out, "\\ Problem name: {}", program.name);
    }

    out.push_str("Minimize\n");
    let mut line = Line::new(" obj:");
    let mut wrote_term = false;
    for (index, &coeff) in program.objective.coefficients.iter().enumerate() {
        if coeff != 0.0 {
            line.push(&mut out, &term(coeff, &columns[index], !wrote_term));
            wrote_term = true;
        }
    }
    if !wrote_term {
        if let Some(first) = columns.first() {
            line.push(&mut out, &format!("0 {}", first));
        }
    }
    line.finish(&mut out);

    out.push_str("Subject To\n");
    for (constraint, name) in program.constraints.iter().zip(&rows) {
        let mut line = Line::new(&format!(" {}:", name));
        let mut first = true;
        for &(column, coeff) in &constraint.terms {
            if coeff != 0.0 {
                line.push(&mut out, &term(coeff, &columns[column], first));
                first = false;
            }
        }
        if first {
            // LP rows need at least one term
            match columns.first() {
                Some(column) => line.push(&mut out, &format!("0 {}", column)),
                None => return Err(ExportError::EmptyRow(name.clone())),
            }
        }
        let sense = match constraint.constraint_type {
            ConstraintType::LessThanOrEqual => "<=",
            ConstraintType::GreaterThanOrEqual => ">=",
        };
        line.push(&mut out, &format!("{} {}", sense, constraint.bound));
        line.finish(&mut out);
    }

    let bounds: Vec<String> = program
        .variables
        .iter()
        .zip(&columns)
        .filter(|(var, _)| var.variable_type == VariableType::Continuous)
        .filter_map(|(var, name)| bound_line(var.lower_bound, var.upper_bound, name))
        .collect();
    if !bounds.is_empty() {
        out.push_str("Bounds\n");
        for bound in bounds {
            let _ = writeln!(out, " {}", bound);
        }
    }

    let binaries: Vec<&str> = program
        .variables
        .iter()
        .zip(&columns)
        .filter(|(var, _)| var.variable_type == VariableType::Binary)
        .map(|(_, name)| name.as_str())
        .collect();
    if !binaries.is_empty() {
        out.push_str("Binaries\n");
        let mut line = Line::new(" ");
        for name in binaries {
            line.push(&mut out, name);
        }
        line.finish(&mut out);
    }

    out.push_str("End\n");

    debug!(
        program = %program.name,
        bytes = out.len(),
        "Rendered program as LP text"
    );
    Ok(out)
}

/// Writes `program` in CPLEX LP format to `path`
pub fn write_lp_file(program: &Program, path: impl AsRef<Path>) -> Result<(), ExportError> {
    let path = path.as_ref();
    let text = to_lp_string(program)?;
    std::fs::write(path, text)?;
    info!(
        program = %program.name,
        path = %path.display(),
        variables = program.num_variables(),
        constraints = program.num_constraints(),
        "Wrote LP file"
    );
    Ok(())
}

/// Maps a name onto the LP character set
pub fn sanitize(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || NAME_PUNCTUATION.contains(c) {
                c
            } else {
                '_'
            }
        })
        .collect();
    let first = out.chars().next();
    match first {
        None => out.push('_'),
        Some(c) if c.is_ascii_digit() || c == '.' => out.insert(0, '_'),
        Some(_) => {}
    }
    out
}

fn unique_names(
    kind: &'static str,
    names: impl Iterator<Item = String>,
) -> Result<Vec<String>, ExportError> {
    let mut seen = BTreeSet::new();
    names
        .map(|name| {
            if seen.insert(name.clone()) {
                Ok(name)
            } else {
                Err(ExportError::NameCollision { kind, name })
            }
        })
        .collect()
}

fn term(coeff: f64, name: &str, first: bool) -> String {
    match (first, coeff < 0.0) {
        (true, false) => format!("{} {}", coeff, name),
        (true, true) => format!("- {} {}", -coeff, name),
        (false, false) => format!("+ {} {}", coeff, name),
        (false, true) => format!("- {} {}", -coeff, name),
    }
}

fn bound_line(lower: f64, upper: Option<f64>, name: &str) -> Option<String> {
    let upper = upper.filter(|u| u.is_finite());
    match (lower, upper) {
        (l, None) if l == 0.0 => None,
        (l, None) if l == f64::NEG_INFINITY => Some(format!("{} free", name)),
        (l, None) => Some(format!("{} >= {}", name, l)),
        (l, Some(u)) if l == f64::NEG_INFINITY => Some(format!("-inf <= {} <= {}", name, u)),
        (l, Some(u)) => Some(format!("{} <= {} <= {}", l, name, u)),
    }
}

/// Accumulates space-separated tokens, breaking before `MAX_LINE_LEN`
struct Line {
    current: String,
}

impl Line {
    fn new(head: &str) -> Self {
        Self {
            current: head.to_string(),
        }
    }

    fn push(&mut self, out: &mut String, token: &str) {
        if !self.current.trim().is_empty() && self.current.len() + 1 + token.len() > MAX_LINE_LEN {
            out.push_str(&self.current);
            out.push('\n');
            self.current = "   ".to_string();
        }
        if !self.current.ends_with(' ') {
            self.current.push(' ');
        }
        self.current.push_str(token);
    }

    fn finish(self, out: &mut String) {
        out.push_str(&self.current);
        out.push('\n');
    }
}
