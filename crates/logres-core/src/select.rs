//! Operator-facing selection over the resolved update list.
//!
//! Lists and the prompt are written to an injected destination (the CLI
//! passes stderr) and the expression comes from an injected reader, so
//! stdout stays reserved for machine-readable output.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::catalog::UpdateRecord;

/// A rejected selection expression. The whole expression fails as a unit;
/// no partial selection is ever produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSelectionError {
    #[error("`{0}` is not an update number")]
    NotANumber(String),
    #[error("update number {given} is out of range 1..={count}")]
    OutOfRange { given: usize, count: usize },
}

/// Parses a selection expression into 1-based positions.
///
/// An empty expression or `all` (any case) selects every position. Anything
/// else is a comma-separated list of 1-based positions with optional
/// whitespace around each token. Duplicates are preserved on purpose: the
/// operator asked for the position twice, so it comes back twice.
pub fn parse_selection(expr: &str, count: usize) -> Result<Vec<usize>, InvalidSelectionError> {
    let expr = expr.trim();
    if expr.is_empty() || expr.eq_ignore_ascii_case("all") {
        return Ok((1..=count).collect());
    }

    let mut positions = Vec::new();
    for token in expr.split(',') {
        let token = token.trim();
        let n: usize = token
            .parse()
            .map_err(|_| InvalidSelectionError::NotANumber(token.to_string()))?;
        if n < 1 || n > count {
            return Err(InvalidSelectionError::OutOfRange { given: n, count });
        }
        positions.push(n);
    }
    Ok(positions)
}

/// Applies a selection expression to the resolved list.
pub fn select(
    records: &[UpdateRecord],
    expr: &str,
) -> Result<Vec<UpdateRecord>, InvalidSelectionError> {
    let positions = parse_selection(expr, records.len())?;
    Ok(positions
        .into_iter()
        .map(|n| records[n - 1].clone())
        .collect())
}

/// Bytes as decimal megabytes with one decimal, the vendor's display unit.
pub fn megabytes(size_bytes: u64) -> String {
    format!("{:.1}", size_bytes as f64 / 1_000_000.0)
}

/// Sum of advertised payload sizes.
pub fn total_size(records: &[UpdateRecord]) -> u64 {
    records.iter().map(|r| r.size_bytes).sum()
}

/// Writes the ordinal update list and its total size.
pub fn show_updates(records: &[UpdateRecord], out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\nUpdates list:")?;
    for (n, record) in records.iter().enumerate() {
        writeln!(
            out,
            "{:>4}. {} ({} MB)",
            n + 1,
            record.title,
            megabytes(record.size_bytes)
        )?;
    }
    writeln!(out, "Total size: {} MB", megabytes(total_size(records)))
}

/// Shows the list, asks for an expression, and re-asks until one parses.
///
/// The selected sublist is shown again before returning so the operator
/// sees exactly what was picked. End of input on `input` selects the
/// default, matching the `[all]` hint in the prompt.
pub fn prompt_selection<R: BufRead, W: Write>(
    records: &[UpdateRecord],
    input: &mut R,
    prompt: &mut W,
) -> io::Result<Vec<UpdateRecord>> {
    show_updates(records, prompt)?;
    loop {
        write!(
            prompt,
            "\nEnter the update numbers you wish to download, e.g. \"all\" or \"1,2,3\" [all]: "
        )?;
        prompt.flush()?;

        let mut line = String::new();
        let n = input.read_line(&mut line)?;
        let expr = if n == 0 { "" } else { line.trim() };
        match select(records, expr) {
            Ok(selected) => {
                show_updates(&selected, prompt)?;
                return Ok(selected);
            }
            Err(err) => {
                writeln!(prompt, "Invalid selection: {err}")?;
            }
        }
    }
}
