//! The basis file format: a dimension header followed by one canonical
//! graph6 string per line.

use gch_core::{ErrorInfo, GchError};

/// Serialises a basis list. The header is the dimension.
pub fn format_basis(basis: &[String]) -> String {
    let mut out = String::with_capacity(8 + basis.iter().map(|s| s.len() + 1).sum::<usize>());
    out.push_str(&basis.len().to_string());
    out.push('\n');
    for g6 in basis {
        out.push_str(g6);
        out.push('\n');
    }
    out
}

/// Parses a basis file, checking the header against the line count.
pub fn parse_basis(text: &str) -> Result<Vec<String>, GchError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or_else(|| {
        GchError::Format(ErrorInfo::new("basis-parse", "missing dimension header"))
    })?;
    let dim: usize = header.trim().parse().map_err(|_| {
        GchError::Format(
            ErrorInfo::new("basis-parse", "dimension header is not an integer")
                .with_context("header", header),
        )
    })?;
    let basis: Vec<String> = lines.map(|l| l.to_string()).collect();
    if basis.len() != dim {
        return Err(GchError::Format(
            ErrorInfo::new("basis-parse", "dimension header disagrees with line count")
                .with_context("header", dim.to_string())
                .with_context("lines", basis.len().to_string()),
        ));
    }
    Ok(basis)
}

/// Reads only the dimension header of a basis file.
pub fn parse_basis_header(text: &str) -> Result<usize, GchError> {
    let header = text.lines().next().ok_or_else(|| {
        GchError::Format(ErrorInfo::new("basis-parse", "missing dimension header"))
    })?;
    header.trim().parse().map_err(|_| {
        GchError::Format(
            ErrorInfo::new("basis-parse", "dimension header is not an integer")
                .with_context("header", header),
        )
    })
}
