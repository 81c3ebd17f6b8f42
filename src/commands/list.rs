//! The `list` command: show registered templates in render order.

use anyhow::Result;

use crate::templates;

/// Print each template's name and target path, one per line.
///
/// # Errors
///
/// Infallible today; the `Result` keeps the command signature uniform.
#[allow(clippy::print_stdout)]
pub fn run() -> Result<()> {
    for template in templates::registry() {
        println!("{:<12} {}", template.name(), template.target());
    }
    Ok(())
}
