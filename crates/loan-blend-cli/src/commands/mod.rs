pub mod amortization;
pub mod blending;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::input;

/// Load a typed input from `--input`, falling back to piped stdin.
pub(crate) fn load_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        debug!(path, "reading input file");
        return Ok(Some(input::file::read_input(path)?));
    }
    let piped = input::stdin::read_stdin()?;
    if piped.is_some() {
        debug!("read input from stdin");
    }
    Ok(piped)
}
