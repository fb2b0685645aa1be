//! Argument-shape checks for bridge entry points.

use crate::error::{Result, RuntimeError};
use serde_json::Value;

/// Take the first `N` arguments as strings.
///
/// Extra trailing arguments are ignored.
pub(crate) fn string_args<const N: usize>(args: &[Value]) -> Result<[&str; N]> {
    if args.len() < N {
        return Err(RuntimeError::invalid_argument(format!(
            "Wrong number of arguments, expected {}",
            N
        )));
    }

    let mut out = [""; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg
            .as_str()
            .ok_or_else(|| RuntimeError::invalid_argument("Wrong arguments"))?;
    }
    Ok(out)
}
