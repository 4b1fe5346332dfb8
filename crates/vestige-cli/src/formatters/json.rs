//! JSON output: one pretty-printed document per run.

use anyhow::Result;
use serde::Serialize;

pub fn print<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
