use anyhow::Result;

use siqrd::runner::run_with_args;

fn main() -> Result<()> {
    run_with_args()?;
    Ok(())
}
