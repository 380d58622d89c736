//! One-shot command execution.

use super::args::Operation;
use super::menu::render_error;
use crate::session::SessionManager;
use anyhow::{Result, bail};
use std::io::Write;
use tracing::info;

/// Run a single operation and print its result to `out`
pub async fn execute<W: Write>(
    manager: &mut SessionManager,
    operation: &Operation,
    default_try_timeout: u32,
    out: &mut W,
) -> Result<()> {
    match operation {
        Operation::Path => {
            let path = report(manager.configuration_path().await, out)?;
            writeln!(out, "{}", path)?;
        }
        Operation::Get => {
            let document = report(manager.get_configuration().await, out)?;
            write!(out, "{}", document)?;
            if !document.ends_with('\n') {
                writeln!(out)?;
            }
        }
        Operation::Set {
            target,
            value,
            try_timeout,
            apply,
        } => {
            let staged = report(manager.set_configuration(target, value).await, out)?;
            writeln!(out, "Set {}={}: {}", target, value, verdict(staged))?;
            if !staged {
                bail!("service did not accept {}={}", target, value);
            }

            if let Some(timeout) = try_timeout {
                let confirmed = report(manager.try_configuration(*timeout).await, out)?;
                writeln!(out, "Try ({}s): {}", timeout, verdict(confirmed))?;
                if !confirmed {
                    bail!("configuration was not confirmed within {}s", timeout);
                }
            }

            if *apply {
                let applied = report(manager.apply_configuration().await, out)?;
                writeln!(out, "Apply: {}", verdict(applied))?;
                if !applied {
                    bail!("service did not apply the configuration");
                }
            }
        }
        Operation::Try { timeout } => {
            let timeout = timeout.unwrap_or(default_try_timeout);
            let confirmed = report(manager.try_configuration(timeout).await, out)?;
            writeln!(out, "Try ({}s): {}", timeout, verdict(confirmed))?;
        }
        Operation::Apply => {
            let applied = report(manager.apply_configuration().await, out)?;
            writeln!(out, "Apply: {}", verdict(applied))?;
        }
        Operation::Cancel => {
            let cancelled = report(manager.cancel_configuration().await, out)?;
            writeln!(out, "Cancel: {}", verdict(cancelled))?;
        }
    }

    info!("Completed {:?}", operation);
    Ok(())
}

fn verdict(ok: bool) -> &'static str {
    if ok { "succeeded" } else { "not confirmed" }
}

/// Print a failed outcome before handing it back as an error
fn report<T, W: Write>(outcome: Result<T, crate::session::NetplanError>, out: &mut W) -> Result<T> {
    match outcome {
        Ok(value) => Ok(value),
        Err(e) => {
            write!(out, "{}", render_error(&e))?;
            Err(e.into())
        }
    }
}
