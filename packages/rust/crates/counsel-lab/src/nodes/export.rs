use std::path::PathBuf;

use anyhow::Context;
use counsel_lab::{LabConfig, export_log};

pub(crate) fn run_export_mode(output: Option<PathBuf>, config: &LabConfig) -> anyhow::Result<()> {
    let target = output.unwrap_or_else(|| config.export_path.clone());
    let rows = export_log(&config.log_path, &target).with_context(|| {
        format!(
            "failed to export {} to {}",
            config.log_path.display(),
            target.display()
        )
    })?;
    match rows {
        Some(rows) => println!("exported {rows} turn records to {}", target.display()),
        None => println!("no turn records in {}; nothing exported", config.log_path.display()),
    }
    Ok(())
}
