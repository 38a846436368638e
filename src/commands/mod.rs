pub mod pull;
pub mod push;

use anyhow::Result;
use calsheet_core::config::AppConfig;
use calsheet_core::remote::Remote;
use owo_colors::OwoColorize;

use crate::sheet::SheetFile;

/// Resolve both stores, failing before anything is read when either is unusable.
fn open_stores(config: &AppConfig) -> Result<(&Remote, SheetFile)> {
    let remote = config.remote()?;
    remote.ensure_available()?;
    let sheet = SheetFile::open(&config.sheet_path())?;
    Ok((remote, sheet))
}

fn heading(remote: &Remote, sheet: &SheetFile) -> String {
    format!(
        "{} {} {}",
        remote.provider.name().bold(),
        "<->".dimmed(),
        sheet.path().display()
    )
}
