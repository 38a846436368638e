use anyhow::Result;
use calsheet_core::config::AppConfig;
use calsheet_core::date_range::DateRange;
use calsheet_core::reconcile::ReconcilePush;

use super::{heading, open_stores};
use crate::prompt::TerminalPrompt;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: &AppConfig, range: DateRange, assume_yes: bool) -> Result<()> {
    let (remote, mut sheet) = open_stores(config)?;
    let title = heading(remote, &sheet);

    let spinner = tui::spinner(&title);
    let prompt = TerminalPrompt::new(assume_yes, spinner.clone());
    let result = ReconcilePush::new(&config.sync)
        .run(remote, &mut sheet, &prompt, &range)
        .await;
    spinner.finish_and_clear();

    let report = result?;
    println!("{}", title);
    println!("{}", report.render());

    Ok(())
}
