use anyhow::Result;
use calsheet_core::config::AppConfig;
use calsheet_core::date_range::DateRange;
use calsheet_core::reconcile::ReconcilePull;

use super::{heading, open_stores};
use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: &AppConfig, range: DateRange) -> Result<()> {
    let (remote, mut sheet) = open_stores(config)?;
    let title = heading(remote, &sheet);

    let spinner = tui::spinner(&title);
    let result = ReconcilePull::new(&config.sync)
        .run(remote, &mut sheet, &range)
        .await;
    spinner.finish_and_clear();

    let report = result?;
    println!("{}", title);
    println!("{}", report.render());

    Ok(())
}
