use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use tale_session::SlotAdapter;

pub fn run(saves: &Path, config: Option<&Path>) -> Result<(), String> {
    let config = super::load_config(config)?;
    let slots = SlotAdapter::new(super::open_saves(saves)?, &config);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Slot", "State", "Saved at", "Active"]);

    let summaries = slots.summaries();
    for summary in &summaries {
        let state = match (summary.occupied, summary.legacy) {
            (false, _) => "empty",
            (true, false) => "saved",
            (true, true) => "saved (legacy)",
        };
        let saved_at = summary
            .saved_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "—".to_string());
        let active = if summary.active { "*" } else { "" };

        table.add_row(vec![
            summary.slot.to_string(),
            state.to_string(),
            saved_at,
            active.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {} of {} slots in use",
        summaries.iter().filter(|s| s.occupied).count(),
        summaries.len()
    );

    Ok(())
}
