use std::path::Path;

use tale_core::SlotIndex;
use tale_session::SlotAdapter;

pub fn run(number: usize, saves: &Path, config: Option<&Path>) -> Result<(), String> {
    let config = super::load_config(config)?;
    let mut slots = SlotAdapter::new(super::open_saves(saves)?, &config);

    let slot = SlotIndex::from_number(number, slots.slot_count())
        .ok_or_else(|| format!("no slot {number} (slots are 1-{})", slots.slot_count()))?;
    if !slots.has_save(slot) {
        println!("  {slot} is already empty.");
        return Ok(());
    }

    slots.delete_save(slot);
    if slots.has_save(slot) {
        return Err(format!("could not delete {slot}"));
    }
    println!("  Deleted {slot}.");

    Ok(())
}
