use std::{
    collections::BTreeMap,
    path::Path,
    sync::{PoisonError, RwLock},
};

use anyhow::Context;

use crate::{
    foundation::error::{WardrobeError, WardrobeResult},
    model::outfit::{Slot, SlotRect},
};

/// Slot name to rectangle table.
pub type SlotTable = BTreeMap<String, SlotRect>;

/// Owned, runtime-updatable slot placement configuration.
///
/// Shared between the compositor and the HTTP layer behind an `Arc`. Writers replace one
/// rectangle at a time under the lock, so readers never observe a partially updated entry.
#[derive(Debug)]
pub struct SlotLayout {
    table: RwLock<SlotTable>,
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl SlotLayout {
    /// Built-in placements for the 1024x1024 base bunny.
    pub fn with_defaults() -> Self {
        let table = [
            (Slot::Head, SlotRect::sized(312, 40, 400, 300)),
            (Slot::Face, SlotRect::sized(362, 260, 300, 200)),
            (Slot::UpperBody, SlotRect::sized(262, 440, 500, 320)),
            (Slot::LowerBody, SlotRect::sized(312, 700, 400, 220)),
            (Slot::Feet, SlotRect::sized(287, 880, 450, 140)),
            (Slot::Accessory, SlotRect::anchor(700, 420)),
        ]
        .into_iter()
        .map(|(slot, rect)| (slot.as_str().to_string(), rect))
        .collect();
        Self {
            table: RwLock::new(table),
        }
    }

    /// Build a layout from an explicit table, validating every entry.
    pub fn from_table(table: SlotTable) -> WardrobeResult<Self> {
        for (name, rect) in &table {
            validate_entry(name, rect)?;
        }
        Ok(Self {
            table: RwLock::new(table),
        })
    }

    /// Load a JSON object of `{ "<slot>": { "x", "y", "width"?, "height"? } }`.
    pub fn load_json(path: &Path) -> WardrobeResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read slot table '{}'", path.display()))?;
        let table: SlotTable = serde_json::from_slice(&bytes)?;
        Self::from_table(table)
    }

    /// Rectangle for `slot`, or `None` when the slot is not configured.
    pub fn get(&self, slot: &str) -> Option<SlotRect> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slot)
            .copied()
    }

    /// Full copy of the current table.
    pub fn snapshot(&self) -> SlotTable {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace one slot's rectangle.
    pub fn set(&self, slot: &str, rect: SlotRect) -> WardrobeResult<()> {
        validate_entry(slot, &rect)?;
        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot.to_string(), rect);
        tracing::debug!(slot, ?rect, "slot position updated");
        Ok(())
    }
}

fn validate_entry(name: &str, rect: &SlotRect) -> WardrobeResult<()> {
    if Slot::parse(name).is_none() {
        return Err(WardrobeError::validation(format!("unknown slot '{name}'")));
    }
    if rect.width == Some(0) || rect.height == Some(0) {
        return Err(WardrobeError::validation(format!(
            "slot '{name}' width/height must be non-zero"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/layout/slots.rs"]
mod tests;
