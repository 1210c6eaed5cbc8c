use comfy_table::{Cell, CellAlignment, Table, modifiers, presets};
use serde_json::Value;

use crate::table::{PriceTable, cell_text};

/// Terminal preview of the first `limit` rows.
pub fn build_preview_table(table: &PriceTable, limit: usize) -> Table {
    let mut preview = Table::new();
    preview
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    preview.set_header(table.columns());
    for row in table.head(limit) {
        preview.add_row(row.iter().map(|value| {
            let cell = Cell::new(cell_text(value));
            if matches!(value, Value::Number(_)) {
                cell.set_alignment(CellAlignment::Right)
            } else {
                cell
            }
        }));
    }
    preview
}
