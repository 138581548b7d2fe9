use crate::types::Fulfillment;

const MAX_BAR: f64 = 40.0;

/// Renders one row per pack size with a bar proportional to the items that
/// size contributes to the shipment.
pub fn render_fulfillment(fulfillment: &Fulfillment) -> String {
    let total = fulfillment.total_items();
    if total == 0 {
        return String::new();
    }

    let size_width = fulfillment
        .iter()
        .map(|(size, _)| size.to_string().len())
        .max()
        .unwrap_or(1);
    let count_width = fulfillment
        .iter()
        .map(|(_, count)| count.to_string().len())
        .max()
        .unwrap_or(1);

    // Largest sizes first.
    let rows: Vec<(u64, u64)> = fulfillment.iter().collect();
    let mut result = String::new();
    for &(size, count) in rows.iter().rev() {
        let share = (size * count) as f64 / total as f64;
        let bar_len = ((share * MAX_BAR).round() as usize).max(1);
        let line = format!(
            "  {:>size_width$} x {:<count_width$}  {}",
            size,
            count,
            "#".repeat(bar_len),
        );
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}
