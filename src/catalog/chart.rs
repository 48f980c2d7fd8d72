//! Text bar chart of datasets per category.

use std::collections::BTreeMap;

const BAR: char = '█';

/// One line per category: padded name, a bar scaled to `width` columns for
/// the largest category, then the count.
pub fn render_count_chart(counts: &BTreeMap<String, usize>, width: usize) -> String {
    let Some(max) = counts.values().copied().max() else {
        return String::new();
    };
    let label_width = counts.keys().map(|k| k.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (category, &count) in counts {
        let bar_len = if max == 0 {
            0
        } else {
            // Non-empty categories always get at least one cell.
            (count * width).div_ceil(max)
        };
        let bar: String = std::iter::repeat_n(BAR, bar_len).collect();
        out.push_str(&format!(
            "{category:<label_width$} {bar} {count}\n",
            label_width = label_width
        ));
    }
    out
}
