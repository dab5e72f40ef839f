//! Help text content for the help modal

pub fn get_about_help() -> Vec<String> {
    vec![
        "About Sheetwise",
        "",
        "Each exercise shows the formula a student would type, the cell it",
        "belongs in, how the answer is worked out, and whether the resolved",
        "workbook stores the same formula.",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

/// Get keybinding help text
pub fn get_help_text() -> Vec<String> {
    vec![
        "Navigation:",
        "  Tab / l      Next dataset",
        "  S-Tab / h    Previous dataset",
        "  1-4          Jump to dataset",
        "  j/k, arrows  Select exercise",
        "  PageUp/Down  Scroll the detail pane",
        "",
        "Exercise:",
        "  Enter/Space  Show or hide the steps",
        "  y            Copy the formula",
        "  d            Show the loaded table",
        "",
        "Other:",
        "  r            Reload from disk",
        "  ?            Toggle this help",
        "  q / Esc      Quit",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}
