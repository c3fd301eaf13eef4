// File: ./src/model/normalize.rs
// Title find/replace rules and location remapping.
use crate::config::ReplacementRule;

/// Known meeting-link fragments mapped to short labels, in priority order.
/// First match against location, then notes, wins.
const LOCATION_TABLE: &[(&str, &str)] = &[
    ("zoom.us", "Zoom"),
    ("teams.microsoft.com", "Teams"),
    ("Microsoft Teams", "Teams"),
];

/// Apply the ordered replacement rules to a title. Each rule replaces every
/// case-insensitive occurrence of its needle; later rules operate on the
/// output of earlier ones, so rules can chain. The result is trimmed.
pub fn apply_rules(title: &str, rules: &[ReplacementRule]) -> String {
    let mut out = title.to_string();
    for rule in rules.iter().filter(|r| r.enabled && !r.find.is_empty()) {
        out = replace_all_ci(&out, &rule.find, &rule.replace);
    }
    out.trim().to_string()
}

/// Short display form of an event's location. Meeting-link domains in the
/// location or notes collapse to a label; otherwise embedded line breaks
/// become single spaces and the result is trimmed.
pub fn location_display(location: &str, notes: &str) -> String {
    for (needle, label) in LOCATION_TABLE {
        if contains_ci(location, needle) || contains_ci(notes, needle) {
            return (*label).to_string();
        }
    }

    location
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Case-insensitive replace-all without regex. Matching runs over a
/// lowercase shadow of the text; a byte map back to the source keeps
/// splicing correct when lowercasing changes character lengths.
fn replace_all_ci(text: &str, find: &str, replace: &str) -> String {
    let needle = find.to_lowercase();

    let mut lowered = String::with_capacity(text.len());
    let mut source_index = Vec::with_capacity(text.len() + 1);
    for (src_idx, ch) in text.char_indices() {
        for low_ch in ch.to_lowercase() {
            let before = lowered.len();
            lowered.push(low_ch);
            for _ in before..lowered.len() {
                source_index.push(src_idx);
            }
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut lowered_pos = 0;
    let mut src_pos = 0;

    while let Some(found) = lowered[lowered_pos..].find(&needle) {
        let match_start = lowered_pos + found;
        let match_end = match_start + needle.len();

        let src_start = source_index[match_start];
        let src_end = if match_end >= lowered.len() {
            text.len()
        } else {
            source_index[match_end]
        };

        out.push_str(&text[src_pos..src_start]);
        out.push_str(replace);

        src_pos = src_end;
        lowered_pos = match_end;
    }

    out.push_str(&text[src_pos..]);
    out
}
