//! Trigger normalization: modifier synonyms/ordering and key-name synonyms
//!
//! A trigger is either a single keystroke (`"a"`, `"ctrl+a"`) or a dash-joined
//! sequence of keystrokes (`"a-b-c"`). Normalization happens once, at parse
//! time, so every later equality check and table lookup is a plain string
//! compare.

/// Split a trigger into its keystroke steps.
///
/// Steps are separated by `-`. A dash at the start of a step (or right after
/// a `+`) is the literal `-` key, not a separator, so `"ctrl+-"` and a lone
/// `"-"` are single steps and `"a---b"` is `["a", "-", "b"]`.
pub fn sequence_steps(trigger: &str) -> Vec<&str> {
    let bytes = trigger.as_bytes();
    let mut steps = Vec::new();
    let mut start = 0;
    for i in 0..bytes.len() {
        if bytes[i] == b'-' && i > start && bytes[i - 1] != b'+' {
            steps.push(&trigger[start..i]);
            start = i + 1;
        }
    }
    steps.push(&trigger[start..]);
    steps
}

/// Every non-empty proper prefix of a multi-step trigger, dash-joined.
///
/// Single-keystroke triggers have no proper prefixes and yield an empty list.
pub fn sequence_prefixes(trigger: &str) -> Vec<String> {
    let steps = sequence_steps(trigger);
    (1..steps.len()).map(|n| steps[..n].join("-")).collect()
}

/// Normalize a full trigger string: each keystroke step individually, then
/// re-joined with `-`.
pub fn normalize_trigger(raw: &str) -> String {
    let raw = raw.trim();
    sequence_steps(raw)
        .iter()
        .map(|step| normalize_keystroke(step))
        .collect::<Vec<_>>()
        .join("-")
}

/// Normalize one keystroke: canonical modifier names in a fixed order
/// (`ctrl+alt+shift+meta`), key-name synonyms collapsed, named keys
/// lowercased. Single-character keys keep their case (`A` and `a` are
/// distinct keystrokes).
pub fn normalize_keystroke(raw: &str) -> String {
    let (mods_part, key_part) = split_modifiers(raw);

    let mut ctrl = false;
    let mut alt = false;
    let mut shift = false;
    let mut meta = false;
    let mut unknown: Vec<String> = Vec::new();

    if let Some(mods) = mods_part {
        for token in mods.split('+') {
            match token.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "alt" | "opt" | "option" => alt = true,
                "shift" => shift = true,
                "meta" | "cmd" | "super" | "win" => meta = true,
                other => unknown.push(other.to_string()),
            }
        }
    }

    let mut out = String::new();
    if ctrl {
        out.push_str("ctrl+");
    }
    if alt {
        out.push_str("alt+");
    }
    if shift {
        out.push_str("shift+");
    }
    if meta {
        out.push_str("meta+");
    }
    for m in unknown {
        out.push_str(&m);
        out.push('+');
    }
    out.push_str(&normalize_key_name(key_part));
    out
}

/// Split a keystroke into its modifier prefix and the key itself.
///
/// The key is everything after the last `+` that is not the final character,
/// so `"ctrl++"` is the `+` key with ctrl held and a bare `"+"` is just the
/// `+` key.
fn split_modifiers(raw: &str) -> (Option<&str>, &str) {
    let bytes = raw.as_bytes();
    let mut split_at = None;
    for i in 0..bytes.len() {
        if bytes[i] == b'+' && i + 1 < bytes.len() {
            split_at = Some(i);
        }
    }
    match split_at {
        Some(i) => (Some(&raw[..i]), &raw[i + 1..]),
        None => (None, raw),
    }
}

/// Collapse named-key synonyms to one canonical spelling.
fn normalize_key_name(key: &str) -> String {
    if key.chars().count() <= 1 {
        return key.to_string();
    }

    let lower = key.to_ascii_lowercase();
    let canonical = match lower.as_str() {
        "enter" | "return" => "enter",
        "esc" | "escape" => "esc",
        "space" | "spacebar" => "space",
        "bs" | "backspace" => "bs",
        "del" | "delete" => "del",
        "ins" | "insert" => "ins",
        "pgup" | "pageup" | "page_up" => "pgup",
        "pgdwn" | "pgdown" | "pagedown" | "page_down" => "pgdwn",
        "sharp" => "#",
        other => other,
    };
    canonical.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_single_key() {
        assert_eq!(sequence_steps("a"), vec!["a"]);
        assert_eq!(sequence_steps("ctrl+a"), vec!["ctrl+a"]);
    }

    #[test]
    fn test_steps_sequence() {
        assert_eq!(sequence_steps("a-b-c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_steps_dash_key() {
        assert_eq!(sequence_steps("-"), vec!["-"]);
        assert_eq!(sequence_steps("ctrl+-"), vec!["ctrl+-"]);
        assert_eq!(sequence_steps("a---b"), vec!["a", "-", "b"]);
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(sequence_prefixes("a"), Vec::<String>::new());
        assert_eq!(sequence_prefixes("a-b-c"), vec!["a".to_string(), "a-b".to_string()]);
    }

    #[test]
    fn test_modifier_order_is_canonical() {
        assert_eq!(normalize_keystroke("shift+ctrl+a"), "ctrl+shift+a");
        assert_eq!(normalize_keystroke("meta+alt+x"), "alt+meta+x");
    }

    #[test]
    fn test_modifier_synonyms() {
        assert_eq!(normalize_keystroke("control+a"), "ctrl+a");
        assert_eq!(normalize_keystroke("option+a"), "alt+a");
        assert_eq!(normalize_keystroke("cmd+a"), "meta+a");
        assert_eq!(normalize_keystroke("Ctrl+a"), "ctrl+a");
    }

    #[test]
    fn test_char_case_is_preserved() {
        assert_eq!(normalize_keystroke("A"), "A");
        assert_eq!(normalize_keystroke("a"), "a");
        assert_ne!(normalize_trigger("A"), normalize_trigger("a"));
    }

    #[test]
    fn test_named_key_synonyms() {
        assert_eq!(normalize_keystroke("RETURN"), "enter");
        assert_eq!(normalize_keystroke("Escape"), "esc");
        assert_eq!(normalize_keystroke("PAGEUP"), "pgup");
        assert_eq!(normalize_keystroke("SPACE"), "space");
    }

    #[test]
    fn test_plus_key() {
        assert_eq!(normalize_keystroke("+"), "+");
        assert_eq!(normalize_keystroke("ctrl++"), "ctrl++");
    }

    #[test]
    fn test_normalize_full_sequence() {
        assert_eq!(normalize_trigger("Shift+Ctrl+a-RETURN"), "ctrl+shift+a-enter");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["a", "ctrl+shift+a", "a-b-c", "ctrl+a-esc", "-"] {
            let once = normalize_trigger(raw);
            assert_eq!(normalize_trigger(&once), once);
        }
    }
}
