//! Text rendering utilities for human-friendly error messages.
//!
//! Validation errors name components by their Rust type names, which are
//! long and fully qualified. These helpers turn them into something a
//! reader can scan.

/// Renders an ordered dependency path, closing it back on its first element.
///
/// # Examples
/// ```
/// use weld_support::rendering::render_cycle;
///
/// let cycle = vec!["Car", "Engine"];
/// assert_eq!(render_cycle(&cycle), "Car → Engine → Car");
/// ```
pub fn render_cycle(path: &[impl AsRef<str>]) -> String {
    match path.first() {
        None => String::new(),
        Some(first) => {
            let mut parts: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
            parts.push(first.as_ref());
            parts.join(" → ")
        }
    }
}

/// Renders names as a brace-delimited set, in the order given.
///
/// ```
/// use weld_support::rendering::render_set;
///
/// assert_eq!(render_set(&["A", "B"]), "{A, B}");
/// ```
pub fn render_set(names: &[impl AsRef<str>]) -> String {
    let joined = names.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ");
    format!("{{{joined}}}")
}

/// Strips module paths from every path segment of a type name.
///
/// ```
/// use weld_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("garage::engines::V8Engine"), "V8Engine");
/// assert_eq!(
///     shorten_type_name("alloc::sync::Arc<dyn garage::Engine>"),
///     "Arc<dyn Engine>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut out = String::with_capacity(full_name.len());
    let mut rest = full_name;

    while let Some(idx) = rest.find(['<', '>', ',', ' ', '(', ')', '[', ']', ';', '&']) {
        let (segment, tail) = rest.split_at(idx);
        out.push_str(last_path_segment(segment));
        // delimiters are all single-byte
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }

    out.push_str(last_path_segment(rest));
    out
}

fn last_path_segment(segment: &str) -> &str {
    segment.rsplit("::").next().unwrap_or(segment)
}

/// Picks registered names that look like `requested`.
///
/// Matches on substring containment of the short names first, then on a
/// shared prefix of at least three characters. At most `limit` names are
/// returned, best match first.
pub fn suggest_similar(requested: &str, available: &[&str], limit: usize) -> Vec<String> {
    let wanted = shorten_type_name(requested).to_lowercase();

    let mut scored: Vec<(usize, &str)> = available
        .iter()
        .filter_map(|&candidate| {
            let short = shorten_type_name(candidate).to_lowercase();
            if short == wanted {
                return Some((200, candidate));
            }
            if short.contains(&wanted) || wanted.contains(&short) {
                return Some((100, candidate));
            }

            let prefix = short
                .chars()
                .zip(wanted.chars())
                .take_while(|(a, b)| a == b)
                .count();
            (prefix >= 3).then_some((prefix * 10, candidate))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));
    scored
        .into_iter()
        .take(limit)
        .map(|(_, name)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_closes_on_first_element() {
        assert_eq!(render_cycle(&["A", "B", "C"]), "A → B → C → A");
    }

    #[test]
    fn self_cycle() {
        assert_eq!(render_cycle(&["A"]), "A → A");
    }

    #[test]
    fn empty_cycle_renders_nothing() {
        let path: Vec<String> = vec![];
        assert_eq!(render_cycle(&path), "");
    }

    #[test]
    fn set_rendering() {
        assert_eq!(render_set(&["Car"]), "{Car}");
        let empty: [&str; 0] = [];
        assert_eq!(render_set(&empty), "{}");
    }

    #[test]
    fn shorten_plain_path() {
        assert_eq!(shorten_type_name("a::b::CarImpl"), "CarImpl");
        assert_eq!(shorten_type_name("u32"), "u32");
    }

    #[test]
    fn shorten_nested_generics() {
        assert_eq!(
            shorten_type_name("core::option::Option<alloc::sync::Arc<dyn x::Engine>>"),
            "Option<Arc<dyn Engine>>"
        );
        assert_eq!(
            shorten_type_name("std::collections::HashMap<a::K, b::V>"),
            "HashMap<K, V>"
        );
    }

    #[test]
    fn suggests_close_names() {
        let available = ["garage::V8Engine", "garage::Car", "garage::Wheel"];
        let found = suggest_similar("other::V8Engin", &available, 3);
        assert_eq!(found.first().map(String::as_str), Some("garage::V8Engine"));
    }

    #[test]
    fn suggestions_respect_limit() {
        let available = ["m::Engine", "m::EngineV6", "m::EngineV8"];
        assert_eq!(suggest_similar("Engine", &available, 2).len(), 2);
    }

    #[test]
    fn no_suggestion_for_unrelated_names() {
        let available = ["m::Database"];
        assert!(suggest_similar("Wheel", &available, 3).is_empty());
    }
}
