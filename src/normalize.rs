/// Strips markup from free-text fields served by the diary backend.
///
/// Tag removal is intentionally dumb: a `<` opens a tag, the next `>` closes
/// it, everything between (inclusive) is dropped. Unmatched `<` or `>` and
/// the degenerate `<>` pair are left in place. The backend also emits
/// `&nbsp;` entities, which become plain spaces before trimming.
pub fn strip_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find('<') {
        let (before, tail) = rest.split_at(open);
        out.push_str(before);
        match tail[1..].find('>') {
            // `<>` carries no tag name; keep both characters.
            Some(0) => {
                out.push('<');
                rest = &tail[1..];
            }
            Some(close) => {
                rest = &tail[close + 2..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out.replace("&nbsp;", " ").trim().to_string()
}
