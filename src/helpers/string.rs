//! String utilities for display text.
//!
//! Backend-provided text can contain HTML markup. It is reduced to plain text
//! here before any view sees it; markup is never passed through.

/// Turn a workflow identifier such as `carbon_audit` into `Carbon Audit`.
pub fn format_workflow_title(name: &str) -> String {
    name.split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Strip HTML tags and decode common entities.
///
/// Block-level closers and `<br>` become line breaks. The contents of
/// `<script>` and `<style>` elements are dropped entirely.
pub fn sanitize_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        // Only `<` followed by a letter, `/` or `!` opens a tag; `5 < 6` is text.
        if !after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!')
        {
            out.push('<');
            rest = after;
            continue;
        }
        let Some(end) = after.find('>') else {
            // Unterminated tag: treat the remainder as text.
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };

        let tag = after[..end].trim().to_ascii_lowercase();
        rest = &after[end + 1..];

        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default();

        if !tag.starts_with('/') && (name == "script" || name == "style") {
            let closer = format!("</{name}");
            match rest.to_ascii_lowercase().find(&closer) {
                Some(pos) => {
                    let tail = &rest[pos..];
                    rest = tail.find('>').map(|i| &tail[i + 1..]).unwrap_or("");
                }
                None => rest = "",
            }
            continue;
        }

        let is_break = name == "br"
            || (tag.starts_with('/')
                && matches!(
                    name,
                    "p" | "div" | "li" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
                ));
        if is_break && !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(rest);

    let decoded = decode_entities(&out);
    decoded
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn decode_entities(input: &str) -> String {
    const ENTITIES: &[(&str, &str)] = &[
        ("&nbsp;", " "),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&apos;", "'"),
        ("&deg;", "°"),
        // Must come last so `&amp;lt;` decodes to `&lt;` rather than `<`.
        ("&amp;", "&"),
    ];

    ENTITIES
        .iter()
        .fold(input.to_string(), |acc, (entity, text)| acc.replace(entity, text))
}
