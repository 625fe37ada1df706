//! Post-processing of generator output before it reaches the caller.

/// Role echoes some models prepend to their answer.
const ROLE_PREFIXES: &[&str] = &["assistant:", "assistant :", "Answer:", "Réponse:"];

const BULLETS: &[&str] = &["- ", "• ", "* "];

/// Cleans a raw answer for display.
///
/// Leading role echoes are stripped, every line is trimmed, and a run of list
/// items (bullets or `N. ` numbering) gets a blank line before and after it.
/// Blank lines pass through and do not end a run.
pub fn format_response(raw: &str) -> String {
    let body = strip_role_prefixes(raw);

    let mut out: Vec<&str> = Vec::new();
    let mut in_list = false;
    for line in body.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            out.push("");
            continue;
        }
        if is_list_item(line) {
            if !in_list {
                out.push("");
            }
            in_list = true;
        } else {
            if in_list {
                out.push("");
            }
            in_list = false;
        }
        out.push(line);
    }
    out.join("\n")
}

fn strip_role_prefixes(raw: &str) -> &str {
    let mut body = raw.trim();
    while let Some(rest) = ROLE_PREFIXES.iter().find_map(|p| body.strip_prefix(p)) {
        body = rest.trim();
    }
    body
}

fn is_list_item(line: &str) -> bool {
    if BULLETS.iter().any(|b| line.starts_with(b)) {
        return true;
    }
    let starts_with_digit = line.chars().next().is_some_and(|c| c.is_ascii_digit());
    // "12. " within the first five characters
    let head: String = line.chars().take(5).collect();
    starts_with_digit && head.contains(". ")
}
