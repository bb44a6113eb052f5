//! Grammar sources embedded in Markdown.
//!
//! Only the contents of fenced code blocks are grammar text. Everything
//! else, fence lines and info strings included, is replaced by spaces so
//! that line and column numbers in diagnostics still point into the
//! Markdown file.

use once_cell::sync::Lazy;
use regex::Regex;

static FENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})(.*)").unwrap());

/// A fence line: its character, its length and whether an info string
/// follows it.
struct Fence {
    ch: char,
    len: usize,
    bare: bool,
}

fn fence(line: &str) -> Option<Fence> {
    let caps = FENCE_RE.captures(line)?;
    let marker = caps.get(1)?.as_str();
    Some(Fence {
        ch: marker.chars().next()?,
        len: marker.len(),
        bare: caps.get(2).is_none_or(|m| m.as_str().trim().is_empty()),
    })
}

fn blank(line: &str, out: &mut String) {
    out.extend(
        line.chars()
            .map(|c| if c.is_whitespace() { c } else { ' ' }),
    );
}

/// Returns `source` with everything outside fenced code blocks blanked.
///
/// A block is closed by a bare fence of the same character that is at
/// least as long as the opening one. An unclosed block runs to the end of
/// input.
pub fn extract(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut open: Option<Fence> = None;
    for line in source.split_inclusive('\n') {
        match (open.as_ref().map(|o| (o.ch, o.len)), fence(line)) {
            (None, Some(f)) => {
                open = Some(f);
                blank(line, &mut out);
            }
            (Some((ch, len)), Some(f)) if f.bare && f.ch == ch && f.len >= len => {
                open = None;
                blank(line, &mut out);
            }
            (Some(_), _) => out.push_str(line),
            (None, None) => blank(line, &mut out),
        }
    }
    out
}

/// Returns `true` if `path` names a Markdown file.
pub fn is_markdown(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_code_and_positions() {
        let md = "# Title\nSome `text`.\n```gllex\nS : 'a' ;\n```\nmore\n";
        let out = extract(md);
        assert_eq!(out.len(), md.len());
        assert_eq!(out.lines().count(), md.lines().count());
        assert_eq!(out.lines().nth(3), Some("S : 'a' ;"));
        assert!(out.lines().enumerate().all(|(i, l)| i == 3 || l.trim().is_empty()));
    }

    #[test]
    fn closing_fence_must_match() {
        let md = "~~~~\nA : 'a' ;\n```\nB : 'b' ;\n~~~~~\ntail\n";
        let out = extract(md);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[1], "A : 'a' ;");
        assert_eq!(lines[2], "```");
        assert_eq!(lines[3], "B : 'b' ;");
        assert!(lines[4].trim().is_empty());
        assert!(lines[5].trim().is_empty());
    }

    #[test]
    fn grammar_positions_survive() {
        let md = "Intro text\n\n```\nS : 'a' | # ;\n```\n";
        let err = crate::grammar::parse_source(&extract(md)).unwrap_err();
        assert_eq!(err.diagnostics()[0].position, gllex::Position::new(4, 11));
        assert!(is_markdown(std::path::Path::new("g/Grammar.MD")));
        assert!(!is_markdown(std::path::Path::new("g/grammar.gllex")));
    }
}
