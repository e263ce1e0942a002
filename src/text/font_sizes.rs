//! Font-size markup simplification.
//!
//! Run conversion can mark every font size change with `<fs:N>`. Most of
//! those changes are typesetting noise (a single enlarged letter, a bracket
//! set in another size). This module keeps only the changes that delimit
//! whole syllables or phrases.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_FONT_SIZE: Regex = Regex::new(r"<fs:(\d+)>").unwrap();
    static ref RE_BLANK_LINES: Regex = Regex::new(r"\n\n+").unwrap();
}

const TSHEG: char = '་';
const SHAD: char = '།';
const OPEN_BRACKET: &str = "༼";
const CLOSE_BRACKET: char = '༽';

type Segment = (Option<String>, String);

/// Split text into `(size, content)` segments, dropping empty content.
fn segments(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut size: Option<String> = None;
    let mut last = 0;

    for caps in RE_FONT_SIZE.captures_iter(text) {
        let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let content = &text[last..whole.start()];
        if !content.is_empty() {
            out.push((size.clone(), content.to_string()));
        }
        size = Some(value.as_str().to_string());
        last = whole.end();
    }
    if last < text.len() {
        out.push((size, text[last..].to_string()));
    }
    out
}

fn has_separator(content: &str) -> bool {
    content.contains(TSHEG) || content.contains(SHAD) || content.ends_with(CLOSE_BRACKET)
}

/// Reduce `<fs:N>` markup to meaningful size changes.
///
/// - a standalone `༼` takes the size of the segment after it;
/// - a segment starting with `༽` joins the previous segment;
/// - a segment without tsheg or shad joins the previous segment;
/// - consecutive segments of equal size are merged.
///
/// Text without markup is returned unchanged.
pub fn simplify_font_sizes(text: &str) -> String {
    let mut segments = segments(text);
    if segments.is_empty() {
        return text.to_string();
    }

    // brackets
    let mut bracketed: Vec<Segment> = Vec::with_capacity(segments.len());
    for i in 0..segments.len() {
        if segments[i].1.is_empty() {
            continue;
        }
        if segments[i].1 == OPEN_BRACKET && i + 1 < segments.len() {
            let (next_size, next_content) = std::mem::take(&mut segments[i + 1]);
            bracketed.push((next_size, format!("{}{}", OPEN_BRACKET, next_content)));
        } else if segments[i].1.starts_with(CLOSE_BRACKET) && !bracketed.is_empty() {
            if let Some(prev) = bracketed.last_mut() {
                prev.1.push_str(&segments[i].1);
            }
        } else {
            bracketed.push(std::mem::take(&mut segments[i]));
        }
    }

    // segments without syllable separators
    let mut merged: Vec<Segment> = Vec::with_capacity(bracketed.len());
    for (size, content) in bracketed.into_iter().filter(|(_, c)| !c.is_empty()) {
        if !has_separator(&content) {
            if let Some(prev) = merged.last_mut() {
                prev.1.push_str(&content);
                continue;
            }
            if content.trim().is_empty() {
                merged.push((None, content));
                continue;
            }
        }
        merged.push((size, content));
    }

    // equal neighbours
    let mut collapsed: Vec<Segment> = Vec::with_capacity(merged.len());
    for (size, content) in merged {
        if let Some(prev) = collapsed.last_mut() {
            if prev.0 == size {
                prev.1.push_str(&content);
                continue;
            }
        }
        collapsed.push((size, content));
    }

    let mut out = String::with_capacity(text.len());
    for (size, content) in collapsed {
        if let Some(size) = size {
            out.push_str("<fs:");
            out.push_str(&size);
            out.push('>');
        }
        out.push_str(&content);
    }
    out
}

/// Replace every run of two or more newlines by a single newline.
pub fn collapse_blank_lines(text: &str) -> String {
    RE_BLANK_LINES.replace_all(text, "\n").into_owned()
}
