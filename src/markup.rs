//! Naive HTML-fragment reading for the two work-grid widgets.
//!
//! The page serves stable, machine-generated markup, so a tag-slicing
//! reader is enough; no DOM is built. The same snapshots are produced from
//! live outer-HTML in production and from fixture strings in tests, so the
//! extraction logic never needs a browser.

/// Editable widget found inside a cell. A cell with no widget at all is how
/// the grid marks a day that belongs to the adjacent month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    pub value: Option<String>,
    pub aria_checked: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    /// Tag-stripped, whitespace-normalized text of the whole cell.
    pub text: String,
    /// Text of each `<span>` inside the cell, in document order.
    pub spans: Vec<String>,
    pub input: Option<InputState>,
    /// Text of the first `<label>` inside the cell, if any.
    pub label: Option<String>,
}

/// The attendance widget: plain `tr`/`td` rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
}

/// The project-hours widget: `thead` header rows (`th`) plus one `tbody`
/// data row (`td`) per project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoursTable {
    pub head: Vec<Vec<Cell>>,
    pub body: Vec<Vec<Cell>>,
}

pub fn parse_attendance(html: &str) -> Table {
    Table {
        rows: blocks(html, "tr")
            .iter()
            .map(|row| cells(row, "td"))
            .collect(),
    }
}

pub fn parse_hours(html: &str) -> HoursTable {
    let head = slice_inside(html, "thead").unwrap_or("");
    let body = slice_inside(html, "tbody").unwrap_or("");
    HoursTable {
        head: blocks(head, "tr")
            .iter()
            .map(|row| cells(row, "th"))
            .collect(),
        body: blocks(body, "tr")
            .iter()
            .map(|row| cells(row, "td"))
            .collect(),
    }
}

fn cells(row: &str, tag: &str) -> Vec<Cell> {
    blocks(row, tag).iter().map(|cell| parse_cell(cell)).collect()
}

fn parse_cell(inner: &str) -> Cell {
    Cell {
        text: normalize_text(&strip_tags(inner)),
        spans: blocks(inner, "span")
            .iter()
            .map(|span| normalize_text(&strip_tags(span)))
            .collect(),
        input: first_opening_tag(inner, "input").map(|tag| InputState {
            value: attribute_value(tag, "value"),
            aria_checked: attribute_value(tag, "aria-checked"),
        }),
        label: blocks(inner, "label")
            .first()
            .map(|label| normalize_text(&strip_tags(label))),
    }
}

/// Inner slices of every `<tag ...>...</tag>` block, ASCII-case-insensitive.
fn blocks<'a>(html: &'a str, tag: &str) -> Vec<&'a str> {
    let close = format!("</{tag}>");
    let mut out = Vec::new();
    let mut at = 0;
    while let Some(start) = find_opening_tag(html, tag, at) {
        let Some(open_end) = html[start..].find('>') else {
            break;
        };
        let inner_start = start + open_end + 1;
        let Some(close_at) = find_ci(html, &close, inner_start) else {
            break;
        };
        out.push(&html[inner_start..close_at]);
        at = close_at + close.len();
    }
    out
}

/// Inner slice of the first `<tag ...>...</tag>` block.
fn slice_inside<'a>(html: &'a str, tag: &str) -> Option<&'a str> {
    blocks(html, tag).first().copied()
}

/// The first `<tag ...` opening tag (up to its `>`), for void elements.
fn first_opening_tag<'a>(html: &'a str, tag: &str) -> Option<&'a str> {
    let start = find_opening_tag(html, tag, 0)?;
    let end = html[start..].find('>')?;
    Some(&html[start..start + end])
}

fn find_opening_tag(html: &str, tag: &str, from: usize) -> Option<usize> {
    let needle = format!("<{tag}");
    let mut at = from;
    while let Some(pos) = find_ci(html, &needle, at) {
        // "<tr" must not match "<track>"
        match html.as_bytes().get(pos + needle.len()).copied() {
            Some(b'>') | Some(b'/') | None => return Some(pos),
            Some(byte) if byte.is_ascii_whitespace() => return Some(pos),
            _ => at = pos + 1,
        }
    }
    None
}

fn find_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    let haystack_bytes = haystack.as_bytes();
    let needle_bytes = needle.as_bytes();
    if needle_bytes.is_empty() || haystack_bytes.len() < needle_bytes.len() {
        return None;
    }
    (from..=haystack_bytes.len() - needle_bytes.len()).find(|&i| {
        haystack_bytes[i..i + needle_bytes.len()]
            .iter()
            .zip(needle_bytes)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    })
}

/// Value of `name="..."` (or `name='...'`/unquoted) inside one opening tag.
fn attribute_value(tag: &str, name: &str) -> Option<String> {
    let pattern = format!("{name}=");
    let mut at = 0;
    while let Some(pos) = find_ci(tag, &pattern, at) {
        let boundary_ok = tag[..pos]
            .bytes()
            .next_back()
            .is_some_and(|byte| byte.is_ascii_whitespace());
        if !boundary_ok {
            at = pos + pattern.len();
            continue;
        }
        let value_start = pos + pattern.len();
        let rest = &tag[value_start..];
        return Some(match rest.bytes().next() {
            Some(quote @ (b'"' | b'\'')) => {
                let rest = &rest[1..];
                let end = rest.find(quote as char).unwrap_or(rest.len());
                decode_entities(&rest[..end])
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                decode_entities(&rest[..end])
            }
        });
    }
    None
}

/// Remove all `<...>` tags.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Decode the few entities the grid emits, then collapse whitespace
/// (including no-break spaces) and trim.
fn normalize_text(text: &str) -> String {
    let decoded = decode_entities(text);
    let mut out = String::with_capacity(decoded.len());
    let mut previous_space = false;
    for c in decoded.chars() {
        if c.is_whitespace() || c == '\u{a0}' {
            if !previous_space {
                out.push(' ');
                previous_space = true;
            }
        } else {
            out.push(c);
            previous_space = false;
        }
    }
    out.trim().to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", "\u{a0}")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
#[path = "markup_tests.rs"]
mod tests;
