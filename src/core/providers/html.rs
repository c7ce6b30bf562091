//! HTML to text helpers shared by the Google and webpage providers

use once_cell::sync::Lazy;
use regex::Regex;

static COMMENTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static NON_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<(script|style|noscript|template|svg|iframe|head)\b[^>]*>.*?</(script|style|noscript|template|svg|iframe|head)\s*>",
    )
    .unwrap()
});

static CHROME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(nav|footer|aside|form)\b[^>]*>.*?</(nav|footer|aside|form)\s*>").unwrap()
});

static BLOCK_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)</?(p|div|br|hr|h[1-6]|li|ul|ol|tr|table|section|article|header|blockquote|pre|dd|dt)\b[^>]*>",
    )
    .unwrap()
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[a-zA-Z]{2,8});").unwrap());

static INLINE_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\u{a0}\r\f\v]+").unwrap());

static ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<article\b[^>]*>(.*?)</article\s*>").unwrap());
static MAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<main\b[^>]*>(.*?)</main\s*>").unwrap());
static BODY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*)</body\s*>").unwrap());

/// Decode the named entities that matter for readable text plus all
/// numeric references
///
/// One pass over the input, so decoded text is never decoded again.
pub fn decode_entities(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let raw = &caps[1];
            let decoded = match raw.strip_prefix('#') {
                Some(num) => numeric_entity(num).map(String::from),
                None => named_entity(raw).map(str::to_string),
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn numeric_entity(num: &str) -> Option<char> {
    let code = match num.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => num.parse().ok()?,
    };
    Some(char::from_u32(code).unwrap_or('\u{fffd}'))
}

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "hellip" => "\u{2026}",
        _ => return None,
    })
}

/// Remove every tag and decode entities, collapsing whitespace into
/// single spaces
pub fn inline_text(fragment: &str) -> String {
    let stripped = TAG.replace_all(fragment, "");
    let decoded = decode_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pick the most content-like region of a document
fn content_region(html: &str) -> &str {
    for re in [&*ARTICLE, &*MAIN, &*BODY] {
        if let Some(m) = re.captures(html).and_then(|c| c.get(1)) {
            if !m.as_str().trim().is_empty() {
                return m.as_str();
            }
        }
    }
    html
}

/// Convert an HTML document into readable plain text
///
/// Scripts, styles and page chrome are dropped, block elements become
/// line breaks, and runs of blank lines collapse to one.
pub fn html_to_text(html: &str) -> String {
    let without_comments = COMMENTS.replace_all(html, "");
    let without_code = NON_CONTENT.replace_all(&without_comments, "");
    let region = content_region(&without_code);
    let without_chrome = CHROME.replace_all(region, "");
    let with_breaks = BLOCK_BREAK.replace_all(&without_chrome, "\n");
    let stripped = TAG.replace_all(&with_breaks, "");
    let decoded = decode_entities(&stripped);

    let mut out = String::with_capacity(decoded.len());
    let mut blank_run = true;
    for line in decoded.lines() {
        let line = INLINE_SPACE.replace_all(line, " ");
        let line = line.trim();
        if line.is_empty() {
            if !blank_run {
                out.push('\n');
                blank_run = true;
            }
            continue;
        }
        out.push_str(line);
        out.push('\n');
        blank_run = false;
    }

    out.trim().to_string()
}

/// Cut text at a character boundary
pub fn truncate_chars(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}
