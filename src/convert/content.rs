//! Content lexing: rich-text cleanup and the splitting of node content
//! into interleaved text and code pieces.
//!
//! Conditional `if`/`elseif`/`else`/`endif` code pieces are captured as a
//! structured [`ConditionalBlock`] rather than tagged strings, so the
//! post-processing pass can materialize the branch sub-graph without
//! re-parsing anything.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"<pre[^>]*><code>").unwrap());
static CODE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"</code></pre>").unwrap());
static BLOCK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<p[^>]*>|</p>|<blockquote[^>]*>|</blockquote>|<span[^>]*>|</span>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[^>]+>").unwrap());
static SEQUENCE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[SEQUENCE:([^\]]*)\]").unwrap());

/// One lexed piece of node content, in authored order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPiece {
    Text(String),
    Code(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    If,
    ElseIf,
    Else,
}

/// One arm of an inline conditional block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalBranch {
    pub kind: BranchKind,
    /// Raw condition expression; empty for `else` arms.
    pub condition: String,
    /// Text rendered when this arm is taken.
    pub text: String,
    /// Statements executed when this arm is taken.
    pub inner_code: String,
}

/// A complete inline conditional: the arms in declaration order plus the
/// text that follows `endif`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalBlock {
    pub branches: Vec<ConditionalBranch>,
    pub post_text: String,
}

/// Result of lexing one node's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessedContent {
    pub dialogue_text: String,
    /// Code found outside any conditional section.
    pub user_script: String,
    pub conditional: Option<ConditionalBlock>,
}

/// Splits raw content into ordered text/code pieces. Text pieces are
/// rich-text cleaned; code pieces are passed through raw.
pub fn split_content(content: &str) -> Vec<ContentPiece> {
    let mut pieces = Vec::new();
    let mut rest = content;

    while let Some(open) = CODE_START.find(rest) {
        let text = touch_up_rich_text(&rest[..open.start()]);
        if !text.trim().is_empty() {
            pieces.push(ContentPiece::Text(text));
        }
        rest = &rest[open.end()..];

        if let Some(close) = CODE_END.find(rest) {
            pieces.push(ContentPiece::Code(rest[..close.start()].to_string()));
            rest = &rest[close.end()..];
        }
    }

    let tail = touch_up_rich_text(rest);
    if !tail.trim().is_empty() {
        pieces.push(ContentPiece::Text(tail));
    }
    pieces
}

/// Lexes node content into display text, loose code, and an optional
/// structured conditional block.
pub fn process_content(content: &str) -> ProcessedContent {
    if content.is_empty() {
        return ProcessedContent::default();
    }
    if !content.contains("<code>") {
        return ProcessedContent {
            dialogue_text: touch_up_rich_text(content),
            ..ProcessedContent::default()
        };
    }

    let mut result = ProcessedContent::default();
    let mut block = ConditionalBlock::default();
    let mut saw_if = false;
    let mut in_branch = false;

    for piece in split_content(content) {
        match piece {
            ContentPiece::Text(text) => {
                if in_branch {
                    if let Some(branch) = block.branches.last_mut() {
                        append_line(&mut branch.text, &text);
                    }
                } else if saw_if {
                    append_line(&mut block.post_text, &text);
                } else {
                    result.dialogue_text.push_str(&text);
                }
            }
            ContentPiece::Code(code) => {
                let trimmed = code.trim();
                if let Some(condition) = keyword_rest(trimmed, "if") {
                    saw_if = true;
                    in_branch = true;
                    block.branches.push(ConditionalBranch {
                        kind: BranchKind::If,
                        condition: condition.to_string(),
                        text: String::new(),
                        inner_code: String::new(),
                    });
                } else if let Some(condition) = keyword_rest(trimmed, "elseif") {
                    in_branch = true;
                    block.branches.push(ConditionalBranch {
                        kind: BranchKind::ElseIf,
                        condition: condition.to_string(),
                        text: String::new(),
                        inner_code: String::new(),
                    });
                } else if keyword_rest(trimmed, "else").is_some() {
                    in_branch = true;
                    block.branches.push(ConditionalBranch {
                        kind: BranchKind::Else,
                        condition: String::new(),
                        text: String::new(),
                        inner_code: String::new(),
                    });
                } else if keyword_rest(trimmed, "endif").is_some() {
                    in_branch = false;
                } else if in_branch {
                    if let Some(branch) = block.branches.last_mut() {
                        append_line(&mut branch.inner_code, trimmed);
                    }
                } else {
                    append_line(&mut result.user_script, trimmed);
                }
            }
        }
    }

    if saw_if {
        result.conditional = Some(block);
    }
    result
}

/// If `code` begins with `keyword` at a word boundary, returns the rest.
fn keyword_rest<'a>(code: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = code.strip_prefix(keyword)?;
    match rest.chars().next() {
        None => Some(""),
        Some(c) if c.is_whitespace() => Some(rest.trim_start()),
        _ => None,
    }
}

fn append_line(buffer: &mut String, addition: &str) {
    if addition.is_empty() {
        return;
    }
    if !buffer.is_empty() {
        buffer.push('\n');
    }
    buffer.push_str(addition);
}

/// Cleans authored rich text: paragraph breaks become newlines, emphasis
/// tags become the host's italic markup, everything else is stripped.
pub fn touch_up_rich_text(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let s = s.replace("<em>", "<i>").replace("</em>", "</i>");
    let s = BLOCK_TAG.replace_all(&s, |caps: &regex::Captures| {
        let tag = &caps[0];
        if tag.starts_with("<p") || tag.starts_with("</p") {
            "\n"
        } else {
            ""
        }
    });
    let s = ANY_TAG.replace_all(&s, |caps: &regex::Captures| {
        match &caps[0] {
            t @ ("<i>" | "</i>" | "<b>" | "</b>") => t.to_string(),
            _ => String::new(),
        }
    });
    decode_entities(s.trim())
}

/// Removes every tag, markup included. Used for code and titles where no
/// markup survives.
pub fn strip_tags(s: &str) -> String {
    decode_entities(ANY_TAG.replace_all(s, "").trim())
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

/// Extracts a `Speaker:<name>` directive from a node title.
pub fn speaker_directive(title: &str) -> Option<String> {
    if !title.contains("Speaker:") {
        return None;
    }
    let stripped = strip_tags(title);
    let name = stripped.split("Speaker:").nth(1)?.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Splits a connection label into display text and embedded `<code>` code.
/// A label carries either text or code, not both.
pub fn extract_label_code(label: &str) -> (String, String) {
    if !label.contains("<code>") {
        return (label.to_string(), String::new());
    }
    let Some(open) = label.find("<code>") else {
        return (label.to_string(), String::new());
    };
    let after = &label[open + "<code>".len()..];
    let code = match after.find("</code>") {
        Some(close) => &after[..close],
        None => after,
    };
    (String::new(), code.to_string())
}

/// Pulls a `[SEQUENCE:...]` directive out of dialogue text. Returns the
/// directive payload and the text with the directive removed.
pub fn extract_sequence(text: &str) -> Option<(String, String)> {
    let caps = SEQUENCE_TAG.captures(text)?;
    let full = caps.get(0)?;
    let sequence = caps[1].trim().to_string();
    let mut remaining = text.to_string();
    remaining.replace_range(full.range(), "");
    Some((sequence, remaining))
}
