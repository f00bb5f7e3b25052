//! Converts the source project's expression grammar into the target
//! scripting syntax used by the conversation runtime.
//!
//! The operator rewrites are token-level, not substring replacements: a
//! declared variable named `order` must survive the `or` rewrite, and `!=`
//! must not be torn apart by the `!` rewrite. String literals pass through
//! untouched.

use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;

/// Words that are part of the source grammar or its built-in function
/// library; never wrapped as variable references.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "if", "elseif", "else", "endif", "is", "not", "and", "or", "true", "false", "abs", "sqr",
    "sqrt", "random", "reset", "resetAll", "roll", "show", "visits",
];

static VISITS_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"visits\(([^)]*)\)").unwrap());
static INCREMENTOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+=|-=").unwrap());

/// Stateless expression converter configured with the declared variable
/// names of the current import.
#[derive(Debug, Clone)]
pub struct ScriptConverter {
    variables: AHashSet<String>,
    globals: AHashSet<String>,
    num_players: u32,
}

impl ScriptConverter {
    pub fn new<I, S>(variables: I, globals: I, num_players: u32) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
            globals: globals.into_iter().map(Into::into).collect(),
            num_players,
        }
    }

    /// Converts a boolean condition expression.
    pub fn convert_condition(&self, code: &str) -> String {
        self.convert(code, false)
    }

    /// Converts a statement script. Unlike conditions, statements may use
    /// `+=` / `-=` assignments, which the target syntax lacks.
    pub fn convert_script(&self, code: &str) -> String {
        self.convert(code, true)
    }

    fn convert(&self, code: &str, expand_incrementors: bool) -> String {
        if code.is_empty() {
            return String::new();
        }
        let code = crate::convert::content::strip_tags(code);
        let code = rewrite_visits(&code);
        let code = if expand_incrementors {
            expand_incrementor_assignments(&code)
        } else {
            code
        };
        self.rewrite_tokens(&code)
    }

    fn is_declared(&self, identifier: &str) -> bool {
        self.variables.contains(identifier)
    }

    fn variable_reference(&self, identifier: &str) -> String {
        let is_global = identifier.starts_with("global") || self.globals.contains(identifier);
        if self.num_players > 1 && !is_global {
            format!("Variable[Variable[\"ActorIndex\"] .. \"_{}\"]", identifier)
        } else {
            format!("Variable[\"{}\"]", identifier)
        }
    }

    /// Single boundary-aware pass over the code: operator swaps plus
    /// variable-reference wrapping.
    fn rewrite_tokens(&self, code: &str) -> String {
        let chars: Vec<char> = code.chars().collect();
        let mut out = String::with_capacity(code.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            // String literals pass through verbatim.
            if c == '"' || c == '\'' {
                let quote = c;
                out.push(c);
                i += 1;
                while i < chars.len() {
                    out.push(chars[i]);
                    if chars[i] == quote {
                        i += 1;
                        break;
                    }
                    i += 1;
                }
                continue;
            }

            if c.is_alphabetic() || c == '_' {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();

                // `is not` collapses to the inequality operator.
                if word == "is" {
                    let mut j = i;
                    while j < chars.len() && chars[j].is_whitespace() {
                        j += 1;
                    }
                    if chars[j..].starts_with(&['n', 'o', 't'])
                        && chars
                            .get(j + 3)
                            .is_none_or(|c| !(c.is_alphanumeric() || *c == '_'))
                    {
                        out.push_str("~=");
                        i = j + 3;
                        continue;
                    }
                }

                if RESERVED_KEYWORDS.contains(&word.as_str()) || !self.is_declared(&word) {
                    out.push_str(&word);
                } else {
                    out.push_str(&self.variable_reference(&word));
                }
                continue;
            }

            match c {
                '!' if chars.get(i + 1) == Some(&'=') => {
                    out.push_str("~=");
                    i += 2;
                }
                '!' => {
                    out.push_str("not ");
                    i += 1;
                }
                '&' if chars.get(i + 1) == Some(&'&') => {
                    out.push_str("and");
                    i += 2;
                }
                '|' if chars.get(i + 1) == Some(&'|') => {
                    out.push_str("or");
                    i += 2;
                }
                _ => {
                    out.push(c);
                    i += 1;
                }
            }
        }
        out
    }
}

/// Rewrites `visits(<span ... data-id="GUID" ...>...)` markup calls to
/// `visits("GUID")`, and bare `visits()` to `visits("")`.
fn rewrite_visits(code: &str) -> String {
    if !code.contains("visits(") {
        return code.to_string();
    }
    VISITS_CALL
        .replace_all(code, |caps: &regex::Captures| {
            let inner = caps[1].trim();
            if inner.is_empty() {
                "visits(\"\")".to_string()
            } else if let Some(guid) = extract_data_id(inner) {
                format!("visits(\"{}\")", guid)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn extract_data_id(markup: &str) -> Option<&str> {
    let rest = markup.split("data-id=\"").nth(1)?;
    rest.split('"').next()
}

/// Expands `x += y` / `x -= y` into `x = x + y` / `x = x - y`. The target
/// variable name is everything between the previous statement boundary
/// (newline or `;`) and the operator.
fn expand_incrementor_assignments(code: &str) -> String {
    let matches: Vec<(usize, char)> = INCREMENTOR
        .find_iter(code)
        .map(|m| (m.start(), code[m.start()..].chars().next().unwrap_or('+')))
        .collect();

    // Rewrite back-to-front so earlier match offsets stay valid.
    let mut code = code.to_string();
    for (start, op) in matches.into_iter().rev() {
        let left = code[..start].trim_end();
        let boundary = left
            .rfind(['\n', ';'])
            .map(|pos| pos + 1)
            .unwrap_or(0);
        let variable = code[boundary..start].trim().to_string();
        code.replace_range(start..start + 2, &format!("= {} {}", variable, op));
    }
    code
}
