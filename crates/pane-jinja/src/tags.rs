//! Parse phase for `{% template %}` and `{% render %}`.
//!
//! MiniJinja has no custom tags, so documents go through an expansion pass
//! before MiniJinja compiles them. The pass rewrites
//!
//! ```text
//! {% template card %}<div>{{ title }}</div>{% endtemplate %}
//! ```
//!
//! into a filter block that re-registers the raw body when it renders and
//! emits nothing:
//!
//! ```text
//! {% filter pane_define_template("card") %}{% raw %}<div>{{ title }}</div>{% endraw %}{% endfilter %}
//! ```
//!
//! and rewrites `{% render "card", title: page.title %}` into a call of the
//! partial function:
//!
//! ```text
//! {{ pane_render_partial("card", {"title": (page.title)}, {}, none) }}
//! ```
//!
//! Definitions are also registered into the inline registry as soon as they
//! are parsed, so their raw text is available before any render runs.
//! Everything else in the document, including `{% raw %}` blocks and
//! comments, is copied through untouched.

use crate::error::{TemplateError, TemplateResult};
use crate::registry::InlineTemplateRegistry;
use pane_core::TemplateName;

/// Filter that receives a rendered definition body
pub(crate) const DEFINE_FILTER: &str = "pane_define_template";

/// Function that renders a partial in an isolated scope
pub(crate) const RENDER_FUNCTION: &str = "pane_render_partial";

/// A `{% template %}` block found while parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefinition {
    pub name: TemplateName,
    pub raw_body: String,
}

/// Result of the parse phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Document source with the extension tags rewritten for MiniJinja
    pub source: String,
    /// Definitions in document order
    pub definitions: Vec<TemplateDefinition>,
}

/// Run the parse phase over a document.
///
/// When `registry` is given, every definition's raw body is registered under
/// its name.
pub fn expand_document(
    source: &str,
    registry: Option<&InlineTemplateRegistry>,
) -> TemplateResult<ParsedDocument> {
    let mut out = String::with_capacity(source.len());
    let mut definitions = Vec::new();
    let mut copied = 0;
    let mut cursor = 0;

    while let Some(block) = next_block(source, cursor) {
        match block.tag_name() {
            "raw" => {
                cursor = match find_block(source, block.end, "endraw") {
                    Some(close) => close.end,
                    None => source.len(),
                };
            }
            "template" => {
                let name = parse_definition_name(block.arguments())?;
                let close = find_block(source, block.end, "endtemplate").ok_or_else(|| {
                    TemplateError::syntax(format!(
                        "template tag must have a single raw body: missing {{% endtemplate %}} for '{}'",
                        name
                    ))
                })?;
                let body = definition_body(source, &block, &close)?;

                if let Some(registry) = registry {
                    registry.register(name.as_str(), body);
                }

                out.push_str(&source[copied..block.start]);
                write_definition(&mut out, &block, &close, &name, body);
                definitions.push(TemplateDefinition {
                    name,
                    raw_body: body.to_string(),
                });
                copied = close.end;
                cursor = close.end;
            }
            "endtemplate" => {
                return Err(TemplateError::syntax(
                    "unexpected {% endtemplate %} without a matching {% template %}",
                ));
            }
            "render" => {
                let call = parse_render_call(block.arguments())?;
                out.push_str(&source[copied..block.start]);
                write_render_call(&mut out, &block, &call);
                copied = block.end;
                cursor = block.end;
            }
            _ => cursor = block.end,
        }
    }

    out.push_str(&source[copied..]);
    Ok(ParsedDocument {
        source: out,
        definitions,
    })
}

/// A `{% ... %}` block tag located in the source
#[derive(Debug, Clone, Copy)]
struct Block<'a> {
    start: usize,
    end: usize,
    /// `{%`, `{%-` or `{%+`
    open: &'a str,
    /// `%}`, `-%}` or `+%}`
    close: &'a str,
    markup: &'a str,
}

impl<'a> Block<'a> {
    fn tag_name(&self) -> &'a str {
        self.markup.split_whitespace().next().unwrap_or("")
    }

    fn arguments(&self) -> &'a str {
        let name = self.tag_name();
        self.markup[name.len()..].trim()
    }

    fn strips_after(&self) -> bool {
        self.close.starts_with('-')
    }

    fn strips_before(&self) -> bool {
        self.open.ends_with('-')
    }
}

fn is_whitespace_marker(c: char) -> bool {
    c == '-' || c == '+'
}

/// Find the next block tag at or after `from`, skipping `{# #}` comments and
/// `{{ }}` expressions. An unterminated tag or comment ends the scan;
/// MiniJinja reports it.
fn next_block(source: &str, from: usize) -> Option<Block<'_>> {
    let mut pos = from;
    loop {
        let offset = source[pos..].find('{')?;
        let start = pos + offset;
        match source.as_bytes().get(start + 1) {
            Some(b'#') => {
                let close = source[start + 2..].find("#}")?;
                pos = start + 2 + close + 2;
            }
            Some(b'{') => {
                pos = find_closing_delimiter(source, start + 2, b'}')? + 2;
            }
            Some(b'%') => {
                let close = find_closing_delimiter(source, start + 2, b'%')?;
                let inner = &source[start + 2..close];
                let open_len = if inner.starts_with(is_whitespace_marker) {
                    3
                } else {
                    2
                };
                let close_len =
                    if inner.len() > open_len - 2 && inner.ends_with(is_whitespace_marker) {
                        3
                    } else {
                        2
                    };
                let markup_end = close + 2 - close_len;
                let markup_start = (start + open_len).min(markup_end);
                return Some(Block {
                    start,
                    end: close + 2,
                    open: &source[start..start + open_len],
                    close: &source[markup_end..close + 2],
                    markup: source[markup_start..markup_end].trim(),
                });
            }
            _ => pos = start + 1,
        }
    }
}

/// Byte offset of the `delimiter` in the `<delimiter>}` pair that closes a
/// tag or expression, ignoring any inside string literals.
fn find_closing_delimiter(source: &str, from: usize, delimiter: u8) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => {
                if b == b'"' || b == b'\'' {
                    quote = Some(b);
                } else if b == delimiter && bytes.get(i + 1) == Some(&b'}') {
                    return Some(i);
                }
            }
        }
        i += 1;
    }
    None
}

fn find_block<'a>(source: &'a str, from: usize, tag: &str) -> Option<Block<'a>> {
    let mut cursor = from;
    while let Some(block) = next_block(source, cursor) {
        if block.tag_name() == tag {
            return Some(block);
        }
        cursor = block.end;
    }
    None
}

/// Extract and check the body between `{% template %}` and `{% endtemplate %}`.
///
/// Whitespace control on the inner side of either tag trims the body.
fn definition_body<'a>(
    source: &'a str,
    open: &Block<'a>,
    close: &Block<'a>,
) -> TemplateResult<&'a str> {
    let mut body = &source[open.end..close.start];
    if open.strips_after() {
        body = body.trim_start();
    }
    if close.strips_before() {
        body = body.trim_end();
    }

    let mut cursor = 0;
    while let Some(inner) = next_block(body, cursor) {
        if matches!(inner.tag_name(), "template" | "raw" | "endraw") {
            return Err(TemplateError::syntax(format!(
                "template tag must have a single raw body, found {{% {} %}} inside",
                inner.tag_name()
            )));
        }
        cursor = inner.end;
    }

    if body.is_empty() {
        return Err(TemplateError::syntax(
            "template tag must have a single raw body, found an empty body",
        ));
    }
    Ok(body)
}

fn write_definition(
    out: &mut String,
    open: &Block<'_>,
    close: &Block<'_>,
    name: &TemplateName,
    body: &str,
) {
    out.push_str(open.open);
    out.push_str(" filter ");
    out.push_str(DEFINE_FILTER);
    out.push('(');
    push_string_literal(out, name.as_str());
    out.push_str(") %}{% raw %}");
    out.push_str(body);
    out.push_str("{% endraw %}{% endfilter ");
    out.push_str(close.close);
}

/// Parse the name parameter of `{% template %}`.
///
/// The name may be a string literal, a number, or a bare variable reference
/// (whose text is used as the name). It must be a valid [`TemplateName`] and
/// nothing may follow it.
fn parse_definition_name(arguments: &str) -> TemplateResult<TemplateName> {
    let tokens = lex(arguments)?;
    let (name, consumed) = match tokens.first().map(|t| &t.kind) {
        Some(TokenKind::Str(s)) => (s.clone(), 1),
        Some(TokenKind::Number(n)) => (n.clone(), 1),
        Some(TokenKind::Ident(_)) => {
            let mut last = 0;
            while matches!(tokens.get(last + 1).map(|t| &t.kind), Some(TokenKind::Punct('.')))
                && matches!(tokens.get(last + 2).map(|t| &t.kind), Some(TokenKind::Ident(_)))
            {
                last += 2;
            }
            (
                arguments[tokens[0].start..tokens[last].end].to_string(),
                last + 1,
            )
        }
        Some(_) => {
            return Err(TemplateError::syntax(
                "template name must be a string, number, or variable",
            ))
        }
        None => return Err(TemplateError::syntax("template tag requires a name")),
    };

    let name = TemplateName::parse(name.as_str()).map_err(|_| {
        TemplateError::syntax(format!(
            "invalid template name '{}': only letters, digits, '_' and '/' are allowed",
            name
        ))
    })?;

    if let Some(extra) = tokens.get(consumed) {
        return Err(TemplateError::syntax(format!(
            "unexpected parameters after template name '{}': {}",
            name,
            &arguments[extra.start..]
        )));
    }
    Ok(name)
}

/// How an attribute binding on `{% render %}` applies its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindingMode {
    /// `with expr as alias`: bind the value once
    With,
    /// `for expr as alias`: render once per element
    For,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Binding {
    pub mode: BindingMode,
    pub expression: String,
    pub alias: String,
}

/// Parsed `{% render %}` markup. Expressions are kept as MiniJinja source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RenderCall {
    pub name: String,
    pub arguments: Vec<(String, String)>,
    pub binding: Option<Binding>,
}

pub(crate) fn parse_render_call(markup: &str) -> TemplateResult<RenderCall> {
    let tokens = lex(markup)?;
    let name = match tokens.first().map(|t| &t.kind) {
        Some(TokenKind::Str(s)) => s.clone(),
        _ => {
            return Err(TemplateError::syntax(
                "render tag requires a quoted template name",
            ))
        }
    };

    let mut idx = 1;
    let mut binding = None;
    if let Some(TokenKind::Ident(keyword)) = tokens.get(idx).map(|t| &t.kind) {
        let mode = match keyword.as_str() {
            "with" => Some(BindingMode::With),
            "for" => Some(BindingMode::For),
            _ => None,
        };
        if let Some(mode) = mode {
            let expr_start = idx + 1;
            let expr_end = expression_end(&tokens, expr_start, true);
            if expr_end == expr_start {
                return Err(TemplateError::syntax(format!(
                    "render tag expects an expression after '{}'",
                    keyword
                )));
            }
            let expression = token_source(markup, &tokens, expr_start, expr_end);
            idx = expr_end;

            let alias = if is_ident(&tokens, idx, "as") {
                match tokens.get(idx + 1).map(|t| &t.kind) {
                    Some(TokenKind::Ident(alias)) if is_identifier(alias) => {
                        idx += 2;
                        alias.clone()
                    }
                    _ => {
                        return Err(TemplateError::syntax(
                            "render tag expects an identifier after 'as'",
                        ))
                    }
                }
            } else {
                default_alias(&name)?
            };

            binding = Some(Binding {
                mode,
                expression,
                alias,
            });
        }
    }

    // The comma before the first argument is optional.
    let mut arguments = Vec::new();
    let mut first = true;
    while idx < tokens.len() {
        if tokens[idx].kind == TokenKind::Punct(',') {
            idx += 1;
            if idx == tokens.len() {
                break;
            }
        } else if !first {
            return Err(TemplateError::syntax(format!(
                "render tag expects ',' before '{}'",
                &markup[tokens[idx].start..]
            )));
        }
        first = false;

        let key = match (
            tokens.get(idx).map(|t| &t.kind),
            tokens.get(idx + 1).map(|t| &t.kind),
        ) {
            (Some(TokenKind::Ident(key)), Some(TokenKind::Punct(':'))) if is_identifier(key) => {
                key.clone()
            }
            _ => {
                return Err(TemplateError::syntax(format!(
                    "render tag arguments must look like 'key: value', found '{}'",
                    &markup[tokens[idx].start..]
                )))
            }
        };
        let expr_start = idx + 2;
        let expr_end = expression_end(&tokens, expr_start, false);
        if expr_end == expr_start {
            return Err(TemplateError::syntax(format!(
                "render tag argument '{}' has no value",
                key
            )));
        }
        arguments.push((key, token_source(markup, &tokens, expr_start, expr_end)));
        idx = expr_end;
    }

    Ok(RenderCall {
        name,
        arguments,
        binding,
    })
}

/// Index one past the last token of the expression starting at `start`.
/// Expressions end at a top-level `,`, or at a top-level `as` when
/// `stop_at_as` is set.
fn expression_end(tokens: &[Token], start: usize, stop_at_as: bool) -> usize {
    let mut depth = 0usize;
    let mut idx = start;
    while idx < tokens.len() {
        match &tokens[idx].kind {
            TokenKind::Punct('(' | '[' | '{') => depth += 1,
            TokenKind::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
            TokenKind::Punct(',') if depth == 0 => break,
            TokenKind::Ident(word) if depth == 0 && stop_at_as && word == "as" => break,
            _ => {}
        }
        idx += 1;
    }
    idx
}

fn token_source(markup: &str, tokens: &[Token], start: usize, end: usize) -> String {
    markup[tokens[start].start..tokens[end - 1].end].to_string()
}

fn is_ident(tokens: &[Token], idx: usize, word: &str) -> bool {
    matches!(tokens.get(idx).map(|t| &t.kind), Some(TokenKind::Ident(w)) if w == word)
}

/// `with` / `for` without `as` bind under the template's base name.
fn default_alias(name: &str) -> TemplateResult<String> {
    let base = name.rsplit('/').next().unwrap_or(name);
    if is_identifier(base) {
        Ok(base.to_string())
    } else {
        Err(TemplateError::syntax(format!(
            "cannot bind a value to '{}' by name; add 'as <name>'",
            name
        )))
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn write_render_call(out: &mut String, block: &Block<'_>, call: &RenderCall) {
    out.push_str(if block.strips_before() { "{{- " } else { "{{ " });
    out.push_str(RENDER_FUNCTION);
    out.push('(');
    push_string_literal(out, &call.name);

    out.push_str(", {");
    for (i, (key, expression)) in call.arguments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        push_string_literal(out, key);
        out.push_str(": (");
        out.push_str(expression);
        out.push(')');
    }
    out.push_str("}, {");
    if let Some(binding) = &call.binding {
        push_string_literal(out, &binding.alias);
        out.push_str(": (");
        out.push_str(&binding.expression);
        out.push(')');
    }
    out.push_str("}, ");
    match &call.binding {
        Some(binding) if binding.mode == BindingMode::For => {
            push_string_literal(out, &binding.alias)
        }
        _ => out.push_str("none"),
    }
    out.push_str(if block.strips_after() { ") -}}" } else { ") }}" });
}

fn push_string_literal(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Str(String),
    Number(String),
    /// Identifiers may contain inner `-`, as in `invalid-name`
    Ident(String),
    Punct(char),
}

/// A token of tag markup; `start..end` is its byte span in the markup
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

fn lex(markup: &str) -> TemplateResult<Vec<Token>> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut chars = markup.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let starts_number = c.is_ascii_digit()
            || (c == '-'
                && markup[start + 1..].starts_with(|d: char| d.is_ascii_digit())
                && !matches!(
                    tokens.last().map(|t| &t.kind),
                    Some(
                        TokenKind::Str(_)
                            | TokenKind::Number(_)
                            | TokenKind::Ident(_)
                            | TokenKind::Punct(')' | ']' | '}')
                    )
                ));

        let kind = if c == '"' || c == '\'' {
            chars.next();
            let mut value = String::new();
            let mut closed = false;
            while let Some((_, ch)) = chars.next() {
                if ch == '\\' {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                } else if ch == c {
                    closed = true;
                    break;
                } else {
                    value.push(ch);
                }
            }
            if !closed {
                return Err(TemplateError::syntax(format!(
                    "unterminated string literal in '{}'",
                    markup
                )));
            }
            TokenKind::Str(value)
        } else if starts_number {
            chars.next();
            let mut seen_dot = false;
            while let Some(&(i, ch)) = chars.peek() {
                let dot_then_digit = ch == '.'
                    && !seen_dot
                    && markup[i + 1..].starts_with(|d: char| d.is_ascii_digit());
                if ch.is_ascii_digit() || dot_then_digit {
                    seen_dot |= ch == '.';
                    chars.next();
                } else {
                    break;
                }
            }
            TokenKind::Number(markup[start..next_offset(&mut chars, markup)].to_string())
        } else if c.is_alphabetic() || c == '_' {
            chars.next();
            while let Some(&(i, ch)) = chars.peek() {
                let inner_dash = ch == '-'
                    && markup[i + 1..].starts_with(|d: char| d.is_alphanumeric() || d == '_');
                if ch.is_alphanumeric() || ch == '_' || inner_dash {
                    chars.next();
                } else {
                    break;
                }
            }
            TokenKind::Ident(markup[start..next_offset(&mut chars, markup)].to_string())
        } else {
            chars.next();
            TokenKind::Punct(c)
        };

        tokens.push(Token {
            kind,
            start,
            end: next_offset(&mut chars, markup),
        });
    }

    Ok(tokens)
}

fn next_offset(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    markup: &str,
) -> usize {
    chars.peek().map(|&(i, _)| i).unwrap_or(markup.len())
}

#[cfg(test)]
#[path = "tags_test.rs"]
mod tests;
