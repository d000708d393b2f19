//! Reading a list-valued keyword argument of the `setup(...)` call.

use std::ops::Range;

use serde::Serialize;
use tree_sitter::Node;

use crate::error::{Error, Result};
use crate::locate::SetupCall;

/// The state of one keyword argument.
#[derive(Debug, Clone)]
pub enum ArgumentValue {
    /// A list or tuple of plain string literals.
    Literal(ArgumentList),
    /// Anything pysync cannot edit safely: a name, a call, a comprehension,
    /// an f-string element and so on.
    NonLiteral { span: Range<usize> },
    /// The keyword is not passed at all.
    Absent,
}

impl ArgumentValue {
    /// The literal list, `None` when absent; non-literal values are an error.
    pub fn into_literal(self, keyword: &str) -> Result<Option<ArgumentList>> {
        match self {
            Self::Literal(list) => Ok(Some(list)),
            Self::Absent => Ok(None),
            Self::NonLiteral { .. } => Err(Error::NotALiteralList {
                keyword: keyword.to_string(),
            }),
        }
    }

    /// Like [`into_literal`](Self::into_literal), but absence is an error too.
    pub fn require_literal(self, keyword: &str) -> Result<ArgumentList> {
        self.into_literal(keyword)?
            .ok_or_else(|| Error::ArgumentAbsent {
                keyword: keyword.to_string(),
            })
    }
}

/// Bracket kind of the literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Delimiter {
    List,
    Tuple,
}

impl Delimiter {
    pub fn open(self) -> char {
        match self {
            Self::List => '[',
            Self::Tuple => '(',
        }
    }

    pub fn close(self) -> char {
        match self {
            Self::List => ']',
            Self::Tuple => ')',
        }
    }
}

/// One string element of the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListElement {
    /// Decoded string value.
    pub value: String,
    /// Literal as written, including prefix and quotes.
    pub raw: String,
    pub span: Range<usize>,
    /// Full-line comments directly above the element.
    pub leading_comments: Vec<String>,
    /// Comment after the element on the same line.
    pub trailing_comment: Option<String>,
}

/// Rendering style of a list literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListStyle {
    pub quote: char,
    pub multiline: bool,
    /// Indentation of each element line (multi-line only).
    pub item_indent: String,
    /// Indentation of the closing bracket line (multi-line only).
    pub closing_indent: String,
    pub trailing_comma: bool,
    /// Line break written between lines, `"\n"` or `"\r\n"`.
    pub newline: &'static str,
}

impl ListStyle {
    /// One element per line, double quotes, trailing comma, indented four
    /// spaces past `keyword_indent`.
    pub fn default_for(keyword_indent: &str) -> Self {
        Self {
            quote: '"',
            multiline: true,
            item_indent: format!("{keyword_indent}    "),
            closing_indent: keyword_indent.to_string(),
            trailing_comma: true,
            newline: "\n",
        }
    }

    pub fn with_newline(mut self, newline: &'static str) -> Self {
        self.newline = newline;
        self
    }
}

/// A literal list or tuple argument.
#[derive(Debug, Clone, Serialize)]
pub struct ArgumentList {
    pub keyword: String,
    pub elements: Vec<ListElement>,
    /// Span of the whole list literal, brackets included.
    pub span: Range<usize>,
    pub delimiter: Delimiter,
    pub style: ListStyle,
    /// Comments between the last element and the closing bracket.
    pub tail_comments: Vec<String>,
}

impl ArgumentList {
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Extract the keyword argument `keyword` from the call.
pub fn extract(call: &SetupCall<'_>, keyword: &str) -> ArgumentValue {
    let Some(argument) = call.keyword(keyword) else {
        return ArgumentValue::Absent;
    };
    let source = call.source();
    let value = argument.value;

    let delimiter = match value.kind() {
        "list" => Delimiter::List,
        "tuple" => Delimiter::Tuple,
        _ => {
            return ArgumentValue::NonLiteral {
                span: value.byte_range(),
            };
        }
    };

    let mut elements: Vec<ListElement> = Vec::new();
    let mut pending_comments = Vec::new();
    let mut cursor = value.walk();
    for child in value.named_children(&mut cursor) {
        match child.kind() {
            "string" => {
                let raw = &source[child.byte_range()];
                let Some(decoded) = decode_string(raw) else {
                    return ArgumentValue::NonLiteral {
                        span: value.byte_range(),
                    };
                };
                elements.push(ListElement {
                    value: decoded,
                    raw: raw.to_string(),
                    span: child.byte_range(),
                    leading_comments: std::mem::take(&mut pending_comments),
                    trailing_comment: None,
                });
            }
            "comment" => {
                let text = source[child.byte_range()].trim_end().to_string();
                match elements.last_mut() {
                    Some(last)
                        if pending_comments.is_empty()
                            && last.trailing_comment.is_none()
                            && same_row(source, last.span.end, child.start_byte()) =>
                    {
                        last.trailing_comment = Some(text);
                    }
                    _ => pending_comments.push(text),
                }
            }
            _ => {
                return ArgumentValue::NonLiteral {
                    span: value.byte_range(),
                };
            }
        }
    }

    let style = infer_style(source, argument.node, value, &elements);
    ArgumentValue::Literal(ArgumentList {
        keyword: keyword.to_string(),
        elements,
        span: value.byte_range(),
        delimiter,
        style,
        tail_comments: pending_comments,
    })
}

fn infer_style(source: &str, keyword: Node<'_>, list: Node<'_>, elements: &[ListElement]) -> ListStyle {
    let keyword_indent = line_indent(source, keyword.start_byte());
    let newline = line_ending(source, keyword.start_byte());
    let Some(first) = elements.first() else {
        return ListStyle::default_for(&keyword_indent).with_newline(newline);
    };

    let text = &source[list.byte_range()];
    let quote = quote_char(&first.raw).unwrap_or('"');
    let multiline = text.contains('\n');

    let after_last = elements.last().map_or(first.span.end, |last| last.span.end);
    let trailing_comma = source[after_last..list.end_byte()]
        .trim_start()
        .starts_with(',');

    if !multiline {
        return ListStyle {
            quote,
            multiline,
            item_indent: String::new(),
            closing_indent: String::new(),
            trailing_comma,
            newline,
        };
    }

    let item_indent = if starts_line(source, first.span.start) {
        line_indent(source, first.span.start)
    } else {
        format!("{keyword_indent}    ")
    };
    let close = list.end_byte().saturating_sub(1);
    let closing_indent = if starts_line(source, close) {
        line_indent(source, close)
    } else {
        keyword_indent
    };

    ListStyle {
        quote,
        multiline,
        item_indent,
        closing_indent,
        trailing_comma: true,
        newline,
    }
}

/// Line ending of the line holding `offset`, or of the first line when that
/// line is the last one.
pub(crate) fn line_ending(source: &str, offset: usize) -> &'static str {
    let end = source[offset..]
        .find('\n')
        .map(|i| offset + i)
        .or_else(|| source.find('\n'));
    match end {
        Some(i) if source[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Leading whitespace of the line holding `offset`.
pub(crate) fn line_indent(source: &str, offset: usize) -> String {
    let start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[start..]
        .chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .collect()
}

/// Check if only whitespace precedes `offset` on its line.
pub(crate) fn starts_line(source: &str, offset: usize) -> bool {
    let start = source[..offset].rfind('\n').map_or(0, |i| i + 1);
    source[start..offset].chars().all(|c| c == ' ' || c == '\t')
}

fn same_row(source: &str, a: usize, b: usize) -> bool {
    !source[a.min(b)..a.max(b)].contains('\n')
}

fn quote_char(raw: &str) -> Option<char> {
    raw.chars().find(|c| *c == '"' || *c == '\'')
}

/// Decode a Python string literal. `None` for f-strings and bytes.
pub fn decode_string(raw: &str) -> Option<String> {
    let quote_at = raw.find(['"', '\''])?;
    let prefix = raw[..quote_at].to_ascii_lowercase();
    if prefix.chars().any(|c| !matches!(c, 'r' | 'u')) {
        return None;
    }

    let rest = &raw[quote_at..];
    let delimiter = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|d| rest.starts_with(d) && rest.len() >= 2 * d.len() && rest.ends_with(d))?;
    let body = &rest[delimiter.len()..rest.len() - delimiter.len()];

    if prefix.contains('r') {
        Some(body.to_string())
    } else {
        Some(unescape(body))
    }
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{0b}'),
            '0'..='7' => {
                let mut digits = String::from(escaped);
                while digits.len() < 3 {
                    match chars.peek() {
                        Some(d @ '0'..='7') => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                push_code_point(&mut out, u32::from_str_radix(&digits, 8).ok(), &format!("\\{digits}"));
            }
            'x' | 'u' | 'U' => {
                let width = match escaped {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = chars.by_ref().take(width).collect();
                let code = (digits.len() == width)
                    .then(|| u32::from_str_radix(&digits, 16).ok())
                    .flatten();
                push_code_point(&mut out, code, &format!("\\{escaped}{digits}"));
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

fn push_code_point(out: &mut String, code: Option<u32>, fallback: &str) {
    match code.and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => out.push_str(fallback),
    }
}

/// Render `value` as a Python string literal using `quote`.
pub fn encode_string(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::Descriptor;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn extract_from(source: &str, keyword: &str) -> ArgumentValue {
        let descriptor = Descriptor::parse(source).unwrap();
        let call = descriptor.setup_call().unwrap();
        extract(&call, keyword)
    }

    fn literal(source: &str) -> ArgumentList {
        match extract_from(source, "install_requires") {
            ArgumentValue::Literal(list) => list,
            other => panic!("expected a literal list, got {other:?}"),
        }
    }

    #[rstest]
    #[case::double(r#""requests""#, Some("requests"))]
    #[case::single("'requests'", Some("requests"))]
    #[case::triple(r#""""a "quoted" b""""#, Some(r#"a "quoted" b"#))]
    #[case::raw(r#"r"C:\path""#, Some(r"C:\path"))]
    #[case::unicode_prefix(r#"u"caf\u00e9""#, Some("café"))]
    #[case::escapes(r#""a\tb\\c\'d\x41\101""#, Some("a\tb\\c'dAA"))]
    #[case::fstring(r#"f"pkg=={v}""#, None)]
    #[case::bytes(r#"b"pkg""#, None)]
    fn test_decode_string(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(decode_string(raw).as_deref(), expected);
    }

    #[test]
    fn test_encode_string() {
        assert_eq!(encode_string("requests==2.31.0", '"'), r#""requests==2.31.0""#);
        assert_eq!(encode_string("it's", '\''), r"'it\'s'");
        assert_eq!(encode_string(r"a\b", '"'), r#""a\\b""#);
    }

    #[test]
    fn test_absent() {
        assert!(matches!(
            extract_from("setup(name='x')", "install_requires"),
            ArgumentValue::Absent
        ));
    }

    #[rstest]
    #[case::name("REQUIREMENTS")]
    #[case::call("read_requirements()")]
    #[case::concat("['a'] + extra")]
    #[case::comprehension("[r for r in reqs]")]
    #[case::fstring_element("['a', f'b=={v}']")]
    #[case::implicit_concat("['a' 'b']")]
    #[case::starred("['a', *more]")]
    #[case::bytes_element("[b'a']")]
    fn test_non_literal(#[case] value: &str) {
        let source = format!("setup(install_requires={value})");
        assert!(matches!(
            extract_from(&source, "install_requires"),
            ArgumentValue::NonLiteral { .. }
        ));
    }

    #[test]
    fn test_single_line_list() {
        let source = "setup(name='x', install_requires=['requests>=2', 'click'])";
        let list = literal(source);
        assert_eq!(list.values().collect::<Vec<_>>(), vec!["requests>=2", "click"]);
        assert_eq!(list.delimiter, Delimiter::List);
        assert_eq!(list.style.quote, '\'');
        assert!(!list.style.multiline);
        assert!(!list.style.trailing_comma);
        assert_eq!(&source[list.span.clone()], "['requests>=2', 'click']");
        assert_eq!(list.elements[1].raw, "'click'");
    }

    #[test]
    fn test_multiline_list_with_comments() {
        let source = r#"setup(
    name="x",
    install_requires=[
        # web
        "requests>=2",  # http client
        "click",
        # trailing note
    ],
)
"#;
        let list = literal(source);
        assert_eq!(list.elements.len(), 2);
        assert_eq!(list.elements[0].leading_comments, vec!["# web"]);
        assert_eq!(list.elements[0].trailing_comment.as_deref(), Some("# http client"));
        assert_eq!(list.elements[1].trailing_comment, None);
        assert_eq!(list.tail_comments, vec!["# trailing note"]);
        assert_eq!(
            list.style,
            ListStyle {
                quote: '"',
                multiline: true,
                item_indent: "        ".to_string(),
                closing_indent: "    ".to_string(),
                trailing_comma: true,
                newline: "\n",
            }
        );
    }

    #[test]
    fn test_crlf_list_style() {
        let source = "setup(\r\n    install_requires=[\r\n        'a',  # pinned\r\n    ],\r\n)\r\n";
        let list = literal(source);
        assert_eq!(list.style.newline, "\r\n");
        assert_eq!(list.elements[0].trailing_comment.as_deref(), Some("# pinned"));

        let empty = literal("setup(\r\n    install_requires=[],\r\n)\r\n");
        assert_eq!(empty.style, ListStyle::default_for("    ").with_newline("\r\n"));
    }

    #[test]
    fn test_line_ending() {
        assert_eq!(line_ending("a\r\nb\n", 0), "\r\n");
        assert_eq!(line_ending("a\r\nb\n", 3), "\n");
        assert_eq!(line_ending("a\r\nb", 3), "\r\n");
        assert_eq!(line_ending("setup()", 0), "\n");
    }

    #[test]
    fn test_empty_list_uses_default_style() {
        let list = literal("setup(\n    install_requires=[],\n)\n");
        assert!(list.is_empty());
        assert_eq!(list.style, ListStyle::default_for("    "));
    }

    #[test]
    fn test_tuple() {
        let list = literal("setup(install_requires=('a',))");
        assert_eq!(list.delimiter, Delimiter::Tuple);
        assert_eq!(list.values().collect::<Vec<_>>(), vec!["a"]);
        assert!(list.style.trailing_comma);
    }

    #[test]
    fn test_into_literal() {
        let absent = extract_from("setup()", "install_requires");
        assert!(absent.clone().into_literal("install_requires").unwrap().is_none());
        assert!(matches!(
            absent.require_literal("install_requires"),
            Err(Error::ArgumentAbsent { .. })
        ));

        let non_literal = extract_from("setup(install_requires=REQS)", "install_requires");
        assert!(matches!(
            non_literal.into_literal("install_requires"),
            Err(Error::NotALiteralList { .. })
        ));
    }
}
