//! Splicing a merged requirement list back into the `setup(...)` call.
//!
//! Only the bytes of the targeted list literal change; when the argument is
//! absent, a new `keyword=[...]` argument is inserted after the last one.

use tracing::debug;
use tree_sitter::Node;

use crate::edit::{Edit, EditKind};
use crate::extract::{
    ArgumentList, Delimiter, ListStyle, encode_string, line_ending, line_indent, starts_line,
};
use crate::locate::SetupCall;

/// One entry of the list to write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub value: String,
    /// Index of the element this entry came from in the current list.
    pub origin: Option<usize>,
}

impl ListEntry {
    pub fn kept(origin: usize, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: Some(origin),
        }
    }

    pub fn added(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            origin: None,
        }
    }
}

/// A list element ready to print.
struct Rendered<'a> {
    literal: String,
    leading_comments: &'a [String],
    trailing_comment: Option<&'a str>,
}

/// Compute the edit that makes `keyword` hold `entries`.
///
/// Returns `None` when nothing would change: the entries are exactly the
/// current elements, or the argument is absent and `entries` is empty.
pub fn rewrite(
    call: &SetupCall<'_>,
    keyword: &str,
    current: Option<&ArgumentList>,
    entries: &[ListEntry],
) -> Option<Edit> {
    match current {
        Some(list) => replace_list(call.source(), list, entries),
        None if entries.is_empty() => None,
        None => Some(insert_argument(call, keyword, entries)),
    }
}

fn replace_list(source: &str, list: &ArgumentList, entries: &[ListEntry]) -> Option<Edit> {
    let unchanged = entries.len() == list.elements.len()
        && entries.iter().enumerate().all(|(i, entry)| {
            entry.origin == Some(i) && list.elements[i].value == entry.value
        });
    if unchanged {
        return None;
    }

    let items: Vec<Rendered<'_>> = entries
        .iter()
        .map(|entry| match entry.origin.and_then(|i| list.elements.get(i)) {
            Some(element) => Rendered {
                literal: if element.value == entry.value {
                    element.raw.clone()
                } else {
                    encode_string(&entry.value, list.style.quote)
                },
                leading_comments: &element.leading_comments,
                trailing_comment: element.trailing_comment.as_deref(),
            },
            None => Rendered {
                literal: encode_string(&entry.value, list.style.quote),
                leading_comments: &[],
                trailing_comment: None,
            },
        })
        .collect();

    let new_content = render(&items, &list.style, list.delimiter, &list.tail_comments);
    debug!(keyword = %list.keyword, entries = entries.len(), "Re-rendered list literal");
    Some(Edit {
        kind: EditKind::Replace,
        span: list.span.clone(),
        old_content: source[list.span.clone()].to_string(),
        new_content,
    })
}

fn insert_argument(call: &SetupCall<'_>, keyword: &str, entries: &[ListEntry]) -> Edit {
    let source = call.source();
    let arguments = call.arguments();
    let mut cursor = arguments.walk();
    let children: Vec<Node<'_>> = arguments.children(&mut cursor).collect();
    let last_index = children
        .iter()
        .rposition(|child| child.is_named() && child.kind() != "comment");

    let newline = line_ending(source, call.span().start);
    let render_argument = |indent: &str| {
        let items: Vec<Rendered<'_>> = entries
            .iter()
            .map(|entry| Rendered {
                literal: encode_string(&entry.value, '"'),
                leading_comments: &[],
                trailing_comment: None,
            })
            .collect();
        let style = ListStyle::default_for(indent).with_newline(newline);
        let list = render(&items, &style, Delimiter::List, &[]);
        format!("{keyword}={list}")
    };

    debug!(keyword, "Inserting new setup() argument");

    let Some(last_index) = last_index else {
        // `setup()`: open the parentheses onto their own lines.
        let call_indent = line_indent(source, call.span().start);
        let indent = format!("{call_indent}    ");
        let at = arguments.start_byte() + 1;
        return Edit {
            kind: EditKind::Insert,
            span: at..at,
            old_content: String::new(),
            new_content: format!(
                "{newline}{indent}{},{newline}{call_indent}",
                render_argument(&indent)
            ),
        };
    };

    let last = children[last_index];
    let comma = children
        .get(last_index + 1)
        .filter(|child| child.kind() == ",")
        .copied();
    let mut anchor = comma.map_or(last.end_byte(), |c| c.end_byte());
    let multiline = last.start_position().row > arguments.start_position().row;

    let new_content = if multiline {
        let next = last_index + 1 + usize::from(comma.is_some());
        if let Some(comment) = children.get(next).filter(|c| {
            c.kind() == "comment" && !source[anchor..c.start_byte()].contains('\n')
        }) {
            anchor = comment.start_byte() + source[comment.byte_range()].trim_end().len();
        }
        let indent = if starts_line(source, last.start_byte()) {
            line_indent(source, last.start_byte())
        } else {
            format!("{}    ", line_indent(source, call.span().start))
        };
        format!(
            "{}{}{newline}{indent}{}{}",
            if comma.is_some() { "" } else { "," },
            &source[last.end_byte()..anchor],
            render_argument(&indent),
            if comma.is_some() { "," } else { "" },
        )
    } else {
        let indent = line_indent(source, call.span().start);
        match comma {
            Some(_) => format!("{} {},", &source[last.end_byte()..anchor], render_argument(&indent)),
            None => format!(", {}", render_argument(&indent)),
        }
    };

    let span = last.end_byte()..anchor;
    Edit {
        kind: EditKind::Insert,
        old_content: source[span.clone()].to_string(),
        span,
        new_content,
    }
}

fn render(items: &[Rendered<'_>], style: &ListStyle, delimiter: Delimiter, tail_comments: &[String]) -> String {
    let (open, close) = (delimiter.open(), delimiter.close());
    if items.is_empty() && tail_comments.is_empty() {
        return format!("{open}{close}");
    }
    let single_tuple = delimiter == Delimiter::Tuple && items.len() == 1;

    if !style.multiline {
        let literals: Vec<&str> = items.iter().map(|item| item.literal.as_str()).collect();
        let comma = if style.trailing_comma || single_tuple { "," } else { "" };
        return format!("{open}{}{comma}{close}", literals.join(", "));
    }

    let (indent, newline) = (&style.item_indent, style.newline);
    let mut out = format!("{open}{newline}");
    for (i, item) in items.iter().enumerate() {
        for comment in item.leading_comments {
            out.push_str(&format!("{indent}{comment}{newline}"));
        }
        out.push_str(indent);
        out.push_str(&item.literal);
        if i + 1 < items.len() || style.trailing_comma || single_tuple {
            out.push(',');
        }
        if let Some(comment) = item.trailing_comment {
            out.push_str("  ");
            out.push_str(comment);
        }
        out.push_str(newline);
    }
    for comment in tail_comments {
        out.push_str(&format!("{indent}{comment}{newline}"));
    }
    out.push_str(&style.closing_indent);
    out.push(close);
    out
}
