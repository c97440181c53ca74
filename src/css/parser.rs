//! Tree builder over the cssparser tokenizer.
//!
//! Statements are delimited with tokens but stored as source slices, so
//! values keep their exact spelling (cssparser normalizes numbers when
//! re-serializing tokens, which would break lossless output).

use cssparser::{ParseError, Parser, ParserInput, SourcePosition, Token};

use super::{
    AtRule, AtRuleRaws, BlockRaws, Comment, Declaration, DeclarationRaws, Node, Rule, Stylesheet,
    Unparsed,
};

type CssParseError<'i> = ParseError<'i, ()>;

pub(super) fn parse_stylesheet(css: &str) -> Stylesheet {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let (nodes, after) = parse_nodes(&mut parser);
    Stylesheet {
        nodes,
        after,
        source: None,
    }
}

/// Parse the children of a block (or the top level) until end of input.
///
/// Returns the children and the trailing text before the block closes.
fn parse_nodes(parser: &mut Parser<'_, '_>) -> (Vec<Node>, String) {
    let mut nodes = Vec::new();
    // Start of the text that becomes the next node's `before`.
    let mut before_start = parser.position();
    // Start of the statement being accumulated, if any.
    let mut statement: Option<SourcePosition> = None;

    loop {
        let token_start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {}
            Token::Comment(text) if statement.is_none() => {
                nodes.push(Node::Comment(Comment {
                    text: text.to_string(),
                    before: parser.slice(before_start..token_start).to_string(),
                }));
                before_start = parser.position();
            }
            Token::Semicolon => {
                // A stray `;` stays in the next node's `before`.
                if let Some(start) = statement.take() {
                    let before = parser.slice(before_start..start);
                    let raw = parser.slice(start..token_start);
                    nodes.push(statement_node(before, raw, true));
                    before_start = parser.position();
                }
            }
            Token::CurlyBracketBlock => {
                let start = statement.take().unwrap_or(token_start);
                let before = parser.slice(before_start..start).to_string();
                let prelude = parser.slice(start..token_start).to_string();
                let (children, after) = parser
                    .parse_nested_block(|p| Ok::<_, CssParseError>(parse_nodes(p)))
                    .unwrap_or_default();
                nodes.push(block_node(before, &prelude, children, after));
                before_start = parser.position();
            }
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                statement.get_or_insert(token_start);
                skip_block(parser);
            }
            _ => {
                statement.get_or_insert(token_start);
            }
        }
    }

    let end = parser.position();
    let after = match statement {
        Some(start) => {
            let raw = parser.slice(start..end);
            let trimmed = raw.trim_end();
            let before = parser.slice(before_start..start);
            nodes.push(statement_node(before, trimmed, false));
            raw[trimmed.len()..].to_string()
        }
        None => parser.slice(before_start..end).to_string(),
    };

    (nodes, after)
}

/// Consume the rest of a function or bracket block so the parser position
/// lands after its closing token.
fn skip_block(parser: &mut Parser<'_, '_>) {
    let _ = parser.parse_nested_block(|p| {
        while p.next_including_whitespace_and_comments().is_ok() {}
        Ok::<_, CssParseError>(())
    });
}

/// Build a node for a `;`-terminated (or end-of-block) statement.
fn statement_node(before: &str, raw: &str, semicolon: bool) -> Node {
    if let Some(rest) = raw.strip_prefix('@') {
        let (name, after_name, params, between) = split_at_rule_prelude(rest);
        return Node::AtRule(AtRule {
            name,
            params,
            nodes: None,
            raws: AtRuleRaws {
                before: before.to_string(),
                after_name,
                between,
                after: String::new(),
                semicolon,
            },
        });
    }

    match split_declaration(raw) {
        Some((prop, between, value, important, after_value)) => Node::Declaration(Declaration {
            prop,
            value,
            important,
            raws: DeclarationRaws {
                before: before.to_string(),
                between,
                after_value,
                semicolon,
            },
        }),
        None => Node::Unparsed(Unparsed {
            text: raw.to_string(),
            before: before.to_string(),
            semicolon,
        }),
    }
}

/// Build a node for a `prelude { ... }` block.
fn block_node(before: String, prelude: &str, children: Vec<Node>, after: String) -> Node {
    if let Some(rest) = prelude.strip_prefix('@') {
        let (name, after_name, params, between) = split_at_rule_prelude(rest);
        return Node::AtRule(AtRule {
            name,
            params,
            nodes: Some(children),
            raws: AtRuleRaws {
                before,
                after_name,
                between,
                after,
                semicolon: false,
            },
        });
    }

    let selector = prelude.trim_end();
    Node::Rule(Rule {
        selector: selector.to_string(),
        nodes: children,
        raws: BlockRaws {
            before,
            between: prelude[selector.len()..].to_string(),
            after,
        },
    })
}

/// Split `media (min-width: 1px) ` into name, after-name, params and between.
fn split_at_rule_prelude(rest: &str) -> (String, String, String, String) {
    let name_end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    let (name, remaining) = rest.split_at(name_end);
    let tail = remaining.trim_start();
    let after_name = &remaining[..remaining.len() - tail.len()];
    let params = tail.trim_end();
    let between = &tail[params.len()..];
    (
        name.to_string(),
        after_name.to_string(),
        params.to_string(),
        between.to_string(),
    )
}

/// Split `margin : 1px !important ` into prop, between, value, important
/// suffix and after-value text.
fn split_declaration(raw: &str) -> Option<(String, String, String, Option<String>, String)> {
    let colon = raw.find(':')?;
    let prop = raw[..colon].trim_end();
    if prop.is_empty() || prop.contains(char::is_whitespace) {
        return None;
    }

    let after_colon = &raw[colon + 1..];
    let value_start = colon + 1 + (after_colon.len() - after_colon.trim_start().len());
    let between = &raw[prop.len()..value_start];

    let tail = &raw[value_start..];
    let full_value = tail.trim_end();
    let after_value = &tail[full_value.len()..];

    let (value, important) = match full_value.rfind('!') {
        Some(bang) if full_value[bang + 1..].trim().eq_ignore_ascii_case("important") => {
            let value = full_value[..bang].trim_end();
            (value, Some(full_value[value.len()..].to_string()))
        }
        _ => (full_value, None),
    };

    Some((
        prop.to_string(),
        between.to_string(),
        value.to_string(),
        important,
        after_value.to_string(),
    ))
}
