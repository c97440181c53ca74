//! Lossless style sheet tree.
//!
//! The tree keeps every byte of the source in either a node field or one of
//! its `raws`, so a sheet that is parsed and serialized without being
//! touched comes back unchanged. Only the fields a transform cares about
//! (selectors, property names, values, at-rule params) are exposed as plain
//! strings; everything else is formatting.

mod parser;


/// Serialize a tree node back to CSS text.
pub trait ToCss {
    /// Write this value as CSS to the buffer.
    fn to_css(&self, buf: &mut String);

    /// Convert to a CSS string (convenience method).
    fn to_css_string(&self) -> String {
        let mut buf = String::new();
        self.to_css(&mut buf);
        buf
    }
}

/// A parsed style sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stylesheet {
    pub nodes: Vec<Node>,
    /// Whitespace after the last node.
    pub after: String,
    /// Path of the file the sheet was read from, if any.
    pub source: Option<String>,
}

/// A child of a sheet, rule or at-rule block.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Rule(Rule),
    AtRule(AtRule),
    Declaration(Declaration),
    Comment(Comment),
    /// A statement that is neither a declaration nor an at-rule.
    Unparsed(Unparsed),
}

/// Formatting around a `selector { ... }` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockRaws {
    /// Text before the node (whitespace, stray semicolons).
    pub before: String,
    /// Text between the selector and `{`.
    pub between: String,
    /// Text between the last child and `}`.
    pub after: String,
}

/// A qualified rule, e.g. `.a, .b { margin: 0 }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rule {
    pub selector: String,
    pub nodes: Vec<Node>,
    pub raws: BlockRaws,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtRuleRaws {
    pub before: String,
    /// Text between the at-rule name and its params.
    pub after_name: String,
    /// Text between the params and `{` or `;`.
    pub between: String,
    /// Text between the last child and `}`.
    pub after: String,
    /// Whether a block-less at-rule is terminated by `;`.
    pub semicolon: bool,
}

/// An at-rule such as `@media (min-width: 320px) { ... }` or `@import "a.css";`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtRule {
    /// Name without the leading `@`.
    pub name: String,
    pub params: String,
    /// `None` for block-less at-rules.
    pub nodes: Option<Vec<Node>>,
    pub raws: AtRuleRaws,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationRaws {
    pub before: String,
    /// Text between the property name and the value, colon included.
    pub between: String,
    /// Text between the value (or `!important`) and `;`.
    pub after_value: String,
    pub semicolon: bool,
}

impl Default for DeclarationRaws {
    fn default() -> Self {
        Self {
            before: String::new(),
            between: ": ".to_string(),
            after_value: String::new(),
            semicolon: true,
        }
    }
}

/// A `property: value` declaration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Declaration {
    pub prop: String,
    pub value: String,
    /// Raw `!important` suffix including its leading whitespace.
    pub important: Option<String>,
    pub raws: DeclarationRaws,
}

impl Declaration {
    pub fn new(prop: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            prop: prop.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    /// Set the whitespace emitted before the declaration.
    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.raws.before = before.into();
        self
    }

    pub fn is_important(&self) -> bool {
        self.important.is_some()
    }
}

/// A `/* ... */` comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comment {
    /// Text between the delimiters.
    pub text: String,
    pub before: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            before: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unparsed {
    pub text: String,
    pub before: String,
    pub semicolon: bool,
}

impl Stylesheet {
    /// Parse a style sheet. Parsing never fails; anything the tree cannot
    /// classify is kept as [`Unparsed`].
    pub fn parse(css: &str) -> Self {
        parser::parse_stylesheet(css)
    }

    /// Parse a style sheet and remember the path it came from.
    pub fn parse_with_source(css: &str, source: impl Into<String>) -> Self {
        let mut sheet = Self::parse(css);
        sheet.source = Some(source.into());
        sheet
    }

    /// Visit every declaration in document order.
    pub fn walk_decls<F>(&self, mut f: F)
    where
        F: FnMut(&Declaration),
    {
        walk_decls_in(&self.nodes, &mut f);
    }

    /// Visit every at-rule in document order, outer before inner.
    pub fn walk_at_rules<F>(&self, mut f: F)
    where
        F: FnMut(&AtRule),
    {
        walk_at_rules_in(&self.nodes, &mut f);
    }
}

impl Rule {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            raws: BlockRaws {
                between: " ".to_string(),
                after: " ".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Append a child, separated from the previous one by a single space.
    pub fn push(&mut self, node: impl Into<Node>) {
        let mut node = node.into();
        if node.before().is_empty() {
            node.set_before(" ");
        }
        self.nodes.push(node);
    }
}

impl Node {
    /// Text emitted before the node.
    pub fn before(&self) -> &str {
        match self {
            Node::Rule(rule) => &rule.raws.before,
            Node::AtRule(at_rule) => &at_rule.raws.before,
            Node::Declaration(decl) => &decl.raws.before,
            Node::Comment(comment) => &comment.before,
            Node::Unparsed(unparsed) => &unparsed.before,
        }
    }

    pub fn set_before(&mut self, before: impl Into<String>) {
        let before = before.into();
        match self {
            Node::Rule(rule) => rule.raws.before = before,
            Node::AtRule(at_rule) => at_rule.raws.before = before,
            Node::Declaration(decl) => decl.raws.before = before,
            Node::Comment(comment) => comment.before = before,
            Node::Unparsed(unparsed) => unparsed.before = before,
        }
    }

    pub fn as_declaration(&self) -> Option<&Declaration> {
        match self {
            Node::Declaration(decl) => Some(decl),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Node::Comment(comment) => Some(comment),
            _ => None,
        }
    }
}

impl From<Rule> for Node {
    fn from(rule: Rule) -> Self {
        Node::Rule(rule)
    }
}

impl From<AtRule> for Node {
    fn from(at_rule: AtRule) -> Self {
        Node::AtRule(at_rule)
    }
}

impl From<Declaration> for Node {
    fn from(decl: Declaration) -> Self {
        Node::Declaration(decl)
    }
}

impl From<Comment> for Node {
    fn from(comment: Comment) -> Self {
        Node::Comment(comment)
    }
}

fn walk_decls_in<F>(nodes: &[Node], f: &mut F)
where
    F: FnMut(&Declaration),
{
    for node in nodes {
        match node {
            Node::Declaration(decl) => f(decl),
            Node::Rule(rule) => walk_decls_in(&rule.nodes, f),
            Node::AtRule(AtRule {
                nodes: Some(children),
                ..
            }) => walk_decls_in(children, f),
            _ => {}
        }
    }
}

fn walk_at_rules_in<F>(nodes: &[Node], f: &mut F)
where
    F: FnMut(&AtRule),
{
    for node in nodes {
        match node {
            Node::AtRule(at_rule) => {
                f(at_rule);
                if let Some(children) = &at_rule.nodes {
                    walk_at_rules_in(children, f);
                }
            }
            Node::Rule(rule) => walk_at_rules_in(&rule.nodes, f),
            _ => {}
        }
    }
}

// ============================================================================
// Serialization
// ============================================================================

fn nodes_to_css(nodes: &[Node], buf: &mut String) {
    for node in nodes {
        node.to_css(buf);
    }
}

impl ToCss for Stylesheet {
    fn to_css(&self, buf: &mut String) {
        nodes_to_css(&self.nodes, buf);
        buf.push_str(&self.after);
    }
}

impl ToCss for Node {
    fn to_css(&self, buf: &mut String) {
        match self {
            Node::Rule(rule) => rule.to_css(buf),
            Node::AtRule(at_rule) => at_rule.to_css(buf),
            Node::Declaration(decl) => decl.to_css(buf),
            Node::Comment(comment) => comment.to_css(buf),
            Node::Unparsed(unparsed) => unparsed.to_css(buf),
        }
    }
}

impl ToCss for Rule {
    fn to_css(&self, buf: &mut String) {
        buf.push_str(&self.raws.before);
        buf.push_str(&self.selector);
        buf.push_str(&self.raws.between);
        buf.push('{');
        nodes_to_css(&self.nodes, buf);
        buf.push_str(&self.raws.after);
        buf.push('}');
    }
}

impl ToCss for AtRule {
    fn to_css(&self, buf: &mut String) {
        buf.push_str(&self.raws.before);
        buf.push('@');
        buf.push_str(&self.name);
        buf.push_str(&self.raws.after_name);
        buf.push_str(&self.params);
        buf.push_str(&self.raws.between);
        match &self.nodes {
            Some(children) => {
                buf.push('{');
                nodes_to_css(children, buf);
                buf.push_str(&self.raws.after);
                buf.push('}');
            }
            None if self.raws.semicolon => buf.push(';'),
            None => {}
        }
    }
}

impl ToCss for Declaration {
    fn to_css(&self, buf: &mut String) {
        buf.push_str(&self.raws.before);
        buf.push_str(&self.prop);
        buf.push_str(&self.raws.between);
        buf.push_str(&self.value);
        if let Some(important) = &self.important {
            buf.push_str(important);
        }
        buf.push_str(&self.raws.after_value);
        if self.raws.semicolon {
            buf.push(';');
        }
    }
}

impl ToCss for Comment {
    fn to_css(&self, buf: &mut String) {
        buf.push_str(&self.before);
        buf.push_str("/*");
        buf.push_str(&self.text);
        buf.push_str("*/");
    }
}

impl ToCss for Unparsed {
    fn to_css(&self, buf: &mut String) {
        buf.push_str(&self.before);
        buf.push_str(&self.text);
        if self.semicolon {
            buf.push(';');
        }
    }
}

impl std::fmt::Display for Stylesheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_css_string())
    }
}
