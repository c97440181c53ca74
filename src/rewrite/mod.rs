//! Absolute length to scoped-variable rewriting.
//!
//! Replaces `px` (or `rem`) literals in declaration values with
//! `calc(var(--local-scope-rem, 1rem) * n)`, so that a single custom
//! property set at runtime scales every converted length.
//!
//! ```
//! use scoperem::{RewriteOptions, Rewriter};
//!
//! let rewriter = Rewriter::new(RewriteOptions::default()).unwrap();
//! let css = rewriter.process(".a { margin: 16px; }", None);
//! assert_eq!(css, ".a { margin: calc(var(--local-scope-rem, 1rem) * 1); }");
//! ```

mod pattern;
mod prop_list;

use std::borrow::Cow;
use std::sync::LazyLock;

use memchr::memmem;
use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::css::{AtRule, Declaration, Node, Stylesheet, ToCss};
use crate::error::{Error, Result};
use crate::util::{format_number, to_fixed};

pub use pattern::{Exclude, SelectorBlackList, SelectorPattern, parse_regex_literal};
pub use prop_list::PropListMatcher;

/// Default custom property shared with the runtime calculator.
pub const DEFAULT_VAR_NAME: &str = "--local-scope-rem";

/// Comment text that suppresses rewriting of the next node.
pub const DISABLE_NEXT_LINE: &str = "pxtorem-disable-next-line";

// Comments, quoted strings and url() are matched first so their contents
// are skipped.
static PX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"/\*[\s\S]*?\*/|"[^"]+"|'[^']+'|url\([^)]+\)|(-?\d*\.?\d+)px"#).unwrap()
});

static REM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"/\*[\s\S]*?\*/|"[^"]+"|'[^']+'|url\([^)]+\)|(-?(?:\d+|\d*\.\d+))rem\b"#)
        .unwrap()
});

/// The absolute unit a rewriter converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LengthUnit {
    /// Pixels, divided by the root value.
    #[default]
    Px,
    /// Root ems, whose coefficient is carried through unchanged.
    Rem,
}

impl LengthUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            LengthUnit::Px => "px",
            LengthUnit::Rem => "rem",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            LengthUnit::Px => &PX_PATTERN,
            LengthUnit::Rem => &REM_PATTERN,
        }
    }
}

/// Options for a rewrite pass.
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    pub unit: LengthUnit,
    /// Pixels per unit of the variable (px only).
    pub root_value: f64,
    /// Decimal places kept in coefficients (px only).
    pub unit_precision: u32,
    pub selector_black_list: Vec<SelectorPattern>,
    /// Properties to convert; see [`PropListMatcher`].
    pub prop_list: Vec<String>,
    /// Overwrite values in place instead of appending a converted copy.
    pub replace: bool,
    /// Also convert `@media` params (px only).
    pub media_query: bool,
    /// Pixel values whose magnitude is at or below this stay as they are.
    pub min_value: f64,
    /// Sheets whose source path matches are left alone.
    pub exclude: Option<Exclude>,
    pub var_name: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            unit: LengthUnit::Px,
            root_value: 16.0,
            unit_precision: 5,
            selector_black_list: Vec::new(),
            prop_list: vec!["*".to_string()],
            replace: true,
            media_query: false,
            min_value: 0.0,
            exclude: None,
            var_name: DEFAULT_VAR_NAME.to_string(),
        }
    }
}

impl RewriteOptions {
    /// Defaults for the rem rewriter.
    pub fn rem() -> Self {
        Self {
            unit: LengthUnit::Rem,
            ..Self::default()
        }
    }

    pub fn with_var_name(mut self, var_name: impl Into<String>) -> Self {
        self.var_name = var_name.into();
        self
    }

    pub fn with_prop_list<S: Into<String>>(mut self, props: impl IntoIterator<Item = S>) -> Self {
        self.prop_list = props.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.root_value.is_finite() && self.root_value > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "root value must be a positive number, got {}",
                self.root_value
            )));
        }
        if !self.var_name.starts_with("--") {
            return Err(Error::InvalidConfig(format!(
                "variable name must start with `--`, got {:?}",
                self.var_name
            )));
        }
        Ok(())
    }
}

/// Counts of what a pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteReport {
    /// Declarations rewritten in place.
    pub replaced: usize,
    /// Converted copies appended after their originals.
    pub appended: usize,
    pub media_queries: usize,
    /// Declarations left alone because of a disable comment.
    pub disabled: usize,
    /// The whole sheet was skipped by `exclude`.
    pub excluded: bool,
}

/// A configured rewrite pass.
#[derive(Debug, Clone)]
pub struct Rewriter {
    options: RewriteOptions,
    props: PropListMatcher,
    selectors: SelectorBlackList,
    /// Prefix of an already converted value.
    marker: String,
}

impl Rewriter {
    pub fn new(options: RewriteOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            props: PropListMatcher::new(&options.prop_list),
            selectors: SelectorBlackList::new(options.selector_black_list.clone()),
            marker: format!("calc(var({}, 1rem) * ", options.var_name),
            options,
        })
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    /// Rewrite a sheet in place.
    pub fn rewrite(&self, sheet: &mut Stylesheet) -> RewriteReport {
        let mut report = RewriteReport::default();

        if let (Some(exclude), Some(source)) = (&self.options.exclude, &sheet.source)
            && exclude.matches(source)
        {
            debug!(source = %source, "sheet excluded from rewrite");
            report.excluded = true;
            return report;
        }

        self.walk(&mut sheet.nodes, "", false, &mut report);

        debug!(
            unit = self.options.unit.suffix(),
            source = sheet.source.as_deref().unwrap_or("<input>"),
            replaced = report.replaced,
            appended = report.appended,
            media_queries = report.media_queries,
            disabled = report.disabled,
            "rewrite pass complete"
        );
        report
    }

    /// Parse, rewrite and serialize style sheet text.
    pub fn process(&self, css: &str, source: Option<&str>) -> String {
        let mut sheet = match source {
            Some(source) => Stylesheet::parse_with_source(css, source),
            None => Stylesheet::parse(css),
        };
        self.rewrite(&mut sheet);
        sheet.to_css_string()
    }

    /// Convert every qualifying literal in a value, ignoring filters.
    pub fn rewrite_value<'a>(&self, value: &'a str) -> Cow<'a, str> {
        self.options
            .unit
            .pattern()
            .replace_all(value, |caps: &Captures| self.replace_literal(value, caps))
    }

    fn replace_literal(&self, haystack: &str, caps: &Captures) -> String {
        let whole = &caps[0];
        let Some(number) = caps.get(1) else {
            // Comment, quoted string or url()
            return whole.to_string();
        };
        if !starts_token(haystack, number.start()) {
            // Tail of an identifier such as `--gap-16px`
            return whole.to_string();
        }

        let coefficient = match self.options.unit {
            LengthUnit::Px => {
                let Ok(pixels) = number.as_str().parse::<f64>() else {
                    return whole.to_string();
                };
                if pixels.abs() <= self.options.min_value {
                    return whole.to_string();
                }
                format_number(to_fixed(
                    pixels / self.options.root_value,
                    self.options.unit_precision,
                ))
            }
            LengthUnit::Rem => number.as_str().to_string(),
        };
        format!("{}{})", self.marker, coefficient)
    }

    fn walk(&self, nodes: &mut Vec<Node>, selector: &str, disabled: bool, report: &mut RewriteReport) {
        let mut index = 0;
        while index < nodes.len() {
            let disabled_here = disabled || follows_disable_comment(nodes, index);
            let converted = !self.options.replace && self.converted_copy_follows(nodes, index);

            let appended = match &mut nodes[index] {
                Node::Declaration(_) if converted => None,
                Node::Declaration(decl) => {
                    self.rewrite_declaration(decl, selector, disabled_here, report)
                }
                Node::Rule(rule) => {
                    self.walk(&mut rule.nodes, &rule.selector, disabled_here, report);
                    None
                }
                Node::AtRule(at_rule) => {
                    self.rewrite_at_rule_params(at_rule, report);
                    if let Some(children) = &mut at_rule.nodes {
                        self.walk(children, "", disabled_here, report);
                    }
                    None
                }
                Node::Comment(_) | Node::Unparsed(_) => None,
            };

            if let Some(copy) = appended {
                index += 1;
                nodes.insert(index, Node::Declaration(copy));
            }
            index += 1;
        }
    }

    /// Whether `nodes[index]` is a declaration already followed by its
    /// converted copy from an earlier append-mode pass.
    fn converted_copy_follows(&self, nodes: &[Node], index: usize) -> bool {
        let Some(decl) = nodes[index].as_declaration() else {
            return false;
        };
        nodes
            .get(index + 1)
            .and_then(Node::as_declaration)
            .is_some_and(|next| next.prop == decl.prop && next.value.contains(&self.marker))
    }

    /// Returns the converted copy to insert after `decl` in append mode.
    fn rewrite_declaration(
        &self,
        decl: &mut Declaration,
        selector: &str,
        disabled: bool,
        report: &mut RewriteReport,
    ) -> Option<Declaration> {
        if disabled || decl.raws.before.contains(DISABLE_NEXT_LINE) {
            report.disabled += 1;
            return None;
        }
        if !self.props.matches(&decl.prop) || self.selectors.is_blacklisted(selector) {
            return None;
        }
        let suffix = self.options.unit.suffix().as_bytes();
        if memmem::find(decl.value.as_bytes(), suffix).is_none() {
            return None;
        }
        if decl.value.contains(&self.marker) {
            return None;
        }

        let converted = match self.rewrite_value(&decl.value) {
            Cow::Owned(converted) if converted != decl.value => converted,
            _ => return None,
        };
        trace!(prop = %decl.prop, from = %decl.value, to = %converted, "rewrote declaration");

        if self.options.replace {
            decl.value = converted;
            report.replaced += 1;
            None
        } else {
            let mut copy = decl.clone();
            copy.value = converted;
            decl.raws.semicolon = true;
            report.appended += 1;
            Some(copy)
        }
    }

    fn rewrite_at_rule_params(&self, at_rule: &mut AtRule, report: &mut RewriteReport) {
        if !self.options.media_query
            || self.options.unit != LengthUnit::Px
            || !at_rule.name.eq_ignore_ascii_case("media")
            || !at_rule.params.contains("px")
        {
            return;
        }
        if let Cow::Owned(converted) = self.rewrite_value(&at_rule.params)
            && converted != at_rule.params
        {
            trace!(from = %at_rule.params, to = %converted, "rewrote media query");
            at_rule.params = converted;
            report.media_queries += 1;
        }
    }
}

/// Whether a number at `start` begins a token rather than continuing an
/// identifier, so a `-` there is a sign and not part of a name.
fn starts_token(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !(c.is_alphanumeric() || c == '_' || c == '-'))
}

/// Whether the sibling right before `nodes[index]` is a disable comment.
pub fn follows_disable_comment(nodes: &[Node], index: usize) -> bool {
    index
        .checked_sub(1)
        .and_then(|prev| nodes[prev].as_comment())
        .is_some_and(|comment| comment.text.contains(DISABLE_NEXT_LINE))
}

/// Rewrite a sheet with one-off options.
pub fn rewrite(mut sheet: Stylesheet, options: &RewriteOptions) -> Result<Stylesheet> {
    Rewriter::new(options.clone())?.rewrite(&mut sheet);
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::Rule;

    fn px(css: &str) -> String {
        Rewriter::new(RewriteOptions::default())
            .unwrap()
            .process(css, None)
    }

    #[test]
    fn test_rewrite_value_skips_strings_and_urls() {
        let rewriter = Rewriter::new(RewriteOptions::default()).unwrap();
        assert_eq!(
            rewriter.rewrite_value("url(icon-16px.png) 16px \"a 8px\" '4px'"),
            "url(icon-16px.png) calc(var(--local-scope-rem, 1rem) * 1) \"a 8px\" '4px'"
        );
    }

    #[test]
    fn test_rewrite_value_sign_only_at_token_start() {
        let rewriter = Rewriter::new(RewriteOptions::default()).unwrap();
        assert_eq!(
            rewriter.rewrite_value("var(--gap-16px) -16px"),
            "var(--gap-16px) calc(var(--local-scope-rem, 1rem) * -1)"
        );
        assert!(starts_token("a (", 3));
        assert!(!starts_token("--gap", 5));
    }

    #[test]
    fn test_rewrite_value_without_literals_borrows() {
        let rewriter = Rewriter::new(RewriteOptions::default()).unwrap();
        assert!(matches!(rewriter.rewrite_value("1em 10%"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_precision_is_applied() {
        let options = RewriteOptions {
            unit_precision: 2,
            ..Default::default()
        };
        let rewriter = Rewriter::new(options).unwrap();
        assert_eq!(
            rewriter.rewrite_value("10px"),
            "calc(var(--local-scope-rem, 1rem) * 0.63)"
        );
    }

    #[test]
    fn test_root_value() {
        let options = RewriteOptions {
            root_value: 37.5,
            ..Default::default()
        };
        let rewriter = Rewriter::new(options).unwrap();
        assert_eq!(
            rewriter.rewrite_value("75px"),
            "calc(var(--local-scope-rem, 1rem) * 2)"
        );
    }

    #[test]
    fn test_zero_is_left_alone_by_default() {
        assert_eq!(px("a { margin: 0px 16px; }"), "a { margin: 0px calc(var(--local-scope-rem, 1rem) * 1); }");
    }

    #[test]
    fn test_disable_comment_inside_rule() {
        let out = px("a { /* pxtorem-disable-next-line */ width: 16px; height: 16px; }");
        assert_eq!(
            out,
            "a { /* pxtorem-disable-next-line */ width: 16px; height: calc(var(--local-scope-rem, 1rem) * 1); }"
        );
    }

    #[test]
    fn test_disable_comment_in_raw_before() {
        let mut sheet = Stylesheet::parse("a { height: 16px; }");
        if let Node::Rule(rule) = &mut sheet.nodes[0] {
            rule.nodes[0].set_before(" /* pxtorem-disable-next-line */ ");
        }
        let report = Rewriter::new(RewriteOptions::default())
            .unwrap()
            .rewrite(&mut sheet);
        assert_eq!(report.disabled, 1);
        assert_eq!(report.replaced, 0);
    }

    #[test]
    fn test_disable_comment_before_at_rule_covers_children() {
        let out = px("/* pxtorem-disable-next-line */\n@media print { a { margin: 16px; } }");
        assert!(!out.contains("calc("));
    }

    #[test]
    fn test_append_on_last_declaration_without_semicolon() {
        let rewriter = Rewriter::new(RewriteOptions::default().with_replace(false)).unwrap();
        assert_eq!(
            rewriter.process(".a { margin: 20px }", None),
            ".a { margin: 20px; margin: calc(var(--local-scope-rem, 1rem) * 1.25) }"
        );
    }

    #[test]
    fn test_important_is_kept() {
        assert_eq!(
            px("a { width: 32px !important; }"),
            "a { width: calc(var(--local-scope-rem, 1rem) * 2) !important; }"
        );
    }

    #[test]
    fn test_media_query_requires_px_unit() {
        let options = RewriteOptions {
            media_query: true,
            ..RewriteOptions::rem()
        };
        let rewriter = Rewriter::new(options).unwrap();
        let out = rewriter.process("@media (min-width: 20rem) { a { margin: 1rem; } }", None);
        assert_eq!(
            out,
            "@media (min-width: 20rem) { a { margin: calc(var(--local-scope-rem, 1rem) * 1); } }"
        );
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let options = RewriteOptions {
            root_value: 0.0,
            ..Default::default()
        };
        assert!(matches!(Rewriter::new(options), Err(Error::InvalidConfig(_))));

        let options = RewriteOptions::default().with_var_name("scope-rem");
        assert!(matches!(Rewriter::new(options), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_built_tree_is_rewritten() {
        let mut rule = Rule::new(".a");
        rule.push(Declaration::new("margin", "32px"));
        rule.push(Declaration::new("padding", "8px").with_before("\n  "));
        let mut sheet = Stylesheet {
            nodes: vec![rule.into()],
            ..Default::default()
        };

        let rewriter = Rewriter::new(RewriteOptions::default()).unwrap();
        assert_eq!(rewriter.options().unit, LengthUnit::Px);
        let report = rewriter.rewrite(&mut sheet);
        assert_eq!(report.replaced, 2);
        assert_eq!(
            sheet.to_css_string(),
            ".a { margin: calc(var(--local-scope-rem, 1rem) * 2);\n  padding: calc(var(--local-scope-rem, 1rem) * 0.5); }"
        );
    }

    #[test]
    fn test_follows_disable_comment() {
        let sheet = Stylesheet::parse("/* pxtorem-disable-next-line */ a {} /* other */ b {}");
        assert!(follows_disable_comment(&sheet.nodes, 1));
        assert!(!follows_disable_comment(&sheet.nodes, 3));
        assert!(!follows_disable_comment(&sheet.nodes, 0));
    }
}
