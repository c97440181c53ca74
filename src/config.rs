//! JSON configuration files.
//!
//! Field names follow the option names of the JavaScript tooling these
//! rewrites interoperate with (`rootValue`, `propList`, `containers`, ...),
//! so an existing configuration can be reused as is.
//!
//! ```json
//! {
//!   "px": { "rootValue": 16, "propList": ["*", "!border*"], "exclude": "node_modules" },
//!   "rem": { "varName": "--local-scope-rem" },
//!   "flexible": { "breakpoints": [768], "containers": [375, 1920] }
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::flexible::BreakpointTable;
use crate::rewrite::{Exclude, LengthUnit, RewriteOptions, SelectorPattern};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Config {
    pub px: Option<RewriteConfig>,
    pub rem: Option<RewriteConfig>,
    pub flexible: Option<FlexibleConfig>,
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Options for `unit`, with defaults for anything not configured.
    pub fn rewrite_options(&self, unit: LengthUnit) -> RewriteOptions {
        let section = match unit {
            LengthUnit::Px => &self.px,
            LengthUnit::Rem => &self.rem,
        };
        section
            .clone()
            .unwrap_or_default()
            .into_options(unit)
    }
}

/// One rewriter section. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RewriteConfig {
    pub root_value: Option<f64>,
    pub unit_precision: Option<u32>,
    #[serde(default)]
    pub selector_black_list: Vec<String>,
    pub prop_list: Option<Vec<String>>,
    pub replace: Option<bool>,
    pub media_query: Option<bool>,
    #[serde(alias = "minPixelValue")]
    pub min_value: Option<f64>,
    pub exclude: Option<String>,
    pub var_name: Option<String>,
}

impl RewriteConfig {
    pub fn into_options(self, unit: LengthUnit) -> RewriteOptions {
        let defaults = RewriteOptions {
            unit,
            ..RewriteOptions::default()
        };
        RewriteOptions {
            unit,
            root_value: self.root_value.unwrap_or(defaults.root_value),
            unit_precision: self.unit_precision.unwrap_or(defaults.unit_precision),
            selector_black_list: self
                .selector_black_list
                .iter()
                .filter_map(|entry| SelectorPattern::parse(entry))
                .collect(),
            prop_list: self.prop_list.unwrap_or(defaults.prop_list),
            replace: self.replace.unwrap_or(defaults.replace),
            media_query: self.media_query.unwrap_or(defaults.media_query),
            min_value: self.min_value.unwrap_or(defaults.min_value),
            exclude: self.exclude.as_deref().and_then(Exclude::parse),
            var_name: self.var_name.unwrap_or(defaults.var_name),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FlexibleConfig {
    pub breakpoints: Option<Vec<f64>>,
    #[serde(alias = "containers")]
    pub layouts: Option<Vec<f64>>,
    #[serde(alias = "basicContainer")]
    pub basic_layout: Option<f64>,
}

impl FlexibleConfig {
    pub fn table(&self) -> Result<BreakpointTable> {
        let breakpoints = self
            .breakpoints
            .clone()
            .unwrap_or_else(|| crate::flexible::DEFAULT_BREAKPOINTS.to_vec());
        BreakpointTable::new(breakpoints, self.layouts.clone(), self.basic_layout)
    }
}
