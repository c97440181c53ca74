//! # scoperem
//!
//! Viewport-scaled CSS lengths in two halves that meet at one custom
//! property (`--local-scope-rem` by default):
//!
//! - A build-time rewriter that turns `px` and `rem` literals into
//!   `calc(var(--local-scope-rem, 1rem) * n)`
//! - A runtime calculator that keeps that property (or the root font
//!   size) at one hundredth of the viewport width, scaled per breakpoint
//!
//! ## Rewriting
//!
//! ```
//! use scoperem::{RewriteOptions, Rewriter};
//!
//! let options = RewriteOptions::default().with_prop_list(["font-size"]);
//! let rewriter = Rewriter::new(options).unwrap();
//!
//! let css = rewriter.process(".a { font-size: 24px; margin: 24px; }", None);
//! assert_eq!(css, ".a { font-size: calc(var(--local-scope-rem, 1rem) * 1.5); margin: 24px; }");
//! ```
//!
//! ## Scaling
//!
//! ```
//! use scoperem::compute_scale;
//!
//! // A 375px-wide mobile design shown on a 375px viewport scales up to
//! // the 1920px desktop reference.
//! let scale = compute_scale(375.0, &[768.0], &[375.0, 1920.0], 1920.0);
//! assert_eq!(scale, 1920.0 / 375.0);
//! ```

pub mod css;
pub mod error;
pub mod flexible;
pub mod rewrite;
pub mod util;

#[cfg(feature = "serde")]
pub mod config;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use css::{Stylesheet, ToCss};
pub use error::{Error, Result};
pub use flexible::timing::Coalesce;
pub use flexible::{
    BreakpointTable, Flexible, FlexibleOptions, Surface, Target, TargetKind, Trigger, compute_scale,
};
pub use rewrite::{LengthUnit, RewriteOptions, RewriteReport, Rewriter, rewrite};
