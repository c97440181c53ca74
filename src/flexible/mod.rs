//! Viewport-relative unit calculation.
//!
//! Keeps a CSS length (the root font size, or a custom property such as
//! `--local-scope-rem`) equal to one hundredth of the viewport width,
//! scaled so that a design drawn at a reference layout width keeps its
//! proportions across breakpoints.
//!
//! Browser state is reached through the [`Surface`] trait, so the
//! calculation runs the same under test as it does in a page.

pub mod timing;

use std::time::Duration;

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::rewrite::DEFAULT_VAR_NAME;
use crate::util::format_number;

use timing::{Coalesce, Coalescer, Decision};

pub const DEFAULT_BREAKPOINTS: [f64; 1] = [768.0];

/// Scale factor for `viewport_width`.
///
/// The first breakpoint at or above the width selects the layout width at
/// the same index; past the last breakpoint the last layout width is used.
/// Returns 1 unless `layout_widths` has exactly one more entry than
/// `breakpoints`.
pub fn compute_scale(
    viewport_width: f64,
    breakpoints: &[f64],
    layout_widths: &[f64],
    basic_layout_width: f64,
) -> f64 {
    if layout_widths.len() != breakpoints.len() + 1 {
        return 1.0;
    }
    let index = select_index(viewport_width, breakpoints);
    safe_ratio(basic_layout_width, layout_widths[index])
}

/// The length that makes 100 units span the viewport, scaled.
pub fn unit_value(viewport_width: f64, scale: f64) -> f64 {
    viewport_width / 100.0 * scale
}

fn select_index(viewport_width: f64, breakpoints: &[f64]) -> usize {
    breakpoints
        .iter()
        .position(|&threshold| threshold >= viewport_width)
        .unwrap_or(breakpoints.len())
}

fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    let ratio = numerator / denominator;
    if ratio.is_finite() && ratio > 0.0 {
        ratio
    } else {
        1.0
    }
}

/// Breakpoints paired with the layout widths they were designed at.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable {
    breakpoints: Vec<f64>,
    layouts: Option<Vec<f64>>,
    basic_layout: Option<f64>,
}

impl BreakpointTable {
    /// Build a table. Breakpoints must be finite and strictly ascending.
    ///
    /// A layout list of the wrong length is accepted but disables scaling.
    /// `basic_layout` defaults to the last layout width.
    pub fn new(
        breakpoints: Vec<f64>,
        layouts: Option<Vec<f64>>,
        basic_layout: Option<f64>,
    ) -> Result<Self> {
        for (index, &current) in breakpoints.iter().enumerate() {
            if !current.is_finite() {
                return Err(Error::InvalidConfig(format!(
                    "breakpoint {index} is not a finite number"
                )));
            }
            if let Some(&previous) = index.checked_sub(1).and_then(|i| breakpoints.get(i))
                && current <= previous
            {
                return Err(Error::UnsortedBreakpoints {
                    index,
                    previous,
                    current,
                });
            }
        }

        if let Some(layouts) = &layouts
            && layouts.len() != breakpoints.len() + 1
        {
            warn!(
                breakpoints = breakpoints.len(),
                layouts = layouts.len(),
                "layout widths need one more entry than breakpoints; scaling disabled"
            );
        }

        let basic_layout = basic_layout.or_else(|| layouts.as_ref().and_then(|l| l.last().copied()));
        Ok(Self {
            breakpoints,
            layouts,
            basic_layout,
        })
    }

    pub fn breakpoints(&self) -> &[f64] {
        &self.breakpoints
    }

    pub fn layouts(&self) -> Option<&[f64]> {
        self.layouts.as_deref()
    }

    pub fn basic_layout(&self) -> Option<f64> {
        self.basic_layout
    }

    /// Index of the layout width used at `viewport_width`.
    pub fn index(&self, viewport_width: f64) -> usize {
        select_index(viewport_width, &self.breakpoints)
    }

    pub fn scale(&self, viewport_width: f64) -> f64 {
        match (&self.layouts, self.basic_layout) {
            (Some(layouts), Some(basic)) => {
                compute_scale(viewport_width, &self.breakpoints, layouts, basic)
            }
            _ => 1.0,
        }
    }
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self {
            breakpoints: DEFAULT_BREAKPOINTS.to_vec(),
            layouts: None,
            basic_layout: None,
        }
    }
}

/// The page the unit is written to.
pub trait Surface {
    /// Handle to an element; `None` in the methods below means the
    /// document root.
    type Element;

    /// Current layout viewport width in CSS pixels.
    fn viewport_width(&self) -> f64;

    fn set_font_size(&mut self, element: Option<&Self::Element>, value: &str);

    fn set_property(&mut self, element: Option<&Self::Element>, name: &str, value: &str);
}

/// Which style a target writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    FontSize,
    /// A custom property such as `--local-scope-rem`.
    Property(String),
}

/// An element to keep in sync, with optional per-breakpoint ratios.
#[derive(Debug, Clone, PartialEq)]
pub struct Target<E> {
    /// `None` targets the document root.
    pub element: Option<E>,
    pub kind: TargetKind,
    /// Extra factor per layout index, multiplied with the table's scale.
    pub ratios: Option<Vec<f64>>,
}

impl<E> Target<E> {
    pub fn root_font_size() -> Self {
        Self {
            element: None,
            kind: TargetKind::FontSize,
            ratios: None,
        }
    }

    pub fn property(name: impl Into<String>) -> Self {
        Self {
            element: None,
            kind: TargetKind::Property(name.into()),
            ratios: None,
        }
    }

    /// `--local-scope-rem` on the document root.
    pub fn scope() -> Self {
        Self::property(DEFAULT_VAR_NAME)
    }

    pub fn on(mut self, element: E) -> Self {
        self.element = Some(element);
        self
    }

    pub fn with_ratios(mut self, ratios: Vec<f64>) -> Self {
        self.ratios = Some(ratios);
        self
    }

    fn ratio(&self, index: usize, breakpoints: usize) -> f64 {
        match &self.ratios {
            Some(ratios) if ratios.len() == breakpoints + 1 => {
                let ratio = ratios[index];
                if ratio.is_finite() { ratio } else { 1.0 }
            }
            _ => 1.0,
        }
    }
}

/// Events that recompute the unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Load,
    Resize,
    OrientationChange,
}

impl Trigger {
    pub const ALL: [Trigger; 3] = [Trigger::Load, Trigger::Resize, Trigger::OrientationChange];

    /// DOM event name to listen for.
    pub fn event_name(self) -> &'static str {
        match self {
            Trigger::Load => "load",
            Trigger::Resize => "resize",
            Trigger::OrientationChange => "orientationchange",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlexibleOptions<E> {
    /// Ascending viewport widths at which the reference layout changes.
    pub breakpoints: Vec<f64>,
    /// One reference width per breakpoint, plus one above the last.
    pub layouts: Option<Vec<f64>>,
    /// Reference width the scale is relative to; defaults to the last layout.
    pub basic_layout: Option<f64>,
    pub targets: Vec<Target<E>>,
    pub coalesce: Coalesce,
    /// Recompute once more on the next animation frame after each update,
    /// to pick up widths that changed when a scrollbar appeared.
    pub refresh_on_next_frame: bool,
}

impl<E> Default for FlexibleOptions<E> {
    fn default() -> Self {
        Self {
            breakpoints: DEFAULT_BREAKPOINTS.to_vec(),
            layouts: None,
            basic_layout: None,
            targets: vec![Target::root_font_size()],
            coalesce: Coalesce::Immediate,
            refresh_on_next_frame: false,
        }
    }
}

/// Outcome of [`Flexible::handle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dispatch {
    /// Targets were written with this base unit value.
    Applied(f64),
    /// A run is pending; call [`Flexible::poll`] at this time.
    Deferred(Duration),
}

/// Keeps targets in sync with the viewport width.
#[derive(Debug, Clone)]
pub struct Flexible<E> {
    table: BreakpointTable,
    targets: Vec<Target<E>>,
    coalescer: Coalescer,
    refresh_on_next_frame: bool,
    frame_pending: bool,
}

impl<E> Flexible<E> {
    pub fn new(options: FlexibleOptions<E>) -> Result<Self> {
        let table = BreakpointTable::new(options.breakpoints, options.layouts, options.basic_layout)?;

        let expected = table.breakpoints.len() + 1;
        for target in &options.targets {
            if let Some(ratios) = &target.ratios
                && ratios.len() != expected
            {
                warn!(
                    kind = ?target.kind,
                    ratios = ratios.len(),
                    expected,
                    "target ratio count does not match layouts; ratios ignored"
                );
            }
        }

        Ok(Self {
            table,
            targets: options.targets,
            coalescer: Coalescer::new(options.coalesce),
            refresh_on_next_frame: options.refresh_on_next_frame,
            frame_pending: false,
        })
    }

    pub fn table(&self) -> &BreakpointTable {
        &self.table
    }

    pub fn targets(&self) -> &[Target<E>] {
        &self.targets
    }

    /// Events a host should subscribe to, and unsubscribe from on teardown.
    pub fn triggers(&self) -> &'static [Trigger] {
        &Trigger::ALL
    }

    /// Recompute from the current width and write every target.
    ///
    /// Returns the base unit value in pixels, before per-target ratios.
    pub fn apply<S>(&self, surface: &mut S) -> f64
    where
        S: Surface<Element = E>,
    {
        let width = surface.viewport_width();
        let index = self.table.index(width);
        let base = unit_value(width, self.table.scale(width));
        let breakpoints = self.table.breakpoints.len();

        for target in &self.targets {
            let value = format!("{}px", format_number(base * target.ratio(index, breakpoints)));
            match &target.kind {
                TargetKind::FontSize => surface.set_font_size(target.element.as_ref(), &value),
                TargetKind::Property(name) => {
                    surface.set_property(target.element.as_ref(), name, &value)
                }
            }
        }

        trace!(width, index, base, "applied viewport unit");
        base
    }

    /// React to a trigger at time `now`.
    pub fn handle<S>(&mut self, trigger: Trigger, now: Duration, surface: &mut S) -> Dispatch
    where
        S: Surface<Element = E>,
    {
        let decision = match trigger {
            Trigger::Load => {
                self.coalescer.cancel();
                Decision::RunNow
            }
            Trigger::Resize | Trigger::OrientationChange => self.coalescer.event(now),
        };

        match decision {
            Decision::RunNow => Dispatch::Applied(self.run(surface)),
            Decision::Scheduled(at) => Dispatch::Deferred(at),
        }
    }

    /// Run a coalesced update if it is due. Returns the base unit value
    /// when targets were written.
    pub fn poll<S>(&mut self, now: Duration, surface: &mut S) -> Option<f64>
    where
        S: Surface<Element = E>,
    {
        self.coalescer.poll(now).then(|| self.run(surface))
    }

    /// When a deferred update is due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.coalescer.deadline()
    }

    /// Whether the host should call [`Flexible::on_animation_frame`].
    pub fn frame_requested(&self) -> bool {
        self.frame_pending
    }

    /// Run the single follow-up update requested by the last run.
    pub fn on_animation_frame<S>(&mut self, surface: &mut S) -> Option<f64>
    where
        S: Surface<Element = E>,
    {
        if !self.frame_pending {
            return None;
        }
        self.frame_pending = false;
        Some(self.apply(surface))
    }

    fn run<S>(&mut self, surface: &mut S) -> f64
    where
        S: Surface<Element = E>,
    {
        let base = self.apply(surface);
        if self.refresh_on_next_frame {
            self.frame_pending = true;
        }
        base
    }
}
