//! Runtime unit calculation against a recorded page.

use std::time::Duration;

use proptest::prelude::*;

use scoperem::flexible::{Dispatch, unit_value};
use scoperem::{
    BreakpointTable, Coalesce, Flexible, FlexibleOptions, Surface, Target, Trigger, compute_scale,
};

/// A page that records every style write in order.
struct RecordingPage {
    width: f64,
    log: Vec<String>,
}

impl RecordingPage {
    fn new(width: f64) -> Self {
        Self {
            width,
            log: Vec::new(),
        }
    }

    fn writes(&self) -> Vec<String> {
        self.log.clone()
    }
}

impl Surface for RecordingPage {
    type Element = u32;

    fn viewport_width(&self) -> f64 {
        self.width
    }

    fn set_font_size(&mut self, element: Option<&u32>, value: &str) {
        self.log.push(format!("{element:?} font-size {value}"));
    }

    fn set_property(&mut self, element: Option<&u32>, name: &str, value: &str) {
        self.log.push(format!("{element:?} {name} {value}"));
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn scoped(coalesce: Coalesce) -> Flexible<u32> {
    Flexible::new(FlexibleOptions {
        targets: vec![Target::scope()],
        coalesce,
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn test_desktop_width_without_layouts() {
    let flexible = scoped(Coalesce::Immediate);
    let mut page = RecordingPage::new(1920.0);
    flexible.apply(&mut page);
    assert_eq!(page.writes(), vec!["None --local-scope-rem 19.2px"]);
}

#[test]
fn test_mobile_design_scaled_to_desktop_reference() {
    let table = BreakpointTable::new(vec![768.0], Some(vec![375.0, 1920.0]), None).unwrap();
    let scale = table.scale(375.0);
    assert_eq!(scale, 1920.0 / 375.0);
    assert!((unit_value(375.0, scale) - 19.2).abs() < 1e-9);

    // Above the last breakpoint the reference layout is used as is
    assert_eq!(table.scale(1920.0), 1.0);
    assert_eq!(unit_value(1920.0, table.scale(1920.0)), 19.2);
}

#[test]
fn test_target_on_element() {
    let flexible = Flexible::new(FlexibleOptions {
        targets: vec![Target::root_font_size(), Target::property("--custom-rem").on(7)],
        ..Default::default()
    })
    .unwrap();
    assert_eq!(flexible.targets().len(), 2);
    assert_eq!(flexible.table().breakpoints(), &[768.0]);

    let mut page = RecordingPage::new(1000.0);
    flexible.apply(&mut page);
    assert_eq!(
        page.writes(),
        vec!["None font-size 10px", "Some(7) --custom-rem 10px"]
    );
}

#[test]
fn test_resize_is_immediate_by_default() {
    let mut flexible = scoped(Coalesce::Immediate);
    let mut page = RecordingPage::new(800.0);
    assert_eq!(flexible.handle(Trigger::Resize, ms(0), &mut page), Dispatch::Applied(8.0));
    page.width = 1200.0;
    assert_eq!(
        flexible.handle(Trigger::OrientationChange, ms(1), &mut page),
        Dispatch::Applied(12.0)
    );
    assert_eq!(page.writes().len(), 2);
}

#[test]
fn test_debounced_resize_burst_writes_once() {
    let mut flexible = scoped(Coalesce::Debounce(ms(100)));
    let mut page = RecordingPage::new(800.0);

    for (step, width) in [900.0, 1000.0, 1100.0].into_iter().enumerate() {
        page.width = width;
        let now = ms(step as u64 * 30);
        assert!(matches!(
            flexible.handle(Trigger::Resize, now, &mut page),
            Dispatch::Deferred(_)
        ));
    }
    assert!(page.writes().is_empty());

    assert_eq!(flexible.poll(ms(100), &mut page), None);
    assert_eq!(flexible.next_deadline(), Some(ms(160)));
    assert_eq!(flexible.poll(ms(160), &mut page), Some(11.0));
    assert_eq!(page.writes(), vec!["None --local-scope-rem 11px"]);
    assert_eq!(flexible.next_deadline(), None);
}

#[test]
fn test_load_runs_now_and_drops_pending_resize() {
    let mut flexible = scoped(Coalesce::Debounce(ms(100)));
    let mut page = RecordingPage::new(600.0);

    flexible.handle(Trigger::Resize, ms(0), &mut page);
    assert_eq!(flexible.handle(Trigger::Load, ms(10), &mut page), Dispatch::Applied(6.0));
    assert_eq!(flexible.next_deadline(), None);
    assert_eq!(flexible.poll(ms(500), &mut page), None);
    assert_eq!(page.writes().len(), 1);
}

#[test]
fn test_refresh_on_next_frame() {
    let mut flexible: Flexible<u32> = Flexible::new(FlexibleOptions {
        refresh_on_next_frame: true,
        ..Default::default()
    })
    .unwrap();
    let mut page = RecordingPage::new(1000.0);

    flexible.handle(Trigger::Load, ms(0), &mut page);
    assert!(flexible.frame_requested());

    // A scrollbar appeared after the first layout
    page.width = 985.0;
    assert_eq!(flexible.on_animation_frame(&mut page), Some(9.85));
    assert!(!flexible.frame_requested());
    assert_eq!(flexible.on_animation_frame(&mut page), None);
    assert_eq!(page.writes(), vec!["None font-size 10px", "None font-size 9.85px"]);
}

#[test]
fn test_invalid_breakpoints_fail_construction() {
    let result: scoperem::Result<Flexible<u32>> = Flexible::new(FlexibleOptions {
        breakpoints: vec![1200.0, 768.0],
        ..Default::default()
    });
    assert!(result.is_err());
}

fn ascending_breakpoints() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::btree_set(100u32..4000, 0..5)
        .prop_map(|set| set.into_iter().map(f64::from).collect())
}

proptest! {
    #[test]
    fn prop_scale_uses_first_breakpoint_at_or_above(
        breakpoints in ascending_breakpoints(),
        width in 1u32..5000,
        basic in 100u32..3000,
        seed in prop::collection::vec(100u32..3000, 6),
    ) {
        let width = f64::from(width);
        let basic = f64::from(basic);
        let layouts: Vec<f64> = seed[..breakpoints.len() + 1].iter().copied().map(f64::from).collect();

        let index = breakpoints
            .iter()
            .position(|&b| b >= width)
            .unwrap_or(breakpoints.len());
        prop_assert_eq!(compute_scale(width, &breakpoints, &layouts, basic), basic / layouts[index]);
    }

    #[test]
    fn prop_scale_is_one_on_length_mismatch(
        breakpoints in ascending_breakpoints(),
        extra in 2usize..4,
        width in 1u32..5000,
    ) {
        let layouts = vec![375.0; breakpoints.len() + extra];
        prop_assert_eq!(compute_scale(f64::from(width), &breakpoints, &layouts, 1920.0), 1.0);
    }

    #[test]
    fn prop_unscaled_unit_is_one_percent_of_width(width in 1u32..10000) {
        let flexible = scoped(Coalesce::Immediate);
        let mut page = RecordingPage::new(f64::from(width));
        prop_assert_eq!(flexible.apply(&mut page), f64::from(width) / 100.0);
    }
}
