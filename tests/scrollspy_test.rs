use site_kit::core::scroll_nav::scrollspy::{locate, SpyDecision};
use site_kit::core::PageEvent;
use site_kit::{MemoryDocument, SiteConfig, SiteRuntime};
use std::time::Duration;

fn scroll(runtime: &mut SiteRuntime<MemoryDocument>, y: f64) {
    runtime.document_mut().set_scroll_y(y);
    if runtime.dispatch(PageEvent::Scroll, Duration::ZERO).needs_animation_frame {
        runtime.on_animation_frame();
    }
}

fn active(runtime: &SiteRuntime<MemoryDocument>) -> Option<String> {
    runtime.nav().unwrap().active().current_href.clone()
}

#[test]
fn test_locate_picks_last_section_above_offset() {
    let tops = [100.0, 500.0, 900.0];
    assert_eq!(locate(600.0, 110.0, &tops), SpyDecision::Section(1));
    assert_eq!(locate(2000.0, 110.0, &tops), SpyDecision::Section(2));
}

#[test]
fn test_page_top_marks_home_link() {
    let mut runtime = SiteRuntime::boot(MemoryDocument::default(), SiteConfig::default(), Duration::ZERO);
    assert_eq!(active(&runtime).as_deref(), Some("index.html"));

    scroll(&mut runtime, 1450.0);
    assert_eq!(active(&runtime).as_deref(), Some("#service-section"));

    scroll(&mut runtime, 0.0);
    assert_eq!(active(&runtime).as_deref(), Some("index.html"));
}

#[test]
fn test_exactly_one_link_is_active() {
    let mut runtime = SiteRuntime::boot(MemoryDocument::default(), SiteConfig::default(), Duration::ZERO);
    scroll(&mut runtime, 3100.0);

    let active_links = runtime.document().with_class("active");
    assert_eq!(active_links.len(), 1);
    assert_eq!(active(&runtime).as_deref(), Some("#team-section"));
}

#[test]
fn test_burst_of_scrolls_evaluates_once_per_frame() {
    let mut runtime = SiteRuntime::boot(MemoryDocument::default(), SiteConfig::default(), Duration::ZERO);

    runtime.document_mut().set_scroll_y(700.0);
    let first = runtime.dispatch(PageEvent::Scroll, Duration::ZERO);
    runtime.document_mut().set_scroll_y(2300.0);
    let second = runtime.dispatch(PageEvent::Scroll, Duration::ZERO);

    assert!(first.needs_animation_frame);
    assert!(!second.needs_animation_frame);

    // the frame reads the position at the time it runs
    runtime.on_animation_frame();
    assert_eq!(active(&runtime).as_deref(), Some("#testimonals-section"));
    assert!(!runtime.nav().unwrap().frame_pending());
}
