//! Section navigation: anchor scrolling, active-link tracking, navbar
//! auto-hide, and the back-to-top control.
//!
//! Scroll handling is throttled (leading edge). Because a throttle drops the
//! calls inside its window, the final resting position is applied once more
//! when scrolling settles (see [`Navigation::apply`]), so highlighting never
//! lags behind the last scroll event.

use crate::config::NavigationConfig;
use crate::layout::{NavLayout, Section};
use crate::page::Page;
use crate::throttle::Throttle;
use crate::types::Millis;

#[derive(Debug)]
pub struct Navigation {
    navbar_height: f64,
    links: Vec<String>,
    sections: Vec<Section>,
    look_ahead: f64,
    noise: f64,
    hide_after: f64,
    throttle: Throttle,
    active: Option<String>,
    navbar_hidden: bool,
    last_y: f64,
}

impl Navigation {
    /// Returns `None` when the page has no in-page nav links.
    pub fn new(layout: &NavLayout, config: &NavigationConfig) -> Option<Self> {
        if layout.links.is_empty() {
            return None;
        }
        Some(Self {
            navbar_height: layout.navbar_height,
            links: layout.links.clone(),
            sections: layout.sections.clone(),
            look_ahead: config.look_ahead_px,
            noise: config.noise_px,
            hide_after: config.hide_after_px,
            throttle: Throttle::new(config.throttle_ms),
            active: None,
            navbar_hidden: false,
            last_y: 0.0,
        })
    }

    /// Section whose link is highlighted.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn navbar_hidden(&self) -> bool {
        self.navbar_hidden
    }

    /// Smooth-scroll to the section a nav link points at (`#id` or `id`),
    /// leaving room for the fixed navbar, and record the fragment.
    pub fn link_clicked(&mut self, target: &str, page: &mut impl Page) -> bool {
        let id = target.trim_start_matches('#');
        let Some(section) = self.sections.iter().find(|s| s.id == id) else {
            tracing::debug!(target, "nav link target not on page");
            return false;
        };
        let top = (section.top - self.navbar_height).max(0.0);
        page.scroll_to(top);
        page.push_fragment(&format!("#{id}"));
        true
    }

    /// Throttled scroll handler.
    pub fn scrolled(&mut self, y: f64, now: Millis, page: &mut impl Page) {
        if self.throttle.try_acquire(now) {
            self.apply(y, page);
        }
    }

    /// Update highlighting and navbar visibility for scroll offset `y`.
    pub fn apply(&mut self, y: f64, page: &mut impl Page) {
        self.update_active(y, page);
        self.update_navbar(y, page);
    }

    fn update_active(&mut self, y: f64, page: &mut impl Page) {
        let marker = y + self.look_ahead;
        // Later sections win when ranges overlap.
        let Some(section) = self.sections.iter().rev().find(|s| s.contains(marker)) else {
            return;
        };
        let next = self
            .links
            .iter()
            .find(|link| **link == section.id)
            .cloned();
        if next == self.active {
            return;
        }
        if let Some(old) = self.active.take() {
            page.set_nav_link_active(&old, false);
        }
        if let Some(new) = &next {
            page.set_nav_link_active(new, true);
        }
        self.active = next;
    }

    fn update_navbar(&mut self, y: f64, page: &mut impl Page) {
        if (y - self.last_y).abs() <= self.noise {
            return;
        }
        let hide = y > self.last_y && y > self.hide_after;
        if hide != self.navbar_hidden {
            self.navbar_hidden = hide;
            page.set_navbar_hidden(hide);
        }
        self.last_y = y;
    }
}

/// Floating control that returns to the top of the page.
#[derive(Debug)]
pub struct BackToTop {
    threshold: f64,
    throttle: Throttle,
    visible: bool,
}

impl BackToTop {
    pub fn new(config: &NavigationConfig) -> Self {
        Self {
            threshold: config.back_to_top_px,
            throttle: Throttle::new(config.throttle_ms),
            visible: false,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn scrolled(&mut self, y: f64, now: Millis, page: &mut impl Page) {
        if self.throttle.try_acquire(now) {
            self.apply(y, page);
        }
    }

    pub fn apply(&mut self, y: f64, page: &mut impl Page) {
        let visible = y > self.threshold;
        if visible != self.visible {
            self.visible = visible;
            page.set_back_to_top_visible(visible);
        }
    }

    pub fn clicked(&self, page: &mut impl Page) {
        page.scroll_to(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageOp, RecordingPage};

    fn layout() -> NavLayout {
        let section = |id: &str, top: f64, height: f64| Section {
            id: id.to_string(),
            top,
            height,
        };
        NavLayout {
            navbar_height: 70.0,
            links: vec!["home".to_string(), "about".to_string(), "contact".to_string()],
            sections: vec![
                section("home", 0.0, 600.0),
                section("about", 600.0, 400.0),
                section("gallery", 1000.0, 500.0),
                section("contact", 1500.0, 800.0),
            ],
        }
    }

    fn nav() -> Navigation {
        Navigation::new(&layout(), &NavigationConfig::default()).unwrap()
    }

    #[test]
    fn no_links_disables_navigation() {
        let layout = NavLayout {
            links: vec![],
            ..layout()
        };
        assert!(Navigation::new(&layout, &NavigationConfig::default()).is_none());
    }

    #[test]
    fn link_scrolls_below_navbar_and_records_fragment() {
        let mut nav = nav();
        let mut page = RecordingPage::new();
        assert!(nav.link_clicked("#about", &mut page));
        assert_eq!(
            page.ops(),
            &[
                PageOp::ScrollTo { top: 530.0 },
                PageOp::PushFragment {
                    fragment: "#about".to_string()
                },
            ]
        );
        assert!(!nav.link_clicked("#missing", &mut page));
    }

    #[test]
    fn link_to_first_section_clamps_at_top() {
        let mut nav = nav();
        let mut page = RecordingPage::new();
        nav.link_clicked("home", &mut page);
        assert_eq!(
            page.ops()[0],
            PageOp::ScrollTo { top: 0.0 }
        );
    }

    #[test]
    fn active_link_uses_look_ahead() {
        let mut nav = nav();
        let mut page = RecordingPage::new();
        nav.apply(449.0, &mut page);
        assert_eq!(nav.active(), Some("home"));
        nav.apply(450.0, &mut page);
        assert_eq!(nav.active(), Some("about"));
        assert!(page.ops().contains(&PageOp::SetNavLinkActive {
            section: "home".to_string(),
            active: false
        }));
    }

    #[test]
    fn section_without_link_clears_highlight() {
        let mut nav = nav();
        let mut page = RecordingPage::new();
        nav.apply(700.0, &mut page);
        assert_eq!(nav.active(), Some("about"));
        nav.apply(1000.0, &mut page);
        assert_eq!(nav.active(), None);
    }

    #[test]
    fn unchanged_section_emits_nothing() {
        let mut nav = nav();
        let mut page = RecordingPage::new();
        nav.apply(0.0, &mut page);
        page.take_ops();
        nav.apply(5.0, &mut page);
        assert!(page.ops().is_empty());
    }

    #[test]
    fn overlapping_sections_prefer_the_later_one() {
        let mut layout = layout();
        layout.sections[1].height = 2000.0;
        let mut nav = Navigation::new(&layout, &NavigationConfig::default()).unwrap();
        let mut page = RecordingPage::new();
        nav.apply(1500.0, &mut page);
        assert_eq!(nav.active(), Some("contact"));
    }

    #[test]
    fn navbar_hides_scrolling_down_past_threshold() {
        let mut nav = nav();
        let mut page = RecordingPage::new();
        nav.apply(50.0, &mut page);
        assert!(!nav.navbar_hidden());
        nav.apply(150.0, &mut page);
        assert!(nav.navbar_hidden());
        nav.apply(120.0, &mut page);
        assert!(!nav.navbar_hidden());
    }

    #[test]
    fn small_movements_are_noise() {
        let mut nav = nav();
        let mut page = RecordingPage::new();
        nav.apply(200.0, &mut page);
        assert!(nav.navbar_hidden());
        // Within 10px of the last recorded position: ignored, and the
        // reference point does not move.
        nav.apply(195.0, &mut page);
        nav.apply(191.0, &mut page);
        assert!(nav.navbar_hidden());
        nav.apply(189.0, &mut page);
        assert!(!nav.navbar_hidden());
    }

    #[test]
    fn scroll_handler_is_throttled() {
        let mut nav = nav();
        let mut page = RecordingPage::new();
        nav.scrolled(700.0, 0, &mut page);
        nav.scrolled(1600.0, 50, &mut page);
        assert_eq!(nav.active(), Some("about"));
        nav.scrolled(1600.0, 100, &mut page);
        assert_eq!(nav.active(), Some("contact"));
    }

    #[test]
    fn back_to_top_toggles_past_threshold() {
        let mut btn = BackToTop::new(&NavigationConfig::default());
        let mut page = RecordingPage::new();
        btn.scrolled(300.0, 0, &mut page);
        assert!(!btn.visible());
        btn.scrolled(301.0, 100, &mut page);
        assert!(btn.visible());
        btn.scrolled(0.0, 150, &mut page);
        assert!(btn.visible());
        btn.apply(0.0, &mut page);
        assert!(!btn.visible());
        assert_eq!(
            page.count(|op| matches!(op, PageOp::SetBackToTopVisible { .. })),
            2
        );

        btn.clicked(&mut page);
        assert_eq!(
            page.ops().last(),
            Some(&PageOp::ScrollTo { top: 0.0 })
        );
    }
}
