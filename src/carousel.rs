//! Hero image carousel.
//!
//! An explicit two-state machine driven by the virtual clock:
//!
//! ```text
//!        show(i) / next / prev              ReleaseTransition (transition_ms)
//! Idle ─────────────────────────▶ Transitioning ───────────────────────────▶ Idle
//!                                   │  show / next / prev: rejected
//! ```
//!
//! Autoplay is a recurring `AutoplayTick` timer calling `next`. It is
//! suspended while any pause reason holds (pointer over the hero, focus
//! inside it, document hidden) and resumes when the last reason clears.
//! `start_autoplay` always cancels the previous timer first, so there is
//! never more than one.

use crate::config::CarouselConfig;
use crate::layout::CarouselLayout;
use crate::page::Page;
use crate::timers::{Task, TimerId, Timers};
use crate::types::{Key, Millis, SlideState};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    Hover,
    Focus,
    Hidden,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PauseReasons {
    pub hover: bool,
    pub focus: bool,
    pub hidden: bool,
}

impl PauseReasons {
    fn slot(&mut self, reason: PauseReason) -> &mut bool {
        match reason {
            PauseReason::Hover => &mut self.hover,
            PauseReason::Focus => &mut self.focus,
            PauseReason::Hidden => &mut self.hidden,
        }
    }

    pub fn any(&self) -> bool {
        self.hover || self.focus || self.hidden
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Transitioning(TimerId),
}

#[derive(Debug)]
pub struct Carousel {
    backgrounds: Vec<Option<String>>,
    indicators: usize,
    hero: bool,
    transition_ms: Millis,
    autoplay_ms: Millis,
    swipe_threshold: f64,
    current: usize,
    phase: Phase,
    autoplay: Option<TimerId>,
    paused: PauseReasons,
    touch_start: Option<(f64, f64)>,
}

impl Carousel {
    /// Returns `None` when the page has no slides.
    pub fn new(layout: &CarouselLayout, config: &CarouselConfig) -> Option<Self> {
        if layout.slides.is_empty() {
            return None;
        }
        Some(Self {
            backgrounds: layout.slides.iter().map(|s| s.background.clone()).collect(),
            indicators: layout.indicators,
            hero: layout.hero,
            transition_ms: config.transition_ms,
            autoplay_ms: config.autoplay_ms,
            swipe_threshold: config.swipe_threshold_px,
            current: 0,
            phase: Phase::Idle,
            autoplay: None,
            paused: PauseReasons::default(),
            touch_start: None,
        })
    }

    /// Kick off background loads, show the first slide and start autoplay.
    pub fn init(&mut self, page: &mut impl Page, timers: &mut Timers) {
        for (index, background) in self.backgrounds.iter().enumerate() {
            if let Some(url) = background {
                page.load_slide_image(index, url);
            }
        }
        self.show(0, page, timers);
        self.start_autoplay(timers);
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn slide_count(&self) -> usize {
        self.backgrounds.len()
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.phase, Phase::Transitioning(_))
    }

    pub fn is_autoplaying(&self) -> bool {
        self.autoplay.is_some()
    }

    pub fn paused(&self) -> PauseReasons {
        self.paused
    }

    /// Move to `index`. Rejected while a transition is running or when the
    /// index is out of range.
    pub fn show(&mut self, index: usize, page: &mut impl Page, timers: &mut Timers) -> bool {
        if self.is_transitioning() || index >= self.slide_count() {
            return false;
        }
        self.current = index;
        for i in 0..self.slide_count() {
            let state = match i.cmp(&index) {
                std::cmp::Ordering::Less => SlideState::Prior,
                std::cmp::Ordering::Equal => SlideState::Active,
                std::cmp::Ordering::Greater => SlideState::Clear,
            };
            page.set_slide_state(i, state);
        }
        for i in 0..self.indicators {
            page.set_indicator_active(i, i == index);
        }
        let release = timers.set_timeout(self.transition_ms, Task::ReleaseTransition);
        self.phase = Phase::Transitioning(release);
        tracing::trace!(slide = index, "slide shown");
        true
    }

    pub fn next(&mut self, page: &mut impl Page, timers: &mut Timers) -> bool {
        if self.is_transitioning() {
            return false;
        }
        let index = (self.current + 1) % self.slide_count();
        self.show(index, page, timers)
    }

    pub fn previous(&mut self, page: &mut impl Page, timers: &mut Timers) -> bool {
        if self.is_transitioning() {
            return false;
        }
        let count = self.slide_count();
        let index = (self.current + count - 1) % count;
        self.show(index, page, timers)
    }

    /// The transition lock timer fired.
    pub fn release_transition(&mut self) {
        self.phase = Phase::Idle;
    }

    pub fn autoplay_tick(&mut self, page: &mut impl Page, timers: &mut Timers) {
        self.next(page, timers);
    }

    pub fn start_autoplay(&mut self, timers: &mut Timers) {
        self.stop_autoplay(timers);
        self.autoplay = Some(timers.set_interval(self.autoplay_ms, Task::AutoplayTick));
    }

    pub fn stop_autoplay(&mut self, timers: &mut Timers) {
        if let Some(id) = self.autoplay.take() {
            timers.cancel(id);
        }
    }

    pub fn pause(&mut self, reason: PauseReason, timers: &mut Timers) {
        if reason != PauseReason::Hidden && !self.hero {
            return;
        }
        *self.paused.slot(reason) = true;
        self.stop_autoplay(timers);
    }

    pub fn resume(&mut self, reason: PauseReason, timers: &mut Timers) {
        if reason != PauseReason::Hidden && !self.hero {
            return;
        }
        *self.paused.slot(reason) = false;
        if !self.paused.any() {
            self.start_autoplay(timers);
        }
    }

    /// ArrowLeft / ArrowRight navigate unless a text input has focus.
    pub fn key(&mut self, key: Key, input_focused: bool, page: &mut impl Page, timers: &mut Timers) -> bool {
        if input_focused {
            return false;
        }
        match key {
            Key::ArrowLeft => self.previous(page, timers),
            Key::ArrowRight => self.next(page, timers),
            _ => false,
        }
    }

    pub fn touch_start(&mut self, x: f64, y: f64) {
        if self.hero {
            self.touch_start = Some((x, y));
        }
    }

    /// A horizontal swipe longer than the threshold navigates: a leftward
    /// swipe (start right of end) goes forward.
    pub fn touch_end(&mut self, x: f64, y: f64, page: &mut impl Page, timers: &mut Timers) -> bool {
        let Some((start_x, start_y)) = self.touch_start.take() else {
            return false;
        };
        let dx = start_x - x;
        let dy = start_y - y;
        if dx.abs() <= dy.abs() || dx.abs() <= self.swipe_threshold {
            return false;
        }
        if dx > 0.0 {
            self.next(page, timers)
        } else {
            self.previous(page, timers)
        }
    }

    pub fn slide_image_loaded(&mut self, index: usize, page: &mut impl Page) {
        if let Some(Some(url)) = self.backgrounds.get(index) {
            page.set_slide_background(index, url);
        }
    }

    pub fn slide_image_failed(&mut self, index: usize, page: &mut impl Page) {
        if let Some(Some(url)) = self.backgrounds.get(index) {
            tracing::warn!(slide = index, url = %url, "failed to load carousel image");
            page.mark_slide_error(index);
        }
    }

    /// Cancel the autoplay and transition timers.
    pub fn dispose(&mut self, timers: &mut Timers) {
        self.stop_autoplay(timers);
        if let Phase::Transitioning(id) = self.phase {
            timers.cancel(id);
        }
        self.phase = Phase::Idle;
    }
}
