//! Accessibility affordances: skip link, keyboard-navigation mode, and
//! labels for unlabelled carousel controls.
//!
//! Focus trapping lives with the modals ([`crate::modal`]); gallery tiles get
//! their role, tabindex and label when rendered ([`crate::markup`]).

use crate::layout::CarouselLayout;
use crate::page::Page;
use crate::types::{Control, Key};

pub const SKIP_TARGET: &str = "#home";
pub const SKIP_LABEL: &str = "Skip to main content";

#[derive(Debug, Default)]
pub struct Accessibility {
    keyboard_mode: bool,
}

impl Accessibility {
    pub fn init(carousel: &CarouselLayout, page: &mut impl Page) -> Self {
        page.install_skip_link(SKIP_TARGET, SKIP_LABEL);
        if !carousel.controls_labelled {
            if carousel.prev_button {
                page.set_aria_label(Control::PrevButton, "Previous slide");
            }
            if carousel.next_button {
                page.set_aria_label(Control::NextButton, "Next slide");
            }
        }
        Self::default()
    }

    pub fn keyboard_mode(&self) -> bool {
        self.keyboard_mode
    }

    /// Tab switches the page into keyboard-navigation styling.
    pub fn key(&mut self, key: Key, page: &mut impl Page) {
        if key == Key::Tab && !self.keyboard_mode {
            self.keyboard_mode = true;
            page.set_keyboard_mode(true);
        }
    }

    pub fn pointer_down(&mut self, page: &mut impl Page) {
        if self.keyboard_mode {
            self.keyboard_mode = false;
            page.set_keyboard_mode(false);
        }
    }
}
