//! The current-modal state machine and focus trap.
//!
//! [`ActiveModal`] is the single source of truth for which dialog is up.
//! Transitions:
//!
//! ```text
//! None ──open_gallery──▶ Gallery ──open_image──▶ Image { over_gallery }
//!  ▲                        │                         │
//!  └──────── close ─────────┴───────── close ─────────┘   (clears every marker)
//!
//! None ──open_dynamic──▶ SubmissionOptions ──open_dynamic──▶ EmailInstructions
//! ```
//!
//! Opening any modal other than the image viewer first closes whatever is up,
//! so at most one is ever marked active. The image viewer opened from the
//! gallery keeps the gallery marked beneath it; closing clears both.

use crate::page::Page;
use crate::timers::{Task, TimerId, Timers};
use crate::types::{FocusTarget, ModalKind, Millis};
use maud::Markup;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "modal", rename_all = "snake_case")]
pub enum ActiveModal {
    #[default]
    None,
    Gallery {
        category: String,
    },
    Image {
        src: String,
        alt: String,
        /// Category of the gallery this viewer was opened from, still marked beneath it.
        over_gallery: Option<String>,
    },
    SubmissionOptions,
    EmailInstructions,
}

impl ActiveModal {
    /// The topmost modal, which owns focus.
    pub fn kind(&self) -> Option<ModalKind> {
        match self {
            ActiveModal::None => None,
            ActiveModal::Gallery { .. } => Some(ModalKind::Gallery),
            ActiveModal::Image { .. } => Some(ModalKind::Image),
            ActiveModal::SubmissionOptions => Some(ModalKind::SubmissionOptions),
            ActiveModal::EmailInstructions => Some(ModalKind::EmailInstructions),
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, ActiveModal::None)
    }

    /// Every modal currently marked active, topmost last.
    pub fn marked(&self) -> Vec<ModalKind> {
        match self {
            ActiveModal::Image {
                over_gallery: Some(_),
                ..
            } => vec![ModalKind::Gallery, ModalKind::Image],
            other => other.kind().into_iter().collect(),
        }
    }
}

/// A gallery or viewer that actually opened, with the dialog it displaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opened {
    pub replaced: Option<ModalKind>,
}

#[derive(Debug)]
pub struct Modals {
    active: ActiveModal,
    scroll_locked: bool,
    focus_delay: Millis,
    pending_focus: Option<TimerId>,
}

impl Modals {
    pub fn new(focus_delay: Millis) -> Self {
        Self {
            active: ActiveModal::None,
            scroll_locked: false,
            focus_delay,
            pending_focus: None,
        }
    }

    pub fn active(&self) -> &ActiveModal {
        &self.active
    }

    pub fn scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Mark the gallery modal active, lock page scrolling, and queue focus
    /// onto the first grid tile when there is one. Returns the topmost modal
    /// it had to close first.
    pub fn open_gallery(
        &mut self,
        category: &str,
        focus_first_item: bool,
        page: &mut impl Page,
        timers: &mut Timers,
    ) -> Option<ModalKind> {
        let replaced = if matches!(self.active, ActiveModal::Gallery { .. }) {
            None
        } else {
            self.close(page, timers)
        };
        self.active = ActiveModal::Gallery {
            category: category.to_string(),
        };
        page.set_modal_active(ModalKind::Gallery, true);
        self.lock_scroll(page);
        if focus_first_item {
            self.queue_focus(FocusTarget::GalleryItem { index: 0 }, timers);
        } else {
            self.cancel_focus(timers);
        }
        replaced
    }

    /// Open the image viewer, on top of the gallery if it is showing.
    /// A submission dialog is closed first and returned.
    pub fn open_image(
        &mut self,
        src: &str,
        alt: &str,
        page: &mut impl Page,
        timers: &mut Timers,
    ) -> Option<ModalKind> {
        let (over_gallery, replaced) = match &self.active {
            ActiveModal::Gallery { category } => (Some(category.clone()), None),
            ActiveModal::Image { over_gallery, .. } => (over_gallery.clone(), None),
            ActiveModal::None => (None, None),
            ActiveModal::SubmissionOptions | ActiveModal::EmailInstructions => {
                (None, self.close(page, timers))
            }
        };
        self.active = ActiveModal::Image {
            src: src.to_string(),
            alt: alt.to_string(),
            over_gallery,
        };
        page.show_image(src, alt);
        page.set_modal_active(ModalKind::Image, true);
        self.queue_focus(
            FocusTarget::CloseButton {
                modal: ModalKind::Image,
            },
            timers,
        );
        replaced
    }

    /// Mount one of the submission dialogs, replacing whatever is open.
    pub fn open_dynamic(
        &mut self,
        kind: ModalKind,
        content: Markup,
        page: &mut impl Page,
        timers: &mut Timers,
    ) {
        debug_assert!(kind.is_dynamic());
        self.close(page, timers);
        page.mount_modal(kind, content);
        self.active = match kind {
            ModalKind::EmailInstructions => ActiveModal::EmailInstructions,
            _ => ActiveModal::SubmissionOptions,
        };
    }

    /// Close everything that is open and restore page scrolling.
    /// Returns the topmost modal that was closed.
    pub fn close(&mut self, page: &mut impl Page, timers: &mut Timers) -> Option<ModalKind> {
        let closed = self.active.kind();
        for kind in self.active.marked() {
            if kind.is_dynamic() {
                page.unmount_modal(kind);
            } else {
                page.set_modal_active(kind, false);
            }
        }
        self.active = ActiveModal::None;
        self.cancel_focus(timers);
        if self.scroll_locked {
            self.scroll_locked = false;
            page.set_scroll_locked(false);
        }
        closed
    }

    /// A click landed exactly on `kind`'s backdrop (not its content).
    pub fn backdrop_clicked(
        &mut self,
        kind: ModalKind,
        page: &mut impl Page,
        timers: &mut Timers,
    ) -> Option<ModalKind> {
        if self.active.marked().contains(&kind) {
            self.close(page, timers)
        } else {
            None
        }
    }

    /// Focus moved to an element inside `within` (or outside every modal).
    /// Redirects it into the active modal when it escaped. Returns true if redirected.
    pub fn focus_in(&mut self, within: Option<ModalKind>, page: &mut impl Page) -> bool {
        let Some(kind) = self.active.kind() else {
            return false;
        };
        if within == Some(kind) {
            return false;
        }
        page.focus(&FocusTarget::FirstFocusable { modal: kind });
        true
    }

    /// A queued focus move came due.
    pub fn focus_due(&mut self, target: &FocusTarget, page: &mut impl Page) {
        self.pending_focus = None;
        page.focus(target);
    }

    fn lock_scroll(&mut self, page: &mut impl Page) {
        if !self.scroll_locked {
            self.scroll_locked = true;
            page.set_scroll_locked(true);
        }
    }

    fn queue_focus(&mut self, target: FocusTarget, timers: &mut Timers) {
        self.cancel_focus(timers);
        self.pending_focus = Some(timers.set_timeout(self.focus_delay, Task::Focus(target)));
    }

    fn cancel_focus(&mut self, timers: &mut Timers) {
        if let Some(id) = self.pending_focus.take() {
            timers.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageOp, RecordingPage};
    use maud::html;

    fn fire_all(timers: &mut Timers, modals: &mut Modals, page: &mut RecordingPage) {
        while let Some((_, task)) = timers.pop_due(Millis::MAX) {
            if let Task::Focus(target) = task {
                modals.focus_due(&target, page);
            }
        }
    }

    #[test]
    fn gallery_locks_scroll_and_focuses_first_item_after_delay() {
        let (mut modals, mut page, mut timers) = (Modals::new(100), RecordingPage::new(), Timers::new());
        modals.open_gallery("abstract", true, &mut page, &mut timers);

        assert!(modals.scroll_locked());
        assert_eq!(timers.next_due(), Some(100));
        fire_all(&mut timers, &mut modals, &mut page);
        assert_eq!(
            page.ops().last(),
            Some(&PageOp::Focus {
                target: FocusTarget::GalleryItem { index: 0 }
            })
        );
    }

    #[test]
    fn image_over_gallery_keeps_both_marked_and_close_clears_both() {
        let (mut modals, mut page, mut timers) = (Modals::new(100), RecordingPage::new(), Timers::new());
        modals.open_gallery("abstract", true, &mut page, &mut timers);
        modals.open_image("a.jpg", "Abstract 1", &mut page, &mut timers);
        assert_eq!(
            modals.active().marked(),
            vec![ModalKind::Gallery, ModalKind::Image]
        );

        page.take_ops();
        assert_eq!(modals.close(&mut page, &mut timers), Some(ModalKind::Image));
        assert_eq!(
            page.ops(),
            &[
                PageOp::SetModalActive {
                    modal: ModalKind::Gallery,
                    active: false
                },
                PageOp::SetModalActive {
                    modal: ModalKind::Image,
                    active: false
                },
                PageOp::SetScrollLocked { locked: false },
            ]
        );
        assert!(!modals.active().is_open());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn closing_before_focus_delay_cancels_focus() {
        let (mut modals, mut page, mut timers) = (Modals::new(100), RecordingPage::new(), Timers::new());
        modals.open_gallery("abstract", true, &mut page, &mut timers);
        modals.close(&mut page, &mut timers);
        fire_all(&mut timers, &mut modals, &mut page);
        assert_eq!(page.count(|op| matches!(op, PageOp::Focus { .. })), 0);
    }

    #[test]
    fn backdrop_of_inactive_modal_is_ignored() {
        let (mut modals, mut page, mut timers) = (Modals::new(100), RecordingPage::new(), Timers::new());
        modals.open_gallery("abstract", true, &mut page, &mut timers);
        assert_eq!(
            modals.backdrop_clicked(ModalKind::Image, &mut page, &mut timers),
            None
        );
        assert!(modals.active().is_open());
        assert_eq!(
            modals.backdrop_clicked(ModalKind::Gallery, &mut page, &mut timers),
            Some(ModalKind::Gallery)
        );
        assert!(!modals.active().is_open());
    }

    #[test]
    fn focus_outside_active_modal_is_redirected() {
        let (mut modals, mut page, mut timers) = (Modals::new(100), RecordingPage::new(), Timers::new());
        assert!(!modals.focus_in(None, &mut page));

        modals.open_gallery("abstract", true, &mut page, &mut timers);
        page.take_ops();
        assert!(!modals.focus_in(Some(ModalKind::Gallery), &mut page));
        assert!(modals.focus_in(None, &mut page));
        assert_eq!(
            page.ops(),
            &[PageOp::Focus {
                target: FocusTarget::FirstFocusable {
                    modal: ModalKind::Gallery
                }
            }]
        );
    }

    #[test]
    fn topmost_viewer_owns_focus() {
        let (mut modals, mut page, mut timers) = (Modals::new(100), RecordingPage::new(), Timers::new());
        modals.open_gallery("abstract", true, &mut page, &mut timers);
        modals.open_image("a.jpg", "Abstract 1", &mut page, &mut timers);
        assert!(!modals.focus_in(Some(ModalKind::Image), &mut page));
        assert!(modals.focus_in(Some(ModalKind::Gallery), &mut page));
    }

    #[test]
    fn dynamic_modals_replace_each_other() {
        let (mut modals, mut page, mut timers) = (Modals::new(100), RecordingPage::new(), Timers::new());
        modals.open_dynamic(
            ModalKind::SubmissionOptions,
            html! { p { "choose" } },
            &mut page,
            &mut timers,
        );
        modals.open_dynamic(
            ModalKind::EmailInstructions,
            html! { p { "steps" } },
            &mut page,
            &mut timers,
        );
        assert_eq!(modals.active(), &ActiveModal::EmailInstructions);
        assert!(page.ops().contains(&PageOp::UnmountModal {
            modal: ModalKind::SubmissionOptions
        }));
        // Submission dialogs never lock scrolling.
        assert_eq!(page.count(|op| matches!(op, PageOp::SetScrollLocked { .. })), 0);
    }

    #[test]
    fn opening_gallery_or_viewer_reports_replaced_dialog() {
        let (mut modals, mut page, mut timers) = (Modals::new(100), RecordingPage::new(), Timers::new());
        modals.open_dynamic(
            ModalKind::SubmissionOptions,
            html! { p { "choose" } },
            &mut page,
            &mut timers,
        );
        assert_eq!(
            modals.open_gallery("abstract", true, &mut page, &mut timers),
            Some(ModalKind::SubmissionOptions)
        );
        assert_eq!(modals.open_gallery("watercolor", true, &mut page, &mut timers), None);

        modals.open_dynamic(
            ModalKind::EmailInstructions,
            html! { p { "steps" } },
            &mut page,
            &mut timers,
        );
        assert_eq!(
            modals.open_image("a.jpg", "Abstract 1", &mut page, &mut timers),
            Some(ModalKind::EmailInstructions)
        );
        assert!(page.ops().contains(&PageOp::UnmountModal {
            modal: ModalKind::EmailInstructions
        }));
    }
}
