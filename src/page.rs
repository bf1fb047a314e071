//! The page seam: every visual effect of the behavior layer goes through [`Page`].
//!
//! Controllers own state and decide *what* the page should look like; a
//! `Page` implementation decides *how* (class toggles, style writes, DOM
//! insertion). Keeping the two apart means carousel, gallery and form logic
//! can be driven and asserted without a browser.
//!
//! [`RecordingPage`] is the headless implementation: it records every call as
//! a [`PageOp`] and backs the `simulate` command and the tests. A browser
//! host implements the trait over the real DOM.
//!
//! Methods map onto the DOM contract: slide/indicator classes, the navbar
//! transform, `#galleryModal`/`#imageModal` active classes, form field
//! `error` classes and `.error-message` elements, observers, and so on.
//! Hosts silently ignore calls for elements they don't have.

use crate::form::Field;
use crate::reveal::WatchOptions;
use crate::types::{
    Control, FocusTarget, ImageState, MemoryUsage, ModalKind, NotificationKind, RevealState,
    SlideState,
};
use maud::Markup;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    #[error("unsupported by this page: {0}")]
    Unsupported(String),
    #[error("page operation failed: {0}")]
    Failed(String),
}

/// View operations the behavior layer performs on the page.
pub trait Page {
    // --- carousel -----------------------------------------------------------

    /// Start loading a slide's background image off-screen. The host reports
    /// completion with `Event::SlideImageLoaded` / `Event::SlideImageFailed`.
    fn load_slide_image(&mut self, index: usize, url: &str);
    /// Apply a loaded image as the slide background (cover, centered).
    fn set_slide_background(&mut self, index: usize, url: &str);
    fn mark_slide_error(&mut self, index: usize);
    fn set_slide_state(&mut self, index: usize, state: SlideState);
    fn set_indicator_active(&mut self, index: usize, active: bool);

    // --- navigation ---------------------------------------------------------

    /// Smooth-scroll the window to `top`.
    fn scroll_to(&mut self, top: f64);
    /// Update the address-bar fragment without scrolling.
    fn push_fragment(&mut self, fragment: &str);
    fn set_nav_link_active(&mut self, section: &str, active: bool);
    fn set_navbar_hidden(&mut self, hidden: bool);
    fn set_back_to_top_visible(&mut self, visible: bool);

    // --- gallery and modals -------------------------------------------------

    /// Replace the gallery modal title and grid contents.
    fn render_gallery(&mut self, title: &str, grid: Markup);
    /// Point the image viewer at a single artwork.
    fn show_image(&mut self, src: &str, alt: &str);
    /// Toggle the `active` class of a static modal.
    fn set_modal_active(&mut self, modal: ModalKind, active: bool);
    /// Insert a dynamic modal overlay.
    fn mount_modal(&mut self, modal: ModalKind, content: Markup);
    /// Remove a dynamic modal overlay.
    fn unmount_modal(&mut self, modal: ModalKind);
    fn set_scroll_locked(&mut self, locked: bool);
    fn focus(&mut self, target: &FocusTarget);

    // --- commission form ----------------------------------------------------

    /// Show (`Some`) or clear (`None`) a field's inline error.
    fn set_field_error(&mut self, field: Field, message: Option<&str>);
    fn set_submit_busy(&mut self, busy: bool, label: &str);
    fn reset_form(&mut self);
    /// Open a URL in a new browsing context.
    fn open_url(&mut self, url: &str);

    // --- notifications and loader -------------------------------------------

    fn show_notification(&mut self, id: u64, kind: NotificationKind, content: Markup);
    fn begin_notification_exit(&mut self, id: u64);
    fn remove_notification(&mut self, id: u64);
    fn show_loader(&mut self, content: Markup);
    fn fade_loader(&mut self);
    fn remove_loader(&mut self);

    // --- observers and images -----------------------------------------------

    fn observe(&mut self, observer: &str, options: &WatchOptions, target: &str);
    fn unobserve(&mut self, observer: &str, target: &str);
    fn disconnect(&mut self, observer: &str);
    fn set_reveal_state(&mut self, target: &str, state: RevealState);
    fn set_image_loading(&mut self, target: &str, loading: bool);
    fn set_image_source(&mut self, target: &str, src: &str);
    fn set_image_state(&mut self, target: &str, state: ImageState);
    fn set_image_alt(&mut self, target: &str, alt: &str);
    fn preload_image(&mut self, url: &str);

    // --- accessibility ------------------------------------------------------

    fn install_skip_link(&mut self, href: &str, label: &str);
    fn set_keyboard_mode(&mut self, enabled: bool);
    fn set_aria_label(&mut self, control: Control, label: &str);

    // --- platform -----------------------------------------------------------

    /// Subscribe to long-task entries, reported back as `Event::LongTask`.
    fn observe_long_tasks(&mut self) -> Result<(), PageError>;
    fn memory_usage(&self) -> Option<MemoryUsage>;
    /// Register the offline worker; the outcome comes back as
    /// `Event::ServiceWorkerRegistered`.
    fn register_service_worker(&mut self, path: &str);
}

/// One recorded [`Page`] call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PageOp {
    LoadSlideImage { index: usize, url: String },
    SetSlideBackground { index: usize, url: String },
    MarkSlideError { index: usize },
    SetSlideState { index: usize, state: SlideState },
    SetIndicatorActive { index: usize, active: bool },
    ScrollTo { top: f64 },
    PushFragment { fragment: String },
    SetNavLinkActive { section: String, active: bool },
    SetNavbarHidden { hidden: bool },
    SetBackToTopVisible { visible: bool },
    RenderGallery { title: String, grid: String },
    ShowImage { src: String, alt: String },
    SetModalActive { modal: ModalKind, active: bool },
    MountModal { modal: ModalKind, content: String },
    UnmountModal { modal: ModalKind },
    SetScrollLocked { locked: bool },
    Focus { target: FocusTarget },
    SetFieldError { field: Field, message: Option<String> },
    SetSubmitBusy { busy: bool, label: String },
    ResetForm,
    OpenUrl { url: String },
    ShowNotification { id: u64, kind: NotificationKind, content: String },
    BeginNotificationExit { id: u64 },
    RemoveNotification { id: u64 },
    ShowLoader { content: String },
    FadeLoader,
    RemoveLoader,
    Observe { observer: String, options: WatchOptions, target: String },
    Unobserve { observer: String, target: String },
    Disconnect { observer: String },
    SetRevealState { target: String, state: RevealState },
    SetImageLoading { target: String, loading: bool },
    SetImageSource { target: String, src: String },
    SetImageState { target: String, state: ImageState },
    SetImageAlt { target: String, alt: String },
    PreloadImage { url: String },
    InstallSkipLink { href: String, label: String },
    SetKeyboardMode { enabled: bool },
    SetAriaLabel { control: Control, label: String },
    ObserveLongTasks { attached: bool },
    RegisterServiceWorker { path: String },
}

/// Headless page that records every operation.
///
/// Platform capabilities are plain fields so a session can simulate
/// environments without long-task support or with a given heap size.
#[derive(Debug)]
pub struct RecordingPage {
    ops: Vec<PageOp>,
    pub long_tasks_supported: bool,
    pub memory: Option<MemoryUsage>,
}

impl Default for RecordingPage {
    fn default() -> Self {
        Self {
            ops: Vec::new(),
            long_tasks_supported: true,
            memory: None,
        }
    }
}

impl RecordingPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[PageOp] {
        &self.ops
    }

    /// Remove and return everything recorded so far.
    pub fn take_ops(&mut self) -> Vec<PageOp> {
        std::mem::take(&mut self.ops)
    }

    /// URLs passed to [`Page::open_url`], in order.
    pub fn opened_urls(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PageOp::OpenUrl { url } => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&PageOp) -> bool) -> usize {
        self.ops.iter().filter(|op| predicate(op)).count()
    }

    fn record(&mut self, op: PageOp) {
        self.ops.push(op);
    }
}

impl Page for RecordingPage {
    fn load_slide_image(&mut self, index: usize, url: &str) {
        self.record(PageOp::LoadSlideImage {
            index,
            url: url.to_string(),
        });
    }

    fn set_slide_background(&mut self, index: usize, url: &str) {
        self.record(PageOp::SetSlideBackground {
            index,
            url: url.to_string(),
        });
    }

    fn mark_slide_error(&mut self, index: usize) {
        self.record(PageOp::MarkSlideError { index });
    }

    fn set_slide_state(&mut self, index: usize, state: SlideState) {
        self.record(PageOp::SetSlideState { index, state });
    }

    fn set_indicator_active(&mut self, index: usize, active: bool) {
        self.record(PageOp::SetIndicatorActive { index, active });
    }

    fn scroll_to(&mut self, top: f64) {
        self.record(PageOp::ScrollTo { top });
    }

    fn push_fragment(&mut self, fragment: &str) {
        self.record(PageOp::PushFragment {
            fragment: fragment.to_string(),
        });
    }

    fn set_nav_link_active(&mut self, section: &str, active: bool) {
        self.record(PageOp::SetNavLinkActive {
            section: section.to_string(),
            active,
        });
    }

    fn set_navbar_hidden(&mut self, hidden: bool) {
        self.record(PageOp::SetNavbarHidden { hidden });
    }

    fn set_back_to_top_visible(&mut self, visible: bool) {
        self.record(PageOp::SetBackToTopVisible { visible });
    }

    fn render_gallery(&mut self, title: &str, grid: Markup) {
        self.record(PageOp::RenderGallery {
            title: title.to_string(),
            grid: grid.into_string(),
        });
    }

    fn show_image(&mut self, src: &str, alt: &str) {
        self.record(PageOp::ShowImage {
            src: src.to_string(),
            alt: alt.to_string(),
        });
    }

    fn set_modal_active(&mut self, modal: ModalKind, active: bool) {
        self.record(PageOp::SetModalActive { modal, active });
    }

    fn mount_modal(&mut self, modal: ModalKind, content: Markup) {
        self.record(PageOp::MountModal {
            modal,
            content: content.into_string(),
        });
    }

    fn unmount_modal(&mut self, modal: ModalKind) {
        self.record(PageOp::UnmountModal { modal });
    }

    fn set_scroll_locked(&mut self, locked: bool) {
        self.record(PageOp::SetScrollLocked { locked });
    }

    fn focus(&mut self, target: &FocusTarget) {
        self.record(PageOp::Focus {
            target: target.clone(),
        });
    }

    fn set_field_error(&mut self, field: Field, message: Option<&str>) {
        self.record(PageOp::SetFieldError {
            field,
            message: message.map(str::to_string),
        });
    }

    fn set_submit_busy(&mut self, busy: bool, label: &str) {
        self.record(PageOp::SetSubmitBusy {
            busy,
            label: label.to_string(),
        });
    }

    fn reset_form(&mut self) {
        self.record(PageOp::ResetForm);
    }

    fn open_url(&mut self, url: &str) {
        self.record(PageOp::OpenUrl {
            url: url.to_string(),
        });
    }

    fn show_notification(&mut self, id: u64, kind: NotificationKind, content: Markup) {
        self.record(PageOp::ShowNotification {
            id,
            kind,
            content: content.into_string(),
        });
    }

    fn begin_notification_exit(&mut self, id: u64) {
        self.record(PageOp::BeginNotificationExit { id });
    }

    fn remove_notification(&mut self, id: u64) {
        self.record(PageOp::RemoveNotification { id });
    }

    fn show_loader(&mut self, content: Markup) {
        self.record(PageOp::ShowLoader {
            content: content.into_string(),
        });
    }

    fn fade_loader(&mut self) {
        self.record(PageOp::FadeLoader);
    }

    fn remove_loader(&mut self) {
        self.record(PageOp::RemoveLoader);
    }

    fn observe(&mut self, observer: &str, options: &WatchOptions, target: &str) {
        self.record(PageOp::Observe {
            observer: observer.to_string(),
            options: options.clone(),
            target: target.to_string(),
        });
    }

    fn unobserve(&mut self, observer: &str, target: &str) {
        self.record(PageOp::Unobserve {
            observer: observer.to_string(),
            target: target.to_string(),
        });
    }

    fn disconnect(&mut self, observer: &str) {
        self.record(PageOp::Disconnect {
            observer: observer.to_string(),
        });
    }

    fn set_reveal_state(&mut self, target: &str, state: RevealState) {
        self.record(PageOp::SetRevealState {
            target: target.to_string(),
            state,
        });
    }

    fn set_image_loading(&mut self, target: &str, loading: bool) {
        self.record(PageOp::SetImageLoading {
            target: target.to_string(),
            loading,
        });
    }

    fn set_image_source(&mut self, target: &str, src: &str) {
        self.record(PageOp::SetImageSource {
            target: target.to_string(),
            src: src.to_string(),
        });
    }

    fn set_image_state(&mut self, target: &str, state: ImageState) {
        self.record(PageOp::SetImageState {
            target: target.to_string(),
            state,
        });
    }

    fn set_image_alt(&mut self, target: &str, alt: &str) {
        self.record(PageOp::SetImageAlt {
            target: target.to_string(),
            alt: alt.to_string(),
        });
    }

    fn preload_image(&mut self, url: &str) {
        self.record(PageOp::PreloadImage {
            url: url.to_string(),
        });
    }

    fn install_skip_link(&mut self, href: &str, label: &str) {
        self.record(PageOp::InstallSkipLink {
            href: href.to_string(),
            label: label.to_string(),
        });
    }

    fn set_keyboard_mode(&mut self, enabled: bool) {
        self.record(PageOp::SetKeyboardMode { enabled });
    }

    fn set_aria_label(&mut self, control: Control, label: &str) {
        self.record(PageOp::SetAriaLabel {
            control,
            label: label.to_string(),
        });
    }

    fn observe_long_tasks(&mut self) -> Result<(), PageError> {
        let attached = self.long_tasks_supported;
        self.record(PageOp::ObserveLongTasks { attached });
        if attached {
            Ok(())
        } else {
            Err(PageError::Unsupported("longtask entries".to_string()))
        }
    }

    fn memory_usage(&self) -> Option<MemoryUsage> {
        self.memory
    }

    fn register_service_worker(&mut self, path: &str) {
        self.record(PageOp::RegisterServiceWorker {
            path: path.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maud::html;

    #[test]
    fn records_calls_in_order() {
        let mut page = RecordingPage::new();
        page.set_slide_state(0, SlideState::Active);
        page.open_url("https://wa.me/1?text=hi");
        page.set_field_error(Field::Email, Some("bad"));

        assert_eq!(
            page.ops(),
            &[
                PageOp::SetSlideState {
                    index: 0,
                    state: SlideState::Active
                },
                PageOp::OpenUrl {
                    url: "https://wa.me/1?text=hi".to_string()
                },
                PageOp::SetFieldError {
                    field: Field::Email,
                    message: Some("bad".to_string())
                },
            ]
        );
        assert_eq!(page.opened_urls(), vec!["https://wa.me/1?text=hi"]);
    }

    #[test]
    fn markup_is_recorded_as_html() {
        let mut page = RecordingPage::new();
        page.render_gallery("Ink", html! { div.gallery-item { "one" } });
        assert!(matches!(
            &page.ops()[0],
            PageOp::RenderGallery { title, grid } if title == "Ink" && grid.contains("gallery-item")
        ));
    }

    #[test]
    fn take_ops_drains() {
        let mut page = RecordingPage::new();
        page.fade_loader();
        assert_eq!(page.take_ops().len(), 1);
        assert!(page.ops().is_empty());
    }

    #[test]
    fn long_task_support_is_configurable() {
        let mut page = RecordingPage::new();
        assert!(page.observe_long_tasks().is_ok());
        page.long_tasks_supported = false;
        assert!(matches!(
            page.observe_long_tasks(),
            Err(PageError::Unsupported(_))
        ));
    }

    #[test]
    fn ops_serialize_with_tag() {
        let json = serde_json::to_string(&PageOp::SetNavbarHidden { hidden: true }).unwrap();
        assert_eq!(json, r#"{"op":"set_navbar_hidden","hidden":true}"#);
    }
}
