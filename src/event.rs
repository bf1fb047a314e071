//! Input events delivered by the host to [`Portfolio::handle`](crate::Portfolio::handle).
//!
//! Each variant is one DOM event the behavior layer listens for, already
//! resolved to the element it concerns. Scripts for `artfolio simulate`
//! spell them as JSON objects tagged by `type`:
//!
//! ```json
//! {"type": "category_selected", "category": "abstract"}
//! {"type": "key", "key": "escape"}
//! ```

use crate::form::{Field, FormSnapshot};
use crate::types::{Key, ModalKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Document-level keydown. `input_focused` is true when a text input,
    /// textarea or contenteditable element has focus.
    Key {
        key: Key,
        #[serde(default)]
        input_focused: bool,
    },
    PointerDown,

    // carousel
    CarouselPrev,
    CarouselNext,
    IndicatorClicked { index: usize },
    HeroPointerEnter,
    HeroPointerLeave,
    HeroFocusIn,
    HeroFocusOut,
    VisibilityChanged { hidden: bool },
    TouchStart { x: f64, y: f64 },
    TouchEnd { x: f64, y: f64 },
    SlideImageLoaded { index: usize },
    SlideImageFailed { index: usize },

    // navigation
    NavLinkClicked { target: String },
    Scroll { y: f64 },
    BackToTopClicked,

    // gallery and modals
    CategorySelected { category: String },
    GalleryItemClicked { index: usize },
    GalleryItemKey { index: usize, key: Key },
    ModalCloseClicked,
    /// Click whose target is the modal overlay itself, not its content.
    ModalBackdropClicked { modal: ModalKind },
    /// Focus moved; `within` is the modal containing the new focus, if any.
    FocusIn {
        #[serde(default)]
        within: Option<ModalKind>,
    },

    // commission form
    FieldBlurred { field: Field, value: String },
    FieldInput { field: Field },
    FormSubmitted { form: FormSnapshot },
    SubmitViaMessaging,
    SubmitViaEmail,
    SubmissionCancelled,
    EmailConfirmed,
    EmailCancelled,

    // notifications
    NotificationClosed { id: u64 },

    // observers and images
    Intersection {
        observer: String,
        target: String,
        intersecting: bool,
    },
    ImageLoaded { id: String },
    ImageFailed { id: String },

    // platform
    LongTask { duration_ms: f64 },
    ScriptError { message: String },
    UnhandledRejection { reason: String },
    WindowLoaded,
    ServiceWorkerRegistered {
        ok: bool,
        #[serde(default)]
        detail: String,
    },
}

impl Event {
    /// Short label used in simulation reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Key { .. } => "key",
            Event::PointerDown => "pointer_down",
            Event::CarouselPrev => "carousel_prev",
            Event::CarouselNext => "carousel_next",
            Event::IndicatorClicked { .. } => "indicator_clicked",
            Event::HeroPointerEnter => "hero_pointer_enter",
            Event::HeroPointerLeave => "hero_pointer_leave",
            Event::HeroFocusIn => "hero_focus_in",
            Event::HeroFocusOut => "hero_focus_out",
            Event::VisibilityChanged { .. } => "visibility_changed",
            Event::TouchStart { .. } => "touch_start",
            Event::TouchEnd { .. } => "touch_end",
            Event::SlideImageLoaded { .. } => "slide_image_loaded",
            Event::SlideImageFailed { .. } => "slide_image_failed",
            Event::NavLinkClicked { .. } => "nav_link_clicked",
            Event::Scroll { .. } => "scroll",
            Event::BackToTopClicked => "back_to_top_clicked",
            Event::CategorySelected { .. } => "category_selected",
            Event::GalleryItemClicked { .. } => "gallery_item_clicked",
            Event::GalleryItemKey { .. } => "gallery_item_key",
            Event::ModalCloseClicked => "modal_close_clicked",
            Event::ModalBackdropClicked { .. } => "modal_backdrop_clicked",
            Event::FocusIn { .. } => "focus_in",
            Event::FieldBlurred { .. } => "field_blurred",
            Event::FieldInput { .. } => "field_input",
            Event::FormSubmitted { .. } => "form_submitted",
            Event::SubmitViaMessaging => "submit_via_messaging",
            Event::SubmitViaEmail => "submit_via_email",
            Event::SubmissionCancelled => "submission_cancelled",
            Event::EmailConfirmed => "email_confirmed",
            Event::EmailCancelled => "email_cancelled",
            Event::NotificationClosed { .. } => "notification_closed",
            Event::Intersection { .. } => "intersection",
            Event::ImageLoaded { .. } => "image_loaded",
            Event::ImageFailed { .. } => "image_failed",
            Event::LongTask { .. } => "long_task",
            Event::ScriptError { .. } => "script_error",
            Event::UnhandledRejection { .. } => "unhandled_rejection",
            Event::WindowLoaded => "window_loaded",
            Event::ServiceWorkerRegistered { .. } => "service_worker_registered",
        }
    }
}
