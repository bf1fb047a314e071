//! Shared types used across controllers and the [`Page`](crate::page::Page) seam.
//!
//! These are plain data. Event scripts and recorded page operations are
//! serialized to JSON with these names, so variants use stable snake_case.

use serde::{Deserialize, Serialize};

/// Virtual milliseconds since the portfolio was created.
pub type Millis = u64;

/// Keyboard keys the behavior layer reacts to. Anything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Enter,
    Space,
    Tab,
    #[serde(other)]
    Other,
}

impl Key {
    /// Keys that activate a focused `role="button"` element.
    pub fn activates(self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

/// The modal dialogs the page can show. At most one is active at a time,
/// except that the image viewer may sit on top of the gallery it was opened from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalKind {
    Gallery,
    Image,
    SubmissionOptions,
    EmailInstructions,
}

impl ModalKind {
    /// Static modals live in the page markup and are toggled with an `active`
    /// class. Dynamic ones are mounted when opened and removed when closed.
    pub fn is_dynamic(self) -> bool {
        matches!(self, ModalKind::SubmissionOptions | ModalKind::EmailInstructions)
    }

    /// Element id (static modals) or class name (dynamic modals) in the DOM contract.
    pub fn dom_name(self) -> &'static str {
        match self {
            ModalKind::Gallery => "galleryModal",
            ModalKind::Image => "imageModal",
            ModalKind::SubmissionOptions => "submission-options-modal",
            ModalKind::EmailInstructions => "email-instructions-modal",
        }
    }
}

/// Visual state of a carousel slide relative to the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideState {
    /// Slide comes before the current one (`prev` class).
    Prior,
    /// The current slide.
    Active,
    /// Slide comes after the current one; no state class.
    Clear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    /// Font Awesome icon name shown next to the message.
    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Success => "check-circle",
            NotificationKind::Error | NotificationKind::Info => "exclamation-circle",
        }
    }

    pub fn class(self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }
}

/// One-shot reveal animation state of a tagged element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    /// Hidden and offset, waiting to enter the viewport (`animate-ready`).
    Ready,
    /// Animated into view (`animate-in`). Terminal.
    AnimatedIn,
}

/// Fade state of an ordinary page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageState {
    Hidden,
    Shown,
    Failed,
}

/// Where keyboard focus should move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum FocusTarget {
    /// A gallery grid item by position.
    GalleryItem { index: usize },
    /// The close control of a modal.
    CloseButton { modal: ModalKind },
    /// The first focusable element inside a modal.
    FirstFocusable { modal: ModalKind },
}

/// Page controls that receive generated aria labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    PrevButton,
    NextButton,
}

/// Heap usage as reported by the host, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUsage {
    pub used_bytes: u64,
    pub total_bytes: u64,
}

impl MemoryUsage {
    /// `(used, total)` rounded to whole mebibytes.
    pub fn megabytes(&self) -> (u64, u64) {
        let mb = |bytes: u64| (bytes as f64 / 1_048_576.0).round() as u64;
        (mb(self.used_bytes), mb(self.total_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_and_space_activate() {
        assert!(Key::Enter.activates());
        assert!(Key::Space.activates());
        assert!(!Key::Escape.activates());
        assert!(!Key::Other.activates());
    }

    #[test]
    fn unknown_key_deserializes_as_other() {
        let key: Key = serde_json::from_str("\"page_down\"").unwrap();
        assert_eq!(key, Key::Other);
        let key: Key = serde_json::from_str("\"arrow_left\"").unwrap();
        assert_eq!(key, Key::ArrowLeft);
    }

    #[test]
    fn only_submission_modals_are_dynamic() {
        assert!(!ModalKind::Gallery.is_dynamic());
        assert!(!ModalKind::Image.is_dynamic());
        assert!(ModalKind::SubmissionOptions.is_dynamic());
        assert!(ModalKind::EmailInstructions.is_dynamic());
    }

    #[test]
    fn memory_rounds_to_mebibytes() {
        let usage = MemoryUsage {
            used_bytes: 52 * 1_048_576 + 600_000,
            total_bytes: 64 * 1_048_576,
        };
        assert_eq!(usage.megabytes(), (53, 64));
    }
}
