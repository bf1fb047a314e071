//! Commission form: field validation and submission routing.
//!
//! ## Field lifecycle
//!
//! ```text
//! pristine ──blur──▶ validating ──▶ valid
//!                         └───────▶ invalid(reason) ──input──▶ pristine
//! ```
//!
//! A field's error message is the only validity signal; submission
//! re-validates every field from the submitted snapshot.
//!
//! ## Submission routing
//!
//! | Photo attached | Route                                                      |
//! |----------------|------------------------------------------------------------|
//! | no             | messaging link opened immediately                          |
//! | yes            | channel choice modal                                       |
//! |                | ├─ messaging: link opened, photo follow-up warning         |
//! |                | └─ email: instructions modal, link only after confirmation |
//!
//! The validation patterns are intentionally loose.

use crate::config::ContactConfig;
use crate::deeplink::{self, Channel, CommissionRequest};
use crate::markup;
use crate::modal::{ActiveModal, Modals};
use crate::notify::NotificationCenter;
use crate::page::Page;
use crate::timers::Timers;
use crate::types::ModalKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s\-()]{8,15}$").expect("mobile pattern"));

const MIN_NAME_CHARS: usize = 2;
const MIN_MESSAGE_CHARS: usize = 20;

/// Commission form inputs, by `name` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Mobile,
    Message,
    Photo,
}

impl Field {
    /// Fields that carry a validation rule, in form order.
    pub const VALIDATED: [Field; 4] = [Field::Name, Field::Email, Field::Mobile, Field::Message];

    /// The input's `name` attribute.
    pub fn name(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Mobile => "mobile",
            Field::Message => "message",
            Field::Photo => "photo",
        }
    }

    /// Does the trimmed value satisfy this field's rule? `photo` always does.
    pub fn accepts(self, value: &str) -> bool {
        let value = value.trim();
        match self {
            Field::Name => text_length(value) >= MIN_NAME_CHARS,
            Field::Email => EMAIL.is_match(value),
            Field::Mobile => MOBILE.is_match(value),
            Field::Message => text_length(value) >= MIN_MESSAGE_CHARS,
            Field::Photo => true,
        }
    }

    /// Message shown when the field is submitted invalid.
    pub fn submit_error(self) -> Option<&'static str> {
        match self {
            Field::Name => Some("Name must be at least 2 characters"),
            Field::Email => Some("Please enter a valid email address"),
            Field::Mobile => Some("Please enter a valid mobile number"),
            Field::Message => Some("Please provide more details (minimum 20 characters)"),
            Field::Photo => None,
        }
    }

    /// Message shown when the field loses focus, or `None` if it is fine.
    /// Empty required fields get a "required" message; the message field
    /// reports its current length.
    pub fn blur_error(self, value: &str) -> Option<String> {
        let value = value.trim();
        if self == Field::Photo {
            return None;
        }
        if value.is_empty() {
            let required = match self {
                Field::Name => "Name is required",
                Field::Email => "Email is required",
                Field::Mobile => "Mobile number is required",
                _ => "Commission details are required",
            };
            return Some(required.to_string());
        }
        if self.accepts(value) {
            return None;
        }
        match self {
            Field::Message => Some(format!(
                "Please provide more details ({}/{MIN_MESSAGE_CHARS} characters minimum)",
                text_length(value)
            )),
            other => other.submit_error().map(str::to_string),
        }
    }
}

/// Length as the browser's `String.length` reports it: UTF-16 code units,
/// so an emoji outside the BMP counts twice.
fn text_length(value: &str) -> usize {
    value.encode_utf16().count()
}

/// A file picked in the `photo` input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAttachment {
    pub name: String,
    #[serde(default)]
    pub size: u64,
}

/// Form contents at submit time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSnapshot {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub message: String,
    pub photo: Option<PhotoAttachment>,
}

impl FormSnapshot {
    fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Mobile => &self.mobile,
            Field::Message => &self.message,
            Field::Photo => self.photo.as_ref().map(|p| p.name.as_str()).unwrap_or(""),
        }
    }

    /// The attached photo, if one with a name and content was picked.
    pub fn attached_photo(&self) -> Option<&PhotoAttachment> {
        self.photo
            .as_ref()
            .filter(|photo| !photo.name.is_empty() && photo.size > 0)
    }

    pub fn request(&self) -> CommissionRequest {
        CommissionRequest {
            name: self.name.clone(),
            email: self.email.clone(),
            mobile: self.mobile.clone(),
            message: self.message.clone(),
        }
    }
}

/// Every failing field with its submit message, in form order.
pub fn validate(snapshot: &FormSnapshot) -> Vec<(Field, &'static str)> {
    Field::VALIDATED
        .into_iter()
        .filter(|field| !field.accepts(snapshot.value(*field)))
        .filter_map(|field| field.submit_error().map(|msg| (field, msg)))
        .collect()
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Invalid { fields: Vec<Field> },
    Sent { channel: Channel },
    AwaitingChannel,
}

/// A photo-bearing request waiting on the choice or instructions modal.
#[derive(Debug, Clone)]
struct Pending {
    request: CommissionRequest,
    photo: String,
    mailto: Option<String>,
}

/// Collaborators the form dispatches through.
pub struct Dispatch<'a, P: Page> {
    pub contact: &'a ContactConfig,
    pub modals: &'a mut Modals,
    pub notices: &'a mut NotificationCenter,
    pub page: &'a mut P,
    pub timers: &'a mut Timers,
}

#[derive(Debug)]
pub struct CommissionForm {
    submit_label: String,
    errors: BTreeMap<Field, String>,
    pending: Option<Pending>,
}

impl CommissionForm {
    pub fn new(submit_label: &str) -> Self {
        Self {
            submit_label: submit_label.to_string(),
            errors: BTreeMap::new(),
            pending: None,
        }
    }

    /// Fields currently showing an error, with the message.
    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn field_blurred(&mut self, field: Field, value: &str, page: &mut impl Page) {
        self.clear_error(field, page);
        if let Some(message) = field.blur_error(value) {
            self.set_error(field, message, page);
        }
    }

    /// Typing into a field clears its error.
    pub fn field_input(&mut self, field: Field, page: &mut impl Page) {
        self.clear_error(field, page);
    }

    pub fn submit<P: Page>(&mut self, snapshot: &FormSnapshot, cx: Dispatch<'_, P>) -> SubmitOutcome {
        let failures = validate(snapshot);
        for field in Field::VALIDATED {
            match failures.iter().find(|(f, _)| *f == field) {
                Some((_, message)) => self.set_error(field, message.to_string(), cx.page),
                None => self.clear_error(field, cx.page),
            }
        }
        if !failures.is_empty() {
            cx.notices.error("Please fix the errors above", cx.page, cx.timers);
            tracing::debug!(invalid = failures.len(), "commission form rejected");
            return SubmitOutcome::Invalid {
                fields: failures.into_iter().map(|(f, _)| f).collect(),
            };
        }

        cx.page.set_submit_busy(true, "Sending...");
        let request = snapshot.request();
        let outcome = match snapshot.attached_photo() {
            Some(photo) => {
                self.pending = Some(Pending {
                    request,
                    photo: photo.name.clone(),
                    mailto: None,
                });
                cx.modals.open_dynamic(
                    ModalKind::SubmissionOptions,
                    markup::submission_options(&cx.contact.messaging_name),
                    cx.page,
                    cx.timers,
                );
                SubmitOutcome::AwaitingChannel
            }
            None => {
                self.pending = None;
                cx.page.open_url(&deeplink::messaging_url(cx.contact, &request, None));
                let sent = format!("Request sent to {}!", cx.contact.messaging_name);
                cx.notices.success(&sent, cx.page, cx.timers);
                tracing::info!(channel = "messaging", "commission request dispatched");
                SubmitOutcome::Sent {
                    channel: Channel::Messaging,
                }
            }
        };
        cx.page.set_submit_busy(false, &self.submit_label);

        cx.page.reset_form();
        self.errors.clear();
        cx.notices
            .success("Commission request sent successfully!", cx.page, cx.timers);
        outcome
    }

    /// Messaging option picked in the choice modal.
    pub fn send_via_messaging<P: Page>(&mut self, cx: Dispatch<'_, P>) -> bool {
        if *cx.modals.active() != ActiveModal::SubmissionOptions {
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };
        cx.page.open_url(&deeplink::messaging_url(
            cx.contact,
            &pending.request,
            Some(&pending.photo),
        ));
        cx.modals.close(cx.page, cx.timers);
        let sent = format!(
            "Request sent to {}! Don't forget to send your photo in the next message.",
            cx.contact.messaging_name
        );
        cx.notices.success(&sent, cx.page, cx.timers);
        tracing::info!(channel = "messaging", photo = %pending.photo, "commission request dispatched");
        true
    }

    /// Email option picked in the choice modal: show the attach-by-hand steps.
    pub fn send_via_email<P: Page>(&mut self, cx: Dispatch<'_, P>) -> bool {
        if *cx.modals.active() != ActiveModal::SubmissionOptions {
            return false;
        }
        let Some(pending) = self.pending.as_mut() else {
            return false;
        };
        pending.mailto = Some(deeplink::mailto_url(cx.contact, &pending.request, true));
        let steps = markup::email_instructions(&pending.photo);
        cx.modals
            .open_dynamic(ModalKind::EmailInstructions, steps, cx.page, cx.timers);
        true
    }

    /// "Open Email Client" confirmed in the instructions modal.
    pub fn confirm_email<P: Page>(&mut self, cx: Dispatch<'_, P>) -> bool {
        if *cx.modals.active() != ActiveModal::EmailInstructions {
            return false;
        }
        let Some(mailto) = self.pending.take().and_then(|p| p.mailto) else {
            return false;
        };
        cx.page.open_url(&mailto);
        cx.modals.close(cx.page, cx.timers);
        cx.notices.success(
            "Email client opened! Don't forget to attach your photo.",
            cx.page,
            cx.timers,
        );
        tracing::info!(channel = "email", "commission request dispatched");
        true
    }

    /// A submission dialog was dismissed without sending.
    pub fn discard_pending(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!("pending commission request discarded");
        }
    }

    fn set_error(&mut self, field: Field, message: String, page: &mut impl Page) {
        page.set_field_error(field, Some(&message));
        self.errors.insert(field, message);
    }

    fn clear_error(&mut self, field: Field, page: &mut impl Page) {
        if self.errors.remove(&field).is_some() {
            page.set_field_error(field, None);
        }
    }
}
