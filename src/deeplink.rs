//! Deep links that hand a commission request to an external application.
//!
//! Two channels:
//! - messaging: `https://<host>/<recipient>?text=<encoded>`
//! - mail: `mailto:<address>?subject=<encoded>&body=<encoded>`
//!
//! Values are percent-encoded the way `encodeURIComponent` does: everything
//! except ASCII alphanumerics and `- _ . ! ~ * ' ( )`. Field values go into
//! the templates as entered; validation trims only for checking.

use crate::config::ContactConfig;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Where a request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Messaging,
    Email,
}

/// The validated text fields of a commission request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRequest {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub message: String,
}

/// Message body for the messaging channel. `photo` is the attached file name.
pub fn messaging_text(request: &CommissionRequest, photo: Option<&str>, signature: &str) -> String {
    let photo_note = photo
        .map(|name| format!("\n📸 Reference Photo: {name} (will send separately)"))
        .unwrap_or_default();
    let warning = if photo.is_some() {
        "⚠️ Note: Please send your reference photo in the next message!"
    } else {
        ""
    };
    format!(
        "🎨 New Commission Request\n\
         \n\
         👤 Name: {name}\n\
         📧 Email: {email}\n\
         📱 Mobile: {mobile}{photo_note}\n\
         \n\
         💬 Commission Details:\n\
         {message}\n\
         \n\
         {warning}\n\
         \n\
         ---\n\
         Sent from {signature}",
        name = request.name,
        email = request.email,
        mobile = request.mobile,
        message = request.message,
    )
}

pub fn messaging_url(contact: &ContactConfig, request: &CommissionRequest, photo: Option<&str>) -> String {
    format!(
        "https://{}/{}?text={}",
        contact.messaging_host,
        contact.recipient,
        encode_component(&messaging_text(request, photo, &contact.signature))
    )
}

pub fn email_subject(request: &CommissionRequest) -> String {
    format!("New Commission Request from {}", request.name)
}

/// Mail body. `photo_attached` adds the attachment line; the file itself
/// cannot travel in a `mailto:` link, the sender attaches it by hand.
pub fn email_body(request: &CommissionRequest, photo_attached: bool, signature: &str) -> String {
    let attachment = if photo_attached {
        "Reference photo is attached to this email."
    } else {
        ""
    };
    format!(
        "Commission Request Details:\n\
         \n\
         Name: {name}\n\
         Email: {email}\n\
         Mobile: {mobile}\n\
         \n\
         Commission Details:\n\
         {message}\n\
         \n\
         {attachment}\n\
         \n\
         ---\n\
         Sent from {signature}",
        name = request.name,
        email = request.email,
        mobile = request.mobile,
        message = request.message,
    )
}

pub fn mailto_url(contact: &ContactConfig, request: &CommissionRequest, photo_attached: bool) -> String {
    format!(
        "mailto:{}?subject={}&body={}",
        contact.email,
        encode_component(&email_subject(request)),
        encode_component(&email_body(request, photo_attached, &contact.signature))
    )
}
