//! HTML fragments inserted at runtime.
//!
//! Uses [maud](https://maud.lambda.xyz/) so every interpolated value
//! (category titles, file names, notification text) is escaped. Styling lives
//! in the site stylesheet; fragments only carry structure and class names.

use crate::gallery::GalleryItem;
use crate::types::NotificationKind;
use maud::{Markup, html};

/// Full-screen loading overlay (`#portfolio-loader`).
pub fn loader(title: &str, subtitle: &str) -> Markup {
    html! {
        div #portfolio-loader {
            div.loader-content {
                div.loader-spinner {}
                h3 { (title) }
                p { (subtitle) }
            }
        }
    }
}

/// Toast with an icon, the message, and a manual close button.
pub fn notification(kind: NotificationKind, message: &str) -> Markup {
    html! {
        div class={ "portfolio-notification " (kind.class()) } {
            div.notification-content {
                i class={ "fas fa-" (kind.icon()) } {}
                span { (message) }
                button.notification-close aria-label="Close notification" { "×" }
            }
        }
    }
}

/// Gallery grid contents: one focusable tile per artwork.
pub fn gallery_grid(items: &[GalleryItem]) -> Markup {
    html! {
        @for item in items {
            div.gallery-item tabindex="0" role="button" aria-label=(item.label) {
                img src=(item.src) alt=(item.alt) loading="lazy";
                div.gallery-item-overlay {
                    i.fas.fa-expand-alt {}
                }
            }
        }
    }
}

/// Channel choice shown when the request carries a reference photo.
pub fn submission_options(messaging_name: &str) -> Markup {
    html! {
        div.submission-options-modal {
            div.modal-content {
                h3 { "Choose Submission Method" }
                p { "You've attached a photo. Please choose how to send your request:" }
                div.submission-options {
                    button.option-btn.messaging-option {
                        i.fab.fa-whatsapp {}
                        span { (messaging_name) }
                        small { "You'll need to send the photo separately" }
                    }
                    button.option-btn.email-option {
                        i.fas.fa-envelope {}
                        span { "Email" }
                        small { "You'll attach the photo in your email client" }
                    }
                }
                button.close-options { "Cancel" }
            }
        }
    }
}

/// Guided steps before the mail client opens; deep links cannot carry files.
pub fn email_instructions(photo_name: &str) -> Markup {
    html! {
        div.email-instructions-modal {
            div.modal-content {
                h3 { "Email Instructions" }
                p { "Your email client will open with the request details. Please:" }
                ol {
                    li { "Click \"Open Email Client\" below" }
                    li { "Manually attach your photo: " strong { (photo_name) } }
                    li { "Send the email" }
                }
                div.modal-actions {
                    button.btn-primary.open-email { "Open Email Client" }
                    button.btn-secondary.close-instructions { "Cancel" }
                }
            }
        }
    }
}
