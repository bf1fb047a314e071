//! Shared test fixtures for the artfolio test suite.
//!
//! Provides canned form data and a portfolio already bound to the default
//! page layout on a [`RecordingPage`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let mut portfolio = started();
//! portfolio.handle(Event::FormSubmitted { form: valid_snapshot() }).unwrap();
//! assert_eq!(portfolio.page().opened_urls().len(), 1);
//! ```

use crate::config::SiteConfig;
use crate::deeplink::CommissionRequest;
use crate::form::{FormSnapshot, PhotoAttachment};
use crate::layout::PageLayout;
use crate::page::RecordingPage;
use crate::portfolio::Portfolio;

pub fn sample_request() -> CommissionRequest {
    CommissionRequest {
        name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        mobile: "+91 98765 43210".to_string(),
        message: "A watercolour portrait of my grandmother".to_string(),
    }
}

/// Form contents that pass every rule, no photo attached.
pub fn valid_snapshot() -> FormSnapshot {
    let request = sample_request();
    FormSnapshot {
        name: request.name,
        email: request.email,
        mobile: request.mobile,
        message: request.message,
        photo: None,
    }
}

/// Valid form contents with a reference photo named `nani.jpg`.
pub fn photo_snapshot() -> FormSnapshot {
    FormSnapshot {
        photo: Some(PhotoAttachment {
            name: "nani.jpg".to_string(),
            size: 48_213,
        }),
        ..valid_snapshot()
    }
}

/// A portfolio with stock config, initialized against the default layout at t=0.
pub fn started() -> Portfolio<RecordingPage> {
    let mut portfolio = Portfolio::new(SiteConfig::default(), RecordingPage::new());
    portfolio
        .init(&PageLayout::default())
        .expect("default layout is valid");
    portfolio
}
