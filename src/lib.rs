//! # artfolio
//!
//! The interactive behavior of a single-page artist portfolio: hero
//! carousel, scroll-aware navigation, gallery and image modals, a
//! commission form that hands requests to a messaging app or mail client,
//! toast notifications, a loading screen, reveal-on-scroll effects, lazy
//! images, and best-effort runtime diagnostics.
//!
//! # Architecture: Events In, Page Operations Out
//!
//! ```text
//! host events ──▶ Portfolio::handle ──▶ controllers ──▶ Page (trait)
//! wall clock  ──▶ Portfolio::advance_to ──▶ Timers ──┘
//! ```
//!
//! Controllers own their state and never touch a DOM directly. Every
//! visible effect is a call on the [`page::Page`] trait, and every delayed
//! effect is a task on the virtual clock in [`timers`]. This keeps the
//! whole behavior layer deterministic:
//!
//! - a browser host implements `Page` over the real DOM and feeds events,
//! - tests and the `simulate` command use [`page::RecordingPage`] and a
//!   scripted clock, then assert on the recorded operations.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`portfolio`] | Top-level manager: init order, event dispatch, timers, disposal |
//! | [`carousel`] | Hero slides, transition lock, autoplay with pause reasons, swipe |
//! | [`navigation`] | Active section link, smooth scrolling, navbar hide/show, back-to-top |
//! | [`gallery`] | Artwork catalog, category grids, opening the image viewer |
//! | [`modal`] | Modal stack, scroll lock, delayed focus, focus containment |
//! | [`form`] | Commission form validation and submission flow |
//! | [`deeplink`] | Messaging and `mailto:` link construction |
//! | [`notify`] | Single toast with auto-dismiss and exit animation |
//! | [`reveal`] | Reveal-on-scroll, lazy images, image fade-in, observer registry |
//! | [`perf`] | Long-task and memory diagnostics |
//! | [`a11y`] | Skip link, keyboard-navigation mode, control labels |
//! | [`layout`] | Snapshot of the page structure the controllers bind to |
//! | [`markup`] | Maud fragments for the loader, toasts, grids and dialogs |
//! | [`throttle`] | Leading-edge throttle and leading/trailing debounce |
//! | [`timers`] | Virtual clock and cancellable timer queue |
//! | [`event`] | Input events |
//! | [`types`] | Shared plain-data types |
//! | [`config`] | `config.toml` loading, validation and merging |
//! | [`simulate`] | Replaying timed event scripts |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## One Owner, Explicit Context
//!
//! [`Portfolio`] owns every controller, the page and the clock. Controllers
//! receive `&mut impl Page` and `&mut Timers` per call instead of holding
//! shared handles, so there is no interior mutability and disposal is a
//! single pass over owned state.
//!
//! ## Virtual Time
//!
//! Timeouts and intervals are entries in a deadline-ordered queue, not
//! host timers. Cancelling a timer removes it; a timer that was replaced
//! can never fire late. The host maps wall-clock time onto
//! [`Portfolio::advance_to`].
//!
//! ## Maud for Dynamic Fragments
//!
//! The few pieces of markup the behavior layer creates (loader, toast,
//! gallery grid, submission dialogs) are built with Maud, so user-entered
//! values such as a photo filename are escaped by construction.
//!
//! ## Config Cascading
//!
//! `config.toml` in the site root is merged over stock defaults that
//! reproduce the shipped portfolio: contact targets, timings and the
//! gallery catalog. See [`config`].

pub mod a11y;
pub mod carousel;
pub mod config;
pub mod deeplink;
pub mod event;
pub mod form;
pub mod gallery;
pub mod layout;
pub mod markup;
pub mod modal;
pub mod navigation;
pub mod notify;
pub mod output;
pub mod page;
pub mod perf;
pub mod portfolio;
pub mod reveal;
pub mod simulate;
pub mod throttle;
pub mod timers;
pub mod types;

pub use portfolio::{Portfolio, PortfolioError};

#[cfg(test)]
pub(crate) mod test_helpers;
