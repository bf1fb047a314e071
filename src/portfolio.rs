//! The top-level manager.
//!
//! [`Portfolio`] owns every controller, the virtual clock, and the page. A
//! host drives it with three calls:
//!
//! - [`init`](Portfolio::init) once the page structure is available,
//! - [`handle`](Portfolio::handle) for each input event,
//! - [`advance_to`](Portfolio::advance_to) as wall-clock time passes,
//!
//! and finally [`dispose`](Portfolio::dispose) on unload. After disposal
//! every call returns [`PortfolioError::Disposed`] and touches nothing.
//!
//! Initialization order: loader, carousel, navigation, gallery, form,
//! reveal, accessibility, lazy loading, image fade, diagnostics, critical
//! preloads. A layout the controllers cannot bind to aborts the sequence
//! before any controller starts; the failure is logged and reported with a
//! single notification, and the loader still goes away on schedule.

use crate::a11y::Accessibility;
use crate::carousel::{Carousel, PauseReason};
use crate::config::SiteConfig;
use crate::event::Event;
use crate::form::{CommissionForm, Dispatch, Field};
use crate::gallery::Gallery;
use crate::layout::{LayoutError, PageLayout};
use crate::markup;
use crate::modal::{ActiveModal, Modals, Opened};
use crate::navigation::{BackToTop, Navigation};
use crate::notify::NotificationCenter;
use crate::page::Page;
use crate::perf::PerfMonitor;
use crate::reveal::{ImageFade, LAZY_LOADING, LazyImages, ObserverRegistry, SCROLL_ANIMATIONS, ScrollReveal};
use crate::throttle::Debounce;
use crate::timers::{Task, Timers};
use crate::types::{Key, Millis, ModalKind, NotificationKind};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Messages containing any of these are surfaced to the visitor.
pub const ERROR_KEYWORDS: [&str; 3] = ["carousel", "gallery", "Cannot read"];

const INIT_FAILED: &str = "Some features may not work properly. Please refresh the page.";
const SCRIPT_FAILED: &str = "Some features may not be working properly. Please refresh the page.";
const LOADED: &str = "Portfolio loaded successfully!";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PortfolioError {
    #[error("invalid page layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("portfolio already initialized")]
    AlreadyInitialized,
    #[error("portfolio has been disposed")]
    Disposed,
}

/// Builds the form's collaborator bundle from disjoint fields of `self`.
macro_rules! dispatch {
    ($this:ident) => {
        Dispatch {
            contact: &$this.config.contact,
            modals: &mut $this.modals,
            notices: &mut $this.notices,
            page: &mut $this.page,
            timers: &mut $this.timers,
        }
    };
}

pub struct Portfolio<P: Page> {
    config: SiteConfig,
    page: P,
    timers: Timers,
    initialized: bool,
    disposed: bool,
    carousel: Option<Carousel>,
    navigation: Option<Navigation>,
    back_to_top: BackToTop,
    gallery: Option<Gallery>,
    modals: Modals,
    form: Option<CommissionForm>,
    notices: NotificationCenter,
    observers: ObserverRegistry,
    reveal: Option<ScrollReveal>,
    lazy: Option<LazyImages>,
    fade: ImageFade,
    a11y: Accessibility,
    perf: Option<PerfMonitor>,
    scroll_settle: Debounce,
    last_scroll: Option<f64>,
    service_worker: bool,
}

impl<P: Page> Portfolio<P> {
    pub fn new(config: SiteConfig, page: P) -> Self {
        Self {
            timers: Timers::new(),
            initialized: false,
            disposed: false,
            carousel: None,
            navigation: None,
            back_to_top: BackToTop::new(&config.navigation),
            gallery: None,
            modals: Modals::new(config.modals.focus_delay_ms),
            form: None,
            notices: NotificationCenter::new(config.notifications.dismiss_ms, config.notifications.exit_ms),
            observers: ObserverRegistry::new(),
            reveal: None,
            lazy: None,
            fade: ImageFade::default(),
            a11y: Accessibility::default(),
            perf: None,
            scroll_settle: Debounce::new(config.navigation.throttle_ms, false),
            last_scroll: None,
            service_worker: false,
            config,
            page,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    pub fn into_page(self) -> P {
        self.page
    }

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    pub fn navigation(&self) -> Option<&Navigation> {
        self.navigation.as_ref()
    }

    pub fn gallery(&self) -> Option<&Gallery> {
        self.gallery.as_ref()
    }

    pub fn modals(&self) -> &Modals {
        &self.modals
    }

    pub fn form(&self) -> Option<&CommissionForm> {
        self.form.as_ref()
    }

    pub fn notices(&self) -> &NotificationCenter {
        &self.notices
    }

    pub fn observers(&self) -> &ObserverRegistry {
        &self.observers
    }

    pub fn reveal(&self) -> Option<&ScrollReveal> {
        self.reveal.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn live(&self) -> Result<(), PortfolioError> {
        if self.disposed {
            Err(PortfolioError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Bind to the page and start every feature the layout supports.
    pub fn init(&mut self, layout: &PageLayout) -> Result<(), PortfolioError> {
        self.live()?;
        if self.initialized {
            return Err(PortfolioError::AlreadyInitialized);
        }
        self.initialized = true;

        let loader = &self.config.loader;
        self.page.show_loader(markup::loader(&loader.title, &loader.subtitle));
        let result = self.init_components(layout);
        self.timers
            .set_timeout(self.config.loader.hide_after_ms, Task::FadeLoader);

        match &result {
            Ok(()) => tracing::info!(
                carousel = self.carousel.is_some(),
                navigation = self.navigation.is_some(),
                gallery = self.gallery.is_some(),
                form = self.form.is_some(),
                "portfolio initialized"
            ),
            Err(err) => {
                tracing::error!(error = %err, "portfolio initialization failed");
                self.notices.error(INIT_FAILED, &mut self.page, &mut self.timers);
            }
        }
        result
    }

    fn init_components(&mut self, layout: &PageLayout) -> Result<(), PortfolioError> {
        layout.validate()?;
        let config = &self.config;
        let page = &mut self.page;
        let timers = &mut self.timers;

        if let Some(mut carousel) = Carousel::new(&layout.carousel, &config.carousel) {
            carousel.init(page, timers);
            self.carousel = Some(carousel);
        }
        self.navigation = layout
            .navigation
            .as_ref()
            .and_then(|nav| Navigation::new(nav, &config.navigation));
        self.gallery = Gallery::new(config.gallery.clone(), &layout.gallery);
        self.form = layout
            .form
            .as_ref()
            .map(|form| CommissionForm::new(&form.submit_label));

        let caps = &layout.capabilities;
        if caps.intersection_observer {
            self.reveal = Some(ScrollReveal::init(
                &layout.reveal_targets,
                &config.reveal,
                &mut self.observers,
                page,
            ));
        }
        self.a11y = Accessibility::init(&layout.carousel, page);
        if caps.intersection_observer {
            self.lazy = Some(LazyImages::init(
                &layout.lazy_images,
                &config.reveal,
                &mut self.observers,
                page,
            ));
        }
        self.fade = ImageFade::init(&layout.images, page);
        self.perf = Some(PerfMonitor::init(caps, &config.perf, page, timers));
        for url in &config.assets.preload {
            page.preload_image(url);
        }
        self.service_worker = caps.service_worker && config.service_worker.enabled;
        Ok(())
    }

    /// React to one input event at the current virtual time.
    pub fn handle(&mut self, event: Event) -> Result<(), PortfolioError> {
        self.live()?;
        let now = self.timers.now();
        tracing::trace!(event = event.kind(), now, "event");

        match event {
            Event::Key { key, input_focused } => {
                self.a11y.key(key, &mut self.page);
                if key == Key::Escape {
                    self.close_modals();
                } else if let Some(carousel) = self.carousel.as_mut() {
                    carousel.key(key, input_focused, &mut self.page, &mut self.timers);
                }
            }
            Event::PointerDown => self.a11y.pointer_down(&mut self.page),

            Event::CarouselPrev => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.previous(&mut self.page, &mut self.timers);
                }
            }
            Event::CarouselNext => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.next(&mut self.page, &mut self.timers);
                }
            }
            Event::IndicatorClicked { index } => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.show(index, &mut self.page, &mut self.timers);
                }
            }
            Event::HeroPointerEnter => self.pause(PauseReason::Hover, true),
            Event::HeroPointerLeave => self.pause(PauseReason::Hover, false),
            Event::HeroFocusIn => self.pause(PauseReason::Focus, true),
            Event::HeroFocusOut => self.pause(PauseReason::Focus, false),
            Event::VisibilityChanged { hidden } => self.pause(PauseReason::Hidden, hidden),
            Event::TouchStart { x, y } => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.touch_start(x, y);
                }
            }
            Event::TouchEnd { x, y } => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.touch_end(x, y, &mut self.page, &mut self.timers);
                }
            }
            Event::SlideImageLoaded { index } => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.slide_image_loaded(index, &mut self.page);
                }
            }
            Event::SlideImageFailed { index } => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.slide_image_failed(index, &mut self.page);
                }
            }

            Event::NavLinkClicked { target } => {
                if let Some(nav) = self.navigation.as_mut() {
                    nav.link_clicked(&target, &mut self.page);
                }
            }
            Event::Scroll { y } => {
                if let Some(nav) = self.navigation.as_mut() {
                    nav.scrolled(y, now, &mut self.page);
                }
                self.back_to_top.scrolled(y, now, &mut self.page);
                self.scroll_settle.call(now);
                self.last_scroll = Some(y);
            }
            Event::BackToTopClicked => self.back_to_top.clicked(&mut self.page),

            Event::CategorySelected { category } => {
                let opened = self.gallery.as_mut().and_then(|gallery| {
                    gallery.show(&category, &mut self.modals, &mut self.page, &mut self.timers)
                });
                self.after_open(opened);
            }
            Event::GalleryItemClicked { index } => {
                let opened = self.gallery.as_mut().and_then(|gallery| {
                    gallery.activate_item(index, &mut self.modals, &mut self.page, &mut self.timers)
                });
                self.after_open(opened);
            }
            Event::GalleryItemKey { index, key } => {
                let opened = self.gallery.as_mut().and_then(|gallery| {
                    gallery.item_key(index, key, &mut self.modals, &mut self.page, &mut self.timers)
                });
                self.after_open(opened);
            }
            Event::ModalCloseClicked => self.close_modals(),
            Event::ModalBackdropClicked { modal } => {
                let closed = self
                    .modals
                    .backdrop_clicked(modal, &mut self.page, &mut self.timers);
                self.after_close(closed);
            }
            Event::FocusIn { within } => {
                self.modals.focus_in(within, &mut self.page);
            }

            Event::FieldBlurred { field, value } => {
                if let Some(form) = self.form.as_mut() {
                    form.field_blurred(field, &value, &mut self.page);
                }
            }
            Event::FieldInput { field } => {
                if let Some(form) = self.form.as_mut() {
                    form.field_input(field, &mut self.page);
                }
            }
            Event::FormSubmitted { form: snapshot } => {
                if let Some(form) = self.form.as_mut() {
                    let outcome = form.submit(&snapshot, dispatch!(self));
                    tracing::debug!(?outcome, "commission form submitted");
                }
            }
            Event::SubmitViaMessaging => {
                if let Some(form) = self.form.as_mut() {
                    form.send_via_messaging(dispatch!(self));
                }
            }
            Event::SubmitViaEmail => {
                if let Some(form) = self.form.as_mut() {
                    form.send_via_email(dispatch!(self));
                }
            }
            Event::EmailConfirmed => {
                if let Some(form) = self.form.as_mut() {
                    form.confirm_email(dispatch!(self));
                }
            }
            Event::SubmissionCancelled => self.cancel_dialog(ModalKind::SubmissionOptions),
            Event::EmailCancelled => self.cancel_dialog(ModalKind::EmailInstructions),

            Event::NotificationClosed { id } => {
                self.notices.close(id, &mut self.page, &mut self.timers);
            }

            Event::Intersection {
                observer,
                target,
                intersecting,
            } => match observer.as_str() {
                SCROLL_ANIMATIONS => {
                    if let Some(reveal) = self.reveal.as_mut() {
                        reveal.intersection(&target, intersecting, &mut self.observers, &mut self.page);
                    }
                }
                LAZY_LOADING => {
                    if let Some(lazy) = self.lazy.as_mut() {
                        lazy.intersection(&target, intersecting, &mut self.observers, &mut self.page);
                    }
                }
                other => tracing::debug!(observer = other, "intersection for unknown observer"),
            },
            Event::ImageLoaded { id } => self.fade.loaded(&id, &mut self.page),
            Event::ImageFailed { id } => self.fade.failed(&id, &mut self.page),

            Event::LongTask { duration_ms } => {
                if let Some(perf) = self.perf.as_ref() {
                    perf.long_task(duration_ms);
                }
            }
            Event::ScriptError { message } => {
                tracing::error!(message = %message, "script error");
                self.surface_failure(&message);
            }
            Event::UnhandledRejection { reason } => {
                tracing::error!(reason = %reason, "unhandled promise rejection");
                self.surface_failure(&reason);
            }
            Event::WindowLoaded => {
                if self.service_worker {
                    self.page.register_service_worker(&self.config.service_worker.path);
                }
            }
            Event::ServiceWorkerRegistered { ok, detail } => {
                if ok {
                    tracing::info!(scope = %detail, "service worker registered");
                } else {
                    tracing::warn!(error = %detail, "service worker registration failed");
                }
            }
        }
        Ok(())
    }

    /// Run the next timer (or settled-scroll update) due at or before
    /// `until`. Returns its deadline and a label, or `None` when nothing
    /// more is due.
    pub fn step(&mut self, until: Millis) -> Result<Option<(Millis, &'static str)>, PortfolioError> {
        self.live()?;
        let timer_due = self.timers.next_due().filter(|due| *due <= until);
        let settle_due = self.scroll_settle.deadline().filter(|due| *due <= until);

        if let Some(at) = settle_due.filter(|s| timer_due.is_none_or(|t| *s < t)) {
            self.timers.settle(at);
            if self.scroll_settle.poll(at) {
                self.scroll_settled();
            }
            return Ok(Some((at, "scroll_settled")));
        }
        let Some((_, task)) = self.timers.pop_due(until) else {
            return Ok(None);
        };
        let at = self.timers.now();
        let label = task.label();
        self.run_task(task);
        Ok(Some((at, label)))
    }

    /// Move the virtual clock to `now`, running everything that comes due
    /// in deadline order.
    pub fn advance_to(&mut self, now: Millis) -> Result<(), PortfolioError> {
        while self.step(now)?.is_some() {}
        self.timers.settle(now);
        Ok(())
    }

    pub fn advance_by(&mut self, delta: Millis) -> Result<(), PortfolioError> {
        self.advance_to(self.timers.now().saturating_add(delta))
    }

    /// Release observers and timers. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.observers.disconnect_all(&mut self.page);
        if let Some(carousel) = self.carousel.as_mut() {
            carousel.dispose(&mut self.timers);
        }
        if let Some(perf) = self.perf.as_mut() {
            perf.dispose(&mut self.timers);
        }
        self.timers.clear_all();
        self.disposed = true;
        tracing::info!("portfolio disposed");
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::ReleaseTransition => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.release_transition();
                }
            }
            Task::AutoplayTick => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.autoplay_tick(&mut self.page, &mut self.timers);
                }
            }
            Task::ExpireNotification(id) => self.notices.expire(id, &mut self.page, &mut self.timers),
            Task::RemoveNotification(id) => self.notices.remove(id, &mut self.page),
            Task::FadeLoader => {
                self.page.fade_loader();
                self.timers
                    .set_timeout(self.config.loader.fade_ms, Task::RemoveLoader);
            }
            Task::RemoveLoader => {
                self.page.remove_loader();
                self.notices.success(LOADED, &mut self.page, &mut self.timers);
            }
            Task::Focus(target) => self.modals.focus_due(&target, &mut self.page),
            Task::MemoryCheck => {
                if let Some(perf) = self.perf.as_ref() {
                    perf.check_memory(&self.page);
                }
            }
        }
    }

    fn scroll_settled(&mut self) {
        let Some(y) = self.last_scroll else {
            return;
        };
        if let Some(nav) = self.navigation.as_mut() {
            nav.apply(y, &mut self.page);
        }
        self.back_to_top.apply(y, &mut self.page);
    }

    fn pause(&mut self, reason: PauseReason, paused: bool) {
        if let Some(carousel) = self.carousel.as_mut() {
            if paused {
                carousel.pause(reason, &mut self.timers);
            } else {
                carousel.resume(reason, &mut self.timers);
            }
        }
    }

    fn close_modals(&mut self) {
        let closed = self.modals.close(&mut self.page, &mut self.timers);
        self.after_close(closed);
    }

    fn cancel_dialog(&mut self, kind: ModalKind) {
        if self.modals.active().kind() == Some(kind) {
            self.close_modals();
        }
    }

    fn after_open(&mut self, opened: Option<Opened>) {
        if let Some(opened) = opened {
            self.after_close(opened.replaced);
        }
    }

    /// A submission dialog going away drops the request it was holding.
    fn after_close(&mut self, closed: Option<ModalKind>) {
        if closed.is_some_and(ModalKind::is_dynamic) {
            if let Some(form) = self.form.as_mut() {
                form.discard_pending();
            }
        }
    }

    fn surface_failure(&mut self, message: &str) {
        if ERROR_KEYWORDS.iter().any(|keyword| message.contains(keyword)) {
            self.notices.error(SCRIPT_FAILED, &mut self.page, &mut self.timers);
        }
    }

    /// Snapshot of the observable behavior state.
    pub fn state(&self) -> PortfolioState {
        PortfolioState {
            now: self.timers.now(),
            disposed: self.disposed,
            slide: self.carousel.as_ref().map(Carousel::current),
            transitioning: self.carousel.as_ref().is_some_and(Carousel::is_transitioning),
            autoplay: self.carousel.as_ref().is_some_and(Carousel::is_autoplaying),
            active_section: self
                .navigation
                .as_ref()
                .and_then(|nav| nav.active().map(str::to_string)),
            navbar_hidden: self.navigation.as_ref().is_some_and(Navigation::navbar_hidden),
            back_to_top: self.back_to_top.visible(),
            modal: self.modals.active().clone(),
            scroll_locked: self.modals.scroll_locked(),
            field_errors: self
                .form
                .as_ref()
                .map(|form| form.errors().clone())
                .unwrap_or_default(),
            notification: self.notices.current().map(|toast| NotificationState {
                kind: toast.kind,
                message: toast.message.clone(),
            }),
            keyboard_mode: self.a11y.keyboard_mode(),
            pending_timers: self.timers.pending(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationState {
    pub kind: NotificationKind,
    pub message: String,
}

/// Observable behavior state, for reports and assertions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioState {
    pub now: Millis,
    pub disposed: bool,
    pub slide: Option<usize>,
    pub transitioning: bool,
    pub autoplay: bool,
    pub active_section: Option<String>,
    pub navbar_hidden: bool,
    pub back_to_top: bool,
    pub modal: ActiveModal,
    pub scroll_locked: bool,
    pub field_errors: BTreeMap<Field, String>,
    pub notification: Option<NotificationState>,
    pub keyboard_mode: bool,
    pub pending_timers: usize,
}
