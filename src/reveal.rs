//! Viewport-driven effects: one-shot reveal animations, deferred image
//! sources, and image fade-in.
//!
//! Both intersection watchers are registered by name in an
//! [`ObserverRegistry`] so teardown can release them uniformly. Each target
//! is handled at most once: after its first intersection it is unobserved,
//! and intersections reported for targets no longer observed are ignored.

use crate::config::RevealConfig;
use crate::layout::{LazyImage, PageImage};
use crate::page::Page;
use crate::types::{ImageState, RevealState};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

pub const SCROLL_ANIMATIONS: &str = "scroll-animations";
pub const LAZY_LOADING: &str = "lazy-loading";
/// Alt text given to a page image that failed to load.
pub const FAILED_IMAGE_ALT: &str = "Image failed to load";

/// Intersection observer settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchOptions {
    /// CSS margin around the viewport, e.g. `"0px 0px -50px 0px"`.
    pub root_margin: String,
    /// Fraction of the target that must be visible.
    pub threshold: f64,
}

impl WatchOptions {
    pub fn reveal(config: &RevealConfig) -> Self {
        Self {
            root_margin: format!("0px 0px -{}px 0px", config.bottom_margin_px),
            threshold: config.threshold,
        }
    }

    pub fn lazy(config: &RevealConfig) -> Self {
        Self {
            root_margin: format!("{}px", config.lazy_margin_px),
            threshold: 0.0,
        }
    }
}

#[derive(Debug)]
struct Watch {
    options: WatchOptions,
    targets: BTreeSet<String>,
}

/// Named intersection watchers and the targets each is observing.
#[derive(Debug, Default)]
pub struct ObserverRegistry {
    watches: BTreeMap<String, Watch>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, options: WatchOptions) {
        self.watches.insert(
            name.to_string(),
            Watch {
                options,
                targets: BTreeSet::new(),
            },
        );
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.watches.keys().map(String::as_str)
    }

    pub fn observe(&mut self, name: &str, target: &str, page: &mut impl Page) -> bool {
        let Some(watch) = self.watches.get_mut(name) else {
            return false;
        };
        if watch.targets.insert(target.to_string()) {
            page.observe(name, &watch.options, target);
        }
        true
    }

    pub fn unobserve(&mut self, name: &str, target: &str, page: &mut impl Page) -> bool {
        let removed = self
            .watches
            .get_mut(name)
            .is_some_and(|watch| watch.targets.remove(target));
        if removed {
            page.unobserve(name, target);
        }
        removed
    }

    pub fn is_observing(&self, name: &str, target: &str) -> bool {
        self.watches
            .get(name)
            .is_some_and(|watch| watch.targets.contains(target))
    }

    /// Number of targets still observed by `name`.
    pub fn observed(&self, name: &str) -> usize {
        self.watches.get(name).map_or(0, |watch| watch.targets.len())
    }

    /// Disconnect and forget every watcher.
    pub fn disconnect_all(&mut self, page: &mut impl Page) {
        for name in std::mem::take(&mut self.watches).into_keys() {
            page.disconnect(&name);
        }
    }
}

/// Elements that animate in the first time they scroll into view.
#[derive(Debug, Default)]
pub struct ScrollReveal {
    revealed: BTreeSet<String>,
}

impl ScrollReveal {
    pub fn init(
        targets: &[String],
        config: &RevealConfig,
        registry: &mut ObserverRegistry,
        page: &mut impl Page,
    ) -> Self {
        registry.register(SCROLL_ANIMATIONS, WatchOptions::reveal(config));
        for target in targets {
            page.set_reveal_state(target, RevealState::Ready);
            registry.observe(SCROLL_ANIMATIONS, target, page);
        }
        Self::default()
    }

    pub fn is_revealed(&self, target: &str) -> bool {
        self.revealed.contains(target)
    }

    pub fn intersection(
        &mut self,
        target: &str,
        intersecting: bool,
        registry: &mut ObserverRegistry,
        page: &mut impl Page,
    ) -> bool {
        if !intersecting || !registry.is_observing(SCROLL_ANIMATIONS, target) {
            return false;
        }
        page.set_reveal_state(target, RevealState::AnimatedIn);
        registry.unobserve(SCROLL_ANIMATIONS, target, page);
        self.revealed.insert(target.to_string());
        true
    }
}

/// Images whose real source is swapped in as they approach the viewport.
#[derive(Debug, Default)]
pub struct LazyImages {
    deferred: BTreeMap<String, String>,
}

impl LazyImages {
    pub fn init(
        images: &[LazyImage],
        config: &RevealConfig,
        registry: &mut ObserverRegistry,
        page: &mut impl Page,
    ) -> Self {
        registry.register(LAZY_LOADING, WatchOptions::lazy(config));
        let mut deferred = BTreeMap::new();
        for image in images {
            page.set_image_loading(&image.id, true);
            registry.observe(LAZY_LOADING, &image.id, page);
            deferred.insert(image.id.clone(), image.src.clone());
        }
        Self { deferred }
    }

    /// Images still waiting for their source.
    pub fn deferred(&self) -> usize {
        self.deferred.len()
    }

    pub fn intersection(
        &mut self,
        target: &str,
        intersecting: bool,
        registry: &mut ObserverRegistry,
        page: &mut impl Page,
    ) -> bool {
        if !intersecting || !registry.is_observing(LAZY_LOADING, target) {
            return false;
        }
        if let Some(src) = self.deferred.remove(target) {
            page.set_image_source(target, &src);
        }
        page.set_image_loading(target, false);
        registry.unobserve(LAZY_LOADING, target, page);
        true
    }
}

/// Fade-in for ordinary page images that were still loading at init.
#[derive(Debug, Default)]
pub struct ImageFade {
    loading: BTreeSet<String>,
}

impl ImageFade {
    pub fn init(images: &[PageImage], page: &mut impl Page) -> Self {
        let mut loading = BTreeSet::new();
        for image in images {
            if image.complete {
                page.set_image_state(&image.id, ImageState::Shown);
            } else {
                page.set_image_state(&image.id, ImageState::Hidden);
                loading.insert(image.id.clone());
            }
        }
        Self { loading }
    }

    pub fn loaded(&mut self, id: &str, page: &mut impl Page) {
        if self.loading.remove(id) {
            page.set_image_state(id, ImageState::Shown);
        }
    }

    /// Dims the image and replaces its alt text; no retry.
    pub fn failed(&mut self, id: &str, page: &mut impl Page) {
        if self.loading.remove(id) {
            tracing::warn!(image = id, "failed to load image");
            page.set_image_state(id, ImageState::Failed);
            page.set_image_alt(id, FAILED_IMAGE_ALT);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageOp, RecordingPage};

    fn targets() -> Vec<String> {
        vec!["about-text".to_string(), "pricing-card".to_string()]
    }

    #[test]
    fn watch_options_from_config() {
        let config = RevealConfig::default();
        assert_eq!(
            WatchOptions::reveal(&config),
            WatchOptions {
                root_margin: "0px 0px -50px 0px".to_string(),
                threshold: 0.1
            }
        );
        assert_eq!(WatchOptions::lazy(&config).root_margin, "50px");
    }

    #[test]
    fn reveal_marks_ready_then_animates_once() {
        let mut registry = ObserverRegistry::new();
        let mut page = RecordingPage::new();
        let mut reveal = ScrollReveal::init(&targets(), &RevealConfig::default(), &mut registry, &mut page);
        assert_eq!(registry.observed(SCROLL_ANIMATIONS), 2);
        assert!(page.ops().contains(&PageOp::SetRevealState {
            target: "about-text".to_string(),
            state: RevealState::Ready
        }));

        assert!(!reveal.intersection("about-text", false, &mut registry, &mut page));
        assert!(reveal.intersection("about-text", true, &mut registry, &mut page));
        assert!(reveal.is_revealed("about-text"));

        // Leaving and re-entering the viewport changes nothing.
        page.take_ops();
        assert!(!reveal.intersection("about-text", false, &mut registry, &mut page));
        assert!(!reveal.intersection("about-text", true, &mut registry, &mut page));
        assert!(page.ops().is_empty());
        assert!(reveal.is_revealed("about-text"));
        assert_eq!(registry.observed(SCROLL_ANIMATIONS), 1);
    }

    #[test]
    fn unknown_targets_are_ignored() {
        let mut registry = ObserverRegistry::new();
        let mut page = RecordingPage::new();
        let mut reveal = ScrollReveal::init(&targets(), &RevealConfig::default(), &mut registry, &mut page);
        assert!(!reveal.intersection("footer", true, &mut registry, &mut page));
    }

    #[test]
    fn lazy_image_gets_source_once() {
        let mut registry = ObserverRegistry::new();
        let mut page = RecordingPage::new();
        let images = vec![LazyImage {
            id: "art-1".to_string(),
            src: "full.jpg".to_string(),
        }];
        let mut lazy = LazyImages::init(&images, &RevealConfig::default(), &mut registry, &mut page);
        assert_eq!(lazy.deferred(), 1);

        assert!(lazy.intersection("art-1", true, &mut registry, &mut page));
        assert!(!lazy.intersection("art-1", true, &mut registry, &mut page));
        assert_eq!(
            page.count(|op| matches!(op, PageOp::SetImageSource { .. })),
            1
        );
        assert_eq!(
            page.ops().last(),
            Some(&PageOp::Unobserve {
                observer: LAZY_LOADING.to_string(),
                target: "art-1".to_string()
            })
        );
        assert_eq!(lazy.deferred(), 0);
    }

    #[test]
    fn unobserve_only_reports_targets_it_was_watching() {
        let config = RevealConfig::default();
        let mut registry = ObserverRegistry::new();
        let mut page = RecordingPage::new();
        registry.register(SCROLL_ANIMATIONS, WatchOptions::reveal(&config));
        registry.observe(SCROLL_ANIMATIONS, "about-text", &mut page);
        page.take_ops();

        assert!(!registry.unobserve(LAZY_LOADING, "about-text", &mut page));
        assert!(!registry.unobserve(SCROLL_ANIMATIONS, "pricing-card", &mut page));
        assert!(page.ops().is_empty());

        assert!(registry.unobserve(SCROLL_ANIMATIONS, "about-text", &mut page));
        assert!(!registry.unobserve(SCROLL_ANIMATIONS, "about-text", &mut page));
        assert_eq!(
            page.ops(),
            &[PageOp::Unobserve {
                observer: SCROLL_ANIMATIONS.to_string(),
                target: "about-text".to_string()
            }]
        );
        assert_eq!(registry.observed(SCROLL_ANIMATIONS), 0);
    }

    #[test]
    fn disconnect_all_releases_every_watcher() {
        let mut registry = ObserverRegistry::new();
        let mut page = RecordingPage::new();
        ScrollReveal::init(&targets(), &RevealConfig::default(), &mut registry, &mut page);
        LazyImages::init(&[], &RevealConfig::default(), &mut registry, &mut page);
        assert_eq!(registry.names().count(), 2);

        page.take_ops();
        registry.disconnect_all(&mut page);
        assert_eq!(
            page.ops(),
            &[
                PageOp::Disconnect {
                    observer: LAZY_LOADING.to_string()
                },
                PageOp::Disconnect {
                    observer: SCROLL_ANIMATIONS.to_string()
                },
            ]
        );
        assert!(!registry.is_observing(SCROLL_ANIMATIONS, "about-text"));
    }

    #[test]
    fn image_fade_shows_on_load_and_dims_on_failure() {
        let mut page = RecordingPage::new();
        let images = vec![
            PageImage {
                id: "hero".to_string(),
                complete: true,
            },
            PageImage {
                id: "a".to_string(),
                complete: false,
            },
            PageImage {
                id: "b".to_string(),
                complete: false,
            },
        ];
        let mut fade = ImageFade::init(&images, &mut page);
        fade.loaded("a", &mut page);
        fade.failed("b", &mut page);
        fade.failed("hero", &mut page);

        let states: Vec<(String, ImageState)> = page
            .ops()
            .iter()
            .filter_map(|op| match op {
                PageOp::SetImageState { target, state } => Some((target.clone(), *state)),
                _ => None,
            })
            .collect();
        assert_eq!(
            states,
            vec![
                ("hero".to_string(), ImageState::Shown),
                ("a".to_string(), ImageState::Hidden),
                ("b".to_string(), ImageState::Hidden),
                ("a".to_string(), ImageState::Shown),
                ("b".to_string(), ImageState::Failed),
            ]
        );
        assert_eq!(
            page.ops().last(),
            Some(&PageOp::SetImageAlt {
                target: "b".to_string(),
                alt: "Image failed to load".to_string()
            })
        );
        assert_eq!(page.count(|op| matches!(op, PageOp::SetImageAlt { .. })), 1);
    }
}
