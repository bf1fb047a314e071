//! Snapshot of the page structure the behavior layer binds to.
//!
//! The browser host builds a [`PageLayout`] by querying the DOM once the
//! structural content is available; headless runs deserialize one from a
//! script. Every optional piece that is absent disables its feature:
//!
//! | Piece                      | Feature disabled when missing               |
//! |----------------------------|---------------------------------------------|
//! | `carousel.slides`          | carousel (no autoplay, no keyboard arrows)  |
//! | `navigation`               | smooth scrolling, active links, navbar      |
//! | `gallery.category_buttons` | gallery and both viewers                    |
//! | `form`                     | commission form                             |
//! | `capabilities.*`           | reveal, lazy loading, long tasks, worker    |
//!
//! Geometry (`top`, `height`, `navbar_height`) is in CSS pixels, measured at
//! init. Sections are listed in document order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },
    #[error("section {id} has invalid geometry (top {top}, height {height})")]
    InvalidExtent { id: String, top: f64, height: f64 },
    #[error("navbar height must be a non-negative number, got {0}")]
    InvalidNavbarHeight(f64),
    #[error("{indicators} indicators for {slides} slides")]
    IndicatorMismatch { slides: usize, indicators: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PageLayout {
    pub carousel: CarouselLayout,
    pub navigation: Option<NavLayout>,
    pub gallery: GalleryLayout,
    pub form: Option<FormLayout>,
    /// Elements tagged for the one-shot reveal animation, by id.
    pub reveal_targets: Vec<String>,
    /// Images carrying a deferred `data-src`.
    pub lazy_images: Vec<LazyImage>,
    /// Ordinary page images that get the fade-in treatment.
    pub images: Vec<PageImage>,
    pub capabilities: Capabilities,
}

impl Default for PageLayout {
    fn default() -> Self {
        let slide = |bg: &str| Slide {
            background: Some(bg.to_string()),
        };
        let section = |id: &str, top: f64, height: f64| Section {
            id: id.to_string(),
            top,
            height,
        };
        let ids = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            carousel: CarouselLayout {
                slides: vec![
                    slide("https://images.unsplash.com/photo-1541961017774-22349e4a1262?w=1920&h=1080&fit=crop"),
                    slide("https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=1920&h=1080&fit=crop"),
                    slide("https://images.unsplash.com/photo-1547891654-e66ed7ebb968?w=1920&h=1080&fit=crop"),
                ],
                indicators: 3,
                prev_button: true,
                next_button: true,
                controls_labelled: false,
                hero: true,
            },
            navigation: Some(NavLayout {
                navbar_height: 80.0,
                links: ids(&["home", "about", "gallery", "pricing", "contact"]),
                sections: vec![
                    section("home", 0.0, 900.0),
                    section("about", 900.0, 700.0),
                    section("gallery", 1600.0, 900.0),
                    section("pricing", 2500.0, 800.0),
                    section("contact", 3300.0, 1000.0),
                ],
            }),
            gallery: GalleryLayout {
                category_buttons: ids(&["abstract", "bw-portrait", "color-portrait", "watercolor"]),
                gallery_modal: true,
                image_modal: true,
            },
            form: Some(FormLayout::default()),
            reveal_targets: ids(&[
                "about-text",
                "pricing-card",
                "contact-info",
                "commission-form",
                "featured-artwork",
            ]),
            lazy_images: Vec::new(),
            images: Vec::new(),
            capabilities: Capabilities::default(),
        }
    }
}

impl PageLayout {
    /// Reject snapshots the controllers cannot bind to consistently.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let carousel = &self.carousel;
        if carousel.indicators != 0 && carousel.indicators != carousel.slides.len() {
            return Err(LayoutError::IndicatorMismatch {
                slides: carousel.slides.len(),
                indicators: carousel.indicators,
            });
        }

        if let Some(nav) = &self.navigation {
            if !nav.navbar_height.is_finite() || nav.navbar_height < 0.0 {
                return Err(LayoutError::InvalidNavbarHeight(nav.navbar_height));
            }
            unique("section", nav.sections.iter().map(|s| s.id.as_str()))?;
            for s in &nav.sections {
                if !s.top.is_finite() || !s.height.is_finite() || s.top < 0.0 || s.height < 0.0 {
                    return Err(LayoutError::InvalidExtent {
                        id: s.id.clone(),
                        top: s.top,
                        height: s.height,
                    });
                }
            }
        }

        unique("reveal target", self.reveal_targets.iter().map(String::as_str))?;
        unique("lazy image", self.lazy_images.iter().map(|i| i.id.as_str()))?;
        unique("image", self.images.iter().map(|i| i.id.as_str()))?;
        Ok(())
    }
}

fn unique<'a>(kind: &'static str, ids: impl Iterator<Item = &'a str>) -> Result<(), LayoutError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(LayoutError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselLayout {
    pub slides: Vec<Slide>,
    pub indicators: usize,
    pub prev_button: bool,
    pub next_button: bool,
    /// Whether the prev/next buttons already carry an `aria-label`.
    pub controls_labelled: bool,
    /// The hero section receiving hover, focus and touch input.
    pub hero: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Slide {
    /// `data-bg` image URL, loaded off-screen before being applied.
    pub background: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavLayout {
    pub navbar_height: f64,
    /// Section ids targeted by in-page nav links (`href="#id"`).
    pub links: Vec<String>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Section {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

impl Section {
    /// Half-open `[top, top + height)`.
    pub fn contains(&self, y: f64) -> bool {
        y >= self.top && y < self.top + self.height
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryLayout {
    /// `data-category` keys of the category buttons.
    pub category_buttons: Vec<String>,
    pub gallery_modal: bool,
    pub image_modal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormLayout {
    /// Text of the submit control, restored after dispatch.
    pub submit_label: String,
}

impl Default for FormLayout {
    fn default() -> Self {
        Self {
            submit_label: "Send Commission Request".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LazyImage {
    pub id: String,
    /// Deferred source from `data-src`.
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageImage {
    pub id: String,
    /// Already decoded when the layout was captured.
    #[serde(default)]
    pub complete: bool,
}

/// Platform APIs the host exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Capabilities {
    pub intersection_observer: bool,
    pub performance_observer: bool,
    pub service_worker: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            intersection_observer: true,
            performance_observer: true,
            service_worker: true,
        }
    }
}
