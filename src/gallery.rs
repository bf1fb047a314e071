//! Artwork catalog and the gallery grid.
//!
//! The catalog is static for the lifetime of the page: categories come from
//! `[[gallery]]` in `config.toml` (or the stock catalog) and are looked up by
//! the `data-category` key of the button that was clicked. Selecting a
//! category rebuilds the grid in catalog order and opens the gallery modal;
//! activating a tile opens the image viewer on top of it.

use crate::layout::GalleryLayout;
use crate::markup;
use crate::modal::{Modals, Opened};
use crate::page::Page;
use crate::timers::Timers;
use crate::types::Key;
use serde::{Deserialize, Serialize};

/// One artwork category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryCategory {
    /// Identifier matched against the category button's `data-category`.
    pub key: String,
    /// Shown as the gallery modal title and used for alt text.
    pub title: String,
    /// Image URLs in display order.
    pub images: Vec<String>,
}

/// The catalog the portfolio ships with.
pub fn stock_catalog() -> Vec<GalleryCategory> {
    let category = |key: &str, title: &str, images: &[&str]| GalleryCategory {
        key: key.to_string(),
        title: title.to_string(),
        images: images.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        category(
            "abstract",
            "Abstract Acrylic",
            &[
                "./assets/Abstract-Acrylic.jpg",
                "./assets/Abstract-Acrylic-2.jpg",
                "./assets/Abstract-Acrylic-3.jpg",
                "./assets/Abstract-Acrylic-4.jpg",
                "./assets/Abstract-Acrylic-5.jpg",
            ],
        ),
        category(
            "bw-portrait",
            "Black and White Portrait",
            &[
                "./assets/Black & White potrait.jpg",
                "./assets/Black & White potrait-2.jpg",
                "./assets/Black & White potrait-3.png",
            ],
        ),
        category(
            "color-portrait",
            "Colour Portrait",
            &["/assets/coloyr-portrait.jpg"],
        ),
        category(
            "watercolor",
            "Water Colour",
            &[
                "./assets/Water-Colour.jpg",
                "./assets/Water-Colour-2.jpg",
                "./assets/Water-Colour-3.jpg",
            ],
        ),
    ]
}

/// A rendered grid tile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryItem {
    pub src: String,
    /// `"{title} {n}"`, also used as the image viewer's alt text.
    pub alt: String,
    /// Accessible name, `"View artwork {n}"`.
    pub label: String,
}

/// Build the grid tiles for a category, in catalog order. Numbering is 1-based.
pub fn grid_items(category: &GalleryCategory) -> Vec<GalleryItem> {
    category
        .images
        .iter()
        .enumerate()
        .map(|(i, src)| GalleryItem {
            src: src.clone(),
            alt: format!("{} {}", category.title, i + 1),
            label: format!("View artwork {}", i + 1),
        })
        .collect()
}

/// Category selection and grid state.
#[derive(Debug)]
pub struct Gallery {
    catalog: Vec<GalleryCategory>,
    has_modal: bool,
    has_viewer: bool,
    category: Option<String>,
    grid: Vec<GalleryItem>,
}

impl Gallery {
    /// Returns `None` when the page has no category buttons.
    pub fn new(catalog: Vec<GalleryCategory>, layout: &GalleryLayout) -> Option<Self> {
        if layout.category_buttons.is_empty() {
            return None;
        }
        Some(Self {
            catalog,
            has_modal: layout.gallery_modal,
            has_viewer: layout.image_modal,
            category: None,
            grid: Vec::new(),
        })
    }

    pub fn category(&self, key: &str) -> Option<&GalleryCategory> {
        self.catalog.iter().find(|c| c.key == key)
    }

    /// Key of the category currently shown in the grid.
    pub fn current_category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn grid(&self) -> &[GalleryItem] {
        &self.grid
    }

    /// Repopulate the grid for `key` and open the gallery modal.
    /// Unknown categories and pages without a gallery modal are a no-op.
    pub fn show(
        &mut self,
        key: &str,
        modals: &mut Modals,
        page: &mut impl Page,
        timers: &mut Timers,
    ) -> Option<Opened> {
        if !self.has_modal {
            return None;
        }
        let Some(category) = self.category(key) else {
            tracing::debug!(category = key, "no such gallery category");
            return None;
        };
        let title = category.title.clone();
        let items = grid_items(category);

        page.render_gallery(&title, markup::gallery_grid(&items));
        let replaced = modals.open_gallery(key, !items.is_empty(), page, timers);
        tracing::debug!(category = key, images = items.len(), "gallery opened");

        self.category = Some(key.to_string());
        self.grid = items;
        Some(Opened { replaced })
    }

    /// Open the image viewer for grid tile `index`.
    pub fn activate_item(
        &mut self,
        index: usize,
        modals: &mut Modals,
        page: &mut impl Page,
        timers: &mut Timers,
    ) -> Option<Opened> {
        if !self.has_viewer {
            return None;
        }
        let item = self.grid.get(index)?;
        let replaced = modals.open_image(&item.src, &item.alt, page, timers);
        Some(Opened { replaced })
    }

    /// Keyboard activation of a focused tile: Enter and Space open it.
    pub fn item_key(
        &mut self,
        index: usize,
        key: Key,
        modals: &mut Modals,
        page: &mut impl Page,
        timers: &mut Timers,
    ) -> Option<Opened> {
        if !key.activates() {
            return None;
        }
        self.activate_item(index, modals, page, timers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PageOp, RecordingPage};
    use crate::types::ModalKind;

    fn layout() -> GalleryLayout {
        GalleryLayout {
            category_buttons: vec!["abstract".to_string(), "watercolor".to_string()],
            gallery_modal: true,
            image_modal: true,
        }
    }

    fn setup() -> (Gallery, Modals, RecordingPage, Timers) {
        (
            Gallery::new(stock_catalog(), &layout()).unwrap(),
            Modals::new(100),
            RecordingPage::new(),
            Timers::new(),
        )
    }

    #[test]
    fn grid_items_follow_catalog_order() {
        let catalog = stock_catalog();
        let items = grid_items(&catalog[0]);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].src, "./assets/Abstract-Acrylic.jpg");
        assert_eq!(items[4].src, "./assets/Abstract-Acrylic-5.jpg");
        assert_eq!(items[1].alt, "Abstract Acrylic 2");
        assert_eq!(items[1].label, "View artwork 2");
    }

    #[test]
    fn no_buttons_disables_gallery() {
        let layout = GalleryLayout {
            category_buttons: vec![],
            gallery_modal: true,
            image_modal: true,
        };
        assert!(Gallery::new(stock_catalog(), &layout).is_none());
    }

    #[test]
    fn show_populates_grid_with_category_count() {
        let (mut gallery, mut modals, mut page, mut timers) = setup();
        assert!(gallery.show("watercolor", &mut modals, &mut page, &mut timers).is_some());
        assert_eq!(gallery.grid().len(), 3);
        assert_eq!(gallery.current_category(), Some("watercolor"));

        let grid = page
            .ops()
            .iter()
            .find_map(|op| match op {
                PageOp::RenderGallery { title, grid } => Some((title.clone(), grid.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(grid.0, "Water Colour");
        assert_eq!(grid.1.matches(r#"class="gallery-item""#).count(), 3);
        assert_eq!(modals.active().kind(), Some(ModalKind::Gallery));
    }

    #[test]
    fn unknown_category_is_ignored() {
        let (mut gallery, mut modals, mut page, mut timers) = setup();
        assert!(gallery.show("sculpture", &mut modals, &mut page, &mut timers).is_none());
        assert!(page.ops().is_empty());
        assert!(!modals.active().is_open());
    }

    #[test]
    fn reopening_replaces_grid() {
        let (mut gallery, mut modals, mut page, mut timers) = setup();
        gallery.show("abstract", &mut modals, &mut page, &mut timers);
        gallery.show("color-portrait", &mut modals, &mut page, &mut timers);
        assert_eq!(gallery.grid().len(), 1);
        assert_eq!(gallery.grid()[0].alt, "Colour Portrait 1");
    }

    #[test]
    fn enter_and_space_open_viewer_other_keys_do_not() {
        let (mut gallery, mut modals, mut page, mut timers) = setup();
        gallery.show("abstract", &mut modals, &mut page, &mut timers);

        assert!(gallery.item_key(0, Key::Tab, &mut modals, &mut page, &mut timers).is_none());
        assert_eq!(modals.active().kind(), Some(ModalKind::Gallery));

        assert!(gallery.item_key(2, Key::Space, &mut modals, &mut page, &mut timers).is_some());
        assert_eq!(modals.active().kind(), Some(ModalKind::Image));
        assert!(page.ops().contains(&PageOp::ShowImage {
            src: "./assets/Abstract-Acrylic-3.jpg".to_string(),
            alt: "Abstract Acrylic 3".to_string(),
        }));
    }

    #[test]
    fn out_of_range_tile_is_ignored() {
        let (mut gallery, mut modals, mut page, mut timers) = setup();
        gallery.show("color-portrait", &mut modals, &mut page, &mut timers);
        assert!(gallery.activate_item(1, &mut modals, &mut page, &mut timers).is_none());
    }

    #[test]
    fn missing_viewer_disables_tiles() {
        let layout = GalleryLayout {
            image_modal: false,
            ..layout()
        };
        let mut gallery = Gallery::new(stock_catalog(), &layout).unwrap();
        let (mut modals, mut page, mut timers) = (Modals::new(100), RecordingPage::new(), Timers::new());
        gallery.show("abstract", &mut modals, &mut page, &mut timers);
        assert!(gallery.activate_item(0, &mut modals, &mut page, &mut timers).is_none());
    }
}
