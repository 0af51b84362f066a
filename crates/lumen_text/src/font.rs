//! Font readiness
//!
//! Font files are loaded outside of Lumen. Text is only laid out once its
//! font is known to be ready; until then the node renders empty and the
//! layout is retried on a later frame.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use lumen_core::FontFace;

/// Answers whether a font can be used for measurement and drawing
pub trait FontReadiness {
    fn is_font_ready(&self, font: &FontFace) -> bool;
}

/// Treats every font as loaded
///
/// Appropriate when the backend falls back to a system font on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

impl FontReadiness for AlwaysReady {
    fn is_font_ready(&self, _font: &FontFace) -> bool {
        true
    }
}

/// Shared set of fonts that have finished loading
///
/// Clones share the same set, so the font loader can keep one handle and
/// mark fonts ready while the text adapter holds another.
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    loaded: Rc<RefCell<FxHashSet<FontFace>>>,
}

impl FontSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a font has finished loading
    pub fn mark_loaded(&self, font: FontFace) {
        tracing::debug!("Font ready: {} {:?}", font.family, font.weight);
        self.loaded.borrow_mut().insert(font);
    }

    /// Forget a font (e.g. when it is unloaded)
    pub fn remove(&self, font: &FontFace) -> bool {
        self.loaded.borrow_mut().remove(font)
    }

    pub fn len(&self) -> usize {
        self.loaded.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.borrow().is_empty()
    }
}

impl FontReadiness for FontSet {
    fn is_font_ready(&self, font: &FontFace) -> bool {
        self.loaded.borrow().contains(font)
    }
}
