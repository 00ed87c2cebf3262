//! Templates: extraction from styled links, tracking and persistence.
//!
//! # Module Structure
//!
//! - `link` - template link parsing
//! - `detemplatize` - styled image to true resolution
//! - `reduce` - RGBA to palette indices
//! - `crop` - clipping to the canvas
//! - `extract` - the full link-to-grid pipeline
//! - `style` - dotted styling and link generation
//! - `model` - tracked templates and stored records
//! - `store` - persistence seam
//! - `manager` - add, update, remove, list, combine, recompute

pub mod crop;
pub mod detemplatize;
pub mod extract;
pub mod link;
pub mod manager;
pub mod model;
pub mod reduce;
pub mod store;
pub mod style;

pub use link::{TemplateLink, looks_like_template_link};
pub use manager::{NewTemplate, SortOrder, TemplateManager};
pub use model::{Scope, Template, Viewer};
pub use store::{MemoryStore, TemplateStore};
