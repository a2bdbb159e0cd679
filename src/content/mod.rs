/*!
 * Content Schema
 * Page kinds, structured content blocks, and write-time validation
 */
pub mod blocks;
pub mod pages;
pub mod validate;

pub use blocks::{BlockKind, ContentBlock, ImageRef, RichText};
pub use pages::{NewPage, Page, PageContent, PageKind};
pub use validate::{Validate, ValidationError};
