//! Domain types and models

mod image;
mod product;

pub use image::{allowed_list, ImageFormat};
pub use product::{file_extension, ImageKey, Product, PRODUCT_ID_ATTR};
