pub mod product_model;

pub use product_model::{Product, ProductFactory, PRODUCTS_TABLE};
