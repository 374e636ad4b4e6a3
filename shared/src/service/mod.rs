pub mod db;

pub use db::{CrudService, CrudServiceImpl};
