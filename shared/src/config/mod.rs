pub mod db;

pub use db::{load_env_file, AppSettings, ConnectionStringProvider};
