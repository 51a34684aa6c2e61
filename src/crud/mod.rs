pub mod db;
pub mod states;

pub use db::DB;
