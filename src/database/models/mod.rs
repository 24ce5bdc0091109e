pub mod engineer;

pub use engineer::{Engineer, EngineerFilter, EngineerTemplate};
