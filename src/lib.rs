pub use record;
pub use util::build;

pub mod trace;
