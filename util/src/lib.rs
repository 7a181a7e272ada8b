pub mod build;
mod macros;

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
