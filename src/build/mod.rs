//! Batch builds driven by `mddoc.toml`.

mod dispatcher;

pub use dispatcher::{select_generator, Dispatcher, GeneratorKind};
