mod domain;
pub use domain::*;

mod spec;
pub use spec::*;

mod error;
pub use error::ModelError;
