mod model_spec;
pub use model_spec::ModelSpec;

mod fleet;
pub use fleet::{ClusterParams, FleetConfig, Instance};
