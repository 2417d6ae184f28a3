pub mod app;
pub mod backends;

pub use app::{build_pipeline, init_tracing, AppPipeline};
pub use backends::{Classifier, Generator};
