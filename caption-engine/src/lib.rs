pub mod caption;
pub mod emoji;
pub mod hashtags;
pub mod pipeline;
pub mod sample;

pub use caption::CaptionPolicy;
pub use pipeline::{PostOutcome, PostPipeline};
