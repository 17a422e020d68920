pub mod capability;
pub mod config;
pub mod fallback;
pub mod key_points;
pub mod orchestrator;
pub mod paths;
pub mod pipeline;
pub mod response;
pub mod segmenter;
pub mod sentences;
pub mod session;
pub mod source;
