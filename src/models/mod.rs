pub mod trailer;

pub use trailer::{TrailerQuery, TrailerRequest, TrailerResult, TrailerSource, RESULT_CAP};
