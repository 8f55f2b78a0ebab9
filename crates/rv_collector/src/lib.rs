pub mod collector;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod parser;

pub use collector::ReviewCollector;
pub use config::{CollectorConfig, MarkerConfig};
pub use fetch::{PageFetcher, PageResponse, ReqwestFetcher};
pub use logging::{init_logging, LogSink, Logger, MemoryLog};
pub use parser::{parse_review_date, PageMarkers};

pub mod prelude {
    pub use super::{CollectorConfig, PageFetcher, ReviewCollector};
    pub use rv_core::{Error, Result, ReviewRecord, ReviewTable};
}
