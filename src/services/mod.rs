pub mod history;
pub mod price_source;
pub mod refresh;
pub mod signals;

pub use history::HistoryBuffer;
pub use price_source::PriceSource;
pub use refresh::{Clock, LoopState, RefreshHandle, RefreshLoop, SystemClock};
pub use signals::{Analysis, Analyzer};
