pub mod price;
pub mod signals;
pub mod snapshot;

pub use price::*;
pub use signals::*;
pub use snapshot::*;
