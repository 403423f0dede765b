pub mod ecb;
pub mod parser;
pub mod util;

pub use ecb::EcbFeedClient;
pub use parser::parse_feed;
