pub mod downloader;
pub mod error;
pub mod metadata;
pub mod session;

pub use downloader::AudioDownloader;
pub use error::ConvertError;
pub use metadata::TrackInfo;
pub use session::{convert, Session};
