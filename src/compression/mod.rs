//! Block decompression for TIFF strips and tiles
//!
//! Each supported TIFF compression code maps to a handler that turns one
//! stored strip or tile into raw sample bytes.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::CompressionFactory;
pub use zstd::ZstdHandler;
