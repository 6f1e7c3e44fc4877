pub mod charset;

pub use charset::Charset;
