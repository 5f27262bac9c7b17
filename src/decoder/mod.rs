//! Schema decoding: element vocabulary, staging records, the context state
//! machine and the post-pass reference resolver.

mod machine;
mod resolver;
mod staging;
mod vocabulary;

pub use machine::SchemaDecoder;
