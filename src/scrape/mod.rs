pub mod detail;
pub mod extractor;
pub mod page;
pub mod pagination;
pub mod pipeline;

#[cfg(test)]
mod tests;

pub use detail::DetailResolver;
pub use extractor::FieldExtractor;
pub use page::PageWalker;
pub use pagination::Paginator;
pub use pipeline::{Pipeline, Stage};
