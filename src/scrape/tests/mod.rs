
mod detail_tests;
mod extractor_tests;
mod pagination_tests;
