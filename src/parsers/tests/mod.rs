mod detail_tests;
mod seller_tests;
