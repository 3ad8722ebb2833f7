pub mod query_tests;
