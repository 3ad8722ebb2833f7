pub mod model_tests;
pub mod markup_tests;
