mod analyze_tests;
mod extraction_tests;
