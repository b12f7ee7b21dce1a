mod composite_tests;
mod live_tests;
