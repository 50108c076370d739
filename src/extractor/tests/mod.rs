mod window_tests;
mod reader_tests;
mod format_tests;
mod pyramid_tests;
