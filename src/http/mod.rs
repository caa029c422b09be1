//! HTTP protocol layer module
//!
//! Protocol-level building blocks (validators, ranges, content types, response
//! builders), independent of how paths map to files.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used types
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_304_response, build_404_response, build_416_response, build_501_response,
    build_error_response, build_file_response, build_html_response, build_partial_response,
    build_redirect_response, empty_body, file_body, full_body, FileHeaders, ResponseBody,
};
