pub mod serve;

pub use serve::{serve_http, serve_sse, serve_stdio};
