//! HTTP Model - Minimal request representation for injection
//!
//! Provides the request, request collection, cookie and form codec
//! types the injection engine mutates. Parsing is limited to what is
//! needed to locate and replace values in HTTP/1.x request text.

pub mod cookie;
pub mod form;
pub mod request;
pub mod set;

pub use cookie::Cookie;
pub use form::{encode_form, parse_form, FormParams};
pub use request::Request;
pub use set::{RequestInput, RequestSet};
