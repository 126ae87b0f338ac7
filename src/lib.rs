//! httpinject - Injection point discovery and payload fan-out for HTTP requests
//!
//! Takes a template HTTP request and produces variant requests, each carrying
//! one payload at one injection point. Injection points are named fields
//! (query string, url-encoded body, cookies, JSON body), header values, or
//! raw byte ranges of the serialized request.
//!
//! # Modules
//!
//! - `http` - Request model, request sets, cookie and form codecs
//! - `payloads` - Payload store, payload specifiers and encodings
//! - `injection` - Locators, offset injection, header fuzzing and fan-out
//! - `config` - TOML configuration
//! - `errors` - Error types with diagnostics
//!
//! # Example
//!
//! ```rust,no_run
//! use httpinject::{InjectSpec, Injector, PayloadStore, Request};
//!
//! # fn main() -> httpinject::errors::Result<()> {
//! let request = Request::from_url("GET", "http://example.org/search?q=rust")?;
//! let injector = Injector::new(PayloadStore::builtin());
//!
//! let variants = injector.inject(&request, &InjectSpec::new().to("q").with_payloads("xss"))?;
//! for variant in &variants {
//!     println!("{} {:?}", variant.url, variant.payload());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod http;
pub mod injection;
pub mod payloads;

// Re-export commonly used types
pub use config::Config;
pub use errors::InjectError;
pub use http::{Request, RequestSet};
pub use injection::{find_injection_points, InjectSpec, Injector, Offset};
pub use payloads::{PayloadEncoding, PayloadSpec, PayloadStore};
