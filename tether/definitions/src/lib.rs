//! Tether API Definitions
//!
//! Concrete REST APIs described with `tether-define` primitives and driven by
//! the `tether` runtime. Each API lives in its own module.
//!
//! ## Available APIs
//!
//! - [`lakefs`] - lakeFS configuration and setup API
//!
//! ## Examples
//!
//! ```
//! use tether_definitions::lakefs::config_endpoints;
//!
//! let table = config_endpoints().unwrap();
//! assert_eq!(table.len(), 6);
//! assert!(table.contains("getLakeFSVersion"));
//! ```

pub mod lakefs;

pub use lakefs::{ConfigApi, config_endpoints};
