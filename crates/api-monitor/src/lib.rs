//! Observer for API/GraphQL traffic made through an HTTP dispatcher.
//!
//! An [`ApiMonitor`] wraps any [`Dispatch`] implementation. Calls whose
//! resolved URL contains `/api/` or `/graphql` are recorded into an in-memory
//! log of [`CapturedCall`]s; every other call passes straight through. The log
//! can be cleared, filtered by URL and exported as pretty-printed JSON.
//!
//! # Example
//!
//! ```no_run
//! use api_monitor::{ApiMonitor, HttpDispatcher, MonitorConfig, RequestTarget};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = MonitorConfig::default().with_origin("https://example.com");
//! let dispatcher = HttpDispatcher::new(&config)?;
//! let monitor = ApiMonitor::new(Arc::new(dispatcher)).with_origin(config.origin_url()?);
//!
//! let response = monitor.intercept(RequestTarget::from("/api/users"), None).await?;
//! assert_eq!(monitor.responses().len(), 1);
//! println!("{} -> {}", response.status(), monitor.get_json());
//! # Ok(())
//! # }
//! ```

pub mod capture;
pub mod config;
pub mod dispatch;
pub mod monitor;

pub use capture::{
    load_export, split_export, write_split, CaptureLog, CapturedBody, CapturedCall, ExportError,
};
pub use config::{ConnectionPoolConfig, MonitorConfig};
pub use dispatch::{
    Dispatch, DispatchError, HttpDispatcher, MonitorResponse, RequestOptions, RequestTarget,
};
pub use monitor::{is_observed, ApiMonitor, OBSERVED_PATTERNS};
