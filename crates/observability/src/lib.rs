//! chatmem observability: tracing subscriber setup, OTLP export and span helpers.
//!
//! # Quick Start
//!
//! ```no_run
//! use chatmem_observability::{init, ObservabilityConfig};
//!
//! let config = ObservabilityConfig::new("chatmem")
//!     .with_otlp_endpoint("http://localhost:4317")
//!     .with_log_level("info");
//!
//! init(config)?;
//! tracing::info!("chatmem started");
//! # Ok::<(), chatmem_observability::ObservabilityError>(())
//! ```
//!
//! # Environment Variables
//!
//! - `OTEL_SERVICE_NAME` - Service name
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - OTLP endpoint (export is off when unset)
//! - `CHATMEM_LOG` or `RUST_LOG` - Log level filter

pub mod config;
pub mod error;
pub mod telemetry;
pub mod spans;

pub use config::ObservabilityConfig;
pub use error::ObservabilityError;
pub use telemetry::{init, init_from_env, shutdown};
pub use spans::{record_duration, record_error};
