//! # Utility Modules
//!
//! Supporting utilities used around the reactor core.
//!
//! ## Components
//! - **Logging**: structured logging initialization via `tracing-subscriber`

pub mod logging;
