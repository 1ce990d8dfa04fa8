/*!
 * Monitoring
 * Structured tracing setup
 */

pub mod tracer;

pub use tracer::{command_span, init_tracing};
