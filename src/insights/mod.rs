// =============================================================================
// Insight Generation Engine
// =============================================================================
//
// Stateless per call: a `TimeSeries` goes in, an immutable `InsightBundle`
// comes out. Nothing in here performs I/O or holds state across requests.

pub mod assembler;
pub mod bundle;
pub mod config;
pub mod result;
pub mod value;

pub use assembler::generate_insights;
pub use bundle::InsightBundle;
pub use config::{IndicatorKind, InsightConfig};
pub use result::{require, IndicatorResult};
pub use value::Value;
