//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary values from these to avoid drift between the
//! embedder, the knowledge base, and the gateway.

/// Default sentence-embedding dimension (MiniLM-class encoders).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Default max tokens considered per input text.
pub const DEFAULT_MAX_SEQ_LEN: usize = 256;

/// Default number of recommendations returned per request.
pub const DEFAULT_TOP_K: usize = 3;

/// Lower bound for reported recommendation confidence.
pub const CONFIDENCE_FLOOR: f32 = 0.5;

/// Upper bound for reported recommendation confidence.
pub const CONFIDENCE_CEILING: f32 = 0.99;

/// Service identity reported by `GET /`.
pub const SERVICE_NAME: &str = "uplift";

/// Hypothesis template used by the zero-shot classifier. `{}` is replaced
/// with the candidate label.
pub const DEFAULT_HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

/// Fixed resource suggestions attached to every recommendation.
pub const DEFAULT_RESOURCES: &[&str] = &["Local Partners", "Community Org", "Mobile App"];

/// Fixed delivery-timeline estimate attached to every recommendation.
pub const DEFAULT_TIMELINE: &str = "2-4 months";

/// Advisory strings returned by the analyze endpoint.
pub const ANALYZE_INSIGHTS: &[&str] = &[
    "Community engagement appears feasible.",
    "Consider low-cost pilots before scaling.",
    "Collect baseline metrics (reach, cost/benefit).",
];

/// Candidate labels for the analyze endpoint.
pub const IMPACT_LABELS: &[&str] = &["high impact", "medium impact", "low impact"];
