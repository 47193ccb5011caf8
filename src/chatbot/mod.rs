// =============================================================================
// Chatbot — natural-language front end to the insight engine
// =============================================================================

pub mod conversation;
pub mod router;

pub use router::QueryRouter;
