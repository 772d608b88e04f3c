pub mod messages;
pub mod session;

// Re-export important types
pub use messages::*;
pub use session::*;
