// handlers/mod.rs - Route handlers
//
// Public (no auth) → Protected (basic auth) → Resolved (basic auth plus the
// engineer named in the path)
pub mod engineers; // /engineers[/:username]
pub mod welcome; // GET /

pub use engineers::*;
pub use welcome::welcome;
