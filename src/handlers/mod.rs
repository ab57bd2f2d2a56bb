// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (AuthGate, then per-table permission gates)
pub mod public; // Token acquisition
pub mod protected; // Everything behind a bearer token
