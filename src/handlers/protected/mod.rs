// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here runs behind the AuthGate. Item, role and user routes are
// additionally gated on the effective permission for their table.
pub mod items;
pub mod roles;
pub mod session;
pub mod tables;
pub mod users;
