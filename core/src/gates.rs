//! External gates consumed by callers of the engine.
//!
//! The graphical front end, the USB credential check, and the
//! time-of-day restriction live outside this crate. They appear here
//! only as the narrow interfaces a caller consults before starting a
//! batch — the draw engine itself never checks them.

use serde::Serialize;

/// Credential level reported by the authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthLevel {
    None,
    User,
    Admin,
}

/// USB/credential gate, reduced to a capability query.
pub trait AccessGate {
    fn authorization(&self) -> AuthLevel;
}

/// Time-of-day gate, reduced to a single predicate.
pub trait DrawGate {
    fn is_drawing_allowed(&self) -> bool;
}

/// Gate that always allows drawing with full authorization. Used by
/// the headless runner and tests.
pub struct AlwaysOpen;

impl DrawGate for AlwaysOpen {
    fn is_drawing_allowed(&self) -> bool {
        true
    }
}

impl AccessGate for AlwaysOpen {
    fn authorization(&self) -> AuthLevel {
        AuthLevel::Admin
    }
}
