//! Caller identification
//!
//! The calling member is named by the `X-Member-Address` header. Signatures
//! are not verified here; the wallet/transport in front of this service owns
//! that.

mod middleware;

pub use middleware::{Caller, MEMBER_HEADER};
