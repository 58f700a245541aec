//! Binary value codecs for the four on-disk record kinds (§4.3).
//!
//! Every codec here is deterministic and round-trip-exact:
//! `unmarshal(marshal(x)) == x` for every value this crate itself produces
//! — see the `#[cfg(test)]` blocks in each submodule.

pub mod save_value;
pub mod sid;
pub mod state;

pub use save_value::SaveValue;
pub use sid::{INVALID_SID, Sid};
pub use state::StateValue;
