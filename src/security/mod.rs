//! Score Submission Security
//!
//! Session tokens, HMAC score signing, and pseudo validation. The same code
//! signs on the client side and verifies on the server side, so both ends
//! always agree on the message format.

pub mod token;
pub mod signature;
pub mod pseudo;

pub use token::{SessionToken, generate_session_token};
pub use signature::{
    compute_key, verify_key, check_submission, normalize_chrono,
    Rejection, KEY_PREFIX, SENTINEL_CHRONO,
};
pub use pseudo::{validate_pseudo, PseudoError, DEFAULT_PSEUDO, MIN_PSEUDO_LEN};
