use rand::{rngs::OsRng, RngCore};
use time::Duration;

/// Reset tokens live for one hour from issuance.
pub const RESET_TOKEN_TTL: Duration = Duration::hours(1);

/// 32 random bytes, hex-encoded: 64 characters, 256 bits of entropy. This
/// sizing is the sole defense against token guessing; do not shrink it.
const RESET_TOKEN_BYTES: usize = 32;

pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
