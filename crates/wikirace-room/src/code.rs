//! Room code generation.

use rand::Rng;
use wikirace_protocol::RoomCode;

const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates a random code of `len` characters from `0-9A-Z`.
///
/// Uniqueness is the caller's job: the registry regenerates while the code
/// collides with a live room.
pub(crate) fn generate(len: usize) -> RoomCode {
    let mut rng = rand::rng();
    let code: String = (0..len)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    RoomCode::from(code)
}
