use rand::{distr::Alphanumeric, Rng};

/// Returns `len` random ASCII alphanumeric characters.
///
/// Used for temporary column names and collection identities, not for secrets.
pub fn pseudorandom_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
