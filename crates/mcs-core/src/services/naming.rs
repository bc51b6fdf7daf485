use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

pub const INSTANCE_PREFIX: &str = "minecraft-server-";
const SUFFIX_LEN: usize = 6;
const SUFFIX_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

static INSTANCE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^minecraft-server-[a-z0-9]{6}$").unwrap());

/// `minecraft-server-` followed by six lowercase alphanumerics.
pub fn generate_instance_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(SUFFIX_CHARSET[rng.gen_range(0..SUFFIX_CHARSET.len())]))
        .collect();
    format!("{INSTANCE_PREFIX}{suffix}")
}

/// Whether `name` could have been produced by `generate_instance_name`.
pub fn is_instance_name(name: &str) -> bool {
    INSTANCE_NAME_RE.is_match(name)
}
