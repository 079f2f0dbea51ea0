//! Splitting converted messages into fixed-size groups.

/// Conventional group size for printed cipher text.
pub const GROUP_SIZE: usize = 5;

/// Splits `msg` into groups of `size` characters joined by single spaces.
/// The last group may be shorter.
///
/// # Panics
/// Panics if `size` is 0.
///
/// # Examples
///
/// ```
/// use enigma::utils::groups::group;
///
/// assert_eq!(group("QVPQSOKOILPUBKJ", 5), "QVPQS OKOIL PUBKJ");
/// assert_eq!(group("ABCDEFG", 5), "ABCDE FG");
/// ```
pub fn group(msg: &str, size: usize) -> String {
    assert!(size > 0, "group size must be positive");
    let chars: Vec<char> = msg.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / size);
    for (i, chunk) in chars.chunks(size).enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend(chunk);
    }
    out
}

/// [`group`] with the conventional group size of five.
pub fn group_five(msg: &str) -> String {
    group(msg, GROUP_SIZE)
}
