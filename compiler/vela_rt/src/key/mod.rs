//! Array keys and key normalization.
//!
//! Every value used as an index is normalized to an int or a string key
//! before it reaches storage. Strings holding a canonical decimal integer
//! become int keys, so `"42"` and `42` address the same element while
//! `"042"` stays a string.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;

use rustc_hash::FxHasher;

/// An owned, normalized key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArrayKey {
    Int(i64),
    Str(String),
}

impl ArrayKey {
    pub fn as_key_ref(&self) -> KeyRef<'_> {
        match self {
            ArrayKey::Int(k) => KeyRef::Int(*k),
            ArrayKey::Str(s) => KeyRef::Str(s),
        }
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_key_ref().fmt(f)
    }
}

/// A borrowed key, yielded by iteration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyRef<'a> {
    Int(i64),
    Str(&'a str),
}

impl KeyRef<'_> {
    pub fn to_owned_key(self) -> ArrayKey {
        match self {
            KeyRef::Int(k) => ArrayKey::Int(k),
            KeyRef::Str(s) => ArrayKey::Str(s.to_string()),
        }
    }

    pub fn as_int(self) -> Option<i64> {
        match self {
            KeyRef::Int(k) => Some(k),
            KeyRef::Str(_) => None,
        }
    }

    /// Hash used for bucket selection: the key itself for ints.
    #[expect(clippy::cast_sign_loss, reason = "bit pattern reuse")]
    pub(crate) fn storage_hash(self) -> u64 {
        match self {
            KeyRef::Int(k) => k as u64,
            KeyRef::Str(s) => string_hash(s),
        }
    }

    /// Default key ordering for `ksort`: ints numerically, strings
    /// bytewise, and mixed pairs by comparing the int's decimal form.
    pub fn default_cmp(self, other: KeyRef<'_>) -> Ordering {
        match (self, other) {
            (KeyRef::Int(a), KeyRef::Int(b)) => a.cmp(&b),
            (KeyRef::Str(a), KeyRef::Str(b)) => a.cmp(b),
            (KeyRef::Int(a), KeyRef::Str(b)) => a.to_string().as_str().cmp(b),
            (KeyRef::Str(a), KeyRef::Int(b)) => a.cmp(b.to_string().as_str()),
        }
    }
}

impl fmt::Display for KeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::Int(k) => write!(f, "{k}"),
            KeyRef::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

fn string_hash(s: &str) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write(s.as_bytes());
    hasher.write_u8(0xff);
    hasher.finish()
}

/// Parse `s` as a canonical decimal integer: optional `-`, no leading
/// zeros, no `+`, not `-0`, within `i64`.
pub(crate) fn canonical_int(s: &str) -> Option<i64> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let bytes = digits.as_bytes();
    if bytes.is_empty() || !bytes.iter().all(u8::is_ascii_digit) {
        return None;
    }
    if bytes[0] == b'0' && (bytes.len() > 1 || digits.len() != s.len()) {
        return None;
    }
    s.parse().ok()
}

/// Result of normalizing an index value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NormalizedKey {
    Key(ArrayKey),
    /// Append at the next free int key (the `$a[] = v` form).
    Append,
    /// Not usable as a key; writes are dropped with a warning.
    Illegal,
}

/// Values that can index an [`Array`](crate::Array).
pub trait IntoArrayKey {
    fn into_array_key(self) -> NormalizedKey;
}

impl IntoArrayKey for ArrayKey {
    fn into_array_key(self) -> NormalizedKey {
        NormalizedKey::Key(self)
    }
}

impl IntoArrayKey for KeyRef<'_> {
    fn into_array_key(self) -> NormalizedKey {
        NormalizedKey::Key(self.to_owned_key())
    }
}

impl IntoArrayKey for i64 {
    fn into_array_key(self) -> NormalizedKey {
        NormalizedKey::Key(ArrayKey::Int(self))
    }
}

impl IntoArrayKey for i32 {
    fn into_array_key(self) -> NormalizedKey {
        NormalizedKey::Key(ArrayKey::Int(i64::from(self)))
    }
}

impl IntoArrayKey for bool {
    fn into_array_key(self) -> NormalizedKey {
        NormalizedKey::Key(ArrayKey::Int(i64::from(self)))
    }
}

impl IntoArrayKey for f64 {
    #[expect(clippy::cast_possible_truncation, reason = "float keys truncate toward zero")]
    #[allow(clippy::float_cmp, reason = "exact integral check")]
    fn into_array_key(self) -> NormalizedKey {
        let truncated = self.trunc();
        if truncated != self {
            tracing::warn!(key = self, "fractional float used as array key, truncated");
        }
        NormalizedKey::Key(ArrayKey::Int(truncated as i64))
    }
}

impl IntoArrayKey for &str {
    fn into_array_key(self) -> NormalizedKey {
        NormalizedKey::Key(match canonical_int(self) {
            Some(k) => ArrayKey::Int(k),
            None => ArrayKey::Str(self.to_string()),
        })
    }
}

impl IntoArrayKey for &String {
    fn into_array_key(self) -> NormalizedKey {
        self.as_str().into_array_key()
    }
}

impl IntoArrayKey for String {
    fn into_array_key(self) -> NormalizedKey {
        match canonical_int(&self) {
            Some(k) => NormalizedKey::Key(ArrayKey::Int(k)),
            None => NormalizedKey::Key(ArrayKey::Str(self)),
        }
    }
}

/// `None` appends, like an absent index.
impl<K: IntoArrayKey> IntoArrayKey for Option<K> {
    fn into_array_key(self) -> NormalizedKey {
        match self {
            Some(key) => key.into_array_key(),
            None => NormalizedKey::Append,
        }
    }
}
