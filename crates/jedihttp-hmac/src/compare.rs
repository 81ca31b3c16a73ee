//! Constant-time byte comparison.

use subtle::ConstantTimeEq;

/// Compare two byte strings without short-circuiting on content.
///
/// Length is treated as public: differing lengths return `false` right away.
/// Equal-length inputs are compared with `subtle`, which visits every byte and
/// has no branch on partial equality.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
