//! Cache key derivation
//!
//! Keys are bit-compatible with the keys the client itself derives, so two
//! requests collide exactly when the client would reuse a model. The
//! inversion bit is the definition's own flag, not the diagonal-adjusted one
//! used at import.

/// Multiplier folding each matched geometry id into a multi-role key.
pub const KEY_MULTIPLIER: i64 = 67783;

/// Key for imported base geometry: the id with the inversion flag at bit 32.
#[must_use]
pub fn base_geometry_key(id: u32, inverted: bool) -> i64 {
    i64::from(id) | i64::from(inverted) << 32
}

/// Key for a composed mesh.
///
/// `matched` is `Some` for multi-role definitions and lists the geometry
/// ids selected for `model_type`, in record order. Only the low three bits
/// of `orientation` are used.
#[must_use]
pub fn composed_key(
    id: u32,
    model_type: i32,
    frame: Option<u32>,
    orientation: i32,
    inverted: bool,
    matched: Option<&[u32]>,
) -> i64 {
    let frame = frame.map_or(-1, i64::from);
    let mut key = (frame + 1) << 32
        | i64::from(inverted) << 16
        | i64::from((id as i32).wrapping_shl(6))
        | i64::from(orientation & 7);

    if let Some(matched) = matched {
        key |= i64::from(model_type.wrapping_shl(3));
        for &geometry in matched {
            key = key.wrapping_mul(KEY_MULTIPLIER).wrapping_add(i64::from(geometry));
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_key_separates_inversion() {
        assert_eq!(base_geometry_key(5, false), 5);
        assert_eq!(base_geometry_key(5, true), 5 | 1 << 32);
    }

    #[test]
    fn test_simple_key_layout() {
        assert_eq!(composed_key(3, 10, None, 2, false, None), 3 << 6 | 2);
        assert_eq!(
            composed_key(3, 10, Some(9), 1, true, None),
            10 << 32 | 1 << 16 | 3 << 6 | 1
        );
    }

    #[test]
    fn test_multi_role_key_folds_ids_in_order() {
        let base = composed_key(3, 2, None, 0, false, Some(&[][..]));
        assert_eq!(base, 3 << 6 | 2 << 3);
        let ab = composed_key(3, 2, None, 0, false, Some(&[1, 2][..]));
        let ba = composed_key(3, 2, None, 0, false, Some(&[2, 1][..]));
        assert_eq!(ab, (base * KEY_MULTIPLIER + 1) * KEY_MULTIPLIER + 2);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_orientation_cannot_spill_into_other_bits() {
        assert_eq!(composed_key(3, 10, None, -1, false, None), 3 << 6 | 7);
        assert_eq!(composed_key(3, 10, None, 12, false, None), 3 << 6 | 4);
    }
}
