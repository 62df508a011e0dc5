//! Fixed-point trigonometry
//!
//! Angles are in 2048ths of a turn and results are scaled by 65536.

use std::sync::OnceLock;

/// Angle units per full turn.
pub const ANGLE_UNITS: i32 = 2048;

const UNIT_RADIANS: f64 = 0.0030679615;

struct Tables {
    sine: [i32; ANGLE_UNITS as usize],
    cosine: [i32; ANGLE_UNITS as usize],
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut sine = [0; ANGLE_UNITS as usize];
        let mut cosine = [0; ANGLE_UNITS as usize];
        for (i, (s, c)) in sine.iter_mut().zip(cosine.iter_mut()).enumerate() {
            let radians = i as f64 * UNIT_RADIANS;
            *s = (65536.0 * radians.sin()) as i32;
            *c = (65536.0 * radians.cos()) as i32;
        }
        Tables { sine, cosine }
    })
}

/// `sin(angle) * 65536`, with `angle` wrapped into one turn.
#[must_use]
pub fn sine(angle: i32) -> i32 {
    tables().sine[(angle & (ANGLE_UNITS - 1)) as usize]
}

/// `cos(angle) * 65536`, with `angle` wrapped into one turn.
#[must_use]
pub fn cosine(angle: i32) -> i32 {
    tables().cosine[(angle & (ANGLE_UNITS - 1)) as usize]
}

/// Rotate `(a, b)` by `angle`: `(a cos + b sin, b cos - a sin) >> 16`.
#[must_use]
pub fn rotate(a: i32, b: i32, angle: i32) -> (i32, i32) {
    let (sin, cos) = (i64::from(sine(angle)), i64::from(cosine(angle)));
    let (a, b) = (i64::from(a), i64::from(b));
    (((a * cos + b * sin) >> 16) as i32, ((b * cos - a * sin) >> 16) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_turns() {
        assert_eq!(sine(0), 0);
        assert_eq!(cosine(0), 65536);
        assert!((65535..=65536).contains(&sine(512)));
        assert!(cosine(512).abs() <= 1);
        assert_eq!(sine(ANGLE_UNITS), sine(0));
        assert_eq!(sine(-512), sine(1536));
    }

    #[test]
    fn test_rotate_identity() {
        assert_eq!(rotate(100, -40, 0), (100, -40));
    }
}
