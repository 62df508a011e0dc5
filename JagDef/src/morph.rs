//! Morph (variant) resolution
//!
//! An object with a morph table is replaced at render time by one of its
//! targets, chosen by a settings value. The value is either a whole settings
//! slot (varp) or a bit window inside one (varbit). Anything that cannot be
//! resolved means "no override", never an error.

use std::collections::HashMap;

use crate::definitions::ObjectDefinition;
use crate::definitions::object::MorphControl;

/// Bit window of a varbit: bits `low..` of settings slot `setting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarbitWindow {
    pub setting: u32,
    pub low: u32,
    pub high: u32,
}

impl VarbitWindow {
    #[must_use]
    pub fn new(setting: u32, low: u32, high: u32) -> Self {
        Self { setting, low, high }
    }

    /// Extract the window from `value`, or `None` if the window is invalid.
    ///
    /// The mask has `high - low` bits set.
    #[must_use]
    pub fn extract(&self, value: i32) -> Option<i32> {
        let bits = self.high.checked_sub(self.low).filter(|&b| b < 32)?;
        let mask = (1i32 << bits).wrapping_sub(1);
        Some(value.checked_shr(self.low)? & mask)
    }
}

/// Lookup of varbit windows by varbit id.
pub trait VarbitDirectory {
    fn window(&self, varbit: u16) -> Option<VarbitWindow>;
}

impl VarbitDirectory for HashMap<u16, VarbitWindow> {
    fn window(&self, varbit: u16) -> Option<VarbitWindow> {
        self.get(&varbit).copied()
    }
}

fn setting(settings: &[i32], index: u32) -> Option<i32> {
    settings.get(usize::try_from(index).ok()?).copied()
}

/// Index into `def`'s morph table selected by `settings`.
///
/// `None` when the definition has no morph table or its control variable
/// cannot be read. An unbound table yields `-1`, which selects the fallback.
#[must_use]
pub fn morph_index<V>(def: &ObjectDefinition, settings: &[i32], varbits: &V) -> Option<i64>
where
    V: VarbitDirectory + ?Sized,
{
    let table = def.morph.as_ref()?;
    let index = match table.control {
        MorphControl::Varbit(varbit) => {
            let Some(window) = varbits.window(varbit) else {
                tracing::debug!("varbit {} missing while resolving morph for {}", varbit, def.id);
                return None;
            };
            window.extract(setting(settings, window.setting)?)?
        }
        MorphControl::Varp(varp) => setting(settings, u32::from(varp))?,
        MorphControl::Unbound => -1,
    };
    Some(i64::from(index))
}

/// Id of the object `def` currently morphs into, if any.
#[must_use]
pub fn morph_target<V>(def: &ObjectDefinition, settings: &[i32], varbits: &V) -> Option<u32>
where
    V: VarbitDirectory + ?Sized,
{
    let index = morph_index(def, settings, varbits)?;
    def.morph.as_ref()?.target(index)
}

/// Resolve `def`'s morph target through `lookup`.
///
/// One level only: the target's own morph table is not followed.
pub fn resolve_morph<V, T>(
    def: &ObjectDefinition,
    settings: &[i32],
    varbits: &V,
    lookup: impl FnOnce(u32) -> T,
) -> Option<T>
where
    V: VarbitDirectory + ?Sized,
{
    morph_target(def, settings, varbits).map(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::object::MorphTable;

    fn morphing(control: MorphControl) -> ObjectDefinition {
        let mut def = ObjectDefinition::new(1);
        def.morph = Some(MorphTable {
            control,
            targets: vec![Some(10), Some(11), Some(12), Some(13), None, Some(99)],
        });
        def
    }

    fn directory() -> HashMap<u16, VarbitWindow> {
        HashMap::from([(7, VarbitWindow::new(2, 2, 5)), (8, VarbitWindow::new(0, 6, 3))])
    }

    #[test]
    fn test_varbit_window_extraction() {
        let def = morphing(MorphControl::Varbit(7));
        let settings = [0, 0, 0b101100];
        assert_eq!(morph_index(&def, &settings, &directory()), Some(3));
        assert_eq!(morph_target(&def, &settings, &directory()), Some(13));
    }

    #[test]
    fn test_out_of_range_uses_fallback() {
        let def = morphing(MorphControl::Varp(0));
        assert_eq!(morph_target(&def, &[40], &directory()), Some(99));
        assert_eq!(morph_target(&def, &[-3], &directory()), Some(99));
        assert_eq!(morph_target(&def, &[4], &directory()), None);
    }

    #[test]
    fn test_unresolvable_is_no_override() {
        // Unknown varbit.
        assert_eq!(morph_target(&morphing(MorphControl::Varbit(1)), &[0; 4], &directory()), None);
        // Inverted window.
        assert_eq!(morph_target(&morphing(MorphControl::Varbit(8)), &[0; 4], &directory()), None);
        // Settings slot out of range.
        assert_eq!(morph_target(&morphing(MorphControl::Varp(9)), &[0; 4], &directory()), None);
        // No table at all.
        assert_eq!(morph_index(&ObjectDefinition::new(2), &[0], &directory()), None);
    }

    #[test]
    fn test_unbound_selects_fallback() {
        let def = morphing(MorphControl::Unbound);
        assert_eq!(morph_target(&def, &[], &directory()), Some(99));
    }

    #[test]
    fn test_resolve_through_lookup() {
        let def = morphing(MorphControl::Varp(0));
        let resolved = resolve_morph(&def, &[1], &directory(), ObjectDefinition::new);
        assert_eq!(resolved.map(|d| d.id), Some(11));
    }
}
