//! Material resolution for an (object, slot) pair
//!
//! Thin but load-bearing: validates a slot against the object's UV
//! availability and falls back safely. Never fails hard; every branch yields
//! a usable handle, with problems reported through the diagnostics log.

use crate::export::diagnostics::ExportLog;
use crate::export::exported::MaterialHandle;
use crate::export::props::SceneProperties;
use crate::scene::convert::MaterialConverter;
use crate::scene::SceneObject;

/// How a material resolution concluded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialOutcome {
    /// The slot's material was converted
    Converted,
    /// The slot index was out of range; fallback used
    NoSlots,
    /// The slot exists but holds no material; fallback used
    EmptySlot,
}

/// Result of resolving one material slot
#[derive(Debug)]
pub struct ResolvedMaterial {
    /// Handle to bind for the submesh (real or fallback)
    pub handle: MaterialHandle,
    /// Property statements defining the material (empty for the fallback)
    pub props: SceneProperties,
    /// Which branch produced the handle
    pub outcome: MaterialOutcome,
}

/// Resolve the material for `object`'s slot `slot_index`.
///
/// Out-of-range and empty slots resolve to the fallback with one warning
/// each. A material whose UV-mapped textures cannot be satisfied by the
/// object still converts; the missing UVs are a rendering-quality warning,
/// not a blocker.
pub fn resolve_material(
    object: &SceneObject,
    slot_index: usize,
    converter: &mut dyn MaterialConverter,
    log: &mut ExportLog,
) -> ResolvedMaterial {
    let Some(slot) = object.material_slots.get(slot_index) else {
        log.add_warning("No material defined", &object.name);
        return ResolvedMaterial {
            handle: converter.fallback(),
            props: SceneProperties::new(),
            outcome: MaterialOutcome::NoSlots,
        };
    };

    let Some(material) = &slot.material else {
        log.add_warning(
            format!("No material attached to slot {}", slot_index + 1),
            &object.name,
        );
        return ResolvedMaterial {
            handle: converter.fallback(),
            props: SceneProperties::new(),
            outcome: MaterialOutcome::EmptySlot,
        };
    };

    if material.needs_uv && material.image_texture_count > 0 && !object.has_uv_layer {
        let count = material.image_texture_count;
        let plural = if count == 1 { "" } else { "s" };
        log.add_warning(
            format!(
                "{count} image texture{plural} used, but no UVs defined. \
                 In case of bumpmaps this can lead to artifacts"
            ),
            &object.name,
        );
    }

    let (handle, props) = converter.convert(material, &object.name);
    ResolvedMaterial {
        handle,
        props,
        outcome: MaterialOutcome::Converted,
    }
}
