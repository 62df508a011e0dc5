use std::collections::HashMap;
use std::sync::Arc;

use glam::IVec3;
use jagdef::prelude::*;
use pretty_assertions::assert_eq;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn object_record(name: &str, model: u32) -> Vec<u8> {
    let mut w = RecordWriter::new();
    w.write_u8(2).unwrap();
    w.write_string(name).unwrap();
    w.write_u8(5).unwrap();
    w.write_u8(1).unwrap();
    w.write_wide_id(Some(model)).unwrap();
    w.write_u8(0).unwrap();
    w.finish()
}

fn triangle(colour: u16) -> Mesh {
    Mesh::new(
        vec![IVec3::new(-32, -80, -32), IVec3::new(32, 0, -32), IVec3::new(0, 0, 48)],
        vec![Face::new([0, 1, 2], colour)],
    )
}

#[test]
fn test_unknown_opcode_does_not_break_load() {
    init_logging();

    let mut bad = RecordWriter::new();
    bad.write_u8(14).unwrap();
    bad.write_u8(3).unwrap();
    bad.write_u8(255).unwrap();
    bad.write_u8(0).unwrap();

    let archive = MemoryArchive::new(SlotLayout::OBJECTS)
        .with_record(10, object_record("Before", 1))
        .with_record(11, bad.finish())
        .with_record(12, object_record("After", 2));

    let registry = ObjectRegistry::default();
    let summary = registry.load(&archive);
    assert_eq!(summary.decoded, 3);
    assert_eq!(summary.malformed, 1);

    assert_eq!(registry.lookup(10).display_name(), "Before");
    assert_eq!(registry.lookup(11).width, 3);
    assert_eq!(registry.lookup(12).display_name(), "After");
    assert_eq!(registry.lookup(12).models, ModelSet::Simple(vec![2]));
}

#[test]
fn test_lookup_is_total() {
    let engine = ContentEngine::new(EngineConfig::default()).unwrap();
    for id in [0, 1, 65_535, u32::MAX] {
        let first = engine.object(id);
        let again = engine.object(id);
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(first.id, id);
    }
    assert_eq!(engine.objects().count(), 0);
    assert_eq!(engine.animation(3).frame_count(), 1);
    assert_eq!(engine.graphic(3).breadth_scale, 128);
}

#[test]
fn test_round_trip_through_archive() {
    let mut def = ObjectDefinition::new(300);
    def.name = Some("Fountain".to_string());
    def.models = ModelSet::Typed(vec![
        TypedModel { id: 12, model_type: 10 },
        TypedModel { id: 13, model_type: 10 },
    ]);
    def.interactive = true;
    def.width = 3;
    def.length = 3;
    def.retextures = vec![(40, 41)];
    def.ambient_lighting = 20;
    def.light_diffusion = -5;
    def.area_id = Some(44);

    let archive = MemoryArchive::new(SlotLayout::OBJECTS).with_record(300, def.encode().unwrap());
    let registry = ObjectRegistry::default();
    let summary = registry.load(&archive);
    assert_eq!(summary.malformed, 0);
    assert_eq!(*registry.lookup(300), def);
}

#[test]
fn test_composed_key_hits_and_misses() {
    let mut engine = ContentEngine::new(EngineConfig::default()).unwrap();
    let mut def = ObjectDefinition::new(1);
    def.models = ModelSet::Typed(vec![
        TypedModel { id: 1, model_type: 0 },
        TypedModel { id: 2, model_type: 0 },
    ]);
    let geometry = MemoryGeometry::new()
        .with_mesh(1, triangle(1))
        .with_mesh(2, triangle(2));
    let frames = MemoryFrames::new().with_frame(3, Frame::default());
    let request = MeshRequest::new(0, 2);

    let a = engine.resolve_mesh(&def, request, None, &geometry, &frames).into_mesh().unwrap();
    let b = engine.resolve_mesh(&def, request, None, &geometry, &frames).into_mesh().unwrap();
    assert!(Arc::ptr_eq(&a, &b));

    // Different geometry order is a different mesh.
    let mut swapped = def.clone();
    swapped.models = ModelSet::Typed(vec![
        TypedModel { id: 2, model_type: 0 },
        TypedModel { id: 1, model_type: 0 },
    ]);
    let c = engine.resolve_mesh(&swapped, request, None, &geometry, &frames).into_mesh().unwrap();
    assert!(!Arc::ptr_eq(&a, &c));

    // So is a posed request, even when the pose moves nothing.
    let posed = request.with_frame(Some(3));
    let d = engine.resolve_mesh(&def, posed, None, &geometry, &frames).into_mesh().unwrap();
    assert!(!Arc::ptr_eq(&a, &d));

    let stats = engine.resolver_stats();
    assert_eq!(stats.meshes.hits, 1);
    assert_eq!(stats.meshes.misses, 3);
    // Both parts were imported once and then reused.
    assert_eq!(stats.geometry.misses, 2);
    assert_eq!(stats.geometry.hits, 4);
}

#[test]
fn test_neutral_transform_fields_change_nothing() {
    let geometry = MemoryGeometry::new().with_mesh(5, triangle(9));
    let frames = MemoryFrames::new();
    let request = MeshRequest::new(STRAIGHT_CENTREPIECE, 0);

    let mut plain = ObjectDefinition::new(1);
    plain.models = ModelSet::Simple(vec![5]);
    let mut neutral = plain.clone();
    neutral.scale = [128, 128, 128];
    neutral.translate = [0, 0, 0];

    let a = MeshResolver::default().resolve(&plain, request, &geometry, &frames);
    let b = MeshResolver::default().resolve(&neutral, request, &geometry, &frames);
    assert_eq!(a.into_mesh().unwrap(), b.into_mesh().unwrap());
}

#[test]
fn test_orientation_wraps_after_four_turns() {
    let geometry = MemoryGeometry::new().with_mesh(5, triangle(9));
    let frames = MemoryFrames::new();
    let mut def = ObjectDefinition::new(1);
    def.models = ModelSet::Simple(vec![5]);

    let mut resolver = MeshResolver::default();
    let upright = resolver
        .resolve(&def, MeshRequest::new(STRAIGHT_CENTREPIECE, 0), &geometry, &frames)
        .into_mesh()
        .unwrap();

    let mut turned = triangle(9);
    for _ in 0..4 {
        turned.rotate_clockwise();
    }
    assert_eq!(turned.vertices, triangle(9).vertices);
    assert_eq!(upright.vertices, turned.vertices);
}

#[test]
fn test_contour_is_separate_from_cache() {
    let mut engine = ContentEngine::new(EngineConfig::default()).unwrap();
    let mut def = ObjectDefinition::new(1);
    def.models = ModelSet::Simple(vec![5]);
    def.contoured_ground = true;
    let geometry = MemoryGeometry::new().with_mesh(5, triangle(9));
    let frames = MemoryFrames::new();
    let request = MeshRequest::new(STRAIGHT_CENTREPIECE, 0);

    let sloped = CornerHeights::new(0, 64, 128, 64);
    let contoured = engine
        .resolve_mesh(&def, request, Some(sloped), &geometry, &frames)
        .into_mesh()
        .unwrap();
    let plain = engine
        .resolve_mesh(&def, request, None, &geometry, &frames)
        .into_mesh()
        .unwrap();

    assert_ne!(contoured.vertices, plain.vertices);
    assert_eq!(engine.resolver_stats().meshes.hits, 1);
}

#[test]
fn test_morph_window_example() {
    let mut def = ObjectDefinition::new(1);
    def.morph = Some(MorphTable {
        control: MorphControl::Varbit(900),
        targets: vec![Some(10), Some(11), Some(12), Some(13), Some(14)],
    });
    let varbits = HashMap::from([(900_u16, VarbitWindow::new(0, 2, 5))]);

    assert_eq!(morph_index(&def, &[0b101100], &varbits), Some(3));
    assert_eq!(morph_target(&def, &[0b101100], &varbits), Some(13));
    // (0b11100 >> 2) & 0b111 = 7, past the table.
    assert_eq!(morph_target(&def, &[0b11100], &varbits), Some(14));
}

#[test]
fn test_readiness_limit() {
    init_logging();

    let mut engine = ContentEngine::new(EngineConfig::default()).unwrap();
    let mut def = ObjectDefinition::new(4);
    def.models = ModelSet::Simple(vec![70]);
    let mut geometry = MemoryGeometry::new();

    for _ in 0..500 {
        assert!(!engine.ready(&def, STRAIGHT_CENTREPIECE, &geometry));
    }
    assert!(engine.ready(&def, STRAIGHT_CENTREPIECE, &geometry));

    // One satisfied poll starts the count again.
    geometry.insert(70, triangle(1));
    assert!(engine.ready(&def, STRAIGHT_CENTREPIECE, &geometry));
    assert_eq!(engine.readiness().attempts(4, STRAIGHT_CENTREPIECE), 0);
    geometry.remove(70);
    assert!(!engine.ready(&def, STRAIGHT_CENTREPIECE, &geometry));
    assert_eq!(engine.readiness().attempts(4, STRAIGHT_CENTREPIECE), 1);
}

#[test]
fn test_strict_readiness_fails_at_limit() {
    let mut engine = ContentEngine::new(EngineConfig::default()).unwrap();
    let mut def = ObjectDefinition::new(4);
    def.models = ModelSet::Simple(vec![70]);
    let geometry = MemoryGeometry::new();

    for _ in 0..500 {
        assert!(!engine.ready_or_err(&def, STRAIGHT_CENTREPIECE, &geometry).unwrap());
    }
    assert!(matches!(
        engine.ready_or_err(&def, STRAIGHT_CENTREPIECE, &geometry),
        Err(Error::ReadinessExhausted { attempts: 501, .. })
    ));

    engine.request_geometry(&def, &geometry);
    assert_eq!(geometry.requested(), vec![70]);
}

#[test]
fn test_animated_object_poses_mesh() {
    let mut engine = ContentEngine::new(EngineConfig::default()).unwrap();

    let mut anim = RecordWriter::new();
    anim.write_u8(1).unwrap();
    anim.write_u16(1).unwrap();
    anim.write_u16(5).unwrap();
    anim.write_u16(8).unwrap();
    anim.write_u16(1).unwrap();
    anim.write_u8(0).unwrap();
    engine.load_animations(&MemoryArchive::new(SlotLayout::Flat).with_record(33, anim.finish()));

    let mut def = ObjectDefinition::new(1);
    def.models = ModelSet::Simple(vec![5]);
    def.animation = Some(33);
    let geometry = MemoryGeometry::new().with_mesh(5, triangle(9).with_vertex_groups(vec![0, 0, 1]));
    let frames = MemoryFrames::new().with_frame(
        1 << 16 | 8,
        Frame::new(vec![FrameTransform {
            kind: TransformKind::Translate,
            groups: vec![1],
            delta: IVec3::new(0, -16, 0),
        }]),
    );

    let mesh = engine
        .resolve_animated(&def, STRAIGHT_CENTREPIECE, 0, 0, &geometry, &frames)
        .into_mesh()
        .unwrap();
    assert_eq!(mesh.vertices[2], IVec3::new(0, -16, 48));
}

#[test]
fn test_texture_brightness_round() {
    let mut engine = ContentEngine::new(EngineConfig::default()).unwrap();
    let textures = HashMap::from([(1_u32, Texture::new(1, 1, vec![0xFF80_8080]))]);

    engine.set_brightness(1.0).unwrap();
    assert_eq!(engine.texture_pixels(1, &textures).unwrap()[0], 0xFF80_8080);
    engine.set_brightness(0.5).unwrap();
    assert_eq!(engine.texture_pixels(1, &textures).unwrap()[0], 0xFFB5_B5B5);
    assert!(!engine.is_texture_transparent(1, &textures));
}
