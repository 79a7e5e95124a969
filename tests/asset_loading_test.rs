use hdri_view::resources::{decode_hdr, extract_mesh_data, load_scene_sources};
use image::Rgb;
use image::codecs::hdr::HdrEncoder;

#[test]
fn decode_hdr_roundtrips_encoded_pixels() {
    // Powers of two survive the shared-exponent encoding exactly.
    let pixels = vec![Rgb([0.25f32, 0.5, 1.0]); 4];
    let mut bytes = Vec::new();
    HdrEncoder::new(&mut bytes).encode(&pixels, 2, 2).unwrap();

    let decoded = decode_hdr(&bytes).unwrap();
    assert_eq!(decoded.dimensions(), (2, 2));
    let texel = decoded.get_pixel(1, 1);
    assert!((texel[0] - 0.25).abs() < 1e-3);
    assert!((texel[1] - 0.5).abs() < 1e-3);
    assert!((texel[2] - 1.0).abs() < 1e-3);
    assert_eq!(texel[3], 1.0);
}

#[test]
fn decode_hdr_rejects_garbage() {
    assert!(decode_hdr(b"not an hdr image").is_err());
}

#[tokio::test]
async fn model_source_is_never_touched_when_environment_fails() {
    let err = load_scene_sources("no_such_environment.hdr", "no_such_model.gltf")
        .await
        .unwrap_err();
    let message = format!("{err:#}");

    // The failure names the environment; the model source was never read,
    // so it cannot appear in the error chain.
    assert!(message.contains("no_such_environment.hdr"), "{message}");
    assert!(!message.contains("no_such_model.gltf"), "{message}");
}

/// A single triangle with a translated node, as a minimal in-memory glTF.
fn triangle_gltf() -> (gltf::Document, Vec<Vec<u8>>) {
    let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
    let indices: [u16; 3] = [0, 1, 2];

    let mut buffer = Vec::new();
    for vertex in positions {
        for component in vertex {
            buffer.extend_from_slice(&component.to_le_bytes());
        }
    }
    for index in indices {
        buffer.extend_from_slice(&index.to_le_bytes());
    }

    let json = format!(
        r#"{{
            "asset": {{"version": "2.0"}},
            "scene": 0,
            "scenes": [{{"nodes": [0]}}],
            "nodes": [{{"mesh": 0, "translation": [0.0, 0.0, 2.0]}}],
            "meshes": [{{"primitives": [{{"attributes": {{"POSITION": 0}}, "indices": 1}}]}}],
            "accessors": [
                {{
                    "bufferView": 0,
                    "componentType": 5126,
                    "count": 3,
                    "type": "VEC3",
                    "min": [0.0, 0.0, 0.0],
                    "max": [1.0, 1.0, 0.0]
                }},
                {{"bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR"}}
            ],
            "bufferViews": [
                {{"buffer": 0, "byteOffset": 0, "byteLength": 36}},
                {{"buffer": 0, "byteOffset": 36, "byteLength": 6}}
            ],
            "buffers": [{{"uri": "triangle.bin", "byteLength": {}}}]
        }}"#,
        buffer.len()
    );

    let gltf = gltf::Gltf::from_slice(json.as_bytes()).unwrap();
    (gltf.document, vec![buffer])
}

#[test]
fn mesh_extraction_bakes_node_transforms() {
    let (document, buffers) = triangle_gltf();
    let meshes = extract_mesh_data(&document, &buffers).unwrap();

    assert_eq!(meshes.len(), 1);
    let mesh = &meshes[0];
    assert_eq!(mesh.vertices.len(), 3);
    assert_eq!(mesh.indices, vec![0, 1, 2]);
    // The node translation moved every vertex to z = 2.
    for vertex in &mesh.vertices {
        assert_eq!(vertex.position[2], 2.0);
    }
    assert_eq!(mesh.vertices[1].position[0], 1.0);
    // No material on the primitive: the draw path falls back to index 0.
    assert_eq!(mesh.material_id, None);
}
