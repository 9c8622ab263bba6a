#![allow(missing_docs)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use snapcode::codec::MetaByte;
use snapcode::{
    PersistedForm, PersistenceHooks, RecursiveSnapshot, Reflect, Result, SnapshotContext,
    SnapshotOptions, TypeDef, TypeRegistry, Value,
};
use std::io::{Read, Write};
use tempfile::NamedTempFile;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Document {
    title: String,
    body: String,
}

#[derive(Debug, Default, PartialEq, Reflect)]
struct Viewport {
    zoom: f64,
    scroll: Vec<i32>,
    document: Document,
}

fn registry() -> Result<TypeRegistry> {
    TypeRegistry::builder()
        .register(TypeDef::<Document>::value("text::Document"))
        .register(TypeDef::<Viewport>::object("text::Viewport"))
        .register_vec::<i32>()
        .build()
}

fn sample_document() -> Document {
    Document {
        title: "notes".into(),
        body: "lorem ipsum ".repeat(512),
    }
}

fn blob_meta(snapshot: &RecursiveSnapshot) -> MetaByte {
    let PersistedForm::Blob(text) = snapshot.form() else {
        panic!("expected a blob");
    };
    let bytes = STANDARD.decode(text).expect("blob should be base64");
    MetaByte::from_byte(bytes[0])
}

#[test]
fn test_bincode_file_round_trip() -> Result<()> {
    let registry = registry()?;
    let ctx = SnapshotContext::new(&registry);
    let viewport = Viewport {
        zoom: 1.25,
        scroll: vec![0, 480],
        document: sample_document(),
    };

    let mut snapshot = RecursiveSnapshot::named(&ctx, Value::new(viewport), "viewport");
    snapshot.on_before_save();

    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    let bytes = bincode::serde::encode_to_vec(&snapshot, bincode::config::standard())
        .expect("Failed to encode snapshot");
    file.write_all(&bytes).expect("Failed to write snapshot");

    let mut stored = Vec::new();
    file.reopen()
        .expect("Failed to reopen temp file")
        .read_to_end(&mut stored)
        .expect("Failed to read snapshot");
    let (mut loaded, _): (RecursiveSnapshot, usize) =
        bincode::serde::decode_from_slice(&stored, bincode::config::standard())
            .expect("Failed to decode snapshot");
    loaded.on_after_load();

    let restored = loaded.value(&ctx)?.and_then(|v| v.downcast_ref::<Viewport>());
    assert_eq!(
        restored,
        Some(&Viewport {
            zoom: 1.25,
            scroll: vec![0, 480],
            document: sample_document(),
        })
    );
    assert!(ctx.diagnostics().is_empty());
    Ok(())
}

#[test]
fn test_many_entities_share_one_context() -> Result<()> {
    let registry = registry()?;
    let ctx = SnapshotContext::new(&registry);

    let history: Vec<RecursiveSnapshot> = (0..16_i32)
        .map(|step| RecursiveSnapshot::named(&ctx, Value::new(vec![step; 3]), format!("step{step}")))
        .collect();
    let json = serde_json::to_string(&history).expect("history should serialize");

    let mut loaded: Vec<RecursiveSnapshot> = serde_json::from_str(&json).expect("history should deserialize");
    loaded.iter_mut().for_each(PersistenceHooks::on_after_load);

    for (step, snapshot) in (0..16_i32).zip(&loaded) {
        assert_eq!(snapshot.name(), format!("step{step}"));
        assert_eq!(
            snapshot.value(&ctx)?.and_then(|v| v.downcast_ref::<Vec<i32>>()),
            Some(&vec![step; 3])
        );
    }
    Ok(())
}

#[test]
fn test_blobs_are_uncompressed_by_default() -> Result<()> {
    let registry = registry()?;
    let ctx = SnapshotContext::new(&registry);
    let snapshot = RecursiveSnapshot::new(&ctx, Value::new(sample_document()));

    let meta = blob_meta(&snapshot);
    assert_eq!(meta.version(), 1);
    assert_eq!(meta.compression_method(), 0);
    Ok(())
}

#[cfg(feature = "lz4_flex")]
#[test]
fn test_compressed_blobs_round_trip() -> Result<()> {
    let registry = registry()?;
    let ctx = SnapshotContext::new(&registry).with_options(SnapshotOptions::default().compression(true));

    let plain = RecursiveSnapshot::new(&SnapshotContext::new(&registry), Value::new(sample_document()));
    let snapshot = RecursiveSnapshot::new(&ctx, Value::new(sample_document()));
    assert_eq!(blob_meta(&snapshot).compression_method(), 1);

    let (PersistedForm::Blob(small), PersistedForm::Blob(large)) = (snapshot.form(), plain.form()) else {
        panic!("expected blobs");
    };
    assert!(small.len() < large.len());

    let json = serde_json::to_string(&snapshot).expect("snapshot should serialize");
    let mut loaded: RecursiveSnapshot = serde_json::from_str(&json).expect("snapshot should deserialize");
    loaded.on_after_load();

    // Decoding reads the algorithm from the blob, so a plain context restores it.
    let reader = SnapshotContext::new(&registry);
    assert_eq!(
        loaded.value(&reader)?.and_then(|v| v.downcast_ref::<Document>()),
        Some(&sample_document())
    );
    Ok(())
}

#[cfg(not(feature = "lz4_flex"))]
#[test]
fn test_compression_request_ignored_without_lz4() -> Result<()> {
    let registry = registry()?;
    let options = SnapshotOptions::default().compression(true);
    assert!(!options.compresses());

    let ctx = SnapshotContext::new(&registry).with_options(options);
    let snapshot = RecursiveSnapshot::new(&ctx, Value::new(sample_document()));
    assert_eq!(blob_meta(&snapshot).compression_method(), 0);
    Ok(())
}
