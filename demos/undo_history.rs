//! Undo history that survives a restart.
//!
//! Records property changes of a small scene as before/after snapshots, writes the history to disk,
//! reloads it in a fresh "session" and undoes every step.
//!
//! Usage:
//! RUST_LOG=snapcode=debug cargo run --example undo_history

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use snapcode::{
    HostId, HostObject, HostObjects, PersistenceHooks, RecursiveSnapshot, Reflect, SnapshotContext,
    TypeDef, TypeRegistry, Value,
};
use std::collections::HashMap;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing_subscriber::EnvFilter;

// --- SCENE ---

#[derive(Debug)]
struct Camera {
    id: HostId,
    name: String,
}

impl HostObject for Camera {
    fn host_id(&self) -> HostId {
        self.id
    }
}

#[derive(Default)]
struct Scene {
    cameras: HashMap<HostId, Arc<Camera>>,
}

impl HostObjects for Scene {
    fn find(&self, id: HostId) -> Option<Value> {
        self.cameras.get(&id).map(|camera| Value::new(Arc::clone(camera)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct Color(u8, u8, u8);

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
struct Light {
    intensity: f32,
    color: Color,
    tags: Vec<String>,
}

// --- HISTORY ---

#[derive(Serialize, Deserialize)]
struct UndoRecord {
    property: String,
    before: RecursiveSnapshot,
    after: RecursiveSnapshot,
}

impl PersistenceHooks for UndoRecord {
    fn on_before_save(&mut self) {
        self.before.on_before_save();
        self.after.on_before_save();
    }

    fn on_after_load(&mut self) {
        self.before.on_after_load();
        self.after.on_after_load();
    }
}

fn registry() -> snapcode::Result<TypeRegistry> {
    TypeRegistry::builder()
        .register(TypeDef::<Color>::value("scene::Color"))
        .register(TypeDef::<Light>::object("scene::Light"))
        .register(TypeDef::<Arc<Camera>>::new("scene::Camera").host_managed())
        .register_vec::<String>()
        .build()
}

fn record(
    ctx: &SnapshotContext<'_>,
    property: &str,
    before: impl Into<Option<Value>>,
    after: impl Into<Option<Value>>,
) -> UndoRecord {
    UndoRecord {
        property: property.to_string(),
        before: RecursiveSnapshot::named(ctx, before, format!("{property}.before")),
        after: RecursiveSnapshot::named(ctx, after, format!("{property}.after")),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();

    let registry = registry()?;
    let mut scene = Scene::default();
    let main_camera = Arc::new(Camera {
        id: HostId::new(1),
        name: "main".into(),
    });
    scene.cameras.insert(main_camera.id, Arc::clone(&main_camera));

    // Session 1: record edits.
    let file = NamedTempFile::new()?;
    {
        let ctx = SnapshotContext::new(&registry).with_host(&scene);
        let dim = Light {
            intensity: 0.4,
            color: Color(255, 240, 200),
            tags: vec!["key".into()],
        };
        let bright = Light {
            intensity: 1.0,
            ..dim.clone()
        };

        let mut history = vec![
            record(&ctx, "light", Value::new(dim), Value::new(bright)),
            record(&ctx, "active_camera", None::<Value>, Value::new(Arc::clone(&main_camera))),
            record(&ctx, "tint", Value::new(Color(0, 0, 0)), Value::new(Color(10, 20, 30))),
        ];
        history.iter_mut().for_each(PersistenceHooks::on_before_save);
        serde_json::to_writer_pretty(file.as_file(), &history)?;
        println!("Recorded {} edits to {}", history.len(), file.path().display());
    }

    // Session 2: reload and undo.
    let ctx = SnapshotContext::new(&registry).with_host(&scene);
    let mut history: Vec<UndoRecord> = serde_json::from_reader(file.reopen()?)?;
    history.iter_mut().for_each(PersistenceHooks::on_after_load);

    for entry in history.iter().rev() {
        let restored = entry.before.value(&ctx)?;
        match restored {
            None => println!("undo {}: back to nothing", entry.property),
            Some(value) => {
                if let Some(light) = value.downcast_ref::<Light>() {
                    println!("undo {}: {light:?}", entry.property);
                } else if let Some(color) = value.downcast_ref::<Color>() {
                    println!("undo {}: {color:?}", entry.property);
                } else {
                    println!("undo {}: {value:?}", entry.property);
                }
            }
        }
        if let Some(camera) = entry.after.value(&ctx)?.and_then(|v| v.downcast_ref::<Arc<Camera>>()) {
            println!(
                "  redo target is camera '{}' (same object: {})",
                camera.name,
                Arc::ptr_eq(camera, &main_camera)
            );
        }
    }

    for diagnostic in ctx.take_diagnostics() {
        println!("diagnostic: {diagnostic}");
    }
    Ok(())
}
