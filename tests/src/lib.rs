//! Shared fixtures for the integration scenarios.

use scenekit_core::SceneService;
use scenekit_object::{NodeRegistry, SceneSession};
use scenekit_scene::MemoryScene;
use std::sync::Arc;

/// A hermetic session: standard schema, fresh in-memory scene, private
/// registry. Each test gets its own, so scenarios never share state.
pub fn session() -> SceneSession {
    let scene: Arc<dyn SceneService> = Arc::new(MemoryScene::with_standard_schema());
    SceneSession::with_registry(scene, NodeRegistry::new())
}

/// Install a test subscriber once so `RUST_LOG=debug cargo test` shows the
/// object layer's reported warnings.
pub fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
