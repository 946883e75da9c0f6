//! Loading of the tile model that gets cloned into every grid.

use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::error::ArError;
use crate::types::TilingConfig;

/// Availability of the tile model.
#[derive(Resource, Debug, Clone, Default)]
pub enum TileTemplate {
    /// Nothing requested yet.
    #[default]
    Unloaded,
    /// Load in progress; tiling is unavailable until it finishes.
    Loading(Handle<Scene>),
    /// Ready to be cloned.
    Ready(Handle<Scene>),
    /// Load failed; tiling stays unavailable for the session.
    Failed(ArError),
}

impl TileTemplate {
    /// The scene to clone, if it has finished loading.
    pub fn ready(&self) -> Option<&Handle<Scene>> {
        match self {
            TileTemplate::Ready(handle) => Some(handle),
            _ => None,
        }
    }
}

/// Start loading the tile scene named by the config.
pub fn load_tile_template(
    asset_server: Res<AssetServer>,
    config: Res<TilingConfig>,
    mut template: ResMut<TileTemplate>,
) {
    if !matches!(*template, TileTemplate::Unloaded) {
        return;
    }
    let handle = asset_server.load(GltfAssetLabel::Scene(0).from_asset(config.asset_path.clone()));
    info!("loading tile model {}", config.asset_path);
    *template = TileTemplate::Loading(handle);
}

/// Promote the template once its load state settles.
pub fn track_tile_template(asset_server: Res<AssetServer>, mut template: ResMut<TileTemplate>) {
    let TileTemplate::Loading(handle) = &*template else {
        return;
    };
    let handle = handle.clone();
    match asset_server.get_load_state(handle.id()) {
        Some(LoadState::Loaded) => {
            info!("tile model ready");
            *template = TileTemplate::Ready(handle);
        }
        Some(LoadState::Failed(err)) => {
            let err = ArError::AssetLoad(err.to_string());
            error!("{err}");
            *template = TileTemplate::Failed(err);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockArSession, TestApp};

    #[test]
    fn only_ready_template_can_be_cloned() {
        assert!(TileTemplate::Unloaded.ready().is_none());
        assert!(TileTemplate::Loading(Handle::default()).ready().is_none());
        assert!(TileTemplate::Failed(ArError::AssetLoad("missing".into()))
            .ready()
            .is_none());
        assert!(TileTemplate::Ready(Handle::default()).ready().is_some());
    }

    #[test]
    fn missing_model_fails_and_disables_tiling() {
        let mock = MockArSession::new();
        let mut app = TestApp::with_session(mock.clone()).with_tile_asset("nope/missing.gltf");

        let template = app.settle_tile_template(400);
        assert!(
            matches!(template, TileTemplate::Failed(ArError::AssetLoad(_))),
            "unexpected template state {template:?}"
        );

        // Stays failed; nothing retries the load.
        app.update();
        assert!(matches!(
            app.app.world().resource::<TileTemplate>(),
            TileTemplate::Failed(_)
        ));

        app.tap_at(&mock, Vec3::ZERO);
        app.tap_at(&mock, Vec3::new(1.0, 0.0, 0.0));
        app.tap_at(&mock, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(app.session().taps, 3);
        assert_eq!(app.session().distances, vec![100, 100]);
        assert!(app.session().pivot.is_none());
    }
}
