use bevy::prelude::*;
use fortloop::prelude::*;

fn main() {
    let scene = if std::env::args().any(|arg| arg == "--ldtk") {
        GameScene::LdtkShooter
    } else {
        GameScene::TiledPlatformer
    };

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(ImagePlugin::default_nearest())
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "fortloop".into(),
                        ..default()
                    }),
                    ..default()
                }),
        )
        .add_plugins(FortloopPlugin::default().with_scene(scene))
        .run();
}
