use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use log::{debug, info};

use miniray::renderer::Renderer;
use miniray::scene::Scene;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

fn main() -> std::io::Result<()> {
    env_logger::init();

    // シーン構築（参照シーン: CT 球グリッド + カリング確認用の三角形）
    let scene = Scene::reference_scene();
    // let scene = Scene::two_spheres_in_box();
    // let scene = Scene::soft_shadow_scene();
    // let scene = Scene::mesh_scene(Path::new("resources/lowpoly_bunny.obj")).expect("load mesh scene");

    let mut renderer = Renderer::new(WIDTH, HEIGHT);

    // レンダリング
    let frame_start = Instant::now();
    renderer.render(&scene);
    info!(
        "rendered {}x{} ({} spp) in {:.1} ms",
        WIDTH,
        HEIGHT,
        renderer.sample_count(),
        frame_start.elapsed().as_secs_f64() * 1e3
    );

    // 出力ファイル名はタイムスタンプ
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs();
    let filename = format!("output/{}.bmp", timestamp);
    let out_path = Path::new(&filename);
    renderer.save_buffer(out_path)?;
    debug!("buffer flushed to {}", out_path.display());

    eprintln!("wrote {}", out_path.display());
    Ok(())
}
