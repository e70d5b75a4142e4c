//! End-to-end scenarios pinning the camera math, shadowing behavior and
//! BVH/brute-force agreement on whole scenes.

use approx::assert_relative_eq;

use miniray::hit::CullMode;
use miniray::integrator::{self, IlluminationSettings, LightMode};
use miniray::light::{Light, LightShape};
use miniray::material::Material;
use miniray::math::{Point3, Ray, Vec3};
use miniray::mesh::TriangleMesh;
use miniray::renderer::{self, PixelFormat, Renderer};
use miniray::rng::Rng;
use miniray::scene::Scene;
use miniray::{color, Triangle};

// --- シナリオ 1: 箱の中の 2 球でカメラ/レイ数学を固定する ----------------

#[test]
fn two_spheres_center_pixel_ray_and_hit() {
    let scene = Scene::two_spheres_in_box();
    let camera = scene.camera();

    let (width, height) = (640_u32, 480_u32);
    let aspect = width as f32 / height as f32;
    let ray = renderer::generate_primary_ray(
        320,
        240,
        (0.0, 0.0),
        width,
        height,
        aspect,
        camera.fov_scale(),
        &camera.camera_to_world(),
    );

    // 中央ピクセルの主レイはほぼ (0,0,1)
    assert!(ray.direction.x.abs() < 3e-3);
    assert!(ray.direction.y.abs() < 3e-3);
    assert!(ray.direction.z > 0.999);
    assert_eq!(ray.origin, Point3::ZERO);

    // 最近接ヒットはどちらかの球の前面: t = 100 - sqrt(50² - 25²) ≈ 56.7
    let rec = scene.closest_hit(&ray).expect("must hit a sphere");
    let expected_t = 100.0 - (50.0_f32 * 50.0 - 25.0 * 25.0).sqrt();
    assert!((rec.t - expected_t).abs() < 0.5, "t = {}", rec.t);
    // 球のマテリアル（0=赤, 1=青）。壁のものではない。
    assert!(rec.material_index <= 1);
}

// --- シナリオ 2: 点光源の observed area ---------------------------------

#[test]
fn point_light_observed_area_is_clamped_white() {
    let mut scene = Scene::new();
    let mat = scene.add_material(Material::lambert(color::WHITE, 1.0));
    scene.add_plane(Point3::ZERO, Vec3::UNIT_Y, mat);
    let light = Light::point(Point3::new(0.0, 5.0, 0.0), 25.0, color::WHITE);

    // 床を真上から見下ろすレイで (0,0,0) を当てる
    let ray = Ray::new(Point3::new(0.0, 2.0, 0.0), -Vec3::UNIT_Y);
    let hit = scene.closest_hit(&ray).expect("floor must be hit");
    assert_relative_eq!(hit.point.y, 0.0, epsilon = 1e-4);

    let settings = IlluminationSettings {
        light_mode: LightMode::ObservedArea,
        shadows_enabled: false,
        light_samples: 1,
    };
    let mut rng = Rng::from_seed(0);
    let c = integrator::calculate_illumination(&scene, &light, &hit, ray.direction, &mut rng, &settings);
    let packed = c.max_to_one();
    assert_relative_eq!(packed.r, 1.0, epsilon = 1e-5);
    assert_relative_eq!(packed.g, 1.0, epsilon = 1e-5);
    assert_relative_eq!(packed.b, 1.0, epsilon = 1e-5);
}

// --- シナリオ 3: 影付きの床（フルパイプライン） --------------------------

fn shadowed_floor_scene() -> Scene {
    let mut scene = Scene::new();
    let floor = scene.add_material(Material::lambert(color::WHITE, 1.0));
    scene.add_plane(Point3::ZERO, Vec3::UNIT_Y, floor);
    scene.add_sphere(Point3::new(0.0, 1.0, 0.0), 1.0, floor);
    scene.add_point_light(Point3::new(0.0, 5.0, 0.0), 25.0, color::WHITE);
    scene
}

#[test]
fn floor_is_black_beneath_sphere_and_lit_beside_it() {
    let scene = shadowed_floor_scene();
    let settings = IlluminationSettings {
        light_mode: LightMode::Combined,
        shadows_enabled: true,
        light_samples: 1,
    };
    let mut rng = Rng::from_seed(0);
    let light = &scene.lights()[0];

    let below = scene
        .closest_hit(&Ray::new(Point3::new(0.3, 0.5, 0.3), -Vec3::UNIT_Y))
        .expect("floor below sphere");
    let c = integrator::calculate_illumination(&scene, light, &below, -Vec3::UNIT_Y, &mut rng, &settings);
    assert_eq!(c, miniray::ColorRgb::splat(0.0));

    let beside = scene
        .closest_hit(&Ray::new(Point3::new(3.0, 0.5, 0.0), -Vec3::UNIT_Y))
        .expect("floor beside sphere");
    let c = integrator::calculate_illumination(&scene, light, &beside, -Vec3::UNIT_Y, &mut rng, &settings);
    assert!(c.r > 0.0);
}

#[test]
fn disabling_shadows_never_darkens_any_pixel() {
    let mut scene = shadowed_floor_scene();
    scene.camera_mut().origin = Point3::new(0.0, 2.0, -6.0);

    for mode in [LightMode::ObservedArea, LightMode::Combined] {
        let mut with_shadows = Renderer::new(16, 12);
        with_shadows.set_light_mode(mode);
        with_shadows.render(&scene);

        let mut without_shadows = Renderer::new(16, 12);
        without_shadows.set_light_mode(mode);
        without_shadows.toggle_shadows();
        without_shadows.render(&scene);

        let format = PixelFormat::XRGB8888;
        for (&on, &off) in with_shadows.pixels().iter().zip(without_shadows.pixels()) {
            let [r_on, g_on, b_on] = format.unpack(on);
            let [r_off, g_off, b_off] = format.unpack(off);
            assert!(r_off >= r_on && g_off >= g_on && b_off >= b_on);
        }
    }
}

// --- シナリオ 4: メッシュ経由のカリング反転 ------------------------------

#[test]
fn mesh_cull_mode_inversion_for_shadow_rays() {
    let mut scene = Scene::new();
    let mesh = scene.add_triangle_mesh(CullMode::FrontFace, 0);
    // 法線 +Z の三角形
    mesh.append_triangle(
        &Triangle::new(
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ),
        false,
    );

    let from_front = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vec3::UNIT_Z);
    // closest-hit では正面からの FrontFaceCulling は不可視
    assert!(scene.closest_hit(&from_front).is_none());
    // シャドウレイは反転した向きで同じ三角形を見る
    assert!(scene.any_hit(&from_front));
}

// --- シナリオ 5: BVH と総当たりの一致 ------------------------------------

fn uv_sphere(stacks: u32, slices: u32, radius: f32, center: Point3) -> (Vec<Point3>, Vec<u32>) {
    use core::f32::consts::PI;
    let mut positions = Vec::new();
    for i in 0..=stacks {
        // 極は避けて開いた球にする（退化フェースを作らない）
        let phi = 0.2 + (PI - 0.4) * i as f32 / stacks as f32;
        for j in 0..slices {
            let theta = 2.0 * PI * j as f32 / slices as f32;
            positions.push(
                center
                    + Vec3::new(
                        radius * phi.sin() * theta.cos(),
                        radius * phi.cos(),
                        radius * phi.sin() * theta.sin(),
                    ),
            );
        }
    }

    let mut indices = Vec::new();
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * slices + j;
            let b = i * slices + (j + 1) % slices;
            let c = (i + 1) * slices + j;
            let d = (i + 1) * slices + (j + 1) % slices;
            indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }
    (positions, indices)
}

#[test]
fn bvh_matches_brute_force_on_low_poly_mesh() {
    let center = Point3::new(0.0, 0.0, 0.0);
    let (positions, indices) = uv_sphere(7, 14, 1.0, center);
    assert!(indices.len() / 3 >= 150, "mesh should be non-trivial");

    let brute = TriangleMesh::from_buffers(
        positions.clone(),
        indices.clone(),
        Vec::new(),
        CullMode::None,
        0,
    );
    let mut accelerated = TriangleMesh::from_buffers(positions, indices, Vec::new(), CullMode::None, 0);
    accelerated.initialize_bvh();
    assert!(accelerated.bvh().is_some());

    let mut rng = Rng::from_seed(0xB41);
    let mut hits = 0_u32;
    for _ in 0..2_000 {
        let dir_out = Vec3::new(
            rng.range_f32(-1.0, 1.0),
            rng.range_f32(-1.0, 1.0),
            rng.range_f32(-1.0, 1.0),
        )
        .normalized();
        let origin = center + dir_out * 5.0;
        let target = center
            + Vec3::new(
                rng.range_f32(-1.5, 1.5),
                rng.range_f32(-1.5, 1.5),
                rng.range_f32(-1.5, 1.5),
            );
        let ray = Ray::new(origin, (target - origin).normalized());

        let a = brute.hit(&ray);
        let b = accelerated.hit(&ray);
        assert_eq!(a.is_some(), b.is_some(), "hit/miss must agree");
        if let (Some(a), Some(b)) = (a, b) {
            hits += 1;
            assert!(
                (a.t - b.t).abs() <= 1e-4 * a.t.max(1.0),
                "t mismatch: {} vs {}",
                a.t,
                b.t
            );
        }

        assert_eq!(brute.hit_any(&ray), accelerated.hit_any(&ray));
    }
    // レイの大半が球に向かっているので十分な数のヒットが出るはず
    assert!(hits > 500, "only {hits} hits; rays are not exercising the mesh");
}

// --- シナリオ 6: 面光源のソフトシャドウ -----------------------------------

#[test]
fn area_light_penumbra_sits_between_umbra_and_open_floor() {
    let mut scene = Scene::new();
    let mat = scene.add_material(Material::lambert(color::WHITE, 1.0));
    scene.add_plane(Point3::ZERO, Vec3::UNIT_Y, mat);
    scene.add_sphere(Point3::new(0.0, 2.0, 0.0), 1.0, mat);

    // 床向き（巻き順で法線 -Y）の三角形光源
    let light = Light::area(
        Point3::new(0.0, 5.0, 0.0),
        25.0,
        color::WHITE,
        LightShape::Triangular,
        0.0,
        vec![
            Point3::new(-1.0, 5.0, -1.0),
            Point3::new(1.0, 5.0, -1.0),
            Point3::new(0.0, 5.0, 1.0),
        ],
    );

    let settings = IlluminationSettings {
        light_mode: LightMode::ObservedArea,
        shadows_enabled: true,
        light_samples: 64,
    };

    let sample_floor = |scene: &Scene, x: f32, seed: u64| {
        let ray = Ray::new(Point3::new(x, 0.5, 0.0), -Vec3::UNIT_Y);
        let hit = scene.closest_hit(&ray).expect("floor");
        let mut rng = Rng::from_seed(seed);
        integrator::calculate_illumination(scene, &light, &hit, ray.direction, &mut rng, &settings)
    };

    let umbra = sample_floor(&scene, 0.0, 1);
    let penumbra = sample_floor(&scene, 1.5, 2);
    let open = sample_floor(&scene, 4.0, 3);

    // 真下は全サンプル遮蔽で厳密にゼロ
    assert_eq!(umbra, miniray::ColorRgb::splat(0.0));
    // 半影は 0 と全開の間
    assert!(penumbra.r > 0.0, "penumbra should receive some light");
    assert!(penumbra.r < open.r, "penumbra must be darker than open floor");
    assert!(open.r > 0.5);
}

// --- 参照シーンの全体レンダリング（煙テスト） ------------------------------

#[test]
fn reference_scene_renders_without_nan_or_panic() {
    let scene = Scene::reference_scene();
    let mut renderer = Renderer::new(32, 24);
    renderer.set_sample_count(2);
    renderer.render(&scene);

    // 何かしら照らされたピクセルが存在する
    assert!(renderer.pixels().iter().any(|&p| p != 0));
}
