//! 直接照明インテグレータ。
//!
//! 1 ライトごとの寄与を observed area × radiance × BRDF の組み合わせで計算
//! する。light mode でどの項を有効にするかを切り替えられる（デバッグ表示
//! を兼ねる）。面光源は K 本のシャドウレイでソフトシャドウを推定する。

use crate::color::ColorRgb;
use crate::hit::HitRecord;
use crate::light::{self, Light, LightShape};
use crate::math::{Ray, Vec3};
use crate::rng::Rng;
use crate::scene::Scene;

/// シャドウレイの自己交差回避バイアス。
const SHADOW_BIAS: f32 = 1e-3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightMode {
    /// ランベルトの余弦則のみ
    ObservedArea,
    /// 入射放射輝度のみ
    Radiance,
    /// BRDF のみ
    Brdf,
    /// ObservedArea × Radiance × BRDF
    #[default]
    Combined,
}

impl LightMode {
    pub fn cycled(self) -> Self {
        match self {
            LightMode::ObservedArea => LightMode::Radiance,
            LightMode::Radiance => LightMode::Brdf,
            LightMode::Brdf => LightMode::Combined,
            LightMode::Combined => LightMode::ObservedArea,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct IlluminationSettings {
    pub light_mode: LightMode,
    pub shadows_enabled: bool,
    /// 面光源 1 つあたりのサンプル数 K（1 以上）。
    pub light_samples: u32,
}

impl Default for IlluminationSettings {
    fn default() -> Self {
        Self {
            light_mode: LightMode::Combined,
            shadows_enabled: true,
            light_samples: 10,
        }
    }
}

/// 1 つのライトの寄与。`view_dir` は主レイの方向（表面→視点は -view_dir）。
pub fn calculate_illumination(
    scene: &Scene,
    light: &Light,
    hit: &HitRecord,
    view_dir: Vec3,
    rng: &mut Rng,
    settings: &IlluminationSettings,
) -> ColorRgb {
    if !light.has_soft_shadows() {
        hard_shadowed_contribution(scene, light, hit, view_dir, settings)
    } else {
        soft_shadowed_contribution(scene, light, hit, view_dir, rng, settings)
    }
}

// 点光源・平行光: シャドウレイ 1 本
fn hard_shadowed_contribution(
    scene: &Scene,
    light: &Light,
    hit: &HitRecord,
    view_dir: Vec3,
    settings: &IlluminationSettings,
) -> ColorRgb {
    let (dir_to_light, dist) = light::direction_to_light(light, light.origin, hit.point);

    if settings.shadows_enabled {
        let shadow_ray = Ray::with_range(hit.point, dir_to_light, SHADOW_BIAS, dist);
        if scene.any_hit(&shadow_ray) {
            return ColorRgb::splat(0.0);
        }
    }

    let oa = light::observed_area(light, dir_to_light, hit.normal);
    if oa <= 0.0 {
        return ColorRgb::splat(0.0);
    }

    let rad = light::radiance(light, light.origin, hit);
    let shade = scene
        .material(hit.material_index)
        .shade(hit, dir_to_light, -view_dir);

    compose(settings.light_mode, oa, rad, shade, 1.0)
}

// 面光源: K サンプルの平均と遮蔽率
fn soft_shadowed_contribution(
    scene: &Scene,
    light: &Light,
    hit: &HitRecord,
    view_dir: Vec3,
    rng: &mut Rng,
    settings: &IlluminationSettings,
) -> ColorRgb {
    let k = settings.light_samples.max(1);

    let mut hits = 0_u32;
    let mut oa_sum = 0.0_f32;
    let mut rad_sum = ColorRgb::splat(0.0);
    let mut shade_sum = ColorRgb::splat(0.0);

    for _ in 0..k {
        let sample_point = match light.shape {
            LightShape::None => continue,
            LightShape::Triangular => light::sample_triangle(
                rng,
                light.vertices[0],
                light.vertices[1],
                light.vertices[2],
            ),
        };

        let (dir_to_light, dist) = light::direction_to_light(light, sample_point, hit.point);

        if settings.shadows_enabled {
            let shadow_ray = Ray::with_range(hit.point, dir_to_light, SHADOW_BIAS, dist);
            if scene.any_hit(&shadow_ray) {
                hits += 1;
                continue;
            }
        }

        let oa = light::observed_area(light, dir_to_light, hit.normal);
        if oa > 0.0 {
            oa_sum += oa;
            rad_sum += light::radiance(light, sample_point, hit);
            shade_sum += scene
                .material(hit.material_index)
                .shade(hit, dir_to_light, -view_dir);
        }
    }

    if hits < k {
        let inv = 1.0 / k as f32;
        oa_sum *= inv;
        rad_sum *= inv;
        shade_sum *= inv;
    }

    let illumination_factor = if !settings.shadows_enabled {
        1.0
    } else {
        1.0 - hits as f32 / k as f32
    };

    compose(
        settings.light_mode,
        oa_sum,
        rad_sum,
        shade_sum,
        illumination_factor,
    )
}

fn compose(mode: LightMode, oa: f32, rad: ColorRgb, shade: ColorRgb, factor: f32) -> ColorRgb {
    match mode {
        LightMode::ObservedArea => ColorRgb::splat(oa) * factor,
        LightMode::Radiance => rad * factor,
        LightMode::Brdf => shade * factor,
        LightMode::Combined => rad * shade * oa * factor,
    }
}
