//! BRDF building blocks used by the material palette.
//!
//! 規約: l, v, n はすべて単位ベクトルで、l は表面→光源、v は表面→視点。
//! cos 項（observed area）はインテグレータ側で掛けるので、ここでは掛けない。

use crate::color::ColorRgb;
use crate::math::Vec3;
use core::f32::consts::{FRAC_1_PI, PI};

/// Lambert 拡散: ρ·kd / π。
pub fn lambert(kd: f32, color: ColorRgb) -> ColorRgb {
    color * kd * FRAC_1_PI
}

/// Lambert 拡散（反射率が色ごとに違う場合、Cook–Torrance の 1-F 用）。
pub fn lambert_color(kd: ColorRgb, color: ColorRgb) -> ColorRgb {
    color * kd * FRAC_1_PI
}

/// 古典 Phong のスペキュラ項。
/// 反射ベクトルは r = l - 2(l·n)n（l は表面→光源）。無彩色で返す。
pub fn phong(ks: f32, exponent: f32, l: Vec3, v: Vec3, n: Vec3) -> ColorRgb {
    let r = l - 2.0 * l.dot(n) * n;
    let cos_alpha = r.dot(v).max(0.0);
    ColorRgb::splat(ks * cos_alpha.powf(exponent))
}

/// Schlick のフレネル近似。h はハーフベクトル。
pub fn fresnel_schlick(h: Vec3, v: Vec3, f0: ColorRgb) -> ColorRgb {
    let cos = h.dot(v).max(0.0);
    f0 + (1.0 - f0) * (1.0 - cos).powi(5)
}

/// GGX（Trowbridge–Reitz）法線分布。α = roughness²。
pub fn normal_distribution_ggx(n: Vec3, h: Vec3, roughness: f32) -> f32 {
    let alpha = roughness * roughness;
    let alpha2 = alpha * alpha;
    let ndoth = n.dot(h);
    let denom = ndoth * ndoth * (alpha2 - 1.0) + 1.0;
    alpha2 / (PI * denom * denom)
}

/// Schlick-GGX の幾何減衰（片側）。k = (α+1)²/8。
pub fn geometry_schlick_ggx(n: Vec3, v: Vec3, roughness: f32) -> f32 {
    let alpha = roughness * roughness;
    let k = (alpha + 1.0) * (alpha + 1.0) / 8.0;
    let ndotv = n.dot(v);
    ndotv / (ndotv * (1.0 - k) + k)
}

/// Smith の幾何関数（視線側と光源側の積）。
pub fn geometry_smith(n: Vec3, v: Vec3, l: Vec3, roughness: f32) -> f32 {
    geometry_schlick_ggx(n, v, roughness) * geometry_schlick_ggx(n, l, roughness)
}
