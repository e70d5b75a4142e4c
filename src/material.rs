//! Material palette: tagged shading models over the BRDF library.
//!
//! v-table 階層ではなくタグ付き enum。シーンは値で配列を持ち、
//! HitRecord 側には `MaterialId` だけを流す。

use crate::brdf;
use crate::color::ColorRgb;
use crate::hit::HitRecord;
use crate::math::Vec3;

#[derive(Clone, Copy, Debug)]
pub enum Material {
    /// 照明を無視して色をそのまま返す（デバッグ/初期シーン用）。
    SolidColor { color: ColorRgb },
    Lambert {
        color: ColorRgb,
        /// 拡散反射率 kd ∈ [0,1]
        diffuse_reflectance: f32,
    },
    LambertPhong {
        color: ColorRgb,
        diffuse_reflectance: f32,
        specular_reflectance: f32,
        phong_exponent: f32,
    },
    CookTorrance {
        albedo: ColorRgb,
        /// 0（誘電体）か 1（金属）の二値
        metalness: f32,
        /// 0 は不可（D 項が退化する）
        roughness: f32,
    },
}

impl Material {
    pub fn solid_color(color: ColorRgb) -> Self {
        Self::SolidColor { color }
    }

    pub fn lambert(color: ColorRgb, diffuse_reflectance: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&diffuse_reflectance),
            "diffuse reflectance out of [0,1]"
        );
        Self::Lambert {
            color,
            diffuse_reflectance,
        }
    }

    pub fn lambert_phong(
        color: ColorRgb,
        diffuse_reflectance: f32,
        specular_reflectance: f32,
        phong_exponent: f32,
    ) -> Self {
        assert!(
            (0.0..=1.0).contains(&diffuse_reflectance),
            "diffuse reflectance out of [0,1]"
        );
        Self::LambertPhong {
            color,
            diffuse_reflectance,
            specular_reflectance,
            phong_exponent,
        }
    }

    pub fn cook_torrance(albedo: ColorRgb, metalness: f32, roughness: f32) -> Self {
        assert!(
            metalness == 0.0 || metalness == 1.0,
            "metalness must be 0 or 1"
        );
        assert!(roughness != 0.0, "roughness must be non-zero");
        Self::CookTorrance {
            albedo,
            metalness,
            roughness,
        }
    }

    /// 直接照明のシェーディング係数（線形色空間）。
    /// - l: 表面→光源の単位ベクトル
    /// - v: 表面→視点の単位ベクトル
    /// 呼び出し側（インテグレータ）が l·n > 0 を保証する。
    pub fn shade(&self, hit: &HitRecord, l: Vec3, v: Vec3) -> ColorRgb {
        match *self {
            Material::SolidColor { color } => color,

            Material::Lambert {
                color,
                diffuse_reflectance,
            } => brdf::lambert(diffuse_reflectance, color),

            Material::LambertPhong {
                color,
                diffuse_reflectance,
                specular_reflectance,
                phong_exponent,
            } => {
                brdf::lambert(diffuse_reflectance, color)
                    + brdf::phong(specular_reflectance, phong_exponent, l, v, hit.normal)
            }

            Material::CookTorrance {
                albedo,
                metalness,
                roughness,
            } => {
                let f0 = if metalness == 0.0 {
                    ColorRgb::splat(0.04)
                } else {
                    albedo
                };

                let h = (v + l).normalized();
                let f = brdf::fresnel_schlick(h, v, f0);
                let d = brdf::normal_distribution_ggx(hit.normal, h, roughness);
                let g = brdf::geometry_smith(hit.normal, v, l, roughness);

                let ndotv = v.dot(hit.normal);
                let ndotl = l.dot(hit.normal);

                let specular = f * (d * g / (4.0 * ndotv * ndotl));
                let diffuse = if metalness == 0.0 {
                    brdf::lambert_color(1.0 - f, albedo)
                } else {
                    ColorRgb::splat(0.0)
                };

                diffuse + specular
            }
        }
    }
}
