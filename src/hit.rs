//! Hit utilities: analytic primitives, hit record, and intersection routines.
//!
//! 交差ルーチンは 2 系統ある:
//! - closest-hit (`hit`): HitRecord を返す。シーンの最近接探索に使う。
//! - any-hit (`hit_any`): bool のみ。シャドウレイ用で、三角形のカリングは
//!   向きが反転する（表を向いた面から出たシャドウレイが同じ面を見るため）。

use crate::math::{Point3, Ray, Vec3};
use crate::types::MaterialId;

// 三角形の平面判定などに使う数値安定用の閾値
const EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug)]
pub struct HitRecord {
    pub point: Point3,
    pub normal: Vec3,
    pub t: f32,
    pub material_index: MaterialId,
}

/// 三角形の表裏どちらを採用するか（メッシュ単位の設定）。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CullMode {
    FrontFace,
    #[default]
    BackFace,
    None,
}

#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub origin: Point3,
    pub radius: f32,
    pub material_index: MaterialId,
}

impl Sphere {
    pub fn hit(&self, ray: &Ray) -> Option<HitRecord> {
        let t = self.solve(ray)?;
        let point = ray.at(t);
        Some(HitRecord {
            point,
            normal: (point - self.origin).normalized(),
            t,
            material_index: self.material_index,
        })
    }

    pub fn hit_any(&self, ray: &Ray) -> bool {
        self.solve(ray).is_some()
    }

    // 二次方程式の標準形。判別式 <= 0 はミス扱い（接線は拾わない）。
    fn solve(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.origin;
        let a = ray.direction.dot(ray.direction);
        let b = 2.0 * ray.direction.dot(oc);
        let c = oc.dot(oc) - self.radius * self.radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant <= 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();

        // 近い根から試し、範囲外なら遠い根へ
        let mut t = (-b - sqrt_d) / (2.0 * a);
        if t < ray.t_min || t > ray.t_max {
            t = (-b + sqrt_d) / (2.0 * a);
            if t < ray.t_min || t > ray.t_max {
                return None;
            }
        }
        Some(t)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Plane {
    pub origin: Point3,
    pub normal: Vec3,
    pub material_index: MaterialId,
}

impl Plane {
    pub fn hit(&self, ray: &Ray) -> Option<HitRecord> {
        let t = self.solve(ray)?;
        Some(HitRecord {
            point: ray.at(t),
            normal: self.normal,
            t,
            material_index: self.material_index,
        })
    }

    pub fn hit_any(&self, ray: &Ray) -> bool {
        self.solve(ray).is_some()
    }

    fn solve(&self, ray: &Ray) -> Option<f32> {
        let denom = ray.direction.dot(self.normal);
        // ほぼ平行ならミス（NaN をフレームバッファに入れない）
        if denom.abs() < EPSILON {
            return None;
        }
        let t = (self.origin - ray.origin).dot(self.normal) / denom;
        if t < ray.t_min || t > ray.t_max {
            return None;
        }
        Some(t)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    pub v0: Point3,
    pub v1: Point3,
    pub v2: Point3,
    pub normal: Vec3,
    pub cull_mode: CullMode,
    pub material_index: MaterialId,
}

impl Triangle {
    /// 頂点から面法線を計算して構築。
    pub fn new(v0: Point3, v1: Point3, v2: Point3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalized();
        Self {
            v0,
            v1,
            v2,
            normal,
            cull_mode: CullMode::default(),
            material_index: 0,
        }
    }

    /// 事前計算済みの法線を使って構築（メッシュのフェース展開用）。
    pub fn with_normal(v0: Point3, v1: Point3, v2: Point3, normal: Vec3) -> Self {
        Self {
            v0,
            v1,
            v2,
            normal,
            cull_mode: CullMode::default(),
            material_index: 0,
        }
    }

    pub fn hit(&self, ray: &Ray) -> Option<HitRecord> {
        let t = self.solve(ray, false)?;
        Some(HitRecord {
            point: ray.at(t),
            normal: self.normal,
            t,
            material_index: self.material_index,
        })
    }

    pub fn hit_any(&self, ray: &Ray) -> bool {
        self.solve(ray, true).is_some()
    }

    // 符号付き面積テストによる交差。shadow_pass でカリングの向きが反転する。
    fn solve(&self, ray: &Ray, shadow_pass: bool) -> Option<f32> {
        let dp = self.normal.dot(ray.direction);
        if dp.abs() < EPSILON {
            return None;
        }

        let rejected = match self.cull_mode {
            CullMode::BackFace => {
                if shadow_pass {
                    dp < 0.0
                } else {
                    dp > 0.0
                }
            }
            CullMode::FrontFace => {
                if shadow_pass {
                    dp > 0.0
                } else {
                    dp < 0.0
                }
            }
            CullMode::None => false,
        };
        if rejected {
            return None;
        }

        // 平面との交点は重心を通る平面で解く
        let centroid = (self.v0 + self.v1 + self.v2) / 3.0;
        let t = (centroid - ray.origin).dot(self.normal) / dp;
        if t < ray.t_min || t > ray.t_max {
            return None;
        }

        let point = ray.at(t);

        // 3 辺の内外判定。どれか 1 つでも負なら三角形の外。
        let edges = [
            (self.v0 - self.v2, point - self.v2),
            (self.v1 - self.v0, point - self.v0),
            (self.v2 - self.v1, point - self.v1),
        ];
        for (edge, rel) in edges {
            if edge.cross(rel).dot(self.normal) < 0.0 {
                return None;
            }
        }

        Some(t)
    }
}

/// 軸平行境界箱。メッシュの包絡と BVH ノードの両方で使う。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Aabb {
    /// 成長の起点となる「空」の箱。
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// スラブ法。`closest_t` は現時点の最近接 t（枝刈り用、無ければ ray.t_max）。
    pub fn slab_test(&self, ray: &Ray, closest_t: f32) -> bool {
        let tx1 = (self.min.x - ray.origin.x) / ray.direction.x;
        let tx2 = (self.max.x - ray.origin.x) / ray.direction.x;
        let mut tmin = tx1.min(tx2);
        let mut tmax = tx1.max(tx2);

        let ty1 = (self.min.y - ray.origin.y) / ray.direction.y;
        let ty2 = (self.max.y - ray.origin.y) / ray.direction.y;
        tmin = tmin.max(ty1.min(ty2));
        tmax = tmax.min(ty1.max(ty2));

        let tz1 = (self.min.z - ray.origin.z) / ray.direction.z;
        let tz2 = (self.max.z - ray.origin.z) / ray.direction.z;
        tmin = tmin.max(tz1.min(tz2));
        tmax = tmax.min(tz1.max(tz2));

        tmax >= tmin && tmin < closest_t && tmax > 0.0
    }
}
