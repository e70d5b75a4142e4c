//! Triangle mesh: source buffers + lazily retransformed world-space caches.
//!
//! ソースの positions / indices / フェース法線は不変で、
//! `update_transforms` が translation * rotation * scale を適用した
//! キャッシュ（transformed_*, ワールド AABB）を作り直す。
//! BVH を初期化済みのメッシュでは、キャッシュ更新時に BVH も作り直す。

use crate::bvh::Bvh;
use crate::hit::{Aabb, CullMode, HitRecord, Triangle};
use crate::math::{Mat4, Point3, Ray, Vec3};
use crate::types::MaterialId;

#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    pub positions: Vec<Point3>,
    /// 3 個で 1 フェース。共有頂点は positions のインデックスで表す。
    pub indices: Vec<u32>,
    /// フェースごとの法線（indices 3 個につき 1 本）。
    pub normals: Vec<Vec3>,

    translation: Mat4,
    rotation: Mat4,
    scale: Mat4,
    dirty: bool,

    pub transformed_positions: Vec<Point3>,
    pub transformed_normals: Vec<Vec3>,

    local_aabb: Aabb,
    pub transformed_aabb: Aabb,

    bvh: Option<Bvh>,

    pub cull_mode: CullMode,
    pub material_index: MaterialId,
}

impl TriangleMesh {
    pub fn new(cull_mode: CullMode, material_index: MaterialId) -> Self {
        Self {
            cull_mode,
            material_index,
            translation: Mat4::IDENTITY,
            rotation: Mat4::IDENTITY,
            scale: Mat4::IDENTITY,
            local_aabb: Aabb::EMPTY,
            transformed_aabb: Aabb::EMPTY,
            ..Self::default()
        }
    }

    /// 既存バッファから構築。法線が空ならフェースから計算する。
    pub fn from_buffers(
        positions: Vec<Point3>,
        indices: Vec<u32>,
        normals: Vec<Vec3>,
        cull_mode: CullMode,
        material_index: MaterialId,
    ) -> Self {
        let mut mesh = Self::new(cull_mode, material_index);
        mesh.positions = positions;
        mesh.indices = indices;
        mesh.normals = normals;
        if mesh.normals.is_empty() {
            mesh.calculate_normals();
        }
        mesh.update_aabb();
        mesh.dirty = true;
        mesh.update_transforms(false);
        mesh
    }

    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn translate(&mut self, t: Vec3) {
        self.translation = Mat4::from_translation(t);
        self.dirty = true;
    }

    pub fn rotate_y(&mut self, yaw: f32) {
        self.rotation = Mat4::rotation_y(yaw);
        self.dirty = true;
    }

    pub fn scale(&mut self, s: Vec3) {
        self.scale = Mat4::from_scale(s);
        self.dirty = true;
    }

    /// 三角形を 1 つ追加する。大量追加時は `defer_update` で
    /// トランスフォーム更新を呼び出し側にまとめさせる。
    pub fn append_triangle(&mut self, triangle: &Triangle, defer_update: bool) {
        let start = self.positions.len() as u32;
        self.positions.push(triangle.v0);
        self.positions.push(triangle.v1);
        self.positions.push(triangle.v2);
        self.indices.extend_from_slice(&[start, start + 1, start + 2]);
        self.normals.push(triangle.normal);

        self.update_aabb();
        self.dirty = true;
        if !defer_update {
            self.update_transforms(false);
        }
    }

    /// フェース法線を positions/indices から計算し直す。
    pub fn calculate_normals(&mut self) {
        self.normals.clear();
        self.normals.reserve(self.face_count());
        for face in 0..self.face_count() {
            let [v0, v1, v2] = self.face_positions(face);
            self.normals.push((v1 - v0).cross(v2 - v0).normalized());
        }
    }

    fn face_positions(&self, face: usize) -> [Point3; 3] {
        let base = face * 3;
        [
            self.positions[self.indices[base] as usize],
            self.positions[self.indices[base + 1] as usize],
            self.positions[self.indices[base + 2] as usize],
        ]
    }

    /// ソース頂点のローカル AABB を更新。
    pub fn update_aabb(&mut self) {
        let mut aabb = Aabb::EMPTY;
        for p in &self.positions {
            aabb.grow(*p);
        }
        self.local_aabb = aabb;
    }

    /// dirty のときだけ（または force 指定時）キャッシュを作り直す。
    pub fn update_transforms(&mut self, force: bool) {
        if !force && !self.dirty {
            return;
        }

        let final_transform = self.translation * self.rotation * self.scale;

        self.transformed_positions.clear();
        self.transformed_positions.reserve(self.positions.len());
        for p in &self.positions {
            self.transformed_positions
                .push(final_transform.transform_point(*p));
        }

        self.transformed_normals.clear();
        self.transformed_normals.reserve(self.normals.len());
        for n in &self.normals {
            // 回転 + 一様スケールを想定。長さが変わるので単位化して戻す。
            self.transformed_normals
                .push(final_transform.transform_vector(*n).normalized());
        }

        self.update_transformed_aabb(&final_transform);
        self.dirty = false;

        // ワールド座標の BVH はキャッシュと一緒に無効になる
        if self.bvh.is_some() {
            self.initialize_bvh();
        }
    }

    // ローカル AABB の 8 頂点を変換して包み直す
    fn update_transformed_aabb(&mut self, transform: &Mat4) {
        let lo = self.local_aabb.min;
        let hi = self.local_aabb.max;
        let corners = [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ];

        let mut aabb = Aabb::EMPTY;
        for c in corners {
            aabb.grow(transform.transform_point(c));
        }
        self.transformed_aabb = aabb;
    }

    /// ワールド空間キャッシュの上に BVH を構築する。
    /// `update_transforms` 後に呼ぶこと。以降の更新では自動で追従する。
    pub fn initialize_bvh(&mut self) {
        debug_assert_eq!(
            self.transformed_positions.len(),
            self.positions.len(),
            "BVH must be built over up-to-date transformed positions"
        );
        self.bvh = Some(Bvh::build(&self.transformed_positions, &self.indices));
    }

    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    /// フェースをワールド空間の Triangle として展開する。
    fn face_triangle(&self, face: u32) -> Triangle {
        let base = (face * 3) as usize;
        let mut tri = Triangle::with_normal(
            self.transformed_positions[self.indices[base] as usize],
            self.transformed_positions[self.indices[base + 1] as usize],
            self.transformed_positions[self.indices[base + 2] as usize],
            self.transformed_normals[face as usize],
        );
        tri.cull_mode = self.cull_mode;
        tri.material_index = self.material_index;
        tri
    }

    pub fn hit(&self, ray: &Ray) -> Option<HitRecord> {
        if let Some(bvh) = &self.bvh {
            return bvh.closest_hit(ray, |face, closest| {
                let shrunk = Ray::with_range(ray.origin, ray.direction, ray.t_min, closest);
                self.face_triangle(face).hit(&shrunk)
            });
        }

        // BVH なし: 包絡 AABB で弾いてから全フェースを線形に走査
        if !self.transformed_aabb.slab_test(ray, ray.t_max) {
            return None;
        }
        let mut best: Option<HitRecord> = None;
        for face in 0..self.face_count() as u32 {
            let closest = best.as_ref().map_or(ray.t_max, |b| b.t);
            let shrunk = Ray::with_range(ray.origin, ray.direction, ray.t_min, closest);
            if let Some(rec) = self.face_triangle(face).hit(&shrunk) {
                if best.as_ref().is_none_or(|b| rec.t < b.t) {
                    best = Some(rec);
                }
            }
        }
        best
    }

    pub fn hit_any(&self, ray: &Ray) -> bool {
        if let Some(bvh) = &self.bvh {
            return bvh.any_hit(ray, |face| self.face_triangle(face).hit_any(ray));
        }

        if !self.transformed_aabb.slab_test(ray, ray.t_max) {
            return false;
        }
        (0..self.face_count() as u32).any(|face| self.face_triangle(face).hit_any(ray))
    }
}
