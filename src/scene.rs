//! Scene graph: owns all primitives, meshes, lights and materials,
//! and answers the two intersection queries the renderer needs.
//!
//! マテリアルは値の配列で持ち、ジオメトリ側には u8 インデックスだけを置く。
//! スロット 0 は常にソリッドの赤（未設定ジオメトリの目印）。

use std::path::Path;

use crate::camera::Camera;
use crate::color::{self, ColorRgb};
use crate::hit::{CullMode, HitRecord, Plane, Sphere, Triangle};
use crate::light::{Light, LightShape};
use crate::material::Material;
use crate::math::{Point3, Ray, Vec3};
use crate::mesh::TriangleMesh;
use crate::obj_loader::{self, ObjError};
use crate::types::MaterialId;

#[derive(Clone, Debug)]
pub struct Scene {
    spheres: Vec<Sphere>,
    planes: Vec<Plane>,
    meshes: Vec<TriangleMesh>,
    lights: Vec<Light>,
    materials: Vec<Material>,
    camera: Camera,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            spheres: Vec::new(),
            planes: Vec::new(),
            meshes: Vec::new(),
            lights: Vec::new(),
            materials: vec![Material::solid_color(color::RED)],
            camera: Camera::default(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id as usize]
    }

    pub fn meshes(&self) -> &[TriangleMesh] {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut [TriangleMesh] {
        &mut self.meshes
    }

    // --- 構築 API -------------------------------------------------------

    pub fn add_sphere(
        &mut self,
        origin: Point3,
        radius: f32,
        material_index: MaterialId,
    ) -> &mut Sphere {
        self.spheres.push(Sphere {
            origin,
            radius,
            material_index,
        });
        self.spheres.last_mut().unwrap()
    }

    pub fn add_plane(
        &mut self,
        origin: Point3,
        normal: Vec3,
        material_index: MaterialId,
    ) -> &mut Plane {
        self.planes.push(Plane {
            origin,
            normal,
            material_index,
        });
        self.planes.last_mut().unwrap()
    }

    pub fn add_triangle_mesh(
        &mut self,
        cull_mode: CullMode,
        material_index: MaterialId,
    ) -> &mut TriangleMesh {
        self.meshes.push(TriangleMesh::new(cull_mode, material_index));
        self.meshes.last_mut().unwrap()
    }

    pub fn add_point_light(
        &mut self,
        origin: Point3,
        intensity: f32,
        color: ColorRgb,
    ) -> &mut Light {
        self.lights.push(Light::point(origin, intensity, color));
        self.lights.last_mut().unwrap()
    }

    pub fn add_directional_light(
        &mut self,
        direction: Vec3,
        intensity: f32,
        color: ColorRgb,
    ) -> &mut Light {
        self.lights.push(Light::directional(direction, intensity, color));
        self.lights.last_mut().unwrap()
    }

    pub fn add_area_light(
        &mut self,
        origin: Point3,
        intensity: f32,
        color: ColorRgb,
        shape: LightShape,
        radius: f32,
        vertices: Vec<Point3>,
    ) -> &mut Light {
        self.lights
            .push(Light::area(origin, intensity, color, shape, radius, vertices));
        self.lights.last_mut().unwrap()
    }

    /// マテリアルを登録してインデックスを返す。u8 に収まる 256 個まで。
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        assert!(
            self.materials.len() < MaterialId::MAX as usize + 1,
            "material table full (max 256)"
        );
        self.materials.push(material);
        (self.materials.len() - 1) as MaterialId
    }

    // --- 交差クエリ -----------------------------------------------------

    /// 全プリミティブに対する最近接ヒット。
    pub fn closest_hit(&self, ray: &Ray) -> Option<HitRecord> {
        let mut best: Option<HitRecord> = None;

        let mut consider = |candidate: Option<HitRecord>, best: &mut Option<HitRecord>| {
            if let Some(rec) = candidate {
                if best.as_ref().is_none_or(|b| rec.t < b.t) {
                    *best = Some(rec);
                }
            }
        };

        for sphere in &self.spheres {
            consider(sphere.hit(ray), &mut best);
        }
        for plane in &self.planes {
            consider(plane.hit(ray), &mut best);
        }
        for mesh in &self.meshes {
            consider(mesh.hit(ray), &mut best);
        }
        best
    }

    /// シャドウレイ用: 範囲内で何かに当たるかだけを返す。
    pub fn any_hit(&self, ray: &Ray) -> bool {
        self.spheres.iter().any(|s| s.hit_any(ray))
            || self.planes.iter().any(|p| p.hit_any(ray))
            || self.meshes.iter().any(|m| m.hit_any(ray))
    }

    // --- プリセットシーン -----------------------------------------------

    /// 箱の中の 2 球（最初の週の検証シーン）。カメラは原点から +Z、FOV 90。
    pub fn two_spheres_in_box() -> Self {
        let mut scene = Self::new();

        let blue = scene.add_material(Material::solid_color(color::BLUE));
        let yellow = scene.add_material(Material::solid_color(color::YELLOW));
        let green = scene.add_material(Material::solid_color(color::GREEN));
        let magenta = scene.add_material(Material::solid_color(color::MAGENTA));

        scene.add_sphere(Point3::new(-25.0, 0.0, 100.0), 50.0, 0);
        scene.add_sphere(Point3::new(25.0, 0.0, 100.0), 50.0, blue);

        scene.add_plane(Point3::new(-75.0, 0.0, 0.0), Vec3::UNIT_X, green);
        scene.add_plane(Point3::new(75.0, 0.0, 0.0), -Vec3::UNIT_X, green);
        scene.add_plane(Point3::new(0.0, -75.0, 0.0), Vec3::UNIT_Y, yellow);
        scene.add_plane(Point3::new(0.0, 75.0, 0.0), -Vec3::UNIT_Y, yellow);
        scene.add_plane(Point3::new(0.0, 0.0, 125.0), -Vec3::UNIT_Z, magenta);

        scene
    }

    // 参照シーン共通の部屋（5 枚の Lambert 平面）
    fn add_room(&mut self, material: MaterialId) {
        self.add_plane(Point3::new(0.0, 0.0, 10.0), -Vec3::UNIT_Z, material);
        self.add_plane(Point3::new(0.0, 0.0, 0.0), Vec3::UNIT_Y, material);
        self.add_plane(Point3::new(0.0, 10.0, 0.0), -Vec3::UNIT_Y, material);
        self.add_plane(Point3::new(5.0, 0.0, 0.0), -Vec3::UNIT_X, material);
        self.add_plane(Point3::new(-5.0, 0.0, 0.0), Vec3::UNIT_X, material);
    }

    // 金属 3 種 + 誘電体 3 種の Cook–Torrance 球
    fn add_material_ball_grid(&mut self) {
        let silver = ColorRgb::new(0.972, 0.960, 0.915);
        let plastic = ColorRgb::new(0.75, 0.75, 0.75);
        let rough_metal = self.add_material(Material::cook_torrance(silver, 1.0, 1.0));
        let medium_metal = self.add_material(Material::cook_torrance(silver, 1.0, 0.6));
        let smooth_metal = self.add_material(Material::cook_torrance(silver, 1.0, 0.1));
        let rough_plastic = self.add_material(Material::cook_torrance(plastic, 0.0, 1.0));
        let medium_plastic = self.add_material(Material::cook_torrance(plastic, 0.0, 0.6));
        let smooth_plastic = self.add_material(Material::cook_torrance(plastic, 0.0, 0.1));

        self.add_sphere(Point3::new(-1.75, 1.0, 0.0), 0.75, rough_metal);
        self.add_sphere(Point3::new(0.0, 1.0, 0.0), 0.75, medium_metal);
        self.add_sphere(Point3::new(1.75, 1.0, 0.0), 0.75, smooth_metal);
        self.add_sphere(Point3::new(-1.75, 3.0, 0.0), 0.75, rough_plastic);
        self.add_sphere(Point3::new(0.0, 3.0, 0.0), 0.75, medium_plastic);
        self.add_sphere(Point3::new(1.75, 3.0, 0.0), 0.75, smooth_plastic);
    }

    fn add_reference_lights(&mut self) {
        self.add_point_light(Point3::new(0.0, 5.0, 5.0), 50.0, ColorRgb::new(1.0, 0.61, 0.45));
        self.add_point_light(
            Point3::new(-2.5, 5.0, -5.0),
            70.0,
            ColorRgb::new(1.0, 0.80, 0.45),
        );
        self.add_point_light(
            Point3::new(2.5, 2.5, -5.0),
            50.0,
            ColorRgb::new(0.34, 0.47, 0.68),
        );
    }

    /// 参照シーン: CT 球のグリッド + カリングモード別の三角形 3 枚。
    pub fn reference_scene() -> Self {
        let mut scene = Self::new();
        scene.camera = Camera::new(Point3::new(0.0, 3.0, -9.0), 45.0);

        scene.add_material_ball_grid();

        let gray_blue =
            scene.add_material(Material::lambert(ColorRgb::new(0.49, 0.57, 0.57), 1.0));
        let white = scene.add_material(Material::lambert(color::WHITE, 1.0));
        scene.add_room(gray_blue);

        let base_triangle = Triangle::new(
            Point3::new(-0.75, 1.5, 0.0),
            Point3::new(0.75, 0.0, 0.0),
            Point3::new(-0.75, 0.0, 0.0),
        );

        let placements = [
            (CullMode::BackFace, Vec3::new(-1.75, 4.5, 0.0)),
            (CullMode::FrontFace, Vec3::new(0.0, 4.5, 0.0)),
            (CullMode::None, Vec3::new(1.75, 4.5, 0.0)),
        ];
        for (cull, offset) in placements {
            let mesh = scene.add_triangle_mesh(cull, white);
            mesh.append_triangle(&base_triangle, true);
            mesh.translate(offset);
            mesh.update_transforms(false);
        }

        scene.add_reference_lights();
        scene
    }

    /// ソフトシャドウ検証シーン: CT 球グリッドの上に三角形の面光源。
    pub fn soft_shadow_scene() -> Self {
        let mut scene = Self::new();
        scene.camera = Camera::new(Point3::new(0.0, 3.0, -9.0), 45.0);

        scene.add_material_ball_grid();
        let gray_blue =
            scene.add_material(Material::lambert(ColorRgb::new(0.49, 0.57, 0.57), 1.0));
        scene.add_room(gray_blue);

        scene.add_area_light(
            Point3::new(0.0, 8.0, -5.0),
            100.0,
            color::WHITE,
            LightShape::Triangular,
            0.0,
            vec![
                Point3::new(0.0, 8.0, -5.0),
                Point3::new(1.0, 9.0, -5.0),
                Point3::new(2.0, 8.0, -5.0),
            ],
        );
        scene
    }

    /// OBJ メッシュを読み込むシーン（バニーなどの低ポリモデル向け）。
    pub fn mesh_scene(obj_path: &Path) -> Result<Self, ObjError> {
        let mut scene = Self::new();
        scene.camera = Camera::new(Point3::new(0.0, 3.0, -9.0), 45.0);

        let gray_blue =
            scene.add_material(Material::lambert(ColorRgb::new(0.49, 0.57, 0.57), 1.0));
        let white = scene.add_material(Material::lambert(color::WHITE, 1.0));
        scene.add_room(gray_blue);

        let data = obj_loader::parse_obj(obj_path)?;
        let mesh = scene.add_triangle_mesh(CullMode::BackFace, white);
        mesh.positions = data.positions;
        mesh.indices = data.indices;
        mesh.normals = data.normals;
        mesh.update_aabb();

        mesh.scale(Vec3::splat(2.0));
        mesh.rotate_y(180.0_f32.to_radians());
        mesh.update_transforms(true);
        mesh.initialize_bvh();

        scene.add_reference_lights();
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_material_is_solid_red() {
        let scene = Scene::new();
        assert_eq!(scene.materials().len(), 1);
        match scene.material(0) {
            Material::SolidColor { color } => assert_eq!(*color, color::RED),
            other => panic!("unexpected default material: {other:?}"),
        }
    }

    #[test]
    fn add_material_returns_sequential_ids() {
        let mut scene = Scene::new();
        let a = scene.add_material(Material::lambert(color::WHITE, 1.0));
        let b = scene.add_material(Material::lambert(color::GRAY, 0.5));
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[test]
    fn closest_hit_picks_smallest_t_across_primitive_kinds() {
        let mut scene = Scene::new();
        scene.add_plane(Point3::new(0.0, 0.0, 20.0), -Vec3::UNIT_Z, 0);
        scene.add_sphere(Point3::new(0.0, 0.0, 10.0), 1.0, 0);

        let ray = Ray::new(Point3::ZERO, Vec3::UNIT_Z);
        let rec = scene.closest_hit(&ray).expect("something must be hit");
        // 球（t=9）が平面（t=20）より手前
        assert_relative_eq!(rec.t, 9.0, epsilon = 1e-4);
    }

    #[test]
    fn any_hit_respects_ray_range() {
        let mut scene = Scene::new();
        scene.add_sphere(Point3::new(0.0, 0.0, 10.0), 1.0, 0);

        let blocked = Ray::with_range(Point3::ZERO, Vec3::UNIT_Z, 1e-3, 20.0);
        let short = Ray::with_range(Point3::ZERO, Vec3::UNIT_Z, 1e-3, 5.0);
        assert!(scene.any_hit(&blocked));
        assert!(!scene.any_hit(&short));
    }

    #[test]
    fn two_spheres_scene_layout() {
        let scene = Scene::two_spheres_in_box();
        assert_eq!(scene.camera().origin, Point3::ZERO);
        assert_relative_eq!(scene.camera().fov_angle, 90.0);

        // 真っ直ぐ +Z: どちらかの球の前面に当たる
        let rec = scene
            .closest_hit(&Ray::new(Point3::ZERO, Vec3::UNIT_Z))
            .expect("box scene must be hit");
        assert!(rec.t < 125.0);
    }

    #[test]
    fn reference_scene_has_expected_population() {
        let scene = Scene::reference_scene();
        assert_eq!(scene.lights().len(), 3);
        assert_eq!(scene.meshes().len(), 3);
        // 既定の赤 + CT 6 種 + Lambert 2 種
        assert_eq!(scene.materials().len(), 9);
    }

    #[test]
    fn soft_shadow_scene_has_single_area_light() {
        let scene = Scene::soft_shadow_scene();
        assert_eq!(scene.lights().len(), 1);
        assert!(scene.lights()[0].has_soft_shadows());
        assert_eq!(scene.lights()[0].vertices.len(), 3);
    }
}
