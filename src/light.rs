//! Lights and their direction / radiance / observed-area queries.
//! Color and intensity are separated; falloff is applied per query.

use crate::color::ColorRgb;
use crate::hit::HitRecord;
use crate::math::{Point3, Vec3};
use crate::rng::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightKind {
    Point,
    Area,
    Directional,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LightShape {
    #[default]
    None,
    Triangular,
}

#[derive(Clone, Debug)]
pub struct Light {
    pub kind: LightKind,
    pub origin: Point3,
    /// Emission direction for Directional; doubles as the surface normal for Area.
    pub direction: Vec3,
    pub color: ColorRgb,
    pub intensity: f32,
    pub shape: LightShape,
    pub vertices: Vec<Point3>,
    pub radius: f32,
}

impl Light {
    pub fn point(origin: Point3, intensity: f32, color: ColorRgb) -> Self {
        Self {
            kind: LightKind::Point,
            origin,
            direction: Vec3::ZERO,
            color,
            intensity,
            shape: LightShape::None,
            vertices: Vec::new(),
            radius: 0.0,
        }
    }

    pub fn directional(direction: Vec3, intensity: f32, color: ColorRgb) -> Self {
        Self {
            kind: LightKind::Directional,
            origin: Point3::ZERO,
            direction: direction.normalized(),
            color,
            intensity,
            shape: LightShape::None,
            vertices: Vec::new(),
            radius: 0.0,
        }
    }

    pub fn area(
        origin: Point3,
        intensity: f32,
        color: ColorRgb,
        shape: LightShape,
        radius: f32,
        vertices: Vec<Point3>,
    ) -> Self {
        match shape {
            LightShape::None => assert!(vertices.is_empty(), "shapeless area light with vertices"),
            LightShape::Triangular => {
                assert_eq!(vertices.len(), 3, "triangular area light needs 3 vertices")
            }
        }

        // Fold the light-surface normal into direction
        let direction = if vertices.len() == 3 {
            (vertices[1] - vertices[0])
                .cross(vertices[2] - vertices[0])
                .normalized()
        } else {
            Vec3::ZERO
        };

        Self {
            kind: LightKind::Area,
            origin,
            direction,
            color,
            intensity,
            shape,
            vertices,
            radius,
        }
    }

    /// Infinitely small (point) or infinitely far (directional) lights
    /// do not need the soft-shadow calculations.
    pub fn has_soft_shadows(&self) -> bool {
        self.kind == LightKind::Area
    }
}

/// Unit direction from the target point to the light (or its sampled point)
/// and the distance. Directional lights are infinitely far away; the
/// direction is the reverse of the emission direction.
pub fn direction_to_light(light: &Light, light_point: Point3, hit_origin: Point3) -> (Vec3, f32) {
    match light.kind {
        LightKind::Point | LightKind::Area => {
            let mut dir = light_point - hit_origin;
            let dist = dir.normalize();
            (dir, dist)
        }
        LightKind::Directional => (-light.direction, f32::INFINITY),
    }
}

/// Incident radiance.
/// - Point/Area: color * intensity / |origin - hit|^2
/// - Area additionally multiplies the geometric term
///   max(0, dot(-direction, hit.normal)) / |sample - hit|^2
/// - Directional: color * intensity (no falloff)
pub fn radiance(light: &Light, light_point: Point3, hit: &HitRecord) -> ColorRgb {
    match light.kind {
        LightKind::Point => {
            let to_light = light.origin - hit.point;
            light.color * light.intensity / to_light.length_squared()
        }
        LightKind::Area => {
            let to_light = light.origin - hit.point;
            let base = light.color * light.intensity / to_light.length_squared();
            let facing = (-light.direction).dot(hit.normal).max(0.0);
            base * (facing / (light_point - hit.point).length_squared())
        }
        LightKind::Directional => light.color * light.intensity,
    }
}

/// Observed area (Lambert's cosine law). Clamping is the integrator's job.
pub fn observed_area(light: &Light, dir_to_light: Vec3, normal: Vec3) -> f32 {
    match light.kind {
        LightKind::Point | LightKind::Area => dir_to_light.dot(normal),
        LightKind::Directional => (-light.direction).dot(normal),
    }
}

/// Uniform sample on a triangle; mirrored back when u+v > 1.
pub fn sample_triangle(rng: &mut Rng, a: Point3, b: Point3, c: Point3) -> Point3 {
    let mut u = rng.next_f32();
    let mut v = rng.next_f32();
    if u + v > 1.0 {
        u = 1.0 - u;
        v = 1.0 - v;
    }
    (1.0 - u - v) * a + u * b + v * c
}
