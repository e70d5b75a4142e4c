//! miniray: CPU ray tracer with analytic primitives, BVH-accelerated
//! triangle meshes and a direct-lighting integrator.
//!
//! [`renderer::Renderer`] is the entry point for drawing. [`scene::Scene`]
//! owns everything and is borrowed immutably for the duration of a frame.

pub mod brdf;
pub mod bvh;
pub mod camera;
pub mod color;
pub mod hit;
pub mod integrator;
pub mod light;
pub mod material;
pub mod math;
pub mod mesh;
pub mod obj_loader;
pub mod output;
pub mod renderer;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod types;

pub use camera::{Camera, CameraInput};
pub use color::{ColorRgb, ToneMap};
pub use hit::{Aabb, CullMode, HitRecord, Plane, Sphere, Triangle};
pub use integrator::LightMode;
pub use light::{Light, LightKind, LightShape};
pub use material::Material;
pub use math::{Mat4, Point3, Ray, Vec3};
pub use mesh::TriangleMesh;
pub use renderer::{PixelFormat, Renderer};
pub use sampler::SampleMode;
pub use scene::Scene;
pub use types::MaterialId;
