/// Scene transform stage: model -> world (lighting) -> clip space.
///
/// Produces fresh clip-space triangle and line lists every frame for the
/// renderer to consume.
pub mod camera;
pub mod mesh;

pub use camera::Camera;
pub use mesh::{cube, Mesh};

use crate::config::RenderConfig;
use crate::geometry::{colors, Line3D, Triangle};
use crate::rendering::shading::DirectionalLight;
use glam::{Mat3, Vec3};

/// World-space length of face normal debug lines.
pub const FACE_NORMAL_LENGTH: f32 = 0.1;

/// Directional light with a world position used only for its debug line.
#[derive(Copy, Clone, Debug)]
pub struct Light {
    pub position: Vec3,
    pub directional: DirectionalLight,
    /// Length of the direction line in world units.
    pub line_length: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 0.0),
            directional: DirectionalLight::default(),
            line_length: 1.5,
        }
    }
}

impl Light {
    pub fn direction_line(&self) -> (Vec3, Vec3) {
        let end = self.position + self.directional.direction * self.line_length;
        (self.position, end)
    }
}

/// World axes drawn at `origin`: x yellow, y magenta, z cyan.
#[derive(Copy, Clone, Debug)]
pub struct Gizmo {
    pub origin: Vec3,
    pub scale: f32,
}

impl Default for Gizmo {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            scale: 2.0,
        }
    }
}

impl Gizmo {
    pub fn bases(&self) -> [(Vec3, u32); 3] {
        [
            (Vec3::X, colors::YELLOW),
            (Vec3::Y, colors::MAGENTA),
            (Vec3::Z, colors::CYAN),
        ]
    }
}

pub struct World {
    pub camera: Camera,
    pub light: Light,
    pub meshes: Vec<Mesh>,
    pub gizmo: Option<Gizmo>,
    pub show_light: bool,
    triangles: Vec<Triangle>,
    lines: Vec<Line3D>,
}

impl World {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            light: Light::default(),
            meshes: Vec::new(),
            gizmo: Some(Gizmo::default()),
            show_light: true,
            triangles: Vec::new(),
            lines: Vec::new(),
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    /// Transform every mesh into clip space and light it.
    ///
    /// Lighting runs in world space: the face normal comes from the
    /// model-transformed positions, and each vertex normal is rotated by the
    /// model matrix. Normals are then handed on in camera space.
    ///
    /// With `config.show_face_normals` every triangle also adds a line from
    /// its centroid along its face normal, ahead of the gizmo and light lines.
    pub fn build_frame(&mut self, config: &RenderConfig) -> (&[Triangle], &[Line3D]) {
        self.triangles.clear();
        self.lines.clear();

        let view = self.camera.view_matrix();
        let view_proj = self.camera.view_projection_matrix();
        let view_rot = Mat3::from_mat4(view);
        let light = self.light.directional;
        let normal_color = config.face_normal_color();

        for mesh in &self.meshes {
            let model = mesh.transform();
            let model_rot = Mat3::from_mat4(model);
            let mvp = view_proj * model;

            for source in &mesh.triangles {
                let mut tri = source.clone();

                // World space, for lighting
                for vertex in &mut tri.vertices {
                    vertex.position = model * vertex.position;
                    vertex.normal = (model_rot * vertex.normal).normalize_or_zero();
                }
                tri.face_normal = tri.compute_face_normal();
                light.light_triangle(&mut tri);

                if config.show_face_normals {
                    let [a, b, c] = tri.vertices.map(|v| v.position.truncate());
                    let center = (a + b + c) / 3.0;
                    let end = center + tri.face_normal * FACE_NORMAL_LENGTH;
                    self.lines.push(Line3D::new(
                        view_proj * center.extend(1.0),
                        view_proj * end.extend(1.0),
                        normal_color,
                    ));
                }

                // Clip space for positions, camera space for normals
                for (vertex, src) in tri.vertices.iter_mut().zip(source.vertices.iter()) {
                    vertex.position = mvp * src.position;
                    vertex.normal = (view_rot * vertex.normal).normalize_or_zero();
                }
                tri.face_normal = (view_rot * tri.face_normal).normalize_or_zero();

                self.triangles.push(tri);
            }
        }

        if let Some(gizmo) = self.gizmo {
            for (axis, color) in gizmo.bases() {
                let start = view_proj * gizmo.origin.extend(1.0);
                let end = view_proj * (gizmo.origin + axis * gizmo.scale).extend(1.0);
                self.lines.push(Line3D::new(start, end, color));
            }
        }

        if self.show_light {
            let (start, end) = self.light.direction_line();
            self.lines.push(Line3D::new(
                view_proj * start.extend(1.0),
                view_proj * end.extend(1.0),
                colors::WHITE,
            ));
        }

        log::trace!(
            "world: {} triangles, {} lines from {} meshes",
            self.triangles.len(),
            self.lines.len(),
            self.meshes.len()
        );

        (&self.triangles, &self.lines)
    }
}
