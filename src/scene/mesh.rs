/// Model-space triangle lists and their transforms.
use crate::geometry::{colors, Triangle, Vertex};
use crate::rendering::texture::Texture;
use glam::{Mat4, Quat, Vec2, Vec3};
use std::sync::Arc;

/// A single-owner triangle list placed in the world by `transform`.
/// Positions are model space with `w = 1`.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
    pub scale: Vec3,
    pub rotation: Quat,
    pub translation: Vec3,
}

impl Mesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self {
            triangles,
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
            translation: Vec3::ZERO,
        }
    }

    /// Model matrix: scale, then rotate, then translate.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation = Quat::from_rotation_y(angle) * self.rotation;
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }
}

/// Outward normal plus two in-plane axes with `u x v == normal`, so corners
/// listed (-u-v, +u-v, +u+v, -u+v) wind counter-clockwise seen from outside.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

/// Cube spanning [-1, 1] on every axis, two triangles per face, each face
/// mapped to the full texture.
pub fn cube(texture: Option<Arc<Texture>>) -> Mesh {
    let mut triangles = Vec::with_capacity(12);

    for (normal, u, v) in CUBE_FACES {
        let corner = |su: f32, sv: f32, uv: Vec2| {
            Vertex::new((normal + u * su + v * sv).extend(1.0), uv).with_normal(normal)
        };
        let quad = [
            corner(-1.0, -1.0, Vec2::new(0.0, 0.0)),
            corner(1.0, -1.0, Vec2::new(1.0, 0.0)),
            corner(1.0, 1.0, Vec2::new(1.0, 1.0)),
            corner(-1.0, 1.0, Vec2::new(0.0, 1.0)),
        ];

        for [a, b, c] in [[0, 1, 2], [0, 2, 3]] {
            let mut tri = Triangle::new([quad[a], quad[b], quad[c]]).with_color(colors::WHITE);
            tri.face_normal = normal;
            tri.texture = texture.clone();
            triangles.push(tri);
        }
    }

    Mesh::new(triangles)
}
