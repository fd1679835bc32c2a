/// Rasterizer properties: depth ordering, perspective-correct attributes,
/// winding and shading.
use glam::{Vec2, Vec3, Vec4};
use softraster::*;
use std::sync::Arc;

const W: usize = 16;
const H: usize = 16;

/// Screen-space triangle: (x, y, depth) per corner, `1/w` of 1.
fn screen_tri(p: [(f32, f32, f32); 3], color: u32) -> Triangle {
    let uvs = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
    let mut tri = Triangle::new([
        Vertex::new(Vec4::new(p[0].0, p[0].1, p[0].2, 1.0), uvs[0]),
        Vertex::new(Vec4::new(p[1].0, p[1].1, p[1].2, 1.0), uvs[1]),
        Vertex::new(Vec4::new(p[2].0, p[2].1, p[2].2, 1.0), uvs[2]),
    ])
    .with_color(color);
    tri.update_signed_area();
    tri
}

fn config(mode: RenderMode, shading: ShadingMode) -> RenderConfig {
    RenderConfig {
        render_mode: mode,
        shading_mode: shading,
        ..RenderConfig::default()
    }
}

fn fresh_framebuffer() -> Framebuffer {
    let mut fb = Framebuffer::new(W, H);
    fb.clear(colors::BLUE);
    fb
}

#[test]
fn closer_triangle_wins_in_either_draw_order() {
    let far = screen_tri([(0.0, 0.0, 0.8), (16.0, 0.0, 0.8), (0.0, 16.0, 0.8)], colors::RED);
    let near = screen_tri([(2.0, 2.0, 0.2), (14.0, 2.0, 0.2), (2.0, 14.0, 0.2)], colors::GREEN);
    let cfg = config(RenderMode::Solid, ShadingMode::None);

    let mut a = fresh_framebuffer();
    Rasterizer.rasterize(&mut a, &far, &cfg);
    Rasterizer.rasterize(&mut a, &near, &cfg);

    let mut b = fresh_framebuffer();
    Rasterizer.rasterize(&mut b, &near, &cfg);
    Rasterizer.rasterize(&mut b, &far, &cfg);

    assert_eq!(a.pixel(4, 4), colors::GREEN);
    assert!((a.depth(4, 4) - 0.2).abs() < 1e-6);
    assert_eq!(a.pixel(1, 1), colors::RED);
    assert_eq!(a.color_buffer, b.color_buffer);
    assert_eq!(a.depth_buffer, b.depth_buffer);
}

#[test]
fn equal_depth_keeps_the_first_triangle() {
    let first = screen_tri([(0.0, 0.0, 0.5), (16.0, 0.0, 0.5), (0.0, 16.0, 0.5)], colors::RED);
    let second = first.clone().with_color(colors::GREEN);
    let cfg = config(RenderMode::Solid, ShadingMode::None);

    let mut fb = fresh_framebuffer();
    Rasterizer.rasterize(&mut fb, &first, &cfg);
    assert_eq!(Rasterizer.rasterize(&mut fb, &second, &cfg), Coverage::Drawn(0));
    assert_eq!(fb.pixel(3, 3), colors::RED);
}

#[test]
fn perspective_uv_reproduces_vertex_uvs() {
    let viewport = Viewport::new(100, 100).unwrap();
    let clip = [
        Vec4::new(-0.5, -0.5, 0.0, 1.0),
        Vec4::new(2.0, -1.0, 1.0, 4.0),
        Vec4::new(0.0, 1.5, 0.5, 2.0),
    ];
    let uvs = [Vec2::new(0.1, 0.2), Vec2::new(0.9, 0.3), Vec2::new(0.4, 0.8)];

    let mut tri = Triangle::new([
        Vertex::new(clip[0], uvs[0]),
        Vertex::new(clip[1], uvs[1]),
        Vertex::new(clip[2], uvs[2]),
    ]);
    viewport.project_triangle(&mut tri);

    let xy = tri.vertices.map(|v| v.xy());
    for (i, expected) in uvs.iter().enumerate() {
        let bary = barycentric(xy[0], xy[1], xy[2], xy[i]).unwrap();
        let uv = perspective_correct_uv(&tri, bary).unwrap();
        assert!(uv.abs_diff_eq(*expected, 1e-5), "corner {}: {:?} vs {:?}", i, uv, expected);
    }
}

#[test]
fn perspective_uv_matches_the_clip_space_interior_point() {
    let viewport = Viewport::new(100, 100).unwrap();
    let clip = [
        Vec4::new(-0.5, -0.5, 0.0, 1.0),
        Vec4::new(2.0, -1.0, 1.0, 4.0),
        Vec4::new(0.0, 1.5, 0.5, 2.0),
    ];
    let uvs = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
    let lambda = Vec3::new(0.2, 0.3, 0.5);

    let mut tri = Triangle::new([
        Vertex::new(clip[0], uvs[0]),
        Vertex::new(clip[1], uvs[1]),
        Vertex::new(clip[2], uvs[2]),
    ]);
    viewport.project_triangle(&mut tri);

    // The same point before the divide, and where it lands on screen.
    let point = clip[0] * lambda.x + clip[1] * lambda.y + clip[2] * lambda.z;
    let screen = viewport.project_point(point);
    let expected = uvs[0] * lambda.x + uvs[1] * lambda.y + uvs[2] * lambda.z;

    let xy = tri.vertices.map(|v| v.xy());
    let bary = barycentric(xy[0], xy[1], xy[2], Vec2::new(screen.x, screen.y)).unwrap();
    let uv = perspective_correct_uv(&tri, bary).unwrap();
    assert!(uv.abs_diff_eq(expected, 1e-4), "{:?} vs {:?}", uv, expected);

    // Plain screen-space interpolation would be visibly off here.
    let affine = uvs[0] * bary.x + uvs[1] * bary.y + uvs[2] * bary.z;
    assert!(!affine.abs_diff_eq(expected, 1e-2));
}

#[test]
fn winding_decides_front_facing() {
    let ccw = screen_tri([(0.0, 0.0, 0.5), (4.0, 0.0, 0.5), (0.0, 4.0, 0.5)], colors::WHITE);
    let mut cw = ccw.clone();
    cw.vertices.swap(1, 2);
    assert!(ccw.is_front_facing());
    assert!(!cw.is_front_facing());
    assert_eq!(ccw.signed_area, 16.0);
    assert_eq!(cw.update_signed_area(), -16.0);
}

#[test]
fn flat_shading_scales_the_face_colour() {
    let tri = screen_tri([(0.0, 0.0, 0.5), (16.0, 0.0, 0.5), (0.0, 16.0, 0.5)], 0xFF646464).with_flat_value(0.5);
    let mut fb = fresh_framebuffer();
    Rasterizer.rasterize(&mut fb, &tri, &config(RenderMode::Solid, ShadingMode::Flat));
    assert_eq!(fb.pixel(2, 2), apply_intensity(0xFF646464, 0.5));
    assert_eq!(fb.pixel(2, 2), 0xFF323232);
}

#[test]
fn gouraud_is_uniform_across_interpolation_modes() {
    let mut tri = screen_tri([(0.0, 0.0, 0.5), (16.0, 0.0, 0.5), (0.0, 16.0, 0.5)], 0xFF646464);
    for v in &mut tri.vertices {
        v.gouraud = 0.5;
        v.position.w = 0.25;
    }

    for interpolation in [GouraudInterpolation::Affine, GouraudInterpolation::PerspectiveCorrect] {
        let mut cfg = config(RenderMode::Solid, ShadingMode::Gouraud);
        cfg.gouraud_interpolation = interpolation;
        let mut fb = fresh_framebuffer();
        Rasterizer.rasterize(&mut fb, &tri, &cfg);
        assert_eq!(fb.pixel(3, 5), 0xFF323232, "{:?}", interpolation);
    }
}

#[test]
fn gouraud_blends_between_vertices() {
    let mut tri = screen_tri([(0.0, 0.0, 0.5), (16.0, 0.0, 0.5), (0.0, 16.0, 0.5)], colors::WHITE);
    tri.vertices[0].gouraud = 0.0;
    tri.vertices[1].gouraud = 1.0;
    tri.vertices[2].gouraud = 0.0;

    let mut fb = fresh_framebuffer();
    Rasterizer.rasterize(&mut fb, &tri, &config(RenderMode::Solid, ShadingMode::Gouraud));
    let left = fb.pixel(0, 0) & 0xFF;
    let right = fb.pixel(14, 0) & 0xFF;
    assert!(left < 16, "{:#x}", left);
    assert!(right > 200, "{:#x}", right);
}

#[test]
fn textured_fill_samples_with_wrapping_lookup() {
    let texture = Arc::new(Texture::checkerboard(2, 2, 1, colors::RED, colors::GREEN).unwrap());
    let tri = screen_tri([(0.0, 0.0, 0.5), (16.0, 0.0, 0.5), (0.0, 16.0, 0.5)], colors::WHITE).with_texture(texture);

    let mut fb = fresh_framebuffer();
    Rasterizer.rasterize(&mut fb, &tri, &config(RenderMode::Textured, ShadingMode::None));
    // u = 1.5/16 -> texel 0, u = 12.5/16 -> texel 1.
    assert_eq!(fb.pixel(1, 1), colors::RED);
    assert_eq!(fb.pixel(12, 1), colors::GREEN);
}

#[test]
fn textured_fill_applies_flat_intensity_to_texels() {
    let texture = Arc::new(Texture::new(1, 1, vec![0xFF646464]).unwrap());
    let tri = screen_tri([(0.0, 0.0, 0.5), (16.0, 0.0, 0.5), (0.0, 16.0, 0.5)], colors::WHITE)
        .with_texture(texture)
        .with_flat_value(0.5);

    let mut fb = fresh_framebuffer();
    Rasterizer.rasterize(&mut fb, &tri, &config(RenderMode::Textured, ShadingMode::Flat));
    assert_eq!(fb.pixel(2, 2), 0xFF323232);
}

#[test]
fn textured_mode_without_texture_falls_back_to_solid() {
    let tri = screen_tri([(0.0, 0.0, 0.5), (16.0, 0.0, 0.5), (0.0, 16.0, 0.5)], colors::WHITE);
    let cfg = config(RenderMode::Textured, ShadingMode::None);

    let mut fb = fresh_framebuffer();
    Rasterizer.rasterize(&mut fb, &tri, &cfg);
    assert_eq!(fb.pixel(2, 2), cfg.missing_texture_color);
}

#[test]
fn overlay_edges_show_over_their_own_face() {
    let tri = screen_tri([(0.0, 0.0, 0.5), (16.0, 0.0, 0.5), (0.0, 16.0, 0.5)], colors::WHITE);
    let mut fb = fresh_framebuffer();
    Rasterizer.rasterize(&mut fb, &tri, &config(RenderMode::SolidWireframe, ShadingMode::None));

    assert_eq!(fb.pixel(5, 0), colors::BLACK);
    assert_eq!(fb.pixel(0, 5), colors::BLACK);
    assert_eq!(fb.pixel(4, 4), colors::WHITE);
}

#[test]
fn depth_tested_line_passes_at_equal_depth() {
    // Depth 0 interpolates exactly, so the tie is a real tie.
    let tri = screen_tri([(0.0, 0.0, 0.0), (16.0, 0.0, 0.0), (0.0, 16.0, 0.0)], colors::WHITE);
    let mut fb = fresh_framebuffer();
    Rasterizer.rasterize(&mut fb, &tri, &config(RenderMode::Solid, ShadingMode::None));

    let (a, b) = (Vec3::new(0.0, 5.0, 0.0), Vec3::new(8.0, 5.0, 0.0));
    let visible = Rasterizer.draw_line_bresenham_3d(&mut fb, a, b, colors::YELLOW);
    assert_eq!(visible, 9);
    assert_eq!(fb.pixel(3, 5), colors::YELLOW);

    let (a, b) = (Vec3::new(0.0, 3.0, 0.1), Vec3::new(8.0, 3.0, 0.1));
    let hidden = Rasterizer.draw_line_bresenham_3d(&mut fb, a, b, colors::CYAN);
    assert_eq!(hidden, 0);
    assert_eq!(fb.pixel(3, 3), colors::WHITE);
}

#[test]
fn vertex_markers_are_square() {
    let tri = screen_tri([(4.0, 4.0, 0.5), (12.0, 4.0, 0.5), (4.0, 12.0, 0.5)], colors::WHITE);
    let cfg = config(RenderMode::VerticesOnly, ShadingMode::None);
    let mut fb = fresh_framebuffer();
    assert_eq!(Rasterizer.rasterize(&mut fb, &tri, &cfg), Coverage::Drawn(3 * 16));
    assert_eq!(fb.pixel(4, 4), cfg.vertex_color);
    assert_eq!(fb.pixel(8, 8), colors::BLUE);
}

#[test]
fn depth_tested_wireframe_hides_behind_nearer_fill() {
    let far = screen_tri([(2.0, 2.0, 0.8), (12.0, 2.0, 0.8), (2.0, 12.0, 0.8)], colors::WHITE);

    let mut open = fresh_framebuffer();
    assert!(Rasterizer.draw_wireframe_3d(&mut open, &far, colors::YELLOW) > 0);
    assert_eq!(open.pixel(5, 2), colors::YELLOW);

    let near = screen_tri([(0.0, 0.0, 0.2), (32.0, 0.0, 0.2), (0.0, 32.0, 0.2)], colors::GREEN);
    let mut covered = fresh_framebuffer();
    Rasterizer.rasterize(&mut covered, &near, &config(RenderMode::Solid, ShadingMode::None));
    assert_eq!(Rasterizer.draw_wireframe_3d(&mut covered, &far, colors::YELLOW), 0);
    assert_eq!(covered.pixel(5, 2), colors::GREEN);
    assert!(!covered.color_buffer.contains(&colors::YELLOW));
}
