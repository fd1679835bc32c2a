/// Full-frame behaviour of `Renderer::render_frame`.
use glam::{Vec2, Vec3, Vec4};
use softraster::*;

const SIZE: usize = 64;
const SENTINEL: u32 = 0x12345678;

fn clip_tri(p: [[f32; 3]; 3]) -> Triangle {
    Triangle::new(p.map(|[x, y, z]| Vertex::new(Vec4::new(x, y, z, 1.0), Vec2::ZERO))).with_color(colors::WHITE)
}

fn small_tri() -> Triangle {
    clip_tri([[-0.5, -0.5, 0.0], [0.5, -0.5, 0.0], [0.0, 0.5, 0.0]])
}

fn cube_world() -> World {
    let mut world = World::new(Camera::new(Vec3::new(0.0, 0.0, 6.0), 1.0));
    world.gizmo = None;
    world.show_light = false;
    world.add_mesh(cube(None));
    world
}

fn solid_flat() -> RenderConfig {
    RenderConfig {
        render_mode: RenderMode::Solid,
        shading_mode: ShadingMode::Flat,
        ..RenderConfig::default()
    }
}

#[test]
fn too_many_input_triangles_leaves_the_frame_untouched() {
    let config = RenderConfig {
        max_triangles: 2,
        ..solid_flat()
    };
    let mut renderer = Renderer::new(config, SIZE, SIZE).unwrap();
    let mut fb = Framebuffer::new(SIZE, SIZE);
    fb.clear(SENTINEL);

    let input = vec![small_tri(); 3];
    let err = renderer.render_frame(&mut fb, &input, &[]).unwrap_err();
    assert_eq!(
        err,
        RenderError::CapacityExceeded {
            stage: Stage::SceneInput,
            limit: 2,
            requested: 3,
        }
    );
    assert!(fb.color_buffer.iter().all(|&c| c == SENTINEL));
    assert!(fb.depth_buffer.iter().all(|&d| d == DEPTH_CLEAR));
}

#[test]
fn clip_output_over_the_limit_is_an_error() {
    let config = RenderConfig {
        max_triangles: 1,
        ..solid_flat()
    };
    let mut renderer = Renderer::new(config, SIZE, SIZE).unwrap();
    let mut fb = Framebuffer::new(SIZE, SIZE);
    fb.clear(SENTINEL);

    // Crosses the left, right and top planes, so it splits into several pieces.
    let big = clip_tri([[-3.0, -0.5, 0.0], [3.0, -0.5, 0.0], [0.0, 3.0, 0.0]]);
    let err = renderer.render_frame(&mut fb, &[big], &[]).unwrap_err();
    assert!(matches!(
        err,
        RenderError::CapacityExceeded {
            stage: Stage::Clipping,
            limit: 1,
            ..
        }
    ));
    assert!(renderer.clipped_triangles().is_empty());
    assert!(fb.color_buffer.iter().all(|&c| c == SENTINEL));
}

#[test]
fn mismatched_framebuffer_is_rejected() {
    let mut renderer = Renderer::new(solid_flat(), SIZE, SIZE).unwrap();
    let mut fb = Framebuffer::new(32, 16);
    let err = renderer.render_frame(&mut fb, &[small_tri()], &[]).unwrap_err();
    assert_eq!(err, RenderError::InvalidViewport { width: 32, height: 16 });

    renderer.resize(32, 16).unwrap();
    assert!(renderer.render_frame(&mut fb, &[small_tri()], &[]).is_ok());
}

#[test]
fn zero_sized_viewport_is_rejected() {
    assert_eq!(
        Renderer::new(solid_flat(), 0, 10).err(),
        Some(RenderError::InvalidViewport { width: 0, height: 10 })
    );
}

#[test]
fn cube_front_face_is_half_lit() {
    let mut world = cube_world();
    let config = solid_flat();
    let mut renderer = Renderer::new(config, SIZE, SIZE).unwrap();
    let mut fb = Framebuffer::new(SIZE, SIZE);

    let (triangles, lines) = world.build_frame(renderer.config());
    let stats = renderer.render_frame(&mut fb, triangles, lines).unwrap();

    assert_eq!(stats.input_triangles, 12);
    assert_eq!(stats.clipped_triangles, 12);
    assert_eq!(stats.visible_lines, 0);
    assert!(stats.pixels_written > 0);

    // Light points straight down; the +Z face is edge-on to it.
    assert_eq!(fb.pixel(SIZE / 2, SIZE / 2), 0xFF808080);
    assert!(fb.depth(SIZE / 2, SIZE / 2) < 1.0);
    assert_eq!(fb.pixel(0, 0), config.clear_color);
    assert_eq!(fb.depth(0, 0), DEPTH_CLEAR);

    // Only the two triangles of the face toward the camera survive culling.
    let front = renderer.clipped_triangles().iter().filter(|t| t.is_front_facing()).count();
    assert_eq!(front, 2);
}

#[test]
fn every_mode_renders() {
    let texture = std::sync::Arc::new(Texture::checkerboard(8, 8, 2, colors::WHITE, colors::RED).unwrap());
    let mut world = World::new(Camera::new(Vec3::new(2.0, 2.0, 5.0), 1.0));
    world.camera.look_at(Vec3::ZERO);
    world.add_mesh(cube(Some(texture)));

    for mode in RenderMode::ALL {
        let config = RenderConfig {
            render_mode: mode,
            ..RenderConfig::default()
        };
        let mut renderer = Renderer::new(config, SIZE, SIZE).unwrap();
        let mut fb = Framebuffer::new(SIZE, SIZE);
        let (triangles, lines) = world.build_frame(renderer.config());
        let stats = renderer.render_frame(&mut fb, triangles, lines).unwrap();
        assert!(stats.pixels_written > 0, "{:?}", mode);
        assert!(fb.color_buffer.iter().any(|&c| c != config.clear_color), "{:?}", mode);
    }
}

#[test]
fn debug_lines_can_be_switched_off() {
    let mut world = World::new(Camera::new(Vec3::new(0.0, 1.0, 6.0), 1.0));
    world.camera.look_at(Vec3::ZERO);
    world.add_mesh(cube(None));
    let mut renderer = Renderer::new(solid_flat(), SIZE, SIZE).unwrap();
    let mut fb = Framebuffer::new(SIZE, SIZE);

    let (triangles, lines) = world.build_frame(renderer.config());
    let with_lines = renderer.render_frame(&mut fb, triangles, lines).unwrap();
    assert!(with_lines.visible_lines > 0);

    renderer.config_mut().draw_lines = false;
    let (triangles, lines) = world.build_frame(renderer.config());
    let without = renderer.render_frame(&mut fb, triangles, lines).unwrap();
    assert_eq!(without.visible_lines, 0);
}

#[test]
fn empty_frame_is_just_a_clear() {
    let config = solid_flat();
    let mut renderer = Renderer::new(config, SIZE, SIZE).unwrap();
    let mut fb = Framebuffer::new(SIZE, SIZE);
    fb.clear(SENTINEL);

    let stats = renderer.render_frame(&mut fb, &[], &[]).unwrap();
    assert_eq!(stats.pixels_written, 0);
    assert!(fb.color_buffer.iter().all(|&c| c == config.clear_color));
    assert!(fb.depth_buffer.iter().all(|&d| d == DEPTH_CLEAR));
}

#[test]
fn triangle_behind_the_camera_draws_nothing() {
    let mut renderer = Renderer::new(solid_flat(), SIZE, SIZE).unwrap();
    let mut fb = Framebuffer::new(SIZE, SIZE);

    let mut behind = small_tri();
    for v in &mut behind.vertices {
        v.position.w = -1.0;
    }
    let stats = renderer.render_frame(&mut fb, &[behind], &[]).unwrap();
    assert_eq!(stats.clipped_triangles, 0);
    assert_eq!(stats.pixels_written, 0);
}

#[test]
fn face_normals_are_drawn_as_depth_tested_lines() {
    const BIG: usize = 512;
    let mut world = World::new(Camera::new(Vec3::new(3.0, 0.0, 3.0), 1.0));
    world.camera.look_at(Vec3::ZERO);
    world.gizmo = None;
    world.show_light = false;
    world.add_mesh(cube(None));

    let mut renderer = Renderer::new(solid_flat(), BIG, BIG).unwrap();
    let mut fb = Framebuffer::new(BIG, BIG);
    let (triangles, lines) = world.build_frame(renderer.config());
    let plain = renderer.render_frame(&mut fb, triangles, lines).unwrap();
    assert_eq!(plain.visible_lines, 0);
    assert!(!fb.color_buffer.contains(&colors::GREEN));

    renderer.config_mut().show_face_normals = true;
    let (triangles, lines) = world.build_frame(renderer.config());
    let stats = renderer.render_frame(&mut fb, triangles, lines).unwrap();
    assert_eq!(stats.visible_lines, 12);

    // Tip of the normal of the first +Z triangle sits in front of its face.
    let tip = Vec3::new(1.0 / 3.0, -1.0 / 3.0, 1.0) + Vec3::Z * FACE_NORMAL_LENGTH;
    let screen = renderer
        .viewport()
        .project_point(world.camera.view_projection_matrix() * tip.extend(1.0));
    assert_eq!(fb.pixel(screen.x.floor() as usize, screen.y.floor() as usize), colors::GREEN);
}
