//! Orbit camera, projection, and the camera uniform resources.
//!
//! The camera orbits a fixed target. Pointer drags and scroll input adjust
//! *goal* angles and distance; every frame the actual values ease toward the
//! goals, which gives the characteristic smoothed orbiting motion.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3};
use wgpu::util::DeviceExt;

/// wgpu clip space spans z in [0, 1] while cgmath produces OpenGL-style
/// [-1, 1], so projection matrices get remapped through this.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const MIN_RADIUS: f32 = 0.5;
const MAX_RADIUS: f32 = 50.0;
// Keeps the pitch off the poles where the view matrix degenerates.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.01;

/// Camera orbiting around a target point on a smoothed spherical path.
#[derive(Debug)]
pub struct OrbitCamera {
    pub target: Point3<f32>,
    yaw: f32,
    pitch: f32,
    radius: f32,
    goal_yaw: f32,
    goal_pitch: f32,
    goal_radius: f32,
}

impl OrbitCamera {
    /// Camera placed at `eye`, orbiting `target`.
    pub fn new(eye: Point3<f32>, target: Point3<f32>) -> Self {
        let offset = eye - target;
        let radius = offset.magnitude().max(MIN_RADIUS);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / radius).asin();
        Self {
            target,
            yaw,
            pitch,
            radius,
            goal_yaw: yaw,
            goal_pitch: pitch,
            goal_radius: radius,
        }
    }

    pub fn eye(&self) -> Point3<f32> {
        let horizontal = self.radius * self.pitch.cos();
        Point3::new(
            self.target.x + horizontal * self.yaw.sin(),
            self.target.y + self.radius * self.pitch.sin(),
            self.target.z + horizontal * self.yaw.cos(),
        )
    }

    /// Pointer drag in pixels. Positive `dx` orbits left around the target.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        const SENSITIVITY: f32 = 0.005;
        self.goal_yaw -= dx * SENSITIVITY;
        self.goal_pitch = (self.goal_pitch + dy * SENSITIVITY).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Scroll input; positive `delta` zooms in. Distance stays clamped.
    pub fn zoom(&mut self, delta: f32) {
        self.goal_radius = (self.goal_radius * 0.95f32.powf(delta)).clamp(MIN_RADIUS, MAX_RADIUS);
    }

    /// Ease the current orbit toward the goal values. Framerate independent:
    /// the smoothing factor derives from `dt`.
    pub fn update(&mut self, dt: f32) {
        let t = 1.0 - (-10.0 * dt).exp();
        self.yaw += (self.goal_yaw - self.yaw) * t;
        self.pitch += (self.goal_pitch - self.pitch) * t;
        self.radius += (self.goal_radius - self.radius) * t;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye(), self.target, Vector3::unit_y())
    }
}

/// Perspective projection tracking the surface aspect ratio.
#[derive(Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: cgmath::Deg(75.0).into(),
            znear: 0.1,
            zfar: 100.0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// Camera data as it lands in the uniform buffer. The view matrix rides along
/// because matcap shading needs view-space normals.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_proj: Matrix4::identity().into(),
            view: Matrix4::identity().into(),
        }
    }

    pub fn update(&mut self, camera: &OrbitCamera, projection: &Projection) {
        let view = camera.view_matrix();
        self.view_proj = (projection.matrix() * view).into();
        self.view = view.into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Uniform buffer and bind group for the camera, bound at group 1.
pub struct CameraResources {
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = CameraUniform::new();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });
        Self {
            uniform,
            buffer,
            layout,
            bind_group,
        }
    }

    /// Refresh the uniform from the camera state and upload it.
    pub fn write(
        &mut self,
        queue: &wgpu::Queue,
        camera: &OrbitCamera,
        projection: &Projection,
    ) {
        self.uniform.update(camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_camera() -> OrbitCamera {
        OrbitCamera::new(Point3::new(1.0, 1.0, 2.0), Point3::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn eye_round_trips_through_spherical_coordinates() {
        let camera = default_camera();
        let eye = camera.eye();
        assert!((eye.x - 1.0).abs() < 1e-5);
        assert!((eye.y - 1.0).abs() < 1e-5);
        assert!((eye.z - 2.0).abs() < 1e-5);
    }

    #[test]
    fn update_eases_toward_drag_goal() {
        let mut camera = default_camera();
        let before = camera.eye();
        camera.rotate(200.0, 0.0);
        // The goal moved but the camera has not yet.
        let still = camera.eye();
        assert!((still.x - before.x).abs() < 1e-6);

        camera.update(1.0 / 60.0);
        let after_one = camera.eye();
        assert!((after_one.x - before.x).abs() > 1e-4);

        for _ in 0..600 {
            camera.update(1.0 / 60.0);
        }
        let settled = camera.eye();
        camera.update(1.0 / 60.0);
        let settled_again = camera.eye();
        assert!((settled_again.x - settled.x).abs() < 1e-4);
    }

    #[test]
    fn pitch_stays_off_the_poles() {
        let mut camera = default_camera();
        camera.rotate(0.0, 1e6);
        for _ in 0..1000 {
            camera.update(1.0 / 60.0);
        }
        let eye = camera.eye();
        let radius = (eye.x * eye.x + eye.y * eye.y + eye.z * eye.z).sqrt();
        assert!(eye.y < radius);
    }

    #[test]
    fn resize_updates_the_aspect_ratio() {
        let mut projection = Projection::new(800, 600);
        assert!((projection.aspect() - 800.0 / 600.0).abs() < 1e-6);

        projection.resize(1024, 256);
        assert!((projection.aspect() - 4.0).abs() < 1e-6);

        // The projection matrix reflects it: x scaling is y scaling / aspect.
        let m = projection.matrix();
        assert!((m[1][1] / m[0][0] - 4.0).abs() < 1e-4);
    }

    #[test]
    fn resize_guards_against_zero_height() {
        let mut projection = Projection::new(800, 600);
        projection.resize(100, 0);
        assert!((projection.aspect() - 100.0).abs() < 1e-6);
        assert!(projection.aspect().is_finite());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = default_camera();
        camera.zoom(1e4);
        for _ in 0..1000 {
            camera.update(1.0 / 60.0);
        }
        let eye = camera.eye();
        let radius = (eye.x * eye.x + eye.y * eye.y + eye.z * eye.z).sqrt();
        assert!(radius >= 0.5 - 1e-3);

        camera.zoom(-1e6);
        for _ in 0..1000 {
            camera.update(1.0 / 60.0);
        }
        let eye = camera.eye();
        let radius = (eye.x * eye.x + eye.y * eye.y + eye.z * eye.z).sqrt();
        assert!(radius <= 50.0 + 1e-2);
    }
}
