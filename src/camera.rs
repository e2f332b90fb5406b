use nalgebra::{Isometry3, Matrix4, Perspective3, Point3, Unit, UnitQuaternion, Vector2, Vector3};
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyboardInput, VirtualKeyCode, WindowEvent};

use crate::config::ViewportSettings;

// 사각형들을 화면에 투영할 때 쓰는 카메라. 광선을 쏘는 가상 카메라와는 별개임.
pub struct Camera {
    projection: Perspective3<f32>,
    view: Isometry3<f32>,
    view_projection: Matrix4<f32>,

    vertical_fov: f32,
    near: f32,
    far: f32,

    pub position: Point3<f32>,
    forward: Unit<Vector3<f32>>,

    pub last_mouse: PhysicalPosition<f64>,

    viewport_size: PhysicalSize<u32>,

    inputs: [bool; 6],
    // WASD SPACE SHIFT
    pub grab_mouse: bool,
}

impl Camera {
    pub fn new(settings: &ViewportSettings, viewport_size: PhysicalSize<u32>) -> Self {
        let vertical_fov = settings.vertical_fov.to_radians();
        let position = settings.position;
        // 바라보는 곳과 위치가 같으면 -Z를 바라봄
        let forward = Unit::try_new(settings.target - position, f32::EPSILON)
            .unwrap_or_else(|| -Vector3::z_axis());

        let projection = Self::perspective(viewport_size, vertical_fov, settings.near, settings.far);
        let view = Isometry3::look_at_rh(&position, &(position + forward.into_inner()), &Vector3::y_axis());

        let mut to_return = Self {
            projection,
            view,
            view_projection: Matrix4::identity(),
            vertical_fov,
            near: settings.near,
            far: settings.far,
            position,
            forward,
            last_mouse: Default::default(),
            viewport_size,
            inputs: [false; 6],
            grab_mouse: false,
        };

        to_return.reevaluate_view_projection();

        to_return
    }

    pub fn input(&mut self, event: &WindowEvent, is_hovering: bool) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let delta = Vector2::new(
                    (position.x - self.last_mouse.x) as f32,
                    (position.y - self.last_mouse.y) as f32,
                ) * 0.002;
                self.last_mouse = *position;

                // 패널 위에 있거나 마우스를 잡지 않았으면 시점은 그대로
                if is_hovering || !self.grab_mouse {
                    return false;
                }

                let up: Unit<Vector3<f32>> = Vector3::y_axis();
                let right = Unit::new_normalize(self.forward.cross(&up.into_inner()));

                let pitch_delta = delta.y * self.rotation_speed(); // 위로 올리면 음수
                let yaw_delta = delta.x * self.rotation_speed(); // 오른쪽으로 움직이면 양수

                let q = UnitQuaternion::from_axis_angle(&right, -pitch_delta)
                    * UnitQuaternion::from_axis_angle(&up, -yaw_delta);

                self.forward = q * self.forward;
                self.forward.renormalize_fast();

                self.reevaluate_view();

                true
            }
            WindowEvent::KeyboardInput {
                input:
                    KeyboardInput {
                        state,
                        virtual_keycode: Some(key),
                        ..
                    },
                ..
            } => {
                let is_press = matches!(state, ElementState::Pressed);
                match key {
                    VirtualKeyCode::W => self.inputs[0] = is_press,
                    VirtualKeyCode::A => self.inputs[1] = is_press,
                    VirtualKeyCode::S => self.inputs[2] = is_press,
                    VirtualKeyCode::D => self.inputs[3] = is_press,
                    VirtualKeyCode::Space => self.inputs[4] = is_press,
                    VirtualKeyCode::LShift => self.inputs[5] = is_press,
                    VirtualKeyCode::C if is_press => {
                        self.grab_mouse = !self.grab_mouse;
                    }
                    _ => {
                        return false;
                    }
                };

                true
            }
            _ => false,
        }
    }

    /// frame_time은 밀리초. 움직였으면 true
    pub fn update(&mut self, frame_time: u128) -> bool {
        let time_step = ((frame_time as f32) / 1000.0).min(1.0 / 60.0);

        let up: Unit<Vector3<f32>> = Vector3::y_axis();
        let right = self.forward.cross(&up.into_inner());
        let step = self.movement_speed() * time_step;
        let mut moved = false;

        let directions = [
            self.forward.into_inner(),
            -right,
            -self.forward.into_inner(),
            right,
            up.into_inner(),
            -up.into_inner(),
        ];

        for (pressed, direction) in self.inputs.iter().zip(directions) {
            if *pressed {
                self.position += direction * step;
                moved = true;
            }
        }

        if moved {
            self.reevaluate_view();
        }

        moved
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.viewport_size = new_size;
        self.reevaluate_projection();
    }

    pub fn rotation_speed(&self) -> f32 {
        0.7
    }

    pub fn movement_speed(&self) -> f32 {
        5.0
    }

    pub fn forward(&self) -> &Unit<Vector3<f32>> {
        &self.forward
    }

    pub fn viewport_size(&self) -> PhysicalSize<u32> {
        self.viewport_size
    }

    pub fn view_projection(&self) -> &Matrix4<f32> {
        &self.view_projection
    }

    /// 월드 좌표를 화면 픽셀 좌표 (x, y)와 깊이 (0 ~ 1)로 바꿈.
    /// 카메라 뒤에 있거나 near/far 밖이면 None
    pub fn project(&self, point: &Point3<f32>) -> Option<(f32, f32, f32)> {
        let clip = self.view_projection * point.to_homogeneous();
        if clip.w <= f32::EPSILON {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }

        // NDC의 y는 위쪽이 +, 픽셀 좌표는 아래쪽이 +
        let x = (ndc.x + 1.0) * 0.5 * self.viewport_size.width as f32;
        let y = (1.0 - ndc.y) * 0.5 * self.viewport_size.height as f32;
        let depth = (ndc.z + 1.0) * 0.5;

        Some((x, y, depth))
    }

    fn perspective(size: PhysicalSize<u32>, vertical_fov: f32, near: f32, far: f32) -> Perspective3<f32> {
        let aspect = size.width as f32 / size.height.max(1) as f32;
        Perspective3::new(aspect, vertical_fov, near, far)
    }

    fn reevaluate_projection(&mut self) {
        self.projection = Self::perspective(self.viewport_size, self.vertical_fov, self.near, self.far);
        self.reevaluate_view_projection();
    }

    fn reevaluate_view(&mut self) {
        let point = self.position + self.forward.into_inner();
        self.view = Isometry3::look_at_rh(&self.position, &point, &Vector3::y_axis());
        self.reevaluate_view_projection();
    }

    fn reevaluate_view_projection(&mut self) {
        self.view_projection = self.projection.as_matrix() * self.view.to_homogeneous();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera_at(position: Point3<f32>, target: Point3<f32>) -> Camera {
        let settings = ViewportSettings {
            width: 200,
            height: 100,
            position,
            target,
            ..Default::default()
        };
        Camera::new(&settings, PhysicalSize::new(200, 100))
    }

    #[test]
    fn target_projects_to_the_center() {
        let camera = camera_at(Point3::new(0.0, 0.0, -2.5), Point3::origin());

        let (x, y, depth) = camera.project(&Point3::origin()).expect("visible");
        assert_relative_eq!(x, 100.0, epsilon = 1e-3);
        assert_relative_eq!(y, 50.0, epsilon = 1e-3);
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn up_is_up_on_screen() {
        let camera = camera_at(Point3::new(0.0, 0.0, 3.0), Point3::origin());

        let (_, y, _) = camera.project(&Point3::new(0.0, 0.5, 0.0)).expect("visible");
        assert!(y < 50.0);
    }

    #[test]
    fn points_behind_are_not_projected() {
        let camera = camera_at(Point3::new(0.0, 0.0, 3.0), Point3::origin());

        assert!(camera.project(&Point3::new(0.0, 0.0, 5.0)).is_none());
    }

    #[test]
    fn nearer_points_have_smaller_depth() {
        let camera = camera_at(Point3::new(0.0, 0.0, 3.0), Point3::origin());

        let (_, _, near) = camera.project(&Point3::new(0.0, 0.0, 1.0)).expect("visible");
        let (_, _, far) = camera.project(&Point3::new(0.0, 0.0, -1.0)).expect("visible");
        assert!(near < far);
    }

    #[test]
    fn movement_only_happens_while_keys_are_held() {
        let mut camera = camera_at(Point3::new(0.0, 0.0, 3.0), Point3::origin());

        assert!(!camera.update(16));
        camera.inputs[0] = true;
        assert!(camera.update(16));
        assert!(camera.position.z < 3.0);
    }
}
