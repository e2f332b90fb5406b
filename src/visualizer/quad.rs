use log::trace;
use nalgebra::{Point3, Vector3, Vector4};

use crate::camera::Camera;

pub const QUAD_TRIANGLES: [u32; 6] = [
    0, 1, 2, // 첫 번째 삼각형
    0, 2, 3, // 두 번째 삼각형
];

/// 풀에 들어가는 그릴 수 있는 사각형. 렌더링 호스트마다 하나씩 구현하면 됨.
pub trait QuadRenderer {
    /// `position`을 중심으로 한 변이 `size`인 사각형을 `color`로 그림.
    /// 카메라가 없으면 아무것도 하지 않음.
    fn display(&mut self, camera: Option<&Camera>, position: Point3<f32>, size: f32, color: Vector4<f32>);
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadMesh {
    pub vertices: [Point3<f32>; 4],
    pub triangles: [u32; 6],
    pub normals: [Vector3<f32>; 4],
    pub color: Vector4<f32>,
}

impl QuadMesh {
    fn empty() -> Self {
        Self {
            vertices: [Point3::origin(); 4],
            triangles: QUAD_TRIANGLES,
            normals: [Vector3::zeros(); 4],
            color: Vector4::zeros(),
        }
    }

    // 월드 기준 위/오른쪽 축으로 만든 평면
    fn rebuild(&mut self, position: Point3<f32>, size: f32) {
        let up = Vector3::y() * size / 2.0;
        let right = Vector3::x() * size / 2.0;

        self.vertices = [
            position - right + up, // 왼쪽 위
            position + right + up, // 오른쪽 위
            position + right - up, // 오른쪽 아래
            position - right - up, // 왼쪽 아래
        ];
        self.recalculate_normals();
    }

    // 사각형은 평면이니 첫 삼각형의 법선을 모든 꼭짓점에 씀
    fn recalculate_normals(&mut self) {
        let [a, b, c] = [0, 1, 2].map(|i| self.vertices[self.triangles[i] as usize]);
        let normal = (b - a)
            .cross(&(c - a))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        self.normals = [normal; 4];
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::from((self.vertices[0].coords + self.vertices[2].coords) / 2.0)
    }

    /// 삼각형 단위로 꼭짓점 세 개씩
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f32>; 3]> + '_ {
        self.triangles
            .chunks_exact(3)
            .map(|indices| [0, 1, 2].map(|i| self.vertices[indices[i] as usize]))
    }
}

/// CPU 메시 기반 구현. 메시는 처음 그릴 때 만들어짐.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MeshQuad {
    mesh: Option<QuadMesh>,
}

impl MeshQuad {
    pub fn mesh(&self) -> Option<&QuadMesh> {
        self.mesh.as_ref()
    }
}

impl QuadRenderer for MeshQuad {
    fn display(&mut self, camera: Option<&Camera>, position: Point3<f32>, size: f32, color: Vector4<f32>) {
        if camera.is_none() {
            trace!("No camera, skipping quad at {position}");
            return;
        }

        let mesh = self.mesh.get_or_insert_with(QuadMesh::empty);
        mesh.color = color;
        mesh.rebuild(position, size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewportSettings;
    use approx::assert_relative_eq;
    use winit::dpi::PhysicalSize;

    fn camera() -> Camera {
        Camera::new(&ViewportSettings::default(), PhysicalSize::new(64, 64))
    }

    #[test]
    fn builds_a_square_around_the_position() {
        let mut quad = MeshQuad::default();
        let position = Point3::new(1.0, 2.0, 3.0);
        quad.display(Some(&camera()), position, 0.5, Vector4::new(0.0, 1.0, 0.0, 1.0));

        let mesh = quad.mesh().expect("mesh allocated on first display");
        assert_relative_eq!(mesh.vertices[0], Point3::new(0.75, 2.25, 3.0));
        assert_relative_eq!(mesh.vertices[1], Point3::new(1.25, 2.25, 3.0));
        assert_relative_eq!(mesh.vertices[2], Point3::new(1.25, 1.75, 3.0));
        assert_relative_eq!(mesh.vertices[3], Point3::new(0.75, 1.75, 3.0));
        assert_relative_eq!(mesh.center(), position);
        assert_eq!(mesh.triangles, [0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.color, Vector4::new(0.0, 1.0, 0.0, 1.0));

        for normal in mesh.normals {
            assert_relative_eq!(normal, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        }
    }

    #[test]
    fn display_is_idempotent() {
        let camera = camera();
        let position = Point3::new(0.1, -0.2, 0.3);
        let color = Vector4::new(0.2, 0.4, 0.6, 0.5);

        let mut once = MeshQuad::default();
        once.display(Some(&camera), position, 0.03, color);

        let mut twice = MeshQuad::default();
        twice.display(Some(&camera), position, 0.03, color);
        twice.display(Some(&camera), position, 0.03, color);

        assert_eq!(once, twice);
    }

    #[test]
    fn new_arguments_replace_the_old_geometry() {
        let camera = camera();
        let mut quad = MeshQuad::default();
        quad.display(Some(&camera), Point3::origin(), 1.0, Vector4::new(1.0, 0.0, 0.0, 1.0));
        quad.display(Some(&camera), Point3::new(5.0, 0.0, 0.0), 0.1, Vector4::new(0.0, 0.0, 1.0, 1.0));

        let mut fresh = MeshQuad::default();
        fresh.display(Some(&camera), Point3::new(5.0, 0.0, 0.0), 0.1, Vector4::new(0.0, 0.0, 1.0, 1.0));

        assert_eq!(quad, fresh);
    }

    #[test]
    fn missing_camera_skips_the_draw() {
        let mut quad = MeshQuad::default();
        quad.display(None, Point3::origin(), 1.0, Vector4::new(1.0, 1.0, 1.0, 1.0));
        assert!(quad.mesh().is_none());
    }

    #[test]
    fn triangles_follow_the_index_buffer() {
        let mut quad = MeshQuad::default();
        quad.display(Some(&camera()), Point3::origin(), 2.0, Vector4::zeros());

        let mesh = quad.mesh().expect("mesh");
        let triangles: Vec<_> = mesh.triangles().collect();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[1], [mesh.vertices[0], mesh.vertices[2], mesh.vertices[3]]);
    }
}
