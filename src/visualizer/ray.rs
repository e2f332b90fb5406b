use nalgebra::{Point3, Vector3};

// 방향은 정규화하지 않음. 2차 방정식의 a 항이 길이를 그대로 흡수하기 때문
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Self { origin, direction }
    }

    /// r(t) = origin + direction * t
    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}
