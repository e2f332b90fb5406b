use nalgebra::{Point3, Unit, Vector3, Vector4};

use crate::error::VisualizerError;
use crate::visualizer::ray::Ray;

pub struct Sphere {
    pub position: Point3<f32>,
    pub radius: f32,
    pub albedo: Vector3<f32>,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            radius: 0.5,
            albedo: Vector3::new(0.0, 1.0, 0.0),
        }
    }
}

impl Sphere {
    /// 광선이 구와 만나는 두 거리 (t0 <= t1)를 돌려줌. 만나지 않으면 None.
    ///
    /// 음수 거리도 걸러내지 않음. 카메라가 구 안쪽에 있으면 t0가 음수가 될 수 있음.
    pub fn trace(&self, ray: &Ray) -> Option<[f32; 2]> {
        // 구를 원점으로 옮기는 대신 광선 시작점을 그만큼 옮김
        let origin = ray.origin - self.position;

        // a = 빔 방향의 길이 제곱
        // b = 2 * (시작점 · 방향)
        // c = 시작점 길이 제곱 - 반지름 제곱
        let first = ray.direction.magnitude_squared();
        let second = 2.0 * origin.dot(&ray.direction);
        let third = origin.magnitude_squared() - self.radius.powi(2);

        // 방향이 0인 광선은 a가 0이 되어 나눗셈이 안됨. 빗나간 것으로 처리
        if first <= 0.0 {
            return None;
        }

        // 판별식
        let discriminant = second.powi(2) - 4.0 * first * third;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        Some([
            (-second - root) / (2.0 * first),
            (-second + root) / (2.0 * first),
        ])
    }

    pub fn normal_at(&self, point: &Point3<f32>) -> Unit<Vector3<f32>> {
        Unit::new_normalize(point - self.position)
    }
}

pub struct Light {
    direction: Unit<Vector3<f32>>,
}

impl Light {
    pub fn new(direction: Vector3<f32>) -> Result<Self, VisualizerError> {
        let direction = Unit::try_new(direction, f32::EPSILON)
            .ok_or(VisualizerError::DegenerateLight)?;

        Ok(Self { direction })
    }

    pub fn direction(&self) -> &Unit<Vector3<f32>> {
        &self.direction
    }

    // Lambert 반사. cos(v1, v2) = v1 * v2 (둘 다 단위 벡터일 때)
    pub fn intensity(&self, normal: &Unit<Vector3<f32>>) -> f32 {
        normal.dot(&-self.direction.into_inner()).max(0.0)
    }

    /// 알파는 언제나 1
    pub fn shade(&self, normal: &Unit<Vector3<f32>>, albedo: &Vector3<f32>) -> Vector4<f32> {
        let color = albedo * self.intensity(normal);
        Vector4::new(color.x, color.y, color.z, 1.0)
    }
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Unit::new_normalize(Vector3::new(-1.0, -1.0, 1.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn roots_lie_on_the_sphere_surface() {
        let sphere = Sphere::default();
        let ray = Ray::new(Point3::new(0.0, 0.0, 2.0), Vector3::new(0.2, -0.1, -1.0));

        let roots = sphere.trace(&ray).expect("ray should hit");
        assert!(roots[0] <= roots[1]);

        for t in roots {
            let distance = (ray.at(t) - sphere.position).magnitude();
            assert_relative_eq!(distance, sphere.radius, epsilon = EPSILON);
        }
    }

    #[test]
    fn straight_ray_hits_at_known_distances() {
        let sphere = Sphere::default();
        let ray = Ray::new(Point3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, -1.0));

        let [near, far] = sphere.trace(&ray).expect("ray should hit");
        assert_relative_eq!(near, 1.5, epsilon = EPSILON);
        assert_relative_eq!(far, 2.5, epsilon = EPSILON);
    }

    #[test]
    fn offset_sphere_uses_its_own_center() {
        let sphere = Sphere {
            position: Point3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        let ray = Ray::new(Point3::new(1.0, 0.0, 2.0), Vector3::new(0.0, 0.0, -1.0));

        let [near, far] = sphere.trace(&ray).expect("ray should hit");
        assert_relative_eq!(near, 1.5, epsilon = EPSILON);
        assert_relative_eq!(far, 2.5, epsilon = EPSILON);
    }

    #[test]
    fn missing_ray_has_no_roots() {
        let sphere = Sphere::default();
        let ray = Ray::new(Point3::new(0.0, 0.0, 2.0), Vector3::new(1.0, 1.0, -1.0));

        assert!(sphere.trace(&ray).is_none());
    }

    #[test]
    fn short_direction_still_hits() {
        let sphere = Sphere::default();
        let ray = Ray::new(Point3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, -1e-4));

        let [near, far] = sphere.trace(&ray).expect("short ray should hit");
        assert_relative_eq!(near, 1.5e4, max_relative = 1e-3);
        assert_relative_eq!(far, 2.5e4, max_relative = 1e-3);
        assert_relative_eq!(ray.at(near), Point3::new(0.0, 0.0, 0.5), epsilon = 1e-3);
    }

    #[test]
    fn tangent_ray_returns_a_double_root() {
        let sphere = Sphere::default();
        let ray = Ray::new(Point3::new(0.5, 0.0, 2.0), Vector3::new(0.0, 0.0, -1.0));

        let [near, far] = sphere.trace(&ray).expect("tangent ray should touch");
        assert_relative_eq!(near, far, epsilon = EPSILON);
        assert_relative_eq!(near, 2.0, epsilon = EPSILON);
    }

    #[test]
    fn zero_direction_is_a_miss() {
        let sphere = Sphere::default();
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.1), Vector3::zeros());

        assert!(sphere.trace(&ray).is_none());
    }

    #[test]
    fn light_direction_is_normalized() {
        for direction in [
            Vector3::new(-1.0, -1.0, 1.0),
            Vector3::new(-30.0, -30.0, 30.0),
            Vector3::new(0.001, 0.0, 0.0),
        ] {
            let light = Light::new(direction).expect("non-zero light");
            assert_relative_eq!(light.direction().magnitude(), 1.0, epsilon = EPSILON);
        }
    }

    #[test]
    fn zero_light_is_rejected() {
        assert!(matches!(
            Light::new(Vector3::zeros()),
            Err(VisualizerError::DegenerateLight)
        ));
    }

    #[test]
    fn shading_is_clamped_and_opaque() {
        let light = Light::default();
        let albedo = Vector3::new(0.0, 1.0, 0.0);

        // 빛을 정면으로 받는 면
        let facing = Unit::new_normalize(Vector3::new(1.0, 1.0, -1.0));
        let lit = light.shade(&facing, &albedo);
        assert_relative_eq!(lit, Vector4::new(0.0, 1.0, 0.0, 1.0), epsilon = EPSILON);

        // 빛 반대편 면은 0으로 잘림
        let away = Unit::new_normalize(Vector3::new(-1.0, -1.0, 1.0));
        let dark = light.shade(&away, &albedo);
        assert_relative_eq!(dark, Vector4::new(0.0, 0.0, 0.0, 1.0), epsilon = EPSILON);
    }
}
