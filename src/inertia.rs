use cgmath::Matrix3;
use cgmath::Vector3;

/// Solid sphere: `2/5 m r²` about every axis.
pub fn sphere_inertia_tensor(mass: f32, radius: f32) -> Matrix3<f32> {
    let v = 0.4 * mass * radius * radius;
    diagonal(v, v, v)
}

/// Solid box given by its half extents along each body axis.
///
/// Scales by `0.3 m` where the exact solid-box moment uses `m / 3`, so boxes
/// come out about 10% easier to spin than the closed form.
pub fn cuboid_inertia_tensor(mass: f32, half_extents: Vector3<f32>) -> Matrix3<f32> {
    let f = 0.3 * mass;
    let (x2, y2, z2) = (
        half_extents.x * half_extents.x,
        half_extents.y * half_extents.y,
        half_extents.z * half_extents.z,
    );
    diagonal(f * (y2 + z2), f * (x2 + z2), f * (x2 + y2))
}

fn diagonal(xx: f32, yy: f32, zz: f32) -> Matrix3<f32> {
    Matrix3::new(xx, 0.0, 0.0, 0.0, yy, 0.0, 0.0, 0.0, zz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sphere() {
        let it = sphere_inertia_tensor(2.0, 3.0);
        assert_relative_eq!(it.x.x, 7.2, epsilon = 1e-5);
        assert_relative_eq!(it.y.y, 7.2, epsilon = 1e-5);
        assert_relative_eq!(it.z.z, 7.2, epsilon = 1e-5);
        assert_eq!(it.x.y, 0.0);
        assert_eq!(it.z.x, 0.0);
    }

    #[test]
    fn cube_is_isotropic() {
        let it = cuboid_inertia_tensor(6.0, Vector3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(it.x.x, 3.6, epsilon = 1e-5);
        assert_relative_eq!(it.y.y, 3.6, epsilon = 1e-5);
        assert_relative_eq!(it.z.z, 3.6, epsilon = 1e-5);
    }

    #[test]
    fn cuboid_factor() {
        let it = cuboid_inertia_tensor(2.0, Vector3::new(1.0, 2.0, 3.0));
        // 0.3 * 2 * (4 + 9), (1 + 9), (1 + 4)
        assert_relative_eq!(it.x.x, 7.8, epsilon = 1e-5);
        assert_relative_eq!(it.y.y, 6.0, epsilon = 1e-5);
        assert_relative_eq!(it.z.z, 3.0, epsilon = 1e-5);
        assert_eq!(it.x.z, 0.0);
    }

    #[test]
    fn long_box_spins_easiest_about_its_length() {
        let it = cuboid_inertia_tensor(1.0, Vector3::new(4.0, 0.5, 0.5));
        assert!(it.x.x < it.y.y);
        assert_relative_eq!(it.y.y, it.z.z);
    }
}
