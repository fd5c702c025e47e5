//! Explicit Euler-Cromer particle pushers.
//!
//! Velocities staggered by dt/2 at initialization make this the usual
//! leap-frog scheme. Pushers never allocate and never remove particles;
//! boundaries and collisions do.

use discharge_types::species::{ChargedSpecies1D3V, ChargedSpecies2D3V};

/// Radius below which the cylindrical update is regularized on the axis.
const AXIS_EPS: f64 = 1e-15;

/// Advance a 1D-3V population one step under its gathered field.
///
/// Only the x components move; vy and vz are carried unchanged (they
/// still contribute kinetic energy in the collision module).
pub fn move_particles(species: &mut ChargedSpecies1D3V, dt: f64) {
    let n = species.n();
    let k = species.q() * dt / species.m();

    for i in 0..n {
        let f = species.f()[i];
        let v = &mut species.v_mut()[i];
        v.x += f * k;
        let vx = v.x;
        species.x_mut()[i] += vx * dt;
    }
}

/// Advance a 2D-3V Cartesian population one step.
pub fn move_particles_2d(species: &mut ChargedSpecies2D3V, dt: f64) {
    let n = species.n();
    let k = species.q() * dt / species.m();

    for i in 0..n {
        let f = species.f()[i];
        let v = &mut species.v_mut()[i];
        v.x += f.x * k;
        v.y += f.y * k;
        let (vx, vy) = (v.x, v.y);
        let x = &mut species.x_mut()[i];
        x.x += vx * dt;
        x.y += vy * dt;
    }
}

/// Advance a 2D-3V population in cylindrical (z, r) coordinates.
///
/// Velocity is (vz, vr, vtheta). The radial acceleration carries the
/// centrifugal term vtheta^2/r and the azimuthal one the Coriolis term
/// -vr*vtheta/r. On the axis (r below `AXIS_EPS`) both couplings are
/// dropped and the radial/azimuthal velocities are zeroed; a particle
/// stepping to r < 0 is reflected onto the axis.
pub fn move_particles_cylindrical(species: &mut ChargedSpecies2D3V, dt: f64) {
    let n = species.n();
    let k = species.q() / species.m();

    for i in 0..n {
        let f = species.f()[i];
        let ez = f.x;
        let er = f.y;
        let r = species.x()[i].y;

        let v = &mut species.v_mut()[i];
        let az = k * ez;
        let ar;
        let atheta;
        if r > AXIS_EPS {
            ar = k * er + v.z * v.z / r;
            atheta = -v.y * v.z / r;
        } else {
            ar = 0.0;
            atheta = 0.0;
            if r.abs() < AXIS_EPS {
                v.y = 0.0;
                v.z = 0.0;
            }
        }

        v.x += az * dt;
        v.y += ar * dt;
        v.z += atheta * dt;
        let (vz, vr) = (v.x, v.y);

        let x = &mut species.x_mut()[i];
        x.x += vz * dt;
        x.y += vr * dt;

        if x.y < 0.0 {
            x.y = 0.0;
            let v = &mut species.v_mut()[i];
            v.y = 0.0;
            v.z = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use discharge_types::vec::{Vec2, Vec3};

    #[test]
    fn test_free_particle_1d_ten_steps() {
        let mut s = ChargedSpecies1D3V::new(-1.0, 1.0).unwrap();
        s.add(0.0, Vec3::new(1.0, 2.0, 3.0));
        for _ in 0..10 {
            move_particles(&mut s, 0.1);
        }
        assert!((s.x()[0] - 1.0).abs() < 1e-12, "x = {}", s.x()[0]);
        assert_eq!(s.v()[0], Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_speed_preserved_without_field_1d() {
        let mut s = ChargedSpecies1D3V::new(-1.0, 1.0).unwrap();
        s.add(0.5, Vec3::new(-0.3, 0.4, 1.2));
        let speed0 = s.v()[0].norm();
        for _ in 0..1000 {
            move_particles(&mut s, 1e-3);
        }
        assert_eq!(s.v()[0].norm(), speed0, "free-field speed must be exact");
    }

    #[test]
    fn test_constant_field_accelerates_1d() {
        let mut s = ChargedSpecies1D3V::new(2.0, 4.0).unwrap();
        s.add(0.0, Vec3::default());
        s.f_mut()[0] = 3.0;
        move_particles(&mut s, 0.5);
        // dv = q E dt / m = 2*3*0.5/4 = 0.75; dx = v_new * dt
        assert!((s.v()[0].x - 0.75).abs() < 1e-15);
        assert!((s.x()[0] - 0.375).abs() < 1e-15);
    }

    #[test]
    fn test_2d_carries_vz() {
        let mut s = ChargedSpecies2D3V::new(1.0, 1.0).unwrap();
        s.add(Vec2::new(0.0, 0.0), Vec3::new(1.0, -1.0, 5.0));
        s.f_mut()[0] = Vec2::new(0.5, 0.5);
        move_particles_2d(&mut s, 1.0);
        assert!((s.v()[0].x - 1.5).abs() < 1e-15);
        assert!((s.v()[0].y + 0.5).abs() < 1e-15);
        assert_eq!(s.v()[0].z, 5.0);
        assert!((s.x()[0].x - 1.5).abs() < 1e-15);
    }

    #[test]
    fn test_cylindrical_axis_regularization() {
        let mut s = ChargedSpecies2D3V::new(1.0, 1.0).unwrap();
        s.add(Vec2::new(0.0, 1e-16), Vec3::new(0.0, 1.0, 1.0));
        move_particles_cylindrical(&mut s, 1.0);
        assert_eq!(s.v()[0], Vec3::new(0.0, 0.0, 0.0));
        assert!(s.x()[0].x.abs() < 1e-15);
        assert!(s.x()[0].y.abs() < 1e-15);
    }

    #[test]
    fn test_cylindrical_negative_r_reflects_to_axis() {
        let mut s = ChargedSpecies2D3V::new(1.0, 1.0).unwrap();
        s.add(Vec2::new(0.0, 0.1), Vec3::new(0.0, -1.0, 0.3));
        move_particles_cylindrical(&mut s, 1.0);
        assert_eq!(s.x()[0].y, 0.0);
        assert_eq!(s.v()[0].y, 0.0);
        assert_eq!(s.v()[0].z, 0.0);
    }

    #[test]
    fn test_cylindrical_centrifugal_pushes_outward() {
        let mut s = ChargedSpecies2D3V::new(1.0, 1.0).unwrap();
        s.add(Vec2::new(0.0, 1.0), Vec3::new(0.0, 0.0, 2.0));
        move_particles_cylindrical(&mut s, 0.01);
        // ar = vtheta^2 / r = 4
        assert!((s.v()[0].y - 0.04).abs() < 1e-12);
        assert!(s.x()[0].y > 1.0);
    }

    #[test]
    fn test_cylindrical_speed_drift_off_axis_is_second_order() {
        let mut s = ChargedSpecies2D3V::new(1.0, 1.0).unwrap();
        s.add(Vec2::new(0.0, 2.0), Vec3::new(0.1, 0.2, 0.5));
        let speed0 = s.v()[0].norm();
        let dt = 1e-5;
        move_particles_cylindrical(&mut s, dt);
        let speed1 = s.v()[0].norm();
        // Rotation couplings conserve speed up to O(dt^2 |v| / r).
        assert!(
            (speed1 - speed0).abs() < 10.0 * dt * dt * speed0 / 2.0 + 1e-14,
            "drift = {}",
            (speed1 - speed0).abs()
        );
    }
}
