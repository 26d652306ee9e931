use chrono::{DateTime, Utc};

/// Earth-centred inertial (TEME) state at one instant. Position in km,
/// velocity in km/s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EciVector {
    pub timestamp: DateTime<Utc>,
    pub position_km: [f64; 3],
    pub velocity_km_s: Option<[f64; 3]>,
}

impl EciVector {
    pub fn new(timestamp: DateTime<Utc>, position_km: [f64; 3]) -> Self {
        Self {
            timestamp,
            position_km,
            velocity_km_s: None,
        }
    }

    pub fn with_velocity(mut self, velocity_km_s: [f64; 3]) -> Self {
        self.velocity_km_s = Some(velocity_km_s);
        self
    }

    pub fn radius_km(&self) -> f64 {
        norm(self.position_km)
    }

    pub fn speed_km_s(&self) -> Option<f64> {
        self.velocity_km_s.map(norm)
    }

    pub fn is_finite(&self) -> bool {
        self.position_km.iter().all(|c| c.is_finite())
            && self
                .velocity_km_s
                .map_or(true, |v| v.iter().all(|c| c.is_finite()))
    }
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
