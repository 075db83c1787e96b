use serde::Deserialize;
use thiserror::Error;

/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602176e-19;
/// Proton rest mass (kg).
pub const PROTON_MASS: f64 = 1.67262e-27;
/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 2.99792458e8;

/// Position (m) and velocity (m/s) of the particle in the device frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParticleState {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

impl ParticleState {
    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.vx, self.vy]
    }

    pub fn from_array(z: [f64; 4]) -> Self {
        Self { x: z[0], y: z[1], vx: z[2], vy: z[3] }
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Field and geometry inputs of one integration step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalParameters {
    pub charge: f64,
    pub mass: f64,
    /// Magnetic field B (T), perpendicular to the plane.
    pub field: f64,
    /// Electric field amplitude E (V/m) across the gap.
    pub amplitude: f64,
    pub gap: f64,
    pub dee_radius: f64,
}

impl PhysicalParameters {
    pub fn charge_to_mass(&self) -> f64 {
        self.charge / self.mass
    }

    /// Cyclotron angular frequency ω = qB/m (rad/s).
    pub fn cyclotron_frequency(&self) -> f64 {
        self.charge * self.field / self.mass
    }
}

/// Every value the parameter form can edit: initial conditions,
/// physical parameters and the two static render settings.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Setup {
    pub x0: f64,
    pub y0: f64,
    pub vx0: f64,
    pub vy0: f64,
    pub charge: f64,
    pub mass: f64,
    pub field: f64,
    pub amplitude: f64,
    pub gap: f64,
    pub dee_radius: f64,
    /// Length scale (px/m).
    pub scale: f64,
    pub fps: f64,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            x0: 0.0,
            y0: 0.0,
            vx0: 0.0,
            vy0: 0.0,
            charge: ELEMENTARY_CHARGE,
            mass: PROTON_MASS,
            field: 1e-3,
            amplitude: 1e1,
            gap: 0.02,
            dee_radius: 0.45,
            scale: 1e3,
            fps: 100.0,
        }
    }
}

impl Setup {
    pub fn initial_state(&self) -> ParticleState {
        ParticleState { x: self.x0, y: self.y0, vx: self.vx0, vy: self.vy0 }
    }

    pub fn physics(&self) -> PhysicalParameters {
        PhysicalParameters {
            charge: self.charge,
            mass: self.mass,
            field: self.field,
            amplitude: self.amplitude,
            gap: self.gap,
            dee_radius: self.dee_radius,
        }
    }

    /// Wall-clock time between two frames (s).
    pub fn frame_interval(&self) -> f64 {
        1.0 / self.fps
    }

    pub fn get(&self, field: ParamField) -> f64 {
        match field {
            ParamField::X0 => self.x0,
            ParamField::Y0 => self.y0,
            ParamField::Vx0 => self.vx0,
            ParamField::Vy0 => self.vy0,
            ParamField::Charge => self.charge,
            ParamField::Mass => self.mass,
            ParamField::Field => self.field,
            ParamField::Amplitude => self.amplitude,
            ParamField::Gap => self.gap,
            ParamField::DeeRadius => self.dee_radius,
            ParamField::Scale => self.scale,
            ParamField::Fps => self.fps,
        }
    }

    pub fn set(&mut self, field: ParamField, value: f64) {
        let slot = match field {
            ParamField::X0 => &mut self.x0,
            ParamField::Y0 => &mut self.y0,
            ParamField::Vx0 => &mut self.vx0,
            ParamField::Vy0 => &mut self.vy0,
            ParamField::Charge => &mut self.charge,
            ParamField::Mass => &mut self.mass,
            ParamField::Field => &mut self.field,
            ParamField::Amplitude => &mut self.amplitude,
            ParamField::Gap => &mut self.gap,
            ParamField::DeeRadius => &mut self.dee_radius,
            ParamField::Scale => &mut self.scale,
            ParamField::Fps => &mut self.fps,
        };
        *slot = value;
    }

    /// Check every value against its field's domain.
    pub fn validate(&self) -> Result<(), (ParamField, FieldError)> {
        for &field in ParamField::all() {
            field.check(self.get(field)).map_err(|err| (field, err))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("`{0}` is not a number")]
    NotANumber(String),
    #[error("value must be finite")]
    NotFinite,
    #[error("{label} must be {rule}")]
    OutOfRange { label: &'static str, rule: &'static str },
}

/// One editable entry of the parameter form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    X0,
    Y0,
    Vx0,
    Vy0,
    Charge,
    Mass,
    Field,
    Amplitude,
    Gap,
    DeeRadius,
    Scale,
    Fps,
}

impl ParamField {
    pub fn all() -> &'static [ParamField] {
        &[
            ParamField::X0,
            ParamField::Y0,
            ParamField::Vx0,
            ParamField::Vy0,
            ParamField::Charge,
            ParamField::Mass,
            ParamField::Field,
            ParamField::Amplitude,
            ParamField::Gap,
            ParamField::DeeRadius,
            ParamField::Scale,
            ParamField::Fps,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParamField::X0 => "x\u{2080}",
            ParamField::Y0 => "y\u{2080}",
            ParamField::Vx0 => "vx\u{2080}",
            ParamField::Vy0 => "vy\u{2080}",
            ParamField::Charge => "q",
            ParamField::Mass => "m",
            ParamField::Field => "B",
            ParamField::Amplitude => "E",
            ParamField::Gap => "gap",
            ParamField::DeeRadius => "D radius",
            ParamField::Scale => "scale",
            ParamField::Fps => "fps",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            ParamField::X0 | ParamField::Y0 => "m",
            ParamField::Vx0 | ParamField::Vy0 => "m/s",
            ParamField::Charge => "C",
            ParamField::Mass => "kg",
            ParamField::Field => "T",
            ParamField::Amplitude => "V/m",
            ParamField::Gap | ParamField::DeeRadius => "m",
            ParamField::Scale => "px/m",
            ParamField::Fps => "1/s",
        }
    }

    /// Static fields are locked while the animation is playing; the others
    /// are reapplied to the running simulation.
    pub fn is_static(&self) -> bool {
        !matches!(
            self,
            ParamField::Field | ParamField::Amplitude | ParamField::Gap | ParamField::DeeRadius
        )
    }

    pub fn check(&self, value: f64) -> Result<f64, FieldError> {
        if !value.is_finite() {
            return Err(FieldError::NotFinite);
        }
        let rule = match self {
            ParamField::Mass | ParamField::Scale if value <= 0.0 => Some("positive"),
            ParamField::Gap | ParamField::DeeRadius if value < 0.0 => Some("non-negative"),
            ParamField::Fps if !(1.0..=1000.0).contains(&value) => Some("between 1 and 1000"),
            _ => None,
        };
        match rule {
            Some(rule) => Err(FieldError::OutOfRange { label: self.label(), rule }),
            None => Ok(value),
        }
    }

    pub fn parse(&self, text: &str) -> Result<f64, FieldError> {
        let value = text
            .trim()
            .parse::<f64>()
            .map_err(|_| FieldError::NotANumber(text.to_string()))?;
        self.check(value)
    }
}
