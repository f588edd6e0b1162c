use std::fmt;

pub type GyreResult<T> = Result<T, GyreError>;

#[derive(Debug)]
pub enum GyreError {
    NonFinite(f32),
    InvalidAxis(String),
    InvalidAngle(String),
    InvalidEuler(String),
    InvalidSteps(String),
}
impl fmt::Display for GyreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GyreError::NonFinite(c) => {
                write!(f, "
                    \rQuaternion component is not finite: {c}",
                )
            }
            GyreError::InvalidAxis(arg) => {
                write!(f, "
                    \rInvalid axis {arg}: expected three comma-separated numbers",
                )
            }
            GyreError::InvalidAngle(arg) => {
                write!(f, "
                    \rInvalid angle {arg}: expected degrees as a number",
                )
            }
            GyreError::InvalidEuler(arg) => {
                write!(f, "
                    \rInvalid euler angles {arg}: expected three comma-separated degrees",
                )
            }
            GyreError::InvalidSteps(arg) => {
                write!(f, "
                    \rInvalid step count {arg}: expected a positive integer",
                )
            }
        }
    }
}
