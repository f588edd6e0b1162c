use std::fmt;

use crate::error::{GyreError, GyreResult};
use crate::vector::Vec3;
use crate::quaternion::Quaternion;


/// Parsing states.
enum Parse {
    None,
    Axis,
    Angle,
    Euler,
    Steps,
}


/// Orientation settings parsed from the command line. Angles are given
/// in degrees on the command line and stored in radians.
#[derive(Clone, Debug)]
pub struct Config {
    pub axis: Vec3,
    pub angle: f32,
    pub euler: Option<Vec3>,
    pub steps: usize,
}
impl Config {
    /// Create a new Config with the specified command line arguments.
    pub fn new(args: Vec<String>) -> GyreResult<Config> {
        let mut parser = Parse::None;
        let mut cfg    = Config::default();

        for arg in args.into_iter() {
            match arg.as_str() {
                "-axis" => {
                    parser = Parse::Axis;
                    continue;
                }
                "-angle" => {
                    parser = Parse::Angle;
                    continue;
                }
                "-euler" => {
                    parser = Parse::Euler;
                    continue;
                }
                "-steps" => {
                    parser = Parse::Steps;
                    continue;
                }
                _ => {},
            }
            match parser {
                Parse::Axis => {
                    if let Some(axis) = parse_triple(&arg) {
                        cfg.axis = axis.normalized();
                    }
                    else {
                        return Err(
                            GyreError::InvalidAxis(arg.clone())
                        );
                    }
                }
                Parse::Angle => {
                    if let Ok(deg) = arg.parse::<f32>() {
                        cfg.angle = deg.to_radians();
                    }
                    else {
                        return Err(
                            GyreError::InvalidAngle(arg.clone())
                        );
                    }
                }
                Parse::Euler => {
                    if let Some(deg) = parse_triple(&arg) {
                        cfg.euler = Some(Vec3::new(
                            deg.x.to_radians(),
                            deg.y.to_radians(),
                            deg.z.to_radians(),
                        ));
                    }
                    else {
                        return Err(
                            GyreError::InvalidEuler(arg.clone())
                        );
                    }
                }
                Parse::Steps => {
                    if let Ok(steps) = arg.parse::<usize>() {
                        cfg.steps = steps;
                    }
                    else {
                        return Err(
                            GyreError::InvalidSteps(arg.clone())
                        );
                    }
                }
                Parse::None => {},
            }
        }
        Ok(cfg)
    }

    /// The configured orientation. Euler angles win over axis-angle
    /// when both are present.
    pub fn orientation(&self) -> Quaternion {
        if let Some(euler) = self.euler {
            Quaternion::from_euler(euler.x, euler.y, euler.z)
        }
        else {
            Quaternion::from_axis_angle(self.axis, self.angle)
        }
    }
}
impl Default for Config {
    fn default() -> Self {
        Self {
            axis: Vec3::unit_y(),
            angle: 0.0,
            euler: None,
            steps: 1,
        }
    }
}
impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "
            \rAxis: {}, {}, {}
            \rAngle: {} rad
            \rEuler: {}
            \rSteps: {}",
            self.axis.x,
            self.axis.y,
            self.axis.z,
            self.angle,
            if let Some(e) = &self.euler {
                format!("{}, {}, {} rad", e.x, e.y, e.z)
            }
            else {
                String::from("None")
            },
            self.steps,
        )
    }
}

/// Splits `"x,y,z"` into a vector.
fn parse_triple(arg: &str) -> Option<Vec3> {
    let mut parts = arg.split(',');
    let x = parts.next()?.trim().parse::<f32>().ok()?;
    let y = parts.next()?.trim().parse::<f32>().ok()?;
    let z = parts.next()?.trim().parse::<f32>().ok()?;

    if parts.next().is_some() {
        return None;
    }
    Some(Vec3::new(x, y, z))
}


#[test]
fn parse_axis_angle_args() {
    let args = vec![
        String::from("-axis"), String::from("0,0,1"),
        String::from("-angle"), String::from("90"),
        String::from("-steps"), String::from("4"),
    ];
    let cfg = Config::new(args).unwrap();

    assert!(cfg.axis == Vec3::unit_z());
    assert!((cfg.angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    assert!(cfg.steps == 4);
    assert!((cfg.orientation().len_sq() - 1.0).abs() < 1e-5);
}

#[test]
fn parse_euler_args() {
    let args = vec![
        String::from("-euler"), String::from("10,20,30"),
    ];
    let cfg = Config::new(args).unwrap();

    let euler = cfg.euler.unwrap();
    assert!((euler.x - 10.0_f32.to_radians()).abs() < 1e-6);
    assert!((euler.z - 30.0_f32.to_radians()).abs() < 1e-6);
}

#[test]
fn bad_values_are_rejected() {
    assert!(Config::new(vec![String::from("-angle"), String::from("fast")]).is_err());
    assert!(Config::new(vec![String::from("-axis"), String::from("1,2")]).is_err());
    assert!(Config::new(vec![String::from("-steps"), String::from("-3")]).is_err());
}
