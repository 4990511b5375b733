//! The renderer's 30-value input fixture.

use std::io::Write;
use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use tracing::info;

use super::{generate, ply, Camera, SceneConfig, SplatCloud};
use crate::dump::{self, DumpFile};
use crate::util::{ElementType, Error, Result};
use crate::value::{Array, Elements, Value};

/// Value names in file order.
pub const FIELD_NAMES: [&str; NUM_FIELDS] = [
    "W", "H", //
    "fx", "fy", "cx", "cy", //
    "cq_w", "cq_x", "cq_y", "cq_z", //
    "ct_x", "ct_y", "ct_z", //
    "xyz_x", "xyz_y", "xyz_z", //
    "opas", //
    "s_x", "s_y", "s_z", //
    "rot_w", "rot_x", "rot_y", "rot_z", //
    "c_r", "c_g", "c_b", //
    "sh_r", "sh_g", "sh_b",
];

/// Number of values in a fixture file.
pub const NUM_FIELDS: usize = 30;

const NUM_INT_SCALARS: usize = 2;
const NUM_FLOAT_SCALARS: usize = 11;
const NUM_COLUMNS: usize = 14;

/// Summary of a written fixture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteStats {
    pub path: PathBuf,
    pub splats: usize,
    pub num_values: usize,
    pub bytes: u64,
}

/// Camera plus splat cloud, convertible to and from the fixed value list.
#[derive(Clone, Debug, PartialEq)]
pub struct Fixture {
    pub camera: Camera,
    pub cloud: SplatCloud,
}

impl Fixture {
    pub fn new(camera: Camera, cloud: SplatCloud) -> Self {
        Self { camera, cloud }
    }

    /// Uniform-cube scene with `n` splats.
    pub fn generate(n: usize, config: &SceneConfig) -> Self {
        Self::new(config.camera(), generate::uniform_cube(n, config))
    }

    /// Splats loaded from a PLY file, seen through the configured camera.
    pub fn from_ply(path: impl AsRef<Path>, config: &SceneConfig) -> Result<Self> {
        let cloud = ply::read_ply(path, config.sh_coeffs)?;
        Ok(Self::new(config.camera(), cloud))
    }

    /// Number of splats.
    pub fn len(&self) -> usize {
        self.cloud.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cloud.is_empty()
    }

    /// Lay the fixture out as its 30 values, in file order.
    pub fn into_values(self) -> Result<Vec<Value>> {
        self.cloud.validate()?;
        let Camera { width, height, fx, fy, cx, cy, rotation, translation } = self.camera;
        let n = self.cloud.len();
        let k = self.cloud.sh_coeffs;
        let SplatCloud { positions, opacities, log_scales, rotations, colors, sh, .. } = self.cloud;

        let mut values = Vec::with_capacity(NUM_FIELDS);
        values.push(Value::scalar(width));
        values.push(Value::scalar(height));
        let scalars = [
            fx, fy, cx, cy, //
            rotation.w, rotation.x, rotation.y, rotation.z, //
            translation.x, translation.y, translation.z,
        ];
        values.extend(scalars.into_iter().map(Value::scalar));

        let columns = positions
            .into_iter()
            .chain(std::iter::once(opacities))
            .chain(log_scales)
            .chain(rotations)
            .chain(colors);
        for column in columns {
            values.push(Value::array(n, column)?);
        }
        for channel in sh {
            values.push(Value::array((n, k), channel)?);
        }
        debug_assert_eq!(values.len(), NUM_FIELDS);
        Ok(values)
    }

    /// Rebuild a fixture from its 30 values.
    ///
    /// Fails with [`Error::InvalidStructure`] if the count, element types,
    /// ranks or splat counts do not line up.
    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        if values.len() != NUM_FIELDS {
            return Err(Error::invalid(format!(
                "expected {} values, found {}",
                NUM_FIELDS,
                values.len()
            )));
        }
        let mut fields = FIELD_NAMES.iter().zip(values);

        let mut ints = [0i64; NUM_INT_SCALARS];
        for slot in ints.iter_mut() {
            let (name, value) = next_field(&mut fields)?;
            *slot = value
                .as_scalar::<i64>()
                .ok_or_else(|| unexpected(name, &value, "i64 scalar"))?;
        }
        let mut floats = [0f32; NUM_FLOAT_SCALARS];
        for slot in floats.iter_mut() {
            let (name, value) = next_field(&mut fields)?;
            *slot = value
                .as_scalar::<f32>()
                .ok_or_else(|| unexpected(name, &value, "f32 scalar"))?;
        }

        let mut columns = Vec::with_capacity(NUM_COLUMNS);
        let mut n = None;
        for _ in 0..NUM_COLUMNS {
            let (name, value) = next_field(&mut fields)?;
            let (shape, data) = take_f32_array(name, value, 1)?;
            check_len(name, &mut n, shape[0])?;
            columns.push(data);
        }
        let mut sh = Vec::with_capacity(3);
        let mut k = None;
        for _ in 0..3 {
            let (name, value) = next_field(&mut fields)?;
            let (shape, data) = take_f32_array(name, value, 2)?;
            check_len(name, &mut n, shape[0])?;
            check_len(name, &mut k, shape[1])?;
            sh.push(data);
        }

        let [width, height] = ints;
        let [fx, fy, cx, cy, qw, qx, qy, qz, tx, ty, tz] = floats;
        let camera = Camera {
            width,
            height,
            fx,
            fy,
            cx,
            cy,
            rotation: Quat::from_xyzw(qx, qy, qz, qw),
            translation: Vec3::new(tx, ty, tz),
        };

        let mut columns = columns.into_iter();
        let mut take = || columns.next().unwrap_or_default();
        let mut sh = sh.into_iter();
        let mut take_sh = || sh.next().unwrap_or_default();
        let cloud = SplatCloud {
            positions: [take(), take(), take()],
            opacities: take(),
            log_scales: [take(), take(), take()],
            rotations: [take(), take(), take(), take()],
            colors: [take(), take(), take()],
            sh: [take_sh(), take_sh(), take_sh()],
            sh_coeffs: k.unwrap_or(0) as usize,
        };
        cloud.validate()?;
        Ok(Self { camera, cloud })
    }

    /// Encode the fixture into `sink`.
    pub fn encode<W: Write + ?Sized>(self, sink: &mut W) -> Result<u64> {
        dump::encode_values(sink, &self.into_values()?)
    }

    /// Write the fixture to `path`, replacing it only on full success.
    pub fn write(self, path: impl AsRef<Path>) -> Result<WriteStats> {
        let path = path.as_ref();
        let splats = self.len();
        let values = self.into_values()?;
        let bytes = dump::write_file(path, &values)?;
        info!(path = %path.display(), splats, bytes, "wrote fixture");
        Ok(WriteStats {
            path: path.to_path_buf(),
            splats,
            num_values: values.len(),
            bytes,
        })
    }

    /// Read a fixture file back.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let file = DumpFile::open(path)?;
        Self::from_values(file.read_all()?)
    }
}

fn next_field<'a>(
    fields: &mut impl Iterator<Item = (&'a &'static str, Value)>,
) -> Result<(&'static str, Value)> {
    fields
        .next()
        .map(|(name, value)| (*name, value))
        .ok_or_else(|| Error::invalid("fixture ended early"))
}

fn unexpected(name: &str, value: &Value, wanted: &str) -> Error {
    Error::invalid(format!(
        "'{}' should be a {}, found {} of rank {}",
        name,
        wanted,
        value.element_type(),
        value.rank()
    ))
}

fn take_f32_array(name: &str, value: Value, rank: usize) -> Result<(Vec<u64>, Vec<f32>)> {
    let wanted = if rank == 1 { "f32 array [N]" } else { "f32 array [N, K]" };
    if value.rank() != rank || value.element_type() != ElementType::Float32 {
        return Err(unexpected(name, &value, wanted));
    }
    match value {
        Value::Array(array) => {
            let shape = array.shape().dims().to_vec();
            match Array::into_elements(array) {
                Elements::Float32(data) => Ok((shape, data)),
                Elements::Int64(_) => Err(Error::invalid(format!("'{}' is not f32", name))),
            }
        }
        Value::Scalar(_) => Err(Error::invalid(format!("'{}' is a scalar", name))),
    }
}

fn check_len(name: &str, expected: &mut Option<u64>, actual: u64) -> Result<()> {
    match *expected {
        Some(e) if e != actual => Err(Error::invalid(format!(
            "'{}' has length {}, expected {}",
            name, actual, e
        ))),
        Some(_) => Ok(()),
        None => {
            *expected = Some(actual);
            Ok(())
        }
    }
}
