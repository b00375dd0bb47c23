use anyhow::{Context, bail};
use ndarray::{Array1, Array2, ArrayD, ShapeBuilder, arr0};
use ndarray_npy::{NpzReader, NpzWriter};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::{File, OpenOptions},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// One extracted counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CounterValue {
    Scalar(i64),
    Float(f64),
    /// Indexed by core or cache slot
    Array(Vec<i64>),
    FloatArray(Vec<f64>),
    /// Row-major rows, e.g. per core histogram buckets
    Matrix(Vec<Vec<i64>>),
}

/// Flat mapping from counter name to value, the content of both dump formats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterTable {
    values: BTreeMap<String, CounterValue>,
}

fn create_new(path: &Path) -> anyhow::Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("cannot create {}", path.display()))
}

impl CounterTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, value: CounterValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&CounterValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CounterValue)> {
        self.values.iter()
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(create_new(path)?);
        serde_json::to_writer(&mut writer, self)
            .with_context(|| format!("cannot write {}", path.display()))?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let table = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse {}", path.display()))?;
        Ok(table)
    }

    /// Numeric dump: 0-d scalars, 1-d vectors and column-major matrices
    pub fn write_npz<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        let mut npz = NpzWriter::new(create_new(path)?);
        for (name, value) in &self.values {
            match value {
                CounterValue::Scalar(value) => npz.add_array(name.as_str(), &arr0(*value))?,
                CounterValue::Float(value) => npz.add_array(name.as_str(), &arr0(*value))?,
                CounterValue::Array(values) => {
                    npz.add_array(name.as_str(), &Array1::from(values.clone()))?
                }
                CounterValue::FloatArray(values) => {
                    npz.add_array(name.as_str(), &Array1::from(values.clone()))?
                }
                CounterValue::Matrix(rows) => {
                    let cols = rows.first().map_or(0, |row| row.len());
                    if rows.iter().any(|row| row.len() != cols) {
                        bail!("rows of {} differ in length", name);
                    }
                    let matrix = Array2::from_shape_fn((rows.len(), cols).f(), |(i, j)| rows[i][j]);
                    npz.add_array(name.as_str(), &matrix)?
                }
            }
        }
        npz.finish()
            .with_context(|| format!("cannot write {}", path.display()))?;
        Ok(())
    }

    pub fn read_npz<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let mut npz = NpzReader::new(BufReader::new(file))?;
        let names = npz.names()?;

        let mut table = CounterTable::new();
        for (index, name) in names.iter().enumerate() {
            let key = name.strip_suffix(".npy").unwrap_or(name);
            let ints: Result<ArrayD<i64>, _> = npz.by_index(index);
            let value = match ints {
                Ok(array) => {
                    match array.ndim() {
                        0 => CounterValue::Scalar(array.iter().copied().next().unwrap_or(-1)),
                        1 => CounterValue::Array(array.iter().copied().collect()),
                        2 => CounterValue::Matrix(
                            array
                                .outer_iter()
                                .map(|row| row.iter().copied().collect())
                                .collect(),
                        ),
                        ndim => bail!("{} has unsupported rank {}", key, ndim),
                    }
                }
                Err(_) => {
                    let array: ArrayD<f64> = npz
                        .by_index(index)
                        .with_context(|| format!("cannot read {} from {}", key, path.display()))?;
                    match array.ndim() {
                        0 => CounterValue::Float(array.iter().copied().next().unwrap_or(f64::NAN)),
                        1 => CounterValue::FloatArray(array.iter().copied().collect()),
                        ndim => bail!("{} has unsupported rank {}", key, ndim),
                    }
                }
            };
            table.insert(key, value);
        }
        Ok(table)
    }

    /// Write both dumps, nothing is written if either one exists
    pub fn save<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        json_path: P1,
        npz_path: P2,
    ) -> anyhow::Result<()> {
        let (json_path, npz_path) = (json_path.as_ref(), npz_path.as_ref());
        if json_path.exists() || npz_path.exists() {
            bail!(
                "{} or {} already exists",
                json_path.display(),
                npz_path.display()
            );
        }
        self.write_npz(npz_path)?;
        if let Err(err) = self.write_json(json_path) {
            // keep the pair all or nothing
            let _ = std::fs::remove_file(npz_path);
            return Err(err);
        }
        Ok(())
    }
}
