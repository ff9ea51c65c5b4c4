use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use log::info;
use serde::{Serialize, Deserialize};

use crate::activation::ActivationScheme;
use crate::error::{NnError, Result};
use crate::graph::topology::Topology;
use crate::persist::parameters::Parameters;

/// Bytes per stored value.
const VALUE_WIDTH: usize = 8;

/// Writes `values` as a headerless stream of little-endian `f64`s.
pub fn write_stream(path: impl AsRef<Path>, values: &[f64]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for value in values {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a stream written by [`write_stream`].
///
/// A missing file or a length that is not a whole number of values is a
/// persistence error.
pub fn read_stream(path: impl AsRef<Path>) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => NnError::persistence(format!("{} does not exist", path.display())),
        _ => NnError::Io(e),
    })?;

    let mut bytes = Vec::new();
    BufReader::new(file).read_to_end(&mut bytes)?;
    if bytes.len() % VALUE_WIDTH != 0 {
        return Err(NnError::persistence(format!(
            "{} is truncated: {} bytes is not a multiple of {VALUE_WIDTH}",
            path.display(),
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(VALUE_WIDTH)
        .map(|chunk| {
            let mut raw = [0u8; VALUE_WIDTH];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect())
}

/// A pair of parameter files: one weight stream, one bias stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterStore {
    pub weights_path: PathBuf,
    pub biases_path: PathBuf,
}

impl ParameterStore {
    pub fn new(weights_path: impl Into<PathBuf>, biases_path: impl Into<PathBuf>) -> ParameterStore {
        ParameterStore { weights_path: weights_path.into(), biases_path: biases_path.into() }
    }

    /// The files of replica `replica` inside `dir`.
    pub fn for_replica(dir: impl AsRef<Path>, replica: usize) -> ParameterStore {
        let dir = dir.as_ref();
        ParameterStore::new(
            dir.join(format!("replica-{replica}-weights.bin")),
            dir.join(format!("replica-{replica}-biases.bin")),
        )
    }

    pub fn save(&self, parameters: &Parameters) -> Result<()> {
        write_stream(&self.weights_path, &parameters.weights)?;
        write_stream(&self.biases_path, &parameters.biases)?;
        info!(
            "saved {} weights to {} and {} biases to {}",
            parameters.weights.len(),
            self.weights_path.display(),
            parameters.biases.len(),
            self.biases_path.display()
        );
        Ok(())
    }

    /// Reads both streams and checks them against `topology`.
    pub fn load(&self, topology: &Topology) -> Result<Parameters> {
        let parameters = Parameters::new(read_stream(&self.weights_path)?, read_stream(&self.biases_path)?);
        parameters.check_fits(topology)?;
        Ok(parameters)
    }
}

/// Every replica's parameters plus the shape needed to rebuild them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub topology: Topology,
    pub scheme: ActivationScheme,
    pub replicas: Vec<Parameters>,
}

impl Snapshot {
    /// Serializes the snapshot to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a snapshot and checks every replica against its topology.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Snapshot> {
        let reader = BufReader::new(File::open(path)?);
        let snapshot: Snapshot = serde_json::from_reader(reader)?;
        for parameters in &snapshot.replicas {
            parameters.check_fits(&snapshot.topology)?;
        }
        Ok(snapshot)
    }
}
