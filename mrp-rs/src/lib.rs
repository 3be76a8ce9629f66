use std::collections::HashMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no input on stdin")]
    EmptyInput,
    #[error("model file '{0}' is not listed in the run request")]
    MissingFile(String),
    #[error("failed to deserialize input: {0}")]
    Input(#[source] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A single model run request: the model input, its seed and replicate
/// number, any named input files, and where outputs should go.
pub struct Environment<I = ()> {
    input_json: serde_json::Map<String, Value>,
    pub input: Option<I>,
    pub seed: Option<u64>,
    pub replicate: u64,
    pub files: HashMap<String, PathBuf>,
    output: Value,
}

impl Environment {
    pub fn from_json(data: Value) -> Self {
        let mut input_json = data
            .get("input")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();

        let seed = input_json.remove("seed").and_then(|v| v.as_u64());

        let replicate = input_json
            .remove("replicate")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let files = data
            .get("model")
            .and_then(|m| m.get("files"))
            .and_then(|f| f.as_object())
            .map(|obj| {
                obj.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), PathBuf::from(s))))
                    .collect()
            })
            .unwrap_or_default();

        let output = data.get("output").cloned().unwrap_or(Value::Null);

        Self {
            input_json,
            input: None,
            seed,
            replicate,
            files,
            output,
        }
    }

    pub fn from_stdin() -> Result<Self> {
        let mut raw = String::new();
        io::stdin().read_to_string(&mut raw)?;
        if raw.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        let data: Value = serde_json::from_str(&raw)?;
        Ok(Self::from_json(data))
    }

    /// Reads a run request from disk. Files ending in `.toml` are parsed as
    /// TOML, everything else as JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let data: Value = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&raw)?,
            _ => serde_json::from_str(&raw)?,
        };
        Ok(Self::from_json(data))
    }

    pub fn with_input_type<I: DeserializeOwned>(self) -> Result<Environment<I>> {
        let input = self.input_as::<I>()?;
        Ok(Environment {
            input_json: self.input_json,
            input: Some(input),
            seed: self.seed,
            replicate: self.replicate,
            files: self.files,
            output: self.output,
        })
    }
}

impl<I: DeserializeOwned> Environment<I> {
    pub fn load() -> Result<Self> {
        Environment::from_stdin()?.with_input_type::<I>()
    }
}

impl<I> Environment<I> {
    pub fn input_json(&self) -> &serde_json::Map<String, Value> {
        &self.input_json
    }

    pub fn input_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.input_json.clone())).map_err(Error::Input)
    }

    /// Hex SHA-256 of the model input, seed and replicate excluded. Object
    /// keys are sorted, so the digest does not depend on key order.
    pub fn input_digest(&self) -> String {
        let canonical = Value::Object(self.input_json.clone()).to_string();
        hex::encode(Sha256::digest(canonical.as_bytes()))
    }

    /// Reads the named model file as TOML.
    pub fn read_toml_file<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self
            .files
            .get(name)
            .ok_or_else(|| Error::MissingFile(name.to_string()))?;
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    pub fn output_dir(&self) -> Option<PathBuf> {
        let output = &self.output;

        if output.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return output
                .get("dir")
                .and_then(|v| v.as_str())
                .map(PathBuf::from);
        }

        // Profiled output: prefer "default", else the first profile
        let profile = output
            .get("profile")
            .and_then(|v| v.as_object())
            .and_then(|profiles| profiles.get("default").or_else(|| profiles.values().next()))?;
        if profile.get("spec").and_then(|v| v.as_str()) == Some("filesystem") {
            return profile.get("dir").and_then(|v| v.as_str()).map(PathBuf::from);
        }

        None
    }

    fn create_output(&self, filename: &str) -> Result<Option<fs::File>> {
        match self.output_dir() {
            Some(dir) => {
                fs::create_dir_all(&dir)?;
                let path = dir.join(filename);
                tracing::debug!(path = %path.display(), "writing output file");
                Ok(Some(fs::File::create(path)?))
            }
            None => Ok(None),
        }
    }

    pub fn write(&self, filename: &str, data: &[u8]) -> Result<()> {
        match self.create_output(filename)? {
            Some(mut file) => file.write_all(data)?,
            None => io::stdout().write_all(data)?,
        }
        Ok(())
    }

    pub fn write_json<T: Serialize>(&self, filename: &str, value: &T) -> Result<()> {
        let mut data = serde_json::to_vec_pretty(value)?;
        data.push(b'\n');
        self.write(filename, &data)
    }

    pub fn write_csv(&self, filename: &str, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
        match self.create_output(filename)? {
            Some(file) => write_records(csv::Writer::from_writer(file), headers, rows),
            None => write_records(csv::Writer::from_writer(io::stdout()), headers, rows),
        }
    }
}

fn write_records<W: Write>(
    mut wtr: csv::Writer<W>,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<()> {
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
