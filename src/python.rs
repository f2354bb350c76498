use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::config::EncoderConfig;
use crate::error::Error;
use crate::scanner;
use crate::session::EncodingSession;

impl From<Error> for PyErr {
    fn from(e: Error) -> PyErr {
        match e {
            Error::InvalidConfiguration(_)
            | Error::InvalidTag(_)
            | Error::Truncated { .. }
            | Error::Corrupt(_) => PyValueError::new_err(e.to_string()),
            _ => PyRuntimeError::new_err(e.to_string()),
        }
    }
}

/// oggbridge - streaming Ogg Vorbis encoding and tag reading
#[pymodule]
fn oggbridge(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Encoder>()?;
    m.add_function(wrap_pyfunction!(read_tags, m)?)?;
    Ok(())
}

/// Streaming Ogg Vorbis encoder
#[pyclass(unsendable)]
pub struct Encoder {
    session: Option<EncodingSession>,
}

impl Encoder {
    fn session(&mut self) -> PyResult<&mut EncodingSession> {
        self.session
            .as_mut()
            .ok_or_else(|| PyRuntimeError::new_err("encoder is closed"))
    }
}

#[pymethods]
impl Encoder {
    #[new]
    #[pyo3(signature = (channels=2, sample_rate=44100, quality=0.5, tags=None))]
    fn new(
        channels: u32,
        sample_rate: u32,
        quality: f32,
        tags: Option<Vec<(String, String)>>,
    ) -> PyResult<Self> {
        let mut config = EncoderConfig::new(channels, sample_rate, quality);
        for (name, value) in tags.unwrap_or_default() {
            config.add_tag(name, value);
        }
        Ok(Encoder {
            session: Some(EncodingSession::new(&config)?),
        })
    }

    /// Encode interleaved float samples
    fn encode(&mut self, samples: Vec<f32>) -> PyResult<()> {
        self.session()?.encode_interleaved(&samples)?;
        Ok(())
    }

    /// Signal end of stream
    fn finish(&mut self) -> PyResult<()> {
        self.session()?.finish()?;
        Ok(())
    }

    /// Encoded bytes produced since the last call, or None
    fn take_data<'py>(&mut self, py: Python<'py>) -> PyResult<Option<Bound<'py, PyBytes>>> {
        Ok(self.session()?.drain().map(|data| PyBytes::new(py, &data)))
    }

    fn close(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
        }
    }

    #[getter]
    fn serial(&self) -> PyResult<u32> {
        self.session
            .as_ref()
            .map(EncodingSession::serial)
            .ok_or_else(|| PyRuntimeError::new_err("encoder is closed"))
    }
}

/// Read (name, value) tag pairs from Ogg Vorbis bytes
#[pyfunction]
fn read_tags(data: &[u8]) -> PyResult<Vec<(String, String)>> {
    Ok(scanner::scan_tags(data)?
        .into_iter()
        .map(|tag| (tag.name, tag.value))
        .collect())
}
