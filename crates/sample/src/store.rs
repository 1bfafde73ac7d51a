//! Reading and writing sample files.

use crate::format::SampleHeader;
use crate::sample::Sample;
use gemmbench_kernels::{GemmError, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// Serialises `sample` in the current format.
pub fn write_sample<W: Write>(writer: &mut W, sample: &Sample) -> Result<()> {
    let header = SampleHeader::for_config(sample.cfg())?;
    writer.write_all(&header.to_bytes())?;
    writer.write_all(sample.a().as_bytes())?;
    writer.write_all(sample.b().as_bytes())?;
    for value in sample.c() {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Parses a sample of any supported version.
pub fn read_sample<R: Read>(reader: &mut R) -> Result<Sample> {
    let header = SampleHeader::read_from(reader)?;
    let cfg = header.config()?;
    let (a_len, b_len, c_len) = header.section_sizes()?;

    let a = read_section(reader, a_len, "A")?;
    let b = read_section(reader, b_len, "B")?;
    let c = read_section(reader, c_len, "C")?
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    Sample::new(cfg, a, b, c)
}

/// Writes `sample` to `path`, creating parent directories.
///
/// The header is validated before the file is created.
pub fn save_sample(path: impl AsRef<Path>, sample: &Sample) -> Result<()> {
    let path = path.as_ref();
    SampleHeader::for_config(sample.cfg())?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    write_sample(&mut writer, sample)?;
    writer.flush()?;

    let cfg = sample.cfg();
    info!(
        path = %path.display(),
        m = cfg.m,
        n = cfg.n,
        k = cfg.k,
        dtype = %cfg.dtype,
        "saved sample"
    );
    Ok(())
}

pub fn load_sample(path: impl AsRef<Path>) -> Result<Sample> {
    let path = path.as_ref();
    let mut reader = BufReader::new(File::open(path)?);
    let sample = read_sample(&mut reader)?;

    let cfg = sample.cfg();
    info!(
        path = %path.display(),
        m = cfg.m,
        n = cfg.n,
        k = cfg.k,
        dtype = %cfg.dtype,
        "loaded sample"
    );
    Ok(sample)
}

/// Reads exactly `len` bytes without trusting `len` for the up-front allocation.
fn read_section<R: Read>(reader: &mut R, len: usize, name: &str) -> Result<Vec<u8>> {
    let mut section = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut section)?;
    if section.len() != len {
        return Err(GemmError::TruncatedFile(format!(
            "section {name} holds {} of {len} bytes",
            section.len()
        )));
    }
    Ok(section)
}
