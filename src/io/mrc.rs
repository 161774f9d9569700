// src/io/mrc.rs
//
// Minimal MRC2014 container: 1024-byte header, mode 2 (float32,
// little-endian), data stored x-fastest / slice-major. Enough of the
// standard for intensity stacks and spectrum tables; no extended
// headers, no labels.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Result, SimError};
use crate::physics::Simulation;

const HEADER_LEN: usize = 1024;
const MODE_FLOAT32: i32 = 2;

/// A 3-D float volume; `data` runs x fastest, z (slice) slowest.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub data: Vec<f32>,
}

impl Volume {
    pub fn new(nx: usize, ny: usize, nz: usize, data: Vec<f32>) -> Result<Self> {
        if data.len() != nx * ny * nz {
            return Err(SimError::Domain(format!(
                "volume data length {} does not match {}x{}x{}",
                data.len(),
                nx,
                ny,
                nz
            )));
        }
        Ok(Self { nx, ny, nz, data })
    }

    pub fn slice(&self, z: usize) -> &[f32] {
        let n = self.nx * self.ny;
        &self.data[z * n..(z + 1) * n]
    }
}

/// Writes a volume to a new MRC file. Refuses to overwrite.
pub fn write(path: &Path, volume: &Volume) -> Result<()> {
    if path.exists() {
        return Err(SimError::AlreadyExists(path.display().to_string()));
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(&build_header(volume))?;
    for value in &volume.data {
        writer.write_all(&value.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads a mode-2 MRC file back into a volume.
pub fn read(path: &Path) -> Result<Volume> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;

    let nx = read_i32(&header, 0)?;
    let ny = read_i32(&header, 4)?;
    let nz = read_i32(&header, 8)?;
    let mode = i32::from_le_bytes(header[12..16].try_into().unwrap());
    if mode != MODE_FLOAT32 {
        return Err(SimError::Parse(format!(
            "unsupported MRC mode {mode}; only float32 (mode 2) is handled"
        )));
    }
    if &header[208..212] != b"MAP " {
        return Err(SimError::Parse("missing MRC format stamp".into()));
    }

    let count = nx * ny * nz;
    let mut bytes = vec![0u8; count * 4];
    reader.read_exact(&mut bytes)?;

    let data = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
        .collect();
    Volume::new(nx, ny, nz, data)
}

/// Writes the engine's intensity stack: slice-major, image index
/// outermost, pixels cast to single precision.
pub fn export_stack(path: &Path, sim: &Simulation) -> Result<()> {
    let n = sim.resolution();
    let data: Vec<f32> = sim.intensities().iter().map(|&v| v as f32).collect();
    let volume = Volume::new(n, n, sim.image_count(), data)?;
    write(path, &volume)
}

/// Writes the radial spectrum table: row 0 lower bin edges, then one
/// intensity row per image, all in one slice.
pub fn export_spectrum(path: &Path, sim: &Simulation) -> Result<()> {
    let spectrum = sim.spectrum()?;
    let bins = spectrum.edges.len();

    let mut data: Vec<f32> = Vec::with_capacity(bins * (spectrum.rows.len() + 1));
    data.extend(spectrum.edges.iter().map(|&v| v as f32));
    for row in &spectrum.rows {
        data.extend(row.iter().map(|&v| v as f32));
    }

    let volume = Volume::new(bins, spectrum.rows.len() + 1, 1, data)?;
    write(path, &volume)
}

fn read_i32(header: &[u8], offset: usize) -> Result<usize> {
    let value = i32::from_le_bytes(header[offset..offset + 4].try_into().unwrap());
    if value <= 0 {
        return Err(SimError::Parse(format!("invalid MRC dimension {value}")));
    }
    Ok(value as usize)
}

fn build_header(volume: &Volume) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    let put_i32 = |buf: &mut [u8; HEADER_LEN], word: usize, value: i32| {
        buf[word * 4..word * 4 + 4].copy_from_slice(&value.to_le_bytes());
    };
    let put_f32 = |buf: &mut [u8; HEADER_LEN], word: usize, value: f32| {
        buf[word * 4..word * 4 + 4].copy_from_slice(&value.to_le_bytes());
    };

    let (nx, ny, nz) = (volume.nx as i32, volume.ny as i32, volume.nz as i32);
    put_i32(&mut header, 0, nx);
    put_i32(&mut header, 1, ny);
    put_i32(&mut header, 2, nz);
    put_i32(&mut header, 3, MODE_FLOAT32);
    // words 4-6: nxstart/nystart/nzstart stay 0
    put_i32(&mut header, 7, nx); // mx
    put_i32(&mut header, 8, ny); // my
    put_i32(&mut header, 9, nz); // mz
    put_f32(&mut header, 10, nx as f32); // cell dimensions
    put_f32(&mut header, 11, ny as f32);
    put_f32(&mut header, 12, nz as f32);
    put_f32(&mut header, 13, 90.0); // cell angles
    put_f32(&mut header, 14, 90.0);
    put_f32(&mut header, 15, 90.0);
    put_i32(&mut header, 16, 1); // mapc = x
    put_i32(&mut header, 17, 2); // mapr = y
    put_i32(&mut header, 18, 3); // maps = z

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for &v in &volume.data {
        min = min.min(v);
        max = max.max(v);
        sum += v as f64;
        sum_sq += (v as f64) * (v as f64);
    }
    let count = volume.data.len().max(1) as f64;
    let mean = sum / count;
    let rms = (sum_sq / count - mean * mean).max(0.0).sqrt();
    if volume.data.is_empty() {
        min = 0.0;
        max = 0.0;
    }
    put_f32(&mut header, 19, min);
    put_f32(&mut header, 20, max);
    put_f32(&mut header, 21, mean as f32);
    // word 22: ispg = 0 (image stack), word 23: nsymbt = 0

    header[208..212].copy_from_slice(b"MAP "); // word 52
    header[212..216].copy_from_slice(&[0x44, 0x44, 0x00, 0x00]); // little-endian stamp
    put_f32(&mut header, 54, rms as f32);
    // word 55: nlabl = 0

    header
}
