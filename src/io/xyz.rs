// src/io/xyz.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Vector3;

use crate::error::{Result, SimError};
use crate::model::elements;

/// Reads an XYZ file into `(element, Cartesian position)` pairs.
///
/// Line 1 is the atom count, line 2 a free comment, then one
/// `element x y z` record per line.
pub fn parse(path: &Path) -> Result<Vec<(String, Vector3<f64>)>> {
    let file = File::open(path)?;
    let mut lines = BufReader::new(file).lines();

    let count_line = lines
        .next()
        .ok_or_else(|| SimError::Parse("empty XYZ file".into()))??;
    let declared: usize = count_line
        .trim()
        .parse()
        .map_err(|_| SimError::Parse(format!("invalid XYZ atom count '{}'", count_line.trim())))?;

    // Comment line; may legitimately be missing for zero atoms.
    let _ = lines.next();

    let mut coords = Vec::with_capacity(declared);
    for line in lines {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts.len() < 4 {
            return Err(SimError::Parse(format!("short XYZ record '{line}'")));
        }

        let element = elements::normalize_symbol(parts[0]);
        let x: f64 = parse_coord(parts[1])?;
        let y: f64 = parse_coord(parts[2])?;
        let z: f64 = parse_coord(parts[3])?;
        coords.push((element, Vector3::new(x, y, z)));
    }

    Ok(coords)
}

fn parse_coord(token: &str) -> Result<f64> {
    token
        .parse()
        .map_err(|_| SimError::Parse(format!("invalid coordinate '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("diffsim-xyz-{}-{name}", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_simple_file() {
        let path = write_temp(
            "ok.xyz",
            "3\nwater molecule\nO 0.0 0.0 0.117\nH 0.0 0.757 -0.469\nH 0.0 -0.757 -0.469\n",
        );
        let coords = parse(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(coords.len(), 3);
        assert_eq!(coords[0].0, "O");
        assert!((coords[1].1.y - 0.757).abs() < 1e-12);
    }

    #[test]
    fn normalises_element_casing() {
        let path = write_temp("case.xyz", "1\n\nFE 1.0 2.0 3.0\n");
        let coords = parse(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(coords[0].0, "Fe");
    }

    #[test]
    fn rejects_garbage() {
        let path = write_temp("bad.xyz", "not-a-count\n\n");
        assert!(matches!(parse(&path), Err(SimError::Parse(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
