// src/io/pdb.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra::Vector3;

use crate::error::{Result, SimError};
use crate::model::elements;

/// Reads ATOM/HETATM records from a PDB file.
///
/// Coordinates come from the fixed columns 31-54; the element symbol
/// from columns 77-78 when present, otherwise from the leading letters
/// of the atom name (columns 13-16).
pub fn parse(path: &Path) -> Result<Vec<(String, Vector3<f64>)>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut coords = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if !(line.starts_with("ATOM") || line.starts_with("HETATM")) {
            continue;
        }
        if line.len() < 54 {
            return Err(SimError::Parse(format!("short PDB record '{line}'")));
        }

        let x = parse_field(&line[30..38])?;
        let y = parse_field(&line[38..46])?;
        let z = parse_field(&line[46..54])?;

        let symbol = if line.len() >= 78 && !line[76..78].trim().is_empty() {
            line[76..78].trim().to_string()
        } else {
            line[12..16]
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_alphabetic())
                .collect()
        };
        if symbol.is_empty() {
            return Err(SimError::Parse(format!("PDB record without element '{line}'")));
        }

        coords.push((elements::normalize_symbol(&symbol), Vector3::new(x, y, z)));
    }

    if coords.is_empty() {
        return Err(SimError::Parse("PDB file contains no ATOM records".into()));
    }
    Ok(coords)
}

fn parse_field(field: &str) -> Result<f64> {
    field
        .trim()
        .parse()
        .map_err(|_| SimError::Parse(format!("invalid PDB coordinate '{}'", field.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("diffsim-pdb-{}-{name}", std::process::id()));
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_atom_records() {
        let content = "\
HEADER    TEST
ATOM      1  O   HOH A   1       0.000   0.000   0.117  1.00  0.00           O
ATOM      2  H1  HOH A   1       0.000   0.757  -0.469  1.00  0.00           H
HETATM    3 FE   HEM A   2       1.500   2.500   3.500  1.00  0.00          FE
END
";
        let path = write_temp("ok.pdb", content);
        let coords = parse(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(coords.len(), 3);
        assert_eq!(coords[0].0, "O");
        assert_eq!(coords[2].0, "Fe");
        assert!((coords[2].1 - Vector3::new(1.5, 2.5, 3.5)).norm() < 1e-12);
    }

    #[test]
    fn element_falls_back_to_atom_name() {
        let content =
            "ATOM      1  CA  ALA A   1       1.000   2.000   3.000  1.00  0.00\n";
        let path = write_temp("fallback.pdb", content);
        let coords = parse(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(coords[0].0, "Ca");
    }

    #[test]
    fn empty_file_rejected() {
        let path = write_temp("empty.pdb", "HEADER    NOTHING\nEND\n");
        assert!(matches!(parse(&path), Err(SimError::Parse(_))));
        std::fs::remove_file(&path).unwrap();
    }
}
