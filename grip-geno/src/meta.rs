//! `.fam` / `.bim` metadata parsing.
//!
//! Front-end collaborators of the numeric core: the kernels take
//! explicit counts and index vectors, and this module is where the
//! CLI turns the PLINK companion files into them.

use std::path::Path;

use anyhow::{bail, Context, Result};

/// One `.bim` line (one per variant).
#[derive(Debug, Clone)]
pub struct BimEntry {
    pub chrom: String,
    pub id: String,
    pub cm: f64,
    pub pos: u64,
    pub allele1: String,
    pub allele2: String,
}

/// One `.fam` line (one per sample).
#[derive(Debug, Clone)]
pub struct FamEntry {
    pub fid: String,
    pub iid: String,
    pub father: String,
    pub mother: String,
    pub sex: i32,
    pub pheno: f64,
}

/// Parse a `.fam` file.
pub fn parse_fam(path: &Path) -> Result<Vec<FamEntry>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fam file: {}", path.display()))?;
    let mut entries = Vec::new();
    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            bail!("Fam file line {} has fewer than 6 fields", line_num + 1);
        }
        entries.push(FamEntry {
            fid: fields[0].to_string(),
            iid: fields[1].to_string(),
            father: fields[2].to_string(),
            mother: fields[3].to_string(),
            sex: fields[4].parse().unwrap_or(0),
            pheno: fields[5].parse().unwrap_or(f64::NAN),
        });
    }
    Ok(entries)
}

/// Parse a `.bim` file.
pub fn parse_bim(path: &Path) -> Result<Vec<BimEntry>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read bim file: {}", path.display()))?;
    let mut entries = Vec::new();
    for (line_num, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 6 {
            bail!("Bim file line {} has fewer than 6 fields", line_num + 1);
        }
        entries.push(BimEntry {
            chrom: fields[0].to_string(),
            id: fields[1].to_string(),
            cm: fields[2].parse().unwrap_or(0.0),
            pos: fields[3].parse().unwrap_or(0),
            allele1: fields[4].to_string(),
            allele2: fields[5].to_string(),
        });
    }
    Ok(entries)
}

/// Resolve sample IDs to 1-based row indices, preserving the order of
/// `ids`. Unknown IDs are an error: a silent drop would desynchronize
/// the caller's phenotype vector from the row subset.
pub fn rows_for_samples(fam: &[FamEntry], ids: &[String]) -> Result<Vec<usize>> {
    let mut rows = Vec::with_capacity(ids.len());
    for id in ids {
        match fam.iter().position(|f| &f.iid == id) {
            Some(pos) => rows.push(pos + 1),
            None => bail!("Sample '{}' not found in fam file", id),
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_fam_and_resolve_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toy.fam");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "F1 S1 0 0 1 2.5").unwrap();
        writeln!(f, "F1 S2 0 0 2 -9").unwrap();
        writeln!(f, "F2 S3 0 0 1 0.1").unwrap();
        drop(f);

        let fam = parse_fam(&path).unwrap();
        assert_eq!(fam.len(), 3);
        assert_eq!(fam[0].iid, "S1");
        assert!((fam[0].pheno - 2.5).abs() < 1e-12);

        let rows = rows_for_samples(&fam, &["S3".into(), "S1".into()]).unwrap();
        assert_eq!(rows, vec![3, 1]);
        assert!(rows_for_samples(&fam, &["S9".into()]).is_err());
    }

    #[test]
    fn test_parse_bim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toy.bim");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "1 rs1 0 1000 A C").unwrap();
        writeln!(f, "2 rs2 0.5 2000 G T").unwrap();
        drop(f);

        let bim = parse_bim(&path).unwrap();
        assert_eq!(bim.len(), 2);
        assert_eq!(bim[1].id, "rs2");
        assert_eq!(bim[1].pos, 2000);
    }

    #[test]
    fn test_parse_fam_rejects_short_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.fam");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "F1 S1 0").unwrap();
        drop(f);
        assert!(parse_fam(&path).is_err());
    }
}
