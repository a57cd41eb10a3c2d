//! Film simulation catalog.
//!
//! A simulation pairs an optional 3D LUT with a partial adjustment override.
//! The built-in definitions can be extended or replaced by a
//! `simulations.json` manifest in the catalog directory. LUTs are read from
//! `<dir>/<id>.cube` unless the definition names another file.
//!
//! A definition whose LUT fails to load, or turns out to be an identity, is
//! skipped with a warning; the remaining simulations still load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::transform::lut::Lut3D;
use crate::transform::params::{AdjustmentOverrides, AdjustmentParams};

/// File name of the optional catalog manifest.
pub const MANIFEST_FILE: &str = "simulations.json";

/// Where a simulation's LUT comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LutSource {
    /// `<dir>/<id>.cube`.
    #[default]
    ById,
    /// A path relative to the catalog directory.
    File(String),
    /// No LUT; only the overrides apply.
    None,
}

/// Static description of one simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationDef {
    pub id: String,
    pub name: String,
    pub description: String,
    pub year: u16,
    /// Nominal grid size of the LUT.
    pub lut_size: usize,
    #[serde(default)]
    pub lut: LutSource,
    #[serde(default = "AdjustmentOverrides::neutral_basics")]
    pub overrides: AdjustmentOverrides,
}

impl SimulationDef {
    fn builtin(id: &str, name: &str, description: &str, year: u16, lut_size: usize) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            year,
            lut_size,
            lut: LutSource::ById,
            overrides: AdjustmentOverrides::neutral_basics(),
        }
    }

    /// Path of the LUT inside `dir`, if this definition uses one.
    pub fn lut_path(&self, dir: &Path) -> Option<PathBuf> {
        match &self.lut {
            LutSource::ById => Some(dir.join(format!("{}.cube", self.id))),
            LutSource::File(file) => Some(dir.join(file)),
            LutSource::None => None,
        }
    }
}

/// The built-in simulation definitions, in display order.
pub fn builtin_definitions() -> Vec<SimulationDef> {
    [
        ("provia", "PROVIA / STANDARD", "Balanced neutral everyday", 1990, 32),
        ("velvia", "Velvia / VIVID", "Punchy saturated landscape", 1991, 32),
        ("astia", "ASTIA / SOFT", "Soft gentle skin-tones", 2000, 64),
        ("classic-chrome", "CLASSIC CHROME", "Muted documentary contrast", 2014, 32),
        ("pro-neg-hi", "PRO Neg. Hi", "Crisp contrast portrait", 2012, 32),
        ("pro-neg-std", "PRO Neg. Std", "Soft neutral portrait", 2012, 32),
        ("classic-neg", "CLASSIC Neg.", "Retro punchy consumer-film", 2019, 32),
        ("nostalgic-neg", "NOSTALGIC Neg.", "Warm vintage cinema", 2022, 32),
        ("eterna", "ETERNA / CINEMA", "Flat cinematic soft", 2017, 32),
        ("eterna-bleach-bypass", "ETERNA Bleach Bypass", "Desaturated high contrast", 2020, 32),
        ("reala-ace", "REALA ACE", "Neutral faithful punch", 2024, 32),
        ("acros", "ACROS", "Clean refined monochrome", 1964, 33),
        ("acros-ye", "ACROS + Ye Filter", "Slightly lighter skies", 1964, 33),
        ("acros-r", "ACROS + R Filter", "Dramatic dark skies", 1964, 33),
        ("acros-g", "ACROS + G Filter", "Better skin balance", 1964, 33),
        ("monochrome", "MONOCHROME", "Plain neutral black-white", 1930, 33),
        ("monochrome-ye", "MONOCHROME + Ye Filter", "Mild contrast boost", 1930, 33),
        ("monochrome-r", "MONOCHROME + R Filter", "Hard dark sky look", 1930, 33),
        ("monochrome-g", "MONOCHROME + G Filter", "Smooth skin contrast", 1930, 33),
        ("sepia", "SEPIA", "Warm brown vintage", 1880, 33),
    ]
    .into_iter()
    .map(|(id, name, desc, year, size)| SimulationDef::builtin(id, name, desc, year, size))
    .collect()
}

#[derive(Debug, Default, Deserialize)]
struct Manifest {
    #[serde(default)]
    simulations: Vec<SimulationDef>,
}

/// A loaded simulation. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub def: SimulationDef,
    pub lut: Option<Lut3D>,
}

impl Simulation {
    pub fn id(&self) -> &str {
        &self.def.id
    }

    /// `base` with this simulation's overrides merged in.
    pub fn params(&self, base: &AdjustmentParams) -> AdjustmentParams {
        self.def.overrides.apply_to(base)
    }
}

/// A definition that could not be loaded, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSimulation {
    pub id: String,
    pub reason: String,
}

/// Every simulation that loaded, plus the ones that were skipped.
#[derive(Debug, Clone, Default)]
pub struct SimulationCatalog {
    simulations: Vec<Simulation>,
    skipped: Vec<SkippedSimulation>,
}

impl SimulationCatalog {
    /// Load the built-in definitions merged with `dir/simulations.json`.
    ///
    /// A missing manifest is not an error. A manifest that exists but cannot
    /// be read or parsed is.
    pub fn load(dir: &Path, lut_tolerance: f32) -> Result<Self, CatalogError> {
        let defs = merge_definitions(builtin_definitions(), read_manifest(dir)?);
        Ok(Self::from_definitions(defs, dir, lut_tolerance))
    }

    /// Load `defs`, resolving LUT paths against `dir`.
    pub fn from_definitions(defs: Vec<SimulationDef>, dir: &Path, lut_tolerance: f32) -> Self {
        let mut catalog = Self::default();
        for def in defs {
            match load_lut(&def, dir, lut_tolerance) {
                Ok(lut) => catalog.simulations.push(Simulation { def, lut }),
                Err(reason) => {
                    tracing::warn!(id = %def.id, %reason, "skipping simulation");
                    catalog.skipped.push(SkippedSimulation { id: def.id, reason });
                }
            }
        }
        tracing::info!(
            dir = %dir.display(),
            loaded = catalog.simulations.len(),
            skipped = catalog.skipped.len(),
            "simulation catalog loaded"
        );
        catalog
    }

    pub fn get(&self, id: &str) -> Option<&Simulation> {
        self.simulations.iter().find(|s| s.def.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Simulation> {
        self.simulations.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.simulations.iter().map(Simulation::id)
    }

    pub fn skipped(&self) -> &[SkippedSimulation] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }
}

fn read_manifest(dir: &Path) -> Result<Vec<SimulationDef>, CatalogError> {
    let path = dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(&path)?;
    let manifest: Manifest = serde_json::from_str(&text)?;
    tracing::debug!(
        path = %path.display(),
        entries = manifest.simulations.len(),
        "read simulation manifest"
    );
    Ok(manifest.simulations)
}

/// Manifest entries replace built-ins with the same id; new ids are appended.
fn merge_definitions(
    mut defs: Vec<SimulationDef>,
    extra: Vec<SimulationDef>,
) -> Vec<SimulationDef> {
    for def in extra {
        match defs.iter_mut().find(|d| d.id == def.id) {
            Some(existing) => *existing = def,
            None => defs.push(def),
        }
    }
    defs
}

fn load_lut(def: &SimulationDef, dir: &Path, tolerance: f32) -> Result<Option<Lut3D>, String> {
    let Some(path) = def.lut_path(dir) else {
        return Ok(None);
    };
    let lut = Lut3D::load_cube(&path).map_err(|e| format!("{}: {e}", path.display()))?;
    if lut.is_identity(tolerance) {
        return Err(format!("{} is an identity LUT", path.display()));
    }
    if lut.size != def.lut_size {
        tracing::debug!(
            id = %def.id,
            nominal = def.lut_size,
            actual = lut.size,
            "LUT size differs from definition"
        );
    }
    Ok(Some(lut))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::lut::IDENTITY_TOLERANCE;

    fn warm_lut(size: usize) -> Lut3D {
        let mut lut = Lut3D::identity(size);
        for v in lut.data.iter_mut() {
            v[0] = (v[0] * 1.1).min(1.0);
            v[2] *= 0.9;
        }
        lut
    }

    #[test]
    fn test_builtins_are_unique_and_complete() {
        let defs = builtin_definitions();
        assert_eq!(defs.len(), 20);
        let mut ids: Vec<_> = defs.iter().map(|d| d.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 20);
        let astia = defs.iter().find(|d| d.id == "astia").unwrap();
        assert_eq!(astia.lut_size, 64);
    }

    #[test]
    fn test_missing_luts_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        warm_lut(4).save_cube(&dir.path().join("velvia.cube"), "Velvia").unwrap();
        let catalog = SimulationCatalog::load(dir.path(), IDENTITY_TOLERANCE).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.skipped().len(), 19);
        let velvia = catalog.get("velvia").unwrap();
        assert_eq!(velvia.lut.as_ref().map(|l| l.size), Some(4));
    }

    #[test]
    fn test_identity_and_malformed_luts_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        Lut3D::identity(4).save_cube(&dir.path().join("provia.cube"), "id").unwrap();
        std::fs::write(dir.path().join("eterna.cube"), "LUT_3D_SIZE 2\n0 0 0\n").unwrap();
        warm_lut(3).save_cube(&dir.path().join("sepia.cube"), "Sepia").unwrap();

        let catalog = SimulationCatalog::load(dir.path(), IDENTITY_TOLERANCE).unwrap();
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["sepia"]);
        let skipped: Vec<_> = catalog.skipped().iter().map(|s| s.id.as_str()).collect();
        assert!(skipped.contains(&"provia"));
        assert!(skipped.contains(&"eterna"));
    }

    #[test]
    fn test_manifest_adds_and_replaces_definitions() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = r#"{
            "simulations": [
                {
                    "id": "provia",
                    "name": "Provia Custom",
                    "description": "Replaced",
                    "year": 1990,
                    "lutSize": 4,
                    "lut": {"file": "luts/custom.cube"}
                },
                {
                    "id": "bright",
                    "name": "Bright",
                    "description": "Overrides only",
                    "year": 2024,
                    "lutSize": 0,
                    "lut": "none",
                    "overrides": {"exposure": 0.5}
                }
            ]
        }"#;
        std::fs::write(dir.path().join(MANIFEST_FILE), manifest).unwrap();
        std::fs::create_dir(dir.path().join("luts")).unwrap();
        warm_lut(4).save_cube(&dir.path().join("luts/custom.cube"), "Custom").unwrap();

        let catalog = SimulationCatalog::load(dir.path(), IDENTITY_TOLERANCE).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("provia").unwrap().def.name, "Provia Custom");

        let bright = catalog.get("bright").unwrap();
        assert!(bright.lut.is_none());
        let params = bright.params(&AdjustmentParams::default());
        assert_eq!(params.exposure, 0.5);
    }

    #[test]
    fn test_invalid_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), "[not json").unwrap();
        assert!(matches!(
            SimulationCatalog::load(dir.path(), IDENTITY_TOLERANCE),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn test_builtin_overrides_reset_basics() {
        let def = &builtin_definitions()[0];
        let sim = Simulation {
            def: def.clone(),
            lut: None,
        };
        let base = AdjustmentParams {
            exposure: 1.5,
            shadows: 20.0,
            ..AdjustmentParams::default()
        };
        let params = sim.params(&base);
        assert_eq!(params.exposure, 0.0);
        assert_eq!(params.shadows, 20.0);
    }
}
