//! Boundary to an external 3D structure viewer.
//!
//! The viewer itself is opaque: a [`StructureRenderer`] turns a
//! [`StructureSource`] into a handle and lists the residues it found. The
//! [`StructureLoader`] tracks whether a structure is loaded, keeps the
//! residue index maps and reports load outcomes as events. Failed loads are
//! reported once and never retried.

use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureFormat {
    Mmcif,
    Pdb,
}

impl StructureFormat {
    /// File extension used when local bytes need a file name.
    pub fn extension(self) -> &'static str {
        match self {
            StructureFormat::Mmcif => "cif",
            StructureFormat::Pdb => "ent",
        }
    }
}

/// Where structure data comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StructureSource {
    Remote {
        link: String,
        label: String,
        #[serde(default)]
        binary: bool,
        format: StructureFormat,
    },
    Local {
        data: Vec<u8>,
        label: String,
        #[serde(default)]
        binary: bool,
        format: StructureFormat,
    },
}

impl StructureSource {
    pub fn label(&self) -> &str {
        match self {
            StructureSource::Remote { label, .. } | StructureSource::Local { label, .. } => label,
        }
    }

    pub fn format(&self) -> StructureFormat {
        match self {
            StructureSource::Remote { format, .. } | StructureSource::Local { format, .. } => *format,
        }
    }

    /// `label.ext` for local data.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.label(), self.format().extension())
    }
}

/// One residue as reported by the structure viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueId {
    pub chain: String,
    pub seq_id: i32,
    pub ins_code: String,
}

impl ResidueId {
    pub fn new<C: Into<String>, I: Into<String>>(chain: C, seq_id: i32, ins_code: I) -> Self {
        Self { chain: chain.into(), seq_id, ins_code: ins_code.into() }
    }

    /// Chain, sequence number and insertion code concatenated.
    pub fn identifier(&self) -> String {
        format!("{}{}{}", self.chain, self.seq_id, self.ins_code).trim().to_string()
    }
}

/// Residue identifier to index maps plus per-chain index ranges
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResidueMaps {
    pub r2i: HashMap<String, usize>,
    pub i2r: HashMap<usize, String>,
    pub c2i: HashMap<String, (usize, usize)>,
}

impl ResidueMaps {
    pub fn from_residues(residues: &[ResidueId]) -> Self {
        let mut maps = ResidueMaps::default();
        for (index, residue) in residues.iter().enumerate() {
            let identifier = residue.identifier();
            maps.r2i.insert(identifier.clone(), index);
            maps.i2r.insert(index, identifier);
            let start = maps.c2i.get(&residue.chain).map(|(s, _)| *s).unwrap_or(index);
            maps.c2i.insert(residue.chain.clone(), (start, index));
        }
        maps
    }

    pub fn len(&self) -> usize {
        self.i2r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.i2r.is_empty()
    }
}

pub trait StructureRenderer {
    type Handle;

    /// Drop whatever is currently displayed.
    fn clear(&mut self);

    fn load(&mut self, source: &StructureSource) -> Result<Self::Handle>;

    /// Residues of a loaded structure in display order.
    fn residues(&self, handle: &Self::Handle) -> Vec<ResidueId>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum StructureEvent {
    Loaded { residues: usize },
    LoadFailed { message: String },
}

pub struct StructureLoader<R: StructureRenderer> {
    renderer: R,
    source: Option<StructureSource>,
    handle: Option<R::Handle>,
    maps: ResidueMaps,
    loaded: bool,
}

impl<R: StructureRenderer> StructureLoader<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            source: None,
            handle: None,
            maps: ResidueMaps::default(),
            loaded: false,
        }
    }

    /// Replace the source and load it.
    ///
    /// The loaded flag drops as soon as the source changes. `None` clears the
    /// viewer and produces no event.
    pub fn set_source(&mut self, source: Option<StructureSource>) -> Option<StructureEvent> {
        self.loaded = false;
        self.handle = None;
        self.maps = ResidueMaps::default();
        self.renderer.clear();
        self.source = source;

        let source = self.source.as_ref()?;
        match self.renderer.load(source) {
            Ok(handle) => {
                let residues = self.renderer.residues(&handle);
                self.maps = ResidueMaps::from_residues(&residues);
                self.handle = Some(handle);
                self.loaded = true;
                log::debug!("Loaded structure {} with {} residues", source.label(), residues.len());
                Some(StructureEvent::Loaded { residues: residues.len() })
            }
            Err(err) => {
                log::warn!("Failed to load structure {}: {:#}", source.label(), err);
                Some(StructureEvent::LoadFailed { message: err.to_string() })
            }
        }
    }

    pub fn source(&self) -> Option<&StructureSource> {
        self.source.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn handle(&self) -> Option<&R::Handle> {
        self.handle.as_ref()
    }

    pub fn maps(&self) -> &ResidueMaps {
        &self.maps
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
