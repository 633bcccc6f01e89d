//! Material and fuel property catalog.
//!
//! On disk a catalog is a directory holding `materials/<name>.json` and
//! `fuels/<name>.json`. Entries are looked up by file stem.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::Deserialize;

use crate::gas::{Gas, GasProperties, GasProperty};
use crate::material::{Material, MaterialData};
use crate::table::{Curve, Table1D, Table2D};
use crate::Error;

#[derive(Deserialize, Debug)]
pub struct JsonMaterial {
    #[serde(default)]
    pub name: Option<String>,
    pub ro: Curve,
    pub lambda_0: Curve,
    pub lambda_90: Curve,
    pub cp: Curve,
    // non-ablating materials may leave these out
    pub ko: Option<Curve>,
    pub ea: Option<Curve>,
}

impl JsonMaterial {
    pub fn into_data(self, fallback_name: &str) -> Result<MaterialData, Error> {
        let optional = |curve: &Option<Curve>, field: &str| match curve {
            Some(c) => c.to_table(field),
            None => Ok(Table1D::constant(0.0)),
        };
        Ok(MaterialData {
            name: self.name.clone().unwrap_or_else(|| fallback_name.to_string()),
            density: self.ro.to_table("ro")?,
            conductivity_0: self.lambda_0.to_table("lambda_0")?,
            conductivity_90: self.lambda_90.to_table("lambda_90")?,
            specific_heat: self.cp.to_table("cp")?,
            pre_exponential: optional(&self.ko, "ko")?,
            activation_energy: optional(&self.ea, "ea")?,
        })
    }
}

#[derive(Deserialize, Debug)]
pub struct JsonFuel {
    #[serde(rename = "Total temperature")]
    pub total_temperature: Curve,
    /// Records keyed by column number: "0" is pressure, "1" temperature and
    /// the rest follow [`GasProperty`] order.
    #[serde(rename = "Properties")]
    pub properties: Vec<HashMap<String, f64>>,
}

impl JsonFuel {
    pub fn into_gas(self, name: &str) -> Result<Gas, Error> {
        let column = |record: &HashMap<String, f64>, key: usize, what: &str| {
            record.get(&key.to_string()).copied().ok_or_else(|| Error::MissingData {
                kind: "fuel property",
                name: format!("{} (column {}) of `{}`", what, key, name),
            })
        };

        let mut rows: Vec<(f64, Vec<(f64, GasProperties)>)> = Vec::new();
        for record in &self.properties {
            let p = column(record, 0, "p")?;
            let t = column(record, 1, "T")?;
            let mut props = GasProperties::from_fn(|_| 0.0);
            for prop in GasProperty::ALL {
                props.set(prop, column(record, prop.file_key(), prop.name())?);
            }
            match rows.iter_mut().find(|(key, _)| *key == p) {
                Some((_, row)) => row.push((t, props)),
                None => rows.push((p, vec![(t, props)])),
            }
        }

        let rows = rows
            .into_iter()
            .map(|(p, row)| Ok((p, Table1D::new(row)?)))
            .collect::<Result<Vec<_>, Error>>()?;
        let properties = Table2D::new(rows).map_err(|err| match err {
            Error::MalformedInput { reason, .. } => Error::malformed("Properties", reason),
            other => other,
        })?;
        let total_temperature = self.total_temperature.to_table("Total temperature")?;

        Ok(Gas::new(name, total_temperature, properties))
    }
}

/// Materials and fuels by name.
#[derive(Debug, Clone, Default)]
pub struct Database {
    materials: HashMap<String, MaterialData>,
    fuels: HashMap<String, Rc<Gas>>,
}

fn json_entries(dir: &Path) -> Result<Vec<(String, String)>, Error> {
    let mut entries = Vec::new();
    if !dir.is_dir() {
        return Ok(entries);
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(false, |ext| ext == "json") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                entries.push((stem.to_string(), fs::read_to_string(&path)?));
            }
        }
    }
    Ok(entries)
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every entry under `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, Error> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::MissingData {
                kind: "database",
                name: root.display().to_string(),
            });
        }
        let mut db = Self::new();
        for (name, text) in json_entries(&root.join("materials"))? {
            let data = serde_json::from_str::<JsonMaterial>(&text)?.into_data(&name)?;
            db.materials.insert(name, data);
        }
        for (name, text) in json_entries(&root.join("fuels"))? {
            let gas = serde_json::from_str::<JsonFuel>(&text)?.into_gas(&name)?;
            db.fuels.insert(name, Rc::new(gas));
        }
        log::info!(
            "database {}: {} materials, {} fuels",
            root.display(),
            db.materials.len(),
            db.fuels.len()
        );
        Ok(db)
    }

    pub fn insert_material(&mut self, key: impl Into<String>, data: MaterialData) {
        self.materials.insert(key.into(), data);
    }

    pub fn insert_fuel(&mut self, key: impl Into<String>, gas: Gas) {
        self.fuels.insert(key.into(), Rc::new(gas));
    }

    pub fn material_data(&self, name: &str) -> Result<&MaterialData, Error> {
        self.materials.get(name).ok_or_else(|| Error::MissingData {
            kind: "material",
            name: name.to_string(),
        })
    }

    /// The material laid at `angle` degrees.
    pub fn material(&self, name: &str, angle: f64) -> Result<Material, Error> {
        Material::new(self.material_data(name)?, angle)
    }

    pub fn fuel(&self, name: &str) -> Result<Rc<Gas>, Error> {
        self.fuels.get(name).cloned().ok_or_else(|| Error::MissingData {
            kind: "fuel",
            name: name.to_string(),
        })
    }
}
