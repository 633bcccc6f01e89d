//! Snapshot persistence in HDF5 files.

use std::path::Path;

use crate::{Error, ResultSnapshot};

/// How data should be saved to file.
#[derive(Debug)]
pub struct SaveSettings<P: AsRef<Path>> {
    /// The path to the save file.
    pub filename: P,
    /// What information to save.
    pub save_type: SaveType,
    /// Whether or not to overwrite any possible saved data.
    pub overwrite: bool,
}

/// Represents what data to save.
#[derive(PartialEq, Debug)]
pub enum SaveType {
    /// Save the temperature of every node.
    Full,
    /// Save the temperatures at layer interfaces only.
    Interfaces,
}

fn rows<F>(snapshots: &[ResultSnapshot], width: usize, f: F) -> ndarray::Array2<f64>
where
    F: Fn(&ResultSnapshot, usize) -> f64,
{
    ndarray::Array2::from_shape_fn((snapshots.len(), width), |(i, j)| f(&snapshots[i], j))
}

/// Writes `snapshots` to file, appending to previously saved snapshots unless
/// `overwrite` is set.
pub fn save_snapshots<P: AsRef<Path>>(
    settings: &SaveSettings<P>,
    snapshots: &[ResultSnapshot],
) -> Result<(), Error> {
    let first = match snapshots.first() {
        Some(first) => first,
        None => return Ok(()),
    };
    let nsnaps = snapshots.len();
    let npoints = first.positions.len();
    let ninterfaces = first.interface_temperatures.len();
    let filename = settings.filename.as_ref();
    let mut offset = 0;

    let file = if filename.exists() && !settings.overwrite {
        let file = hdf5::File::append(filename)?;
        offset = file.dataset("time")?.shape()[0];

        // resize datasets
        file.dataset("time")?.resize(offset + nsnaps)?;
        file.dataset("interfaces/temperatures")?.resize((offset + nsnaps, ninterfaces))?;
        if settings.save_type == SaveType::Full {
            if let Ok(full_group) = file.group("full") {
                full_group.dataset("temperatures")?.resize((offset + nsnaps, npoints))?;
            } else {
                // full data starts at this run
                let full_group = file.create_group("full")?;
                full_group
                    .new_dataset::<f64>()
                    .shape((hdf5::Extent::resizable(offset + nsnaps), npoints))
                    .create("temperatures")?;
            }
        }
        file
    } else {
        let file = hdf5::File::create(filename)?;
        file.new_dataset::<f64>()
            .shape(hdf5::Extent::resizable(nsnaps))
            .create("time")?;
        file.new_dataset::<f64>()
            .shape(npoints)
            .create("positions")?
            .write(first.positions.view())?;
        let interface_group = file.create_group("interfaces")?;
        interface_group
            .new_dataset::<f64>()
            .shape((hdf5::Extent::resizable(nsnaps), ninterfaces))
            .create("temperatures")?;
        if settings.save_type == SaveType::Full {
            let full_group = file.create_group("full")?;
            full_group
                .new_dataset::<f64>()
                .shape((hdf5::Extent::resizable(nsnaps), npoints))
                .create("temperatures")?;
        }
        file
    };

    let times: ndarray::Array1<f64> = snapshots.iter().map(|s| s.time).collect();
    file.dataset("time")?
        .write_slice(times.view(), ndarray::s![offset..(offset + nsnaps)])?;
    file.dataset("interfaces/temperatures")?.write_slice(
        rows(snapshots, ninterfaces, |s, j| s.interface_temperatures[j]).view(),
        ndarray::s![offset..(offset + nsnaps), ..],
    )?;
    if settings.save_type == SaveType::Full {
        file.dataset("full/temperatures")?.write_slice(
            rows(snapshots, npoints, |s, j| s.temperatures[j]).view(),
            ndarray::s![offset..(offset + nsnaps), ..],
        )?;
    }

    file.close()?;
    log::info!("saved {} snapshots to {}", nsnaps, filename.display());
    Ok(())
}
