use wallheat::material::MaterialData;
use wallheat::prelude::*;
use wallheat::table::Table1D;

// hot-gas side with tabulated exchange, adiabatic outer skin
const CASE: &str = r#"{
    "name": "nozzle wall",
    "symmetry": "cylindrical",
    "layers": [
        {"material": "carbon-phenolic", "thickness": 0.008, "subdivisions": 40, "angle": 30},
        {"material": "glass-phenolic", "thickness": 0.004, "subdivisions": 20},
        {"material": "steel", "thickness": 0.003, "subdivisions": 10}
    ],
    "initial radius": 0.06,
    "initial temp": 293.0,
    "solver": {
        "solve time": 30.0,
        "solve time step": 0.01,
        "output time step": 5.0,
        "output times": [0.5, 1.0, 2.5]
    },
    "boundary left": {
        "mode": "table",
        "alpha": [[293, 3000], [4300, 3900]],
        "te": [[0], [3350]],
        "trad": [[0], [3150]],
        "eps": [[0], [0.57]],
        "q": [[0], [0]]
    },
    "boundary right": {
        "mode": "table",
        "alpha": [[0], [5]],
        "te": [[0], [293]],
        "trad": [[0], [293]],
        "eps": [[0], [0.8]],
        "q": [[0], [0]]
    }
}"#;

fn demo_database() -> Database {
    let mut db = Database::new();
    db.insert_material(
        "carbon-phenolic",
        MaterialData {
            density: Table1D::from_columns(vec![293.0, 800.0, 3000.0], vec![1450.0, 1350.0, 1250.0]).unwrap(),
            conductivity_0: Table1D::from_columns(
                vec![273.0, 600.0, 1000.0, 1500.0, 2100.0, 3000.0],
                vec![0.55, 0.5, 0.3, 0.8, 5.1, 12.5],
            )
            .unwrap(),
            conductivity_90: Table1D::from_columns(vec![273.0, 1000.0, 3000.0], vec![0.4, 0.25, 8.0]).unwrap(),
            specific_heat: Table1D::from_columns(
                vec![273.0, 400.0, 800.0, 1500.0, 3000.0],
                vec![629.0, 1045.0, 1500.0, 1590.0, 1840.0],
            )
            .unwrap(),
            ..MaterialData::constant("carbon-phenolic", 1450.0, 0.5, 1000.0)
        },
    );
    db.insert_material(
        "glass-phenolic",
        MaterialData::constant("glass-phenolic", 1700.0, 0.35, 1100.0),
    );
    db.insert_material("steel", MaterialData::constant("steel", 7850.0, 25.0, 480.0));
    db
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // optionally load a case and a database directory from the command line
    let args: Vec<String> = std::env::args().collect();
    let (case, db) = match (args.get(1), args.get(2)) {
        (Some(case), Some(root)) => (CaseConfig::from_file(case)?, Database::open(root)?),
        _ => (CaseConfig::from_json(CASE)?, demo_database()),
    };

    let mut simulation = case.build(&db)?;

    println!(
        "\n-- General Simulation Info --\n\
        case:         {}\n\
        # of nodes:   {}\n\
        Δt:           {:<9.2e} s\n\
        solve time:   {} s\n",
        case.name,
        simulation.positions().len(),
        simulation.params().delta_t,
        simulation.params().solve_time,
    );

    println!("-- Run Part 1 --");
    // ignition transient
    let mut snapshots = simulation.run(RunDescriptor {
        time_duration: 3.0,
        verbose: true,
    })?;

    println!("-- Run Part 2 --");
    snapshots.extend(simulation.run_to_end(true)?);

    println!("\n{:>8}  {:>10}  interfaces [K]", "t [s]", "T_wall [K]");
    for snap in &snapshots {
        let interfaces: Vec<String> = snap
            .interface_temperatures
            .iter()
            .map(|t| format!("{:.1}", t))
            .collect();
        println!("{:>8.2}  {:>10.1}  {}", snap.time, snap.temperatures[0], interfaces.join(", "));
    }

    #[cfg(feature = "hdf5")]
    save_snapshots(
        &SaveSettings {
            filename: "data/nozzle_wall.h5",
            save_type: SaveType::Full,
            overwrite: true,
        },
        &snapshots,
    )?;

    Ok(())
}
