use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use assert_approx_eq::assert_approx_eq;
use siqrd::distributions::{Distribution, GENERATION_TIME_FILE, INCUBATION_PERIOD_FILE};
use siqrd::prelude::*;
use siqrd::time_evolution::Column;
use siqrd_kernel_stub::NT;

const LIBRARY_NAME: &str = "siqrd_kernel_stub";

/// Finds the shared library cargo built next to this test binary.
fn kernel_library() -> PathBuf {
    let file_name = format!("{}{LIBRARY_NAME}{}", env::consts::DLL_PREFIX, env::consts::DLL_SUFFIX);
    let exe = env::current_exe().unwrap();
    let deps = exe.parent().unwrap();
    [deps, deps.parent().unwrap()]
        .iter()
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| panic!("{file_name} was not built next to {}", exe.display()))
}

fn uniform(len: usize) -> String {
    let mut contents = String::from("# uniform\n0.0\n");
    contents.push_str(&format!("{}\n", 1.0 / (len - 1) as f64).repeat(len - 1));
    contents
}

fn write_data(dir: &Path) {
    let data_dir = dir.join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join(GENERATION_TIME_FILE), uniform(NT + 1)).unwrap();
    fs::write(data_dir.join(INCUBATION_PERIOD_FILE), uniform(NT + 1)).unwrap();
}

// The kernel writes to a path relative to the working directory, so this is the only test in
// this binary that changes it.
#[test]
fn full_pipeline_through_the_shared_library() {
    let dir = tempfile::tempdir().unwrap();
    write_data(dir.path());
    env::set_current_dir(dir.path()).unwrap();

    let config = PipelineConfig {
        library_path: kernel_library(),
        ..PipelineConfig::default()
    };
    let outcome = run_pipeline(&config).unwrap();
    assert_eq!(outcome.table_rows, NT + 1);
    assert!(dir.path().join("results/simulation_plot.png").is_file());

    let table = read_simulation_data(&dir.path().join("results/time_evolution.dat")).unwrap();
    for (t, row) in table.rows().iter().enumerate() {
        assert_eq!(row.t, t as f64);
        assert_approx_eq!(row.s + row.i + row.q + row.r + row.d, 1.0, 1e-6);
    }
    let susceptible = table.column(Column::S);
    assert!(susceptible.windows(2).all(|pair| pair[1] <= pair[0]));
}

#[test]
fn kernel_refuses_buffers_of_the_wrong_length() {
    let kernel = NativeKernel::init(&kernel_library(), "simulate_and_write", NT).unwrap();
    let short = Distribution::new(vec![0.0; NT]);
    let full = Distribution::new(vec![0.0; NT + 1]);

    let result = kernel.run(&short, &full);
    assert!(matches!(
        result,
        Err(PipelineError::BufferLength {
            expected: 21,
            found: 20
        })
    ));
}

#[test]
fn unknown_entry_point_is_a_binding_error() {
    let result = NativeKernel::init(&kernel_library(), "simulate_and_plot", NT);
    assert!(matches!(result, Err(PipelineError::NativeBinding(_))));
}
