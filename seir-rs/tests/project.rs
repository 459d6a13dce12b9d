use std::{env, fs, path::PathBuf, process::Command};

fn temp_path(name: &str) -> PathBuf {
    env::temp_dir().join(format!("seir-{}-{}", std::process::id(), name))
}

/// Write the sample configuration with its output redirected to a temporary
/// file. Top-level keys in overrides replace the sample ones.
fn write_config(name: &str, output: &PathBuf, overrides: &[(&str, &str)]) -> PathBuf {
    let sample = fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/conf.toml")).unwrap();
    let mut src = format!("output = {:?}\n", output.to_str().unwrap());
    for (key, value) in overrides {
        src.push_str(&format!("{} = {}\n", key, value));
    }
    let replaced = |line: &str| {
        line.starts_with("output =") || overrides.iter().any(|(key, _)| line.starts_with(&format!("{} =", key)))
    };
    for line in sample.lines().filter(|l| !replaced(l)) {
        src.push_str(line);
        src.push('\n');
    }
    let path = temp_path(name);
    fs::write(&path, src).unwrap();
    path
}

#[test]
fn sample_config_writes_projection_csv() {
    let output = temp_path("projection.csv");
    let config = write_config("conf.toml", &output, &[]);
    let status = Command::new(env!("CARGO_BIN_EXE_project"))
        .arg(&config)
        .status()
        .unwrap();
    assert!(status.success());

    let mut reader = csv::Reader::from_path(&output).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["date", "infections", "hospitalizations", "deaths", "mean_r_t"]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    // 2020-06-01 to 2020-11-01
    assert_eq!(rows.len(), 154);
    assert_eq!(&rows[0][0], "2020-06-01");
    assert_eq!(&rows[153][0], "2020-11-01");
    assert!(rows.iter().all(|r| r[3].parse::<f64>().unwrap() >= 0.0));

    fs::remove_file(config).ok();
    fs::remove_file(output).ok();
}

#[test]
fn invalid_config_fails() {
    let output = temp_path("invalid.csv");
    let config = write_config("invalid.toml", &output, &[("population", "0")]);
    let status = Command::new(env!("CARGO_BIN_EXE_project"))
        .arg(&config)
        .status()
        .unwrap();
    assert!(!status.success());
    assert!(!output.exists());
    fs::remove_file(config).ok();
}
