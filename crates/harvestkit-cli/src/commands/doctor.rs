use anyhow::Result;
use std::path::Path;
use std::process::Command;
use which::which;

use harvestkit_core::config::Config;

/// Python modules the release pipeline shells out to
const PYTHON_MODULES: &[(&str, &str)] = &[
    ("build", "pip install build"),
    ("twine", "pip install twine"),
    ("pytest", "pip install pytest"),
    ("black", "pip install black"),
    ("flake8", "pip install flake8"),
    ("mypy", "pip install mypy"),
    ("bandit", "pip install bandit"),
];

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("harvestkit dependency check\n");

    let mut all_ok = true;

    // Check Python
    print!("python3:       ");
    let python = match config.python_path() {
        Ok(path) => {
            let version = Command::new(&path).arg("--version").output();
            match version {
                Ok(out) => {
                    let v = String::from_utf8_lossy(&out.stdout);
                    println!("OK ({})", v.trim().replace("Python ", ""));
                }
                Err(_) => {
                    println!("FOUND but failed to get version");
                    all_ok = false;
                }
            }
            Some(path)
        }
        Err(_) => {
            println!("NOT FOUND");
            println!("           Install python 3.8 or newer");
            all_ok = false;
            None
        }
    };

    // Check git
    print!("git:           ");
    match which("git") {
        Ok(path) => {
            let version = Command::new(&path).arg("--version").output();
            match version {
                Ok(out) => {
                    let first_line = String::from_utf8_lossy(&out.stdout)
                        .lines()
                        .next()
                        .unwrap_or("")
                        .to_string();
                    let version_part = first_line.split_whitespace().nth(2).unwrap_or("unknown");
                    println!("OK ({})", version_part);
                }
                Err(_) => {
                    println!("FOUND but failed to get version");
                    all_ok = false;
                }
            }
        }
        Err(_) => {
            println!("NOT FOUND");
            all_ok = false;
        }
    }

    // Check the Python-side toolchain
    if let Some(python) = python {
        for (module, hint) in PYTHON_MODULES {
            print!("  {:<12} ", format!("{}:", module));
            let probe = format!("import {}", module.replace('-', "_"));
            let check = Command::new(&python).args(["-c", probe.as_str()]).output();
            match check {
                Ok(out) if out.status.success() => println!("OK"),
                _ => {
                    println!("NOT INSTALLED");
                    println!("               Run: {}", hint);
                    all_ok = false;
                }
            }
        }
    }

    println!();
    if all_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}
