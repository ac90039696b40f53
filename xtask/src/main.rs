// locale-router - Build Task Runner
// cargo xtask pattern over the workspace

use anyhow::{Context, Result};
use xshell::{cmd, Shell};

fn main() -> Result<()> {
    let sh = Shell::new()?;
    let args: Vec<_> = std::env::args().skip(1).collect();

    match args.first().map(|s| s.as_str()) {
        Some("build") => {
            let release = args.contains(&"--release".to_string());
            build(&sh, release)
        }
        Some("test") => test(&sh),
        Some("format") => {
            let check = args.contains(&"--check".to_string());
            format(&sh, check)
        }
        Some("clippy") => clippy(&sh),
        Some("run") => run(&sh, &args[1..]),
        Some("clean") => clean(&sh),
        Some("coverage") => coverage(&sh),
        Some("ci") => ci(&sh),
        _ => {
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("locale-router - Build Commands:");
    println!();
    println!("Usage: cargo xtask <COMMAND> [OPTIONS]");
    println!();
    println!("Commands:");
    println!("  build [--release]   Build the workspace");
    println!("  test                Run all tests");
    println!("  format [--check]    Format code (check mode doesn't modify)");
    println!("  clippy              Run clippy checks");
    println!("  run [ARGS...]       Run the demo server (e.g. run -- --port 3000)");
    println!("  clean               Clean build artifacts");
    println!("  coverage            Generate test coverage report");
    println!("  ci                  Run all CI checks (format + clippy + build + test)");
}

/// Build the middleware crate and demo server
fn build(sh: &Shell, release: bool) -> Result<()> {
    let _dir = sh.push_dir(project_root());

    if release {
        cmd!(sh, "cargo build --workspace --release")
            .run()
            .context("Failed to build in release mode")?;
    } else {
        cmd!(sh, "cargo build --workspace")
            .run()
            .context("Failed to build")?;
    }

    Ok(())
}

/// Run all tests
fn test(sh: &Shell) -> Result<()> {
    let _dir = sh.push_dir(project_root());

    cmd!(sh, "cargo test --workspace")
        .run()
        .context("Tests failed")?;

    Ok(())
}

/// Format code
fn format(sh: &Shell, check: bool) -> Result<()> {
    let _dir = sh.push_dir(project_root());

    if check {
        cmd!(sh, "cargo fmt --all -- --check")
            .run()
            .context("Rust code is not formatted")?;
    } else {
        cmd!(sh, "cargo fmt --all")
            .run()
            .context("Failed to format Rust code")?;
    }

    Ok(())
}

/// Run clippy checks
fn clippy(sh: &Shell) -> Result<()> {
    let _dir = sh.push_dir(project_root());

    cmd!(sh, "cargo clippy --workspace --all-targets -- --deny warnings --allow clippy::uninlined-format-args")
        .run()
        .context("Clippy checks failed")?;

    Ok(())
}

/// Run the demo server from the project root so conf/config.toml is found
fn run(sh: &Shell, args: &[String]) -> Result<()> {
    let _dir = sh.push_dir(project_root());

    let mut cmd = cmd!(sh, "cargo run -p locale-router --");
    for arg in args {
        cmd = cmd.arg(arg);
    }

    cmd.run().context("Failed to run application")?;

    Ok(())
}

/// Clean build artifacts
fn clean(sh: &Shell) -> Result<()> {
    let project = project_root();
    let _dir = sh.push_dir(&project);

    cmd!(sh, "cargo clean").run()?;

    let logs = project.join("logs");
    if logs.exists() {
        cmd!(sh, "rm -rf {logs}").run()?;
    }

    Ok(())
}

/// Run all CI checks (format + clippy + build + test)
fn ci(sh: &Shell) -> Result<()> {
    println!("[1/4] Checking code format...");
    format(sh, true)?;

    println!("[2/4] Running clippy checks...");
    clippy(sh)?;

    println!("[3/4] Building project...");
    build(sh, true)?;

    println!("[4/4] Running tests...");
    test(sh)?;

    println!("CI pipeline completed successfully");

    Ok(())
}

/// Generate test coverage report
fn coverage(sh: &Shell) -> Result<()> {
    let _dir = sh.push_dir(project_root());

    if cmd!(sh, "cargo tarpaulin --version").quiet().ignore_stdout().run().is_err() {
        println!("cargo-tarpaulin not found. Installing...");
        cmd!(sh, "cargo install cargo-tarpaulin")
            .run()
            .context("Failed to install cargo-tarpaulin")?;
    }

    cmd!(sh, "cargo tarpaulin --workspace --out Html --out Xml --output-dir build/coverage")
        .run()
        .context("Failed to generate coverage report")?;

    println!("Coverage report: build/coverage/index.html");

    Ok(())
}

/// Get project root directory
fn project_root() -> std::path::PathBuf {
    std::path::Path::new(&env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(1)
        .map(std::path::Path::to_path_buf)
        .unwrap_or_else(|| std::path::PathBuf::from("."))
}
