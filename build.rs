use std::process::Command;

fn main() {
    // Prefer FLOWGRID_VERSION from the environment (set by CI), fall back
    // to the git tag, then the crate version.
    let version = std::env::var("FLOWGRID_VERSION")
        .ok()
        .filter(|s| !s.is_empty())
        .or_else(|| {
            Command::new("git")
                .args(["describe", "--tags", "--always"])
                .output()
                .ok()
                .filter(|o| o.status.success())
                .and_then(|o| String::from_utf8(o.stdout).ok())
                .map(|s| s.trim().to_string())
        })
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=FLOWGRID_VERSION={version}");
    println!("cargo:rerun-if-env-changed=FLOWGRID_VERSION");
}
