use std::process::Command;

fn main() {
    emit("BUILD_DATE", chrono::Utc::now().to_rfc3339());
    emit("BUILD_COMMIT", git(&["rev-parse", "--short", "HEAD"]));
    emit("BUILD_BRANCH", git(&["rev-parse", "--abbrev-ref", "HEAD"]));

    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-env-changed=ENV");
}

fn emit(name: &str, value: String) {
    println!("cargo:rustc-env={name}={value}");
}

/// Output of a git command, or `unknown` outside a checkout.
fn git(args: &[&str]) -> String {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_owned())
}
