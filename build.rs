use std::env;
use std::process::Command;

fn main() {
    for var in ["GAUSSIAN_BUILD", "GITHUB_SHA", "PROFILE"] {
        println!("cargo:rerun-if-env-changed={}", var);
    }

    let build_id = env::var("GAUSSIAN_BUILD")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(target_label);
    println!("cargo:rustc-env=GAUSSIAN_BUILD={}", build_id);

    let sha = git_head()
        .or_else(|| env::var("GITHUB_SHA").ok())
        .and_then(|s| short_hex(&s))
        .unwrap_or_default();
    println!("cargo:rustc-env=GAUSSIAN_GIT_SHA={}", sha);
}

/// `os-arch-profile`, e.g. `linux-x86_64-release`.
fn target_label() -> String {
    let get = |k: &str| env::var(k).unwrap_or_else(|_| "unknown".to_string());
    let os = match get("CARGO_CFG_TARGET_OS").as_str() {
        "macos" => "darwin".to_string(),
        other => other.to_string(),
    };
    format!("{}-{}-{}", os, get("CARGO_CFG_TARGET_ARCH"), get("PROFILE"))
}

fn git_head() -> Option<String> {
    let out = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()?;
    if !out.status.success() {
        return None;
    }
    String::from_utf8(out.stdout).ok()
}

fn short_hex(s: &str) -> Option<String> {
    let s = s.trim();
    let short = s.get(..s.len().min(7))?;
    if short.is_empty() || !short.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(short.to_ascii_lowercase())
}
