//! Build script: embeds the git hash and sanity-checks GPU feature flags
//! before whisper-rs-sys starts compiling.

use std::process::Command;

fn main() {
    // Embed git short hash for version string
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") && Command::new("nvcc").arg("--version").output().is_err() {
        panic!(
            "`nvcc` not found — CUDA toolkit is not installed.\n\
             Install: https://developer.nvidia.com/cuda-downloads\n\
             Or build without CUDA: cargo build --release"
        );
    }
    if cfg!(feature = "vulkan")
        && Command::new("vulkaninfo")
            .arg("--summary")
            .output()
            .is_err()
    {
        panic!(
            "`vulkaninfo` not found — Vulkan SDK is not installed.\n\
             Install: https://vulkan.lunarg.com/\n\
             Or build without Vulkan: cargo build --release"
        );
    }
}
