//! Toolchain diagnostics: verify the external OCR tools are present and,
//! optionally, that the whole image -> PDF -> OCR -> text chain works.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context};

use pagesift::{OutputMode, RunOpts, Runner};

/// Minimal valid 1x1 white PNG, used when Python PIL is unavailable to draw
/// a proper test image.
const FALLBACK_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
    0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0x99, 0x01, 0x01,
    0x00, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
    0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

const REQUIRED_TOOLS: [(&str, &str, &[&str]); 4] = [
    ("python3", "python3", &["--version"]),
    ("ocrmypdf", "ocrmypdf", &["--version"]),
    ("tesseract", "tesseract", &["--version"]),
    // pdftotext prints its version to stderr.
    ("pdftotext", "pdftotext", &["-v"]),
];

/// Check tool presence and versions; with `smoke`, also run an end-to-end
/// round trip in a temporary directory.
pub fn doctor_command(smoke: bool) -> anyhow::Result<()> {
    let runner = Runner::new();
    let opts = RunOpts {
        timeout: Some(Duration::from_secs(10)),
        stdout_mode: OutputMode::Capture,
        stderr_mode: OutputMode::Capture,
        max_capture_bytes: 1024,
        ..Default::default()
    };

    println!("Doctor report:");
    let mut has_errors = false;

    for (name, bin, version_args) in REQUIRED_TOOLS {
        let Some(path) = runner.look_path(bin) else {
            println!("- {name}: MISSING");
            has_errors = true;
            continue;
        };

        match runner.run(bin, version_args, &opts) {
            Ok(result) => {
                let version = extract_version(&format!("{}{}", result.stdout, result.stderr))
                    .unwrap_or_else(|| "OK".to_string());
                println!("- {name}: OK ({version}) [{}]", path.display());
            }
            Err(err) => {
                println!("- {name}: ERROR ({err})");
                has_errors = true;
            }
        }
    }

    // Ghostscript is optional; report it when present.
    if let Some(path) = runner.look_path("gs") {
        if let Ok(result) = runner.run("gs", &["--version"], &opts) {
            let version = extract_version(&format!("{}{}", result.stdout, result.stderr))
                .unwrap_or_else(|| "OK".to_string());
            println!("- ghostscript: OK ({version}) [{}]", path.display());
        }
    }

    if smoke {
        println!("Running smoke test...");
        run_smoke_test(&runner).context("smoke test failed")?;
        println!("Smoke test: PASSED");
    } else {
        println!("Smoke test: SKIPPED (use --smoke to run)");
    }

    if has_errors {
        bail!("doctor found errors: missing or failed tools");
    }
    Ok(())
}

/// Pull a version-looking token out of command output.
fn extract_version(output: &str) -> Option<String> {
    for line in output.lines() {
        let line = line.trim();
        if line.to_lowercase().contains("version") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            for (i, part) in parts.iter().enumerate() {
                if part.to_lowercase().contains("version") && i + 1 < parts.len() {
                    return Some(parts[i + 1].to_string());
                }
            }
            if line.len() < 100 {
                return Some(line.to_string());
            }
        }
    }
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && line.len() < 100)
        .map(str::to_string)
}

/// End-to-end round trip: test image -> img2pdf -> ocrmypdf -> pdftotext.
fn run_smoke_test(runner: &Runner) -> anyhow::Result<()> {
    let tmp = tempfile::Builder::new()
        .prefix("doctor-smoke-")
        .tempdir()
        .context("failed to create temp directory")?;
    let tmp_path = tmp.path();

    let test_image = tmp_path.join("test.png");
    generate_test_image(runner, &test_image)?;

    let opts = RunOpts {
        timeout: Some(Duration::from_secs(120)),
        stdout_mode: OutputMode::Capture,
        stderr_mode: OutputMode::Capture,
        dir: Some(tmp_path.to_path_buf()),
        ..Default::default()
    };

    let test_pdf = tmp_path.join("test.pdf");
    runner
        .run(
            "python3",
            &[
                "-m",
                "img2pdf",
                test_image.to_string_lossy().as_ref(),
                "-o",
                test_pdf.to_string_lossy().as_ref(),
            ],
            &opts,
        )
        .context("img2pdf failed")?;

    let ocr_pdf = tmp_path.join("test_ocr.pdf");
    runner
        .run(
            "ocrmypdf",
            &[
                "--deskew",
                "--rotate-pages",
                test_pdf.to_string_lossy().as_ref(),
                ocr_pdf.to_string_lossy().as_ref(),
            ],
            &opts,
        )
        .context("ocrmypdf failed")?;

    let result = runner
        .run(
            "pdftotext",
            &["-layout", ocr_pdf.to_string_lossy().as_ref(), "-"],
            &opts,
        )
        .context("pdftotext failed")?;

    if result.stdout.trim().is_empty() {
        bail!("pdftotext produced no output");
    }
    Ok(())
}

/// Draw a small PNG with readable text via Python PIL; fall back to a 1x1
/// white PNG when PIL is unavailable (OCR will find nothing, but the chain
/// still runs).
fn generate_test_image(runner: &Runner, path: &Path) -> anyhow::Result<()> {
    let script = format!(
        r#"
from PIL import Image, ImageDraw, ImageFont
img = Image.new('RGB', (200, 50), color='white')
draw = ImageDraw.Draw(img)
try:
    font = ImageFont.truetype('/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf', 20)
except Exception:
    font = ImageFont.load_default()
draw.text((10, 10), 'TEST', fill='black', font=font)
img.save('{}')
"#,
        path.display()
    );

    let opts = RunOpts {
        timeout: Some(Duration::from_secs(10)),
        stdout_mode: OutputMode::Capture,
        stderr_mode: OutputMode::Capture,
        ..Default::default()
    };

    if runner.run("python3", &["-c", &script], &opts).is_err() {
        std::fs::write(path, FALLBACK_PNG).context("failed to write fallback test image")?;
    }
    Ok(())
}
