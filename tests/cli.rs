use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::{tempdir, NamedTempFile};

fn glowtext() -> Command {
    Command::cargo_bin("glowtext").expect("binary exists")
}

fn write_font(contents: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp font");
    tmp.write_all(contents.as_bytes()).expect("write font");
    tmp
}

#[test]
fn headless_run_writes_png_and_prints_scene() {
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("frame.png");

    glowtext()
        .arg("--headless")
        .arg(&out)
        .args(["--size", "160x90", "--frames", "3"])
        .assert()
        .success()
        .stdout(contains("Scene assembled with 3 drawable(s) (lit variant"))
        .stdout(contains(" - cube (pulsing-glow"))
        .stdout(contains(" - letter (direct-lighting"))
        .stdout(contains(" - number (direct-lighting"))
        .stdout(contains("Rendered 3 frame(s) at 160x90"))
        .stdout(contains("Final state after 3 frame(s):"));

    let image = image::open(&out).expect("png written");
    assert_eq!((image.width(), image.height()), (160, 90));
}

#[test]
fn key_list_moves_cube_and_camera() {
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("keys.png");

    glowtext()
        .arg("--headless")
        .arg(&out)
        .args(["--size", "64x48", "--keys", "w,w,d"])
        .assert()
        .success()
        .stdout(contains(" - cube pos=(0.00, 0.40, 0.00)"))
        .stdout(contains(" - camera pos=(0.20, 0.00, 7.00)"));
}

#[test]
fn flat_variant_reports_flat_letter() {
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("flat.png");

    glowtext()
        .arg("--headless")
        .arg(&out)
        .args(["--size", "64x48", "--variant", "flat"])
        .assert()
        .success()
        .stdout(contains("(flat variant"))
        .stdout(contains(" - letter (flat-color"));
}

#[test]
fn wave_variant_renders_waving_number() {
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("wave.png");

    glowtext()
        .arg("--headless")
        .arg(&out)
        .args(["--size", "64x48", "--frames", "2", "--variant", "wave"])
        .assert()
        .success()
        .stdout(contains("(wave variant"))
        .stdout(contains(" - number (direct-lighting + wave"))
        .stdout(contains(" - letter (direct-lighting,"));

    assert!(out.exists());
}

#[test]
fn custom_font_file_is_used() {
    let font = write_font(
        r#"<font name="tiny" stroke="0.1" advance="0.8">
    <glyph char="N">
        <stroke from="0 0" to="0 1"/>
        <stroke from="0 1" to="0.5 0"/>
        <stroke from="0.5 0" to="0.5 1"/>
    </glyph>
    <glyph char="1">
        <stroke from="0.25 0" to="0.25 1"/>
    </glyph>
</font>"#,
    );
    let dir = tempdir().expect("temp dir");
    let out = dir.path().join("custom.png");

    glowtext()
        .arg("--headless")
        .arg(&out)
        .arg("--font")
        .arg(font.path())
        .args(["--size", "64x48"])
        .assert()
        .success()
        .stdout(contains(" - letter (direct-lighting, 36 triangles)"))
        .stdout(contains(" - number (direct-lighting, 12 triangles)"));
}

#[test]
fn malformed_font_fails_to_assemble() {
    let font = write_font("<font name=\"broken\"><glyph char=\"N\">");
    let dir = tempdir().expect("temp dir");

    glowtext()
        .arg("--headless")
        .arg(dir.path().join("never.png"))
        .arg("--font")
        .arg(font.path())
        .assert()
        .failure()
        .stderr(contains("failed to assemble scene"));
}

#[test]
fn unknown_argument_is_rejected() {
    glowtext()
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(contains("Unknown argument: --bogus"));
}

#[test]
fn zero_size_is_rejected() {
    glowtext()
        .args(["--headless", "unused.png", "--size", "0x10"])
        .assert()
        .failure()
        .stderr(contains("--size must be non-zero"));
}

#[test]
fn oversized_size_is_rejected() {
    glowtext()
        .args(["--headless", "unused.png", "--size", "70000x70000"])
        .assert()
        .failure()
        .stderr(contains("--size is limited to 16384x16384"));
}
