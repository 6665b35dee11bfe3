use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("meta-utils").unwrap();
    cmd.current_dir(cwd).env_remove("META_UTILS_LOG");
    cmd
}

fn project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for dir in ["app/api/events", "components/ui", "lib", "app/.next/cache"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    fs::write(root.join("package.json"), "{\"name\":\"site\"}\n").unwrap();
    fs::write(root.join("app/page.tsx"), "export default function Page() {}\n").unwrap();
    fs::write(root.join("app/api/events/route.ts"), "export async function GET() {}\n").unwrap();
    fs::write(root.join("components/ui/button.tsx"), "export function Button() {}\n").unwrap();
    fs::write(root.join("lib/utils.ts"), "export const cn = () => \"\";\n").unwrap();
    fs::write(root.join("app/.next/cache/build.js"), "cached").unwrap();
    temp_dir
}

#[test]
fn help_for_every_subcommand() {
    let dir = TempDir::new().unwrap();
    for sub in ["collect", "combine", "init-config"] {
        cmd(dir.path()).args([sub, "--help"]).assert().success();
    }
}

#[test]
fn collect_writes_three_reports() {
    let project = project();
    let out = project.path().join("file_lists");

    cmd(project.path())
        .args(["collect", "--base-dir", "."])
        .assert()
        .success()
        .stdout(contains("Total files found: 5"));

    let mut names: Vec<String> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 3);
    assert!(names.iter().all(|n| n.starts_with("mhfa_project_files_")));

    let json_name = names.iter().find(|n| n.ends_with(".json")).unwrap();
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(json_name)).unwrap()).unwrap();
    assert_eq!(report["total_files"], 5);
    assert_eq!(report["files"].as_array().unwrap().len(), 5);

    let text_name = names.iter().find(|n| n.ends_with(".txt")).unwrap();
    let text = fs::read_to_string(out.join(text_name)).unwrap();
    assert!(text.contains("=== COMPONENTS DIRECTORY ==="));
    assert!(!text.contains("build.js"));
}

#[test]
fn collect_extra_exclusions_and_output_dir() {
    let project = project();
    let out = TempDir::new().unwrap();

    cmd(project.path())
        .args(["collect", "--exclude", "ui", "--output-dir"])
        .arg(out.path())
        .assert()
        .success();

    let csv = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .find(|p| p.extension().is_some_and(|e| e == "csv"))
        .unwrap();
    let content = fs::read_to_string(csv).unwrap();
    assert_eq!(content.lines().count(), 1 + 4);
    assert!(!content.contains("button.tsx"));
}

#[test]
fn collect_missing_base_directory() {
    let dir = TempDir::new().unwrap();

    cmd(dir.path())
        .args(["collect", "--base-dir", "does-not-exist"])
        .assert()
        .code(3)
        .stderr(contains("does not exist"));

    assert!(!dir.path().join("file_lists").exists());
}

#[test]
fn collect_dry_run_writes_nothing() {
    let project = project();

    cmd(project.path())
        .args(["collect", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("Would write"));

    assert!(!project.path().join("file_lists").exists());
}

#[test]
fn combine_with_yes_and_output() {
    let project = project();

    cmd(project.path())
        .args(["combine", "--yes", "--output", "review.txt"])
        .assert()
        .success()
        .stdout(contains("Files combined successfully!"));

    let document = fs::read_to_string(project.path().join("review.txt")).unwrap();
    assert!(document.starts_with("MHFA REGISTRATION PROJECT - COMBINED SOURCE FILES\n"));
    assert!(document.contains("FILE: lib/utils.ts\n"));
    assert!(document.contains("Total files processed: 44\n"));
    assert!(document.contains("Files included: 5\n"));
    assert!(document.contains("  - vercel.json (not found)\n"));
}

#[test]
fn combine_declined_prompt_writes_nothing() {
    let project = project();

    cmd(project.path())
        .args(["combine", "--output", "review.txt"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Continue? (y/N): "))
        .stdout(contains("Operation cancelled."));

    assert!(!project.path().join("review.txt").exists());
}

#[test]
fn combine_confirmed_prompt() {
    let project = project();

    cmd(project.path())
        .args(["combine", "--output", "review.txt"])
        .write_stdin(" YES \n")
        .assert()
        .success();

    assert!(project.path().join("review.txt").exists());
}

#[test]
fn combine_from_scan() {
    let project = project();

    cmd(project.path())
        .args(["combine", "--yes", "--from-scan", "--output", "scan.txt"])
        .assert()
        .success();

    let document = fs::read_to_string(project.path().join("scan.txt")).unwrap();
    assert!(document.contains("Total files processed: 5\n"));
    assert!(document.contains("Files skipped: 0\n"));
    assert!(!document.contains(".next"));
}

#[test]
fn combine_missing_base_directory() {
    let dir = TempDir::new().unwrap();

    cmd(dir.path())
        .args(["combine", "--yes", "--base-dir", "nowhere", "--output", "out.txt"])
        .assert()
        .code(3);

    assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn combine_dry_run_lists_statuses() {
    let project = project();

    cmd(project.path())
        .args(["--output-format", "plain", "combine", "--dry-run", "--output", "x.txt"])
        .assert()
        .success()
        .stdout(contains("lib\tlib/utils.ts\tinclude"))
        .stdout(contains("root\tvercel.json\tnot found"));

    assert!(!project.path().join("x.txt").exists());
}

#[test]
fn init_config_then_use_it() {
    let dir = TempDir::new().unwrap();

    cmd(dir.path())
        .arg("init-config")
        .assert()
        .success()
        .stdout(contains("meta-utils.toml"));

    let content = fs::read_to_string(dir.path().join("meta-utils.toml")).unwrap();
    assert!(content.contains("[[combiner.groups]]"));

    // Picked up automatically from the working directory
    cmd(dir.path()).args(["collect", "--dry-run"]).assert().success();
}

#[test]
fn invalid_config_file() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("broken.toml"), "[collector\ntarget_dirs = ").unwrap();

    cmd(dir.path())
        .args(["collect", "--config", "broken.toml"])
        .assert()
        .code(2);
}
