// tests/integration_test.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

use roll_dev::cli::orchestration::{ReleaseGate, RollRequest};
use roll_dev::config::Config;
use roll_dev::domain::{IncrementLevel, RollOutcome, SemanticVersion, TagDescription};
use roll_dev::git::{Git2Repository, Repository as _};
use roll_dev::publish::directory::ReleaseManifest;
use roll_dev::publish::DirectoryPublisher;
use roll_dev::ui::ScriptedPrompter;
use roll_dev::RollError;

#[test]
fn test_roll_dev_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_roll-dev"))
        .arg("--help")
        .output()
        .expect("Failed to execute roll-dev");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("--increment"));
    assert!(stdout.contains("--commit"));
}

#[test]
fn test_missing_increment_exits_with_one() {
    let output = Command::new(env!("CARGO_BIN_EXE_roll-dev"))
        .output()
        .expect("Failed to execute roll-dev");

    assert_eq!(output.status.code(), Some(1));
}

/// A bare upstream holding `v1.4.2` plus three commits, and a clean working
/// clone whose `upstream` remote points at it.
struct Fixture {
    dir: TempDir,
    upstream: PathBuf,
    work: PathBuf,
    branch: String,
    head: Oid,
}

fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> Oid {
    let workdir = repo.workdir().expect("non-bare repository");
    fs::write(workdir.join(name), content).expect("Could not write file");

    let mut index = repo.index().expect("Could not get index");
    index
        .add_path(Path::new(name))
        .expect("Could not add file to index");
    index.write().expect("Could not write index");

    let tree_id = index.write_tree().expect("Could not write tree");
    let tree = repo.find_tree(tree_id).expect("Could not find tree");
    let signature = Signature::now("Test User", "test@example.com").unwrap();

    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

    repo.commit(
        Some("HEAD"),
        &signature,
        &signature,
        message,
        &tree,
        &parent_refs,
    )
    .expect("Could not create commit")
}

fn setup() -> Fixture {
    let dir = TempDir::new().expect("Could not create temp dir");
    let seed_path = dir.path().join("seed");
    let upstream = dir.path().join("upstream.git");
    let work = dir.path().join("work");

    let seed = Repository::init(&seed_path).expect("Could not init seed repo");
    let tagged = commit_file(&seed, "README.md", "v1\n", "Initial commit");
    seed.tag_lightweight("v1.4.2", &seed.find_object(tagged, None).unwrap(), false)
        .expect("Could not create tag");

    let mut head = tagged;
    for i in 0..3 {
        head = commit_file(&seed, "CHANGELOG.md", &format!("change {}\n", i), "fix: change");
    }
    let branch = seed.head().unwrap().shorthand().unwrap().to_string();

    Repository::init_bare(&upstream).expect("Could not init upstream");
    let mut remote = seed
        .remote("upstream", upstream.to_str().unwrap())
        .expect("Could not add remote");
    let branch_spec = format!("refs/heads/{}:refs/heads/{}", branch, branch);
    remote
        .push(&[branch_spec.as_str(), "refs/tags/v1.4.2:refs/tags/v1.4.2"], None)
        .expect("Could not seed upstream");

    let work_repo =
        Repository::clone(upstream.to_str().unwrap(), &work).expect("Could not clone upstream");
    work_repo
        .remote("upstream", upstream.to_str().unwrap())
        .expect("Could not add upstream remote");

    Fixture {
        dir,
        upstream,
        work,
        branch,
        head,
    }
}

impl Fixture {
    fn config(&self) -> Config {
        let mut config = Config::default();
        config.upstream.url = Some(self.upstream.to_str().unwrap().to_string());
        config.upstream.default_commit = format!("upstream/{}", self.branch);
        config
    }

    fn publisher(&self) -> (DirectoryPublisher, PathBuf) {
        let artifact = self.dir.path().join("project.tar.xz");
        fs::write(&artifact, b"archive").unwrap();
        let releases = self.dir.path().join("releases");
        fs::create_dir_all(&releases).unwrap();
        (DirectoryPublisher::new(artifact, &releases), releases)
    }

    fn upstream_ref(&self, name: &str) -> Option<Oid> {
        let upstream = Repository::open_bare(&self.upstream).unwrap();
        let reference = upstream.find_reference(name).ok()?;
        reference.target()
    }
}

#[test]
fn test_git2_repository_queries() {
    let fixture = setup();
    let repo = Git2Repository::open(&fixture.work).unwrap();

    assert_eq!(
        repo.remote_url("upstream").unwrap().as_deref(),
        fixture.upstream.to_str()
    );
    assert!(repo.dirty_paths().unwrap().is_empty());
    assert_eq!(repo.rev_parse("HEAD").unwrap(), fixture.head.to_string());

    let description = TagDescription::parse(&repo.describe_tags("HEAD").unwrap()).unwrap();
    assert_eq!(description.version, SemanticVersion::new(1, 4, 2));
    assert_eq!(description.commits_since_tag, 3);
    assert!(fixture.head.to_string().starts_with(&description.commit_hash));
}

#[test]
fn test_git2_repository_tag_lifecycle() {
    let fixture = setup();
    let repo = Git2Repository::open(&fixture.work).unwrap();
    let head = fixture.head.to_string();

    repo.create_tag("v9.9.9", &head).unwrap();
    assert!(repo.create_tag("v9.9.9", &head).is_err());

    let description = TagDescription::parse(&repo.describe_tags("HEAD").unwrap()).unwrap();
    assert_eq!(description.version, SemanticVersion::new(9, 9, 9));
    assert!(description.is_tagged_commit());

    repo.delete_tag("v9.9.9").unwrap();
    assert!(repo.delete_tag("v9.9.9").is_err());
}

#[test]
fn test_full_roll_against_local_upstream() {
    let fixture = setup();
    let config = fixture.config();
    let repo = Git2Repository::open(&fixture.work).unwrap();
    let (publisher, releases) = fixture.publisher();
    let prompter = ScriptedPrompter::new(["yes"]);

    let outcome = ReleaseGate::new(&config, &repo, &publisher, &prompter).run(&RollRequest {
        increment: IncrementLevel::Minor,
        commit: None,
        just_print: false,
    });

    match &outcome {
        RollOutcome::Published { tag, commit } => {
            assert_eq!(tag, "v1.5.0");
            assert_eq!(commit, &fixture.head.to_string());
        }
        other => panic!("expected Published, got {:?}", other),
    }

    assert_eq!(fixture.upstream_ref("refs/tags/v1.5.0"), Some(fixture.head));
    assert_eq!(fixture.upstream_ref("refs/heads/dev"), Some(fixture.head));

    assert!(releases.join("dev/v1.5.0/project.tar.xz").is_file());
    let manifest = ReleaseManifest::load(&releases.join("releases.json")).unwrap();
    assert_eq!(
        manifest.current_release.get("dev"),
        Some(&fixture.head.to_string())
    );
}

#[test]
fn test_declined_roll_leaves_no_tag() {
    let fixture = setup();
    let config = fixture.config();
    let repo = Git2Repository::open(&fixture.work).unwrap();
    let (publisher, releases) = fixture.publisher();
    let prompter = ScriptedPrompter::new(["no"]);

    let outcome = ReleaseGate::new(&config, &repo, &publisher, &prompter).run(&RollRequest {
        increment: IncrementLevel::Patch,
        commit: None,
        just_print: false,
    });

    assert!(matches!(outcome, RollOutcome::Aborted { .. }));
    let work = Repository::open(&fixture.work).unwrap();
    assert!(work.find_reference("refs/tags/v1.4.3").is_err());
    assert_eq!(fixture.upstream_ref("refs/tags/v1.4.3"), None);
    assert_eq!(fixture.upstream_ref("refs/heads/dev"), None);
    assert!(!releases.join("releases.json").exists());
}

#[test]
fn test_tagged_commit_is_already_released() {
    let fixture = setup();
    let config = fixture.config();
    let repo = Git2Repository::open(&fixture.work).unwrap();
    let (publisher, _releases) = fixture.publisher();
    let prompter = ScriptedPrompter::new(["yes"]);

    let outcome = ReleaseGate::new(&config, &repo, &publisher, &prompter).run(&RollRequest {
        increment: IncrementLevel::Patch,
        commit: Some(format!("upstream/{}~3", fixture.branch)),
        just_print: false,
    });

    match outcome {
        RollOutcome::AlreadyReleased { version } => {
            assert_eq!(version, SemanticVersion::new(1, 4, 2))
        }
        other => panic!("expected AlreadyReleased, got {:?}", other),
    }
    assert!(prompter.questions().is_empty());
}

#[test]
fn test_dirty_working_tree_is_rejected() {
    let fixture = setup();
    fs::write(fixture.work.join("scratch.txt"), "wip").unwrap();

    let config = fixture.config();
    let repo = Git2Repository::open(&fixture.work).unwrap();
    let (publisher, _releases) = fixture.publisher();
    let prompter = ScriptedPrompter::new(["yes"]);

    let outcome = ReleaseGate::new(&config, &repo, &publisher, &prompter).run(&RollRequest {
        increment: IncrementLevel::Patch,
        commit: None,
        just_print: false,
    });

    assert!(matches!(outcome, RollOutcome::Failed(RollError::Precondition(_))));
    // the untracked file survives: nothing was reset
    assert!(fixture.work.join("scratch.txt").exists());
}

#[test]
fn test_binary_just_print() {
    let fixture = setup();
    let config_path = fixture.dir.path().join("rolldev.toml");
    fs::write(
        &config_path,
        format!(
            "[upstream]\nurl = {:?}\ndefault_commit = \"upstream/{}\"\n",
            fixture.upstream.to_str().unwrap(),
            fixture.branch
        ),
    )
    .unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_roll-dev"))
        .current_dir(&fixture.work)
        .arg("--increment=y")
        .arg("--just-print")
        .arg("--config")
        .arg(&config_path)
        .output()
        .expect("Failed to execute roll-dev");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().any(|line| line.trim() == "1.5.0"));
}

#[test]
fn test_binary_roll_with_piped_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let fixture = setup();
    let (_publisher, releases) = fixture.publisher();
    let artifact = fixture.dir.path().join("project.tar.xz");
    let config_path = fixture.dir.path().join("rolldev.toml");
    fs::write(
        &config_path,
        format!(
            "[upstream]\nurl = {:?}\ndefault_commit = \"upstream/{}\"\n\n\
             [publish]\nbackend = \"directory\"\nartifact = {:?}\ndestination = {:?}\n",
            fixture.upstream.to_str().unwrap(),
            fixture.branch,
            artifact.to_str().unwrap(),
            releases.to_str().unwrap()
        ),
    )
    .unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_roll-dev"))
        .current_dir(&fixture.work)
        .arg("--increment=z")
        .arg("--config")
        .arg(&config_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute roll-dev");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"yes\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(fixture.upstream_ref("refs/tags/v1.4.3"), Some(fixture.head));
    assert_eq!(fixture.upstream_ref("refs/heads/dev"), Some(fixture.head));
    assert!(releases.join("dev/v1.4.3/project.tar.xz").is_file());
}

#[test]
fn test_describe_skips_non_version_tags() {
    let fixture = setup();
    let work = Repository::open(&fixture.work).unwrap();
    let parent = work
        .revparse_single("HEAD~1")
        .unwrap()
        .peel(git2::ObjectType::Commit)
        .unwrap();
    work.tag_lightweight("nightly", &parent, false).unwrap();

    let repo = Git2Repository::open(&fixture.work).unwrap();
    let description = TagDescription::parse(&repo.describe_tags("HEAD").unwrap()).unwrap();
    assert_eq!(description.version, SemanticVersion::new(1, 4, 2));
    assert_eq!(description.commits_since_tag, 3);
}

#[test]
fn test_roll_ignores_non_version_tag_between_release_and_head() {
    let fixture = setup();
    {
        let work = Repository::open(&fixture.work).unwrap();
        let head = work.find_object(fixture.head, None).unwrap();
        work.tag_lightweight("nightly", &head, false).unwrap();
    }

    let config = fixture.config();
    let repo = Git2Repository::open(&fixture.work).unwrap();
    let (publisher, _releases) = fixture.publisher();
    let prompter = ScriptedPrompter::new(["yes"]);

    let outcome = ReleaseGate::new(&config, &repo, &publisher, &prompter).run(&RollRequest {
        increment: IncrementLevel::Patch,
        commit: None,
        just_print: false,
    });

    match outcome {
        RollOutcome::Published { tag, .. } => assert_eq!(tag, "v1.4.3"),
        other => panic!("expected Published, got {:?}", other),
    }
}
