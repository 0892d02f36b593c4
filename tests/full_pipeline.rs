//! End-to-end pipeline: batch run, manifest persistence, change report.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use gitid::config::GitIdConfig;
use gitid::{
    build_manifest, detect_changes, load_manifest, run_batch, save_manifest, BatchInput,
    BatchOptions, FetchError, Manifest, MetadataFetcher, MetadataSource, RawMetadata,
};

/// In-memory "repository": file path → (fileHash, commitHash).
struct MapFetcher {
    files: HashMap<String, (String, String)>,
}

impl MapFetcher {
    fn new(entries: &[(&str, &str)]) -> Self {
        let commit = "abc123def4567890abc123def4567890abc123de".to_string();
        let files = entries
            .iter()
            .map(|(path, file_hash)| (path.to_string(), (file_hash.to_string(), commit.clone())))
            .collect();
        Self { files }
    }

    fn lookup(&self, file_path: &str) -> Result<RawMetadata, FetchError> {
        let (file_hash, commit_hash) =
            self.files
                .get(file_path)
                .cloned()
                .ok_or_else(|| FetchError::NotFound {
                    path: file_path.to_string(),
                })?;

        Ok(RawMetadata {
            source: Some(MetadataSource::LocalGit),
            owner: Some("octocat".into()),
            repo: Some("hello-world".into()),
            branch: Some("main".into()),
            commit_hash: Some(commit_hash),
            file_path: Some(file_path.to_string()),
            file_hash: Some(file_hash),
            last_modified: None,
            html_url: None,
            repo_path: None,
        })
    }
}

#[async_trait]
impl MetadataFetcher for MapFetcher {
    async fn local_metadata(
        &self,
        _repo_root: &str,
        file_path: &str,
    ) -> Result<RawMetadata, FetchError> {
        self.lookup(file_path)
    }

    async fn remote_metadata(
        &self,
        _owner: &str,
        _repo: &str,
        file_path: &str,
        _reference: &str,
    ) -> Result<RawMetadata, FetchError> {
        self.lookup(file_path)
    }
}

fn local(path: &str) -> BatchInput {
    BatchInput::Local {
        repo_path: "/repo".into(),
        file_path: path.into(),
    }
}

const HASH_A: &str = "1111111111111111111111111111111111111111";
const HASH_B: &str = "2222222222222222222222222222222222222222";
const HASH_C: &str = "3333333333333333333333333333333333333333";
const HASH_D: &str = "4444444444444444444444444444444444444444";

#[tokio::test]
async fn snapshot_diff_cycle_classifies_every_path() {
    // First snapshot: three tracked files.
    let first = Arc::new(MapFetcher::new(&[
        ("src/a.rs", HASH_A),
        ("src/b.rs", HASH_B),
        ("src/c.rs", HASH_C),
    ]));
    let inputs = vec![local("src/a.rs"), local("src/b.rs"), local("src/c.rs")];

    let results = run_batch(
        inputs,
        Arc::clone(&first) as Arc<dyn MetadataFetcher>,
        &BatchOptions::default(),
        None,
    )
    .await
    .expect("first snapshot");
    let manifest = build_manifest(&results);
    assert_eq!(manifest.len(), 3);

    // Second snapshot: b modified, c deleted, d added, a errors out.
    let second = Arc::new(MapFetcher::new(&[
        ("src/b.rs", HASH_D),
        ("src/d.rs", HASH_C),
    ]));
    let inputs = vec![
        local("src/a.rs"), // not in the second tree: NotFound
        local("src/b.rs"),
        local("src/d.rs"),
    ];

    let report = detect_changes(
        inputs,
        second,
        &BatchOptions::default(),
        &manifest,
    )
    .await
    .expect("second snapshot");

    assert_eq!(report.added, vec!["src/d.rs"]);
    assert_eq!(report.modified, vec!["src/b.rs"]);
    assert!(report.unchanged.is_empty());
    // c was never mentioned this run; a errored, so it is not "removed".
    assert_eq!(report.removed, vec!["src/c.rs"]);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].file_path, "src/a.rs");
}

#[tokio::test]
async fn erroring_paths_drop_out_of_freshly_built_manifests() {
    let fetcher = Arc::new(MapFetcher::new(&[("src/b.rs", HASH_B)]));
    let inputs = vec![local("src/a.rs"), local("src/b.rs")];

    let results = run_batch(inputs, fetcher, &BatchOptions::default(), None)
        .await
        .expect("snapshot");
    let manifest = build_manifest(&results);

    assert!(!manifest.contains_key("src/a.rs"));
    assert!(manifest.contains_key("src/b.rs"));
}

#[tokio::test]
async fn unchanged_files_survive_a_second_run() {
    let fetcher = Arc::new(MapFetcher::new(&[("src/a.rs", HASH_A)]));

    let results = run_batch(
        vec![local("src/a.rs")],
        Arc::clone(&fetcher) as Arc<dyn MetadataFetcher>,
        &BatchOptions::default(),
        None,
    )
    .await
    .expect("first run");
    let manifest = build_manifest(&results);

    let report = detect_changes(
        vec![local("src/a.rs")],
        fetcher,
        &BatchOptions::default(),
        &manifest,
    )
    .await
    .expect("second run");

    assert_eq!(report.unchanged, vec!["src/a.rs"]);
    assert!(report.is_clean());
}

#[tokio::test]
async fn manifest_round_trips_through_persistence() {
    let fetcher = Arc::new(MapFetcher::new(&[
        ("src/a.rs", HASH_A),
        ("src/b.rs", HASH_B),
    ]));
    let results = run_batch(
        vec![local("src/a.rs"), local("src/b.rs")],
        fetcher,
        &BatchOptions::default(),
        None,
    )
    .await
    .expect("snapshot");

    let manifest = build_manifest(&results);
    for pretty in [false, true] {
        let encoded = save_manifest(&manifest, pretty).expect("encode");
        let decoded: Manifest = load_manifest(&encoded).expect("decode");
        assert_eq!(decoded, manifest, "pretty = {pretty}");
    }
}

#[tokio::test]
async fn config_file_drives_the_batch_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("gitid.yaml");
    std::fs::write(
        &path,
        concat!(
            "version: \"1.0\"\n",
            "identifier:\n",
            "  algorithm: \"sha1\"\n",
            "  truncate: 12\n",
            "batch:\n",
            "  concurrency: 2\n",
        ),
    )
    .expect("write config");

    let config = GitIdConfig::from_yaml_file(&path).expect("config loads");
    let options = config.batch_options().expect("batch options");
    assert_eq!(options.concurrency, 2);

    let fetcher = Arc::new(MapFetcher::new(&[("src/a.rs", HASH_A)]));
    let results = run_batch(vec![local("src/a.rs")], fetcher, &options, None)
        .await
        .expect("configured run");

    let identifier = results[0].identifier.as_deref().expect("identifier");
    let digest = identifier.strip_prefix("sha1:").expect("sha1 prefix");
    assert_eq!(digest.len(), 12);
    assert_eq!(results[0].short.as_deref().map(str::len), Some(8));
}

#[test]
fn permalinks_use_the_documented_shape() {
    let url = gitid::permalink(
        "github.com",
        "octocat",
        "hello-world",
        "abc123def4567890abc123def4567890abc123de",
        "docs/guide.md",
    );
    assert_eq!(
        url,
        "https://github.com/octocat/hello-world/blob/abc123def4567890abc123def4567890abc123de/docs/guide.md",
    );

    let parsed = gitid::parse_remote_url("git@github.com:octocat/hello-world.git")
        .expect("remote parses");
    assert_eq!(parsed.host, "github.com");
    assert_eq!(parsed.owner, "octocat");
}
