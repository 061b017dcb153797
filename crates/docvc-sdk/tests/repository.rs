use std::sync::{Arc, Mutex};

use docvc_sdk::{
    Commit, Decision, Hash, HeadEvent, Patch, PatchOperation, RepoError, Repository, RepositoryConfig,
    Snapshot, EMPTY_HASH,
};
use serde_json::{json, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn doc(foo: &str, bar: &str) -> Value {
    json!({"foo": foo, "child": {"bar": bar}})
}

fn message_of(repo: &Repository, hash: &Hash) -> String {
    commit_of(repo, hash).message
}

fn commit_of(repo: &Repository, hash: &Hash) -> Commit {
    repo.read_commit(hash.as_str()).unwrap()
}

#[test]
fn new_repository_is_on_master_with_empty_head() {
    let repo = Repository::new();
    assert_eq!(repo.branch().unwrap(), "master");
    assert_eq!(repo.head().unwrap(), EMPTY_HASH);
    assert!(!repo.detached());
}

#[test]
fn tree_before_first_commit_fails() {
    let err = Repository::new().tree().unwrap_err();
    assert!(matches!(err, RepoError::StateConflict(_)));
    assert!(err
        .to_string()
        .contains("There isn't a tree yet. You must do your first commit for that."));
}

#[test]
fn commit_moves_head_and_records_parent() {
    let repo = Repository::new();
    let first = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();

    assert_eq!(repo.head().unwrap(), first);
    assert_eq!(repo.tree().unwrap(), doc("bar", "foo"));
    let commit = commit_of(&repo, &first);
    assert_eq!(commit.parent, EMPTY_HASH);
    assert_eq!(commit.author, "robin");
    assert!(commit.timestamp().is_some());

    let next = repo.commit("robin", "I commit", &doc("bar2", "foo2")).unwrap();
    assert_eq!(repo.head().unwrap(), next);
    assert_eq!(repo.tree().unwrap(), doc("bar2", "foo2"));
    assert_eq!(commit_of(&repo, &next).parent, first);
}

#[test]
fn commit_requires_author_and_message() {
    let repo = Repository::new();
    assert_eq!(
        repo.commit("", "I commit", &doc("bar", "foo")).unwrap_err(),
        RepoError::Validation("Author is mandatory".into())
    );
    assert_eq!(
        repo.commit("robin", "", &doc("bar", "foo")).unwrap_err(),
        RepoError::Validation("Message is mandatory".into())
    );
    assert!(repo.log().unwrap().is_empty());
    assert_eq!(repo.head().unwrap(), EMPTY_HASH);
}

#[test]
fn committing_the_head_tree_is_a_no_op() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    let before = repo.to_json();
    let err = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap_err();
    assert_eq!(err, RepoError::NoOp);
    assert!(err.to_string().contains("No changes to commit"));
    assert_eq!(repo.log().unwrap().len(), 1);
    assert_eq!(repo.to_json(), before);
}

#[test]
fn commit_rejects_reserved_reference_tokens() {
    let repo = Repository::new();
    let before = repo.to_json();
    let err = repo
        .commit("robin", "I commit", &json!({"note": "$$ref:hello"}))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)), "{err:?}");
    assert!(err.to_string().contains("/note"));
    assert_eq!(repo.to_json(), before);

    let first = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    let before = repo.to_json();
    let nested = json!({"foo": "bar", "child": {"list": ["ok", "$$ref:b1a13bdd0c"]}});
    assert!(matches!(
        repo.commit("robin", "I commit", &nested),
        Err(RepoError::Validation(_))
    ));
    assert_eq!(repo.to_json(), before);
    assert_eq!(repo.tree().unwrap(), doc("bar", "foo"));

    let next = repo.commit("robin", "I commit", &doc("bar2", "foo")).unwrap();
    assert_eq!(commit_of(&repo, &next).parent, first);
    assert_eq!(repo.tree().unwrap(), doc("bar2", "foo"));
}

#[test]
fn strings_near_the_token_prefix_are_plain_data() {
    let repo = Repository::new();
    let tree = json!({"a": "$$ref", "b": "$ref:x", "c": "note $$ref:x"});
    repo.commit("robin", "I commit", &tree).unwrap();
    assert_eq!(repo.tree().unwrap(), tree);
}

#[test]
fn checkout_creates_and_switches_branches() {
    let repo = Repository::new();
    let first = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();

    repo.checkout("dev", true).unwrap();
    assert_eq!(repo.branch().unwrap(), "dev");

    let second = repo.commit("robin", "I commit", &doc("bar2", "foo2")).unwrap();
    assert_eq!(commit_of(&repo, &second).parent, first);
    let third = repo.commit("robin", "I commit", &doc("bar3", "foo2")).unwrap();
    assert_eq!(commit_of(&repo, &third).parent, second);

    repo.checkout("master", false).unwrap();
    assert_eq!(repo.branch().unwrap(), "master");
    let last = repo.commit("robin", "I commit", &doc("bar4", "foo4")).unwrap();
    assert_eq!(commit_of(&repo, &last).parent, first);
}

#[test]
fn checkout_of_a_commit_detaches_head() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    let second = repo.commit("robin", "I commit", &doc("bar2", "foo2")).unwrap();
    let third = repo.commit("robin", "I commit", &doc("bar3", "foo3")).unwrap();

    repo.checkout(second.as_str(), false).unwrap();
    assert_eq!(repo.tree().unwrap(), doc("bar2", "foo2"));
    assert_eq!(repo.head().unwrap(), second);
    assert!(repo.detached());
    assert!(matches!(repo.branch(), Err(RepoError::StateConflict(_))));

    let fourth = repo.commit("robin", "I commit", &doc("bar4", "foo4")).unwrap();
    assert_eq!(commit_of(&repo, &fourth).parent, second);
    assert_eq!(repo.head().unwrap(), fourth);

    repo.checkout("master", false).unwrap();
    assert_eq!(repo.branch().unwrap(), "master");
    assert!(!repo.detached());
    assert_eq!(repo.tree().unwrap(), doc("bar3", "foo3"));
    assert_eq!(repo.head().unwrap(), third);

    let last = repo.commit("robin", "I commit", &doc("bar4", "foo4")).unwrap();
    assert_eq!(commit_of(&repo, &last).parent, third);
}

#[test]
fn checkout_of_unknown_branch_fails() {
    let err = Repository::new().checkout("dev", false).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
    assert!(err.to_string().contains("Branch dev does not exist."));
}

#[test]
fn creating_an_existing_branch_fails() {
    let err = Repository::new().checkout("master", true).unwrap_err();
    assert!(matches!(err, RepoError::StateConflict(_)));
    assert!(err.to_string().contains("Branch master already exists."));
}

#[test]
fn failed_checkout_leaves_state_untouched() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.checkout("dev", true).unwrap();
    repo.commit("robin", "I commit", &doc("bar2", "foo")).unwrap();
    let before = repo.to_json();

    assert!(matches!(
        repo.checkout("master", true),
        Err(RepoError::StateConflict(_))
    ));
    assert!(matches!(
        repo.checkout("missing", false),
        Err(RepoError::NotFound(_))
    ));
    assert_eq!(repo.to_json(), before);
    assert_eq!(repo.branch().unwrap(), "dev");
}

#[test]
fn log_holds_every_commit() {
    let repo = Repository::new();
    let first = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    let second = repo.commit("robin", "I commit", &doc("bar2", "foo2")).unwrap();

    let log = repo.log().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].0, first);
    assert_eq!(log[0].1.author, "robin");
    assert_eq!(log[0].1.parent, EMPTY_HASH);
    assert_eq!(log[1].0, second);
    assert_eq!(log[1].1.author, "robin");
    assert_eq!(log[1].1.parent, first);
}

#[test]
fn log_follows_commit_order_across_branches() {
    let repo = Repository::new();
    let mut expected = Vec::new();
    for n in 0..4 {
        expected.push(repo.commit("robin", "I commit", &json!({"n": n})).unwrap());
    }
    repo.checkout("dev", true).unwrap();
    expected.push(repo.commit("robin", "I commit", &json!({"n": "dev"})).unwrap());
    repo.checkout("master", false).unwrap();
    expected.push(repo.commit("robin", "I commit", &json!({"n": "master"})).unwrap());

    let hashes: Vec<Hash> = repo.log().unwrap().into_iter().map(|(hash, _)| hash).collect();
    assert_eq!(hashes, expected);

    let restored = Repository::from_snapshot(repo.to_json());
    let restored_hashes: Vec<Hash> =
        restored.log().unwrap().into_iter().map(|(hash, _)| hash).collect();
    assert_eq!(restored_hashes, expected);
}

#[test]
fn to_json_exports_refs_commits_and_compressed_trees() {
    let repo = Repository::new();
    let first = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    let second = repo.commit("robin", "I commit", &doc("bar2", "foo")).unwrap();

    let data = repo.to_json();
    let tree_hashes: Vec<&String> = data.trees.keys().collect();
    assert_eq!(tree_hashes.len(), 2);

    let expected = json!({
        "refs": {
            "branch": {"value": "master"},
            "heads": {"master": second},
        },
        "commits": {
            first.as_str(): {
                "author": "robin",
                "date": data.commits[first.as_str()]["date"],
                "message": "I commit",
                "parent": EMPTY_HASH,
                "treeHash": tree_hashes[0],
            },
            second.as_str(): {
                "author": "robin",
                "date": data.commits[second.as_str()]["date"],
                "message": "I commit",
                "parent": first,
                "treeHash": tree_hashes[1],
            },
        },
        "trees": {
            tree_hashes[0].as_str(): {"foo": "bar", "child": {"bar": "foo"}},
            tree_hashes[1].as_str(): {"foo": "bar2", "child": format!("$$ref:{}", tree_hashes[0])},
        },
    });
    assert_eq!(data.to_value().unwrap(), expected);
}

const SNAPSHOT: &str = r#"{"refs":{"branch":{"value":"master"},"heads":{"master":"ddd0ed1cc"}},"commits":{"1ad2fa1c":{"author":"robin","date":"2017-02-03T16:29:24.836Z","message":"I commit","treeHash":"20d2a220c","parent":"0000000000"},"ddd0ed1cc":{"author":"robin","date":"2017-02-03T16:29:24.836Z","message":"I commit","treeHash":"b1a13bdd0c","parent":"1ad2fa1c"}},"trees":{"20d2a220c":{"foo":"bar","child":{"bar":"foo"}},"b1a13bdd0c":{"foo":"bar2","child":{"bar":"foo2"}}}}"#;

fn snapshot() -> Snapshot {
    Snapshot::from_value(serde_json::from_str(SNAPSHOT).unwrap()).unwrap()
}

#[test]
fn snapshot_restores_the_repository() {
    init_tracing();
    let repo = Repository::from_snapshot(snapshot());
    assert_eq!(repo.branch().unwrap(), "master");
    assert_eq!(repo.head().unwrap(), "ddd0ed1cc");
    assert_eq!(repo.tree().unwrap(), doc("bar2", "foo2"));
    assert_eq!(repo.log().unwrap().len(), 2);
}

#[test]
fn restored_repository_keeps_committing() {
    let repo = Repository::try_from_snapshot(snapshot()).unwrap();
    let next = repo.commit("robin", "I commit", &doc("bar3", "foo2")).unwrap();
    assert_eq!(commit_of(&repo, &next).parent, "ddd0ed1cc");
    assert_eq!(repo.tree().unwrap(), doc("bar3", "foo2"));
}

#[test]
fn snapshot_round_trips_through_to_json() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.checkout("dev", true).unwrap();
    repo.commit("robin", "I commit", &doc("bar2", "foo")).unwrap();

    let restored = Repository::from_snapshot(repo.to_json());
    assert_eq!(restored.branch().unwrap(), "dev");
    assert_eq!(restored.head().unwrap(), repo.head().unwrap());
    assert_eq!(restored.tree().unwrap(), doc("bar2", "foo"));
    assert_eq!(restored.to_json(), repo.to_json());
}

#[test]
fn invalid_snapshot_falls_back_to_an_empty_repository() {
    init_tracing();
    let mut broken = snapshot();
    broken.trees.clear();

    let repo = Repository::from_snapshot(broken.clone());
    assert_eq!(repo.head().unwrap(), EMPTY_HASH);
    assert!(repo.log().unwrap().is_empty());

    assert!(matches!(
        Repository::try_from_snapshot(broken),
        Err(RepoError::Validation(_))
    ));
}

#[test]
fn diff_between_branches_and_commits() {
    let repo = Repository::new();
    let first = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.checkout("dev", true).unwrap();
    repo.commit("robin", "I commit", &doc("bar", "foo2")).unwrap();
    repo.checkout("master", false).unwrap();
    repo.commit("robin", "I commit", &json!({"child": {"bar": "foo"}})).unwrap();

    let expected = Patch::from_value(&json!([
        {"op": "add", "path": "/foo", "value": "bar"},
        {"op": "replace", "path": "/child/bar", "value": "foo2"},
    ]))
    .unwrap();
    assert_eq!(repo.diff("master", "dev").unwrap(), expected);

    let expected = Patch::from_value(&json!([
        {"op": "replace", "path": "/child/bar", "value": "foo2"},
    ]))
    .unwrap();
    assert_eq!(repo.diff(first.as_str(), "dev").unwrap(), expected);

    assert!(matches!(repo.diff("master", "nope"), Err(RepoError::NotFound(_))));
}

#[test]
fn apply_with_a_far_array_index_keeps_the_element() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &json!({"l": [1]})).unwrap();
    let patch = Patch::from_value(&json!([
        {"op": "add", "path": "/l/18446744073709551615", "value": 2},
    ]))
    .unwrap();

    let preview = repo.apply(&patch, None).unwrap();
    assert_eq!(preview, json!({"l": {"0": 1, "18446744073709551615": 2}}));
    let next = repo.commit("robin", "I commit", &preview).unwrap();
    assert_eq!(repo.head().unwrap(), next);
    assert_eq!(repo.tree().unwrap(), preview);
}

#[test]
fn apply_previews_a_patch_without_committing() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    let head = repo.head().unwrap();

    let patch = Patch::from_value(&json!([
        {"op": "replace", "path": "/foo", "value": "baz"},
        {"op": "add", "path": "/new", "value": 1},
    ]))
    .unwrap();
    let mut refuse_new = |op: &PatchOperation, _: Option<&Value>| {
        if op.path().to_pointer() == "/new" {
            Decision::Reject
        } else {
            Decision::Accept
        }
    };
    let preview = repo.apply(&patch, Some(&mut refuse_new)).unwrap();
    assert_eq!(preview, doc("baz", "foo"));
    assert_eq!(repo.head().unwrap(), head);
    assert_eq!(repo.tree().unwrap(), doc("bar", "foo"));
}

#[test]
fn revert_undoes_a_commit_on_top_of_head() {
    init_tracing();
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    let reverted = repo.commit("robin", "I commit", &doc("bar", "foo2")).unwrap();
    repo.commit(
        "robin",
        "I commit",
        &json!({"foo": "bar", "child": {"bar": "foo2", "hello": "world"}}),
    )
    .unwrap();

    let revert = repo.revert("robin", reverted.as_str(), None).unwrap();
    assert_eq!(
        repo.tree().unwrap(),
        json!({"foo": "bar", "child": {"bar": "foo", "hello": "world"}})
    );
    assert_eq!(repo.head().unwrap(), revert);
    assert_eq!(message_of(&repo, &revert), format!("Revert of commit {reverted}"));
}

#[test]
fn revert_rejects_bad_input() {
    let repo = Repository::new();
    let first = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    let before = repo.to_json();

    assert!(matches!(
        repo.revert("", first.as_str(), None),
        Err(RepoError::Validation(_))
    ));
    assert!(matches!(
        repo.revert("robin", "missing", None),
        Err(RepoError::NotFound(_))
    ));
    let err = repo.revert("robin", first.as_str(), None).unwrap_err();
    assert!(err.to_string().contains("You can't revert the first commit."));
    assert_eq!(repo.head().unwrap(), first);
    assert_eq!(repo.to_json(), before);
}

#[test]
fn merge_replays_the_target_branch() {
    init_tracing();
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.checkout("dev", true).unwrap();
    repo.commit(
        "robin",
        "I commit",
        &json!({"foo": "bar2", "child": {"bar": "foo2", "hello": "world"}}),
    )
    .unwrap();
    repo.checkout("master", false).unwrap();
    repo.commit("robin", "I commit", &json!({"child": {"bar": "foo"}, "its": "me"}))
        .unwrap();

    let merged = repo.merge("robin", "dev", None).unwrap();
    assert_eq!(
        repo.tree().unwrap(),
        json!({"foo": "bar2", "child": {"bar": "foo2", "hello": "world"}, "its": "me"})
    );
    assert_eq!(repo.head().unwrap(), merged);
    assert_eq!(message_of(&repo, &merged), "Merge of dev into master");
}

#[test]
fn merge_resolver_can_keep_the_current_side() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.checkout("dev", true).unwrap();
    repo.commit("robin", "I commit", &doc("bar2", "foo2")).unwrap();
    repo.checkout("master", false).unwrap();
    repo.commit("robin", "I commit", &json!({"child": {"bar": "foo"}})).unwrap();

    let mut conflicts = Vec::new();
    let mut resolver = |theirs: &PatchOperation, ours: &PatchOperation| {
        conflicts.push((theirs.path().to_pointer(), ours.path().to_pointer()));
        Decision::Reject
    };
    repo.merge("robin", "dev", Some(&mut resolver)).unwrap();

    assert_eq!(conflicts, vec![("/foo".to_owned(), "/foo".to_owned())]);
    assert_eq!(repo.tree().unwrap(), json!({"child": {"bar": "foo2"}}));
}

#[test]
fn merge_of_unknown_target_fails() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    assert!(matches!(
        repo.merge("robin", "nope", None),
        Err(RepoError::NotFound(_))
    ));
}

#[test]
fn merge_without_changes_is_a_no_op() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.checkout("dev", true).unwrap();
    repo.checkout("master", false).unwrap();
    repo.commit("robin", "I commit", &doc("bar2", "foo")).unwrap();
    assert_eq!(repo.merge("robin", "dev", None).unwrap_err(), RepoError::NoOp);
}

#[test]
fn branches_are_listed_in_creation_order() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.checkout("dev", true).unwrap();
    assert_eq!(repo.branches().unwrap(), vec!["master", "dev"]);
}

#[test]
fn delete_branch_protects_current_and_master() {
    let repo = Repository::new();
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.checkout("dev", true).unwrap();

    let err = repo.delete_branch("dev").unwrap_err();
    assert!(err.to_string().contains("You cannot delete the current branch"));
    let err = repo.delete_branch("master").unwrap_err();
    assert!(err.to_string().contains("You cannot delete the master branch"));
    assert_eq!(repo.branches().unwrap(), vec!["master", "dev"]);

    repo.checkout("master", false).unwrap();
    repo.delete_branch("dev").unwrap();
    assert_eq!(repo.branches().unwrap(), vec!["master"]);
    assert!(matches!(repo.delete_branch("dev"), Err(RepoError::NotFound(_))));
}

#[test]
fn delete_branch_in_detached_mode_fails() {
    let repo = Repository::new();
    let first = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.checkout("dev", true).unwrap();
    repo.checkout(first.as_str(), false).unwrap();
    assert!(matches!(
        repo.delete_branch("dev"),
        Err(RepoError::StateConflict(_))
    ));
}

#[test]
fn subscribers_are_notified_until_unsubscribed() {
    let repo = Repository::new();
    let first_calls = Arc::new(Mutex::new(Vec::new()));
    let second_calls = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&first_calls);
    let first_id = repo.subscribe(move |event: &HeadEvent| sink.lock().unwrap().push(event.clone()));
    let sink = Arc::clone(&second_calls);
    repo.subscribe(move |event: &HeadEvent| sink.lock().unwrap().push(event.clone()));

    let hash = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    assert_eq!(*first_calls.lock().unwrap(), vec![HeadEvent { head: hash.clone() }]);
    assert_eq!(*second_calls.lock().unwrap(), vec![HeadEvent { head: hash }]);

    assert!(repo.unsubscribe(first_id));
    assert!(!repo.unsubscribe(first_id));

    let hash2 = repo.commit("robin", "I commit", &doc("bar2", "foo")).unwrap();
    assert_eq!(first_calls.lock().unwrap().len(), 1);
    let second = second_calls.lock().unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[1], HeadEvent { head: hash2 });
}

#[test]
fn every_mutating_operation_notifies_once() {
    let repo = Repository::new();
    let heads = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&heads);
    repo.subscribe(move |event: &HeadEvent| sink.lock().unwrap().push(event.head.clone()));

    let first = repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.checkout("dev", true).unwrap();
    let second = repo.commit("robin", "I commit", &doc("bar", "foo2")).unwrap();
    repo.checkout("master", false).unwrap();
    repo.delete_branch("dev").unwrap();

    assert_eq!(
        *heads.lock().unwrap(),
        vec![first.clone(), first.clone(), second, first.clone(), first]
    );
}

#[test]
fn config_loads_from_toml() {
    let config = RepositoryConfig::from_toml_str("compress_trees = false").unwrap();
    let repo = Repository::with_config(config);
    repo.commit("robin", "I commit", &doc("bar", "foo")).unwrap();
    repo.commit("robin", "I commit", &doc("bar2", "foo")).unwrap();

    let trees = repo.to_json().trees;
    assert!(trees.values().all(|tree| tree["child"] == json!({"bar": "foo"})));
    assert!(repo.config().validate_branch_names);
}

#[test]
fn repository_is_shareable_across_threads() {
    let repo = Arc::new(Repository::new());
    repo.commit("robin", "I commit", &json!({"n": 0})).unwrap();

    let handles: Vec<_> = (1..=4)
        .map(|i| {
            let repo = Arc::clone(&repo);
            std::thread::spawn(move || {
                repo.commit("robin", "I commit", &json!({"n": i})).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(repo.log().unwrap().len(), 5);
    assert_eq!(repo.history("master").unwrap().len(), 5);
}
