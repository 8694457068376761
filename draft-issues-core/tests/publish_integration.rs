use draft_issues_core::config::{LabelMode, PublishOptions};
use draft_issues_core::contract::{CreatedIssue, MockIssueTracker, NewIssue, TrackerError};
use draft_issues_core::draft::IssueRecord;
use draft_issues_core::publish::{
    new_issue, preflight, publish, write_dry_run_banner, OutcomeStatus, PublishError,
};
use draft_issues_core::selection::Selection;
use std::time::Duration;
use tokio::time::Instant;

fn record(title: &str, labels: &[&str], body: &str) -> IssueRecord {
    IssueRecord {
        title: title.to_string(),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        body: body.to_string(),
    }
}

fn sample_records() -> Vec<IssueRecord> {
    vec![
        record("Implement Set", &["enhancement", "feature"], "A hash set."),
        record("Implement Deque", &["enhancement"], "Double ended."),
        record("Implement Trie", &[], "Prefix tree."),
        record("Implement Skip List", &["priority: low"], "Levels."),
    ]
}

fn live_options() -> PublishOptions {
    PublishOptions {
        dry_run: false,
        label_mode: LabelMode::Attach,
        delay: Duration::ZERO,
    }
}

fn created(n: u64) -> CreatedIssue {
    CreatedIssue {
        number: Some(n),
        url: Some(format!("https://github.com/o/r/issues/{n}")),
    }
}

#[tokio::test]
async fn dry_run_never_creates_issues() {
    let mut tracker = MockIssueTracker::new();
    tracker.expect_create_issue().times(0);

    let options = PublishOptions {
        dry_run: true,
        ..live_options()
    };
    let mut out = Vec::new();
    let report = publish(&sample_records(), Selection::default(), &options, &tracker, &mut out)
        .await
        .expect("dry run succeeds");

    assert!(report.is_success());
    assert_eq!(report.created(), 4);
    assert!(report
        .outcomes
        .iter()
        .all(|o| o.status == OutcomeStatus::Previewed));

    let text = String::from_utf8(out).unwrap();
    // The banner belongs to the caller, ahead of any other output.
    assert!(!text.contains("DRY RUN MODE"));
    assert!(text.contains("Issue 1/4: Implement Set"));
    assert!(text.contains("   Labels: enhancement,feature"));
    assert!(text.contains("   Body preview: A hash set...."));
    assert!(text.contains("This was a dry run"));
}

#[tokio::test]
async fn failure_count_matches_failed_create_calls() {
    let mut tracker = MockIssueTracker::new();
    let mut next = 40;
    tracker
        .expect_create_issue()
        .times(4)
        .returning(move |issue: &NewIssue| {
            next += 1;
            if issue.title.contains("Deque") || issue.title.contains("Trie") {
                Err(TrackerError::CommandFailed {
                    status: "exit status: 1".into(),
                    stderr: "could not add label".into(),
                })
            } else {
                Ok(created(next))
            }
        });

    let mut out = Vec::new();
    let report = publish(
        &sample_records(),
        Selection::default(),
        &live_options(),
        &tracker,
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(report.created(), 2);
    assert_eq!(report.failed(), 2);
    assert!(!report.is_success());

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("   Created: #41"));
    assert!(text.contains("could not add label"));
    assert!(text.contains("   Failed: 2 issues"));
}

#[tokio::test]
async fn only_selected_range_is_created() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_create_issue()
        .withf(|issue: &NewIssue| issue.title == "Implement Deque" || issue.title == "Implement Trie")
        .times(2)
        .returning(|_| Ok(CreatedIssue::default()));

    let mut out = Vec::new();
    let report = publish(
        &sample_records(),
        Selection::new(2, Some(3)),
        &live_options(),
        &tracker,
        &mut out,
    )
    .await
    .unwrap();

    let indices: Vec<_> = report.outcomes.iter().map(|o| o.index).collect();
    assert_eq!(indices, vec![2, 3]);
    assert_eq!(report.total, 4);

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Issue 2/4: Implement Deque"));
    assert!(text.contains("   Created successfully"));
    assert!(!text.contains("Failed:"));
}

#[tokio::test]
async fn empty_selection_creates_nothing() {
    let mut tracker = MockIssueTracker::new();
    tracker.expect_create_issue().times(0);

    let mut out = Vec::new();
    let report = publish(
        &sample_records(),
        Selection::new(9, None),
        &live_options(),
        &tracker,
        &mut out,
    )
    .await
    .unwrap();
    assert!(report.outcomes.is_empty());
    assert!(report.is_success());
}

#[tokio::test]
async fn empty_title_fails_without_calling_tracker() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_create_issue()
        .times(1)
        .returning(|_| Ok(created(1)));

    let records = vec![record("", &["bug"], "x"), record("Real", &["bug"], "y")];
    let mut out = Vec::new();
    let report = publish(&records, Selection::default(), &live_options(), &tracker, &mut out)
        .await
        .unwrap();
    assert_eq!(report.failed(), 1);
    assert_eq!(report.created(), 1);
}

#[tokio::test]
async fn labels_are_attached_or_written_into_body() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_create_issue()
        .withf(|issue: &NewIssue| {
            issue.labels.is_empty()
                && issue.body == "**Labels:** enhancement, feature\n\n---\n\nA hash set."
        })
        .times(1)
        .returning(|_| Ok(created(7)));

    let options = PublishOptions {
        label_mode: LabelMode::InBody,
        ..live_options()
    };
    let mut out = Vec::new();
    let report = publish(
        &sample_records(),
        Selection::new(1, Some(1)),
        &options,
        &tracker,
        &mut out,
    )
    .await
    .unwrap();
    assert!(report.is_success());

    let attached = new_issue(&sample_records()[0], LabelMode::Attach);
    assert_eq!(attached.labels, vec!["enhancement", "feature"]);
    assert_eq!(attached.body, "A hash set.");

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Labels were included in issue descriptions."));

    let unlabelled = new_issue(&sample_records()[2], LabelMode::InBody);
    assert!(unlabelled.body.starts_with("**Labels:** none\n\n---\n\n"));
}

#[tokio::test]
async fn preflight_requires_install_and_auth_for_real_runs() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_check_installed()
        .returning(|| Err(TrackerError::NotInstalled("gh: not found".into())));
    tracker.expect_check_authenticated().times(0);

    let mut out = Vec::new();
    let err = preflight(&tracker, false, &mut out).await.unwrap_err();
    assert!(matches!(
        err,
        PublishError::Preflight(TrackerError::NotInstalled(_))
    ));

    let mut tracker = MockIssueTracker::new();
    tracker.expect_check_installed().returning(|| Ok(()));
    tracker
        .expect_check_authenticated()
        .returning(|| Err(TrackerError::NotAuthenticated("run gh auth login".into())));
    let err = preflight(&tracker, false, &mut out).await.unwrap_err();
    assert!(matches!(
        err,
        PublishError::Preflight(TrackerError::NotAuthenticated(_))
    ));
}

#[tokio::test]
async fn preflight_only_warns_in_dry_run() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_check_installed()
        .returning(|| Err(TrackerError::NotInstalled("gh: not found".into())));
    tracker.expect_check_authenticated().times(0);

    let mut out = Vec::new();
    preflight(&tracker, true, &mut out)
        .await
        .expect("dry run continues without gh");
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Continuing with dry run anyway"));
}

#[test]
fn dry_run_banner_is_a_single_line_and_a_blank() {
    let mut out = Vec::new();
    write_dry_run_banner(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "DRY RUN MODE - No issues will be created\n\n"
    );
}

#[tokio::test]
async fn dry_run_preview_keeps_first_hundred_characters() {
    let mut tracker = MockIssueTracker::new();
    tracker.expect_create_issue().times(0);

    let records = vec![record("Accents", &["docs"], &"é".repeat(150))];
    let options = PublishOptions {
        dry_run: true,
        ..live_options()
    };
    let mut out = Vec::new();
    publish(&records, Selection::default(), &options, &tracker, &mut out)
        .await
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    let preview = text
        .lines()
        .find(|l| l.starts_with("   Body preview: "))
        .expect("preview line");
    assert_eq!(preview, format!("   Body preview: {}...", "é".repeat(100)));
    assert!(!text.contains(&"é".repeat(101)));
}

#[tokio::test(start_paused = true)]
async fn delay_separates_consecutive_creates_only() {
    let delay = Duration::from_millis(200);
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_create_issue()
        .times(3)
        .returning(|_| Ok(CreatedIssue::default()));

    let mut records = sample_records();
    records.truncate(3);
    let options = PublishOptions {
        delay,
        ..live_options()
    };
    let started = Instant::now();
    publish(&records, Selection::default(), &options, &tracker, &mut Vec::new())
        .await
        .unwrap();
    assert_eq!(started.elapsed(), delay * 2);
}

#[tokio::test(start_paused = true)]
async fn no_delay_after_last_selected_issue() {
    let delay = Duration::from_millis(200);
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_create_issue()
        .times(2)
        .returning(|_| Ok(CreatedIssue::default()));

    let options = PublishOptions {
        delay,
        ..live_options()
    };
    let started = Instant::now();
    publish(
        &sample_records(),
        Selection::new(1, Some(2)),
        &options,
        &tracker,
        &mut Vec::new(),
    )
    .await
    .unwrap();
    assert_eq!(started.elapsed(), delay);
}

#[tokio::test(start_paused = true)]
async fn dry_run_never_waits() {
    let mut tracker = MockIssueTracker::new();
    tracker.expect_create_issue().times(0);

    let options = PublishOptions {
        dry_run: true,
        delay: Duration::from_millis(200),
        ..live_options()
    };
    let started = Instant::now();
    publish(&sample_records(), Selection::default(), &options, &tracker, &mut Vec::new())
        .await
        .unwrap();
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn empty_title_does_not_add_a_delay() {
    let delay = Duration::from_millis(200);
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_create_issue()
        .times(2)
        .returning(|_| Ok(CreatedIssue::default()));

    let records = vec![
        record("", &["bug"], "x"),
        record("A", &["bug"], "y"),
        record("B", &["bug"], "z"),
    ];
    let options = PublishOptions {
        delay,
        ..live_options()
    };
    let started = Instant::now();
    let report = publish(&records, Selection::default(), &options, &tracker, &mut Vec::new())
        .await
        .unwrap();
    assert_eq!(report.failed(), 1);
    assert_eq!(started.elapsed(), delay);
}
