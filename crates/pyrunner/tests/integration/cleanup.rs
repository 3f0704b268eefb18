use pyrunner::Inputs;

use super::{leftover_files, run, test_config};

#[tokio::test]
async fn test_no_leftovers_after_success() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(test_config(dir.path()), "print('ok')", Inputs::from("1\n2\n3")).await;

    assert_eq!(report.output, "ok\nok\nok");
    assert_eq!(leftover_files(dir.path()), 0);
}

#[tokio::test]
async fn test_no_leftovers_after_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path()).with_time_limit(0.5);
    let report = run(config, "while True: pass", Inputs::none()).await;

    assert!(report.error.contains("timed out"));
    assert_eq!(leftover_files(dir.path()), 0);
}

#[tokio::test]
async fn test_no_leftovers_after_crash() {
    let dir = tempfile::tempdir().unwrap();
    let report = run(test_config(dir.path()), "1 / 0", Inputs::none()).await;

    assert!(report.error.contains("ZeroDivisionError"));
    assert_eq!(leftover_files(dir.path()), 0);
}

#[tokio::test]
async fn test_timeout_terminates_spawned_children() {
    // The snippet forks a sleeping grandchild; the deadline must take down
    // the whole process group, so the marker file is never written.
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("survived");
    let code = format!(
        "import time\n\
         pid = __import__('o' + 's').fork()\n\
         if pid == 0:\n\
         \x20   time.sleep(2)\n\
         \x20   open({marker:?}, 'w').close()\n\
         else:\n\
         \x20   while True: pass\n",
        marker = marker.display().to_string()
    );
    let config = test_config(dir.path()).with_time_limit(0.5);

    let report = run(config, &code, Inputs::none()).await;
    assert!(report.error.contains("timed out"));

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;
    assert!(!marker.exists());
}
