//! End-to-end renders through the built-in markup toolkit.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use htmlshot::{compare, MarkupToolkit, RenderTask, Toolkit, Widget};
use sha2::{Digest, Sha256};

const HELLO: &str = "<p>Hello</p>";

fn golden_path(name: &str) -> PathBuf {
    let mut p = PathBuf::from("tests/goldens/expected");
    p.push(name);
    p
}

#[test]
fn hello_render_matches_the_widget_packed_size() {
    let image = htmlshot::render_with_delay(HELLO, Duration::ZERO).expect("render");
    let widget = MarkupToolkit::new().build(HELLO).expect("build reference widget");
    assert_eq!(image.dimensions(), widget.size());
}

#[test]
fn capture_equals_a_directly_painted_reference() {
    let image = htmlshot::render_with_delay(HELLO, Duration::ZERO).expect("render");
    let reference = MarkupToolkit::new()
        .build(HELLO)
        .expect("build reference widget")
        .paint()
        .expect("paint reference widget");
    assert!(compare::equals(Some(&*image), Some(&reference)));
}

#[test]
fn renders_are_identical_across_tasks() {
    let a = htmlshot::render_with_delay(HELLO, Duration::ZERO).expect("render");
    let b = htmlshot::render_with_delay(HELLO, Duration::ZERO).expect("render");
    assert!(compare::equals(Some(&*a), Some(&*b)));
    assert!(!compare::equals(Some(&*a), None));
}

#[test]
fn default_settle_delay_render_completes() {
    let task = RenderTask::prepare(HELLO).expect("prepare");
    let image = task.wait().expect("render completed");
    let again = task.image().expect("image available");
    assert!(Arc::ptr_eq(&image, &again));
}

#[test]
fn golden_hello_digest_matches_fixture() {
    let image = htmlshot::render_with_delay(HELLO, Duration::ZERO).expect("render");
    let digest = hex::encode(Sha256::digest(image.as_raw()));

    let expected_path = golden_path("hello.sha256");
    if std::env::var("UPDATE_GOLDENS").is_ok() {
        fs::create_dir_all("tests/goldens/expected").ok();
        fs::write(&expected_path, &digest).expect("write golden");
        println!("Updated golden: {expected_path:?}");
        return;
    }

    if !expected_path.exists() {
        println!(
            "No golden at {expected_path:?}; run with UPDATE_GOLDENS=1 to create it. Skipping."
        );
        return;
    }

    let expected = fs::read_to_string(&expected_path).expect("unable to read golden");
    assert_eq!(digest, expected.trim());
}
