//! Integration tests exercising the public unit-generation API end to end:
//! metadata in, `(service name, unit text)` out.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use cradle_common::types::{ContainerId, ContainerMetadata, PodInfo};
use cradle_systemd::error::GenerateError;
use cradle_systemd::options::{RestartPolicy, UnitOptions};
use cradle_systemd::unit::container_unit;

fn metadata() -> ContainerMetadata {
    ContainerMetadata {
        id: ContainerId::new("3f4a"),
        name: "web".to_owned(),
        stop_timeout: 7,
        conmon_pid_file: "/run/conmon/3f4a.pid".to_owned(),
        run_root: "/run/containers/storage".to_owned(),
        create_command: Some(
            ["/usr/local/bin/cradle", "run", "--name", "web", "nginx:alpine"]
                .map(str::to_owned)
                .to_vec(),
        ),
        env: Vec::new(),
        pod: None,
    }
}

fn options() -> UnitOptions {
    UnitOptions {
        executable: Some("/usr/bin/cradle".to_owned()),
        no_header: true,
        ..UnitOptions::default()
    }
}

#[test]
fn service_name_is_prefix_separator_ref_for_every_selection() {
    let meta = metadata();

    let (service, _) = container_unit(&meta, &options()).expect("generation should succeed");
    assert_eq!(service, "container-3f4a");

    let with_name = UnitOptions {
        use_name: true,
        ..options()
    };
    let (service, _) = container_unit(&meta, &with_name).expect("generation should succeed");
    assert_eq!(service, "container-web");

    let custom = UnitOptions {
        use_name: true,
        container_prefix: "svc".to_owned(),
        separator: "_".to_owned(),
        ..options()
    };
    let (service, _) = container_unit(&meta, &custom).expect("generation should succeed");
    assert_eq!(service, "svc_web");
}

#[test]
fn repeated_generation_is_byte_identical() {
    let meta = metadata();
    let first = container_unit(&meta, &options()).expect("generation should succeed");
    let second = container_unit(&meta, &options()).expect("generation should succeed");
    assert_eq!(first, second);
}

#[test]
fn restart_policy_flows_into_the_unit() {
    let meta = metadata();
    let opts = UnitOptions {
        restart_policy: RestartPolicy::Always,
        ..options()
    };
    let (_, text) = container_unit(&meta, &opts).expect("generation should succeed");
    assert!(text.contains("Restart=always\n"));
}

#[test]
fn missing_pid_file_fails_generation() {
    let mut meta = metadata();
    meta.conmon_pid_file = String::new();
    let err = container_unit(&meta, &options()).expect_err("generation should fail");
    assert!(matches!(err, GenerateError::MissingPidFile { .. }));
}

#[test]
fn command_without_run_token_fails_in_new_mode() {
    let mut meta = metadata();
    meta.create_command = Some(["/usr/local/bin/cradle", "rim"].map(str::to_owned).to_vec());
    let opts = UnitOptions {
        new: true,
        ..options()
    };
    let err = container_unit(&meta, &opts).expect_err("generation should fail");
    assert!(matches!(err, GenerateError::InvalidCreateCommand { .. }));
}

#[test]
fn new_mode_enforces_detach_and_replace_exactly_once() {
    let meta = metadata();
    let opts = UnitOptions {
        new: true,
        ..options()
    };
    let (_, text) = container_unit(&meta, &opts).expect("generation should succeed");
    let exec_start = text
        .lines()
        .find_map(|line| line.strip_prefix("ExecStart="))
        .expect("unit should have an ExecStart line");
    let tokens: Vec<&str> = exec_start.split(' ').collect();
    assert_eq!(tokens.iter().filter(|&&t| t == "-d").count(), 1);
    assert_eq!(tokens.iter().filter(|&&t| t == "--replace").count(), 1);
    assert_eq!(tokens.iter().filter(|&&t| t == "--rm").count(), 1);
    assert!(tokens.contains(&"--cgroups=no-conmon"));
    assert!(tokens.contains(&"--sdnotify=conmon"));
    assert!(tokens.contains(&"--cidfile=%t/%n.ctr-id"));
}

#[test]
fn pod_members_bind_to_their_pod_unit() {
    let mut meta = metadata();
    meta.pod = Some(PodInfo {
        service_name: "pod-stack".to_owned(),
        pod_id_file: "%t/pod-stack.pod-id".to_owned(),
    });
    let opts = UnitOptions {
        new: true,
        ..options()
    };
    let (_, text) = container_unit(&meta, &opts).expect("generation should succeed");
    assert!(text.contains("BindsTo=pod-stack.service\n"));
    assert!(text.contains("After=pod-stack.service\n"));
    assert!(text.contains("--pod-id-file %t/pod-stack.pod-id"));
}

#[test]
fn timeout_stop_sec_is_base_plus_stop_timeout() {
    let meta = metadata();
    let (_, text) = container_unit(&meta, &options()).expect("generation should succeed");
    assert!(text.contains("TimeoutStopSec=67\n"));
}
