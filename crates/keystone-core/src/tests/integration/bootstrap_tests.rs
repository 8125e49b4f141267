#![cfg(test)]

use crate::kernel::bootstrap::ApplicationStatus;
use crate::kernel::error::{ComponentError, Error};
use crate::packaging::{DependencyError, LoadStage, PackageDescriptor, PackagingError};
use crate::tests::integration::common::{
    Greeter, TestPackage, catalog_of, event_log, events, loads, test_app,
};

fn abc_packages(log: &crate::tests::integration::common::EventLog, names: [&str; 3]) -> Vec<TestPackage> {
    names
        .iter()
        .map(|name| {
            let descriptor = match *name {
                "A" => PackageDescriptor::new("A"),
                "B" => PackageDescriptor::new("B").depends_on("A"),
                _ => PackageDescriptor::new("C").depends_on("A").depends_on("B"),
            };
            TestPackage::new(descriptor, log).observing()
        })
        .collect()
}

#[test]
fn test_abc_loads_in_dependency_order_from_any_input_order() {
    let inputs = [
        ["C", "B", "A"],
        ["A", "B", "C"],
        ["B", "C", "A"],
        ["C", "A", "B"],
    ];
    for input in inputs {
        let log = event_log();
        let catalog = catalog_of(abc_packages(&log, input));
        let mut app = test_app();

        app.load(&catalog).expect("bootstrap failed");
        assert_eq!(loads(&log), vec!["A", "B", "C"], "input order {input:?}");
        assert_eq!(app.loaded_packages(), ["A", "B", "C"]);
    }
}

#[test]
fn test_after_all_fires_once_after_last_package_loaded() {
    let log = event_log();
    let catalog = catalog_of(abc_packages(&log, ["C", "B", "A"]));
    let mut app = test_app();
    app.load(&catalog).unwrap();

    let recorded = events(&log);
    let after_all: Vec<&String> = recorded.iter().filter(|e| e.starts_with("after_all:")).collect();
    // One entry per observing package, all from the single dispatch
    assert_eq!(after_all.len(), 3);
    assert!(after_all.iter().all(|e| e.ends_with(":A,B,C")));

    let last_package_loaded = recorded
        .iter()
        .rposition(|e| e.starts_with("package_loaded:") && e.ends_with(":C"))
        .unwrap();
    let first_after_all = recorded.iter().position(|e| e.starts_with("after_all:")).unwrap();
    assert!(last_package_loaded < first_after_all);

    // Hooks registered by A see every later package; hooks run in load order
    let c_loaded: Vec<&String> = recorded
        .iter()
        .filter(|e| e.starts_with("package_loaded:") && e.ends_with(":C"))
        .collect();
    assert_eq!(
        c_loaded,
        vec!["package_loaded:A:C", "package_loaded:B:C", "package_loaded:C:C"]
    );
}

#[test]
fn test_unknown_dependency_aborts_before_any_load() {
    let log = event_log();
    let catalog = catalog_of(vec![
        TestPackage::new(PackageDescriptor::new("A"), &log),
        TestPackage::new(PackageDescriptor::new("D").depends_on("Z"), &log),
    ]);
    let mut app = test_app();

    let err = app.load(&catalog).unwrap_err();
    assert_eq!(
        err.as_dependency_error(),
        Some(&DependencyError::UnknownDependency {
            package: "D".to_string(),
            dependency: "Z".to_string(),
        })
    );
    assert!(loads(&log).is_empty());
    assert_ne!(app.status(), ApplicationStatus::Ready);
}

#[test]
fn test_disabled_hard_dependency_aborts_bootstrap() {
    let log = event_log();
    let mut catalog = catalog_of(vec![
        TestPackage::new(PackageDescriptor::new("mail"), &log),
        TestPackage::new(PackageDescriptor::new("notify").depends_on("mail"), &log),
    ]);
    catalog.disable("mail").unwrap();
    let mut app = test_app();

    let err = app.load(&catalog).unwrap_err();
    assert!(matches!(
        err.as_dependency_error(),
        Some(DependencyError::UnknownDependency { package, dependency })
            if package == "notify" && dependency == "mail"
    ));
}

#[test]
fn test_cycle_aborts_before_any_load() {
    let log = event_log();
    let catalog = catalog_of(vec![
        TestPackage::new(PackageDescriptor::new("ping").depends_on("pong"), &log),
        TestPackage::new(PackageDescriptor::new("pong").depends_on("ping"), &log),
    ]);
    let mut app = test_app();

    let err = app.load(&catalog).unwrap_err();
    assert!(matches!(err.as_dependency_error(), Some(DependencyError::CyclicDependency(_))));
    assert!(events(&log).is_empty());
}

#[test]
fn test_duplicate_component_without_replace_fails() {
    let log = event_log();
    let catalog = catalog_of(vec![
        TestPackage::new(PackageDescriptor::new("first").with_component("svc.x"), &log)
            .registering("svc.x", false),
        TestPackage::new(PackageDescriptor::new("second").with_component("svc.x"), &log)
            .registering("svc.x", false),
    ]);
    let mut app = test_app();

    let err = app.load(&catalog).unwrap_err();
    match err {
        Error::Packaging(PackagingError::LoadFailed {
            package,
            stage,
            source,
        }) => {
            assert_eq!(package, "second");
            assert_eq!(stage, LoadStage::ModuleInit);
            assert!(matches!(
                *source,
                Error::Component(ComponentError::DuplicateComponent { .. })
            ));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(loads(&log), vec!["first"]);
}

#[test]
fn test_duplicate_component_with_replace_keeps_second() {
    let log = event_log();
    let catalog = catalog_of(vec![
        TestPackage::new(PackageDescriptor::new("first").with_component("svc.x"), &log)
            .registering("svc.x", false),
        TestPackage::new(
            PackageDescriptor::new("second")
                .depends_on("first")
                .with_component("svc.x"),
            &log,
        )
        .registering("svc.x", true),
    ]);
    let mut app = test_app();

    app.load(&catalog).unwrap();
    let greeter = app.get_component::<dyn Greeter>("svc.x").unwrap();
    assert_eq!(greeter.greeting(), "hello from second");
    assert_eq!(app.components().len(), 1);
}

#[test]
fn test_failed_bootstrap_never_becomes_ready() {
    let log = event_log();
    let catalog = catalog_of(vec![
        TestPackage::new(PackageDescriptor::new("ok"), &log).observing(),
        TestPackage::new(PackageDescriptor::new("broken").depends_on("ok"), &log).failing_load(),
    ]);
    let mut app = test_app();

    let err = app.load(&catalog).unwrap_err();
    assert!(err.to_string().contains("Package 'broken' failed at load()"), "got: {err}");
    assert_eq!(app.status(), ApplicationStatus::Loading);
    assert!(!app.hooks().is_sealed());
    assert!(!events(&log).iter().any(|e| e.starts_with("after_all")));
}

#[test]
fn test_declared_component_bound_by_another_package_fails() {
    let log = event_log();
    let catalog = catalog_of(vec![
        TestPackage::new(PackageDescriptor::new("a").with_component("svc.x"), &log)
            .registering("svc.x", false),
        TestPackage::new(
            PackageDescriptor::new("b").depends_on("a").with_component("svc.x"),
            &log,
        ),
    ]);
    let mut app = test_app();

    let err = app.load(&catalog).unwrap_err();
    let Error::Packaging(failure) = &err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(failure.failure_point(), Some(("b", &LoadStage::ModuleInit)));
    let PackagingError::LoadFailed { source, .. } = failure else {
        panic!("unexpected error: {err}");
    };
    assert!(matches!(
        &**source,
        Error::Packaging(PackagingError::MissingDeclaredComponent { package, .. }) if package == "b"
    ));
    assert_eq!(loads(&log), vec!["a"]);
    assert_eq!(
        app.get_component::<dyn Greeter>("svc.x").unwrap().greeting(),
        "hello from a"
    );
}
