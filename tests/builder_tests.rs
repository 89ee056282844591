//! Tests for the application builder and context lifecycle
//!
//! # Test Coverage
//!
//! - Configuration closures execute in exactly registration order
//! - `run()` with zero closures still yields a valid, closable context
//! - `close()` is idempotent and safe from another thread
//! - A failing closure aborts `run()` and the remaining closures
//! - An unregistered module descriptor fails before any closure executes

mod common;

use common::test_server::setup_may_runtime;
use std::sync::{Arc, Mutex};
use wireup::{application, AppBuilder, Error, Lifecycle, Logging, ModuleId, WebServer};

type OrderLog = Arc<Mutex<Vec<&'static str>>>;

fn order_log() -> OrderLog {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn test_closures_run_in_registration_order() {
    setup_may_runtime();
    let order = order_log();
    let (first, second, third) = (order.clone(), order.clone(), order.clone());

    let mut context = application()
        .enable(WebServer, move |web| {
            first.lock().unwrap().push("web");
            web.bind("127.0.0.1:0");
            Ok(())
        })
        .unwrap()
        .enable(Logging, move |_log| {
            second.lock().unwrap().push("logging");
            Ok(())
        })
        .unwrap()
        .enable(WebServer, move |_web| {
            third.lock().unwrap().push("web again");
            Ok(())
        })
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(
        *order.lock().unwrap(),
        vec!["web", "logging", "web again"]
    );
    context.close();
}

#[test]
fn test_run_with_zero_closures_yields_closable_context() {
    setup_may_runtime();
    let mut context = application().run().unwrap();
    assert_eq!(context.state(), Lifecycle::Active);
    assert!(context.addr().is_none(), "no server was configured");
    context.close();
    assert_eq!(context.state(), Lifecycle::Closed);
}

#[test]
fn test_close_twice_is_a_noop() {
    setup_may_runtime();
    let mut context = application()
        .enable(WebServer, |web| {
            web.bind("127.0.0.1:0");
            Ok(())
        })
        .unwrap()
        .run()
        .unwrap();

    let addr = context.addr().expect("server was configured");
    context.close();
    assert_eq!(context.state(), Lifecycle::Closed);
    context.close();
    assert_eq!(context.state(), Lifecycle::Closed);
    assert_eq!(context.addr(), Some(addr), "addr stays readable after close");
}

#[test]
fn test_close_from_another_thread() {
    setup_may_runtime();
    let context = application()
        .enable(WebServer, |web| {
            web.bind("127.0.0.1:0");
            Ok(())
        })
        .unwrap()
        .run()
        .unwrap();

    let closer = std::thread::spawn(move || {
        let mut context = context;
        context.close();
        context.state()
    });
    assert_eq!(closer.join().unwrap(), Lifecycle::Closed);
}

#[test]
fn test_failing_closure_aborts_run() {
    setup_may_runtime();
    let order = order_log();
    let (first, second, third) = (order.clone(), order.clone(), order.clone());

    let result = application()
        .enable(WebServer, move |web| {
            first.lock().unwrap().push("first");
            web.bind("127.0.0.1:0");
            Ok(())
        })
        .unwrap()
        .enable(WebServer, move |_web| {
            second.lock().unwrap().push("second");
            Err(anyhow::anyhow!("bad configuration value"))
        })
        .unwrap()
        .enable(WebServer, move |_web| {
            third.lock().unwrap().push("third");
            Ok(())
        })
        .unwrap()
        .run();

    match result {
        Err(Error::Configuration { module, source }) => {
            assert_eq!(module, ModuleId::WebServer);
            assert!(source.to_string().contains("bad configuration value"));
        }
        other => panic!("expected a configuration error, got {other:?}"),
    }
    assert_eq!(
        *order.lock().unwrap(),
        vec!["first", "second"],
        "closures after the failure must not run"
    );
}

#[test]
fn test_unknown_module_fails_before_any_closure_runs() {
    let touched = Arc::new(Mutex::new(false));
    let probe = touched.clone();

    let result = AppBuilder::bare().enable(WebServer, move |_web| {
        *probe.lock().unwrap() = true;
        Ok(())
    });

    match result {
        Err(Error::UnknownModule { module }) => assert_eq!(module, ModuleId::WebServer),
        other => panic!("expected an unknown module error, got {other:?}"),
    }
    assert!(!*touched.lock().unwrap(), "closure must never execute");
}

#[test]
fn test_install_extends_the_registry() {
    let result = AppBuilder::bare()
        .install(ModuleId::Logging)
        .enable(Logging, |log| {
            log.filter("warn");
            Ok(())
        });
    assert!(result.is_ok());
}
